use std::fmt::{Debug, Display};

use crate::api::{ApiError, ProductApi};
use crate::model::{Product, ProductId, ProductInput};

/// A single call against the product API, as requested by a view-model.
///
/// `Debug` redacts passwords, so requests can be logged as they are.
#[derive(Clone, PartialEq)]
pub enum ApiRequest {
    Login {
        email: String,
        password: String,
    },
    Register {
        email: String,
        password: String,
        confirm_password: String,
    },
    ListProducts,
    CreateProduct(ProductInput),
    UpdateProduct {
        id: ProductId,
        product: ProductInput,
    },
    DeleteProduct(ProductId),
}

/// The settled result of an [`ApiRequest`].
#[derive(Debug)]
pub enum ApiResponse {
    LoggedIn(Result<(), ApiError>),
    Registered(Result<(), ApiError>),
    ProductsLoaded(Result<Vec<Product>, ApiError>),
    ProductCreated(Result<(), ApiError>),
    ProductUpdated(Result<(), ApiError>),
    ProductDeleted(Result<(), ApiError>),
}

impl ApiResponse {
    pub fn is_ok(&self) -> bool {
        match self {
            Self::ProductsLoaded(result) => result.is_ok(),
            Self::LoggedIn(result)
            | Self::Registered(result)
            | Self::ProductCreated(result)
            | Self::ProductUpdated(result)
            | Self::ProductDeleted(result) => result.is_ok(),
        }
    }
}

impl ApiRequest {
    /// Perform the request. Never fails: errors are carried in the response.
    pub async fn send(self, api: &dyn ProductApi) -> ApiResponse {
        match self {
            Self::Login { email, password } => {
                ApiResponse::LoggedIn(api.login(&email, &password).await)
            }
            Self::Register {
                email,
                password,
                confirm_password,
            } => ApiResponse::Registered(api.register(&email, &password, &confirm_password).await),
            Self::ListProducts => ApiResponse::ProductsLoaded(api.list_products().await),
            Self::CreateProduct(product) => {
                ApiResponse::ProductCreated(api.create_product(&product).await)
            }
            Self::UpdateProduct { id, product } => {
                ApiResponse::ProductUpdated(api.update_product(id, &product).await)
            }
            Self::DeleteProduct(id) => ApiResponse::ProductDeleted(api.delete_product(id).await),
        }
    }
}

const REDACTED: &str = "[redacted]";

impl Debug for ApiRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Login { email, .. } => f
                .debug_struct("Login")
                .field("email", email)
                .field("password", &REDACTED)
                .finish(),
            Self::Register { email, .. } => f
                .debug_struct("Register")
                .field("email", email)
                .field("password", &REDACTED)
                .field("confirm_password", &REDACTED)
                .finish(),
            Self::ListProducts => f.write_str("ListProducts"),
            Self::CreateProduct(product) => f.debug_tuple("CreateProduct").field(product).finish(),
            Self::UpdateProduct { id, product } => f
                .debug_struct("UpdateProduct")
                .field("id", id)
                .field("product", product)
                .finish(),
            Self::DeleteProduct(id) => f.debug_tuple("DeleteProduct").field(id).finish(),
        }
    }
}

impl Display for ApiRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Login { email, .. } => write!(f, "Logging in as {email}"),
            Self::Register { email, .. } => write!(f, "Registering {email}"),
            Self::ListProducts => write!(f, "Loading products"),
            Self::CreateProduct(product) => write!(f, "Creating {}", product.name),
            Self::UpdateProduct { id, .. } => write!(f, "Updating product {id}"),
            Self::DeleteProduct(id) => write!(f, "Deleting product {id}"),
        }
    }
}
