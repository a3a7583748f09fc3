//! Authenticated client for the product REST API.
//!
//! Resource calls carry the session's bearer token when one is stored. The
//! client does no retries and no validation of its own, except for the
//! password confirmation on registration.

mod request;

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, instrument};
use url::Url;

use crate::model::{self, Credentials, Product, ProductId, ProductInput, ValidationError};
use crate::session::{CredentialStore, SessionError};

pub use request::{ApiRequest, ApiResponse};

/// Base URL used when neither the config file nor the command line sets one.
pub const DEFAULT_BASE_URL: &str = "http://localhost:4444";

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("invalid endpoint: {0}")]
    Endpoint(#[from] url::ParseError),
    #[error(transparent)]
    Session(#[from] SessionError),
}

/// Operations offered by the product API.
#[async_trait]
pub trait ProductApi: Send + Sync {
    /// Fetch the full product collection.
    async fn list_products(&self) -> Result<Vec<Product>, ApiError>;

    /// Submit a new product.
    async fn create_product(&self, product: &ProductInput) -> Result<(), ApiError>;

    /// Replace all fields of the product `id`.
    async fn update_product(&self, id: ProductId, product: &ProductInput) -> Result<(), ApiError>;

    /// Remove the product `id`.
    async fn delete_product(&self, id: ProductId) -> Result<(), ApiError>;

    /// Exchange credentials for a bearer token and store it.
    async fn login(&self, email: &str, password: &str) -> Result<(), ApiError>;

    /// Create an account. Fails locally if the passwords differ.
    async fn register(
        &self,
        email: &str,
        password: &str,
        confirm_password: &str,
    ) -> Result<(), ApiError>;
}

#[derive(Deserialize)]
struct LoginResponse {
    token: String,
}

#[derive(Serialize)]
struct ProductUpdate<'a> {
    id: ProductId,
    #[serde(flatten)]
    product: &'a ProductInput,
}

/// `reqwest`-backed [`ProductApi`].
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: Url,
    credentials: Arc<dyn CredentialStore>,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url.as_str())
            .finish_non_exhaustive()
    }
}

impl ApiClient {
    /// Create a client for the API rooted at `base_url`.
    ///
    /// # Errors
    /// Returns an error if `base_url` is not an absolute URL.
    pub fn new(base_url: &str, credentials: Arc<dyn CredentialStore>) -> Result<Self, ApiError> {
        let mut base_url = Url::parse(base_url)?;
        // Endpoints are joined as relative paths, so the base must end in '/'.
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        Ok(Self {
            client: Client::new(),
            base_url,
            credentials,
        })
    }

    pub const fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn request(&self, method: Method, path: &str) -> Result<RequestBuilder, ApiError> {
        let url = self.base_url.join(path)?;
        debug!(%method, %url, "Sending request");
        Ok(self.client.request(method, url))
    }

    fn authorized(&self, method: Method, path: &str) -> Result<RequestBuilder, ApiError> {
        let request = self.request(method, path)?;
        Ok(match self.credentials.get() {
            Some(token) => request.bearer_auth(token.expose_secret()),
            None => {
                debug!(path, "No credential stored, sending unauthenticated request");
                request
            }
        })
    }
}

#[async_trait]
impl ProductApi for ApiClient {
    #[instrument(skip(self))]
    async fn list_products(&self) -> Result<Vec<Product>, ApiError> {
        let products: Vec<Product> = self
            .authorized(Method::GET, "getProducts")?
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        debug!(count = products.len(), "Fetched products");
        Ok(products)
    }

    #[instrument(skip(self, product), fields(name = %product.name))]
    async fn create_product(&self, product: &ProductInput) -> Result<(), ApiError> {
        self.authorized(Method::POST, "addProducts")?
            .json(product)
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }

    #[instrument(skip(self, product))]
    async fn update_product(&self, id: ProductId, product: &ProductInput) -> Result<(), ApiError> {
        self.authorized(Method::PUT, &format!("updateProducts/{id}"))?
            .json(&ProductUpdate { id, product })
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete_product(&self, id: ProductId) -> Result<(), ApiError> {
        self.authorized(Method::DELETE, &format!("deleteProducts/{id}"))?
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }

    #[instrument(skip(self, password))]
    async fn login(&self, email: &str, password: &str) -> Result<(), ApiError> {
        let response: LoginResponse = self
            .request(Method::POST, "login")?
            .json(&Credentials { email, password })
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        self.credentials.set(SecretString::from(response.token))?;
        debug!("Logged in");
        Ok(())
    }

    #[instrument(skip(self, password, confirm_password))]
    async fn register(
        &self,
        email: &str,
        password: &str,
        confirm_password: &str,
    ) -> Result<(), ApiError> {
        model::validate_registration(email, password, confirm_password)?;
        self.request(Method::POST, "register")?
            .json(&Credentials { email, password })
            .send()
            .await?
            .error_for_status()?;
        debug!("Registered");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::MemoryCredentialStore;
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, Request, ResponseTemplate};

    /// Matches requests that carry no `Authorization` header.
    struct NoAuthorization;

    impl wiremock::Match for NoAuthorization {
        fn matches(&self, request: &Request) -> bool {
            !request.headers.contains_key("authorization")
        }
    }

    fn client_for(server: &MockServer) -> (ApiClient, Arc<MemoryCredentialStore>) {
        let store = Arc::new(MemoryCredentialStore::new());
        let client = ApiClient::new(&server.uri(), store.clone()).unwrap();
        (client, store)
    }

    fn pen() -> ProductInput {
        ProductInput {
            name: "Pen".to_string(),
            description: "Blue".to_string(),
            price: 1.5,
            quantity: 10,
        }
    }

    #[test]
    fn test_base_url_gets_trailing_slash() {
        let store = Arc::new(MemoryCredentialStore::new());
        let client = ApiClient::new("http://localhost:4444/api", store).unwrap();
        assert_eq!(client.base_url().as_str(), "http://localhost:4444/api/");
        assert_eq!(
            client.base_url().join("getProducts").unwrap().as_str(),
            "http://localhost:4444/api/getProducts"
        );
    }

    #[test]
    fn test_rejects_relative_base_url() {
        let store = Arc::new(MemoryCredentialStore::new());
        assert!(matches!(
            ApiClient::new("localhost", store),
            Err(ApiError::Endpoint(_))
        ));
    }

    #[tokio::test]
    async fn test_login_stores_token() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/login"))
            .and(body_json(json!({"email": "a@b.com", "password": "secret"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"token": "abc123"})))
            .expect(1)
            .mount(&server)
            .await;

        let (client, store) = client_for(&server);
        client.login("a@b.com", "secret").await.unwrap();

        let token = store.get().unwrap();
        assert_eq!(token.expose_secret(), "abc123");
    }

    #[tokio::test]
    async fn test_login_failure_keeps_previous_token() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/login"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let (client, store) = client_for(&server);
        store.set(SecretString::from("old".to_string())).unwrap();

        let result = client.login("a@b.com", "wrong").await;
        assert!(matches!(result, Err(ApiError::Request(_))));
        assert_eq!(store.get().unwrap().expose_secret(), "old");
    }

    #[tokio::test]
    async fn test_list_attaches_bearer_token() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/getProducts"))
            .and(header("authorization", "Bearer abc123"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"id": 1, "name": "Pen", "description": "Blue", "price": 1.5, "quantity": 10},
                {"id": 2, "name": "Mug", "description": "Ceramic", "price": 7, "quantity": 3}
            ])))
            .expect(1)
            .mount(&server)
            .await;

        let (client, store) = client_for(&server);
        store.set(SecretString::from("abc123".to_string())).unwrap();

        let products = client.list_products().await.unwrap();
        assert_eq!(products.len(), 2);
        assert_eq!(products[1].name, "Mug");
        assert_eq!(products[1].quantity, 3);
    }

    #[tokio::test]
    async fn test_list_without_credential_is_still_sent() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/getProducts"))
            .and(NoAuthorization)
            .respond_with(ResponseTemplate::new(401))
            .expect(1)
            .mount(&server)
            .await;

        let (client, _store) = client_for(&server);
        assert!(matches!(
            client.list_products().await,
            Err(ApiError::Request(_))
        ));
    }

    #[tokio::test]
    async fn test_create_sends_typed_numbers() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/addProducts"))
            .and(header("authorization", "Bearer abc123"))
            .and(body_json(json!({
                "name": "Pen",
                "description": "Blue",
                "price": 1.5,
                "quantity": 10
            })))
            .respond_with(ResponseTemplate::new(201))
            .expect(1)
            .mount(&server)
            .await;

        let (client, store) = client_for(&server);
        store.set(SecretString::from("abc123".to_string())).unwrap();
        client.create_product(&pen()).await.unwrap();
    }

    #[tokio::test]
    async fn test_update_addresses_product_by_id() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/updateProducts/3"))
            .and(body_json(json!({
                "id": 3,
                "name": "Pen",
                "description": "Blue",
                "price": 1.5,
                "quantity": 10
            })))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let (client, _store) = client_for(&server);
        client.update_product(3, &pen()).await.unwrap();
    }

    #[tokio::test]
    async fn test_delete_addresses_product_by_id() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/deleteProducts/7"))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        let (client, _store) = client_for(&server);
        client.delete_product(7).await.unwrap();
    }

    #[tokio::test]
    async fn test_server_error_is_request_error() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let (client, _store) = client_for(&server);
        assert!(matches!(
            client.delete_product(7).await,
            Err(ApiError::Request(_))
        ));
    }

    #[tokio::test]
    async fn test_register_mismatch_sends_nothing() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/register"))
            .respond_with(ResponseTemplate::new(201))
            .expect(0)
            .mount(&server)
            .await;

        let (client, _store) = client_for(&server);
        let result = client.register("a@b.com", "secret", "other").await;
        assert!(matches!(
            result,
            Err(ApiError::Validation(ValidationError::PasswordMismatch))
        ));
    }

    #[tokio::test]
    async fn test_register_posts_credentials() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/register"))
            .and(body_json(json!({"email": "a@b.com", "password": "secret"})))
            .respond_with(ResponseTemplate::new(201))
            .expect(1)
            .mount(&server)
            .await;

        let (client, store) = client_for(&server);
        client.register("a@b.com", "secret", "secret").await.unwrap();
        assert!(store.get().is_none());
    }
}
