use tracing::{debug, warn};

use crate::api::{ApiError, ApiRequest, ApiResponse};
use crate::model::{Product, ProductDraft, ProductId};
use crate::viewmodel::{Effect, Feedback, StatusMessage};

/// A product being edited, keyed by the id it was opened with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditingProduct {
    pub id: ProductId,
    pub draft: ProductDraft,
}

#[derive(Debug, Default)]
pub struct DashboardViewModel {
    products: Vec<Product>,
    pub new_product: ProductDraft,
    editing: Option<EditingProduct>,
    feedback: Feedback,
}

impl DashboardViewModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn products(&self) -> &[Product] {
        &self.products
    }

    pub const fn editing(&self) -> Option<&EditingProduct> {
        self.editing.as_ref()
    }

    pub const fn editing_mut(&mut self) -> Option<&mut EditingProduct> {
        self.editing.as_mut()
    }

    pub const fn status(&self) -> Option<&StatusMessage> {
        self.feedback.message()
    }

    pub const fn is_busy(&self) -> bool {
        self.feedback.is_busy()
    }

    /// Initial fetch when the screen is entered.
    pub fn init(&mut self) -> Effect {
        self.reload()
    }

    pub fn reload(&mut self) -> Effect {
        self.feedback.begin(ApiRequest::ListProducts)
    }

    pub fn submit_new(&mut self) -> Option<Effect> {
        match self.new_product.validate() {
            Ok(product) => Some(self.feedback.begin(ApiRequest::CreateProduct(product))),
            Err(error) => {
                self.feedback.error(error.to_string());
                None
            }
        }
    }

    /// Open `product` for editing, replacing any edit already in progress.
    pub fn start_edit(&mut self, product: &Product) {
        self.editing = Some(EditingProduct {
            id: product.id,
            draft: ProductDraft::from_product(product),
        });
    }

    pub fn cancel_edit(&mut self) {
        self.editing = None;
    }

    pub fn submit_edit(&mut self) -> Option<Effect> {
        let editing = self.editing.as_ref()?;
        match editing.draft.parse() {
            Ok(product) => {
                let id = editing.id;
                Some(self.feedback.begin(ApiRequest::UpdateProduct { id, product }))
            }
            Err(error) => {
                self.feedback.error(error.to_string());
                None
            }
        }
    }

    pub fn delete(&mut self, id: ProductId) -> Effect {
        self.feedback.begin(ApiRequest::DeleteProduct(id))
    }

    pub const fn logout(&self) -> Effect {
        Effect::Logout
    }

    /// Fold a settled request into the screen state.
    ///
    /// A successful mutation asks for exactly one refetch of the list.
    pub fn resolve(&mut self, response: ApiResponse) -> Option<Effect> {
        match response {
            ApiResponse::ProductsLoaded(result) => {
                self.feedback.settle();
                match result {
                    Ok(products) => {
                        self.products = products;
                        self.feedback.success("Products loaded");
                    }
                    Err(error) => self.fail(&error, "Failed to load products"),
                }
                None
            }
            ApiResponse::ProductCreated(result) => self.mutated(
                result,
                "Product created",
                "Failed to create product",
                |vm| vm.new_product = ProductDraft::default(),
            ),
            ApiResponse::ProductUpdated(result) => self.mutated(
                result,
                "Product updated",
                "Failed to update product",
                |vm| vm.editing = None,
            ),
            ApiResponse::ProductDeleted(result) => {
                self.mutated(result, "Product deleted", "Failed to delete product", |_| {})
            }
            other @ (ApiResponse::LoggedIn(_) | ApiResponse::Registered(_)) => {
                debug!(response = ?other, "Dashboard ignoring unrelated response");
                None
            }
        }
    }

    fn mutated(
        &mut self,
        result: Result<(), ApiError>,
        success: &str,
        failure: &str,
        on_success: impl FnOnce(&mut Self),
    ) -> Option<Effect> {
        self.feedback.settle();
        match result {
            Ok(()) => {
                on_success(self);
                self.feedback.success(success);
                Some(self.reload())
            }
            Err(error) => {
                self.fail(&error, failure);
                None
            }
        }
    }

    fn fail(&mut self, error: &ApiError, message: &str) {
        warn!(%error, "{message}");
        self.feedback.error(message);
    }
}
