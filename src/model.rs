//! Domain types shared by the API client and the view-models.
//!
//! [`Product`] is what the server hands back, [`ProductDraft`] is what the user
//! is typing, and [`ProductInput`] is a draft that passed validation and may be
//! sent over the wire.

use std::fmt::Display;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Server-assigned product identifier.
pub type ProductId = u64;

/// A product as returned by the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub price: f64,
    pub quantity: u32,
}

impl Display for Product {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// Validated product fields, ready to be submitted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductInput {
    pub name: String,
    pub description: String,
    pub price: f64,
    pub quantity: u32,
}

/// Uncommitted product fields, exactly as typed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductDraft {
    pub name: String,
    pub description: String,
    pub price: String,
    pub quantity: String,
}

impl ProductDraft {
    /// Seed a draft with the current values of an existing product.
    pub fn from_product(product: &Product) -> Self {
        Self {
            name: product.name.clone(),
            description: product.description.clone(),
            price: product.price.to_string(),
            quantity: product.quantity.to_string(),
        }
    }

    /// Check a new product: every field is required.
    ///
    /// # Errors
    /// Returns [`ValidationError::MissingField`] if any field is blank and
    /// otherwise whatever [`ProductDraft::parse`] returns.
    pub fn validate(&self) -> Result<ProductInput, ValidationError> {
        let required = [
            &self.name,
            &self.description,
            &self.price,
            &self.quantity,
        ];
        if required.iter().any(|value| value.trim().is_empty()) {
            return Err(ValidationError::MissingField);
        }
        self.parse()
    }

    /// Parse the numeric fields only. Edits go through here, so existing
    /// products with a blank name or description can still be updated.
    ///
    /// # Errors
    /// Returns [`ValidationError::InvalidNumber`] if price or quantity do not
    /// parse as non-negative numbers.
    pub fn parse(&self) -> Result<ProductInput, ValidationError> {
        let price = parse_price(&self.price).ok_or(ValidationError::InvalidNumber)?;
        let quantity = self
            .quantity
            .trim()
            .parse::<u32>()
            .map_err(|_| ValidationError::InvalidNumber)?;

        Ok(ProductInput {
            name: self.name.trim().to_string(),
            description: self.description.trim().to_string(),
            price,
            quantity,
        })
    }
}

fn parse_price(raw: &str) -> Option<f64> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|price| price.is_finite() && *price >= 0.0)
}

/// Email and password sent to `/login` and `/register`.
#[derive(Debug, Clone, Serialize)]
pub struct Credentials<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

/// Client-side validation failures. These never reach the network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("All fields are required")]
    MissingField,
    #[error("Price and quantity must be valid numbers")]
    InvalidNumber,
    #[error("Email and password are required")]
    MissingCredentials,
    #[error("Passwords do not match")]
    PasswordMismatch,
}

/// Login needs both fields filled in.
///
/// # Errors
/// Returns [`ValidationError::MissingCredentials`] when either field is blank.
pub fn validate_login(email: &str, password: &str) -> Result<(), ValidationError> {
    if email.trim().is_empty() || password.is_empty() {
        return Err(ValidationError::MissingCredentials);
    }
    Ok(())
}

/// Registration needs all fields filled in and matching passwords.
///
/// # Errors
/// Returns [`ValidationError::MissingCredentials`] when a field is blank and
/// [`ValidationError::PasswordMismatch`] when the passwords differ.
pub fn validate_registration(
    email: &str,
    password: &str,
    confirm_password: &str,
) -> Result<(), ValidationError> {
    validate_login(email, password)?;
    if password != confirm_password {
        return Err(ValidationError::PasswordMismatch);
    }
    Ok(())
}
