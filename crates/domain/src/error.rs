//! Domain error types.

use common::IdentifierError;
use thiserror::Error;

use crate::money::MoneyError;
use crate::order::OrderStatus;

/// Errors that can occur while constructing or mutating domain objects.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    /// Money arithmetic failed.
    #[error(transparent)]
    Money(#[from] MoneyError),

    /// An identifier was malformed.
    #[error(transparent)]
    InvalidIdentifier(#[from] IdentifierError),

    /// A field failed validation (empty name, bad email, bad postal code, ...).
    #[error("Invalid {field}: {reason}")]
    InvalidField { field: &'static str, reason: String },

    /// More units were requested than are available.
    #[error("Insufficient stock: requested {requested}, available {available}")]
    InsufficientStock { requested: u32, available: u32 },

    /// The SKU cannot be sold in its current state.
    #[error("SKU {sku} is not purchasable")]
    NotPurchasable { sku: String },

    /// The order status machine does not allow the transition.
    #[error("Invalid status transition: {from} -> {to}")]
    InvalidStatusTransition { from: OrderStatus, to: OrderStatus },

    /// A referenced member of an aggregate does not exist.
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// A rule spanning several fields or entities was broken.
    #[error("Business rule violation: {0}")]
    BusinessRuleViolation(String),
}

impl DomainError {
    pub(crate) fn invalid_field(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidField {
            field,
            reason: reason.into(),
        }
    }

    pub(crate) fn rule(reason: impl Into<String>) -> Self {
        Self::BusinessRuleViolation(reason.into())
    }
}

/// Checks that a trimmed text field is non-empty and at most `max` characters,
/// returning the trimmed value.
pub(crate) fn require_text(
    field: &'static str,
    value: &str,
    max: usize,
) -> Result<String, DomainError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(DomainError::invalid_field(field, "must not be empty"));
    }
    if trimmed.chars().count() > max {
        return Err(DomainError::invalid_field(
            field,
            format!("must be at most {max} characters"),
        ));
    }
    Ok(trimmed.to_string())
}

/// Like [`require_text`] but treats a blank value as absent.
pub(crate) fn optional_text(
    field: &'static str,
    value: Option<&str>,
    max: usize,
) -> Result<Option<String>, DomainError> {
    match value.map(str::trim) {
        None | Some("") => Ok(None),
        Some(text) => require_text(field, text, max).map(Some),
    }
}
