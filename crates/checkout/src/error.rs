//! Checkout error types.

use common::{IdentifierError, OrderId, SkuId};
use domain::DomainError;
use thiserror::Error;

/// Errors returned by the checkout services and ports.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// The request is malformed.
    #[error("Invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    /// A referenced SKU, method or order does not exist.
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// The request is well formed but cannot be fulfilled.
    #[error("Business rule violation: {0}")]
    BusinessRuleViolation(String),

    /// A SKU does not have enough available units.
    #[error("Insufficient stock for SKU {sku_id}: requested {requested}, available {available}")]
    InsufficientStock {
        sku_id: SkuId,
        requested: u32,
        available: u32,
    },

    /// The order changed since it was loaded.
    #[error(
        "Concurrency conflict for order {order_id}: expected version {expected}, found {actual}"
    )]
    ConcurrencyConflict {
        order_id: OrderId,
        expected: u64,
        actual: u64,
    },

    /// Domain error.
    #[error("Domain error: {0}")]
    Domain(#[from] DomainError),

    /// A port could not complete the call.
    #[error("Repository error: {0}")]
    Repository(String),
}

impl CheckoutError {
    pub(crate) fn validation(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Attributes an identifier parse failure to a request field.
    pub(crate) fn invalid_identifier(field: impl Into<String>, err: IdentifierError) -> Self {
        Self::validation(field, err.to_string())
    }

    /// Attributes a value-object validation failure to a request field.
    ///
    /// Errors other than field validation pass through unchanged.
    pub(crate) fn invalid_input(field: impl Into<String>, err: DomainError) -> Self {
        match err {
            DomainError::InvalidField { reason, .. } => Self::validation(field, reason),
            DomainError::InvalidIdentifier(err) => Self::invalid_identifier(field, err),
            other => Self::Domain(other),
        }
    }

    /// Surfaces a domain rule violation as a checkout rule violation.
    pub(crate) fn from_rule(err: DomainError) -> Self {
        match err {
            DomainError::BusinessRuleViolation(reason) => Self::BusinessRuleViolation(reason),
            other => Self::Domain(other),
        }
    }

    /// Attaches the SKU to stock and purchasability failures.
    pub(crate) fn for_sku(sku_id: SkuId, err: DomainError) -> Self {
        match err {
            DomainError::InsufficientStock {
                requested,
                available,
            } => Self::InsufficientStock {
                sku_id,
                requested,
                available,
            },
            DomainError::NotPurchasable { sku } => {
                Self::BusinessRuleViolation(format!("SKU {sku} ({sku_id}) is not purchasable"))
            }
            DomainError::NotFound { entity, .. } => Self::NotFound {
                entity,
                id: sku_id.to_string(),
            },
            other => Self::Domain(other),
        }
    }

    /// Returns true for errors caused by the caller's input rather than the system.
    pub fn is_client_error(&self) -> bool {
        !matches!(self, Self::Repository(_))
    }
}

/// Convenience type alias for checkout results.
pub type Result<T> = std::result::Result<T, CheckoutError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_for_sku_maps_stock_errors() {
        let sku_id = SkuId::generate();
        let err = CheckoutError::for_sku(
            sku_id,
            DomainError::InsufficientStock {
                requested: 5,
                available: 3,
            },
        );
        assert!(matches!(
            err,
            CheckoutError::InsufficientStock {
                sku_id: id,
                requested: 5,
                available: 3
            } if id == sku_id
        ));

        let err = CheckoutError::for_sku(
            sku_id,
            DomainError::NotPurchasable {
                sku: "CHAIR-OAK".to_string(),
            },
        );
        assert!(matches!(err, CheckoutError::BusinessRuleViolation(msg) if msg.contains("CHAIR-OAK")));
    }

    #[test]
    fn test_invalid_input_keeps_request_field() {
        let err = CheckoutError::invalid_input(
            "customer.email",
            DomainError::InvalidField {
                field: "email",
                reason: "'x' is not a valid email address".to_string(),
            },
        );
        match err {
            CheckoutError::Validation { field, reason } => {
                assert_eq!(field, "customer.email");
                assert!(reason.contains("not a valid email"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_repository_errors_are_not_client_errors() {
        assert!(!CheckoutError::Repository("down".to_string()).is_client_error());
        assert!(CheckoutError::BusinessRuleViolation("x".to_string()).is_client_error());
    }
}
