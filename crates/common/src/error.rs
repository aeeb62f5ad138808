//! Identifier error types.

use thiserror::Error;

/// Errors raised while constructing an identifier.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdentifierError {
    /// The raw value does not have the shape required by the identifier kind.
    #[error("Invalid {kind}: '{value}' ({reason})")]
    InvalidIdentifier {
        kind: &'static str,
        value: String,
        reason: String,
    },
}

impl IdentifierError {
    pub(crate) fn invalid(
        kind: &'static str,
        value: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::InvalidIdentifier {
            kind,
            value: value.into(),
            reason: reason.into(),
        }
    }

    /// Returns the identifier kind that failed validation.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InvalidIdentifier { kind, .. } => kind,
        }
    }
}
