//! Identifier newtypes.
//!
//! Three families exist:
//! - UUID identifiers for entities and aggregates (hyphenated v4 only),
//! - [`ColorId`], a positive integer,
//! - short string identifiers for shipping and payment methods.
//!
//! Each family shares one validation routine; the macros below only generate
//! the newtype plumbing around it.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::IdentifierError;

static UUID_V4: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^[0-9a-f]{8}-[0-9a-f]{4}-4[0-9a-f]{3}-[89ab][0-9a-f]{3}-[0-9a-f]{12}$")
        .expect("Invalid regex")
});

/// Maximum length, in characters, of a string identifier.
pub const MAX_STRING_ID_LEN: usize = 50;

fn parse_uuid(kind: &'static str, value: &str) -> Result<Uuid, IdentifierError> {
    if !UUID_V4.is_match(value) {
        return Err(IdentifierError::invalid(
            kind,
            value,
            "expected a hyphenated UUID v4",
        ));
    }
    Uuid::parse_str(value).map_err(|e| IdentifierError::invalid(kind, value, e.to_string()))
}

fn check_uuid(kind: &'static str, uuid: Uuid) -> Result<Uuid, IdentifierError> {
    if uuid.get_version_num() != 4 || uuid.get_variant() != uuid::Variant::RFC4122 {
        return Err(IdentifierError::invalid(
            kind,
            uuid.to_string(),
            "expected a UUID v4",
        ));
    }
    Ok(uuid)
}

fn parse_string_id(kind: &'static str, value: &str) -> Result<String, IdentifierError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(IdentifierError::invalid(kind, value, "must not be empty"));
    }
    if trimmed.chars().count() > MAX_STRING_ID_LEN {
        return Err(IdentifierError::invalid(
            kind,
            value,
            format!("must be at most {MAX_STRING_ID_LEN} characters"),
        ));
    }
    Ok(trimmed.to_string())
}

macro_rules! uuid_identifier {
    ($(#[$meta:meta])* $name:ident, $kind:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(Uuid);

        impl $name {
            /// Human-readable kind used in error messages.
            pub const KIND: &'static str = $kind;

            /// Creates a new random identifier.
            pub fn generate() -> Self {
                Self(Uuid::new_v4())
            }

            /// Parses a hyphenated UUID v4 string.
            pub fn parse(value: &str) -> Result<Self, IdentifierError> {
                parse_uuid($kind, value).map(Self)
            }

            /// Wraps an existing UUID, rejecting anything but v4.
            pub fn from_uuid(uuid: Uuid) -> Result<Self, IdentifierError> {
                check_uuid($kind, uuid).map(Self)
            }

            /// Returns the underlying UUID.
            pub fn as_uuid(&self) -> Uuid {
                self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl std::str::FromStr for $name {
            type Err = IdentifierError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::parse(s)
            }
        }

        impl TryFrom<String> for $name {
            type Error = IdentifierError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::parse(&value)
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> Self {
                id.0.to_string()
            }
        }

        impl From<$name> for Uuid {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

macro_rules! string_identifier {
    ($(#[$meta:meta])* $name:ident, $kind:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            /// Human-readable kind used in error messages.
            pub const KIND: &'static str = $kind;

            /// Creates the identifier, trimming surrounding whitespace.
            pub fn new(value: impl AsRef<str>) -> Result<Self, IdentifierError> {
                parse_string_id($kind, value.as_ref()).map(Self)
            }

            /// Returns the identifier as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl std::str::FromStr for $name {
            type Err = IdentifierError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::new(s)
            }
        }

        impl TryFrom<String> for $name {
            type Error = IdentifierError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

uuid_identifier!(
    /// Identifier of a product.
    ProductId,
    "product id"
);
uuid_identifier!(
    /// Identifier of a SKU (purchasable product variant).
    SkuId,
    "SKU id"
);
uuid_identifier!(
    /// Identifier of an order.
    OrderId,
    "order id"
);
uuid_identifier!(
    /// Identifier of a customer.
    CustomerId,
    "customer id"
);
uuid_identifier!(
    /// Identifier of a product category.
    CategoryId,
    "category id"
);
uuid_identifier!(
    /// Identifier of a stored delivery address.
    DeliveryInfoId,
    "delivery info id"
);

string_identifier!(
    /// Identifier of a shipping method, e.g. `standard`.
    ShippingMethodId,
    "shipping method id"
);
string_identifier!(
    /// Identifier of a payment method, e.g. `credit_card`.
    PaymentMethodId,
    "payment method id"
);

/// Identifier of a catalog color. Always a positive integer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct ColorId(u32);

impl ColorId {
    /// Human-readable kind used in error messages.
    pub const KIND: &'static str = "color id";

    /// Creates a color id, rejecting zero.
    pub fn new(value: u32) -> Result<Self, IdentifierError> {
        if value == 0 {
            return Err(IdentifierError::invalid(
                Self::KIND,
                value.to_string(),
                "must be a positive integer",
            ));
        }
        Ok(Self(value))
    }

    /// Returns the raw value.
    pub fn value(&self) -> u32 {
        self.0
    }
}

impl std::fmt::Display for ColorId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<u32> for ColorId {
    type Error = IdentifierError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ColorId> for u32 {
    fn from(id: ColorId) -> Self {
        id.0
    }
}
