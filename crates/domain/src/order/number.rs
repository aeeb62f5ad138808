//! Human-readable order numbers.

use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::DomainError;

static ORDER_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^ORD[0-9]{8}[0-9]{6}$").expect("Invalid regex"));

/// Largest suffix that fits the six-digit slot.
pub const MAX_ORDER_SEQUENCE: u32 = 999_999;

/// `ORD` + `YYYYMMDD` + six-digit suffix, e.g. `ORD20240721000001`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct OrderNumber(String);

impl OrderNumber {
    /// Parses an existing order number.
    pub fn parse(value: &str) -> Result<Self, DomainError> {
        if !ORDER_NUMBER.is_match(value) {
            return Err(DomainError::invalid_field(
                "order number",
                format!("'{value}' does not match ORD + 8-digit date + 6-digit suffix"),
            ));
        }
        Ok(Self(value.to_string()))
    }

    /// Builds the number for `date` with the given per-day suffix.
    pub fn generate(date: NaiveDate, suffix: u32) -> Result<Self, DomainError> {
        if suffix > MAX_ORDER_SEQUENCE {
            return Err(DomainError::invalid_field(
                "order number",
                format!("suffix {suffix} exceeds {MAX_ORDER_SEQUENCE}"),
            ));
        }
        Self::parse(&format!("ORD{}{suffix:06}", date.format("%Y%m%d")))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the `YYYYMMDD` portion.
    pub fn date_part(&self) -> &str {
        self.0.get(3..11).unwrap_or_default()
    }
}

impl TryFrom<String> for OrderNumber {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<OrderNumber> for String {
    fn from(number: OrderNumber) -> Self {
        number.0
    }
}

impl std::fmt::Display for OrderNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
