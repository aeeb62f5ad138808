//! Customer value objects: email, phone number, address and the customer
//! snapshot stored on an order.

use std::sync::LazyLock;

use common::CustomerId;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{DomainError, optional_text, require_text};

const MAX_EMAIL_LEN: usize = 255;
const MAX_ADDRESS_PART_LEN: usize = 100;
const MAX_CUSTOMER_NAME_LEN: usize = 100;

static EMAIL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9._%+\-]+@[A-Za-z0-9\-]+(\.[A-Za-z0-9\-]+)*\.[A-Za-z]{2,}$")
        .expect("Invalid regex")
});
static PHONE_HYPHENATED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^0[0-9]{1,4}-[0-9]{1,4}-[0-9]{4}$").expect("Invalid regex"));
static PHONE_DIGITS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^0[0-9]{9,10}$").expect("Invalid regex"));
static POSTAL_CODE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]{3}-[0-9]{4}$").expect("Invalid regex"));

/// An email address of the form `local@domain.tld`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Email(String);

impl Email {
    pub fn new(value: &str) -> Result<Self, DomainError> {
        let value = value.trim();
        if value.chars().count() > MAX_EMAIL_LEN {
            return Err(DomainError::invalid_field(
                "email",
                format!("must be at most {MAX_EMAIL_LEN} characters"),
            ));
        }
        if !EMAIL.is_match(value) {
            return Err(DomainError::invalid_field(
                "email",
                format!("'{value}' is not a valid email address"),
            ));
        }
        Ok(Self(value.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the part after `@`.
    pub fn domain(&self) -> &str {
        self.0.rsplit_once('@').map_or("", |(_, domain)| domain)
    }
}

impl TryFrom<String> for Email {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(&value)
    }
}

impl From<Email> for String {
    fn from(email: Email) -> Self {
        email.0
    }
}

impl std::fmt::Display for Email {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A Japanese landline or mobile number.
///
/// Accepts hyphenated numbers such as `03-1234-5678` / `090-1234-5678`, or
/// 10 to 11 contiguous digits starting with `0`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PhoneNumber(String);

impl PhoneNumber {
    pub fn new(value: &str) -> Result<Self, DomainError> {
        let value = value.trim();
        let digit_count = value.chars().filter(char::is_ascii_digit).count();
        let valid = PHONE_DIGITS.is_match(value)
            || (PHONE_HYPHENATED.is_match(value) && (10..=11).contains(&digit_count));
        if !valid {
            return Err(DomainError::invalid_field(
                "phone number",
                format!("'{value}' is not a valid phone number"),
            ));
        }
        Ok(Self(value.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the number without hyphens.
    pub fn digits(&self) -> String {
        self.0.chars().filter(char::is_ascii_digit).collect()
    }

    /// Re-hyphenates as `XX-XXXX-XXXX` (10 digits) or `XXX-XXXX-XXXX` (11 digits).
    pub fn formatted(&self) -> String {
        let digits = self.digits();
        let area_len = if digits.len() == 11 { 3 } else { 2 };
        let (area, rest) = digits.split_at(area_len);
        let (middle, last) = rest.split_at(4);
        format!("{area}-{middle}-{last}")
    }
}

impl TryFrom<String> for PhoneNumber {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(&value)
    }
}

impl From<PhoneNumber> for String {
    fn from(phone: PhoneNumber) -> Self {
        phone.0
    }
}

impl std::fmt::Display for PhoneNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A delivery address in Japan.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "AddressRecord")]
pub struct Address {
    postal_code: String,
    prefecture: String,
    city: String,
    street: String,
    building: Option<String>,
}

#[derive(Deserialize)]
struct AddressRecord {
    postal_code: String,
    prefecture: String,
    city: String,
    street: String,
    building: Option<String>,
}

impl TryFrom<AddressRecord> for Address {
    type Error = DomainError;

    fn try_from(record: AddressRecord) -> Result<Self, Self::Error> {
        Address::new(
            &record.postal_code,
            &record.prefecture,
            &record.city,
            &record.street,
            record.building.as_deref(),
        )
    }
}

impl Address {
    pub fn new(
        postal_code: &str,
        prefecture: &str,
        city: &str,
        street: &str,
        building: Option<&str>,
    ) -> Result<Self, DomainError> {
        let postal_code = postal_code.trim();
        if !POSTAL_CODE.is_match(postal_code) {
            return Err(DomainError::invalid_field(
                "postal code",
                format!("'{postal_code}' is not in NNN-NNNN form"),
            ));
        }
        Ok(Self {
            postal_code: postal_code.to_string(),
            prefecture: require_text("prefecture", prefecture, MAX_ADDRESS_PART_LEN)?,
            city: require_text("city", city, MAX_ADDRESS_PART_LEN)?,
            street: require_text("street", street, MAX_ADDRESS_PART_LEN)?,
            building: optional_text("building", building, MAX_ADDRESS_PART_LEN)?,
        })
    }

    pub fn postal_code(&self) -> &str {
        &self.postal_code
    }

    pub fn prefecture(&self) -> &str {
        &self.prefecture
    }

    pub fn city(&self) -> &str {
        &self.city
    }

    pub fn street(&self) -> &str {
        &self.street
    }

    pub fn building(&self) -> Option<&str> {
        self.building.as_deref()
    }

    /// Prefecture, city, street and building joined for labels.
    pub fn full_address(&self) -> String {
        let mut parts = vec![
            self.prefecture.as_str(),
            self.city.as_str(),
            self.street.as_str(),
        ];
        if let Some(building) = &self.building {
            parts.push(building);
        }
        format!("〒{} {}", self.postal_code, parts.join(" "))
    }
}

/// Customer details captured on an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerInfo {
    customer_id: Option<CustomerId>,
    name: String,
    email: Email,
    phone: PhoneNumber,
}

impl CustomerInfo {
    pub fn new(name: &str, email: Email, phone: PhoneNumber) -> Result<Self, DomainError> {
        Ok(Self {
            customer_id: None,
            name: require_text("customer name", name, MAX_CUSTOMER_NAME_LEN)?,
            email,
            phone,
        })
    }

    /// Links the snapshot to a registered customer.
    pub fn with_customer_id(mut self, customer_id: CustomerId) -> Self {
        self.customer_id = Some(customer_id);
        self
    }

    pub fn customer_id(&self) -> Option<CustomerId> {
        self.customer_id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn email(&self) -> &Email {
        &self.email
    }

    pub fn phone(&self) -> &PhoneNumber {
        &self.phone
    }
}
