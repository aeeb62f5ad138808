//! SKU entity: one purchasable variant of a product.

use chrono::{DateTime, Utc};
use common::{ColorId, ProductId, SkuId};
use serde::{Deserialize, Serialize};

use crate::error::{DomainError, optional_text, require_text};
use crate::money::Money;

use super::stock::Stock;

const MAX_CODE_LEN: usize = 50;
const MAX_NAME_LEN: usize = 200;
const MAX_ATTRIBUTE_LEN: usize = 100;

/// Lifecycle status of a SKU.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum SkuStatus {
    /// Listed and sellable while in stock.
    #[default]
    Active,

    /// Temporarily hidden from sale.
    Inactive,

    /// Permanently withdrawn.
    Discontinued,
}

impl SkuStatus {
    /// Returns the status name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            SkuStatus::Active => "Active",
            SkuStatus::Inactive => "Inactive",
            SkuStatus::Discontinued => "Discontinued",
        }
    }
}

impl std::fmt::Display for SkuStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Variant attributes distinguishing SKUs of the same product.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkuAttributes {
    pub color_id: Option<ColorId>,
    pub dimensions: Option<String>,
    pub material: Option<String>,
}

impl SkuAttributes {
    fn validated(self) -> Result<Self, DomainError> {
        Ok(Self {
            color_id: self.color_id,
            dimensions: optional_text("dimensions", self.dimensions.as_deref(), MAX_ATTRIBUTE_LEN)?,
            material: optional_text("material", self.material.as_deref(), MAX_ATTRIBUTE_LEN)?,
        })
    }
}

/// Input for [`Sku::create`].
#[derive(Debug, Clone)]
pub struct NewSku {
    pub product_id: ProductId,
    pub code: String,
    pub name: String,
    pub base_price: Money,
    pub sale_price: Option<Money>,
    pub stock: u32,
    pub attributes: SkuAttributes,
    pub display_order: u32,
}

impl NewSku {
    /// Starts a SKU definition with no stock, sale price or attributes.
    pub fn new(
        product_id: ProductId,
        code: impl Into<String>,
        name: impl Into<String>,
        base_price: Money,
    ) -> Self {
        Self {
            product_id,
            code: code.into(),
            name: name.into(),
            base_price,
            sale_price: None,
            stock: 0,
            attributes: SkuAttributes::default(),
            display_order: 0,
        }
    }

    /// Sets the initial quantity on hand.
    pub fn with_stock(mut self, stock: u32) -> Self {
        self.stock = stock;
        self
    }

    /// Sets the initial sale price.
    pub fn with_sale_price(mut self, sale_price: Money) -> Self {
        self.sale_price = Some(sale_price);
        self
    }

    /// Sets the variant attributes.
    pub fn with_attributes(mut self, attributes: SkuAttributes) -> Self {
        self.attributes = attributes;
        self
    }

    /// Sets the display order within the product.
    pub fn with_display_order(mut self, display_order: u32) -> Self {
        self.display_order = display_order;
        self
    }
}

/// A purchasable product variant owning its stock and pricing.
///
/// Invariant: when a sale price is set it is strictly below the base price.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "SkuRecord")]
pub struct Sku {
    id: SkuId,
    product_id: ProductId,
    code: String,
    name: String,
    attributes: SkuAttributes,
    base_price: Money,
    sale_price: Option<Money>,
    stock: Stock,
    status: SkuStatus,
    display_order: u32,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(Deserialize)]
struct SkuRecord {
    id: SkuId,
    product_id: ProductId,
    code: String,
    name: String,
    attributes: SkuAttributes,
    base_price: Money,
    sale_price: Option<Money>,
    stock: Stock,
    status: SkuStatus,
    display_order: u32,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<SkuRecord> for Sku {
    type Error = DomainError;

    fn try_from(record: SkuRecord) -> Result<Self, Self::Error> {
        let mut sku = Self {
            id: record.id,
            product_id: record.product_id,
            code: validate_code(&record.code)?,
            name: require_text("SKU name", &record.name, MAX_NAME_LEN)?,
            attributes: record.attributes.validated()?,
            base_price: validate_base_price(record.base_price)?,
            sale_price: None,
            stock: record.stock,
            status: record.status,
            display_order: record.display_order,
            created_at: record.created_at,
            updated_at: record.updated_at,
        };
        if let Some(sale_price) = record.sale_price {
            check_sale_price(sale_price, sku.base_price)?;
            sku.sale_price = Some(sale_price);
        }
        Ok(sku)
    }
}

impl Sku {
    /// Validates the definition and creates an active SKU with a fresh id.
    pub fn create(new: NewSku) -> Result<Self, DomainError> {
        let code = validate_code(&new.code)?;
        let name = require_text("SKU name", &new.name, MAX_NAME_LEN)?;
        let base_price = validate_base_price(new.base_price)?;
        let now = Utc::now();
        let mut sku = Self {
            id: SkuId::generate(),
            product_id: new.product_id,
            code,
            name,
            attributes: new.attributes.validated()?,
            base_price,
            sale_price: None,
            stock: Stock::with_total(new.stock),
            status: SkuStatus::Active,
            display_order: new.display_order,
            created_at: now,
            updated_at: now,
        };
        if let Some(sale_price) = new.sale_price {
            sku.set_sale_price(sale_price)?;
        }
        Ok(sku)
    }

    pub fn id(&self) -> SkuId {
        self.id
    }

    pub fn product_id(&self) -> ProductId {
        self.product_id
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn attributes(&self) -> &SkuAttributes {
        &self.attributes
    }

    pub fn base_price(&self) -> Money {
        self.base_price
    }

    pub fn sale_price(&self) -> Option<Money> {
        self.sale_price
    }

    pub fn stock(&self) -> &Stock {
        &self.stock
    }

    pub fn status(&self) -> SkuStatus {
        self.status
    }

    pub fn display_order(&self) -> u32 {
        self.display_order
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Returns true if the SKU is active and has stock available.
    pub fn is_purchasable(&self) -> bool {
        self.status == SkuStatus::Active && !self.stock.is_out_of_stock()
    }

    /// Returns the sale price when set, otherwise the base price.
    pub fn current_price(&self) -> Money {
        self.sale_price.unwrap_or(self.base_price)
    }

    pub fn is_on_sale(&self) -> bool {
        self.sale_price.is_some()
    }

    /// Discount shown to shoppers, in whole percent rounded half-up.
    ///
    /// Returns `None` when the SKU is not on sale.
    pub fn discount_percentage(&self) -> Option<u32> {
        let sale = self.sale_price?.amount();
        let base = self.base_price.amount();
        let percent = (200 * base.checked_sub(sale)? + base) / (2 * base);
        u32::try_from(percent).ok()
    }

    pub fn available_quantity(&self) -> u32 {
        self.stock.available()
    }

    pub fn is_low_stock(&self, threshold: u32) -> bool {
        self.stock.is_low_stock(threshold)
    }

    pub fn is_out_of_stock(&self) -> bool {
        self.stock.is_out_of_stock()
    }
}

// Mutators
impl Sku {
    /// Puts the SKU on sale. The sale price must be positive and below the base price.
    pub fn set_sale_price(&mut self, sale_price: Money) -> Result<(), DomainError> {
        check_sale_price(sale_price, self.base_price)?;
        self.sale_price = Some(sale_price);
        self.touch();
        Ok(())
    }

    /// Ends the sale.
    pub fn clear_sale_price(&mut self) {
        self.sale_price = None;
        self.touch();
    }

    /// Changes the base price; an active sale price must stay below it.
    pub fn change_base_price(&mut self, base_price: Money) -> Result<(), DomainError> {
        let base_price = validate_base_price(base_price)?;
        if let Some(sale_price) = self.sale_price.filter(|sale| *sale >= base_price) {
            return Err(DomainError::rule(format!(
                "base price {base_price} must stay above sale price {sale_price}"
            )));
        }
        self.base_price = base_price;
        self.touch();
        Ok(())
    }

    pub fn rename(&mut self, name: &str) -> Result<(), DomainError> {
        self.name = require_text("SKU name", name, MAX_NAME_LEN)?;
        self.touch();
        Ok(())
    }

    pub fn set_attributes(&mut self, attributes: SkuAttributes) -> Result<(), DomainError> {
        self.attributes = attributes.validated()?;
        self.touch();
        Ok(())
    }

    pub fn set_display_order(&mut self, display_order: u32) {
        self.display_order = display_order;
        self.touch();
    }

    /// Reserves stock for a purchase. Fails first if the SKU is not purchasable.
    pub fn reserve_stock(&mut self, quantity: u32) -> Result<(), DomainError> {
        if !self.is_purchasable() {
            return Err(DomainError::NotPurchasable {
                sku: self.code.clone(),
            });
        }
        self.stock.reserve(quantity)?;
        self.touch();
        Ok(())
    }

    pub fn release_stock(&mut self, quantity: u32) -> Result<(), DomainError> {
        self.stock.release_reservation(quantity)?;
        self.touch();
        Ok(())
    }

    pub fn adjust_stock(&mut self, delta: i64) -> Result<(), DomainError> {
        self.stock.adjust(delta)?;
        self.touch();
        Ok(())
    }

    /// Removes reserved units from stock once they have left the warehouse.
    pub fn fulfil_reserved(&mut self, quantity: u32) -> Result<(), DomainError> {
        let mut stock = self.stock;
        stock.release_reservation(quantity)?;
        stock.adjust(-i64::from(quantity))?;
        self.stock = stock;
        self.touch();
        Ok(())
    }

    pub fn activate(&mut self) {
        self.set_status(SkuStatus::Active);
    }

    pub fn deactivate(&mut self) {
        self.set_status(SkuStatus::Inactive);
    }

    pub fn discontinue(&mut self) {
        self.set_status(SkuStatus::Discontinued);
    }

    fn set_status(&mut self, status: SkuStatus) {
        self.status = status;
        self.touch();
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

fn validate_base_price(base_price: Money) -> Result<Money, DomainError> {
    if !base_price.is_positive() {
        return Err(DomainError::invalid_field(
            "base price",
            "must be greater than 0",
        ));
    }
    Ok(base_price)
}

fn check_sale_price(sale_price: Money, base_price: Money) -> Result<(), DomainError> {
    if !sale_price.is_positive() {
        return Err(DomainError::invalid_field(
            "sale price",
            "must be greater than 0",
        ));
    }
    if sale_price >= base_price {
        return Err(DomainError::invalid_field(
            "sale price",
            format!("{sale_price} must be lower than base price {base_price}"),
        ));
    }
    Ok(())
}

fn validate_code(code: &str) -> Result<String, DomainError> {
    let code = require_text("SKU code", code, MAX_CODE_LEN)?;
    if !code
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(DomainError::invalid_field(
            "SKU code",
            format!("'{code}' may only contain letters, digits, '-' and '_'"),
        ));
    }
    Ok(code)
}
