//! Cart line item.

use common::{ProductId, SkuId};
use serde::{Deserialize, Serialize};

use crate::error::{DomainError, require_text};
use crate::money::Money;

/// Largest quantity a single cart line may hold.
pub const MAX_ITEM_QUANTITY: u32 = 999;

const MAX_PRODUCT_NAME_LEN: usize = 200;

/// One SKU in a cart with its quantity and unit price.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    sku_id: SkuId,
    product_id: ProductId,
    product_name: String,
    unit_price: Money,
    quantity: u32,
}

impl CartItem {
    pub fn new(
        sku_id: SkuId,
        product_id: ProductId,
        product_name: &str,
        unit_price: Money,
        quantity: u32,
    ) -> Result<Self, DomainError> {
        if !unit_price.is_positive() {
            return Err(DomainError::invalid_field(
                "unit price",
                "must be greater than 0",
            ));
        }
        Ok(Self {
            sku_id,
            product_id,
            product_name: require_text("product name", product_name, MAX_PRODUCT_NAME_LEN)?,
            unit_price,
            quantity: validate_quantity(quantity)?,
        })
    }

    pub fn sku_id(&self) -> SkuId {
        self.sku_id
    }

    pub fn product_id(&self) -> ProductId {
        self.product_id
    }

    pub fn product_name(&self) -> &str {
        &self.product_name
    }

    pub fn unit_price(&self) -> Money {
        self.unit_price
    }

    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    /// Returns `unit_price * quantity`.
    pub fn subtotal(&self) -> Result<Money, DomainError> {
        Ok(self.unit_price.times(self.quantity)?)
    }

    /// Sets the quantity, which must stay within `1..=MAX_ITEM_QUANTITY`.
    pub fn set_quantity(&mut self, quantity: u32) -> Result<(), DomainError> {
        self.quantity = validate_quantity(quantity)?;
        Ok(())
    }

    /// Adds `additional` units to the line.
    pub fn increase_quantity(&mut self, additional: u32) -> Result<(), DomainError> {
        let combined = self.quantity.saturating_add(additional);
        self.set_quantity(combined)
    }
}

fn validate_quantity(quantity: u32) -> Result<u32, DomainError> {
    if quantity == 0 || quantity > MAX_ITEM_QUANTITY {
        return Err(DomainError::invalid_field(
            "quantity",
            format!("{quantity} must be between 1 and {MAX_ITEM_QUANTITY}"),
        ));
    }
    Ok(quantity)
}
