//! Request and response records for the checkout services.

use common::{ColorId, ProductId, SkuId};
use domain::{Color, Money};
use serde::{Deserialize, Serialize};

// -- Request types --

/// One requested line: a SKU id as sent by the client and a quantity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LineRequest {
    pub sku_id: String,
    pub quantity: u32,
}

impl LineRequest {
    pub fn new(sku_id: impl Into<String>, quantity: u32) -> Self {
        Self {
            sku_id: sku_id.into(),
            quantity,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalculateCartRequest {
    pub items: Vec<LineRequest>,
    pub shipping_method_id: String,
    pub payment_method_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomerRequest {
    #[serde(default)]
    pub customer_id: Option<String>,
    pub name: String,
    pub email: String,
    pub phone: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddressRequest {
    pub postal_code: String,
    pub prefecture: String,
    pub city: String,
    pub street: String,
    #[serde(default)]
    pub building: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateOrderRequest {
    pub items: Vec<LineRequest>,
    pub customer: CustomerRequest,
    pub shipping_address: AddressRequest,
    pub shipping_method_id: String,
    pub payment_method_id: String,
    #[serde(default)]
    pub notes: Option<String>,
}

// -- Response types --

/// Price breakdown of a cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CartCalculation {
    pub items: Vec<CartLine>,
    pub total_quantity: u32,
    pub subtotal: Money,
    pub shipping_fee: Money,
    pub payment_fee: Money,
    pub tax_amount: Money,
    pub total: Money,
}

/// One cart line, one per distinct SKU, in first-requested order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CartLine {
    pub sku_id: SkuId,
    pub product_id: ProductId,
    pub product_name: String,
    pub sku_name: String,
    pub unit_price: Money,
    pub quantity: u32,
    pub subtotal: Money,
    pub color_id: Option<ColorId>,
    pub color: Option<Color>,
    pub dimensions: Option<String>,
    pub material: Option<String>,
}
