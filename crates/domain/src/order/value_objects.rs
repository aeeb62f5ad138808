//! Immutable snapshots captured when an order is created.

use chrono::{DateTime, Utc};
use common::{PaymentMethodId, ProductId, ShippingMethodId, SkuId};
use serde::{Deserialize, Serialize};

use crate::customer::Address;
use crate::error::{DomainError, require_text};
use crate::methods::{PaymentMethod, ShippingMethod};
use crate::money::Money;

const MAX_NAME_LEN: usize = 200;

/// A line of an order with the price frozen at creation time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "OrderItemRecord")]
pub struct OrderItem {
    sku_id: SkuId,
    product_id: ProductId,
    product_name: String,
    sku_name: String,
    unit_price: Money,
    quantity: u32,
}

#[derive(Deserialize)]
struct OrderItemRecord {
    sku_id: SkuId,
    product_id: ProductId,
    product_name: String,
    sku_name: String,
    unit_price: Money,
    quantity: u32,
}

impl TryFrom<OrderItemRecord> for OrderItem {
    type Error = DomainError;

    fn try_from(record: OrderItemRecord) -> Result<Self, Self::Error> {
        OrderItem::new(
            record.sku_id,
            record.product_id,
            &record.product_name,
            &record.sku_name,
            record.unit_price,
            record.quantity,
        )
    }
}

impl OrderItem {
    pub fn new(
        sku_id: SkuId,
        product_id: ProductId,
        product_name: &str,
        sku_name: &str,
        unit_price: Money,
        quantity: u32,
    ) -> Result<Self, DomainError> {
        if !unit_price.is_positive() {
            return Err(DomainError::invalid_field(
                "unit price",
                "must be greater than 0",
            ));
        }
        if quantity == 0 {
            return Err(DomainError::invalid_field(
                "quantity",
                "must be greater than 0",
            ));
        }
        Ok(Self {
            sku_id,
            product_id,
            product_name: require_text("product name", product_name, MAX_NAME_LEN)?,
            sku_name: require_text("SKU name", sku_name, MAX_NAME_LEN)?,
            unit_price,
            quantity,
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

    pub fn sku_name(&self) -> &str {
        &self.sku_name
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
}

/// Price breakdown of an order, computed once at creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderPricing {
    subtotal: Money,
    shipping_fee: Money,
    payment_fee: Money,
    tax_amount: Money,
    total: Money,
}

impl OrderPricing {
    /// Taxes `subtotal + shipping_fee + payment_fee`, rounding the total up.
    pub fn calculate(
        subtotal: Money,
        shipping_fee: Money,
        payment_fee: Money,
    ) -> Result<Self, DomainError> {
        let pre_tax = Money::sum([subtotal, shipping_fee, payment_fee])?;
        let total = pre_tax.with_tax()?;
        let tax_amount = total.subtract(pre_tax)?;
        Ok(Self {
            subtotal,
            shipping_fee,
            payment_fee,
            tax_amount,
            total,
        })
    }

    pub fn subtotal(&self) -> Money {
        self.subtotal
    }

    pub fn shipping_fee(&self) -> Money {
        self.shipping_fee
    }

    pub fn payment_fee(&self) -> Money {
        self.payment_fee
    }

    pub fn tax_amount(&self) -> Money {
        self.tax_amount
    }

    pub fn total(&self) -> Money {
        self.total
    }
}

/// Shipping method and destination as chosen at checkout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShippingInfo {
    method_id: ShippingMethodId,
    method_name: String,
    fee: Money,
    address: Address,
}

impl ShippingInfo {
    /// Snapshots an active shipping method.
    pub fn from_method(method: &ShippingMethod, address: Address) -> Result<Self, DomainError> {
        if !method.is_active {
            return Err(DomainError::rule(format!(
                "shipping method {} is not active",
                method.id
            )));
        }
        Ok(Self {
            method_id: method.id.clone(),
            method_name: method.name.clone(),
            fee: method.fee,
            address,
        })
    }

    pub fn method_id(&self) -> &ShippingMethodId {
        &self.method_id
    }

    pub fn method_name(&self) -> &str {
        &self.method_name
    }

    pub fn fee(&self) -> Money {
        self.fee
    }

    pub fn address(&self) -> &Address {
        &self.address
    }
}

/// Payment method as chosen at checkout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentInfo {
    method_id: PaymentMethodId,
    method_name: String,
    fee: Money,
}

impl PaymentInfo {
    /// Snapshots an active payment method.
    pub fn from_method(method: &PaymentMethod) -> Result<Self, DomainError> {
        if !method.is_active {
            return Err(DomainError::rule(format!(
                "payment method {} is not active",
                method.id
            )));
        }
        Ok(Self {
            method_id: method.id.clone(),
            method_name: method.name.clone(),
            fee: method.fee,
        })
    }

    pub fn method_id(&self) -> &PaymentMethodId {
        &self.method_id
    }

    pub fn method_name(&self) -> &str {
        &self.method_name
    }

    pub fn fee(&self) -> Money {
        self.fee
    }
}

/// Lifecycle timestamps of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderTimestamps {
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub paid_at: Option<DateTime<Utc>>,
    pub shipped_at: Option<DateTime<Utc>>,
    pub delivered_at: Option<DateTime<Utc>>,
    pub cancelled_at: Option<DateTime<Utc>>,
}

impl OrderTimestamps {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            created_at: now,
            updated_at: now,
            paid_at: None,
            shipped_at: None,
            delivered_at: None,
            cancelled_at: None,
        }
    }
}
