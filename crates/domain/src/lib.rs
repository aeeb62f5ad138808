//! Domain layer for the storefront.
//!
//! This crate provides the pricing and ordering core:
//! - `Money` with exact tax and rounding rules
//! - Catalog entities (`Product`, `Sku`, `Stock`, `Color`)
//! - Customer value objects and shipping/payment methods
//! - The transient `Cart` aggregate
//! - The `Order` aggregate with its status machine
//!
//! Everything here is synchronous and free of I/O.

pub mod cart;
pub mod catalog;
pub mod customer;
pub mod error;
pub mod methods;
pub mod money;
pub mod order;

pub use cart::{Cart, CartItem, MAX_ITEM_QUANTITY};
pub use catalog::{
    Color, DEFAULT_LOW_STOCK_THRESHOLD, NewProduct, NewSku, PriceRange, Product, ProductImage,
    Sku, SkuAttributes, SkuStatus, Stock,
};
pub use customer::{Address, CustomerInfo, Email, PhoneNumber};
pub use error::DomainError;
pub use methods::{PaymentMethod, ShippingMethod};
pub use money::{MAX_SAFE_INTEGER, Money, MoneyError, TAX_RATE_PERCENT};
pub use order::{
    MAX_NOTES_LEN, MAX_ORDER_SEQUENCE, NewOrder, Order, OrderItem, OrderNumber, OrderPricing,
    OrderStatus, OrderTimestamps, PaymentInfo, ShippingInfo,
};

/// Re-export of the decimal type used for price factors.
pub use rust_decimal::Decimal;
