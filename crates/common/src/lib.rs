//! Shared types for the storefront workspace.
//!
//! Every identifier is a validated newtype: a malformed value never exists,
//! construction fails with [`IdentifierError`] instead.

pub mod error;
pub mod ids;

pub use error::IdentifierError;
pub use ids::{
    CategoryId, ColorId, CustomerId, DeliveryInfoId, OrderId, PaymentMethodId, ProductId,
    ShippingMethodId, SkuId,
};
