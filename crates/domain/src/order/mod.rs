//! Order aggregate and related types.

mod aggregate;
mod number;
mod status;
mod value_objects;

pub use aggregate::{MAX_NOTES_LEN, NewOrder, Order};
pub use number::{MAX_ORDER_SEQUENCE, OrderNumber};
pub use status::OrderStatus;
pub use value_objects::{
    OrderItem, OrderPricing, OrderTimestamps, PaymentInfo, ShippingInfo,
};
