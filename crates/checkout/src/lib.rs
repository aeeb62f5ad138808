//! Checkout application layer.
//!
//! Turns client requests into priced carts and placed orders:
//! 1. Validate the request shape
//! 2. Resolve SKUs and methods through the catalog ports
//! 3. Enforce purchasability, stock and method rules
//! 4. Price with the domain model, then reserve stock and store the order
//!
//! The ports are async traits with in-memory implementations, so the
//! services run unchanged against a database-backed catalog or repository.

pub mod cart;
pub mod config;
pub mod error;
pub mod orders;
pub mod ports;
pub mod requests;
mod resolve;
pub mod telemetry;

pub use cart::CartService;
pub use config::CheckoutConfig;
pub use error::CheckoutError;
pub use orders::OrderService;
pub use ports::{
    InMemoryCatalog, InMemoryMethodCatalog, InMemoryOrderRepository, MethodCatalog,
    OrderRepository, SkuCatalog, SkuSummary,
};
pub use requests::{
    AddressRequest, CalculateCartRequest, CartCalculation, CartLine, CreateOrderRequest,
    CustomerRequest, LineRequest,
};
