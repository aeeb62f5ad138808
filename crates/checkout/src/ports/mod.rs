//! Collaborator ports and in-memory implementations.

pub mod catalog;
pub mod methods;
pub mod orders;

pub use catalog::{InMemoryCatalog, SkuCatalog, SkuSummary};
pub use methods::{InMemoryMethodCatalog, MethodCatalog};
pub use orders::{InMemoryOrderRepository, OrderRepository};
