//! Product catalog: products, their SKUs, stock and colors.

mod color;
mod product;
mod sku;
mod stock;

pub use color::Color;
pub use product::{NewProduct, PriceRange, Product, ProductImage};
pub use sku::{NewSku, Sku, SkuAttributes, SkuStatus};
pub use stock::{DEFAULT_LOW_STOCK_THRESHOLD, Stock};
