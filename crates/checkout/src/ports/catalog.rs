//! SKU catalog port and in-memory implementation.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use common::{ColorId, ProductId, SkuId};
use domain::{Color, DomainError, Money, Product, Sku, Stock};
use tokio::sync::RwLock;

use crate::error::{CheckoutError, Result};

/// Read model of a SKU as needed for pricing and stock checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkuSummary {
    pub id: SkuId,
    pub product_id: ProductId,
    pub product_name: String,
    pub sku_code: String,
    pub sku_name: String,
    pub current_price: Money,
    pub is_purchasable: bool,
    pub available_stock: u32,
    pub color_id: Option<ColorId>,
    /// The swatch behind `color_id`, when the catalog knows it.
    pub color: Option<Color>,
    pub dimensions: Option<String>,
    pub material: Option<String>,
}

impl SkuSummary {
    pub fn from_sku(product: &Product, sku: &Sku, color: Option<&Color>) -> Self {
        let attributes = sku.attributes();
        Self {
            id: sku.id(),
            product_id: product.id(),
            product_name: product.name().to_string(),
            sku_code: sku.code().to_string(),
            sku_name: sku.name().to_string(),
            current_price: sku.current_price(),
            is_purchasable: sku.is_purchasable(),
            available_stock: sku.available_quantity(),
            color_id: attributes.color_id,
            color: color.cloned(),
            dimensions: attributes.dimensions.clone(),
            material: attributes.material.clone(),
        }
    }
}

/// Access to SKU data and stock reservations.
///
/// Implementations must make `reserve` atomic per SKU: the availability
/// check and the reservation happen under one lock or transaction.
#[async_trait]
pub trait SkuCatalog: Send + Sync {
    /// Looks up SKUs in one batch. Unknown ids are simply absent from the result.
    async fn find_summaries(&self, sku_ids: &[SkuId]) -> Result<Vec<SkuSummary>>;

    /// Reserves units and returns the stock after the reservation.
    async fn reserve(&self, sku_id: SkuId, quantity: u32) -> Result<Stock>;

    /// Returns previously reserved units to availability.
    ///
    /// All lines are released or none are.
    async fn release(&self, lines: &[(SkuId, u32)]) -> Result<()>;

    /// Removes reserved units from stock once they have shipped.
    ///
    /// All lines are fulfilled or none are.
    async fn fulfil(&self, lines: &[(SkuId, u32)]) -> Result<()>;
}

#[derive(Debug, Default)]
struct InMemoryCatalogState {
    products: HashMap<ProductId, Product>,
    sku_index: HashMap<SkuId, ProductId>,
    colors: HashMap<ColorId, Color>,
    failing_reservations: HashSet<SkuId>,
}

impl InMemoryCatalogState {
    fn product_id_of(&self, sku_id: SkuId) -> Result<ProductId> {
        self.sku_index
            .get(&sku_id)
            .copied()
            .ok_or_else(|| CheckoutError::NotFound {
                entity: "SKU",
                id: sku_id.to_string(),
            })
    }

    fn update_sku<T, F>(&mut self, sku_id: SkuId, f: F) -> Result<T>
    where
        F: FnOnce(&mut Sku) -> std::result::Result<T, DomainError>,
    {
        let product_id = self.product_id_of(sku_id)?;
        let product = self
            .products
            .get_mut(&product_id)
            .ok_or_else(|| CheckoutError::NotFound {
                entity: "SKU",
                id: sku_id.to_string(),
            })?;
        product
            .update_sku(sku_id, f)
            .map_err(|err| CheckoutError::for_sku(sku_id, err))
    }

    /// Applies `f` to every line, restoring the touched products if any line fails.
    fn update_all<F>(&mut self, lines: &[(SkuId, u32)], f: F) -> Result<()>
    where
        F: Fn(&mut Sku, u32) -> std::result::Result<(), DomainError>,
    {
        let mut backup: HashMap<ProductId, Product> = HashMap::new();
        for (sku_id, _) in lines {
            let product_id = self.product_id_of(*sku_id)?;
            if let Some(product) = self.products.get(&product_id) {
                backup
                    .entry(product_id)
                    .or_insert_with(|| product.clone());
            }
        }

        for (sku_id, quantity) in lines {
            if let Err(err) = self.update_sku(*sku_id, |sku| f(sku, *quantity)) {
                self.products.extend(backup);
                return Err(err);
            }
        }
        Ok(())
    }
}

/// In-memory catalog backed by `Product` aggregates.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCatalog {
    state: Arc<RwLock<InMemoryCatalogState>>,
}

impl InMemoryCatalog {
    /// Creates an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces a product and indexes its SKUs.
    pub async fn insert_product(&self, product: Product) {
        let mut guard = self.state.write().await;
        let state = &mut *guard;
        if let Some(previous) = state.products.get(&product.id()) {
            for sku in previous.skus() {
                state.sku_index.remove(&sku.id());
            }
        }
        for sku in product.skus() {
            state.sku_index.insert(sku.id(), product.id());
        }
        state.products.insert(product.id(), product);
    }

    /// Adds or replaces a color swatch.
    pub async fn add_color(&self, color: Color) {
        self.state.write().await.colors.insert(color.id(), color);
    }

    /// Returns a copy of a SKU.
    pub async fn sku(&self, sku_id: SkuId) -> Option<Sku> {
        let state = self.state.read().await;
        let product_id = state.sku_index.get(&sku_id)?;
        state.products.get(product_id)?.sku(sku_id).cloned()
    }

    /// Applies a catalog edit such as a price change to one SKU.
    pub async fn update_sku<T, F>(&self, sku_id: SkuId, f: F) -> Result<T>
    where
        F: FnOnce(&mut Sku) -> std::result::Result<T, DomainError>,
    {
        self.state.write().await.update_sku(sku_id, f)
    }

    /// Makes every future reservation of `sku_id` fail.
    pub async fn fail_reservations_for(&self, sku_id: SkuId) {
        self.state.write().await.failing_reservations.insert(sku_id);
    }
}

#[async_trait]
impl SkuCatalog for InMemoryCatalog {
    async fn find_summaries(&self, sku_ids: &[SkuId]) -> Result<Vec<SkuSummary>> {
        let state = self.state.read().await;
        let summaries = sku_ids
            .iter()
            .filter_map(|sku_id| {
                let product = state.products.get(state.sku_index.get(sku_id)?)?;
                let sku = product.sku(*sku_id)?;
                let color = sku
                    .attributes()
                    .color_id
                    .and_then(|color_id| state.colors.get(&color_id));
                Some(SkuSummary::from_sku(product, sku, color))
            })
            .collect();
        Ok(summaries)
    }

    async fn reserve(&self, sku_id: SkuId, quantity: u32) -> Result<Stock> {
        let mut state = self.state.write().await;
        if state.failing_reservations.contains(&sku_id) {
            return Err(CheckoutError::Repository(format!(
                "reservation for SKU {sku_id} rejected by inventory"
            )));
        }
        state.update_sku(sku_id, |sku| {
            sku.reserve_stock(quantity)?;
            Ok(*sku.stock())
        })
    }

    async fn release(&self, lines: &[(SkuId, u32)]) -> Result<()> {
        self.state
            .write()
            .await
            .update_all(lines, |sku, quantity| sku.release_stock(quantity))
    }

    async fn fulfil(&self, lines: &[(SkuId, u32)]) -> Result<()> {
        self.state
            .write()
            .await
            .update_all(lines, |sku, quantity| sku.fulfil_reserved(quantity))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::CategoryId;
    use domain::{NewProduct, NewSku, SkuAttributes};

    fn yen(amount: u64) -> Money {
        Money::from_yen(amount).unwrap()
    }

    async fn seeded_catalog(stock: u32) -> (InMemoryCatalog, SkuId) {
        let mut product = Product::create(NewProduct {
            name: "Sofa".to_string(),
            description: String::new(),
            category_id: CategoryId::generate(),
        })
        .unwrap();
        let sku = Sku::create(NewSku::new(product.id(), "SOFA-GRY", "Grey", yen(50_000)).with_stock(stock))
            .unwrap();
        let sku_id = sku.id();
        product.add_sku(sku).unwrap();

        let catalog = InMemoryCatalog::new();
        catalog.insert_product(product).await;
        (catalog, sku_id)
    }

    #[tokio::test]
    async fn test_find_summaries_skips_unknown_ids() {
        let (catalog, sku_id) = seeded_catalog(5).await;
        let summaries = catalog
            .find_summaries(&[sku_id, SkuId::generate()])
            .await
            .unwrap();

        assert_eq!(summaries.len(), 1);
        let summary = &summaries[0];
        assert_eq!(summary.product_name, "Sofa");
        assert_eq!(summary.sku_code, "SOFA-GRY");
        assert_eq!(summary.current_price, yen(50_000));
        assert_eq!(summary.available_stock, 5);
        assert!(summary.is_purchasable);
    }

    #[tokio::test]
    async fn test_reserve_release_and_fulfil() {
        let (catalog, sku_id) = seeded_catalog(5).await;

        let stock = catalog.reserve(sku_id, 3).await.unwrap();
        assert_eq!(stock.available(), 2);

        catalog.release(&[(sku_id, 1)]).await.unwrap();
        catalog.fulfil(&[(sku_id, 2)]).await.unwrap();

        let sku = catalog.sku(sku_id).await.unwrap();
        assert_eq!(sku.stock().total(), 3);
        assert_eq!(sku.stock().reserved(), 0);
    }

    #[tokio::test]
    async fn test_reserve_beyond_availability() {
        let (catalog, sku_id) = seeded_catalog(3).await;
        let err = catalog.reserve(sku_id, 5).await.unwrap_err();
        assert!(matches!(
            err,
            CheckoutError::InsufficientStock {
                requested: 5,
                available: 3,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_unknown_sku_is_not_found() {
        let (catalog, _) = seeded_catalog(3).await;
        let err = catalog.reserve(SkuId::generate(), 1).await.unwrap_err();
        assert!(matches!(err, CheckoutError::NotFound { entity: "SKU", .. }));
    }

    #[tokio::test]
    async fn test_concurrent_reservations_never_oversell() {
        let (catalog, sku_id) = seeded_catalog(10).await;

        let handles: Vec<_> = (0..20)
            .map(|_| {
                let catalog = catalog.clone();
                tokio::spawn(async move { catalog.reserve(sku_id, 1).await })
            })
            .collect();

        let mut succeeded = 0;
        for handle in handles {
            if handle.await.unwrap().is_ok() {
                succeeded += 1;
            }
        }

        assert_eq!(succeeded, 10);
        let sku = catalog.sku(sku_id).await.unwrap();
        assert_eq!(sku.stock().reserved(), 10);
        assert!(sku.is_out_of_stock());
    }

    #[tokio::test]
    async fn test_fail_reservations_for() {
        let (catalog, sku_id) = seeded_catalog(3).await;
        catalog.fail_reservations_for(sku_id).await;
        assert!(matches!(
            catalog.reserve(sku_id, 1).await,
            Err(CheckoutError::Repository(_))
        ));
    }

    #[tokio::test]
    async fn test_release_is_all_or_nothing() {
        let (catalog, sku_id) = seeded_catalog(5).await;
        catalog.reserve(sku_id, 2).await.unwrap();

        let err = catalog
            .release(&[(sku_id, 1), (sku_id, 2)])
            .await
            .unwrap_err();
        assert!(matches!(err, CheckoutError::Domain(_)));
        assert_eq!(catalog.sku(sku_id).await.unwrap().stock().reserved(), 2);

        assert!(catalog
            .fulfil(&[(sku_id, 1), (SkuId::generate(), 1)])
            .await
            .is_err());
        assert_eq!(catalog.sku(sku_id).await.unwrap().stock().total(), 5);
    }

    #[tokio::test]
    async fn test_summaries_resolve_known_colors() {
        let walnut = ColorId::new(4).unwrap();
        let mut product = Product::create(NewProduct {
            name: "Side table".to_string(),
            description: String::new(),
            category_id: CategoryId::generate(),
        })
        .unwrap();
        let sku = Sku::create(
            NewSku::new(product.id(), "TABLE-WAL", "Walnut", yen(18_000))
                .with_stock(2)
                .with_attributes(SkuAttributes {
                    color_id: Some(walnut),
                    ..SkuAttributes::default()
                }),
        )
        .unwrap();
        let sku_id = sku.id();
        product.add_sku(sku).unwrap();

        let catalog = InMemoryCatalog::new();
        catalog.insert_product(product).await;

        let before = catalog.find_summaries(&[sku_id]).await.unwrap();
        assert_eq!(before[0].color_id, Some(walnut));
        assert_eq!(before[0].color, None);

        catalog
            .add_color(Color::new(walnut, "Walnut", "#5d4037").unwrap())
            .await;
        let after = catalog.find_summaries(&[sku_id]).await.unwrap();
        let color = after[0].color.as_ref().unwrap();
        assert_eq!(color.name(), "Walnut");
        assert_eq!(color.hex(), "#5D4037");
    }
}
