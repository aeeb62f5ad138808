//! Product aggregate owning its SKUs.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use common::{CategoryId, ProductId, SkuId};
use serde::{Deserialize, Serialize};

use crate::error::{DomainError, optional_text, require_text};
use crate::money::Money;

use super::sku::Sku;

const MAX_NAME_LEN: usize = 200;
const MAX_DESCRIPTION_LEN: usize = 5000;
const MAX_TAG_LEN: usize = 50;
const MAX_URL_LEN: usize = 2048;

/// Input for [`Product::create`].
#[derive(Debug, Clone)]
pub struct NewProduct {
    pub name: String,
    pub description: String,
    pub category_id: CategoryId,
}

/// An image shown on the product page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductImage {
    pub url: String,
    pub alt_text: Option<String>,
}

/// Lowest and highest current price across purchasable SKUs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceRange {
    pub min: Money,
    pub max: Money,
}

/// Product aggregate root.
///
/// Every owned SKU carries this product's id, and SKU codes are unique within
/// the product. A product only reports itself available while it is
/// published and at least one SKU is purchasable.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "ProductRecord")]
pub struct Product {
    id: ProductId,
    name: String,
    description: String,
    category_id: CategoryId,
    is_best_seller: bool,
    is_quick_ship: bool,
    is_published: bool,
    skus: HashMap<SkuId, Sku>,
    images: Vec<ProductImage>,
    tags: Vec<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(Deserialize)]
struct ProductRecord {
    id: ProductId,
    name: String,
    description: String,
    category_id: CategoryId,
    is_best_seller: bool,
    is_quick_ship: bool,
    is_published: bool,
    skus: HashMap<SkuId, Sku>,
    images: Vec<ProductImage>,
    tags: Vec<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<ProductRecord> for Product {
    type Error = DomainError;

    fn try_from(record: ProductRecord) -> Result<Self, Self::Error> {
        let mut product = Self {
            id: record.id,
            name: require_text("product name", &record.name, MAX_NAME_LEN)?,
            description: validate_description(&record.description)?,
            category_id: record.category_id,
            is_best_seller: record.is_best_seller,
            is_quick_ship: record.is_quick_ship,
            is_published: record.is_published,
            skus: HashMap::with_capacity(record.skus.len()),
            images: Vec::with_capacity(record.images.len()),
            tags: Vec::with_capacity(record.tags.len()),
            created_at: record.created_at,
            updated_at: record.updated_at,
        };
        for (key, sku) in record.skus {
            if key != sku.id() {
                return Err(DomainError::rule(format!(
                    "SKU {} is stored under id {key}",
                    sku.id()
                )));
            }
            product.add_sku(sku)?;
        }
        for image in &record.images {
            product.add_image(&image.url, image.alt_text.as_deref())?;
        }
        for tag in &record.tags {
            product.add_tag(tag)?;
        }
        product.updated_at = record.updated_at;
        Ok(product)
    }
}

impl Product {
    /// Creates an unpublished product without SKUs.
    pub fn create(new: NewProduct) -> Result<Self, DomainError> {
        let name = require_text("product name", &new.name, MAX_NAME_LEN)?;
        let description = validate_description(&new.description)?;
        let now = Utc::now();
        Ok(Self {
            id: ProductId::generate(),
            name,
            description,
            category_id: new.category_id,
            is_best_seller: false,
            is_quick_ship: false,
            is_published: false,
            skus: HashMap::new(),
            images: Vec::new(),
            tags: Vec::new(),
            created_at: now,
            updated_at: now,
        })
    }
}

// Query methods
impl Product {
    pub fn id(&self) -> ProductId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn category_id(&self) -> CategoryId {
        self.category_id
    }

    pub fn is_best_seller(&self) -> bool {
        self.is_best_seller
    }

    pub fn is_quick_ship(&self) -> bool {
        self.is_quick_ship
    }

    pub fn is_published(&self) -> bool {
        self.is_published
    }

    /// Returns true if the product is published and can be bought.
    pub fn is_available(&self) -> bool {
        self.is_published && self.has_purchasable_sku()
    }

    pub fn images(&self) -> &[ProductImage] {
        &self.images
    }

    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    pub fn sku(&self, sku_id: SkuId) -> Option<&Sku> {
        self.skus.get(&sku_id)
    }

    pub fn sku_by_code(&self, code: &str) -> Option<&Sku> {
        self.skus.values().find(|sku| sku.code() == code)
    }

    /// Returns all SKUs ordered by display order, then code.
    pub fn skus(&self) -> Vec<&Sku> {
        let mut skus: Vec<&Sku> = self.skus.values().collect();
        skus.sort_by(|a, b| {
            a.display_order()
                .cmp(&b.display_order())
                .then_with(|| a.code().cmp(b.code()))
        });
        skus
    }

    pub fn sku_count(&self) -> usize {
        self.skus.len()
    }

    pub fn purchasable_skus(&self) -> Vec<&Sku> {
        self.skus()
            .into_iter()
            .filter(|sku| sku.is_purchasable())
            .collect()
    }

    pub fn has_purchasable_sku(&self) -> bool {
        self.skus.values().any(Sku::is_purchasable)
    }

    /// Returns the current price range over purchasable SKUs.
    pub fn price_range(&self) -> Option<PriceRange> {
        let prices = self
            .skus
            .values()
            .filter(|sku| sku.is_purchasable())
            .map(Sku::current_price);
        prices.fold(None, |range, price| match range {
            None => Some(PriceRange {
                min: price,
                max: price,
            }),
            Some(PriceRange { min, max }) => Some(PriceRange {
                min: min.min(price),
                max: max.max(price),
            }),
        })
    }

    /// Sum of available units over active SKUs.
    pub fn total_available_stock(&self) -> u64 {
        self.skus
            .values()
            .filter(|sku| sku.status() == super::SkuStatus::Active)
            .map(|sku| u64::from(sku.available_quantity()))
            .sum()
    }

    /// Returns true if any purchasable SKU has a sale price.
    pub fn is_on_sale(&self) -> bool {
        self.skus
            .values()
            .any(|sku| sku.is_purchasable() && sku.is_on_sale())
    }
}

// Command methods
impl Product {
    /// Adds a SKU. It must belong to this product and use an unused code.
    pub fn add_sku(&mut self, sku: Sku) -> Result<(), DomainError> {
        if sku.product_id() != self.id {
            return Err(DomainError::rule(format!(
                "SKU {} belongs to product {}, not {}",
                sku.code(),
                sku.product_id(),
                self.id
            )));
        }
        if self.skus.contains_key(&sku.id()) {
            return Err(DomainError::rule(format!(
                "SKU {} is already part of product {}",
                sku.id(),
                self.id
            )));
        }
        if self.sku_by_code(sku.code()).is_some() {
            return Err(DomainError::rule(format!(
                "SKU code {} is already used by product {}",
                sku.code(),
                self.id
            )));
        }
        self.skus.insert(sku.id(), sku);
        self.touch();
        Ok(())
    }

    /// Removes and returns a SKU.
    pub fn remove_sku(&mut self, sku_id: SkuId) -> Result<Sku, DomainError> {
        let sku = self.skus.remove(&sku_id).ok_or_else(|| DomainError::NotFound {
            entity: "SKU",
            id: sku_id.to_string(),
        })?;
        self.touch();
        Ok(sku)
    }

    /// Runs `f` against one owned SKU, bumping `updated_at` when it succeeds.
    pub fn update_sku<T, F>(&mut self, sku_id: SkuId, f: F) -> Result<T, DomainError>
    where
        F: FnOnce(&mut Sku) -> Result<T, DomainError>,
    {
        let sku = self
            .skus
            .get_mut(&sku_id)
            .ok_or_else(|| DomainError::NotFound {
                entity: "SKU",
                id: sku_id.to_string(),
            })?;
        let output = f(sku)?;
        self.touch();
        Ok(output)
    }

    /// Makes the product visible. Requires a purchasable SKU.
    pub fn publish(&mut self) -> Result<(), DomainError> {
        if !self.has_purchasable_sku() {
            return Err(DomainError::rule(format!(
                "product {} has no purchasable SKU",
                self.id
            )));
        }
        self.is_published = true;
        self.touch();
        Ok(())
    }

    pub fn unpublish(&mut self) {
        self.is_published = false;
        self.touch();
    }

    /// Withdraws the product and every SKU it owns.
    pub fn discontinue(&mut self) {
        self.is_published = false;
        for sku in self.skus.values_mut() {
            sku.discontinue();
        }
        self.touch();
    }

    pub fn set_best_seller(&mut self, is_best_seller: bool) {
        self.is_best_seller = is_best_seller;
        self.touch();
    }

    pub fn set_quick_ship(&mut self, is_quick_ship: bool) {
        self.is_quick_ship = is_quick_ship;
        self.touch();
    }

    pub fn rename(&mut self, name: &str) -> Result<(), DomainError> {
        self.name = require_text("product name", name, MAX_NAME_LEN)?;
        self.touch();
        Ok(())
    }

    pub fn describe(&mut self, description: &str) -> Result<(), DomainError> {
        self.description = validate_description(description)?;
        self.touch();
        Ok(())
    }

    pub fn add_image(&mut self, url: &str, alt_text: Option<&str>) -> Result<(), DomainError> {
        let url = require_text("image url", url, MAX_URL_LEN)?;
        let alt_text = optional_text("image alt text", alt_text, MAX_NAME_LEN)?;
        self.images.push(ProductImage { url, alt_text });
        self.touch();
        Ok(())
    }

    /// Adds a tag unless it is already present.
    pub fn add_tag(&mut self, tag: &str) -> Result<(), DomainError> {
        let tag = require_text("tag", tag, MAX_TAG_LEN)?;
        if !self.tags.contains(&tag) {
            self.tags.push(tag);
            self.touch();
        }
        Ok(())
    }

    /// Removes a tag, returning whether it was present.
    pub fn remove_tag(&mut self, tag: &str) -> bool {
        let before = self.tags.len();
        self.tags.retain(|t| t != tag.trim());
        let removed = self.tags.len() != before;
        if removed {
            self.touch();
        }
        removed
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

fn validate_description(description: &str) -> Result<String, DomainError> {
    let description = description.trim();
    if description.chars().count() > MAX_DESCRIPTION_LEN {
        return Err(DomainError::invalid_field(
            "product description",
            format!("must be at most {MAX_DESCRIPTION_LEN} characters"),
        ));
    }
    Ok(description.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{NewSku, SkuStatus};

    fn yen(amount: u64) -> Money {
        Money::from_yen(amount).unwrap()
    }

    fn product() -> Product {
        Product::create(NewProduct {
            name: "Lounge sofa".to_string(),
            description: "Deep seat, feather cushions".to_string(),
            category_id: CategoryId::generate(),
        })
        .unwrap()
    }

    fn add_sku(product: &mut Product, code: &str, price: u64, stock: u32) -> SkuId {
        let sku = Sku::create(NewSku::new(product.id(), code, code, yen(price)).with_stock(stock))
            .unwrap();
        let id = sku.id();
        product.add_sku(sku).unwrap();
        id
    }

    #[test]
    fn test_create_validates_name() {
        let result = Product::create(NewProduct {
            name: " ".to_string(),
            description: String::new(),
            category_id: CategoryId::generate(),
        });
        assert!(matches!(result, Err(DomainError::InvalidField { .. })));
    }

    #[test]
    fn test_add_sku_rejects_foreign_product() {
        let mut product = product();
        let foreign = Sku::create(NewSku::new(ProductId::generate(), "A", "A", yen(100))).unwrap();
        assert!(matches!(
            product.add_sku(foreign),
            Err(DomainError::BusinessRuleViolation(_))
        ));
    }

    #[test]
    fn test_add_sku_rejects_duplicate_code() {
        let mut product = product();
        add_sku(&mut product, "SOFA-GRY", 1000, 1);
        let duplicate =
            Sku::create(NewSku::new(product.id(), "SOFA-GRY", "again", yen(1000))).unwrap();
        assert!(product.add_sku(duplicate).is_err());
        assert_eq!(product.sku_count(), 1);
    }

    #[test]
    fn test_publish_requires_purchasable_sku() {
        let mut product = product();
        assert!(product.publish().is_err());

        add_sku(&mut product, "SOFA-GRY", 1000, 0);
        assert!(product.publish().is_err());

        let blue = add_sku(&mut product, "SOFA-BLU", 1200, 2);
        product.publish().unwrap();
        assert!(product.is_available());

        product
            .update_sku(blue, |sku| {
                sku.deactivate();
                Ok(())
            })
            .unwrap();
        assert!(product.is_published());
        assert!(!product.is_available());
    }

    #[test]
    fn test_price_range_and_stock_over_purchasable_skus() {
        let mut product = product();
        assert_eq!(product.price_range(), None);

        let grey = add_sku(&mut product, "SOFA-GRY", 1000, 3);
        add_sku(&mut product, "SOFA-BLU", 1500, 2);
        add_sku(&mut product, "SOFA-RED", 500, 0);

        product
            .update_sku(grey, |sku| sku.set_sale_price(yen(800)))
            .unwrap();

        assert_eq!(
            product.price_range(),
            Some(PriceRange {
                min: yen(800),
                max: yen(1500)
            })
        );
        assert_eq!(product.total_available_stock(), 5);
        assert!(product.is_on_sale());
        assert_eq!(product.purchasable_skus().len(), 2);
    }

    #[test]
    fn test_update_sku_unknown_id_fails() {
        let mut product = product();
        let result = product.update_sku(SkuId::generate(), |sku| sku.reserve_stock(1));
        assert!(matches!(result, Err(DomainError::NotFound { .. })));
    }

    #[test]
    fn test_discontinue_propagates_to_skus() {
        let mut product = product();
        let a = add_sku(&mut product, "A", 1000, 3);
        let b = add_sku(&mut product, "B", 1000, 3);
        product.publish().unwrap();

        product.discontinue();

        assert!(!product.is_published());
        for id in [a, b] {
            assert_eq!(product.sku(id).unwrap().status(), SkuStatus::Discontinued);
        }
        assert!(!product.has_purchasable_sku());
    }

    #[test]
    fn test_skus_are_ordered_by_display_order_then_code() {
        let mut product = product();
        let b = add_sku(&mut product, "B", 1000, 1);
        add_sku(&mut product, "A", 1000, 1);
        product
            .update_sku(b, |sku| {
                sku.set_display_order(0);
                Ok(())
            })
            .unwrap();
        let a = product.sku_by_code("A").unwrap().id();
        product
            .update_sku(a, |sku| {
                sku.set_display_order(1);
                Ok(())
            })
            .unwrap();

        let codes: Vec<&str> = product.skus().iter().map(|sku| sku.code()).collect();
        assert_eq!(codes, vec!["B", "A"]);
    }

    #[test]
    fn test_tags_are_deduplicated() {
        let mut product = product();
        product.add_tag("sale").unwrap();
        product.add_tag(" sale ").unwrap();
        product.add_tag("new").unwrap();
        assert_eq!(product.tags(), ["sale", "new"]);
        assert!(product.remove_tag("sale"));
        assert!(!product.remove_tag("sale"));
    }

    #[test]
    fn test_remove_sku() {
        let mut product = product();
        let id = add_sku(&mut product, "A", 1000, 1);
        let removed = product.remove_sku(id).unwrap();
        assert_eq!(removed.id(), id);
        assert!(product.remove_sku(id).is_err());
    }

    #[test]
    fn test_deserialization_enforces_sku_ownership() {
        let mut product = product();
        add_sku(&mut product, "A", 1000, 3);
        let json = serde_json::to_value(&product).unwrap();
        let restored: Product = serde_json::from_value(json.clone()).unwrap();
        assert_eq!(restored.sku_count(), 1);
        assert_eq!(restored.updated_at(), product.updated_at());

        let foreign = Sku::create(NewSku::new(ProductId::generate(), "B", "B", yen(100))).unwrap();
        let mut with_foreign = json.clone();
        with_foreign["skus"][foreign.id().to_string()] = serde_json::to_value(&foreign).unwrap();
        assert!(serde_json::from_value::<Product>(with_foreign).is_err());

        let mut unnamed = json;
        unnamed["name"] = serde_json::json!("  ");
        assert!(serde_json::from_value::<Product>(unnamed).is_err());
    }
}
