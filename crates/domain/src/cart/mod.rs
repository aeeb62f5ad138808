//! Cart aggregate.
//!
//! A cart is built fresh for each calculation request and thrown away
//! afterwards; it is never persisted.

mod item;

use std::collections::HashMap;

use common::SkuId;

use crate::error::DomainError;
use crate::methods::{PaymentMethod, ShippingMethod};
use crate::money::Money;

pub use item::{CartItem, MAX_ITEM_QUANTITY};

/// Items keyed by SKU plus the chosen shipping and payment methods.
///
/// Adding a SKU that is already present merges the quantities, so there is
/// at most one line per SKU.
#[derive(Debug, Clone, Default)]
pub struct Cart {
    items: HashMap<SkuId, CartItem>,
    shipping_method: Option<ShippingMethod>,
    payment_method: Option<PaymentMethod>,
}

impl Cart {
    /// Creates an empty cart.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an item, merging it into an existing line for the same SKU.
    pub fn add_item(&mut self, item: CartItem) -> Result<(), DomainError> {
        match self.items.get_mut(&item.sku_id()) {
            Some(existing) => existing.increase_quantity(item.quantity()),
            None => {
                self.items.insert(item.sku_id(), item);
                Ok(())
            }
        }
    }

    /// Removes and returns the line for a SKU, if any.
    pub fn remove_item(&mut self, sku_id: SkuId) -> Option<CartItem> {
        self.items.remove(&sku_id)
    }

    /// Sets a line's quantity; zero removes the line.
    pub fn update_item_quantity(&mut self, sku_id: SkuId, quantity: u32) -> Result<(), DomainError> {
        if !self.items.contains_key(&sku_id) {
            return Err(DomainError::NotFound {
                entity: "cart item",
                id: sku_id.to_string(),
            });
        }
        if quantity == 0 {
            self.items.remove(&sku_id);
            return Ok(());
        }
        match self.items.get_mut(&sku_id) {
            Some(item) => item.set_quantity(quantity),
            None => Ok(()),
        }
    }

    /// Removes every item. Applied methods are kept.
    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn item(&self, sku_id: SkuId) -> Option<&CartItem> {
        self.items.get(&sku_id)
    }

    pub fn items(&self) -> impl Iterator<Item = &CartItem> {
        self.items.values()
    }

    /// Returns the number of distinct lines.
    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    /// Returns the number of units across all lines.
    pub fn total_quantity(&self) -> u32 {
        self.items.values().map(CartItem::quantity).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn apply_shipping_method(&mut self, method: ShippingMethod) {
        self.shipping_method = Some(method);
    }

    pub fn apply_payment_method(&mut self, method: PaymentMethod) {
        self.payment_method = Some(method);
    }

    pub fn shipping_method(&self) -> Option<&ShippingMethod> {
        self.shipping_method.as_ref()
    }

    pub fn payment_method(&self) -> Option<&PaymentMethod> {
        self.payment_method.as_ref()
    }

    /// Sum of line subtotals; zero for an empty cart.
    pub fn subtotal(&self) -> Result<Money, DomainError> {
        let subtotals = self
            .items
            .values()
            .map(CartItem::subtotal)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Money::sum(subtotals)?)
    }

    /// Fee of the applied shipping method, or zero.
    pub fn shipping_fee(&self) -> Money {
        self.shipping_method
            .as_ref()
            .map_or(Money::zero(), |method| method.fee)
    }

    /// Fee of the applied payment method, or zero.
    pub fn payment_fee(&self) -> Money {
        self.payment_method
            .as_ref()
            .map_or(Money::zero(), |method| method.fee)
    }

    /// Subtotal plus fees, before tax.
    pub fn pre_tax_total(&self) -> Result<Money, DomainError> {
        Ok(Money::sum([
            self.subtotal()?,
            self.shipping_fee(),
            self.payment_fee(),
        ])?)
    }

    /// Tax on subtotal plus fees.
    pub fn tax_amount(&self) -> Result<Money, DomainError> {
        Ok(self.pre_tax_total()?.tax_amount()?)
    }

    /// `(subtotal + shipping fee + payment fee)` including tax.
    pub fn total(&self) -> Result<Money, DomainError> {
        Ok(self.pre_tax_total()?.with_tax()?)
    }

    /// Checks the cart has items and both methods chosen.
    pub fn validate_for_checkout(&self) -> Result<(), DomainError> {
        if self.is_empty() {
            return Err(DomainError::rule("cart is empty"));
        }
        if self.shipping_method.is_none() {
            return Err(DomainError::rule("no shipping method selected"));
        }
        if self.payment_method.is_none() {
            return Err(DomainError::rule("no payment method selected"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::{PaymentMethodId, ProductId, ShippingMethodId};

    fn yen(amount: u64) -> Money {
        Money::from_yen(amount).unwrap()
    }

    fn item(sku_id: SkuId, price: u64, quantity: u32) -> CartItem {
        CartItem::new(sku_id, ProductId::generate(), "Chair", yen(price), quantity).unwrap()
    }

    fn shipping(fee: u64) -> ShippingMethod {
        ShippingMethod::new(ShippingMethodId::new("standard").unwrap(), "Standard", yen(fee), true)
            .unwrap()
    }

    fn payment(fee: u64) -> PaymentMethod {
        PaymentMethod::new(PaymentMethodId::new("card").unwrap(), "Card", yen(fee), true).unwrap()
    }

    #[test]
    fn test_adding_same_sku_merges_quantity() {
        let mut cart = Cart::new();
        let sku = SkuId::generate();
        cart.add_item(item(sku, 1000, 2)).unwrap();
        cart.add_item(item(sku, 1000, 3)).unwrap();

        assert_eq!(cart.item_count(), 1);
        assert_eq!(cart.item(sku).unwrap().quantity(), 5);
        assert_eq!(cart.total_quantity(), 5);
    }

    #[test]
    fn test_merge_beyond_limit_fails() {
        let mut cart = Cart::new();
        let sku = SkuId::generate();
        cart.add_item(item(sku, 100, 990)).unwrap();
        assert!(cart.add_item(item(sku, 100, 10)).is_err());
        assert_eq!(cart.item(sku).unwrap().quantity(), 990);
    }

    #[test]
    fn test_update_item_quantity() {
        let mut cart = Cart::new();
        let sku = SkuId::generate();
        cart.add_item(item(sku, 1000, 2)).unwrap();

        cart.update_item_quantity(sku, 7).unwrap();
        assert_eq!(cart.item(sku).unwrap().quantity(), 7);

        assert!(cart.update_item_quantity(sku, 1000).is_err());

        cart.update_item_quantity(sku, 0).unwrap();
        assert!(cart.is_empty());

        assert!(matches!(
            cart.update_item_quantity(sku, 1),
            Err(DomainError::NotFound { .. })
        ));
    }

    #[test]
    fn test_remove_item() {
        let mut cart = Cart::new();
        let sku = SkuId::generate();
        cart.add_item(item(sku, 1000, 2)).unwrap();
        assert!(cart.remove_item(sku).is_some());
        assert!(cart.remove_item(sku).is_none());
    }

    #[test]
    fn test_empty_cart_totals_are_zero() {
        let cart = Cart::new();
        assert_eq!(cart.subtotal().unwrap(), Money::zero());
        assert_eq!(cart.shipping_fee(), Money::zero());
        assert_eq!(cart.payment_fee(), Money::zero());
        assert_eq!(cart.total().unwrap(), Money::zero());
    }

    #[test]
    fn test_totals_include_fees_and_tax() {
        let mut cart = Cart::new();
        cart.add_item(item(SkuId::generate(), 1000, 2)).unwrap();
        cart.add_item(item(SkuId::generate(), 500, 1)).unwrap();
        cart.apply_shipping_method(shipping(500));
        cart.apply_payment_method(payment(0));

        assert_eq!(cart.subtotal().unwrap(), yen(2500));
        assert_eq!(cart.pre_tax_total().unwrap(), yen(3000));
        assert_eq!(cart.tax_amount().unwrap(), yen(300));
        assert_eq!(cart.total().unwrap(), yen(3300));
    }

    #[test]
    fn test_validate_for_checkout() {
        let mut cart = Cart::new();
        assert!(cart.validate_for_checkout().is_err());

        cart.add_item(item(SkuId::generate(), 1000, 1)).unwrap();
        assert!(cart.validate_for_checkout().is_err());

        cart.apply_shipping_method(shipping(500));
        assert!(cart.validate_for_checkout().is_err());

        cart.apply_payment_method(payment(300));
        cart.validate_for_checkout().unwrap();

        cart.clear();
        assert!(cart.validate_for_checkout().is_err());
        assert!(cart.shipping_method().is_some());
    }
}
