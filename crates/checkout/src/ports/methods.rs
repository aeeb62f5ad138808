//! Shipping and payment method lookup.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use common::{PaymentMethodId, ShippingMethodId};
use domain::{PaymentMethod, ShippingMethod};
use tokio::sync::RwLock;

use crate::error::Result;

/// Trait for resolving the methods a shopper picked at checkout.
#[async_trait]
pub trait MethodCatalog: Send + Sync {
    async fn shipping_method(&self, id: &ShippingMethodId) -> Result<Option<ShippingMethod>>;

    async fn payment_method(&self, id: &PaymentMethodId) -> Result<Option<PaymentMethod>>;
}

#[derive(Debug, Default)]
struct InMemoryMethodState {
    shipping: HashMap<ShippingMethodId, ShippingMethod>,
    payment: HashMap<PaymentMethodId, PaymentMethod>,
}

/// In-memory method catalog for testing.
#[derive(Debug, Clone, Default)]
pub struct InMemoryMethodCatalog {
    state: Arc<RwLock<InMemoryMethodState>>,
}

impl InMemoryMethodCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces a shipping method.
    pub async fn add_shipping_method(&self, method: ShippingMethod) {
        self.state
            .write()
            .await
            .shipping
            .insert(method.id.clone(), method);
    }

    /// Adds or replaces a payment method.
    pub async fn add_payment_method(&self, method: PaymentMethod) {
        self.state
            .write()
            .await
            .payment
            .insert(method.id.clone(), method);
    }
}

#[async_trait]
impl MethodCatalog for InMemoryMethodCatalog {
    async fn shipping_method(&self, id: &ShippingMethodId) -> Result<Option<ShippingMethod>> {
        Ok(self.state.read().await.shipping.get(id).cloned())
    }

    async fn payment_method(&self, id: &PaymentMethodId) -> Result<Option<PaymentMethod>> {
        Ok(self.state.read().await.payment.get(id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain::Money;

    #[tokio::test]
    async fn test_lookup_by_id() {
        let methods = InMemoryMethodCatalog::new();
        let id = ShippingMethodId::new("express").unwrap();
        methods
            .add_shipping_method(
                ShippingMethod::new(id.clone(), "Express", Money::from_yen(800).unwrap(), true)
                    .unwrap(),
            )
            .await;

        let found = methods.shipping_method(&id).await.unwrap().unwrap();
        assert_eq!(found.name, "Express");

        let missing = ShippingMethodId::new("drone").unwrap();
        assert!(methods.shipping_method(&missing).await.unwrap().is_none());

        let card = PaymentMethodId::new("card").unwrap();
        assert!(methods.payment_method(&card).await.unwrap().is_none());
    }
}
