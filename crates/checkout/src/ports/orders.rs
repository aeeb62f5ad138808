//! Order persistence port and in-memory implementation.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use common::OrderId;
use domain::{MAX_ORDER_SEQUENCE, Order, OrderNumber};
use tokio::sync::RwLock;

use crate::error::{CheckoutError, Result};

/// Trait for storing and loading orders.
#[async_trait]
pub trait OrderRepository: Send + Sync {
    /// Inserts a new order or replaces the stored copy of an existing one.
    ///
    /// An update must carry the version right after the stored one, so of
    /// two writers that loaded the same version only the first succeeds.
    async fn save(&self, order: &Order) -> Result<()>;

    async fn find_by_id(&self, id: OrderId) -> Result<Option<Order>>;

    async fn find_by_number(&self, number: &OrderNumber) -> Result<Option<Order>>;

    /// Returns an order number no other order has been given.
    async fn generate_order_number(&self) -> Result<OrderNumber>;
}

#[derive(Debug, Default)]
struct InMemoryOrderState {
    orders: HashMap<OrderId, Order>,
    numbers: HashMap<OrderNumber, OrderId>,
    daily_sequences: HashMap<NaiveDate, u32>,
    fail_on_save: bool,
}

/// In-memory order repository for testing.
///
/// Order numbers use a per-day sequence starting at 1.
#[derive(Debug, Clone, Default)]
pub struct InMemoryOrderRepository {
    state: Arc<RwLock<InMemoryOrderState>>,
}

impl InMemoryOrderRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Configures the repository to fail every save.
    pub async fn set_fail_on_save(&self, fail: bool) {
        self.state.write().await.fail_on_save = fail;
    }

    /// Returns the number of stored orders.
    pub async fn order_count(&self) -> usize {
        self.state.read().await.orders.len()
    }

    async fn next_number_for(&self, date: NaiveDate) -> Result<OrderNumber> {
        let mut state = self.state.write().await;
        let sequence = state.daily_sequences.entry(date).or_insert(0);
        if *sequence >= MAX_ORDER_SEQUENCE {
            return Err(CheckoutError::Repository(format!(
                "order numbers for {date} are exhausted"
            )));
        }
        *sequence += 1;
        Ok(OrderNumber::generate(date, *sequence)?)
    }
}

#[async_trait]
impl OrderRepository for InMemoryOrderRepository {
    async fn save(&self, order: &Order) -> Result<()> {
        let mut state = self.state.write().await;
        if state.fail_on_save {
            return Err(CheckoutError::Repository(
                "order store unavailable".to_string(),
            ));
        }

        if let Some(stored) = state.orders.get(&order.id()) {
            let expected = order.version().saturating_sub(1);
            if stored.version() != expected {
                return Err(CheckoutError::ConcurrencyConflict {
                    order_id: order.id(),
                    expected,
                    actual: stored.version(),
                });
            }
        }

        match state.numbers.get(order.order_number()) {
            Some(owner) if *owner != order.id() => {
                return Err(CheckoutError::Repository(format!(
                    "order number {} already assigned",
                    order.order_number()
                )));
            }
            _ => {}
        }

        state
            .numbers
            .insert(order.order_number().clone(), order.id());
        state.orders.insert(order.id(), order.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: OrderId) -> Result<Option<Order>> {
        Ok(self.state.read().await.orders.get(&id).cloned())
    }

    async fn find_by_number(&self, number: &OrderNumber) -> Result<Option<Order>> {
        let state = self.state.read().await;
        Ok(state
            .numbers
            .get(number)
            .and_then(|id| state.orders.get(id))
            .cloned())
    }

    async fn generate_order_number(&self) -> Result<OrderNumber> {
        self.next_number_for(Utc::now().date_naive()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::{PaymentMethodId, ProductId, ShippingMethodId, SkuId};
    use domain::{
        Address, CustomerInfo, Email, Money, NewOrder, OrderItem, PaymentInfo, PaymentMethod,
        PhoneNumber, ShippingInfo, ShippingMethod,
    };

    fn order(number: OrderNumber) -> Order {
        let yen = |amount| Money::from_yen(amount).unwrap();
        let shipping = ShippingMethod::new(
            ShippingMethodId::new("standard").unwrap(),
            "Standard",
            yen(500),
            true,
        )
        .unwrap();
        let payment =
            PaymentMethod::new(PaymentMethodId::new("card").unwrap(), "Card", yen(0), true)
                .unwrap();
        let address = Address::new("100-0001", "東京都", "千代田区", "千代田1-1", None).unwrap();
        Order::create(NewOrder {
            order_number: number,
            customer: CustomerInfo::new(
                "Taro Yamada",
                Email::new("taro@example.com").unwrap(),
                PhoneNumber::new("090-1234-5678").unwrap(),
            )
            .unwrap(),
            items: vec![
                OrderItem::new(
                    SkuId::generate(),
                    ProductId::generate(),
                    "Lamp",
                    "Brass",
                    yen(4000),
                    1,
                )
                .unwrap(),
            ],
            shipping: ShippingInfo::from_method(&shipping, address).unwrap(),
            payment: PaymentInfo::from_method(&payment).unwrap(),
            notes: None,
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_stale_update_is_a_conflict() {
        let repo = InMemoryOrderRepository::new();
        let placed = order(repo.generate_order_number().await.unwrap());
        repo.save(&placed).await.unwrap();

        let mut first = placed.clone();
        let mut second = placed.clone();
        first.mark_paid().unwrap();
        second.cancel(None).unwrap();

        repo.save(&first).await.unwrap();
        assert!(matches!(
            repo.save(&second).await,
            Err(CheckoutError::ConcurrencyConflict {
                expected: 1,
                actual: 2,
                ..
            })
        ));
        assert!(matches!(
            repo.save(&placed).await,
            Err(CheckoutError::ConcurrencyConflict { .. })
        ));

        let stored = repo.find_by_id(placed.id()).await.unwrap().unwrap();
        assert_eq!(stored.status(), domain::OrderStatus::Paid);
    }

    #[tokio::test]
    async fn test_sequential_numbers_per_day() {
        let repo = InMemoryOrderRepository::new();
        let day = NaiveDate::from_ymd_opt(2024, 7, 21).unwrap();
        let next_day = NaiveDate::from_ymd_opt(2024, 7, 22).unwrap();

        let first = repo.next_number_for(day).await.unwrap();
        let second = repo.next_number_for(day).await.unwrap();
        let other = repo.next_number_for(next_day).await.unwrap();

        assert_eq!(first.as_str(), "ORD20240721000001");
        assert_eq!(second.as_str(), "ORD20240721000002");
        assert_eq!(other.as_str(), "ORD20240722000001");
    }

    #[tokio::test]
    async fn test_generated_numbers_are_unique() {
        let repo = InMemoryOrderRepository::new();
        let mut seen = std::collections::HashSet::new();
        for _ in 0..50 {
            let number = repo.generate_order_number().await.unwrap();
            assert!(seen.insert(number));
        }
    }

    #[tokio::test]
    async fn test_sequence_exhaustion() {
        let repo = InMemoryOrderRepository::new();
        let day = NaiveDate::from_ymd_opt(2024, 7, 21).unwrap();
        repo.state
            .write()
            .await
            .daily_sequences
            .insert(day, MAX_ORDER_SEQUENCE);

        assert!(matches!(
            repo.next_number_for(day).await,
            Err(CheckoutError::Repository(_))
        ));
    }
}
