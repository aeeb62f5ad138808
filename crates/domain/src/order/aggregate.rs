//! Order aggregate implementation.

use chrono::{DateTime, Utc};
use common::OrderId;
use serde::{Deserialize, Serialize};

use crate::customer::CustomerInfo;
use crate::error::DomainError;
use crate::money::Money;

use super::{
    OrderItem, OrderNumber, OrderPricing, OrderStatus, OrderTimestamps, PaymentInfo, ShippingInfo,
};

/// Maximum length of the accumulated order notes.
pub const MAX_NOTES_LEN: usize = 1000;

/// Everything needed to place an order.
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub order_number: OrderNumber,
    pub customer: CustomerInfo,
    pub items: Vec<OrderItem>,
    pub shipping: ShippingInfo,
    pub payment: PaymentInfo,
    pub notes: Option<String>,
}

/// Order aggregate root.
///
/// Items, customer, shipping, payment and pricing are snapshots taken at
/// creation; only the status, timestamps and notes change afterwards.
/// `version` starts at 1 and grows by one with every successful mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "OrderRecord")]
pub struct Order {
    id: OrderId,
    order_number: OrderNumber,
    customer: CustomerInfo,
    items: Vec<OrderItem>,
    shipping: ShippingInfo,
    payment: PaymentInfo,
    pricing: OrderPricing,
    status: OrderStatus,
    timestamps: OrderTimestamps,
    notes: Option<String>,
    version: u64,
}

#[derive(Deserialize)]
struct OrderRecord {
    id: OrderId,
    order_number: OrderNumber,
    customer: CustomerInfo,
    items: Vec<OrderItem>,
    shipping: ShippingInfo,
    payment: PaymentInfo,
    pricing: OrderPricing,
    status: OrderStatus,
    timestamps: OrderTimestamps,
    notes: Option<String>,
    version: u64,
}

impl TryFrom<OrderRecord> for Order {
    type Error = DomainError;

    fn try_from(record: OrderRecord) -> Result<Self, Self::Error> {
        if record.items.is_empty() {
            return Err(DomainError::rule("order must contain at least one item"));
        }
        if let Some(notes) = &record.notes {
            check_notes_len(notes)?;
        }
        if record.version == 0 {
            return Err(DomainError::invalid_field("version", "must be at least 1"));
        }
        let pricing = price(&record.items, &record.shipping, &record.payment)?;
        if pricing != record.pricing {
            return Err(DomainError::rule(format!(
                "stored pricing of order {} does not match its items and fees",
                record.order_number
            )));
        }
        Ok(Self {
            id: record.id,
            order_number: record.order_number,
            customer: record.customer,
            items: record.items,
            shipping: record.shipping,
            payment: record.payment,
            pricing,
            status: record.status,
            timestamps: record.timestamps,
            notes: record.notes,
            version: record.version,
        })
    }
}

impl Order {
    /// Creates a pending order and computes its pricing.
    pub fn create(new: NewOrder) -> Result<Self, DomainError> {
        if new.items.is_empty() {
            return Err(DomainError::rule("order must contain at least one item"));
        }
        let notes = match new.notes.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(text) => {
                check_notes_len(text)?;
                Some(text.to_string())
            }
        };

        let pricing = price(&new.items, &new.shipping, &new.payment)?;

        Ok(Self {
            id: OrderId::generate(),
            order_number: new.order_number,
            customer: new.customer,
            items: new.items,
            shipping: new.shipping,
            payment: new.payment,
            pricing,
            status: OrderStatus::Pending,
            timestamps: OrderTimestamps::new(Utc::now()),
            notes,
            version: 1,
        })
    }
}

fn price(
    items: &[OrderItem],
    shipping: &ShippingInfo,
    payment: &PaymentInfo,
) -> Result<OrderPricing, DomainError> {
    let subtotals = items
        .iter()
        .map(OrderItem::subtotal)
        .collect::<Result<Vec<_>, _>>()?;
    OrderPricing::calculate(Money::sum(subtotals)?, shipping.fee(), payment.fee())
}

// Query methods
impl Order {
    pub fn id(&self) -> OrderId {
        self.id
    }

    pub fn order_number(&self) -> &OrderNumber {
        &self.order_number
    }

    pub fn customer(&self) -> &CustomerInfo {
        &self.customer
    }

    /// Returns the items in the order they were placed.
    pub fn items(&self) -> &[OrderItem] {
        &self.items
    }

    pub fn shipping(&self) -> &ShippingInfo {
        &self.shipping
    }

    pub fn payment(&self) -> &PaymentInfo {
        &self.payment
    }

    pub fn pricing(&self) -> &OrderPricing {
        &self.pricing
    }

    pub fn total(&self) -> Money {
        self.pricing.total()
    }

    pub fn status(&self) -> OrderStatus {
        self.status
    }

    pub fn timestamps(&self) -> &OrderTimestamps {
        &self.timestamps
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.timestamps.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.timestamps.updated_at
    }

    pub fn notes(&self) -> Option<&str> {
        self.notes.as_deref()
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    /// Returns the number of lines.
    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    /// Returns the number of units across all lines.
    pub fn total_quantity(&self) -> u32 {
        self.items.iter().map(OrderItem::quantity).sum()
    }

    pub fn can_be_cancelled(&self) -> bool {
        self.status.can_be_cancelled()
    }

    /// Returns true if the order is in a terminal state.
    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }
}

// Command methods
impl Order {
    /// Moves the order to `next`, stamping the matching timestamp.
    pub fn update_status(&mut self, next: OrderStatus) -> Result<(), DomainError> {
        if !self.status.can_transition_to(next) {
            return Err(DomainError::InvalidStatusTransition {
                from: self.status,
                to: next,
            });
        }

        let now = Utc::now();
        match next {
            OrderStatus::Paid => self.timestamps.paid_at = Some(now),
            OrderStatus::Shipped => self.timestamps.shipped_at = Some(now),
            OrderStatus::Delivered => self.timestamps.delivered_at = Some(now),
            OrderStatus::Cancelled => self.timestamps.cancelled_at = Some(now),
            OrderStatus::Pending | OrderStatus::Processing | OrderStatus::Refunded => {}
        }
        self.timestamps.updated_at = now;
        self.status = next;
        self.version += 1;
        Ok(())
    }

    /// Cancels the order, recording the reason as a note.
    ///
    /// A shipped order passes the cancellable check but has no transition
    /// to `Cancelled`, so it fails with `InvalidStatusTransition`.
    pub fn cancel(&mut self, reason: Option<&str>) -> Result<(), DomainError> {
        if !self.can_be_cancelled() {
            return Err(DomainError::rule(format!(
                "order {} cannot be cancelled in status {}",
                self.order_number, self.status
            )));
        }
        let reason = reason.map(str::trim).filter(|text| !text.is_empty());
        let notes = match reason {
            Some(text) => Some(self.appended_notes(&format!("Cancelled: {text}"))?),
            None => self.notes.clone(),
        };

        self.update_status(OrderStatus::Cancelled)?;
        self.notes = notes;
        Ok(())
    }

    /// Appends a line to the notes.
    pub fn add_note(&mut self, note: &str) -> Result<(), DomainError> {
        let note = note.trim();
        if note.is_empty() {
            return Err(DomainError::invalid_field("note", "must not be empty"));
        }
        self.notes = Some(self.appended_notes(note)?);
        self.timestamps.updated_at = Utc::now();
        self.version += 1;
        Ok(())
    }

    pub fn mark_paid(&mut self) -> Result<(), DomainError> {
        self.update_status(OrderStatus::Paid)
    }

    pub fn start_processing(&mut self) -> Result<(), DomainError> {
        self.update_status(OrderStatus::Processing)
    }

    pub fn mark_shipped(&mut self) -> Result<(), DomainError> {
        self.update_status(OrderStatus::Shipped)
    }

    pub fn mark_delivered(&mut self) -> Result<(), DomainError> {
        self.update_status(OrderStatus::Delivered)
    }

    pub fn refund(&mut self) -> Result<(), DomainError> {
        self.update_status(OrderStatus::Refunded)
    }

    fn appended_notes(&self, note: &str) -> Result<String, DomainError> {
        let combined = match &self.notes {
            Some(existing) => format!("{existing}\n{note}"),
            None => note.to_string(),
        };
        check_notes_len(&combined)?;
        Ok(combined)
    }
}

fn check_notes_len(notes: &str) -> Result<(), DomainError> {
    if notes.chars().count() > MAX_NOTES_LEN {
        return Err(DomainError::invalid_field(
            "notes",
            format!("must be at most {MAX_NOTES_LEN} characters"),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::customer::{Address, Email, PhoneNumber};
    use crate::methods::{PaymentMethod, ShippingMethod};
    use chrono::NaiveDate;
    use common::{PaymentMethodId, ProductId, ShippingMethodId, SkuId};

    fn yen(amount: u64) -> Money {
        Money::from_yen(amount).unwrap()
    }

    fn new_order(items: Vec<OrderItem>, notes: Option<&str>) -> NewOrder {
        let date = NaiveDate::from_ymd_opt(2024, 7, 21).unwrap();
        let address = Address::new("100-0001", "東京都", "千代田区", "千代田1-1", None).unwrap();
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
        NewOrder {
            order_number: OrderNumber::generate(date, 1).unwrap(),
            customer: CustomerInfo::new(
                "Taro Yamada",
                Email::new("taro@example.com").unwrap(),
                PhoneNumber::new("090-1234-5678").unwrap(),
            )
            .unwrap(),
            items,
            shipping: ShippingInfo::from_method(&shipping, address).unwrap(),
            payment: PaymentInfo::from_method(&payment).unwrap(),
            notes: notes.map(str::to_string),
        }
    }

    fn line(price: u64, quantity: u32) -> OrderItem {
        OrderItem::new(
            SkuId::generate(),
            ProductId::generate(),
            "Dining chair",
            "Oak",
            yen(price),
            quantity,
        )
        .unwrap()
    }

    fn create_test_order() -> Order {
        Order::create(new_order(vec![line(1000, 2), line(500, 1)], None)).unwrap()
    }

    #[test]
    fn test_create_order_computes_pricing() {
        let order = create_test_order();

        assert_eq!(order.status(), OrderStatus::Pending);
        assert_eq!(order.pricing().subtotal(), yen(2500));
        assert_eq!(order.pricing().tax_amount(), yen(300));
        assert_eq!(order.total(), yen(3300));
        assert_eq!(order.item_count(), 2);
        assert_eq!(order.total_quantity(), 3);
        assert_eq!(order.created_at(), order.updated_at());
    }

    #[test]
    fn test_create_order_requires_items() {
        let result = Order::create(new_order(vec![], None));
        assert!(matches!(result, Err(DomainError::BusinessRuleViolation(_))));
    }

    #[test]
    fn test_create_order_validates_notes() {
        let too_long = "x".repeat(MAX_NOTES_LEN + 1);
        assert!(Order::create(new_order(vec![line(100, 1)], Some(&too_long))).is_err());

        let order = Order::create(new_order(vec![line(100, 1)], Some("  "))).unwrap();
        assert_eq!(order.notes(), None);
    }

    #[test]
    fn test_full_lifecycle_stamps_timestamps() {
        let mut order = create_test_order();

        order.mark_paid().unwrap();
        assert!(order.timestamps().paid_at.is_some());

        order.start_processing().unwrap();
        order.mark_shipped().unwrap();
        assert!(order.timestamps().shipped_at.is_some());

        order.mark_delivered().unwrap();
        assert!(order.timestamps().delivered_at.is_some());
        assert_eq!(order.status(), OrderStatus::Delivered);
        assert!(order.is_terminal());
    }

    #[test]
    fn test_invalid_transitions() {
        let mut order = create_test_order();
        assert!(matches!(
            order.mark_shipped(),
            Err(DomainError::InvalidStatusTransition {
                from: OrderStatus::Pending,
                to: OrderStatus::Shipped
            })
        ));

        order.mark_paid().unwrap();
        order.start_processing().unwrap();
        order.mark_shipped().unwrap();
        order.mark_delivered().unwrap();

        assert!(order.update_status(OrderStatus::Paid).is_err());
        assert!(matches!(
            order.cancel(None),
            Err(DomainError::BusinessRuleViolation(_))
        ));
        assert_eq!(order.status(), OrderStatus::Delivered);
    }

    #[test]
    fn test_cancel_records_reason() {
        let mut order = Order::create(new_order(vec![line(100, 1)], Some("Leave at door"))).unwrap();
        order.cancel(Some("changed my mind")).unwrap();

        assert_eq!(order.status(), OrderStatus::Cancelled);
        assert!(order.timestamps().cancelled_at.is_some());
        assert_eq!(order.notes(), Some("Leave at door\nCancelled: changed my mind"));

        order.refund().unwrap();
        assert!(order.is_terminal());
    }

    #[test]
    fn test_cancel_after_shipping_fails_transition() {
        let mut order = create_test_order();
        order.mark_paid().unwrap();
        order.start_processing().unwrap();
        order.mark_shipped().unwrap();

        assert!(order.can_be_cancelled());
        assert!(matches!(
            order.cancel(Some("too late")),
            Err(DomainError::InvalidStatusTransition { .. })
        ));
        assert_eq!(order.notes(), None);
    }

    #[test]
    fn test_add_note_appends_and_limits_length() {
        let mut order = create_test_order();
        order.add_note("first").unwrap();
        order.add_note("second").unwrap();
        assert_eq!(order.notes(), Some("first\nsecond"));

        assert!(order.add_note(&"x".repeat(MAX_NOTES_LEN)).is_err());
        assert_eq!(order.notes(), Some("first\nsecond"));
    }

    #[test]
    fn test_serialization_preserves_snapshot() {
        let order = create_test_order();
        let json = serde_json::to_string(&order).unwrap();
        let restored: Order = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, order);
    }

    #[test]
    fn test_version_counts_mutations() {
        let mut order = create_test_order();
        assert_eq!(order.version(), 1);
        order.mark_paid().unwrap();
        order.add_note("gift wrap").unwrap();
        assert_eq!(order.version(), 3);

        assert!(order.mark_delivered().is_err());
        assert!(order.add_note(" ").is_err());
        assert_eq!(order.version(), 3);

        order.cancel(Some("changed mind")).unwrap();
        assert_eq!(order.version(), 4);
    }

    #[test]
    fn test_deserialization_rejects_inconsistent_orders() {
        let order = create_test_order();
        let mut json = serde_json::to_value(&order).unwrap();

        let mut empty = json.clone();
        empty["items"] = serde_json::json!([]);
        assert!(serde_json::from_value::<Order>(empty).is_err());

        let mut repriced = json.clone();
        repriced["pricing"]["total"] = serde_json::json!(1);
        assert!(serde_json::from_value::<Order>(repriced).is_err());

        json["items"][0]["quantity"] = serde_json::json!(0);
        assert!(serde_json::from_value::<Order>(json).is_err());
    }
}
