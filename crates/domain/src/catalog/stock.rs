//! Stock held for a single SKU.

use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// Threshold used when callers do not configure their own.
pub const DEFAULT_LOW_STOCK_THRESHOLD: u32 = 10;

/// Quantity on hand and the part of it set aside for pending purchases.
///
/// Invariant: `reserved <= total`. `reserve`, `release_reservation` and
/// `adjust` are the only mutators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "StockRecord")]
pub struct Stock {
    total: u32,
    reserved: u32,
}

#[derive(Deserialize)]
struct StockRecord {
    total: u32,
    reserved: u32,
}

impl TryFrom<StockRecord> for Stock {
    type Error = DomainError;

    fn try_from(record: StockRecord) -> Result<Self, Self::Error> {
        Stock::new(record.total, record.reserved)
    }
}

impl Stock {
    /// Creates stock with an existing reservation.
    pub fn new(total: u32, reserved: u32) -> Result<Self, DomainError> {
        if reserved > total {
            return Err(DomainError::invalid_field(
                "stock",
                format!("reserved {reserved} exceeds total {total}"),
            ));
        }
        Ok(Self { total, reserved })
    }

    /// Creates stock with nothing reserved.
    pub fn with_total(total: u32) -> Self {
        Self { total, reserved: 0 }
    }

    /// Returns the quantity on hand.
    pub fn total(&self) -> u32 {
        self.total
    }

    /// Returns the reserved quantity.
    pub fn reserved(&self) -> u32 {
        self.reserved
    }

    /// Returns `total - reserved`.
    pub fn available(&self) -> u32 {
        self.total - self.reserved
    }

    /// Sets `quantity` units aside.
    pub fn reserve(&mut self, quantity: u32) -> Result<(), DomainError> {
        if quantity == 0 {
            return Err(DomainError::invalid_field(
                "quantity",
                "reservation quantity must be positive",
            ));
        }
        let available = self.available();
        if quantity > available {
            return Err(DomainError::InsufficientStock {
                requested: quantity,
                available,
            });
        }
        self.reserved += quantity;
        Ok(())
    }

    /// Returns `quantity` reserved units to the available pool.
    pub fn release_reservation(&mut self, quantity: u32) -> Result<(), DomainError> {
        if quantity == 0 {
            return Err(DomainError::invalid_field(
                "quantity",
                "release quantity must be positive",
            ));
        }
        if quantity > self.reserved {
            return Err(DomainError::rule(format!(
                "cannot release {quantity} units, only {} reserved",
                self.reserved
            )));
        }
        self.reserved -= quantity;
        Ok(())
    }

    /// Changes the quantity on hand by `delta`.
    ///
    /// The new total may not drop below zero or below the reserved quantity.
    pub fn adjust(&mut self, delta: i64) -> Result<(), DomainError> {
        let new_total = i64::from(self.total) + delta;
        if new_total < 0 {
            return Err(DomainError::rule(format!(
                "stock cannot go negative ({} {delta:+})",
                self.total
            )));
        }
        if new_total < i64::from(self.reserved) {
            return Err(DomainError::rule(format!(
                "stock {new_total} would fall below reserved {}",
                self.reserved
            )));
        }
        self.total = u32::try_from(new_total).map_err(|_| {
            DomainError::invalid_field("stock", format!("{new_total} is out of range"))
        })?;
        Ok(())
    }

    /// Returns true when available units are at or below `threshold`.
    pub fn is_low_stock(&self, threshold: u32) -> bool {
        self.available() <= threshold
    }

    /// Returns true when nothing is available.
    pub fn is_out_of_stock(&self) -> bool {
        self.available() == 0
    }
}

impl Default for Stock {
    fn default() -> Self {
        Self::with_total(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_rejects_reserved_above_total() {
        assert!(Stock::new(5, 6).is_err());
        let stock = Stock::new(5, 5).unwrap();
        assert_eq!(stock.available(), 0);
    }

    #[test]
    fn test_reserve_more_than_available_fails() {
        let mut stock = Stock::with_total(10);
        let err = stock.reserve(11).unwrap_err();
        assert_eq!(
            err,
            DomainError::InsufficientStock {
                requested: 11,
                available: 10
            }
        );
        assert_eq!(stock.reserved(), 0);
    }

    #[test]
    fn test_reserve_everything_empties_stock() {
        let mut stock = Stock::with_total(10);
        stock.reserve(10).unwrap();
        assert_eq!(stock.available(), 0);
        assert!(stock.is_out_of_stock());
        assert_eq!(stock.total(), 10);
    }

    #[test]
    fn test_zero_quantities_are_rejected() {
        let mut stock = Stock::with_total(10);
        assert!(matches!(
            stock.reserve(0),
            Err(DomainError::InvalidField { .. })
        ));
        assert!(matches!(
            stock.release_reservation(0),
            Err(DomainError::InvalidField { .. })
        ));
    }

    #[test]
    fn test_release_reservation() {
        let mut stock = Stock::new(10, 4).unwrap();
        stock.release_reservation(3).unwrap();
        assert_eq!(stock.reserved(), 1);
        assert!(matches!(
            stock.release_reservation(2),
            Err(DomainError::BusinessRuleViolation(_))
        ));
    }

    #[test]
    fn test_adjust_respects_reservations() {
        let mut stock = Stock::new(10, 6).unwrap();
        stock.adjust(5).unwrap();
        assert_eq!(stock.total(), 15);
        stock.adjust(-9).unwrap();
        assert_eq!(stock.total(), 6);
        assert!(stock.adjust(-1).is_err());
        assert!(Stock::with_total(3).adjust(-4).is_err());
    }

    #[test]
    fn test_low_stock_threshold() {
        let stock = Stock::new(20, 10).unwrap();
        assert!(stock.is_low_stock(DEFAULT_LOW_STOCK_THRESHOLD));
        assert!(!stock.is_low_stock(9));
        assert!(!stock.is_out_of_stock());
    }

    #[test]
    fn test_deserialization_enforces_invariant() {
        let stock: Stock = serde_json::from_str(r#"{"total":4,"reserved":1}"#).unwrap();
        assert_eq!(stock.available(), 3);
        assert!(serde_json::from_str::<Stock>(r#"{"total":1,"reserved":4}"#).is_err());
    }
}
