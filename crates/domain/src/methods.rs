//! Shipping and payment methods offered at checkout.

use common::{PaymentMethodId, ShippingMethodId};
use serde::{Deserialize, Serialize};

use crate::error::{DomainError, require_text};
use crate::money::Money;

const MAX_METHOD_NAME_LEN: usize = 100;

/// A delivery option and its fee.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShippingMethod {
    pub id: ShippingMethodId,
    pub name: String,
    pub fee: Money,
    pub is_active: bool,
}

impl ShippingMethod {
    pub fn new(
        id: ShippingMethodId,
        name: &str,
        fee: Money,
        is_active: bool,
    ) -> Result<Self, DomainError> {
        Ok(Self {
            id,
            name: require_text("shipping method name", name, MAX_METHOD_NAME_LEN)?,
            fee,
            is_active,
        })
    }
}

/// A payment option and its surcharge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentMethod {
    pub id: PaymentMethodId,
    pub name: String,
    pub fee: Money,
    pub is_active: bool,
}

impl PaymentMethod {
    pub fn new(
        id: PaymentMethodId,
        name: &str,
        fee: Money,
        is_active: bool,
    ) -> Result<Self, DomainError> {
        Ok(Self {
            id,
            name: require_text("payment method name", name, MAX_METHOD_NAME_LEN)?,
            fee,
            is_active,
        })
    }
}
