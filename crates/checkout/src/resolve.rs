//! Input parsing and catalog lookups shared by the cart and order services.
//!
//! Every use case runs the same three phases, each returning the first
//! error it finds: request shape, existence, then business rules.

use std::collections::HashMap;

use common::{PaymentMethodId, ShippingMethodId, SkuId};
use domain::{MAX_ITEM_QUANTITY, PaymentMethod, ShippingMethod};

use crate::error::{CheckoutError, Result};
use crate::ports::{MethodCatalog, SkuCatalog, SkuSummary};
use crate::requests::LineRequest;

/// A request line whose SKU id and quantity are well formed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct ParsedLine {
    pub sku_id: SkuId,
    pub quantity: u32,
}

pub(crate) fn parse_lines(items: &[LineRequest]) -> Result<Vec<ParsedLine>> {
    if items.is_empty() {
        return Err(CheckoutError::validation(
            "items",
            "at least one item is required",
        ));
    }
    items
        .iter()
        .enumerate()
        .map(|(index, line)| {
            if !(1..=MAX_ITEM_QUANTITY).contains(&line.quantity) {
                return Err(CheckoutError::validation(
                    format!("items[{index}].quantity"),
                    format!("must be between 1 and {MAX_ITEM_QUANTITY}"),
                ));
            }
            let sku_id = SkuId::parse(&line.sku_id).map_err(|err| {
                CheckoutError::invalid_identifier(format!("items[{index}].sku_id"), err)
            })?;
            Ok(ParsedLine {
                sku_id,
                quantity: line.quantity,
            })
        })
        .collect()
}

pub(crate) fn parse_method_ids(
    shipping_method_id: &str,
    payment_method_id: &str,
) -> Result<(ShippingMethodId, PaymentMethodId)> {
    let shipping = ShippingMethodId::new(shipping_method_id)
        .map_err(|err| CheckoutError::invalid_identifier("shipping_method_id", err))?;
    let payment = PaymentMethodId::new(payment_method_id)
        .map_err(|err| CheckoutError::invalid_identifier("payment_method_id", err))?;
    Ok((shipping, payment))
}

/// Returns the distinct SKU ids in first-seen order.
pub(crate) fn distinct_skus(lines: &[ParsedLine]) -> Vec<SkuId> {
    let mut seen = Vec::with_capacity(lines.len());
    for line in lines {
        if !seen.contains(&line.sku_id) {
            seen.push(line.sku_id);
        }
    }
    seen
}

/// Fetches every requested SKU in one batch; the first missing one is `NotFound`.
pub(crate) async fn fetch_skus<C: SkuCatalog + ?Sized>(
    catalog: &C,
    lines: &[ParsedLine],
) -> Result<HashMap<SkuId, SkuSummary>> {
    let ids = distinct_skus(lines);
    let summaries: HashMap<SkuId, SkuSummary> = catalog
        .find_summaries(&ids)
        .await?
        .into_iter()
        .map(|summary| (summary.id, summary))
        .collect();

    if let Some(missing) = ids.iter().find(|id| !summaries.contains_key(*id)) {
        return Err(CheckoutError::NotFound {
            entity: "SKU",
            id: missing.to_string(),
        });
    }
    Ok(summaries)
}

pub(crate) async fn fetch_methods<M: MethodCatalog + ?Sized>(
    methods: &M,
    shipping_id: &ShippingMethodId,
    payment_id: &PaymentMethodId,
) -> Result<(ShippingMethod, PaymentMethod)> {
    let shipping = methods
        .shipping_method(shipping_id)
        .await?
        .ok_or_else(|| CheckoutError::NotFound {
            entity: "shipping method",
            id: shipping_id.to_string(),
        })?;
    let payment = methods
        .payment_method(payment_id)
        .await?
        .ok_or_else(|| CheckoutError::NotFound {
            entity: "payment method",
            id: payment_id.to_string(),
        })?;
    Ok((shipping, payment))
}

/// Checks each line in request order: the SKU must be purchasable and its
/// availability must cover the quantity requested so far for that SKU.
pub(crate) fn check_lines(
    lines: &[ParsedLine],
    summaries: &HashMap<SkuId, SkuSummary>,
) -> Result<()> {
    let mut requested: HashMap<SkuId, u32> = HashMap::new();
    for line in lines {
        let summary = summaries
            .get(&line.sku_id)
            .ok_or_else(|| CheckoutError::NotFound {
                entity: "SKU",
                id: line.sku_id.to_string(),
            })?;
        if !summary.is_purchasable {
            return Err(CheckoutError::BusinessRuleViolation(format!(
                "SKU {} ({}) is not purchasable",
                summary.sku_code, summary.id
            )));
        }

        let total = requested.entry(line.sku_id).or_insert(0);
        *total = total.saturating_add(line.quantity);
        if *total > summary.available_stock {
            return Err(CheckoutError::InsufficientStock {
                sku_id: line.sku_id,
                requested: *total,
                available: summary.available_stock,
            });
        }
    }
    Ok(())
}
