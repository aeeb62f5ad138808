//! Cart calculation service.

use domain::{Cart, CartItem};

use crate::error::{CheckoutError, Result};
use crate::ports::{MethodCatalog, SkuCatalog};
use crate::requests::{CalculateCartRequest, CartCalculation, CartLine};
use crate::resolve::{
    check_lines, distinct_skus, fetch_methods, fetch_skus, parse_lines, parse_method_ids,
};

/// Prices a prospective purchase without reserving anything.
pub struct CartService<C, M>
where
    C: SkuCatalog,
    M: MethodCatalog,
{
    catalog: C,
    methods: M,
}

impl<C, M> CartService<C, M>
where
    C: SkuCatalog,
    M: MethodCatalog,
{
    pub fn new(catalog: C, methods: M) -> Self {
        Self { catalog, methods }
    }

    /// Prices the requested lines with the chosen shipping and payment methods.
    ///
    /// Read only: stock is checked against current availability but not reserved.
    #[tracing::instrument(skip(self, request), fields(lines = request.items.len()))]
    pub async fn calculate(&self, request: &CalculateCartRequest) -> Result<CartCalculation> {
        metrics::counter!("cart_calculations_total").increment(1);

        let result = self.price(request).await;
        match &result {
            Ok(calculation) => {
                tracing::debug!(total = %calculation.total, "cart calculated");
            }
            Err(err) => {
                tracing::warn!(error = %err, "cart calculation rejected");
            }
        }
        result
    }

    async fn price(&self, request: &CalculateCartRequest) -> Result<CartCalculation> {
        let lines = parse_lines(&request.items)?;
        let (shipping_id, payment_id) =
            parse_method_ids(&request.shipping_method_id, &request.payment_method_id)?;

        let summaries = fetch_skus(&self.catalog, &lines).await?;
        let (shipping, payment) = fetch_methods(&self.methods, &shipping_id, &payment_id).await?;

        check_lines(&lines, &summaries)?;

        let mut cart = Cart::new();
        for (index, line) in lines.iter().enumerate() {
            let summary = summaries
                .get(&line.sku_id)
                .ok_or_else(|| CheckoutError::NotFound {
                    entity: "SKU",
                    id: line.sku_id.to_string(),
                })?;
            let item = CartItem::new(
                line.sku_id,
                summary.product_id,
                &summary.product_name,
                summary.current_price,
                line.quantity,
            )
            .map_err(|err| CheckoutError::invalid_input(format!("items[{index}]"), err))?;
            cart.add_item(item)
                .map_err(|err| CheckoutError::invalid_input(format!("items[{index}].quantity"), err))?;
        }
        cart.apply_shipping_method(shipping);
        cart.apply_payment_method(payment);

        let mut items = Vec::with_capacity(cart.item_count());
        for sku_id in distinct_skus(&lines) {
            let (Some(item), Some(summary)) = (cart.item(sku_id), summaries.get(&sku_id)) else {
                continue;
            };
            items.push(CartLine {
                sku_id,
                product_id: item.product_id(),
                product_name: item.product_name().to_string(),
                sku_name: summary.sku_name.clone(),
                unit_price: item.unit_price(),
                quantity: item.quantity(),
                subtotal: item.subtotal()?,
                color_id: summary.color_id,
                color: summary.color.clone(),
                dimensions: summary.dimensions.clone(),
                material: summary.material.clone(),
            });
        }

        Ok(CartCalculation {
            items,
            total_quantity: cart.total_quantity(),
            subtotal: cart.subtotal()?,
            shipping_fee: cart.shipping_fee(),
            payment_fee: cart.payment_fee(),
            tax_amount: cart.tax_amount()?,
            total: cart.total()?,
        })
    }
}
