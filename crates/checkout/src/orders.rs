//! Order placement and lifecycle service.

use common::{CustomerId, OrderId, SkuId};
use domain::{
    Address, CustomerInfo, DEFAULT_LOW_STOCK_THRESHOLD, Email, MAX_NOTES_LEN, NewOrder, Order,
    OrderItem, OrderNumber, OrderStatus, PaymentInfo, PhoneNumber, ShippingInfo,
};

use crate::config::CheckoutConfig;
use crate::error::{CheckoutError, Result};
use crate::ports::{MethodCatalog, OrderRepository, SkuCatalog};
use crate::requests::{AddressRequest, CreateOrderRequest, CustomerRequest};
use crate::resolve::{check_lines, fetch_methods, fetch_skus, parse_lines, parse_method_ids};

/// Places orders and drives them through their lifecycle.
///
/// Creating an order reserves stock for every line; if a reservation or the
/// final save fails, the reservations already made are released in reverse
/// order and nothing is stored.
///
/// Status changes are saved before their stock effect runs. The repository
/// accepts only one writer per order version, so a release or fulfilment
/// happens at most once for each transition.
pub struct OrderService<C, M, R>
where
    C: SkuCatalog,
    M: MethodCatalog,
    R: OrderRepository,
{
    catalog: C,
    methods: M,
    orders: R,
    low_stock_threshold: u32,
}

impl<C, M, R> OrderService<C, M, R>
where
    C: SkuCatalog,
    M: MethodCatalog,
    R: OrderRepository,
{
    /// Creates a new order service.
    pub fn new(catalog: C, methods: M, orders: R) -> Self {
        Self {
            catalog,
            methods,
            orders,
            low_stock_threshold: DEFAULT_LOW_STOCK_THRESHOLD,
        }
    }

    /// Applies settings from the checkout configuration.
    pub fn with_config(mut self, config: &CheckoutConfig) -> Self {
        self.low_stock_threshold = config.low_stock_threshold;
        self
    }

    /// Validates the request, snapshots prices, reserves stock and stores a
    /// pending order.
    #[tracing::instrument(skip(self, request), fields(lines = request.items.len()))]
    pub async fn create_order(&self, request: &CreateOrderRequest) -> Result<Order> {
        match self.place_order(request).await {
            Ok(order) => {
                metrics::counter!("orders_created_total").increment(1);
                tracing::info!(
                    order_id = %order.id(),
                    order_number = %order.order_number(),
                    total = %order.total(),
                    "order created"
                );
                Ok(order)
            }
            Err(err) => {
                metrics::counter!("orders_rejected_total").increment(1);
                tracing::warn!(error = %err, "order rejected");
                Err(err)
            }
        }
    }

    /// Loads an order by id.
    #[tracing::instrument(skip(self))]
    pub async fn get_order(&self, order_id: OrderId) -> Result<Order> {
        self.orders
            .find_by_id(order_id)
            .await?
            .ok_or_else(|| CheckoutError::NotFound {
                entity: "order",
                id: order_id.to_string(),
            })
    }

    /// Loads an order by its customer-facing number.
    #[tracing::instrument(skip(self))]
    pub async fn get_order_by_number(&self, order_number: &str) -> Result<Order> {
        let number = OrderNumber::parse(order_number)
            .map_err(|err| CheckoutError::invalid_input("order_number", err))?;
        self.orders
            .find_by_number(&number)
            .await?
            .ok_or_else(|| CheckoutError::NotFound {
                entity: "order",
                id: number.to_string(),
            })
    }

    /// Moves an order to `next`.
    ///
    /// Shipping fulfils the reserved stock; cancelling releases it.
    #[tracing::instrument(skip(self))]
    pub async fn update_status(&self, order_id: OrderId, next: OrderStatus) -> Result<Order> {
        let mut order = self.get_order(order_id).await?;
        let from = order.status();
        order.update_status(next)?;
        self.orders.save(&order).await?;
        self.apply_stock_effects(&order, next).await?;

        metrics::counter!("order_status_changes_total", "status" => next.as_str()).increment(1);
        tracing::info!(%order_id, %from, to = %next, "order status changed");
        Ok(order)
    }

    /// Cancels an order, recording the reason and releasing its stock.
    #[tracing::instrument(skip(self))]
    pub async fn cancel_order(&self, order_id: OrderId, reason: Option<&str>) -> Result<Order> {
        let mut order = self.get_order(order_id).await?;
        let from = order.status();
        order.cancel(reason).map_err(CheckoutError::from_rule)?;
        self.orders.save(&order).await?;
        self.apply_stock_effects(&order, OrderStatus::Cancelled)
            .await?;

        metrics::counter!("order_status_changes_total", "status" => OrderStatus::Cancelled.as_str())
            .increment(1);
        tracing::info!(%order_id, %from, "order cancelled");
        Ok(order)
    }

    async fn place_order(&self, request: &CreateOrderRequest) -> Result<Order> {
        // 1. Validate the request shape
        let lines = parse_lines(&request.items)?;
        let customer = parse_customer(&request.customer)?;
        let address = parse_address(&request.shipping_address)?;
        let (shipping_id, payment_id) =
            parse_method_ids(&request.shipping_method_id, &request.payment_method_id)?;
        let notes = parse_notes(request.notes.as_deref())?;

        // 2. Resolve everything the request refers to
        let summaries = fetch_skus(&self.catalog, &lines).await?;
        let (shipping_method, payment_method) =
            fetch_methods(&self.methods, &shipping_id, &payment_id).await?;

        // 3. Business rules
        check_lines(&lines, &summaries)?;
        let shipping = ShippingInfo::from_method(&shipping_method, address)
            .map_err(CheckoutError::from_rule)?;
        let payment = PaymentInfo::from_method(&payment_method).map_err(CheckoutError::from_rule)?;

        // 4. Snapshot prices and build the order
        let items = lines
            .iter()
            .enumerate()
            .map(|(index, line)| {
                let summary = summaries
                    .get(&line.sku_id)
                    .ok_or_else(|| CheckoutError::NotFound {
                        entity: "SKU",
                        id: line.sku_id.to_string(),
                    })?;
                OrderItem::new(
                    line.sku_id,
                    summary.product_id,
                    &summary.product_name,
                    &summary.sku_name,
                    summary.current_price,
                    line.quantity,
                )
                .map_err(|err| CheckoutError::invalid_input(format!("items[{index}]"), err))
            })
            .collect::<Result<Vec<_>>>()?;

        let order_number = self.orders.generate_order_number().await?;
        let order = Order::create(NewOrder {
            order_number,
            customer,
            items,
            shipping,
            payment,
            notes,
        })?;

        // 5. Reserve stock, then persist
        let mut reserved: Vec<(SkuId, u32)> = Vec::with_capacity(order.item_count());
        for item in order.items() {
            match self.catalog.reserve(item.sku_id(), item.quantity()).await {
                Ok(stock) => {
                    reserved.push((item.sku_id(), item.quantity()));
                    if stock.is_low_stock(self.low_stock_threshold) {
                        tracing::warn!(
                            sku_id = %item.sku_id(),
                            available = stock.available(),
                            "low stock after reservation"
                        );
                    }
                }
                Err(err) => {
                    self.compensate(&reserved).await;
                    return Err(err);
                }
            }
        }

        if let Err(err) = self.orders.save(&order).await {
            self.compensate(&reserved).await;
            return Err(err);
        }

        Ok(order)
    }

    /// Releases reservations in reverse order.
    #[tracing::instrument(skip(self, reserved), fields(reservations = reserved.len()))]
    async fn compensate(&self, reserved: &[(SkuId, u32)]) {
        for (sku_id, quantity) in reserved.iter().rev() {
            match self.catalog.release(&[(*sku_id, *quantity)]).await {
                Ok(()) => {
                    metrics::counter!("stock_reservations_compensated_total").increment(1);
                }
                Err(err) => {
                    tracing::error!(%sku_id, quantity, error = %err, "failed to release reservation");
                }
            }
        }
        if !reserved.is_empty() {
            tracing::warn!(count = reserved.len(), "released stock reservations of failed order");
        }
    }

    /// Runs the stock side of a saved transition as one batch.
    async fn apply_stock_effects(&self, order: &Order, next: OrderStatus) -> Result<()> {
        let lines: Vec<(SkuId, u32)> = order
            .items()
            .iter()
            .map(|item| (item.sku_id(), item.quantity()))
            .collect();
        let result = match next {
            OrderStatus::Shipped => self.catalog.fulfil(&lines).await,
            OrderStatus::Cancelled => self.catalog.release(&lines).await,
            OrderStatus::Pending
            | OrderStatus::Paid
            | OrderStatus::Processing
            | OrderStatus::Delivered
            | OrderStatus::Refunded => Ok(()),
        };
        if let Err(err) = &result {
            tracing::error!(
                order_id = %order.id(),
                status = %next,
                error = %err,
                "stock update failed after status change"
            );
        }
        result
    }
}

fn parse_customer(request: &CustomerRequest) -> Result<CustomerInfo> {
    let email = Email::new(&request.email)
        .map_err(|err| CheckoutError::invalid_input("customer.email", err))?;
    let phone = PhoneNumber::new(&request.phone)
        .map_err(|err| CheckoutError::invalid_input("customer.phone", err))?;
    let customer = CustomerInfo::new(&request.name, email, phone)
        .map_err(|err| CheckoutError::invalid_input("customer.name", err))?;

    match request.customer_id.as_deref() {
        Some(raw) => {
            let customer_id = CustomerId::parse(raw)
                .map_err(|err| CheckoutError::invalid_identifier("customer.customer_id", err))?;
            Ok(customer.with_customer_id(customer_id))
        }
        None => Ok(customer),
    }
}

fn parse_address(request: &AddressRequest) -> Result<Address> {
    Address::new(
        &request.postal_code,
        &request.prefecture,
        &request.city,
        &request.street,
        request.building.as_deref(),
    )
    .map_err(|err| CheckoutError::invalid_input("shipping_address", err))
}

fn parse_notes(notes: Option<&str>) -> Result<Option<String>> {
    match notes.map(str::trim) {
        None | Some("") => Ok(None),
        Some(text) if text.chars().count() > MAX_NOTES_LEN => Err(CheckoutError::validation(
            "notes",
            format!("must be at most {MAX_NOTES_LEN} characters"),
        )),
        Some(text) => Ok(Some(text.to_string())),
    }
}
