use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::{JoinError, JoinHandle};
use tokio::time::{sleep_until, timeout_at, Instant};

use crate::background::BackgroundFinalizer;
use crate::clients::{LookupError, RemoteLookup, Resource};
use crate::metrics::Metrics;
use crate::models::{Customer, Product};
use crate::store::OrderStore;

use super::aggregate::Order;
use super::commands::CreateOrder;
use super::errors::OrderError;

// ============================================================================
// Order Command Handler
// ============================================================================
//
// Orchestrates: Command → parallel lookups → Order → Store → Finalizer
//
// One task fetches the customer, a second fetches every product in request
// order. The first terminal signal decides the outcome; the other task is
// then awaited only for whatever is left of the same deadline. A task that
// loses the race is detached, never cancelled.
//
// ============================================================================

type ProductCatalog = HashMap<String, Product>;

#[derive(Debug)]
struct ProductLookupFailure {
    product_id: String,
    source: LookupError,
}

enum FirstSignal {
    Customer(Result<Customer, LookupError>),
    Products(Result<ProductCatalog, ProductLookupFailure>),
}

pub struct OrderCommandHandler {
    lookup: Arc<dyn RemoteLookup>,
    store: Arc<dyn OrderStore>,
    finalizer: BackgroundFinalizer,
    metrics: Arc<Metrics>,
    validation_timeout: Duration,
}

impl OrderCommandHandler {
    pub fn new(
        lookup: Arc<dyn RemoteLookup>,
        store: Arc<dyn OrderStore>,
        finalizer: BackgroundFinalizer,
        metrics: Arc<Metrics>,
        validation_timeout: Duration,
    ) -> Self {
        Self {
            lookup,
            store,
            finalizer,
            metrics,
            validation_timeout,
        }
    }

    /// Validate, price, persist and hand the order to the background finalizer
    pub async fn create_order(&self, command: CreateOrder) -> Result<Order, OrderError> {
        let result = self.try_create_order(&command).await;

        match &result {
            Ok(order) => {
                self.metrics.orders_created.inc();
                tracing::info!(
                    order_id = %order.id,
                    customer_id = %order.customer_id,
                    total = order.total,
                    "✅ Order created"
                );
            }
            Err(e) => {
                self.metrics.record_order_failure(e.reason());
                tracing::warn!(
                    customer_id = %command.customer_id,
                    reason = e.reason(),
                    error = %e,
                    "Order rejected"
                );
            }
        }

        result
    }

    async fn try_create_order(&self, command: &CreateOrder) -> Result<Order, OrderError> {
        command.validate()?;

        tracing::info!(
            customer_id = %command.customer_id,
            line_count = command.lines.len(),
            "Creating new order"
        );

        let started = Instant::now();
        let validated = self.validate_remote(command).await;
        let outcome = match &validated {
            Ok(_) => "success",
            Err(e) => e.reason(),
        };
        self.metrics.record_validation(outcome, started.elapsed().as_secs_f64());

        let (customer, products) = validated?;
        let order = Order::assemble(&customer, &command.lines, &products)?;

        self.store.append(&order).await.map_err(OrderError::Persistence)?;

        self.finalizer.dispatch(order.clone());

        Ok(order)
    }

    /// Race the customer lookup against the product lookups under one deadline
    async fn validate_remote(&self, command: &CreateOrder) -> Result<(Customer, ProductCatalog), OrderError> {
        let deadline = Instant::now() + self.validation_timeout;
        let product_ids: Vec<String> = command.lines.iter().map(|l| l.product_id.clone()).collect();
        let requested = product_ids.join(",");

        let mut customer_task = spawn_customer_lookup(self.lookup.clone(), command.customer_id.clone());
        let mut product_task = spawn_product_lookups(self.lookup.clone(), product_ids);

        // Stage 1: first terminal signal or the deadline
        let first = tokio::select! {
            biased;
            joined = &mut customer_task => FirstSignal::Customer(flatten_customer(joined)),
            joined = &mut product_task => FirstSignal::Products(flatten_products(joined, &requested)),
            _ = sleep_until(deadline) => {
                tracing::debug!(customer_id = %command.customer_id, "Validation deadline elapsed before any lookup finished");
                return Err(OrderError::Timeout(self.validation_timeout));
            }
        };

        // Stage 2: the other signal, bounded by what is left of the deadline
        match first {
            FirstSignal::Customer(Err(source)) => Err(customer_not_found(command, source)),
            FirstSignal::Products(Err(failure)) => Err(product_not_found(failure)),
            FirstSignal::Customer(Ok(customer)) => {
                let joined = timeout_at(deadline, product_task)
                    .await
                    .map_err(|_| OrderError::Timeout(self.validation_timeout))?;
                let products = flatten_products(joined, &requested).map_err(product_not_found)?;
                Ok((customer, products))
            }
            FirstSignal::Products(Ok(products)) => {
                let joined = timeout_at(deadline, customer_task)
                    .await
                    .map_err(|_| OrderError::Timeout(self.validation_timeout))?;
                let customer = flatten_customer(joined).map_err(|source| customer_not_found(command, source))?;
                Ok((customer, products))
            }
        }
    }
}

fn spawn_customer_lookup(
    lookup: Arc<dyn RemoteLookup>,
    customer_id: String,
) -> JoinHandle<Result<Customer, LookupError>> {
    tokio::spawn(async move { lookup.fetch_customer(&customer_id).await })
}

/// Products are fetched one after another inside a single task; the first
/// failure ends the task.
fn spawn_product_lookups(
    lookup: Arc<dyn RemoteLookup>,
    product_ids: Vec<String>,
) -> JoinHandle<Result<ProductCatalog, ProductLookupFailure>> {
    tokio::spawn(async move {
        let mut products = ProductCatalog::with_capacity(product_ids.len());

        for product_id in product_ids {
            match lookup.fetch_product(&product_id).await {
                Ok(product) => {
                    products.insert(product_id, product);
                }
                Err(source) => return Err(ProductLookupFailure { product_id, source }),
            }
        }

        Ok(products)
    })
}

fn flatten_customer(joined: Result<Result<Customer, LookupError>, JoinError>) -> Result<Customer, LookupError> {
    joined.unwrap_or_else(|e| {
        Err(LookupError::Aborted {
            resource: Resource::Customer,
            message: e.to_string(),
        })
    })
}

fn flatten_products(
    joined: Result<Result<ProductCatalog, ProductLookupFailure>, JoinError>,
    requested: &str,
) -> Result<ProductCatalog, ProductLookupFailure> {
    joined.unwrap_or_else(|e| {
        Err(ProductLookupFailure {
            product_id: requested.to_string(),
            source: LookupError::Aborted {
                resource: Resource::Product,
                message: e.to_string(),
            },
        })
    })
}

fn customer_not_found(command: &CreateOrder, source: LookupError) -> OrderError {
    OrderError::CustomerNotFound {
        customer_id: command.customer_id.clone(),
        source,
    }
}

fn product_not_found(failure: ProductLookupFailure) -> OrderError {
    OrderError::ProductNotFound {
        product_id: failure.product_id,
        source: failure.source,
    }
}
