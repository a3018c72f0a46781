use async_trait::async_trait;
use reqwest::{StatusCode, Url};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;

use super::{LookupError, RemoteLookup, Resource};
use crate::metrics::Metrics;
use crate::models::{Customer, Product};

// ============================================================================
// HTTP Lookup Client
// ============================================================================
//
// GET {base}/{id} against the customer and product services. Anything
// other than 200 with a well-formed body means the entity is unusable
// for order creation.
//
// ============================================================================

pub struct HttpLookupClient {
    client: reqwest::Client,
    customer_base: Url,
    product_base: Url,
    metrics: Option<Arc<Metrics>>,
}

impl HttpLookupClient {
    pub fn new(customer_base: &str, product_base: &str, timeout: Duration) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| anyhow::anyhow!("Failed to build HTTP client: {}", e))?;

        Ok(Self {
            client,
            customer_base: parse_base(customer_base)?,
            product_base: parse_base(product_base)?,
            metrics: None,
        })
    }

    pub fn with_metrics(mut self, metrics: Arc<Metrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    async fn fetch<T: DeserializeOwned>(&self, resource: Resource, id: &str) -> Result<T, LookupError> {
        let base = match resource {
            Resource::Customer => &self.customer_base,
            Resource::Product => &self.product_base,
        };

        let result = self.fetch_from(base, resource, id).await;

        if let Some(ref metrics) = self.metrics {
            let outcome = match &result {
                Ok(_) => "success",
                Err(e) => e.outcome(),
            };
            metrics.record_lookup(resource.as_str(), outcome);
        }

        result
    }

    async fn fetch_from<T: DeserializeOwned>(
        &self,
        base: &Url,
        resource: Resource,
        id: &str,
    ) -> Result<T, LookupError> {
        let url = resource_url(base, resource, id)?;

        tracing::debug!(resource = %resource, id = %id, url = %url, "Fetching remote entity");

        let response = self.client.get(url).send().await.map_err(|e| LookupError::Transport {
            resource,
            message: e.to_string(),
        })?;

        let status = response.status();
        if status != StatusCode::OK {
            tracing::debug!(resource = %resource, id = %id, status = status.as_u16(), "Remote entity not found");
            return Err(LookupError::NotFound {
                resource,
                id: id.to_string(),
                status: status.as_u16(),
            });
        }

        response.json::<T>().await.map_err(|e| {
            if e.is_decode() {
                LookupError::Malformed { resource, message: e.to_string() }
            } else {
                LookupError::Transport { resource, message: e.to_string() }
            }
        })
    }
}

#[async_trait]
impl RemoteLookup for HttpLookupClient {
    async fn fetch_customer(&self, id: &str) -> Result<Customer, LookupError> {
        self.fetch(Resource::Customer, id).await
    }

    async fn fetch_product(&self, id: &str) -> Result<Product, LookupError> {
        let product: Product = self.fetch(Resource::Product, id).await?;

        if !product.has_valid_price() {
            return Err(LookupError::Malformed {
                resource: Resource::Product,
                message: format!("invalid unit price {} for product {}", product.unit_price, id),
            });
        }

        Ok(product)
    }
}

fn parse_base(base: &str) -> anyhow::Result<Url> {
    let url = Url::parse(base).map_err(|e| anyhow::anyhow!("Invalid service URL {}: {}", base, e))?;
    if url.cannot_be_a_base() {
        anyhow::bail!("Service URL cannot carry a path: {}", base);
    }
    Ok(url)
}

/// Append the id as a single escaped path segment
fn resource_url(base: &Url, resource: Resource, id: &str) -> Result<Url, LookupError> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|_| LookupError::Transport {
            resource,
            message: format!("base URL {} cannot carry a path", base),
        })?
        .pop_if_empty()
        .push(id);
    Ok(url)
}
