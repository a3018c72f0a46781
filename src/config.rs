use std::time::Duration;

// ============================================================================
// Service Configuration
// ============================================================================
//
// All settings come from the environment (optionally seeded from a .env
// file). Missing variables fall back to the defaults used by the
// docker-compose deployment of the sales service.
//
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {key}: {value:?}")]
    Invalid { key: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct Settings {
    /// Port of the public order API
    pub port: u16,
    /// Port of the Prometheus scrape endpoint
    pub metrics_port: u16,
    /// Postgres connection string; `None` selects the in-memory store
    pub database_url: Option<String>,
    pub customer_service_url: String,
    pub product_service_url: String,
    /// Overall deadline for the customer/product validation race
    pub validation_timeout: Duration,
    /// Artificial delay before the background finalizer records completion
    pub finalizer_delay: Duration,
    /// Per-request bound applied by the HTTP client itself
    pub http_client_timeout: Duration,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            port: 3003,
            metrics_port: 9090,
            database_url: None,
            customer_service_url: "http://servico-clientes:3002/clientes".to_string(),
            product_service_url: "http://servico-produtos:3001/produtos".to_string(),
            validation_timeout: Duration::from_secs(5),
            finalizer_delay: Duration::from_millis(100),
            http_client_timeout: Duration::from_secs(10),
        }
    }
}

impl Settings {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build settings from an arbitrary variable source
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        Ok(Self {
            port: parse_or(&lookup, "PORT", defaults.port)?,
            metrics_port: parse_or(&lookup, "METRICS_PORT", defaults.metrics_port)?,
            database_url: lookup("DATABASE_URL").filter(|url| !url.trim().is_empty()),
            customer_service_url: lookup("CUSTOMER_SERVICE_URL")
                .unwrap_or(defaults.customer_service_url),
            product_service_url: lookup("PRODUCT_SERVICE_URL")
                .unwrap_or(defaults.product_service_url),
            validation_timeout: millis_or(&lookup, "VALIDATION_TIMEOUT_MS", defaults.validation_timeout)?,
            finalizer_delay: millis_or(&lookup, "FINALIZER_DELAY_MS", defaults.finalizer_delay)?,
            http_client_timeout: millis_or(&lookup, "HTTP_CLIENT_TIMEOUT_MS", defaults.http_client_timeout)?,
        })
    }
}

fn parse_or<F, T>(lookup: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(key) {
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { key, value }),
        None => Ok(default),
    }
}

fn millis_or<F>(lookup: &F, key: &'static str, default: Duration) -> Result<Duration, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let millis = parse_or(lookup, key, default.as_millis() as u64)?;
    Ok(Duration::from_millis(millis))
}
