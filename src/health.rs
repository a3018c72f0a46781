use chrono::{DateTime, Utc};
use serde::Serialize;

// ============================================================================
// Health Check Abstractions
// ============================================================================

/// Health status of a component
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", content = "reason", rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Unhealthy(String),
}

impl HealthStatus {
    pub fn is_unhealthy(&self) -> bool {
        matches!(self, HealthStatus::Unhealthy(_))
    }
}

/// Health information for a component
#[derive(Debug, Clone, Serialize)]
pub struct ComponentHealth {
    pub name: String,
    pub status: HealthStatus,
    pub last_check: DateTime<Utc>,
    pub details: Option<String>,
}

impl ComponentHealth {
    pub fn new(name: impl Into<String>, status: HealthStatus) -> Self {
        Self {
            name: name.into(),
            status,
            last_check: Utc::now(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}

/// Fold component states into one: every unhealthy component is named
pub fn overall_status(components: &[ComponentHealth]) -> HealthStatus {
    let unhealthy_components: Vec<String> = components
        .iter()
        .filter_map(|health| match &health.status {
            HealthStatus::Unhealthy(msg) => Some(format!("{}: {}", health.name, msg)),
            HealthStatus::Healthy => None,
        })
        .collect();

    if unhealthy_components.is_empty() {
        HealthStatus::Healthy
    } else {
        HealthStatus::Unhealthy(unhealthy_components.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_healthy() {
        let components = vec![ComponentHealth::new("order_store", HealthStatus::Healthy)];
        assert_eq!(overall_status(&components), HealthStatus::Healthy);
    }

    #[test]
    fn test_no_components_is_healthy() {
        assert_eq!(overall_status(&[]), HealthStatus::Healthy);
    }

    #[test]
    fn test_unhealthy_component_wins() {
        let components = vec![
            ComponentHealth::new("metrics", HealthStatus::Healthy),
            ComponentHealth::new("order_store", HealthStatus::Unhealthy("connection refused".to_string())),
        ];

        let status = overall_status(&components);
        assert!(status.is_unhealthy());
        assert_eq!(status, HealthStatus::Unhealthy("order_store: connection refused".to_string()));
    }

    #[test]
    fn test_serialization_shape() {
        let health = ComponentHealth::new("order_store", HealthStatus::Unhealthy("down".to_string()))
            .with_details("postgres");
        let json = serde_json::to_value(&health).unwrap();

        assert_eq!(json["status"]["state"], "unhealthy");
        assert_eq!(json["status"]["reason"], "down");
        assert_eq!(json["details"], "postgres");
    }
}
