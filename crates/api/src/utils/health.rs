//! Health check infrastructure for AppContext components
//!
//! Provides HealthStatus and ComponentHealth types for monitoring
//! application health from the embedding layer.

use std::time::{SystemTime, UNIX_EPOCH};

use jimpitan_domain::impl_status_conversions;
use serde::{Deserialize, Serialize};

/// Coarse health classification derived from the component score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthState {
    /// Every component reported healthy.
    Healthy,
    /// At least one component is down but the app is still usable.
    Degraded,
    /// Too many components are down to trust the app.
    Unhealthy,
}

impl_status_conversions!(HealthState {
    Healthy => "healthy",
    Degraded => "degraded",
    Unhealthy => "unhealthy",
});

/// Overall health status of the application
///
/// # Example
/// ```
/// use jimpitan_app::utils::health::{ComponentHealth, HealthState, HealthStatus};
///
/// let mut status = HealthStatus::new();
/// status = status.add_component(ComponentHealth::healthy("database"));
/// status = status.add_component(ComponentHealth::unhealthy("sync_engine", "not running"));
/// status.calculate_score();
///
/// assert_eq!(status.score, 0.5); // 1 out of 2 components healthy
/// assert_eq!(status.state, HealthState::Unhealthy); // below 0.8 threshold
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthStatus {
    /// Coarse classification: healthy, degraded, or unhealthy
    pub state: HealthState,

    /// Health score from 0.0 (completely unhealthy) to 1.0 (fully healthy)
    ///
    /// Calculated as: (healthy_components / total_components)
    pub score: f64,

    /// Optional message describing overall health state
    pub message: Option<String>,

    /// Individual component health checks
    pub components: Vec<ComponentHealth>,

    /// Unix timestamp when health check was performed
    pub timestamp: i64,
}

impl HealthStatus {
    /// Create a new health status with default values
    ///
    /// Initial state: healthy with score 1.0, no components
    pub fn new() -> Self {
        Self {
            state: HealthState::Healthy,
            score: 1.0,
            message: None,
            components: Vec::new(),
            timestamp: unix_now(),
        }
    }

    /// Add a component health check to the status
    ///
    /// Returns self for method chaining
    pub fn add_component(mut self, component: ComponentHealth) -> Self {
        self.components.push(component);
        self
    }

    /// Calculate the overall score and classification from the components.
    ///
    /// Score = healthy_components / total_components. A perfect score is
    /// `Healthy`, 0.8 and above is `Degraded`, anything lower is
    /// `Unhealthy`. Call after all components have been added.
    pub fn calculate_score(&mut self) {
        if self.components.is_empty() {
            return;
        }

        let healthy_count = self.components.iter().filter(|c| c.is_healthy).count();

        self.score = healthy_count as f64 / self.components.len() as f64;
        self.state = if self.score >= 1.0 {
            HealthState::Healthy
        } else if self.score >= 0.8 {
            HealthState::Degraded
        } else {
            HealthState::Unhealthy
        };
    }

    /// Whether the app is usable: healthy or degraded, but not down.
    pub fn is_usable(&self) -> bool {
        !matches!(self.state, HealthState::Unhealthy)
    }

    /// Create an unhealthy status with a message
    ///
    /// Convenience constructor for error cases
    pub fn unhealthy(message: impl Into<String>) -> Self {
        Self {
            state: HealthState::Unhealthy,
            score: 0.0,
            message: Some(message.into()),
            components: Vec::new(),
            timestamp: unix_now(),
        }
    }
}

impl Default for HealthStatus {
    fn default() -> Self {
        Self::new()
    }
}

/// Health status of an individual component
///
/// # Example
/// ```
/// use jimpitan_app::utils::health::ComponentHealth;
///
/// let db = ComponentHealth::healthy("database");
/// assert!(db.is_healthy);
///
/// let engine = ComponentHealth::unhealthy("sync_engine", "task not running");
/// assert!(!engine.is_healthy);
/// assert_eq!(engine.message, Some("task not running".to_string()));
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComponentHealth {
    /// Component identifier (e.g., "database", "sync_engine")
    pub name: String,

    /// Whether the component is healthy
    pub is_healthy: bool,

    /// Optional message describing health state or error
    pub message: Option<String>,
}

impl ComponentHealth {
    /// Create a healthy component status
    pub fn healthy(name: impl Into<String>) -> Self {
        Self { name: name.into(), is_healthy: true, message: None }
    }

    /// Create an unhealthy component status with a message
    pub fn unhealthy(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self { name: name.into(), is_healthy: false, message: Some(message.into()) }
    }
}

fn unix_now() -> i64 {
    SystemTime::now().duration_since(UNIX_EPOCH).map(|d| d.as_secs()).unwrap_or_default() as i64
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;

    #[test]
    fn test_health_status_new() {
        let status = HealthStatus::new();
        assert_eq!(status.state, HealthState::Healthy);
        assert_eq!(status.score, 1.0);
        assert!(status.message.is_none());
        assert!(status.components.is_empty());
    }

    #[test]
    fn test_health_status_add_component() {
        let status = HealthStatus::new()
            .add_component(ComponentHealth::healthy("database"))
            .add_component(ComponentHealth::healthy("guard_store"));

        assert_eq!(status.components.len(), 2);
        assert_eq!(status.components[0].name, "database");
        assert_eq!(status.components[1].name, "guard_store");
    }

    #[test]
    fn test_calculate_score_all_healthy() {
        let mut status = HealthStatus::new()
            .add_component(ComponentHealth::healthy("database"))
            .add_component(ComponentHealth::healthy("sync_engine"));

        status.calculate_score();

        assert_eq!(status.score, 1.0);
        assert_eq!(status.state, HealthState::Healthy);
        assert!(status.is_usable());
    }

    #[test]
    fn test_calculate_score_half_healthy() {
        let mut status = HealthStatus::new()
            .add_component(ComponentHealth::healthy("database"))
            .add_component(ComponentHealth::unhealthy("sync_engine", "error"));

        status.calculate_score();

        assert_eq!(status.score, 0.5);
        assert_eq!(status.state, HealthState::Unhealthy);
        assert!(!status.is_usable());
    }

    #[test]
    fn test_calculate_score_degraded_at_threshold() {
        let mut status = HealthStatus::new()
            .add_component(ComponentHealth::healthy("database"))
            .add_component(ComponentHealth::healthy("guard_store"))
            .add_component(ComponentHealth::healthy("collection_service"))
            .add_component(ComponentHealth::healthy("retention_service"))
            .add_component(ComponentHealth::unhealthy("sync_engine", "error"));

        status.calculate_score();

        assert_eq!(status.score, 0.8); // 4/5 = 0.8
        assert_eq!(status.state, HealthState::Degraded);
        assert!(status.is_usable());
    }

    #[test]
    fn test_component_health_constructors() {
        let healthy = ComponentHealth::healthy("test");
        assert!(healthy.is_healthy);
        assert_eq!(healthy.name, "test");
        assert!(healthy.message.is_none());

        let unhealthy = ComponentHealth::unhealthy("test", "failed");
        assert!(!unhealthy.is_healthy);
        assert_eq!(unhealthy.name, "test");
        assert_eq!(unhealthy.message, Some("failed".to_string()));
    }

    #[test]
    fn test_health_state_conversions() {
        assert_eq!(HealthState::Degraded.to_string(), "degraded");
        assert_eq!(HealthState::from_str("HEALTHY").unwrap(), HealthState::Healthy);
        assert!(HealthState::from_str("flaky").is_err());
    }

    #[test]
    fn test_health_state_serializes_lowercase() {
        let json = serde_json::to_value(HealthState::Unhealthy).expect("state serializes");
        assert_eq!(json, serde_json::Value::String("unhealthy".to_string()));
    }
}
