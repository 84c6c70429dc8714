//! Health check command for host monitoring

use crate::utils::health::HealthStatus;
use crate::AppContext;

/// Get application health status
///
/// Returns the component-by-component picture plus an overall score and
/// classification. Infallible: a broken database shows up as an
/// unhealthy component, not as an error.
///
/// # Example Response
/// ```json
/// {
///   "state": "healthy",
///   "score": 1.0,
///   "message": null,
///   "components": [
///     { "name": "database", "is_healthy": true, "message": null },
///     { "name": "collection_service", "is_healthy": true, "message": null },
///     { "name": "sync_engine", "is_healthy": true, "message": null }
///   ],
///   "timestamp": 1756000000
/// }
/// ```
pub async fn get_app_health(ctx: &AppContext) -> HealthStatus {
    ctx.health_check().await
}
