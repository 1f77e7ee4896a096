//! Health check service for the playlist store

use serde::Serialize;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::repositories::PlaylistStore;

/// How long a store ping may take before the store counts as unhealthy
const STORE_PING_TIMEOUT: Duration = Duration::from_secs(5);

/// Status of an individual dependency
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceStatus {
    Healthy,
    Unhealthy,
}

/// Result of a single dependency check
#[derive(Debug, Clone, Serialize)]
pub struct ServiceHealth {
    /// Name of the dependency
    pub name: &'static str,
    /// Current status
    pub status: ServiceStatus,
    /// Response time in milliseconds (if available)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_time_ms: Option<u64>,
    /// Error message if unhealthy
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ServiceHealth {
    pub fn healthy(name: &'static str, response_time: Duration) -> Self {
        Self {
            name,
            status: ServiceStatus::Healthy,
            response_time_ms: Some(response_time.as_millis() as u64),
            error: None,
        }
    }

    pub fn unhealthy(
        name: &'static str,
        error: impl Into<String>,
        response_time: Option<Duration>,
    ) -> Self {
        Self {
            name,
            status: ServiceStatus::Unhealthy,
            response_time_ms: response_time.map(|t| t.as_millis() as u64),
            error: Some(error.into()),
        }
    }
}

/// Aggregated health check response
#[derive(Debug, Clone, Serialize)]
pub struct HealthCheckResponse {
    /// Overall status (healthy only if every dependency is healthy)
    pub status: ServiceStatus,
    pub services: Vec<ServiceHealth>,
    pub total_time_ms: u64,
    /// API version
    pub version: &'static str,
}

impl HealthCheckResponse {
    pub fn new(services: Vec<ServiceHealth>, total_time: Duration) -> Self {
        let status = if services.iter().all(|s| s.status == ServiceStatus::Healthy) {
            ServiceStatus::Healthy
        } else {
            ServiceStatus::Unhealthy
        };

        Self {
            status,
            services,
            total_time_ms: total_time.as_millis() as u64,
            version: env!("CARGO_PKG_VERSION"),
        }
    }

    pub fn is_healthy(&self) -> bool {
        self.status == ServiceStatus::Healthy
    }
}

/// Health check service for verifying the storage backend
#[derive(Clone)]
pub struct HealthService {
    store: Arc<dyn PlaylistStore>,
}

impl HealthService {
    pub fn new(store: Arc<dyn PlaylistStore>) -> Self {
        Self { store }
    }

    /// Ping the playlist store with a timeout
    pub async fn check_store(&self) -> ServiceHealth {
        let start = Instant::now();

        match tokio::time::timeout(STORE_PING_TIMEOUT, self.store.ping()).await {
            Ok(Ok(())) => ServiceHealth::healthy("store", start.elapsed()),
            Ok(Err(e)) => ServiceHealth::unhealthy(
                "store",
                format!("Ping failed: {}", e),
                Some(start.elapsed()),
            ),
            Err(_) => ServiceHealth::unhealthy("store", "Ping timed out", Some(start.elapsed())),
        }
    }

    /// Run every dependency check
    pub async fn check_all(&self) -> HealthCheckResponse {
        let start = Instant::now();
        let store_health = self.check_store().await;

        if store_health.status == ServiceStatus::Unhealthy {
            tracing::warn!(error = ?store_health.error, "Store health check failed");
        }

        HealthCheckResponse::new(vec![store_health], start.elapsed())
    }
}
