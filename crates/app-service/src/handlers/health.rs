//! Health check handler.
//!
//! Liveness only: the service has no downstream dependencies whose state
//! would gate readiness, so a plain 200 "OK" is sufficient for probes.

use tracing::info;

/// Handler for GET /health
///
/// Returns plain text "OK" with no side effects.
pub async fn health_check() -> &'static str {
    info!("Health check");
    "OK"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_health_check_returns_ok() {
        assert_eq!(health_check().await, "OK");
    }
}
