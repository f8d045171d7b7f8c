use axum::http::StatusCode;

/// Liveness handler for `GET /healthz`.
pub async fn healthz() -> StatusCode {
    StatusCode::OK
}

/// Turn the outcome of a service's readiness probe into the `GET /readyz` status.
///
/// Services supply their own probe (e.g. a database ping) and mount a handler
/// that awaits it and passes the result here.
pub fn readiness(probe: anyhow::Result<()>) -> StatusCode {
    match probe {
        Ok(()) => StatusCode::OK,
        Err(e) => {
            tracing::warn!(error = %e, "readiness probe failed");
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}
