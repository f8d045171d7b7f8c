use axum::extract::State;
use axum::http::StatusCode;

use campus_core::health::readiness;

use crate::state::AppState;

/// `GET /readyz`: ready once the database answers a ping.
pub async fn readyz(State(state): State<AppState>) -> StatusCode {
    readiness(state.db.ping().await.map_err(anyhow::Error::from))
}
