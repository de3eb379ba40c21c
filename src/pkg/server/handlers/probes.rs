use axum::extract::State;

use crate::{pkg::server::state::AppState, prelude::Result};

pub async fn livez() -> Result<()> {
    tracing::debug!("service is live");
    Ok(())
}

pub async fn healthz(State(state): State<AppState>) -> Result<()> {
    state.backend.ping().await?;
    tracing::debug!("service is healthy, {} backend reachable", state.backend.tag());
    Ok(())
}
