use axum::middleware::from_fn_with_state;
use axum::routing::post;
use axum::{Router, routing::get};

use super::handlers;
use super::handlers::probes::{healthz, livez};
use super::middlewares::language;
use super::state::AppState;
use crate::prelude::Result;

pub async fn build_routes() -> Result<Router> {
    let state = AppState::new().await?;
    Ok(routes(state))
}

pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::root))
        .route("/dashboard", get(handlers::dashboard::show))
        .route("/platform", get(handlers::platform::show))
        .route(
            "/login",
            get(handlers::auth::login_page).post(handlers::auth::login),
        )
        .route("/signout", post(handlers::auth::signout))
        .route("/language", post(handlers::language::set))
        .route("/session/events", get(handlers::events::session))
        .layer(from_fn_with_state(state.clone(), language::resolve))
        .route("/healthz", get(healthz))
        .route("/livez", get(livez))
        .with_state(state)
}
