pub mod auth;
pub mod dashboard;
pub mod events;
pub mod language;
pub mod platform;
pub mod probes;

use axum::response::Redirect;
use axum_extra::extract::CookieJar;

use super::state::AppState;

/// Access token carried by the session cookie, if any.
pub fn session_token<'a>(jar: &'a CookieJar, state: &AppState) -> Option<&'a str> {
    jar.get(&state.options.session_cookie)
        .map(|c| c.value())
        .filter(|v| !v.is_empty())
}

pub async fn root() -> Redirect {
    Redirect::to("/platform")
}
