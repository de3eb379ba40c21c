use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use axum_extra::extract::CookieJar;

use crate::pkg::{internal::language::LanguageContext, server::state::AppState};

/// Resolves the display language from the locale cookie before the handler
/// runs, so every page renders in its final language on first paint.
pub async fn resolve(
    State(state): State<AppState>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Response {
    let cookie = jar.get(&state.options.locale_cookie).map(|c| c.value());
    let lang = LanguageContext::resolve(cookie, state.options.default_locale);
    tracing::trace!("rendering in {}", lang.locale());
    request.extensions_mut().insert(lang);
    next.run(request).await
}
