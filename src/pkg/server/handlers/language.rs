use axum::{
    Extension, Form,
    extract::State,
    http::{HeaderMap, header::REFERER},
    response::Redirect,
};
use axum_extra::extract::{CookieJar, cookie::Cookie};
use reqwest::Url;
use serde::Deserialize;

use crate::pkg::{
    internal::{i18n::Locale, language::LanguageContext},
    server::state::AppState,
};

#[derive(Deserialize)]
pub struct LanguageInput {
    pub locale: String,
}

/// Same-site path to send the browser back to after switching.
fn back_to(headers: &HeaderMap) -> String {
    headers
        .get(REFERER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| Url::parse(v).ok())
        .map(|url| match url.query() {
            Some(q) => format!("{}?{}", url.path(), q),
            None => url.path().to_string(),
        })
        .filter(|path| !path.starts_with("//"))
        .unwrap_or_else(|| "/".to_string())
}

/// Applies the new locale and persists it in the locale cookie.
pub async fn set(
    State(state): State<AppState>,
    Extension(mut lang): Extension<LanguageContext>,
    jar: CookieJar,
    headers: HeaderMap,
    Form(input): Form<LanguageInput>,
) -> (CookieJar, Redirect) {
    match input.locale.parse::<Locale>() {
        Ok(locale) => lang.set_language(locale),
        Err(e) => tracing::warn!("keeping {}: {}", lang.locale(), e),
    }
    let cookie = Cookie::build((state.options.locale_cookie.clone(), lang.locale().code()))
        .path("/")
        .permanent();
    (jar.add(cookie), Redirect::to(&back_to(&headers)))
}

#[cfg(test)]
mod tests {
    use axum::http::HeaderValue;

    use super::*;

    #[test]
    fn goes_back_to_referer_path() {
        let mut headers = HeaderMap::new();
        assert_eq!(back_to(&headers), "/");
        headers.insert(
            REFERER,
            HeaderValue::from_static("https://jobs.example.com/platform?location=South"),
        );
        assert_eq!(back_to(&headers), "/platform?location=South");
        headers.insert(REFERER, HeaderValue::from_static("https://evil.example.org/phish"));
        assert_eq!(back_to(&headers), "/phish");
        headers.insert(REFERER, HeaderValue::from_static("https://jobs.example.com//evil.example.org"));
        assert_eq!(back_to(&headers), "/");
    }
}
