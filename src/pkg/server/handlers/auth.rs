use askama::Template;
use axum::{
    Extension, Form,
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
};
use axum_extra::extract::{
    CookieJar,
    cookie::{Cookie, SameSite},
};
use serde::Deserialize;
use standard_error::{StandardError, Status};
use validator::Validate;

use crate::{
    pkg::{
        internal::{bootstrap::LOGIN_PATH, language::LanguageContext},
        server::{handlers::session_token, state::AppState, uispec::Login},
    },
    prelude::Result,
};

pub const AFTER_LOGIN_PATH: &str = "/dashboard";
const INVALID_CREDENTIALS: &str = "ERR-AUTH-002";

#[derive(Deserialize, Validate)]
pub struct LoginInput {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1))]
    pub password: String,
}

pub async fn login_page(
    State(state): State<AppState>,
    Extension(lang): Extension<LanguageContext>,
    jar: CookieJar,
) -> Result<Response> {
    if state.auth.get_session(session_token(&jar, &state)).await.is_some() {
        return Ok(Redirect::to(AFTER_LOGIN_PATH).into_response());
    }
    let template = Login {
        lang,
        header_name: None,
        email: "",
        error: None,
    };
    Ok(Html(template.render()?).into_response())
}

pub async fn login(
    State(state): State<AppState>,
    Extension(lang): Extension<LanguageContext>,
    jar: CookieJar,
    Form(input): Form<LoginInput>,
) -> Result<Response> {
    let result = match input.validate() {
        Ok(()) => state.auth.sign_in_with_password(&input.email, &input.password).await,
        Err(e) => {
            tracing::debug!("login form rejected: {}", e);
            Err(StandardError::new(INVALID_CREDENTIALS).code(StatusCode::UNAUTHORIZED))
        }
    };
    let session = match result {
        Ok(session) => session,
        Err(e) => {
            let (status, message) = if e.err_code == INVALID_CREDENTIALS {
                (StatusCode::UNAUTHORIZED, lang.t("auth-invalid-credentials"))
            } else {
                tracing::error!("sign in failed: {:?}", e);
                (StatusCode::SERVICE_UNAVAILABLE, lang.t("auth-unavailable"))
            };
            let template = Login {
                lang,
                header_name: None,
                email: &input.email,
                error: Some(message.into_owned()),
            };
            return Ok((status, Html(template.render()?)).into_response());
        }
    };
    let cookie = Cookie::build((state.options.session_cookie.clone(), session.access_token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax);
    Ok((jar.add(cookie), Redirect::to(AFTER_LOGIN_PATH)).into_response())
}

/// Ends the provider session when there is one, always drops the cookie and
/// answers 303 so the browser follows up with a GET of the login page.
pub async fn signout(State(state): State<AppState>, jar: CookieJar) -> (CookieJar, Redirect) {
    let token = session_token(&jar, &state).map(str::to_string);
    if let Some(session) = state.auth.get_session(token.as_deref()).await {
        if let Err(e) = state.auth.sign_out(&session).await {
            tracing::error!("provider sign out failed for {}: {:?}", &session.user.id, e);
        }
    }
    let removal = Cookie::build((state.options.session_cookie.clone(), "")).path("/");
    (jar.remove(removal), Redirect::to(LOGIN_PATH))
}
