use askama::Template;
use axum::{
    Extension,
    extract::State,
    response::{Html, IntoResponse, Redirect, Response},
};
use axum_extra::extract::CookieJar;

use crate::{
    pkg::{
        internal::{
            bootstrap::{Bootstrap, protected_page},
            language::LanguageContext,
        },
        server::{handlers::session_token, state::AppState, uispec::Dashboard},
    },
    prelude::Result,
};

pub async fn show(
    State(state): State<AppState>,
    Extension(lang): Extension<LanguageContext>,
    jar: CookieJar,
) -> Result<Response> {
    let token = session_token(&jar, &state);
    let outcome = protected_page(&state.auth, &state.backend, &state.options.profiles_table, token).await;
    let profile = match outcome {
        Bootstrap::Redirect(to) => return Ok(Redirect::to(to).into_response()),
        Bootstrap::Ready { profile, .. } => profile,
    };
    let template = Dashboard {
        lang,
        header_name: profile.as_ref().map(|p| p.full_name.as_str()),
        profile: profile.as_ref(),
        member_since: profile
            .as_ref()
            .map(|p| lang.locale().format_date(&p.created_at))
            .unwrap_or_default(),
        account_type: profile
            .as_ref()
            .and_then(|p| p.account_type.as_deref())
            .unwrap_or("—"),
    };
    Ok(Html(template.render()?).into_response())
}
