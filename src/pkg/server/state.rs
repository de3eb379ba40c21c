use std::sync::Arc;
use std::time::Duration;

use standard_error::{Interpolate, StandardError};

use crate::{
    conf::settings,
    pkg::internal::{
        auth::{Auth, GoTrueClient},
        backend::{Backend, QueryClient, postgres::PgClient, rest::RestClient},
        i18n::Locale,
    },
    prelude::Result,
};

/// Per-deployment knobs the handlers need, copied out of settings once.
#[derive(Debug, Clone)]
pub struct PageOptions {
    pub profiles_table: String,
    pub posts_table: String,
    pub session_cookie: String,
    pub locale_cookie: String,
    pub default_locale: Locale,
    pub session_recheck: Duration,
}

impl Default for PageOptions {
    fn default() -> Self {
        PageOptions {
            profiles_table: "profiles".into(),
            posts_table: "hr_posts".into(),
            session_cookie: "sb-access-token".into(),
            locale_cookie: "NEXT_LOCALE".into(),
            default_locale: Locale::He,
            session_recheck: Duration::from_secs(30),
        }
    }
}

pub fn query_client() -> Result<Arc<dyn QueryClient>> {
    let client: Arc<dyn QueryClient> = match settings.backend.as_str() {
        "postgres" => {
            let url = settings
                .database_url
                .as_deref()
                .ok_or_else(|| StandardError::new("ERR-DB-001"))?;
            Arc::new(PgClient::connect_lazy(url, settings.database_pool_max_connections)?)
        }
        _ => Arc::new(RestClient::new(&settings.supabase_url, &settings.supabase_anon_key)?),
    };
    Ok(client)
}

#[derive(Clone)]
pub struct AppState {
    pub auth: Auth,
    pub backend: Backend,
    pub options: Arc<PageOptions>,
}

impl AppState {
    pub async fn new() -> Result<AppState> {
        let provider = GoTrueClient::new(&settings.supabase_url, &settings.supabase_anon_key)?;
        let default_locale = settings.default_locale.parse::<Locale>().map_err(|e| {
            StandardError::new("ERR-CONF-001").interpolate_err(e)
        })?;
        let options = PageOptions {
            profiles_table: settings.profiles_table.clone(),
            posts_table: settings.posts_table.clone(),
            session_cookie: settings.session_cookie.clone(),
            locale_cookie: settings.locale_cookie.clone(),
            default_locale,
            session_recheck: Duration::from_secs(settings.session_recheck_secs.max(1)),
        };
        let state = AppState::with_parts(Auth::new(Arc::new(provider)), Backend::new(query_client()?), options);
        tracing::info!(
            "using {} backend, posts from {}",
            state.backend.tag(),
            &state.options.posts_table
        );
        Ok(state)
    }

    pub fn with_parts(auth: Auth, backend: Backend, options: PageOptions) -> Self {
        AppState {
            auth,
            backend,
            options: Arc::new(options),
        }
    }
}
