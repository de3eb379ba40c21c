use config::{Config, ConfigError, Environment};
use lazy_static::lazy_static;
use serde::Deserialize;

#[derive(Deserialize, Debug)]
pub struct Settings {
    pub service_name: String,
    pub listen_port: String,
    //identity provider + rest backend
    pub supabase_url: String,
    pub supabase_anon_key: String,
    //"rest" talks to postgrest, "postgres" reads the tables directly
    pub backend: String,
    pub database_url: Option<String>,
    pub database_pool_max_connections: u32,
    pub profiles_table: String,
    pub posts_table: String,
    //cookies
    pub session_cookie: String,
    pub locale_cookie: String,
    pub default_locale: String,
    //how often an open page's session is re-checked with the provider
    pub session_recheck_secs: u64,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let conf = Config::builder()
            .set_default("service_name", "jobboard")?
            .set_default("listen_port", "3000")?
            .set_default("supabase_url", "http://localhost:54321")?
            .set_default("supabase_anon_key", "")?
            .set_default("backend", "rest")?
            .set_default("database_pool_max_connections", 5)?
            .set_default("profiles_table", "profiles")?
            .set_default("posts_table", "hr_posts")?
            .set_default("session_cookie", "sb-access-token")?
            .set_default("locale_cookie", "NEXT_LOCALE")?
            .set_default("default_locale", "he")?
            .set_default("session_recheck_secs", 30)?
            .add_source(Environment::default())
            .build()?;
        let mut s: Settings = conf.try_deserialize()?;
        s.supabase_url = s.supabase_url.trim_end_matches('/').to_string();
        match s.backend.as_str() {
            "rest" => {}
            "postgres" => {
                if s.database_url.as_deref().unwrap_or("").is_empty() {
                    return Err(ConfigError::Message(
                        "database_url is required when backend=postgres".into(),
                    ));
                }
            }
            other => {
                return Err(ConfigError::Message(format!("unknown backend: {}", other)));
            }
        }
        Ok(s)
    }
}

lazy_static! {
    pub static ref settings: Settings = Settings::new().expect("improperly configured");
}
