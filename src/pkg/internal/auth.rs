use std::sync::Arc;
use std::time::Duration;

use axum::http::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::json;
use standard_error::{Interpolate, StandardError, Status};
use tokio::sync::broadcast;
use tokio::time::{self, MissedTickBehavior};

use crate::prelude::Result;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionUser {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub access_token: String,
    pub user: SessionUser,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthEventKind {
    SignedIn,
    SignedOut,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthEvent {
    pub kind: AuthEventKind,
    pub user_id: String,
}

#[async_trait::async_trait]
pub trait IdentityProvider: Send + Sync {
    /// `Ok(None)` when the token is missing, expired or revoked.
    async fn get_session(&self, access_token: &str) -> Result<Option<Session>>;

    async fn sign_in_with_password(&self, email: &str, password: &str) -> Result<Session>;

    async fn sign_out(&self, session: &Session) -> Result<()>;
}

/// Identity provider handle shared by every page, plus the auth state
/// notifications pages subscribe to.
#[derive(Clone)]
pub struct Auth {
    provider: Arc<dyn IdentityProvider>,
    events: broadcast::Sender<AuthEvent>,
}

impl Auth {
    pub fn new(provider: Arc<dyn IdentityProvider>) -> Self {
        let (events, _) = broadcast::channel(64);
        Auth { provider, events }
    }

    /// Provider failures count as "signed out"; the caller redirects either way.
    pub async fn get_session(&self, access_token: Option<&str>) -> Option<Session> {
        let token = access_token.filter(|t| !t.is_empty())?;
        match self.provider.get_session(token).await {
            Ok(session) => session,
            Err(e) => {
                tracing::error!("error getting session: {:?}", e);
                None
            }
        }
    }

    pub async fn sign_in_with_password(&self, email: &str, password: &str) -> Result<Session> {
        let session = self.provider.sign_in_with_password(email, password).await?;
        tracing::info!("user {} signed in", &session.user.id);
        self.publish(AuthEventKind::SignedIn, &session.user.id);
        Ok(session)
    }

    /// Subscribers hear about the sign-out even if the provider call failed,
    /// since the caller drops the session cookie regardless.
    pub async fn sign_out(&self, session: &Session) -> Result<()> {
        let result = self.provider.sign_out(session).await;
        self.publish(AuthEventKind::SignedOut, &session.user.id);
        tracing::info!("user {} signed out", &session.user.id);
        result
    }

    pub fn on_auth_state_change(&self) -> AuthSubscription {
        AuthSubscription {
            rx: self.events.subscribe(),
        }
    }

    async fn still_valid(&self, session: &Session) -> bool {
        self.get_session(Some(&session.access_token))
            .await
            .is_some_and(|current| current.user.id == session.user.id)
    }

    pub fn subscriber_count(&self) -> usize {
        self.events.receiver_count()
    }

    fn publish(&self, kind: AuthEventKind, user_id: &str) {
        // no receivers is fine, nobody is watching
        let _ = self.events.send(AuthEvent {
            kind,
            user_id: user_id.to_string(),
        });
    }
}

/// Live auth state feed. Dropping it unsubscribes.
pub struct AuthSubscription {
    rx: broadcast::Receiver<AuthEvent>,
}

impl AuthSubscription {
    /// Resolves once `session` is over: signed out through this server, or
    /// no longer accepted by the provider when re-checked every `every` or
    /// after the feed skipped events. `false` when the server shuts down.
    pub async fn session_ended(&mut self, auth: &Auth, session: &Session, every: Duration) -> bool {
        let mut ticks = time::interval(every);
        ticks.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // the first tick fires immediately and the caller just checked
        ticks.tick().await;
        loop {
            tokio::select! {
                received = self.rx.recv() => match received {
                    Ok(event) => {
                        if event.kind == AuthEventKind::SignedOut && event.user_id == session.user.id {
                            return true;
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        tracing::warn!("auth subscriber skipped {} events, re-checking session", n);
                        if !auth.still_valid(session).await {
                            return true;
                        }
                    }
                    Err(broadcast::error::RecvError::Closed) => return false,
                },
                _ = ticks.tick() => {
                    if !auth.still_valid(session).await {
                        tracing::info!("session for {} ended at the provider", &session.user.id);
                        return true;
                    }
                }
            }
        }
    }

    pub fn unsubscribe(self) {}
}

/// Hosted identity provider speaking the GoTrue api under `{base}/auth/v1`.
#[derive(Debug, Clone)]
pub struct GoTrueClient {
    http: reqwest::Client,
    base_url: String,
    anon_key: String,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    user: SessionUser,
}

impl GoTrueClient {
    pub fn new(base_url: &str, anon_key: &str) -> Result<Self> {
        let http = reqwest::Client::builder()
            .build()
            .map_err(|e| StandardError::new("ERR-AUTH-000").interpolate_err(e.to_string()))?;
        Ok(GoTrueClient {
            http,
            base_url: format!("{}/auth/v1", base_url.trim_end_matches('/')),
            anon_key: anon_key.to_string(),
        })
    }
}

#[async_trait::async_trait]
impl IdentityProvider for GoTrueClient {
    async fn get_session(&self, access_token: &str) -> Result<Option<Session>> {
        let response = self
            .http
            .get(format!("{}/user", &self.base_url))
            .header("apikey", &self.anon_key)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| StandardError::new("ERR-AUTH-000").interpolate_err(e.to_string()))?;
        match response.status() {
            s if s.is_success() => {
                let user = response
                    .json::<SessionUser>()
                    .await
                    .map_err(|e| StandardError::new("ERR-AUTH-000").interpolate_err(e.to_string()))?;
                Ok(Some(Session {
                    access_token: access_token.to_string(),
                    user,
                }))
            }
            reqwest::StatusCode::UNAUTHORIZED | reqwest::StatusCode::FORBIDDEN => {
                tracing::debug!("session token rejected by provider");
                Ok(None)
            }
            s => Err(StandardError::new("ERR-AUTH-000").interpolate_err(s.to_string())),
        }
    }

    async fn sign_in_with_password(&self, email: &str, password: &str) -> Result<Session> {
        let response = self
            .http
            .post(format!("{}/token?grant_type=password", &self.base_url))
            .header("apikey", &self.anon_key)
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await
            .map_err(|e| StandardError::new("ERR-AUTH-000").interpolate_err(e.to_string()))?;
        if response.status().is_client_error() {
            tracing::warn!("password sign in rejected for {}", email);
            return Err(StandardError::new("ERR-AUTH-002").code(StatusCode::UNAUTHORIZED));
        }
        if !response.status().is_success() {
            return Err(StandardError::new("ERR-AUTH-000")
                .interpolate_err(response.status().to_string()));
        }
        let token = response
            .json::<TokenResponse>()
            .await
            .map_err(|e| StandardError::new("ERR-AUTH-000").interpolate_err(e.to_string()))?;
        Ok(Session {
            access_token: token.access_token,
            user: token.user,
        })
    }

    async fn sign_out(&self, session: &Session) -> Result<()> {
        let response = self
            .http
            .post(format!("{}/logout", &self.base_url))
            .header("apikey", &self.anon_key)
            .bearer_auth(&session.access_token)
            .send()
            .await
            .map_err(|e| StandardError::new("ERR-AUTH-000").interpolate_err(e.to_string()))?;
        // an already revoked token is as signed out as it gets
        if response.status().is_success() || response.status() == reqwest::StatusCode::UNAUTHORIZED {
            Ok(())
        } else {
            Err(StandardError::new("ERR-AUTH-003").interpolate_err(response.status().to_string()))
        }
    }
}

#[cfg(test)]
pub mod testing {
    use std::collections::HashMap;
    use std::sync::Mutex;

    use super::*;

    /// Tokens map straight to users; passwords are "secret".
    #[derive(Default)]
    pub struct FakeProvider {
        pub sessions: Mutex<HashMap<String, SessionUser>>,
        pub broken: bool,
        pub sign_outs: Mutex<Vec<String>>,
    }

    impl FakeProvider {
        pub fn with_user(self, token: &str, id: &str, email: &str) -> Self {
            self.sessions.lock().unwrap().insert(
                token.to_string(),
                SessionUser {
                    id: id.to_string(),
                    email: Some(email.to_string()),
                },
            );
            self
        }

        /// Ends a session at the provider without going through sign out.
        pub fn revoke(&self, token: &str) {
            self.sessions.lock().unwrap().remove(token);
        }
    }

    #[async_trait::async_trait]
    impl IdentityProvider for FakeProvider {
        async fn get_session(&self, access_token: &str) -> Result<Option<Session>> {
            if self.broken {
                return Err(StandardError::new("ERR-AUTH-000"));
            }
            Ok(self
                .sessions
                .lock()
                .unwrap()
                .get(access_token)
                .map(|user| Session {
                    access_token: access_token.to_string(),
                    user: user.clone(),
                }))
        }

        async fn sign_in_with_password(&self, email: &str, password: &str) -> Result<Session> {
            if self.broken {
                return Err(StandardError::new("ERR-AUTH-000"));
            }
            let sessions = self.sessions.lock().unwrap();
            let found = sessions
                .iter()
                .find(|(_, u)| u.email.as_deref() == Some(email) && password == "secret");
            match found {
                Some((token, user)) => Ok(Session {
                    access_token: token.clone(),
                    user: user.clone(),
                }),
                None => Err(StandardError::new("ERR-AUTH-002").code(StatusCode::UNAUTHORIZED)),
            }
        }

        async fn sign_out(&self, session: &Session) -> Result<()> {
            self.sessions.lock().unwrap().remove(&session.access_token);
            self.sign_outs.lock().unwrap().push(session.user.id.clone());
            Ok(())
        }
    }
}
