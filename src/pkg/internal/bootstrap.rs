use super::{
    adaptors::profiles::{selectors::ProfileSelector, spec::Profile},
    auth::{Auth, Session},
    backend::Backend,
};

pub const LOGIN_PATH: &str = "/login";

/// Outcome of loading a protected page.
#[derive(Debug, Clone, PartialEq)]
pub enum Bootstrap {
    /// No session; send the browser to the login page.
    Redirect(&'static str),
    /// Signed in. `profile` is `None` when the lookup failed.
    Ready {
        session: Session,
        profile: Option<Profile>,
    },
}

/// Session check followed by exactly one profile fetch. No profile fetch is
/// attempted without a session.
pub async fn protected_page(
    auth: &Auth,
    backend: &Backend,
    profiles_table: &str,
    token: Option<&str>,
) -> Bootstrap {
    let Some(session) = auth.get_session(token).await else {
        tracing::debug!("no session, redirecting to {}", LOGIN_PATH);
        return Bootstrap::Redirect(LOGIN_PATH);
    };
    let profile = match ProfileSelector::new(backend, profiles_table)
        .for_session(&session)
        .await
    {
        Ok(profile) => Some(profile),
        Err(e) => {
            tracing::error!("error loading profile for {}: {:?}", &session.user.id, e);
            None
        }
    };
    Bootstrap::Ready { session, profile }
}

/// Name shown in the page header, if anyone is signed in and has a profile.
pub async fn header_name(
    auth: &Auth,
    backend: &Backend,
    profiles_table: &str,
    token: Option<&str>,
) -> Option<String> {
    let session = auth.get_session(token).await?;
    ProfileSelector::new(backend, profiles_table)
        .full_name(&session)
        .await
        .map_err(|e| tracing::warn!("header profile lookup failed: {:?}", e))
        .ok()
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use serde_json::json;
    use tracing_test::traced_test;

    use super::*;
    use crate::pkg::internal::{auth::testing::FakeProvider, backend::testing::MemoryClient};

    fn auth() -> Auth {
        Auth::new(Arc::new(FakeProvider::default().with_user("tok-1", "u-1", "dana@example.com")))
    }

    fn profiles() -> MemoryClient {
        MemoryClient::default().with_table(
            "profiles",
            vec![json!({
                "id": "u-1",
                "full_name": "Dana Levi",
                "email": "dana@example.com",
                "account_type": "employer",
                "created_at": "2024-03-14T10:00:00Z"
            })],
        )
    }

    #[traced_test]
    #[tokio::test]
    async fn no_session_redirects_without_fetching() {
        let client = Arc::new(profiles());
        let backend = Backend::new(client.clone());
        let outcome = protected_page(&auth(), &backend, "profiles", None).await;
        assert_eq!(outcome, Bootstrap::Redirect("/login"));
        let outcome = protected_page(&auth(), &backend, "profiles", Some("stale")).await;
        assert_eq!(outcome, Bootstrap::Redirect("/login"));
        assert_eq!(client.calls(), 0);
    }

    #[traced_test]
    #[tokio::test]
    async fn session_loads_profile_once() {
        let client = Arc::new(profiles());
        let backend = Backend::new(client.clone());
        match protected_page(&auth(), &backend, "profiles", Some("tok-1")).await {
            Bootstrap::Ready { session, profile } => {
                assert_eq!(session.user.id, "u-1");
                assert_eq!(profile.map(|p| p.account_type), Some(Some("employer".into())));
            }
            other => panic!("unexpected {:?}", other),
        }
        assert_eq!(client.calls(), 1);
    }

    #[traced_test]
    #[tokio::test]
    async fn profile_error_still_renders() {
        let client = Arc::new(profiles().failing_on("profiles"));
        let backend = Backend::new(client.clone());
        match protected_page(&auth(), &backend, "profiles", Some("tok-1")).await {
            Bootstrap::Ready { profile, .. } => assert!(profile.is_none()),
            other => panic!("unexpected {:?}", other),
        }
        assert_eq!(client.calls(), 1);
    }

    #[traced_test]
    #[tokio::test]
    async fn header_name_is_optional() {
        let backend = Backend::new(Arc::new(profiles()));
        assert_eq!(
            header_name(&auth(), &backend, "profiles", Some("tok-1")).await.as_deref(),
            Some("Dana Levi")
        );
        assert_eq!(header_name(&auth(), &backend, "profiles", None).await, None);
    }
}
