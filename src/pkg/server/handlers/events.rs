use std::convert::Infallible;

use axum::{
    extract::State,
    response::sse::{Event, KeepAlive, Sse},
};
use axum_extra::extract::CookieJar;
use futures_util::{Stream, StreamExt, future, stream};

use crate::pkg::{
    internal::bootstrap::LOGIN_PATH,
    server::{handlers::session_token, state::AppState},
};

/// Auth state feed for an open protected page. Emits one `redirect` event
/// when the page's session ends, whether by sign out or at the provider,
/// then closes. The subscription lives as long as the connection does.
pub async fn session(
    State(state): State<AppState>,
    jar: CookieJar,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let token = session_token(&jar, &state).map(str::to_string);
    // subscribe before checking so a sign-out in between is not missed
    let mut subscription = state.auth.on_auth_state_change();
    tracing::debug!("{} open session feeds", state.auth.subscriber_count());
    let session = state.auth.get_session(token.as_deref()).await;
    let auth = state.auth.clone();
    let every = state.options.session_recheck;
    let events = stream::once(async move {
        let redirect = match session {
            Some(session) => subscription.session_ended(&auth, &session, every).await,
            None => true,
        };
        subscription.unsubscribe();
        redirect.then(|| Ok(Event::default().event("redirect").data(LOGIN_PATH)))
    })
    .filter_map(future::ready);
    Sse::new(events).keep_alive(KeepAlive::default())
}
