//! Session-backed authentication glue.
//!
//! `current_user` resolves the account behind a session through the
//! injected [`crate::services::AuthService`]. [`login_required`] guards a
//! group of routes and [`CurrentUser`] hands the resolved user to handlers;
//! both send anonymous visitors to the login page with the original
//! destination in `next`.

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{Uri, request::Parts},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use std::convert::Infallible;
use std::sync::Arc;
use tower_sessions::Session;

use super::{AppState, WebError};
use crate::models::User;

const USER_ID_KEY: &str = "user_id";

pub const LOGIN_PATH: &str = "/accounts/login/";

// ============================================================================
// Session helpers
// ============================================================================

/// Binds the session to `user`. The session id is rotated first so an id
/// issued before login cannot be reused afterwards.
pub async fn start_session(session: &Session, user: &User) -> Result<(), WebError> {
    session.cycle_id().await?;
    session.insert(USER_ID_KEY, user.id).await?;
    Ok(())
}

pub async fn end_session(session: &Session) -> Result<(), WebError> {
    session.flush().await?;
    Ok(())
}

/// The signed-in user, or `None` for anonymous sessions and sessions whose
/// account no longer exists.
pub async fn current_user(state: &AppState, session: &Session) -> Result<Option<User>, WebError> {
    let Some(user_id) = session.get::<i32>(USER_ID_KEY).await? else {
        return Ok(None);
    };

    let user = state.auth.user_by_id(user_id).await?;
    if user.is_none() {
        tracing::debug!(user_id, "session refers to a deleted user");
    }
    Ok(user)
}

#[must_use]
pub fn login_redirect(original: &Uri) -> Response {
    let destination = original
        .path_and_query()
        .map_or_else(|| original.path(), |pq| pq.as_str());
    let target = format!("{LOGIN_PATH}?next={}", urlencoding::encode(destination));
    Redirect::to(&target).into_response()
}

// ============================================================================
// Middleware
// ============================================================================

/// Route layer for pages that need a signed-in user.
pub async fn login_required(
    State(state): State<Arc<AppState>>,
    session: Session,
    mut request: Request,
    next: Next,
) -> Response {
    match current_user(&state, &session).await {
        Ok(Some(user)) => {
            tracing::Span::current().record("user_id", user.id);
            request.extensions_mut().insert(user);
            next.run(request).await
        }
        Ok(None) => login_redirect(request.uri()),
        Err(e) => e.into_response(),
    }
}

// ============================================================================
// Extractors
// ============================================================================

/// The authenticated user of the current request.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

impl FromRequestParts<Arc<AppState>> for CurrentUser {
    type Rejection = Response;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        if let Some(user) = parts.extensions.get::<User>() {
            return Ok(Self(user.clone()));
        }

        let session = Session::from_request_parts(parts, state)
            .await
            .map_err(IntoResponse::into_response)?;

        match current_user(state, &session).await {
            Ok(Some(user)) => Ok(Self(user)),
            Ok(None) => Err(login_redirect(&parts.uri)),
            Err(e) => Err(e.into_response()),
        }
    }
}

/// The user if one is signed in; used by public pages for navigation.
#[derive(Debug, Clone)]
pub struct MaybeUser(pub Option<User>);

impl FromRequestParts<Arc<AppState>> for MaybeUser {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let Ok(session) = Session::from_request_parts(parts, state).await else {
            return Ok(Self(None));
        };

        match current_user(state, &session).await {
            Ok(user) => Ok(Self(user)),
            Err(e) => {
                tracing::warn!("Failed to resolve session user: {e}");
                Ok(Self(None))
            }
        }
    }
}
