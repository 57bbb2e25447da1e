use axum::{
    http::{Method, StatusCode, Uri},
    response::{IntoResponse, Redirect, Response},
};
use std::fmt;

use super::{is_page_route, pages};
use crate::services::{AuthError, NotesError};

/// Failures a handler cannot recover from by re-rendering its form.
#[derive(Debug)]
pub enum WebError {
    /// Covers both missing records and records owned by someone else.
    NotFound,

    InternalError(String),
}

impl fmt::Display for WebError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound => write!(f, "Not found"),
            Self::InternalError(msg) => write!(f, "Internal error: {msg}"),
        }
    }
}

impl std::error::Error for WebError {}

impl IntoResponse for WebError {
    fn into_response(self) -> Response {
        match self {
            Self::NotFound => (StatusCode::NOT_FOUND, pages::not_found()).into_response(),
            Self::InternalError(msg) => {
                tracing::error!("Internal error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, pages::server_error()).into_response()
            }
        }
    }
}

impl WebError {
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::InternalError(msg.into())
    }
}

impl From<NotesError> for WebError {
    fn from(err: NotesError) -> Self {
        match err {
            NotesError::NotFound => Self::NotFound,
            NotesError::Invalid(_) => Self::internal("unhandled form validation error"),
            NotesError::Database(msg) | NotesError::Internal(msg) => Self::InternalError(msg),
        }
    }
}

impl From<AuthError> for WebError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::Invalid(_) => Self::internal("unhandled registration validation error"),
            AuthError::Database(msg) | AuthError::Internal(msg) => Self::InternalError(msg),
        }
    }
}

impl From<tower_sessions::session::Error> for WebError {
    fn from(err: tower_sessions::session::Error) -> Self {
        Self::internal(format!("Session error: {err}"))
    }
}

impl From<anyhow::Error> for WebError {
    fn from(err: anyhow::Error) -> Self {
        Self::InternalError(err.to_string())
    }
}

/// Router fallback: a GET for a page route missing its trailing slash is
/// sent to the slashed path, anything else is a 404 page.
pub async fn fallback(method: Method, uri: Uri) -> Response {
    let path = uri.path();
    if (method == Method::GET || method == Method::HEAD)
        && !path.ends_with('/')
        && is_page_route(&format!("{path}/"))
    {
        let target = uri.query().map_or_else(
            || format!("{path}/"),
            |query| format!("{path}/?{query}"),
        );
        return Redirect::permanent(&target).into_response();
    }
    WebError::NotFound.into_response()
}
