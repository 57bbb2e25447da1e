use axum::{
    Form,
    extract::{Query, State},
    response::{Html, IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use std::sync::Arc;
use tower_sessions::Session;
use tracing::{info, warn};

use super::auth::{self, MaybeUser};
use super::validation::safe_next;
use super::{AppState, WebError, pages};
use crate::forms::{FormErrors, LoginForm, NON_FIELD_ERRORS, RegistrationForm};
use crate::services::{AuthError, INVALID_LOGIN};

#[derive(Debug, Default, Deserialize)]
pub struct NextQuery {
    #[serde(default)]
    pub next: Option<String>,
}

pub async fn register_form(MaybeUser(viewer): MaybeUser) -> Html<String> {
    pages::register(viewer.as_ref(), "", &FormErrors::new())
}

pub async fn register(
    State(state): State<Arc<AppState>>,
    session: Session,
    MaybeUser(viewer): MaybeUser,
    Form(form): Form<RegistrationForm>,
) -> Result<Response, WebError> {
    match state.auth.register(&form).await {
        Ok(user) => {
            auth::start_session(&session, &user).await?;
            info!(user_id = user.id, "Registered and logged in: {}", user.username);
            Ok(Redirect::to("/").into_response())
        }
        Err(AuthError::Invalid(errors)) => {
            Ok(pages::register(viewer.as_ref(), form.username.trim(), &errors).into_response())
        }
        Err(e) => Err(e.into()),
    }
}

pub async fn login_form(
    MaybeUser(viewer): MaybeUser,
    Query(query): Query<NextQuery>,
) -> Html<String> {
    let next = query.next.as_deref().and_then(safe_next);
    pages::login(viewer.as_ref(), "", next, &FormErrors::new())
}

pub async fn login(
    State(state): State<Arc<AppState>>,
    session: Session,
    MaybeUser(viewer): MaybeUser,
    Form(form): Form<LoginForm>,
) -> Result<Response, WebError> {
    let next = form.next.as_deref().and_then(safe_next);

    let (username, password) = match form.validate() {
        Ok(credentials) => credentials,
        Err(errors) => {
            return Ok(
                pages::login(viewer.as_ref(), form.username.trim(), next, &errors).into_response(),
            );
        }
    };

    let Some(user) = state.auth.authenticate(&username, &password).await? else {
        warn!(username = %username, "Failed login attempt");
        let mut errors = FormErrors::new();
        errors.add(NON_FIELD_ERRORS, INVALID_LOGIN);
        return Ok(pages::login(viewer.as_ref(), &username, next, &errors).into_response());
    };

    auth::start_session(&session, &user).await?;
    info!(user_id = user.id, "Logged in: {}", user.username);

    Ok(Redirect::to(next.unwrap_or("/")).into_response())
}

/// Accepts both POST and GET; either way the session is cleared.
pub async fn logout(session: Session) -> Result<Html<String>, WebError> {
    auth::end_session(&session).await?;
    Ok(pages::logged_out())
}
