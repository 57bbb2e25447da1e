use axum::{
    Form,
    extract::State,
    response::{Html, IntoResponse, Redirect, Response},
};
use std::sync::Arc;

use super::auth::{CurrentUser, MaybeUser};
use super::validation::ResourceId;
use super::{AppState, WebError, pages};
use crate::forms::{FormErrors, TopicForm};
use crate::services::NotesError;

pub async fn index(MaybeUser(viewer): MaybeUser) -> Html<String> {
    pages::index(viewer.as_ref())
}

pub async fn list_topics(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
) -> Result<Html<String>, WebError> {
    let topics = state.notes.list_topics(&user).await?;
    Ok(pages::topics(&user, &topics))
}

pub async fn show_topic(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    ResourceId(topic_id): ResourceId,
) -> Result<Html<String>, WebError> {
    let page = state.notes.topic_page(&user, topic_id).await?;
    Ok(pages::topic(&user, &page))
}

pub async fn new_topic_form(CurrentUser(user): CurrentUser) -> Html<String> {
    pages::new_topic(&user, "", &FormErrors::new())
}

pub async fn create_topic(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    Form(form): Form<TopicForm>,
) -> Result<Response, WebError> {
    match state.notes.create_topic(&user, &form).await {
        Ok(_) => Ok(Redirect::to("/topics/").into_response()),
        Err(NotesError::Invalid(errors)) => {
            Ok(pages::new_topic(&user, &form.text, &errors).into_response())
        }
        Err(e) => Err(e.into()),
    }
}
