use axum::{
    Form,
    extract::State,
    response::{Html, IntoResponse, Redirect, Response},
};
use std::sync::Arc;

use super::auth::CurrentUser;
use super::validation::ResourceId;
use super::{AppState, WebError, pages};
use crate::forms::{EntryForm, FormErrors};
use crate::services::NotesError;

pub async fn new_entry_form(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    ResourceId(topic_id): ResourceId,
) -> Result<Html<String>, WebError> {
    let topic = state.notes.topic_for_new_entry(&user, topic_id).await?;
    Ok(pages::new_entry(&user, &topic, "", &FormErrors::new()))
}

pub async fn create_entry(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    ResourceId(topic_id): ResourceId,
    Form(form): Form<EntryForm>,
) -> Result<Response, WebError> {
    match state.notes.create_entry(&user, topic_id, &form).await {
        Ok(entry) => Ok(Redirect::to(&pages::topic_url(entry.topic_id)).into_response()),
        Err(NotesError::Invalid(errors)) => {
            let topic = state.notes.topic_for_new_entry(&user, topic_id).await?;
            Ok(pages::new_entry(&user, &topic, &form.text, &errors).into_response())
        }
        Err(e) => Err(e.into()),
    }
}

pub async fn edit_entry_form(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    ResourceId(entry_id): ResourceId,
) -> Result<Html<String>, WebError> {
    let (entry, topic) = state.notes.entry_for_edit(&user, entry_id).await?;
    Ok(pages::edit_entry(
        &user,
        &topic,
        entry.id,
        &entry.text,
        &FormErrors::new(),
    ))
}

pub async fn update_entry(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    ResourceId(entry_id): ResourceId,
    Form(form): Form<EntryForm>,
) -> Result<Response, WebError> {
    match state.notes.update_entry(&user, entry_id, &form).await {
        Ok((_, topic)) => Ok(Redirect::to(&pages::topic_url(topic.id)).into_response()),
        Err(NotesError::Invalid(errors)) => {
            let (entry, topic) = state.notes.entry_for_edit(&user, entry_id).await?;
            Ok(pages::edit_entry(&user, &topic, entry.id, &form.text, &errors).into_response())
        }
        Err(e) => Err(e.into()),
    }
}
