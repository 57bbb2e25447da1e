//! Server-rendered HTML.
//!
//! All user-controlled text goes through `html_escape` before it is written
//! into markup.

use axum::response::Html;
use chrono::{DateTime, Utc};
use html_escape::{encode_double_quoted_attribute, encode_text};
use std::fmt::Write;

use crate::forms::{FormErrors, NON_FIELD_ERRORS};
use crate::models::{Topic, TopicPage, User};

const SITE_NAME: &str = "Learning Log";

#[must_use]
pub fn topic_url(topic_id: i32) -> String {
    format!("/topics/{topic_id}/")
}

fn format_date(date: &DateTime<Utc>) -> String {
    date.format("%b %d, %Y %H:%M").to_string()
}

/// Escapes text and turns newlines into `<br>` tags.
fn linebreaks(text: &str) -> String {
    encode_text(text)
        .lines()
        .collect::<Vec<_>>()
        .join("<br>\n")
}

fn nav(viewer: Option<&User>) -> String {
    let mut out = String::from("<nav>\n<a href=\"/\">Learning Log</a> - <a href=\"/topics/\">Topics</a> - ");
    match viewer {
        Some(user) => {
            let _ = write!(
                out,
                "Hello, {}.\n<form action=\"/accounts/logout/\" method=\"post\" class=\"inline\"><button type=\"submit\">Log out</button></form>",
                encode_text(&user.username)
            );
        }
        None => out.push_str(
            "<a href=\"/accounts/register/\">Register</a> - <a href=\"/accounts/login/\">Log in</a>",
        ),
    }
    out.push_str("\n</nav>\n");
    out
}

fn document(title: &str, header: &str, body: &str) -> Html<String> {
    Html(format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n<title>{} | {SITE_NAME}</title>\n</head>\n<body>\n{header}<main>\n{body}</main>\n</body>\n</html>\n",
        encode_text(title)
    ))
}

fn layout(viewer: Option<&User>, title: &str, body: &str) -> Html<String> {
    document(title, &nav(viewer), body)
}

fn error_list<'a>(messages: impl Iterator<Item = &'a str>) -> String {
    let items: Vec<String> = messages
        .map(|m| format!("<li>{}</li>", encode_text(m)))
        .collect();
    if items.is_empty() {
        String::new()
    } else {
        format!("<ul class=\"errorlist\">{}</ul>\n", items.join(""))
    }
}

fn text_input(name: &str, label: &str, kind: &str, value: &str, errors: &FormErrors) -> String {
    format!(
        "{}<p><label for=\"id_{name}\">{label}</label>\n<input type=\"{kind}\" name=\"{name}\" id=\"id_{name}\" value=\"{}\" required></p>\n",
        error_list(errors.for_field(name)),
        encode_double_quoted_attribute(value),
    )
}

fn textarea(name: &str, cols: u32, value: &str, errors: &FormErrors) -> String {
    format!(
        "{}<p><textarea name=\"{name}\" id=\"id_{name}\" cols=\"{cols}\" rows=\"10\" required>{}</textarea></p>\n",
        error_list(errors.for_field(name)),
        encode_text(value),
    )
}

fn form(action: &str, fields: &str, button: &str) -> String {
    format!(
        "<form action=\"{}\" method=\"post\">\n{fields}<button type=\"submit\">{button}</button>\n</form>\n",
        encode_double_quoted_attribute(action)
    )
}

// ============================================================================
// Notes
// ============================================================================

#[must_use]
pub fn index(viewer: Option<&User>) -> Html<String> {
    layout(
        viewer,
        SITE_NAME,
        "<h1>Learning Log</h1>\n<p>Learning Log helps you keep track of your learning, for any topic you're interested in.</p>\n",
    )
}

#[must_use]
pub fn topics(viewer: &User, topics: &[Topic]) -> Html<String> {
    let mut body = String::from("<h1>Topics</h1>\n<ul>\n");
    if topics.is_empty() {
        body.push_str("<li>No topics have been added yet.</li>\n");
    }
    for topic in topics {
        let _ = writeln!(
            body,
            "<li><a href=\"{}\">{}</a></li>",
            topic_url(topic.id),
            encode_text(&topic.text)
        );
    }
    body.push_str("</ul>\n<a href=\"/new_topic/\">Add a new topic</a>\n");
    layout(Some(viewer), "Topics", &body)
}

#[must_use]
pub fn topic(viewer: &User, page: &TopicPage) -> Html<String> {
    let topic = &page.topic;
    let mut body = format!(
        "<h1>Topic: {}</h1>\n<p>Entries:</p>\n<p><a href=\"/new_entry/{}/\">Add new entry</a></p>\n<ul>\n",
        encode_text(&topic.text),
        topic.id
    );
    if page.entries.is_empty() {
        body.push_str("<li>There are no entries for this topic yet.</li>\n");
    }
    for entry in &page.entries {
        let _ = writeln!(
            body,
            "<li class=\"entry\">\n<p>{}</p>\n<p>{}</p>\n<p><a href=\"/edit_entry/{}/\">Edit entry</a></p>\n</li>",
            format_date(&entry.date_added),
            linebreaks(&entry.text),
            entry.id
        );
    }
    body.push_str("</ul>\n");
    layout(Some(viewer), &topic.text, &body)
}

#[must_use]
pub fn new_topic(viewer: &User, text: &str, errors: &FormErrors) -> Html<String> {
    let body = format!(
        "<h1>Add a new topic:</h1>\n{}",
        form(
            "/new_topic/",
            &text_input("text", "", "text", text, errors),
            "Add topic"
        )
    );
    layout(Some(viewer), "New topic", &body)
}

#[must_use]
pub fn new_entry(viewer: &User, topic: &Topic, text: &str, errors: &FormErrors) -> Html<String> {
    let body = format!(
        "<p><a href=\"{}\">{}</a></p>\n<h1>Add a new entry:</h1>\n{}",
        topic_url(topic.id),
        encode_text(&topic.text),
        form(
            &format!("/new_entry/{}/", topic.id),
            &textarea("text", 80, text, errors),
            "Add entry"
        )
    );
    layout(Some(viewer), "New entry", &body)
}

#[must_use]
pub fn edit_entry(
    viewer: &User,
    topic: &Topic,
    entry_id: i32,
    text: &str,
    errors: &FormErrors,
) -> Html<String> {
    let body = format!(
        "<p><a href=\"{}\">{}</a></p>\n<h1>Edit entry:</h1>\n{}",
        topic_url(topic.id),
        encode_text(&topic.text),
        form(
            &format!("/edit_entry/{entry_id}/"),
            &textarea("text", 80, text, errors),
            "Save changes"
        )
    );
    layout(Some(viewer), "Edit entry", &body)
}

// ============================================================================
// Accounts
// ============================================================================

#[must_use]
pub fn register(viewer: Option<&User>, username: &str, errors: &FormErrors) -> Html<String> {
    let fields = format!(
        "{}{}{}",
        text_input("username", "Username:", "text", username, errors),
        text_input("password1", "Password:", "password", "", errors),
        text_input("password2", "Password confirmation:", "password", "", errors),
    );
    let body = format!(
        "<h1>Register</h1>\n{}",
        form("/accounts/register/", &fields, "Register")
    );
    layout(viewer, "Register", &body)
}

#[must_use]
pub fn login(
    viewer: Option<&User>,
    username: &str,
    next: Option<&str>,
    errors: &FormErrors,
) -> Html<String> {
    let mut fields = format!(
        "{}{}{}",
        error_list(errors.for_field(NON_FIELD_ERRORS)),
        text_input("username", "Username:", "text", username, errors),
        text_input("password", "Password:", "password", "", errors),
    );
    if let Some(next) = next {
        let _ = writeln!(
            fields,
            "<input type=\"hidden\" name=\"next\" value=\"{}\">",
            encode_double_quoted_attribute(next)
        );
    }
    let body = format!(
        "<h1>Log in</h1>\n{}",
        form("/accounts/login/", &fields, "Log in")
    );
    layout(viewer, "Log in", &body)
}

#[must_use]
pub fn logged_out() -> Html<String> {
    layout(
        None,
        "Logged out",
        "<p>You have been logged out. Thank you for visiting!</p>\n",
    )
}

// ============================================================================
// Errors
// ============================================================================

#[must_use]
pub fn not_found() -> Html<String> {
    document(
        "Not Found",
        "",
        "<h1>Not Found</h1>\n<p>The requested resource was not found on this server.</p>\n",
    )
}

#[must_use]
pub fn server_error() -> Html<String> {
    document(
        "Server Error",
        "",
        "<h1>Server Error (500)</h1>\n<p>Something went wrong on our side.</p>\n",
    )
}
