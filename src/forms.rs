//! Input validation for submitted forms.
//!
//! Each form is a plain `serde`-deserializable record. `validate` returns the
//! cleaned values or a [`FormErrors`] list keyed by field name; nothing here
//! touches HTTP or the database, so uniqueness checks live in the services.
//! Fields that are not part of a form (an `owner` or `topic` sent by a
//! client, for example) are dropped during deserialization.

use serde::Deserialize;

use crate::models::topic::TOPIC_TEXT_MAX_CHARS;

/// Key used for errors that do not belong to a single field.
pub const NON_FIELD_ERRORS: &str = "__all__";

pub const REQUIRED: &str = "This field is required.";

const USERNAME_MAX_CHARS: usize = 150;

/// Usernames shorter than this are only compared for equality.
const MIN_SIMILARITY_CHARS: usize = 3;

/// Lower-cased passwords rejected regardless of length.
const COMMON_PASSWORDS: &[&str] = &[
    "password",
    "password1",
    "password123",
    "12345678",
    "123456789",
    "1234567890",
    "qwerty123",
    "qwertyuiop",
    "iloveyou",
    "letmein1",
    "sunshine",
    "princess",
    "football",
    "baseball",
    "welcome1",
    "abc12345",
    "trustno1",
    "superman",
    "starwars",
    "passw0rd",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormErrors {
    errors: Vec<FieldError>,
}

impl FormErrors {
    #[must_use]
    pub const fn new() -> Self {
        Self { errors: Vec::new() }
    }

    pub fn add(&mut self, field: &'static str, message: impl Into<String>) {
        self.errors.push(FieldError {
            field,
            message: message.into(),
        });
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    #[must_use]
    pub fn has_field(&self, field: &str) -> bool {
        self.errors.iter().any(|e| e.field == field)
    }

    pub fn for_field<'a>(&'a self, field: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.errors
            .iter()
            .filter(move |e| e.field == field)
            .map(|e| e.message.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldError> {
        self.errors.iter()
    }

    fn into_result<T>(self, value: T) -> Result<T, Self> {
        if self.is_empty() { Ok(value) } else { Err(self) }
    }
}

fn max_length_message(limit: usize, actual: usize) -> String {
    format!("Ensure this value has at most {limit} characters (it has {actual}).")
}

// ============================================================================
// Topic / Entry
// ============================================================================

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TopicForm {
    #[serde(default)]
    pub text: String,
}

impl TopicForm {
    /// Returns the trimmed topic text.
    pub fn validate(&self) -> Result<String, FormErrors> {
        let mut errors = FormErrors::new();
        let text = self.text.trim();
        let length = text.chars().count();

        if text.is_empty() {
            errors.add("text", REQUIRED);
        } else if length > TOPIC_TEXT_MAX_CHARS {
            errors.add("text", max_length_message(TOPIC_TEXT_MAX_CHARS, length));
        }

        errors.into_result(text.to_string())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct EntryForm {
    #[serde(default)]
    pub text: String,
}

impl EntryForm {
    /// Returns the trimmed entry text.
    pub fn validate(&self) -> Result<String, FormErrors> {
        let mut errors = FormErrors::new();
        let text = self.text.trim();

        if text.is_empty() {
            errors.add("text", REQUIRED);
        }

        errors.into_result(text.to_string())
    }
}

// ============================================================================
// Accounts
// ============================================================================

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RegistrationForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password1: String,
    #[serde(default)]
    pub password2: String,
}

/// Validated registration input. The password is kept verbatim; only its
/// hash is ever stored.
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Copy)]
pub struct PasswordPolicy {
    pub min_length: usize,
}

impl Default for PasswordPolicy {
    fn default() -> Self {
        Self { min_length: 8 }
    }
}

impl PasswordPolicy {
    /// Every rule is checked so that all problems are reported at once.
    #[must_use]
    pub fn check(&self, password: &str, username: &str) -> Vec<String> {
        let mut problems = Vec::new();

        let lowered = password.to_lowercase();
        let user_lowered = username.to_lowercase();
        if !user_lowered.is_empty()
            && (lowered == user_lowered
                || (user_lowered.chars().count() >= MIN_SIMILARITY_CHARS
                    && lowered.contains(&user_lowered)))
        {
            problems.push("The password is too similar to the username.".to_string());
        }

        if password.chars().count() < self.min_length {
            problems.push(format!(
                "This password is too short. It must contain at least {} characters.",
                self.min_length
            ));
        }

        if COMMON_PASSWORDS.contains(&lowered.trim()) {
            problems.push("This password is too common.".to_string());
        }

        if !password.is_empty() && password.chars().all(|c| c.is_ascii_digit()) {
            problems.push("This password is entirely numeric.".to_string());
        }

        problems
    }
}

#[must_use]
pub fn is_valid_username_char(c: char) -> bool {
    c.is_alphanumeric() || matches!(c, '@' | '.' | '+' | '-' | '_')
}

impl RegistrationForm {
    pub fn validate(&self, policy: &PasswordPolicy) -> Result<NewAccount, FormErrors> {
        let mut errors = FormErrors::new();
        let username = self.username.trim();
        let username_chars = username.chars().count();

        if username.is_empty() {
            errors.add("username", REQUIRED);
        } else if username_chars > USERNAME_MAX_CHARS {
            errors.add(
                "username",
                max_length_message(USERNAME_MAX_CHARS, username_chars),
            );
        } else if !username.chars().all(is_valid_username_char) {
            errors.add(
                "username",
                "Enter a valid username. This value may contain only letters, numbers, and @/./+/-/_ characters.",
            );
        }

        if self.password1.is_empty() {
            errors.add("password1", REQUIRED);
        }

        if self.password2.is_empty() {
            errors.add("password2", REQUIRED);
        } else if !self.password1.is_empty() {
            if self.password1 == self.password2 {
                for problem in policy.check(&self.password2, username) {
                    errors.add("password2", problem);
                }
            } else {
                errors.add("password2", "The two password fields didn't match.");
            }
        }

        errors.into_result(NewAccount {
            username: username.to_string(),
            password: self.password1.clone(),
        })
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub next: Option<String>,
}

impl LoginForm {
    /// Only checks presence; credential checks happen in the auth service.
    pub fn validate(&self) -> Result<(String, String), FormErrors> {
        let mut errors = FormErrors::new();
        let username = self.username.trim();

        if username.is_empty() {
            errors.add("username", REQUIRED);
        }
        if self.password.is_empty() {
            errors.add("password", REQUIRED);
        }

        errors.into_result((username.to_string(), self.password.clone()))
    }
}
