//! Client-side form checks run before any request is sent.

use std::{fmt, sync::OnceLock};

use regex::Regex;

use crate::protocol::Credentials;

pub const MIN_PASSWORD_LEN: usize = 6;

pub const INVALID_EMAIL_MESSAGE: &str = "Please enter a valid email address.";
pub const SHORT_PASSWORD_MESSAGE: &str = "Password must be at least 6 characters.";
pub const TITLE_REQUIRED_MESSAGE: &str = "Title is required";

fn email_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("static email pattern"))
}

pub fn is_valid_email(email: &str) -> bool {
    email_pattern().is_match(email.trim())
}

pub fn is_valid_password(password: &str) -> bool {
    password.trim().chars().count() >= MIN_PASSWORD_LEN
}

pub fn is_valid_title(title: &str) -> bool {
    !title.trim().is_empty()
}

/// Per-field failures of a login or sign-up form.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CredentialErrors {
    pub email: bool,
    pub password: bool,
}

impl CredentialErrors {
    pub fn is_empty(&self) -> bool {
        !self.email && !self.password
    }

    pub fn email_message(&self) -> Option<&'static str> {
        self.email.then_some(INVALID_EMAIL_MESSAGE)
    }

    pub fn password_message(&self) -> Option<&'static str> {
        self.password.then_some(SHORT_PASSWORD_MESSAGE)
    }
}

impl fmt::Display for CredentialErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let messages: Vec<&str> = [self.email_message(), self.password_message()]
            .into_iter()
            .flatten()
            .collect();
        f.write_str(&messages.join(" "))
    }
}

impl std::error::Error for CredentialErrors {}

/// Checks both fields and returns the credentials to submit.
///
/// The email is trimmed before submission; the password is sent as typed.
pub fn validate_credentials(email: &str, password: &str) -> Result<Credentials, CredentialErrors> {
    let errors = CredentialErrors {
        email: !is_valid_email(email),
        password: !is_valid_password(password),
    };
    if !errors.is_empty() {
        return Err(errors);
    }
    Ok(Credentials {
        email: email.trim().to_string(),
        password: password.to_string(),
    })
}

#[cfg(test)]
#[path = "tests/validation_tests.rs"]
mod tests;
