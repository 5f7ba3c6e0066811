//! Registration input and its field-level validation.

use std::fmt;

use serde::{Deserialize, Serialize};
use validator::Validate;

use warden_entity::identity::{CreateIdentity, normalize_email};

use crate::store::USER_NAME_HAS_AT;

/// Fields checked for registration, in reporting order.
const FIELDS: [&str; 5] = ["email", "user_name", "password", "first_name", "last_name"];

/// Registration request.
#[derive(Clone, Serialize, Deserialize, Validate)]
pub struct RegisterRequest {
    /// Email address.
    #[validate(email(message = "Identity 'email' is invalid!"))]
    pub email: String,
    /// User name.
    #[validate(length(max = 64, message = "Identity 'user_name' must be at most 64 characters!"))]
    pub user_name: String,
    /// Plaintext password; dropped once the verifier is computed.
    #[serde(skip_serializing)]
    pub password: String,
    /// Given name.
    #[validate(length(max = 100, message = "Identity 'first_name' must be at most 100 characters!"))]
    pub first_name: Option<String>,
    /// Family name.
    #[validate(length(max = 100, message = "Identity 'last_name' must be at most 100 characters!"))]
    pub last_name: Option<String>,
}

impl fmt::Debug for RegisterRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegisterRequest")
            .field("email", &self.email)
            .field("user_name", &self.user_name)
            .field("password", &"<redacted>")
            .field("first_name", &self.first_name)
            .field("last_name", &self.last_name)
            .finish()
    }
}

impl RegisterRequest {
    /// Creates a request with the required fields.
    pub fn new(
        email: impl Into<String>,
        user_name: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            email: email.into(),
            user_name: user_name.into(),
            password: password.into(),
            first_name: None,
            last_name: None,
        }
    }

    /// Sets the given and family names.
    pub fn with_names(mut self, first_name: Option<String>, last_name: Option<String>) -> Self {
        self.first_name = first_name;
        self.last_name = last_name;
        self
    }

    /// Trims the login identifiers and lowercases the email.
    pub fn normalized(mut self) -> Self {
        self.email = normalize_email(&self.email);
        self.user_name = self.user_name.trim().to_string();
        self
    }

    /// Returns one message per offending field, in a fixed field order.
    ///
    /// Blank required fields report "required" and skip their format checks.
    pub fn field_errors(&self) -> Vec<String> {
        let derived = self.validate().err();
        let derived = derived.as_ref().map(|e| e.field_errors()).unwrap_or_default();

        let mut messages = Vec::new();
        for field in FIELDS {
            let blank = match field {
                "email" => self.email.is_empty(),
                "user_name" => self.user_name.is_empty(),
                "password" => self.password.is_empty(),
                _ => false,
            };
            if blank {
                messages.push(format!("Identity '{field}' is required!"));
                continue;
            }
            if field == "user_name" && self.user_name.contains('@') {
                messages.push(USER_NAME_HAS_AT.to_string());
                continue;
            }
            if let Some(message) = derived
                .get(field)
                .and_then(|errors| errors.first())
                .and_then(|error| error.message.as_ref())
            {
                messages.push(message.to_string());
            }
        }
        messages
    }

    /// Splits the request into identity data and the plaintext password.
    pub(crate) fn into_parts(self) -> (CreateIdentity, String) {
        let identity = CreateIdentity {
            email: self.email,
            user_name: self.user_name,
            first_name: self.first_name,
            last_name: self.last_name,
        };
        (identity, self.password)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_request_has_no_errors() {
        let request = RegisterRequest::new("roh@example.com", "roh", "Password");
        assert!(request.field_errors().is_empty());
    }

    #[test]
    fn test_missing_fields_reported_in_order() {
        let request = RegisterRequest::new("  ", "", "").normalized();
        assert_eq!(
            request.field_errors(),
            [
                "Identity 'email' is required!",
                "Identity 'user_name' is required!",
                "Identity 'password' is required!",
            ]
        );
    }

    #[test]
    fn test_invalid_email_and_long_name() {
        let request = RegisterRequest::new("not-an-email", "roh", "Password")
            .with_names(Some("x".repeat(101)), None);
        assert_eq!(
            request.field_errors(),
            [
                "Identity 'email' is invalid!",
                "Identity 'first_name' must be at most 100 characters!",
            ]
        );
    }

    #[test]
    fn test_debug_redacts_password() {
        let request = RegisterRequest::new("roh@example.com", "roh", "hunter2");
        assert!(!format!("{request:?}").contains("hunter2"));
    }

    #[test]
    fn test_normalized_trims_identifiers_only() {
        let request = RegisterRequest::new(" Roh@Example.com ", " Roh ", " pw ").normalized();
        assert!(request.field_errors().is_empty());
        let (identity, password) = request.into_parts();
        assert_eq!(identity.email, "roh@example.com");
        assert_eq!(identity.user_name, "Roh");
        assert_eq!(password, " pw ");
    }

    #[test]
    fn test_user_name_cannot_look_like_an_email() {
        let request = RegisterRequest::new("roh@example.com", "shared@example.com", "Password");
        assert_eq!(request.field_errors(), [USER_NAME_HAS_AT]);
    }
}
