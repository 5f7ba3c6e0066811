//! Password policy enforcement for new passwords.

use warden_core::config::AuthConfig;
use warden_core::error::AppError;

/// Validates new passwords against the configured policy.
#[derive(Debug, Clone)]
pub struct PasswordValidator {
    /// Minimum password length in characters.
    min_length: usize,
    /// Minimum zxcvbn score; `0` disables the entropy check.
    min_strength: u8,
}

impl PasswordValidator {
    /// Creates a new validator from auth configuration.
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            min_length: config.password_min_length,
            min_strength: config.password_min_strength.min(4),
        }
    }

    /// Validates a password against the configured policy.
    ///
    /// Returns the first violation found.
    pub fn validate(&self, password: &str) -> Result<(), AppError> {
        if password.is_empty() {
            return Err(AppError::validation("Password is required"));
        }

        if password.chars().count() < self.min_length {
            return Err(AppError::validation(format!(
                "Password must be at least {} characters long",
                self.min_length
            )));
        }

        if self.min_strength > 0 {
            let estimate = zxcvbn::zxcvbn(password, &[]);
            if (estimate.score() as u8) < self.min_strength {
                return Err(AppError::validation(
                    "Password is too weak. Please use a stronger password with more entropy.",
                ));
            }
        }

        Ok(())
    }

    /// Validates that a new password differs from the old one.
    pub fn validate_not_same(
        &self,
        old_password: &str,
        new_password: &str,
    ) -> Result<(), AppError> {
        if old_password == new_password {
            return Err(AppError::validation(
                "New password must be different from the current password",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use warden_core::error::ErrorKind;

    use super::*;

    fn validator(min_length: usize, min_strength: u8) -> PasswordValidator {
        PasswordValidator::new(&AuthConfig {
            password_min_length: min_length,
            password_min_strength: min_strength,
            ..AuthConfig::default()
        })
    }

    #[test]
    fn test_rejects_empty_and_short() {
        let v = validator(8, 0);
        assert!(v.validate("").unwrap_err().is(ErrorKind::Validation));
        assert!(v.validate("short").is_err());
        assert!(v.validate("longenough").is_ok());
    }

    #[test]
    fn test_length_counts_characters_not_bytes() {
        let v = validator(4, 0);
        assert!(v.validate("äöü").is_err());
        assert!(v.validate("äöüß").is_ok());
    }

    #[test]
    fn test_strength_check_when_enabled() {
        let v = validator(1, 3);
        assert!(v.validate("password").is_err());
        assert!(v.validate("correct horse battery staple 1987!").is_ok());
    }

    #[test]
    fn test_validate_not_same() {
        let v = validator(8, 0);
        assert!(v.validate_not_same("Password", "Password").is_err());
        assert!(v.validate_not_same("Password", "Password2").is_ok());
    }
}
