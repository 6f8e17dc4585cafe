//! Field-level validation primitives used by request types.

use serde::Serialize;

/// Maximum length of wishlist and item names.
pub const MAX_NAME_LENGTH: usize = 100;

/// Maximum length of an item link.
pub const MAX_LINK_LENGTH: usize = 2048;

/// Maximum length of an item description.
pub const MAX_DESCRIPTION_LENGTH: usize = 2000;

/// Maximum length of a user bio.
pub const MAX_BIO_LENGTH: usize = 1000;

/// Maximum length of a username.
pub const MAX_USERNAME_LENGTH: usize = 32;

/// A single rejected field with the reason.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldViolation {
    pub field: &'static str,
    pub message: String,
}

/// Collects field violations while a request checks its own shape.
#[derive(Debug, Default)]
pub struct Violations(Vec<FieldViolation>);

impl Violations {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a violation.
    pub fn add(&mut self, field: &'static str, message: impl Into<String>) {
        self.0.push(FieldViolation {
            field,
            message: message.into(),
        });
    }

    /// Rejects empty or blank values.
    pub fn require(&mut self, field: &'static str, value: &str) {
        if value.trim().is_empty() {
            self.add(field, "must not be empty");
        }
    }

    /// Rejects values longer than `max` characters.
    pub fn max_length(&mut self, field: &'static str, value: &str, max: usize) {
        if value.chars().count() > max {
            self.add(field, format!("must be at most {max} characters"));
        }
    }

    /// Rejects links that are present but not http(s) URLs, or overlong.
    pub fn link(&mut self, field: &'static str, value: Option<&str>) {
        let Some(value) = value else { return };
        if !(value.starts_with("http://") || value.starts_with("https://")) {
            self.add(field, "must be an http or https URL");
        }
        self.max_length(field, value, MAX_LINK_LENGTH);
    }

    /// Rejects strings that do not look like an email address.
    pub fn email(&mut self, field: &'static str, value: &str) {
        let valid = match value.split_once('@') {
            Some((local, domain)) => !local.is_empty() && domain.contains('.'),
            None => false,
        };
        if !valid {
            self.add(field, "must be a valid email address");
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_vec(self) -> Vec<FieldViolation> {
        self.0
    }
}
