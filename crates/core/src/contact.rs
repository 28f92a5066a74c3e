//! Contact form validation.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use thiserror::Error;

use crate::models::ContactSubmission;
use crate::types::{Email, EmailError, ProductId, SubmissionId};

pub const MAX_NAME_LENGTH: usize = 100;
pub const MAX_MESSAGE_LENGTH: usize = 5000;
pub const MAX_PHONE_LENGTH: usize = 32;
pub const MAX_SUBJECT_LENGTH: usize = 200;

/// Why a contact form field was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ContactError {
    #[error("this field is required")]
    Required,
    #[error("must be at most {max} characters")]
    TooLong { max: usize },
    #[error("{0}")]
    Email(#[from] EmailError),
    #[error("may only contain digits, spaces and + - ( )")]
    PhoneCharacters,
}

/// A rejected field and the reason.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub error: ContactError,
}

impl FieldError {
    /// Message suitable for rendering next to the field.
    #[must_use]
    pub fn message(&self) -> String {
        self.error.to_string()
    }
}

/// Raw form submission.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ContactForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub subject: String,
    #[serde(default)]
    pub message: String,
    /// Product the enquiry is about, carried from `/contact?product=`.
    #[serde(default)]
    pub product: String,
}

fn optional(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

fn check_length(
    errors: &mut Vec<FieldError>,
    field: &'static str,
    value: &str,
    max: usize,
) {
    if value.chars().count() > max {
        errors.push(FieldError {
            field,
            error: ContactError::TooLong { max },
        });
    }
}

fn valid_phone_char(c: char) -> bool {
    c.is_ascii_digit() || matches!(c, ' ' | '+' | '-' | '(' | ')')
}

impl ContactForm {
    /// Validate the form and build the document to store.
    ///
    /// All fields are checked so the form can show every problem at once.
    ///
    /// # Errors
    ///
    /// Returns the list of rejected fields if anything is invalid.
    pub fn validate(&self, now: DateTime<Utc>) -> Result<ContactSubmission, Vec<FieldError>> {
        let mut errors = Vec::new();

        let name = self.name.trim();
        if name.is_empty() {
            errors.push(FieldError {
                field: "name",
                error: ContactError::Required,
            });
        }
        check_length(&mut errors, "name", name, MAX_NAME_LENGTH);

        let email = match Email::parse(&self.email) {
            Ok(email) => Some(email),
            Err(e) => {
                errors.push(FieldError {
                    field: "email",
                    error: e.into(),
                });
                None
            }
        };

        let phone = optional(&self.phone);
        if let Some(phone) = &phone {
            check_length(&mut errors, "phone", phone, MAX_PHONE_LENGTH);
            if !phone.chars().all(valid_phone_char) {
                errors.push(FieldError {
                    field: "phone",
                    error: ContactError::PhoneCharacters,
                });
            }
        }

        let subject = optional(&self.subject);
        if let Some(subject) = &subject {
            check_length(&mut errors, "subject", subject, MAX_SUBJECT_LENGTH);
        }

        let message = self.message.trim();
        if message.is_empty() {
            errors.push(FieldError {
                field: "message",
                error: ContactError::Required,
            });
        }
        check_length(&mut errors, "message", message, MAX_MESSAGE_LENGTH);

        match email {
            Some(email) if errors.is_empty() => Ok(ContactSubmission {
                id: SubmissionId::default(),
                name: name.to_string(),
                email,
                phone,
                subject,
                message: message.to_string(),
                product_id: optional(&self.product).map(ProductId::new),
                handled: false,
                created_at: now,
            }),
            _ => Err(errors),
        }
    }
}
