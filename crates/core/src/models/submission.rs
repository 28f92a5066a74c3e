//! Stored contact-form submissions (`contact_submissions`).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{Email, ProductId, SubmissionId};

/// A validated contact-form submission.
///
/// Built by [`crate::contact::ContactForm::validate`]; the admin console marks
/// submissions as handled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactSubmission {
    #[serde(default, skip_serializing)]
    pub id: SubmissionId,
    pub name: String,
    pub email: Email,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub subject: Option<String>,
    pub message: String,
    #[serde(default)]
    pub product_id: Option<ProductId>,
    #[serde(default)]
    pub handled: bool,
    pub created_at: DateTime<Utc>,
}
