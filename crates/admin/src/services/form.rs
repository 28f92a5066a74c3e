//! Multipart form reading.
//!
//! Every admin form that can carry an image is posted as
//! `multipart/form-data`. [`FormData`] collects text fields (repeatable) and
//! non-empty file parts so handlers can validate them like a normal form.

use std::collections::HashMap;

use axum::extract::Multipart;
use rust_decimal::Decimal;

use crate::error::{AppError, Result};

/// A file part of a multipart form.
#[derive(Debug, Clone)]
pub struct FileUpload {
    pub field: String,
    pub filename: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// Decoded multipart form.
#[derive(Debug, Default)]
pub struct FormData {
    fields: HashMap<String, Vec<String>>,
    files: Vec<FileUpload>,
}

impl FormData {
    /// Drain a multipart body.
    ///
    /// File inputs left empty by the browser arrive as parts with an empty
    /// filename and no bytes; they are dropped.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::BadRequest`] if the body is malformed or exceeds
    /// the body limit.
    pub async fn read(mut multipart: Multipart) -> Result<Self> {
        let mut form = Self::default();
        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| AppError::BadRequest(e.body_text()))?
        {
            let name = field.name().unwrap_or_default().to_string();
            match field.file_name().map(ToString::to_string) {
                Some(filename) => {
                    let content_type = field
                        .content_type()
                        .unwrap_or("application/octet-stream")
                        .to_string();
                    let bytes = field
                        .bytes()
                        .await
                        .map_err(|e| AppError::BadRequest(e.body_text()))?;
                    if !filename.is_empty() && !bytes.is_empty() {
                        form.files.push(FileUpload {
                            field: name,
                            filename,
                            content_type,
                            bytes: bytes.to_vec(),
                        });
                    }
                }
                None => {
                    let value = field
                        .text()
                        .await
                        .map_err(|e| AppError::BadRequest(e.body_text()))?;
                    form.push(name, value);
                }
            }
        }
        Ok(form)
    }

    /// Build from already-decoded text fields.
    #[must_use]
    pub fn from_pairs<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        let mut form = Self::default();
        for (name, value) in pairs {
            form.push(name.to_string(), value.to_string());
        }
        form
    }

    fn push(&mut self, name: String, value: String) {
        self.fields.entry(name).or_default().push(value);
    }

    /// Trimmed value of a field, empty if absent.
    #[must_use]
    pub fn text(&self, name: &str) -> String {
        self.fields
            .get(name)
            .and_then(|values| values.first())
            .map(|v| v.trim().to_string())
            .unwrap_or_default()
    }

    /// Trimmed value, `None` if absent or blank.
    #[must_use]
    pub fn optional(&self, name: &str) -> Option<String> {
        Some(self.text(name)).filter(|v| !v.is_empty())
    }

    /// Required trimmed value.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::BadRequest`] naming `label` if the field is blank.
    pub fn required(&self, name: &str, label: &str) -> Result<String> {
        self.optional(name)
            .ok_or_else(|| AppError::BadRequest(format!("{label} is required")))
    }

    /// Checkbox state: present means checked.
    #[must_use]
    pub fn checked(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    /// Every non-blank value of a repeated field, in form order.
    #[must_use]
    pub fn all(&self, name: &str) -> Vec<String> {
        self.fields
            .get(name)
            .into_iter()
            .flatten()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .collect()
    }

    /// Optional non-negative decimal.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::BadRequest`] if the value is not a number or is
    /// negative.
    pub fn decimal(&self, name: &str, label: &str) -> Result<Option<Decimal>> {
        let Some(raw) = self.optional(name) else {
            return Ok(None);
        };
        let value: Decimal = raw
            .parse()
            .map_err(|_| AppError::BadRequest(format!("{label} must be a number")))?;
        if value.is_sign_negative() {
            return Err(AppError::BadRequest(format!("{label} cannot be negative")));
        }
        Ok(Some(value))
    }

    /// Optional integer.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::BadRequest`] if the value is not an integer.
    pub fn integer(&self, name: &str, label: &str) -> Result<Option<i64>> {
        self.optional(name)
            .map(|raw| {
                raw.parse()
                    .map_err(|_| AppError::BadRequest(format!("{label} must be a whole number")))
            })
            .transpose()
    }

    /// Uploaded files posted under `name`.
    pub fn files(&self, name: &str) -> impl Iterator<Item = &FileUpload> {
        self.files.iter().filter(move |f| f.field == name)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn form() -> FormData {
        FormData::from_pairs([
            ("name", "  Sony FX3 "),
            ("price", "85.50"),
            ("deposit", ""),
            ("in_stock", "on"),
            ("keep_image", "https://a/1.jpg"),
            ("keep_image", ""),
            ("keep_image", "https://a/2.jpg"),
        ])
    }

    #[test]
    fn test_text_fields_are_trimmed() {
        let form = form();
        assert_eq!(form.text("name"), "Sony FX3");
        assert_eq!(form.text("missing"), "");
        assert_eq!(form.optional("deposit"), None);
        assert!(form.required("deposit", "Deposit").is_err());
    }

    #[test]
    fn test_checkbox_and_repeated_fields() {
        let form = form();
        assert!(form.checked("in_stock"));
        assert!(!form.checked("featured"));
        assert_eq!(form.all("keep_image"), vec!["https://a/1.jpg", "https://a/2.jpg"]);
    }

    #[test]
    fn test_decimal_parsing() {
        let form = form();
        assert_eq!(
            form.decimal("price", "Price").unwrap(),
            Some(Decimal::new(8550, 2))
        );
        assert_eq!(form.decimal("deposit", "Deposit").unwrap(), None);
        assert!(FormData::from_pairs([("price", "-1")]).decimal("price", "Price").is_err());
        assert!(FormData::from_pairs([("price", "abc")]).decimal("price", "Price").is_err());
    }

    #[test]
    fn test_integer_parsing() {
        assert_eq!(FormData::from_pairs([("order", "3")]).integer("order", "Order").unwrap(), Some(3));
        assert!(FormData::from_pairs([("order", "x")]).integer("order", "Order").is_err());
    }
}
