//! Site settings documents (`settings/*`).
//!
//! A settings document that does not exist yet renders with `Default`.

use serde::{Deserialize, Serialize};

/// Announcement strip shown above the header (`settings/redbar`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct RedBar {
    pub enabled: bool,
    pub text: String,
    pub link: Option<String>,
}

impl RedBar {
    /// Whether the bar should be rendered at all.
    #[must_use]
    pub fn is_visible(&self) -> bool {
        self.enabled && !self.text.trim().is_empty()
    }
}

/// Footer contact details (`settings/footer`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct Footer {
    pub address: String,
    pub phone: String,
    pub email: String,
    pub whatsapp: Option<String>,
    pub instagram: Option<String>,
    pub facebook: Option<String>,
    pub opening_hours: Option<String>,
}

impl Footer {
    /// `wa.me` link for the configured WhatsApp number, with an optional
    /// prefilled message.
    ///
    /// Returns `None` if no number is configured or it has no digits.
    #[must_use]
    pub fn whatsapp_link(&self, text: Option<&str>) -> Option<String> {
        let digits: String = self
            .whatsapp
            .as_deref()?
            .chars()
            .filter(char::is_ascii_digit)
            .collect();
        if digits.is_empty() {
            return None;
        }
        Some(match text {
            Some(text) => format!("https://wa.me/{digits}?text={}", encode_component(text)),
            None => format!("https://wa.me/{digits}"),
        })
    }
}

/// Popup behaviour (`settings/popup`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PopupSettings {
    pub enabled: bool,
    pub delay_seconds: u32,
}

impl Default for PopupSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            delay_seconds: 3,
        }
    }
}

/// Percent-encode a query component (RFC 3986 unreserved characters kept).
fn encode_component(text: &str) -> String {
    let mut out = String::with_capacity(text.len() * 3);
    for byte in text.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(char::from(byte));
            }
            _ => out.push_str(&format!("%{byte:02X}")),
        }
    }
    out
}
