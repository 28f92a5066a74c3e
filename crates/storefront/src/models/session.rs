//! Session-related types.
//!
//! Types stored in the session for authentication state, the guest cart and
//! one-shot flash messages.

use serde::{Deserialize, Serialize};
use tower_sessions::Session;

use camrent_core::UserId;

/// Session-stored customer identity.
///
/// Set after a successful Firebase sign-in. The Firebase ID token itself is
/// not kept; the user ID is all the storefront needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentCustomer {
    pub uid: UserId,
    pub email: String,
}

/// Session keys.
pub mod keys {
    /// The signed-in customer.
    pub const CURRENT_CUSTOMER: &str = "current_customer";

    /// Cart of a visitor who is not signed in.
    pub const GUEST_CART: &str = "guest_cart";

    /// Message shown once on the next rendered page.
    pub const FLASH: &str = "flash";
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlashKind {
    Success,
    Error,
}

impl FlashKind {
    /// CSS modifier used by the templates.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Error => "error",
        }
    }
}

/// A message carried across a redirect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flash {
    pub kind: FlashKind,
    pub message: String,
}

impl Flash {
    #[must_use]
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            kind: FlashKind::Success,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: FlashKind::Error,
            message: message.into(),
        }
    }

    /// Store the message for the next page.
    ///
    /// Failures are logged, never surfaced: losing a flash is harmless.
    pub async fn set(self, session: &Session) {
        if let Err(e) = session.insert(keys::FLASH, self).await {
            tracing::warn!(error = %e, "Failed to store flash message");
        }
    }

    /// Remove and return the pending message.
    pub async fn take(session: &Session) -> Option<Self> {
        session.remove::<Self>(keys::FLASH).await.ok().flatten()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use tower_sessions::MemoryStore;

    use super::*;

    #[tokio::test]
    async fn test_flash_is_shown_once() {
        let session = Session::new(None, Arc::new(MemoryStore::default()), None);
        Flash::error("Invalid email or password").set(&session).await;

        let flash = Flash::take(&session).await.unwrap();
        assert_eq!(flash.kind, FlashKind::Error);
        assert_eq!(flash.message, "Invalid email or password");
        assert!(Flash::take(&session).await.is_none());
    }
}
