//! Admin-only types. Firestore documents live in `camrent_core::models`.

pub mod session;

pub use session::{CurrentAdmin, Flash, FlashKind, keys as session_keys};
