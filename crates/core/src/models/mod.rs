//! Firestore document models.
//!
//! Every struct here maps one collection (or one settings document) and
//! serializes with camelCase field names. The document ID is never written
//! into the document body: it is skipped on serialization and injected by the
//! datastore when a document is read.

pub mod media;
pub mod product;
pub mod settings;
pub mod submission;
pub mod taxonomy;
pub mod user;

pub use media::{Banner, BgImage, Logo, PopupMessage};
pub use product::{Product, ProductSpec};
pub use settings::{Footer, PopupSettings, RedBar};
pub use submission::ContactSubmission;
pub use taxonomy::{Brand, Category};
pub use user::{Role, UserProfile};

/// Firestore collection and document names.
pub mod collections {
    pub const PRODUCTS: &str = "products";
    pub const CATEGORIES: &str = "categories";
    pub const BRANDS: &str = "brands";
    pub const BANNERS: &str = "banners";
    pub const LOGOS: &str = "logos";
    pub const BG_IMAGES: &str = "bgImages";
    pub const POPUPS: &str = "pop-up";
    pub const SETTINGS: &str = "settings";
    pub const CONTACT_SUBMISSIONS: &str = "contact_submissions";
    pub const USERS: &str = "users";

    /// Document IDs inside the `settings` collection.
    pub mod settings {
        pub const REDBAR: &str = "redbar";
        pub const FOOTER: &str = "footer";
        pub const POPUP: &str = "popup";
    }
}
