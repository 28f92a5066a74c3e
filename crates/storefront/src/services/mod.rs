//! Storefront operations that combine the session, the datastore and the
//! catalog cache.
//!
//! - `users` - `users/{uid}` profile reads and field writes
//! - `cart` - guest (session) and account (Firestore) carts, login merge
//! - `search` - Algolia search with an in-memory catalog fallback

pub mod cart;
pub mod search;
pub mod users;
