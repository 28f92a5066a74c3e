//! Subcommand implementations. Each works against `&dyn Datastore` so it can
//! be exercised with the in-memory store.

pub mod admin;
pub mod reindex;
pub mod seed;
