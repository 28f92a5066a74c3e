//! Camrent Firebase - REST clients for the managed backends.
//!
//! - [`datastore`] - Firestore documents behind the [`Datastore`] trait, with
//!   an HTTP implementation and an in-memory one for tests
//! - [`auth`] - Email/password accounts via Identity Toolkit
//! - [`storage`] - Image uploads to Firebase Storage
//! - [`algolia`] - Product search index
//!
//! Service-account tokens come from [`token::TokenSource`]. Every client also
//! works against the Firebase emulators.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod algolia;
pub mod auth;
pub mod config;
pub mod datastore;
pub mod document;
pub mod error;
pub mod query;
pub mod storage;
pub mod token;
pub mod value;

pub use algolia::{AlgoliaClient, AlgoliaError, ProductRecord, SearchHit};
pub use auth::{AccountInfo, AuthClient, AuthError, SignedIn};
pub use config::{AlgoliaConfig, ConfigError, FirebaseConfig};
pub use datastore::{Datastore, HttpDatastore, MemoryDatastore, RetrySettings, Write, auto_id};
pub use document::{Document, Fields, to_fields};
pub use error::{ErrorCode, FirebaseError};
pub use query::{Direction, Query};
pub use storage::{StorageClient, StorageError, StoredObject};
pub use token::TokenSource;
