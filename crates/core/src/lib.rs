//! Camrent Core - Shared domain library.
//!
//! This crate provides the domain types and pure logic shared by all Camrent
//! components:
//! - `storefront` - Public camera-rental site
//! - `admin` - Internal catalog and site-settings console
//! - `cli` - Seeding, reindexing and role management
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no Firestore
//! access, no HTTP clients. Documents are serialized with camelCase field names
//! so they match the Firestore collections byte-for-byte.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for document IDs, prices, emails and slugs
//! - [`models`] - One struct per Firestore collection or settings document
//! - [`catalog`] - Product filtering, sorting and pagination
//! - [`cart`] - Cart lines, guest-to-account merge and pricing
//! - [`favorites`] - Favorite product toggling
//! - [`ordering`] - Category order swaps
//! - [`contact`] - Contact form validation
//! - [`secret`] - Session secret strength checks

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod catalog;
pub mod contact;
pub mod favorites;
pub mod models;
pub mod ordering;
pub mod secret;
pub mod types;

pub use types::*;
