//! Shared building blocks for the CRUD handlers.

pub mod form;
pub mod images;
pub mod index;
pub mod records;
