//! Core data model for the carousel asset registry.
//!
//! These types describe the single index document listing every image
//! currently registered for the homepage carousel. They serialize
//! naturally as JSON via `serde`.

pub mod asset;
