//! # Route Registry Core
//!
//! Shared, I/O-free logic for Route Registry: registry data models, the
//! error taxonomy, the [`Vectorizer`](embedding::Vectorizer) trait with a
//! deterministic hashing implementation, top-K ranking, and the in-memory
//! [`RegistryVectorStore`](store::RegistryVectorStore).
//!
//! This crate performs no filesystem or network access. Scanning,
//! artifact persistence, and network-backed embedding providers live in
//! the `route-registry` app crate.

pub mod embedding;
pub mod error;
pub mod models;
pub mod search;
pub mod store;

pub use error::{RegistryError, Result};
