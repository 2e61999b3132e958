//! civic-report/crates/cr-core/src/lib.rs
//!
//! The central domain logic and interface definitions for civic-report:
//! report models, proximity merging, engagement ranking and the store that
//! serializes every change to the collection.

pub mod aggregator;
pub mod config;
pub mod error;
pub mod export;
pub mod geo;
// In-process backend for tests; other crates opt in with the `memory` feature.
#[cfg(any(test, feature = "memory"))]
pub mod memory;
pub mod models;
pub mod store;
pub mod traits;

// Re-exporting for easier access in other crates
pub use aggregator::{rank, Aggregator};
pub use config::*;
pub use error::*;
pub use models::*;
pub use store::{ReportStore, POSTS_KEY};
pub use traits::*;
