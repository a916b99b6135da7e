//! flowzi-storage
//!
//! Concrete persistence collaborators: a JSON-file flag store for milestone
//! records, an in-memory flag store, and an in-memory document store with live
//! subscriptions used by the CLI and tests.

pub mod documents;
pub mod flags;

pub use documents::MemoryDocumentStore;
pub use flags::{JsonFlagStore, MemoryFlagStore};
