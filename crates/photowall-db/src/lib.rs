//! Persistence for batches and photos.
//!
//! `PhotoCatalog` is the seam the rest of the application talks to. `PgCatalog`
//! is the production implementation; `InMemoryCatalog` mirrors its semantics for
//! tests and is only compiled with the `test-helpers` feature.

pub mod catalog;
pub mod db;
#[cfg(any(test, feature = "test-helpers"))]
pub mod memory;

pub use catalog::{PgCatalog, PhotoCatalog};
pub use db::{BatchRepository, PhotoRepository};
#[cfg(any(test, feature = "test-helpers"))]
pub use memory::InMemoryCatalog;
