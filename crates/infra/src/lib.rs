//! # Jimpitan Infrastructure
//!
//! Infrastructure implementations of core domain ports.
//!
//! This crate contains:
//! - Database implementations (SQLite behind an r2d2 pool)
//! - The HTTP upload client and background sync services
//! - The daily-upload guard sidecar store
//! - Configuration loading
//!
//! ## Architecture
//! - Implements traits defined in `jimpitan-core`
//! - Depends on `jimpitan-domain` and `jimpitan-core`
//! - Contains all "impure" code (I/O, filesystem, network)

pub mod config;
pub mod database;
pub mod errors;
pub mod guard_store;
pub mod sync;

// Re-export commonly used items
pub use database::*;
pub use errors::*;
pub use guard_store::*;
pub use sync::*;
