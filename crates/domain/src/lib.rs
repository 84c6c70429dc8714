//! # Jimpitan Domain
//!
//! Business domain types and models for the jimpitan collection tracker.
//!
//! This crate contains:
//! - Domain data types (DonationEntry, QueueItem, wire payloads)
//! - Domain error types and Result definitions
//! - Configuration structures
//! - Domain constants and day/timestamp helpers
//!
//! ## Architecture
//! - No dependencies on other jimpitan crates
//! - Only external dependencies allowed
//! - Pure domain models and data structures

pub mod config;
pub mod constants;
pub mod errors;
pub mod macros;
pub mod types;
pub mod utils;

// Re-export commonly used items
pub use config::*;
pub use errors::*;
pub use types::*;
// Re-export day helpers used across every layer
pub use utils::{collection_day, epoch_millis, guard_day};
