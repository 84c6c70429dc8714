//! # Jimpitan App
//!
//! Embedding layer - application context and command functions.
//!
//! This crate contains:
//! - Command functions (view → core bridge)
//! - Application context (dependency injection)
//! - Logging setup and health checks
//!
//! ## Architecture
//! - Depends on `domain`, `core`, and `infra`
//! - Wires up the hexagonal architecture
//! - Exposes async command functions for the embedding view layer
//!
//! There is no binary and no UI here. A host embeds this crate, calls
//! [`init`] once, builds an [`AppContext`], and drives the command
//! functions from its own event loop.

pub mod commands;
pub mod context;
pub mod utils;

// Re-export for convenience
pub use commands::*;
pub use context::*;

/// Initialise the process-wide pieces: logging and `.env` loading.
///
/// Safe to call more than once; later calls keep the first subscriber.
pub fn init() {
    // Logging first so the .env outcome is visible
    utils::logging::init_logging();

    match dotenvy::dotenv() {
        Ok(path) => tracing::info!(path = %path.display(), "Loaded .env file"),
        Err(err) => tracing::debug!(error = %err, "No .env file loaded"),
    }
}
