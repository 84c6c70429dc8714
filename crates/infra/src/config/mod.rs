//! Configuration loading
//!
//! Resolves the [`jimpitan_domain::Config`] for a run: environment
//! variables first, then a probed config file, then built-in defaults.

pub mod loader;

// Re-export commonly used items
pub use loader::{load, load_from_env, load_from_file, probe_config_paths};
