//! Shared helpers for the embedding layer.

pub mod health;
pub mod logging;
