//! Storage ports for entries, the upload queue, and settings

pub mod ports;

pub use ports::*;
