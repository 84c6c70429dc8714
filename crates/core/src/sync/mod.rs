//! Upload delivery ports

pub mod ports;

pub use ports::*;
