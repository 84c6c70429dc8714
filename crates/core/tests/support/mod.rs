//! Shared test helpers for `jimpitan-core` integration tests.
//!
//! In-memory mocks for the storage, guard, and network ports so service
//! tests can focus on behaviour instead of boilerplate.

pub mod stores;
pub mod transport;
