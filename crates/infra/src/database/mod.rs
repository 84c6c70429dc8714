//! Database implementations

pub mod entry_repository;
pub mod maintenance_repository;
pub mod manager;
pub mod pool;
pub mod queue_repository;
pub mod settings_repository;

pub use entry_repository::*;
pub use maintenance_repository::*;
pub use manager::*;
pub use pool::*;
pub use queue_repository::*;
pub use settings_repository::*;
