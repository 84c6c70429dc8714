//! # Jimpitan Core
//!
//! Pure business logic layer - no infrastructure dependencies.
//!
//! This crate contains:
//! - Port/adapter interfaces (traits) over storage, network, and the
//!   daily-upload guard
//! - The collection service driving entry recording and submission
//! - The sync policy applied to queued uploads
//!
//! ## Architecture Principles
//! - Only depends on `jimpitan-domain`
//! - No database, HTTP, or filesystem code
//! - All external dependencies via traits
//! - Pure, testable business logic

pub mod collection;
pub mod guard;
pub mod store;
pub mod sync;

// Re-export specific items to avoid ambiguity
pub use collection::session::SessionState;
pub use collection::CollectionService;
pub use guard::ports::GuardStore;
pub use guard::DailyUploadGuard;
pub use store::ports::{EntryStore, MaintenanceStore, SettingsStore, UploadQueue};
pub use sync::ports::{ConnectivityProbe, UploadTransport};
