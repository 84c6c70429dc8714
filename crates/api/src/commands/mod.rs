//! Command functions - view layer to core bridge
//!
//! Every command takes the [`crate::AppContext`] built by the embedding
//! host, logs its name, duration, and outcome, and returns the domain
//! result unchanged.

mod collection;
mod health;
mod queue;
mod settings;
mod upload;

pub use collection::*;
pub use health::*;
pub use queue::*;
pub use settings::*;
pub use upload::*;
