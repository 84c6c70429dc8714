//! Macro for implementing Display and FromStr for status enums
//!
//! Status-like enums (health states, sync dispositions) all need the same
//! two conversions: lowercase string output and case-insensitive parsing.
//! This macro generates both from one mapping.
//!
//! # Example
//!
//! ```rust
//! use jimpitan_domain::impl_status_conversions;
//!
//! #[derive(Debug, Clone, Copy, PartialEq, Eq)]
//! pub enum HealthState {
//!     Healthy,
//!     Degraded,
//!     Unhealthy,
//! }
//!
//! impl_status_conversions!(HealthState {
//!     Healthy => "healthy",
//!     Degraded => "degraded",
//!     Unhealthy => "unhealthy",
//! });
//! ```

/// Implements Display and FromStr traits for status enums
///
/// Display writes the mapped lowercase string; FromStr parses
/// case-insensitively and reports the enum name on failure.
#[macro_export]
macro_rules! impl_status_conversions {
    ($enum_name:ident { $($variant:ident => $str:expr),+ $(,)? }) => {
        impl std::fmt::Display for $enum_name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                match self {
                    $(Self::$variant => write!(f, $str),)+
                }
            }
        }

        impl std::str::FromStr for $enum_name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.to_lowercase().as_str() {
                    $($str => Ok(Self::$variant),)+
                    _ => Err(format!("Invalid {}: {}", stringify!($enum_name), s)),
                }
            }
        }
    };
}
