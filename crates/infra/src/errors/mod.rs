//! Error conversions between external crates and the domain taxonomy

pub mod conversions;

pub use conversions::{
    map_http_error, map_join_error, map_read_error, map_sql_error, map_write_error,
};
