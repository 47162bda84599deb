pub mod date_range;
pub mod error;
pub mod measurement;
pub mod pollutant;
pub mod source;
pub mod station;

#[cfg(feature = "api")]
pub mod api;

pub use error::{AqError, Result};
