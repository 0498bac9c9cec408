pub mod error;
pub mod size;

pub use error::{HealthError, Result};
pub use size::{fmt_bytes, parse_size_to_bytes};
