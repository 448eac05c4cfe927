//! Error types for tracker operations

mod builders;
mod conversions;
mod display;
mod types;
mod validate;

pub use builders::*;
pub use types::{Error, Result};
pub use validate::Validate;
