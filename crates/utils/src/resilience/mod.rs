//! Resilience patterns for collector delivery.
//!
//! ## Key Components
//!
//! - **`retry`**: Exponential backoff with jitter and the rules deciding which
//!   errors are worth another attempt.

pub mod retry;

pub use retry::{Backoff, RetryConfig};
