//! Retry policy and request logging for API calls

pub mod logging;
pub mod retry;

pub use logging::RequestLogger;
pub use retry::{RetryConfig, RetryPolicy};
