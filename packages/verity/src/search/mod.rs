//! Search-backend wrappers.

pub mod rate_limited;

pub use rate_limited::{LiteratureSearchExt, RateLimitedSearch};
