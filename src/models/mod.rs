//! Data models for Fleet API responses

mod live_status;

pub use live_status::*;
