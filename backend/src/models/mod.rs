//! Data models for the attendance service.
//!
//! Tenant records are persisted by the tenant stores; schedule and summary
//! types only live for the duration of one run.

mod schedule;
mod summary;
mod tenant;

pub use schedule::*;
pub use summary::*;
pub use tenant::*;
