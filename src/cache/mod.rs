//! Self-verifying, day-bucketed response cache.

pub mod file;
pub mod format;
pub mod location;
pub mod observer;
