//! Keygen protocol types.

pub mod models;
