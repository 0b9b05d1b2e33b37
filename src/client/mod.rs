//! HTTP client for the licensing service.

pub mod http;
