// HTTP client for the remote betting API.

pub mod client;

pub use client::{ApiClient, ApiError};
