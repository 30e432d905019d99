//! HTTP client module
//!
//! Downloads source files over HTTP(S). Requests are not retried; a failed
//! request fails the period.

mod client;

pub use client::{HttpClient, HttpClientConfig, HttpClientConfigBuilder};
