//! HTTP networking module
//!
//! Provides the HTTP client used to reach the search API, result pages and
//! synthesis providers.

mod client;
mod user_agent;

pub use client::{HttpClient, HttpResponse};
pub use user_agent::generate_user_agent;
