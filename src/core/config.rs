//! Environment-driven configuration.
//!
//! Two URLs matter: the upstream API base we scrape from, and the public
//! base URL that exported documents should point their reference links at.

use std::env;

pub const DEFAULT_API_URL: &str = "https://rickandmortyapi.com/api";
pub const DEFAULT_PUBLIC_URL: &str = "http://127.0.0.1:8000";

/// Base URL of the upstream API. Override with `MORTYDEX_API_URL`
/// (used by tests and by anyone running a local mirror).
pub fn api_base_url() -> String {
    env::var("MORTYDEX_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string())
}

/// Base URL used when rewriting reference links in exported documents.
/// Override with `MORTYDEX_PUBLIC_URL`.
pub fn public_base_url() -> String {
    env::var("MORTYDEX_PUBLIC_URL").unwrap_or_else(|_| DEFAULT_PUBLIC_URL.to_string())
}
