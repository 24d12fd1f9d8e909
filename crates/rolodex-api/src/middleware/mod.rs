//! HTTP middleware
//!
//! Bearer authentication lives in `crate::auth::middleware`.
//!
//! Author: hephaex@gmail.com

pub mod security_headers;

pub use security_headers::security_headers_middleware;
