//! Authentication module for the HTTP layer
//!
//! - Request and response models
//! - `AuthService` composing credential and token handling with audit logging
//! - Middleware for bearer-protected routes

pub mod middleware;
pub mod models;
pub mod service;

pub use middleware::{auth_middleware, bearer_token};
pub use models::{AuthenticatedUser, LoginRequest, RegisterRequest, TokenResponse, UserInfo};
pub use service::AuthService;
