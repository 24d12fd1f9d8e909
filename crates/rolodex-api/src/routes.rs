//! API route definitions
//!
//! Author: hephaex@gmail.com

use crate::auth::auth_middleware;
use crate::handlers::{auth, contacts, health};
use crate::state::AppState;
use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;

/// Create API routes
///
/// The bearer middleware needs the state to resolve tokens, so it is passed
/// in here rather than picked up from `with_state`.
pub fn api_routes(state: Arc<AppState>) -> Router<Arc<AppState>> {
    // Public routes (no authentication required)
    let public_routes = Router::new()
        .route("/health", get(health::health_check))
        .route("/user", post(auth::register_handler))
        .route("/authenticate", post(auth::authenticate_handler));

    // Protected routes (bearer token required)
    let protected_routes = Router::new()
        .route("/user/me", get(auth::me_handler))
        .route(
            "/contact",
            post(contacts::create_contact).get(contacts::list_contacts),
        )
        .route(
            "/contact/:id",
            get(contacts::get_contact)
                .patch(contacts::update_contact)
                .delete(contacts::delete_contact),
        )
        .route_layer(middleware::from_fn_with_state(state, auth_middleware));

    Router::new().merge(public_routes).merge(protected_routes)
}
