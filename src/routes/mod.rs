//! HTTP route handlers.
//!
//! - `home`: organization/repository overview (GET /)
//! - `session`: sign in and sign out
//! - `browse`: `tree` and `blob` views under `/<org>/<repo>/...`
//!
//! Every request first passes `resolve_identity`, so handlers always see an
//! `Identity` extension (possibly the anonymous one).

pub mod browse;
pub mod home;
pub mod session;

use axum::{middleware, Router};

use crate::auth::session::resolve_identity;
use crate::state::SharedState;

pub fn create_router(state: SharedState) -> Router {
    Router::new()
        .merge(home::routes(state.clone()))
        .merge(session::routes(state.clone()))
        .merge(browse::routes(state.clone()))
        .layer(middleware::from_fn_with_state(state, resolve_identity))
}
