//! Cookie-carried session handling.
//!
//! Every request passes through `resolve_identity`, which turns the `token`
//! cookie into an `Identity`. Anything short of a valid, unexpired token
//! degrades to the anonymous `guest` identity; authorization decides what
//! that identity may see.

use axum::extract::{Request, State};
use axum::http::{HeaderMap, header};
use axum::middleware::Next;
use axum::response::Response;

use crate::auth::token::TOKEN_TTL_SECS;
use crate::state::SharedState;

pub const TOKEN_COOKIE: &str = "token";
pub const ANONYMOUS: &str = "guest";

/// The subject a request acts as.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity(pub String);

impl Identity {
    pub fn anonymous() -> Self {
        Identity(ANONYMOUS.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

pub async fn resolve_identity(
    State(state): State<SharedState>,
    mut req: Request,
    next: Next,
) -> Response {
    let identity = identify(&state, req.headers());
    req.extensions_mut().insert(identity);
    next.run(req).await
}

fn identify(state: &SharedState, headers: &HeaderMap) -> Identity {
    let Some(token) = token_from_cookies(headers) else {
        return Identity::anonymous();
    };

    match state.codec.validate(&token) {
        Ok(claims) if !claims.expired => Identity(claims.subject),
        Ok(claims) => {
            tracing::debug!("session for {} expired", claims.subject);
            Identity::anonymous()
        }
        Err(e) => {
            tracing::debug!("rejected session token: {}", e);
            Identity::anonymous()
        }
    }
}

pub fn token_from_cookies(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == TOKEN_COOKIE)
        .map(|(_, value)| value.to_string())
}

pub fn session_cookie(token: &str, hostname: &str) -> String {
    format!(
        "{}={}; Path=/; Max-Age={}; Domain={}; HttpOnly; Secure",
        TOKEN_COOKIE, token, TOKEN_TTL_SECS, hostname
    )
}

pub fn clear_session_cookie(hostname: &str) -> String {
    format!(
        "{}=; Path=/; Max-Age=0; Domain={}; HttpOnly; Secure",
        TOKEN_COOKIE, hostname
    )
}
