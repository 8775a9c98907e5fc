use axum::{
    extract::State,
    http::header,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde_json::json;

use crate::auth::session::{clear_session_cookie, session_cookie};
use crate::error::{AppError, Result};
use crate::models::{SigninRequest, SigninResponse};
use crate::state::SharedState;

pub fn routes(state: SharedState) -> Router {
    Router::new()
        .route("/signin", post(signin))
        .route("/signout", get(signout))
        .with_state(state)
}

async fn signin(
    State(state): State<SharedState>,
    Json(request): Json<SigninRequest>,
) -> Result<impl IntoResponse> {
    if request.username != state.config.username || request.password != state.config.password {
        tracing::info!("rejected sign in for {}", request.username);
        return Err(AppError::InvalidCredentials);
    }

    let token = state
        .codec
        .issue(&request.username)
        .map_err(|e| AppError::Internal(e.to_string()))?;
    tracing::info!("{} signed in", request.username);

    Ok((
        [(header::SET_COOKIE, session_cookie(&token, &state.config.hostname))],
        Json(SigninResponse { token }),
    ))
}

async fn signout(State(state): State<SharedState>) -> impl IntoResponse {
    (
        [(header::SET_COOKIE, clear_session_cookie(&state.config.hostname))],
        Json(json!({})),
    )
}
