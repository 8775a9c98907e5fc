use axum::{extract::State, routing::get, Extension, Json, Router};

use crate::auth::Identity;
use crate::error::Result;
use crate::git::blocking;
use crate::models::HomeResponse;
use crate::state::SharedState;

pub fn routes(state: SharedState) -> Router {
    Router::new().route("/", get(home)).with_state(state)
}

async fn home(
    State(state): State<SharedState>,
    Extension(identity): Extension<Identity>,
) -> Result<Json<HomeResponse>> {
    let orgs = {
        let state = state.clone();
        let subject = identity.as_str().to_string();
        blocking(move || {
            state
                .store
                .list_orgs(&subject, &state.config.ignore, state.authorizer.as_ref())
        })
        .await?
    };

    Ok(Json(HomeResponse {
        username: identity.0,
        hostname: state.config.hostname.clone(),
        default_org: orgs.first().map(|o| o.name.clone()),
        orgs,
    }))
}
