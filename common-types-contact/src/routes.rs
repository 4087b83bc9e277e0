use axum::{
    http::StatusCode,
    middleware as axum_middleware,
    routing,
    Router,
};

use crate::{
    Middleware,
    State::AppState,
};

pub mod submit_contact;

// Browsers preflight the JSON POST, the CORS headers themselves come from the middleware
async fn preflight() -> StatusCode {
    StatusCode::NO_CONTENT
}

pub fn router(appstate: AppState) -> Router {
    Router::new()
        .route("/submit-contact", routing::post(submit_contact::request).options(preflight))
        .route_layer(axum_middleware::from_fn(Middleware::set_cors_headers::middleware))
        .with_state(appstate)
}
