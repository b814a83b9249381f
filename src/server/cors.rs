//! CORS policy for the note API
//!
//! The editor front end is served from another origin, so any origin may call
//! the API. No cookies are involved, which keeps `allow_credentials` off.

use std::time::Duration;

use axum::http::{header, Method};
use tower_http::cors::{Any, CorsLayer};

/// Build the [`CorsLayer`] wrapped around every route
pub fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE])
        .max_age(Duration::from_secs(3600))
}
