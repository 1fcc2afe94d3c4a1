//! CORS layer built from [`CorsConfig`].

use crate::config::CorsConfig;

use axum::http::{header::AUTHORIZATION, HeaderValue, Method};
use tower_http::cors::{AllowHeaders, AllowOrigin, Any, CorsLayer};

const METHODS: [Method; 5] = [
    Method::GET,
    Method::POST,
    Method::PUT,
    Method::DELETE,
    Method::OPTIONS,
];

/// Credentialed CORS for an explicit origin list; `*` allows any origin without credentials
pub fn cors_layer(config: &CorsConfig) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods(METHODS)
        .expose_headers([AUTHORIZATION]);

    match config {
        CorsConfig::Any => layer.allow_origin(Any).allow_headers(Any),
        CorsConfig::Origins(origins) => {
            let origins: Vec<HeaderValue> = origins
                .iter()
                .filter_map(|origin| match HeaderValue::from_str(origin) {
                    // a wildcard cannot be combined with credentials
                    Ok(value) if value != "*" => Some(value),
                    _ => {
                        tracing::warn!(%origin, "Ignoring invalid CORS origin");
                        None
                    }
                })
                .collect();

            layer
                .allow_origin(AllowOrigin::list(origins))
                .allow_headers(AllowHeaders::mirror_request())
                .allow_credentials(true)
        }
    }
}
