use anyhow::{Result, anyhow};
use axum::Router;
use axum::http::{HeaderValue, Method, header};
use tower_http::cors::{Any, CorsLayer};

use crate::infrastructure::settings::Settings;

pub(crate) fn build_cors_layer(front_url: &str) -> Result<CorsLayer> {
    let layer = if front_url == "*" {
        CorsLayer::new().allow_origin(Any)
    } else {
        let origin: HeaderValue = front_url
            .parse()
            .map_err(|err| anyhow!("invalid CORS origin '{front_url}': {err}"))?;

        CorsLayer::new().allow_origin(origin)
    };

    Ok(layer
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([
            header::ACCESS_CONTROL_ALLOW_CREDENTIALS,
            header::ACCESS_CONTROL_ALLOW_HEADERS,
            header::CONTENT_TYPE,
            header::CONTENT_LENGTH,
            header::ACCEPT_ENCODING,
            header::AUTHORIZATION,
        ])
        .expose_headers([header::LOCATION]))
}

pub(crate) fn apply_cors(router: Router, settings: &Settings) -> Result<Router> {
    let cors = build_cors_layer(&settings.front_url)?;
    Ok(router.layer(cors))
}
