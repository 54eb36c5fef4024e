use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

/// Credential for the browser's map and panorama provider.
#[derive(Clone, Default)]
pub struct MapsKey(Option<Arc<str>>);

impl MapsKey {
    pub fn new(key: Option<String>) -> Self {
        MapsKey(key.map(Arc::from))
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct KeyResponse<'a> {
    api_key: &'a str,
}

#[derive(Serialize)]
struct KeyError {
    error: &'static str,
    message: &'static str,
}

pub async fn maps_key(State(key): State<MapsKey>) -> Response {
    match key.0.as_deref() {
        Some(api_key) => Json(KeyResponse { api_key }).into_response(),
        None => {
            tracing::error!("GOOGLE_MAPS_API_KEY is not set; refusing key request");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(KeyError {
                    error: "API key not configured",
                    message: "The maps API key has not been configured on the server.",
                }),
            )
                .into_response()
        }
    }
}
