mod assets;
mod config;
mod graphql;
mod keys;
mod sessions;

use std::path::{Path, PathBuf};

use anyhow::Context;
use async_graphql_axum::{GraphQLRequest, GraphQLResponse};
use axum::http::HeaderValue;
use axum::{extract::State, response::Html, routing::get, Router};
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::set_header::SetResponseHeaderLayer;
use tracing_subscriber::EnvFilter;

use graphql::Schema;
use keys::MapsKey;

async fn graphql_handler(State(schema): State<Schema>, req: GraphQLRequest) -> GraphQLResponse {
    schema.execute(req.into_inner()).await.into()
}

async fn graphiql() -> Html<String> {
    Html(
        async_graphql::http::GraphiQLSource::build()
            .endpoint("/graphql")
            .finish(),
    )
}

/// Static file router with a fixed Cache-Control header.
fn cached_static_router(dir: &Path, cache_header: &'static str) -> Router {
    let layer = SetResponseHeaderLayer::overriding(
        axum::http::header::CACHE_CONTROL,
        HeaderValue::from_static(cache_header),
    );
    Router::new()
        .fallback_service(ServeDir::new(dir))
        .layer(layer)
}

const CACHE_IMMUTABLE: &str = "public, max-age=31536000, immutable";

/// Build the full application router.
fn build_app(schema: Schema, maps_key: MapsKey, dist_dir: &Path) -> Router {
    // Hashed UI bundles from the frontend build
    let static_files = Router::new().nest(
        "/assets",
        cached_static_router(&dist_dir.join("assets"), CACHE_IMMUTABLE),
    );

    let key_delivery = Router::new()
        .route("/api/maps-key", get(keys::maps_key))
        .with_state(maps_key);

    let index_path = dist_dir.join("index.html");

    Router::new()
        .route("/graphql", get(graphiql).post(graphql_handler))
        .with_state(schema)
        .route("/", get(move || serve_index(index_path.clone())))
        .merge(key_delivery)
        .merge(static_files)
        .layer(CorsLayer::permissive())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = config::Config::from_env()?;
    tracing::info!(
        variant = %config.variant,
        win_threshold_km = config.rules.win_threshold_km(),
        "Starting game server"
    );
    if config.maps_api_key.is_none() {
        tracing::warn!("GOOGLE_MAPS_API_KEY not set; /api/maps-key will return an error");
    }

    let loaded_assets = assets::Assets::load(&config.assets_dir, config.variant)?;
    let sessions = sessions::Sessions::new(config.rules, loaded_assets.catalog, config.session_ttl);

    let schema = graphql::build_schema(sessions, config.variant);
    let app = build_app(schema, MapsKey::new(config.maps_api_key), &config.dist_dir);

    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    tracing::info!("Server running at http://localhost:{}", config.port);
    tracing::info!("GraphiQL playground at http://localhost:{}/graphql", config.port);

    axum::serve(listener, app).await.context("Server error")?;
    Ok(())
}

async fn serve_index(index_path: PathBuf) -> Html<String> {
    // Serve the built frontend if present, otherwise a pointer to the API
    match tokio::fs::read_to_string(&index_path).await {
        Ok(html) => Html(html),
        Err(_) => Html(
            r#"<!DOCTYPE html>
<html>
<head><title>Geo Guess</title></head>
<body>
<h1>Geo Guess</h1>
<p>Frontend not built yet. Visit <a href="/graphql">GraphiQL</a> to play through the API.</p>
</body>
</html>"#
                .to_string(),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use geoguess_shared::catalog::LocationCatalog;
    use geoguess_shared::models::{GameRules, Variant};
    use std::sync::Arc;
    use tower::ServiceExt;

    fn test_app(maps_key: Option<&str>, dist_dir: &Path) -> Router {
        let sessions = sessions::Sessions::new(
            GameRules::for_variant(Variant::World),
            Arc::new(LocationCatalog::world()),
            chrono::Duration::minutes(10),
        );
        let schema = graphql::build_schema(sessions, Variant::World);
        build_app(
            schema,
            MapsKey::new(maps_key.map(str::to_string)),
            dist_dir,
        )
    }

    async fn body_json(resp: axum::response::Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn get_request(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn test_maps_key_returned_when_configured() {
        let dist = tempfile::tempdir().unwrap();
        let app = test_app(Some("test-key-123"), dist.path());

        let resp = app.oneshot(get_request("/api/maps-key")).await.unwrap();

        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(
            body_json(resp).await,
            serde_json::json!({"apiKey": "test-key-123"})
        );
    }

    #[tokio::test]
    async fn test_maps_key_missing_is_server_error() {
        let dist = tempfile::tempdir().unwrap();
        let app = test_app(None, dist.path());

        let resp = app.oneshot(get_request("/api/maps-key")).await.unwrap();

        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = body_json(resp).await;
        assert_eq!(body["error"], "API key not configured");
        assert!(body["message"].as_str().unwrap().contains("not been configured"));
    }

    #[tokio::test]
    async fn test_dist_assets_have_immutable_cache() {
        let dist = tempfile::tempdir().unwrap();
        std::fs::create_dir(dist.path().join("assets")).unwrap();
        std::fs::write(dist.path().join("assets/app-abc123.js"), "bundle()").unwrap();
        let app = test_app(None, dist.path());

        let resp = app
            .oneshot(get_request("/assets/app-abc123.js"))
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(
            resp.headers().get("cache-control").unwrap(),
            "public, max-age=31536000, immutable"
        );
    }

    #[tokio::test]
    async fn test_missing_asset_returns_404() {
        let dist = tempfile::tempdir().unwrap();
        let app = test_app(None, dist.path());

        let resp = app
            .oneshot(get_request("/assets/nonexistent.js"))
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_index_serves_built_frontend() {
        let dist = tempfile::tempdir().unwrap();
        std::fs::write(dist.path().join("index.html"), "<html>game</html>").unwrap();
        let app = test_app(None, dist.path());

        let resp = app.oneshot(get_request("/")).await.unwrap();
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(&bytes[..], b"<html>game</html>");
    }

    #[tokio::test]
    async fn test_index_fallback_without_build() {
        let dist = tempfile::tempdir().unwrap();
        let app = test_app(None, dist.path());

        let resp = app.oneshot(get_request("/")).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        assert!(String::from_utf8_lossy(&bytes).contains("Frontend not built yet"));
    }

    #[tokio::test]
    async fn test_graphql_over_http() {
        let dist = tempfile::tempdir().unwrap();
        let app = test_app(None, dist.path());

        let query = serde_json::json!({
            "query": "mutation { createSession { status round } }"
        });
        let resp = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/graphql")
                    .header("content-type", "application/json")
                    .body(Body::from(query.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(
            body_json(resp).await["data"]["createSession"],
            serde_json::json!({"status": "IDLE", "round": 0})
        );
    }
}
