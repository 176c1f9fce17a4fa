use std::path::Path;
use std::sync::Arc;

use agrichat_agent::{AgentRuntime, WeatherAdvisor, WeatherModel};
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::CorsLayer,
    services::{ServeDir, ServeFile},
};

use crate::health::{self, DependencyProbe};
use crate::{chat, weather};

pub const BANNER: &str = "AgriChat backend is running";

#[derive(Clone)]
pub struct AppState {
    pub runtime: Arc<AgentRuntime>,
    pub weather_model: Arc<dyn WeatherModel>,
    pub weather: WeatherAdvisor,
    pub predictor_probe: Arc<dyn DependencyProbe>,
}

/// API routes. With a front-end directory, unknown paths (including `/`) are
/// served from it with `index.html` as the fallback; without one, `/` answers
/// with a plain-text banner.
pub fn router(state: AppState, static_dir: Option<&Path>) -> Router {
    let api = Router::new()
        .route("/health", get(health::health))
        .route("/api/chatbot", post(chat::chat))
        .route("/api/get-weather", post(weather::get_weather))
        .with_state(state);

    let app = match static_dir {
        Some(dir) => api.fallback_service(
            ServeDir::new(dir).fallback(ServeFile::new(dir.join("index.html"))),
        ),
        None => api.route("/", get(banner)),
    };

    app.layer(CorsLayer::permissive())
}

async fn banner() -> &'static str {
    BANNER
}


#[cfg(test)]
mod tests {
    use axum::{
        body::{to_bytes, Body},
        http::{header, Method, Request, StatusCode},
    };
    use tower::ServiceExt;

    use super::{router, test_support, BANNER};

    #[tokio::test]
    async fn root_serves_banner() -> Result<(), String> {
        let app = router(test_support::state(Ok(String::new())), None);
        let response = app
            .oneshot(Request::get("/").body(Body::empty()).map_err(|error| error.to_string())?)
            .await
            .map_err(|error| error.to_string())?;

        assert_eq!(response.status(), StatusCode::OK);
        let body = to_bytes(response.into_body(), 1024).await.map_err(|error| error.to_string())?;
        assert_eq!(body, BANNER.as_bytes());
        Ok(())
    }

    #[tokio::test]
    async fn cors_preflight_is_allowed_for_any_origin() -> Result<(), String> {
        let app = router(test_support::state(Ok(String::new())), None);
        let request = Request::builder()
            .method(Method::OPTIONS)
            .uri("/api/chatbot")
            .header(header::ORIGIN, "http://localhost:3000")
            .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
            .body(Body::empty())
            .map_err(|error| error.to_string())?;

        let response = app.oneshot(request).await.map_err(|error| error.to_string())?;
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key(header::ACCESS_CONTROL_ALLOW_ORIGIN));
        Ok(())
    }

    #[tokio::test]
    async fn static_directory_serves_assets_and_index() -> Result<(), String> {
        let dir = tempfile::tempdir().map_err(|error| error.to_string())?;
        std::fs::write(dir.path().join("index.html"), "<h1>AgriChat</h1>")
            .map_err(|error| error.to_string())?;
        std::fs::write(dir.path().join("app.js"), "console.log('ok')")
            .map_err(|error| error.to_string())?;

        let app = router(test_support::state(Ok(String::new())), Some(dir.path()));
        let asset = app
            .clone()
            .oneshot(Request::get("/app.js").body(Body::empty()).map_err(|error| error.to_string())?)
            .await
            .map_err(|error| error.to_string())?;
        assert_eq!(asset.status(), StatusCode::OK);

        for path in ["/", "/weather"] {
            let page = app
                .clone()
                .oneshot(Request::get(path).body(Body::empty()).map_err(|error| error.to_string())?)
                .await
                .map_err(|error| error.to_string())?;
            assert_eq!(page.status(), StatusCode::OK);
            let body = to_bytes(page.into_body(), 1024).await.map_err(|error| error.to_string())?;
            assert_eq!(body, "<h1>AgriChat</h1>".as_bytes());
        }
        Ok(())
    }
}
