use agrichat_agent::MlServiceClient;
use async_trait::async_trait;
use axum::{extract::State, http::StatusCode, Json};
use chrono::Utc;
use serde::Serialize;

use crate::routes::AppState;

/// Reachability check for a downstream service.
#[async_trait]
pub trait DependencyProbe: Send + Sync {
    async fn probe(&self) -> Result<(), String>;
}

#[async_trait]
impl DependencyProbe for MlServiceClient {
    async fn probe(&self) -> Result<(), String> {
        self.ping().await.map_err(|error| error.to_string())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct HealthCheck {
    pub status: &'static str,
    pub detail: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: HealthCheck,
    pub predictor: HealthCheck,
    pub checked_at: String,
}

/// Chat keeps working without the yield model, so a down predictor reports
/// `degraded` with a 200 rather than failing readiness.
pub async fn health(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let predictor = match state.predictor_probe.probe().await {
        Ok(()) => HealthCheck { status: "ready", detail: "prediction service reachable".to_string() },
        Err(error) => HealthCheck {
            status: "degraded",
            detail: format!("prediction service unreachable: {error}"),
        },
    };
    let ready = predictor.status == "ready";

    let payload = HealthResponse {
        status: if ready { "ready" } else { "degraded" },
        service: HealthCheck {
            status: "ready",
            detail: "agrichat-server runtime initialized".to_string(),
        },
        predictor,
        checked_at: Utc::now().to_rfc3339(),
    };
    (StatusCode::OK, Json(payload))
}
