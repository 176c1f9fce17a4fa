//! HTTP client for the crop-model service (`/predict-yield`, `/predict-weather`).

use std::time::Duration;

use agrichat_core::config::PredictorConfig;
use agrichat_core::{ExtractedParameters, PredictionResult};
use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::predictor::{Predictor, PredictorError};
use crate::weather::{WeatherAdvice, WeatherModel, WeatherQuery};

#[derive(Clone, Debug)]
pub struct MlServiceClient {
    client: Client,
    base_url: String,
    timeout: Duration,
}

impl MlServiceClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, PredictorError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|error| PredictorError::Transport(error.to_string()))?;
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Ok(Self { client, base_url, timeout })
    }

    pub fn from_config(config: &PredictorConfig) -> Result<Self, PredictorError> {
        Self::new(&config.base_url, Duration::from_secs(config.timeout_secs))
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Liveness probe against the service root.
    pub async fn ping(&self) -> Result<(), PredictorError> {
        let response = self
            .client
            .get(format!("{}/", self.base_url))
            .send()
            .await
            .map_err(|error| self.classify_transport(error))?;
        if !response.status().is_success() {
            return Err(PredictorError::Status(response.status().as_u16()));
        }
        Ok(())
    }

    async fn post_json<T: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &T,
    ) -> Result<Value, PredictorError> {
        let url = format!("{}{path}", self.base_url);
        debug!(event_name = "agent.ml_service.request", url = %url, "calling ml service");

        let response = self
            .client
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|error| self.classify_transport(error))?;

        if !response.status().is_success() {
            return Err(PredictorError::Status(response.status().as_u16()));
        }

        response.json::<Value>().await.map_err(|error| PredictorError::Decode(error.to_string()))
    }

    fn classify_transport(&self, error: reqwest::Error) -> PredictorError {
        if error.is_timeout() {
            PredictorError::Timeout(self.timeout.as_millis())
        } else {
            PredictorError::Transport(error.to_string())
        }
    }
}

/// Accepts a bare prediction or one wrapped with a `success` flag.
fn decode_prediction(payload: Value) -> Result<PredictionResult, PredictorError> {
    if payload.get("success").and_then(Value::as_bool) == Some(false) {
        let reason = payload
            .get("error")
            .and_then(Value::as_str)
            .unwrap_or("service returned success=false")
            .to_string();
        return Err(PredictorError::Rejected(reason));
    }

    let prediction: PredictionResult =
        serde_json::from_value(payload).map_err(|error| PredictorError::Decode(error.to_string()))?;
    prediction.validate().map_err(|error| PredictorError::InvalidPayload(error.to_string()))?;
    Ok(prediction)
}

#[async_trait]
impl Predictor for MlServiceClient {
    async fn predict(
        &self,
        params: &ExtractedParameters,
    ) -> Result<PredictionResult, PredictorError> {
        let payload = self.post_json("/predict-yield", params).await?;
        decode_prediction(payload)
    }
}

#[async_trait]
impl WeatherModel for MlServiceClient {
    async fn forecast(&self, query: &WeatherQuery) -> Result<WeatherAdvice, PredictorError> {
        let payload = self.post_json("/predict-weather", query).await?;
        serde_json::from_value(payload).map_err(|error| PredictorError::Decode(error.to_string()))
    }
}
