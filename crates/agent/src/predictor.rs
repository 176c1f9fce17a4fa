use agrichat_core::{ExtractedParameters, PredictionResult};
use async_trait::async_trait;
use thiserror::Error;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum PredictorError {
    #[error("prediction request timed out after {0} ms")]
    Timeout(u128),
    #[error("prediction request failed: {0}")]
    Transport(String),
    #[error("prediction service returned status {0}")]
    Status(u16),
    #[error("prediction service reported failure: {0}")]
    Rejected(String),
    #[error("prediction response could not be decoded: {0}")]
    Decode(String),
    #[error("prediction response is invalid: {0}")]
    InvalidPayload(String),
}

impl PredictorError {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Timeout(_) => "timeout",
            Self::Transport(_) => "transport",
            Self::Status(_) => "status",
            Self::Rejected(_) => "rejected",
            Self::Decode(_) => "decode",
            Self::InvalidPayload(_) => "invalid_payload",
        }
    }
}

/// External yield model consulted for yield questions.
#[async_trait]
pub trait Predictor: Send + Sync {
    async fn predict(&self, params: &ExtractedParameters)
        -> Result<PredictionResult, PredictorError>;
}

/// A predictor that is never reachable. Used when prediction is disabled.
#[derive(Clone, Copy, Debug, Default)]
pub struct UnavailablePredictor;

#[async_trait]
impl Predictor for UnavailablePredictor {
    async fn predict(
        &self,
        _params: &ExtractedParameters,
    ) -> Result<PredictionResult, PredictorError> {
        Err(PredictorError::Transport("prediction service is not configured".to_string()))
    }
}
