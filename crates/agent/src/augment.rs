use std::fmt::Write as _;
use std::time::Duration;

use agrichat_core::{ExtractedParameters, PredictionResult};
use tracing::{info, warn};

use crate::predictor::{Predictor, PredictorError};

pub const DEFAULT_PREDICTION_TIMEOUT: Duration = Duration::from_secs(10);

const BLOCK_HEADER: &str = "[ML Model Prediction Data - Use this to enhance your response]:";
const BLOCK_INSTRUCTION: &str = "Please provide a comprehensive agricultural response that \
incorporates this ML prediction data. Format the prediction results clearly with the yield \
numbers, confidence level, and actionable recommendations.";

/// Appends yield-model output to a user message before it reaches the language model.
#[derive(Clone, Debug)]
pub struct PredictionAugmenter {
    timeout: Duration,
}

impl Default for PredictionAugmenter {
    fn default() -> Self {
        Self::new(DEFAULT_PREDICTION_TIMEOUT)
    }
}

impl PredictionAugmenter {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Returns `message` untouched when the predictor fails in any way.
    pub async fn augment(
        &self,
        message: &str,
        params: &ExtractedParameters,
        predictor: &dyn Predictor,
    ) -> String {
        match self.fetch(params, predictor).await {
            Ok(prediction) => {
                info!(
                    event_name = "agent.augment.prediction_received",
                    crop = %prediction.crop,
                    confidence_pct = prediction.confidence_pct(),
                    "yield prediction received"
                );
                render_augmented(message, &prediction)
            }
            Err(error) => {
                warn!(
                    event_name = "agent.augment.predictor_failed",
                    error_kind = error.kind(),
                    error = %error,
                    "continuing without yield prediction"
                );
                message.to_string()
            }
        }
    }

    async fn fetch(
        &self,
        params: &ExtractedParameters,
        predictor: &dyn Predictor,
    ) -> Result<PredictionResult, PredictorError> {
        let prediction = tokio::time::timeout(self.timeout, predictor.predict(params))
            .await
            .map_err(|_| PredictorError::Timeout(self.timeout.as_millis()))??;
        prediction.validate().map_err(|error| PredictorError::InvalidPayload(error.to_string()))?;
        Ok(prediction)
    }
}

/// Deterministic rendering; field order is part of the prompt contract.
pub fn render_augmented(message: &str, prediction: &PredictionResult) -> String {
    let mut output = String::with_capacity(message.len() + 512);
    output.push_str(message);
    output.push_str("\n\n");
    output.push_str(BLOCK_HEADER);
    output.push('\n');

    // Writing into a String cannot fail.
    let _ = writeln!(output, "- Crop: {}", prediction.crop);
    let _ = writeln!(output, "- Area: {} hectares", prediction.area_hectares);
    let _ = writeln!(
        output,
        "- Predicted Yield: {} tons ({} kg)",
        prediction.total_yield_tons, prediction.total_yield_kg
    );
    let _ = writeln!(output, "- Yield per Hectare: {} tons/ha", prediction.yield_per_hectare);
    let _ = writeln!(output, "- Confidence: {}%", prediction.confidence_pct());
    let _ = writeln!(output, "- Risk Level: {}", prediction.risk_level);
    let _ = writeln!(
        output,
        "- Impact Factors: Temperature {}%, Rainfall {}%, Soil {}%",
        prediction.factors.temperature_impact,
        prediction.factors.rainfall_impact,
        prediction.factors.soil_impact
    );
    let _ = writeln!(output, "- Recommendations: {}", prediction.recommendations.join("; "));

    output.push('\n');
    output.push_str(BLOCK_INSTRUCTION);
    output
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use agrichat_core::{
        Crop, ExtractedParameters, ImpactFactors, PredictionResult, RiskLevel,
    };
    use async_trait::async_trait;

    use super::{render_augmented, PredictionAugmenter};
    use crate::predictor::{Predictor, PredictorError, UnavailablePredictor};

    fn prediction() -> PredictionResult {
        PredictionResult {
            crop: "wheat".to_string(),
            area_hectares: 5.0,
            total_yield_tons: 16.25,
            total_yield_kg: 16250.0,
            yield_per_hectare: 3.25,
            confidence: 0.876,
            risk_level: RiskLevel::Medium,
            factors: ImpactFactors {
                temperature_impact: 12.0,
                rainfall_impact: -3.5,
                soil_impact: 8.0,
            },
            recommendations: vec!["Irrigate at tillering".to_string(), "Apply potash".to_string()],
        }
    }

    struct FixedPredictor {
        calls: AtomicUsize,
        result: Result<PredictionResult, PredictorError>,
    }

    #[async_trait]
    impl Predictor for FixedPredictor {
        async fn predict(
            &self,
            _params: &ExtractedParameters,
        ) -> Result<PredictionResult, PredictorError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.result.clone()
        }
    }

    struct StalledPredictor;

    #[async_trait]
    impl Predictor for StalledPredictor {
        async fn predict(
            &self,
            _params: &ExtractedParameters,
        ) -> Result<PredictionResult, PredictorError> {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            Err(PredictorError::Transport("unreachable".to_string()))
        }
    }

    fn wheat() -> ExtractedParameters {
        ExtractedParameters::builder().crop(Some(Crop::Wheat)).build()
    }

    #[test]
    fn renders_block_in_fixed_order() {
        let rendered = render_augmented("How much wheat?", &prediction());
        let expected = "How much wheat?\n\n\
[ML Model Prediction Data - Use this to enhance your response]:\n\
- Crop: wheat\n\
- Area: 5 hectares\n\
- Predicted Yield: 16.25 tons (16250 kg)\n\
- Yield per Hectare: 3.25 tons/ha\n\
- Confidence: 88%\n\
- Risk Level: medium\n\
- Impact Factors: Temperature 12%, Rainfall -3.5%, Soil 8%\n\
- Recommendations: Irrigate at tillering; Apply potash\n\n\
Please provide a comprehensive agricultural response that incorporates this ML prediction data. \
Format the prediction results clearly with the yield numbers, confidence level, and actionable \
recommendations.";
        assert_eq!(rendered, expected);
    }

    #[tokio::test]
    async fn successful_prediction_is_appended() {
        let predictor = FixedPredictor { calls: AtomicUsize::new(0), result: Ok(prediction()) };
        let augmented =
            PredictionAugmenter::default().augment("wheat yield?", &wheat(), &predictor).await;

        assert!(augmented.starts_with("wheat yield?\n\n"));
        assert!(augmented.contains("- Confidence: 88%"));
        assert_eq!(predictor.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn failed_prediction_returns_message_unchanged() {
        let predictor = FixedPredictor {
            calls: AtomicUsize::new(0),
            result: Err(PredictorError::Status(503)),
        };
        let augmented =
            PredictionAugmenter::default().augment("wheat yield?", &wheat(), &predictor).await;
        assert_eq!(augmented, "wheat yield?");

        let unavailable =
            PredictionAugmenter::default().augment("wheat yield?", &wheat(), &UnavailablePredictor).await;
        assert_eq!(unavailable, "wheat yield?");
    }

    #[tokio::test]
    async fn invalid_prediction_is_discarded() {
        let mut out_of_range = prediction();
        out_of_range.confidence = 1.5;
        let predictor = FixedPredictor { calls: AtomicUsize::new(0), result: Ok(out_of_range) };

        let augmented =
            PredictionAugmenter::default().augment("wheat yield?", &wheat(), &predictor).await;
        assert_eq!(augmented, "wheat yield?");
    }

    #[tokio::test]
    async fn stalled_predictor_is_bounded_by_timeout() {
        let augmenter = PredictionAugmenter::new(Duration::from_millis(50));
        let started = std::time::Instant::now();
        let augmented = augmenter.augment("wheat yield?", &wheat(), &StalledPredictor).await;

        assert_eq!(augmented, "wheat yield?");
        assert!(started.elapsed() < Duration::from_secs(5));
    }
}
