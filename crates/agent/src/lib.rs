//! Chat pipeline for the AgriChat assistant.
//!
//! A message flows through a fixed sequence:
//!
//! 1. **Intent** (`intent`): does the message ask for a yield estimate?
//! 2. **Extraction** (`extraction`): pull crop, area, weather and soil hints out of the text
//! 3. **Augmentation** (`augment`): append the yield model's answer, if it gives one
//! 4. **Completion** (`llm`, `prompt`): ask the language model for a reply
//! 5. **Normalization** (`normalize`): rewrite the reply into canonical markdown
//!
//! `AgentRuntime` wires the steps together. The external services sit behind
//! the `Predictor`, `WeatherModel` and `LlmClient` traits so the pipeline runs
//! the same against HTTP clients and test doubles.
//!
//! Prediction is best effort: a slow or failing yield model never fails a
//! chat reply, the message is simply sent without the extra data.

pub mod augment;
pub mod extraction;
pub mod intent;
pub mod llm;
pub mod ml_service;
pub mod normalize;
pub mod predictor;
pub mod prompt;
pub mod runtime;
pub mod weather;

use agrichat_core::ExtractedParameters;

pub use augment::PredictionAugmenter;
pub use extraction::ParameterExtractor;
pub use intent::IntentDetector;
pub use llm::{LlmClient, LlmError, OpenAiCompatibleClient};
pub use ml_service::MlServiceClient;
pub use normalize::{PipeTableDetector, ResponseNormalizer, TableDetector};
pub use predictor::{Predictor, PredictorError, UnavailablePredictor};
pub use prompt::PromptBuilder;
pub use runtime::{AgentRuntime, ChatRequest};
pub use weather::{WeatherAdvice, WeatherAdvisor, WeatherModel, WeatherQuery};

/// Extracted parameters when `message` is a yield question, `None` otherwise.
pub fn detect_and_extract(message: &str) -> Option<ExtractedParameters> {
    IntentDetector::new().matched_keyword(message)?;
    Some(ParameterExtractor::new().extract(message))
}

/// Appends a yield prediction to `message` when it is a yield question and
/// the predictor answers in time; otherwise returns `message` unchanged.
pub async fn augment(message: &str, predictor: &dyn Predictor) -> String {
    match detect_and_extract(message) {
        Some(params) => PredictionAugmenter::default().augment(message, &params, predictor).await,
        None => message.to_string(),
    }
}

/// Tidies a raw model reply into consistent markdown; total, never fails.
pub fn normalize(raw_reply: &str) -> String {
    ResponseNormalizer::new().normalize(raw_reply)
}
