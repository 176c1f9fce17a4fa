use std::sync::Arc;
use std::time::Duration;

use agrichat_core::{ChatTurn, ExtractedParameters, ResponseLanguage};
use tracing::{debug, info};

use crate::augment::PredictionAugmenter;
use crate::extraction::ParameterExtractor;
use crate::intent::IntentDetector;
use crate::llm::{LlmClient, LlmError};
use crate::normalize::ResponseNormalizer;
use crate::predictor::Predictor;
use crate::prompt::PromptBuilder;

#[derive(Clone, Debug, Default, PartialEq)]
pub struct ChatRequest {
    pub message: String,
    pub history: Vec<ChatTurn>,
    pub language: ResponseLanguage,
}

impl ChatRequest {
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into(), ..Self::default() }
    }
}

/// One chat exchange: enrich the message, ask the language model, tidy the reply.
#[derive(Clone)]
pub struct AgentRuntime {
    llm: Arc<dyn LlmClient>,
    predictor: Arc<dyn Predictor>,
    detector: IntentDetector,
    extractor: ParameterExtractor,
    augmenter: PredictionAugmenter,
    normalizer: ResponseNormalizer,
    prompts: PromptBuilder,
}

impl AgentRuntime {
    pub fn new(llm: Arc<dyn LlmClient>, predictor: Arc<dyn Predictor>) -> Self {
        Self {
            llm,
            predictor,
            detector: IntentDetector::new(),
            extractor: ParameterExtractor::new(),
            augmenter: PredictionAugmenter::default(),
            normalizer: ResponseNormalizer::new(),
            prompts: PromptBuilder::default(),
        }
    }

    pub fn with_prediction_timeout(mut self, timeout: Duration) -> Self {
        self.augmenter = PredictionAugmenter::new(timeout);
        self
    }

    pub fn with_history_limit(mut self, history_limit: usize) -> Self {
        self.prompts = PromptBuilder::new(history_limit);
        self
    }

    pub fn prompts(&self) -> &PromptBuilder {
        &self.prompts
    }

    /// `None` unless the message reads as a yield question.
    pub fn detect_and_extract(&self, message: &str) -> Option<ExtractedParameters> {
        let keyword = self.detector.matched_keyword(message)?;
        let params = self.extractor.extract(message);
        debug!(
            event_name = "agent.runtime.yield_intent",
            keyword,
            fields = ?params.present_fields(),
            "yield question detected"
        );
        Some(params)
    }

    pub async fn augment(&self, message: &str) -> String {
        match self.detect_and_extract(message) {
            Some(params) => self.augmenter.augment(message, &params, self.predictor.as_ref()).await,
            None => message.to_string(),
        }
    }

    pub fn normalize(&self, raw_reply: &str) -> String {
        self.normalizer.normalize(raw_reply)
    }

    pub async fn respond(&self, request: &ChatRequest) -> Result<String, LlmError> {
        let augmented = self.augment(&request.message).await;
        let augmented_len = augmented.len();
        let messages = self.prompts.build(&augmented, &request.history, request.language);

        let raw_reply = self.llm.complete(&messages).await?;
        let reply = self.normalize(&raw_reply);
        info!(
            event_name = "agent.runtime.reply_ready",
            language = request.language.code(),
            history_turns = messages.len() - 2,
            augmented = augmented_len != request.message.len(),
            reply_chars = reply.chars().count(),
            "chat reply ready"
        );
        Ok(reply)
    }
}
