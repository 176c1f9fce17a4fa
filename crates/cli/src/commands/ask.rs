use std::sync::Arc;
use std::time::Duration;

use agrichat_agent::{
    AgentRuntime, ChatRequest, LlmError, MlServiceClient, OpenAiCompatibleClient, Predictor,
    UnavailablePredictor,
};
use agrichat_core::config::{AppConfig, LoadOptions};
use agrichat_core::ResponseLanguage;
use anyhow::{Context, Result};
use serde::Serialize;
use tracing::debug;

use super::CommandResult;

#[derive(Debug, Serialize)]
struct AskReply {
    language: &'static str,
    reply: String,
}

pub fn run(message: &str, language: Option<&str>, predict: bool) -> CommandResult {
    run_with(LoadOptions::default(), message, language, predict)
}

pub fn run_with(
    options: LoadOptions,
    message: &str,
    language: Option<&str>,
    predict: bool,
) -> CommandResult {
    if message.trim().is_empty() {
        return CommandResult::failure("ask", "invalid_input", "Message is required", 2);
    }

    let config = match AppConfig::load(options) {
        Ok(config) => config,
        Err(error) => return CommandResult::failure("ask", "config_validation", error.to_string(), 2),
    };
    let language = ResponseLanguage::from_code(language);

    match ask(&config, message, language, predict) {
        Ok(reply) => CommandResult::success("ask", AskReply { language: language.code(), reply }),
        Err(error) => {
            let error_class = match error.downcast_ref::<LlmError>() {
                Some(llm_error) => llm_error.kind(),
                None => "runtime",
            };
            CommandResult::failure("ask", error_class, format!("{error:#}"), 1)
        }
    }
}

fn ask(
    config: &AppConfig,
    message: &str,
    language: ResponseLanguage,
    predict: bool,
) -> Result<String> {
    let llm = OpenAiCompatibleClient::from_config(&config.llm)
        .context("language model client setup failed")?;
    let llm_model = llm.model().to_string();
    let predictor: Arc<dyn Predictor> = if predict {
        Arc::new(
            MlServiceClient::from_config(&config.predictor)
                .context("prediction client setup failed")?,
        )
    } else {
        Arc::new(UnavailablePredictor)
    };
    let runtime = AgentRuntime::new(Arc::new(llm), predictor)
        .with_prediction_timeout(Duration::from_secs(config.predictor.timeout_secs))
        .with_history_limit(config.llm.history_limit);

    let request = ChatRequest { language, ..ChatRequest::new(message) };
    debug!(
        event_name = "cli.ask.start",
        correlation_id = "cli",
        llm_model = %llm_model,
        language = language.code(),
        predict,
        "sending message through the chat pipeline"
    );
    let async_runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to initialize async runtime")?;

    let reply = async_runtime.block_on(runtime.respond(&request))?;
    Ok(reply)
}
