use std::sync::Arc;
use std::time::Duration;

use agrichat_agent::{
    AgentRuntime, LlmError, MlServiceClient, OpenAiCompatibleClient, PredictorError,
    WeatherAdvisor,
};
use agrichat_core::config::{AppConfig, ConfigError, LoadOptions};
use thiserror::Error;
use tracing::info;

use crate::routes::AppState;

pub struct Application {
    pub config: AppConfig,
    pub state: AppState,
}

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("prediction client setup failed: {0}")]
    Predictor(#[source] PredictorError),
    #[error("language model client setup failed: {0}")]
    LanguageModel(#[source] LlmError),
}

pub fn bootstrap(options: LoadOptions) -> Result<Application, BootstrapError> {
    let config = AppConfig::load(options)?;
    bootstrap_with_config(config)
}

pub fn bootstrap_with_config(config: AppConfig) -> Result<Application, BootstrapError> {
    info!(
        event_name = "system.bootstrap.start",
        correlation_id = "bootstrap",
        predictor_url = %config.predictor.base_url,
        llm_provider = ?config.llm.provider,
        llm_model = %config.llm.model,
        "starting application bootstrap"
    );

    let ml_client =
        Arc::new(MlServiceClient::from_config(&config.predictor).map_err(BootstrapError::Predictor)?);
    let llm =
        Arc::new(OpenAiCompatibleClient::from_config(&config.llm).map_err(BootstrapError::LanguageModel)?);
    let prediction_timeout = Duration::from_secs(config.predictor.timeout_secs);

    let runtime = AgentRuntime::new(llm, ml_client.clone())
        .with_prediction_timeout(prediction_timeout)
        .with_history_limit(config.llm.history_limit);

    let state = AppState {
        runtime: Arc::new(runtime),
        weather_model: ml_client.clone(),
        weather: WeatherAdvisor::new(prediction_timeout),
        predictor_probe: ml_client,
    };

    info!(
        event_name = "system.bootstrap.ready",
        correlation_id = "bootstrap",
        "application bootstrap complete"
    );
    Ok(Application { config, state })
}

#[cfg(test)]
mod tests {
    use agrichat_core::config::{ConfigOverrides, LlmProvider, LoadOptions};

    use crate::bootstrap::{bootstrap, BootstrapError};

    fn options(overrides: ConfigOverrides) -> LoadOptions {
        let config_path = std::env::temp_dir().join("agrichat-bootstrap-absent.toml");
        LoadOptions { config_path: Some(config_path), require_file: false, overrides }
    }

    #[test]
    fn bootstrap_fails_fast_without_hosted_api_key() {
        let result = bootstrap(options(ConfigOverrides {
            llm_provider: Some(LlmProvider::OpenAi),
            llm_api_key: Some("   ".to_string()),
            ..ConfigOverrides::default()
        }));

        let message = match result {
            Err(BootstrapError::Config(error)) => error.to_string(),
            Err(other) => format!("unexpected error: {other}"),
            Ok(_) => "bootstrap unexpectedly succeeded".to_string(),
        };
        assert!(message.contains("llm.api_key"), "{message}");
    }

    #[test]
    fn bootstrap_wires_state_from_config() -> Result<(), String> {
        let app = bootstrap(options(ConfigOverrides {
            llm_provider: Some(LlmProvider::Ollama),
            predictor_base_url: Some("http://127.0.0.1:5999".to_string()),
            ..ConfigOverrides::default()
        }))
        .map_err(|error| error.to_string())?;

        assert_eq!(app.config.predictor.base_url, "http://127.0.0.1:5999");
        assert_eq!(app.state.runtime.prompts().history_limit(), app.config.llm.history_limit);
        Ok(())
    }
}
