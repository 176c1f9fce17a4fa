use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use agrichat_core::config::{AppConfig, LoadOptions, DEFAULT_CONFIG_FILES};
use secrecy::ExposeSecret;
use serde::Serialize;
use toml::Value;

use super::CommandResult;

#[derive(Debug, Serialize)]
struct ConfigEntry {
    key: &'static str,
    value: String,
    source: String,
}

pub fn run() -> CommandResult {
    run_with(LoadOptions::default())
}

/// Effective values with where each came from (env > file > default). Secrets
/// never leave this function unredacted.
pub fn run_with(options: LoadOptions) -> CommandResult {
    let config_file_path = options.config_path.clone().or_else(detect_config_path);
    let config = match AppConfig::load(options) {
        Ok(config) => config,
        Err(error) => return CommandResult::failure("config", "config_validation", error.to_string(), 2),
    };
    let config_file_doc = load_config_file_doc(config_file_path.as_deref());
    let source = |key_path: &str, env_keys: &[&str]| {
        field_source(key_path, env_keys, config_file_doc.as_ref(), config_file_path.as_deref())
    };

    let api_key = match &config.llm.api_key {
        Some(key) => redact_token(key.expose_secret()),
        None => "<unset>".to_string(),
    };
    let static_dir = config
        .server
        .static_dir
        .as_ref()
        .map(|dir| dir.display().to_string())
        .unwrap_or_else(|| "<unset>".to_string());

    let entries = vec![
        ConfigEntry {
            key: "predictor.base_url",
            value: config.predictor.base_url.clone(),
            source: source("predictor.base_url", &["AGRICHAT_PREDICTOR_BASE_URL", "ML_API_URL"]),
        },
        ConfigEntry {
            key: "predictor.timeout_secs",
            value: config.predictor.timeout_secs.to_string(),
            source: source("predictor.timeout_secs", &["AGRICHAT_PREDICTOR_TIMEOUT_SECS"]),
        },
        ConfigEntry {
            key: "llm.provider",
            value: format!("{:?}", config.llm.provider).to_ascii_lowercase(),
            source: source("llm.provider", &["AGRICHAT_LLM_PROVIDER"]),
        },
        ConfigEntry {
            key: "llm.api_key",
            value: api_key,
            source: source(
                "llm.api_key",
                &["AGRICHAT_LLM_API_KEY", "GROQ_API_KEY", "GROK_API_KEY"],
            ),
        },
        ConfigEntry {
            key: "llm.base_url",
            value: config.llm.effective_base_url().to_string(),
            source: source("llm.base_url", &["AGRICHAT_LLM_BASE_URL", "GROQ_API_URL"]),
        },
        ConfigEntry {
            key: "llm.model",
            value: config.llm.model.clone(),
            source: source("llm.model", &["AGRICHAT_LLM_MODEL", "MODEL_NAME"]),
        },
        ConfigEntry {
            key: "llm.temperature",
            value: config.llm.temperature.to_string(),
            source: source("llm.temperature", &["AGRICHAT_LLM_TEMPERATURE"]),
        },
        ConfigEntry {
            key: "llm.max_tokens",
            value: config.llm.max_tokens.to_string(),
            source: source("llm.max_tokens", &["AGRICHAT_LLM_MAX_TOKENS"]),
        },
        ConfigEntry {
            key: "llm.timeout_secs",
            value: config.llm.timeout_secs.to_string(),
            source: source("llm.timeout_secs", &["AGRICHAT_LLM_TIMEOUT_SECS"]),
        },
        ConfigEntry {
            key: "llm.history_limit",
            value: config.llm.history_limit.to_string(),
            source: source("llm.history_limit", &["AGRICHAT_LLM_HISTORY_LIMIT"]),
        },
        ConfigEntry {
            key: "server.bind_address",
            value: config.server.bind_address.clone(),
            source: source("server.bind_address", &["AGRICHAT_SERVER_BIND_ADDRESS"]),
        },
        ConfigEntry {
            key: "server.port",
            value: config.server.port.to_string(),
            source: source("server.port", &["AGRICHAT_SERVER_PORT", "PORT"]),
        },
        ConfigEntry {
            key: "server.graceful_shutdown_secs",
            value: config.server.graceful_shutdown_secs.to_string(),
            source: source(
                "server.graceful_shutdown_secs",
                &["AGRICHAT_SERVER_GRACEFUL_SHUTDOWN_SECS"],
            ),
        },
        ConfigEntry {
            key: "server.static_dir",
            value: static_dir,
            source: source("server.static_dir", &["AGRICHAT_SERVER_STATIC_DIR"]),
        },
        ConfigEntry {
            key: "logging.level",
            value: config.logging.level.clone(),
            source: source("logging.level", &["AGRICHAT_LOGGING_LEVEL", "AGRICHAT_LOG_LEVEL"]),
        },
        ConfigEntry {
            key: "logging.format",
            value: format!("{:?}", config.logging.format).to_ascii_lowercase(),
            source: source("logging.format", &["AGRICHAT_LOGGING_FORMAT", "AGRICHAT_LOG_FORMAT"]),
        },
    ];

    CommandResult::success("config", entries)
}

fn detect_config_path() -> Option<PathBuf> {
    DEFAULT_CONFIG_FILES.into_iter().map(PathBuf::from).find(|path| path.exists())
}

fn load_config_file_doc(path: Option<&Path>) -> Option<Value> {
    let path = path?;
    let raw = fs::read_to_string(path).ok()?;
    raw.parse::<Value>().ok()
}

fn field_source(
    key_path: &str,
    env_keys: &[&str],
    config_file_doc: Option<&Value>,
    config_file_path: Option<&Path>,
) -> String {
    if let Some(env_key) = env_keys.iter().find(|key| env::var_os(key).is_some()) {
        return format!("env ({env_key})");
    }

    if let Some(doc) = config_file_doc {
        if contains_path(doc, key_path) {
            let file_path = config_file_path
                .map(|path| path.display().to_string())
                .unwrap_or_else(|| "config file".to_string());
            return format!("file ({file_path})");
        }
    }

    "default".to_string()
}

fn contains_path(root: &Value, key_path: &str) -> bool {
    let mut current = root;
    for key in key_path.split('.') {
        let Some(next) = current.get(key) else {
            return false;
        };
        current = next;
    }
    true
}

/// Keeps a provider prefix such as `gsk_` so operators can tell keys apart.
fn redact_token(token: &str) -> String {
    let trimmed = token.trim();
    if trimmed.is_empty() {
        return "<empty>".to_string();
    }

    match trimmed.find(['_', '-']) {
        Some(index) if index > 0 && index <= 8 => format!("{}***", &trimmed[..=index]),
        _ => "<redacted>".to_string(),
    }
}
