use agrichat_agent::{ChatRequest, LlmError};
use agrichat_core::{ApplicationError, InterfaceError, ResponseLanguage};
use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, warn};
use uuid::Uuid;

use crate::routes::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct ChatPayload {
    #[serde(default)]
    pub message: Option<String>,
    /// Anything other than an array is treated as no history.
    #[serde(default)]
    pub history: Value,
    #[serde(default)]
    pub language: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChatReply {
    pub reply: String,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChatError {
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub correlation_id: Option<String>,
}

type ChatResult = Result<Json<ChatReply>, (StatusCode, Json<ChatError>)>;

pub async fn chat(
    State(state): State<AppState>,
    payload: Result<Json<ChatPayload>, JsonRejection>,
) -> ChatResult {
    let correlation_id = Uuid::new_v4().to_string();

    let payload = match payload {
        Ok(Json(payload)) => payload,
        Err(rejection) => {
            return Err(interface_error(
                ApplicationError::InvalidRequest(rejection.body_text())
                    .into_interface(&correlation_id),
            ))
        }
    };

    let message = payload.message.unwrap_or_default();
    if message.trim().is_empty() {
        return Err(interface_error(
            ApplicationError::InvalidRequest("Message is required".to_string())
                .into_interface(&correlation_id),
        ));
    }

    let history = match &payload.history {
        Value::Array(entries) => state.runtime.prompts().sanitize_history(entries),
        _ => Vec::new(),
    };
    let language = ResponseLanguage::from_code(payload.language.as_deref());
    info!(
        event_name = "server.chat.received",
        correlation_id = %correlation_id,
        language = language.code(),
        history_turns = history.len(),
        "chat message received"
    );

    let request = ChatRequest { message, history, language };
    match state.runtime.respond(&request).await {
        Ok(reply) => Ok(Json(ChatReply { reply })),
        Err(error) => {
            warn!(
                event_name = "server.chat.llm_failed",
                correlation_id = %correlation_id,
                error_kind = error.kind(),
                error = %error,
                "language model request failed"
            );
            Err(llm_error(error, &correlation_id))
        }
    }
}

/// Upstream statuses pass through with the provider's message; everything
/// else is a 503.
fn llm_error(error: LlmError, correlation_id: &str) -> (StatusCode, Json<ChatError>) {
    if let LlmError::Status { status, message } = &error {
        if let Ok(code) = StatusCode::from_u16(*status) {
            return (
                code,
                Json(ChatError {
                    error: message.clone(),
                    correlation_id: Some(correlation_id.to_string()),
                }),
            );
        }
    }
    interface_error(ApplicationError::Integration(error.to_string()).into_interface(correlation_id))
}

fn interface_error(error: InterfaceError) -> (StatusCode, Json<ChatError>) {
    let (status, message) = match &error {
        InterfaceError::BadRequest { message, .. } => (StatusCode::BAD_REQUEST, message.clone()),
        InterfaceError::ServiceUnavailable { .. } => {
            (StatusCode::SERVICE_UNAVAILABLE, error.user_message().to_string())
        }
        InterfaceError::Internal { .. } => {
            (StatusCode::INTERNAL_SERVER_ERROR, error.user_message().to_string())
        }
    };
    (
        status,
        Json(ChatError { error: message, correlation_id: Some(error.correlation_id().to_string()) }),
    )
}
