use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChatRole {
    System,
    User,
    Assistant,
}

impl ChatRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::System => "system",
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatTurn {
    pub role: ChatRole,
    pub content: String,
}

impl ChatTurn {
    pub fn system(content: impl Into<String>) -> Self {
        Self { role: ChatRole::System, content: content.into() }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self { role: ChatRole::User, content: content.into() }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self { role: ChatRole::Assistant, content: content.into() }
    }

    /// Accepts only prior user/assistant turns with string content.
    ///
    /// Clients send loosely shaped history; anything else is dropped instead
    /// of failing the request.
    pub fn from_history_value(value: &Value) -> Option<Self> {
        let content = value.get("content")?.as_str()?;
        let role = match value.get("role")?.as_str()? {
            "user" => ChatRole::User,
            "assistant" => ChatRole::Assistant,
            _ => return None,
        };
        Some(Self { role, content: content.to_string() })
    }
}

/// Language the assistant is asked to answer in.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseLanguage {
    #[default]
    En,
    Te,
    Hi,
    Ta,
    Kn,
    Mr,
}

impl ResponseLanguage {
    /// Unknown or missing codes fall back to English.
    pub fn from_code(code: Option<&str>) -> Self {
        match code.map(|value| value.trim().to_ascii_lowercase()).as_deref() {
            Some("te") => Self::Te,
            Some("hi") => Self::Hi,
            Some("ta") => Self::Ta,
            Some("kn") => Self::Kn,
            Some("mr") => Self::Mr,
            _ => Self::En,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Self::En => "en",
            Self::Te => "te",
            Self::Hi => "hi",
            Self::Ta => "ta",
            Self::Kn => "kn",
            Self::Mr => "mr",
        }
    }
}
