use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

pub type SessionId = u64;
pub type ConversationId = u64;

/// Body of `POST {base}/chat`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatRequest<'a> {
    pub query: &'a str,
}

/// Body returned by `POST {base}/chat`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ChatResponse {
    pub answer: String,
    #[serde(default)]
    pub sources: Option<Vec<SourceSnippet>>,
    #[serde(default)]
    pub confidence: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SourceSnippet {
    pub text: String,
    pub source: String,
    /// Numbers and numeric strings are accepted; anything else is page 0.
    #[serde(default, deserialize_with = "lenient_page")]
    pub page: u32,
}

fn lenient_page<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    let page = match value {
        serde_json::Value::Number(number) => number
            .as_u64()
            .and_then(|n| u32::try_from(n).ok())
            .unwrap_or(0),
        serde_json::Value::String(text) => text.trim().parse().unwrap_or(0),
        _ => 0,
    };
    Ok(page)
}

/// Acknowledgement of `POST {base}/documents/ingest`.
///
/// The body is opaque to the client; fields are filled when the backend happens
/// to send them and are only used for logging.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(default)]
pub struct IngestAck {
    pub id: Option<String>,
    pub message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    StepTick {
        session: SessionId,
    },
    ProgressTick {
        session: SessionId,
    },
    IngestCompleted {
        session: SessionId,
        result: Result<IngestAck, GatewayError>,
    },
    HandoffDue {
        session: SessionId,
    },
    QueryCompleted {
        conversation: ConversationId,
        result: Result<ChatResponse, GatewayError>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind}: {message}")]
pub struct GatewayError {
    pub kind: GatewayErrorKind,
    /// Human-readable detail, extracted from the response body when possible.
    pub message: String,
}

impl GatewayError {
    pub(crate) fn new(kind: GatewayErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GatewayErrorKind {
    InvalidEndpoint,
    HttpStatus(u16),
    Timeout,
    Network,
    Decode,
    Io,
}

impl fmt::Display for GatewayErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GatewayErrorKind::InvalidEndpoint => write!(f, "invalid endpoint"),
            GatewayErrorKind::HttpStatus(code) => write!(f, "http status {code}"),
            GatewayErrorKind::Timeout => write!(f, "timeout"),
            GatewayErrorKind::Network => write!(f, "network error"),
            GatewayErrorKind::Decode => write!(f, "invalid response body"),
            GatewayErrorKind::Io => write!(f, "io error"),
        }
    }
}
