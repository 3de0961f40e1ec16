use std::time::Duration;

use docchat_logging::{docchat_debug, docchat_info, docchat_warn};
use reqwest::multipart::{Form, Part};
use reqwest::{Body, StatusCode};
use url::Url;

use crate::{ChatRequest, ChatResponse, GatewayError, GatewayErrorKind, IngestAck, UploadFile};

pub const DEFAULT_ENDPOINT_BASE: &str = "http://127.0.0.1:8000/api/v1";

const INGEST_PATH: &str = "documents/ingest";
const QUERY_PATH: &str = "chat";

#[derive(Debug, Clone)]
pub struct GatewaySettings {
    /// Base URL both endpoints are resolved against.
    pub endpoint_base: String,
    pub connect_timeout: Duration,
    /// No overall request timeout unless set; a call resolves or fails on its own.
    pub request_timeout: Option<Duration>,
}

impl Default for GatewaySettings {
    fn default() -> Self {
        Self {
            endpoint_base: DEFAULT_ENDPOINT_BASE.to_string(),
            connect_timeout: Duration::from_secs(10),
            request_timeout: None,
        }
    }
}

/// The remote ingestion/query service.
#[async_trait::async_trait]
pub trait Gateway: Send + Sync {
    /// Any non-error response counts as success, whatever its body.
    async fn ingest(&self, file: UploadFile) -> Result<IngestAck, GatewayError>;

    async fn query(&self, text: &str) -> Result<ChatResponse, GatewayError>;
}

#[derive(Debug, Clone)]
pub struct ReqwestGateway {
    client: reqwest::Client,
    base: Url,
}

impl ReqwestGateway {
    pub fn new(settings: GatewaySettings) -> Result<Self, GatewayError> {
        let base = parse_base(&settings.endpoint_base)?;
        let mut builder = reqwest::Client::builder().connect_timeout(settings.connect_timeout);
        if let Some(timeout) = settings.request_timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|err| GatewayError::new(GatewayErrorKind::Network, err.to_string()))?;
        Ok(Self { client, base })
    }

    pub fn endpoint(&self, path: &str) -> Result<Url, GatewayError> {
        self.base
            .join(path)
            .map_err(|err| GatewayError::new(GatewayErrorKind::InvalidEndpoint, err.to_string()))
    }
}

#[async_trait::async_trait]
impl Gateway for ReqwestGateway {
    async fn ingest(&self, file: UploadFile) -> Result<IngestAck, GatewayError> {
        let url = self.endpoint(INGEST_PATH)?;
        let size = file.byte_len();
        docchat_info!("Ingest {} ({} bytes) -> {}", file.filename, size, url);

        let part = Part::stream_with_length(Body::from(file.bytes), size)
            .file_name(file.filename)
            .mime_str(file.content_type)
            .map_err(map_reqwest_error)?;
        let form = Form::new().part("file", part);

        let response = self
            .client
            .post(url)
            .multipart(form)
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status();
        let body = response.text().await.map_err(map_reqwest_error)?;
        if !status.is_success() {
            return Err(status_error(status, &body));
        }

        let ack: IngestAck = serde_json::from_str(&body).unwrap_or_default();
        if let Some(message) = ack.message.as_deref() {
            docchat_debug!("Ingest acknowledged: {}", message);
        }
        Ok(ack)
    }

    async fn query(&self, text: &str) -> Result<ChatResponse, GatewayError> {
        let url = self.endpoint(QUERY_PATH)?;
        docchat_info!("Query query_len={} -> {}", text.len(), url);

        let response = self
            .client
            .post(url)
            .json(&ChatRequest { query: text })
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status();
        let body = response.text().await.map_err(map_reqwest_error)?;
        if !status.is_success() {
            return Err(status_error(status, &body));
        }

        serde_json::from_str(&body).map_err(|err| {
            docchat_warn!("Undecodable query response: {}", err);
            GatewayError::new(GatewayErrorKind::Decode, err.to_string())
        })
    }
}

/// Joining relative paths only appends when the base path ends in `/`.
fn parse_base(raw: &str) -> Result<Url, GatewayError> {
    let mut base = Url::parse(raw.trim())
        .map_err(|err| GatewayError::new(GatewayErrorKind::InvalidEndpoint, err.to_string()))?;
    if base.cannot_be_a_base() {
        return Err(GatewayError::new(
            GatewayErrorKind::InvalidEndpoint,
            format!("{raw} cannot be used as a base url"),
        ));
    }
    if !base.path().ends_with('/') {
        let path = format!("{}/", base.path());
        base.set_path(&path);
    }
    Ok(base)
}

/// Prefers the backend's own explanation (`detail`, then `message`) over the
/// bare status line.
fn status_error(status: StatusCode, body: &str) -> GatewayError {
    let detail = serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|value| {
            ["detail", "message"].iter().find_map(|key| {
                value
                    .get(key)
                    .and_then(|field| field.as_str())
                    .map(str::trim)
                    .filter(|text| !text.is_empty())
                    .map(ToOwned::to_owned)
            })
        });
    GatewayError::new(
        GatewayErrorKind::HttpStatus(status.as_u16()),
        detail.unwrap_or_else(|| status.to_string()),
    )
}

fn map_reqwest_error(err: reqwest::Error) -> GatewayError {
    if err.is_timeout() {
        return GatewayError::new(GatewayErrorKind::Timeout, err.to_string());
    }
    if err.is_builder() {
        return GatewayError::new(GatewayErrorKind::InvalidEndpoint, err.to_string());
    }
    if err.is_decode() {
        return GatewayError::new(GatewayErrorKind::Decode, err.to_string());
    }
    GatewayError::new(GatewayErrorKind::Network, err.to_string())
}
