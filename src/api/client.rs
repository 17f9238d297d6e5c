//! HTTP access to the joke backend.
//!
//! [`JokeBackend`] is the seam the controller talks through; [`HttpBackend`]
//! is the reqwest implementation used by the binary. Every non-success
//! outcome is folded into a [`BackendError`] so callers never see raw
//! transport types.

use std::error::Error as StdError;
use std::fmt;

use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::api::{ErrorBody, GenerateJokeRequest, JokeResponse, LoadModelResponse, StatusResponse};
use crate::utils::url::{construct_api_url, normalize_base_url};

/// Failure of a single backend request.
#[derive(Debug, Clone, PartialEq)]
pub enum BackendError {
    /// No response was received.
    Transport(String),
    /// Non-success status with a JSON error body.
    Http { status: u16, detail: Option<String> },
    /// Non-success status whose body was not a JSON error object.
    UnparseableBody { status: u16 },
    /// Success status, but the payload did not match the contract.
    Decode(String),
}

impl BackendError {
    pub fn detail(&self) -> Option<&str> {
        match self {
            BackendError::Http { detail, .. } => detail.as_deref(),
            _ => None,
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            BackendError::Http { status, .. } | BackendError::UnparseableBody { status } => {
                Some(*status)
            }
            _ => None,
        }
    }
}

impl fmt::Display for BackendError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendError::Transport(message) => write!(f, "{message}"),
            BackendError::Http {
                status,
                detail: Some(detail),
            } => write!(f, "HTTP {status}: {detail}"),
            BackendError::Http {
                status,
                detail: None,
            } => write!(f, "HTTP {status}"),
            BackendError::UnparseableBody { status } => {
                write!(f, "HTTP {status} with unreadable error body")
            }
            BackendError::Decode(message) => write!(f, "Unexpected response: {message}"),
        }
    }
}

impl StdError for BackendError {}

impl From<reqwest::Error> for BackendError {
    fn from(err: reqwest::Error) -> Self {
        BackendError::Transport(err.to_string())
    }
}

#[async_trait]
pub trait JokeBackend: Send + Sync {
    /// Base address requests are sent to, for display in messages.
    fn endpoint(&self) -> &str;

    async fn status(&self) -> Result<StatusResponse, BackendError>;

    async fn load_model(&self) -> Result<LoadModelResponse, BackendError>;

    async fn generate_joke(
        &self,
        request: &GenerateJokeRequest,
    ) -> Result<JokeResponse, BackendError>;
}

#[derive(Clone)]
pub struct HttpBackend {
    client: Client,
    base_url: String,
}

impl HttpBackend {
    pub fn new(base_url: &str) -> Self {
        Self::with_client(Client::new(), base_url)
    }

    pub fn with_client(client: Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: normalize_base_url(base_url),
        }
    }
}

#[async_trait]
impl JokeBackend for HttpBackend {
    fn endpoint(&self) -> &str {
        &self.base_url
    }

    async fn status(&self) -> Result<StatusResponse, BackendError> {
        let url = construct_api_url(&self.base_url, "");
        debug!(%url, "checking backend status");
        let response = self.client.get(url).send().await?;
        decode_response(response).await
    }

    async fn load_model(&self) -> Result<LoadModelResponse, BackendError> {
        let url = construct_api_url(&self.base_url, "load-model");
        debug!(%url, "requesting model load");
        let response = self
            .client
            .post(url)
            .header("Content-Type", "application/json")
            .send()
            .await?;
        decode_response(response).await
    }

    async fn generate_joke(
        &self,
        request: &GenerateJokeRequest,
    ) -> Result<JokeResponse, BackendError> {
        let url = construct_api_url(&self.base_url, "generate-joke");
        debug!(%url, topic = %request.topic, "requesting joke");
        let response = self.client.post(url).json(request).send().await?;
        decode_response(response).await
    }
}

async fn decode_response<T: DeserializeOwned>(response: Response) -> Result<T, BackendError> {
    let status = response.status();
    let body = response.text().await?;

    if !status.is_success() {
        return Err(classify_error_body(status.as_u16(), &body));
    }

    serde_json::from_str::<T>(&body).map_err(|err| BackendError::Decode(err.to_string()))
}

fn classify_error_body(status: u16, body: &str) -> BackendError {
    match serde_json::from_str::<ErrorBody>(body) {
        Ok(parsed) => BackendError::Http {
            status,
            detail: parsed
                .detail
                .map(|text| text.trim().to_string())
                .filter(|text| !text.is_empty()),
        },
        Err(_) => BackendError::UnparseableBody { status },
    }
}
