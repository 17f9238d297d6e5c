use serde::{Deserialize, Serialize};

/// Token budget sent with every generation request.
pub const JOKE_MAX_LENGTH: u32 = 100;
/// Sampling temperature sent with every generation request.
pub const JOKE_TEMPERATURE: f32 = 0.8;

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct StatusResponse {
    #[serde(default)]
    pub message: Option<String>,
    pub model_loaded: bool,
    pub model_name: String,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct LoadModelResponse {
    pub message: String,
    #[serde(default)]
    pub model_name: Option<String>,
    #[serde(default)]
    pub device: Option<String>,
}

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct GenerateJokeRequest {
    pub topic: String,
    pub max_length: u32,
    pub temperature: f32,
}

impl GenerateJokeRequest {
    pub fn for_topic(topic: impl Into<String>) -> Self {
        Self {
            topic: topic.into(),
            max_length: JOKE_MAX_LENGTH,
            temperature: JOKE_TEMPERATURE,
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct JokeResponse {
    pub joke: String,
    pub topic: String,
}

/// Error body returned by the backend on non-2xx responses.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct ErrorBody {
    #[serde(default)]
    pub detail: Option<String>,
}

pub mod client;
