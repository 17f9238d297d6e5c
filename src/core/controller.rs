//! Session state and the rules for the three backend operations.
//!
//! Each operation is split into a `begin_*` half that applies the in-flight
//! guard and a `finish_*` half that applies the outcome. The halves never
//! touch the network; [`crate::core::handle::ControllerHandle`] runs the
//! request between them.

use std::fmt;

use chrono::Local;
use tracing::{debug, warn};

use crate::api::client::BackendError;
use crate::api::{GenerateJokeRequest, JokeResponse, LoadModelResponse, StatusResponse};
use crate::core::history::{JokeHistory, JokeRecord};

pub const MSG_LOAD_IN_PROGRESS: &str = "Loading model... this can take a minute";
pub const MSG_LOAD_FAILED: &str = "Failed to load model";
pub const MSG_GENERATE_FAILED: &str = "Failed to generate joke";
pub const MSG_LOAD_FIRST: &str = "Please load the model first";
pub const MSG_CHECKING: &str = "Checking backend status...";

/// Why an operation was refused without issuing a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    ModelNotLoaded,
    AlreadyLoaded,
    AlreadyLoading,
    AlreadyGenerating,
    AlreadyChecking,
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Rejection::ModelNotLoaded => MSG_LOAD_FIRST,
            Rejection::AlreadyLoaded => "Model is already loaded",
            Rejection::AlreadyLoading => "Model is already loading",
            Rejection::AlreadyGenerating => "A joke is already being generated",
            Rejection::AlreadyChecking => "Status check already running",
        };
        f.write_str(text)
    }
}

impl std::error::Error for Rejection {}

/// The three backend operations, each with its own in-flight flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Status,
    Load,
    Generate,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionState {
    pub model_loaded: bool,
    pub model_loading: bool,
    pub generating: bool,
    pub checking_status: bool,
    /// Whether the last status check got an answer from the backend
    pub backend_reachable: bool,
    pub status_message: String,
    pub model_name: Option<String>,
}

pub struct Controller {
    endpoint: String,
    state: SessionState,
    topic_input: String,
    current_joke: Option<String>,
    history: JokeHistory,
}

impl Controller {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            state: SessionState::default(),
            topic_input: String::new(),
            current_joke: None,
            history: JokeHistory::new(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn status_message(&self) -> &str {
        &self.state.status_message
    }

    /// The displayed joke, or the error text of the last failed generation.
    pub fn current_joke(&self) -> Option<&str> {
        self.current_joke.as_deref()
    }

    pub fn history(&self) -> &JokeHistory {
        &self.history
    }

    pub fn topic_input(&self) -> &str {
        &self.topic_input
    }

    pub fn topic_input_mut(&mut self) -> &mut String {
        &mut self.topic_input
    }

    pub fn can_load(&self) -> bool {
        !self.state.model_loading && !self.state.model_loaded
    }

    pub fn can_generate(&self) -> bool {
        self.state.model_loaded && !self.state.generating
    }

    pub fn begin_status(&mut self) -> Result<(), Rejection> {
        if self.state.checking_status {
            return Err(Rejection::AlreadyChecking);
        }
        self.state.checking_status = true;
        self.state.status_message = MSG_CHECKING.to_string();
        Ok(())
    }

    pub fn finish_status(&mut self, outcome: Result<StatusResponse, BackendError>) {
        self.state.checking_status = false;
        match outcome {
            Ok(status) => {
                debug!(loaded = status.model_loaded, model = %status.model_name, "status received");
                self.state.backend_reachable = true;
                self.state.model_loaded = status.model_loaded;
                self.state.status_message = if status.model_loaded {
                    format!("Model {} is loaded and ready", status.model_name)
                } else {
                    format!(
                        "Connected to backend. Model {} is not loaded yet",
                        status.model_name
                    )
                };
                self.state.model_name = Some(status.model_name);
            }
            Err(err) => {
                warn!(endpoint = %self.endpoint, error = %err, "status check failed");
                self.state.backend_reachable = false;
                self.state.model_loaded = false;
                self.state.status_message =
                    format!("Cannot reach backend at {}: {}", self.endpoint, err);
            }
        }
    }

    pub fn begin_load(&mut self) -> Result<(), Rejection> {
        if self.state.model_loading {
            return Err(Rejection::AlreadyLoading);
        }
        if self.state.model_loaded {
            return Err(Rejection::AlreadyLoaded);
        }
        self.state.model_loading = true;
        self.state.status_message = MSG_LOAD_IN_PROGRESS.to_string();
        Ok(())
    }

    pub fn finish_load(&mut self, outcome: Result<LoadModelResponse, BackendError>) {
        self.state.model_loading = false;
        match outcome {
            Ok(response) => {
                debug!(device = ?response.device, "model loaded");
                self.state.model_loaded = true;
                if let Some(name) = response.model_name {
                    self.state.model_name = Some(name);
                }
                self.state.status_message = response.message;
            }
            Err(err) => {
                warn!(error = %err, "model load failed");
                self.state.model_loaded = false;
                self.state.status_message = match err {
                    BackendError::Http {
                        detail: Some(detail),
                        ..
                    } => detail,
                    BackendError::Transport(message) => format!("{MSG_LOAD_FAILED}: {message}"),
                    _ => MSG_LOAD_FAILED.to_string(),
                };
            }
        }
    }

    /// Clear the in-flight flag of an operation whose outcome will never
    /// arrive.
    pub fn abandon(&mut self, operation: Operation) {
        warn!(?operation, "request abandoned before completion");
        match operation {
            Operation::Status => self.state.checking_status = false,
            Operation::Load => {
                if self.state.model_loading {
                    self.state.model_loading = false;
                    self.state.status_message = MSG_LOAD_FAILED.to_string();
                }
            }
            Operation::Generate => self.state.generating = false,
        }
    }

    /// Guard a generation and build its request. Refusing because the model
    /// is not loaded also posts a notice to the status line.
    pub fn begin_generate(&mut self, topic: &str) -> Result<GenerateJokeRequest, Rejection> {
        if !self.state.model_loaded {
            self.state.status_message = MSG_LOAD_FIRST.to_string();
            return Err(Rejection::ModelNotLoaded);
        }
        if self.state.generating {
            return Err(Rejection::AlreadyGenerating);
        }
        self.state.generating = true;
        self.current_joke = None;
        Ok(GenerateJokeRequest::for_topic(topic))
    }

    /// Apply a generation outcome. Returns the new history record on success.
    pub fn finish_generate(
        &mut self,
        topic: String,
        outcome: Result<JokeResponse, BackendError>,
    ) -> Option<JokeRecord> {
        self.state.generating = false;
        match outcome {
            Ok(response) => {
                let record = JokeRecord::new(response.joke.clone(), topic, Local::now());
                self.current_joke = Some(response.joke);
                self.history.push(record.clone());
                Some(record)
            }
            Err(err) => {
                warn!(error = %err, "joke generation failed");
                self.current_joke = Some(generation_error_text(&err));
                None
            }
        }
    }
}

fn generation_error_text(err: &BackendError) -> String {
    match err {
        BackendError::Http {
            detail: Some(detail),
            ..
        } => format!("Error: {detail}"),
        BackendError::Http { detail: None, .. } => format!("Error: {MSG_GENERATE_FAILED}"),
        BackendError::UnparseableBody { status } => format!("Error: HTTP error: status {status}"),
        BackendError::Transport(message) | BackendError::Decode(message) => {
            format!("Error: {message}")
        }
    }
}
