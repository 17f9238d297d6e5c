use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::Notify;

use crate::api::client::{BackendError, JokeBackend};
use crate::api::{GenerateJokeRequest, JokeResponse, LoadModelResponse, StatusResponse};

/// Scripted in-process backend. Each call pops the next queued outcome for
/// its route; an empty queue yields a plain success.
#[derive(Default)]
pub struct MockBackend {
    status_outcomes: Mutex<VecDeque<Result<StatusResponse, BackendError>>>,
    load_outcomes: Mutex<VecDeque<Result<LoadModelResponse, BackendError>>>,
    joke_outcomes: Mutex<VecDeque<Result<JokeResponse, BackendError>>>,
    status_calls: AtomicUsize,
    load_calls: AtomicUsize,
    joke_calls: AtomicUsize,
    joke_requests: Mutex<Vec<GenerateJokeRequest>>,
    gate: Option<Arc<Notify>>,
}

impl MockBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hold every request until the returned gate is notified.
    pub fn gated() -> (Self, Arc<Notify>) {
        let gate = Arc::new(Notify::new());
        let backend = Self {
            gate: Some(Arc::clone(&gate)),
            ..Self::default()
        };
        (backend, gate)
    }

    pub fn queue_status(&self, outcome: Result<StatusResponse, BackendError>) {
        self.status_outcomes.lock().unwrap().push_back(outcome);
    }

    pub fn queue_load(&self, outcome: Result<LoadModelResponse, BackendError>) {
        self.load_outcomes.lock().unwrap().push_back(outcome);
    }

    pub fn queue_joke(&self, outcome: Result<JokeResponse, BackendError>) {
        self.joke_outcomes.lock().unwrap().push_back(outcome);
    }

    pub fn status_calls(&self) -> usize {
        self.status_calls.load(Ordering::SeqCst)
    }

    pub fn load_calls(&self) -> usize {
        self.load_calls.load(Ordering::SeqCst)
    }

    pub fn joke_calls(&self) -> usize {
        self.joke_calls.load(Ordering::SeqCst)
    }

    pub fn joke_requests(&self) -> Vec<GenerateJokeRequest> {
        self.joke_requests.lock().unwrap().clone()
    }

    async fn wait_for_gate(&self) {
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
    }
}

#[async_trait]
impl JokeBackend for MockBackend {
    fn endpoint(&self) -> &str {
        "http://mock.test:8000"
    }

    async fn status(&self) -> Result<StatusResponse, BackendError> {
        self.status_calls.fetch_add(1, Ordering::SeqCst);
        self.wait_for_gate().await;
        let next = self.status_outcomes.lock().unwrap().pop_front();
        next.unwrap_or_else(|| Ok(status_response(false, "mock-model")))
    }

    async fn load_model(&self) -> Result<LoadModelResponse, BackendError> {
        self.load_calls.fetch_add(1, Ordering::SeqCst);
        self.wait_for_gate().await;
        let next = self.load_outcomes.lock().unwrap().pop_front();
        next.unwrap_or_else(|| {
            Ok(LoadModelResponse {
                message: "Model loaded successfully".to_string(),
                model_name: Some("mock-model".to_string()),
                device: Some("cpu".to_string()),
            })
        })
    }

    async fn generate_joke(
        &self,
        request: &GenerateJokeRequest,
    ) -> Result<JokeResponse, BackendError> {
        let call = self.joke_calls.fetch_add(1, Ordering::SeqCst) + 1;
        self.joke_requests.lock().unwrap().push(request.clone());
        self.wait_for_gate().await;
        let next = self.joke_outcomes.lock().unwrap().pop_front();
        next.unwrap_or_else(|| {
            Ok(JokeResponse {
                joke: format!("joke {call}"),
                topic: request.topic.clone(),
            })
        })
    }
}

pub fn status_response(model_loaded: bool, model_name: &str) -> StatusResponse {
    StatusResponse {
        message: Some("Joke Generator API".to_string()),
        model_loaded,
        model_name: model_name.to_string(),
    }
}
