use std::sync::Arc;

use tokio::sync::Mutex;

use crate::api::client::JokeBackend;
use crate::core::controller::{Controller, Operation, Rejection};
use crate::core::history::JokeRecord;

/// Shared access to one [`Controller`] and the backend it talks to.
///
/// The lock is released while a request is outstanding, so the UI keeps
/// rendering the in-flight state. Every operation that passes its guard
/// reaches the matching `finish_*` call before returning; if its future is
/// dropped first, the in-flight flag is cleared anyway.
#[derive(Clone)]
pub struct ControllerHandle {
    controller: Arc<Mutex<Controller>>,
    backend: Arc<dyn JokeBackend>,
}

impl ControllerHandle {
    pub fn new(backend: Arc<dyn JokeBackend>) -> Self {
        let controller = Controller::new(backend.endpoint());
        Self {
            controller: Arc::new(Mutex::new(controller)),
            backend,
        }
    }

    pub async fn read<R>(&self, f: impl FnOnce(&Controller) -> R) -> R {
        let guard = self.controller.lock().await;
        f(&guard)
    }

    pub async fn update<R>(&self, f: impl FnOnce(&mut Controller) -> R) -> R {
        let mut guard = self.controller.lock().await;
        f(&mut guard)
    }

    pub async fn check_status(&self) -> Result<(), Rejection> {
        self.update(Controller::begin_status).await?;
        let guard = self.in_flight(Operation::Status);
        let outcome = self.backend.status().await;
        self.update(|controller| controller.finish_status(outcome))
            .await;
        guard.disarm();
        Ok(())
    }

    pub async fn load_model(&self) -> Result<(), Rejection> {
        self.update(Controller::begin_load).await?;
        let guard = self.in_flight(Operation::Load);
        let outcome = self.backend.load_model().await;
        self.update(|controller| controller.finish_load(outcome)).await;
        guard.disarm();
        Ok(())
    }

    /// Generate a joke for `topic`. `Ok(None)` means the request was issued
    /// but failed; the error text is the controller's current joke.
    pub async fn generate_joke(&self, topic: String) -> Result<Option<JokeRecord>, Rejection> {
        let request = self
            .update(|controller| controller.begin_generate(&topic))
            .await?;
        let guard = self.in_flight(Operation::Generate);
        let outcome = self.backend.generate_joke(&request).await;
        let record = self
            .update(|controller| controller.finish_generate(topic, outcome))
            .await;
        guard.disarm();
        Ok(record)
    }

    fn in_flight(&self, operation: Operation) -> InFlightGuard {
        InFlightGuard {
            controller: Some(Arc::clone(&self.controller)),
            operation,
        }
    }

    /// Generate a joke for whatever topic is currently typed in.
    pub async fn generate_from_input(&self) -> Result<Option<JokeRecord>, Rejection> {
        let topic = self
            .read(|controller| controller.topic_input().trim().to_string())
            .await;
        self.generate_joke(topic).await
    }
}

/// Clears an operation's in-flight flag if its future is dropped (or
/// unwinds) between `begin_*` and `finish_*`.
struct InFlightGuard {
    controller: Option<Arc<Mutex<Controller>>>,
    operation: Operation,
}

impl InFlightGuard {
    fn disarm(mut self) {
        self.controller = None;
    }
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        let Some(controller) = self.controller.take() else {
            return;
        };
        let operation = self.operation;
        match controller.try_lock() {
            Ok(mut locked) => locked.abandon(operation),
            Err(_) => {
                // Whoever holds the lock releases it shortly; clear the flag
                // once it is free.
                if let Ok(runtime) = tokio::runtime::Handle::try_current() {
                    let controller = Arc::clone(&controller);
                    runtime.spawn(async move {
                        controller.lock().await.abandon(operation);
                    });
                }
            }
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::client::BackendError;
    use crate::api::JokeResponse;
    use crate::core::history::HISTORY_LIMIT;
    use crate::utils::test_utils::{status_response, MockBackend};

    fn handle_for(backend: &Arc<MockBackend>) -> ControllerHandle {
        ControllerHandle::new(Arc::clone(backend) as Arc<dyn JokeBackend>)
    }

    async fn loaded_handle(backend: &Arc<MockBackend>) -> ControllerHandle {
        backend.queue_status(Ok(status_response(true, "x")));
        let handle = handle_for(backend);
        handle.check_status().await.expect("status should run");
        handle
    }

    async fn wait_until(handle: &ControllerHandle, f: impl Fn(&Controller) -> bool + Copy) {
        for _ in 0..1000 {
            if handle.read(f).await {
                return;
            }
            tokio::task::yield_now().await;
        }
        panic!("controller never reached the expected state");
    }

    #[tokio::test]
    async fn duplicate_load_while_loading_issues_one_request() {
        let (backend, gate) = MockBackend::gated();
        let backend = Arc::new(backend);
        let handle = handle_for(&backend);

        let first = tokio::spawn({
            let handle = handle.clone();
            async move { handle.load_model().await }
        });
        wait_until(&handle, |c| c.state().model_loading).await;

        for _ in 0..3 {
            assert_eq!(handle.load_model().await, Err(Rejection::AlreadyLoading));
        }

        gate.notify_one();
        first
            .await
            .expect("load task should not panic")
            .expect("first load should pass the guard");

        assert_eq!(backend.load_calls(), 1);
        assert!(handle.read(|c| c.state().model_loaded).await);
        assert_eq!(handle.load_model().await, Err(Rejection::AlreadyLoaded));
        assert_eq!(backend.load_calls(), 1);
    }

    #[tokio::test]
    async fn load_failure_reports_detail_and_clears_flag() {
        let backend = Arc::new(MockBackend::new());
        backend.queue_load(Err(BackendError::Http {
            status: 500,
            detail: Some("OOM".to_string()),
        }));
        let handle = handle_for(&backend);

        handle.load_model().await.expect("load should pass the guard");

        let state = handle.read(|c| c.state().clone()).await;
        assert!(!state.model_loaded);
        assert!(!state.model_loading);
        assert!(state.status_message.contains("OOM"));
    }

    #[tokio::test]
    async fn load_transport_failure_clears_flag() {
        let backend = Arc::new(MockBackend::new());
        backend.queue_load(Err(BackendError::Transport("connection reset".into())));
        let handle = handle_for(&backend);

        handle.load_model().await.expect("load should pass the guard");

        let state = handle.read(|c| c.state().clone()).await;
        assert!(!state.model_loading);
        assert!(!state.model_loaded);
        assert!(handle.read(|c| c.can_load()).await);
    }

    #[tokio::test]
    async fn dropped_load_clears_loading_flag() {
        let (backend, _gate) = MockBackend::gated();
        let backend = Arc::new(backend);
        let handle = handle_for(&backend);

        let task = tokio::spawn({
            let handle = handle.clone();
            async move { handle.load_model().await }
        });
        wait_until(&handle, |c| c.state().model_loading).await;

        task.abort();
        let join = task.await;
        assert!(join.expect_err("task should be cancelled").is_cancelled());

        let state = handle.read(|c| c.state().clone()).await;
        assert!(!state.model_loading);
        assert!(!state.model_loaded);
        assert!(handle.read(|c| c.can_load()).await);
    }

    #[tokio::test]
    async fn dropped_generation_clears_generating_flag() {
        let (backend, gate) = MockBackend::gated();
        let backend = Arc::new(backend);
        backend.queue_status(Ok(status_response(true, "x")));
        let handle = handle_for(&backend);
        gate.notify_one();
        handle.check_status().await.expect("status should run");

        let task = tokio::spawn({
            let handle = handle.clone();
            async move { handle.generate_joke("cats".to_string()).await }
        });
        wait_until(&handle, |c| c.state().generating).await;

        task.abort();
        let _ = task.await;

        assert!(!handle.read(|c| c.state().generating).await);
        assert!(handle.read(|c| c.history().is_empty()).await);
        assert!(handle.read(|c| c.can_generate()).await);
    }

    #[tokio::test]
    async fn status_reports_loaded_model_by_name() {
        let backend = Arc::new(MockBackend::new());
        let handle = loaded_handle(&backend).await;

        let state = handle.read(|c| c.state().clone()).await;
        assert!(state.model_loaded);
        assert!(state.status_message.contains('x'));
        assert_eq!(backend.status_calls(), 1);
    }

    #[tokio::test]
    async fn generate_without_model_issues_no_request() {
        let backend = Arc::new(MockBackend::new());
        let handle = handle_for(&backend);

        let result = handle.generate_joke("cats".to_string()).await;

        assert_eq!(result, Err(Rejection::ModelNotLoaded));
        assert_eq!(backend.joke_calls(), 0);
        assert!(handle.read(|c| c.history().is_empty()).await);
    }

    #[tokio::test]
    async fn generate_success_updates_joke_and_history() {
        let backend = Arc::new(MockBackend::new());
        backend.queue_joke(Ok(JokeResponse {
            joke: "why did the cat...".to_string(),
            topic: "cats".to_string(),
        }));
        let handle = loaded_handle(&backend).await;

        let record = handle
            .generate_joke("cats".to_string())
            .await
            .expect("generation should pass the guard")
            .expect("generation should succeed");

        assert_eq!(record.joke, "why did the cat...");
        assert_eq!(
            handle.read(|c| c.current_joke().map(str::to_owned)).await,
            Some("why did the cat...".to_string())
        );
        assert_eq!(
            handle
                .read(|c| c.history().latest().map(|r| r.topic.clone()))
                .await,
            Some("cats".to_string())
        );
        let sent = backend.joke_requests();
        assert_eq!(sent[0].topic, "cats");
        assert_eq!(sent[0].max_length, crate::api::JOKE_MAX_LENGTH);
    }

    #[tokio::test]
    async fn history_is_capped_and_newest_first() {
        let backend = Arc::new(MockBackend::new());
        let handle = loaded_handle(&backend).await;

        for n in 1..=7 {
            handle
                .generate_joke(format!("topic {n}"))
                .await
                .expect("generation should pass the guard");
            let len = handle.read(|c| c.history().len()).await;
            assert_eq!(len, n.min(HISTORY_LIMIT));
        }

        let jokes: Vec<String> = handle
            .read(|c| c.history().iter().map(|r| r.joke.clone()).collect())
            .await;
        assert_eq!(jokes, vec!["joke 7", "joke 6", "joke 5", "joke 4", "joke 3"]);
    }

    #[tokio::test]
    async fn network_failure_during_generation_keeps_history() {
        let backend = Arc::new(MockBackend::new());
        let handle = loaded_handle(&backend).await;
        handle
            .generate_joke("dogs".to_string())
            .await
            .expect("generation should pass the guard");

        backend.queue_joke(Err(BackendError::Transport("connection refused".into())));
        let record = handle
            .generate_joke("cats".to_string())
            .await
            .expect("generation should pass the guard");

        assert!(record.is_none());
        let (generating, joke, len) = handle
            .read(|c| {
                (
                    c.state().generating,
                    c.current_joke().map(str::to_owned),
                    c.history().len(),
                )
            })
            .await;
        assert!(!generating);
        assert!(joke.expect("error text should be shown").starts_with("Error:"));
        assert_eq!(len, 1);
    }

    #[tokio::test]
    async fn second_generation_is_rejected_while_first_runs() {
        let (backend, gate) = MockBackend::gated();
        let backend = Arc::new(backend);
        backend.queue_status(Ok(status_response(true, "x")));
        let handle = handle_for(&backend);
        let status = tokio::spawn({
            let handle = handle.clone();
            async move { handle.check_status().await }
        });
        wait_until(&handle, |c| c.state().checking_status).await;
        gate.notify_one();
        status
            .await
            .expect("status task should not panic")
            .expect("status should pass the guard");

        let first = tokio::spawn({
            let handle = handle.clone();
            async move { handle.generate_joke("cats".to_string()).await }
        });
        wait_until(&handle, |c| c.state().generating).await;

        assert_eq!(
            handle.generate_joke("dogs".to_string()).await,
            Err(Rejection::AlreadyGenerating)
        );

        gate.notify_one();
        first
            .await
            .expect("generation task should not panic")
            .expect("first generation should pass the guard");
        assert_eq!(backend.joke_calls(), 1);
        assert!(!handle.read(|c| c.state().generating).await);
    }

    #[tokio::test]
    async fn generate_from_input_uses_trimmed_topic() {
        let backend = Arc::new(MockBackend::new());
        let handle = loaded_handle(&backend).await;
        handle
            .update(|c| c.topic_input_mut().push_str("  penguins "))
            .await;

        handle
            .generate_from_input()
            .await
            .expect("generation should pass the guard");

        assert_eq!(backend.joke_requests()[0].topic, "penguins");
    }
}
