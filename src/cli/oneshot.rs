//! TUI-less `status`, `load`, and `joke` commands.
//!
//! Each command runs the same status check the interactive screen runs at
//! startup, then drives the controller once. Outcomes come back as
//! `Ok(text)` for stdout or `Err(text)` for a failing exit.

use crate::core::controller::Rejection;
use crate::core::endpoint::ResolvedEndpoint;
use crate::core::handle::ControllerHandle;
use crate::utils::logging::LoggingState;

pub type CommandOutcome = Result<String, String>;

pub async fn run_status(handle: &ControllerHandle, endpoint: &ResolvedEndpoint) -> CommandOutcome {
    check_reachable(handle).await?;
    let message = handle.read(|c| c.status_message().to_string()).await;
    Ok(format!(
        "{message}\nBackend: {} (from {})",
        endpoint.url, endpoint.source
    ))
}

pub async fn run_load(handle: &ControllerHandle) -> CommandOutcome {
    check_reachable(handle).await?;
    load_checked(handle).await
}

async fn load_checked(handle: &ControllerHandle) -> CommandOutcome {
    match handle.load_model().await {
        Ok(()) | Err(Rejection::AlreadyLoaded) => {}
        Err(rejection) => return Err(rejection.to_string()),
    }

    handle
        .read(|c| {
            let message = c.status_message().to_string();
            if c.state().model_loaded {
                Ok(message)
            } else {
                Err(message)
            }
        })
        .await
}

pub async fn run_joke(
    handle: &ControllerHandle,
    logging: &LoggingState,
    topic: String,
    load_first: bool,
) -> CommandOutcome {
    check_reachable(handle).await?;

    let loaded = handle.read(|c| c.state().model_loaded).await;
    if !loaded && load_first {
        load_checked(handle).await?;
    }

    match handle.generate_joke(topic).await {
        Ok(Some(record)) => {
            if let Err(err) = logging.log_joke(&record) {
                tracing::warn!(error = %err, "could not append to transcript");
            }
            Ok(record.joke)
        }
        Ok(None) => Err(handle
            .read(|c| c.current_joke().unwrap_or_default().to_string())
            .await),
        Err(Rejection::ModelNotLoaded) => Err(format!(
            "{}: run `jokebox load` or pass --load",
            Rejection::ModelNotLoaded
        )),
        Err(rejection) => Err(rejection.to_string()),
    }
}

async fn check_reachable(handle: &ControllerHandle) -> Result<(), String> {
    handle
        .check_status()
        .await
        .map_err(|rejection| rejection.to_string())?;
    handle
        .read(|c| {
            if c.state().backend_reachable {
                Ok(())
            } else {
                Err(c.status_message().to_string())
            }
        })
        .await
}
