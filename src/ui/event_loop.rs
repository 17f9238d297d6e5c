//! Event polling, request dispatch, and redraw loop for the interactive
//! screen.
//!
//! Terminal input is read on a dedicated thread and forwarded over a
//! channel. Backend requests run on spawned Tokio tasks that go through
//! [`ControllerHandle`], so the loop keeps redrawing while they are in
//! flight.

use std::error::Error;
use std::time::{Duration, Instant};

use ratatui::backend::Backend;
use ratatui::crossterm::event::{self, Event, KeyEventKind};
use ratatui::Terminal;
use tokio::sync::mpsc;
use tracing::debug;
use unicode_segmentation::UnicodeSegmentation;

use crate::core::controller::Controller;
use crate::core::handle::ControllerHandle;
use crate::core::history::JokeRecord;
use crate::ui::keybindings::{map_key, KeyAction};
use crate::ui::lifecycle::{restore_terminal, setup_terminal};
use crate::ui::renderer::{ui, FrameInfo};
use crate::utils::logging::LoggingState;

const SPINNER_FRAMES: [&str; 10] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];
const TICK: Duration = Duration::from_millis(100);

#[derive(Debug)]
pub enum UiEvent {
    Crossterm(Event),
}

#[derive(Debug, PartialEq, Eq)]
enum LoopControl {
    Continue,
    Quit,
}

pub async fn run_interactive(
    handle: ControllerHandle,
    logging: LoggingState,
) -> Result<(), Box<dyn Error>> {
    let mut terminal = setup_terminal()?;
    let (ui_tx, ui_rx) = mpsc::unbounded_channel::<UiEvent>();
    spawn_input_reader(ui_tx);
    let result = event_loop(&mut terminal, handle, logging, ui_rx).await;
    restore_terminal(&mut terminal)?;
    result
}

/// Runs until quit is requested or terminal input stops arriving.
async fn event_loop<B: Backend>(
    terminal: &mut Terminal<B>,
    handle: ControllerHandle,
    mut logging: LoggingState,
    mut ui_rx: mpsc::UnboundedReceiver<UiEvent>,
) -> Result<(), Box<dyn Error>> {
    let (joke_tx, mut joke_rx) = mpsc::unbounded_channel::<JokeRecord>();
    spawn_status_check(handle.clone());

    let started = Instant::now();
    let mut notice: Option<String> = None;
    let mut ticker = tokio::time::interval(TICK);

    loop {
        let transcript = logging.get_status_string();
        let frame_index = (started.elapsed().as_millis() / TICK.as_millis()) as usize;
        let info = FrameInfo {
            transcript: &transcript,
            notice: notice.as_deref(),
            spinner: SPINNER_FRAMES[frame_index % SPINNER_FRAMES.len()],
        };
        handle
            .read(|controller| terminal.draw(|f| ui(f, controller, &info)).map(|_| ()))
            .await?;

        tokio::select! {
            received = ui_rx.recv() => {
                let Some(UiEvent::Crossterm(event)) = received else {
                    debug!("terminal input closed");
                    break;
                };
                let Event::Key(key) = event else { continue };
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                let action = map_key(&key);
                if handle_action(action, &handle, &joke_tx, &mut logging, &mut notice).await
                    == LoopControl::Quit
                {
                    break;
                }
            }
            Some(record) = joke_rx.recv() => {
                if let Err(err) = logging.log_joke(&record) {
                    notice = Some(format!("Transcript write failed: {err}"));
                }
            }
            _ = ticker.tick() => {}
        }
    }

    Ok(())
}

async fn handle_action(
    action: KeyAction,
    handle: &ControllerHandle,
    joke_tx: &mpsc::UnboundedSender<JokeRecord>,
    logging: &mut LoggingState,
    notice: &mut Option<String>,
) -> LoopControl {
    match action {
        KeyAction::Quit => return LoopControl::Quit,
        KeyAction::LoadModel => {
            if handle.read(Controller::can_load).await {
                spawn_load(handle.clone());
            }
        }
        KeyAction::Generate => {
            // A missing model still goes through the controller so it can
            // post its notice; only an outstanding generation is dropped here.
            if !handle.read(|c| c.state().generating).await {
                spawn_generate(handle.clone(), joke_tx.clone());
            }
        }
        KeyAction::ToggleTranscript => {
            *notice = Some(match logging.toggle_logging() {
                Ok(message) => message,
                Err(err) => err.to_string(),
            });
        }
        KeyAction::DeleteBackward => {
            handle
                .update(|c| {
                    let topic = c.topic_input_mut();
                    let last = topic.grapheme_indices(true).next_back().map(|(i, _)| i);
                    if let Some(index) = last {
                        topic.truncate(index);
                    }
                })
                .await;
        }
        KeyAction::ClearTopic => handle.update(|c| c.topic_input_mut().clear()).await,
        KeyAction::Insert(ch) => handle.update(|c| c.topic_input_mut().push(ch)).await,
        KeyAction::Ignore => {}
    }
    LoopControl::Continue
}

fn spawn_input_reader(tx: mpsc::UnboundedSender<UiEvent>) {
    std::thread::spawn(move || loop {
        match event::poll(TICK) {
            Ok(true) => match event::read() {
                Ok(event) => {
                    if tx.send(UiEvent::Crossterm(event)).is_err() {
                        break;
                    }
                }
                Err(_) => break,
            },
            Ok(false) => {
                if tx.is_closed() {
                    break;
                }
            }
            Err(_) => break,
        }
    });
}

fn spawn_status_check(handle: ControllerHandle) {
    tokio::spawn(async move {
        if let Err(rejection) = handle.check_status().await {
            debug!(%rejection, "status check skipped");
        }
    });
}

fn spawn_load(handle: ControllerHandle) {
    tokio::spawn(async move {
        if let Err(rejection) = handle.load_model().await {
            debug!(%rejection, "model load skipped");
        }
    });
}

fn spawn_generate(handle: ControllerHandle, joke_tx: mpsc::UnboundedSender<JokeRecord>) {
    tokio::spawn(async move {
        match handle.generate_from_input().await {
            Ok(Some(record)) => {
                let _ = joke_tx.send(record);
            }
            Ok(None) => {}
            Err(rejection) => debug!(%rejection, "generation skipped"),
        }
    });
}
