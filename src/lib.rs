//! Jokebox is a terminal client for a remote joke-generation backend.
//!
//! The crate is organized around a small set of collaborating layers:
//! - [`api`] defines the backend's wire payloads and the HTTP client behind
//!   the [`api::client::JokeBackend`] trait.
//! - [`core`] owns session state: the controller and its in-flight guards,
//!   the bounded joke history, endpoint resolution, and persisted config.
//! - [`ui`] renders the full-screen interface and runs the interactive loop.
//! - [`cli`] parses arguments and runs the one-shot `status`, `load`, and
//!   `joke` commands.
//!
//! The binary (`src/main.rs`) routes straight into [`crate::cli::main`].

pub mod api;
pub mod cli;
pub mod core;
pub mod ui;
pub mod utils;
