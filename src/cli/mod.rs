//! Command-line interface parsing and handling
//!
//! This module parses command-line arguments, resolves the backend endpoint,
//! and dispatches to the interactive screen or a one-shot command.

pub mod oneshot;


use std::error::Error;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing::info;

use crate::api::client::HttpBackend;
use crate::cli::oneshot::{run_joke, run_load, run_status, CommandOutcome};
use crate::core::config::data::{path_display, ConfigKey};
use crate::core::config::Config;
use crate::core::endpoint::{resolve_endpoint, EndpointInputs, ResolvedEndpoint};
use crate::core::handle::ControllerHandle;
use crate::ui::event_loop::run_interactive;
use crate::utils::logging::{init_tracing, LoggingState};

#[derive(Parser)]
#[command(name = "jokebox")]
#[command(version)]
#[command(about = "A terminal client for a remote joke-generation backend")]
#[command(
    long_about = "Jokebox talks to a joke-generation backend over HTTP. It checks whether the \
backend's model is loaded, can ask it to load the model, and asks it for jokes on a topic \
of your choice. The last five jokes stay on screen.\n\n\
Endpoint resolution (first match wins):\n\
  --endpoint <URL>          Explicit backend URL\n\
  JOKEBOX_ENDPOINT          Environment override\n\
  endpoint (config file)    Set with 'jokebox set endpoint <URL>'\n\
  CODESPACE_NAME            GitHub Codespaces: https://<name>-8000.app.github.dev\n\
  default                   http://localhost:8000\n\n\
Controls (interactive mode):\n\
  Type              Enter a topic\n\
  Enter             Tell a joke about the topic\n\
  Ctrl+L            Load the model\n\
  Ctrl+P            Pause/resume the transcript (--log)\n\
  Ctrl+U            Clear the topic\n\
  Esc / Ctrl+C      Quit"
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Backend base URL
    #[arg(short = 'e', long, global = true, value_name = "URL")]
    pub endpoint: Option<String>,

    /// Append every generated joke to the specified file
    #[arg(short = 'l', long, global = true, value_name = "FILE")]
    pub log: Option<String>,
}

#[derive(Subcommand, Debug, PartialEq)]
pub enum Commands {
    /// Start the interactive screen (default)
    Interactive,
    /// Check whether the backend is reachable and its model loaded
    Status,
    /// Ask the backend to load its model
    Load,
    /// Print a single joke
    Joke {
        /// Load the model first if it is not loaded yet
        #[arg(long)]
        load: bool,
        /// Topic for the joke (can be multiple words; empty for any joke).
        /// Put a topic that starts with `-` after `--`.
        topic: Vec<String>,
    },
    /// Set configuration values
    Set {
        /// Configuration key to set (endpoint, log-file)
        key: String,
        /// Value to set for the key
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        value: Option<Vec<String>>,
    },
    /// Unset configuration values
    Unset {
        /// Configuration key to unset
        key: String,
    },
}

pub fn main() -> Result<(), Box<dyn Error>> {
    tokio::runtime::Runtime::new()?.block_on(async_main())
}

async fn async_main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();
    let command = args.command.unwrap_or(Commands::Interactive);
    init_tracing(command == Commands::Interactive);

    match command {
        Commands::Set { key, value } => {
            let key = parse_key(&key);
            match value.map(|parts| parts.join(" ")).filter(|v| !v.is_empty()) {
                Some(value) => {
                    Config::mutate(|config| config.set(key, value.clone()))?;
                    println!("✅ Set {} to: {value}", key.name());
                }
                None => Config::load()?.print_all(),
            }
            Ok(())
        }
        Commands::Unset { key } => {
            let key = parse_key(&key);
            Config::mutate(|config| config.unset(key))?;
            println!("✅ Unset {}", key.name());
            Ok(())
        }
        Commands::Interactive => {
            let (handle, logging, _) = connect(args.endpoint, args.log)?;
            run_interactive(handle, logging).await
        }
        Commands::Status => {
            let (handle, _, endpoint) = connect(args.endpoint, args.log)?;
            finish(run_status(&handle, &endpoint).await)
        }
        Commands::Load => {
            let (handle, _, _) = connect(args.endpoint, args.log)?;
            finish(run_load(&handle).await)
        }
        Commands::Joke { load, topic } => {
            let (handle, logging, _) = connect(args.endpoint, args.log)?;
            finish(run_joke(&handle, &logging, topic.join(" "), load).await)
        }
    }
}

/// Resolve the endpoint once and build everything a session needs.
fn connect(
    endpoint_flag: Option<String>,
    log_flag: Option<String>,
) -> Result<(ControllerHandle, LoggingState, ResolvedEndpoint), Box<dyn Error>> {
    let config = Config::load()?;
    let endpoint = resolve_endpoint(&EndpointInputs::from_env(
        endpoint_flag,
        config.endpoint.clone(),
    ));
    info!(url = %endpoint.url, source = %endpoint.source, "resolved backend endpoint");

    let logging = LoggingState::new(log_flag.or(config.log_file))?;
    let handle = ControllerHandle::new(Arc::new(HttpBackend::new(&endpoint.url)));
    Ok((handle, logging, endpoint))
}

fn parse_key(key: &str) -> ConfigKey {
    match ConfigKey::parse(key) {
        Some(key) => key,
        None => {
            eprintln!("❌ Unknown config key: {key}");
            eprintln!(
                "Known keys: endpoint, log-file (config file: {})",
                path_display(Config::config_path())
            );
            std::process::exit(1);
        }
    }
}

fn finish(outcome: CommandOutcome) -> Result<(), Box<dyn Error>> {
    match outcome {
        Ok(text) => {
            println!("{text}");
            Ok(())
        }
        Err(text) => {
            eprintln!("❌ {text}");
            std::process::exit(1);
        }
    }
}
