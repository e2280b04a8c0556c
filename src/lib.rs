pub mod config;
pub mod indicator;
pub mod logging;
pub mod model;
pub mod model_gateway;
pub mod providers;
pub mod repl;

use anyhow::{Context, Result};
use reqwest::Client;
use std::io::{self, Write};
use std::time::Duration;
use tracing::{debug, info};

use config::Config;
use model_gateway::OpenAiGateway;
use repl::{choose_model, run_repl};

/// Which chat entry point is running.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Launch {
    /// Ask for the model up front and show the typing indicator.
    PickModel,
    /// Use `OPENAI_MODEL` without prompting.
    FixedModel,
}

/// Loads `.env` from the working directory. A missing file is not an error.
fn load_dotenv() -> Result<()> {
    match dotenvy::dotenv() {
        Ok(path) => {
            debug!(path = %path.display(), "loaded .env file");
            Ok(())
        }
        Err(err) if err.not_found() => {
            debug!("no .env file found");
            Ok(())
        }
        Err(err) => Err(err).context("failed to load .env file"),
    }
}

/// Unwraps a startup step, or prints why it failed and yields `None` so the
/// caller can exit cleanly.
fn report_startup<T, W: Write>(step: Result<T>, output: &mut W) -> Result<Option<T>> {
    match step {
        Ok(value) => Ok(Some(value)),
        Err(err) => {
            debug!(error = %format!("{err:#}"), "startup aborted");
            writeln!(output, "Error: {err:#}")?;
            Ok(None)
        }
    }
}

fn load_config() -> Result<Config> {
    load_dotenv()?;
    Config::from_env()
}

fn build_client(cfg: &Config) -> Result<Client> {
    let mut builder = Client::builder();
    if let Some(secs) = cfg.request_timeout_secs {
        builder = builder.timeout(Duration::from_secs(secs));
    }
    builder.build().context("Failed to initialize HTTP client")
}

pub async fn run_chat(launch: Launch) -> Result<()> {
    let mut input = io::stdin().lock();
    let mut output = io::stdout();

    let picked = match launch {
        Launch::PickModel => match choose_model(&mut input, &mut output)? {
            Some(choice) => Some(choice),
            None => return Ok(()),
        },
        Launch::FixedModel => None,
    };

    let Some(cfg) = report_startup(load_config(), &mut output)? else {
        return Ok(());
    };
    let model = picked
        .map(|choice| choice.id().to_string())
        .unwrap_or_else(|| cfg.model.clone());
    info!(
        launch = ?launch,
        model = %model,
        base_url = %cfg.base_url,
        timeout_secs = ?cfg.request_timeout_secs,
        typing_indicator = cfg.typing_indicator,
        "loaded runtime configuration"
    );

    let Some(client) = report_startup(build_client(&cfg), &mut output)? else {
        return Ok(());
    };
    let gateway = match launch {
        Launch::PickModel => OpenAiGateway::new(&client, &cfg).with_typing_indicator(),
        Launch::FixedModel => OpenAiGateway::new(&client, &cfg),
    };
    run_repl(&gateway, &model, input, output).await
}

/// Single GET against the engines listing, printing the status and raw body.
pub async fn run_engines_listing() -> Result<()> {
    let mut output = io::stdout();
    let Some(cfg) = report_startup(load_config(), &mut output)? else {
        return Ok(());
    };
    info!(base_url = %cfg.base_url, "loaded runtime configuration");

    let Some(client) = report_startup(build_client(&cfg), &mut output)? else {
        return Ok(());
    };
    match providers::openai::list_engines(&client, &cfg).await {
        Ok(listing) => {
            writeln!(output, "Status code: {}", listing.status.as_u16())?;
            writeln!(output, "{}", listing.body)?;
        }
        Err(err) => writeln!(output, "Error: {err:#}")?,
    }
    Ok(())
}
