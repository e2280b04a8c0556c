use anyhow::{Context, Result};
use std::io::{BufRead, Write};
use tracing::debug;

use crate::model::ModelChoice;
use crate::model_gateway::{ModelGateway, ModelGatewayRequest};

const QUIT_COMMAND: &str = "q";

fn read_line<R: BufRead>(input: &mut R) -> Result<Option<String>> {
    let mut line = String::new();
    let read = input.read_line(&mut line).context("Failed to read stdin")?;
    if read == 0 {
        return Ok(None);
    }

    let trimmed_len = line.trim_end_matches(['\n', '\r']).len();
    line.truncate(trimmed_len);
    Ok(Some(line))
}

/// Shows the model menu and reads one selection. Prints an error and returns
/// `None` for anything other than a listed number.
pub fn choose_model<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
) -> Result<Option<ModelChoice>> {
    writeln!(output, "Choose a model:")?;
    for (idx, choice) in ModelChoice::ALL.iter().enumerate() {
        writeln!(output, "{}. {}", idx + 1, choice.label())?;
    }
    write!(output, "Enter a number: ")?;
    output.flush().context("Failed to flush stdout")?;

    let selection = read_line(input)?.unwrap_or_default();
    match ModelChoice::from_selection(&selection) {
        Some(choice) => {
            writeln!(output, "Using model: {}", choice.id())?;
            Ok(Some(choice))
        }
        None => {
            writeln!(output, "Error: invalid input")?;
            Ok(None)
        }
    }
}

pub async fn run_repl<G, R, W>(gateway: &G, model: &str, mut input: R, mut output: W) -> Result<()>
where
    G: ModelGateway,
    R: BufRead,
    W: Write,
{
    writeln!(output, "Hi I'm Yosh! 🦖👋. Type '{}' to exit.", QUIT_COMMAND)?;

    loop {
        write!(output, "You: ")?;
        output.flush().context("Failed to flush stdout")?;

        let Some(prompt) = read_line(&mut input)? else {
            writeln!(output)?;
            writeln!(output, "Bye!")?;
            break;
        };
        if prompt == QUIT_COMMAND {
            writeln!(output, "Bye!")?;
            break;
        }

        debug!(model = %model, prompt_len = prompt.len(), "forwarding prompt");
        let result = gateway
            .chat(ModelGatewayRequest {
                model: model.to_string(),
                prompt,
            })
            .await;

        writeln!(output)?;
        match result {
            Ok(response) => {
                for content in &response.choices {
                    writeln!(output, "AI: {}", content)?;
                }
            }
            Err(err) => {
                debug!(error = %format!("{err:#}"), "chat turn failed");
                writeln!(output, "Error: {err:#}")?;
            }
        }
    }

    output.flush().context("Failed to flush stdout")?;
    Ok(())
}
