//! Operator confirmation before irreversible publishes.

use crate::error::{CliError, Result};
use std::io::{self, BufRead, Write};

/// Asks the operator a yes/no question
pub trait Confirmer {
    /// Return `true` only on an affirmative answer
    fn confirm(&mut self, message: &str) -> Result<bool>;
}

/// Prompt on a reader/writer pair, `[y/N]` style.
///
/// "y" or "yes" (any case, surrounding whitespace ignored) confirms.
/// EOF, an empty line, anything else, or a read error declines.
#[derive(Debug)]
pub struct StdinConfirmer<R, W> {
    input: R,
    output: W,
}

impl StdinConfirmer<io::StdinLock<'static>, io::Stdout> {
    /// Prompt on the process's stdin/stdout
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stdout())
    }
}

impl<R: BufRead, W: Write> StdinConfirmer<R, W> {
    /// Prompt on arbitrary streams
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    /// Give back the output stream
    pub fn into_output(self) -> W {
        self.output
    }
}

impl<R: BufRead, W: Write> Confirmer for StdinConfirmer<R, W> {
    fn confirm(&mut self, message: &str) -> Result<bool> {
        write!(self.output, "{} [y/N]: ", message)
            .and_then(|_| self.output.flush())
            .map_err(|e| CliError::PromptFailed {
                reason: format!("Failed to write prompt: {}", e),
            })?;

        let mut answer = String::new();
        match self.input.read_line(&mut answer) {
            Ok(0) => Ok(false),
            Ok(_) => Ok(is_affirmative(&answer)),
            Err(e) => {
                log::warn!("could not read confirmation, treating as no: {}", e);
                Ok(false)
            }
        }
    }
}

/// Confirms everything (`--yes`)
#[derive(Debug, Default, Clone, Copy)]
pub struct AssumeYes;

impl Confirmer for AssumeYes {
    fn confirm(&mut self, message: &str) -> Result<bool> {
        log::info!("{} [y/N]: y (--yes)", message);
        Ok(true)
    }
}

fn is_affirmative(answer: &str) -> bool {
    let trimmed = answer.trim().to_lowercase();
    trimmed == "y" || trimmed == "yes"
}
