use std::process::Command;
use tracing::{debug, info};

use crate::error::{Result, Rule1Error};
use crate::models::Ticker;

/// External component that (re)creates a ticker's source workbook
#[cfg_attr(test, mockall::automock)]
pub trait SourceGenerator {
    fn generate(&self, ticker: &Ticker, batch: bool) -> Result<()>;
}

/// Runs the scraping tool as a blocking child process.
///
/// A `{ticker}` placeholder in an argument is replaced by the ticker;
/// without one the ticker is appended as the last positional argument.
#[derive(Debug, Clone)]
pub struct CommandGenerator {
    program: String,
    args: Vec<String>,
}

impl CommandGenerator {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    /// Split a shell-style command line on whitespace
    pub fn from_command_line(command_line: &str) -> Result<Self> {
        let mut parts = command_line.split_whitespace().map(str::to_string);
        let program = parts
            .next()
            .ok_or_else(|| Rule1Error::Config("generator command is empty".to_string()))?;
        Ok(Self::new(program, parts.collect()))
    }

    pub fn command_args(&self, ticker: &Ticker, batch: bool) -> Vec<String> {
        let mut substituted = false;
        let mut args: Vec<String> = self
            .args
            .iter()
            .map(|arg| {
                if arg.contains("{ticker}") {
                    substituted = true;
                    arg.replace("{ticker}", ticker.as_str())
                } else {
                    arg.clone()
                }
            })
            .collect();

        if !substituted {
            args.push(ticker.as_str().to_string());
        }
        if batch {
            args.push("--batch".to_string());
        }
        args
    }
}

impl SourceGenerator for CommandGenerator {
    fn generate(&self, ticker: &Ticker, batch: bool) -> Result<()> {
        let args = self.command_args(ticker, batch);
        info!("🔄 Generating financial source for {} via {}", ticker, self.program);
        debug!("Generator command: {} {:?}", self.program, args);

        let output = Command::new(&self.program)
            .args(&args)
            .output()
            .map_err(|e| Rule1Error::Generation {
                ticker: ticker.to_string(),
                reason: format!("failed to start '{}': {}", self.program, e),
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(Rule1Error::Generation {
                ticker: ticker.to_string(),
                reason: format!("{} exited with {}: {}", self.program, output.status, stderr.trim()),
            });
        }

        info!("✅ Financial source generated for {}", ticker);
        Ok(())
    }
}
