//! Prompt, alert and file-open boundary

use std::fs::OpenOptions;
use std::io::{BufRead, Write};
use std::path::Path;
use std::process::Command;
use tracing::{info, warn};

use crate::error::{Result, Rule1Error};
use crate::models::Ticker;
use crate::source::SourceStore;

/// Blocking user dialogs
#[cfg_attr(test, mockall::automock)]
pub trait UserInteraction {
    /// Ask for a line of text; None when the user cancels
    fn prompt_text(&mut self, message: &str) -> Option<String>;

    fn alert(&mut self, message: &str, title: &str);
}

/// Ask for a ticker until cancelled or a valid one is entered
pub fn ask_ticker<U: UserInteraction + ?Sized>(ui: &mut U) -> Result<Ticker> {
    loop {
        let input = ui
            .prompt_text("Please enter a valid ticker: ")
            .ok_or(Rule1Error::Cancelled)?;
        match Ticker::parse(&input) {
            Ok(ticker) => return Ok(ticker),
            Err(e) => ui.alert(&e.to_string(), "Input"),
        }
    }
}

/// Terminal dialogs over any reader/writer pair
pub struct ConsoleInteraction<R: BufRead, W: Write> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> ConsoleInteraction<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }
}

impl ConsoleInteraction<std::io::StdinLock<'static>, std::io::Stderr> {
    pub fn stdio() -> Self {
        Self::new(std::io::stdin().lock(), std::io::stderr())
    }
}

impl<R: BufRead, W: Write> UserInteraction for ConsoleInteraction<R, W> {
    fn prompt_text(&mut self, message: &str) -> Option<String> {
        write!(self.output, "{}", message).ok()?;
        self.output.flush().ok()?;

        let mut line = String::new();
        match self.input.read_line(&mut line) {
            Ok(0) | Err(_) => None,
            Ok(_) => {
                let text = line.trim();
                if text.is_empty() {
                    None
                } else {
                    Some(text.to_uppercase())
                }
            }
        }
    }

    fn alert(&mut self, message: &str, title: &str) {
        if writeln!(self.output, "[{}] {}", title, message).is_err() {
            warn!("Could not display alert: {}", message);
        }
    }
}

/// Opens files in the desktop's associated application
#[cfg_attr(test, mockall::automock)]
pub trait FileOpener {
    fn open(&self, path: &Path) -> Result<()>;
}

/// Hands the path to the platform's default opener
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemOpener;

impl FileOpener for SystemOpener {
    fn open(&self, path: &Path) -> Result<()> {
        let mut command = if cfg!(target_os = "windows") {
            let mut c = Command::new("cmd");
            c.args(["/C", "start", ""]);
            c
        } else if cfg!(target_os = "macos") {
            Command::new("open")
        } else {
            Command::new("xdg-open")
        };

        command.arg(path).spawn()?;
        Ok(())
    }
}

/// Open a ticker's source after checking it exists and is not locked
pub fn open_source<O: FileOpener + ?Sized>(
    store: &SourceStore,
    opener: &O,
    ticker: &Ticker,
) -> Result<()> {
    let path = store.path_for(ticker);
    if !path.is_file() {
        return Err(Rule1Error::SourceMissing {
            ticker: ticker.to_string(),
            path,
        });
    }

    // Opening for append fails while another process holds the workbook.
    if OpenOptions::new().append(true).open(&path).is_err() {
        return Err(Rule1Error::SourceLocked {
            ticker: ticker.to_string(),
            path,
        });
    }

    info!("📂 Opening {}", path.display());
    opener.open(&path)
}
