//! Headless host for the command line
//!
//! Stands in for the design tool when the binary runs outside it: toasts go
//! to the terminal, prompts read stdin, the auth surface becomes the system
//! browser, and supplied values are printed instead of written into layers.

use anyhow::Result;
use colored::Colorize;
use std::io::{self, BufRead, Write};
use std::path::Path;
use std::sync::Mutex;
use tracing::debug;
use url::Url;

use super::{DataKind, DataSink, HostShell};

pub struct ConsoleHost {
    /// Canned prompt answer, used by `supply --ids`
    canned_input: Mutex<Option<String>>,
}

impl ConsoleHost {
    pub fn new() -> Self {
        Self {
            canned_input: Mutex::new(None),
        }
    }

    /// Answer the next prompt with `input` instead of reading stdin
    pub fn with_canned_input(self, input: Option<String>) -> Self {
        if let Ok(mut slot) = self.canned_input.lock() {
            *slot = input;
        }
        self
    }
}

impl Default for ConsoleHost {
    fn default() -> Self {
        Self::new()
    }
}

impl HostShell for ConsoleHost {
    fn message(&self, text: &str) {
        println!("{}", text.yellow());
    }

    fn prompt(&self, label: &str, default: &str) -> Option<String> {
        if let Ok(mut slot) = self.canned_input.lock() {
            if let Some(canned) = slot.take() {
                return Some(canned);
            }
        }

        print!("{label} [{default}]: ");
        let _ = io::stdout().flush();

        let mut line = String::new();
        match io::stdin().lock().read_line(&mut line) {
            // EOF counts as cancelling
            Ok(0) => None,
            Ok(_) => {
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    Some(default.to_string())
                } else {
                    Some(trimmed.to_string())
                }
            }
            Err(_) => None,
        }
    }

    fn open_auth_surface(&self, url: &Url) -> Result<()> {
        println!("Open this URL to sign in:\n  {}", url.as_str().cyan());
        if let Err(err) = open::that(url.as_str()) {
            debug!("could not launch a browser: {err}");
        }
        Ok(())
    }

    fn close_auth_surface(&self) {
        debug!("auth surface closed");
    }

    fn app_descriptor(&self) -> String {
        format!("vkdata-cli {}", env!("CARGO_PKG_VERSION"))
    }
}

impl DataSink for ConsoleHost {
    fn register_supplier(&self, kind: DataKind, title: &str, action: &str) {
        debug!(kind = kind.as_str(), action, title, "registered supplier");
    }

    fn deregister_all(&self) {
        debug!("deregistered suppliers");
    }

    fn supply_text(&self, _key: &str, index: usize, text: &str) {
        println!("{} {}", format!("[{index}]").dimmed(), text);
    }

    fn supply_image(&self, _key: &str, index: usize, path: &Path) {
        println!("{} {}", format!("[{index}]").dimmed(), path.display());
    }

    fn annotate(&self, index: usize, key: &str, value: &str) {
        debug!(index, key, value, "annotate");
    }
}
