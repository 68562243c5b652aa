//! Terminal output: styling, progress and JSON helpers.

pub mod json;
pub mod progress;
pub mod reporter;
pub mod styles;

use std::path::Path;

use console::Term;
use owo_colors::OwoColorize as _;
pub use reporter::TerminalReporter;
pub use styles::Styles;

use crate::domain::command::CommandResult;
use crate::domain::settings::{EffectiveSetting, Provenance};

/// Output context carrying styling and terminal state.
pub struct OutputContext {
    /// Stylesheet for colored output.
    pub styles: Styles,
    /// Whether stdout is a TTY.
    pub is_tty: bool,
    /// Whether to suppress non-error output.
    pub quiet: bool,
}

impl OutputContext {
    /// Create output context based on CLI flags and environment.
    #[must_use]
    pub fn new(no_color: bool, quiet: bool) -> Self {
        let is_tty = Term::stdout().is_term();
        let use_colors = !no_color && is_tty && std::env::var("NO_COLOR").is_err();

        let mut styles = Styles::default();
        if use_colors {
            styles.colorize();
        }

        Self {
            styles,
            is_tty,
            quiet,
        }
    }

    /// Spinners only make sense on an interactive terminal.
    #[must_use]
    pub fn show_progress(&self) -> bool {
        self.is_tty && !self.quiet
    }

    /// Print a warning message prefixed with `⚠`. Suppressed when `quiet`.
    pub fn warn(&self, msg: &str) {
        if !self.quiet {
            println!("  {} {msg}", "⚠".style(self.styles.warning));
        }
    }

    /// Print an info message prefixed with `ℹ`. Suppressed when `quiet`.
    pub fn info(&self, msg: &str) {
        if !self.quiet {
            println!("  {} {msg}", "ℹ".style(self.styles.info));
        }
    }

    /// Print a key-value pair with the key dimmed. Suppressed when `quiet`.
    pub fn kv(&self, key: &str, value: &str) {
        if !self.quiet {
            println!("  {}  {value}", key.style(self.styles.dim));
        }
    }

    /// Where this run's transcript was written.
    pub fn transcript(&self, path: &Path) {
        self.kv("Transcript", &path.display().to_string());
    }

    /// Print one effective setting as `NAME  value  (source)`.
    ///
    /// This is the command's primary output, so `quiet` does not apply.
    pub fn setting(&self, setting: &EffectiveSetting, width: usize) {
        let source = format!("({})", provenance_label(setting.source));
        let source = match setting.source {
            Provenance::Env => source.style(self.styles.success).to_string(),
            Provenance::Default => source.style(self.styles.dim).to_string(),
            Provenance::Unset => source.style(self.styles.warning).to_string(),
        };
        println!("{}", setting_line(setting, width, &source));
    }

    /// Print a command's legacy result: its output, or the `FAIL: ...` text
    /// in the error style. Nothing is printed for empty successful output.
    pub fn command_result(&self, result: &CommandResult) {
        match result.failure() {
            Some(text) => println!("{}", text.style(self.styles.error)),
            None => {
                let out = result.legacy_string();
                if !out.is_empty() {
                    println!("{out}");
                }
            }
        }
    }
}

/// Word shown for a setting's source.
#[must_use]
pub fn provenance_label(source: Provenance) -> &'static str {
    match source {
        Provenance::Env => "env",
        Provenance::Default => "default",
        Provenance::Unset => "unset",
    }
}

/// `NAME  value  source`, with the name padded to `width` and `-` for unset.
#[must_use]
pub fn setting_line(setting: &EffectiveSetting, width: usize, source: &str) -> String {
    let value = setting.value.as_deref().unwrap_or("-");
    format!("{:<width$}  {value}  {source}", setting.name)
}
