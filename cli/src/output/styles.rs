//! Output styles using owo-colors stylesheet pattern

use owo_colors::Style;

/// Centralized stylesheet for CLI output colors. Every style is plain until
/// [`Styles::colorize`] is called.
#[derive(Default, Clone)]
pub struct Styles {
    /// Success marks and env-provided settings (green)
    pub success: Style,
    /// Warnings and unset settings (yellow)
    pub warning: Style,
    /// `FAIL: ...` results (red)
    pub error: Style,
    /// Info messages (blue)
    pub info: Style,
    /// Keys and defaulted settings
    pub dim: Style,
    /// Pipeline step arrows (cyan)
    pub step: Style,
}

impl Styles {
    pub fn colorize(&mut self) {
        self.success = Style::new().green();
        self.warning = Style::new().yellow();
        self.error = Style::new().red();
        self.info = Style::new().blue();
        self.dim = Style::new().dimmed();
        self.step = Style::new().cyan();
    }
}
