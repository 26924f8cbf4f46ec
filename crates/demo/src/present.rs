//! Result presentation
//!
//! The flows report a single human-readable string per session outcome. The
//! presenter is held weakly: the caller that asked for a scan may be gone by
//! the time a result arrives, and posting to a gone presenter is a no-op.

use std::fmt;
use std::sync::Weak;

use colored::Colorize;

/// External presentation collaborator
pub trait Presenter: Send + Sync {
    /// Show a human-readable result or error message to the user
    fn present(&self, message: &str);
}

/// Post a message to a possibly-gone presenter
pub fn post(presenter: &Weak<dyn Presenter>, message: &str) {
    if let Some(presenter) = presenter.upgrade() {
        presenter.present(message);
    }
}

/// Presenter printing to standard output, used by the demo binary
#[derive(Debug, Default)]
pub struct ConsolePresenter;

impl Presenter for ConsolePresenter {
    fn present(&self, message: &str) {
        println!("{message}");
    }
}

/// A formatted section title
pub struct SectionTitle(pub &'static str);

impl fmt::Display for SectionTitle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "\n{}", self.0.bold().underline())
    }
}

/// Format a success message
pub fn success(message: &str) -> String {
    format!("✅ {}", message.green().bold())
}

/// Format a warning message
pub fn warning(message: &str) -> String {
    format!("⚠️  {}", message.yellow().bold())
}

/// Format a sensitive data warning
pub fn sensitive_data_warning() -> String {
    warning("SAVE THIS INFORMATION SECURELY - IT WON'T BE SHOWN AGAIN!")
}
