//! Configuration options for the session controller

use std::time::Duration;

use crate::controller::MULTIPLE_TAGS_PROMPT;

/// Interval between removal-wait availability rechecks
const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Configuration options for a [`SessionController`](crate::SessionController)
#[derive(Debug, Clone)]
pub struct ControllerConfig {
    /// Interval between availability rechecks while waiting for an excess
    /// tag to be removed
    pub poll_interval: Duration,

    /// Prompt shown when more than one tag is in the field
    pub multi_tag_prompt: String,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            poll_interval: DEFAULT_POLL_INTERVAL,
            multi_tag_prompt: MULTIPLE_TAGS_PROMPT.to_string(),
        }
    }
}

impl ControllerConfig {
    /// Create a new default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the removal-wait poll interval
    pub const fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Set the prompt shown when more than one tag is in the field
    pub fn with_multi_tag_prompt<S: Into<String>>(mut self, prompt: S) -> Self {
        self.multi_tag_prompt = prompt.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = ControllerConfig::default();
        assert_eq!(config.poll_interval, Duration::from_millis(500));
        assert_eq!(config.multi_tag_prompt, MULTIPLE_TAGS_PROMPT);
    }

    #[test]
    fn builder_setters() {
        let config = ControllerConfig::new()
            .with_poll_interval(Duration::from_millis(50))
            .with_multi_tag_prompt("one at a time");
        assert_eq!(config.poll_interval, Duration::from_millis(50));
        assert_eq!(config.multi_tag_prompt, "one at a time");
    }
}
