//! Queue configuration.

use courier_config::QueueSettings;

/// Settings for the event channel and its consumption loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueueConfig {
    /// Channel capacity; `None` is unbounded
    pub capacity: Option<usize>,

    /// Keep consuming after a subscriber fails
    pub continue_on_error: bool,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            capacity: None,
            continue_on_error: true,
        }
    }
}

impl QueueConfig {
    /// Create an unbounded, error-tolerant configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from loaded settings.
    pub fn from_settings(settings: &QueueSettings) -> Self {
        Self {
            capacity: settings.capacity,
            continue_on_error: settings.continue_on_error,
        }
    }

    /// Bound the channel. Publishers wait while it is full.
    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = Some(capacity);
        self
    }

    /// Enable/disable continue on error
    pub fn continue_on_error(mut self, enabled: bool) -> Self {
        self.continue_on_error = enabled;
        self
    }
}
