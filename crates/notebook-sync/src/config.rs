//! Controller timing configuration.

use std::time::Duration;

use notebook_editor::EDITOR_READY_TIMEOUT;
use serde::{Deserialize, Serialize};

pub const SYNC_DELAY_ENV: &str = "NOTEBOOK_SYNC_DELAY_MS";
pub const EDITOR_READY_TIMEOUT_ENV: &str = "NOTEBOOK_EDITOR_READY_TIMEOUT_MS";

/// Quiet period after the last edit before a save is attempted.
pub const DEFAULT_SYNC_DELAY: Duration = Duration::from_millis(1000);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NotebookConfig {
    /// Quiet period after the last edit before a save is attempted.
    pub sync_delay_ms: u64,
    /// How long editor commands wait for the editor to attach.
    pub editor_ready_timeout_ms: u64,
}

impl Default for NotebookConfig {
    fn default() -> Self {
        Self {
            sync_delay_ms: DEFAULT_SYNC_DELAY.as_millis() as u64,
            editor_ready_timeout_ms: EDITOR_READY_TIMEOUT.as_millis() as u64,
        }
    }
}

impl NotebookConfig {
    /// Defaults overridden by `NOTEBOOK_SYNC_DELAY_MS` and
    /// `NOTEBOOK_EDITOR_READY_TIMEOUT_MS`. Unparseable values are ignored.
    pub fn from_env() -> Self {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Like [`from_env`](Self::from_env), reading variables through `lookup`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();
        if let Some(ms) = read_millis(&lookup, SYNC_DELAY_ENV) {
            config.sync_delay_ms = ms;
        }
        if let Some(ms) = read_millis(&lookup, EDITOR_READY_TIMEOUT_ENV) {
            config.editor_ready_timeout_ms = ms;
        }
        config
    }

    pub fn sync_delay(&self) -> Duration {
        Duration::from_millis(self.sync_delay_ms)
    }

    pub fn editor_ready_timeout(&self) -> Duration {
        Duration::from_millis(self.editor_ready_timeout_ms)
    }
}

fn read_millis(lookup: &impl Fn(&str) -> Option<String>, var: &str) -> Option<u64> {
    let raw = lookup(var)?;
    match raw.trim().parse() {
        Ok(ms) => Some(ms),
        Err(error) => {
            tracing::warn!(var, value = %raw, %error, "ignoring invalid duration");
            None
        }
    }
}
