use std::{fs, path::Path, time::Duration};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::DuelError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", default)]
pub struct DuelConfig {
    /// Rounds resolve on a countdown instead of on declaration.
    pub timed: bool,
    pub round_time_ms: u64,
    /// Countdown granularity for real-time drivers.
    pub tick_ms: u64,
    /// Pause between lock-in and resolution.
    pub reveal_ms: u64,
    /// Pause between resolution and the next round (timed mode only).
    pub cooldown_ms: u64,
    /// Start a fresh match as soon as one ends.
    pub auto_restart: bool,
    pub seed: Option<u64>,
}

impl Default for DuelConfig {
    fn default() -> Self {
        Self {
            timed: true,
            round_time_ms: 3000,
            tick_ms: 100,
            reveal_ms: 1000,
            cooldown_ms: 2000,
            auto_restart: true,
            seed: None,
        }
    }
}

impl DuelConfig {
    pub fn untimed() -> Self {
        Self {
            timed: false,
            ..Self::default()
        }
    }

    pub fn round_time(&self) -> Duration {
        Duration::from_millis(self.round_time_ms)
    }

    pub fn tick(&self) -> Duration {
        Duration::from_millis(self.tick_ms)
    }

    pub fn reveal(&self) -> Duration {
        Duration::from_millis(self.reveal_ms)
    }

    pub fn cooldown(&self) -> Duration {
        Duration::from_millis(self.cooldown_ms)
    }

    /// Time one timed round takes from countdown start to the next countdown.
    pub fn round_span(&self) -> Duration {
        self.round_time() + self.reveal() + self.cooldown()
    }

    pub fn validate(&self) -> Result<(), DuelError> {
        if self.round_time_ms == 0 {
            return Err(DuelError::InvalidConfig(
                "round_time_ms must be positive".to_string(),
            ));
        }
        if self.tick_ms == 0 {
            return Err(DuelError::InvalidConfig(
                "tick_ms must be positive".to_string(),
            ));
        }
        if self.tick_ms > self.round_time_ms {
            return Err(DuelError::InvalidConfig(format!(
                "tick_ms ({}) must not exceed round_time_ms ({})",
                self.tick_ms, self.round_time_ms
            )));
        }
        Ok(())
    }

    pub fn from_json_str(text: &str) -> Result<Self> {
        let cfg: DuelConfig = serde_json::from_str(text).context("failed to parse config JSON")?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn from_yaml_str(text: &str) -> Result<Self> {
        let cfg: DuelConfig = serde_yaml::from_str(text).context("failed to parse config YAML")?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Parse `text` as YAML or JSON depending on the extension of `path`.
    pub fn from_str_for_path(path: &Path, text: &str) -> Result<Self> {
        match path.extension().and_then(|e| e.to_str()) {
            Some("yaml") | Some("yml") => Self::from_yaml_str(text),
            _ => Self::from_json_str(text),
        }
        .with_context(|| format!("invalid duel config: {}", path.display()))
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read duel config: {}", path.display()))?;
        Self::from_str_for_path(path, &text)
    }
}
