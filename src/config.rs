//! Runtime tuning for the engine.
//!
//! Rules that define the game itself (cost growth, XP per level, boost
//! multipliers) are constants next to the logic. Everything here is a knob:
//! timer periods, durations and the calendar week start. Every field has a
//! default, so an override JSON only needs the fields it changes.

use chrono::Weekday;
use serde::{Deserialize, Serialize};

use crate::tapverse::state::BoostKind;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("config parse error: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid config: {0}")]
    Invalid(&'static str),
}

/// Boost durations in seconds, used when a boost is earned by watching an ad.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoostDurations {
    pub power: u32,
    pub double: u32,
    pub auto: u32,
}

impl Default for BoostDurations {
    fn default() -> Self {
        Self {
            power: 30,
            double: 60,
            auto: 30,
        }
    }
}

impl BoostDurations {
    pub fn for_kind(&self, kind: BoostKind) -> u32 {
        match kind {
            BoostKind::Power => self.power,
            BoostKind::Double => self.double,
            BoostKind::Auto => self.auto,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// One regeneration step every this many milliseconds.
    pub energy_regen_interval_ms: u32,
    /// Energy restored per regeneration step.
    pub energy_regen_amount: u32,
    /// Auto-tap boost taps once every this many milliseconds.
    pub auto_tap_interval_ms: u32,
    /// Upper bound on elapsed time credited by a single poll.
    pub max_catch_up_ms: u32,
    /// Length of a simulated ad.
    pub ad_duration_ms: u32,
    /// How long an ad keeps a locked arcade game playable.
    pub arcade_unlock_secs: u32,
    /// How long a companion message stays on screen.
    pub buddy_message_ms: u32,
    /// Percent chance that a tap surfaces a companion message.
    pub buddy_chatter_percent: u32,
    /// Day on which weekly quests reset.
    pub week_start: Weekday,
    pub boost_durations: BoostDurations,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            energy_regen_interval_ms: 5_000,
            energy_regen_amount: 1,
            auto_tap_interval_ms: 1_000,
            max_catch_up_ms: 60_000,
            ad_duration_ms: 2_000,
            arcade_unlock_secs: 30 * 60,
            buddy_message_ms: 4_000,
            buddy_chatter_percent: 10,
            week_start: Weekday::Sun,
            boost_durations: BoostDurations::default(),
        }
    }
}

impl EngineConfig {
    /// Parse an override document and validate it.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.energy_regen_interval_ms == 0 {
            return Err(ConfigError::Invalid("energy_regen_interval_ms must be positive"));
        }
        if self.auto_tap_interval_ms == 0 {
            return Err(ConfigError::Invalid("auto_tap_interval_ms must be positive"));
        }
        if self.max_catch_up_ms < self.energy_regen_interval_ms {
            return Err(ConfigError::Invalid(
                "max_catch_up_ms must cover at least one regeneration step",
            ));
        }
        if self.buddy_chatter_percent > 100 {
            return Err(ConfigError::Invalid("buddy_chatter_percent is a percentage"));
        }
        Ok(())
    }
}
