//! TapVerse game state definitions.
//!
//! Field names serialize in camelCase so snapshots written by earlier
//! releases (which used camelCase keys) still load.

use std::collections::BTreeSet;
use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::time::{Millis, MS_PER_SECOND};

use super::catalog;

/// Experience needed per level.
pub const XP_PER_LEVEL: u64 = 100;
pub const STARTING_ENERGY: u32 = 100;
pub const DEFAULT_SKIN: &str = "default";
pub const FIRST_CHAPTER: u32 = 1;

/// Timed boost channels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BoostKind {
    Power,
    Double,
    Auto,
}

impl BoostKind {
    pub fn all() -> &'static [BoostKind] {
        &[BoostKind::Power, BoostKind::Double, BoostKind::Auto]
    }

    pub fn name(&self) -> &'static str {
        match self {
            BoostKind::Power => "Power Tap",
            BoostKind::Double => "Double Coins",
            BoostKind::Auto => "Auto-Tap",
        }
    }
}

impl fmt::Display for BoostKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One boost channel. `active` may be stale until the next evaluation
/// pass clears it, so reads go through `is_active_at`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TimedBoost {
    pub active: bool,
    pub end_time: Millis,
}

impl TimedBoost {
    pub fn is_active_at(&self, now: Millis) -> bool {
        self.active && now < self.end_time
    }

    pub fn remaining_ms(&self, now: Millis) -> Millis {
        if self.is_active_at(now) {
            self.end_time - now
        } else {
            0
        }
    }

    /// Whole seconds left, rounded up so a live boost never shows 0.
    pub fn remaining_secs(&self, now: Millis) -> u32 {
        let ms = self.remaining_ms(now);
        ((ms + MS_PER_SECOND - 1) / MS_PER_SECOND) as u32
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Boosts {
    pub power: TimedBoost,
    pub double: TimedBoost,
    pub auto: TimedBoost,
}

impl Boosts {
    pub fn get(&self, kind: BoostKind) -> &TimedBoost {
        match kind {
            BoostKind::Power => &self.power,
            BoostKind::Double => &self.double,
            BoostKind::Auto => &self.auto,
        }
    }

    pub fn get_mut(&mut self, kind: BoostKind) -> &mut TimedBoost {
        match kind {
            BoostKind::Power => &mut self.power,
            BoostKind::Double => &mut self.double,
            BoostKind::Auto => &mut self.auto,
        }
    }
}

/// An arcade game made playable for a while by watching an ad.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TempUnlock {
    pub game_id: String,
    pub unlock_end_time: Millis,
}

/// The player aggregate.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PlayerState {
    pub coins: f64,
    pub tap_power: f64,
    pub coin_multiplier: f64,
    pub energy: u32,
    pub max_energy: u32,
    pub experience: u64,
    /// Always `level_for_experience(experience)`.
    pub level: u32,
    pub total_taps: u64,
    pub daily_taps: u64,
    pub total_coins_earned: f64,
    pub total_purchases: u64,
    pub streak_days: u32,
    pub last_play_date: Option<NaiveDate>,
    pub unlocked_chapters: BTreeSet<u32>,
    pub current_chapter: u32,
    pub unlocked_skins: BTreeSet<String>,
    pub selected_skin: String,
    pub boosts: Boosts,
    pub temp_unlocked_arcade_games: Vec<TempUnlock>,
    pub daily_ads_watched: u32,
    pub weekly_ads_watched: u32,
    pub total_ads_watched: u32,
}

impl Default for PlayerState {
    fn default() -> Self {
        Self {
            coins: 0.0,
            tap_power: 1.0,
            coin_multiplier: 1.0,
            energy: STARTING_ENERGY,
            max_energy: STARTING_ENERGY,
            experience: 0,
            level: 1,
            total_taps: 0,
            daily_taps: 0,
            total_coins_earned: 0.0,
            total_purchases: 0,
            streak_days: 0,
            last_play_date: None,
            unlocked_chapters: BTreeSet::from([FIRST_CHAPTER]),
            current_chapter: FIRST_CHAPTER,
            unlocked_skins: BTreeSet::from([DEFAULT_SKIN.to_string()]),
            selected_skin: DEFAULT_SKIN.to_string(),
            boosts: Boosts::default(),
            temp_unlocked_arcade_games: Vec::new(),
            daily_ads_watched: 0,
            weekly_ads_watched: 0,
            total_ads_watched: 0,
        }
    }
}

impl PlayerState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn level_for_experience(experience: u64) -> u32 {
        1 + (experience / XP_PER_LEVEL) as u32
    }

    /// Experience earned inside the current level (0..XP_PER_LEVEL).
    pub fn xp_into_level(&self) -> u64 {
        self.experience % XP_PER_LEVEL
    }

    pub fn is_boost_active(&self, kind: BoostKind, now: Millis) -> bool {
        self.boosts.get(kind).is_active_at(now)
    }

    /// Coins a tap earns at `now`, before any rhythm bonus.
    pub fn tap_value(&self, now: Millis) -> f64 {
        let mut value = self.tap_power * self.coin_multiplier;
        if self.is_boost_active(BoostKind::Power, now) {
            value *= super::logic::POWER_BOOST_MULTIPLIER;
        }
        if self.is_boost_active(BoostKind::Double, now) {
            value *= super::logic::DOUBLE_COINS_MULTIPLIER;
        }
        value
    }

    pub fn is_temp_unlocked(&self, game_id: &str, now: Millis) -> bool {
        self.temp_unlocked_arcade_games
            .iter()
            .any(|u| u.game_id == game_id && now < u.unlock_end_time)
    }
}

/// What an upgrade improves.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum UpgradeEffect {
    TapPower,
    CoinMultiplier,
    MaxEnergy,
}

/// A shop upgrade and how many times it was bought.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Upgrade {
    pub id: String,
    pub name: String,
    pub description: String,
    /// Price of the next purchase. Always a whole number.
    pub cost: f64,
    pub effect: UpgradeEffect,
    pub value: f64,
    #[serde(default)]
    pub owned: u32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuestPeriod {
    Daily,
    Weekly,
}

/// What a quest counts.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum QuestGoal {
    Taps,
    CoinsEarned,
    Purchases,
    AdsWatched,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum QuestStatus {
    #[default]
    InProgress,
    /// Requirement met, reward not yet taken.
    Completed,
    Claimed,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Quest {
    pub id: String,
    pub title: String,
    pub description: String,
    #[serde(rename = "type")]
    pub period: QuestPeriod,
    pub goal: QuestGoal,
    pub requirement: f64,
    #[serde(default)]
    pub progress: f64,
    #[serde(default)]
    pub status: QuestStatus,
    pub reward_coins: f64,
    pub reward_xp: u64,
}

impl Quest {
    /// Requirement met, claimed or not.
    pub fn is_completed(&self) -> bool {
        self.status != QuestStatus::InProgress
    }

    pub fn is_claimable(&self) -> bool {
        self.status == QuestStatus::Completed
    }

    /// Recompute status from progress. Claimed stays claimed.
    pub fn refresh_status(&mut self) {
        if self.status == QuestStatus::Claimed {
            return;
        }
        self.status = if self.progress >= self.requirement {
            QuestStatus::Completed
        } else {
            QuestStatus::InProgress
        };
    }

    pub fn reset(&mut self) {
        self.progress = 0.0;
        self.status = QuestStatus::InProgress;
    }

    /// Progress as a fraction in 0.0..=1.0 for progress bars.
    pub fn ratio(&self) -> f64 {
        if self.requirement <= 0.0 {
            return 1.0;
        }
        (self.progress / self.requirement).clamp(0.0, 1.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Speaker {
    Player,
    Buddy,
    Narrator,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StoryDialogue {
    pub id: u32,
    pub speaker: Speaker,
    pub text: String,
    /// Set once the line has been shown. Never unset.
    #[serde(default)]
    pub read: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoryChapter {
    pub id: u32,
    pub title: String,
    pub planet: String,
    pub unlock_level: u32,
    pub dialogues: Vec<StoryDialogue>,
}

impl StoryChapter {
    pub fn unread_count(&self) -> usize {
        self.dialogues.iter().filter(|d| !d.read).count()
    }
}

/// Everything the engine owns and persists.
#[derive(Clone, Debug, PartialEq)]
pub struct TapverseState {
    pub player: PlayerState,
    pub upgrades: Vec<Upgrade>,
    pub quests: Vec<Quest>,
    pub chapters: Vec<StoryChapter>,
}

impl TapverseState {
    pub fn new() -> Self {
        Self {
            player: PlayerState::new(),
            upgrades: catalog::upgrades(),
            quests: catalog::quests(),
            chapters: catalog::chapters(),
        }
    }

    pub fn upgrade(&self, id: &str) -> Option<&Upgrade> {
        self.upgrades.iter().find(|u| u.id == id)
    }

    pub fn quest(&self, id: &str) -> Option<&Quest> {
        self.quests.iter().find(|q| q.id == id)
    }

    pub fn chapter(&self, id: u32) -> Option<&StoryChapter> {
        self.chapters.iter().find(|c| c.id == id)
    }

    pub fn claimable_quest_count(&self) -> usize {
        self.quests.iter().filter(|q| q.is_claimable()).count()
    }
}
