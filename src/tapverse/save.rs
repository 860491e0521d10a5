//! TapVerse save/load.
//!
//! ## Versioning
//!
//! - `SAVE_VERSION`: current envelope version. Bump when a slot's shape changes.
//! - `MIN_COMPATIBLE_VERSION`: oldest version that can still be migrated.
//!   Version 0 is the un-enveloped format written by the first web release.
//!
//! Each slot is stored under its own key as `{ "version": N, "data": ... }`.
//! A slot that fails to parse, or comes from a newer build, is logged,
//! removed and replaced by defaults. The other slots still load.

use std::cell::RefCell;
use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::EngineConfig;

use super::catalog;
use super::logic;
use super::state::{
    PlayerState, Quest, QuestStatus, StoryChapter, TapverseState, Upgrade,
};

pub const GAME_STATE_KEY: &str = "tapverse-game-state";
pub const UPGRADES_KEY: &str = "tapverse-upgrades";
pub const QUESTS_KEY: &str = "tapverse-quests";
pub const CHAPTERS_KEY: &str = "tapverse-chapters";
pub const AI_NAME_KEY: &str = "tapverse-ai-name";
pub const ONBOARDING_KEY: &str = "tapverse-onboarding-completed";
/// Optional `EngineConfig` override JSON. Never written by the game.
pub const CONFIG_KEY: &str = "tapverse-config";

/// Slots wiped by a progress reset. The companion name survives.
const PROGRESS_KEYS: &[&str] = &[GAME_STATE_KEY, UPGRADES_KEY, QUESTS_KEY, CHAPTERS_KEY];

const SAVE_VERSION: u32 = 1;
const MIN_COMPATIBLE_VERSION: u32 = 0;

#[derive(Debug, thiserror::Error)]
pub enum SaveError {
    #[error("storage error: {0}")]
    Storage(String),
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("save version {found} is not supported (expected {min}..={max})")]
    UnsupportedVersion { found: u32, min: u32, max: u32 },
}

/// String-valued key/value storage, shaped like the browser's localStorage.
pub trait KeyValueStore {
    fn get_item(&self, key: &str) -> Result<Option<String>, SaveError>;
    fn set_item(&self, key: &str, value: &str) -> Result<(), SaveError>;
    fn remove_item(&self, key: &str) -> Result<(), SaveError>;
}

impl<T: KeyValueStore + ?Sized> KeyValueStore for Box<T> {
    fn get_item(&self, key: &str) -> Result<Option<String>, SaveError> {
        (**self).get_item(key)
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), SaveError> {
        (**self).set_item(key, value)
    }

    fn remove_item(&self, key: &str) -> Result<(), SaveError> {
        (**self).remove_item(key)
    }
}

/// In-memory storage. Used when localStorage is unavailable (private
/// browsing, native builds) and in tests.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    items: RefCell<BTreeMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, SaveError> {
        Ok(self.items.borrow().get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), SaveError> {
        self.items
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<(), SaveError> {
        self.items.borrow_mut().remove(key);
        Ok(())
    }
}

/// The browser's localStorage.
#[cfg(target_arch = "wasm32")]
pub struct BrowserStorage {
    storage: web_sys::Storage,
}

#[cfg(target_arch = "wasm32")]
impl BrowserStorage {
    pub fn open() -> Option<Self> {
        let storage = web_sys::window()?.local_storage().ok()??;
        Some(Self { storage })
    }
}

#[cfg(target_arch = "wasm32")]
impl KeyValueStore for BrowserStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, SaveError> {
        self.storage
            .get_item(key)
            .map_err(|e| SaveError::Storage(format!("{:?}", e)))
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), SaveError> {
        self.storage
            .set_item(key, value)
            .map_err(|e| SaveError::Storage(format!("{:?}", e)))
    }

    fn remove_item(&self, key: &str) -> Result<(), SaveError> {
        self.storage
            .remove_item(key)
            .map_err(|e| SaveError::Storage(format!("{:?}", e)))
    }
}

#[derive(Serialize)]
struct EnvelopeOut<'a, T> {
    version: u32,
    data: &'a T,
}

#[derive(Deserialize)]
struct EnvelopeIn {
    version: u32,
    data: Value,
}

fn encode<T: Serialize>(data: &T) -> Result<String, SaveError> {
    Ok(serde_json::to_string(&EnvelopeOut {
        version: SAVE_VERSION,
        data,
    })?)
}

/// Split a stored document into (version, payload). Anything that is not
/// an envelope is a pre-versioning save (version 0).
fn unwrap_envelope(raw: &str) -> Result<(u32, Value), SaveError> {
    let value: Value = serde_json::from_str(raw)?;
    let is_envelope = value
        .as_object()
        .is_some_and(|o| o.contains_key("version") && o.contains_key("data"));
    let (version, data) = if is_envelope {
        let env: EnvelopeIn = serde_json::from_value(value)?;
        (env.version, env.data)
    } else {
        (0, value)
    };
    if !(MIN_COMPATIBLE_VERSION..=SAVE_VERSION).contains(&version) {
        return Err(SaveError::UnsupportedVersion {
            found: version,
            min: MIN_COMPATIBLE_VERSION,
            max: SAVE_VERSION,
        });
    }
    Ok((version, data))
}

// ── Migration from version 0 ────────────────────────────────────

/// Quest shape written by the first release: a `completed` flag plus a
/// claimed sentinel of `progress == requirement + 1`.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct LegacyQuest {
    id: String,
    #[serde(default)]
    requirement: f64,
    #[serde(default)]
    progress: f64,
    #[serde(default)]
    completed: bool,
}

impl LegacyQuest {
    fn status(&self) -> QuestStatus {
        if self.completed && self.progress == self.requirement + 1.0 {
            QuestStatus::Claimed
        } else if self.completed || self.progress >= self.requirement {
            QuestStatus::Completed
        } else {
            QuestStatus::InProgress
        }
    }
}

/// `lastPlayDate` used to be written with `Date.toDateString()`
/// ("Wed May 01 2024"). Rewrite it as ISO or drop it.
fn migrate_player_v0(mut data: Value) -> Value {
    if let Some(obj) = data.as_object_mut() {
        let parsed = obj
            .get("lastPlayDate")
            .and_then(Value::as_str)
            .and_then(|s| {
                NaiveDate::parse_from_str(s, "%Y-%m-%d")
                    .or_else(|_| NaiveDate::parse_from_str(s, "%a %b %d %Y"))
                    .ok()
            });
        match parsed {
            Some(date) => {
                obj.insert("lastPlayDate".into(), Value::String(date.to_string()));
            }
            None => {
                obj.remove("lastPlayDate");
            }
        }
    }
    data
}

fn decode_player(raw: &str) -> Result<PlayerState, SaveError> {
    let (version, data) = unwrap_envelope(raw)?;
    let data = if version == 0 {
        migrate_player_v0(data)
    } else {
        data
    };
    Ok(serde_json::from_value(data)?)
}

fn decode_upgrades(raw: &str) -> Result<Vec<Upgrade>, SaveError> {
    let (_, data) = unwrap_envelope(raw)?;
    Ok(serde_json::from_value(data)?)
}

/// Saved quest progress keyed by id.
fn decode_quests(raw: &str) -> Result<Vec<(String, f64, QuestStatus)>, SaveError> {
    let (version, data) = unwrap_envelope(raw)?;
    if version == 0 {
        let legacy: Vec<LegacyQuest> = serde_json::from_value(data)?;
        return Ok(legacy
            .into_iter()
            .map(|q| {
                let status = q.status();
                // The sentinel is not real progress.
                let progress = if status == QuestStatus::Claimed {
                    q.requirement
                } else {
                    q.progress
                };
                (q.id, progress, status)
            })
            .collect());
    }
    let quests: Vec<Quest> = serde_json::from_value(data)?;
    Ok(quests
        .into_iter()
        .map(|q| (q.id, q.progress, q.status))
        .collect())
}

fn decode_chapters(raw: &str) -> Result<Vec<StoryChapter>, SaveError> {
    let (_, data) = unwrap_envelope(raw)?;
    Ok(serde_json::from_value(data)?)
}

// ── Merging onto the current catalog ────────────────────────────

/// Keep catalog definitions; carry over price and count by id.
fn merge_upgrades(saved: &[Upgrade]) -> Vec<Upgrade> {
    let mut upgrades = catalog::upgrades();
    for u in upgrades.iter_mut() {
        if let Some(s) = saved.iter().find(|s| s.id == u.id) {
            u.cost = s.cost.max(0.0).floor();
            u.owned = s.owned;
        }
    }
    upgrades
}

fn merge_quests(saved: &[(String, f64, QuestStatus)]) -> Vec<Quest> {
    let mut quests = catalog::quests();
    for q in quests.iter_mut() {
        if let Some((_, progress, status)) = saved.iter().find(|(id, _, _)| *id == q.id) {
            q.progress = progress.max(0.0);
            q.status = *status;
            // A saved completion stands even below the requirement (the old
            // `completed` flag could be set on its own).
            if q.status == QuestStatus::InProgress {
                q.refresh_status();
            }
        }
    }
    quests
}

/// Keep catalog text; carry over read flags by (chapter, dialogue) id.
fn merge_chapters(saved: &[StoryChapter]) -> Vec<StoryChapter> {
    let mut chapters = catalog::chapters();
    for ch in chapters.iter_mut() {
        let Some(saved_ch) = saved.iter().find(|s| s.id == ch.id) else {
            continue;
        };
        for d in ch.dialogues.iter_mut() {
            d.read = saved_ch
                .dialogues
                .iter()
                .any(|s| s.id == d.id && s.read);
        }
    }
    chapters
}

// ── Public API ──────────────────────────────────────────────────

/// Everything restored at startup.
#[derive(Debug, Clone)]
pub struct SavedSession {
    pub state: TapverseState,
    pub ai_name: Option<String>,
    pub onboarding_completed: bool,
}

fn read_raw(storage: &impl KeyValueStore, key: &str) -> Option<String> {
    match storage.get_item(key) {
        Ok(raw) => raw,
        Err(e) => {
            log::warn!("could not read {}: {}", key, e);
            None
        }
    }
}

/// Load and decode one slot. A bad slot is removed and yields None.
fn load_slot<T>(
    storage: &impl KeyValueStore,
    key: &str,
    decode: impl Fn(&str) -> Result<T, SaveError>,
) -> Option<T> {
    let raw = read_raw(storage, key)?;
    match decode(&raw) {
        Ok(value) => Some(value),
        Err(e) => {
            log::warn!("discarding saved {}: {}", key, e);
            if let Err(e) = storage.remove_item(key) {
                log::warn!("could not remove {}: {}", key, e);
            }
            None
        }
    }
}

pub fn load_session(storage: &impl KeyValueStore) -> SavedSession {
    let mut state = TapverseState::new();
    if let Some(player) = load_slot(storage, GAME_STATE_KEY, decode_player) {
        state.player = player;
    }
    if let Some(saved) = load_slot(storage, UPGRADES_KEY, decode_upgrades) {
        state.upgrades = merge_upgrades(&saved);
    }
    if let Some(saved) = load_slot(storage, QUESTS_KEY, decode_quests) {
        state.quests = merge_quests(&saved);
    }
    if let Some(saved) = load_slot(storage, CHAPTERS_KEY, decode_chapters) {
        state.chapters = merge_chapters(&saved);
    }
    logic::repair_invariants(&mut state);

    let ai_name = read_raw(storage, AI_NAME_KEY)
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty());
    let onboarding_completed = read_raw(storage, ONBOARDING_KEY).as_deref() == Some("true");

    SavedSession {
        state,
        ai_name,
        onboarding_completed,
    }
}

/// Overwrite every progress slot with the current state.
pub fn save_all(storage: &impl KeyValueStore, state: &TapverseState) -> Result<(), SaveError> {
    storage.set_item(GAME_STATE_KEY, &encode(&state.player)?)?;
    storage.set_item(UPGRADES_KEY, &encode(&state.upgrades)?)?;
    storage.set_item(QUESTS_KEY, &encode(&state.quests)?)?;
    storage.set_item(CHAPTERS_KEY, &encode(&state.chapters)?)?;
    Ok(())
}

pub fn save_ai_name(storage: &impl KeyValueStore, name: &str) -> Result<(), SaveError> {
    storage.set_item(AI_NAME_KEY, name)
}

pub fn save_onboarding_completed(storage: &impl KeyValueStore) -> Result<(), SaveError> {
    storage.set_item(ONBOARDING_KEY, "true")
}

pub fn clear_progress(storage: &impl KeyValueStore) -> Result<(), SaveError> {
    for key in PROGRESS_KEYS {
        storage.remove_item(key)?;
    }
    Ok(())
}

/// Tuning overrides stored next to the save. Missing or invalid overrides
/// fall back to the defaults.
pub fn load_config(storage: &impl KeyValueStore) -> EngineConfig {
    let Some(raw) = read_raw(storage, CONFIG_KEY) else {
        return EngineConfig::default();
    };
    match EngineConfig::from_json(&raw) {
        Ok(config) => {
            log::info!("using config overrides from {}", CONFIG_KEY);
            config
        }
        Err(e) => {
            log::warn!("ignoring {}: {}", CONFIG_KEY, e);
            EngineConfig::default()
        }
    }
}
