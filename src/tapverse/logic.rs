//! TapVerse game logic: pure functions over `TapverseState`, fully testable.
//!
//! Every mutator validates its own preconditions and returns an explicit
//! result. A rejected call leaves the state untouched.

use crate::time::Millis;

use super::catalog;
use super::quests::{self, QuestEvent};
use super::state::{
    BoostKind, PlayerState, QuestStatus, TapverseState, UpgradeEffect, DEFAULT_SKIN,
    FIRST_CHAPTER,
};

pub const POWER_BOOST_MULTIPLIER: f64 = 2.0;
pub const DOUBLE_COINS_MULTIPLIER: f64 = 2.0;
/// Each purchase multiplies the next price by this, rounded down.
pub const UPGRADE_COST_GROWTH: f64 = 1.5;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ActionError {
    #[error("out of energy")]
    OutOfEnergy,
    #[error("unknown upgrade: {0}")]
    UnknownUpgrade(String),
    #[error("not enough coins (need {needed}, have {available})")]
    InsufficientCoins { needed: f64, available: f64 },
    #[error("unknown quest: {0}")]
    UnknownQuest(String),
    #[error("quest not complete: {0}")]
    QuestNotComplete(String),
    #[error("reward already claimed: {0}")]
    AlreadyClaimed(String),
    #[error("{0} is already active")]
    BoostAlreadyActive(BoostKind),
    #[error("boost duration must be positive")]
    InvalidDuration,
    #[error("unknown skin: {0}")]
    UnknownSkin(String),
    #[error("skin not unlocked yet: {0}")]
    SkinLocked(String),
    #[error("unknown chapter: {0}")]
    UnknownChapter(u32),
    #[error("chapter {0} is locked")]
    ChapterLocked(u32),
    #[error("chapter {chapter} has no dialogue {dialogue}")]
    UnknownDialogue { chapter: u32, dialogue: u32 },
    #[error("unknown game: {0}")]
    UnknownGame(String),
    #[error("{0} is already playable")]
    GameAlreadyUnlocked(String),
    #[error("an ad is already playing")]
    AdInProgress,
}

/// What a level-up unlocked.
#[derive(Debug, Clone, PartialEq)]
pub struct LevelUp {
    pub level: u32,
    pub new_chapters: Vec<u32>,
    pub new_skins: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TapOutcome {
    pub coins_earned: f64,
    pub completed_quests: Vec<String>,
    pub level_up: Option<LevelUp>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PurchaseOutcome {
    pub upgrade_name: String,
    pub cost_paid: f64,
    pub next_cost: f64,
    pub owned: u32,
    pub completed_quests: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClaimOutcome {
    pub reward_coins: f64,
    pub reward_xp: u64,
    pub level_up: Option<LevelUp>,
}

/// A plain tap.
pub fn tap(state: &mut TapverseState, now: Millis) -> Result<TapOutcome, ActionError> {
    tap_with_bonus(state, now, 1.0)
}

/// A tap whose coin yield is scaled by `bonus` (the rhythm bonus, 1.0 off-beat).
pub fn tap_with_bonus(
    state: &mut TapverseState,
    now: Millis,
    bonus: f64,
) -> Result<TapOutcome, ActionError> {
    let player = &mut state.player;
    if player.energy == 0 {
        return Err(ActionError::OutOfEnergy);
    }

    let coins_earned = player.tap_value(now) * bonus;
    player.coins += coins_earned;
    player.total_coins_earned += coins_earned;
    player.energy -= 1;
    player.total_taps += 1;
    player.daily_taps += 1;
    player.experience += 1;

    let completed_quests = quests::record_event(
        &mut state.quests,
        QuestEvent::Tap {
            coins: coins_earned,
        },
    );
    let level_up = check_for_level_up(state);

    Ok(TapOutcome {
        coins_earned,
        completed_quests,
        level_up,
    })
}

/// Next price after one purchase at `cost`.
pub fn next_upgrade_cost(cost: f64) -> f64 {
    (cost * UPGRADE_COST_GROWTH).floor()
}

pub fn buy_upgrade(state: &mut TapverseState, id: &str) -> Result<PurchaseOutcome, ActionError> {
    let idx = state
        .upgrades
        .iter()
        .position(|u| u.id == id)
        .ok_or_else(|| ActionError::UnknownUpgrade(id.to_string()))?;

    let cost = state.upgrades[idx].cost;
    if state.player.coins < cost {
        return Err(ActionError::InsufficientCoins {
            needed: cost,
            available: state.player.coins,
        });
    }

    let upgrade = &mut state.upgrades[idx];
    let player = &mut state.player;
    player.coins -= cost;
    match upgrade.effect {
        UpgradeEffect::TapPower => player.tap_power += upgrade.value,
        UpgradeEffect::CoinMultiplier => player.coin_multiplier += upgrade.value,
        UpgradeEffect::MaxEnergy => {
            let delta = upgrade.value.max(0.0) as u32;
            player.max_energy += delta;
            player.energy += delta;
        }
    }
    upgrade.cost = next_upgrade_cost(cost);
    upgrade.owned += 1;
    player.total_purchases += 1;

    let upgrade_name = upgrade.name.clone();
    let next_cost = upgrade.cost;
    let owned = upgrade.owned;
    let completed_quests = quests::record_event(&mut state.quests, QuestEvent::Purchase);

    Ok(PurchaseOutcome {
        upgrade_name,
        cost_paid: cost,
        next_cost,
        owned,
        completed_quests,
    })
}

pub fn claim_quest_reward(state: &mut TapverseState, id: &str) -> Result<ClaimOutcome, ActionError> {
    let quest = state
        .quests
        .iter_mut()
        .find(|q| q.id == id)
        .ok_or_else(|| ActionError::UnknownQuest(id.to_string()))?;

    match quest.status {
        QuestStatus::InProgress => return Err(ActionError::QuestNotComplete(id.to_string())),
        QuestStatus::Claimed => return Err(ActionError::AlreadyClaimed(id.to_string())),
        QuestStatus::Completed => {}
    }

    quest.status = QuestStatus::Claimed;
    let reward_coins = quest.reward_coins;
    let reward_xp = quest.reward_xp;

    state.player.coins += reward_coins;
    state.player.experience += reward_xp;
    let level_up = check_for_level_up(state);

    Ok(ClaimOutcome {
        reward_coins,
        reward_xp,
        level_up,
    })
}

/// Recompute the level from experience. On a level increase, unlock every
/// chapter and skin whose gate the new level meets.
pub fn check_for_level_up(state: &mut TapverseState) -> Option<LevelUp> {
    let new_level = PlayerState::level_for_experience(state.player.experience);
    if new_level <= state.player.level {
        return None;
    }
    state.player.level = new_level;
    let (new_chapters, new_skins) = unlock_for_level(state);
    log::info!("level up: {}", new_level);

    Some(LevelUp {
        level: new_level,
        new_chapters,
        new_skins,
    })
}

/// Union-unlock content gated at or below the current level. Returns what was new.
fn unlock_for_level(state: &mut TapverseState) -> (Vec<u32>, Vec<String>) {
    let level = state.player.level;
    let mut new_chapters = Vec::new();
    for chapter in state.chapters.iter().filter(|c| c.unlock_level <= level) {
        if state.player.unlocked_chapters.insert(chapter.id) {
            new_chapters.push(chapter.id);
        }
    }
    let mut new_skins = Vec::new();
    for skin in catalog::SKINS.iter().filter(|s| s.unlock_level <= level) {
        if state.player.unlocked_skins.insert(skin.id.to_string()) {
            new_skins.push(skin.id.to_string());
        }
    }
    (new_chapters, new_skins)
}

/// Restore every derived invariant after loading a snapshot.
pub fn repair_invariants(state: &mut TapverseState) {
    let player = &mut state.player;
    player.level = PlayerState::level_for_experience(player.experience);
    player.energy = player.energy.min(player.max_energy);
    if !player.coins.is_finite() || player.coins < 0.0 {
        player.coins = 0.0;
    }
    player.unlocked_chapters.insert(FIRST_CHAPTER);
    player.unlocked_skins.insert(DEFAULT_SKIN.to_string());
    unlock_for_level(state);

    let player = &mut state.player;
    if !player.unlocked_skins.contains(&player.selected_skin) {
        player.selected_skin = DEFAULT_SKIN.to_string();
    }
    if !player.unlocked_chapters.contains(&player.current_chapter) {
        player.current_chapter = FIRST_CHAPTER;
    }
    quests::refresh_all(&mut state.quests);
}

/// Add up to `amount` energy without passing the cap. Returns energy gained.
pub fn regen_energy(player: &mut PlayerState, amount: u32) -> u32 {
    let before = player.energy;
    player.energy = player.energy.saturating_add(amount).min(player.max_energy);
    player.energy - before
}

pub fn reset_energy(player: &mut PlayerState) {
    player.energy = player.max_energy;
}

pub fn change_skin(player: &mut PlayerState, skin: &str) -> Result<(), ActionError> {
    if catalog::skin(skin).is_none() {
        return Err(ActionError::UnknownSkin(skin.to_string()));
    }
    if !player.unlocked_skins.contains(skin) {
        return Err(ActionError::SkinLocked(skin.to_string()));
    }
    player.selected_skin = skin.to_string();
    Ok(())
}

fn ensure_chapter_open(state: &TapverseState, chapter: u32) -> Result<(), ActionError> {
    if state.chapter(chapter).is_none() {
        return Err(ActionError::UnknownChapter(chapter));
    }
    if !state.player.unlocked_chapters.contains(&chapter) {
        return Err(ActionError::ChapterLocked(chapter));
    }
    Ok(())
}

/// Mark a dialogue line as read. Returns true if it was unread before.
pub fn read_dialogue(
    state: &mut TapverseState,
    chapter: u32,
    dialogue: u32,
) -> Result<bool, ActionError> {
    ensure_chapter_open(state, chapter)?;
    let line = state
        .chapters
        .iter_mut()
        .find(|c| c.id == chapter)
        .and_then(|c| c.dialogues.iter_mut().find(|d| d.id == dialogue))
        .ok_or(ActionError::UnknownDialogue { chapter, dialogue })?;
    let newly_read = !line.read;
    line.read = true;
    Ok(newly_read)
}

pub fn select_chapter(state: &mut TapverseState, chapter: u32) -> Result<(), ActionError> {
    ensure_chapter_open(state, chapter)?;
    state.player.current_chapter = chapter;
    Ok(())
}

/// Count a finished ad. Returns ids of quests this completed.
pub fn record_ad_watch(state: &mut TapverseState) -> Vec<String> {
    let player = &mut state.player;
    player.daily_ads_watched += 1;
    player.weekly_ads_watched += 1;
    player.total_ads_watched += 1;
    quests::record_event(&mut state.quests, QuestEvent::AdWatched)
}

/// A game is playable when the level gate is met or an ad unlock is live.
pub fn is_game_available(player: &PlayerState, game: &catalog::ArcadeGame, now: Millis) -> bool {
    player.level >= game.unlock_level || player.is_temp_unlocked(game.id, now)
}

/// Format a number with comma separators for display.
pub fn format_number(n: f64) -> String {
    if n < 0.0 {
        return format!("-{}", format_number(-n));
    }
    // Round once, so 3.96 carries into "4" instead of dropping to "3".
    let in_tenths = (n * 10.0).round() as u64;
    let (int_part, tenths) = (in_tenths / 10, in_tenths % 10);

    let s = int_part.to_string();
    let mut result = String::new();
    for (i, c) in s.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            result.push(',');
        }
        result.push(c);
    }
    let result: String = result.chars().rev().collect();

    if tenths > 0 {
        format!("{}.{}", result, tenths)
    } else {
        result
    }
}
