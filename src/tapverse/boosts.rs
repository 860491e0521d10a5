//! Timed boosts and temporary arcade unlocks.
//!
//! Both expire lazily: nothing fires at `end_time`. Reads compare against
//! `now`, and `expire_*` clears stale entries on the next evaluation pass.

use crate::time::{Millis, MS_PER_SECOND};

use super::catalog;
use super::logic::{self, ActionError};
use super::state::{BoostKind, PlayerState, TempUnlock};

/// Fails if the channel is live at `now`. A stale flag counts as inactive.
pub fn ensure_boost_available(
    player: &PlayerState,
    kind: BoostKind,
    now: Millis,
) -> Result<(), ActionError> {
    if player.is_boost_active(kind, now) {
        return Err(ActionError::BoostAlreadyActive(kind));
    }
    Ok(())
}

/// Start a boost. Returns its end time.
pub fn apply_boost(
    player: &mut PlayerState,
    kind: BoostKind,
    duration_secs: u32,
    now: Millis,
) -> Result<Millis, ActionError> {
    if duration_secs == 0 {
        return Err(ActionError::InvalidDuration);
    }
    ensure_boost_available(player, kind, now)?;

    let end_time = now + Millis::from(duration_secs) * MS_PER_SECOND;
    let boost = player.boosts.get_mut(kind);
    boost.active = true;
    boost.end_time = end_time;
    log::debug!("{} active until {}", kind, end_time);
    Ok(end_time)
}

/// Clear every boost whose end time has passed. Returns the expired channels.
pub fn expire_boosts(player: &mut PlayerState, now: Millis) -> Vec<BoostKind> {
    let mut expired = Vec::new();
    for &kind in BoostKind::all() {
        let boost = player.boosts.get_mut(kind);
        if boost.active && now >= boost.end_time {
            boost.active = false;
            expired.push(kind);
        }
    }
    expired
}

/// Fails unless the game exists and is currently locked for this player.
pub fn ensure_game_locked(
    player: &PlayerState,
    game_id: &str,
    now: Millis,
) -> Result<(), ActionError> {
    let game = catalog::arcade_game(game_id)
        .ok_or_else(|| ActionError::UnknownGame(game_id.to_string()))?;
    if logic::is_game_available(player, game, now) {
        return Err(ActionError::GameAlreadyUnlocked(game_id.to_string()));
    }
    Ok(())
}

/// Make a locked game playable for `duration_secs`. Returns the end time.
pub fn unlock_game(
    player: &mut PlayerState,
    game_id: &str,
    duration_secs: u32,
    now: Millis,
) -> Result<Millis, ActionError> {
    if duration_secs == 0 {
        return Err(ActionError::InvalidDuration);
    }
    ensure_game_locked(player, game_id, now)?;

    let unlock_end_time = now + Millis::from(duration_secs) * MS_PER_SECOND;
    // A stale entry for the same game is replaced, not duplicated.
    player
        .temp_unlocked_arcade_games
        .retain(|u| u.game_id != game_id);
    player.temp_unlocked_arcade_games.push(TempUnlock {
        game_id: game_id.to_string(),
        unlock_end_time,
    });
    Ok(unlock_end_time)
}

/// Drop expired temporary unlocks. Returns the ids that expired.
pub fn expire_temp_unlocks(player: &mut PlayerState, now: Millis) -> Vec<String> {
    let (live, expired): (Vec<TempUnlock>, Vec<TempUnlock>) = player
        .temp_unlocked_arcade_games
        .drain(..)
        .partition(|u| now < u.unlock_end_time);
    player.temp_unlocked_arcade_games = live;
    expired.into_iter().map(|u| u.game_id).collect()
}
