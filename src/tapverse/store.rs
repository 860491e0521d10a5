//! The engine handle.
//!
//! `GameStore` is constructed once per session and owns the game state, the
//! storage it persists to, the clock and every polled timer. The
//! presentation layer only reaches state through `state()` and the mutators
//! below. Every successful mutation is written through to storage.

use crate::config::EngineConfig;
use crate::time::{Clock, Interval, Millis};

use super::boosts;
use super::buddy::{self, Buddy};
use super::logic::{self, ActionError, ClaimOutcome, LevelUp, PurchaseOutcome, TapOutcome};
use super::rhythm::{BeatPattern, RhythmHit, RhythmTracker};
use super::rollover::{self, RolloverReport};
use super::save::{self, KeyValueStore, SavedSession};
use super::state::{BoostKind, TapverseState};

/// What a finished ad grants.
#[derive(Debug, Clone, PartialEq)]
pub enum AdReward {
    Plain,
    Boost { kind: BoostKind },
    ArcadeUnlock { game_id: String },
}

impl AdReward {
    pub fn describe(&self) -> String {
        match self {
            AdReward::Plain => "Sponsor bonus".to_string(),
            AdReward::Boost { kind } => kind.name().to_string(),
            AdReward::ArcadeUnlock { game_id } => format!("Unlock {}", game_id),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PendingAd {
    pub reward: AdReward,
    pub started_at: Millis,
    pub ends_at: Millis,
}

impl PendingAd {
    /// Fraction of the ad already shown, 0.0..=1.0.
    pub fn progress(&self, now: Millis) -> f64 {
        let total = (self.ends_at - self.started_at).max(1) as f64;
        ((now - self.started_at) as f64 / total).clamp(0.0, 1.0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AdCompletion {
    pub reward: AdReward,
    /// End time of the boost or unlock granted, or why it could not be granted.
    pub granted_until: Result<Option<Millis>, ActionError>,
    pub completed_quests: Vec<String>,
}

/// Everything one poll changed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickReport {
    pub expired_boosts: Vec<BoostKind>,
    pub expired_unlocks: Vec<String>,
    pub ad_completed: Option<AdCompletion>,
    pub energy_gained: u32,
    pub auto_taps: u32,
    pub completed_quests: Vec<String>,
    pub level_up: Option<LevelUp>,
}

impl TickReport {
    fn changed_state(&self) -> bool {
        self.energy_gained > 0
            || self.auto_taps > 0
            || !self.expired_boosts.is_empty()
            || !self.expired_unlocks.is_empty()
            || self.ad_completed.is_some()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TapReport {
    pub outcome: TapOutcome,
    /// Rhythm judgement, None while rhythm mode is off.
    pub rhythm: Option<RhythmHit>,
}

pub struct GameStore<S: KeyValueStore, C: Clock> {
    state: TapverseState,
    storage: S,
    clock: C,
    config: EngineConfig,
    regen: Interval,
    auto_tap: Interval,
    rhythm: RhythmTracker,
    buddy: Buddy,
    pending_ad: Option<PendingAd>,
    onboarding_completed: bool,
    rollover: RolloverReport,
}

impl<S: KeyValueStore, C: Clock> GameStore<S, C> {
    /// Load the saved session (or defaults), run the daily/weekly rollover,
    /// clear anything that expired while the game was closed and persist.
    pub fn open(storage: S, clock: C, config: EngineConfig) -> Self {
        let now = clock.now_ms();
        let SavedSession {
            mut state,
            ai_name,
            onboarding_completed,
        } = save::load_session(&storage);

        let rollover = rollover::apply_rollover(&mut state, clock.today(), config.week_start);
        boosts::expire_boosts(&mut state.player, now);
        boosts::expire_temp_unlocks(&mut state.player, now);

        let seed = (now as u64) ^ 0x9E37_79B9_7F4A_7C15;
        let name = match ai_name {
            Some(name) => name,
            None => {
                let name = buddy::pick_name(seed).to_string();
                if let Err(e) = save::save_ai_name(&storage, &name) {
                    log::warn!("could not save companion name: {}", e);
                }
                name
            }
        };
        let mut buddy = Buddy::new(name, seed);
        buddy.greet(now, config.buddy_message_ms);

        let mut regen = Interval::new(config.energy_regen_interval_ms, config.max_catch_up_ms);
        regen.reset(now);
        let mut auto_tap = Interval::new(config.auto_tap_interval_ms, config.max_catch_up_ms);
        auto_tap.reset(now);

        let store = Self {
            state,
            storage,
            clock,
            config,
            regen,
            auto_tap,
            rhythm: RhythmTracker::new(),
            buddy,
            pending_ad: None,
            onboarding_completed,
            rollover,
        };
        store.persist();
        log::info!(
            "session opened: level {}, {} coins, streak {}",
            store.state.player.level,
            logic::format_number(store.state.player.coins),
            store.state.player.streak_days
        );
        store
    }

    // ── Read access ─────────────────────────────────────────────

    pub fn state(&self) -> &TapverseState {
        &self.state
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn now(&self) -> Millis {
        self.clock.now_ms()
    }

    pub fn rhythm(&self) -> &RhythmTracker {
        &self.rhythm
    }

    pub fn buddy(&self) -> &Buddy {
        &self.buddy
    }

    pub fn pending_ad(&self) -> Option<&PendingAd> {
        self.pending_ad.as_ref()
    }

    pub fn onboarding_completed(&self) -> bool {
        self.onboarding_completed
    }

    pub fn rollover(&self) -> RolloverReport {
        self.rollover
    }

    /// Milliseconds until the next energy point, None when energy is full.
    pub fn next_energy_in(&self) -> Option<Millis> {
        let p = &self.state.player;
        (p.energy < p.max_energy).then(|| self.regen.remaining_ms())
    }

    fn persist(&self) {
        if let Err(e) = save::save_all(&self.storage, &self.state) {
            log::warn!("save failed: {}", e);
        }
    }

    // ── Mutators ────────────────────────────────────────────────

    pub fn tap(&mut self) -> Result<TapReport, ActionError> {
        if self.state.player.energy == 0 {
            return Err(ActionError::OutOfEnergy);
        }
        let now = self.clock.now_ms();
        let rhythm = self.rhythm.judge(now);
        let bonus = rhythm.map_or(1.0, |hit| hit.bonus);
        let outcome = logic::tap_with_bonus(&mut self.state, now, bonus)?;
        self.buddy.maybe_chatter(
            self.config.buddy_chatter_percent,
            now,
            self.config.buddy_message_ms,
        );
        self.persist();
        Ok(TapReport { outcome, rhythm })
    }

    pub fn buy_upgrade(&mut self, id: &str) -> Result<PurchaseOutcome, ActionError> {
        let outcome = logic::buy_upgrade(&mut self.state, id)?;
        self.buddy.praise_upgrade(
            &outcome.upgrade_name,
            self.clock.now_ms(),
            self.config.buddy_message_ms,
        );
        self.persist();
        Ok(outcome)
    }

    /// Start a boost directly. Ads go through `watch_ad`.
    pub fn apply_boost(&mut self, kind: BoostKind, duration_secs: u32) -> Result<Millis, ActionError> {
        let end = boosts::apply_boost(&mut self.state.player, kind, duration_secs, self.clock.now_ms())?;
        if kind == BoostKind::Auto {
            self.auto_tap.reset(self.clock.now_ms());
        }
        self.persist();
        Ok(end)
    }

    pub fn claim_quest_reward(&mut self, id: &str) -> Result<ClaimOutcome, ActionError> {
        let outcome = logic::claim_quest_reward(&mut self.state, id)?;
        self.persist();
        Ok(outcome)
    }

    pub fn read_dialogue(&mut self, chapter: u32, dialogue: u32) -> Result<bool, ActionError> {
        let newly_read = logic::read_dialogue(&mut self.state, chapter, dialogue)?;
        if newly_read {
            self.persist();
        }
        Ok(newly_read)
    }

    pub fn select_chapter(&mut self, chapter: u32) -> Result<(), ActionError> {
        logic::select_chapter(&mut self.state, chapter)?;
        self.persist();
        Ok(())
    }

    pub fn change_skin(&mut self, skin: &str) -> Result<(), ActionError> {
        logic::change_skin(&mut self.state.player, skin)?;
        self.persist();
        Ok(())
    }

    pub fn reset_energy(&mut self) {
        logic::reset_energy(&mut self.state.player);
        self.persist();
    }

    /// Start a simulated ad. Preconditions for the reward are checked now;
    /// the reward itself is granted when the ad finishes. Returns the end time.
    pub fn watch_ad(&mut self, reward: AdReward) -> Result<Millis, ActionError> {
        if self.pending_ad.is_some() {
            return Err(ActionError::AdInProgress);
        }
        let now = self.clock.now_ms();
        match &reward {
            AdReward::Plain => {}
            AdReward::Boost { kind } => {
                boosts::ensure_boost_available(&self.state.player, *kind, now)?
            }
            AdReward::ArcadeUnlock { game_id } => {
                boosts::ensure_game_locked(&self.state.player, game_id, now)?
            }
        }
        let ends_at = now + Millis::from(self.config.ad_duration_ms);
        log::debug!("ad started: {}", reward.describe());
        self.pending_ad = Some(PendingAd {
            reward,
            started_at: now,
            ends_at,
        });
        Ok(ends_at)
    }

    pub fn unlock_game_with_ad(&mut self, game_id: &str) -> Result<Millis, ActionError> {
        self.watch_ad(AdReward::ArcadeUnlock {
            game_id: game_id.to_string(),
        })
    }

    pub fn complete_onboarding(&mut self) {
        self.onboarding_completed = true;
        if let Err(e) = save::save_onboarding_completed(&self.storage) {
            log::warn!("could not save onboarding flag: {}", e);
        }
    }

    /// Wipe saved progress and start over. The companion keeps its name.
    pub fn reset_progress(&mut self) {
        if let Err(e) = save::clear_progress(&self.storage) {
            log::warn!("could not clear saved progress: {}", e);
        }
        let now = self.clock.now_ms();
        self.state = TapverseState::new();
        self.rollover =
            rollover::apply_rollover(&mut self.state, self.clock.today(), self.config.week_start);
        self.pending_ad = None;
        self.regen.reset(now);
        self.auto_tap.reset(now);
        self.persist();
        log::info!("progress reset");
    }

    pub fn toggle_rhythm(&mut self) -> bool {
        self.rhythm.toggle(self.clock.now_ms())
    }

    pub fn cycle_rhythm_pattern(&mut self) -> &'static BeatPattern {
        self.rhythm.cycle_pattern(self.clock.now_ms())
    }

    // ── Polling ─────────────────────────────────────────────────

    /// Advance every time-driven rule to the current clock. Called once per frame.
    pub fn tick(&mut self) -> TickReport {
        let now = self.clock.now_ms();
        let mut report = TickReport::default();

        // Auto-tap runs before expiry so taps owed up to the boost's end
        // still count when the poll lands after it.
        let auto = self.state.player.boosts.get(BoostKind::Auto);
        let (auto_active, auto_end) = (auto.active, auto.end_time);
        if auto_active {
            let until = now.min(auto_end);
            let fires = self.auto_tap.update(until);
            for _ in 0..fires {
                match logic::tap(&mut self.state, until) {
                    Ok(out) => {
                        report.auto_taps += 1;
                        report.completed_quests.extend(out.completed_quests);
                        if out.level_up.is_some() {
                            report.level_up = out.level_up;
                        }
                    }
                    Err(_) => break,
                }
            }
        } else {
            self.auto_tap.reset(now);
        }

        report.expired_boosts = boosts::expire_boosts(&mut self.state.player, now);
        report.expired_unlocks = boosts::expire_temp_unlocks(&mut self.state.player, now);
        for kind in &report.expired_boosts {
            log::debug!("{} expired", kind);
        }

        if self.pending_ad.as_ref().is_some_and(|ad| now >= ad.ends_at) {
            if let Some(ad) = self.pending_ad.take() {
                report.ad_completed = Some(self.finish_ad(ad.reward, now));
            }
        }

        let fires = self.regen.update(now);
        if fires > 0 {
            report.energy_gained = logic::regen_energy(
                &mut self.state.player,
                fires.saturating_mul(self.config.energy_regen_amount),
            );
        }

        self.rhythm.advance(now);
        self.buddy.expire(now);

        if report.changed_state() {
            self.persist();
        }
        report
    }

    fn finish_ad(&mut self, reward: AdReward, now: Millis) -> AdCompletion {
        let completed_quests = logic::record_ad_watch(&mut self.state);
        let granted_until = match &reward {
            AdReward::Plain => Ok(None),
            AdReward::Boost { kind } => {
                let secs = self.config.boost_durations.for_kind(*kind);
                self.apply_boost(*kind, secs).map(Some)
            }
            AdReward::ArcadeUnlock { game_id } => boosts::unlock_game(
                &mut self.state.player,
                game_id,
                self.config.arcade_unlock_secs,
                now,
            )
            .map(Some),
        };
        match &granted_until {
            Ok(_) => log::info!("ad finished: {}", reward.describe()),
            Err(e) => log::warn!("ad finished but {} was not granted: {}", reward.describe(), e),
        }
        AdCompletion {
            reward,
            granted_until,
            completed_quests,
        }
    }

    #[cfg(test)]
    pub fn into_storage(self) -> S {
        self.storage
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tapverse::save::{MemoryStorage, SaveError, AI_NAME_KEY, GAME_STATE_KEY};
    use crate::tapverse::rhythm::Judgement;
    use crate::tapverse::rollover::StreakChange;
    use crate::tapverse::state::QuestStatus;
    use crate::time::{ManualClock, MS_PER_DAY};

    fn open_at(storage: MemoryStorage, clock: &ManualClock) -> GameStore<MemoryStorage, ManualClock> {
        GameStore::open(storage, clock.clone(), EngineConfig::default())
    }

    fn fresh() -> (GameStore<MemoryStorage, ManualClock>, ManualClock) {
        let clock = ManualClock::at_date(2024, 5, 1);
        (open_at(MemoryStorage::new(), &clock), clock)
    }

    #[test]
    fn fresh_session_starts_streak_and_names_companion() {
        let (store, _) = fresh();
        assert_eq!(store.state().player.streak_days, 1);
        assert_eq!(store.rollover().streak, StreakChange::Started);
        assert!(buddy::AI_NAMES.contains(&store.buddy().name.as_str()));
        let storage = store.into_storage();
        assert!(storage.get_item(AI_NAME_KEY).unwrap().is_some());
        assert!(storage.get_item(GAME_STATE_KEY).unwrap().is_some());
    }

    #[test]
    fn tap_is_written_through() {
        let (mut store, clock) = fresh();
        store.tap().unwrap();
        let name = store.buddy().name.clone();
        let storage = store.into_storage();

        let store = open_at(storage, &clock);
        assert_eq!(store.state().player.coins, 1.0);
        assert_eq!(store.state().player.energy, 99);
        assert_eq!(store.buddy().name, name);
    }

    #[test]
    fn double_boost_scenario() {
        let (mut store, clock) = fresh();
        store.apply_boost(BoostKind::Double, 60).unwrap();
        assert_eq!(store.tap().unwrap().outcome.coins_earned, 2.0);

        clock.advance(59_999);
        assert!(store.tick().expired_boosts.is_empty());
        assert_eq!(store.tap().unwrap().outcome.coins_earned, 2.0);

        clock.advance(1);
        assert_eq!(store.tick().expired_boosts, vec![BoostKind::Double]);
        assert_eq!(store.tap().unwrap().outcome.coins_earned, 1.0);
    }

    #[test]
    fn live_boost_rejected() {
        let (mut store, _) = fresh();
        store.apply_boost(BoostKind::Power, 30).unwrap();
        assert_eq!(
            store.apply_boost(BoostKind::Power, 30),
            Err(ActionError::BoostAlreadyActive(BoostKind::Power))
        );
    }

    #[test]
    fn energy_regenerates_every_five_seconds() {
        let (mut store, clock) = fresh();
        for _ in 0..10 {
            store.tap().unwrap();
        }
        assert_eq!(store.state().player.energy, 90);
        clock.advance(4_999);
        assert_eq!(store.tick().energy_gained, 0);
        clock.advance(1);
        assert_eq!(store.tick().energy_gained, 1);
        assert_eq!(store.state().player.energy, 91);
    }

    #[test]
    fn long_absence_catch_up_is_capped() {
        let (mut store, clock) = fresh();
        store.reset_energy();
        for _ in 0..50 {
            store.tap().unwrap();
        }
        clock.advance(3_600_000);
        // 60s cap / 5s period
        assert_eq!(store.tick().energy_gained, 12);
        assert_eq!(store.state().player.energy, 62);
    }

    #[test]
    fn auto_tap_runs_while_boost_is_live() {
        let (mut store, clock) = fresh();
        store.apply_boost(BoostKind::Auto, 30).unwrap();
        clock.advance(1_000);
        assert_eq!(store.tick().auto_taps, 1);
        assert_eq!(store.state().player.coins, 1.0);
        clock.advance(5_000);
        assert_eq!(store.tick().auto_taps, 5);
        assert_eq!(store.state().player.total_taps, 6);

        clock.advance(24_000);
        let report = store.tick();
        assert_eq!(report.expired_boosts, vec![BoostKind::Auto]);
        let taps = store.state().player.total_taps;
        clock.advance(5_000);
        assert_eq!(store.tick().auto_taps, 0);
        assert_eq!(store.state().player.total_taps, taps);
    }

    #[test]
    fn late_poll_pays_auto_taps_up_to_the_boost_end() {
        let (mut store, clock) = fresh();
        store.apply_boost(BoostKind::Auto, 30).unwrap();
        clock.advance(6_000);
        assert_eq!(store.tick().auto_taps, 6);

        // Next frame arrives well after the boost ended.
        clock.advance(40_000);
        let report = store.tick();
        assert_eq!(report.auto_taps, 24);
        assert_eq!(report.expired_boosts, vec![BoostKind::Auto]);
        assert_eq!(store.state().player.total_taps, 30);

        clock.advance(5_000);
        assert_eq!(store.tick().auto_taps, 0);
        assert_eq!(store.state().player.total_taps, 30);
    }

    #[test]
    fn auto_tap_stops_without_energy() {
        let (mut store, clock) = fresh();
        for _ in 0..98 {
            store.tap().unwrap();
        }
        store.apply_boost(BoostKind::Auto, 30).unwrap();
        clock.advance(4_000);
        assert_eq!(store.tick().auto_taps, 2);
        assert_eq!(store.state().player.energy, 0);
    }

    #[test]
    fn boost_ad_grants_after_delay() {
        let (mut store, clock) = fresh();
        let ends = store.watch_ad(AdReward::Boost { kind: BoostKind::Power }).unwrap();
        assert_eq!(ends, clock.now_ms() + 2_000);
        assert_eq!(
            store.watch_ad(AdReward::Plain),
            Err(ActionError::AdInProgress)
        );

        clock.advance(1_999);
        assert!(store.tick().ad_completed.is_none());
        assert!(!store.state().player.is_boost_active(BoostKind::Power, clock.now_ms()));

        clock.advance(1);
        let done = store.tick().ad_completed.unwrap();
        assert_eq!(done.granted_until, Ok(Some(clock.now_ms() + 30_000)));
        assert!(done.completed_quests.contains(&"daily-ad".to_string()));
        let p = &store.state().player;
        assert!(p.is_boost_active(BoostKind::Power, clock.now_ms()));
        assert_eq!(p.daily_ads_watched, 1);
        assert_eq!(p.total_ads_watched, 1);
        assert!(store.pending_ad().is_none());
    }

    #[test]
    fn boost_ad_checked_when_started() {
        let (mut store, _) = fresh();
        store.apply_boost(BoostKind::Double, 60).unwrap();
        assert_eq!(
            store.watch_ad(AdReward::Boost { kind: BoostKind::Double }),
            Err(ActionError::BoostAlreadyActive(BoostKind::Double))
        );
        assert!(store.pending_ad().is_none());
    }

    #[test]
    fn ad_reward_that_became_invalid_still_counts_the_ad() {
        let (mut store, clock) = fresh();
        store.watch_ad(AdReward::Boost { kind: BoostKind::Power }).unwrap();
        store.apply_boost(BoostKind::Power, 30).unwrap();
        clock.advance(2_000);
        let done = store.tick().ad_completed.unwrap();
        assert_eq!(
            done.granted_until,
            Err(ActionError::BoostAlreadyActive(BoostKind::Power))
        );
        assert_eq!(store.state().player.total_ads_watched, 1);
    }

    #[test]
    fn arcade_unlock_ad_and_expiry() {
        let (mut store, clock) = fresh();
        assert!(matches!(
            store.unlock_game_with_ad("pinball"),
            Err(ActionError::UnknownGame(_))
        ));
        store.unlock_game_with_ad("memory-match").unwrap();
        clock.advance(2_000);
        store.tick();
        assert!(store.state().player.is_temp_unlocked("memory-match", clock.now_ms()));

        clock.advance(1_800_000 - 1);
        assert!(store.tick().expired_unlocks.is_empty());
        clock.advance(1);
        assert_eq!(store.tick().expired_unlocks, vec!["memory-match".to_string()]);
    }

    #[test]
    fn next_day_rolls_over_on_open() {
        let (mut store, clock) = fresh();
        for _ in 0..5 {
            store.tap().unwrap();
        }
        let storage = store.into_storage();

        clock.advance(MS_PER_DAY);
        let store = open_at(storage, &clock);
        assert_eq!(store.rollover().streak, StreakChange::Continued);
        assert_eq!(store.state().player.streak_days, 2);
        assert_eq!(store.state().player.daily_taps, 0);
        assert_eq!(store.state().player.total_taps, 5);
    }

    #[test]
    fn boost_that_expired_while_closed_is_cleared_on_open() {
        let (mut store, clock) = fresh();
        store.apply_boost(BoostKind::Power, 30).unwrap();
        let storage = store.into_storage();
        clock.advance(31_000);
        let store = open_at(storage, &clock);
        assert!(!store.state().player.boosts.power.active);
    }

    #[test]
    fn claim_through_store() {
        let (mut store, _) = fresh();
        store.watch_ad(AdReward::Plain).unwrap();
        assert!(matches!(
            store.claim_quest_reward("daily-ad"),
            Err(ActionError::QuestNotComplete(_))
        ));
    }

    #[test]
    fn purchase_makes_buddy_cheer() {
        let (mut store, clock) = fresh();
        for _ in 0..10 {
            store.tap().unwrap();
        }
        store.buy_upgrade("tap-power").unwrap();
        let msg = store.buddy().current(clock.now_ms()).unwrap();
        assert_eq!(msg.text, "Great job upgrading your Tap Power!");
        assert_eq!(store.state().player.tap_power, 2.0);
    }

    #[test]
    fn rhythm_tap_on_the_beat_earns_bonus() {
        let (mut store, _) = fresh();
        assert!(store.toggle_rhythm());
        let report = store.tap().unwrap();
        let hit = report.rhythm.unwrap();
        assert_eq!(hit.judgement, Judgement::Perfect);
        assert!((report.outcome.coins_earned - 1.8).abs() < 1e-9);
    }

    #[test]
    fn empty_energy_does_not_break_combo() {
        let (mut store, _) = fresh();
        store.toggle_rhythm();
        store.tap().unwrap();
        for _ in 0..99 {
            store.tap().unwrap();
        }
        let combo = store.rhythm().combo;
        assert_eq!(store.tap(), Err(ActionError::OutOfEnergy));
        assert_eq!(store.rhythm().combo, combo);
    }

    #[test]
    fn reset_progress_restarts_but_keeps_name() {
        let (mut store, clock) = fresh();
        for _ in 0..10 {
            store.tap().unwrap();
        }
        let name = store.buddy().name.clone();
        store.reset_progress();
        assert_eq!(store.state().player.coins, 0.0);
        assert_eq!(store.state().player.streak_days, 1);

        let store = open_at(store.into_storage(), &clock);
        assert_eq!(store.state().player.total_taps, 0);
        assert_eq!(store.buddy().name, name);
    }

    #[test]
    fn onboarding_flag_persists() {
        let (mut store, clock) = fresh();
        assert!(!store.onboarding_completed());
        store.complete_onboarding();
        let store = open_at(store.into_storage(), &clock);
        assert!(store.onboarding_completed());
    }

    #[test]
    fn story_progress_persists() {
        let (mut store, clock) = fresh();
        assert_eq!(store.read_dialogue(1, 1), Ok(true));
        assert_eq!(store.select_chapter(2), Err(ActionError::ChapterLocked(2)));
        let store = open_at(store.into_storage(), &clock);
        assert!(store.state().chapter(1).unwrap().dialogues[0].read);
    }

    #[test]
    fn quest_claim_flow() {
        let (mut store, _) = fresh();
        store.watch_ad(AdReward::Plain).unwrap();
        let clock = store.clock.clone();
        clock.advance(2_000);
        store.tick();
        assert_eq!(
            store.state().quest("daily-ad").unwrap().status,
            QuestStatus::Completed
        );
        let out = store.claim_quest_reward("daily-ad").unwrap();
        assert_eq!(store.state().player.coins, out.reward_coins);
    }

    struct FailingStorage;

    impl KeyValueStore for FailingStorage {
        fn get_item(&self, _key: &str) -> Result<Option<String>, SaveError> {
            Err(SaveError::Storage("quota".into()))
        }

        fn set_item(&self, _key: &str, _value: &str) -> Result<(), SaveError> {
            Err(SaveError::Storage("quota".into()))
        }

        fn remove_item(&self, _key: &str) -> Result<(), SaveError> {
            Err(SaveError::Storage("quota".into()))
        }
    }

    #[test]
    fn storage_failures_do_not_stop_play() {
        let clock = ManualClock::at_date(2024, 5, 1);
        let mut store = GameStore::open(FailingStorage, clock, EngineConfig::default());
        store.tap().unwrap();
        store.reset_progress();
        assert_eq!(store.state().player.coins, 0.0);
    }
}
