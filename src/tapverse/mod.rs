//! TapVerse: tap for coins, buy upgrades, finish quests and follow the story.
//!
//! `TapverseGame` is the presentation shell. It owns the `GameStore`, turns
//! keys and clicks into store mutators and keeps the on-screen log. All game
//! rules live in the store and the pure modules below it.

pub mod actions;
pub mod boosts;
pub mod buddy;
pub mod catalog;
pub mod logic;
pub mod quests;
pub mod render;
pub mod rhythm;
pub mod rollover;
pub mod save;
#[cfg(test)]
mod simulator;
pub mod state;
pub mod store;

use std::cell::RefCell;
use std::rc::Rc;

use ratzilla::ratatui::layout::Rect;
use ratzilla::ratatui::Frame;

use crate::input::{ClickState, InputEvent};
use crate::time::Clock;

use actions::*;
use logic::{format_number, ActionError, LevelUp};
use rhythm::RhythmHit;
use rollover::StreakChange;
use save::KeyValueStore;
use state::{BoostKind, Speaker};
use store::{AdReward, GameStore, TickReport};

const MAX_LOG: usize = 30;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Tab {
    Tap,
    Shop,
    Quests,
    Story,
    Arcade,
    Profile,
}

impl Tab {
    pub const ALL: [Tab; 6] = [
        Tab::Tap,
        Tab::Shop,
        Tab::Quests,
        Tab::Story,
        Tab::Arcade,
        Tab::Profile,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Tab::Tap => "Tap",
            Tab::Shop => "Shop",
            Tab::Quests => "Quests",
            Tab::Story => "Story",
            Tab::Arcade => "Arcade",
            Tab::Profile => "Profile",
        }
    }

    /// Keyboard shortcut, shown in the tab bar.
    pub fn key(self) -> char {
        match self {
            Tab::Tap => 'h',
            Tab::Shop => 's',
            Tab::Quests => 'q',
            Tab::Story => 'y',
            Tab::Arcade => 'a',
            Tab::Profile => 'p',
        }
    }

    pub fn action_id(self) -> u16 {
        match self {
            Tab::Tap => TAB_TAP,
            Tab::Shop => TAB_SHOP,
            Tab::Quests => TAB_QUESTS,
            Tab::Story => TAB_STORY,
            Tab::Arcade => TAB_ARCADE,
            Tab::Profile => TAB_PROFILE,
        }
    }

    fn from_key(c: char) -> Option<Tab> {
        Tab::ALL.into_iter().find(|t| t.key() == c)
    }

    fn from_action(id: u16) -> Option<Tab> {
        Tab::ALL.into_iter().find(|t| t.action_id() == id)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct LogEntry {
    pub text: String,
    pub important: bool,
}

pub struct TapverseGame<S: KeyValueStore, C: Clock> {
    pub store: GameStore<S, C>,
    pub tab: Tab,
    pub log: Vec<LogEntry>,
    /// Judgement of the latest tap while rhythm mode is on.
    pub last_hit: Option<RhythmHit>,
    /// Armed by the first reset press; the next press wipes progress.
    pub confirm_reset: bool,
}

impl<S: KeyValueStore, C: Clock> TapverseGame<S, C> {
    pub fn new(store: GameStore<S, C>) -> Self {
        let mut game = Self {
            store,
            tab: Tab::Tap,
            log: Vec::new(),
            last_hit: None,
            confirm_reset: false,
        };
        let rollover = game.store.rollover();
        let streak = game.store.state().player.streak_days;
        match rollover.streak {
            StreakChange::Started => game.add_log("Welcome to TapVerse!", true),
            StreakChange::Continued => game.add_log(format!("Day {} streak!", streak), true),
            StreakChange::Reset => game.add_log("Welcome back! Your streak starts again.", false),
            StreakChange::Unchanged => game.add_log("Welcome back!", false),
        }
        if rollover.new_week {
            game.add_log("A new week: weekly quests have reset.", false);
        }
        game
    }

    pub fn add_log(&mut self, text: impl Into<String>, important: bool) {
        self.log.push(LogEntry {
            text: text.into(),
            important,
        });
        if self.log.len() > MAX_LOG {
            let excess = self.log.len() - MAX_LOG;
            self.log.drain(..excess);
        }
    }

    /// Handle an input event. Returns true if the event was consumed.
    pub fn handle_input(&mut self, event: &InputEvent) -> bool {
        if !self.store.onboarding_completed() {
            // The intro overlay swallows input until dismissed.
            if matches!(event, InputEvent::Key(_) | InputEvent::Click(DISMISS_ONBOARDING)) {
                self.store.complete_onboarding();
                return true;
            }
            return false;
        }

        let confirming = std::mem::take(&mut self.confirm_reset);
        match event {
            InputEvent::Key(c) => self.handle_key(*c, confirming),
            InputEvent::Click(id) => self.handle_click(*id, confirming),
        }
    }

    fn handle_key(&mut self, key: char, confirming: bool) -> bool {
        if let Some(tab) = Tab::from_key(key) {
            self.tab = tab;
            return true;
        }
        match key {
            't' | ' ' => {
                self.tap();
                true
            }
            'w' => {
                self.watch_ad(AdReward::Plain);
                true
            }
            'r' if self.tab == Tab::Tap => {
                self.toggle_rhythm();
                true
            }
            'n' if self.tab == Tab::Tap => {
                self.cycle_pattern();
                true
            }
            'n' if self.tab == Tab::Story => {
                self.read_next();
                true
            }
            'e' if self.tab == Tab::Profile => {
                self.reset_energy();
                true
            }
            'x' if self.tab == Tab::Profile => {
                self.press_reset(confirming);
                true
            }
            '1'..='9' => {
                let index = (key as u8 - b'1') as usize;
                self.select_index(index)
            }
            _ => false,
        }
    }

    fn handle_click(&mut self, action_id: u16, confirming: bool) -> bool {
        if let Some(tab) = Tab::from_action(action_id) {
            self.tab = tab;
            return true;
        }
        match action_id {
            TAP => self.tap(),
            WATCH_AD => self.watch_ad(AdReward::Plain),
            TOGGLE_RHYTHM => self.toggle_rhythm(),
            CYCLE_PATTERN => self.cycle_pattern(),
            READ_NEXT => self.read_next(),
            RESET_ENERGY => self.reset_energy(),
            RESET_PROGRESS => self.press_reset(confirming),
            id if (BOOST_AD_BASE..BOOST_AD_BASE + 10).contains(&id) => {
                return self.boost_ad((id - BOOST_AD_BASE) as usize);
            }
            id if (BUY_UPGRADE_BASE..BUY_UPGRADE_BASE + 100).contains(&id) => {
                return self.buy((id - BUY_UPGRADE_BASE) as usize);
            }
            id if (CLAIM_QUEST_BASE..CLAIM_QUEST_BASE + 100).contains(&id) => {
                return self.claim((id - CLAIM_QUEST_BASE) as usize);
            }
            id if (SELECT_CHAPTER_BASE..READ_NEXT).contains(&id) => {
                return self.select_chapter((id - SELECT_CHAPTER_BASE) as usize);
            }
            id if (UNLOCK_GAME_BASE..UNLOCK_GAME_BASE + 100).contains(&id) => {
                return self.arcade((id - UNLOCK_GAME_BASE) as usize);
            }
            id if (SELECT_SKIN_BASE..RESET_ENERGY).contains(&id) => {
                return self.select_skin((id - SELECT_SKIN_BASE) as usize);
            }
            _ => return false,
        }
        true
    }

    /// Number keys pick the n-th item on the current tab.
    fn select_index(&mut self, index: usize) -> bool {
        match self.tab {
            Tab::Tap => self.boost_ad(index),
            Tab::Shop => self.buy(index),
            Tab::Quests => self.claim(index),
            Tab::Story => self.select_chapter(index),
            Tab::Arcade => self.arcade(index),
            Tab::Profile => self.select_skin(index),
        }
    }

    // ── Commands ────────────────────────────────────────────────

    fn reject(&mut self, err: ActionError) {
        log::debug!("action rejected: {}", err);
        self.add_log(format!("✗ {}", err), false);
    }

    fn tap(&mut self) {
        match self.store.tap() {
            Ok(report) => {
                self.last_hit = report.rhythm;
                self.log_quests(&report.outcome.completed_quests);
                if let Some(level_up) = report.outcome.level_up {
                    self.log_level_up(&level_up);
                }
            }
            Err(e) => self.reject(e),
        }
    }

    fn watch_ad(&mut self, reward: AdReward) {
        let label = reward.describe();
        match self.store.watch_ad(reward) {
            Ok(_) => self.add_log(format!("Ad playing... ({})", label), false),
            Err(e) => self.reject(e),
        }
    }

    fn boost_ad(&mut self, index: usize) -> bool {
        let Some(&kind) = BoostKind::all().get(index) else {
            return false;
        };
        self.watch_ad(AdReward::Boost { kind });
        true
    }

    fn toggle_rhythm(&mut self) {
        self.last_hit = None;
        if self.store.toggle_rhythm() {
            let name = self.store.rhythm().pattern().name;
            self.add_log(format!("Rhythm mode on: {}", name), false);
        } else {
            self.add_log("Rhythm mode off", false);
        }
    }

    fn cycle_pattern(&mut self) {
        self.last_hit = None;
        let pattern = self.store.cycle_rhythm_pattern();
        self.add_log(
            format!("Beat: {} (x{:.1})", pattern.name, pattern.multiplier),
            false,
        );
    }

    fn buy(&mut self, index: usize) -> bool {
        let Some(id) = self.store.state().upgrades.get(index).map(|u| u.id.clone()) else {
            return false;
        };
        match self.store.buy_upgrade(&id) {
            Ok(out) => {
                self.add_log(
                    format!(
                        "Bought {} (x{}) for {} coins",
                        out.upgrade_name,
                        out.owned,
                        format_number(out.cost_paid)
                    ),
                    false,
                );
                self.log_quests(&out.completed_quests);
            }
            Err(e) => self.reject(e),
        }
        true
    }

    fn claim(&mut self, index: usize) -> bool {
        let Some((id, title)) = self
            .store
            .state()
            .quests
            .get(index)
            .map(|q| (q.id.clone(), q.title.clone()))
        else {
            return false;
        };
        match self.store.claim_quest_reward(&id) {
            Ok(out) => {
                self.add_log(
                    format!(
                        "{}: +{} coins, +{} XP",
                        title,
                        format_number(out.reward_coins),
                        out.reward_xp
                    ),
                    true,
                );
                if let Some(level_up) = out.level_up {
                    self.log_level_up(&level_up);
                }
            }
            Err(e) => self.reject(e),
        }
        true
    }

    fn select_chapter(&mut self, index: usize) -> bool {
        let Some(id) = self.store.state().chapters.get(index).map(|c| c.id) else {
            return false;
        };
        match self.store.select_chapter(id) {
            Ok(()) => {
                if let Some(ch) = self.store.state().chapter(id) {
                    let text = format!("Chapter {}: {}", ch.id, ch.title);
                    self.add_log(text, false);
                }
            }
            Err(e) => self.reject(e),
        }
        true
    }

    /// Show the next unread line of the current chapter.
    fn read_next(&mut self) {
        let state = self.store.state();
        let chapter = state.player.current_chapter;
        let next = state
            .chapter(chapter)
            .and_then(|c| c.dialogues.iter().find(|d| !d.read))
            .map(|d| (d.id, d.speaker, d.text.clone()));
        let Some((dialogue, speaker, text)) = next else {
            self.add_log("No new lines in this chapter.", false);
            return;
        };
        match self.store.read_dialogue(chapter, dialogue) {
            Ok(_) => {
                let line = match speaker {
                    Speaker::Player => format!("You: {}", text),
                    Speaker::Buddy => format!("{}: {}", self.store.buddy().name, text),
                    Speaker::Narrator => text,
                };
                self.add_log(line, false);
            }
            Err(e) => self.reject(e),
        }
    }

    fn arcade(&mut self, index: usize) -> bool {
        let Some(game) = catalog::ARCADE_GAMES.get(index) else {
            return false;
        };
        let now = self.store.now();
        if logic::is_game_available(&self.store.state().player, game, now) {
            self.add_log(format!("{} is ready to play!", game.name), false);
        } else {
            match self.store.unlock_game_with_ad(game.id) {
                Ok(_) => self.add_log(format!("Ad playing... (unlock {})", game.name), false),
                Err(e) => self.reject(e),
            }
        }
        true
    }

    fn select_skin(&mut self, index: usize) -> bool {
        let Some(skin) = catalog::SKINS.get(index) else {
            return false;
        };
        match self.store.change_skin(skin.id) {
            Ok(()) => self.add_log(format!("Skin: {}", skin.name), false),
            Err(e) => self.reject(e),
        }
        true
    }

    fn reset_energy(&mut self) {
        self.store.reset_energy();
        self.add_log("Energy refilled", false);
    }

    fn press_reset(&mut self, confirming: bool) {
        if confirming {
            self.store.reset_progress();
            self.last_hit = None;
            self.tab = Tab::Tap;
            self.add_log("Progress erased. A fresh start!", true);
        } else {
            self.confirm_reset = true;
            self.add_log("Press reset again to erase all progress.", true);
        }
    }

    // ── Reporting ───────────────────────────────────────────────

    fn log_quests(&mut self, ids: &[String]) {
        for id in ids {
            let title = self
                .store
                .state()
                .quest(id)
                .map(|q| q.title.clone())
                .unwrap_or_else(|| id.clone());
            self.add_log(format!("Quest complete: {}", title), true);
        }
    }

    fn log_level_up(&mut self, level_up: &LevelUp) {
        self.add_log(format!("Level up! You are now level {}", level_up.level), true);
        for &id in &level_up.new_chapters {
            if let Some(ch) = self.store.state().chapter(id) {
                let text = format!("New chapter unlocked: {}", ch.title);
                self.add_log(text, true);
            }
        }
        for skin in &level_up.new_skins {
            let name = catalog::skin(skin).map_or(skin.as_str(), |s| s.name);
            let text = format!("New skin unlocked: {}", name);
            self.add_log(text, true);
        }
    }

    fn log_tick(&mut self, report: TickReport) {
        if let Some(done) = report.ad_completed {
            match done.granted_until {
                Ok(Some(_)) => self.add_log(format!("{} granted!", done.reward.describe()), true),
                Ok(None) => self.add_log("Thanks for watching!", false),
                Err(e) => self.add_log(format!("Ad finished, but {}", e), false),
            }
            self.log_quests(&done.completed_quests);
        }
        for kind in report.expired_boosts {
            self.add_log(format!("{} wore off", kind), false);
        }
        for id in report.expired_unlocks {
            let name = catalog::arcade_game(&id).map_or(id.as_str(), |g| g.name);
            let text = format!("{} is locked again", name);
            self.add_log(text, false);
        }
        self.log_quests(&report.completed_quests);
        if let Some(level_up) = report.level_up {
            self.log_level_up(&level_up);
        }
    }

    /// Advance timers to the current clock. Called once per frame.
    pub fn tick(&mut self) {
        let report = self.store.tick();
        self.log_tick(report);
    }

    pub fn render(&self, f: &mut Frame, area: Rect, click_state: &Rc<RefCell<ClickState>>) {
        render::render(self, f, area, click_state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use crate::time::ManualClock;
    use save::MemoryStorage;
    use state::QuestStatus;

    fn new_game() -> (TapverseGame<MemoryStorage, ManualClock>, ManualClock) {
        let clock = ManualClock::at_date(2024, 5, 1);
        let store = GameStore::open(MemoryStorage::new(), clock.clone(), EngineConfig::default());
        let mut game = TapverseGame::new(store);
        game.store.complete_onboarding();
        (game, clock)
    }

    fn key(game: &mut TapverseGame<MemoryStorage, ManualClock>, c: char) -> bool {
        game.handle_input(&InputEvent::Key(c))
    }

    fn last_log(game: &TapverseGame<MemoryStorage, ManualClock>) -> &str {
        game.log.last().map(|e| e.text.as_str()).unwrap_or("")
    }

    #[test]
    fn first_launch_shows_intro_until_dismissed() {
        let clock = ManualClock::at_date(2024, 5, 1);
        let store = GameStore::open(MemoryStorage::new(), clock, EngineConfig::default());
        let mut game = TapverseGame::new(store);
        assert!(!game.store.onboarding_completed());
        assert!(!game.handle_input(&InputEvent::Click(TAP)));
        assert!(key(&mut game, 't'));
        assert!(game.store.onboarding_completed());
        // The dismissing key press did not tap.
        assert_eq!(game.store.state().player.total_taps, 0);
    }

    #[test]
    fn tap_by_key_and_click() {
        let (mut game, _) = new_game();
        key(&mut game, 't');
        game.handle_input(&InputEvent::Click(TAP));
        key(&mut game, ' ');
        assert_eq!(game.store.state().player.coins, 3.0);
        assert_eq!(game.store.state().player.energy, 97);
    }

    #[test]
    fn tab_keys_and_clicks() {
        let (mut game, _) = new_game();
        key(&mut game, 's');
        assert_eq!(game.tab, Tab::Shop);
        key(&mut game, 'y');
        assert_eq!(game.tab, Tab::Story);
        game.handle_input(&InputEvent::Click(TAB_ARCADE));
        assert_eq!(game.tab, Tab::Arcade);
        key(&mut game, 'h');
        assert_eq!(game.tab, Tab::Tap);
    }

    #[test]
    fn shop_purchase_needs_coins() {
        let (mut game, _) = new_game();
        key(&mut game, 's');
        key(&mut game, '1');
        assert!(last_log(&game).contains("not enough coins"));
        assert_eq!(game.store.state().upgrade("tap-power").unwrap().owned, 0);

        for _ in 0..10 {
            key(&mut game, 't');
        }
        key(&mut game, '1');
        let up = game.store.state().upgrade("tap-power").unwrap();
        assert_eq!(up.owned, 1);
        assert_eq!(up.cost, 15.0);
        assert_eq!(game.store.state().player.tap_power, 2.0);
    }

    #[test]
    fn boost_ad_from_tap_tab() {
        let (mut game, clock) = new_game();
        key(&mut game, '2');
        assert!(game.store.pending_ad().is_some());
        clock.advance(2_000);
        game.tick();
        assert!(game
            .store
            .state()
            .player
            .is_boost_active(BoostKind::Double, clock.now_ms()));
        assert!(game.log.iter().any(|e| e.text == "Double Coins granted!"));
        key(&mut game, 't');
        assert_eq!(game.store.state().player.coins, 2.0);
    }

    #[test]
    fn boost_expiry_is_logged() {
        let (mut game, clock) = new_game();
        game.handle_input(&InputEvent::Click(BOOST_AD_BASE));
        clock.advance(2_000);
        game.tick();
        clock.advance(30_000);
        game.tick();
        assert_eq!(last_log(&game), "Power Tap wore off");
    }

    #[test]
    fn quest_claim_from_quest_tab() {
        let (mut game, clock) = new_game();
        key(&mut game, 'w');
        clock.advance(2_000);
        game.tick();
        key(&mut game, 'q');
        // daily-ad is the fourth quest
        key(&mut game, '4');
        assert_eq!(
            game.store.state().quest("daily-ad").unwrap().status,
            QuestStatus::Claimed
        );
        assert_eq!(game.store.state().player.coins, 30.0);

        key(&mut game, '4');
        assert!(last_log(&game).contains("already claimed"));
    }

    #[test]
    fn story_reads_lines_in_order() {
        let (mut game, _) = new_game();
        key(&mut game, 'y');
        key(&mut game, 'n');
        key(&mut game, 'n');
        let ch = game.store.state().chapter(1).unwrap();
        assert!(ch.dialogues[0].read);
        assert!(ch.dialogues[1].read);
        assert!(!ch.dialogues[2].read);

        key(&mut game, '2');
        assert!(last_log(&game).contains("locked"));
        assert_eq!(game.store.state().player.current_chapter, 1);
    }

    #[test]
    fn story_runs_out_of_lines() {
        let (mut game, _) = new_game();
        game.tab = Tab::Story;
        let lines = game.store.state().chapter(1).unwrap().dialogues.len();
        for _ in 0..lines {
            game.handle_input(&InputEvent::Click(READ_NEXT));
        }
        assert_eq!(game.store.state().chapter(1).unwrap().unread_count(), 0);
        game.handle_input(&InputEvent::Click(READ_NEXT));
        assert_eq!(last_log(&game), "No new lines in this chapter.");
    }

    #[test]
    fn rhythm_keys_only_on_tap_tab() {
        let (mut game, _) = new_game();
        key(&mut game, 'r');
        assert!(game.store.rhythm().enabled);
        key(&mut game, 't');
        assert!(game.last_hit.is_some());

        key(&mut game, 'n');
        assert_eq!(game.store.rhythm().pattern().id, "medium");

        key(&mut game, 's');
        assert!(!key(&mut game, 'r'));
        assert!(game.store.rhythm().enabled);
    }

    #[test]
    fn arcade_unlock_with_ad() {
        let (mut game, clock) = new_game();
        key(&mut game, 'a');
        key(&mut game, '3');
        clock.advance(2_000);
        game.tick();
        assert!(game
            .store
            .state()
            .player
            .is_temp_unlocked("memory-match", clock.now_ms()));

        key(&mut game, '3');
        assert_eq!(last_log(&game), "Memory Match is ready to play!");
    }

    #[test]
    fn locked_skin_rejected() {
        let (mut game, _) = new_game();
        key(&mut game, 'p');
        key(&mut game, '2');
        assert!(last_log(&game).contains("not unlocked"));
        assert_eq!(game.store.state().player.selected_skin, "default");
    }

    #[test]
    fn reset_needs_two_presses_in_a_row() {
        let (mut game, _) = new_game();
        for _ in 0..5 {
            key(&mut game, 't');
        }
        key(&mut game, 'p');
        key(&mut game, 'x');
        assert!(game.confirm_reset);
        // Any other input disarms it.
        key(&mut game, 'e');
        assert!(!game.confirm_reset);
        key(&mut game, 'x');
        key(&mut game, 'x');
        assert_eq!(game.store.state().player.total_taps, 0);
        assert_eq!(game.tab, Tab::Tap);
    }

    #[test]
    fn unknown_input_not_consumed() {
        let (mut game, _) = new_game();
        assert!(!key(&mut game, 'z'));
        assert!(!game.handle_input(&InputEvent::Click(9_999)));
        game.tab = Tab::Shop;
        assert!(!key(&mut game, '9'));
    }

    #[test]
    fn log_is_capped() {
        let (mut game, _) = new_game();
        for i in 0..100 {
            game.add_log(format!("line {}", i), false);
        }
        assert_eq!(game.log.len(), MAX_LOG);
        assert_eq!(last_log(&game), "line 99");
    }
}
