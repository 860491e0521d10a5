//! Semantic action IDs for TapVerse click targets.
//!
//! Registered during render and dispatched via `InputEvent::Click`.

// ── Core actions ────────────────────────────────────────────────
pub const TAP: u16 = 0;
pub const WATCH_AD: u16 = 1;
pub const DISMISS_ONBOARDING: u16 = 2;

// ── Tab navigation ──────────────────────────────────────────────
pub const TAB_TAP: u16 = 10;
pub const TAB_SHOP: u16 = 11;
pub const TAB_QUESTS: u16 = 12;
pub const TAB_STORY: u16 = 13;
pub const TAB_ARCADE: u16 = 14;
pub const TAB_PROFILE: u16 = 15;

// ── Boost ads (base + index into BoostKind::all()) ──────────────
pub const BOOST_AD_BASE: u16 = 20;

// ── Rhythm mode ─────────────────────────────────────────────────
pub const TOGGLE_RHYTHM: u16 = 30;
pub const CYCLE_PATTERN: u16 = 31;

// ── Shop (base + upgrade index) ─────────────────────────────────
pub const BUY_UPGRADE_BASE: u16 = 100;

// ── Quests (base + quest index) ─────────────────────────────────
pub const CLAIM_QUEST_BASE: u16 = 200;

// ── Story ───────────────────────────────────────────────────────
pub const SELECT_CHAPTER_BASE: u16 = 300;
pub const READ_NEXT: u16 = 399;

// ── Arcade (base + game index) ──────────────────────────────────
pub const UNLOCK_GAME_BASE: u16 = 400;

// ── Profile ─────────────────────────────────────────────────────
pub const SELECT_SKIN_BASE: u16 = 500;
pub const RESET_ENERGY: u16 = 590;
pub const RESET_PROGRESS: u16 = 591;
