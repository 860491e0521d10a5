//! The companion: a named buddy who chimes in with short messages.

use crate::time::Millis;

pub const AI_NAMES: &[&str] = &[
    "Coin", "Tappy", "Bitsy", "Zap", "Echo", "Pixel", "Blip", "Nova", "Byte", "Sparkle",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    Greeting,
    Achievement,
    Tip,
    Encouragement,
    Random,
}

const MESSAGES: &[(MessageKind, &str)] = &[
    (MessageKind::Greeting, "Hi there! I'm your AI buddy. Let's tap together!"),
    (MessageKind::Greeting, "Welcome back to TapVerse! Ready to collect some coins?"),
    (MessageKind::Achievement, "Great job! You're getting so many coins!"),
    (MessageKind::Achievement, "Wow! You're tapping like a pro!"),
    (MessageKind::Tip, "Psst! Try upgrading your tap power for more coins."),
    (MessageKind::Tip, "Remember to take breaks! Your energy recharges over time."),
    (MessageKind::Encouragement, "You're doing great! Keep tapping!"),
    (MessageKind::Encouragement, "I believe in you! Let's earn more coins!"),
    (MessageKind::Random, "Did you know? In some universes, coins tap you!"),
    (MessageKind::Random, "I wonder what we could buy with all these digital coins..."),
];

// ── RNG ─────────────────────────────────────────────────────

fn next_rng(seed: u64) -> u64 {
    seed.wrapping_mul(6364136223846793005)
        .wrapping_add(1442695040888963407)
}

fn rng_range(seed: &mut u64, max: u32) -> u32 {
    *seed = next_rng(*seed);
    ((*seed >> 33) % max.max(1) as u64) as u32
}

/// Pick a companion name from a seed.
pub fn pick_name(seed: u64) -> &'static str {
    let mut s = seed;
    AI_NAMES[rng_range(&mut s, AI_NAMES.len() as u32) as usize]
}

#[derive(Debug, Clone, PartialEq)]
pub struct BuddyMessage {
    pub kind: MessageKind,
    pub text: String,
    pub expires_at: Millis,
}

#[derive(Debug, Clone)]
pub struct Buddy {
    pub name: String,
    current: Option<BuddyMessage>,
    rng_state: u64,
}

impl Buddy {
    pub fn new(name: impl Into<String>, seed: u64) -> Self {
        Self {
            name: name.into(),
            current: None,
            rng_state: seed,
        }
    }

    pub fn say(&mut self, kind: MessageKind, text: impl Into<String>, now: Millis, duration_ms: u32) {
        self.current = Some(BuddyMessage {
            kind,
            text: text.into(),
            expires_at: now + Millis::from(duration_ms),
        });
    }

    /// Show a random canned message.
    pub fn chatter(&mut self, now: Millis, duration_ms: u32) {
        let (kind, text) = MESSAGES[rng_range(&mut self.rng_state, MESSAGES.len() as u32) as usize];
        self.say(kind, text, now, duration_ms);
    }

    /// Roll a `percent` chance to chatter. Returns whether it did.
    pub fn maybe_chatter(&mut self, percent: u32, now: Millis, duration_ms: u32) -> bool {
        if rng_range(&mut self.rng_state, 100) < percent {
            self.chatter(now, duration_ms);
            true
        } else {
            false
        }
    }

    /// Greeting shown when a session opens.
    pub fn greet(&mut self, now: Millis, duration_ms: u32) {
        let greetings: Vec<&str> = MESSAGES
            .iter()
            .filter(|(k, _)| *k == MessageKind::Greeting)
            .map(|(_, t)| *t)
            .collect();
        let text = greetings[rng_range(&mut self.rng_state, greetings.len() as u32) as usize];
        self.say(MessageKind::Greeting, text, now, duration_ms);
    }

    pub fn praise_upgrade(&mut self, upgrade_name: &str, now: Millis, duration_ms: u32) {
        self.say(
            MessageKind::Achievement,
            format!("Great job upgrading your {}!", upgrade_name),
            now,
            duration_ms,
        );
    }

    /// The message on screen at `now`, if any.
    pub fn current(&self, now: Millis) -> Option<&BuddyMessage> {
        self.current.as_ref().filter(|m| now < m.expires_at)
    }

    /// Drop an expired message. Returns true if one was cleared.
    pub fn expire(&mut self, now: Millis) -> bool {
        if self.current.as_ref().is_some_and(|m| now >= m.expires_at) {
            self.current = None;
            return true;
        }
        false
    }
}
