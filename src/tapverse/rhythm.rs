//! Rhythm mode: a looping beat pattern that rewards taps landing on the beat.

use crate::time::Millis;

/// A looping sequence of beat delays.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BeatPattern {
    pub id: &'static str,
    pub name: &'static str,
    /// Milliseconds between consecutive beats.
    pub delays: &'static [u32],
    pub difficulty: u8,
    pub multiplier: f64,
}

impl BeatPattern {
    /// Taps within this many ms after a beat count as Good.
    pub fn good_window_ms(&self) -> f64 {
        self.delays.first().copied().unwrap_or(0) as f64 / 3.0
    }

    /// Taps within this many ms after a beat count as Perfect.
    pub fn perfect_window_ms(&self) -> f64 {
        self.good_window_ms() / 2.0
    }

    fn cycle_ms(&self) -> Millis {
        self.delays.iter().map(|&d| Millis::from(d)).sum()
    }
}

pub const BEAT_PATTERNS: &[BeatPattern] = &[
    BeatPattern {
        id: "basic",
        name: "Basic Beat",
        delays: &[800, 400, 400, 800],
        difficulty: 1,
        multiplier: 1.2,
    },
    BeatPattern {
        id: "medium",
        name: "Medium Beat",
        delays: &[600, 300, 300, 600, 300, 300],
        difficulty: 2,
        multiplier: 1.5,
    },
    BeatPattern {
        id: "complex",
        name: "Complex Beat",
        delays: &[400, 200, 200, 400, 200, 200, 400],
        difficulty: 3,
        multiplier: 2.0,
    },
];

/// Bonus on top of the pattern multiplier for a Perfect hit.
pub const PERFECT_BONUS: f64 = 1.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Judgement {
    Perfect,
    Good,
    Miss,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RhythmHit {
    pub judgement: Judgement,
    /// Coin multiplier for this tap (1.0 on a miss).
    pub bonus: f64,
    pub combo: u32,
}

#[derive(Debug, Clone)]
pub struct RhythmTracker {
    pub enabled: bool,
    pattern_index: usize,
    /// When the most recent beat sounded.
    last_beat: Millis,
    /// Index into `delays` for the wait after `last_beat`.
    next_delay: usize,
    pub combo: u32,
    pub best_combo: u32,
}

impl RhythmTracker {
    pub fn new() -> Self {
        Self {
            enabled: false,
            pattern_index: 0,
            last_beat: 0,
            next_delay: 0,
            combo: 0,
            best_combo: 0,
        }
    }

    pub fn pattern(&self) -> &'static BeatPattern {
        &BEAT_PATTERNS[self.pattern_index % BEAT_PATTERNS.len()]
    }

    /// Toggle rhythm mode. Turning it on starts the pattern with a beat at `now`.
    pub fn toggle(&mut self, now: Millis) -> bool {
        self.enabled = !self.enabled;
        if self.enabled {
            self.restart(now);
        }
        self.combo = 0;
        self.enabled
    }

    /// Switch to the next pattern and restart it at `now`.
    pub fn cycle_pattern(&mut self, now: Millis) -> &'static BeatPattern {
        self.pattern_index = (self.pattern_index + 1) % BEAT_PATTERNS.len();
        self.restart(now);
        self.combo = 0;
        self.pattern()
    }

    fn restart(&mut self, now: Millis) {
        self.last_beat = now;
        self.next_delay = 1 % self.pattern().delays.len();
    }

    /// Move `last_beat` forward to the latest beat at or before `now`.
    /// Returns how many beats passed.
    pub fn advance(&mut self, now: Millis) -> u32 {
        if !self.enabled || now <= self.last_beat {
            return 0;
        }
        let pattern = self.pattern();
        let cycle = pattern.cycle_ms();
        if cycle <= 0 {
            return 0;
        }

        let mut beats = 0u32;
        // Skip whole cycles first so a long pause costs O(pattern length).
        let whole = (now - self.last_beat) / cycle;
        if whole > 0 {
            self.last_beat += whole * cycle;
            beats = beats.saturating_add((whole as u32).saturating_mul(pattern.delays.len() as u32));
        }
        loop {
            let delay = Millis::from(pattern.delays[self.next_delay]);
            if self.last_beat + delay > now {
                break;
            }
            self.last_beat += delay;
            self.next_delay = (self.next_delay + 1) % pattern.delays.len();
            beats = beats.saturating_add(1);
        }
        beats
    }

    /// Judge a tap at `now`. None while rhythm mode is off.
    pub fn judge(&mut self, now: Millis) -> Option<RhythmHit> {
        if !self.enabled {
            return None;
        }
        self.advance(now);
        let pattern = self.pattern();
        let since = (now - self.last_beat) as f64;

        let (judgement, bonus) = if since < pattern.perfect_window_ms() {
            (Judgement::Perfect, pattern.multiplier * PERFECT_BONUS)
        } else if since < pattern.good_window_ms() {
            (Judgement::Good, pattern.multiplier)
        } else {
            (Judgement::Miss, 1.0)
        };

        if judgement == Judgement::Miss {
            self.combo = 0;
        } else {
            self.combo += 1;
            self.best_combo = self.best_combo.max(self.combo);
        }

        Some(RhythmHit {
            judgement,
            bonus,
            combo: self.combo,
        })
    }

    /// 1.0 right on a beat, falling to 0.0 as the next beat approaches.
    pub fn beat_progress(&self, now: Millis) -> f64 {
        if !self.enabled {
            return 0.0;
        }
        let delay = self.pattern().delays[self.next_delay] as f64;
        let since = (now - self.last_beat) as f64;
        if delay <= 0.0 {
            return 0.0;
        }
        (1.0 - since / delay).clamp(0.0, 1.0)
    }
}
