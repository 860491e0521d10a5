//! Wall-clock access and fixed-period interval timers.
//!
//! The engine never schedules callbacks. `draw_web()` polls once per frame
//! and everything time-dependent (energy regeneration, auto-tap, boost
//! expiry) is recomputed from the current timestamp. `Interval` converts the
//! variable frame delta into a whole number of fixed-period firings using an
//! accumulator, so the logic stays deterministic and fully testable.

use chrono::NaiveDate;

/// Milliseconds since the Unix epoch.
pub type Millis = i64;

pub const MS_PER_SECOND: Millis = 1_000;
#[cfg(test)]
pub const MS_PER_DAY: Millis = 86_400_000;

/// Source of "now" for the engine.
pub trait Clock {
    /// Current wall-clock time in milliseconds.
    fn now_ms(&self) -> Millis;

    /// Today's calendar date in the player's local time zone.
    fn today(&self) -> NaiveDate;
}

/// The platform clock: `Date.now()` in the browser, `SystemTime` natively.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    #[cfg(target_arch = "wasm32")]
    fn now_ms(&self) -> Millis {
        js_sys::Date::now() as Millis
    }

    #[cfg(not(target_arch = "wasm32"))]
    fn now_ms(&self) -> Millis {
        use std::time::{SystemTime, UNIX_EPOCH};
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as Millis)
            .unwrap_or(0)
    }

    #[cfg(target_arch = "wasm32")]
    fn today(&self) -> NaiveDate {
        // Local date, as the browser sees it.
        let d = js_sys::Date::new_0();
        NaiveDate::from_ymd_opt(d.get_full_year() as i32, d.get_month() + 1, d.get_date())
            .unwrap_or_else(|| utc_date(self.now_ms()))
    }

    #[cfg(not(target_arch = "wasm32"))]
    fn today(&self) -> NaiveDate {
        utc_date(self.now_ms())
    }
}

/// UTC calendar date of a millisecond timestamp.
pub fn utc_date(ms: Millis) -> NaiveDate {
    chrono::DateTime::from_timestamp_millis(ms)
        .map(|dt| dt.date_naive())
        .unwrap_or_default()
}

/// Test clock. Clones share the same instant, so a test can keep a handle
/// and advance time underneath a store that owns another clone.
#[cfg(test)]
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: std::rc::Rc<std::cell::Cell<Millis>>,
}

#[cfg(test)]
impl ManualClock {
    pub fn new(now_ms: Millis) -> Self {
        Self {
            now: std::rc::Rc::new(std::cell::Cell::new(now_ms)),
        }
    }

    /// Clock positioned at midnight UTC of the given date.
    pub fn at_date(year: i32, month: u32, day: u32) -> Self {
        let date = NaiveDate::from_ymd_opt(year, month, day).expect("valid date");
        let ms = date
            .and_hms_opt(0, 0, 0)
            .expect("midnight")
            .and_utc()
            .timestamp_millis();
        Self::new(ms)
    }

    pub fn advance(&self, ms: Millis) {
        self.now.set(self.now.get() + ms);
    }
}

#[cfg(test)]
impl Clock for ManualClock {
    fn now_ms(&self) -> Millis {
        self.now.get()
    }

    fn today(&self) -> NaiveDate {
        utc_date(self.now.get())
    }
}

/// Fixed-period timer driven by wall-clock timestamps.
#[derive(Debug, Clone)]
pub struct Interval {
    /// Milliseconds per firing (e.g. 5000 = once every 5 seconds).
    period_ms: Millis,
    /// Largest delta accepted from a single update.
    max_delta_ms: Millis,
    /// Accumulated milliseconds not yet consumed as firings.
    accumulator: Millis,
    /// Timestamp of the last update, None until the first one.
    last_timestamp: Option<Millis>,
}

impl Interval {
    pub fn new(period_ms: u32, max_delta_ms: u32) -> Self {
        Self {
            period_ms: Millis::from(period_ms.max(1)),
            max_delta_ms: Millis::from(max_delta_ms),
            accumulator: 0,
            last_timestamp: None,
        }
    }

    /// Feed the current timestamp. Returns how many periods elapsed since
    /// the previous update.
    pub fn update(&mut self, now_ms: Millis) -> u32 {
        let delta = match self.last_timestamp {
            // A backgrounded tab or a clock moved backwards must not
            // produce a burst of firings (or negative time).
            Some(prev) => (now_ms - prev).clamp(0, self.max_delta_ms),
            None => 0,
        };
        self.last_timestamp = Some(now_ms);

        self.accumulator += delta;
        let fires = self.accumulator / self.period_ms;
        self.accumulator -= fires * self.period_ms;
        fires as u32
    }

    /// Restart the period at `now_ms`, discarding any partial progress.
    pub fn reset(&mut self, now_ms: Millis) {
        self.accumulator = 0;
        self.last_timestamp = Some(now_ms);
    }

    /// Milliseconds until the next firing, assuming no further clamping.
    pub fn remaining_ms(&self) -> Millis {
        self.period_ms - self.accumulator
    }
}
