//! Daily and weekly rollover, evaluated once per session load.

use chrono::{Datelike, Days, NaiveDate, Weekday};

use super::quests;
use super::state::{QuestPeriod, TapverseState};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreakChange {
    /// First session ever.
    Started,
    /// Played yesterday too.
    Continued,
    /// Missed at least one day (or the clock moved backwards).
    Reset,
    /// Same day as the last session.
    Unchanged,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RolloverReport {
    pub new_day: bool,
    pub new_week: bool,
    pub streak: StreakChange,
}

/// First day of the week containing `date`.
pub fn week_start_of(date: NaiveDate, week_start: Weekday) -> NaiveDate {
    let back = (date.weekday().num_days_from_monday() + 7 - week_start.num_days_from_monday()) % 7;
    date.checked_sub_days(Days::new(u64::from(back)))
        .unwrap_or(date)
}

pub fn apply_rollover(
    state: &mut TapverseState,
    today: NaiveDate,
    week_start: Weekday,
) -> RolloverReport {
    let Some(last) = state.player.last_play_date else {
        state.player.streak_days = 1;
        state.player.last_play_date = Some(today);
        return RolloverReport {
            new_day: false,
            new_week: false,
            streak: StreakChange::Started,
        };
    };

    if last == today {
        return RolloverReport {
            new_day: false,
            new_week: false,
            streak: StreakChange::Unchanged,
        };
    }

    let player = &mut state.player;
    player.daily_taps = 0;
    player.daily_ads_watched = 0;
    quests::reset_period(&mut state.quests, QuestPeriod::Daily);

    let gap = today.signed_duration_since(last).num_days();
    let streak = if gap == 1 {
        state.player.streak_days += 1;
        StreakChange::Continued
    } else {
        state.player.streak_days = 1;
        StreakChange::Reset
    };

    let new_week = week_start_of(today, week_start) != week_start_of(last, week_start);
    if new_week {
        state.player.weekly_ads_watched = 0;
        quests::reset_period(&mut state.quests, QuestPeriod::Weekly);
    }

    state.player.last_play_date = Some(today);
    log::info!(
        "rollover to {}: streak {} ({:?}), new week: {}",
        today,
        state.player.streak_days,
        streak,
        new_week
    );

    RolloverReport {
        new_day: true,
        new_week,
        streak,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tapverse::state::QuestStatus;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn dirty_state(last: NaiveDate) -> TapverseState {
        let mut state = TapverseState::new();
        state.player.last_play_date = Some(last);
        state.player.streak_days = 4;
        state.player.daily_taps = 50;
        state.player.daily_ads_watched = 2;
        state.player.weekly_ads_watched = 5;
        for q in state.quests.iter_mut() {
            q.progress = 1.0;
            q.status = QuestStatus::Claimed;
        }
        state
    }

    #[test]
    fn first_session_starts_streak() {
        let mut state = TapverseState::new();
        let report = apply_rollover(&mut state, date(2024, 5, 1), Weekday::Sun);
        assert_eq!(report.streak, StreakChange::Started);
        assert!(!report.new_day);
        assert_eq!(state.player.streak_days, 1);
        assert_eq!(state.player.last_play_date, Some(date(2024, 5, 1)));
    }

    #[test]
    fn same_day_changes_nothing() {
        // 2024-05-01 is a Wednesday
        let mut state = dirty_state(date(2024, 5, 1));
        let before = state.clone();
        let report = apply_rollover(&mut state, date(2024, 5, 1), Weekday::Sun);
        assert_eq!(report.streak, StreakChange::Unchanged);
        assert_eq!(state, before);
    }

    #[test]
    fn next_day_continues_streak_and_resets_dailies() {
        let mut state = dirty_state(date(2024, 5, 1));
        let report = apply_rollover(&mut state, date(2024, 5, 2), Weekday::Sun);
        assert_eq!(report.streak, StreakChange::Continued);
        assert!(report.new_day);
        assert!(!report.new_week);
        assert_eq!(state.player.streak_days, 5);
        assert_eq!(state.player.daily_taps, 0);
        assert_eq!(state.player.daily_ads_watched, 0);
        assert_eq!(state.player.weekly_ads_watched, 5);
        for q in &state.quests {
            match q.period {
                QuestPeriod::Daily => assert_eq!(q.status, QuestStatus::InProgress),
                QuestPeriod::Weekly => assert_eq!(q.status, QuestStatus::Claimed),
            }
        }
    }

    #[test]
    fn skipped_day_resets_streak() {
        let mut state = dirty_state(date(2024, 5, 1));
        let report = apply_rollover(&mut state, date(2024, 5, 3), Weekday::Sun);
        assert_eq!(report.streak, StreakChange::Reset);
        assert_eq!(state.player.streak_days, 1);
    }

    #[test]
    fn streak_over_three_days() {
        let mut state = TapverseState::new();
        let d = date(2024, 5, 1);
        apply_rollover(&mut state, d, Weekday::Sun);
        assert_eq!(state.player.streak_days, 1);
        apply_rollover(&mut state, date(2024, 5, 2), Weekday::Sun);
        assert_eq!(state.player.streak_days, 2);
        apply_rollover(&mut state, date(2024, 5, 4), Weekday::Sun);
        assert_eq!(state.player.streak_days, 1);
    }

    #[test]
    fn clock_moved_backwards_resets_streak() {
        let mut state = dirty_state(date(2024, 5, 10));
        let report = apply_rollover(&mut state, date(2024, 5, 9), Weekday::Sun);
        assert_eq!(report.streak, StreakChange::Reset);
        assert_eq!(state.player.last_play_date, Some(date(2024, 5, 9)));
    }

    #[test]
    fn sunday_starts_new_week() {
        // Saturday 2024-05-04 → Sunday 2024-05-05
        let mut state = dirty_state(date(2024, 5, 4));
        let report = apply_rollover(&mut state, date(2024, 5, 5), Weekday::Sun);
        assert!(report.new_week);
        assert_eq!(state.player.weekly_ads_watched, 0);
        assert!(state
            .quests
            .iter()
            .all(|q| q.status == QuestStatus::InProgress && q.progress == 0.0));
    }

    #[test]
    fn skipping_week_start_still_resets_weeklies() {
        // Friday 2024-05-03 → Tuesday 2024-05-07, never opened on Sunday
        let mut state = dirty_state(date(2024, 5, 3));
        let report = apply_rollover(&mut state, date(2024, 5, 7), Weekday::Sun);
        assert!(report.new_week);
    }

    #[test]
    fn week_start_to_next_week_start_resets_weeklies() {
        // Sunday 2024-05-05 → Sunday 2024-05-12: the previous visit was also on
        // a week start, but it belongs to last week, so the week still rolls.
        let mut state = dirty_state(date(2024, 5, 5));
        let report = apply_rollover(&mut state, date(2024, 5, 12), Weekday::Sun);
        assert!(report.new_week);
        assert_eq!(report.streak, StreakChange::Reset);
        assert_eq!(state.player.weekly_ads_watched, 0);
        assert!(state
            .quests
            .iter()
            .filter(|q| q.period == QuestPeriod::Weekly)
            .all(|q| q.status == QuestStatus::InProgress));
    }

    #[test]
    fn configurable_week_start() {
        // Sunday → Monday crosses a Monday-start week but not a Sunday-start one
        let mut state = dirty_state(date(2024, 5, 5));
        assert!(apply_rollover(&mut state, date(2024, 5, 6), Weekday::Mon).new_week);
        let mut state = dirty_state(date(2024, 5, 5));
        assert!(!apply_rollover(&mut state, date(2024, 5, 6), Weekday::Sun).new_week);
    }

    #[test]
    fn week_start_computation() {
        // Wednesday 2024-05-01
        assert_eq!(week_start_of(date(2024, 5, 1), Weekday::Sun), date(2024, 4, 28));
        assert_eq!(week_start_of(date(2024, 5, 1), Weekday::Mon), date(2024, 4, 29));
        assert_eq!(week_start_of(date(2024, 5, 5), Weekday::Sun), date(2024, 5, 5));
    }
}
