//! Quest progress tracking.

use super::state::{Quest, QuestGoal, QuestPeriod};

/// Something the player did that quests may count.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum QuestEvent {
    Tap { coins: f64 },
    Purchase,
    AdWatched,
}

impl QuestEvent {
    /// How much this event advances a quest with the given goal.
    fn increment(&self, goal: QuestGoal) -> f64 {
        match (self, goal) {
            (QuestEvent::Tap { .. }, QuestGoal::Taps) => 1.0,
            (QuestEvent::Tap { coins }, QuestGoal::CoinsEarned) => *coins,
            (QuestEvent::Purchase, QuestGoal::Purchases) => 1.0,
            (QuestEvent::AdWatched, QuestGoal::AdsWatched) => 1.0,
            _ => 0.0,
        }
    }
}

/// Apply an event to every in-progress quest. Returns the ids of quests
/// that became completed.
pub fn record_event(quests: &mut [Quest], event: QuestEvent) -> Vec<String> {
    let mut completed = Vec::new();
    for quest in quests.iter_mut().filter(|q| !q.is_completed()) {
        let inc = event.increment(quest.goal);
        if inc <= 0.0 {
            continue;
        }
        quest.progress += inc;
        quest.refresh_status();
        if quest.is_completed() {
            completed.push(quest.id.clone());
        }
    }
    completed
}

/// Recompute every status from progress.
pub fn refresh_all(quests: &mut [Quest]) {
    for quest in quests.iter_mut() {
        quest.refresh_status();
    }
}

/// Reset every quest of the given period. Returns how many were reset.
pub fn reset_period(quests: &mut [Quest], period: QuestPeriod) -> usize {
    let mut count = 0;
    for quest in quests.iter_mut().filter(|q| q.period == period) {
        quest.reset();
        count += 1;
    }
    count
}
