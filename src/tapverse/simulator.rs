//! Balance simulator for TapVerse.
//! Run with: cargo test simulate_session -- --nocapture

use crate::config::EngineConfig;
use crate::time::{ManualClock, Millis, MS_PER_SECOND};

use super::logic::format_number;
use super::save::MemoryStorage;
use super::state::{BoostKind, TapverseState, UpgradeEffect};
use super::store::{AdReward, GameStore};

/// Taps a player manages per second while energy lasts.
const TAPS_PER_SECOND: u32 = 3;
/// Minutes between boost ads.
const AD_EVERY_MINUTES: u32 = 5;

/// Affordable upgrade with the shortest payback, measured in coins per tap.
fn find_best_upgrade(state: &TapverseState, now: Millis) -> Option<String> {
    let p = &state.player;
    let tap_value = p.tap_value(now);
    let mut best: Option<(f64, &str)> = None;

    for up in &state.upgrades {
        if p.coins < up.cost {
            continue;
        }
        let gain = match up.effect {
            UpgradeEffect::TapPower => up.value * p.coin_multiplier,
            UpgradeEffect::CoinMultiplier => p.tap_power * up.value,
            // Extra banked taps, discounted since they only pay off once.
            UpgradeEffect::MaxEnergy => tap_value * up.value * 0.1,
        };
        if gain <= 0.0 {
            continue;
        }
        let payback = up.cost / gain;
        if best.map_or(true, |(bp, _)| payback < bp) {
            best = Some((payback, up.id.as_str()));
        }
    }

    best.map(|(_, id)| id.to_string())
}

fn report_stats(state: &TapverseState, seconds: u32) {
    let p = &state.player;
    eprintln!("┌─── {}m{:02}s ─────────────────────────", seconds / 60, seconds % 60);
    eprintln!(
        "│ Coins: {}  Earned: {}  Taps: {}",
        format_number(p.coins),
        format_number(p.total_coins_earned),
        p.total_taps
    );
    eprintln!(
        "│ Level {}  Energy {}/{}  Tap value {}",
        p.level,
        p.energy,
        p.max_energy,
        format_number(p.tap_value(0))
    );
    let owned: Vec<String> = state
        .upgrades
        .iter()
        .map(|u| format!("{} x{}", u.name, u.owned))
        .collect();
    eprintln!("│ {}", owned.join("  "));
    eprintln!("└──────────────────────────────────────");
}

struct SimResult {
    state: TapverseState,
    purchases: u32,
    claims: u32,
    ads: u32,
}

fn simulate(total_seconds: u32) -> SimResult {
    let clock = ManualClock::at_date(2024, 3, 4);
    let config = EngineConfig::default();
    let mut store = GameStore::open(MemoryStorage::new(), clock.clone(), config);
    store.complete_onboarding();

    let mut purchases = 0;
    let mut claims = 0;
    let mut ads = 0;

    for second in 1..=total_seconds {
        clock.advance(MS_PER_SECOND);
        store.tick();

        let p = &store.state().player;
        assert!(p.energy <= p.max_energy, "energy above max at {}s", second);

        for _ in 0..TAPS_PER_SECOND {
            if store.tap().is_err() {
                break;
            }
        }

        let claimable: Vec<String> = store
            .state()
            .quests
            .iter()
            .filter(|q| q.is_claimable())
            .map(|q| q.id.clone())
            .collect();
        for id in claimable {
            if store.claim_quest_reward(&id).is_ok() {
                claims += 1;
            }
        }

        while let Some(id) = find_best_upgrade(store.state(), store.now()) {
            if store.buy_upgrade(&id).is_err() {
                break;
            }
            purchases += 1;
        }

        if second % (AD_EVERY_MINUTES * 60) == 0
            && store
                .watch_ad(AdReward::Boost {
                    kind: BoostKind::Double,
                })
                .is_ok()
        {
            ads += 1;
        }

        if second % 600 == 0 {
            report_stats(store.state(), second);
        }
    }

    SimResult {
        state: store.state().clone(),
        purchases,
        claims,
        ads,
    }
}

#[test]
fn simulate_session_30min() {
    let result = simulate(30 * 60);
    let p = &result.state.player;
    eprintln!(
        "purchases {}  quest claims {}  ads {}",
        result.purchases, result.claims, result.ads
    );

    // Starting energy, one point every 5s and each tank's refill cap the tap count.
    let tanks = result.state.upgrade("max-energy").map_or(0, |u| u.owned) as u64;
    assert!(p.total_taps <= 100 + 30 * 60 / 5 + 10 * tanks);
    assert!(p.total_taps >= 400, "taps: {}", p.total_taps);
    assert!(p.level >= 5, "level: {}", p.level);
    assert!(result.purchases >= 3, "purchases: {}", result.purchases);
    assert!(result.claims >= 1, "claims: {}", result.claims);
    assert!(result.ads >= 5);
    assert!(p.total_ads_watched >= 5);
    assert!(p.tap_value(0) > 1.0);
}

#[test]
fn simulate_session_is_deterministic() {
    let a = simulate(5 * 60);
    let b = simulate(5 * 60);
    assert_eq!(a.state.player.coins, b.state.player.coins);
    assert_eq!(a.purchases, b.purchases);
}
