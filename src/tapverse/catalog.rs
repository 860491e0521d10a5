//! Static game content: shop, quests, story, skins and arcade games.

use super::state::{
    QuestGoal, QuestPeriod, QuestStatus, Quest, Speaker, StoryChapter, StoryDialogue, Upgrade,
    UpgradeEffect,
};

/// A coin skin and the level that unlocks it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SkinDef {
    pub id: &'static str,
    pub name: &'static str,
    pub unlock_level: u32,
}

pub const SKINS: &[SkinDef] = &[
    SkinDef {
        id: "default",
        name: "Classic Gold",
        unlock_level: 1,
    },
    SkinDef {
        id: "neon",
        name: "Neon Pulse",
        unlock_level: 5,
    },
    SkinDef {
        id: "diamond",
        name: "Diamond",
        unlock_level: 10,
    },
];

pub fn skin(id: &str) -> Option<&'static SkinDef> {
    SKINS.iter().find(|s| s.id == id)
}

/// An arcade mini-game entry.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ArcadeGame {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub unlock_level: u32,
}

pub const ARCADE_GAMES: &[ArcadeGame] = &[
    ArcadeGame {
        id: "coin-catcher",
        name: "Coin Catcher",
        description: "Collect falling coins before they disappear",
        unlock_level: 2,
    },
    ArcadeGame {
        id: "spin-wheel",
        name: "Spin the Wheel",
        description: "Daily spins for random prizes and boosts",
        unlock_level: 3,
    },
    ArcadeGame {
        id: "memory-match",
        name: "Memory Match",
        description: "Match identical symbols to earn bonus coins",
        unlock_level: 4,
    },
];

pub fn arcade_game(id: &str) -> Option<&'static ArcadeGame> {
    ARCADE_GAMES.iter().find(|g| g.id == id)
}

pub fn upgrades() -> Vec<Upgrade> {
    vec![
        Upgrade {
            id: "tap-power".into(),
            name: "Tap Power".into(),
            description: "Increase the number of coins per tap".into(),
            cost: 10.0,
            effect: UpgradeEffect::TapPower,
            value: 1.0,
            owned: 0,
        },
        Upgrade {
            id: "coin-multiplier".into(),
            name: "Coin Multiplier".into(),
            description: "Multiply the coins you earn per tap".into(),
            cost: 50.0,
            effect: UpgradeEffect::CoinMultiplier,
            value: 0.1,
            owned: 0,
        },
        Upgrade {
            id: "max-energy".into(),
            name: "Energy Tank".into(),
            description: "Increase your maximum energy".into(),
            cost: 100.0,
            effect: UpgradeEffect::MaxEnergy,
            value: 10.0,
            owned: 0,
        },
    ]
}

/// `reward` is (coins, xp).
fn quest(
    id: &str,
    (title, description): (&str, &str),
    period: QuestPeriod,
    goal: QuestGoal,
    requirement: f64,
    (reward_coins, reward_xp): (f64, u64),
) -> Quest {
    Quest {
        id: id.into(),
        title: title.into(),
        description: description.into(),
        period,
        goal,
        requirement,
        progress: 0.0,
        status: QuestStatus::InProgress,
        reward_coins,
        reward_xp,
    }
}

pub fn quests() -> Vec<Quest> {
    use QuestGoal::*;
    use QuestPeriod::*;
    vec![
        quest("daily-taps", ("Warm-up", "Tap 100 times"), Daily, Taps, 100.0, (50.0, 20)),
        quest("daily-coins", ("Pocket Money", "Earn 200 coins"), Daily, CoinsEarned, 200.0, (75.0, 25)),
        quest("daily-upgrade", ("Shopper", "Buy 1 upgrade"), Daily, Purchases, 1.0, (40.0, 15)),
        quest("daily-ad", ("Sponsor Break", "Watch 1 ad"), Daily, AdsWatched, 1.0, (30.0, 10)),
        quest("weekly-taps", ("Tap Marathon", "Tap 2,500 times"), Weekly, Taps, 2_500.0, (600.0, 150)),
        quest("weekly-coins", ("Treasure Hoard", "Earn 5,000 coins"), Weekly, CoinsEarned, 5_000.0, (800.0, 200)),
        quest("weekly-upgrades", ("Engineer", "Buy 10 upgrades"), Weekly, Purchases, 10.0, (500.0, 120)),
        quest("weekly-ads", ("Loyal Viewer", "Watch 10 ads"), Weekly, AdsWatched, 10.0, (400.0, 100)),
    ]
}

fn line(id: u32, speaker: Speaker, text: &str) -> StoryDialogue {
    StoryDialogue {
        id,
        speaker,
        text: text.into(),
        read: false,
    }
}

pub fn chapters() -> Vec<StoryChapter> {
    use Speaker::*;
    vec![
        StoryChapter {
            id: 1,
            title: "First Contact".into(),
            planet: "Terra Nova".into(),
            unlock_level: 1,
            dialogues: vec![
                line(1, Narrator, "A single coin hums in the dark, waiting for a tap."),
                line(2, Buddy, "Hey! You found me. Every tap wakes up a little more of the TapVerse."),
                line(3, Player, "So I just... tap?"),
                line(4, Buddy, "Tap, upgrade, repeat. I'll be right here cheering."),
            ],
        },
        StoryChapter {
            id: 2,
            title: "The Copper Rings".into(),
            planet: "Cuprum".into(),
            unlock_level: 3,
            dialogues: vec![
                line(1, Narrator, "Rings of copper dust circle a quiet planet."),
                line(2, Buddy, "These rings are made of old coins. Someone tapped a lot here."),
                line(3, Player, "Who?"),
                line(4, Buddy, "That's what we're going to find out."),
            ],
        },
        StoryChapter {
            id: 3,
            title: "Neon Nebula".into(),
            planet: "Lumen".into(),
            unlock_level: 5,
            dialogues: vec![
                line(1, Narrator, "The nebula glows brighter with every tap."),
                line(2, Buddy, "It's reacting to your rhythm. Try tapping on the beat!"),
                line(3, Player, "It's... singing back."),
            ],
        },
        StoryChapter {
            id: 4,
            title: "The Mint".into(),
            planet: "Aurum Prime".into(),
            unlock_level: 8,
            dialogues: vec![
                line(1, Narrator, "At the core of the TapVerse, an ancient machine stamps coins from starlight."),
                line(2, Buddy, "This is where every coin begins. And it's running out of power."),
                line(3, Player, "Then we keep tapping."),
                line(4, Buddy, "Then we keep tapping. Together."),
            ],
        },
    ]
}
