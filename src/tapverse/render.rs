//! TapVerse rendering (read-only from the store).

use std::cell::RefCell;
use std::rc::Rc;

use ratzilla::ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratzilla::ratatui::style::{Color, Modifier, Style};
use ratzilla::ratatui::text::{Line, Span};
use ratzilla::ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};
use ratzilla::ratatui::Frame;

use crate::input::{is_narrow_layout, ClickState};
use crate::time::{Clock, Millis, MS_PER_SECOND};
use crate::widgets::{ClickableList, TabBar, Viewport};

use super::actions::*;
use super::catalog::{ARCADE_GAMES, SKINS};
use super::logic::{format_number, is_game_available};
use super::rhythm::Judgement;
use super::save::KeyValueStore;
use super::state::{BoostKind, QuestPeriod, QuestStatus, Speaker, XP_PER_LEVEL};
use super::{Tab, TapverseGame};

/// Coin art per skin, 3 lines, 9 columns.
fn coin_art(skin: &str) -> ([&'static str; 3], Color) {
    match skin {
        "neon" => (["  ╭═◎═╮  ", "  ◎ $ ◎  ", "  ╰═◎═╯  "], Color::Magenta),
        "diamond" => (["   ╱◆╲   ", "  ◆ $ ◆  ", "   ╲◆╱   "], Color::Cyan),
        _ => (["  ╭─●─╮  ", "  ● $ ●  ", "  ╰─●─╯  "], Color::Yellow),
    }
}

pub fn render<S: KeyValueStore, C: Clock>(
    game: &TapverseGame<S, C>,
    f: &mut Frame,
    area: Rect,
    click_state: &Rc<RefCell<ClickState>>,
) {
    let is_narrow = is_narrow_layout(area.width);
    let borders = borders_for(area.width);
    let now = game.store.now();

    // Feed panel on the right when wide enough, below the content otherwise.
    let (main_area, side_area) = if area.width >= 100 {
        let h_chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(62), Constraint::Percentage(38)])
            .split(area);
        (h_chunks[0], Some(h_chunks[1]))
    } else {
        (area, None)
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(5),                              // Header
            Constraint::Length(if is_narrow { 1 } else { 3 }), // Tabs
            Constraint::Min(8),                                 // Content
            Constraint::Length(if side_area.is_some() { 0 } else { 6 }), // Feed
        ])
        .split(main_area);

    render_header(game, f, chunks[0], borders, now);
    render_tab_bar(game, f, chunks[1], is_narrow, click_state);
    match game.tab {
        Tab::Tap => render_tap(game, f, chunks[2], borders, now, click_state),
        Tab::Shop => render_shop(game, f, chunks[2], borders, click_state),
        Tab::Quests => render_quests(game, f, chunks[2], borders, click_state),
        Tab::Story => render_story(game, f, chunks[2], borders, click_state),
        Tab::Arcade => render_arcade(game, f, chunks[2], borders, now, click_state),
        Tab::Profile => render_profile(game, f, chunks[2], borders, click_state),
    }
    match side_area {
        Some(side) => render_feed(game, f, side, Borders::ALL, now),
        None => render_feed(game, f, chunks[3], borders, now),
    }

    if !game.store.onboarding_completed() {
        render_onboarding(game, f, area, click_state);
    }
}

fn borders_for(width: u16) -> Borders {
    if is_narrow_layout(width) {
        Borders::TOP | Borders::BOTTOM
    } else {
        Borders::ALL
    }
}

fn bar(ratio: f64, width: usize) -> String {
    let filled = (ratio.clamp(0.0, 1.0) * width as f64).round() as usize;
    format!("{}{}", "█".repeat(filled), "░".repeat(width - filled))
}

/// `m:ss`, rounded up to the next second.
fn clock_text(ms: Millis) -> String {
    let secs = (ms.max(0) + MS_PER_SECOND - 1) / MS_PER_SECOND;
    format!("{}:{:02}", secs / 60, secs % 60)
}

fn key_char(index: usize) -> char {
    char::from_digit((index + 1) as u32, 10).unwrap_or('?')
}

// ── Header & Tabs ───────────────────────────────────────────

fn render_header<S: KeyValueStore, C: Clock>(
    game: &TapverseGame<S, C>,
    f: &mut Frame,
    area: Rect,
    borders: Borders,
    now: Millis,
) {
    let p = &game.store.state().player;

    let mut coin_line = vec![
        Span::styled(" Coins ", Style::default().fg(Color::Gray)),
        Span::styled(
            format_number(p.coins),
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            format!("  +{}/tap", format_number(p.tap_value(now))),
            Style::default().fg(Color::DarkGray),
        ),
    ];
    for &kind in BoostKind::all() {
        let boost = p.boosts.get(kind);
        if boost.is_active_at(now) {
            coin_line.push(Span::styled(
                format!("  {} {}s", kind.name(), boost.remaining_secs(now)),
                Style::default().fg(Color::LightRed),
            ));
        }
    }

    let xp_ratio = p.xp_into_level() as f64 / XP_PER_LEVEL as f64;
    let level_line = Line::from(vec![
        Span::styled(" Lv ", Style::default().fg(Color::Gray)),
        Span::styled(
            p.level.to_string(),
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            format!(" {} {}/{} XP", bar(xp_ratio, 10), p.xp_into_level(), XP_PER_LEVEL),
            Style::default().fg(Color::Cyan),
        ),
        Span::styled(
            format!("  Streak {}d", p.streak_days),
            Style::default().fg(Color::Magenta),
        ),
    ]);

    let regen = match game.store.next_energy_in() {
        Some(ms) => format!("  +1 in {}s", (ms + MS_PER_SECOND - 1) / MS_PER_SECOND),
        None => "  full".to_string(),
    };
    let energy_color = if p.energy == 0 { Color::Red } else { Color::Green };
    let energy_line = Line::from(vec![
        Span::styled(" Energy ", Style::default().fg(Color::Gray)),
        Span::styled(
            bar(p.energy as f64 / p.max_energy.max(1) as f64, 12),
            Style::default().fg(energy_color),
        ),
        Span::styled(
            format!(" {}/{}", p.energy, p.max_energy),
            Style::default().fg(Color::White),
        ),
        Span::styled(regen, Style::default().fg(Color::DarkGray)),
    ]);

    let block = Block::default()
        .borders(borders)
        .border_style(Style::default().fg(Color::Yellow))
        .title(Span::styled(
            " TapVerse ",
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        ));
    let lines = vec![Line::from(coin_line), level_line, energy_line];
    f.render_widget(Paragraph::new(lines).block(block), area);
}

fn tab_color(tab: Tab) -> Color {
    match tab {
        Tab::Tap => Color::Yellow,
        Tab::Shop => Color::Green,
        Tab::Quests => Color::Cyan,
        Tab::Story => Color::Magenta,
        Tab::Arcade => Color::LightRed,
        Tab::Profile => Color::Blue,
    }
}

fn render_tab_bar<S: KeyValueStore, C: Clock>(
    game: &TapverseGame<S, C>,
    f: &mut Frame,
    area: Rect,
    is_narrow: bool,
    click_state: &Rc<RefCell<ClickState>>,
) {
    let state = game.store.state();
    let claimable = state.claimable_quest_count();
    let unread: usize = state
        .chapters
        .iter()
        .filter(|c| state.player.unlocked_chapters.contains(&c.id))
        .map(|c| c.unread_count())
        .sum();

    let mut bar = TabBar::new("│");
    for tab in Tab::ALL {
        let mut label = if is_narrow {
            match tab {
                Tab::Quests => "Qst".to_string(),
                Tab::Arcade => "Arc".to_string(),
                Tab::Profile => "Me".to_string(),
                _ => tab.label().to_string(),
            }
        } else {
            format!("{} {}", tab.key().to_ascii_uppercase(), tab.label())
        };
        match tab {
            Tab::Quests if claimable > 0 => label = format!("{}({})", label, claimable),
            Tab::Story if unread > 0 => label = format!("{}•", label),
            _ => {}
        }
        let color = tab_color(tab);
        let style = if tab == game.tab {
            Style::default()
                .fg(Color::Black)
                .bg(color)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(color)
        };
        bar = bar.tab(label, style, tab.action_id());
    }
    if !is_narrow {
        bar = bar.block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::DarkGray)),
        );
    }

    let mut cs = click_state.borrow_mut();
    bar.render(f, area, &mut cs);
}

// ── Shared list helpers ─────────────────────────────────────

/// A ` [K] label` row bound to an action.
fn push_button(cl: &mut ClickableList, key: char, label: String, action_id: u16, enabled: bool) {
    let (key_style, label_style) = if enabled {
        (
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            Style::default().fg(Color::White),
        )
    } else {
        (
            Style::default()
                .fg(Color::DarkGray)
                .add_modifier(Modifier::BOLD),
            Style::default().fg(Color::DarkGray),
        )
    };
    cl.push_clickable(
        Line::from(vec![
            Span::styled(format!(" [{}] ", key.to_ascii_uppercase()), key_style),
            Span::styled(label, label_style),
        ]),
        action_id,
    );
}

fn push_heading(cl: &mut ClickableList, text: &str, color: Color) {
    cl.push(Line::from(Span::styled(
        format!(" {}", text),
        Style::default().fg(color).add_modifier(Modifier::BOLD),
    )));
}

fn push_note(cl: &mut ClickableList, text: String) {
    cl.push(Line::from(Span::styled(
        text,
        Style::default().fg(Color::DarkGray),
    )));
}

fn titled_block(title: &str, color: Color, borders: Borders) -> Block<'static> {
    Block::default()
        .borders(borders)
        .border_style(Style::default().fg(color))
        .title(Span::styled(
            format!(" {} ", title),
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        ))
}

/// Render an unwrapped list in a block and register its click targets.
fn render_list(
    f: &mut Frame,
    area: Rect,
    cl: ClickableList<'static>,
    block: Block<'static>,
    borders: Borders,
    click_state: &Rc<RefCell<ClickState>>,
) {
    cl.register_targets(
        area,
        &mut click_state.borrow_mut(),
        Viewport::for_borders(borders),
    );
    f.render_widget(Paragraph::new(cl.into_lines()).block(block), area);
}

// ── Tap ─────────────────────────────────────────────────────

fn render_tap<S: KeyValueStore, C: Clock>(
    game: &TapverseGame<S, C>,
    f: &mut Frame,
    area: Rect,
    borders: Borders,
    now: Millis,
    click_state: &Rc<RefCell<ClickState>>,
) {
    let store = &game.store;
    let p = &store.state().player;
    let mut cl = ClickableList::new();

    let (art, color) = coin_art(&p.selected_skin);
    let art_style = if p.energy == 0 {
        Style::default().fg(Color::DarkGray)
    } else {
        Style::default().fg(color).add_modifier(Modifier::BOLD)
    };
    for row in art {
        cl.push_clickable(
            Line::from(Span::styled(format!("      {}", row), art_style)),
            TAP,
        );
    }
    push_button(
        &mut cl,
        't',
        format!("Tap!  +{} coins", format_number(p.tap_value(now))),
        TAP,
        p.energy > 0,
    );

    // Rhythm mode
    let rhythm = store.rhythm();
    if rhythm.enabled {
        let pattern = rhythm.pattern();
        push_button(&mut cl, 'r', "Rhythm: ON".to_string(), TOGGLE_RHYTHM, true);
        push_button(
            &mut cl,
            'n',
            format!(
                "Beat: {} {} x{:.1}",
                pattern.name,
                "★".repeat(usize::from(pattern.difficulty)),
                pattern.multiplier
            ),
            CYCLE_PATTERN,
            true,
        );
        let lit = (rhythm.beat_progress(now) * 5.0).ceil() as usize;
        let mut spans = vec![
            Span::styled(
                format!("      {}{}", "●".repeat(lit), "○".repeat(5 - lit.min(5))),
                Style::default().fg(Color::Magenta),
            ),
            Span::styled(
                format!("  combo {} (best {})  ", rhythm.combo, rhythm.best_combo),
                Style::default().fg(Color::Gray),
            ),
        ];
        if let Some(hit) = game.last_hit {
            let (text, color) = match hit.judgement {
                Judgement::Perfect => ("PERFECT!", Color::Green),
                Judgement::Good => ("Good", Color::Yellow),
                Judgement::Miss => ("Miss", Color::Red),
            };
            spans.push(Span::styled(
                text,
                Style::default().fg(color).add_modifier(Modifier::BOLD),
            ));
        }
        cl.push(Line::from(spans));
    } else {
        push_button(&mut cl, 'r', "Rhythm: off".to_string(), TOGGLE_RHYTHM, true);
    }

    cl.push(Line::from(""));
    push_heading(&mut cl, "Boosts (watch an ad)", Color::LightRed);
    let pending = store.pending_ad();
    for (i, &kind) in BoostKind::all().iter().enumerate() {
        let boost = p.boosts.get(kind);
        let live = boost.is_active_at(now);
        let status = if live {
            format!("active {}", clock_text(boost.remaining_ms(now)))
        } else {
            format!("{}s", store.config().boost_durations.for_kind(kind))
        };
        push_button(
            &mut cl,
            key_char(i),
            format!("{:<13} {}", kind.name(), status),
            BOOST_AD_BASE + i as u16,
            !live && pending.is_none(),
        );
    }

    match pending {
        Some(ad) => push_note(
            &mut cl,
            format!(
                "      Ad playing {} {}",
                bar(ad.progress(now), 10),
                ad.reward.describe()
            ),
        ),
        None => push_button(&mut cl, 'w', "Watch a sponsor ad".to_string(), WATCH_AD, true),
    }

    let block = titled_block("Tap", tab_color(Tab::Tap), borders);
    render_list(f, area, cl, block, borders, click_state);
}

// ── Shop ────────────────────────────────────────────────────

fn render_shop<S: KeyValueStore, C: Clock>(
    game: &TapverseGame<S, C>,
    f: &mut Frame,
    area: Rect,
    borders: Borders,
    click_state: &Rc<RefCell<ClickState>>,
) {
    let state = game.store.state();
    let mut cl = ClickableList::new();

    for (i, up) in state.upgrades.iter().enumerate() {
        let affordable = state.player.coins >= up.cost;
        push_button(
            &mut cl,
            key_char(i),
            format!(
                "{:<16} x{:<3} {:>8} coins",
                up.name,
                up.owned,
                format_number(up.cost)
            ),
            BUY_UPGRADE_BASE + i as u16,
            affordable,
        );
        push_note(&mut cl, format!("      {}", up.description));
    }

    let block = titled_block("Shop", tab_color(Tab::Shop), borders);
    render_list(f, area, cl, block, borders, click_state);
}

// ── Quests ──────────────────────────────────────────────────

fn render_quests<S: KeyValueStore, C: Clock>(
    game: &TapverseGame<S, C>,
    f: &mut Frame,
    area: Rect,
    borders: Borders,
    click_state: &Rc<RefCell<ClickState>>,
) {
    let quests = &game.store.state().quests;
    let mut cl = ClickableList::new();

    for (period, heading) in [
        (QuestPeriod::Daily, "Daily"),
        (QuestPeriod::Weekly, "Weekly"),
    ] {
        push_heading(&mut cl, heading, Color::Cyan);
        for (i, q) in quests.iter().enumerate().filter(|(_, q)| q.period == period) {
            let status = match q.status {
                QuestStatus::Claimed => "claimed".to_string(),
                QuestStatus::Completed => format!("claim +{}", format_number(q.reward_coins)),
                QuestStatus::InProgress => format!(
                    "{} {}/{}",
                    bar(q.ratio(), 6),
                    format_number(q.progress.min(q.requirement)),
                    format_number(q.requirement)
                ),
            };
            push_button(
                &mut cl,
                key_char(i),
                format!("{:<16} {}", q.title, status),
                CLAIM_QUEST_BASE + i as u16,
                q.is_claimable(),
            );
        }
    }

    let block = titled_block("Quests", tab_color(Tab::Quests), borders);
    render_list(f, area, cl, block, borders, click_state);
}

// ── Story ───────────────────────────────────────────────────

fn render_story<S: KeyValueStore, C: Clock>(
    game: &TapverseGame<S, C>,
    f: &mut Frame,
    area: Rect,
    borders: Borders,
    click_state: &Rc<RefCell<ClickState>>,
) {
    let state = game.store.state();
    let p = &state.player;
    let color = tab_color(Tab::Story);

    // Chapter list
    let mut cl = ClickableList::new();
    for (i, ch) in state.chapters.iter().enumerate() {
        let unlocked = p.unlocked_chapters.contains(&ch.id);
        let marker = if ch.id == p.current_chapter { "▸" } else { " " };
        let label = if unlocked {
            let unread = ch.unread_count();
            let suffix = if unread > 0 {
                format!("  {} new", unread)
            } else {
                String::new()
            };
            format!("{}{} ({}){}", marker, ch.title, ch.planet, suffix)
        } else {
            format!(" Locked until level {}", ch.unlock_level)
        };
        push_button(
            &mut cl,
            key_char(i),
            label,
            SELECT_CHAPTER_BASE + i as u16,
            unlocked,
        );
    }
    let list_height = cl.len() as u16 + 2;
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(list_height), Constraint::Min(3)])
        .split(area);
    render_list(
        f,
        chunks[0],
        cl,
        titled_block("Chapters", color, borders),
        borders,
        click_state,
    );

    // Transcript of the current chapter, scrolled to its end
    let Some(chapter) = state.chapter(p.current_chapter) else {
        return;
    };
    let buddy = &game.store.buddy().name;
    let mut cl = ClickableList::new();
    for d in chapter.dialogues.iter().filter(|d| d.read) {
        let (who, who_color) = match d.speaker {
            Speaker::Player => ("You: ".to_string(), Color::Green),
            Speaker::Buddy => (format!("{}: ", buddy), Color::Magenta),
            Speaker::Narrator => (String::new(), Color::Gray),
        };
        cl.push(Line::from(vec![
            Span::styled(
                format!(" {}", who),
                Style::default().fg(who_color).add_modifier(Modifier::BOLD),
            ),
            Span::styled(d.text.clone(), Style::default().fg(Color::White)),
        ]));
    }
    let has_unread = chapter.unread_count() > 0;
    let next_label = if has_unread { "Next line" } else { "Chapter complete" };
    push_button(&mut cl, 'n', next_label.to_string(), READ_NEXT, has_unread);

    let area = chunks[1];
    let block = titled_block(&format!("Chapter {}", chapter.id), color, borders);
    let inner = block.inner(area);
    let scroll = cl.visual_height(inner.width).saturating_sub(inner.height);
    let view = Viewport::for_borders(borders)
        .scrolled(scroll)
        .wrapped(inner.width);

    cl.register_targets(area, &mut click_state.borrow_mut(), view);
    f.render_widget(
        Paragraph::new(cl.into_lines())
            .block(block)
            .wrap(Wrap { trim: false })
            .scroll((scroll, 0)),
        area,
    );
}

// ── Arcade ──────────────────────────────────────────────────

fn render_arcade<S: KeyValueStore, C: Clock>(
    game: &TapverseGame<S, C>,
    f: &mut Frame,
    area: Rect,
    borders: Borders,
    now: Millis,
    click_state: &Rc<RefCell<ClickState>>,
) {
    let p = &game.store.state().player;
    let mut cl = ClickableList::new();

    for (i, g) in ARCADE_GAMES.iter().enumerate() {
        let temp_left = p
            .temp_unlocked_arcade_games
            .iter()
            .find(|u| u.game_id == g.id && now < u.unlock_end_time)
            .map(|u| u.unlock_end_time - now);
        let status = if p.level >= g.unlock_level {
            "ready".to_string()
        } else if let Some(left) = temp_left {
            format!("ready, {} left", clock_text(left))
        } else {
            format!("level {} or watch an ad", g.unlock_level)
        };
        push_button(
            &mut cl,
            key_char(i),
            format!("{:<15} {}", g.name, status),
            UNLOCK_GAME_BASE + i as u16,
            is_game_available(p, g, now) || game.store.pending_ad().is_none(),
        );
        push_note(&mut cl, format!("      {}", g.description));
    }

    let block = titled_block("Arcade", tab_color(Tab::Arcade), borders);
    render_list(f, area, cl, block, borders, click_state);
}

// ── Profile ─────────────────────────────────────────────────

fn render_profile<S: KeyValueStore, C: Clock>(
    game: &TapverseGame<S, C>,
    f: &mut Frame,
    area: Rect,
    borders: Borders,
    click_state: &Rc<RefCell<ClickState>>,
) {
    let p = &game.store.state().player;
    let rhythm = game.store.rhythm();
    let mut cl = ClickableList::new();

    let stat = |label: &str, value: String| {
        Line::from(vec![
            Span::styled(format!(" {:<16}", label), Style::default().fg(Color::Gray)),
            Span::styled(value, Style::default().fg(Color::White)),
        ])
    };
    cl.push(stat("Companion", game.store.buddy().name.clone()));
    cl.push(stat("Total taps", format_number(p.total_taps as f64)));
    cl.push(stat("Coins earned", format_number(p.total_coins_earned)));
    cl.push(stat("Purchases", p.total_purchases.to_string()));
    cl.push(stat("Ads watched", p.total_ads_watched.to_string()));
    cl.push(stat("Best combo", rhythm.best_combo.to_string()));
    cl.push(Line::from(""));

    push_heading(&mut cl, "Skins", Color::Blue);
    for (i, skin) in SKINS.iter().enumerate() {
        let unlocked = p.unlocked_skins.contains(skin.id);
        let status = if p.selected_skin == skin.id {
            "selected".to_string()
        } else if unlocked {
            "unlocked".to_string()
        } else {
            format!("level {}", skin.unlock_level)
        };
        push_button(
            &mut cl,
            key_char(i),
            format!("{:<13} {}", skin.name, status),
            SELECT_SKIN_BASE + i as u16,
            unlocked,
        );
    }
    cl.push(Line::from(""));

    push_button(&mut cl, 'e', "Refill energy".to_string(), RESET_ENERGY, true);
    let reset_label = if game.confirm_reset {
        "Erase ALL progress? Press again to confirm"
    } else {
        "Reset progress"
    };
    push_button(&mut cl, 'x', reset_label.to_string(), RESET_PROGRESS, true);

    let block = titled_block("Profile", tab_color(Tab::Profile), borders);
    render_list(f, area, cl, block, borders, click_state);
}

// ── Companion & Log ─────────────────────────────────────────

fn render_feed<S: KeyValueStore, C: Clock>(
    game: &TapverseGame<S, C>,
    f: &mut Frame,
    area: Rect,
    borders: Borders,
    now: Millis,
) {
    if area.height == 0 {
        return;
    }
    let buddy = game.store.buddy();
    let mut lines = vec![match buddy.current(now) {
        Some(msg) => Line::from(vec![
            Span::styled(
                format!(" {}: ", buddy.name),
                Style::default()
                    .fg(Color::Magenta)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(msg.text.clone(), Style::default().fg(Color::White)),
        ]),
        None => Line::from(Span::styled(
            format!(" {} is cheering you on.", buddy.name),
            Style::default().fg(Color::DarkGray),
        )),
    }];

    let visible = area.height.saturating_sub(3) as usize;
    let start = game.log.len().saturating_sub(visible);
    for entry in &game.log[start..] {
        let style = if entry.important {
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::Gray)
        };
        lines.push(Line::from(Span::styled(format!(" {}", entry.text), style)));
    }

    let block = Block::default()
        .borders(borders)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(" Log ");
    f.render_widget(Paragraph::new(lines).block(block).wrap(Wrap { trim: false }), area);
}

// ── Onboarding ──────────────────────────────────────────────

fn render_onboarding<S: KeyValueStore, C: Clock>(
    game: &TapverseGame<S, C>,
    f: &mut Frame,
    area: Rect,
    click_state: &Rc<RefCell<ClickState>>,
) {
    let width = area.width.min(50);
    let height = area.height.min(11);
    let popup = Rect::new(
        area.x + (area.width - width) / 2,
        area.y + (area.height - height) / 2,
        width,
        height,
    );

    let name = &game.store.buddy().name;
    let lines = vec![
        Line::from(Span::styled(
            "Welcome to TapVerse!",
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(format!("I'm {}, your companion.", name)),
        Line::from("Tap for coins, spend them in the Shop,"),
        Line::from("finish Quests and unlock the Story."),
        Line::from("Energy refills over time."),
        Line::from(""),
        Line::from(Span::styled(
            "Press any key or tap to start",
            Style::default().fg(Color::Cyan),
        )),
    ];
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow));
    f.render_widget(Clear, popup);
    f.render_widget(
        Paragraph::new(lines)
            .block(block)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true }),
        popup,
    );

    // Registered last, so it wins over everything underneath.
    click_state
        .borrow_mut()
        .add_click_target(area, DISMISS_ONBOARDING);
}
