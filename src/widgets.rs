//! Widgets that register their own click targets while rendering, so a
//! label and the cells that react to a tap on it come from the same layout.

use ratzilla::ratatui::layout::Rect;
use ratzilla::ratatui::style::{Color, Style};
use ratzilla::ratatui::text::{Line, Span};
use ratzilla::ratatui::widgets::{Block, Borders, Paragraph, Wrap};
use ratzilla::ratatui::Frame;

use crate::input::ClickState;

/// One row of tab labels joined by a separator.
///
/// Targets are computed from the padded label widths, so labels that change
/// length between frames ("Quests(2)") stay hit-testable.
pub struct TabBar<'a> {
    labels: Vec<(String, Style, u16)>,
    separator: &'a str,
    block: Option<Block<'a>>,
}

impl<'a> TabBar<'a> {
    pub fn new(separator: &'a str) -> Self {
        Self {
            labels: Vec::new(),
            separator,
            block: None,
        }
    }

    pub fn tab(mut self, label: impl Into<String>, style: Style, action_id: u16) -> Self {
        self.labels.push((label.into(), style, action_id));
        self
    }

    pub fn block(mut self, block: Block<'a>) -> Self {
        self.block = Some(block);
        self
    }

    pub fn render(self, f: &mut Frame, area: Rect, cs: &mut ClickState) {
        let separator_width = Span::raw(self.separator).width() as u16;
        let mut spans = Vec::with_capacity(self.labels.len() * 2);
        let mut widths = Vec::with_capacity(self.labels.len());

        for (label, style, action_id) in self.labels {
            if !widths.is_empty() {
                spans.push(Span::styled(self.separator, Style::default().fg(Color::DarkGray)));
            }
            let padded = Span::styled(format!(" {} ", label), style);
            widths.push((padded.width() as u16, action_id));
            spans.push(padded);
        }

        // Columns come from inside the border; rows cover the whole bar so
        // taps on the border still land.
        let inner = self.block.as_ref().map_or(area, |b| b.inner(area));
        let mut paragraph = Paragraph::new(Line::from(spans));
        if let Some(block) = self.block {
            paragraph = paragraph.block(block);
        }
        f.render_widget(paragraph, area);

        let bar = Rect::new(inner.x, area.y, inner.width, area.height.max(1));
        cs.register_tab_targets(&widths, separator_width, bar);
    }
}

/// Where a list's lines land inside its widget area.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Viewport {
    /// Rows above the first line (a top border).
    pub top: u16,
    /// Rows below the last visible line (a bottom border).
    pub bottom: u16,
    /// Visual rows scrolled out of view.
    pub scroll: u16,
    /// Width the paragraph wraps at; 0 when it does not wrap.
    pub wrap_width: u16,
}

impl Viewport {
    pub fn for_borders(borders: Borders) -> Self {
        Self {
            top: u16::from(borders.contains(Borders::TOP)),
            bottom: u16::from(borders.contains(Borders::BOTTOM)),
            ..Self::default()
        }
    }

    pub fn scrolled(self, scroll: u16) -> Self {
        Self { scroll, ..self }
    }

    pub fn wrapped(self, wrap_width: u16) -> Self {
        Self { wrap_width, ..self }
    }
}

/// Paragraph lines, some of them bound to an action.
///
/// Because the action is attached to the line itself, inserting lines above
/// a button moves its target with it.
pub struct ClickableList<'a> {
    lines: Vec<(Line<'a>, Option<u16>)>,
}

impl<'a> ClickableList<'a> {
    pub fn new() -> Self {
        Self { lines: Vec::new() }
    }

    pub fn push(&mut self, line: Line<'a>) {
        self.lines.push((line, None));
    }

    pub fn push_clickable(&mut self, line: Line<'a>, action_id: u16) {
        self.lines.push((line, Some(action_id)));
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Rows the lines fill when wrapped (untrimmed) at `width`.
    pub fn visual_height(&self, width: u16) -> u16 {
        self.lines.iter().map(|(line, _)| row_count(line, width)).sum()
    }

    pub fn into_lines(self) -> Vec<Line<'a>> {
        self.lines.into_iter().map(|(line, _)| line).collect()
    }

    /// Register a row target for every visible row of every clickable line.
    /// `area` is the whole widget, borders included.
    pub fn register_targets(&self, area: Rect, cs: &mut ClickState, view: Viewport) {
        let first_row = area.y + view.top;
        let end_row = area.bottom().saturating_sub(view.bottom);

        let mut visual_row: u16 = 0;
        for (line, action) in &self.lines {
            let rows = row_count(line, view.wrap_width);
            if let Some(action_id) = *action {
                for vr in visual_row..visual_row + rows {
                    if vr < view.scroll {
                        continue;
                    }
                    let screen_row = first_row + (vr - view.scroll);
                    if screen_row >= end_row {
                        break;
                    }
                    cs.add_row_target(area, screen_row, action_id);
                }
            }
            visual_row += rows;
        }
    }
}

/// Rows one line takes in a `Wrap { trim: false }` paragraph, as ratatui
/// lays it out. Width 0 means no wrapping. An empty line still takes a row.
fn row_count(line: &Line, width: u16) -> u16 {
    if width == 0 {
        return 1;
    }
    Paragraph::new(line.clone())
        .wrap(Wrap { trim: false })
        .line_count(width)
        .max(1) as u16
}
