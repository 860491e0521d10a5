//! Input plumbing: event types, click targets and pixel-to-cell conversion.
//!
//! Knows nothing about TapVerse itself; the game maps action IDs to commands.

use ratzilla::ratatui::layout::{Position, Rect};

/// Keyboard and pointer input, normalized.
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    Key(char),
    /// A tap on a registered target, carrying its action ID (see `tapverse::actions`).
    Click(u16),
}

/// A screen region (in cells) bound to an action.
#[derive(Debug, Clone)]
pub struct ClickTarget {
    pub rect: Rect,
    pub action_id: u16,
}

impl ClickTarget {
    fn contains(&self, col: u16, row: u16) -> bool {
        self.rect.contains(Position::new(col, row))
    }
}

/// Targets registered by the last frame, plus the grid size they were laid out on.
///
/// Rebuilt every frame by the renderer and read by the pointer handler.
#[derive(Debug, Default)]
pub struct ClickState {
    pub targets: Vec<ClickTarget>,
    pub terminal_cols: u16,
    pub terminal_rows: u16,
}

impl ClickState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the grid size for this frame and drop last frame's targets.
    pub fn begin_frame(&mut self, cols: u16, rows: u16) {
        self.terminal_cols = cols;
        self.terminal_rows = rows;
        self.targets.clear();
    }

    pub fn add_click_target(&mut self, rect: Rect, action_id: u16) {
        self.targets.push(ClickTarget { rect, action_id });
    }

    /// One full-width row of `area`. Rows outside the area are ignored.
    pub fn add_row_target(&mut self, area: Rect, row: u16, action_id: u16) {
        if (area.y..area.bottom()).contains(&row) {
            self.add_click_target(Rect::new(area.x, row, area.width, 1), action_id);
        }
    }

    /// Targets for a row of tab labels.
    ///
    /// `tabs` holds `(label_width, action_id)` for each padded label, in
    /// order, with `separator_width` columns between neighbours. Each target
    /// takes its label plus half of every adjacent separator; the first and
    /// last stretch to the edges of `area`, so the whole bar is tappable.
    pub fn register_tab_targets(&mut self, tabs: &[(u16, u16)], separator_width: u16, area: Rect) {
        let mut left = 0;
        let mut label_start = 0;
        for (i, &(width, action_id)) in tabs.iter().enumerate() {
            let label_end = label_start + width;
            let right = if i + 1 == tabs.len() {
                area.width
            } else {
                (label_end + separator_width / 2).min(area.width)
            };
            if right > left {
                let rect = Rect::new(area.x + left, area.y, right - left, area.height);
                self.add_click_target(rect, action_id);
            }
            left = right;
            label_start = label_end + separator_width;
        }
    }

    /// Action at a cell. Later targets sit on top of earlier ones.
    pub fn hit_test(&self, col: u16, row: u16) -> Option<u16> {
        self.targets
            .iter()
            .rev()
            .find(|t| t.contains(col, row))
            .map(|t| t.action_id)
    }

    /// Cell under a pointer position measured from the grid's top-left
    /// corner, given the grid's size in pixels.
    pub fn cell_at(&self, x: f64, y: f64, grid_width: f64, grid_height: f64) -> Option<(u16, u16)> {
        let col = cell_index(x, grid_width, self.terminal_cols)?;
        let row = cell_index(y, grid_height, self.terminal_rows)?;
        Some((col, row))
    }
}

/// Which of `cells` equal slices of `extent` pixels contains `offset`.
fn cell_index(offset: f64, extent: f64, cells: u16) -> Option<u16> {
    if extent <= 0.0 || cells == 0 || offset < 0.0 {
        return None;
    }
    let index = (offset * f64::from(cells) / extent) as u16;
    (index < cells).then_some(index)
}

/// Phones and narrow windows get the compact layout.
pub fn is_narrow_layout(width: u16) -> bool {
    width < 60
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sized(cols: u16, rows: u16) -> ClickState {
        let mut cs = ClickState::new();
        cs.begin_frame(cols, rows);
        cs
    }

    #[test]
    fn later_targets_win_overlaps() {
        let mut cs = ClickState::new();
        cs.add_click_target(Rect::new(0, 5, 80, 1), 1);
        cs.add_click_target(Rect::new(5, 5, 10, 1), 2);

        assert_eq!(cs.hit_test(7, 5), Some(2));
        assert_eq!(cs.hit_test(0, 5), Some(1));
        assert_eq!(cs.hit_test(15, 5), Some(1));
        assert_eq!(cs.hit_test(7, 6), None);
    }

    #[test]
    fn rect_edges_are_half_open() {
        let mut cs = ClickState::new();
        cs.add_click_target(Rect::new(2, 5, 4, 3), 42);

        assert_eq!(cs.hit_test(2, 5), Some(42));
        assert_eq!(cs.hit_test(5, 7), Some(42));
        assert_eq!(cs.hit_test(6, 5), None);
        assert_eq!(cs.hit_test(2, 8), None);
        assert_eq!(cs.hit_test(1, 5), None);
    }

    #[test]
    fn row_targets_stay_inside_their_area() {
        let mut cs = ClickState::new();
        let area = Rect::new(5, 10, 30, 5);
        cs.add_row_target(area, 9, 1);
        cs.add_row_target(area, 15, 2);
        assert!(cs.targets.is_empty());

        cs.add_row_target(area, 14, 3);
        assert_eq!(cs.hit_test(5, 14), Some(3));
        assert_eq!(cs.hit_test(4, 14), None);
    }

    #[test]
    fn begin_frame_forgets_old_targets() {
        let mut cs = sized(80, 24);
        cs.add_click_target(Rect::new(0, 1, 80, 1), 1);
        cs.begin_frame(40, 30);
        assert_eq!(cs.hit_test(0, 1), None);
        assert_eq!((cs.terminal_cols, cs.terminal_rows), (40, 30));
    }

    #[test]
    fn narrow_layout_threshold() {
        assert!(is_narrow_layout(37));
        assert!(is_narrow_layout(59));
        assert!(!is_narrow_layout(60));
    }

    #[test]
    fn pointer_maps_to_cells() {
        // 10x15 px cells on an 80x30 grid
        let cs = sized(80, 30);
        assert_eq!(cs.cell_at(0.0, 0.0, 800.0, 450.0), Some((0, 0)));
        assert_eq!(cs.cell_at(25.0, 67.0, 800.0, 450.0), Some((2, 4)));
        assert_eq!(cs.cell_at(799.0, 449.0, 800.0, 450.0), Some((79, 29)));
        // Cell heights that are not whole pixels
        let cs = sized(80, 24);
        assert_eq!(cs.cell_at(0.0, 16.0, 800.0, 400.0), Some((0, 0)));
        assert_eq!(cs.cell_at(0.0, 17.0, 800.0, 400.0), Some((0, 1)));
    }

    #[test]
    fn pointer_outside_grid_has_no_cell() {
        let cs = sized(37, 50);
        assert_eq!(cs.cell_at(-3.0, 10.0, 370.0, 750.0), None);
        assert_eq!(cs.cell_at(10.0, 750.0, 370.0, 750.0), None);
        assert_eq!(cs.cell_at(370.0, 10.0, 370.0, 750.0), None);
        assert_eq!(cs.cell_at(10.0, 10.0, 0.0, 750.0), None);
        assert_eq!(ClickState::new().cell_at(10.0, 10.0, 800.0, 450.0), None);
    }

    #[test]
    fn tab_targets_split_separators() {
        // Labels 6, 11 and 12 wide with 1-col separators on a 60-wide bar
        let mut cs = ClickState::new();
        cs.register_tab_targets(&[(6, 10), (11, 11), (12, 12)], 1, Rect::new(0, 0, 60, 1));

        assert_eq!(cs.targets.len(), 3);
        assert_eq!(cs.hit_test(5, 0), Some(10));
        assert_eq!(cs.hit_test(6, 0), Some(11));
        assert_eq!(cs.hit_test(17, 0), Some(11));
        assert_eq!(cs.hit_test(18, 0), Some(12));
        assert_eq!(cs.hit_test(59, 0), Some(12));
    }

    #[test]
    fn wide_separators_are_shared() {
        // " │ " separators: the first column goes left, the rest right
        let mut cs = ClickState::new();
        cs.register_tab_targets(&[(6, 10), (6, 11)], 3, Rect::new(0, 5, 80, 1));
        assert_eq!(cs.hit_test(6, 5), Some(10));
        assert_eq!(cs.hit_test(7, 5), Some(11));
        assert_eq!(cs.hit_test(79, 5), Some(11));
    }

    #[test]
    fn tab_targets_honour_area_offset_and_height() {
        let mut cs = ClickState::new();
        cs.register_tab_targets(&[(6, 10), (6, 11)], 1, Rect::new(5, 3, 30, 2));
        assert_eq!(cs.hit_test(5, 4), Some(10));
        assert_eq!(cs.hit_test(4, 3), None);
        assert_eq!(cs.hit_test(34, 3), Some(11));
        assert_eq!(cs.hit_test(35, 3), None);

        let mut cs = ClickState::new();
        cs.register_tab_targets(&[], 1, Rect::new(0, 0, 80, 1));
        assert!(cs.targets.is_empty());
    }

    #[test]
    fn pointer_to_action_pipeline() {
        let mut cs = sized(80, 30);
        cs.register_tab_targets(&[(5, 10), (6, 11)], 1, Rect::new(0, 4, 80, 1));
        cs.add_click_target(Rect::new(0, 8, 80, 3), 0);

        let (col, row) = cs.cell_at(25.0, 67.0, 800.0, 450.0).unwrap();
        assert_eq!(cs.hit_test(col, row), Some(10));
        let (col, row) = cs.cell_at(300.0, 135.0, 800.0, 450.0).unwrap();
        assert_eq!(cs.hit_test(col, row), Some(0));
    }
}
