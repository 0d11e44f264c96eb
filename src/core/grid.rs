//! Cell Grid
//!
//! A 2D grid of cells holding one rendered frame, plus `Region`, the clipped
//! view of a grid that widgets paint into.
//!
//! Every write goes through [`Grid::put`], which keeps the wide character
//! invariant: a leading wide cell is always followed by its continuation,
//! and a continuation never exists without its leading cell.

use serde::{Deserialize, Serialize};
use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthStr;

use super::cell::{Cell, Style};
use super::rect::{Rect, Size};

/// A row of cells
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Row {
    /// The cells in this row
    pub cells: Vec<Cell>,
}

impl Row {
    pub fn new(cols: usize) -> Self {
        Self {
            cells: vec![Cell::default(); cols],
        }
    }

    pub fn clear(&mut self) {
        for cell in &mut self.cells {
            cell.clear();
        }
    }

    /// Text of the row, continuation cells skipped
    pub fn text(&self) -> String {
        self.cells
            .iter()
            .filter(|c| !c.is_continuation())
            .map(|c| c.content.as_str())
            .collect()
    }
}

/// One frame worth of cells
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Grid {
    /// The rows in the grid
    rows: Vec<Row>,
    width: u16,
    height: u16,
    /// Frame counter of the snapshot this grid holds
    generation: u64,
}

impl PartialEq for Grid {
    fn eq(&self, other: &Self) -> bool {
        self.width == other.width && self.height == other.height && self.rows == other.rows
    }
}

impl Eq for Grid {}

impl Grid {
    /// Create a grid of default cells
    pub fn new(size: Size) -> Self {
        Self {
            rows: (0..size.height).map(|_| Row::new(size.width as usize)).collect(),
            width: size.width,
            height: size.height,
            generation: 0,
        }
    }

    /// Set the frame counter
    pub fn with_generation(mut self, generation: u64) -> Self {
        self.generation = generation;
        self
    }

    pub fn width(&self) -> u16 {
        self.width
    }

    pub fn height(&self) -> u16 {
        self.height
    }

    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    /// The whole grid as a rect at the origin
    pub fn area(&self) -> Rect {
        Rect::from_size(self.size())
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Get a reference to a cell
    pub fn cell(&self, x: u16, y: u16) -> Option<&Cell> {
        self.rows
            .get(y as usize)
            .and_then(|r| r.cells.get(x as usize))
    }

    /// Get a mutable reference to a cell.
    ///
    /// Direct mutation bypasses the wide character bookkeeping; prefer
    /// [`Grid::put`] for content and [`Grid::set_style`] for styling.
    pub fn cell_mut(&mut self, x: u16, y: u16) -> Option<&mut Cell> {
        self.rows
            .get_mut(y as usize)
            .and_then(|r| r.cells.get_mut(x as usize))
    }

    /// Get a reference to a row
    pub fn row(&self, y: u16) -> Option<&Row> {
        self.rows.get(y as usize)
    }

    /// Iterate over rows top to bottom
    pub fn rows(&self) -> impl Iterator<Item = &Row> {
        self.rows.iter()
    }

    /// Text of row `y`, empty when out of range
    pub fn row_text(&self, y: u16) -> String {
        self.row(y).map(Row::text).unwrap_or_default()
    }

    /// Reset every cell to default
    pub fn reset(&mut self) {
        for row in &mut self.rows {
            row.clear();
        }
    }

    /// Write one grapheme at (x, y), clipped to `clip`.
    ///
    /// Returns the number of columns consumed: 0 for zero-width graphemes and
    /// out-of-bounds positions, 1 for narrow characters, 2 for wide ones. A
    /// wide grapheme without room for its continuation is written as a blank.
    pub fn put(&mut self, x: u16, y: u16, grapheme: &str, style: Style, clip: Rect) -> u16 {
        let clip = clip.intersection(&self.area());
        if !clip.contains(x, y) {
            return 0;
        }
        let width = grapheme.width().min(2) as u16;
        match width {
            0 => 0,
            1 => {
                self.detach_wide(x, y);
                if let Some(cell) = self.cell_mut(x, y) {
                    *cell = Cell::styled(grapheme, style);
                }
                1
            },
            _ => {
                if x + 1 >= clip.right() {
                    self.detach_wide(x, y);
                    if let Some(cell) = self.cell_mut(x, y) {
                        cell.blank(style);
                    }
                    return 1;
                }
                self.detach_wide(x, y);
                self.detach_wide(x + 1, y);
                if let Some(cell) = self.cell_mut(x, y) {
                    *cell = Cell::styled(grapheme, style);
                }
                if let Some(cell) = self.cell_mut(x + 1, y) {
                    *cell = Cell::continuation(style);
                }
                2
            },
        }
    }

    /// Write `text` starting at (x, y) on a single line, clipped to `clip`.
    /// Returns the column after the last written cell.
    pub fn set_string(&mut self, x: u16, y: u16, text: &str, style: Style, clip: Rect) -> u16 {
        let clip = clip.intersection(&self.area());
        let mut col = x;
        for grapheme in text.graphemes(true) {
            if col >= clip.right() {
                break;
            }
            col += self.put(col, y, grapheme, style, clip);
        }
        col
    }

    /// Apply `style` to every cell in `area`, keeping content
    pub fn set_style(&mut self, area: Rect, style: Style) {
        let area = area.intersection(&self.area());
        for y in area.y..area.bottom() {
            for x in area.x..area.right() {
                if let Some(cell) = self.cell_mut(x, y) {
                    cell.set_style(style);
                }
            }
        }
        // A continuation must keep its leading cell's style
        if area.right() < self.width && !area.is_empty() {
            for y in area.y..area.bottom() {
                if self.cell(area.right(), y).is_some_and(Cell::is_continuation) {
                    if let Some(cell) = self.cell_mut(area.right(), y) {
                        cell.set_style(style);
                    }
                }
            }
        }
        if area.x > 0 && !area.is_empty() {
            for y in area.y..area.bottom() {
                if self.cell(area.x, y).is_some_and(Cell::is_continuation) {
                    if let Some(lead) = self.cell_mut(area.x - 1, y) {
                        lead.set_style(style);
                    }
                }
            }
        }
    }

    /// Blank every cell in `area` with `style`
    pub fn fill(&mut self, area: Rect, style: Style) {
        let area = area.intersection(&self.area());
        for y in area.y..area.bottom() {
            for x in area.x..area.right() {
                self.detach_wide(x, y);
                if let Some(cell) = self.cell_mut(x, y) {
                    cell.blank(style);
                }
            }
        }
    }

    /// Break up a wide character overlapping (x, y) so the cell can be
    /// overwritten on its own. The orphaned half becomes a blank.
    fn detach_wide(&mut self, x: u16, y: u16) {
        let Some(cell) = self.cell(x, y) else {
            return;
        };
        if cell.is_continuation() {
            if x > 0 {
                if let Some(lead) = self.cell_mut(x - 1, y) {
                    let style = lead.style();
                    lead.blank(style);
                }
            }
            if let Some(cell) = self.cell_mut(x, y) {
                let style = cell.style();
                cell.blank(style);
            }
        } else if cell.width() == 2 {
            if let Some(next) = self.cell_mut(x + 1, y) {
                if next.is_continuation() {
                    let style = next.style();
                    next.blank(style);
                }
            }
        }
    }
}

/// Mutable view of a grid clipped to an area.
///
/// Coordinates are absolute grid coordinates; writes outside the region's
/// area are dropped.
pub struct Region<'a> {
    grid: &'a mut Grid,
    area: Rect,
}

impl<'a> Region<'a> {
    pub fn new(grid: &'a mut Grid, area: Rect) -> Self {
        let area = area.intersection(&grid.area());
        Self { grid, area }
    }

    /// The clip area of this region
    pub fn area(&self) -> Rect {
        self.area
    }

    /// Narrow the region to `area`
    pub fn sub(&mut self, area: Rect) -> Region<'_> {
        Region {
            area: self.area.intersection(&area),
            grid: &mut *self.grid,
        }
    }

    pub fn set_string(&mut self, x: u16, y: u16, text: &str, style: Style) -> u16 {
        self.grid.set_string(x, y, text, style, self.area)
    }

    pub fn set_style(&mut self, area: Rect, style: Style) {
        self.grid.set_style(self.area.intersection(&area), style);
    }

    pub fn fill(&mut self, area: Rect, style: Style) {
        self.grid.fill(self.area.intersection(&area), style);
    }

    pub fn cell(&self, x: u16, y: u16) -> Option<&Cell> {
        if !self.area.contains(x, y) {
            return None;
        }
        self.grid.cell(x, y)
    }

    pub fn cell_mut(&mut self, x: u16, y: u16) -> Option<&mut Cell> {
        if !self.area.contains(x, y) {
            return None;
        }
        self.grid.cell_mut(x, y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Color;

    fn grid(width: u16, height: u16) -> Grid {
        Grid::new(Size::new(width, height))
    }

    #[test]
    fn test_grid_new() {
        let g = grid(80, 24);
        assert_eq!(g.width(), 80);
        assert_eq!(g.height(), 24);
        assert_eq!(g.generation(), 0);
        assert!(g.cell(79, 23).unwrap().is_blank());
        assert!(g.cell(80, 0).is_none());
    }

    #[test]
    fn test_equality_ignores_generation() {
        let a = grid(4, 2);
        let b = grid(4, 2).with_generation(7);
        assert_eq!(a, b);
        assert_ne!(a, grid(4, 3));
    }

    #[test]
    fn test_set_string() {
        let mut g = grid(10, 2);
        let area = g.area();
        let end = g.set_string(2, 1, "HI", Style::new().bold(), area);
        assert_eq!(end, 4);
        assert_eq!(g.row_text(1), "  HI      ");
        assert!(g.cell(2, 1).unwrap().modifiers.bold);
    }

    #[test]
    fn test_set_string_clipped() {
        let mut g = grid(10, 1);
        g.set_string(0, 0, "abcdef", Style::default(), Rect::new(0, 0, 3, 1));
        assert_eq!(g.row_text(0), "abc       ");
    }

    #[test]
    fn test_wide_char_occupies_two_cells() {
        let mut g = grid(6, 1);
        let area = g.area();
        let end = g.set_string(0, 0, "中a", Style::default(), area);
        assert_eq!(end, 3);
        assert_eq!(g.cell(0, 0).unwrap().content, "中");
        assert!(g.cell(1, 0).unwrap().is_continuation());
        assert_eq!(g.cell(2, 0).unwrap().content, "a");
        assert_eq!(g.row_text(0), "中a   ");
    }

    #[test]
    fn test_wide_char_at_edge_becomes_blank() {
        let mut g = grid(3, 1);
        let area = g.area();
        g.set_string(2, 0, "中", Style::default(), area);
        assert!(g.cell(2, 0).unwrap().is_blank());
    }

    #[test]
    fn test_overwrite_continuation_blanks_leader() {
        let mut g = grid(4, 1);
        let area = g.area();
        g.set_string(0, 0, "中", Style::default(), area);
        g.set_string(1, 0, "x", Style::default(), area);
        assert!(g.cell(0, 0).unwrap().is_blank());
        assert_eq!(g.cell(1, 0).unwrap().content, "x");
        assert!(!g.cell(1, 0).unwrap().is_continuation());
    }

    #[test]
    fn test_overwrite_leader_blanks_continuation() {
        let mut g = grid(4, 1);
        let area = g.area();
        g.set_string(0, 0, "中", Style::default(), area);
        g.set_string(0, 0, "y", Style::default(), area);
        assert_eq!(g.cell(0, 0).unwrap().content, "y");
        assert!(g.cell(1, 0).unwrap().is_blank());
    }

    #[test]
    fn test_fill_and_style() {
        let mut g = grid(5, 2);
        let red = Style::new().bg(Color::RED);
        g.fill(Rect::new(1, 0, 2, 2), red);
        assert_eq!(g.cell(1, 1).unwrap().bg, Color::RED);
        assert_eq!(g.cell(3, 1).unwrap().bg, Color::Default);

        g.set_string(0, 0, "ab", Style::default(), Rect::new(0, 0, 5, 2));
        g.set_style(Rect::new(0, 0, 1, 1), Style::new().fg(Color::GREEN));
        assert_eq!(g.cell(0, 0).unwrap().content, "a");
        assert_eq!(g.cell(0, 0).unwrap().fg, Color::GREEN);
    }

    #[test]
    fn test_region_clips_writes() {
        let mut g = grid(10, 3);
        {
            let mut region = Region::new(&mut g, Rect::new(2, 1, 3, 1));
            region.set_string(0, 0, "nope", Style::default());
            region.set_string(2, 1, "hello", Style::default());
            assert!(region.cell_mut(0, 0).is_none());
        }
        assert_eq!(g.row_text(0), "          ");
        assert_eq!(g.row_text(1), "  hel     ");
    }

    #[test]
    fn test_region_sub() {
        let mut g = grid(10, 3);
        let mut region = Region::new(&mut g, Rect::new(0, 0, 10, 3));
        let mut inner = region.sub(Rect::new(4, 2, 20, 20));
        assert_eq!(inner.area(), Rect::new(4, 2, 6, 1));
        inner.set_string(4, 2, "xy", Style::default());
        assert_eq!(g.row_text(2), "    xy    ");
    }

    #[test]
    fn test_set_style_zero_width_leaves_continuation() {
        let mut g = grid(4, 1);
        let area = g.area();
        g.set_string(0, 0, "中", Style::default(), area);
        g.set_style(Rect::new(1, 0, 0, 1), Style::new().bold());
        assert_eq!(g.cell(0, 0).unwrap().style(), Style::default());
        assert_eq!(g.cell(1, 0).unwrap().style(), Style::default());

        // Restyling the leader alone carries over to its continuation
        g.set_style(Rect::new(0, 0, 1, 1), Style::new().bold());
        assert_eq!(g.cell(1, 0).unwrap().style(), Style::new().bold());
    }

    #[test]
    fn test_reset() {
        let mut g = grid(3, 1);
        let area = g.area();
        g.set_string(0, 0, "abc", Style::new().bold(), area);
        g.reset();
        assert_eq!(g, grid(3, 1));
    }
}
