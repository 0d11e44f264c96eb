//! Grid Cell
//!
//! Represents a single cell in the grid, containing a grapheme and its
//! associated styling attributes.

use serde::{Deserialize, Serialize};
use unicode_width::UnicodeWidthStr;

/// Content of a blank cell
pub const BLANK: &str = " ";

/// A single cell in the grid
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cell {
    /// The grapheme in this cell. Empty for continuation cells of wide
    /// characters, `" "` for blank cells.
    pub content: String,
    /// Foreground color
    pub fg: Color,
    /// Background color
    pub bg: Color,
    /// Text modifiers
    pub modifiers: Modifiers,
    /// This cell is the second half of a wide character
    pub continuation: bool,
}

impl Default for Cell {
    fn default() -> Self {
        Self {
            content: BLANK.to_string(),
            fg: Color::Default,
            bg: Color::Default,
            modifiers: Modifiers::default(),
            continuation: false,
        }
    }
}

impl Cell {
    /// Create a new cell with a single character
    pub fn new(c: char) -> Self {
        Self {
            content: c.to_string(),
            ..Default::default()
        }
    }

    /// Create a new cell with content and style
    pub fn styled(content: impl Into<String>, style: Style) -> Self {
        Self {
            content: content.into(),
            fg: style.fg,
            bg: style.bg,
            modifiers: style.modifiers,
            continuation: false,
        }
    }

    /// Create the continuation half of a wide character
    pub fn continuation(style: Style) -> Self {
        Self {
            content: String::new(),
            fg: style.fg,
            bg: style.bg,
            modifiers: style.modifiers,
            continuation: true,
        }
    }

    /// The style shared by every cell of a run
    pub fn style(&self) -> Style {
        Style {
            fg: self.fg,
            bg: self.bg,
            modifiers: self.modifiers,
        }
    }

    /// Replace the style, keeping the content
    pub fn set_style(&mut self, style: Style) {
        self.fg = style.fg;
        self.bg = style.bg;
        self.modifiers = style.modifiers;
    }

    /// Check if this cell is blank with the default style
    pub fn is_blank(&self) -> bool {
        self.content == BLANK && self.style() == Style::default() && !self.continuation
    }

    /// Check if this cell is a wide character placeholder
    /// (the second cell of a double-width character)
    pub fn is_continuation(&self) -> bool {
        self.continuation
    }

    /// Get the display width of this cell's content
    pub fn width(&self) -> usize {
        if self.continuation {
            return 0;
        }
        self.content.width()
    }

    /// Reset the cell to a blank with the given style
    pub fn blank(&mut self, style: Style) {
        self.content.clear();
        self.content.push_str(BLANK);
        self.set_style(style);
        self.continuation = false;
    }

    /// Clear the cell to default state
    pub fn clear(&mut self) {
        self.blank(Style::default());
    }
}

/// Color representation supporting indexed and RGB colors
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Color {
    /// Default terminal color (foreground or background)
    #[default]
    Default,
    /// 256-color palette index
    Indexed(u8),
    /// 24-bit RGB color
    Rgb(u8, u8, u8),
}

impl Color {
    /// Standard ANSI colors (0-7)
    pub const BLACK: Color = Color::Indexed(0);
    pub const RED: Color = Color::Indexed(1);
    pub const GREEN: Color = Color::Indexed(2);
    pub const YELLOW: Color = Color::Indexed(3);
    pub const BLUE: Color = Color::Indexed(4);
    pub const MAGENTA: Color = Color::Indexed(5);
    pub const CYAN: Color = Color::Indexed(6);
    pub const WHITE: Color = Color::Indexed(7);

    /// Bright ANSI colors (8-15)
    pub const BRIGHT_BLACK: Color = Color::Indexed(8);
    pub const BRIGHT_RED: Color = Color::Indexed(9);
    pub const BRIGHT_GREEN: Color = Color::Indexed(10);
    pub const BRIGHT_YELLOW: Color = Color::Indexed(11);
    pub const BRIGHT_BLUE: Color = Color::Indexed(12);
    pub const BRIGHT_MAGENTA: Color = Color::Indexed(13);
    pub const BRIGHT_CYAN: Color = Color::Indexed(14);
    pub const BRIGHT_WHITE: Color = Color::Indexed(15);

    /// Convert a 256-color index to RGB
    /// This implements the standard xterm 256-color palette
    pub fn indexed_to_rgb(index: u8) -> (u8, u8, u8) {
        match index {
            0 => (0, 0, 0),
            1 => (205, 0, 0),
            2 => (0, 205, 0),
            3 => (205, 205, 0),
            4 => (0, 0, 238),
            5 => (205, 0, 205),
            6 => (0, 205, 205),
            7 => (229, 229, 229),
            8 => (127, 127, 127),
            9 => (255, 0, 0),
            10 => (0, 255, 0),
            11 => (255, 255, 0),
            12 => (92, 92, 255),
            13 => (255, 0, 255),
            14 => (0, 255, 255),
            15 => (255, 255, 255),
            // 216 color cube (16-231)
            16..=231 => {
                let n = index - 16;
                let r = n / 36;
                let g = (n % 36) / 6;
                let b = n % 6;
                let to_rgb = |v: u8| if v == 0 { 0 } else { 55 + v * 40 };
                (to_rgb(r), to_rgb(g), to_rgb(b))
            },
            // Grayscale (232-255)
            232..=255 => {
                let gray = 8 + (index - 232) * 10;
                (gray, gray, gray)
            },
        }
    }

    /// Convert this color to RGB, using defaults for Default color
    pub fn to_rgb(&self, is_foreground: bool) -> (u8, u8, u8) {
        match self {
            Color::Default => {
                if is_foreground {
                    (229, 229, 229)
                } else {
                    (0, 0, 0)
                }
            },
            Color::Indexed(i) => Self::indexed_to_rgb(*i),
            Color::Rgb(r, g, b) => (*r, *g, *b),
        }
    }

    /// Blend towards `other` in RGB space. `t` is clamped to [0, 1];
    /// the endpoints return the original colors unchanged.
    pub fn mix(&self, other: Color, t: f32, is_foreground: bool) -> Color {
        let t = t.clamp(0.0, 1.0);
        if t <= 0.0 {
            return *self;
        }
        if t >= 1.0 {
            return other;
        }
        let (r0, g0, b0) = self.to_rgb(is_foreground);
        let (r1, g1, b1) = other.to_rgb(is_foreground);
        let channel = |a: u8, b: u8| (a as f32 + (b as f32 - a as f32) * t).round() as u8;
        Color::Rgb(channel(r0, r1), channel(g0, g1), channel(b0, b1))
    }
}

/// Text modifier attributes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Modifiers {
    pub bold: bool,
    pub faint: bool,
    pub italic: bool,
    pub underline: bool,
    pub blink: bool,
    pub inverse: bool,
    pub hidden: bool,
    pub strikethrough: bool,
}

impl Modifiers {
    pub const BOLD: Modifiers = Modifiers {
        bold: true,
        faint: false,
        italic: false,
        underline: false,
        blink: false,
        inverse: false,
        hidden: false,
        strikethrough: false,
    };

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Check if no modifier is set
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Colors and modifiers of a cell; a styled run has exactly one
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Style {
    pub fg: Color,
    pub bg: Color,
    pub modifiers: Modifiers,
}

impl Style {
    pub const fn new() -> Self {
        Self {
            fg: Color::Default,
            bg: Color::Default,
            modifiers: Modifiers {
                bold: false,
                faint: false,
                italic: false,
                underline: false,
                blink: false,
                inverse: false,
                hidden: false,
                strikethrough: false,
            },
        }
    }

    pub const fn fg(mut self, color: Color) -> Self {
        self.fg = color;
        self
    }

    pub const fn bg(mut self, color: Color) -> Self {
        self.bg = color;
        self
    }

    pub const fn bold(mut self) -> Self {
        self.modifiers.bold = true;
        self
    }

    pub const fn italic(mut self) -> Self {
        self.modifiers.italic = true;
        self
    }

    pub const fn underline(mut self) -> Self {
        self.modifiers.underline = true;
        self
    }

    pub const fn faint(mut self) -> Self {
        self.modifiers.faint = true;
        self
    }

    pub const fn inverse(mut self) -> Self {
        self.modifiers.inverse = true;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cell_default() {
        let cell = Cell::default();
        assert!(cell.is_blank());
        assert_eq!(cell.content, " ");
        assert_eq!(cell.fg, Color::Default);
        assert_eq!(cell.bg, Color::Default);
    }

    #[test]
    fn test_cell_new() {
        let cell = Cell::new('A');
        assert_eq!(cell.content, "A");
        assert!(!cell.is_blank());
    }

    #[test]
    fn test_cell_clear() {
        let mut cell = Cell::new('A');
        cell.fg = Color::RED;
        cell.modifiers.bold = true;
        cell.clear();
        assert!(cell.is_blank());
        assert_eq!(cell.fg, Color::Default);
        assert!(!cell.modifiers.bold);
    }

    #[test]
    fn test_color_indexed_to_rgb() {
        assert_eq!(Color::indexed_to_rgb(0), (0, 0, 0));
        assert_eq!(Color::indexed_to_rgb(15), (255, 255, 255));
        assert_eq!(Color::indexed_to_rgb(16), (0, 0, 0));
        assert_eq!(Color::indexed_to_rgb(231), (255, 255, 255));
        assert_eq!(Color::indexed_to_rgb(232), (8, 8, 8));
        assert_eq!(Color::indexed_to_rgb(255), (238, 238, 238));
    }

    #[test]
    fn test_cell_width() {
        let cell = Cell::new('A');
        assert_eq!(cell.width(), 1);

        let wide_cell = Cell::new('中');
        assert_eq!(wide_cell.width(), 2);

        let cont = Cell::continuation(Style::default());
        assert_eq!(cont.width(), 0);
        assert!(cont.is_continuation());
    }

    #[test]
    fn test_color_mix_endpoints() {
        let from = Color::Rgb(0, 0, 0);
        let to = Color::Rgb(200, 100, 50);
        assert_eq!(from.mix(to, 0.0, true), from);
        assert_eq!(from.mix(to, 1.0, true), to);
        assert_eq!(from.mix(to, 0.5, true), Color::Rgb(100, 50, 25));
    }

    #[test]
    fn test_style_builder() {
        let style = Style::new().fg(Color::RED).bold();
        assert_eq!(style.fg, Color::RED);
        assert!(style.modifiers.bold);
        assert_eq!(style.bg, Color::Default);
    }
}
