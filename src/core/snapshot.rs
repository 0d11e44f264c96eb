//! Deterministic snapshot generation
//!
//! Snapshots capture a rendered grid in a serializable format for testing and
//! debugging. Rendering the same widget tree always produces identical
//! snapshots.

use serde::{Deserialize, Serialize};

use super::cell::{Cell, Color, Modifiers};
use super::grid::Grid;

/// A complete snapshot of a grid
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    /// Grid dimensions
    pub width: u16,
    pub height: u16,
    /// Frame counter of the grid
    pub generation: u64,
    /// Grid content (row-major)
    pub grid: Vec<Vec<CellSnapshot>>,
}

/// Snapshot of a single cell
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellSnapshot {
    /// Character content
    pub content: String,
    /// Foreground color
    pub fg: ColorSnapshot,
    /// Background color
    pub bg: ColorSnapshot,
    /// Modifier attributes
    pub modifiers: ModifiersSnapshot,
    /// Cell width (0 for continuation, 1 normal, 2 wide)
    pub width: u8,
}

/// Snapshot of a color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ColorSnapshot {
    Default,
    Indexed { index: u8 },
    Rgb { r: u8, g: u8, b: u8 },
}

/// Snapshot of modifier attributes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ModifiersSnapshot {
    #[serde(default, skip_serializing_if = "is_false")]
    pub bold: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub faint: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub italic: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub underline: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub blink: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub inverse: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub hidden: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub strikethrough: bool,
}

fn is_false(b: &bool) -> bool {
    !*b
}

impl From<&Color> for ColorSnapshot {
    fn from(color: &Color) -> Self {
        match color {
            Color::Default => ColorSnapshot::Default,
            Color::Indexed(i) => ColorSnapshot::Indexed { index: *i },
            Color::Rgb(r, g, b) => ColorSnapshot::Rgb {
                r: *r,
                g: *g,
                b: *b,
            },
        }
    }
}

impl From<&Modifiers> for ModifiersSnapshot {
    fn from(modifiers: &Modifiers) -> Self {
        ModifiersSnapshot {
            bold: modifiers.bold,
            faint: modifiers.faint,
            italic: modifiers.italic,
            underline: modifiers.underline,
            blink: modifiers.blink,
            inverse: modifiers.inverse,
            hidden: modifiers.hidden,
            strikethrough: modifiers.strikethrough,
        }
    }
}

impl From<&Cell> for CellSnapshot {
    fn from(cell: &Cell) -> Self {
        CellSnapshot {
            content: cell.content.clone(),
            fg: ColorSnapshot::from(&cell.fg),
            bg: ColorSnapshot::from(&cell.bg),
            modifiers: ModifiersSnapshot::from(&cell.modifiers),
            width: cell.width() as u8,
        }
    }
}

impl Snapshot {
    /// Create a snapshot from a grid
    pub fn from_grid(grid: &Grid) -> Self {
        let rows = grid
            .rows()
            .map(|row| row.cells.iter().map(CellSnapshot::from).collect())
            .collect();

        Snapshot {
            width: grid.width(),
            height: grid.height(),
            generation: grid.generation(),
            grid: rows,
        }
    }

    /// Convert snapshot to JSON string
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Parse snapshot from JSON string
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Get a simple text representation of the grid (for debugging)
    pub fn to_text(&self) -> String {
        let mut result = String::new();

        for row in &self.grid {
            for cell in row {
                if cell.width == 0 {
                    continue;
                }
                result.push_str(&cell.content);
            }
            while result.ends_with(' ') {
                result.pop();
            }
            result.push('\n');
        }

        while result.ends_with("\n\n") {
            result.pop();
        }

        result
    }

    /// Compare cell content, ignoring the generation
    pub fn content_equals(&self, other: &Snapshot) -> bool {
        self.width == other.width && self.height == other.height && self.grid == other.grid
    }
}

/// Text-only snapshot, one string per row with trailing blanks trimmed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompactSnapshot {
    pub width: u16,
    pub height: u16,
    pub text: Vec<String>,
}

impl CompactSnapshot {
    pub fn from_grid(grid: &Grid) -> Self {
        Self {
            width: grid.width(),
            height: grid.height(),
            text: grid
                .rows()
                .map(|row| row.text().trim_end().to_string())
                .collect(),
        }
    }
}
