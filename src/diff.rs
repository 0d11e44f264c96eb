//! Frame diffing
//!
//! Compares the previous frame's grid with the next one and produces the
//! minimal list of update commands that brings a terminal showing the
//! previous frame to the next frame.
//!
//! Rows are scanned top to bottom, left to right. Consecutive changed cells
//! that share a style form a run; each run becomes one cursor move followed by
//! one styled write. A wide character and its continuation cell are a single
//! unit: the continuation is never compared or written on its own. A run
//! also ends where the next cell's text would fuse with the previous
//! grapheme (regional indicator pairs or conjoining jamo),
//! so replaying a `Print` lands every grapheme in its own cell.

use serde::{Deserialize, Serialize};
use unicode_segmentation::UnicodeSegmentation;

use crate::core::{Cell, Grid, Row, Style, BLANK};
use crate::error::{Error, Result};

/// A single terminal update
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum UpdateCommand {
    /// Move the cursor to column `x`, row `y` (0-based)
    MoveTo { x: u16, y: u16 },
    /// Write `text` at the cursor with a uniform style
    Print { text: String, style: Style },
}

impl UpdateCommand {
    pub fn move_to(x: u16, y: u16) -> Self {
        UpdateCommand::MoveTo { x, y }
    }

    pub fn print(text: impl Into<String>, style: Style) -> Self {
        UpdateCommand::Print {
            text: text.into(),
            style,
        }
    }
}

/// Run being accumulated while scanning a row
struct Run {
    x: u16,
    style: Style,
    text: String,
    /// Byte offset of the last unit's text
    last: usize,
}

impl Run {
    fn new(x: u16, style: Style, content: &str) -> Self {
        Self {
            x,
            style,
            text: content.to_string(),
            last: 0,
        }
    }

    /// Whether `content` can follow the run without joining its last
    /// grapheme
    fn accepts(&self, style: Style, content: &str) -> bool {
        self.style == style && !joins(&self.text[self.last..], content)
    }

    fn push(&mut self, content: &str) {
        self.last = self.text.len();
        self.text.push_str(content);
    }
}

/// Whether `next` fuses with `prev` into fewer graphemes when concatenated
fn joins(prev: &str, next: &str) -> bool {
    let mut joined = String::with_capacity(prev.len() + next.len());
    joined.push_str(prev);
    joined.push_str(next);
    joined.graphemes(true).count() != prev.graphemes(true).count() + next.graphemes(true).count()
}

/// Compute the commands turning `previous` into `next`.
///
/// Both grids must have the same dimensions; anything else is a programming
/// error and is reported as [`Error::DimensionMismatch`].
pub fn diff(previous: &Grid, next: &Grid) -> Result<Vec<UpdateCommand>> {
    if previous.size() != next.size() {
        return Err(Error::DimensionMismatch {
            previous: previous.size(),
            next: next.size(),
        });
    }

    let mut commands = Vec::new();
    for (y, (old, new)) in previous.rows().zip(next.rows()).enumerate() {
        diff_row(y as u16, old, new, &mut commands);
    }
    Ok(commands)
}

fn diff_row(y: u16, old: &Row, new: &Row, commands: &mut Vec<UpdateCommand>) {
    let width = new.cells.len();
    let mut run: Option<Run> = None;
    let mut x = 0;

    while x < width {
        let cell = &new.cells[x];
        if cell.is_continuation() {
            // Orphaned continuation; its leader owns it
            x += 1;
            continue;
        }

        let span = unit_span(new, x);
        let changed = (x..x + span).any(|i| old.cells.get(i) != new.cells.get(i));

        if changed {
            let style = cell.style();
            let content = cell_text(cell);
            match run.as_mut() {
                Some(current) if current.accepts(style, content) => {
                    current.push(content);
                },
                _ => {
                    emit(run.take(), y, commands);
                    run = Some(Run::new(x as u16, style, content));
                },
            }
        } else {
            emit(run.take(), y, commands);
        }

        x += span;
    }

    emit(run, y, commands);
}

/// Number of cells covered by the unit starting at `x`
fn unit_span(row: &Row, x: usize) -> usize {
    let wide = row.cells[x].width() == 2
        && row.cells.get(x + 1).is_some_and(Cell::is_continuation);
    if wide {
        2
    } else {
        1
    }
}

fn cell_text(cell: &Cell) -> &str {
    if cell.content.is_empty() {
        BLANK
    } else {
        &cell.content
    }
}

fn emit(run: Option<Run>, y: u16, commands: &mut Vec<UpdateCommand>) {
    if let Some(run) = run {
        commands.push(UpdateCommand::MoveTo { x: run.x, y });
        commands.push(UpdateCommand::Print {
            text: run.text,
            style: run.style,
        });
    }
}
