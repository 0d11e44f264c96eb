//! Core Types
//!
//! Platform-independent frame state. This module contains:
//! - Cell representation with colors and modifiers
//! - Grid geometry (rects and sizes)
//! - The cell grid and its clipped `Region` view
//! - Deterministic snapshot generation
//!
//! Grids are plain values: a frame is rendered into a fresh grid and the
//! previous one is dropped, so two grids are always independent snapshots.

mod cell;
mod grid;
mod rect;
mod snapshot;

pub use cell::{Cell, Color, Modifiers, Style, BLANK};
pub use grid::{Grid, Region, Row};
pub use rect::{Rect, Size};
pub use snapshot::{CellSnapshot, ColorSnapshot, CompactSnapshot, ModifiersSnapshot, Snapshot};
