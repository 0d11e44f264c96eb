//! Post-render overlays
//!
//! Overlays run on the freshly painted frame grid, after the widget tree and
//! before the diff. They usually read their `amount` from an animated
//! property so fades and reveals follow the timeline.

use serde::{Deserialize, Serialize};

use crate::core::{Color, Grid, Rect, Style};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum OverlayKind {
    /// Blend foreground colors towards a color
    FadeForeground(Color),
    /// Blend background colors towards a color
    FadeBackground(Color),
    /// Keep the leftmost `amount` of the columns, blank the rest
    Reveal,
}

/// Effect applied to one area of the frame
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Overlay {
    pub area: Rect,
    pub kind: OverlayKind,
    /// Strength in [0, 1]
    pub amount: f32,
}

impl Overlay {
    pub fn new(area: Rect, kind: OverlayKind, amount: f32) -> Self {
        Self { area, kind, amount }
    }

    pub fn fade_foreground(area: Rect, color: Color, amount: f32) -> Self {
        Self::new(area, OverlayKind::FadeForeground(color), amount)
    }

    pub fn fade_background(area: Rect, color: Color, amount: f32) -> Self {
        Self::new(area, OverlayKind::FadeBackground(color), amount)
    }

    pub fn reveal(area: Rect, amount: f32) -> Self {
        Self::new(area, OverlayKind::Reveal, amount)
    }

    pub fn apply(&self, grid: &mut Grid) {
        let area = self.area.intersection(&grid.area());
        if area.is_empty() {
            return;
        }
        let amount = if self.amount.is_nan() {
            0.0
        } else {
            self.amount.clamp(0.0, 1.0)
        };

        match self.kind {
            OverlayKind::FadeForeground(color) => {
                fade(grid, area, |style| Style {
                    fg: style.fg.mix(color, amount, true),
                    ..style
                });
            },
            OverlayKind::FadeBackground(color) => {
                fade(grid, area, |style| Style {
                    bg: style.bg.mix(color, amount, false),
                    ..style
                });
            },
            OverlayKind::Reveal => {
                let shown = (area.width as f32 * amount).round() as u16;
                let hidden = Rect::new(
                    area.x + shown,
                    area.y,
                    area.width.saturating_sub(shown),
                    area.height,
                );
                grid.fill(hidden, Style::default());
            },
        }
    }
}

/// Restyle every leading cell in `area` together with its continuation
fn fade(grid: &mut Grid, area: Rect, restyle: impl Fn(Style) -> Style) {
    for y in area.y..area.bottom() {
        for x in area.x..area.right() {
            let Some(cell) = grid.cell_mut(x, y) else {
                continue;
            };
            if cell.is_continuation() {
                continue;
            }
            let style = restyle(cell.style());
            let wide = cell.width() == 2;
            cell.set_style(style);
            if wide {
                if let Some(next) = grid.cell_mut(x + 1, y) {
                    next.set_style(style);
                }
            }
        }
    }
}
