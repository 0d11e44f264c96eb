//! Widget render contract
//!
//! A widget paints itself into the region of the frame grid it was given.
//! Applications build a fresh tree of boxed widgets every frame; containers
//! own their children and lay them out with [`Layout`].

use unicode_width::UnicodeWidthStr;

use crate::core::{Rect, Region, Style};
use crate::layout::{Constraint, Direction, Layout, LayoutError};

/// Anything that can paint itself into a grid region
pub trait Widget {
    /// Paint into `area`. Writes outside `region.area()` are dropped.
    fn paint(&self, area: Rect, region: &mut Region<'_>);
}

impl<W: Widget + ?Sized> Widget for Box<W> {
    fn paint(&self, area: Rect, region: &mut Region<'_>) {
        (**self).paint(area, region);
    }
}

impl<W: Widget + ?Sized> Widget for &W {
    fn paint(&self, area: Rect, region: &mut Region<'_>) {
        (**self).paint(area, region);
    }
}

/// Horizontal placement of text lines
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Alignment {
    #[default]
    Left,
    Center,
    Right,
}

/// Lines of styled text, one per row
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Text {
    content: String,
    style: Style,
    alignment: Alignment,
}

impl Text {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            ..Default::default()
        }
    }

    pub fn style(mut self, style: Style) -> Self {
        self.style = style;
        self
    }

    pub fn alignment(mut self, alignment: Alignment) -> Self {
        self.alignment = alignment;
        self
    }
}

impl Widget for Text {
    fn paint(&self, area: Rect, region: &mut Region<'_>) {
        let mut region = region.sub(area);
        for (offset, line) in self.content.lines().enumerate() {
            let Ok(offset) = u16::try_from(offset) else {
                break;
            };
            if offset >= area.height {
                break;
            }
            let width = u16::try_from(line.width()).unwrap_or(u16::MAX);
            let x = match self.alignment {
                Alignment::Left => area.x,
                Alignment::Center => area.x + area.width.saturating_sub(width) / 2,
                Alignment::Right => area.x + area.width.saturating_sub(width),
            };
            region.set_string(x, area.y + offset, line, self.style);
        }
    }
}

/// Blanks its whole area with a style
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Fill {
    style: Style,
}

impl Fill {
    pub fn new(style: Style) -> Self {
        Self { style }
    }
}

impl Widget for Fill {
    fn paint(&self, area: Rect, region: &mut Region<'_>) {
        region.fill(area, self.style);
    }
}

/// Container laying out its children along one axis
pub struct Split<'a> {
    layout: Layout,
    children: Vec<Box<dyn Widget + 'a>>,
}

impl<'a> Split<'a> {
    /// Build from `(constraint, child)` pairs
    pub fn new(
        direction: Direction,
        children: Vec<(Constraint, Box<dyn Widget + 'a>)>,
    ) -> Result<Self, LayoutError> {
        let (constraints, children): (Vec<_>, Vec<_>) = children.into_iter().unzip();
        Ok(Self {
            layout: Layout::new(direction, constraints)?,
            children,
        })
    }

    pub fn vertical(children: Vec<(Constraint, Box<dyn Widget + 'a>)>) -> Result<Self, LayoutError> {
        Self::new(Direction::Vertical, children)
    }

    pub fn horizontal(
        children: Vec<(Constraint, Box<dyn Widget + 'a>)>,
    ) -> Result<Self, LayoutError> {
        Self::new(Direction::Horizontal, children)
    }

    /// Build from an existing layout; one child per constraint
    pub fn with_layout(
        layout: Layout,
        children: Vec<Box<dyn Widget + 'a>>,
    ) -> Result<Self, LayoutError> {
        if layout.constraints().len() != children.len() {
            return Err(LayoutError::ChildCount {
                constraints: layout.constraints().len(),
                children: children.len(),
            });
        }
        Ok(Self { layout, children })
    }

    pub fn margin(mut self, margin: u16) -> Self {
        self.layout = self.layout.margin(margin);
        self
    }
}

impl Widget for Split<'_> {
    fn paint(&self, area: Rect, region: &mut Region<'_>) {
        for (child, slot) in self.children.iter().zip(self.layout.split(area)) {
            let mut sub = region.sub(slot);
            child.paint(slot, &mut sub);
        }
    }
}
