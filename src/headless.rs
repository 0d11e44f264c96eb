//! Headless terminal
//!
//! An in-memory [`Terminal`] that replays update commands into a grid, and a
//! scripted [`EventSource`]. Used for testing, benchmarks and the
//! `tamboui-headless` runner; both produce deterministic snapshots.

use std::collections::VecDeque;
use std::io;
use std::thread;
use std::time::Duration;

use unicode_segmentation::UnicodeSegmentation;

use crate::core::{CompactSnapshot, Grid, Size, Snapshot};
use crate::diff::UpdateCommand;
use crate::event::Event;
use crate::input::EventSource;
use crate::terminal::Terminal;

/// Apply update commands to `grid` the way a terminal would
pub fn apply_commands(grid: &mut Grid, commands: &[UpdateCommand]) {
    let area = grid.area();
    let (mut x, mut y) = (0u16, 0u16);
    for command in commands {
        match command {
            UpdateCommand::MoveTo { x: col, y: row } => {
                x = *col;
                y = *row;
            },
            UpdateCommand::Print { text, style } => {
                for grapheme in text.graphemes(true) {
                    x = x.saturating_add(grid.put(x, y, grapheme, *style, area));
                }
            },
        }
    }
}

/// Terminal backed by memory
#[derive(Debug, Clone)]
pub struct HeadlessTerminal {
    screen: Grid,
    raw: bool,
    /// Commands written since the last flush
    pending: Vec<UpdateCommand>,
    /// Commands of every flushed frame
    frames: Vec<Vec<UpdateCommand>>,
    clears: usize,
    fail_writes: bool,
    flush_failures: u32,
}

impl HeadlessTerminal {
    pub fn new(size: Size) -> Self {
        Self {
            screen: Grid::new(size),
            raw: false,
            pending: Vec::new(),
            frames: Vec::new(),
            clears: 0,
            fail_writes: false,
            flush_failures: 0,
        }
    }

    /// What the terminal currently shows
    pub fn screen(&self) -> &Grid {
        &self.screen
    }

    pub fn is_raw(&self) -> bool {
        self.raw
    }

    /// Commands of each flushed frame, oldest first
    pub fn frames(&self) -> &[Vec<UpdateCommand>] {
        &self.frames
    }

    pub fn last_frame(&self) -> Option<&[UpdateCommand]> {
        self.frames.last().map(Vec::as_slice)
    }

    /// Number of `clear` calls
    pub fn clears(&self) -> usize {
        self.clears
    }

    /// Change the reported size. The display is erased, as a real terminal
    /// would reflow it.
    pub fn resize(&mut self, size: Size) {
        self.screen = Grid::new(size);
        self.pending.clear();
    }

    /// Make every following `write` fail
    pub fn fail_writes(&mut self, fail: bool) {
        self.fail_writes = fail;
    }

    /// Make the next `count` flushes fail
    pub fn fail_flushes(&mut self, count: u32) {
        self.flush_failures = count;
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot::from_grid(&self.screen)
    }

    pub fn compact_snapshot(&self) -> CompactSnapshot {
        CompactSnapshot::from_grid(&self.screen)
    }
}

impl Terminal for HeadlessTerminal {
    fn enter_raw_mode(&mut self) -> io::Result<()> {
        self.raw = true;
        Ok(())
    }

    fn leave_raw_mode(&mut self) -> io::Result<()> {
        self.raw = false;
        Ok(())
    }

    fn write(&mut self, commands: &[UpdateCommand]) -> io::Result<()> {
        if self.fail_writes {
            return Err(io::Error::new(io::ErrorKind::BrokenPipe, "write failed"));
        }
        self.pending.extend_from_slice(commands);
        Ok(())
    }

    fn flush(&mut self) -> io::Result<()> {
        if self.flush_failures > 0 {
            self.flush_failures -= 1;
            return Err(io::Error::new(io::ErrorKind::Interrupted, "flush failed"));
        }
        let commands = std::mem::take(&mut self.pending);
        apply_commands(&mut self.screen, &commands);
        self.frames.push(commands);
        Ok(())
    }

    fn query_size(&mut self) -> io::Result<Size> {
        Ok(self.screen.size())
    }

    fn clear(&mut self) -> io::Result<()> {
        self.screen.reset();
        self.pending.clear();
        self.clears += 1;
        Ok(())
    }
}

/// Event source replaying a fixed script, then idling
#[derive(Debug, Clone, Default)]
pub struct ScriptedSource {
    events: VecDeque<Event>,
}

impl ScriptedSource {
    pub fn new(events: impl IntoIterator<Item = Event>) -> Self {
        Self {
            events: events.into_iter().collect(),
        }
    }

    pub fn push(&mut self, event: Event) {
        self.events.push_back(event);
    }

    pub fn remaining(&self) -> usize {
        self.events.len()
    }
}

impl EventSource for ScriptedSource {
    fn poll_event(&mut self, timeout: Duration) -> io::Result<Option<Event>> {
        match self.events.pop_front() {
            Some(event) => Ok(Some(event)),
            None => {
                thread::sleep(timeout);
                Ok(None)
            },
        }
    }
}
