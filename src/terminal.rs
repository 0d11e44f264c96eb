//! Terminal collaborator
//!
//! The run loop talks to the output device only through [`Terminal`]. A real
//! backend translates update commands into escape sequences; the
//! [`HeadlessTerminal`](crate::headless::HeadlessTerminal) replays them into
//! an in-memory grid.

use std::io;

use crate::core::Size;
use crate::diff::UpdateCommand;

/// Output side of a terminal
pub trait Terminal {
    /// Switch to raw mode: no echo, no line buffering
    fn enter_raw_mode(&mut self) -> io::Result<()>;

    /// Restore cooperative mode
    fn leave_raw_mode(&mut self) -> io::Result<()>;

    /// Queue update commands; nothing is guaranteed visible before `flush`
    fn write(&mut self, commands: &[UpdateCommand]) -> io::Result<()>;

    fn flush(&mut self) -> io::Result<()>;

    /// Current size in columns and rows
    fn query_size(&mut self) -> io::Result<Size>;

    /// Erase the whole display
    fn clear(&mut self) -> io::Result<()>;
}

impl<T: Terminal + ?Sized> Terminal for &mut T {
    fn enter_raw_mode(&mut self) -> io::Result<()> {
        (**self).enter_raw_mode()
    }

    fn leave_raw_mode(&mut self) -> io::Result<()> {
        (**self).leave_raw_mode()
    }

    fn write(&mut self, commands: &[UpdateCommand]) -> io::Result<()> {
        (**self).write(commands)
    }

    fn flush(&mut self) -> io::Result<()> {
        (**self).flush()
    }

    fn query_size(&mut self) -> io::Result<Size> {
        (**self).query_size()
    }

    fn clear(&mut self) -> io::Result<()> {
        (**self).clear()
    }
}
