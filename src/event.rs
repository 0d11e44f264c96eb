//! Input events delivered to the application

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Keyboard modifiers
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct KeyModifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub logo: bool,
}

impl KeyModifiers {
    pub const NONE: KeyModifiers = KeyModifiers {
        shift: false,
        ctrl: false,
        alt: false,
        logo: false,
    };

    pub const CTRL: KeyModifiers = KeyModifiers {
        ctrl: true,
        ..Self::NONE
    };

    pub fn new() -> Self {
        Self::default()
    }

    /// Check if any modifier is pressed
    pub fn any(&self) -> bool {
        self.shift || self.ctrl || self.alt || self.logo
    }
}

/// Key codes for special keys
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KeyCode {
    F(u8),

    // Navigation
    Up,
    Down,
    Left,
    Right,
    Home,
    End,
    PageUp,
    PageDown,
    Insert,
    Delete,

    // Control
    Escape,
    Tab,
    Backspace,
    Enter,

    // Character input
    Char(char),
}

/// A key press
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct KeyEvent {
    pub code: KeyCode,
    pub modifiers: KeyModifiers,
}

impl KeyEvent {
    pub fn new(code: KeyCode, modifiers: KeyModifiers) -> Self {
        Self { code, modifiers }
    }

    pub fn plain(code: KeyCode) -> Self {
        Self::new(code, KeyModifiers::NONE)
    }

    pub fn ctrl(c: char) -> Self {
        Self::new(KeyCode::Char(c), KeyModifiers::CTRL)
    }

    /// Check for an unmodified character key
    pub fn is_char(&self, c: char) -> bool {
        self.code == KeyCode::Char(c) && !self.modifiers.any()
    }
}

impl From<KeyCode> for KeyEvent {
    fn from(code: KeyCode) -> Self {
        Self::plain(code)
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Unrecognized key: {0:?}")]
pub struct ParseKeyError(String);

/// Parses key notation such as `q`, `enter`, `ctrl+c`, `shift+tab` or `f5`
impl FromStr for KeyEvent {
    type Err = ParseKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseKeyError(s.to_string());
        let mut parts: Vec<&str> = s.split('+').collect();
        // "ctrl++" and "+" name the plus key itself
        if s.ends_with("++") || s == "+" {
            parts.retain(|p| !p.is_empty());
            parts.push("+");
        }
        let (key, mods) = parts.split_last().ok_or_else(err)?;

        let mut modifiers = KeyModifiers::NONE;
        for m in mods {
            match m.to_ascii_lowercase().as_str() {
                "shift" => modifiers.shift = true,
                "ctrl" | "control" => modifiers.ctrl = true,
                "alt" | "meta" => modifiers.alt = true,
                "logo" | "super" => modifiers.logo = true,
                _ => return Err(err()),
            }
        }

        let mut chars = key.chars();
        let code = match (chars.next(), chars.next()) {
            (Some(c), None) => KeyCode::Char(c),
            _ => match key.to_ascii_lowercase().as_str() {
                "up" => KeyCode::Up,
                "down" => KeyCode::Down,
                "left" => KeyCode::Left,
                "right" => KeyCode::Right,
                "home" => KeyCode::Home,
                "end" => KeyCode::End,
                "pageup" | "pgup" => KeyCode::PageUp,
                "pagedown" | "pgdn" => KeyCode::PageDown,
                "insert" | "ins" => KeyCode::Insert,
                "delete" | "del" => KeyCode::Delete,
                "escape" | "esc" => KeyCode::Escape,
                "tab" => KeyCode::Tab,
                "backspace" => KeyCode::Backspace,
                "enter" | "return" => KeyCode::Enter,
                "space" => KeyCode::Char(' '),
                other => match other.strip_prefix('f').map(str::parse::<u8>) {
                    Some(Ok(n)) if (1..=12).contains(&n) => KeyCode::F(n),
                    _ => return Err(err()),
                },
            },
        };

        Ok(KeyEvent::new(code, modifiers))
    }
}

impl fmt::Display for KeyEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.modifiers.ctrl {
            f.write_str("ctrl+")?;
        }
        if self.modifiers.alt {
            f.write_str("alt+")?;
        }
        if self.modifiers.shift {
            f.write_str("shift+")?;
        }
        if self.modifiers.logo {
            f.write_str("logo+")?;
        }
        match self.code {
            KeyCode::F(n) => write!(f, "f{}", n),
            KeyCode::Up => f.write_str("up"),
            KeyCode::Down => f.write_str("down"),
            KeyCode::Left => f.write_str("left"),
            KeyCode::Right => f.write_str("right"),
            KeyCode::Home => f.write_str("home"),
            KeyCode::End => f.write_str("end"),
            KeyCode::PageUp => f.write_str("pageup"),
            KeyCode::PageDown => f.write_str("pagedown"),
            KeyCode::Insert => f.write_str("insert"),
            KeyCode::Delete => f.write_str("delete"),
            KeyCode::Escape => f.write_str("esc"),
            KeyCode::Tab => f.write_str("tab"),
            KeyCode::Backspace => f.write_str("backspace"),
            KeyCode::Enter => f.write_str("enter"),
            KeyCode::Char(' ') => f.write_str("space"),
            KeyCode::Char(c) => write!(f, "{}", c),
        }
    }
}

/// Something that happened at the terminal
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Event {
    Key(KeyEvent),
    /// The terminal now has this many columns and rows
    Resize { width: u16, height: u16 },
    /// Bracketed paste
    Paste(String),
}

impl Event {
    pub fn key(code: KeyCode) -> Self {
        Event::Key(KeyEvent::plain(code))
    }

    pub fn as_key(&self) -> Option<&KeyEvent> {
        match self {
            Event::Key(key) => Some(key),
            _ => None,
        }
    }
}

impl From<KeyEvent> for Event {
    fn from(key: KeyEvent) -> Self {
        Event::Key(key)
    }
}
