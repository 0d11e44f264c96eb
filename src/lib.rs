//! TambouI Terminal UI Library
//!
//! Retained-mode rendering for terminal applications: widgets paint into a
//! cell grid every frame and only the difference from the previous frame
//! reaches the terminal.
//!
//! - `core`: cells, grids, rectangles and snapshots
//! - `layout`: constraint-based splitting of rectangles
//! - `widget`: the render contract and basic widgets
//! - `diff`: grid comparison producing terminal update commands
//! - `effects`: animation timeline, easing and post-render overlays
//! - `app`: configuration and the run loop
//! - `headless`: in-memory terminal for tests and automation

pub mod app;
pub mod core;
pub mod diff;
pub mod effects;
pub mod error;
pub mod event;
pub mod headless;
pub mod input;
pub mod layout;
pub mod terminal;
pub mod widget;

pub use app::{Application, Config, Context, Flow, LoopState, Runner};
pub use error::{Error, Result};
pub use terminal::Terminal;
