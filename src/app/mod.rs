//! Application glue module
//!
//! Configuration and the run loop that drives an application.

mod config;
mod runner;

pub use config::{default_path, Config, ConfigError, HeadlessConfig, MAX_INTERVAL_MS};
pub use runner::{Application, Context, Flow, LoopState, Runner};
