//! Terminal host shell: wires the core state machine to the engine.
mod app;
mod config;
mod effects;
mod logging;
mod ui;

pub use app::run_app;
pub use config::Cli;
