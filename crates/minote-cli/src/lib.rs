//! minote CLI library
//!
//! Argument parsing, logging setup and the `sync`, `status` and `reset`
//! commands. Each command builds its own collaborators from the loaded
//! [`minote_config::MinoteConfig`].

pub mod cli;
pub mod commands;
pub mod logging;
