//! # Minote Configuration Library
//!
//! Type-safe configuration for the Mi Notes mirror: remote endpoint and
//! session, vault layout, sync behavior, ledger location and logging.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use minote_config::ConfigLoader;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ConfigLoader::load_from_file("config.toml").await?;
//!     println!("mirroring into {}", config.vault.mirror_root().display());
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

mod config;
mod loader;

pub use config::*;
pub use loader::*;
