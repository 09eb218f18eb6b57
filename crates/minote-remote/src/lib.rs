//! Mi Notes HTTP client
//!
//! Implements [`minote_core::RemoteNoteService`] over the web API: session
//! cookie on every request, `{code, result, data}` envelope checking, and
//! retries with exponential backoff for transport failures, 5xx and 429.
//!
//! ```no_run
//! # use minote_remote::MinoteClient;
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = MinoteClient::new("serviceToken=...; userId=...")?;
//! let page = client.catalog_page(None).await?;
//! println!("{} entries, last page: {}", page.entries.len(), page.last_page);
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod config;
pub mod error;
mod types;

pub use client::MinoteClient;
pub use config::{ClientConfig, ClientConfigBuilder, RetryPolicy};
pub use error::{ClientError, Result};
