//! # trace.moe client for Rust
//!
//! Async client for the [trace.moe](https://trace.moe) anime scene search
//! API. Search by image URL or local file, read your search quota, and save
//! the preview clips and frames of a match -- all with idiomatic async Rust.
//!
//! ## Quick start
//!
//! ```no_run
//! use tracemoe::{Client, MediaDownloadOptions, SearchOptions};
//!
//! #[tokio::main]
//! async fn main() -> tracemoe::Result<()> {
//!     let client = Client::new();
//!
//!     let options = SearchOptions {
//!         cut_black_borders: true,
//!         include_anilist_info: true,
//!         ..Default::default()
//!     };
//!     let response = client.search_by_file("screenshot.jpg", Some(options)).await?;
//!
//!     for m in &response.results {
//!         let title = m
//!             .anilist
//!             .info()
//!             .and_then(|i| i.title.romaji.clone())
//!             .unwrap_or_default();
//!         println!("{:.1}% {} [{:.1}s-{:.1}s]", m.similarity * 100.0, title, m.from, m.to);
//!     }
//!
//!     if let Some(best) = response.results.first() {
//!         let path = client
//!             .download_video(best, Some(MediaDownloadOptions { mute: true, ..Default::default() }))
//!             .await?;
//!         println!("saved {}", path.display());
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Builder pattern
//!
//! ```no_run
//! use tracemoe::ClientBuilder;
//! use std::time::Duration;
//!
//! # async fn example() -> tracemoe::Result<()> {
//! let mut client = ClientBuilder::from_env()
//!     .timeout(Duration::from_secs(120))
//!     .build()?;
//!
//! // The key can be swapped between calls.
//! client.set_api_key("your_api_key");
//! let quota = client.fetch_quota().await?;
//! println!("{} of {} searches left", quota.remaining, quota.limit);
//! # Ok(())
//! # }
//! ```

mod client;
mod download;
mod errors;
mod models;
mod request;
mod response;

pub use client::{Client, ClientBuilder};
pub use errors::{ApiError, Result, TraceMoeError};
pub use models::{
    Anilist, AnilistInfo, AnilistTitle, ApiLimits, Episode, MatchResult, MediaDownloadOptions,
    MediaKind, MediaSize, SearchOptions, SearchResponse,
};
pub use request::{
    build_limits_request, build_search_request, MediaSource, RequestDescriptor, API_KEY_HEADER,
};
