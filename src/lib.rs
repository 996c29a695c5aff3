//! # hkget - HKAnime stream extractor
//!
//! Resolves an HKAnime episode page to the playable streams behind its
//! embedded player.
//!
//! ## Features
//!
//! - Series manifest decoding (episode titles and video IDs)
//! - juicycodes player payload deobfuscation
//! - jwplayer options to format list conversion
//! - Per-stream request headers for playback
//! - Retry with backoff for transient HTTP failures
//!
//! ## Example
//!
//! ```rust,no_run
//! use hkget::Extractor;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let extractor = Extractor::new().with_max_retries(5);
//!
//!     let info = extractor.extract("https://www.hkanime.com/animal/416x1x1").await?;
//!     println!("{}", info.title);
//!     for format in &info.formats {
//!         println!("{} {}", format.format_id, format.url);
//!     }
//!
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod core;
pub mod error;
pub mod platform;
pub mod utils;

// Re-export main types
pub use core::{EpisodeRecord, Extractor, ExtractorConfig, Format, MediaInfo, Subtitle};
pub use error::HkError;
pub use platform::{decode_manifest, deobfuscate, resolve_episode, PageFetcher};

/// Result type alias for hkget operations
pub type Result<T> = std::result::Result<T, HkError>;
