//! Screen recognition pipeline for card-game clients.
//!
//! Frames come in as RGBA captures of the game window; the pipeline resolves
//! the client's aspect-ratio bucket, crops the semantic regions, hashes them
//! with DCT-based perceptual hashes, matches against the prebuilt feature
//! database and debounces the per-frame classifications into discrete game
//! events.

pub mod classify;
pub mod crop;
pub mod db;
pub mod extract;
pub mod hash;
pub mod index;
pub mod regions;
pub mod tasks;
pub mod utils;
pub mod watcher;

pub use classify::{classify, Match, Thresholds};
pub use crop::CropBox;
pub use db::{ControlKind, Database, DatabaseBuilder, IndexKind, SEARCH_MARGIN};
pub use extract::{CardExtractor, ExtractorConfig};
pub use hash::{dhash, multi_phash, phash_a, phash_d, HashError, ImageHash};
pub use index::{FeatureIndex, FeatureIndexBuilder};
pub use regions::{resolve, RatioBucket, Region};
pub use watcher::Watcher;
