//! Core data model for the tcgwatch recognition pipeline.
//!
//! Pure, dependency-light types shared by the vision crate and the frontends:
//! the read-only card catalog, the typed game events, and the temporal
//! debounce filter that turns noisy per-frame signals into discrete events.

pub mod catalog;
pub mod events;
pub mod filter;

pub use catalog::{Catalog, Language, LocalizedName};
pub use events::{EventCollector, EventSink, GameEvent, Side};
pub use filter::StreamFilter;

/// Sentinel id meaning "no detection this frame".
pub const NO_MATCH: i32 = -1;
