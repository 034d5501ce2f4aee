//! Recognition tasks: per-region pipelines from frame crop to game event.
//!
//! Every task follows the same shape: resolve its region on resize, hash the
//! crop each tick, debounce the per-frame classification, and emit an event
//! only on the stable transition.

pub mod card_played;
pub mod card_select;
pub mod game_over;
pub mod game_start;
pub mod round;

pub use card_played::CardPlayedTask;
pub use card_select::{CardLocator, CardSelectTask};
pub use game_over::GameOverTask;
pub use game_start::GameStartTask;
pub use round::RoundTask;

use anyhow::Result;
use image::RgbaImage;

use crate::regions::RatioBucket;
use tcgwatch_core::EventSink;

/// One recognition pipeline driven by the watcher.
pub trait RecognitionTask {
    fn name(&self) -> &'static str;

    /// Recompute pixel-space geometry for a new client size. Called before
    /// the first tick and again whenever the client dimensions change.
    fn on_resize(&mut self, bucket: RatioBucket, client_width: u32, client_height: u32);

    /// Process one frame. Confirmed events go to `sink`; an error aborts
    /// only this tick, not the watcher.
    fn tick(&mut self, frame: &RgbaImage, sink: &mut dyn EventSink) -> Result<()>;

    /// Drop debounce state. Called on game boundaries.
    fn reset(&mut self);
}
