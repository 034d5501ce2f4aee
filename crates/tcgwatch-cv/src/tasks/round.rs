//! Round counter: the round banner against the digits index.

use anyhow::{bail, Result};
use image::RgbaImage;
use std::sync::Arc;

use super::RecognitionTask;
use crate::classify::Thresholds;
use crate::crop::CropBox;
use crate::db::{Database, IndexKind};
use crate::extract::{extract_digit, ExtractorConfig};
use crate::regions::{resolve, RatioBucket, Region};
use crate::utils::crop_region;
use tcgwatch_core::{EventSink, GameEvent, StreamFilter, NO_MATCH};

/// Watches the round banner. Digit banners are stored for rounds 1..=N, so a
/// stable index id maps to round id + 1.
pub struct RoundTask {
    db: Arc<Database>,
    hash_size: usize,
    threshold: u32,
    crop: Option<CropBox>,
    filter: StreamFilter<i32>,
    round: u32,
}

impl RoundTask {
    pub fn new(db: Arc<Database>) -> Self {
        Self {
            db,
            hash_size: ExtractorConfig::default().hash_size,
            threshold: Thresholds::default().loose,
            crop: None,
            filter: StreamFilter::new(NO_MATCH),
            round: 0,
        }
    }

    /// The last confirmed round number (0 before the first round banner).
    pub fn round(&self) -> u32 {
        self.round
    }
}

impl RecognitionTask for RoundTask {
    fn name(&self) -> &'static str {
        "round"
    }

    fn on_resize(&mut self, bucket: RatioBucket, client_width: u32, client_height: u32) {
        self.crop = Some(resolve(Region::Round, bucket, client_width, client_height));
    }

    fn tick(&mut self, frame: &RgbaImage, sink: &mut dyn EventSink) -> Result<()> {
        let Some(crop) = self.crop else {
            bail!("RoundTask ticked before on_resize");
        };
        let region = crop_region(frame, &crop)?;
        let hash = extract_digit(&region, self.hash_size);
        let best = self.db.best(&hash, IndexKind::Digits)?;
        let id = if best.is_match() && best.distance <= self.threshold {
            best.id
        } else {
            NO_MATCH
        };

        let stable = self.filter.filter(id, best.distance);
        if stable >= 0 {
            let round = stable as u32 + 1;
            // Banners repeat when scrolling history; only forward changes
            // are round transitions.
            if round > self.round {
                self.round = round;
                sink.emit(GameEvent::RoundChanged { round });
            }
        }
        Ok(())
    }

    fn reset(&mut self) {
        self.filter.reset();
        self.round = 0;
    }
}
