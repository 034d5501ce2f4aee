//! Game-start detection: the round-one banner against its stored hash.

use anyhow::{bail, Context, Result};
use image::RgbaImage;
use std::sync::Arc;

use super::RecognitionTask;
use crate::classify::Thresholds;
use crate::crop::CropBox;
use crate::db::{ControlKind, Database};
use crate::extract::{extract_control, ExtractorConfig};
use crate::hash::ImageHash;
use crate::regions::{resolve, RatioBucket, Region};
use crate::utils::crop_region;
use tcgwatch_core::{EventSink, GameEvent, StreamFilter};

/// Watches the start-of-game banner region. The only task that runs while no
/// game is in progress.
pub struct GameStartTask {
    reference: ImageHash,
    hash_size: usize,
    threshold: u32,
    crop: Option<CropBox>,
    filter: StreamFilter<bool>,
}

impl GameStartTask {
    pub fn new(db: &Arc<Database>) -> Result<Self> {
        let reference = db
            .control_hash(ControlKind::GameStart)
            .context("Database has no game-start control hash")?;
        Ok(Self {
            reference,
            hash_size: ExtractorConfig::default().hash_size,
            threshold: Thresholds::default().loose,
            crop: None,
            filter: StreamFilter::new(false),
        })
    }
}

impl RecognitionTask for GameStartTask {
    fn name(&self) -> &'static str {
        "game_start"
    }

    fn on_resize(&mut self, bucket: RatioBucket, client_width: u32, client_height: u32) {
        self.crop = Some(resolve(Region::GameStart, bucket, client_width, client_height));
    }

    fn tick(&mut self, frame: &RgbaImage, sink: &mut dyn EventSink) -> Result<()> {
        let Some(crop) = self.crop else {
            bail!("GameStartTask ticked before on_resize");
        };
        let region = crop_region(frame, &crop)?;
        let hash = extract_control(&region, self.hash_size);
        let dist = self.reference.distance(&hash)?;
        let detected = dist <= self.threshold;
        if self.filter.filter(detected, dist) {
            log::debug!("Game start detected at distance {}", dist);
            sink.emit(GameEvent::GameStart);
        }
        Ok(())
    }

    fn reset(&mut self) {
        self.filter.reset();
    }
}
