//! Game-over detection: the result banner via the controls index.

use anyhow::{bail, Result};
use image::RgbaImage;
use std::sync::Arc;

use super::RecognitionTask;
use crate::classify::Thresholds;
use crate::crop::CropBox;
use crate::db::{ControlKind, Database, IndexKind};
use crate::extract::{extract_control, ExtractorConfig};
use crate::regions::{resolve, RatioBucket, Region};
use crate::utils::crop_region;
use tcgwatch_core::{EventSink, GameEvent, StreamFilter};

/// Watches the end-of-game banner region while a game is in progress.
pub struct GameOverTask {
    db: Arc<Database>,
    hash_size: usize,
    threshold: u32,
    crop: Option<CropBox>,
    filter: StreamFilter<bool>,
}

impl GameOverTask {
    pub fn new(db: Arc<Database>) -> Self {
        Self {
            db,
            hash_size: ExtractorConfig::default().hash_size,
            threshold: Thresholds::default().loose,
            crop: None,
            filter: StreamFilter::new(false),
        }
    }
}

impl RecognitionTask for GameOverTask {
    fn name(&self) -> &'static str {
        "game_over"
    }

    fn on_resize(&mut self, bucket: RatioBucket, client_width: u32, client_height: u32) {
        self.crop = Some(resolve(Region::GameOver, bucket, client_width, client_height));
    }

    fn tick(&mut self, frame: &RgbaImage, sink: &mut dyn EventSink) -> Result<()> {
        let Some(crop) = self.crop else {
            bail!("GameOverTask ticked before on_resize");
        };
        let region = crop_region(frame, &crop)?;
        let hash = extract_control(&region, self.hash_size);
        let best = self.db.best(&hash, IndexKind::Controls)?;
        let detected =
            best.id == ControlKind::GameOver.id() as i32 && best.distance <= self.threshold;
        if self.filter.filter(detected, best.distance) {
            log::debug!("Game over detected at distance {}", best.distance);
            sink.emit(GameEvent::GameOver);
        }
        Ok(())
    }

    fn reset(&mut self) {
        self.filter.reset();
    }
}
