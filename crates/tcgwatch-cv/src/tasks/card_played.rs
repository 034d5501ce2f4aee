//! Played-card recognition for one side of the board.

use anyhow::Result;
use image::RgbaImage;
use std::sync::Arc;

use super::RecognitionTask;
use crate::classify::{classify, Match, Thresholds};
use crate::db::{Database, IndexKind};
use crate::extract::CardExtractor;
use crate::regions::{resolve, RatioBucket, Region};
use tcgwatch_core::catalog::Language;
use tcgwatch_core::{EventSink, GameEvent, Side, StreamFilter, NO_MATCH};

/// Watches one played-card slot (mine or the opponent's), classifies the
/// card shown during the play animation and reports it once stable.
pub struct CardPlayedTask {
    db: Arc<Database>,
    side: Side,
    lang: Language,
    extractor: CardExtractor,
    thresholds: Thresholds,
    filter: StreamFilter<i32>,
}

impl CardPlayedTask {
    pub fn new(db: Arc<Database>, side: Side) -> Self {
        Self {
            db,
            side,
            lang: Language::EnUs,
            extractor: CardExtractor::action(),
            thresholds: Thresholds::default(),
            filter: StreamFilter::new(NO_MATCH),
        }
    }

    fn region(&self) -> Region {
        match self.side {
            Side::Mine => Region::MyPlayed,
            Side::Opponent => Region::OpPlayed,
        }
    }
}

impl RecognitionTask for CardPlayedTask {
    fn name(&self) -> &'static str {
        match self.side {
            Side::Mine => "my_played",
            Side::Opponent => "op_played",
        }
    }

    fn on_resize(&mut self, bucket: RatioBucket, client_width: u32, client_height: u32) {
        self.extractor
            .on_resize(resolve(self.region(), bucket, client_width, client_height));
    }

    fn tick(&mut self, frame: &RgbaImage, sink: &mut dyn EventSink) -> Result<()> {
        // A failed extraction (region momentarily outside the frame) counts
        // as a null observation, not a pipeline error.
        let sample = match self.extractor.extract(frame) {
            Ok((a, d)) => {
                let best_a = self.db.best(&a, IndexKind::ActionsA)?;
                let best_d = self.db.best(&d, IndexKind::ActionsD)?;
                classify(best_a, best_d, self.thresholds)
            }
            Err(err) => {
                log::debug!("{}: extraction skipped: {:#}", self.name(), err);
                Match::none(0)
            }
        };

        let card_id = self.filter.filter(sample.id, sample.distance);
        if card_id >= 0 {
            match self.db.catalog().canonical_action(card_id as usize) {
                Some(canonical) => sink.emit(GameEvent::CardPlayed {
                    side: self.side,
                    card_id: canonical as u32,
                    name: self.db.catalog().action_name(card_id, self.lang).to_string(),
                }),
                None => log::warn!("{}: stable id {} has no catalog entry", self.name(), card_id),
            }
        }
        Ok(())
    }

    fn reset(&mut self) {
        self.filter.reset();
    }
}
