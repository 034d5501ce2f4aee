//! Multi-slot card selection: drawn-card and deck-overlay recognition.

use anyhow::Result;
use image::RgbaImage;
use std::collections::BTreeMap;
use std::sync::Arc;

use super::RecognitionTask;
use crate::classify::{classify, Thresholds};
use crate::crop::CropBox;
use crate::db::{Database, IndexKind};
use crate::extract::CardExtractor;
use crate::regions::RatioBucket;
use tcgwatch_core::catalog::Language;
use tcgwatch_core::{EventSink, GameEvent, StreamFilter, NO_MATCH};

/// Supplies the card slot boxes visible in the current frame. The overlay
/// layout is animated, so the boxes are re-detected every tick.
pub trait CardLocator {
    fn locate(&mut self, frame: &RgbaImage) -> Result<Vec<CropBox>>;
}

/// Recognizes the cards shown in a selection overlay (mulligan, draw
/// results, deck views). Each expected slot gets its own debounce filter;
/// `flush` diffs the final set against the previously known one and reports
/// drawn and created cards.
pub struct CardSelectTask {
    db: Arc<Database>,
    locator: Box<dyn CardLocator + Send>,
    lang: Language,
    extractor: CardExtractor,
    thresholds: Thresholds,
    n_cards: usize,
    prev_counts: BTreeMap<i32, i64>,
    cards: Vec<i32>,
    filters: Vec<StreamFilter<i32>>,
}

fn counts(cards: &[i32]) -> BTreeMap<i32, i64> {
    let mut map = BTreeMap::new();
    for &card in cards {
        *map.entry(card).or_insert(0) += 1;
    }
    map
}

impl CardSelectTask {
    /// Slots take many frames to settle, so the window is long and a single
    /// confident hit may win it.
    const WINDOW_SIZE: usize = 10;
    const VALID_COUNT: usize = 1;
    const WINDOW_MIN_COUNT: usize = 6;

    pub fn new(
        db: Arc<Database>,
        locator: Box<dyn CardLocator + Send>,
        n_cards: usize,
        prev_cards: &[i32],
    ) -> Self {
        let mut task = Self {
            db,
            locator,
            lang: Language::EnUs,
            extractor: CardExtractor::action(),
            thresholds: Thresholds {
                loose: 40,
                ..Thresholds::default()
            },
            n_cards,
            prev_counts: BTreeMap::new(),
            cards: Vec::new(),
            filters: Vec::new(),
        };
        task.reset_with(n_cards, prev_cards);
        task
    }

    fn reset_with(&mut self, n_cards: usize, prev_cards: &[i32]) {
        self.n_cards = n_cards;
        self.prev_counts = counts(prev_cards);
        self.cards = vec![NO_MATCH; n_cards];
        self.filters = (0..n_cards)
            .map(|_| {
                StreamFilter::with_params(
                    NO_MATCH,
                    Self::WINDOW_SIZE,
                    Self::VALID_COUNT,
                    Self::WINDOW_MIN_COUNT,
                )
            })
            .collect();
    }

    fn names(&self, cards: &[u32]) -> Vec<String> {
        cards
            .iter()
            .map(|&c| self.db.catalog().action_name(c as i32, self.lang).to_string())
            .collect()
    }

    /// Diff the recognized set against the previously known one and emit the
    /// difference, then start over.
    pub fn flush(&mut self, sink: &mut dyn EventSink) {
        let mut cur_counts = counts(&self.cards);
        if cur_counts.remove(&NO_MATCH).is_some() {
            log::error!("card_select: some slots were never recognized: {:?}", self.cards);
        }

        let mut diff = cur_counts;
        for (&card, &count) in &self.prev_counts {
            *diff.entry(card).or_insert(0) -= count;
        }

        let mut drawn: Vec<u32> = Vec::new();
        let mut created: Vec<u32> = Vec::new();
        for (card, count) in diff {
            let Some(canonical) = self.db.catalog().canonical_action(card as usize) else {
                continue;
            };
            for _ in 0..count.unsigned_abs() {
                if count > 0 {
                    drawn.push(canonical as u32);
                } else {
                    created.push(canonical as u32);
                }
            }
        }

        if !drawn.is_empty() {
            let names = self.names(&drawn);
            sink.emit(GameEvent::CardsDrawn { cards: drawn, names });
        }
        if !created.is_empty() {
            let names = self.names(&created);
            sink.emit(GameEvent::DeckCardsCreated {
                cards: created,
                names,
            });
        }

        self.reset_with(self.n_cards, &[]);
    }
}

impl RecognitionTask for CardSelectTask {
    fn name(&self) -> &'static str {
        "card_select"
    }

    fn on_resize(&mut self, _bucket: RatioBucket, _client_width: u32, _client_height: u32) {
        // Slot boxes come from the locator in frame space each tick.
    }

    fn tick(&mut self, frame: &RgbaImage, _sink: &mut dyn EventSink) -> Result<()> {
        let boxes = self.locator.locate(frame)?;
        if boxes.len() != self.n_cards {
            // Overlay not (fully) visible: every slot observes null.
            for filter in &mut self.filters {
                filter.filter(NO_MATCH, 0);
            }
            return Ok(());
        }

        for (i, bbox) in boxes.into_iter().enumerate() {
            self.extractor.on_resize(bbox);
            let sample = match self.extractor.extract(frame) {
                Ok((a, d)) => {
                    let best_a = self.db.best(&a, IndexKind::ActionsA)?;
                    let best_d = self.db.best(&d, IndexKind::ActionsD)?;
                    classify(best_a, best_d, self.thresholds)
                }
                Err(err) => {
                    log::debug!("card_select: slot {} skipped: {:#}", i, err);
                    crate::classify::Match::none(0)
                }
            };
            let card_id = self.filters[i].filter(sample.id, sample.distance);
            if card_id >= 0 {
                self.cards[i] = card_id;
            }
        }
        Ok(())
    }

    fn reset(&mut self) {
        self.reset_with(self.n_cards, &[]);
    }
}
