//! Offline database construction.
//!
//! Feeds reference card art, control captures and round banners through the
//! same extractors the live pipeline uses, so a clean runtime crop lands at
//! Hamming distance zero from its stored vector.

use anyhow::{ensure, Context, Result};
use image::{imageops, RgbaImage};
use std::collections::BTreeMap;
use std::path::Path;

use super::{ControlKind, Database, IndexKind};
use crate::extract::{extract_control, extract_digit, CardExtractor, ExtractorConfig};
use crate::extract::config::{REFERENCE_HEIGHT, REFERENCE_WIDTH};
use crate::crop::CropBox;
use crate::hash::ImageHash;
use crate::index::FeatureIndexBuilder;
use tcgwatch_core::catalog::{ActionCard, ActionCardKind, Catalog, Character, CATALOG_FILE};

/// Half-covered split views of arcane legend cards as they appear stacked in
/// hand: (left, top, width, height) on the reference card, left may be
/// negative (padded with blank).
const SPLIT_VIEWS: [(i32, i32, u32, u32); 2] = [(-22, 0, 315, 540), (128, 50, 315, 540)];

/// Accumulates catalog entries and feature vectors, then finalizes and
/// persists the whole database in one step.
pub struct DatabaseBuilder {
    config: ExtractorConfig,
    catalog: Catalog,
    action_extractor: CardExtractor,
    character_extractor: CardExtractor,
    controls: FeatureIndexBuilder,
    digits: FeatureIndexBuilder,
    actions_a: FeatureIndexBuilder,
    actions_d: FeatureIndexBuilder,
    characters_a: FeatureIndexBuilder,
    characters_d: FeatureIndexBuilder,
    /// Extra views are appended after the whole action table so raw index
    /// ids keep aliasing through `Catalog::extras`.
    pending_extras: Vec<(u32, ImageHash, ImageHash)>,
}

impl Default for DatabaseBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl DatabaseBuilder {
    pub fn new() -> Self {
        let config = ExtractorConfig::default();
        let bit_len = config.bit_len();
        let reference = CropBox::new(0, 0, REFERENCE_WIDTH, REFERENCE_HEIGHT);
        let mut action_extractor = CardExtractor::action();
        action_extractor.on_resize(reference);
        let mut character_extractor = CardExtractor::character();
        character_extractor.on_resize(reference);
        Self {
            config,
            catalog: Catalog::default(),
            action_extractor,
            character_extractor,
            controls: FeatureIndexBuilder::new(bit_len),
            digits: FeatureIndexBuilder::new(bit_len),
            actions_a: FeatureIndexBuilder::new(bit_len),
            actions_d: FeatureIndexBuilder::new(bit_len),
            characters_a: FeatureIndexBuilder::new(bit_len),
            characters_d: FeatureIndexBuilder::new(bit_len),
            pending_extras: Vec::new(),
        }
    }

    fn to_reference(image: &RgbaImage) -> RgbaImage {
        if image.dimensions() == (REFERENCE_WIDTH, REFERENCE_HEIGHT) {
            image.clone()
        } else {
            imageops::resize(
                image,
                REFERENCE_WIDTH,
                REFERENCE_HEIGHT,
                imageops::FilterType::Lanczos3,
            )
        }
    }

    /// Cut a (possibly partly out-of-bounds) view from the reference card
    /// and scale it back up to reference size.
    fn split_view(card: &RgbaImage, view: (i32, i32, u32, u32)) -> RgbaImage {
        let (left, top, width, height) = view;
        let mut out = RgbaImage::new(width, height);
        imageops::replace(&mut out, card, i64::from(-left), i64::from(-top));
        imageops::resize(
            &out,
            REFERENCE_WIDTH,
            REFERENCE_HEIGHT,
            imageops::FilterType::Lanczos3,
        )
    }

    /// Register a control capture. Must be called in `ControlKind` id order.
    pub fn add_control(&mut self, kind: ControlKind, image: &RgbaImage) -> Result<()> {
        let hash = extract_control(image, self.config.hash_size);
        let id = self.controls.add(hash).context("Control hash rejected")?;
        ensure!(
            id == kind.id(),
            "Control {:?} added out of order (got id {})",
            kind,
            id
        );
        Ok(())
    }

    /// Register the banner for the next round; banners for rounds 1..=N go
    /// in ascending order and get ids 0..N.
    pub fn add_digit(&mut self, image: &RgbaImage) -> Result<usize> {
        let hash = extract_digit(image, self.config.hash_size);
        self.digits.add(hash).context("Digit hash rejected")
    }

    /// Register an action card with its reference art. Arcane legends also
    /// get their two half-covered split views as extra entries.
    pub fn add_action(&mut self, card: ActionCard, image: &RgbaImage) -> Result<usize> {
        let reference = Self::to_reference(image);
        let (a, d) = self.action_extractor.extract(&reference)?;
        let id = self.actions_a.add(a).context("Action a-hash rejected")?;
        let id_d = self.actions_d.add(d).context("Action d-hash rejected")?;
        ensure!(id == id_d && id == self.catalog.actions.len());

        let is_arcane = card.kind == ActionCardKind::ArcaneLegend;
        self.catalog.actions.push(card);
        if is_arcane {
            for view in SPLIT_VIEWS {
                let padded = Self::split_view(&reference, view);
                let (a, d) = self.action_extractor.extract(&padded)?;
                self.pending_extras.push((id as u32, a, d));
            }
        }
        Ok(id)
    }

    /// Register an alternate view (token art, talent split view) of an
    /// already-added action card.
    pub fn add_extra(&mut self, canonical_id: u32, image: &RgbaImage) -> Result<()> {
        ensure!(
            (canonical_id as usize) < self.catalog.actions.len(),
            "Extra references unknown action id {}",
            canonical_id
        );
        let reference = Self::to_reference(image);
        let (a, d) = self.action_extractor.extract(&reference)?;
        self.pending_extras.push((canonical_id, a, d));
        Ok(())
    }

    /// Register a character with its reference art. `talent_id` links the
    /// character's talent action card back to it.
    pub fn add_character(
        &mut self,
        character: Character,
        talent_id: Option<u32>,
        image: &RgbaImage,
    ) -> Result<usize> {
        let reference = Self::to_reference(image);
        let (a, d) = self.character_extractor.extract(&reference)?;
        let id = self.characters_a.add(a).context("Character a-hash rejected")?;
        let id_d = self.characters_d.add(d).context("Character d-hash rejected")?;
        ensure!(id == id_d && id == self.catalog.characters.len());
        self.catalog.characters.push(character);
        if let Some(talent) = talent_id {
            self.catalog.talent_to_character.insert(talent, id as u32);
        }
        Ok(id)
    }

    pub fn set_share_codes(&mut self, share_to_internal: Vec<i32>) {
        self.catalog.share_to_internal = share_to_internal;
    }

    pub fn set_artifacts_order(&mut self, order: BTreeMap<u32, u32>) {
        self.catalog.artifacts_order = order;
    }

    /// Flush extras, finalize every index, persist everything to `dir` and
    /// return the loaded-equivalent database.
    pub fn finish<P: AsRef<Path>>(mut self, dir: P) -> Result<Database> {
        let dir = dir.as_ref();
        for (canonical, a, d) in std::mem::take(&mut self.pending_extras) {
            let id = self.actions_a.add(a).context("Extra a-hash rejected")?;
            let id_d = self.actions_d.add(d).context("Extra d-hash rejected")?;
            ensure!(id == id_d && id == self.catalog.actions.len() + self.catalog.extras.len());
            self.catalog.extras.push(canonical);
        }
        self.catalog.validate()?;

        let indices = vec![
            self.controls.build(),
            self.digits.build(),
            self.actions_a.build(),
            self.actions_d.build(),
            self.characters_a.build(),
            self.characters_d.build(),
        ];
        for (kind, index) in IndexKind::ALL.iter().zip(&indices) {
            index.save(dir.join(kind.file_name()))?;
        }
        self.catalog.save(dir.join(CATALOG_FILE))?;
        Ok(Database::from_parts(self.catalog, indices))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;
    use tcgwatch_core::catalog::{Cost, CostElement, LocalizedName};

    fn art(seed: u32) -> RgbaImage {
        let mut state = seed | 1;
        RgbaImage::from_fn(REFERENCE_WIDTH, REFERENCE_HEIGHT, |_, _| {
            state = state.wrapping_mul(1664525).wrapping_add(1013904223);
            let v = (state >> 24) as u8;
            Rgba([v, v ^ 0x33, v.rotate_left(5), 255])
        })
    }

    fn event_card(en: &str) -> ActionCard {
        ActionCard {
            name: LocalizedName::new(en, en, en),
            kind: ActionCardKind::Event,
            cost: Cost {
                amount: 1,
                element: CostElement::Any,
                combined: false,
            },
        }
    }

    #[test]
    fn test_build_and_reload_database() {
        let dir = tempfile::tempdir().unwrap();
        let mut builder = DatabaseBuilder::new();
        builder
            .add_control(ControlKind::GameStart, &art(100))
            .unwrap();
        builder
            .add_control(ControlKind::GameOver, &art(101))
            .unwrap();
        builder.add_digit(&art(200)).unwrap();
        let id0 = builder.add_action(event_card("First"), &art(1)).unwrap();
        let id1 = builder.add_action(event_card("Second"), &art(2)).unwrap();
        assert_eq!((id0, id1), (0, 1));
        builder.add_extra(0, &art(3)).unwrap();

        let built = builder.finish(dir.path()).unwrap();
        let reloaded = Database::load(dir.path()).unwrap();
        assert_eq!(built.catalog(), reloaded.catalog());
        assert_eq!(
            built.index(IndexKind::ActionsA).len(),
            reloaded.index(IndexKind::ActionsA).len()
        );
        // Two actions plus one extra.
        assert_eq!(reloaded.index(IndexKind::ActionsA).len(), 3);
        assert_eq!(reloaded.catalog().canonical_action(2), Some(0));
    }

    #[test]
    fn test_reference_art_matches_at_distance_zero() {
        let dir = tempfile::tempdir().unwrap();
        let mut builder = DatabaseBuilder::new();
        builder
            .add_control(ControlKind::GameStart, &art(100))
            .unwrap();
        builder
            .add_control(ControlKind::GameOver, &art(101))
            .unwrap();
        builder.add_digit(&art(200)).unwrap();
        let card_art = art(7);
        builder.add_action(event_card("Card"), &card_art).unwrap();
        let db = builder.finish(dir.path()).unwrap();

        let mut extractor = CardExtractor::action();
        extractor.on_resize(CropBox::new(0, 0, REFERENCE_WIDTH, REFERENCE_HEIGHT));
        let (a, d) = extractor.extract(&card_art).unwrap();
        assert_eq!(db.best(&a, IndexKind::ActionsA).unwrap().distance, 0);
        assert_eq!(db.best(&d, IndexKind::ActionsD).unwrap().distance, 0);
    }

    #[test]
    fn test_arcane_legend_gains_split_views() {
        let dir = tempfile::tempdir().unwrap();
        let mut builder = DatabaseBuilder::new();
        builder
            .add_control(ControlKind::GameStart, &art(100))
            .unwrap();
        builder
            .add_control(ControlKind::GameOver, &art(101))
            .unwrap();
        builder.add_digit(&art(200)).unwrap();
        let mut card = event_card("Legend");
        card.kind = ActionCardKind::ArcaneLegend;
        builder.add_action(card, &art(9)).unwrap();
        let db = builder.finish(dir.path()).unwrap();

        assert_eq!(db.index(IndexKind::ActionsA).len(), 3);
        assert_eq!(db.catalog().extras, vec![0, 0]);
    }

    #[test]
    fn test_controls_out_of_order_rejected() {
        let mut builder = DatabaseBuilder::new();
        assert!(builder
            .add_control(ControlKind::GameOver, &art(1))
            .is_err());
    }
}
