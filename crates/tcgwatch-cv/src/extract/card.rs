//! Card feature extractor: three-crop stitching plus the dual DCT hash pair.

use anyhow::{bail, Result};
use image::{imageops, RgbaImage};

use super::config::{ExtractorConfig, ACTION_CROPS, CHARACTER_CROPS};
use crate::crop::CropBox;
use crate::hash::{multi_phash, ImageHash};
use crate::utils::normalize;

/// Crops three sub-regions of a card region and stitches them into one
/// feature buffer:
///
/// ```text
///     ---------------------
///     |         |         |
///     |         |         |
///     |    0    |    1    |
///     |         |         |
///     |         |         |
///     |         |---------|
///     |         |         |
///     |         |    2    |
///     |         |         |
///     |         |         |
///     |---------|---------|
/// ```
///
/// Region 0 spans the full buffer height on the left; regions 1 and 2 stack
/// on the right. Both an a-hash and a d-hash are computed from the assembled
/// buffer.
///
/// The stitch buffer is an owned scratch buffer: sized once in `on_resize`,
/// overwritten on every `extract`, never shared across tasks.
#[derive(Debug, Clone)]
pub struct CardExtractor {
    config: ExtractorConfig,
    crop_fractions: [[f32; 4]; 3],
    crop_box: Option<CropBox>,
    feature_crops: [CropBox; 3],
    buffer: RgbaImage,
}

impl CardExtractor {
    /// Extractor for action cards (cost corner, art band, text box).
    pub fn action() -> Self {
        Self::with_fractions(ExtractorConfig::default(), ACTION_CROPS)
    }

    /// Extractor for character cards: same stitching, character crop table.
    pub fn character() -> Self {
        Self::with_fractions(ExtractorConfig::default(), CHARACTER_CROPS)
    }

    pub fn with_fractions(config: ExtractorConfig, crop_fractions: [[f32; 4]; 3]) -> Self {
        let empty = CropBox::new(0, 0, 0, 0);
        Self {
            config,
            crop_fractions,
            crop_box: None,
            feature_crops: [empty; 3],
            buffer: RgbaImage::new(0, 0),
        }
    }

    /// Recompute the feature crops for a new card region and reallocate the
    /// stitch buffer. Must be called before `extract` and again after every
    /// client resize.
    pub fn on_resize(&mut self, crop_box: CropBox) {
        let (w, h) = (crop_box.width(), crop_box.height());

        let crop0 = CropBox::from_fractions(self.crop_fractions[0], w, h);
        let crop1 = CropBox::from_fractions(self.crop_fractions[1], w, h);
        // Crop 2 completes the right column: width from crop 1, height the
        // remainder of crop 0's.
        let left2 = (self.crop_fractions[2][0] * w as f32).round() as u32;
        let top2 = (self.crop_fractions[2][1] * h as f32).round() as u32;
        let crop2 = CropBox::new(
            left2,
            top2,
            left2 + crop1.width(),
            top2 + crop0.height() - crop1.height(),
        );

        self.buffer = RgbaImage::new(crop0.width() + crop1.width(), crop0.height());
        self.feature_crops = [crop0, crop1, crop2];
        self.crop_box = Some(crop_box);
    }

    /// The card region this extractor currently covers.
    pub fn crop_box(&self) -> Option<CropBox> {
        self.crop_box
    }

    /// Stitch the three sub-regions of the frame's card region and hash the
    /// result. Fails when the extractor has not been resized yet or the
    /// region falls outside the frame.
    pub fn extract(&mut self, frame: &RgbaImage) -> Result<(ImageHash, ImageHash)> {
        let Some(region) = self.crop_box else {
            bail!("CardExtractor used before on_resize");
        };
        let (fw, fh) = frame.dimensions();
        if region.right > fw || region.bottom > fh {
            bail!("Card region {:?} exceeds frame {}x{}", region, fw, fh);
        }

        let crop0 = self.feature_crops[0];
        let dest_x = [0u32, crop0.width(), crop0.width()];
        let dest_y = [0u32, 0, self.feature_crops[1].height()];
        for (i, crop) in self.feature_crops.iter().enumerate() {
            if region.left + crop.right > fw || region.top + crop.bottom > fh {
                bail!("Feature crop {:?} exceeds frame {}x{}", crop, fw, fh);
            }
            let view = imageops::crop_imm(
                frame,
                region.left + crop.left,
                region.top + crop.top,
                crop.width(),
                crop.height(),
            );
            imageops::replace(
                &mut self.buffer,
                &*view,
                i64::from(dest_x[i]),
                i64::from(dest_y[i]),
            );
        }

        let gray = normalize(&self.buffer);
        Ok(multi_phash(&gray, self.config.feature_size, self.config.hash_size))
    }
}
