//! Pixel-space crop rectangles.
//!
//! Core geometry type for the pipeline: regions resolved from the client
//! resolution, feature sub-crops inside a card region, and card bounding
//! boxes all use the same representation.

use serde::{Deserialize, Serialize};

/// Rectangle in pixel space. Invariant: `right >= left`, `bottom >= top`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CropBox {
    pub left: u32,
    pub top: u32,
    pub right: u32,
    pub bottom: u32,
}

impl CropBox {
    pub fn new(left: u32, top: u32, right: u32, bottom: u32) -> Self {
        debug_assert!(right >= left && bottom >= top);
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    /// Scale a fractional `(left, top, width, height)` box by a pixel size,
    /// rounding each edge to the nearest pixel.
    pub fn from_fractions(fractions: [f32; 4], width: u32, height: u32) -> Self {
        let left = (fractions[0] * width as f32).round() as u32;
        let top = (fractions[1] * height as f32).round() as u32;
        let w = (fractions[2] * width as f32).round() as u32;
        let h = (fractions[3] * height as f32).round() as u32;
        Self::new(left, top, left + w, top + h)
    }

    pub fn width(&self) -> u32 {
        self.right - self.left
    }

    pub fn height(&self) -> u32 {
        self.bottom - self.top
    }

    /// Expand this box to cover `other` as well.
    pub fn merge(&mut self, other: &CropBox) {
        self.left = self.left.min(other.left);
        self.top = self.top.min(other.top);
        self.right = self.right.max(other.right);
        self.bottom = self.bottom.max(other.bottom);
    }
}
