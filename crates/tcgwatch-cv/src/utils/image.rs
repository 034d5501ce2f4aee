//! Grayscale float buffers, the mandatory pre-hash normalization, and the
//! resampling kernels the hash engine uses.

use anyhow::{ensure, Result};
use image::RgbaImage;

use crate::crop::CropBox;

/// Single-channel f32 image with values in [0, 1].
#[derive(Debug, Clone, PartialEq)]
pub struct GrayImageF32 {
    width: usize,
    height: usize,
    data: Vec<f32>,
}

impl GrayImageF32 {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            data: vec![0.0; width * height],
        }
    }

    pub fn from_raw(width: usize, height: usize, data: Vec<f32>) -> Self {
        assert_eq!(data.len(), width * height);
        Self {
            width,
            height,
            data,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> f32 {
        self.data[y * self.width + x]
    }

    #[inline]
    pub fn set(&mut self, x: usize, y: usize, value: f32) {
        self.data[y * self.width + x] = value;
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }
}

/// Normalize an RGBA buffer for hashing: single-channel gray, histogram
/// equalization, f32 in [0, 1].
///
/// Every hash computation must go through this; it is what makes the hashes
/// robust to brightness/contrast shifts between captured frames and the
/// reference card images.
pub fn normalize(rgba: &RgbaImage) -> GrayImageF32 {
    let gray = image::imageops::grayscale(rgba);
    let equalized = imageproc::contrast::equalize_histogram(&gray);
    let (w, h) = equalized.dimensions();
    let data = equalized
        .into_raw()
        .into_iter()
        .map(|p| f32::from(p) / 255.0)
        .collect();
    GrayImageF32::from_raw(w as usize, h as usize, data)
}

/// Copy the crop-box region out of a frame, bounds-checked.
pub fn crop_region(frame: &RgbaImage, crop: &CropBox) -> Result<RgbaImage> {
    let (fw, fh) = frame.dimensions();
    ensure!(
        crop.right <= fw && crop.bottom <= fh,
        "Crop box {:?} exceeds frame {}x{}",
        crop,
        fw,
        fh
    );
    Ok(image::imageops::crop_imm(frame, crop.left, crop.top, crop.width(), crop.height()).to_image())
}

/// Area-averaging downsample (the behavior of OpenCV's INTER_AREA): each
/// destination pixel averages the source rectangle it covers, with fractional
/// edge pixels weighted by coverage.
pub fn resize_area(src: &GrayImageF32, dst_width: usize, dst_height: usize) -> GrayImageF32 {
    assert!(dst_width > 0 && dst_height > 0);
    if src.width() == dst_width && src.height() == dst_height {
        return src.clone();
    }

    let scale_x = src.width() as f64 / dst_width as f64;
    let scale_y = src.height() as f64 / dst_height as f64;
    let mut dst = GrayImageF32::new(dst_width, dst_height);

    for dy in 0..dst_height {
        let y0 = dy as f64 * scale_y;
        let y1 = (y0 + scale_y).min(src.height() as f64);
        for dx in 0..dst_width {
            let x0 = dx as f64 * scale_x;
            let x1 = (x0 + scale_x).min(src.width() as f64);

            let mut total = 0.0f64;
            let mut weight_sum = 0.0f64;
            let mut sy = y0.floor() as usize;
            while (sy as f64) < y1 {
                let wy = (y1.min((sy + 1) as f64) - y0.max(sy as f64)).max(0.0);
                let mut sx = x0.floor() as usize;
                while (sx as f64) < x1 {
                    let wx = (x1.min((sx + 1) as f64) - x0.max(sx as f64)).max(0.0);
                    let w = wx * wy;
                    total += f64::from(src.get(sx.min(src.width() - 1), sy.min(src.height() - 1))) * w;
                    weight_sum += w;
                    sx += 1;
                }
                sy += 1;
            }
            dst.set(dx, dy, (total / weight_sum.max(f64::EPSILON)) as f32);
        }
    }
    dst
}

/// Bilinear resample, used when upscaling toward the DCT input size.
pub fn resize_bilinear(src: &GrayImageF32, dst_width: usize, dst_height: usize) -> GrayImageF32 {
    assert!(dst_width > 0 && dst_height > 0);
    if src.width() == dst_width && src.height() == dst_height {
        return src.clone();
    }

    let scale_x = src.width() as f64 / dst_width as f64;
    let scale_y = src.height() as f64 / dst_height as f64;
    let mut dst = GrayImageF32::new(dst_width, dst_height);

    for dy in 0..dst_height {
        let sy = ((dy as f64 + 0.5) * scale_y - 0.5).max(0.0);
        let y0 = sy.floor() as usize;
        let y1 = (y0 + 1).min(src.height() - 1);
        let fy = (sy - y0 as f64) as f32;
        for dx in 0..dst_width {
            let sx = ((dx as f64 + 0.5) * scale_x - 0.5).max(0.0);
            let x0 = sx.floor() as usize;
            let x1 = (x0 + 1).min(src.width() - 1);
            let fx = (sx - x0 as f64) as f32;

            let top = src.get(x0, y0) * (1.0 - fx) + src.get(x1, y0) * fx;
            let bottom = src.get(x0, y1) * (1.0 - fx) + src.get(x1, y1) * fx;
            dst.set(dx, dy, top * (1.0 - fy) + bottom * fy);
        }
    }
    dst
}
