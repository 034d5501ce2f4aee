//! Client-geometry resolver: aspect-ratio buckets and the per-bucket tables
//! of fractional screen regions.
//!
//! Regions are stored as fractions of the client size so one table per
//! aspect-ratio bucket covers every concrete resolution in that bucket.

use serde::{Deserialize, Serialize};

use crate::crop::CropBox;

/// Tolerance when matching an observed aspect ratio against a bucket.
pub const RATIO_EPSILON: f64 = 0.005;

/// The supported client aspect ratios.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RatioBucket {
    /// 1920x1080, 2560x1440
    R16x9,
    /// 1920x1200, 1680x1050
    R16x10,
    /// 2560x1080, 2048x864
    R64x27,
    /// 3440x1440, 2150x900
    R43x18,
    /// 3840x1600, 1920x800
    R12x5,
}

impl RatioBucket {
    pub const ALL: [RatioBucket; 5] = [
        RatioBucket::R16x9,
        RatioBucket::R16x10,
        RatioBucket::R64x27,
        RatioBucket::R43x18,
        RatioBucket::R12x5,
    ];

    pub fn ratio(&self) -> f64 {
        match self {
            RatioBucket::R16x9 => 16.0 / 9.0,
            RatioBucket::R16x10 => 16.0 / 10.0,
            RatioBucket::R64x27 => 64.0 / 27.0,
            RatioBucket::R43x18 => 43.0 / 18.0,
            RatioBucket::R12x5 => 12.0 / 5.0,
        }
    }

    /// Match the client dimensions against the supported buckets.
    ///
    /// Unknown ratios fall back to 16:9 with a diagnostic; the fallback keeps
    /// recognition running (degraded) rather than stopping it.
    pub fn from_client(client_width: u32, client_height: u32) -> RatioBucket {
        let ratio = f64::from(client_width) / f64::from(client_height);
        for bucket in RatioBucket::ALL {
            if (ratio - bucket.ratio()).abs() < RATIO_EPSILON {
                return bucket;
            }
        }
        log::warn!(
            "Unsupported client ratio {}x{} ({:.4}); falling back to 16:9",
            client_width,
            client_height,
            ratio
        );
        RatioBucket::R16x9
    }
}

/// Semantic screen regions the recognition tasks crop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Region {
    GameStart,
    MyPlayed,
    OpPlayed,
    GameOver,
    Phase,
    Round,
    Center,
    FlowAnchor,
    MyDeck,
    VsAnchor,
}

/// Fractional region box relative to the client size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RegionFractions {
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
    /// Extra margin fraction some anchor regions carry.
    pub margin: Option<f32>,
}

const fn frac(left: f32, top: f32, width: f32, height: f32) -> RegionFractions {
    RegionFractions {
        left,
        top,
        width,
        height,
        margin: None,
    }
}

const fn frac_m(left: f32, top: f32, width: f32, height: f32, margin: f32) -> RegionFractions {
    RegionFractions {
        left,
        top,
        width,
        height,
        margin: Some(margin),
    }
}

/// The fractional box for a region in a ratio bucket.
pub fn fractions(region: Region, bucket: RatioBucket) -> RegionFractions {
    match bucket {
        RatioBucket::R16x9 => match region {
            Region::GameStart => frac(0.4470, 0.4400, 0.1045, 0.1110),
            Region::MyPlayed => frac(0.1225, 0.1755, 0.1400, 0.4270),
            Region::OpPlayed => frac(0.7380, 0.1755, 0.1400, 0.4270),
            Region::GameOver => frac(0.4220, 0.4240, 0.1555, 0.1190),
            Region::Phase => frac(0.4000, 0.4800, 0.2000, 0.0400),
            Region::Round => frac(0.4400, 0.5420, 0.1200, 0.0310),
            Region::Center => frac(0.0700, 0.3380, 0.8600, 0.0500),
            Region::FlowAnchor => frac(0.0078, 0.3350, 0.1070, 0.3280),
            Region::MyDeck => frac(0.0000, 0.5550, 0.3250, 0.2750),
            Region::VsAnchor => frac_m(0.1355, 0.3595, 0.0870, 0.2585, 0.0090),
        },
        RatioBucket::R16x10 => match region {
            Region::GameStart => frac(0.4470, 0.4470, 0.1045, 0.0995),
            Region::MyPlayed => frac(0.1490, 0.2285, 0.1305, 0.3565),
            Region::OpPlayed => frac(0.7215, 0.2285, 0.1305, 0.3565),
            Region::GameOver => frac(0.4220, 0.4240, 0.1555, 0.1190),
            Region::Phase => frac(0.4000, 0.4800, 0.2000, 0.0400),
            Region::Round => frac(0.4400, 0.5370, 0.1200, 0.0280),
            Region::Center => frac(0.0700, 0.3540, 0.8600, 0.0500),
            Region::FlowAnchor => frac(0.0078, 0.3550, 0.1035, 0.2850),
            Region::MyDeck => frac(0.0000, 0.5500, 0.3250, 0.2500),
            Region::VsAnchor => frac_m(0.1350, 0.3725, 0.0870, 0.2335, 0.0094),
        },
        RatioBucket::R64x27 => match region {
            Region::GameStart => frac(0.4605, 0.4400, 0.0780, 0.1100),
            Region::MyPlayed => frac(0.2170, 0.1755, 0.1050, 0.4270),
            Region::OpPlayed => frac(0.6785, 0.1755, 0.1050, 0.4270),
            Region::GameOver => frac(0.4420, 0.4250, 0.1165, 0.1190),
            Region::Phase => frac(0.4000, 0.4790, 0.2000, 0.0400),
            Region::Round => frac(0.4400, 0.5410, 0.1200, 0.0320),
            Region::Center => frac(0.1000, 0.3300, 0.8000, 0.0600),
            Region::FlowAnchor => frac(0.0050, 0.3350, 0.0800, 0.3280),
            Region::MyDeck => frac(0.1260, 0.5550, 0.2440, 0.2750),
            Region::VsAnchor => frac_m(0.2265, 0.3590, 0.0650, 0.2590, 0.0075),
        },
        RatioBucket::R43x18 => match region {
            Region::GameStart => frac(0.4605, 0.4400, 0.0780, 0.1100),
            Region::MyPlayed => frac(0.2195, 0.1755, 0.1045, 0.4275),
            Region::OpPlayed => frac(0.6776, 0.1755, 0.1045, 0.4275),
            Region::GameOver => frac(0.4420, 0.4240, 0.1165, 0.1190),
            Region::Phase => frac(0.4000, 0.4790, 0.2000, 0.0400),
            Region::Round => frac(0.4400, 0.5422, 0.1200, 0.0325),
            Region::Center => frac(0.1000, 0.3300, 0.8000, 0.0600),
            Region::FlowAnchor => frac(0.0050, 0.3350, 0.0780, 0.3280),
            Region::MyDeck => frac(0.1260, 0.5550, 0.2440, 0.2750),
            Region::VsAnchor => frac_m(0.2285, 0.3590, 0.0645, 0.2590, 0.0070),
        },
        RatioBucket::R12x5 => match region {
            Region::GameStart => frac(0.4605, 0.4400, 0.0780, 0.1100),
            Region::MyPlayed => frac(0.2205, 0.1755, 0.1045, 0.4270),
            Region::OpPlayed => frac(0.6765, 0.1755, 0.1045, 0.4270),
            Region::GameOver => frac(0.4420, 0.4240, 0.1165, 0.1190),
            Region::Phase => frac(0.4000, 0.4790, 0.2000, 0.0400),
            Region::Round => frac(0.4400, 0.5400, 0.1200, 0.0345),
            Region::Center => frac(0.1000, 0.3300, 0.8000, 0.0600),
            Region::FlowAnchor => frac(0.0055, 0.3350, 0.0790, 0.3280),
            Region::MyDeck => frac(0.1260, 0.5550, 0.2440, 0.2750),
            Region::VsAnchor => frac_m(0.2295, 0.3590, 0.0645, 0.2590, 0.0070),
        },
    }
}

/// Resolve a region to a pixel-space crop box for the given client size.
pub fn resolve(region: Region, bucket: RatioBucket, client_width: u32, client_height: u32) -> CropBox {
    let f = fractions(region, bucket);
    CropBox::from_fractions([f.left, f.top, f.width, f.height], client_width, client_height)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_common_resolutions_bucket() {
        assert_eq!(RatioBucket::from_client(1920, 1080), RatioBucket::R16x9);
        assert_eq!(RatioBucket::from_client(2560, 1440), RatioBucket::R16x9);
        assert_eq!(RatioBucket::from_client(1920, 1200), RatioBucket::R16x10);
        assert_eq!(RatioBucket::from_client(2560, 1080), RatioBucket::R64x27);
        assert_eq!(RatioBucket::from_client(3440, 1440), RatioBucket::R43x18);
        assert_eq!(RatioBucket::from_client(3840, 1600), RatioBucket::R12x5);
    }

    #[test]
    fn test_unknown_ratio_falls_back_to_16x9() {
        // Ratio 3.0 is outside every bucket's epsilon.
        assert_eq!(RatioBucket::from_client(3000, 1000), RatioBucket::R16x9);
    }

    #[test]
    fn test_resolve_game_start_at_1080p() {
        let cb = resolve(Region::GameStart, RatioBucket::R16x9, 1920, 1080);
        assert_eq!(cb.left, (0.4470f32 * 1920.0).round() as u32);
        assert_eq!(cb.top, (0.4400f32 * 1080.0).round() as u32);
        assert_eq!(cb.width(), (0.1045f32 * 1920.0).round() as u32);
        assert_eq!(cb.height(), (0.1110f32 * 1080.0).round() as u32);
    }

    #[test]
    fn test_every_bucket_has_every_region() {
        let regions = [
            Region::GameStart,
            Region::MyPlayed,
            Region::OpPlayed,
            Region::GameOver,
            Region::Phase,
            Region::Round,
            Region::Center,
            Region::FlowAnchor,
            Region::MyDeck,
            Region::VsAnchor,
        ];
        for bucket in RatioBucket::ALL {
            for region in regions {
                let f = fractions(region, bucket);
                assert!(f.left + f.width <= 1.0 + f32::EPSILON);
                assert!(f.top + f.height <= 1.0 + f32::EPSILON);
            }
        }
    }

    #[test]
    fn test_vs_anchor_carries_margin() {
        assert!(fractions(Region::VsAnchor, RatioBucket::R16x9).margin.is_some());
        assert!(fractions(Region::Round, RatioBucket::R16x9).margin.is_none());
    }
}
