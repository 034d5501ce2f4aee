//! Dual-hash match fusion.
//!
//! The a-hash and d-hash nearest-neighbor results for the same region are
//! combined under two distance cutoffs: the strict threshold authorizes a
//! single-hash accept, the looser one requires both variants to agree.

use serde::{Deserialize, Serialize};
use tcgwatch_core::NO_MATCH;

/// Distance cutoffs for accepting a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Thresholds {
    /// Accept a single hash variant at or below this distance.
    pub strict: u32,
    /// Accept agreeing variants at or below this distance.
    pub loose: u32,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            strict: 5,
            loose: 20,
        }
    }
}

/// One candidate (or fused) classification: catalog id plus the Hamming
/// distance backing it. `id == NO_MATCH` means no sufficiently close entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Match {
    pub id: i32,
    pub distance: u32,
}

impl Match {
    pub fn new(id: i32, distance: u32) -> Self {
        Self { id, distance }
    }

    pub fn none(distance: u32) -> Self {
        Self {
            id: NO_MATCH,
            distance,
        }
    }

    pub fn is_match(&self) -> bool {
        self.id >= 0
    }
}

/// Fuse the best a-hash and d-hash candidates into one decision.
///
/// The d-hash is empirically the more discriminative variant, so it is
/// checked first; the asymmetric order changes outcomes on ambiguous frames
/// and must not be reordered.
pub fn classify(a: Match, d: Match, thresholds: Thresholds) -> Match {
    if d.distance <= thresholds.strict {
        d
    } else if a.distance <= thresholds.strict {
        a
    } else if a.id == d.id && a.distance <= thresholds.loose && d.distance <= thresholds.loose {
        Match::new(a.id, a.distance.min(d.distance))
    } else {
        Match::none(a.distance.max(d.distance))
    }
}
