//! Recognition database: the card catalog plus one persisted feature index
//! per category.
//!
//! Everything here is loaded once at startup and shared read-only across the
//! recognition tasks. A missing file is fatal; the pipeline cannot run
//! without its reference features.

pub mod builder;

pub use builder::DatabaseBuilder;

use anyhow::{Context, Result};
use std::path::Path;

use crate::classify::Match;
use crate::hash::ImageHash;
use crate::index::FeatureIndex;
use tcgwatch_core::catalog::{Catalog, CATALOG_FILE};

/// How many nearest neighbors a query requests. Only the head is inspected,
/// the margin absorbs near-ties.
pub const SEARCH_MARGIN: usize = 20;

/// The feature index categories a database carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexKind {
    Controls,
    Digits,
    ActionsA,
    ActionsD,
    CharactersA,
    CharactersD,
}

impl IndexKind {
    pub const ALL: [IndexKind; 6] = [
        IndexKind::Controls,
        IndexKind::Digits,
        IndexKind::ActionsA,
        IndexKind::ActionsD,
        IndexKind::CharactersA,
        IndexKind::CharactersD,
    ];

    pub fn file_name(&self) -> &'static str {
        match self {
            IndexKind::Controls => "controls.idx",
            IndexKind::Digits => "digits.idx",
            IndexKind::ActionsA => "actions_a.idx",
            IndexKind::ActionsD => "actions_d.idx",
            IndexKind::CharactersA => "characters_a.idx",
            IndexKind::CharactersD => "characters_d.idx",
        }
    }
}

/// Fixed ids inside the controls index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlKind {
    GameStart = 0,
    GameOver = 1,
}

impl ControlKind {
    pub fn id(&self) -> usize {
        *self as usize
    }
}

/// The loaded recognition database.
#[derive(Debug, Clone)]
pub struct Database {
    catalog: Catalog,
    indices: Vec<FeatureIndex>,
}

impl Database {
    pub(crate) fn from_parts(catalog: Catalog, indices: Vec<FeatureIndex>) -> Self {
        debug_assert_eq!(indices.len(), IndexKind::ALL.len());
        Self { catalog, indices }
    }

    /// Load the catalog and every index from a database directory.
    pub fn load<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let dir = dir.as_ref();
        let catalog = Catalog::load(dir.join(CATALOG_FILE))
            .with_context(|| format!("Failed to load catalog from {:?}", dir))?;
        let mut indices = Vec::with_capacity(IndexKind::ALL.len());
        for kind in IndexKind::ALL {
            let index = FeatureIndex::load(dir.join(kind.file_name()))
                .with_context(|| format!("Failed to load {} from {:?}", kind.file_name(), dir))?;
            indices.push(index);
        }
        Ok(Self::from_parts(catalog, indices))
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn index(&self, kind: IndexKind) -> &FeatureIndex {
        &self.indices[kind as usize]
    }

    /// Nearest neighbors of `hash` in one category, closest first.
    pub fn search(&self, hash: &ImageHash, kind: IndexKind) -> Result<Vec<(usize, u32)>> {
        let results = self
            .index(kind)
            .query(hash, SEARCH_MARGIN)
            .with_context(|| format!("Query against {} failed", kind.file_name()))?;
        Ok(results)
    }

    /// The single best candidate in one category as a classifier input.
    pub fn best(&self, hash: &ImageHash, kind: IndexKind) -> Result<Match> {
        let results = self.search(hash, kind)?;
        Ok(match results.first() {
            Some(&(id, dist)) => Match::new(id as i32, dist),
            None => Match::none(u32::MAX),
        })
    }

    /// The stored reference hash for a control.
    pub fn control_hash(&self, control: ControlKind) -> Option<ImageHash> {
        self.index(IndexKind::Controls).entry(control.id())
    }
}
