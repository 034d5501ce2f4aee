//! Static reference database of every known card, character and control.
//!
//! Built once offline, persisted as a single JSON document, loaded read-only
//! at startup and shared by every recognition task. A missing or invalid
//! catalog is fatal to startup; nothing in the live pipeline mutates it.

pub mod cards;
pub mod lang;

pub use cards::{ActionCard, ActionCardKind, Character, Cost, CostElement, Element};
pub use lang::{Language, LocalizedName};

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// File name of the persisted catalog document inside a database directory.
pub const CATALOG_FILE: &str = "catalog.json";

/// The full card catalog.
///
/// `actions` and `characters` are dense id → entry tables. `extras` maps
/// extra feature ids (tokens seen in hand, talent split views, arcane-legend
/// half-covered views) appended after the action table back to their
/// canonical action id.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Catalog {
    pub actions: Vec<ActionCard>,
    pub characters: Vec<Character>,
    pub extras: Vec<u32>,
    pub talent_to_character: BTreeMap<u32, u32>,
    /// Deck share-code id → signed internal id; positive = action id + 1,
    /// negative = -(character id + 1), zero = unused slot.
    pub share_to_internal: Vec<i32>,
    /// Artifact action id → display ordering used by deck views.
    pub artifacts_order: BTreeMap<u32, u32>,
}

impl Catalog {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read catalog: {:?}", path.as_ref()))?;
        let catalog: Catalog = serde_json::from_str(&text)
            .with_context(|| format!("Failed to parse catalog: {:?}", path.as_ref()))?;
        catalog.validate()?;
        Ok(catalog)
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let text = serde_json::to_string(self).context("Failed to serialize catalog")?;
        fs::write(&path, text)
            .with_context(|| format!("Failed to write catalog: {:?}", path.as_ref()))?;
        Ok(())
    }

    /// Check internal consistency. Run after every load and build.
    pub fn validate(&self) -> Result<()> {
        for (id, action) in self.actions.iter().enumerate() {
            if !action.name.is_complete() {
                bail!("Action card {} is missing a localized name", id);
            }
        }
        for (id, character) in self.characters.iter().enumerate() {
            if !character.name.is_complete() || !character.short_name.is_complete() {
                bail!("Character {} is missing a localized name", id);
            }
        }
        for (extra_id, &mapped) in self.extras.iter().enumerate() {
            if mapped as usize >= self.actions.len() {
                bail!(
                    "Extra {} maps to unknown action id {}",
                    extra_id,
                    mapped
                );
            }
        }
        for (&talent, &character) in &self.talent_to_character {
            if talent as usize >= self.actions.len() {
                bail!("Talent id {} out of range", talent);
            }
            if character as usize >= self.characters.len() {
                bail!("Talent {} maps to unknown character {}", talent, character);
            }
        }
        Ok(())
    }

    pub fn num_actions(&self) -> usize {
        self.actions.len()
    }

    /// Resolve a raw index-space id to its canonical action id.
    ///
    /// Ids at or beyond the action table alias through `extras`.
    pub fn canonical_action(&self, raw_id: usize) -> Option<usize> {
        if raw_id < self.actions.len() {
            Some(raw_id)
        } else {
            self.extras
                .get(raw_id - self.actions.len())
                .map(|&id| id as usize)
        }
    }

    /// Display name of an action card; the -1 sentinel reads as "None".
    pub fn action_name(&self, card_id: i32, lang: Language) -> &str {
        if card_id < 0 {
            return "None";
        }
        match self
            .canonical_action(card_id as usize)
            .and_then(|id| self.actions.get(id))
        {
            Some(action) => action.name.get(lang),
            None => "None",
        }
    }

    pub fn character_for_talent(&self, talent_id: u32) -> Option<usize> {
        self.talent_to_character.get(&talent_id).map(|&id| id as usize)
    }
}
