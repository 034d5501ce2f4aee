//! Catalog entry types: action cards and characters.

use serde::{Deserialize, Serialize};

use super::lang::LocalizedName;

/// The seven playable elements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Element {
    Cryo,
    Hydro,
    Pyro,
    Electro,
    Anemo,
    Geo,
    Dendro,
}

/// What a card's cost is paid in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CostElement {
    Cryo,
    Hydro,
    Pyro,
    Electro,
    Anemo,
    Geo,
    Dendro,
    /// Any-element ("black") dice.
    Any,
}

/// Printed cost of an action card.
///
/// `combined` marks talent cards whose printed cost is the sum of the card
/// cost and the attack it triggers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cost {
    pub amount: u32,
    pub element: CostElement,
    #[serde(default)]
    pub combined: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActionCardKind {
    Event,
    Equipment,
    Support,
    Talent,
    ArcaneLegend,
}

/// One action-card catalog entry. Ids are dense and zero-based; the entry's id
/// is its position in `Catalog::actions`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionCard {
    pub name: LocalizedName,
    pub kind: ActionCardKind,
    pub cost: Cost,
}

/// One character catalog entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Character {
    pub name: LocalizedName,
    pub short_name: LocalizedName,
    pub element: Element,
    pub is_monster: bool,
}
