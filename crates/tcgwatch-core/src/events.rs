//! Typed game events and the sink seam the recognition tasks emit through.
//!
//! Events surface only on a debounce stable-state transition, never per tick.

use serde::{Deserialize, Serialize};

/// Which player a card event belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    Mine,
    Opponent,
}

/// A confirmed discrete game event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GameEvent {
    GameStart,
    GameOver,
    CardPlayed {
        side: Side,
        card_id: u32,
        name: String,
    },
    CardsDrawn {
        cards: Vec<u32>,
        names: Vec<String>,
    },
    DeckCardsCreated {
        cards: Vec<u32>,
        names: Vec<String>,
    },
    RoundChanged {
        round: u32,
    },
}

/// Where recognition tasks deliver confirmed events.
pub trait EventSink {
    fn emit(&mut self, event: GameEvent);
}

/// Simple sink that keeps every emitted event in order. Used by the demo
/// binary and by tests.
#[derive(Debug, Default)]
pub struct EventCollector {
    pub events: Vec<GameEvent>,
}

impl EventCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn drain(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }
}

impl EventSink for EventCollector {
    fn emit(&mut self, event: GameEvent) {
        self.events.push(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_serializes_with_type_tag() {
        let event = GameEvent::CardPlayed {
            side: Side::Mine,
            card_id: 42,
            name: "Strategize".to_string(),
        };
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("\"type\":\"card_played\""));
        assert!(json.contains("\"card_id\":42"));
    }

    #[test]
    fn test_collector_drains_in_order() {
        let mut sink = EventCollector::new();
        sink.emit(GameEvent::GameStart);
        sink.emit(GameEvent::RoundChanged { round: 1 });
        let events = sink.drain();
        assert_eq!(events[0], GameEvent::GameStart);
        assert_eq!(events.len(), 2);
        assert!(sink.events.is_empty());
    }
}
