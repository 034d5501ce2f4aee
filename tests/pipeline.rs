//! End-to-end pipeline tests: build a database from synthetic captures, then
//! replay synthetic frames through the watcher and check the emitted events.
//!
//! The client size is 3000x1686: inside the 16:9 tolerance, and chosen so the
//! played-card regions resolve to exactly the 420x720 reference card size.
//! Pasting reference art at the resolved region therefore reproduces the
//! training pixels bit for bit, and every intended match lands at Hamming
//! distance zero while the flat background stays far from everything.

use image::{imageops, Rgba, RgbaImage};
use std::sync::Arc;

use tcgwatch_core::catalog::{ActionCard, ActionCardKind, Cost, CostElement, LocalizedName};
use tcgwatch_core::{EventCollector, GameEvent, Side};
use tcgwatch_cv::tasks::{CardLocator, CardSelectTask, RecognitionTask};
use tcgwatch_cv::{
    resolve, ControlKind, CropBox, Database, DatabaseBuilder, RatioBucket, Region, Watcher,
};

const CLIENT_W: u32 = 3000;
const CLIENT_H: u32 = 1686;
const BUCKET: RatioBucket = RatioBucket::R16x9;

fn textured(width: u32, height: u32, seed: u32) -> RgbaImage {
    let mut state = seed | 1;
    RgbaImage::from_fn(width, height, |_, _| {
        state = state.wrapping_mul(1664525).wrapping_add(1013904223);
        let v = (state >> 24) as u8;
        Rgba([v, v ^ 0x5A, v.rotate_left(3), 255])
    })
}

fn blank_client() -> RgbaImage {
    RgbaImage::from_pixel(CLIENT_W, CLIENT_H, Rgba([128, 128, 128, 255]))
}

fn paste(frame: &mut RgbaImage, patch: &RgbaImage, at: CropBox) {
    assert_eq!(patch.dimensions(), (at.width(), at.height()));
    imageops::replace(frame, patch, i64::from(at.left), i64::from(at.top));
}

fn crop(frame: &RgbaImage, at: CropBox) -> RgbaImage {
    imageops::crop_imm(frame, at.left, at.top, at.width(), at.height()).to_image()
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

/// Lobby frame and in-game frame plus the database trained on their crops.
struct Scenario {
    db: Arc<Database>,
    lobby: RgbaImage,
    in_game: RgbaImage,
}

fn build_scenario(dir: &std::path::Path) -> Scenario {
    let card = textured(420, 720, 7);

    let mut lobby = blank_client();
    let start_box = resolve(Region::GameStart, BUCKET, CLIENT_W, CLIENT_H);
    paste(
        &mut lobby,
        &textured(start_box.width(), start_box.height(), 11),
        start_box,
    );

    let mut in_game = blank_client();
    let my_box = resolve(Region::MyPlayed, BUCKET, CLIENT_W, CLIENT_H);
    let op_box = resolve(Region::OpPlayed, BUCKET, CLIENT_W, CLIENT_H);
    assert_eq!((my_box.width(), my_box.height()), (420, 720));
    assert_eq!((op_box.width(), op_box.height()), (420, 720));
    paste(&mut in_game, &card, my_box);
    paste(&mut in_game, &card, op_box);
    let over_box = resolve(Region::GameOver, BUCKET, CLIENT_W, CLIENT_H);
    paste(
        &mut in_game,
        &textured(over_box.width(), over_box.height(), 13),
        over_box,
    );
    let round_box = resolve(Region::Round, BUCKET, CLIENT_W, CLIENT_H);
    paste(
        &mut in_game,
        &textured(round_box.width(), round_box.height(), 17),
        round_box,
    );

    let mut builder = DatabaseBuilder::new();
    builder
        .add_control(ControlKind::GameStart, &crop(&lobby, start_box))
        .unwrap();
    builder
        .add_control(ControlKind::GameOver, &crop(&in_game, over_box))
        .unwrap();
    builder.add_digit(&crop(&in_game, round_box)).unwrap();
    let card_id = builder.add_action(event_card("Strategize"), &card).unwrap();
    assert_eq!(card_id, 0);
    let db = Arc::new(builder.finish(dir).unwrap());

    Scenario { db, lobby, in_game }
}

#[test]
fn test_full_game_event_sequence() {
    let dir = tempfile::tempdir().unwrap();
    let scenario = build_scenario(dir.path());

    let mut watcher = Watcher::new(Arc::clone(&scenario.db)).unwrap();
    let mut sink = EventCollector::new();

    // Start banner needs a window majority of three.
    for _ in 0..3 {
        watcher.on_frame(&scenario.lobby, &mut sink).unwrap();
    }
    assert_eq!(sink.drain(), vec![GameEvent::GameStart]);
    assert!(watcher.in_game());

    for _ in 0..3 {
        watcher.on_frame(&scenario.in_game, &mut sink).unwrap();
    }
    let events = sink.drain();
    assert_eq!(events.len(), 4);
    assert!(events.contains(&GameEvent::GameOver));
    assert!(events.contains(&GameEvent::RoundChanged { round: 1 }));
    assert!(events.contains(&GameEvent::CardPlayed {
        side: Side::Mine,
        card_id: 0,
        name: "Strategize".to_string(),
    }));
    assert!(events.contains(&GameEvent::CardPlayed {
        side: Side::Opponent,
        card_id: 0,
        name: "Strategize".to_string(),
    }));
    assert!(!watcher.in_game());
}

#[test]
fn test_no_card_events_without_cards() {
    let dir = tempfile::tempdir().unwrap();
    let scenario = build_scenario(dir.path());

    let mut watcher = Watcher::new(Arc::clone(&scenario.db)).unwrap();
    let mut sink = EventCollector::new();

    for _ in 0..3 {
        watcher.on_frame(&scenario.lobby, &mut sink).unwrap();
    }
    sink.drain();

    // Same end-of-game frame, but both played slots are empty. A flat slot
    // hashes far from every stored card, so only the banner tasks fire.
    let mut quiet = scenario.in_game.clone();
    for region in [Region::MyPlayed, Region::OpPlayed] {
        let slot = resolve(region, BUCKET, CLIENT_W, CLIENT_H);
        paste(
            &mut quiet,
            &RgbaImage::from_pixel(slot.width(), slot.height(), Rgba([128, 128, 128, 255])),
            slot,
        );
    }

    for _ in 0..3 {
        watcher.on_frame(&quiet, &mut sink).unwrap();
    }
    let events = sink.drain();
    assert_eq!(events.len(), 2);
    assert!(events.contains(&GameEvent::GameOver));
    assert!(events.contains(&GameEvent::RoundChanged { round: 1 }));
    assert!(!watcher.in_game());
}

#[test]
fn test_database_reloads_from_disk() {
    let dir = tempfile::tempdir().unwrap();
    let scenario = build_scenario(dir.path());

    let reloaded = Arc::new(Database::load(dir.path()).unwrap());
    assert_eq!(scenario.db.catalog(), reloaded.catalog());

    let mut watcher = Watcher::new(reloaded).unwrap();
    let mut sink = EventCollector::new();
    for _ in 0..3 {
        watcher.on_frame(&scenario.lobby, &mut sink).unwrap();
    }
    assert_eq!(sink.drain(), vec![GameEvent::GameStart]);
}

struct FixedSlots(Vec<CropBox>);

impl CardLocator for FixedSlots {
    fn locate(&mut self, _frame: &RgbaImage) -> anyhow::Result<Vec<CropBox>> {
        Ok(self.0.clone())
    }
}

fn build_select_scenario(dir: &std::path::Path) -> (Arc<Database>, RgbaImage, Vec<CropBox>) {
    let card0 = textured(420, 720, 21);
    let card1 = textured(420, 720, 23);

    let slots = vec![CropBox::new(100, 100, 520, 820), CropBox::new(600, 100, 1020, 820)];
    let mut frame = blank_client();
    paste(&mut frame, &card0, slots[0]);
    paste(&mut frame, &card1, slots[1]);

    let mut builder = DatabaseBuilder::new();
    builder
        .add_control(ControlKind::GameStart, &textured(314, 187, 11))
        .unwrap();
    builder
        .add_control(ControlKind::GameOver, &textured(350, 200, 13))
        .unwrap();
    builder.add_digit(&textured(360, 52, 17)).unwrap();
    builder.add_action(event_card("First"), &card0).unwrap();
    builder.add_action(event_card("Second"), &card1).unwrap();
    let db = Arc::new(builder.finish(dir).unwrap());
    (db, frame, slots)
}

#[test]
fn test_card_select_reports_drawn_cards() {
    let dir = tempfile::tempdir().unwrap();
    let (db, frame, slots) = build_select_scenario(dir.path());

    let mut task = CardSelectTask::new(db, Box::new(FixedSlots(slots)), 2, &[]);
    let mut sink = EventCollector::new();
    // Long window: six samples before the first decision.
    for _ in 0..6 {
        task.tick(&frame, &mut sink).unwrap();
    }
    task.flush(&mut sink);

    let events = sink.drain();
    assert_eq!(events.len(), 1);
    assert_eq!(
        events[0],
        GameEvent::CardsDrawn {
            cards: vec![0, 1],
            names: vec!["First".to_string(), "Second".to_string()],
        }
    );
}

#[test]
fn test_card_select_reports_created_deck_cards() {
    let dir = tempfile::tempdir().unwrap();
    let (db, frame, slots) = build_select_scenario(dir.path());

    // Previously held one extra copy of card 1; it is gone from the overlay.
    let mut task = CardSelectTask::new(db, Box::new(FixedSlots(slots)), 2, &[0, 1, 1]);
    let mut sink = EventCollector::new();
    for _ in 0..6 {
        task.tick(&frame, &mut sink).unwrap();
    }
    task.flush(&mut sink);

    let events = sink.drain();
    assert_eq!(events.len(), 1);
    assert_eq!(
        events[0],
        GameEvent::DeckCardsCreated {
            cards: vec![1],
            names: vec!["Second".to_string()],
        }
    );
}
