//! Frame orchestrator: client geometry tracking, task scheduling, and the
//! in-game state machine.

use anyhow::Result;
use image::RgbaImage;
use std::sync::Arc;

use crate::db::Database;
use crate::regions::RatioBucket;
use crate::tasks::{
    CardPlayedTask, GameOverTask, GameStartTask, RecognitionTask, RoundTask,
};
use tcgwatch_core::{EventCollector, EventSink, GameEvent, Side};

/// Drives the recognition tasks over a stream of captured frames.
///
/// Outside a game only the start task runs; once the start banner is
/// confirmed the in-game tasks take over until the game-over banner is. Task
/// errors are logged and dropped; a bad tick never stops the stream.
pub struct Watcher {
    db: Arc<Database>,
    start_task: GameStartTask,
    tasks: Vec<Box<dyn RecognitionTask>>,
    client: Option<(u32, u32, RatioBucket)>,
    in_game: bool,
    frame_count: u64,
}

impl Watcher {
    /// Watcher with the standard in-game task set: game over, both played
    /// slots, and the round counter.
    pub fn new(db: Arc<Database>) -> Result<Self> {
        let tasks: Vec<Box<dyn RecognitionTask>> = vec![
            Box::new(GameOverTask::new(Arc::clone(&db))),
            Box::new(CardPlayedTask::new(Arc::clone(&db), Side::Mine)),
            Box::new(CardPlayedTask::new(Arc::clone(&db), Side::Opponent)),
            Box::new(RoundTask::new(Arc::clone(&db))),
        ];
        Self::with_tasks(db, tasks)
    }

    pub fn with_tasks(db: Arc<Database>, tasks: Vec<Box<dyn RecognitionTask>>) -> Result<Self> {
        let start_task = GameStartTask::new(&db)?;
        Ok(Self {
            db,
            start_task,
            tasks,
            client: None,
            in_game: false,
            frame_count: 0,
        })
    }

    pub fn database(&self) -> &Arc<Database> {
        &self.db
    }

    pub fn in_game(&self) -> bool {
        self.in_game
    }

    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Add an in-game task beyond the standard set.
    pub fn push_task(&mut self, task: Box<dyn RecognitionTask>) {
        self.tasks.push(task);
    }

    fn handle_resize(&mut self, width: u32, height: u32) {
        let bucket = RatioBucket::from_client(width, height);
        log::info!("Client resized to {}x{} ({:?})", width, height, bucket);
        self.start_task.on_resize(bucket, width, height);
        for task in &mut self.tasks {
            task.on_resize(bucket, width, height);
        }
        self.client = Some((width, height, bucket));
    }

    fn reset_tasks(&mut self) {
        self.start_task.reset();
        for task in &mut self.tasks {
            task.reset();
        }
    }

    /// Process one captured frame, forwarding confirmed events to `sink`.
    pub fn on_frame(&mut self, frame: &RgbaImage, sink: &mut dyn EventSink) -> Result<()> {
        let (width, height) = frame.dimensions();
        if width == 0 || height == 0 {
            // Minimized or mid-resize capture.
            return Ok(());
        }
        self.frame_count += 1;

        match self.client {
            Some((w, h, _)) if (w, h) == (width, height) => {}
            _ => self.handle_resize(width, height),
        }

        let mut collector = EventCollector::new();
        if self.in_game {
            for task in &mut self.tasks {
                if let Err(err) = task.tick(frame, &mut collector) {
                    log::warn!("Task {} failed on frame {}: {:#}", task.name(), self.frame_count, err);
                }
            }
        } else if let Err(err) = self.start_task.tick(frame, &mut collector) {
            log::warn!(
                "Task {} failed on frame {}: {:#}",
                self.start_task.name(),
                self.frame_count,
                err
            );
        }

        for event in collector.drain() {
            match event {
                GameEvent::GameStart => {
                    self.in_game = true;
                    self.reset_tasks();
                }
                GameEvent::GameOver => {
                    self.in_game = false;
                    self.reset_tasks();
                }
                _ => {}
            }
            sink.emit(event);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hash::ImageHash;
    use crate::index::FeatureIndexBuilder;
    use tcgwatch_core::catalog::Catalog;

    fn bits64(value: u64) -> ImageHash {
        let bits: Vec<bool> = (0..64).map(|i| value >> i & 1 == 1).collect();
        ImageHash::from_bits(&bits)
    }

    fn stub_database() -> Arc<Database> {
        let mut indices = Vec::new();
        for kind_i in 0..6u64 {
            let mut builder = FeatureIndexBuilder::new(64);
            builder.add(bits64(kind_i + 1)).unwrap();
            builder.add(bits64((kind_i + 1) << 32)).unwrap();
            indices.push(builder.build());
        }
        Arc::new(Database::from_parts(Catalog::default(), indices))
    }

    #[test]
    fn test_zero_size_frame_skipped() {
        let mut watcher = Watcher::new(stub_database()).unwrap();
        let mut sink = EventCollector::new();
        watcher.on_frame(&RgbaImage::new(0, 0), &mut sink).unwrap();
        assert_eq!(watcher.frame_count(), 0);
        assert!(sink.events.is_empty());
    }

    #[test]
    fn test_resize_tracked_once_per_dimension_change() {
        let mut watcher = Watcher::new(stub_database()).unwrap();
        let mut sink = EventCollector::new();
        let frame = RgbaImage::new(1920, 1080);
        watcher.on_frame(&frame, &mut sink).unwrap();
        assert_eq!(watcher.client, Some((1920, 1080, RatioBucket::R16x9)));
        watcher.on_frame(&frame, &mut sink).unwrap();
        assert_eq!(watcher.frame_count(), 2);

        let wide = RgbaImage::new(2560, 1080);
        watcher.on_frame(&wide, &mut sink).unwrap();
        assert_eq!(watcher.client, Some((2560, 1080, RatioBucket::R64x27)));
    }

    #[test]
    fn test_starts_outside_game() {
        let watcher = Watcher::new(stub_database()).unwrap();
        assert!(!watcher.in_game());
    }
}
