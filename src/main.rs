//! Replay frontend: runs the recognition pipeline over a directory of
//! captured frames and prints each confirmed game event as a JSON line.

use anyhow::{bail, Context, Result};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tcgwatch_core::{EventCollector, GameEvent};
use tcgwatch_cv::{Database, Watcher};

fn frame_paths(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut paths: Vec<PathBuf> = std::fs::read_dir(dir)
        .with_context(|| format!("Failed to read frames directory {:?}", dir))?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| {
            matches!(
                path.extension().and_then(|e| e.to_str()),
                Some("png") | Some("jpg") | Some("jpeg") | Some("bmp")
            )
        })
        .collect();
    paths.sort();
    Ok(paths)
}

fn print_events(events: Vec<GameEvent>) -> Result<()> {
    for event in events {
        println!("{}", serde_json::to_string(&event)?);
    }
    Ok(())
}

fn run(db_dir: &Path, frames_dir: &Path) -> Result<()> {
    let db = Arc::new(Database::load(db_dir)?);
    let mut watcher = Watcher::new(db)?;
    let mut sink = EventCollector::new();

    let paths = frame_paths(frames_dir)?;
    if paths.is_empty() {
        bail!("No frames found in {:?}", frames_dir);
    }

    for path in paths {
        let frame = image::open(&path)
            .with_context(|| format!("Failed to load frame {:?}", path))?
            .to_rgba8();
        watcher.on_frame(&frame, &mut sink)?;
        print_events(sink.drain())?;
    }
    log::info!("Processed {} frames", watcher.frame_count());
    Ok(())
}

fn main() {
    env_logger::init();

    let args: Vec<String> = std::env::args().collect();
    if args.len() != 3 {
        eprintln!("Usage: {} <database-dir> <frames-dir>", args[0]);
        std::process::exit(2);
    }

    match run(Path::new(&args[1]), Path::new(&args[2])) {
        Ok(()) => {}
        Err(e) => {
            eprintln!("Replay failed: {:#}", e);
            std::process::exit(1);
        }
    }
}
