//! Replay a recorded event stream against a file-backed session and print
//! the resulting elements as JSON.
//!
//! ```text
//! RUST_LOG=sketchboard=debug sketchboard events.json
//! ```
//!
//! Recordings carry only the byte length of a selected image, so an
//! `image_selected` event is replayed with a zero-filled blob of that length.

#[cfg(test)]
#[path = "main_test.rs"]
mod main_test;

use std::process::ExitCode;
use std::sync::Arc;
use std::time::Instant;

use sketchboard::collab::{Clipboard, FixedImageLoader, ImageLoader, MemoryClipboard, PersistenceStore};
use sketchboard::config::SessionConfig;
use sketchboard::element::Element;
use sketchboard::engine::EngineCore;
use sketchboard::error::{ConfigError, EngineError};
use sketchboard::input::Event;
use sketchboard::persistence::FileStore;
use sketchboard::session::Session;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

/// Size reported for every replayed image blob.
const REPLAY_IMAGE_PX: f64 = 256.0;

#[derive(Debug, thiserror::Error)]
enum ReplayError {
    #[error("usage: sketchboard <events.json>")]
    Usage,
    #[error("could not read {path}: {source}")]
    Read { path: String, source: std::io::Error },
    #[error("invalid event stream: {0}")]
    Parse(#[from] serde_json::Error),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Engine(#[from] EngineError),
    #[error("persistence writer failed: {0}")]
    Writer(#[from] tokio::task::JoinError),
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt().with_env_filter(EnvFilter::from_default_env()).init();

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "replay failed");
            eprintln!("{e}");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<(), ReplayError> {
    let path = std::env::args().nth(1).ok_or(ReplayError::Usage)?;
    let raw = tokio::fs::read_to_string(&path)
        .await
        .map_err(|source| ReplayError::Read { path: path.clone(), source })?;
    let events: Vec<Event> = serde_json::from_str(&raw)?;

    let config = SessionConfig::from_env()?;
    let store = Arc::new(FileStore::new(config.state_path.clone()));
    let engine = EngineCore::with_config(config);
    let images = FixedImageLoader { width: REPLAY_IMAGE_PX, height: REPLAY_IMAGE_PX };
    let mut session = Session::new(engine, store, MemoryClipboard::default(), images);
    let writer = session.spawn_writer();
    session.start(Instant::now())?;

    let mut rejected = 0usize;
    for event in events {
        if let Err(e) = replay_event(&mut session, event, Instant::now()) {
            warn!(error = %e, "event failed");
            rejected += 1;
        }
    }
    for note in session.take_notifications() {
        warn!(%note, "notification");
    }

    let elements: Vec<&Element> = session.engine.elements().collect();
    println!("{}", serde_json::to_string_pretty(&elements)?);
    info!(elements = elements.len(), rejected, "replay finished");

    drop(session);
    writer.await?;
    Ok(())
}

/// Feed one recorded event to `session`, standing in a blob for image selections.
fn replay_event<S, C, I>(session: &mut Session<S, C, I>, event: Event, now: Instant) -> Result<(), EngineError>
where
    S: PersistenceStore + Send + Sync + 'static,
    C: Clipboard,
    I: ImageLoader,
{
    match event {
        Event::ImageSelected { bytes } => session.select_image(vec![0; bytes], now),
        other => session.dispatch(other, now),
    }
}
