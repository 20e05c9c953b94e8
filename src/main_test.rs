use std::sync::Arc;
use std::time::Instant;

use sketchboard::camera::Point;
use sketchboard::collab::{FixedImageLoader, MemoryClipboard, MemoryStore};
use sketchboard::element::Size;
use sketchboard::engine::EngineCore;
use sketchboard::input::{Event, Tool};
use sketchboard::session::Session;

use super::replay_event;

const REPLAY_PX: f64 = 64.0;

fn session() -> (Session<MemoryStore, MemoryClipboard, FixedImageLoader>, Instant) {
    let now = Instant::now();
    let images = FixedImageLoader { width: REPLAY_PX, height: REPLAY_PX };
    let mut session = Session::new(EngineCore::new(), Arc::new(MemoryStore::new()), MemoryClipboard::default(), images);
    session.start(now).unwrap();
    (session, now)
}

#[test]
fn replayed_image_selection_is_placed() {
    let (mut session, now) = session();
    replay_event(&mut session, Event::ImageSelected { bytes: 12 }, now).unwrap();
    assert_eq!(session.engine.tool, Tool::Image);
    assert!(session.take_notifications().is_empty());

    let at = Point::new(10.0, 10.0);
    replay_event(&mut session, Event::DrawStart { pointer: at }, now).unwrap();
    replay_event(&mut session, Event::DrawEnd { pointer: at }, now).unwrap();
    let placed: Vec<Size> = session.engine.elements().map(|e| e.size).collect();
    assert_eq!(placed, vec![Size::new(REPLAY_PX, REPLAY_PX)]);
}

#[test]
fn other_events_pass_straight_through() {
    let (mut session, now) = session();
    replay_event(&mut session, Event::ChangeTool { tool: Tool::Ellipse }, now).unwrap();
    assert_eq!(session.engine.tool, Tool::Ellipse);
}
