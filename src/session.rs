//! Session: the engine wired to its collaborators.
//!
//! SYSTEM CONTEXT
//! ==============
//! [`EngineCore`] only describes work as [`Action`]s. A [`Session`] carries
//! that work out: it answers `Request`s by calling the persistence store,
//! the clipboard or the image loader and feeds the completion back as the
//! next event, schedules `Persist` snapshots on a debounced writer, and
//! collects notifications. Everything runs on the caller's thread except the
//! optional tokio writer task.

#[cfg(test)]
#[path = "session_test.rs"]
mod session_test;

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Instant;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::collab::{Clipboard, ImageLoader, PersistenceStore};
use crate::consts::LOAD_RETRY_LIMIT;
use crate::engine::{Action, EngineCore, ExternalCall};
use crate::error::EngineError;
use crate::input::{Event, MachineState};
use crate::persistence::{Debouncer, PersistedContext, spawn_persistence_task, write_snapshot};

/// Where `Persist` snapshots go.
enum Writer {
    /// Polled with [`Session::tick`].
    Debounced(Debouncer),
    /// Fed to a tokio task that debounces on its own.
    Channel(mpsc::UnboundedSender<PersistedContext>),
}

pub struct Session<S, C, I> {
    pub engine: EngineCore,
    store: Arc<S>,
    clipboard: C,
    images: I,
    writer: Writer,
    /// Blob announced by the last `select_image`, consumed by the decode.
    image_bytes: Option<Vec<u8>>,
    notifications: Vec<String>,
    renders: usize,
}

impl<S, C, I> Session<S, C, I>
where
    S: PersistenceStore + Send + Sync + 'static,
    C: Clipboard,
    I: ImageLoader,
{
    #[must_use]
    pub fn new(engine: EngineCore, store: Arc<S>, clipboard: C, images: I) -> Self {
        let writer = Writer::Debounced(Debouncer::new(engine.config.persist_debounce));
        Self { engine, store, clipboard, images, writer, image_bytes: None, notifications: Vec::new(), renders: 0 }
    }

    /// Load the persisted context and settle in idle.
    ///
    /// # Errors
    ///
    /// Propagates engine errors raised while applying the load.
    pub fn start(&mut self, now: Instant) -> Result<(), EngineError> {
        self.run(vec![Action::Request(ExternalCall::LoadState)], now)
    }

    /// Feed one event and carry out everything it asks for.
    ///
    /// # Errors
    ///
    /// The engine's error for this event or for any completion fed back.
    pub fn dispatch(&mut self, event: Event, now: Instant) -> Result<(), EngineError> {
        let actions = self.engine.handle(event)?;
        self.run(actions, now)
    }

    /// Offer an image blob for placement.
    ///
    /// # Errors
    ///
    /// See [`Session::dispatch`].
    pub fn select_image(&mut self, bytes: Vec<u8>, now: Instant) -> Result<(), EngineError> {
        let len = bytes.len();
        self.image_bytes = Some(bytes);
        let result = self.dispatch(Event::ImageSelected { bytes: len }, now);
        self.image_bytes = None;
        result
    }

    fn run(&mut self, actions: Vec<Action>, now: Instant) -> Result<(), EngineError> {
        let mut queue: VecDeque<Action> = actions.into();
        while let Some(action) = queue.pop_front() {
            match action {
                Action::RenderNeeded => self.renders += 1,
                Action::Persist(context) => self.persist(context, now),
                Action::Notify(message) => self.notifications.push(message),
                Action::Request(call) => {
                    let completion = self.execute(call);
                    queue.extend(self.engine.handle(completion)?);
                }
            }
        }
        Ok(())
    }

    /// Perform a collaborator call and phrase its outcome as an event.
    fn execute(&mut self, call: ExternalCall) -> Event {
        match call {
            ExternalCall::LoadState => match self.store.load() {
                Ok(context) => Event::Loaded { context },
                Err(e) => {
                    let attempts = match self.engine.state {
                        MachineState::Loading { attempts } => attempts,
                        _ => 0,
                    };
                    if attempts >= LOAD_RETRY_LIMIT {
                        warn!(error = %e, attempts, "giving up on persisted context; starting empty");
                        return Event::Loaded { context: None };
                    }
                    Event::LoadFailed { message: e.to_string() }
                }
            },
            ExternalCall::ReadClipboard => match self.clipboard.read_text() {
                Ok(text) => Event::ClipboardRead { text },
                Err(e) => Event::ExternalFailed { message: e.to_string() },
            },
            ExternalCall::WriteClipboard(text) => match self.clipboard.write_text(&text) {
                Ok(()) => Event::ClipboardWritten,
                Err(e) => Event::ExternalFailed { message: e.to_string() },
            },
            ExternalCall::DecodeImage { file_id } => {
                let Some(bytes) = self.image_bytes.take() else {
                    return Event::ExternalFailed { message: "no image blob to decode".into() };
                };
                match self.images.decode(&bytes) {
                    Ok(image) => Event::ImageDecoded { file_id, width: image.width, height: image.height },
                    Err(e) => Event::ExternalFailed { message: e.to_string() },
                }
            }
        }
    }

    fn persist(&mut self, context: PersistedContext, now: Instant) {
        match &mut self.writer {
            Writer::Debounced(debouncer) => debouncer.schedule(context, now),
            Writer::Channel(tx) => {
                if tx.send(context).is_err() {
                    warn!("persistence task is gone; snapshot dropped");
                }
            }
        }
    }

    /// Write the pending snapshot once its debounce window has passed.
    pub fn tick(&mut self, now: Instant) {
        if let Writer::Debounced(debouncer) = &mut self.writer {
            if let Some(context) = debouncer.poll(now) {
                write_snapshot(self.store.as_ref(), &context);
            }
        }
    }

    /// Write the pending snapshot now.
    pub fn flush(&mut self) {
        if let Writer::Debounced(debouncer) = &mut self.writer {
            if let Some(context) = debouncer.flush() {
                write_snapshot(self.store.as_ref(), &context);
            }
        }
    }

    /// Move persistence onto a tokio task. Must run inside a runtime.
    ///
    /// The task ends, after a final write, once the session is dropped.
    pub fn spawn_writer(&mut self) -> JoinHandle<()> {
        let window = self.engine.config.persist_debounce;
        let (tx, handle) = spawn_persistence_task(Arc::clone(&self.store), window);
        if let Writer::Debounced(debouncer) = &mut self.writer {
            if let Some(context) = debouncer.flush() {
                if tx.send(context).is_err() {
                    warn!("persistence task is gone; snapshot dropped");
                }
            }
        }
        self.writer = Writer::Channel(tx);
        info!(window = ?window, "persistence writer task started");
        handle
    }

    /// Notifications raised since the last call.
    pub fn take_notifications(&mut self) -> Vec<String> {
        let taken = std::mem::take(&mut self.notifications);
        if !taken.is_empty() {
            debug!(count = taken.len(), "notifications drained");
        }
        taken
    }

    /// Render requests seen so far.
    #[must_use]
    pub fn render_count(&self) -> usize {
        self.renders
    }

    #[must_use]
    pub fn store(&self) -> &S {
        &self.store
    }

    #[must_use]
    pub fn clipboard(&self) -> &C {
        &self.clipboard
    }

    pub fn clipboard_mut(&mut self) -> &mut C {
        &mut self.clipboard
    }
}
