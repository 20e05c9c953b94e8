//! Persistence: the persisted subset of the session and debounced writes.
//!
//! DESIGN
//! ======
//! The state machine emits a [`PersistedContext`] after every settled
//! transition. Writes are coalesced: a burst of commits inside the debounce
//! window produces one write carrying the latest snapshot. Two flavours share
//! that rule: [`Debouncer`] is polled by a synchronous host, and
//! [`spawn_persistence_task`] runs the same coalescing on a tokio task fed by
//! a channel. Write failures are logged and swallowed.

#[cfg(test)]
#[path = "persistence_test.rs"]
mod persistence_test;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error};

use crate::camera::Point;
use crate::collab::PersistenceStore;
use crate::element::{Element, ElementOptions};
use crate::error::StoreError;
use crate::input::Tool;

/// Pan/zoom state that survives a reload. Device pixel ratio does not.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PersistedViewport {
    pub zoom: f64,
    pub origin: Point,
}

impl Default for PersistedViewport {
    fn default() -> Self {
        Self { zoom: 1.0, origin: Point::default() }
    }
}

/// What survives a reload: elements, style defaults, tool state and viewport.
///
/// History, the image cache and in-flight files are deliberately absent.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PersistedContext {
    pub elements: Vec<Element>,
    pub element_options: ElementOptions,
    pub tool: Tool,
    pub tool_fixed: bool,
    pub viewport: PersistedViewport,
}

// =============================================================================
// SYNCHRONOUS DEBOUNCER
// =============================================================================

/// Coalesces snapshots until the window has been quiet for `window`.
#[derive(Debug)]
pub struct Debouncer {
    window: Duration,
    pending: Option<PersistedContext>,
    deadline: Option<Instant>,
}

impl Debouncer {
    #[must_use]
    pub fn new(window: Duration) -> Self {
        Self { window, pending: None, deadline: None }
    }

    /// Replace the pending snapshot and push the deadline out.
    pub fn schedule(&mut self, context: PersistedContext, now: Instant) {
        self.pending = Some(context);
        self.deadline = Some(now + self.window);
    }

    /// The pending snapshot, once its deadline has passed.
    pub fn poll(&mut self, now: Instant) -> Option<PersistedContext> {
        match self.deadline {
            Some(deadline) if now >= deadline => self.flush(),
            _ => None,
        }
    }

    /// The pending snapshot regardless of the deadline.
    pub fn flush(&mut self) -> Option<PersistedContext> {
        self.deadline = None;
        self.pending.take()
    }

    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }
}

/// Save a snapshot, logging instead of propagating failures.
pub fn write_snapshot(store: &dyn PersistenceStore, context: &PersistedContext) {
    match store.save(context) {
        Ok(()) => debug!(elements = context.elements.len(), "persisted context"),
        Err(e) => error!(error = %e, "persistence write failed"),
    }
}

// =============================================================================
// ASYNC WRITER
// =============================================================================

/// Spawn a task that writes the latest snapshot received on the returned
/// channel once `window` passes without a newer one. Dropping the sender
/// flushes whatever is pending and ends the task.
pub fn spawn_persistence_task<S>(store: Arc<S>, window: Duration) -> (mpsc::UnboundedSender<PersistedContext>, JoinHandle<()>)
where
    S: PersistenceStore + Send + Sync + 'static,
{
    let (tx, mut rx) = mpsc::unbounded_channel::<PersistedContext>();
    let handle = tokio::spawn(async move {
        while let Some(mut latest) = rx.recv().await {
            loop {
                match tokio::time::timeout(window, rx.recv()).await {
                    Ok(Some(next)) => latest = next,
                    Ok(None) | Err(_) => break,
                }
            }
            write_snapshot(store.as_ref(), &latest);
        }
    });
    (tx, handle)
}

// =============================================================================
// FILE STORE
// =============================================================================

/// Stores the context as pretty JSON in a single file.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl PersistenceStore for FileStore {
    fn save(&self, context: &PersistedContext) -> Result<(), StoreError> {
        let raw = serde_json::to_string_pretty(context)?;
        std::fs::write(&self.path, raw)?;
        Ok(())
    }

    fn load(&self) -> Result<Option<PersistedContext>, StoreError> {
        if !self.path.exists() {
            return Ok(None);
        }
        let raw = std::fs::read_to_string(&self.path)?;
        Ok(Some(serde_json::from_str(&raw)?))
    }
}
