//! Collaborator interfaces consumed by the interaction core.
//!
//! SYSTEM CONTEXT
//! ==============
//! The core never touches a storage backend, the OS clipboard, an image
//! decoder or a font rasterizer directly. It talks to them through the traits
//! below; [`crate::session::Session`] wires concrete implementations to the
//! requests the state machine emits. The in-memory implementations here back
//! the tests and the replay binary.

#[cfg(test)]
#[path = "collab_test.rs"]
mod collab_test;

use std::sync::Mutex;

use crate::consts::GLYPH_WIDTH_RATIO;
use crate::element::{FontFamily, Size};
use crate::error::{ExternalError, StoreError};
use crate::persistence::PersistedContext;

// =============================================================================
// TEXT MEASUREMENT
// =============================================================================

/// Input to a text measurement.
#[derive(Debug, Clone, Copy)]
pub struct TextMeasureRequest<'a> {
    pub font_family: FontFamily,
    pub font_size: f64,
    pub line_height: f64,
    pub text: &'a str,
    pub dpr: f64,
}

/// Measured text block, in device pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextMetrics {
    pub width: f64,
    pub height: f64,
    pub line_height: f64,
    pub line_gap: f64,
    pub font_size: f64,
}

impl TextMetrics {
    /// Block size converted back to canvas units.
    #[must_use]
    pub fn canvas_size(&self, dpr: f64) -> Size {
        Size::new(self.width / dpr, self.height / dpr)
    }
}

pub trait TextMeasurer {
    fn measure(&self, request: &TextMeasureRequest<'_>) -> TextMetrics;
}

/// Measures text as if every glyph had the same advance.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixedWidthMeasurer;

impl TextMeasurer for FixedWidthMeasurer {
    #[allow(clippy::cast_precision_loss)]
    fn measure(&self, request: &TextMeasureRequest<'_>) -> TextMetrics {
        let lines: Vec<&str> = request.text.split('\n').collect();
        let widest = lines.iter().map(|l| l.chars().count()).max().unwrap_or(0);
        let line_height = request.line_height * request.dpr;
        TextMetrics {
            width: widest as f64 * request.font_size * GLYPH_WIDTH_RATIO * request.dpr,
            height: lines.len() as f64 * line_height,
            line_height,
            line_gap: (request.line_height - request.font_size) * request.dpr,
            font_size: request.font_size * request.dpr,
        }
    }
}

// =============================================================================
// PERSISTENCE
// =============================================================================

/// Best-effort storage of the persisted context.
pub trait PersistenceStore {
    fn save(&self, context: &PersistedContext) -> Result<(), StoreError>;
    fn load(&self) -> Result<Option<PersistedContext>, StoreError>;
}

/// Keeps the last saved context in memory.
#[derive(Debug, Default)]
pub struct MemoryStore {
    saved: Mutex<Option<PersistedContext>>,
    saves: Mutex<usize>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the store with a context to load.
    #[must_use]
    pub fn with_context(context: PersistedContext) -> Self {
        Self { saved: Mutex::new(Some(context)), saves: Mutex::new(0) }
    }

    /// Number of successful `save` calls.
    #[must_use]
    pub fn save_count(&self) -> usize {
        self.saves.lock().map_or(0, |n| *n)
    }

    /// The last saved context.
    #[must_use]
    pub fn last_saved(&self) -> Option<PersistedContext> {
        self.saved.lock().map_or(None, |s| s.clone())
    }
}

impl PersistenceStore for MemoryStore {
    fn save(&self, context: &PersistedContext) -> Result<(), StoreError> {
        let mut saved = self.saved.lock().map_err(|_| StoreError::Poisoned)?;
        *saved = Some(context.clone());
        let mut saves = self.saves.lock().map_err(|_| StoreError::Poisoned)?;
        *saves += 1;
        Ok(())
    }

    fn load(&self) -> Result<Option<PersistedContext>, StoreError> {
        let saved = self.saved.lock().map_err(|_| StoreError::Poisoned)?;
        Ok(saved.clone())
    }
}

// =============================================================================
// CLIPBOARD
// =============================================================================

/// OS clipboard text access. Either call may be refused.
pub trait Clipboard {
    fn read_text(&mut self) -> Result<String, ExternalError>;
    fn write_text(&mut self, text: &str) -> Result<(), ExternalError>;
}

/// Clipboard backed by a string slot.
#[derive(Debug, Clone, Default)]
pub struct MemoryClipboard {
    pub contents: String,
    /// When set, every access is refused.
    pub denied: bool,
}

impl MemoryClipboard {
    #[must_use]
    pub fn with_text(text: &str) -> Self {
        Self { contents: text.to_string(), denied: false }
    }
}

impl Clipboard for MemoryClipboard {
    fn read_text(&mut self) -> Result<String, ExternalError> {
        if self.denied {
            return Err(ExternalError::ClipboardDenied("read refused".into()));
        }
        Ok(self.contents.clone())
    }

    fn write_text(&mut self, text: &str) -> Result<(), ExternalError> {
        if self.denied {
            return Err(ExternalError::ClipboardDenied("write refused".into()));
        }
        self.contents = text.to_string();
        Ok(())
    }
}

// =============================================================================
// IMAGES
// =============================================================================

/// Intrinsic pixel size of a decoded image.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DecodedImage {
    pub width: f64,
    pub height: f64,
}

pub trait ImageLoader {
    fn decode(&mut self, bytes: &[u8]) -> Result<DecodedImage, ExternalError>;
}

/// Reports the same size for every non-empty blob.
#[derive(Debug, Clone, Copy)]
pub struct FixedImageLoader {
    pub width: f64,
    pub height: f64,
}

impl ImageLoader for FixedImageLoader {
    fn decode(&mut self, bytes: &[u8]) -> Result<DecodedImage, ExternalError> {
        if bytes.is_empty() {
            return Err(ExternalError::ImageDecode("empty blob".into()));
        }
        Ok(DecodedImage { width: self.width, height: self.height })
    }
}

/// Scale `(width, height)` down so neither side exceeds `max`, keeping the aspect ratio.
#[must_use]
pub fn thumbnail_size(width: f64, height: f64, max: f64) -> Size {
    let longest = width.max(height);
    if longest <= max || longest <= 0.0 {
        return Size::new(width, height);
    }
    let scale = max / longest;
    Size::new(width * scale, height * scale)
}
