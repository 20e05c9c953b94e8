//! Shared numeric constants for the interaction core.

// ── Hit-testing ─────────────────────────────────────────────────

/// Screen-space hit slop in pixels for handles and thin edges.
pub const HANDLE_RADIUS_PX: f64 = 8.0;

/// Orthogonal (edge) handles are offered only when the on-screen selection is
/// larger than this on both axes, so they never overlap the corner handles.
pub const ORTHOGONAL_HANDLE_MIN_PX: f64 = 30.0;

// ── Closeness ───────────────────────────────────────────────────

/// Screen-space distance under which two linear points count as the same spot.
pub const CLOSENESS_PX: f64 = 10.0;

// ── Text ────────────────────────────────────────────────────────

/// Minimum height per text line during a text resize.
pub const TEXT_MIN_LINE_HEIGHT_PX: f64 = 30.0;

/// Line height as a multiple of the font size.
pub const LINE_HEIGHT_RATIO: f64 = 1.25;

/// Average glyph advance as a multiple of the font size (fixed-width measurer).
pub const GLYPH_WIDTH_RATIO: f64 = 0.6;

// ── Seeds ───────────────────────────────────────────────────────

/// Exclusive upper bound for roughness seeds (2^31 - 1).
pub const SEED_MAX: u32 = 0x7FFF_FFFF;

// ── Clipboard ───────────────────────────────────────────────────

/// `type` tag of the clipboard envelope written by this crate.
pub const CLIPBOARD_TYPE: &str = "sketchboard/clipboard";

// ── Wheel ───────────────────────────────────────────────────────

/// Exponential zoom rate per pixel of vertical wheel delta.
pub const WHEEL_ZOOM_RATE: f64 = 0.002;

// ── Loading ─────────────────────────────────────────────────────

/// Failed loads a session retries before starting from an empty board.
pub const LOAD_RETRY_LIMIT: u32 = 3;
