//! Input model: tools, modifier keys, machine events, and the machine states.
//!
//! `Tool` and `Modifiers` capture the user's intent at the time of a pointer
//! event. `Event` is everything the interaction machine accepts. `MachineState`
//! is the active mode; gesture variants carry the scratch data needed to
//! compute incremental deltas and emit the final commit on release.

#[cfg(test)]
#[path = "input_test.rs"]
mod input_test;

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::camera::Point;
use crate::element::{Element, ElementId, ElementOptions, FileId, Shape};
use crate::persistence::PersistedContext;
use crate::resize::{Direction, ResizeOrigin};

/// Which tool is currently active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tool {
    /// Pointer / selection tool (default).
    #[default]
    Selection,
    Rectangle,
    Ellipse,
    Line,
    Arrow,
    Freedraw,
    Text,
    /// Places the most recently decoded image.
    Image,
}

impl Tool {
    /// The shape a drawing gesture with this tool creates.
    #[must_use]
    pub fn shape(self) -> Shape {
        match self {
            Self::Selection => Shape::Selection,
            Self::Rectangle => Shape::Rectangle,
            Self::Ellipse => Shape::Ellipse,
            Self::Line => Shape::Line,
            Self::Arrow => Shape::Arrow,
            Self::Freedraw => Shape::Freedraw,
            Self::Text => Shape::Text,
            Self::Image => Shape::Image,
        }
    }

    /// Whether a pointer-down with this tool starts a drawing gesture.
    #[must_use]
    pub fn draws(self) -> bool {
        self != Self::Selection
    }
}

/// Keyboard/mouse modifier keys held during an event.
#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Clone, Copy, Default)]
pub struct Modifiers {
    /// Shift key is held.
    pub shift: bool,
    /// Ctrl key is held.
    pub ctrl: bool,
    /// Alt / Option key is held.
    pub alt: bool,
    /// Meta / Command key is held.
    pub meta: bool,
}

impl Modifiers {
    /// Ctrl on most platforms, Command on macOS.
    #[must_use]
    pub fn command(self) -> bool {
        self.ctrl || self.meta
    }
}

/// Mouse button identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Button {
    /// Left mouse button (or single-finger tap).
    Primary,
    /// Middle mouse button (scroll wheel click).
    Middle,
    /// Right mouse button (or two-finger tap).
    Secondary,
}

/// A keyboard key as reported by the browser (e.g. `"Delete"`, `"z"`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Key(pub String);

/// Wheel / trackpad scroll delta.
#[derive(Debug, Clone, Copy)]
pub struct WheelDelta {
    /// Horizontal scroll amount in pixels.
    pub dx: f64,
    /// Vertical scroll amount in pixels (positive = down).
    pub dy: f64,
}

/// Everything the interaction machine accepts.
///
/// Pointer positions are in client space; the machine converts them with the
/// current camera.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    Loaded { context: Option<PersistedContext> },
    LoadFailed { message: String },
    PointerMove { pointer: Point },
    DrawStart { pointer: Point },
    Draw { pointer: Point },
    DrawEnd { pointer: Point },
    DragStart { pointer: Point },
    Drag { pointer: Point },
    DragEnd { pointer: Point },
    ResizeStart { pointer: Point, direction: Direction },
    Resize { pointer: Point },
    ResizeEnd { pointer: Point },
    UpdatePointStart { pointer: Point, index: usize },
    UpdatePoint { pointer: Point },
    UpdatePointEnd { pointer: Point },
    ConnectStart { pointer: Point },
    Connect { pointer: Point },
    SelectStart { pointer: Point },
    Select { pointer: Point },
    SelectEnd { pointer: Point },
    PanStart { pointer: Point },
    Pan { pointer: Point },
    PanEnd { pointer: Point },
    Zoom { pointer: Point, factor: f64 },
    Write { text: String },
    WriteEnd,
    EditText { id: ElementId },
    SelectElement { id: ElementId, additive: bool },
    SelectAll,
    Cancel,
    ChangeTool { tool: Tool },
    ToggleToolFixed,
    ChangeElementOptions { options: ElementOptions },
    Delete,
    Undo,
    Redo,
    Group,
    Ungroup,
    Copy,
    Cut,
    Paste { pointer: Point },
    ClipboardRead { text: String },
    ClipboardWritten,
    ImageSelected { bytes: usize },
    ImageDecoded { file_id: FileId, width: f64, height: f64 },
    ExternalFailed { message: String },
}

impl Event {
    /// Stable snake_case name, used in logs and errors.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Loaded { .. } => "loaded",
            Self::LoadFailed { .. } => "load_failed",
            Self::PointerMove { .. } => "pointer_move",
            Self::DrawStart { .. } => "draw_start",
            Self::Draw { .. } => "draw",
            Self::DrawEnd { .. } => "draw_end",
            Self::DragStart { .. } => "drag_start",
            Self::Drag { .. } => "drag",
            Self::DragEnd { .. } => "drag_end",
            Self::ResizeStart { .. } => "resize_start",
            Self::Resize { .. } => "resize",
            Self::ResizeEnd { .. } => "resize_end",
            Self::UpdatePointStart { .. } => "update_point_start",
            Self::UpdatePoint { .. } => "update_point",
            Self::UpdatePointEnd { .. } => "update_point_end",
            Self::ConnectStart { .. } => "connect_start",
            Self::Connect { .. } => "connect",
            Self::SelectStart { .. } => "select_start",
            Self::Select { .. } => "select",
            Self::SelectEnd { .. } => "select_end",
            Self::PanStart { .. } => "pan_start",
            Self::Pan { .. } => "pan",
            Self::PanEnd { .. } => "pan_end",
            Self::Zoom { .. } => "zoom",
            Self::Write { .. } => "write",
            Self::WriteEnd => "write_end",
            Self::EditText { .. } => "edit_text",
            Self::SelectElement { .. } => "select_element",
            Self::SelectAll => "select_all",
            Self::Cancel => "cancel",
            Self::ChangeTool { .. } => "change_tool",
            Self::ToggleToolFixed => "toggle_tool_fixed",
            Self::ChangeElementOptions { .. } => "change_element_options",
            Self::Delete => "delete",
            Self::Undo => "undo",
            Self::Redo => "redo",
            Self::Group => "group",
            Self::Ungroup => "ungroup",
            Self::Copy => "copy",
            Self::Cut => "cut",
            Self::Paste { .. } => "paste",
            Self::ClipboardRead { .. } => "clipboard_read",
            Self::ClipboardWritten => "clipboard_written",
            Self::ImageSelected { .. } => "image_selected",
            Self::ImageDecoded { .. } => "image_decoded",
            Self::ExternalFailed { .. } => "external_failed",
        }
    }

    /// Client-space pointer position carried by the event, if any.
    #[must_use]
    pub fn pointer(&self) -> Option<Point> {
        match self {
            Self::PointerMove { pointer }
            | Self::DrawStart { pointer }
            | Self::Draw { pointer }
            | Self::DrawEnd { pointer }
            | Self::DragStart { pointer }
            | Self::Drag { pointer }
            | Self::DragEnd { pointer }
            | Self::ResizeStart { pointer, .. }
            | Self::Resize { pointer }
            | Self::ResizeEnd { pointer }
            | Self::UpdatePointStart { pointer, .. }
            | Self::UpdatePoint { pointer }
            | Self::UpdatePointEnd { pointer }
            | Self::ConnectStart { pointer }
            | Self::Connect { pointer }
            | Self::SelectStart { pointer }
            | Self::Select { pointer }
            | Self::SelectEnd { pointer }
            | Self::PanStart { pointer }
            | Self::Pan { pointer }
            | Self::PanEnd { pointer }
            | Self::Zoom { pointer, .. }
            | Self::Paste { pointer } => Some(*pointer),
            _ => None,
        }
    }
}

/// Active mode of the interaction machine.
///
/// Gesture variants carry the scratch data for the gesture in progress.
#[derive(Debug, Clone, PartialEq)]
pub enum MachineState {
    /// Waiting for the persisted context.
    Loading {
        /// Failed load attempts so far.
        attempts: u32,
    },
    /// No gesture in progress.
    Idle,
    /// A new element is being sized by the pointer.
    Drawing {
        /// Element being drawn.
        id: ElementId,
        /// Canvas position of the pointer at draw start.
        start: Point,
    },
    /// Selected elements follow the pointer.
    Dragging {
        /// Canvas position at the previous tick.
        previous: Point,
        /// Whether any tick moved anything.
        moved: bool,
    },
    /// Selected elements are being resized from a handle.
    Resizing {
        /// Handle the gesture started from.
        direction: Direction,
        /// Anchor that stays put for the whole gesture.
        fixed: Point,
        /// Pointer and geometry at resize start.
        origin: ResizeOrigin,
        /// Whether the pointer has left its starting position.
        moved: bool,
    },
    /// One point handle of a linear element is being moved.
    UpdatingPoint {
        id: ElementId,
        /// Handle index, where 1 on a two-point line is the virtual midpoint.
        index: usize,
        previous: Point,
        moved: bool,
    },
    /// Text is being composed into an element.
    Writing { id: ElementId },
    /// Marquee selection in progress.
    Selecting {
        start: Point,
        /// Rubber band, discarded on release.
        band: Box<Element>,
    },
    /// Viewport follows the pointer.
    Panning {
        /// Client position at the previous tick.
        previous: Point,
    },
    /// Multi-point placement of a linear element; its last point is provisional.
    Connecting { id: ElementId },
    /// Waiting for the clipboard write of a copy.
    Copying,
    /// Waiting for the clipboard write of a cut.
    Cutting,
    /// Waiting for the clipboard read of a paste.
    Pasting {
        /// Canvas position the pasted content is centered on.
        at: Point,
    },
    /// Waiting for an image decode.
    LoadingImage { file_id: FileId },
}

impl Default for MachineState {
    fn default() -> Self {
        Self::Loading { attempts: 0 }
    }
}

impl MachineState {
    /// Data-free tag of this state.
    #[must_use]
    pub fn tag(&self) -> StateTag {
        match self {
            Self::Loading { .. } => StateTag::Loading,
            Self::Idle => StateTag::Idle,
            Self::Drawing { .. } => StateTag::Drawing,
            Self::Dragging { .. } => StateTag::Dragging,
            Self::Resizing { .. } => StateTag::Resizing,
            Self::UpdatingPoint { .. } => StateTag::UpdatingPoint,
            Self::Writing { .. } => StateTag::Writing,
            Self::Selecting { .. } => StateTag::Selecting,
            Self::Panning { .. } => StateTag::Panning,
            Self::Connecting { .. } => StateTag::Connecting,
            Self::Copying => StateTag::Copying,
            Self::Cutting => StateTag::Cutting,
            Self::Pasting { .. } => StateTag::Pasting,
            Self::LoadingImage { .. } => StateTag::LoadingImage,
        }
    }
}

/// Data-free name of a [`MachineState`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StateTag {
    Loading,
    Idle,
    Drawing,
    Dragging,
    Resizing,
    UpdatingPoint,
    Writing,
    Selecting,
    Panning,
    Connecting,
    Copying,
    Cutting,
    Pasting,
    LoadingImage,
}

impl fmt::Display for StateTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Loading => "loading",
            Self::Idle => "idle",
            Self::Drawing => "drawing",
            Self::Dragging => "dragging",
            Self::Resizing => "resizing",
            Self::UpdatingPoint => "updating_point",
            Self::Writing => "writing",
            Self::Selecting => "selecting",
            Self::Panning => "panning",
            Self::Connecting => "connecting",
            Self::Copying => "copying",
            Self::Cutting => "cutting",
            Self::Pasting => "pasting",
            Self::LoadingImage => "loading_image",
        };
        f.write_str(name)
    }
}
