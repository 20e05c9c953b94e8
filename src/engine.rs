//! Interaction engine: the session state machine.
//!
//! DESIGN
//! ======
//! [`EngineCore::handle`] is the transition table. It dispatches on the
//! current [`MachineState`], mutates the element arena in place and returns
//! the ordered [`Action`]s the host must carry out. Transitions run to
//! completion; nothing here is asynchronous.
//!
//! Pass-through steps are plain continuations: a committed change records a
//! [`Version`] ("version released") and then emits `Persist` with the
//! persisted subset ("persisting"). Collaborator calls are emitted as
//! `Request` actions; the machine waits in a dedicated state until the host
//! feeds back the completion or `ExternalFailed`.
//!
//! An event the current state does not accept is rejected with
//! `UnexpectedEvent` and leaves the state untouched. Invariant violations
//! abort the operation, return the machine to idle and surface as errors.

#[cfg(test)]
#[path = "engine_test.rs"]
mod engine_test;

use std::collections::{HashMap, HashSet};

use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::{debug, error, info, trace, warn};
use uuid::Uuid;

use crate::camera::{Camera, Point};
use crate::clipboard::{ClipboardPayload, now_ms, parse, rekey, serialize_selection};
use crate::collab::{FixedWidthMeasurer, TextMeasureRequest, TextMeasurer, thumbnail_size};
use crate::config::SessionConfig;
use crate::consts::LINE_HEIGHT_RATIO;
use crate::element::{
    Element, ElementData, ElementId, ElementOptions, ElementStore, FileId, FontFamily, ImageFile, Shape, ShapeKind,
    Size,
};
use crate::error::{EngineError, ExternalError};
use crate::factory::{create_element, create_image};
use crate::geometry::{Bounds, bounding_box, closes_loop, intersects, repeats_last_point, union_bounding_box};
use crate::group::{expand_to_groups, group, ungroup};
use crate::history::{History, Version};
use crate::input::{Event, MachineState, Tool};
use crate::persistence::{PersistedContext, PersistedViewport};
use crate::resize::{
    Direction, ResizeOrigin, effective_direction, fixed_point, linear_handle_count, resize_element, resize_linear_point,
    resize_multiple,
};

/// Actions returned from [`EngineCore::handle`] for the host to process, in order.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// State changed; redraw.
    RenderNeeded,
    /// Hand this snapshot to the debounced persistence writer.
    Persist(PersistedContext),
    /// Start a collaborator call; its completion comes back as an event.
    Request(ExternalCall),
    /// Show a blocking notification to the user.
    Notify(String),
}

/// Collaborator calls the machine can wait on.
#[derive(Debug, Clone, PartialEq)]
pub enum ExternalCall {
    /// Answer with `Loaded` or `LoadFailed`.
    LoadState,
    /// Answer with `ClipboardRead` or `ExternalFailed`.
    ReadClipboard,
    /// Answer with `ClipboardWritten` or `ExternalFailed`.
    WriteClipboard(String),
    /// Decode the blob announced by `ImageSelected`; answer with
    /// `ImageDecoded` or `ExternalFailed`.
    DecodeImage { file_id: FileId },
}

/// A decoded image waiting to be placed with the image tool.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PendingImage {
    pub file_id: FileId,
    /// Intrinsic size, used for the placed element.
    pub size: Size,
    /// Cursor preview size.
    pub thumbnail: Size,
}

/// Core engine state: the element arena, viewport, tool state, history and
/// the active machine state.
pub struct EngineCore {
    pub store: ElementStore,
    pub camera: Camera,
    pub state: MachineState,
    pub tool: Tool,
    pub tool_fixed: bool,
    /// Style applied to new elements.
    pub element_options: ElementOptions,
    pub history: History,
    /// Registry of decoded images by file id.
    pub files: HashMap<FileId, ImageFile>,
    pub pending_image: Option<PendingImage>,
    /// Last client-space pointer position seen.
    pub pointer: Point,
    pub config: SessionConfig,
    measurer: Box<dyn TextMeasurer>,
    rng: StdRng,
}

impl Default for EngineCore {
    fn default() -> Self {
        Self::with_config(SessionConfig::default())
    }
}

impl EngineCore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Engine in the loading state with the given configuration.
    #[must_use]
    pub fn with_config(config: SessionConfig) -> Self {
        Self {
            store: ElementStore::new(),
            camera: Camera::default(),
            state: MachineState::default(),
            tool: Tool::default(),
            tool_fixed: false,
            element_options: ElementOptions::default(),
            history: History::default(),
            files: HashMap::new(),
            pending_image: None,
            pointer: Point::default(),
            config,
            measurer: Box::new(FixedWidthMeasurer),
            rng: StdRng::from_os_rng(),
        }
    }

    /// Replace the text measurer.
    #[must_use]
    pub fn with_measurer(mut self, measurer: Box<dyn TextMeasurer>) -> Self {
        self.measurer = measurer;
        self
    }

    /// Make seed generation deterministic.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    // --- Queries ---

    /// Live elements in draw order.
    pub fn elements(&self) -> impl Iterator<Item = &Element> {
        self.store.live()
    }

    #[must_use]
    pub fn element(&self, id: &ElementId) -> Option<&Element> {
        self.store.get(id)
    }

    /// Marquee rubber band, while a marquee selection is in progress.
    #[must_use]
    pub fn selection_band(&self) -> Option<&Element> {
        match &self.state {
            MachineState::Selecting { band, .. } => Some(band),
            _ => None,
        }
    }

    /// Last pointer position in canvas space.
    #[must_use]
    pub fn canvas_pointer(&self) -> Point {
        self.to_canvas(self.pointer)
    }

    /// Snapshot of what undo/redo restores.
    #[must_use]
    pub fn version(&self) -> Version {
        Version { elements: self.store.snapshot(), element_options: self.element_options.clone() }
    }

    /// The persisted subset: live, drawn elements plus tool and viewport state.
    #[must_use]
    pub fn persisted_context(&self) -> PersistedContext {
        PersistedContext {
            elements: self.store.live().filter(|e| !e.size.is_zero()).cloned().collect(),
            element_options: self.element_options.clone(),
            tool: self.tool,
            tool_fixed: self.tool_fixed,
            viewport: PersistedViewport { zoom: self.camera.zoom, origin: self.camera.origin },
        }
    }

    // --- Transition table ---

    /// Feed one event through the machine.
    ///
    /// # Errors
    ///
    /// `UnexpectedEvent` when the current state does not accept `event`; the
    /// state is left as it was. Any other error is an invariant violation:
    /// the operation is abandoned and the machine returns to idle.
    pub fn handle(&mut self, event: Event) -> Result<Vec<Action>, EngineError> {
        let from = self.state.tag();
        let name = event.name();
        let pointer = event.pointer();
        match self.dispatch(event) {
            Ok(actions) => {
                if let Some(p) = pointer {
                    self.pointer = p;
                }
                let to = self.state.tag();
                if from == to {
                    trace!(state = %to, event = name, "event handled");
                } else {
                    debug!(%from, %to, event = name, "transition");
                }
                Ok(actions)
            }
            Err(e @ EngineError::UnexpectedEvent { .. }) => {
                warn!(error = %e, "event rejected");
                Err(e)
            }
            Err(e) => {
                error!(error = %e, event = name, state = %from, "operation aborted");
                self.state = MachineState::Idle;
                Err(e)
            }
        }
    }

    fn dispatch(&mut self, event: Event) -> Result<Vec<Action>, EngineError> {
        match self.state.clone() {
            MachineState::Loading { attempts } => self.on_loading(attempts, event),
            MachineState::Idle => self.on_idle(event),
            MachineState::Drawing { id, start } => self.on_drawing(id, start, event),
            MachineState::Dragging { previous, moved } => self.on_dragging(previous, moved, event),
            MachineState::Resizing { direction, fixed, origin, moved } => {
                self.on_resizing(ResizeGesture { direction, fixed, origin, moved }, event)
            }
            MachineState::UpdatingPoint { id, index, previous, moved } => {
                self.on_updating_point(PointGesture { id, index, previous, moved }, event)
            }
            MachineState::Writing { id } => self.on_writing(id, event),
            MachineState::Selecting { start, band } => self.on_selecting(start, *band, event),
            MachineState::Panning { previous } => self.on_panning(previous, event),
            MachineState::Connecting { id } => self.on_connecting(id, event),
            MachineState::Copying => self.on_clipboard_written(false, event),
            MachineState::Cutting => self.on_clipboard_written(true, event),
            MachineState::Pasting { at } => self.on_pasting(at, event),
            MachineState::LoadingImage { file_id } => self.on_loading_image(file_id, event),
        }
    }

    fn reject(&self, event: &'static str) -> EngineError {
        EngineError::UnexpectedEvent { state: self.state.tag(), event }
    }

    // --- Loading ---

    fn on_loading(&mut self, attempts: u32, event: Event) -> Result<Vec<Action>, EngineError> {
        let name = event.name();
        match event {
            Event::Loaded { context } => {
                self.apply_context(context.unwrap_or_default());
                self.state = MachineState::Idle;
                Ok(vec![Action::RenderNeeded])
            }
            Event::LoadFailed { message } => {
                let attempts = attempts + 1;
                warn!(attempt = attempts, error = %message, "loading persisted context failed; retrying");
                self.state = MachineState::Loading { attempts };
                Ok(vec![Action::Request(ExternalCall::LoadState)])
            }
            _ => Err(self.reject(name)),
        }
    }

    fn apply_context(&mut self, context: PersistedContext) {
        self.store.load(context.elements);
        let pruned = self.store.compact();
        self.element_options = context.element_options;
        self.tool = if context.tool == Tool::Image { Tool::Selection } else { context.tool };
        self.tool_fixed = context.tool_fixed;
        self.camera.origin = context.viewport.origin;
        self.camera.zoom = context.viewport.zoom.clamp(self.config.min_zoom, self.config.max_zoom);
        self.history.reset(self.version());
        info!(elements = self.store.len(), pruned, "context loaded");
    }

    // --- Idle ---

    #[allow(clippy::too_many_lines)]
    fn on_idle(&mut self, event: Event) -> Result<Vec<Action>, EngineError> {
        let name = event.name();
        match event {
            Event::PointerMove { .. } => Ok(Vec::new()),
            Event::DrawStart { pointer } => self.start_drawing(pointer),
            Event::DragStart { pointer } => {
                if self.store.selected_count() == 0 {
                    return Err(EngineError::EmptySelection);
                }
                self.state = MachineState::Dragging { previous: self.to_canvas(pointer), moved: false };
                Ok(Vec::new())
            }
            Event::ResizeStart { pointer, direction } => {
                let bounds = union_bounding_box(self.store.selected()).ok_or(EngineError::EmptySelection)?;
                let start = self.to_canvas(pointer);
                let fixed = fixed_point(&bounds, direction);
                let single = match self.store.selected_ids().as_slice() {
                    [id] => self.store.get(id),
                    _ => None,
                };
                let origin = ResizeOrigin::capture(single, start);
                self.state = MachineState::Resizing { direction, fixed, origin, moved: false };
                Ok(Vec::new())
            }
            Event::UpdatePointStart { pointer, index } => {
                let id = self.single_selected_linear()?;
                let len = self.store.get(&id).map_or(0, linear_handle_count);
                if index >= len {
                    return Err(EngineError::PointIndexOutOfRange { index, len });
                }
                self.state = MachineState::UpdatingPoint { id, index, previous: self.to_canvas(pointer), moved: false };
                Ok(Vec::new())
            }
            Event::ConnectStart { pointer } => {
                let id = self.single_selected_linear()?;
                let at = self.to_canvas(pointer);
                let element = self.element_mut(id)?;
                let offset = at - element.point;
                element.unselect();
                if let Some(points) = element.points_mut() {
                    points.push(offset);
                }
                element.sync_size_from_points();
                self.state = MachineState::Connecting { id };
                Ok(vec![Action::RenderNeeded])
            }
            Event::SelectStart { pointer } => Ok(self.start_selecting(pointer)),
            Event::PanStart { pointer } => {
                self.state = MachineState::Panning { previous: pointer };
                Ok(Vec::new())
            }
            Event::Zoom { pointer, factor } => {
                self.camera.zoom_at(pointer, factor, self.config.min_zoom, self.config.max_zoom);
                Ok(self.settled())
            }
            Event::EditText { id } => {
                let element = self.store.get(&id).filter(|e| !e.is_deleted()).ok_or(EngineError::MissingElement(id))?;
                if element.kind() != ShapeKind::Text {
                    return Err(EngineError::NotText(id));
                }
                self.store.select_only(&HashSet::from([id]));
                self.state = MachineState::Writing { id };
                Ok(vec![Action::RenderNeeded])
            }
            Event::SelectElement { id, additive } => {
                if !self.store.get(&id).is_some_and(|e| !e.is_deleted()) {
                    return Err(EngineError::MissingElement(id));
                }
                let mut picked: HashSet<ElementId> =
                    if additive { self.store.selected_ids().into_iter().collect() } else { HashSet::new() };
                picked.insert(id);
                let picked = expand_to_groups(&self.store, &picked);
                self.store.select_only(&picked);
                Ok(self.settled())
            }
            Event::SelectAll => {
                let all: HashSet<ElementId> = self.store.live().map(|e| e.id).collect();
                self.store.select_only(&all);
                Ok(self.settled())
            }
            Event::Cancel => {
                self.store.unselect_all();
                Ok(self.settled())
            }
            Event::ChangeTool { tool } => {
                if tool == Tool::Image && self.pending_image.is_none() {
                    return Err(self.reject(name));
                }
                self.tool = tool;
                if tool.draws() {
                    self.store.unselect_all();
                }
                Ok(self.settled())
            }
            Event::ToggleToolFixed => {
                self.tool_fixed = !self.tool_fixed;
                Ok(self.settled())
            }
            Event::ChangeElementOptions { options } => {
                self.apply_options(&options);
                self.element_options = options;
                Ok(self.commit())
            }
            Event::Delete => {
                let ids = self.store.selected_ids();
                if ids.is_empty() {
                    return Ok(Vec::new());
                }
                self.delete_elements(&ids);
                Ok(self.commit())
            }
            Event::Undo => Ok(self.travel(-1)),
            Event::Redo => Ok(self.travel(1)),
            Event::Group => match group(&mut self.store) {
                Some(token) => {
                    debug!(%token, "grouped selection");
                    Ok(self.commit())
                }
                None => Ok(Vec::new()),
            },
            Event::Ungroup => {
                if ungroup(&mut self.store) == 0 {
                    return Ok(Vec::new());
                }
                Ok(self.commit())
            }
            Event::Copy => Ok(self.start_copy(false)),
            Event::Cut => Ok(self.start_copy(true)),
            Event::Paste { pointer } => {
                self.state = MachineState::Pasting { at: self.to_canvas(pointer) };
                Ok(vec![Action::Request(ExternalCall::ReadClipboard)])
            }
            Event::ImageSelected { bytes } => {
                let max = self.config.max_image_bytes;
                if bytes > max {
                    return Ok(self.external_failure(&ExternalError::ImageTooLarge { bytes, max }.to_string()));
                }
                let file_id = Uuid::new_v4();
                self.state = MachineState::LoadingImage { file_id };
                Ok(vec![Action::Request(ExternalCall::DecodeImage { file_id })])
            }
            _ => Err(self.reject(name)),
        }
    }

    fn start_drawing(&mut self, pointer: Point) -> Result<Vec<Action>, EngineError> {
        let start = self.to_canvas(pointer);
        let element = match self.tool {
            Tool::Selection => return Ok(self.start_selecting(pointer)),
            Tool::Image => {
                let Some(pending) = self.pending_image else {
                    return Err(self.reject("draw_start"));
                };
                create_image(pending.file_id, &self.element_options, start, pending.size)
            }
            tool => create_element(
                tool.shape(),
                &self.element_options,
                start,
                &self.store,
                self.camera.dpr,
                self.measurer.as_ref(),
                &mut self.rng,
            ),
        };
        let id = element.id;
        self.store.unselect_all();
        self.store.insert(element);
        self.state = if self.tool == Tool::Text {
            MachineState::Writing { id }
        } else {
            MachineState::Drawing { id, start }
        };
        Ok(vec![Action::RenderNeeded])
    }

    fn start_selecting(&mut self, pointer: Point) -> Vec<Action> {
        let start = self.to_canvas(pointer);
        self.store.unselect_all();
        let band = Element::new(ElementData::Selection, start, Size::default(), self.element_options.clone());
        self.state = MachineState::Selecting { start, band: Box::new(band) };
        vec![Action::RenderNeeded]
    }

    fn start_copy(&mut self, cut: bool) -> Vec<Action> {
        if self.store.selected_count() == 0 {
            return Vec::new();
        }
        match serialize_selection(&self.store, &self.files) {
            Ok(text) => {
                self.state = if cut { MachineState::Cutting } else { MachineState::Copying };
                vec![Action::Request(ExternalCall::WriteClipboard(text))]
            }
            Err(e) => self.external_failure(&format!("clipboard serialization failed: {e}")),
        }
    }

    fn apply_options(&mut self, options: &ElementOptions) {
        let dpr = self.camera.dpr;
        for id in self.store.selected_ids() {
            let Some(element) = self.store.get_mut(&id) else {
                continue;
            };
            element.options = options.clone();
            if let ElementData::Text { text, font_family, font_size } = &mut element.data {
                *font_family = options.font_family;
                *font_size = options.font_size.px();
                element.size = measure_text(self.measurer.as_ref(), text, *font_family, *font_size, dpr);
            }
        }
    }

    fn delete_elements(&mut self, ids: &[ElementId]) {
        for id in ids {
            if let Some(element) = self.store.get_mut(id) {
                element.delete();
            }
        }
        debug!(count = ids.len(), "deleted elements");
    }

    fn travel(&mut self, delta: isize) -> Vec<Action> {
        let before = self.history.cursor();
        let version = self.history.seek(delta).clone();
        if self.history.cursor() == before {
            return Vec::new();
        }
        self.store.load(version.elements);
        self.element_options = version.element_options;
        debug!(cursor = self.history.cursor(), versions = self.history.version_count(), "history travel");
        self.settled()
    }

    // --- Drawing ---

    fn on_drawing(&mut self, id: ElementId, start: Point, event: Event) -> Result<Vec<Action>, EngineError> {
        let name = event.name();
        match event {
            Event::PointerMove { .. } => Ok(Vec::new()),
            Event::Draw { pointer } => {
                self.draw_tick(id, start, pointer)?;
                Ok(vec![Action::RenderNeeded])
            }
            Event::DrawEnd { pointer } => {
                self.draw_tick(id, start, pointer)?;
                self.end_drawing(id)
            }
            Event::Cancel => {
                self.store.remove(&id);
                self.state = MachineState::Idle;
                Ok(vec![Action::RenderNeeded])
            }
            _ => Err(self.reject(name)),
        }
    }

    fn draw_tick(&mut self, id: ElementId, start: Point, pointer: Point) -> Result<(), EngineError> {
        let current = self.to_canvas(pointer);
        let element = self.element_mut(id)?;
        let offset = current - element.point;
        match element.kind() {
            ShapeKind::Generic => {
                let bounds = Bounds::from_corners(start, current);
                element.point = Point::new(bounds.min_x, bounds.min_y);
                element.size = Size::new(bounds.width(), bounds.height());
            }
            ShapeKind::Linear => {
                if let Some(last) = element.points_mut().and_then(|points| points.last_mut()) {
                    *last = offset;
                }
                element.sync_size_from_points();
            }
            ShapeKind::Freedraw => {
                if let Some(points) = element.points_mut() {
                    if points.last() != Some(&offset) {
                        points.push(offset);
                    }
                }
                element.sync_size_from_points();
            }
            ShapeKind::Text | ShapeKind::Image => {}
        }
        Ok(())
    }

    fn end_drawing(&mut self, id: ElementId) -> Result<Vec<Action>, EngineError> {
        let element = self.store.get(&id).ok_or(EngineError::MissingElement(id))?;
        if element.size.is_zero() {
            if element.kind() == ShapeKind::Linear {
                self.state = MachineState::Connecting { id };
                return Ok(vec![Action::RenderNeeded]);
            }
            self.store.remove(&id);
            debug!(%id, "discarded empty element");
            self.state = MachineState::Idle;
            return Ok(vec![Action::RenderNeeded]);
        }
        Ok(self.finish_element(id))
    }

    /// Shared tail of drawing, writing and point placement.
    fn finish_element(&mut self, id: ElementId) -> Vec<Action> {
        if self.tool_fixed {
            self.store.unselect_all();
        } else {
            self.store.select_only(&HashSet::from([id]));
            if self.tool == Tool::Image {
                self.pending_image = None;
            }
            self.tool = Tool::Selection;
        }
        self.state = MachineState::Idle;
        self.commit()
    }

    // --- Connecting ---

    fn on_connecting(&mut self, id: ElementId, event: Event) -> Result<Vec<Action>, EngineError> {
        let name = event.name();
        match event {
            Event::PointerMove { pointer } | Event::Draw { pointer } => {
                self.move_provisional(id, pointer)?;
                Ok(vec![Action::RenderNeeded])
            }
            Event::Connect { pointer } => self.connect(id, pointer),
            Event::Cancel => {
                let element = self.element_mut(id)?;
                if let Some(points) = element.points_mut() {
                    points.pop();
                }
                element.sync_size_from_points();
                self.finish_connecting(id)
            }
            _ => Err(self.reject(name)),
        }
    }

    fn move_provisional(&mut self, id: ElementId, pointer: Point) -> Result<(), EngineError> {
        let current = self.to_canvas(pointer);
        let element = self.element_mut(id)?;
        let offset = current - element.point;
        if let Some(last) = element.points_mut().and_then(|points| points.last_mut()) {
            *last = offset;
        }
        element.sync_size_from_points();
        Ok(())
    }

    /// Commit the provisional point, then close the loop, drop a repeated
    /// point, or open a new provisional point.
    fn connect(&mut self, id: ElementId, pointer: Point) -> Result<Vec<Action>, EngineError> {
        self.move_provisional(id, pointer)?;
        let zoom = self.camera.zoom;
        let element = self.element_mut(id)?;
        let Some(points) = element.points_mut() else {
            return Err(EngineError::NotLinear(id));
        };
        if closes_loop(points, zoom) {
            let first = points.first().copied().unwrap_or_default();
            if let Some(last) = points.last_mut() {
                *last = first;
            }
            element.sync_size_from_points();
            debug!(%id, "closed linear loop");
            return self.finish_connecting(id);
        }
        if repeats_last_point(points, zoom) {
            points.pop();
            element.sync_size_from_points();
            return self.finish_connecting(id);
        }
        if let Some(last) = points.last().copied() {
            points.push(last);
        }
        Ok(vec![Action::RenderNeeded])
    }

    fn finish_connecting(&mut self, id: ElementId) -> Result<Vec<Action>, EngineError> {
        let element = self.store.get(&id).ok_or(EngineError::MissingElement(id))?;
        if element.points().map_or(0, <[Point]>::len) < 2 || element.size.is_zero() {
            self.store.remove(&id);
            debug!(%id, "discarded degenerate line");
            self.state = MachineState::Idle;
            return Ok(vec![Action::RenderNeeded]);
        }
        Ok(self.finish_element(id))
    }

    // --- Dragging ---

    fn on_dragging(&mut self, previous: Point, moved: bool, event: Event) -> Result<Vec<Action>, EngineError> {
        let name = event.name();
        match event {
            Event::Drag { pointer } => {
                let current = self.to_canvas(pointer);
                let moved = self.drag_tick(previous, current) || moved;
                self.state = MachineState::Dragging { previous: current, moved };
                Ok(vec![Action::RenderNeeded])
            }
            Event::DragEnd { pointer } => {
                let current = self.to_canvas(pointer);
                let moved = self.drag_tick(previous, current) || moved;
                self.state = MachineState::Idle;
                if moved { Ok(self.commit()) } else { Ok(vec![Action::RenderNeeded]) }
            }
            _ => Err(self.reject(name)),
        }
    }

    fn drag_tick(&mut self, previous: Point, current: Point) -> bool {
        let delta = current - previous;
        if delta == Point::default() {
            return false;
        }
        for id in self.store.selected_ids() {
            if let Some(element) = self.store.get_mut(&id) {
                element.translate(delta.x, delta.y);
            }
        }
        true
    }

    // --- Resizing ---

    fn on_resizing(&mut self, gesture: ResizeGesture, event: Event) -> Result<Vec<Action>, EngineError> {
        let name = event.name();
        match event {
            Event::Resize { pointer } => {
                self.state = MachineState::from(self.resize_tick(gesture, pointer)?);
                Ok(vec![Action::RenderNeeded])
            }
            Event::ResizeEnd { pointer } => {
                let gesture = self.resize_tick(gesture, pointer)?;
                self.state = MachineState::Idle;
                if gesture.moved { Ok(self.commit()) } else { Ok(vec![Action::RenderNeeded]) }
            }
            _ => Err(self.reject(name)),
        }
    }

    fn resize_tick(&mut self, mut gesture: ResizeGesture, pointer: Point) -> Result<ResizeGesture, EngineError> {
        let current = self.to_canvas(pointer);
        if !gesture.moved && current == gesture.origin.pointer {
            return Ok(gesture);
        }
        gesture.moved = true;
        let ResizeGesture { direction, fixed, ref origin, .. } = gesture;
        let ids = self.store.selected_ids();
        trace!(effective = ?effective_direction(direction, current, fixed), "resize tick");
        match ids.as_slice() {
            [] => return Err(EngineError::EmptySelection),
            [id] => {
                let dpr = self.camera.dpr;
                let element = self.store.get_mut(id).ok_or(EngineError::MissingElement(*id))?;
                resize_element(element, direction, origin, current, fixed, self.measurer.as_ref(), dpr);
            }
            _ => {
                if !resize_multiple(&mut self.store, &ids, direction, current, fixed, origin.pointer) {
                    trace!("multi-element resize tick skipped");
                }
            }
        }
        Ok(gesture)
    }

    // --- Updating a linear point ---

    fn on_updating_point(&mut self, gesture: PointGesture, event: Event) -> Result<Vec<Action>, EngineError> {
        let name = event.name();
        match event {
            Event::UpdatePoint { pointer } => {
                self.state = MachineState::from(self.point_tick(gesture, pointer)?);
                Ok(vec![Action::RenderNeeded])
            }
            Event::UpdatePointEnd { pointer } => {
                let gesture = self.point_tick(gesture, pointer)?;
                self.state = MachineState::Idle;
                if gesture.moved { Ok(self.commit()) } else { Ok(vec![Action::RenderNeeded]) }
            }
            _ => Err(self.reject(name)),
        }
    }

    fn point_tick(&mut self, mut gesture: PointGesture, pointer: Point) -> Result<PointGesture, EngineError> {
        let current = self.to_canvas(pointer);
        if current == gesture.previous {
            return Ok(gesture);
        }
        let element = self.element_mut(gesture.id)?;
        resize_linear_point(element, gesture.index, current, gesture.previous)?;
        gesture.previous = current;
        gesture.moved = true;
        Ok(gesture)
    }

    // --- Writing ---

    fn on_writing(&mut self, id: ElementId, event: Event) -> Result<Vec<Action>, EngineError> {
        let name = event.name();
        match event {
            Event::PointerMove { .. } => Ok(Vec::new()),
            Event::Write { text } => {
                let dpr = self.camera.dpr;
                let element = self.store.get_mut(&id).ok_or(EngineError::MissingElement(id))?;
                let ElementData::Text { text: content, font_family, font_size } = &mut element.data else {
                    return Err(EngineError::NotText(id));
                };
                *content = text;
                element.size = measure_text(self.measurer.as_ref(), content, *font_family, *font_size, dpr);
                Ok(self.settled())
            }
            Event::WriteEnd | Event::Cancel => self.end_writing(id),
            _ => Err(self.reject(name)),
        }
    }

    fn end_writing(&mut self, id: ElementId) -> Result<Vec<Action>, EngineError> {
        let element = self.store.get(&id).ok_or(EngineError::MissingElement(id))?;
        let text = element.text();
        if !text.is_none_or(|t| t.trim().is_empty()) {
            let unchanged =
                self.history.current().elements.iter().any(|e| e.id == id && !e.is_deleted() && e.text() == text);
            if unchanged {
                self.state = MachineState::Idle;
                debug!(%id, "text unchanged");
                return Ok(vec![Action::RenderNeeded]);
            }
            return Ok(self.finish_element(id));
        }
        self.state = MachineState::Idle;
        let committed = self.history.current().elements.iter().any(|e| e.id == id);
        if committed {
            self.delete_elements(&[id]);
            return Ok(self.commit());
        }
        self.store.remove(&id);
        debug!(%id, "discarded empty text");
        Ok(vec![Action::RenderNeeded])
    }

    // --- Selecting ---

    fn on_selecting(&mut self, start: Point, band: Element, event: Event) -> Result<Vec<Action>, EngineError> {
        let name = event.name();
        match event {
            Event::Select { pointer } => {
                let band = self.select_tick(start, band, pointer);
                self.state = MachineState::Selecting { start, band: Box::new(band) };
                Ok(vec![Action::RenderNeeded])
            }
            Event::SelectEnd { pointer } => {
                self.select_tick(start, band, pointer);
                self.state = MachineState::Idle;
                Ok(self.settled())
            }
            Event::Cancel => {
                self.state = MachineState::Idle;
                Ok(vec![Action::RenderNeeded])
            }
            _ => Err(self.reject(name)),
        }
    }

    /// Stretch the band to the pointer and select everything it picks up,
    /// whole groups at a time.
    fn select_tick(&mut self, start: Point, mut band: Element, pointer: Point) -> Element {
        let current = self.to_canvas(pointer);
        let bounds = Bounds::from_corners(start, current);
        band.point = Point::new(bounds.min_x, bounds.min_y);
        band.size = Size::new(bounds.width(), bounds.height());
        let hits: HashSet<ElementId> = self
            .store
            .live()
            .filter(|e| intersects(&bounds, &bounding_box(e)))
            .map(|e| e.id)
            .collect();
        let picked = expand_to_groups(&self.store, &hits);
        self.store.select_only(&picked);
        band
    }

    // --- Panning ---

    fn on_panning(&mut self, previous: Point, event: Event) -> Result<Vec<Action>, EngineError> {
        let name = event.name();
        match event {
            Event::Pan { pointer } => {
                self.camera.pan_by(pointer.x - previous.x, pointer.y - previous.y);
                self.state = MachineState::Panning { previous: pointer };
                Ok(vec![Action::RenderNeeded])
            }
            Event::PanEnd { pointer } => {
                self.camera.pan_by(pointer.x - previous.x, pointer.y - previous.y);
                self.state = MachineState::Idle;
                Ok(self.settled())
            }
            Event::Zoom { pointer, factor } => {
                self.camera.zoom_at(pointer, factor, self.config.min_zoom, self.config.max_zoom);
                Ok(vec![Action::RenderNeeded])
            }
            _ => Err(self.reject(name)),
        }
    }

    // --- Clipboard ---

    fn on_clipboard_written(&mut self, cut: bool, event: Event) -> Result<Vec<Action>, EngineError> {
        let name = event.name();
        match event {
            Event::ClipboardWritten => {
                self.state = MachineState::Idle;
                if !cut {
                    return Ok(Vec::new());
                }
                let ids = self.store.selected_ids();
                self.delete_elements(&ids);
                Ok(self.commit())
            }
            Event::ExternalFailed { message } => Ok(self.external_failure(&message)),
            _ => Err(self.reject(name)),
        }
    }

    fn on_pasting(&mut self, at: Point, event: Event) -> Result<Vec<Action>, EngineError> {
        let name = event.name();
        match event {
            Event::ClipboardRead { text } => {
                self.state = MachineState::Idle;
                Ok(self.paste(at, text))
            }
            Event::ExternalFailed { message } => Ok(self.external_failure(&message)),
            _ => Err(self.reject(name)),
        }
    }

    fn paste(&mut self, at: Point, text: String) -> Vec<Action> {
        match parse(&text) {
            ClipboardPayload::Elements(envelope) => {
                let pasted = rekey(&envelope, at, now_ms(), &self.store, &mut self.rng);
                if pasted.is_empty() {
                    return Vec::new();
                }
                debug!(count = pasted.len(), "pasted elements");
                self.files.extend(envelope.files);
                self.store.unselect_all();
                for element in pasted {
                    self.store.insert(element);
                }
                self.commit()
            }
            ClipboardPayload::Text(text) => {
                if text.trim().is_empty() {
                    return Vec::new();
                }
                let dpr = self.camera.dpr;
                let mut element = create_element(
                    Shape::Text,
                    &self.element_options,
                    at,
                    &self.store,
                    dpr,
                    self.measurer.as_ref(),
                    &mut self.rng,
                );
                if let ElementData::Text { text: content, font_family, font_size } = &mut element.data {
                    *content = text;
                    element.size = measure_text(self.measurer.as_ref(), content, *font_family, *font_size, dpr);
                }
                element.point.y = at.y - element.size.height / 2.0;
                element.select();
                let id = element.id;
                self.store.unselect_all();
                self.store.insert(element);
                debug!(%id, "pasted plain text");
                self.commit()
            }
        }
    }

    // --- Images ---

    fn on_loading_image(&mut self, file_id: FileId, event: Event) -> Result<Vec<Action>, EngineError> {
        let name = event.name();
        match event {
            Event::ImageDecoded { file_id: decoded, width, height } if decoded == file_id => {
                self.files.insert(file_id, ImageFile { id: file_id, width, height });
                let thumbnail = thumbnail_size(width, height, self.config.thumbnail_max_px);
                self.pending_image = Some(PendingImage { file_id, size: Size::new(width, height), thumbnail });
                self.tool = Tool::Image;
                self.store.unselect_all();
                self.state = MachineState::Idle;
                debug!(%file_id, width, height, "image ready for placement");
                Ok(self.settled())
            }
            Event::ExternalFailed { message } => Ok(self.external_failure(&message)),
            _ => Err(self.reject(name)),
        }
    }

    // --- Pass-through steps ---

    /// Error-logging step: log, notify, back to idle.
    fn external_failure(&mut self, message: &str) -> Vec<Action> {
        error!(error = %message, state = %self.state.tag(), "external operation failed");
        self.state = MachineState::Idle;
        vec![Action::Notify(message.to_string()), Action::RenderNeeded]
    }

    /// Version released, then persisting.
    fn commit(&mut self) -> Vec<Action> {
        self.history.record(self.version());
        debug!(cursor = self.history.cursor(), versions = self.history.version_count(), "version released");
        self.settled()
    }

    /// Persisting without a new version.
    fn settled(&self) -> Vec<Action> {
        vec![Action::RenderNeeded, Action::Persist(self.persisted_context())]
    }

    // --- Helpers ---

    pub(crate) fn to_canvas(&self, client: Point) -> Point {
        self.camera.client_to_canvas(client)
    }

    fn element_mut(&mut self, id: ElementId) -> Result<&mut Element, EngineError> {
        self.store.get_mut(&id).ok_or(EngineError::MissingElement(id))
    }

    fn single_selected_linear(&self) -> Result<ElementId, EngineError> {
        let selected: Vec<&Element> = self.store.selected().collect();
        match selected.as_slice() {
            [] => Err(EngineError::EmptySelection),
            [only] if only.kind() == ShapeKind::Linear => Ok(only.id),
            [first, ..] => Err(EngineError::NotLinear(first.id)),
        }
    }
}

/// Scratch data of a resize gesture, unpacked from [`MachineState::Resizing`].
#[derive(Debug, Clone)]
struct ResizeGesture {
    direction: Direction,
    fixed: Point,
    origin: ResizeOrigin,
    moved: bool,
}

impl From<ResizeGesture> for MachineState {
    fn from(g: ResizeGesture) -> Self {
        MachineState::Resizing { direction: g.direction, fixed: g.fixed, origin: g.origin, moved: g.moved }
    }
}

/// Scratch data of a point-handle gesture, unpacked from [`MachineState::UpdatingPoint`].
#[derive(Debug, Clone, Copy)]
struct PointGesture {
    id: ElementId,
    index: usize,
    previous: Point,
    moved: bool,
}

impl From<PointGesture> for MachineState {
    fn from(g: PointGesture) -> Self {
        MachineState::UpdatingPoint { id: g.id, index: g.index, previous: g.previous, moved: g.moved }
    }
}

/// Canvas-space size of `text` at `font_size`.
fn measure_text(measurer: &dyn TextMeasurer, text: &str, font_family: FontFamily, font_size: f64, dpr: f64) -> Size {
    measurer
        .measure(&TextMeasureRequest { font_family, font_size, line_height: font_size * LINE_HEIGHT_RATIO, text, dpr })
        .canvas_size(dpr)
}
