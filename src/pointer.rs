//! Raw input routing: pointer, wheel and keyboard input mapped to machine events.
//!
//! Hosts that only see device input call these instead of building
//! [`Event`]s themselves. Hit testing decides what a primary press means in
//! idle; every other state maps presses, moves and releases onto its own
//! gesture events. Input that means nothing in the current state is dropped.

#[cfg(test)]
#[path = "pointer_test.rs"]
mod pointer_test;

use crate::camera::Point;
use crate::consts::WHEEL_ZOOM_RATE;
use crate::element::{Element, ShapeKind};
use crate::engine::{Action, EngineCore};
use crate::error::EngineError;
use crate::hit::{Hit, HitPart, hit_test};
use crate::input::{Button, Event, Key, MachineState, Modifiers, Tool, WheelDelta};

impl EngineCore {
    /// # Errors
    ///
    /// Propagates the error of the routed event.
    pub fn on_pointer_down(&mut self, client: Point, button: Button, modifiers: Modifiers) -> Result<Vec<Action>, EngineError> {
        match button {
            Button::Middle if self.state == MachineState::Idle => self.handle(Event::PanStart { pointer: client }),
            Button::Primary => match self.state {
                MachineState::Connecting { .. } => self.handle(Event::Connect { pointer: client }),
                MachineState::Idle => self.press_idle(client, modifiers),
                _ => Ok(Vec::new()),
            },
            _ => Ok(Vec::new()),
        }
    }

    fn press_idle(&mut self, client: Point, modifiers: Modifiers) -> Result<Vec<Action>, EngineError> {
        if self.tool != Tool::Selection {
            return self.handle(Event::DrawStart { pointer: client });
        }
        if modifiers.alt && self.extends_line() {
            return self.handle(Event::ConnectStart { pointer: client });
        }
        match hit_test(self.to_canvas(client), &self.store, &self.camera) {
            Some(Hit { part: HitPart::ResizeHandle(direction), .. }) => {
                self.handle(Event::ResizeStart { pointer: client, direction })
            }
            Some(Hit { part: HitPart::LinearPoint(index), .. }) => {
                self.handle(Event::UpdatePointStart { pointer: client, index })
            }
            Some(Hit { element_id, part: HitPart::Body }) => {
                let mut actions = Vec::new();
                if !self.store.get(&element_id).is_some_and(Element::is_selected) {
                    actions.extend(self.handle(Event::SelectElement { id: element_id, additive: modifiers.shift })?);
                }
                actions.extend(self.handle(Event::DragStart { pointer: client })?);
                Ok(actions)
            }
            None => self.handle(Event::SelectStart { pointer: client }),
        }
    }

    /// A single linear element is selected.
    fn extends_line(&self) -> bool {
        let mut selected = self.store.selected();
        matches!((selected.next(), selected.next()), (Some(only), None) if only.kind() == ShapeKind::Linear)
    }

    /// # Errors
    ///
    /// Propagates the error of the routed event.
    pub fn on_pointer_move(&mut self, client: Point, _modifiers: Modifiers) -> Result<Vec<Action>, EngineError> {
        let pointer = client;
        let event = match self.state {
            MachineState::Idle | MachineState::Connecting { .. } | MachineState::Writing { .. } => {
                Event::PointerMove { pointer }
            }
            MachineState::Drawing { .. } => Event::Draw { pointer },
            MachineState::Dragging { .. } => Event::Drag { pointer },
            MachineState::Resizing { .. } => Event::Resize { pointer },
            MachineState::UpdatingPoint { .. } => Event::UpdatePoint { pointer },
            MachineState::Selecting { .. } => Event::Select { pointer },
            MachineState::Panning { .. } => Event::Pan { pointer },
            _ => {
                self.pointer = client;
                return Ok(Vec::new());
            }
        };
        self.handle(event)
    }

    /// # Errors
    ///
    /// Propagates the error of the routed event.
    pub fn on_pointer_up(&mut self, client: Point, _button: Button, _modifiers: Modifiers) -> Result<Vec<Action>, EngineError> {
        let pointer = client;
        let event = match self.state {
            MachineState::Drawing { .. } => Event::DrawEnd { pointer },
            MachineState::Dragging { .. } => Event::DragEnd { pointer },
            MachineState::Resizing { .. } => Event::ResizeEnd { pointer },
            MachineState::UpdatingPoint { .. } => Event::UpdatePointEnd { pointer },
            MachineState::Selecting { .. } => Event::SelectEnd { pointer },
            MachineState::Panning { .. } => Event::PanEnd { pointer },
            _ => return Ok(Vec::new()),
        };
        self.handle(event)
    }

    /// Command-wheel zooms about the pointer; a plain wheel scrolls the view.
    ///
    /// # Errors
    ///
    /// Propagates the error of the routed event.
    pub fn on_wheel(&mut self, client: Point, delta: WheelDelta, modifiers: Modifiers) -> Result<Vec<Action>, EngineError> {
        let idle = self.state == MachineState::Idle;
        if modifiers.command() {
            if !idle && !matches!(self.state, MachineState::Panning { .. }) {
                return Ok(Vec::new());
            }
            let factor = (-delta.dy * WHEEL_ZOOM_RATE).exp();
            return self.handle(Event::Zoom { pointer: client, factor });
        }
        if !idle {
            return Ok(Vec::new());
        }
        self.camera.pan_by(-delta.dx, -delta.dy);
        Ok(vec![Action::RenderNeeded, Action::Persist(self.persisted_context())])
    }

    /// # Errors
    ///
    /// Propagates the error of the routed event.
    pub fn on_key_down(&mut self, key: &Key, modifiers: Modifiers) -> Result<Vec<Action>, EngineError> {
        match self.shortcut(key, modifiers) {
            Some(event) => self.handle(event),
            None => Ok(Vec::new()),
        }
    }

    fn shortcut(&self, key: &Key, modifiers: Modifiers) -> Option<Event> {
        let name = key.0.as_str();
        match (&self.state, name) {
            (MachineState::Writing { .. }, "Escape") => return Some(Event::WriteEnd),
            (MachineState::Connecting { .. }, "Escape" | "Enter")
            | (MachineState::Drawing { .. } | MachineState::Selecting { .. } | MachineState::Idle, "Escape") => {
                return Some(Event::Cancel);
            }
            (MachineState::Idle, _) => {}
            _ => return None,
        }
        if matches!(name, "Delete" | "Backspace") {
            return Some(Event::Delete);
        }
        if !modifiers.command() {
            return None;
        }
        match name.to_ascii_lowercase().as_str() {
            "z" if modifiers.shift => Some(Event::Redo),
            "z" => Some(Event::Undo),
            "y" => Some(Event::Redo),
            "c" => Some(Event::Copy),
            "x" => Some(Event::Cut),
            "v" => Some(Event::Paste { pointer: self.pointer }),
            "g" if modifiers.shift => Some(Event::Ungroup),
            "g" => Some(Event::Group),
            "a" => Some(Event::SelectAll),
            _ => None,
        }
    }
}
