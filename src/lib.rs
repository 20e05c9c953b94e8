//! Interaction core for a hand-drawn-style whiteboard.
//!
//! The crate owns everything between raw input and a redraw: a state machine
//! that turns pointer, keyboard and collaborator events into element
//! mutations, the geometry used for hit testing and resizing, undo/redo
//! history, grouping, clipboard envelopes and persistence of the session.
//! Rendering, the OS clipboard, image decoding and text measurement are
//! collaborators behind traits; the host supplies them and carries out the
//! [`engine::Action`]s the machine returns.
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`engine`] | The state machine, [`engine::EngineCore`] |
//! | [`pointer`] | Raw pointer/wheel/key routing onto machine events |
//! | [`session`] | Engine wired to its collaborators |
//! | [`input`] | Tools, events and machine states |
//! | [`element`] | Element model and the element arena |
//! | [`factory`] | Element creation and seed allocation |
//! | [`geometry`] | Bounding boxes, intersection, closeness |
//! | [`resize`] | Handle directions and the resize engine |
//! | [`hit`] | Hit testing of bodies and handles |
//! | [`history`] | Linear undo/redo versions |
//! | [`group`] | Grouping and group-aware selection |
//! | [`clipboard`] | Clipboard envelope and paste re-keying |
//! | [`camera`] | Pan/zoom camera and coordinate conversions |
//! | [`collab`] | Collaborator traits and in-memory implementations |
//! | [`persistence`] | Persisted context, debouncing, file store |
//! | [`config`] | Environment-driven session configuration |
//! | [`error`] | Error types |
//! | [`consts`] | Shared numeric constants |

pub mod camera;
pub mod clipboard;
pub mod collab;
pub mod config;
pub mod consts;
pub mod element;
pub mod engine;
pub mod error;
pub mod factory;
pub mod geometry;
pub mod group;
pub mod history;
pub mod hit;
pub mod input;
pub mod persistence;
pub mod pointer;
pub mod resize;
pub mod session;
