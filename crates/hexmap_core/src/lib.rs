//! # Hexmap Core
//!
//! Battle-map editor core: a hex grid, a camera, a map document of placed
//! images and paint strokes, and a combat tracker for turn order, action
//! economy and attack resolution.
//!
//! This crate contains **only** editor logic:
//! - No rendering (a [`render::RenderFrame`] describes what to draw)
//! - No directory scanning (collaborators supply asset and marker listings)
//! - No ambient randomness (dice draw through [`dice::RollSource`])
//!
//! ## Crate Structure
//!
//! - [`hex`] - Axial coordinates and pixel conversion
//! - [`footprint`] - Multi-hex footprints and barriers
//! - [`dice`] - Dice notation parsing and evaluation
//! - [`map_state`] - The map document
//! - [`camera`] - Pan and zoom
//! - [`combat`] - Rounds, turns, attacks and damage
//! - [`interaction`] - Pointer routing
//! - [`editor`] - Everything wired together

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

pub mod assets;
pub mod camera;
pub mod combat;
pub mod config;
pub mod dice;
pub mod editor;
pub mod error;
pub mod events;
pub mod footprint;
pub mod hex;
pub mod interaction;
pub mod item;
pub mod map_state;
pub mod markers;
pub mod math;
pub mod persistence;
pub mod render;
pub mod scheduler;
pub mod statblock;

pub use error::{MapError, Result};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::camera::{CameraSettings, Viewport, ZoomDirection};
    pub use crate::combat::{
        AttackOutcome, AttackReport, AttackRequest, CombatController, CombatEvent, DefenseKind,
        TurnState,
    };
    pub use crate::config::{AppMode, EditorConfig};
    pub use crate::dice::{DiceExpr, DiceSpec, RngRolls, RollOutcome, RollSource, ScriptedRolls};
    pub use crate::editor::Editor;
    pub use crate::error::{MapError, Result};
    pub use crate::events::{Change, ChangeTracker};
    pub use crate::hex::{HexCoord, HexGrid, HexOrientation};
    pub use crate::interaction::{ArmedAsset, InteractionRouter, PointerButton, PressOutcome, Tool};
    pub use crate::item::{Attribute, Faction, ItemId, ItemKind, PlacedItem};
    pub use crate::map_state::{MapState, Stroke};
    pub use crate::markers::{MarkerCatalog, StaticMarkers};
    pub use crate::math::{Fixed, Point};
    pub use crate::persistence::{MapStore, MemoryStore};
    pub use crate::render::RenderFrame;
}
