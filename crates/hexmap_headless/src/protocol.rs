//! JSON protocol for headless editor sessions.
//!
//! The headless runner communicates via JSON lines (one JSON object per line):
//!
//! **Input (stdin or script file):** Commands from the controller
//! **Output (stdout):** Responses, narrated combat lines and frames
//!
//! # Protocol Flow
//!
//! 1. Runner starts, outputs `{"type":"ready","version":"1.0","round":1}`
//! 2. Controller sends commands as JSON lines
//! 3. Runner answers each command with `ack` or `error`, followed by a `log`
//!    response when the command narrated combat events
//! 4. `quit` ends the session with `bye`
//!
//! # Example Session
//!
//! ```text
//! <- {"type":"ready","version":"1.0","round":1}
//! -> {"cmd":"arm","path":"tokens/Atlas.png"}
//! <- {"type":"ack","cmd":"arm"}
//! -> {"cmd":"pointer_down","x":400,"y":300}
//! <- {"type":"ack","cmd":"pointer_down"}
//! -> {"cmd":"start_turn","item":0}
//! <- {"type":"ack","cmd":"start_turn"}
//! <- {"type":"log","lines":["=== Atlas's Turn Begins ==="]}
//! -> {"cmd":"query"}
//! <- {"type":"state","round":1,"active":0,...}
//! ```

use hexmap_core::camera::ZoomDirection;
use hexmap_core::combat::{AttackRequest, DefenseKind, TurnState};
use hexmap_core::editor::Editor;
use hexmap_core::interaction::{PointerButton, Tool};
use hexmap_core::item::{Attribute, Faction, ItemId, ItemKind};
use hexmap_core::render::RenderFrame;
use serde::{Deserialize, Serialize};

/// Protocol version reported in `ready`.
pub const PROTOCOL_VERSION: &str = "1.0";

// ============================================================================
// Input Commands (Controller -> Runner)
// ============================================================================

/// Commands that can be sent to the headless runner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "cmd", rename_all = "snake_case")]
pub enum Command {
    /// Report round, turn and item state.
    Query,
    /// Report the state hash only.
    Hash,
    /// Build and return a render frame.
    Frame,

    /// Start an empty map.
    NewMap,
    /// Load a map document from the map store.
    LoadMap { name: String },
    /// Save the map document to the map store.
    SaveMap { name: String },
    /// Resize the canvas.
    Resize { width: f64, height: f64 },
    /// Set the background image and its pixel size.
    SetBackground {
        path: String,
        #[serde(default)]
        width: Option<f64>,
        #[serde(default)]
        height: Option<f64>,
    },
    /// Shift the grid by a pixel offset.
    SetGridOffset { x: f64, y: f64 },
    /// Remove every paint stroke.
    ClearDrawings,

    /// Pointer pressed at a screen position.
    PointerDown {
        x: f64,
        y: f64,
        #[serde(default)]
        button: PointerButton,
    },
    /// Pointer dragged with a button held.
    PointerDrag { x: f64, y: f64 },
    /// Pointer released.
    PointerUp,
    /// Pointer moved with no button held.
    PointerMove { x: f64, y: f64 },
    /// Pointer left the canvas.
    PointerLeave,
    /// One zoom step.
    Zoom { direction: ZoomDirection },
    /// Switch tool.
    SetTool { tool: Tool },
    /// Arm an asset for placement.
    Arm {
        path: String,
        #[serde(default)]
        kind: ItemKind,
    },
    /// Clear the armed asset.
    Disarm,
    /// Select an item, or clear the selection.
    Select {
        #[serde(default)]
        item: Option<usize>,
    },
    /// Close the prompt, disarm and deselect.
    Escape,
    /// Answer the size prompt.
    ConfirmSize { size: f64 },
    /// Dismiss the size prompt.
    CancelPrompt,

    /// Delete an item.
    Delete { item: usize },
    /// Delete the selected item, if any.
    DeleteSelected,
    /// Toggle the hex barrier of an item.
    ToggleBarrier { item: usize },
    /// Set the barrier radius of an item.
    SetBarrierRadius { item: usize, radius: u32 },
    /// Set the faction of an item.
    SetFaction { item: usize, faction: Faction },
    /// Set or clear the custom name of an item.
    SetName {
        item: usize,
        #[serde(default)]
        name: Option<String>,
    },
    /// Toggle a marker image on an item.
    ToggleMarker { item: usize, marker: String },
    /// Set or clear one combat attribute.
    SetAttribute {
        item: usize,
        attribute: Attribute,
        #[serde(default)]
        value: Option<i32>,
    },
    /// Attach a document to an item, importing stats from text files.
    LinkFile {
        item: usize,
        #[serde(default)]
        path: Option<String>,
    },

    /// Make an item the acting combatant.
    StartTurn { item: usize },
    /// End the current turn.
    EndTurn,
    /// Start the next round now.
    NextRound,
    /// Back to round 1.
    ResetCombat,
    /// Roll which faction goes first.
    FirstFaction,
    /// Spend a quick action.
    QuickAction,
    /// Spend a full action.
    FullAction,
    /// Record a free action.
    FreeAction,
    /// Gain an action once per turn.
    Overcharge,
    /// Add or remove one hex of movement.
    Movement { gain: bool },
    /// Roll an attack.
    Attack {
        attacker: Option<usize>,
        target: Option<usize>,
        damage: String,
        #[serde(default)]
        bonus: i32,
        #[serde(default)]
        defense: DefenseKind,
        #[serde(default)]
        resist: bool,
        #[serde(default)]
        custom_paint_job: bool,
    },
    /// Roll a dice expression.
    Roll { expr: String },

    /// Advance the clock.
    Tick {
        #[serde(default = "default_tick_ms")]
        ms: u64,
    },
    /// End the session.
    Quit,
}

fn default_tick_ms() -> u64 {
    16
}

// ============================================================================
// Output Responses (Runner -> Controller)
// ============================================================================

/// Responses sent from the headless runner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Response {
    /// Runner is ready to accept commands.
    Ready { version: String, round: u32 },

    /// Acknowledgment of a command.
    Ack { cmd: String },

    /// Error processing a command.
    Error {
        message: String,
        cmd: Option<String>,
    },

    /// Narrated combat lines.
    Log { lines: Vec<String> },

    /// Screen-space snapshot.
    Frame { frame: RenderFrame },

    /// Current session state.
    State(SessionState),

    /// State hash for determinism verification.
    StateHash { round: u32, hash: u64 },

    /// Goodbye message before shutdown.
    Bye,
}

// ============================================================================
// State Types
// ============================================================================

/// Round, turn and item summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionState {
    pub round: u32,
    pub active: Option<usize>,
    pub acted: Vec<usize>,
    pub movement_remaining: u32,
    pub actions_remaining: u32,
    pub items: Vec<ItemState>,
    pub strokes: usize,
    pub hash: u64,
}

/// One placed item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemState {
    pub id: usize,
    pub name: String,
    pub path: String,
    pub q: i32,
    pub r: i32,
    pub kind: ItemKind,
    pub faction: Faction,
    pub turn: TurnState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hp: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub structure: Option<i32>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub markers: Vec<String>,
}

impl SessionState {
    /// Summarize an editor.
    pub fn capture(editor: &Editor) -> Self {
        let session = editor.combat().session();
        let budget = session.budget();
        let items = editor
            .map()
            .iter()
            .map(|(id, item)| ItemState {
                id: id.index(),
                name: item.display_name(),
                path: item.image_path.clone(),
                q: item.q,
                r: item.r,
                kind: item.kind,
                faction: item.faction,
                turn: session.state_of(id),
                hp: item.hp,
                structure: item.structure,
                markers: item.markers.clone(),
            })
            .collect();

        Self {
            round: session.round(),
            active: session.active().map(ItemId::index),
            acted: session.acted().iter().map(|id| id.index()).collect(),
            movement_remaining: budget.movement_remaining,
            actions_remaining: budget.actions_remaining,
            items,
            strokes: editor.map().drawings.len(),
            hash: editor.state_hash(),
        }
    }
}

// ============================================================================
// Helpers
// ============================================================================

impl Response {
    /// Create a ready response.
    pub fn ready(round: u32) -> Self {
        Self::Ready {
            version: PROTOCOL_VERSION.to_string(),
            round,
        }
    }

    /// Create an acknowledgment.
    pub fn ack(cmd: &str) -> Self {
        Self::Ack {
            cmd: cmd.to_string(),
        }
    }

    /// Create an error response.
    pub fn error(message: impl Into<String>, cmd: Option<&str>) -> Self {
        Self::Error {
            message: message.into(),
            cmd: cmd.map(String::from),
        }
    }

    /// Serialize to JSON line (with newline).
    pub fn to_json_line(&self) -> String {
        let mut json = serde_json::to_string(self).unwrap_or_else(|e| {
            format!(r#"{{"type":"error","message":"Serialization failed: {e}"}}"#)
        });
        json.push('\n');
        json
    }
}

impl Command {
    /// Parse from a JSON line.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Get command name for acknowledgment.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Query => "query",
            Self::Hash => "hash",
            Self::Frame => "frame",
            Self::NewMap => "new_map",
            Self::LoadMap { .. } => "load_map",
            Self::SaveMap { .. } => "save_map",
            Self::Resize { .. } => "resize",
            Self::SetBackground { .. } => "set_background",
            Self::SetGridOffset { .. } => "set_grid_offset",
            Self::ClearDrawings => "clear_drawings",
            Self::PointerDown { .. } => "pointer_down",
            Self::PointerDrag { .. } => "pointer_drag",
            Self::PointerUp => "pointer_up",
            Self::PointerMove { .. } => "pointer_move",
            Self::PointerLeave => "pointer_leave",
            Self::Zoom { .. } => "zoom",
            Self::SetTool { .. } => "set_tool",
            Self::Arm { .. } => "arm",
            Self::Disarm => "disarm",
            Self::Select { .. } => "select",
            Self::Escape => "escape",
            Self::ConfirmSize { .. } => "confirm_size",
            Self::CancelPrompt => "cancel_prompt",
            Self::Delete { .. } => "delete",
            Self::DeleteSelected => "delete_selected",
            Self::ToggleBarrier { .. } => "toggle_barrier",
            Self::SetBarrierRadius { .. } => "set_barrier_radius",
            Self::SetFaction { .. } => "set_faction",
            Self::SetName { .. } => "set_name",
            Self::ToggleMarker { .. } => "toggle_marker",
            Self::SetAttribute { .. } => "set_attribute",
            Self::LinkFile { .. } => "link_file",
            Self::StartTurn { .. } => "start_turn",
            Self::EndTurn => "end_turn",
            Self::NextRound => "next_round",
            Self::ResetCombat => "reset_combat",
            Self::FirstFaction => "first_faction",
            Self::QuickAction => "quick_action",
            Self::FullAction => "full_action",
            Self::FreeAction => "free_action",
            Self::Overcharge => "overcharge",
            Self::Movement { .. } => "movement",
            Self::Attack { .. } => "attack",
            Self::Roll { .. } => "roll",
            Self::Tick { .. } => "tick",
            Self::Quit => "quit",
        }
    }

    /// Build the core attack request for an `attack` command.
    pub fn attack_request(&self) -> Option<AttackRequest> {
        let Self::Attack {
            attacker,
            target,
            damage,
            bonus,
            defense,
            resist,
            custom_paint_job,
        } = self
        else {
            return None;
        };
        Some(AttackRequest {
            attacker: attacker.map(ItemId),
            target: target.map(ItemId),
            bonus: *bonus,
            damage: damage.clone(),
            defense: *defense,
            resist: *resist,
            custom_paint_job: *custom_paint_job,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_pointer_down_defaults_to_primary() {
        let json = r#"{"cmd":"pointer_down","x":10.0,"y":20.5}"#;
        let cmd = Command::from_json(json).unwrap();
        assert_eq!(
            cmd,
            Command::PointerDown {
                x: 10.0,
                y: 20.5,
                button: PointerButton::Primary
            }
        );
    }

    #[test]
    fn test_parse_attack_command() {
        let json = r#"{"cmd":"attack","attacker":0,"target":1,"damage":"2d6+1","defense":"e_defense"}"#;
        let cmd = Command::from_json(json).unwrap();
        let request = cmd.attack_request().unwrap();
        assert_eq!(request.attacker, Some(ItemId(0)));
        assert_eq!(request.target, Some(ItemId(1)));
        assert_eq!(request.defense, DefenseKind::EDefense);
        assert_eq!(request.bonus, 0);
        assert!(!request.resist);
    }

    #[test]
    fn test_parse_faction_uses_document_names() {
        let json = r#"{"cmd":"set_faction","item":2,"faction":"NPC"}"#;
        let cmd = Command::from_json(json).unwrap();
        assert_eq!(
            cmd,
            Command::SetFaction {
                item: 2,
                faction: Faction::Npc
            }
        );
    }

    #[test]
    fn test_default_tick() {
        let cmd = Command::from_json(r#"{"cmd":"tick"}"#).unwrap();
        assert_eq!(cmd, Command::Tick { ms: 16 });
    }

    #[test]
    fn test_unknown_command_is_rejected() {
        assert!(Command::from_json(r#"{"cmd":"teleport"}"#).is_err());
    }

    #[test]
    fn test_serialize_log_response() {
        let resp = Response::Log {
            lines: vec!["=== Atlas's Turn Begins ===".to_string()],
        };
        let json = resp.to_json_line();
        assert!(json.starts_with(r#"{"type":"log","lines":"#));
        assert!(json.ends_with('\n'));
    }

    #[test]
    fn test_command_names_match_tags() {
        for cmd in [
            Command::PointerUp,
            Command::QuickAction,
            Command::DeleteSelected,
            Command::SetGridOffset { x: 4.0, y: -2.0 },
            Command::Tick { ms: 5 },
        ] {
            let json = serde_json::to_value(&cmd).unwrap();
            assert_eq!(json["cmd"], cmd.name());
        }
    }
}
