//! Determinism testing utilities.
//!
//! Provides a harness for verifying that an editor session
//! produces identical results given identical inputs.
//!
//! # Testing Strategy
//!
//! Replaying a saved command script must land on the same map and combat
//! state every time. Sources of non-determinism include:
//!
//! - **Dice**: every roll goes through an injected
//!   [`hexmap_core::dice::RollSource`]; scripts use seeded or scripted sources.
//!
//! - **HashMap iteration order**: session state that is hashed or iterated
//!   (acted set, faction picks) uses ordered collections.
//!
//! - **Float drift in dice totals**: modifiers and totals are fixed-point.
//!
//! # Test Levels
//!
//! 1. **Unit tests**: individual operations (turns, attacks, drags)
//! 2. **Property tests**: random scripts must still replay identically
//! 3. **Integration tests**: full sessions driven through the headless runner

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use hexmap_core::camera::ZoomDirection;
use hexmap_core::combat::{AttackRequest, DefenseKind};
use hexmap_core::editor::Editor;
use hexmap_core::hex::HexCoord;
use hexmap_core::interaction::{ArmedAsset, PointerButton};
use hexmap_core::item::ItemId;
use hexmap_core::map_state::MapState;
use hexmap_core::math::Point;
use hexmap_core::persistence::{from_json, to_json};
use tracing::debug;

/// Result of a determinism test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeterminismResult {
    /// Whether all runs produced identical results.
    pub is_deterministic: bool,
    /// Hashes from each run.
    pub hashes: Vec<u64>,
    /// Number of script steps replayed per run.
    pub steps: usize,
}

impl DeterminismResult {
    /// Get all unique hashes (should be 1 for a deterministic session).
    #[must_use]
    pub fn unique_hashes(&self) -> Vec<u64> {
        let mut unique: Vec<u64> = self.hashes.clone();
        unique.sort_unstable();
        unique.dedup();
        unique
    }

    /// Assert that every run matched, with a detailed error message.
    ///
    /// # Panics
    ///
    /// Panics if the runs produced different hashes.
    pub fn assert_deterministic(&self) {
        if !self.is_deterministic {
            let unique = self.unique_hashes();
            panic!(
                "Editor session is non-deterministic!\n\
                 Runs: {}\n\
                 Steps: {}\n\
                 Unique hashes: {} (expected 1)\n\
                 All hashes: {:?}",
                self.hashes.len(),
                self.steps,
                unique.len(),
                self.hashes
            );
        }
    }
}

/// Replay a script several times from fresh state and compare final hashes.
///
/// # Example
///
/// ```ignore
/// use hexmap_test_utils::determinism::{apply_step, verify_determinism};
///
/// let result = verify_determinism(
///     3,
///     &script,
///     || seeded_editor(7),
///     apply_step,
///     Editor::state_hash,
/// );
/// result.assert_deterministic();
/// ```
pub fn verify_determinism<S, C, Setup, Apply, HashFn>(
    runs: usize,
    script: &[C],
    setup: Setup,
    apply: Apply,
    hash: HashFn,
) -> DeterminismResult
where
    Setup: Fn() -> S,
    Apply: Fn(&mut S, &C),
    HashFn: Fn(&S) -> u64,
{
    let mut hashes = Vec::with_capacity(runs);

    for run in 0..runs {
        let mut state = setup();
        for step in script {
            apply(&mut state, step);
        }
        let final_hash = hash(&state);
        debug!(run, hash = final_hash, "determinism run finished");
        hashes.push(final_hash);
    }

    let is_deterministic = hashes.windows(2).all(|w| w[0] == w[1]);

    DeterminismResult {
        is_deterministic,
        hashes,
        steps: script.len(),
    }
}

/// Replay an editor script twice and compare [`Editor::state_hash`].
pub fn verify_editor_determinism<F>(setup_fn: F, script: &[EditorStep]) -> bool
where
    F: Fn() -> Editor,
{
    verify_determinism(2, script, setup_fn, apply_step, Editor::state_hash).is_deterministic
}

/// Replay a script on two sessions side by side, finding the first step
/// after which their hashes differ.
///
/// # Returns
///
/// `None` if the sessions agree throughout, `Some(0)` if they differ before
/// any step, `Some(n)` if they diverge after step `n`.
pub fn find_first_divergence<F>(setup_fn: F, script: &[EditorStep]) -> Option<usize>
where
    F: Fn() -> Editor,
{
    let mut first = setup_fn();
    let mut second = setup_fn();

    if first.state_hash() != second.state_hash() {
        return Some(0);
    }

    for (index, step) in script.iter().enumerate() {
        apply_step(&mut first, step);
        apply_step(&mut second, step);
        if first.state_hash() != second.state_hash() {
            return Some(index + 1);
        }
    }

    None
}

/// Verify that a map survives a document round trip exactly.
pub fn verify_document_round_trip(map: &MapState) -> bool {
    let Ok(text) = to_json(map) else {
        return false;
    };
    let Ok(restored) = from_json(&text) else {
        return false;
    };
    restored == *map && to_json(&restored).is_ok_and(|again| again == text)
}

/// Compute a simple hash for any hashable value.
pub fn compute_hash<T: Hash>(value: &T) -> u64 {
    let mut hasher = DefaultHasher::new();
    value.hash(&mut hasher);
    hasher.finish()
}

/// One scripted editor input.
#[derive(Debug, Clone, PartialEq)]
pub enum EditorStep {
    /// Arm a token and click its hex.
    Place {
        /// Image path.
        path: String,
        /// Target hex.
        hex: HexCoord,
    },
    /// Press on `from`, drag to `to`, release.
    Drag {
        /// Start hex.
        from: HexCoord,
        /// End hex.
        to: HexCoord,
    },
    /// Start the turn of an item slot.
    StartTurn(usize),
    /// End the current turn.
    EndTurn,
    /// Spend a quick action.
    QuickAction,
    /// Spend a full action.
    FullAction,
    /// Use overcharge.
    Overcharge,
    /// Attack between two item slots.
    Attack {
        /// Attacker slot.
        attacker: usize,
        /// Target slot.
        target: usize,
        /// Damage expression.
        damage: String,
    },
    /// Roll a dice expression.
    Roll(String),
    /// One zoom step.
    Zoom(ZoomDirection),
    /// Advance the clock.
    Tick(u64),
    /// Delete an item slot.
    Delete(usize),
}

/// Screen point at the center of `hex` in the editor's current view.
#[must_use]
pub fn screen_of(editor: &Editor, hex: HexCoord) -> Point {
    let grid = editor.grid();
    let world = editor.map().hex_to_world(&grid, hex);
    editor.viewport().world_to_screen(world)
}

/// Apply one step. Rejected operations are part of the replay and are
/// ignored here.
pub fn apply_step(editor: &mut Editor, step: &EditorStep) {
    match step {
        EditorStep::Place { path, hex } => {
            editor.arm(ArmedAsset::token(path.clone()));
            let screen = screen_of(editor, *hex);
            editor.pointer_down(screen, PointerButton::Primary);
            let _ = editor.pointer_up();
            editor.disarm();
        }
        EditorStep::Drag { from, to } => {
            let start = screen_of(editor, *from);
            let end = screen_of(editor, *to);
            editor.pointer_down(start, PointerButton::Primary);
            editor.pointer_drag(end);
            let _ = editor.pointer_up();
        }
        EditorStep::StartTurn(slot) => {
            let _ = editor.start_turn(ItemId(*slot));
        }
        EditorStep::EndTurn => {
            editor.end_turn();
        }
        EditorStep::QuickAction => {
            let _ = editor.use_quick_action();
        }
        EditorStep::FullAction => {
            let _ = editor.use_full_action();
        }
        EditorStep::Overcharge => {
            let _ = editor.use_overcharge();
        }
        EditorStep::Attack {
            attacker,
            target,
            damage,
        } => {
            let request = AttackRequest::new(ItemId(*attacker), ItemId(*target), damage.clone())
                .with_defense(DefenseKind::Evasion);
            let _ = editor.attack(&request);
        }
        EditorStep::Roll(expr) => {
            let _ = editor.roll_dice(expr);
        }
        EditorStep::Zoom(direction) => {
            editor.zoom(*direction);
        }
        EditorStep::Tick(ms) => editor.tick(*ms),
        EditorStep::Delete(slot) => {
            let _ = editor.delete_item(ItemId(*slot));
        }
    }
    editor.drain_log();
}
