//! Headless driver for the hex map editor.
//!
//! Runs an [`hexmap_core::editor::Editor`] without a window, controlled by
//! JSON commands on stdin, with responses on stdout. This enables:
//!
//! - **Scripted sessions**: replay a command file and compare state hashes
//! - **CI verification**: check that seeded combat replays identically
//! - **Map checks**: load a saved document and report what it contains
//!
//! It also hosts the filesystem side of the editor's collaborators: token
//! pack scanning, marker directory listing and the JSON map store.
//!
//! # Protocol
//!
//! Communication uses JSON lines (one JSON object per line):
//!
//! - **stdin**: Commands (`arm`, `pointer_down`, `start_turn`, `attack`, ...)
//! - **stdout**: Responses (`ack`, `log`, `state`, `frame`, ...)
//! - **stderr**: Diagnostics
//!
//! See the [`protocol`] module for the full command/response list.
//!
//! # Example
//!
//! ```bash
//! # Run interactively
//! echo '{"cmd":"roll","expr":"2d6+1"}' | cargo run -p hexmap_headless
//!
//! # Replay a script twice and compare hashes
//! cargo run -p hexmap_headless -- --seed 7 replay --script skirmish.jsonl --verify
//!
//! # Summarise a saved map
//! cargo run -p hexmap_headless -- validate --map maps/skirmish.json
//! ```

pub mod assets;
pub mod error;
pub mod protocol;
pub mod runner;
pub mod script;
pub mod validate;

pub use assets::{build_asset_index, scan_asset_packs, DirectoryMarkers, JsonFileStore};
pub use error::{HeadlessError, Result};
pub use protocol::{Command, Response, SessionState};
pub use runner::{HeadlessConfig, HeadlessRunner};
pub use script::{verify_script, ReplayOutcome, Script};
pub use validate::{validate_map, MapReport};
