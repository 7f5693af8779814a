//! Error types for the map editor core.

use thiserror::Error;

use crate::item::ItemId;

/// Result type alias using [`MapError`].
pub type Result<T> = std::result::Result<T, MapError>;

/// Top-level error type for all editor core operations.
///
/// Every error is local to a single user-triggered operation: the operation
/// that returns it has not mutated any state.
#[derive(Debug, Error)]
pub enum MapError {
    /// A dice expression did not match the dice grammar and is not a number.
    #[error("Invalid dice format: {0}")]
    InvalidDice(String),

    /// An attack was requested while no combatant is acting.
    #[error("A turn must be active to perform an attack")]
    NoActiveTurn,

    /// A required participant was not chosen.
    #[error("No {0} selected")]
    MissingSelection(&'static str),

    /// The referenced item slot does not exist (deleted or never created).
    #[error("Item not found: {0}")]
    NoSuchItem(ItemId),

    /// The item does not take part in turn order.
    #[error("{0} is not a combatant")]
    NotCombatant(ItemId),

    /// Not enough half-action units left for the requested action.
    #[error("Not enough actions: need {needed}, have {available}")]
    InsufficientActions {
        /// Units required.
        needed: u32,
        /// Units remaining.
        available: u32,
    },

    /// A drag asked for more hexes than the active combatant has left.
    #[error("Movement failed: need {needed} spaces, only {available} left")]
    InsufficientMovement {
        /// Hex distance of the attempted move.
        needed: u32,
        /// Movement remaining.
        available: u32,
    },

    /// Overcharge was already used this turn.
    #[error("Overcharge already used this turn")]
    OverchargeSpent,

    /// A placement size was outside the accepted range.
    #[error("Invalid token size: {0}")]
    InvalidSize(f64),

    /// Map document could not be encoded or decoded.
    #[error("Failed to parse map document: {0}")]
    Document(#[from] serde_json::Error),

    /// Config file could not be parsed.
    #[error("Failed to parse config: {0}")]
    Config(#[from] ron::error::SpannedError),

    /// Config could not be written.
    #[error("Failed to write config: {0}")]
    ConfigWrite(#[from] ron::Error),

    /// Reading or writing a file failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
