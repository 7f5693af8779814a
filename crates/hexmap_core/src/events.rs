//! Change notification.
//!
//! Mutations mark what they touched instead of redrawing. The host drains the
//! accumulated set once per frame and redraws if anything is pending.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Category of state a mutation touched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Change {
    /// Placed items: positions, attributes, markers, membership.
    Items,
    /// Paint strokes.
    Drawings,
    /// Pan or zoom.
    Camera,
    /// Selection or armed asset.
    Selection,
    /// Hovered item.
    Hover,
    /// Combat session or log.
    Combat,
    /// Grid settings or background.
    Grid,
}

/// Accumulates changes between frames.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangeTracker {
    pending: BTreeSet<Change>,
}

impl ChangeTracker {
    /// Tracker with nothing pending.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a change.
    pub fn mark(&mut self, change: Change) {
        self.pending.insert(change);
    }

    /// Record several changes.
    pub fn mark_all(&mut self, changes: impl IntoIterator<Item = Change>) {
        self.pending.extend(changes);
    }

    /// Whether `change` is pending.
    #[must_use]
    pub fn contains(&self, change: Change) -> bool {
        self.pending.contains(&change)
    }

    /// Whether a redraw is needed.
    #[must_use]
    pub fn is_dirty(&self) -> bool {
        !self.pending.is_empty()
    }

    /// Take everything pending.
    pub fn drain(&mut self) -> BTreeSet<Change> {
        std::mem::take(&mut self.pending)
    }
}
