//! Condition markers.
//!
//! The core never lists directories itself. A [`MarkerCatalog`] supplies the
//! marker image paths and the core matches them by filename.

use std::path::Path;

/// Filename keyword of the marker attached while a combatant is acting.
pub const TURN_MARKER: &str = "turn";
/// Filename keyword of the glancing-blow condition.
pub const IMPAIRED_MARKER: &str = "impaired";
/// Filename keyword of the direct-hit condition.
pub const STUNNED_MARKER: &str = "stunned";

/// Source of marker image references.
pub trait MarkerCatalog {
    /// Every marker image path, in listing order.
    fn marker_paths(&self) -> Vec<String>;

    /// First marker whose filename contains `keyword`, case-insensitively.
    fn find_marker(&self, keyword: &str) -> Option<String> {
        let keyword = keyword.to_lowercase();
        self.marker_paths()
            .into_iter()
            .find(|path| file_name(path).to_lowercase().contains(&keyword))
    }

    /// The marker used to flag the acting combatant.
    fn turn_marker(&self) -> Option<String> {
        self.marker_paths().into_iter().find(|path| is_turn_marker(path))
    }
}

/// Marker catalog over a fixed list of paths.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StaticMarkers {
    paths: Vec<String>,
}

impl StaticMarkers {
    /// Catalog over the given paths.
    #[must_use]
    pub fn new<I, S>(paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            paths: paths.into_iter().map(Into::into).collect(),
        }
    }

    /// Catalog with no markers.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }
}

impl MarkerCatalog for StaticMarkers {
    fn marker_paths(&self) -> Vec<String> {
        self.paths.clone()
    }
}

/// Whether `path` names a turn marker (`turn.<ext>`, any case).
#[must_use]
pub fn is_turn_marker(path: &str) -> bool {
    let name = file_name(path);
    let stem = name.split('.').next().unwrap_or(name);
    stem.eq_ignore_ascii_case(TURN_MARKER)
}

fn file_name(path: &str) -> &str {
    Path::new(path)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or(path)
}
