//! Map documents and the persistence port.
//!
//! A map document is the flat JSON record of a [`MapState`]. Every key is
//! optional on load; missing keys take the defaults of a new map.

use std::collections::HashMap;

use tracing::{debug, warn};

use crate::error::{MapError, Result};
use crate::map_state::MapState;

/// Encode a map as pretty JSON.
///
/// # Errors
///
/// Returns [`MapError::Document`] if encoding fails.
pub fn to_json(map: &MapState) -> Result<String> {
    Ok(serde_json::to_string_pretty(map)?)
}

/// Decode a map document.
///
/// # Errors
///
/// Returns [`MapError::Document`] for malformed JSON or mistyped keys.
pub fn from_json(text: &str) -> Result<MapState> {
    let map: MapState = serde_json::from_str(text)?;
    debug!(items = map.len(), strokes = map.drawings.len(), "map document decoded");
    Ok(map)
}

/// Named storage for map documents.
pub trait MapStore {
    /// Store `map` under `name`, replacing any previous document.
    ///
    /// # Errors
    ///
    /// Implementations report encoding and storage failures.
    fn save(&mut self, name: &str, map: &MapState) -> Result<()>;

    /// Load the document stored under `name`.
    ///
    /// # Errors
    ///
    /// Implementations report missing documents and decoding failures.
    fn load(&self, name: &str) -> Result<MapState>;
}

/// In-process store keeping encoded documents.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    documents: HashMap<String, String>,
}

impl MemoryStore {
    /// Empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Encoded document under `name`.
    #[must_use]
    pub fn raw(&self, name: &str) -> Option<&str> {
        self.documents.get(name).map(String::as_str)
    }

    /// Store an already-encoded document.
    pub fn insert_raw(&mut self, name: impl Into<String>, text: impl Into<String>) {
        self.documents.insert(name.into(), text.into());
    }
}

impl MapStore for MemoryStore {
    fn save(&mut self, name: &str, map: &MapState) -> Result<()> {
        self.documents.insert(name.to_string(), to_json(map)?);
        Ok(())
    }

    fn load(&self, name: &str) -> Result<MapState> {
        match self.documents.get(name) {
            Some(text) => from_json(text),
            None => {
                warn!(name, "no stored map");
                Err(MapError::Io(std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    format!("no map named {name}"),
                )))
            }
        }
    }
}
