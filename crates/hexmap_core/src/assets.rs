//! Core-side logic of the asset catalog.
//!
//! Directory walking happens in the host. The core classifies what the host
//! found, prefers hi-res (`8x`) art, derives default sizes from filenames and
//! re-resolves stale paths after a map is loaded.

use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::map_state::MapState;

/// Image extensions accepted as placeable assets.
pub const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "bmp", "gif", "webp", "tiff", "tif"];
/// Document extensions accepted as linked files.
pub const DOCUMENT_EXTENSIONS: &[&str] = &["txt", "md", "json"];

/// Asset category inside a pack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AssetCategory {
    /// Unit and character art.
    Tokens,
    /// Terrain art.
    Tiles,
    /// Anything else.
    Other,
}

impl AssetCategory {
    /// Category for files found under `directory`.
    #[must_use]
    pub fn classify(directory: &str) -> Self {
        let dir = directory.to_lowercase();
        if dir.contains("token") {
            Self::Tokens
        } else if dir.contains("tile") || dir.contains("hex") {
            Self::Tiles
        } else {
            Self::Other
        }
    }
}

/// One file reported by the host's directory walk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetEntry {
    /// Top-level pack the file belongs to.
    pub pack: String,
    /// Directory containing the file.
    pub directory: String,
    /// Full path of the file.
    pub path: String,
}

impl AssetEntry {
    /// Create an entry.
    #[must_use]
    pub fn new(pack: impl Into<String>, directory: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            pack: pack.into(),
            directory: directory.into(),
            path: path.into(),
        }
    }
}

/// Pack name to category to sorted image paths.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetCatalog {
    packs: BTreeMap<String, BTreeMap<AssetCategory, Vec<String>>>,
}

impl AssetCatalog {
    /// Build a catalog from a directory listing.
    ///
    /// Non-image files are skipped. When any path in a category contains
    /// `8x`, only those paths are kept. Packs without images are dropped.
    pub fn from_listing(entries: impl IntoIterator<Item = AssetEntry>) -> Self {
        let mut raw: BTreeMap<String, BTreeMap<AssetCategory, Vec<String>>> = BTreeMap::new();
        for entry in entries {
            if !has_extension(&entry.path, IMAGE_EXTENSIONS) {
                continue;
            }
            raw.entry(entry.pack)
                .or_default()
                .entry(AssetCategory::classify(&entry.directory))
                .or_default()
                .push(entry.path);
        }

        let mut packs = BTreeMap::new();
        for (pack, categories) in raw {
            let mut kept = BTreeMap::new();
            for (category, paths) in categories {
                let hires = paths.iter().any(|p| p.to_lowercase().contains("8x"));
                let mut paths: Vec<String> = if hires {
                    paths.into_iter().filter(|p| p.to_lowercase().contains("8x")).collect()
                } else {
                    paths
                };
                paths.sort();
                if !paths.is_empty() {
                    kept.insert(category, paths);
                }
            }
            if !kept.is_empty() {
                packs.insert(pack, kept);
            }
        }
        debug!(packs = packs.len(), "asset catalog built");
        Self { packs }
    }

    /// Pack names in order.
    pub fn pack_names(&self) -> impl Iterator<Item = &str> {
        self.packs.keys().map(String::as_str)
    }

    /// Paths in one pack category.
    #[must_use]
    pub fn paths(&self, pack: &str, category: AssetCategory) -> &[String] {
        self.packs
            .get(pack)
            .and_then(|categories| categories.get(&category))
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Every placeable path, pack by pack.
    pub fn placeable_paths(&self) -> impl Iterator<Item = &str> {
        self.packs
            .values()
            .flat_map(|categories| categories.values())
            .flatten()
            .map(String::as_str)
    }

    /// Number of packs.
    #[must_use]
    pub fn len(&self) -> usize {
        self.packs.len()
    }

    /// Whether no pack has assets.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.packs.is_empty()
    }
}

/// Default token size from a filename.
///
/// Looks for `size 1/2` or `size 0.5` (half size), then `size<ws><digit>`.
/// Anything else is size 1.
#[must_use]
pub fn default_size_from_filename(path: &str) -> f64 {
    let name = file_name(path).to_lowercase();
    if name.contains("size 1/2") || name.contains("size 0.5") {
        return 0.5;
    }
    name.match_indices("size")
        .find_map(|(at, keyword)| {
            name[at + keyword.len()..]
                .trim_start()
                .chars()
                .next()
                .and_then(|c| c.to_digit(10))
        })
        .map_or(1.0, f64::from)
}

/// Rendering scale used for a token of the given size.
#[must_use]
pub fn display_scale(size: f64) -> f64 {
    if (size - 0.5).abs() < f64::EPSILON {
        0.8
    } else {
        size
    }
}

/// Basename lookup used to repair paths after a map moves between machines.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssetIndex {
    images: HashMap<String, String>,
    documents: HashMap<String, String>,
}

impl AssetIndex {
    /// Empty index.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Index a file by basename. Later files with the same name win.
    pub fn insert(&mut self, path: &str) {
        let name = file_name(path).to_string();
        if has_extension(path, IMAGE_EXTENSIONS) {
            self.images.insert(name, path.to_string());
        } else if has_extension(path, DOCUMENT_EXTENSIONS) {
            self.documents.insert(name, path.to_string());
        }
    }

    /// Replacement for a missing image.
    #[must_use]
    pub fn image(&self, stale: &str) -> Option<&str> {
        self.images.get(file_name(stale)).map(String::as_str)
    }

    /// Replacement for a missing document.
    #[must_use]
    pub fn document(&self, stale: &str) -> Option<&str> {
        self.documents.get(file_name(stale)).map(String::as_str)
    }

    /// Re-point item images, linked files and the background image that no
    /// longer exist. Returns how many references were rewritten.
    pub fn resolve_missing(&self, map: &mut MapState, exists: impl Fn(&str) -> bool) -> usize {
        let mut fixed = 0;
        for item in &mut map.items {
            if !exists(&item.image_path) {
                if let Some(found) = self.image(&item.image_path) {
                    item.image_path = found.to_string();
                    fixed += 1;
                }
            }
            if let Some(linked) = item.linked_file.as_deref().filter(|l| !exists(l)) {
                if let Some(found) = self.document(linked) {
                    item.linked_file = Some(found.to_string());
                    fixed += 1;
                }
            }
        }
        if let Some(background) = map.background_image.as_deref().filter(|b| !exists(b)) {
            if let Some(found) = self.image(background) {
                map.background_image = Some(found.to_string());
                fixed += 1;
            }
        }
        if fixed > 0 {
            debug!(fixed, "resolved missing asset paths");
        }
        fixed
    }
}

impl<S: AsRef<str>> FromIterator<S> for AssetIndex {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut index = Self::new();
        for path in iter {
            index.insert(path.as_ref());
        }
        index
    }
}

fn file_name(path: &str) -> &str {
    // Accept both separators so saved maps from other platforms resolve.
    path.rsplit(['/', '\\']).next().unwrap_or(path)
}

/// Whether `path` ends with one of `extensions` (case-insensitive).
#[must_use]
pub fn has_extension(path: &str, extensions: &[&str]) -> bool {
    Path::new(path)
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| extensions.iter().any(|known| ext.eq_ignore_ascii_case(known)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hex::HexCoord;
    use crate::item::PlacedItem;

    #[test]
    fn test_classify() {
        assert_eq!(AssetCategory::classify("Pack/Mech Tokens/blue"), AssetCategory::Tokens);
        assert_eq!(AssetCategory::classify("Pack/tiles"), AssetCategory::Tiles);
        assert_eq!(AssetCategory::classify("Pack/HEX art"), AssetCategory::Tiles);
        assert_eq!(AssetCategory::classify("Pack/props"), AssetCategory::Other);
    }

    #[test]
    fn test_catalog_prefers_8x() {
        let catalog = AssetCatalog::from_listing([
            AssetEntry::new("Core", "Core/Tokens", "Core/Tokens/b.png"),
            AssetEntry::new("Core", "Core/Tokens", "Core/Tokens/a_8x.png"),
            AssetEntry::new("Core", "Core/Tiles", "Core/Tiles/z.png"),
            AssetEntry::new("Core", "Core/Tiles", "Core/Tiles/y.jpg"),
            AssetEntry::new("Core", "Core/Tiles", "Core/Tiles/readme.txt"),
        ]);
        assert_eq!(catalog.paths("Core", AssetCategory::Tokens), ["Core/Tokens/a_8x.png"]);
        assert_eq!(
            catalog.paths("Core", AssetCategory::Tiles),
            ["Core/Tiles/y.jpg", "Core/Tiles/z.png"]
        );
        assert!(catalog.paths("Core", AssetCategory::Other).is_empty());
        assert_eq!(catalog.placeable_paths().count(), 3);
    }

    #[test]
    fn test_catalog_drops_empty_packs() {
        let catalog = AssetCatalog::from_listing([AssetEntry::new("Docs", "Docs", "Docs/notes.md")]);
        assert!(catalog.is_empty());
    }

    #[test]
    fn test_default_size_from_filename() {
        assert!((default_size_from_filename("a/Everest Size 2.png") - 2.0).abs() < f64::EPSILON);
        assert!((default_size_from_filename("a/drone Size 0.5.png") - 0.5).abs() < f64::EPSILON);
        assert!((default_size_from_filename("drone size 1_2 SIZE 0.5.png") - 0.5).abs() < f64::EPSILON);
        assert!((default_size_from_filename("Size3_boss.png") - 3.0).abs() < f64::EPSILON);
        assert!((default_size_from_filename("sizeable rock.png") - 1.0).abs() < f64::EPSILON);
        assert!((default_size_from_filename("rock.png") - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_display_scale() {
        assert!((display_scale(0.5) - 0.8).abs() < f64::EPSILON);
        assert!((display_scale(1.0) - 1.0).abs() < f64::EPSILON);
        assert!((display_scale(4.0) - 4.0).abs() < f64::EPSILON);
        assert!((display_scale(1.5) - 1.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_resolve_missing_paths() {
        let index: AssetIndex = [
            "/new/tokens/mech.png",
            "/new/tokens/pilot.txt",
            "/new/maps/bg.jpg",
        ]
        .into_iter()
        .collect();

        let mut map = MapState::new();
        let mut item = PlacedItem::new("C:\\old\\tokens\\mech.png", HexCoord::ORIGIN, 1.0);
        item.linked_file = Some("/old/pilot.txt".into());
        map.add_item(item);
        map.add_item(PlacedItem::new("/present/ok.png", HexCoord::ORIGIN, 1.0));
        map.background_image = Some("/old/bg.jpg".into());

        let fixed = index.resolve_missing(&mut map, |p| p.starts_with("/present"));
        assert_eq!(fixed, 3);
        assert_eq!(map.items[0].image_path, "/new/tokens/mech.png");
        assert_eq!(map.items[0].linked_file.as_deref(), Some("/new/tokens/pilot.txt"));
        assert_eq!(map.items[1].image_path, "/present/ok.png");
        assert_eq!(map.background_image.as_deref(), Some("/new/maps/bg.jpg"));
    }
}
