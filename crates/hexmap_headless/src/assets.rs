//! Filesystem adapters for the editor's collaborators.
//!
//! The core never touches directories. This module walks token packs into an
//! [`AssetCatalog`], lists marker icons for a [`MarkerCatalog`], builds the
//! basename [`AssetIndex`] used to repair moved maps, and stores map documents
//! as JSON files.

use std::fs;
use std::path::{Path, PathBuf};

use hexmap_core::assets::{has_extension, AssetCatalog, AssetEntry, AssetIndex, IMAGE_EXTENSIONS};
use hexmap_core::map_state::MapState;
use hexmap_core::markers::MarkerCatalog;
use hexmap_core::persistence::{from_json, to_json, MapStore};
use hexmap_core::statblock::is_stat_document;
use tracing::{debug, info, warn};

use crate::error::{HeadlessError, Result};

/// Every file below `dir`, depth first, sorted per directory.
fn walk_files(dir: &Path, out: &mut Vec<PathBuf>) -> std::io::Result<()> {
    let mut entries: Vec<PathBuf> = fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .collect();
    entries.sort();
    for path in entries {
        if path.is_dir() {
            walk_files(&path, out)?;
        } else {
            out.push(path);
        }
    }
    Ok(())
}

fn path_string(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

/// Scan a tokens directory into an asset catalog.
///
/// Each immediate subdirectory of `root` is a pack. Files are categorised by
/// the directory they sit in, relative to `root`.
pub fn scan_asset_packs(root: &Path) -> Result<AssetCatalog> {
    if !root.is_dir() {
        return Err(HeadlessError::FileNotFound(root.to_path_buf()));
    }

    let mut entries = Vec::new();
    for pack in fs::read_dir(root)? {
        let pack = pack?.path();
        if !pack.is_dir() {
            continue;
        }
        let pack_name = pack
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        let mut files = Vec::new();
        walk_files(&pack, &mut files)?;
        for file in files {
            let directory = file
                .parent()
                .and_then(|p| p.strip_prefix(root).ok())
                .map(path_string)
                .unwrap_or_default();
            entries.push(AssetEntry::new(pack_name.clone(), directory, path_string(&file)));
        }
    }

    let catalog = AssetCatalog::from_listing(entries);
    info!(root = %root.display(), packs = catalog.len(), "asset packs scanned");
    Ok(catalog)
}

/// Basename index over every file below `dirs`. Missing directories are skipped.
pub fn build_asset_index<P: AsRef<Path>>(dirs: &[P]) -> AssetIndex {
    let mut files = Vec::new();
    for dir in dirs {
        let dir = dir.as_ref();
        if let Err(e) = walk_files(dir, &mut files) {
            warn!(dir = %dir.display(), error = %e, "asset directory not indexed");
        }
    }
    debug!(files = files.len(), "asset index built");
    files.iter().map(|p| path_string(p)).collect()
}

/// Marker icons listed from one directory at startup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DirectoryMarkers {
    paths: Vec<String>,
}

impl DirectoryMarkers {
    /// List the images directly inside `dir`.
    ///
    /// A missing or unreadable directory yields an empty catalog: turn and
    /// condition markers are then simply not attached.
    pub fn scan(dir: &Path) -> Self {
        let listing = match fs::read_dir(dir) {
            Ok(listing) => listing,
            Err(e) => {
                warn!(dir = %dir.display(), error = %e, "marker directory unavailable");
                return Self::default();
            }
        };
        let mut paths: Vec<String> = listing
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|p| p.is_file())
            .map(|p| path_string(&p))
            .filter(|p| has_extension(p, IMAGE_EXTENSIONS))
            .collect();
        paths.sort();
        debug!(dir = %dir.display(), markers = paths.len(), "markers listed");
        Self { paths }
    }
}

impl MarkerCatalog for DirectoryMarkers {
    fn marker_paths(&self) -> Vec<String> {
        self.paths.clone()
    }
}

/// Text of a linked stat document, when it is one and can be read.
pub fn read_stat_document(path: &str) -> Option<String> {
    if !is_stat_document(path) {
        return None;
    }
    match fs::read_to_string(path) {
        Ok(text) => Some(text),
        Err(e) => {
            warn!(path, error = %e, "stat document unreadable");
            None
        }
    }
}

/// Map documents stored as JSON files under one directory.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    root: PathBuf,
}

impl JsonFileStore {
    /// Store rooted at `root`. The directory is created on first save.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// File path for a document name. Names without an extension get `.json`.
    pub fn path_for(&self, name: &str) -> PathBuf {
        let path = self.root.join(name);
        if path.extension().is_some() {
            path
        } else {
            path.with_extension("json")
        }
    }
}

impl MapStore for JsonFileStore {
    fn save(&mut self, name: &str, map: &MapState) -> hexmap_core::Result<()> {
        let path = self.path_for(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, to_json(map)?)?;
        info!(path = %path.display(), items = map.len(), "map saved");
        Ok(())
    }

    fn load(&self, name: &str) -> hexmap_core::Result<MapState> {
        let path = self.path_for(name);
        let text = fs::read_to_string(&path)?;
        let map = from_json(&text)?;
        info!(path = %path.display(), items = map.len(), "map loaded");
        Ok(map)
    }
}
