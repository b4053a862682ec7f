//! JSON snapshots of raw payloads and full profiles, and GeoJSON map files.
//!
//! File names derive from the address, so re-running an address overwrites
//! its previous outputs.

use std::path::{Path, PathBuf};

use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::map::venue_map;
use crate::profile::{RawSnapshot, VenueProfile};

/// Errors writing or reading exports.
#[derive(Debug, Error)]
pub enum ExportError {
    /// Filesystem failure.
    #[error("IO error on {path}: {source}")]
    Io {
        /// File or directory involved.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// Serialization or deserialization failure.
    #[error("JSON error on {path}: {source}")]
    Json {
        /// File involved.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: serde_json::Error,
    },
}

/// Output file paths for one address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputLabels {
    /// Full profile JSON.
    pub profile: PathBuf,
    /// Raw venue and menu payloads.
    pub raw: PathBuf,
    /// GeoJSON map data.
    pub map: PathBuf,
}

impl OutputLabels {
    /// Paths under `dir` named after `address`.
    #[must_use]
    pub fn for_address(dir: &Path, address: &str) -> Self {
        let stem = file_stem(address);
        Self {
            profile: dir.join(format!("{stem}.json")),
            raw: dir.join(format!("{stem}.raw.json")),
            map: dir.join(format!("{stem}.geojson")),
        }
    }
}

/// Lower-cases `address` and collapses every run of other characters
/// into a single underscore.
fn file_stem(address: &str) -> String {
    let mut stem = String::with_capacity(address.len());
    for c in address.chars() {
        if c.is_ascii_alphanumeric() {
            stem.push(c.to_ascii_lowercase());
        } else if !stem.is_empty() && !stem.ends_with('_') {
            stem.push('_');
        }
    }
    let stem = stem.trim_end_matches('_');
    if stem.is_empty() {
        "profile".to_string()
    } else {
        stem.to_string()
    }
}

/// Writes the profile, its raw payloads and its map data.
///
/// # Errors
///
/// Returns [`ExportError`] if the directory cannot be created or a file
/// cannot be written.
pub fn write_profile(dir: &Path, profile: &VenueProfile) -> Result<OutputLabels, ExportError> {
    std::fs::create_dir_all(dir).map_err(|source| ExportError::Io {
        path: dir.to_path_buf(),
        source,
    })?;

    let labels = OutputLabels::for_address(dir, &profile.address);
    write_json(&labels.profile, profile)?;
    write_json(&labels.raw, &profile.raw)?;
    write_json(&labels.map, &venue_map(profile))?;

    log::info!(
        "Wrote {}, {} and {}",
        labels.profile.display(),
        labels.raw.display(),
        labels.map.display()
    );
    Ok(labels)
}

/// Reads a profile written by [`write_profile`].
///
/// # Errors
///
/// Returns [`ExportError`] if the file cannot be read or parsed.
pub fn read_profile(path: &Path) -> Result<VenueProfile, ExportError> {
    read_json(path)
}

/// Reads raw payloads written by [`write_profile`].
///
/// # Errors
///
/// Returns [`ExportError`] if the file cannot be read or parsed.
pub fn read_raw(path: &Path) -> Result<RawSnapshot, ExportError> {
    read_json(path)
}

fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<(), ExportError> {
    let json = serde_json::to_string_pretty(value).map_err(|source| ExportError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    std::fs::write(path, json).map_err(|source| ExportError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, ExportError> {
    let text = std::fs::read_to_string(path).map_err(|source| ExportError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&text).map_err(|source| ExportError::Json {
        path: path.to_path_buf(),
        source,
    })
}
