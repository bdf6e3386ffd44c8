//! Uploaded package inspection.
//!
//! An adventure package is a zip archive carrying a `game_data.json`
//! descriptor at its root. Inspection extracts the declared name, versions,
//! and description, and tries to locate a representative thumbnail image.
//! A missing thumbnail is a normal outcome, never an error.

use std::io::{Cursor, Read};

use serde::Deserialize;

/// Name of the metadata descriptor entry at the archive root.
pub const METADATA_ENTRY: &str = "game_data.json";

/// Default content version when the descriptor omits one.
pub const DEFAULT_GAME_VERSION: &str = "1.0.0";

/// Default builder compatibility version when the descriptor omits one.
pub const DEFAULT_BUILDER_VERSION: &str = "Unknown";

/// Basenames (without extension) conventionally used for thumbnails.
const THUMBNAIL_STEMS: &[&str] = &["thumbnail", "cover", "thumb"];

/// Image extensions accepted for thumbnails.
const THUMBNAIL_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "webp"];

/// Errors raised while inspecting an uploaded package.
#[derive(Debug, thiserror::Error)]
pub enum PackageError {
    /// The upload is not a readable zip archive.
    #[error("uploaded file is not a valid zip archive")]
    MalformedPackage,

    /// The archive has no root-level `game_data.json`.
    #[error("missing '{METADATA_ENTRY}' inside the zip file")]
    MissingMetadata,

    /// The descriptor exists but is not parseable JSON.
    #[error("could not parse '{METADATA_ENTRY}': {0}")]
    InvalidMetadata(String),

    /// The descriptor lacks the mandatory `game_info.name` field.
    #[error("adventure 'name' not found in '{METADATA_ENTRY}'")]
    MissingName,
}

/// A thumbnail image extracted from the archive.
#[derive(Debug, Clone)]
pub struct Thumbnail {
    /// The archive entry the bytes came from.
    pub entry_name: String,
    /// Extension to persist the thumbnail under (lowercase, no dot).
    pub extension: String,
    pub bytes: Vec<u8>,
}

/// Metadata declared by an adventure package.
#[derive(Debug, Clone)]
pub struct PackageMetadata {
    pub name: String,
    pub description: Option<String>,
    pub game_version: String,
    pub builder_version: String,
    pub thumbnail: Option<Thumbnail>,
}

/// Wire shape of the descriptor file.
#[derive(Debug, Deserialize)]
struct GameData {
    #[serde(default)]
    game_info: GameInfo,
}

#[derive(Debug, Default, Deserialize)]
struct GameInfo {
    name: Option<String>,
    version: Option<String>,
    builder_version: Option<String>,
    description: Option<String>,
    start_image_path: Option<String>,
}

/// Inspect an uploaded package and extract its declared metadata.
pub fn inspect_package(bytes: &[u8]) -> Result<PackageMetadata, PackageError> {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes))
        .map_err(|_| PackageError::MalformedPackage)?;

    let descriptor = read_entry(&mut archive, METADATA_ENTRY)
        .ok_or(PackageError::MissingMetadata)?;
    let game_data: GameData = serde_json::from_slice(&descriptor)
        .map_err(|e| PackageError::InvalidMetadata(e.to_string()))?;
    let info = game_data.game_info;

    let name = match info.name {
        Some(n) if !n.trim().is_empty() => n.trim().to_string(),
        _ => return Err(PackageError::MissingName),
    };

    let description = info
        .description
        .filter(|d| !d.trim().is_empty());
    let game_version = info
        .version
        .unwrap_or_else(|| DEFAULT_GAME_VERSION.to_string());
    let builder_version = info
        .builder_version
        .unwrap_or_else(|| DEFAULT_BUILDER_VERSION.to_string());

    let thumbnail = resolve_thumbnail(&mut archive, info.start_image_path.as_deref());

    Ok(PackageMetadata {
        name,
        description,
        game_version,
        builder_version,
        thumbnail,
    })
}

/// Locate a thumbnail: conventional basenames first, then the descriptor's
/// `start_image_path` hint (verbatim, then by basename).
fn resolve_thumbnail(
    archive: &mut zip::ZipArchive<Cursor<&[u8]>>,
    start_image_path: Option<&str>,
) -> Option<Thumbnail> {
    let entry_names: Vec<String> = archive.file_names().map(str::to_string).collect();

    let chosen = entry_names
        .iter()
        .find(|name| is_conventional_thumbnail(basename(name)))
        .or_else(|| {
            let hint = start_image_path?;
            entry_names
                .iter()
                .find(|name| name.as_str() == hint)
                .or_else(|| {
                    let hint_base = basename(hint).to_ascii_lowercase();
                    entry_names
                        .iter()
                        .find(|name| basename(name).to_ascii_lowercase() == hint_base)
                })
        })?
        .clone();

    let bytes = read_entry(archive, &chosen)?;

    // Reject entries that merely look like images by name.
    image::guess_format(&bytes).ok()?;

    let extension = chosen
        .rsplit('.')
        .next()
        .map(str::to_ascii_lowercase)
        .unwrap_or_else(|| "png".to_string());

    Some(Thumbnail {
        entry_name: chosen,
        extension,
        bytes,
    })
}

fn is_conventional_thumbnail(base: &str) -> bool {
    let lower = base.to_ascii_lowercase();
    let Some((stem, ext)) = lower.rsplit_once('.') else {
        return false;
    };
    THUMBNAIL_STEMS.contains(&stem) && THUMBNAIL_EXTENSIONS.contains(&ext)
}

fn basename(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

fn read_entry(
    archive: &mut zip::ZipArchive<Cursor<&[u8]>>,
    name: &str,
) -> Option<Vec<u8>> {
    let mut entry = archive.by_name(name).ok()?;
    let mut buf = Vec::with_capacity(entry.size() as usize);
    entry.read_to_end(&mut buf).ok()?;
    Some(buf)
}
