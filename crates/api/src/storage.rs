//! Filesystem storage for package archives and extracted thumbnails.
//!
//! Files are stored under the configured upload root, in `packages/` and
//! `thumbnails/` subdirectories. The database records paths relative to the
//! root so the root can move between environments.

use std::path::{Path, PathBuf};

use advstore_core::types::Timestamp;

/// Subdirectory for uploaded package archives.
const PACKAGES_DIR: &str = "packages";
/// Subdirectory for extracted thumbnail images.
const THUMBNAILS_DIR: &str = "thumbnails";

/// A stored file: its database-recorded relative path and size in bytes.
#[derive(Debug, Clone)]
pub struct StoredFile {
    pub relative_path: String,
    pub size: u64,
}

/// Filesystem store rooted at the configured upload directory.
#[derive(Debug)]
pub struct PackageStore {
    root: PathBuf,
}

impl PackageStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Create the storage subdirectories if they do not exist yet.
    pub async fn init(&self) -> std::io::Result<()> {
        tokio::fs::create_dir_all(self.root.join(PACKAGES_DIR)).await?;
        tokio::fs::create_dir_all(self.root.join(THUMBNAILS_DIR)).await?;
        Ok(())
    }

    /// Verify the upload root is writable by round-tripping a marker file.
    pub async fn check_writable(&self) -> std::io::Result<()> {
        let marker = self.root.join(".writecheck");
        tokio::fs::write(&marker, b"ok").await?;
        tokio::fs::remove_file(&marker).await
    }

    /// Store a package archive under a collision-free name derived from the
    /// owner, the current time, and the sanitized original filename.
    pub async fn save_package(
        &self,
        owner: &str,
        original_filename: &str,
        bytes: &[u8],
    ) -> std::io::Result<StoredFile> {
        let name = unique_name(owner, original_filename);
        self.save(PACKAGES_DIR, &name, bytes).await
    }

    /// Store a thumbnail image extracted from a package.
    pub async fn save_thumbnail(
        &self,
        owner: &str,
        extension: &str,
        bytes: &[u8],
    ) -> std::io::Result<StoredFile> {
        let name = unique_name(owner, &format!("thumbnail.{extension}"));
        self.save(THUMBNAILS_DIR, &name, bytes).await
    }

    /// Read a stored file by its database-recorded relative path.
    pub async fn read(&self, relative_path: &str) -> std::io::Result<Vec<u8>> {
        tokio::fs::read(self.resolve(relative_path)).await
    }

    /// Best-effort removal of a stored file. Missing files are not an error;
    /// other failures are logged and swallowed.
    pub async fn remove(&self, relative_path: &str) {
        match tokio::fs::remove_file(self.resolve(relative_path)).await {
            Ok(()) => {}
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {}
            Err(err) => {
                tracing::warn!(error = %err, path = relative_path, "Failed to remove stored file");
            }
        }
    }

    /// Absolute path for a database-recorded relative path.
    pub fn resolve(&self, relative_path: &str) -> PathBuf {
        self.root.join(relative_path)
    }

    async fn save(&self, dir: &str, name: &str, bytes: &[u8]) -> std::io::Result<StoredFile> {
        let relative = Path::new(dir).join(name);
        tokio::fs::write(self.root.join(&relative), bytes).await?;
        Ok(StoredFile {
            relative_path: relative.to_string_lossy().into_owned(),
            size: bytes.len() as u64,
        })
    }
}

/// Build a collision-free stored filename: `{owner}_{unix_millis}_{sanitized}`.
fn unique_name(owner: &str, original_filename: &str) -> String {
    let now: Timestamp = chrono::Utc::now();
    format!(
        "{}_{}_{}",
        sanitize(owner),
        now.timestamp_millis(),
        sanitize(original_filename)
    )
}

/// Keep alphanumerics, dashes, underscores, and dots; everything else
/// (including path separators) becomes an underscore.
fn sanitize(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.' {
                c
            } else {
                '_'
            }
        })
        .collect()
}
