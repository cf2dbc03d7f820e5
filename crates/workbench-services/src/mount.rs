//! File operations for a folder mounted through the filesystem provider.
//!
//! The provider extension asks `?stat` and `?readdir` on paths under the
//! mount; failures are reported in-band as `{ "error": <code> }`.

use std::io;
use std::path::{Component, Path, PathBuf};
use std::time::UNIX_EPOCH;

use serde::Serialize;
use serde_json::{Value, json};
use tracing::debug;

/// File type codes understood by the provider extension.
const TYPE_FILE: u8 = 1;
const TYPE_DIRECTORY: u8 = 2;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileStat {
    #[serde(rename = "type")]
    pub kind: u8,
    pub ctime: u64,
    pub mtime: u64,
    pub size: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DirEntry {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: u8,
}

/// A local folder exposed under `/static/mount`.
#[derive(Debug, Clone)]
pub struct MountedFolder {
    root: PathBuf,
}

impl MountedFolder {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve a request path under the mount. `None` if it escapes the root.
    pub fn resolve(&self, request_path: &str) -> Option<PathBuf> {
        let mut resolved = self.root.clone();
        for component in Path::new(request_path.trim_start_matches('/')).components() {
            match component {
                Component::Normal(segment) => resolved.push(segment),
                Component::CurDir => {}
                _ => return None,
            }
        }
        Some(resolved)
    }

    /// `?stat` response for `request_path`.
    pub async fn stat(&self, request_path: &str) -> Value {
        let Some(path) = self.resolve(request_path) else {
            return error_body("EACCES");
        };
        match tokio::fs::metadata(&path).await {
            Ok(meta) => {
                let stat = FileStat {
                    kind: if meta.is_file() { TYPE_FILE } else { TYPE_DIRECTORY },
                    ctime: meta.created().map(millis).unwrap_or_default(),
                    mtime: meta.modified().map(millis).unwrap_or_default(),
                    size: meta.len(),
                };
                serde_json::to_value(stat).unwrap_or_else(|_| error_body("EIO"))
            }
            Err(e) => {
                debug!("stat {} failed: {e}", path.display());
                error_body(error_code(&e))
            }
        }
    }

    /// `?readdir` response for `request_path`.
    pub async fn readdir(&self, request_path: &str) -> Value {
        let Some(path) = self.resolve(request_path) else {
            return error_body("EACCES");
        };
        match read_entries(&path).await {
            Ok(entries) => serde_json::to_value(entries).unwrap_or_else(|_| error_body("EIO")),
            Err(e) => {
                debug!("readdir {} failed: {e}", path.display());
                error_body(error_code(&e))
            }
        }
    }
}

async fn read_entries(path: &Path) -> io::Result<Vec<DirEntry>> {
    let mut reader = tokio::fs::read_dir(path).await?;
    let mut entries = Vec::new();
    while let Some(entry) = reader.next_entry().await? {
        let is_dir = tokio::fs::metadata(entry.path())
            .await
            .map(|meta| meta.is_dir())
            .unwrap_or(false);
        entries.push(DirEntry {
            name: entry.file_name().to_string_lossy().into_owned(),
            kind: if is_dir { TYPE_DIRECTORY } else { TYPE_FILE },
        });
    }
    entries.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(entries)
}

fn millis(time: std::time::SystemTime) -> u64 {
    time.duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or_default()
}

/// POSIX-style error code for an I/O error.
fn error_code(err: &io::Error) -> &'static str {
    match err.kind() {
        io::ErrorKind::NotFound => "ENOENT",
        io::ErrorKind::PermissionDenied => "EACCES",
        io::ErrorKind::NotADirectory => "ENOTDIR",
        _ => "EIO",
    }
}

fn error_body(code: &str) -> Value {
    json!({ "error": code })
}
