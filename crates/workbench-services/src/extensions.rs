//! Extension scanning — turns a folder on disk into extension addresses the
//! workbench can load over HTTP.

use std::io;
use std::path::{Path, PathBuf};

use tracing::debug;
use workbench_protocol::{AddressingContext, UriComponents};

/// Source of extension descriptors for a mounted folder.
///
/// `prefix` is the static mount prefix the folder is served under (for
/// example `/static/extensions/0`).
pub trait ExtensionSource: Send + Sync + 'static {
    fn scan(
        &self,
        root: &Path,
        ctx: &AddressingContext,
        prefix: &str,
    ) -> impl std::future::Future<Output = io::Result<Vec<UriComponents>>> + Send;
}

/// Scans the filesystem for folders containing a `package.json`.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsExtensionScanner;

impl ExtensionSource for FsExtensionScanner {
    async fn scan(
        &self,
        root: &Path,
        ctx: &AddressingContext,
        prefix: &str,
    ) -> io::Result<Vec<UriComponents>> {
        scan_for_extensions(root, ctx, prefix).await
    }
}

/// Walk `root` looking for extensions.
///
/// A folder with a `package.json` is an extension and is not descended
/// into. Otherwise its non-hidden subfolders are visited in name order.
pub async fn scan_for_extensions(
    root: &Path,
    ctx: &AddressingContext,
    prefix: &str,
) -> io::Result<Vec<UriComponents>> {
    let mut result = Vec::new();
    // Depth-first; children pushed in reverse so they pop in name order.
    let mut pending = vec![String::new()];

    while let Some(relative) = pending.pop() {
        let folder = join_relative(root, &relative);

        if is_file(&folder.join("package.json")).await {
            debug!("Found extension at {}", folder.display());
            result.push(ctx.at(posix_join(prefix, &relative)));
            continue;
        }

        let mut entries = tokio::fs::read_dir(&folder).await?;
        let mut children = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let name = entry.file_name().to_string_lossy().to_string();
            if name.starts_with('.') {
                continue;
            }
            // metadata follows symlinks, file_type does not
            if is_dir(&entry.path()).await {
                children.push(name);
            }
        }
        children.sort();

        for name in children.into_iter().rev() {
            pending.push(posix_join(&relative, &name));
        }
    }

    Ok(result)
}

/// Join POSIX path segments, collapsing duplicate separators.
pub fn posix_join(base: &str, relative: &str) -> String {
    let joined: Vec<&str> = base
        .split('/')
        .chain(relative.split('/'))
        .filter(|segment| !segment.is_empty() && *segment != ".")
        .collect();
    let mut path = String::new();
    if base.starts_with('/') || (base.is_empty() && relative.starts_with('/')) {
        path.push('/');
    }
    path.push_str(&joined.join("/"));
    path
}

fn join_relative(root: &Path, relative: &str) -> PathBuf {
    relative
        .split('/')
        .filter(|segment| !segment.is_empty())
        .fold(root.to_path_buf(), |path, segment| path.join(segment))
}

async fn is_file(path: &Path) -> bool {
    tokio::fs::metadata(path)
        .await
        .map(|meta| meta.is_file())
        .unwrap_or(false)
}

async fn is_dir(path: &Path) -> bool {
    tokio::fs::metadata(path)
        .await
        .map(|meta| meta.is_dir())
        .unwrap_or(false)
}
