//! Workbench options builder.

use std::path::{Component, Path};

use futures_util::future::try_join_all;
use workbench_protocol::{
    AddressingContext, AutoOpenFolder, DeploymentConfig, DevelopmentOptions, HostError,
    HostResult, UriComponents, WorkbenchOptions,
};

use crate::extensions::{ExtensionSource, posix_join};

/// Prefix of the `i`-th additional extension mount.
pub fn extension_mount_prefix(index: usize) -> String {
    format!("/static/extensions/{index}")
}

/// Mount prefix of the extension under development.
pub const DEV_EXTENSIONS_PREFIX: &str = "/static/devextensions";

/// Mount prefix of the bundled filesystem provider extension.
pub const FS_PROVIDER_EXTENSION_PREFIX: &str = "/static/fsproviderextension";

/// Folder URI the filesystem provider serves the mounted folder under.
pub const FS_PROVIDER_FOLDER_URI: &str = "vscode-test-web://mount/";

/// Compute the workbench options for one page render.
///
/// Extension mounts are scanned concurrently; results keep mount order.
/// The first scan failure fails the whole build.
pub async fn build_workbench_options<S: ExtensionSource>(
    config: &DeploymentConfig,
    ctx: &AddressingContext,
    source: &S,
) -> HostResult<WorkbenchOptions> {
    let mut options = WorkbenchOptions::default();

    let scans = config.extension_paths.iter().enumerate().map(|(index, path)| {
        let prefix = extension_mount_prefix(index);
        async move {
            source
                .scan(path, ctx, &prefix)
                .await
                .map_err(|source| HostError::Scan {
                    path: path.clone(),
                    source,
                })
        }
    });
    options.additional_builtin_extensions = try_join_all(scans).await?.into_iter().flatten().collect();

    if let Some(development_path) = &config.extension_development_path {
        let extensions = source
            .scan(development_path, ctx, DEV_EXTENSIONS_PREFIX)
            .await
            .map_err(|source| HostError::Scan {
                path: development_path.clone(),
                source,
            })?;

        let extension_tests_path = match &config.extension_tests_path {
            Some(tests_path) => {
                let relative = relative_posix_path(development_path, tests_path).ok_or_else(|| {
                    HostError::internal(format!(
                        "extension tests path {} is not inside {}",
                        tests_path.display(),
                        development_path.display()
                    ))
                })?;
                Some(ctx.at(posix_join(DEV_EXTENSIONS_PREFIX, &relative)))
            }
            None => None,
        };

        options.development_options = Some(DevelopmentOptions {
            extensions,
            extension_tests_path,
        });
    }

    match &config.folder {
        Some(AutoOpenFolder::Mount(_)) => {
            options
                .additional_builtin_extensions
                .push(ctx.at(FS_PROVIDER_EXTENSION_PREFIX));
            options.folder_uri = Some(
                UriComponents::parse(FS_PROVIDER_FOLDER_URI)
                    .map_err(|e| HostError::internal(e.to_string()))?,
            );
        }
        Some(AutoOpenFolder::Uri(uri)) => {
            options.folder_uri = Some(
                UriComponents::parse(uri).map_err(|e| HostError::internal(e.to_string()))?,
            );
        }
        None => {}
    }

    Ok(options)
}

/// `target` relative to `base`, with `/` separators whatever the host uses.
///
/// `None` when `target` is not below `base`, including paths that climb out
/// again through `..`.
pub fn relative_posix_path(base: &Path, target: &Path) -> Option<String> {
    let relative = target.strip_prefix(base).ok()?;
    let mut segments = Vec::new();
    for component in relative.components() {
        match component {
            Component::Normal(segment) => segments.push(segment.to_string_lossy().into_owned()),
            Component::CurDir => {}
            _ => return None,
        }
    }
    Some(segments.join("/"))
}
