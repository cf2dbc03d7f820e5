//! Static asset mounts.

use std::path::PathBuf;

use axum::Router;
use tower_http::services::ServeDir;
use tracing::info;
use workbench_protocol::{BuildConfig, DeploymentConfig};

/// Prefix → directory pairs served as static files.
#[derive(Debug, Clone, Default)]
pub struct StaticMounts {
    mounts: Vec<(String, PathBuf)>,
}

impl StaticMounts {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `dir` under `prefix`.
    pub fn mount(mut self, prefix: impl Into<String>, dir: impl Into<PathBuf>) -> Self {
        self.mounts.push((prefix.into(), dir.into()));
        self
    }

    /// All mounts a deployment needs, except the mounted folder itself which
    /// the server answers with its own file operations.
    pub fn from_config(config: &DeploymentConfig) -> Self {
        let mut mounts = Self::new().mount("/static", &config.static_root);

        if let Some(path) = &config.extension_development_path {
            info!("Serving dev extensions from {}", path.display());
            mounts = mounts.mount("/static/devextensions", path);
        }

        if let BuildConfig::Static { location } = &config.build {
            mounts = mounts.mount("/static/build", location);
        }

        if config.folder_mount_path().is_some() {
            mounts = mounts.mount(
                "/static/fsproviderextension",
                &config.fs_provider_extension_path,
            );
        }

        for (index, path) in config.extension_paths.iter().enumerate() {
            info!("Serving additional built-in extensions from {}", path.display());
            mounts = mounts.mount(format!("/static/extensions/{index}"), path);
        }

        mounts
    }

    pub fn prefixes(&self) -> impl Iterator<Item = &str> {
        self.mounts.iter().map(|(prefix, _)| prefix.as_str())
    }

    /// Nest every mount into `router`.
    pub fn apply<S: Clone + Send + Sync + 'static>(&self, router: Router<S>) -> Router<S> {
        self.mounts.iter().fold(router, |router, (prefix, dir)| {
            router.nest_service(prefix, ServeDir::new(dir))
        })
    }
}
