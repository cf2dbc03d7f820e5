//! Deployment configuration — fixed at startup, read-only afterwards.

use std::path::{Component, Path, PathBuf};
use std::time::Duration;

use crate::uri::{UriComponents, UriError};

/// Where the workbench bundle is loaded from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildConfig {
    /// Served from sources by the local development companion.
    Sources,
    /// Prebuilt bundle on disk, mounted at `/static/build`.
    Static { location: PathBuf },
    /// Bundle hosted on an external base URL.
    Cdn { uri: String },
}

/// Folder the workbench opens on load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AutoOpenFolder {
    /// A literal folder URI handed to the workbench as-is.
    Uri(String),
    /// Serve this local folder through the filesystem provider extension and
    /// open it.
    Mount(PathBuf),
}

/// The local development companion (`yarn web`) serving sources.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DevCompanionConfig {
    /// Base URL of the companion, without trailing slash
    pub url: String,
    /// Upper bound for a single request to the companion
    pub timeout: Duration,
}

impl Default for DevCompanionConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:8080".into(),
            timeout: Duration::from_secs(5),
        }
    }
}

/// Errors found while validating a [`DeploymentConfig`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("extension tests path {tests} is not inside extension development path {development}")]
    TestsPathOutsideDevelopmentPath { tests: PathBuf, development: PathBuf },
    #[error("extension tests path requires an extension development path")]
    TestsPathWithoutDevelopmentPath,
    #[error("a prebuilt static build needs a build location")]
    MissingBuildLocation,
    #[error("a CDN build needs a base URL")]
    MissingCdnUrl,
    #[error("invalid folder URI: {0}")]
    FolderUri(#[from] UriError),
}

/// Everything the host needs to know about the deployment.
#[derive(Debug, Clone)]
pub struct DeploymentConfig {
    /// Which bundle mode pages render against
    pub build: BuildConfig,
    /// Additional builtin extension folders, mounted at `/static/extensions/{i}`
    pub extension_paths: Vec<PathBuf>,
    /// Extension under development, mounted at `/static/devextensions`
    pub extension_development_path: Option<PathBuf>,
    /// Test runner module inside the development extension
    pub extension_tests_path: Option<PathBuf>,
    /// Folder to open on load
    pub folder: Option<AutoOpenFolder>,
    /// Root of the UI static assets, mounted at `/static`
    pub static_root: PathBuf,
    /// Workbench HTML template
    pub template_path: PathBuf,
    /// Bundled filesystem provider extension, mounted at
    /// `/static/fsproviderextension` when a folder is mounted
    pub fs_provider_extension_path: PathBuf,
    /// Local development companion
    pub dev_companion: DevCompanionConfig,
}

impl Default for DeploymentConfig {
    fn default() -> Self {
        Self {
            build: BuildConfig::Sources,
            extension_paths: Vec::new(),
            extension_development_path: None,
            extension_tests_path: None,
            folder: None,
            static_root: PathBuf::from("static"),
            template_path: PathBuf::from("views/workbench.html"),
            fs_provider_extension_path: PathBuf::from("fs-provider"),
            dev_companion: DevCompanionConfig::default(),
        }
    }
}

impl DeploymentConfig {
    /// Check cross-field constraints once at startup.
    pub fn validate(&self) -> Result<(), ConfigError> {
        match (&self.extension_development_path, &self.extension_tests_path) {
            (None, Some(_)) => return Err(ConfigError::TestsPathWithoutDevelopmentPath),
            (Some(development), Some(tests)) if !is_below(tests, development) => {
                return Err(ConfigError::TestsPathOutsideDevelopmentPath {
                    tests: tests.clone(),
                    development: development.clone(),
                });
            }
            _ => {}
        }

        match &self.build {
            BuildConfig::Static { location } if location.as_os_str().is_empty() => {
                return Err(ConfigError::MissingBuildLocation);
            }
            BuildConfig::Cdn { uri } if uri.trim().is_empty() => {
                return Err(ConfigError::MissingCdnUrl);
            }
            _ => {}
        }

        if let Some(AutoOpenFolder::Uri(uri)) = &self.folder {
            UriComponents::parse(uri)?;
        }
        Ok(())
    }

    /// The local folder served through the filesystem provider, if any.
    pub fn folder_mount_path(&self) -> Option<&PathBuf> {
        match &self.folder {
            Some(AutoOpenFolder::Mount(path)) => Some(path),
            _ => None,
        }
    }
}

/// Whether `path` lies under `base` without stepping back out through `..`.
fn is_below(path: &Path, base: &Path) -> bool {
    path.strip_prefix(base).is_ok_and(|rest| {
        rest.components()
            .all(|c| matches!(c, Component::Normal(_) | Component::CurDir))
    })
}
