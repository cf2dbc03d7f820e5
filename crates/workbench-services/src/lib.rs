//! Workbench Web Host Services
//!
//! The logic behind the host's routes: scanning extension folders into
//! addressable descriptors, deriving the workbench options for a page,
//! rendering the HTML template, relaying one-shot redirect callbacks, and
//! the file operations behind a mounted folder.

pub mod download;
pub mod extensions;
pub mod mount;
pub mod relay;
pub mod template;
pub mod workbench;

pub use download::{DownloadError, Downloader};
pub use extensions::{ExtensionSource, FsExtensionScanner};
pub use mount::MountedFolder;
pub use relay::{CallbackRelay, CallbackStore, RelayError};
pub use template::{RenderError, WorkbenchPage};
pub use workbench::build_workbench_options;
