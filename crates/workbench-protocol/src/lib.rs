//! Workbench Web Host - Protocol Types
//!
//! Data types shared by every layer of the host: URI components as the
//! workbench expects them on the wire, the workbench options object embedded
//! into the served page, the deployment configuration fixed at startup, and
//! the error taxonomy surfaced at the HTTP boundary.

pub mod config;
pub mod error;
pub mod options;
pub mod uri;

pub use config::{AutoOpenFolder, BuildConfig, ConfigError, DevCompanionConfig, DeploymentConfig};
pub use error::{HostError, HostResult};
pub use options::{AddressingContext, DevelopmentOptions, WorkbenchOptions};
pub use uri::{UriComponents, UriError};
