//! Workbench options — the configuration object embedded into the page.

use serde::{Deserialize, Serialize};

use crate::uri::UriComponents;

/// Where the current request reached the host, used to build absolute
/// extension addresses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddressingContext {
    /// Request protocol (`http` or `https`)
    pub scheme: String,
    /// `host[:port]` as the browser addressed it
    pub authority: String,
}

impl AddressingContext {
    pub fn new(scheme: impl Into<String>, authority: impl Into<String>) -> Self {
        Self {
            scheme: scheme.into(),
            authority: authority.into(),
        }
    }

    /// Address of `path` on this host.
    pub fn at(&self, path: impl Into<String>) -> UriComponents {
        UriComponents::address(&self.scheme, &self.authority, path)
    }

    /// `scheme://authority` with no trailing slash.
    pub fn origin(&self) -> String {
        format!("{}://{}", self.scheme, self.authority)
    }
}

/// Options for running the workbench against extensions under development.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DevelopmentOptions {
    pub extensions: Vec<UriComponents>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extension_tests_path: Option<UriComponents>,
}

/// Options handed to the workbench through `WORKBENCH_WEB_CONFIGURATION`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkbenchOptions {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub additional_builtin_extensions: Vec<UriComponents>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub development_options: Option<DevelopmentOptions>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub folder_uri: Option<UriComponents>,
}
