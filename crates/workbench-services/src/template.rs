//! Page rendering — fills the workbench HTML template.
//!
//! Placeholders are written `{{NAME}}`. A placeholder without a value renders
//! as the literal `undefined` so template drift shows up as a visibly broken
//! page instead of a failed request.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::{Captures, Regex};
use serde::Serialize;
use serde_json::Value;
use workbench_protocol::WorkbenchOptions;

static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\{([^}]+)\}\}").expect("valid placeholder regex"));

/// Path of the callback page inside a workbench bundle.
pub const CALLBACK_PAGE_PATH: &str = "/out/vs/code/browser/workbench/callback.html";

/// Shown when the bundle's callback page cannot be loaded.
pub const FALLBACK_CALLBACK_PAGE: &str = "<!DOCTYPE html>\n<html>\n<head><meta charset=\"utf-8\"><title>Sign in complete</title></head>\n<body>You can close this window now.</body>\n</html>\n";

/// Rendering failures. Always convertible into a displayable body.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("failed to load template {path}: {source}")]
    Load {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to serialize page data: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl RenderError {
    /// Plain-text body describing the failure.
    pub fn into_body(self) -> String {
        self.to_string()
    }
}

/// Replace every `{{NAME}}` in `template` with its substitution.
pub fn render(template: &str, substitutions: &HashMap<&str, String>) -> String {
    PLACEHOLDER
        .replace_all(template, |caps: &Captures<'_>| {
            substitutions
                .get(&caps[1])
                .cloned()
                .unwrap_or_else(|| "undefined".to_string())
        })
        .into_owned()
}

/// Serialize `value` as JSON safe to embed in a double-quoted HTML attribute.
pub fn attribute_json<T: Serialize + ?Sized>(value: &T) -> Result<String, RenderError> {
    Ok(serde_json::to_string(value)?.replace('"', "&quot;"))
}

/// One workbench page: where the bundle lives and how to boot it.
#[derive(Debug, Clone)]
pub struct WorkbenchPage {
    /// Base URL of the workbench bundle, without trailing slash
    pub base_url: String,
    /// Boot through the AMD loader from sources
    pub dev: bool,
    /// Builtin extensions reported by the development companion
    pub builtin_extensions: Vec<Value>,
}

impl WorkbenchPage {
    pub fn new(base_url: impl Into<String>, dev: bool, builtin_extensions: Vec<Value>) -> Self {
        Self {
            base_url: base_url.into(),
            dev,
            builtin_extensions,
        }
    }

    /// Script tags that boot the workbench.
    pub fn main_script(&self) -> String {
        if self.dev {
            "<script> require(['vs/code/browser/workbench/workbench'], function() {}); </script>"
                .to_string()
        } else {
            let base = &self.base_url;
            format!(
                "<script src=\"{base}/out/vs/workbench/workbench.web.api.nls.js\"></script>\
                 <script src=\"{base}/out/vs/workbench/workbench.web.api.js\"></script>\
                 <script src=\"{base}/out/vs/code/browser/workbench/workbench.js\"></script>"
            )
        }
    }

    /// Named values substituted into the template.
    pub fn substitutions(
        &self,
        options: &WorkbenchOptions,
    ) -> Result<HashMap<&'static str, String>, RenderError> {
        Ok(HashMap::from([
            ("WORKBENCH_WEB_CONFIGURATION", attribute_json(options)?),
            ("WORKBENCH_AUTH_SESSION", String::new()),
            ("WORKBENCH_WEB_BASE_URL", self.base_url.clone()),
            ("WORKBENCH_BUILTIN_EXTENSIONS", attribute_json(&self.builtin_extensions)?),
            ("WORKBENCH_MAIN", self.main_script()),
        ]))
    }

    /// Load the template at `template_path` and fill it for `options`.
    pub async fn render(
        &self,
        template_path: &Path,
        options: &WorkbenchOptions,
    ) -> Result<String, RenderError> {
        let template = tokio::fs::read_to_string(template_path)
            .await
            .map_err(|source| RenderError::Load {
                path: template_path.to_path_buf(),
                source,
            })?;
        Ok(render(&template, &self.substitutions(options)?))
    }

    /// URL of the bundle's callback page.
    pub fn callback_page_url(&self) -> String {
        format!("{}{CALLBACK_PAGE_PATH}", self.base_url)
    }
}
