//! Render mode — where a page loads the workbench bundle from.

use workbench_protocol::{AddressingContext, BuildConfig};

/// Resolved once per request, before any rendering work.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderMode {
    /// Sources served by the local development companion.
    LocalDev,
    /// Prebuilt bundle served by this host under `/static/build`.
    PrebuiltStatic(String),
    /// Bundle on an external base URL.
    Cdn(String),
}

/// Pick the render mode for a request.
///
/// The `dev` query flag or a sources build selects [`RenderMode::LocalDev`];
/// otherwise the build config decides.
pub fn select_render_mode(
    dev_flag: bool,
    build: &BuildConfig,
    ctx: &AddressingContext,
) -> RenderMode {
    match build {
        _ if dev_flag => RenderMode::LocalDev,
        BuildConfig::Sources => RenderMode::LocalDev,
        BuildConfig::Static { .. } => {
            RenderMode::PrebuiltStatic(format!("{}/static/build", ctx.origin()))
        }
        BuildConfig::Cdn { uri } => RenderMode::Cdn(uri.trim_end_matches('/').to_string()),
    }
}
