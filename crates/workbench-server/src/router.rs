//! Request routing — the workbench page and the callback relay endpoints.

use std::sync::Arc;

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{Html, IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde_json::Value;
use tracing::{debug, warn};
use workbench_protocol::{
    AddressingContext, BuildConfig, DeploymentConfig, HostError, HostResult, UriComponents,
};
use workbench_services::template::{CALLBACK_PAGE_PATH, FALLBACK_CALLBACK_PAGE};
use workbench_services::{
    CallbackStore, Downloader, ExtensionSource, MountedFolder, WorkbenchPage,
    build_workbench_options,
};
use workbench_transport::StaticMounts;

use crate::error::HttpError;
use crate::folder;
use crate::mode::{RenderMode, select_render_mode};
use crate::query::QueryParams;

const REQUEST_ID: &str = "vscode-requestId";

/// Shared state for the request handlers.
pub struct AppState<S: ExtensionSource> {
    pub config: Arc<DeploymentConfig>,
    /// Pending callbacks, keyed by request id
    pub relay: Arc<dyn CallbackStore>,
    /// Extension discovery
    pub source: S,
    /// Outbound client for the development companion and CDN
    pub downloader: Downloader,
}

/// Routes served from [`AppState`]: `/`, `/callback` and `/fetch-callback`.
pub fn build_router<S: ExtensionSource>(state: Arc<AppState<S>>) -> Router {
    Router::new()
        .route("/", get(page_handler::<S>))
        .route("/callback", get(callback_handler::<S>))
        .route("/fetch-callback", get(fetch_callback_handler::<S>))
        .with_state(state)
}

/// The complete application: routes, folder mount and static assets.
pub fn build_app<S: ExtensionSource>(state: Arc<AppState<S>>) -> Router {
    let mounts = StaticMounts::from_config(&state.config);
    let mut app = build_router(state.clone());
    if let Some(path) = state.config.folder_mount_path() {
        app = app.merge(folder::router(MountedFolder::new(path)));
    }
    mounts.apply(app)
}

// ─────────────────────────────────────────────────────────────────────────────
// HTTP Handlers
// ─────────────────────────────────────────────────────────────────────────────

async fn page_handler<S: ExtensionSource>(
    State(state): State<Arc<AppState<S>>>,
    headers: HeaderMap,
    query: QueryParams,
) -> Result<Response, HttpError> {
    let ctx = addressing_context(&headers)?;
    let mode = request_mode(&state.config, &query, &ctx);
    let page = match mode {
        RenderMode::LocalDev => {
            let builtin = fetch_builtin_extensions(&state).await?;
            WorkbenchPage::new(companion_static_url(&state.config), true, builtin)
        }
        RenderMode::PrebuiltStatic(base) | RenderMode::Cdn(base) => {
            WorkbenchPage::new(base, false, Vec::new())
        }
    };

    let options = build_workbench_options(&state.config, &ctx, &state.source).await?;

    match page.render(&state.config.template_path, &options).await {
        Ok(html) => Ok(Html(html).into_response()),
        Err(e) => {
            warn!("Workbench page render failed: {e}");
            Ok(plain_text(e.into_body()))
        }
    }
}

async fn callback_handler<S: ExtensionSource>(
    State(state): State<Arc<AppState<S>>>,
    headers: HeaderMap,
    query: QueryParams,
) -> Result<Response, HttpError> {
    let (Some(request_id), Some(scheme), Some(authority)) = (
        query.non_empty(REQUEST_ID),
        query.non_empty("vscode-scheme"),
        query.non_empty("vscode-authority"),
    ) else {
        return Err(HostError::bad_request("callback requires request id, scheme and authority").into());
    };

    let ctx = addressing_context(&headers)?;
    let target = UriComponents::from_parts(
        scheme,
        Some(authority),
        query.first_of("vscode-path"),
        query.first_of("vscode-query"),
        query.first_of("vscode-fragment"),
    );
    state
        .relay
        .receive(request_id, target)
        .map_err(HostError::from)?;
    debug!("Stored callback for request {request_id}");

    let mode = request_mode(&state.config, &query, &ctx);
    Ok(Html(callback_page(&state, &mode).await).into_response())
}

async fn fetch_callback_handler<S: ExtensionSource>(
    State(state): State<Arc<AppState<S>>>,
    query: QueryParams,
) -> Result<Json<UriComponents>, HttpError> {
    let request_id = query
        .non_empty(REQUEST_ID)
        .ok_or_else(|| HostError::bad_request("missing request id"))?;
    let target = state
        .relay
        .fetch_and_clear(request_id)
        .map_err(HostError::from)?;
    Ok(Json(target))
}

// ─────────────────────────────────────────────────────────────────────────────
// Helpers
// ─────────────────────────────────────────────────────────────────────────────

/// Where generated URIs point: this host, as the client addressed it.
fn addressing_context(headers: &HeaderMap) -> HostResult<AddressingContext> {
    let host = headers
        .get(header::HOST)
        .and_then(|value| value.to_str().ok())
        .filter(|host| !host.is_empty())
        .ok_or_else(|| HostError::bad_request("missing Host header"))?;
    Ok(AddressingContext::new("http", host))
}

fn request_mode(
    config: &DeploymentConfig,
    query: &QueryParams,
    ctx: &AddressingContext,
) -> RenderMode {
    select_render_mode(query.non_empty("dev").is_some(), &config.build, ctx)
}

fn companion_static_url(config: &DeploymentConfig) -> String {
    format!("{}/static", config.dev_companion.url.trim_end_matches('/'))
}

async fn fetch_builtin_extensions<S: ExtensionSource>(
    state: &AppState<S>,
) -> HostResult<Vec<Value>> {
    let companion = state.config.dev_companion.url.trim_end_matches('/');
    state
        .downloader
        .fetch_json(&format!("{companion}/builtin"))
        .await
        .map_err(|e| {
            warn!("Development companion unavailable: {e}");
            HostError::bad_gateway(format!(
                "Could not connect to {companion}, make sure you start `yarn web`"
            ))
        })
}

/// The bundle's callback page, or the built-in one if it cannot be loaded.
async fn callback_page<S: ExtensionSource>(state: &AppState<S>, mode: &RenderMode) -> String {
    let loaded = match (mode, &state.config.build) {
        (RenderMode::PrebuiltStatic(_), BuildConfig::Static { location }) => {
            let path = location.join(CALLBACK_PAGE_PATH.trim_start_matches('/'));
            tokio::fs::read_to_string(&path)
                .await
                .map_err(|e| format!("{}: {e}", path.display()))
        }
        (RenderMode::LocalDev, _) => {
            let page = WorkbenchPage::new(companion_static_url(&state.config), true, Vec::new());
            fetch_page(state, &page.callback_page_url()).await
        }
        (RenderMode::PrebuiltStatic(base) | RenderMode::Cdn(base), _) => {
            let page = WorkbenchPage::new(base.as_str(), false, Vec::new());
            fetch_page(state, &page.callback_page_url()).await
        }
    };

    loaded.unwrap_or_else(|e| {
        warn!("Callback page unavailable, using built-in page: {e}");
        FALLBACK_CALLBACK_PAGE.to_string()
    })
}

async fn fetch_page<S: ExtensionSource>(state: &AppState<S>, url: &str) -> Result<String, String> {
    state.downloader.fetch_text(url).await.map_err(|e| e.to_string())
}

fn plain_text(body: String) -> Response {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        body,
    )
        .into_response()
}
