//! `/static/mount` — the folder opened through the filesystem provider.
//!
//! `?stat` and `?readdir` answer with JSON; any other request is served as
//! a plain file from the mounted folder.

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::extract::{Path, Request, State};
use axum::http::Uri;
use axum::response::{IntoResponse, Json, Response};
use axum::routing::get;
use tower::ServiceExt;
use tower_http::services::ServeDir;
use tracing::debug;
use workbench_services::MountedFolder;

use crate::query::QueryParams;

/// Prefix the mounted folder is served under.
pub const MOUNT_PREFIX: &str = "/static/mount";

/// Routes for the mounted folder.
pub fn router(folder: MountedFolder) -> Router {
    Router::new()
        .route(MOUNT_PREFIX, get(mount_root_handler))
        .route(&format!("{MOUNT_PREFIX}/"), get(mount_root_handler))
        .route(&format!("{MOUNT_PREFIX}/{{*path}}"), get(mount_path_handler))
        .with_state(Arc::new(folder))
}

async fn mount_root_handler(
    State(folder): State<Arc<MountedFolder>>,
    query: QueryParams,
    request: Request,
) -> Response {
    serve(&folder, "", &query, request).await
}

async fn mount_path_handler(
    State(folder): State<Arc<MountedFolder>>,
    Path(path): Path<String>,
    query: QueryParams,
    request: Request,
) -> Response {
    serve(&folder, &path, &query, request).await
}

async fn serve(folder: &MountedFolder, path: &str, query: &QueryParams, request: Request) -> Response {
    if query.has("stat") {
        return Json(folder.stat(path).await).into_response();
    }
    if query.has("readdir") {
        return Json(folder.readdir(path).await).into_response();
    }
    serve_file(folder, request).await
}

/// Hand the request to a file service rooted at the mounted folder.
async fn serve_file(folder: &MountedFolder, mut request: Request<Body>) -> Response {
    let relative = request
        .uri()
        .path()
        .strip_prefix(MOUNT_PREFIX)
        .filter(|rest| !rest.is_empty())
        .unwrap_or("/")
        .to_string();
    match Uri::try_from(relative.as_str()) {
        Ok(uri) => *request.uri_mut() = uri,
        Err(e) => {
            debug!("Rejected mount path {relative}: {e}");
            return axum::http::StatusCode::BAD_REQUEST.into_response();
        }
    }

    match ServeDir::new(folder.root()).oneshot(request).await {
        Ok(response) => response.into_response(),
        Err(never) => match never {},
    }
}
