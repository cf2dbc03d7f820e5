//! Workbench Web Host Server — routes requests to the host services.
//!
//! The server owns the shared state (deployment config, callback relay,
//! extension source, downloader) and builds the `axum::Router` the transport
//! layer serves.

pub mod error;
pub mod folder;
pub mod mode;
pub mod query;
pub mod router;

pub use error::HttpError;
pub use mode::{RenderMode, select_render_mode};
pub use query::QueryParams;
pub use router::{AppState, build_app, build_router};
