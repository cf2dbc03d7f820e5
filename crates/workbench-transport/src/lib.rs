//! Workbench Web Host Transport Layer
//!
//! Owns the HTTP listener for the host:
//! - Listener lifecycle (bind, bound port, graceful shutdown)
//! - Static asset mounts under `/static`
//! - Permissive CORS so extension host workers can fetch extension files
//! - Request logging
//!
//! Route logic lives in the server crate; the transport only wraps a ready
//! `axum::Router`.

pub mod mounts;
pub mod server;

pub use mounts::StaticMounts;
pub use server::{TransportConfig, TransportError, TransportServer};
