//! HTTP API: request normalization, routing, handlers, and the axum
//! transport adapter.
//!
//! The folder is structured like:
//! - `context.rs`: normalized `RequestContext` / `ResponseObject`
//! - `router.rs`: path-segment dispatch over per-resource bundles
//! - `routes/`: handlers (one file per resource)
//! - `authz.rs`: token and ownership guards shared by handlers
//! - `adapter.rs`: axum transport glue

pub mod adapter;
pub mod authz;
pub mod context;
pub mod router;
pub mod routes;
pub mod state;
