//! HTTP presentation layer.
//!
//! Trims and validates form input, calls one task store operation per
//! request, and redirects back to the list.

mod server;
pub mod templates;

pub use server::{WebServer, build_router, serve_until, start_server};
