//! GUI module for the web-based dashboard
//!
//! This module provides a local web server with the edit form, new-pathway
//! form, filtered browse table, progress charts, and CSV download.

mod server;

pub use server::{AppState, router, start_server};
