//! Dashboard: table pages over the generated charts
//!
//! Run with `outlook serve` or `outlook-server`.

pub mod handlers;
pub mod insights;
pub mod pages;
pub mod server;

pub use server::{router, run_dashboard, AppState};
