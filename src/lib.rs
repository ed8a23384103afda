//! Mineral Outlook - Critical Minerals Data Explorer tables
//!
//! Reads the explorer workbook, cleans each table into its own
//! spreadsheet, renders scenario charts and serves them on a dashboard.
//!
//! # Features
//!
//! - Scenario columns located by their header labels
//! - Cleaned workbooks with summary sheets (growth, CAGR, rankings)
//! - Interactive HTML charts per table
//! - Dashboard with chart pages and a JSON insights endpoint
//!
//! # Example
//!
//! ```no_run
//! use mineral_outlook::config::OutlookConfig;
//! use mineral_outlook::tables::{clean_tables, TableId};
//!
//! let config = OutlookConfig::load(None)?;
//! for outcome in clean_tables(&[TableId::Demand, TableId::MineralDemand], &config)? {
//!     println!("{}: {}", outcome.table, outcome.is_ok());
//! }
//! # Ok::<(), mineral_outlook::error::OutlookError>(())
//! ```

pub mod analysis;
pub mod charts;
pub mod cli;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod excel;
pub mod tables;
pub mod types;

// Re-export commonly used types
pub use config::OutlookConfig;
pub use error::{OutlookError, OutlookResult};
pub use tables::{Dataset, TableId};
pub use types::{Cell, Projection, Scenario, SheetTable};
