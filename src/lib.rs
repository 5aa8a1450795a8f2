//! `meterview`: smart-meter reading shaper service.
//!
//! Fetches meter readings and power-source usage intervals from the upstream
//! backend and reshapes them for the dashboard:
//! - [`shaper`] regularizes readings and builds axis-tagged chart series
//! - [`usage`] formats usage intervals as table rows
//! - [`routes`] exposes both over HTTP
//!
//! `Config` and the core model types are re-exported at the crate root for
//! binaries and tests.

pub mod backend;
pub mod config;
pub mod display;
pub mod error;
pub mod models;
pub mod routes;
pub mod session;
pub mod shaper;
pub mod usage;

pub use config::Config;
pub use models::{Chart, Reading, Selection, Series, UsageInterval};
