//! # CCA Admin
//!
//! Administration tooling for the CCA Ceuta loyalty program: the statistics
//! dashboard, report shaping and the `cca-admin` command-line client.

#![forbid(unsafe_code)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod cli;
pub mod commands;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod report;

pub use config::{Config, LogFormat};
pub use dashboard::{Dashboard, FilterOptions};
pub use error::{AdminError, Result};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
