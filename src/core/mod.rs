//! Core record types, classification, configuration and errors.
//!
//! This module has no XML dependency: it describes the normalized record that
//! the parser produces and downstream reporting consumes.

pub mod columns;
mod config;
mod error;
mod kind;
mod types;

pub use columns::{distinct_line_tax_names, distinct_sector_keys, distinct_tax_names};
pub use config::*;
pub use error::*;
pub use kind::*;
pub use types::*;
