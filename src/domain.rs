//! Domain models for control catalogs.
//!
//! This module contains the core domain types: statements and their outline
//! rendering, controls and enhancements, family codes, the assembled catalog,
//! and run configuration.

/// Control family name to short code mapping.
pub mod family;

mod statement;
pub use statement::Statement;

/// Outline rendering of statement trees.
pub mod outline;
pub use outline::{Outline, RenderError};

/// Controls, enhancements and the records they flatten into.
pub mod control;
pub use control::{
    BaselineImpact, CatalogNumber, Control, ControlRecord, Document, EmptyCatalogNumber,
    Enhancement, title_case,
};

mod catalog;
pub use catalog::{BaselineFilter, Catalog, DEFAULT_CATALOG_NAME, extract};

mod config;
pub use config::{Config, ConfigError, DEFAULT_SOURCE};
