//! Security-control catalog flattening
//!
//! Converts a hierarchical control catalog (controls, nested statements and
//! enhancements) into a flat, keyed catalog of control records whose
//! descriptions are rendered as indented outline text.

pub mod domain;
pub use domain::{
    BaselineFilter, BaselineImpact, Catalog, CatalogNumber, Config, Control, ControlRecord,
    Document, Enhancement, Outline, RenderError, Statement,
};

/// Input collaborators: fetching and decoding the source document.
pub mod source;
pub use source::{DecodeError, Fetch, FetchError, Source};

/// Output collaborators: serializing and persisting the catalog.
pub mod storage;
pub use storage::WriteError;

pub mod pipeline;
