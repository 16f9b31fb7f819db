mod fetch;
pub use fetch::{Fetch, FetchError, FileFetcher, HttpFetcher, Source};

/// Decoding of the catalog's XML representation.
pub mod xml;
pub use xml::{DecodeError, decode};
