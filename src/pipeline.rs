//! The end-to-end conversion run.
//!
//! A run is a strict linear pipeline: fetch the source document, decode it,
//! extract one record per control and enhancement, assemble the catalog and
//! write it out. Any failure aborts the run.

use std::path::Path;

use tracing::{info, instrument};

use crate::{
    domain::{Catalog, Config, RenderError, extract},
    source::{DecodeError, Fetch, FetchError, decode},
    storage::{self, WriteError},
};

/// Fetches, decodes and flattens the catalog described by `config`.
///
/// # Errors
///
/// Returns an [`Error`] naming the stage that failed.
pub fn run(config: &Config) -> Result<Catalog, Error> {
    let fetcher = config.source.fetcher()?;
    convert(fetcher.as_ref(), config)
}

/// Converts the document produced by `fetcher` into a catalog.
///
/// # Errors
///
/// Returns an [`Error`] naming the stage that failed.
#[instrument(level = "debug", skip_all, fields(source = %config.source))]
pub fn convert(fetcher: &dyn Fetch, config: &Config) -> Result<Catalog, Error> {
    let bytes = fetcher.fetch()?;
    let document = decode(&bytes)?;
    info!("Decoded {} controls", document.controls.len());

    let records = extract(&document, &config.filter())?;
    info!("Extracted {} records", records.len());

    Ok(Catalog::new(config.catalog_name.clone(), records))
}

/// Runs the conversion and writes the result to `destination`.
///
/// Nothing is written unless every stage succeeds.
///
/// # Errors
///
/// Returns an [`Error`] naming the stage that failed.
pub fn run_to_file(config: &Config, destination: &Path) -> Result<Catalog, Error> {
    let catalog = run(config)?;
    storage::save(&catalog, destination)?;
    Ok(catalog)
}

/// A fatal failure in one stage of the run.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The source document could not be retrieved.
    #[error("failed to fetch the source document")]
    Fetch(#[from] FetchError),

    /// The source document could not be decoded.
    #[error("failed to decode the source document")]
    Decode(#[from] DecodeError),

    /// A control's statements could not be rendered.
    #[error("failed to render control statements")]
    Render(#[from] RenderError),

    /// The catalog could not be serialized or written.
    #[error("failed to write the catalog")]
    Write(#[from] WriteError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::BaselineImpact;

    struct Fixed(String);

    impl Fetch for Fixed {
        fn fetch(&self) -> Result<Vec<u8>, FetchError> {
            Ok(self.0.as_bytes().to_vec())
        }
    }

    const DOCUMENT: &str = "<controls>\
        <control>\
          <family>ACCESS CONTROL</family>\
          <number>AC-2</number>\
          <title>account management</title>\
          <baseline-impact>HIGH</baseline-impact>\
          <statement><number>AC-2</number><description>The org manages accounts.</description></statement>\
          <control-enhancements>\
            <control-enhancement>\
              <number>AC-2(1)</number>\
              <title>automated system account management</title>\
              <statement><description>Automated mechanisms.</description></statement>\
            </control-enhancement>\
          </control-enhancements>\
        </control>\
      </controls>";

    #[test]
    fn converts_document() {
        let catalog = convert(&Fixed(DOCUMENT.to_string()), &Config::default()).unwrap();

        assert_eq!(catalog.name(), "NIST-800-53");
        let keys: Vec<&str> = catalog.controls().keys().map(|k| k.as_str()).collect();
        assert_eq!(keys, ["AC-2", "AC-2(1)"]);

        let control = catalog.get("AC-2").unwrap();
        assert_eq!(control.family, "AC");
        assert_eq!(control.name, "Account Management");
        assert_eq!(control.description, "\"The org manages accounts.\"");

        let enhancement = catalog.get("AC-2(1)").unwrap();
        assert_eq!(enhancement.family, "AC");
        assert_eq!(enhancement.description, "\"Automated mechanisms.\"");
    }

    #[test]
    fn applies_configured_baseline() {
        let config = Config {
            baseline: Some(BaselineImpact::High),
            ..Config::default()
        };

        let catalog = convert(&Fixed(DOCUMENT.to_string()), &config).unwrap();
        assert_eq!(catalog.len(), 1);
        assert!(catalog.get("AC-2").is_some());
    }

    #[test]
    fn decode_failure_is_reported() {
        let error = convert(&Fixed("<controls><control>".to_string()), &Config::default()).unwrap_err();
        assert!(matches!(error, Error::Decode(_)));
    }

    #[test]
    fn render_failure_is_reported() {
        let document = DOCUMENT.replace("ACCESS CONTROL", "AUDIT AND ACCOUNTABILITY");
        let error = convert(&Fixed(document), &Config::default()).unwrap_err();
        assert!(matches!(error, Error::Render(_)));
    }
}
