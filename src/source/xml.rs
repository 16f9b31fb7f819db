use serde::Deserialize;
use tracing::{debug, instrument};

use crate::domain::{
    BaselineImpact, CatalogNumber, Control, Document, EmptyCatalogNumber, Enhancement, Statement,
};

/// Decodes the XML control catalog into a [`Document`].
///
/// Namespace prefixes on element names are ignored, so both the published
/// feed (`<controls:control>`) and unprefixed documents decode. Elements the
/// catalog does not use (supplemental guidance, references, ...) are skipped.
///
/// # Errors
///
/// Returns a [`DecodeError`] if the bytes are not well-formed catalog XML or
/// if a control or enhancement has no catalog number.
#[instrument(level = "debug", skip_all, fields(bytes = bytes.len()))]
pub fn decode(bytes: &[u8]) -> Result<Document, DecodeError> {
    let raw: XmlCatalog = quick_xml::de::from_reader(bytes)?;
    debug!("Decoded {} controls", raw.controls.len());

    let controls = raw
        .controls
        .into_iter()
        .map(Control::try_from)
        .collect::<Result<_, _>>()?;

    Ok(Document { controls })
}

/// Errors that can occur while decoding the catalog.
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    /// The document is not well-formed or does not have the catalog's shape.
    #[error("malformed catalog XML")]
    Xml(#[from] quick_xml::de::DeError),

    /// A control or enhancement has an empty `<number>`.
    #[error("control '{title}' has no catalog number")]
    MissingNumber {
        /// The title of the offending control or enhancement.
        title: String,
        /// The underlying validation error.
        source: EmptyCatalogNumber,
    },
}

#[derive(Debug, Deserialize)]
struct XmlCatalog {
    #[serde(rename = "control", default)]
    controls: Vec<XmlControl>,
}

#[derive(Debug, Deserialize)]
struct XmlControl {
    #[serde(default)]
    family: String,
    #[serde(default)]
    number: String,
    #[serde(default)]
    title: String,
    #[serde(default)]
    priority: Option<String>,
    #[serde(rename = "baseline-impact", default)]
    baseline_impacts: Vec<String>,
    #[serde(rename = "statement", default)]
    statements: Vec<XmlStatement>,
    #[serde(rename = "control-enhancements", default)]
    enhancements: XmlEnhancements,
}

#[derive(Debug, Default, Deserialize)]
struct XmlEnhancements {
    #[serde(rename = "control-enhancement", default)]
    items: Vec<XmlEnhancement>,
}

#[derive(Debug, Deserialize)]
struct XmlEnhancement {
    #[serde(default)]
    number: String,
    #[serde(default)]
    title: String,
    #[serde(rename = "baseline-impact", default)]
    baseline_impacts: Vec<String>,
    #[serde(default)]
    withdrawn: Option<XmlWithdrawn>,
    #[serde(rename = "statement", default)]
    statements: Vec<XmlStatement>,
}

#[derive(Debug, Deserialize)]
struct XmlWithdrawn {
    #[serde(rename = "incorporated-into", default)]
    incorporated_into: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct XmlStatement {
    #[serde(default)]
    number: String,
    #[serde(default)]
    description: String,
    #[serde(rename = "statement", default)]
    statements: Vec<XmlStatement>,
}

fn catalog_number(number: &str, title: &str) -> Result<CatalogNumber, DecodeError> {
    CatalogNumber::new(number).map_err(|source| DecodeError::MissingNumber {
        title: title.to_string(),
        source,
    })
}

fn impacts(raw: Vec<String>) -> Vec<BaselineImpact> {
    raw.into_iter().map(BaselineImpact::from).collect()
}

impl TryFrom<XmlControl> for Control {
    type Error = DecodeError;

    fn try_from(raw: XmlControl) -> Result<Self, Self::Error> {
        Ok(Self {
            number: catalog_number(&raw.number, &raw.title)?,
            family: raw.family.trim().to_string(),
            title: raw.title,
            priority: raw.priority,
            baseline_impacts: impacts(raw.baseline_impacts),
            statements: raw.statements.into_iter().map(Statement::from).collect(),
            enhancements: raw
                .enhancements
                .items
                .into_iter()
                .map(Enhancement::try_from)
                .collect::<Result<_, _>>()?,
        })
    }
}

impl TryFrom<XmlEnhancement> for Enhancement {
    type Error = DecodeError;

    fn try_from(raw: XmlEnhancement) -> Result<Self, Self::Error> {
        Ok(Self {
            number: catalog_number(&raw.number, &raw.title)?,
            title: raw.title,
            baseline_impacts: impacts(raw.baseline_impacts),
            withdrawn: raw.withdrawn.map(|withdrawn| withdrawn.incorporated_into),
            statements: raw.statements.into_iter().map(Statement::from).collect(),
        })
    }
}

impl From<XmlStatement> for Statement {
    fn from(raw: XmlStatement) -> Self {
        Self {
            number: raw.number.trim().to_string(),
            text: raw.description,
            children: raw.statements.into_iter().map(Self::from).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ACCOUNT_MANAGEMENT: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<controls:controls xmlns="http://scap.nist.gov/schema/sp800-53/2.0" xmlns:controls="http://scap.nist.gov/schema/sp800-53/feed/2.0">
  <controls:control>
    <family>ACCESS CONTROL</family>
    <number>AC-2</number>
    <title>ACCOUNT MANAGEMENT</title>
    <priority>P1</priority>
    <baseline-impact>LOW</baseline-impact>
    <baseline-impact>MODERATE</baseline-impact>
    <baseline-impact>HIGH</baseline-impact>
    <statement>
      <description>The organization:</description>
      <statement>
        <number>AC-2a.</number>
        <description>Identifies and selects account types;</description>
      </statement>
      <statement>
        <number>AC-2b.</number>
        <description>Assigns account managers;</description>
      </statement>
    </statement>
    <supplemental-guidance>
      <description>Information system account types include...</description>
      <related>AC-3</related>
    </supplemental-guidance>
    <control-enhancements>
      <control-enhancement>
        <number>AC-2(1)</number>
        <title>AUTOMATED SYSTEM ACCOUNT MANAGEMENT</title>
        <baseline-impact>MODERATE</baseline-impact>
        <statement>
          <description>The organization employs automated mechanisms.</description>
        </statement>
      </control-enhancement>
      <control-enhancement>
        <number>AC-2(6)</number>
        <title>DYNAMIC PRIVILEGE MANAGEMENT</title>
        <withdrawn>
          <incorporated-into>AC-2</incorporated-into>
        </withdrawn>
      </control-enhancement>
    </control-enhancements>
    <references>
      <reference>
        <item href="http://example.com">Reference</item>
      </reference>
    </references>
  </controls:control>
</controls:controls>
"#;

    #[test]
    fn decodes_control_tree() {
        let document = decode(ACCOUNT_MANAGEMENT.as_bytes()).unwrap();
        assert_eq!(document.controls.len(), 1);

        let control = &document.controls[0];
        assert_eq!(control.number.as_str(), "AC-2");
        assert_eq!(control.family, "ACCESS CONTROL");
        assert_eq!(control.title, "ACCOUNT MANAGEMENT");
        assert_eq!(control.priority.as_deref(), Some("P1"));
        assert_eq!(
            control.baseline_impacts,
            [
                BaselineImpact::Low,
                BaselineImpact::Moderate,
                BaselineImpact::High
            ]
        );

        assert_eq!(
            control.statements,
            [Statement::unnumbered("The organization:").with_children(vec![
                Statement::numbered("AC-2a.", "Identifies and selects account types;"),
                Statement::numbered("AC-2b.", "Assigns account managers;"),
            ])]
        );
    }

    #[test]
    fn decodes_enhancements() {
        let document = decode(ACCOUNT_MANAGEMENT.as_bytes()).unwrap();
        let enhancements = &document.controls[0].enhancements;
        assert_eq!(enhancements.len(), 2);

        assert_eq!(enhancements[0].number.as_str(), "AC-2(1)");
        assert_eq!(enhancements[0].baseline_impacts, [BaselineImpact::Moderate]);
        assert_eq!(enhancements[0].withdrawn, None);
        assert_eq!(
            enhancements[0].statements,
            [Statement::unnumbered(
                "The organization employs automated mechanisms."
            )]
        );

        assert_eq!(enhancements[1].number.as_str(), "AC-2(6)");
        assert!(enhancements[1].statements.is_empty());
        assert_eq!(enhancements[1].withdrawn, Some(vec!["AC-2".to_string()]));
    }

    #[test]
    fn empty_catalog() {
        let document = decode(b"<controls></controls>").unwrap();
        assert!(document.controls.is_empty());
    }

    #[test]
    fn malformed_xml_fails() {
        let error = decode(b"<controls><control><number>AC-1</control>").unwrap_err();
        assert!(matches!(error, DecodeError::Xml(_)));
    }

    #[test]
    fn missing_number_fails() {
        let xml = b"<controls><control><family>ACCESS CONTROL</family><title>NO NUMBER</title></control></controls>";
        let error = decode(xml).unwrap_err();
        assert!(matches!(error, DecodeError::MissingNumber { ref title, .. } if title == "NO NUMBER"));
    }
}
