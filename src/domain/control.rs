use std::{fmt, ops::Deref, str::FromStr};

use non_empty_string::NonEmptyString;
use serde::{Deserialize, Serialize};

use crate::domain::{Outline, RenderError, Statement, family};

/// A catalog number: the unique key of a control or enhancement (e.g. `AC-2`,
/// `AC-2(1)`).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct CatalogNumber(NonEmptyString);

impl CatalogNumber {
    /// Creates a new `CatalogNumber`.
    ///
    /// Surrounding whitespace is trimmed.
    ///
    /// # Errors
    ///
    /// Returns [`EmptyCatalogNumber`] if nothing remains after trimming.
    pub fn new(s: &str) -> Result<Self, EmptyCatalogNumber> {
        NonEmptyString::new(s.trim().to_string())
            .map(Self)
            .map_err(|_| EmptyCatalogNumber)
    }

    /// Returns the string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl Deref for CatalogNumber {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        self.0.as_str()
    }
}

impl fmt::Display for CatalogNumber {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for CatalogNumber {
    type Err = EmptyCatalogNumber;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<&str> for CatalogNumber {
    type Error = EmptyCatalogNumber;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl Serialize for CatalogNumber {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Error returned when a catalog number is empty.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("catalog number must not be empty")]
pub struct EmptyCatalogNumber;

/// An applicability tag attached to a control or enhancement.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum BaselineImpact {
    /// The low-impact baseline.
    Low,
    /// The moderate-impact baseline.
    Moderate,
    /// The high-impact baseline.
    High,
    /// A tag outside the known baselines, kept as written.
    Other(String),
}

impl From<&str> for BaselineImpact {
    fn from(value: &str) -> Self {
        let value = value.trim();
        match value.to_ascii_uppercase().as_str() {
            "LOW" => Self::Low,
            "MODERATE" => Self::Moderate,
            "HIGH" => Self::High,
            _ => Self::Other(value.to_string()),
        }
    }
}

impl From<String> for BaselineImpact {
    fn from(value: String) -> Self {
        Self::from(value.as_str())
    }
}

impl From<BaselineImpact> for String {
    fn from(impact: BaselineImpact) -> Self {
        impact.to_string()
    }
}

impl fmt::Display for BaselineImpact {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Low => f.write_str("LOW"),
            Self::Moderate => f.write_str("MODERATE"),
            Self::High => f.write_str("HIGH"),
            Self::Other(other) => f.write_str(other),
        }
    }
}

/// A base control from the source catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Control {
    /// The control's catalog number (e.g. `AC-2`).
    pub number: CatalogNumber,

    /// The raw uppercase family name (e.g. `ACCESS CONTROL`).
    pub family: String,

    /// The raw title.
    pub title: String,

    /// The priority code (e.g. `P1`), if the source gives one.
    pub priority: Option<String>,

    /// The baselines this control applies to.
    pub baseline_impacts: Vec<BaselineImpact>,

    /// Top-level statements, in source order.
    pub statements: Vec<Statement>,

    /// Enhancements of this control, in source order.
    pub enhancements: Vec<Enhancement>,
}

impl Control {
    /// The two-letter code of this control's family.
    ///
    /// Empty if the family name is not recognised.
    #[must_use]
    pub fn family_code(&self) -> &'static str {
        family::code(&self.family)
    }
}

/// An enhancement of a base control.
///
/// Enhancements share their parent's family and never nest further.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Enhancement {
    /// The enhancement's catalog number (e.g. `AC-2(1)`).
    pub number: CatalogNumber,

    /// The raw title.
    pub title: String,

    /// The baselines this enhancement applies to.
    pub baseline_impacts: Vec<BaselineImpact>,

    /// The controls this enhancement was incorporated into, if it has been
    /// withdrawn.
    pub withdrawn: Option<Vec<String>>,

    /// Top-level statements, in source order.
    pub statements: Vec<Statement>,
}

/// A decoded control catalog document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Document {
    /// The base controls, in source order.
    pub controls: Vec<Control>,
}

/// The flattened projection of a control or enhancement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ControlRecord {
    /// The two-letter family code, or empty if unmapped.
    pub family: String,

    /// The title-cased name.
    pub name: String,

    /// The quote-wrapped outline description.
    pub description: String,
}

impl ControlRecord {
    /// Builds a record from a raw title and statement tree.
    ///
    /// # Errors
    ///
    /// Returns a [`RenderError`] if the statements' numbering does not match
    /// the outline's family.
    pub fn new(
        outline: &Outline,
        title: &str,
        statements: &[Statement],
    ) -> Result<Self, RenderError> {
        Ok(Self {
            family: outline.family().to_string(),
            name: title_case(title),
            description: outline.describe(statements)?,
        })
    }
}

/// Normalizes a title so each word starts with an uppercase letter and the
/// rest is lowercase.
///
/// A word starts at the beginning of the string or after any character that
/// is not alphanumeric, `_` or `'`.
///
/// # Examples
///
/// ```
/// use control_catalog::domain::title_case;
///
/// assert_eq!(title_case("ACCOUNT MANAGEMENT"), "Account Management");
/// assert_eq!(title_case("LEAST PRIVILEGE | NON-PRIVILEGED ACCESS"), "Least Privilege | Non-Privileged Access");
/// ```
#[must_use]
pub fn title_case(title: &str) -> String {
    let mut out = String::with_capacity(title.len());
    let mut word_start = true;

    for c in title.chars() {
        if word_start {
            out.extend(c.to_uppercase());
        } else {
            out.extend(c.to_lowercase());
        }
        word_start = !(c.is_alphanumeric() || c == '_' || c == '\'');
    }

    out
}
