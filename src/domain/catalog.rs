use std::collections::BTreeMap;

use serde::Serialize;
use tracing::{debug, instrument, warn};

use crate::domain::{
    BaselineImpact, CatalogNumber, ControlRecord, Document, Outline, RenderError,
};

/// The name given to catalogs built with the default configuration.
pub const DEFAULT_CATALOG_NAME: &str = "NIST-800-53";

/// A named, flat catalog of control records keyed by catalog number.
///
/// Serializes as a single mapping: `name` first, then one entry per catalog
/// number in lexical order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Catalog {
    name: String,
    #[serde(flatten)]
    controls: BTreeMap<CatalogNumber, ControlRecord>,
}

impl Catalog {
    /// Wraps extracted records with a catalog name.
    #[must_use]
    pub fn new(name: impl Into<String>, controls: BTreeMap<CatalogNumber, ControlRecord>) -> Self {
        Self {
            name: name.into(),
            controls,
        }
    }

    /// The catalog's name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The records, keyed by catalog number.
    #[must_use]
    pub const fn controls(&self) -> &BTreeMap<CatalogNumber, ControlRecord> {
        &self.controls
    }

    /// Looks up a single record.
    #[must_use]
    pub fn get(&self, number: &str) -> Option<&ControlRecord> {
        CatalogNumber::new(number)
            .ok()
            .and_then(|number| self.controls.get(&number))
    }

    /// The number of records in the catalog.
    #[must_use]
    pub fn len(&self) -> usize {
        self.controls.len()
    }

    /// Whether the catalog has no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.controls.is_empty()
    }
}

/// Selects which controls and enhancements are extracted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum BaselineFilter {
    /// Extract everything.
    #[default]
    All,

    /// Extract only entries tagged with the given baseline.
    Impact(BaselineImpact),
}

impl BaselineFilter {
    /// Whether an entry with the given baseline tags passes the filter.
    #[must_use]
    pub fn accepts(&self, impacts: &[BaselineImpact]) -> bool {
        match self {
            Self::All => true,
            Self::Impact(impact) => impacts.contains(impact),
        }
    }
}

impl From<Option<BaselineImpact>> for BaselineFilter {
    fn from(impact: Option<BaselineImpact>) -> Self {
        impact.map_or(Self::All, Self::Impact)
    }
}

/// Flattens every control and enhancement in `document` into records keyed
/// by catalog number.
///
/// Enhancements are rendered with their parent's family code and stored as
/// independent entries alongside their parent.
///
/// # Errors
///
/// Returns a [`RenderError`] as soon as any statement's numbering does not
/// match its control's family. No partial result is returned.
#[instrument(level = "debug", skip_all, fields(controls = document.controls.len()))]
pub fn extract(
    document: &Document,
    filter: &BaselineFilter,
) -> Result<BTreeMap<CatalogNumber, ControlRecord>, RenderError> {
    let mut records = BTreeMap::new();

    for control in &document.controls {
        let code = control.family_code();
        if code.is_empty() {
            warn!(
                "Unrecognised family '{}' for control {}",
                control.family, control.number
            );
        }
        let outline = Outline::new(code)?;

        if filter.accepts(&control.baseline_impacts) {
            let record = ControlRecord::new(&outline, &control.title, &control.statements)?;
            insert(&mut records, control.number.clone(), record);
        } else {
            debug!("Skipping control {} (filtered by baseline)", control.number);
        }

        for enhancement in &control.enhancements {
            if !filter.accepts(&enhancement.baseline_impacts) {
                debug!("Skipping enhancement {} (filtered by baseline)", enhancement.number);
                continue;
            }
            if let Some(incorporated_into) = &enhancement.withdrawn {
                debug!(
                    "Enhancement {} is withdrawn (incorporated into {:?})",
                    enhancement.number, incorporated_into
                );
            }

            let record = ControlRecord::new(&outline, &enhancement.title, &enhancement.statements)?;
            insert(&mut records, enhancement.number.clone(), record);
        }
    }

    Ok(records)
}

fn insert(
    records: &mut BTreeMap<CatalogNumber, ControlRecord>,
    number: CatalogNumber,
    record: ControlRecord,
) {
    debug!("Extracted {number}");
    if records.insert(number.clone(), record).is_some() {
        warn!("Duplicate catalog number {number}; keeping the last occurrence");
    }
}
