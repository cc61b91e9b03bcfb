use std::collections::BTreeSet;
use std::fmt;

use serde::Serialize;

use super::DataLoadError;

// ---------------------------------------------------------------------------
// Column names of the source table
// ---------------------------------------------------------------------------

pub const SITE_COLUMN: &str = "Launch Site";
pub const PAYLOAD_COLUMN: &str = "Payload Mass (kg)";
pub const OUTCOME_COLUMN: &str = "class";
pub const BOOSTER_COLUMN: &str = "Booster Version Category";

/// Columns every source must carry, in the order they are reported missing.
pub const REQUIRED_COLUMNS: [&str; 4] = [SITE_COLUMN, PAYLOAD_COLUMN, OUTCOME_COLUMN, BOOSTER_COLUMN];

// ---------------------------------------------------------------------------
// LaunchRecord – one row of the table
// ---------------------------------------------------------------------------

/// A single launch (one row of the source table).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LaunchRecord {
    /// Launch site identifier, e.g. `CCAFS LC-40`.
    pub site: String,
    /// Payload mass in kilograms, finite and non-negative.
    pub payload_mass: f64,
    /// `true` for a successful landing (`class == 1`).
    pub outcome: bool,
    /// Booster version category, e.g. `FT` or `B5`.
    pub booster: String,
}

impl LaunchRecord {
    pub fn new(site: impl Into<String>, payload_mass: f64, outcome: bool, booster: impl Into<String>) -> Self {
        Self {
            site: site.into(),
            payload_mass,
            outcome,
            booster: booster.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// SiteSelection – the dropdown value
// ---------------------------------------------------------------------------

/// Either every site (the `"ALL"` sentinel) or a single site id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize)]
pub enum SiteSelection {
    #[default]
    All,
    Site(String),
}

impl SiteSelection {
    /// Sentinel value the dropdown uses for "All Sites".
    pub const ALL: &'static str = "ALL";

    /// Interpret a raw control value.
    pub fn from_value(value: &str) -> Self {
        if value == Self::ALL {
            SiteSelection::All
        } else {
            SiteSelection::Site(value.to_string())
        }
    }

    /// The raw control value for this selection.
    pub fn value(&self) -> &str {
        match self {
            SiteSelection::All => Self::ALL,
            SiteSelection::Site(s) => s,
        }
    }

    /// Whether a record at `site` passes this selection.
    pub fn matches(&self, site: &str) -> bool {
        match self {
            SiteSelection::All => true,
            SiteSelection::Site(s) => s == site,
        }
    }
}

impl fmt::Display for SiteSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SiteSelection::All => write!(f, "All Sites"),
            SiteSelection::Site(s) => write!(f, "{s}"),
        }
    }
}

// ---------------------------------------------------------------------------
// Dataset – the complete loaded table
// ---------------------------------------------------------------------------

/// The full parsed dataset with its pre-computed attributes.
///
/// Fields are private: once built a dataset is never mutated, and the
/// payload bounds always describe `records`.
#[derive(Debug, Clone)]
pub struct Dataset {
    records: Vec<LaunchRecord>,
    sites: BTreeSet<String>,
    boosters: BTreeSet<String>,
    min_payload: f64,
    max_payload: f64,
}

impl Dataset {
    /// Build the dataset and its derived attributes from loaded records.
    pub fn from_records(records: Vec<LaunchRecord>) -> Result<Self, DataLoadError> {
        if records.is_empty() {
            return Err(DataLoadError::Empty);
        }

        let mut sites = BTreeSet::new();
        let mut boosters = BTreeSet::new();
        let mut min_payload = f64::INFINITY;
        let mut max_payload = f64::NEG_INFINITY;

        for (row, rec) in records.iter().enumerate() {
            if !rec.payload_mass.is_finite() || rec.payload_mass < 0.0 {
                return Err(DataLoadError::Malformed {
                    row,
                    column: PAYLOAD_COLUMN,
                    value: rec.payload_mass.to_string(),
                });
            }
            min_payload = min_payload.min(rec.payload_mass);
            max_payload = max_payload.max(rec.payload_mass);
            sites.insert(rec.site.clone());
            boosters.insert(rec.booster.clone());
        }

        Ok(Dataset {
            records,
            sites,
            boosters,
            min_payload,
            max_payload,
        })
    }

    /// All records in source order.
    pub fn records(&self) -> &[LaunchRecord] {
        &self.records
    }

    /// Sorted distinct site ids.
    pub fn sites(&self) -> &BTreeSet<String> {
        &self.sites
    }

    /// Sorted distinct booster categories.
    pub fn boosters(&self) -> &BTreeSet<String> {
        &self.boosters
    }

    pub fn has_site(&self, site: &str) -> bool {
        self.sites.contains(site)
    }

    pub fn min_payload(&self) -> f64 {
        self.min_payload
    }

    pub fn max_payload(&self) -> f64 {
        self.max_payload
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Always `false` for a constructed dataset; kept for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
