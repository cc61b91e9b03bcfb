use std::collections::BTreeMap;

use serde::Serialize;

use super::EngineError;
use super::model::{Dataset, SiteSelection};

// ---------------------------------------------------------------------------
// Selection state: what the two controls currently hold
// ---------------------------------------------------------------------------

/// Closed payload interval `[low, high]` in kilograms.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PayloadRange {
    low: f64,
    high: f64,
}

impl PayloadRange {
    /// Fails when `low > high` or either bound is NaN. Bounds outside the
    /// dataset's payload span are accepted as-is.
    pub fn new(low: f64, high: f64) -> Result<Self, EngineError> {
        if low.is_nan() || high.is_nan() || low > high {
            return Err(EngineError::InvalidRange { low, high });
        }
        Ok(Self { low, high })
    }

    pub fn low(&self) -> f64 {
        self.low
    }

    pub fn high(&self) -> f64 {
        self.high
    }

    pub fn contains(&self, mass: f64) -> bool {
        self.low <= mass && mass <= self.high
    }
}

/// The full input snapshot handed to every derivation.
///
/// `payload_range` is kept raw, exactly as the slider delivered it; it is
/// validated by the derivation that needs it.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectionState {
    pub site: SiteSelection,
    pub payload_range: [f64; 2],
}

impl SelectionState {
    /// First-render selection: every site, the dataset's whole payload span.
    pub fn initial(dataset: &Dataset) -> Self {
        Self {
            site: SiteSelection::All,
            payload_range: [dataset.min_payload(), dataset.max_payload()],
        }
    }

    pub fn range(&self) -> Result<PayloadRange, EngineError> {
        PayloadRange::new(self.payload_range[0], self.payload_range[1])
    }
}

// ---------------------------------------------------------------------------
// Derived views
// ---------------------------------------------------------------------------

pub const SUCCESS_LABEL: &str = "Success";
pub const FAILURE_LABEL: &str = "Failure";

/// One category of the proportion chart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Slice {
    pub label: String,
    pub value: u64,
}

impl Slice {
    fn new(label: impl Into<String>, value: u64) -> Self {
        Self {
            label: label.into(),
            value,
        }
    }
}

/// One marker of the scatter chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScatterPoint {
    pub payload_mass: f64,
    pub outcome: bool,
    pub booster: String,
}

// ---------------------------------------------------------------------------
// Derivations
// ---------------------------------------------------------------------------

/// Proportion breakdown for the selected site.
///
/// * `All` → successful launches per site, one slice per distinct site,
///   ascending by site id.
/// * `Site(id)` → `Success` and `Failure` counts for that site, in that
///   order; empty when the site has no records.
pub fn outcome_summary(dataset: &Dataset, site: &SiteSelection) -> Result<Vec<Slice>, EngineError> {
    match site {
        SiteSelection::All => {
            let mut per_site: BTreeMap<&str, u64> = BTreeMap::new();
            for rec in dataset.records() {
                *per_site.entry(rec.site.as_str()).or_default() += u64::from(rec.outcome);
            }
            Ok(per_site
                .into_iter()
                .map(|(site, successes)| Slice::new(site, successes))
                .collect())
        }
        SiteSelection::Site(id) => {
            if !dataset.has_site(id) {
                return Err(EngineError::InvalidSelection(id.clone()));
            }
            let (mut success, mut failure) = (0u64, 0u64);
            for rec in dataset.records().iter().filter(|r| r.site == *id) {
                if rec.outcome {
                    success += 1;
                } else {
                    failure += 1;
                }
            }
            if success + failure == 0 {
                return Ok(Vec::new());
            }
            Ok(vec![
                Slice::new(SUCCESS_LABEL, success),
                Slice::new(FAILURE_LABEL, failure),
            ])
        }
    }
}

/// Records whose payload lies in `range` (inclusive) and whose site passes
/// `site`, in dataset order. An unknown site simply matches nothing.
pub fn scatter_set(dataset: &Dataset, site: &SiteSelection, range: PayloadRange) -> Vec<ScatterPoint> {
    dataset
        .records()
        .iter()
        .filter(|rec| range.contains(rec.payload_mass) && site.matches(&rec.site))
        .map(|rec| ScatterPoint {
            payload_mass: rec.payload_mass,
            outcome: rec.outcome,
            booster: rec.booster.clone(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::LaunchRecord;

    fn three() -> Dataset {
        Dataset::from_records(vec![
            LaunchRecord::new("A", 1000.0, true, "FT"),
            LaunchRecord::new("B", 2000.0, false, "v1.1"),
            LaunchRecord::new("A", 3000.0, true, "B4"),
        ])
        .unwrap()
    }

    #[test]
    fn all_sites_sums_successes_per_site() {
        let slices = outcome_summary(&three(), &SiteSelection::All).unwrap();
        assert_eq!(slices, vec![Slice::new("A", 2), Slice::new("B", 0)]);
    }

    #[test]
    fn single_site_counts_success_and_failure() {
        let slices = outcome_summary(&three(), &SiteSelection::Site("A".into())).unwrap();
        assert_eq!(slices, vec![Slice::new("Success", 2), Slice::new("Failure", 0)]);

        let slices = outcome_summary(&three(), &SiteSelection::Site("B".into())).unwrap();
        assert_eq!(slices, vec![Slice::new("Success", 0), Slice::new("Failure", 1)]);
    }

    #[test]
    fn unknown_site_is_invalid_selection() {
        let err = outcome_summary(&three(), &SiteSelection::Site("C".into())).unwrap_err();
        assert_eq!(err, EngineError::InvalidSelection("C".into()));
    }

    #[test]
    fn scatter_filters_by_site_and_inclusive_range() {
        let ds = three();
        let range = PayloadRange::new(1000.0, 3000.0).unwrap();
        let points = scatter_set(&ds, &SiteSelection::All, range);
        assert_eq!(points.len(), 3);

        let points = scatter_set(&ds, &SiteSelection::Site("B".into()), range);
        assert_eq!(points.len(), 1);
        assert_eq!(points[0].booster, "v1.1");
        assert!(!points[0].outcome);

        let narrow = PayloadRange::new(1500.0, 3000.0).unwrap();
        let masses: Vec<f64> = scatter_set(&ds, &SiteSelection::All, narrow)
            .iter()
            .map(|p| p.payload_mass)
            .collect();
        assert_eq!(masses, [2000.0, 3000.0]);
    }

    #[test]
    fn scatter_unknown_site_is_empty() {
        let range = PayloadRange::new(0.0, 10_000.0).unwrap();
        assert!(scatter_set(&three(), &SiteSelection::Site("C".into()), range).is_empty());
    }

    #[test]
    fn inverted_or_nan_range_is_rejected() {
        assert_eq!(
            PayloadRange::new(5000.0, 3000.0),
            Err(EngineError::InvalidRange { low: 5000.0, high: 3000.0 })
        );
        assert!(PayloadRange::new(f64::NAN, 1.0).is_err());
        assert!(PayloadRange::new(7.0, 7.0).is_ok());
    }

    #[test]
    fn initial_selection_spans_the_dataset() {
        let sel = SelectionState::initial(&three());
        assert_eq!(sel.site, SiteSelection::All);
        assert_eq!(sel.payload_range, [1000.0, 3000.0]);
        assert!(sel.range().is_ok());
    }
}
