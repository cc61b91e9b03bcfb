//! Reactive wiring between the filter controls and the charts.
//!
//! A [`Registry`] holds one [`Binding`] per chart: the set of inputs the chart
//! depends on and a pure derivation from the current [`SelectionState`] to a
//! [`Figure`]. When inputs change, every binding whose input set intersects
//! the change is re-run against the full snapshot and its figure replaces
//! whatever the sink held for that chart.

use std::collections::BTreeSet;
use std::sync::Arc;

use serde::Serialize;

use crate::data::EngineError;
use crate::data::filter::{ScatterPoint, SelectionState, Slice, outcome_summary, scatter_set};
use crate::data::model::{Dataset, SiteSelection};

// ---------------------------------------------------------------------------
// Identifiers
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum InputId {
    Site,
    PayloadRange,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum OutputId {
    OutcomeChart,
    ScatterChart,
}

// ---------------------------------------------------------------------------
// Figure – chart-ready data
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum FigureData {
    /// `(label, value)` pairs drawn as a pie.
    Proportion(Vec<Slice>),
    /// `(x = payload, y = outcome, colour = booster)` markers.
    Scatter(Vec<ScatterPoint>),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Figure {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub data: FigureData,
}

pub const ALL_SITES_TITLE: &str = "Total Successful Launches by Site";
pub const SCATTER_TITLE: &str = "Payload vs. Outcome";
pub const PAYLOAD_AXIS: &str = "Payload Mass (kg)";
pub const OUTCOME_AXIS: &str = "Launch Outcome (1=Success, 0=Failure)";

impl Figure {
    pub fn proportion(title: impl Into<String>, slices: Vec<Slice>) -> Self {
        Self {
            title: title.into(),
            x_label: String::new(),
            y_label: String::new(),
            data: FigureData::Proportion(slices),
        }
    }

    pub fn scatter(points: Vec<ScatterPoint>) -> Self {
        Self {
            title: SCATTER_TITLE.to_string(),
            x_label: PAYLOAD_AXIS.to_string(),
            y_label: OUTCOME_AXIS.to_string(),
            data: FigureData::Scatter(points),
        }
    }

    /// The blank figure shown for `output` after a derivation fault, titled
    /// for the selection that failed.
    pub fn empty(output: OutputId, selection: &SelectionState) -> Self {
        match output {
            OutputId::OutcomeChart => Self::proportion(outcome_title(&selection.site), Vec::new()),
            OutputId::ScatterChart => Self::scatter(Vec::new()),
        }
    }

    pub fn is_empty(&self) -> bool {
        match &self.data {
            FigureData::Proportion(slices) => slices.is_empty(),
            FigureData::Scatter(points) => points.is_empty(),
        }
    }
}

/// Title of the proportion chart for a given site selection.
pub fn outcome_title(site: &SiteSelection) -> String {
    match site {
        SiteSelection::All => ALL_SITES_TITLE.to_string(),
        SiteSelection::Site(id) => format!("Launch Outcomes for {id}"),
    }
}

// ---------------------------------------------------------------------------
// Sink
// ---------------------------------------------------------------------------

/// Receives freshly derived figures. `replace` discards whatever the sink
/// held for `output` before.
pub trait ChartSink {
    fn replace(&mut self, output: OutputId, figure: Figure);
}

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

pub type Derivation = Box<dyn Fn(&Dataset, &SelectionState) -> Result<Figure, EngineError>>;

pub struct Binding {
    pub output: OutputId,
    pub inputs: BTreeSet<InputId>,
    derive: Derivation,
}

/// A derivation that failed; its chart was replaced with [`Figure::empty`].
#[derive(Debug, Clone, PartialEq)]
pub struct Fault {
    pub output: OutputId,
    pub error: EngineError,
}

pub struct Registry {
    dataset: Arc<Dataset>,
    bindings: Vec<Binding>,
}

impl Registry {
    pub fn new(dataset: Arc<Dataset>) -> Self {
        Self {
            dataset,
            bindings: Vec::new(),
        }
    }

    /// The two chart bindings of the launch dashboard.
    pub fn dashboard(dataset: Arc<Dataset>) -> Self {
        let mut registry = Self::new(dataset);
        registry
            .bind(OutputId::OutcomeChart, [InputId::Site], |ds, sel| {
                let slices = outcome_summary(ds, &sel.site)?;
                Ok(Figure::proportion(outcome_title(&sel.site), slices))
            })
            .bind(
                OutputId::ScatterChart,
                [InputId::Site, InputId::PayloadRange],
                |ds, sel| Ok(Figure::scatter(scatter_set(ds, &sel.site, sel.range()?))),
            );
        registry
    }

    /// Declare that `output` is derived from `inputs`. A later binding for the
    /// same output replaces the earlier one.
    pub fn bind<F>(
        &mut self,
        output: OutputId,
        inputs: impl IntoIterator<Item = InputId>,
        derive: F,
    ) -> &mut Self
    where
        F: Fn(&Dataset, &SelectionState) -> Result<Figure, EngineError> + 'static,
    {
        self.bindings.retain(|b| b.output != output);
        self.bindings.push(Binding {
            output,
            inputs: inputs.into_iter().collect(),
            derive: Box::new(derive),
        });
        self
    }

    /// Outputs that would be re-evaluated for a change of `changed`.
    pub fn dependents(&self, changed: &BTreeSet<InputId>) -> Vec<OutputId> {
        self.bindings
            .iter()
            .filter(|b| !b.inputs.is_disjoint(changed))
            .map(|b| b.output)
            .collect()
    }

    /// First render: evaluate every binding against the default selection.
    pub fn initialize(&self, sink: &mut impl ChartSink) -> (SelectionState, Vec<Fault>) {
        let selection = SelectionState::initial(&self.dataset);
        let all: BTreeSet<InputId> = self
            .bindings
            .iter()
            .flat_map(|b| b.inputs.iter().copied())
            .collect();
        let faults = self.dispatch(&all, &selection, sink);
        (selection, faults)
    }

    /// Re-run every binding that depends on any of `changed`, in declaration
    /// order, and hand each result to `sink`.
    pub fn dispatch(
        &self,
        changed: &BTreeSet<InputId>,
        selection: &SelectionState,
        sink: &mut impl ChartSink,
    ) -> Vec<Fault> {
        let mut faults = Vec::new();
        let mut evaluated = Vec::new();

        for binding in self.bindings.iter().filter(|b| !b.inputs.is_disjoint(changed)) {
            evaluated.push(binding.output);
            match (binding.derive)(&self.dataset, selection) {
                Ok(figure) => sink.replace(binding.output, figure),
                Err(error) => {
                    log::warn!("{:?} derivation failed: {error}", binding.output);
                    sink.replace(binding.output, Figure::empty(binding.output, selection));
                    faults.push(Fault {
                        output: binding.output,
                        error,
                    });
                }
            }
        }

        log::debug!("inputs {changed:?} changed, re-evaluated {evaluated:?}");
        faults
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use crate::data::model::LaunchRecord;

    #[derive(Default)]
    struct Recorder {
        figures: BTreeMap<OutputId, Figure>,
    }

    impl ChartSink for Recorder {
        fn replace(&mut self, output: OutputId, figure: Figure) {
            self.figures.insert(output, figure);
        }
    }

    fn registry() -> Registry {
        let ds = Dataset::from_records(vec![
            LaunchRecord::new("A", 1000.0, true, "FT"),
            LaunchRecord::new("B", 2000.0, false, "v1.1"),
            LaunchRecord::new("A", 3000.0, true, "B4"),
        ])
        .unwrap();
        Registry::dashboard(Arc::new(ds))
    }

    #[test]
    fn dependents_follow_declared_edges() {
        let reg = registry();
        assert_eq!(
            reg.dependents(&BTreeSet::from([InputId::PayloadRange])),
            [OutputId::ScatterChart]
        );
        assert_eq!(
            reg.dependents(&BTreeSet::from([InputId::Site])),
            [OutputId::OutcomeChart, OutputId::ScatterChart]
        );
    }

    #[test]
    fn bind_replaces_existing_output() {
        let mut reg = registry();
        reg.bind(OutputId::OutcomeChart, [InputId::PayloadRange], |_, sel| {
            Ok(Figure::empty(OutputId::OutcomeChart, sel))
        });
        assert_eq!(
            reg.dependents(&BTreeSet::from([InputId::Site])),
            [OutputId::ScatterChart]
        );
        assert_eq!(
            reg.dependents(&BTreeSet::from([InputId::PayloadRange])),
            [OutputId::ScatterChart, OutputId::OutcomeChart]
        );
    }

    #[test]
    fn fault_blanks_only_the_affected_chart() {
        let reg = registry();
        let mut sink = Recorder::default();
        let selection = SelectionState {
            site: SiteSelection::All,
            payload_range: [5000.0, 3000.0],
        };
        let faults = reg.dispatch(
            &BTreeSet::from([InputId::Site, InputId::PayloadRange]),
            &selection,
            &mut sink,
        );

        assert_eq!(
            faults,
            [Fault {
                output: OutputId::ScatterChart,
                error: EngineError::InvalidRange { low: 5000.0, high: 3000.0 },
            }]
        );
        assert!(sink.figures[&OutputId::ScatterChart].is_empty());
        assert!(!sink.figures[&OutputId::OutcomeChart].is_empty());
    }

    #[test]
    fn blank_pie_keeps_the_failed_site_in_its_title() {
        let reg = registry();
        let mut sink = Recorder::default();
        let selection = SelectionState {
            site: SiteSelection::Site("C".into()),
            payload_range: [1000.0, 3000.0],
        };
        let faults = reg.dispatch(&BTreeSet::from([InputId::Site]), &selection, &mut sink);

        assert_eq!(faults[0].error, EngineError::InvalidSelection("C".into()));
        let pie = &sink.figures[&OutputId::OutcomeChart];
        assert!(pie.is_empty());
        assert_eq!(pie.title, "Launch Outcomes for C");
    }

    #[test]
    fn outcome_title_names_the_site() {
        assert_eq!(outcome_title(&SiteSelection::All), ALL_SITES_TITLE);
        assert_eq!(
            outcome_title(&SiteSelection::Site("KSC LC-39A".into())),
            "Launch Outcomes for KSC LC-39A"
        );
    }
}
