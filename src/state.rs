use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use crate::binding::{ChartSink, Fault, Figure, InputId, OutputId, Registry};
use crate::color::ColorMap;
use crate::data::filter::SelectionState;
use crate::data::model::{Dataset, SiteSelection};

// ---------------------------------------------------------------------------
// Range selector geometry
// ---------------------------------------------------------------------------

/// Bounds and tick labels of the payload range selector. `step` only sizes
/// the widening of `max`; the sliders themselves are continuous.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SliderConfig {
    pub min: f64,
    pub max: f64,
    pub step: f64,
    pub mark_every: f64,
}

impl Default for SliderConfig {
    fn default() -> Self {
        Self {
            min: 0.0,
            max: 10_000.0,
            step: 1_000.0,
            mark_every: 2_000.0,
        }
    }
}

impl SliderConfig {
    /// The default `[0, 10000]` selector, widened to the next step multiple
    /// when the heaviest payload does not fit.
    pub fn for_dataset(dataset: &Dataset) -> Self {
        let mut cfg = Self::default();
        if dataset.max_payload() > cfg.max {
            cfg.max = (dataset.max_payload() / cfg.step).ceil() * cfg.step;
        }
        cfg
    }

    /// Tick positions every `mark_every` from `min`, always ending on `max`.
    pub fn marks(&self) -> Vec<f64> {
        let n = ((self.max - self.min) / self.mark_every).floor() as usize;
        let mut marks: Vec<f64> = (0..=n).map(|i| self.min + i as f64 * self.mark_every).collect();
        if marks.last().is_some_and(|&last| last < self.max) {
            marks.push(self.max);
        }
        marks
    }
}

// ---------------------------------------------------------------------------
// Chart slots: the sink the bindings write into
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
pub struct ChartSlots {
    figures: BTreeMap<OutputId, Figure>,
}

impl ChartSlots {
    pub fn get(&self, output: OutputId) -> Option<&Figure> {
        self.figures.get(&output)
    }
}

impl ChartSink for ChartSlots {
    fn replace(&mut self, output: OutputId, figure: Figure) {
        self.figures.insert(output, figure);
    }
}

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    pub dataset: Arc<Dataset>,
    registry: Registry,

    /// Current control values.
    pub selection: SelectionState,

    /// Latest figure per chart.
    pub charts: ChartSlots,

    pub slider: SliderConfig,

    /// Colours per booster category (scatter) and per site (pie).
    pub booster_colors: ColorMap,
    pub site_colors: ColorMap,

    /// Text typed into the site dropdown's search box.
    pub site_search: String,

    /// Faults from the last evaluation of each chart.
    faults: BTreeMap<OutputId, Fault>,
}

impl AppState {
    /// Wire the dashboard bindings and run the first render.
    pub fn new(dataset: Arc<Dataset>) -> Self {
        let registry = Registry::dashboard(Arc::clone(&dataset));
        let mut charts = ChartSlots::default();
        let (selection, faults) = registry.initialize(&mut charts);

        let mut state = Self {
            slider: SliderConfig::for_dataset(&dataset),
            booster_colors: ColorMap::new(dataset.boosters()),
            site_colors: ColorMap::new(dataset.sites()),
            dataset,
            registry,
            selection,
            charts,
            site_search: String::new(),
            faults: BTreeMap::new(),
        };
        state.record_faults(&BTreeSet::from([InputId::Site, InputId::PayloadRange]), faults);
        state
    }

    /// Options offered by the site dropdown: `ALL` then every site whose id
    /// contains the search text (case-insensitive).
    pub fn site_options(&self) -> Vec<SiteSelection> {
        let needle = self.site_search.trim().to_lowercase();
        std::iter::once(SiteSelection::All)
            .chain(
                self.dataset
                    .sites()
                    .iter()
                    .filter(|s| needle.is_empty() || s.to_lowercase().contains(&needle))
                    .map(|s| SiteSelection::Site(s.clone())),
            )
            .collect()
    }

    /// Apply a new dropdown value (`"ALL"` or a site id).
    pub fn set_site(&mut self, value: &str) {
        let site = SiteSelection::from_value(value);
        if site == self.selection.site {
            return;
        }
        self.selection.site = site;
        self.apply(BTreeSet::from([InputId::Site]));
    }

    /// Apply a new `[low, high]` from the range selector.
    pub fn set_payload_range(&mut self, range: [f64; 2]) {
        if range == self.selection.payload_range {
            return;
        }
        self.selection.payload_range = range;
        self.apply(BTreeSet::from([InputId::PayloadRange]));
    }

    fn apply(&mut self, changed: BTreeSet<InputId>) {
        let faults = self.registry.dispatch(&changed, &self.selection, &mut self.charts);
        self.record_faults(&changed, faults);
    }

    /// Clear faults of the charts that were just re-evaluated, then store the
    /// new ones.
    fn record_faults(&mut self, changed: &BTreeSet<InputId>, faults: Vec<Fault>) {
        for output in self.registry.dependents(changed) {
            self.faults.remove(&output);
        }
        for fault in faults {
            self.faults.insert(fault.output, fault);
        }
    }

    /// Status line for the top bar, `None` when every chart rendered cleanly.
    pub fn status_message(&self) -> Option<String> {
        if self.faults.is_empty() {
            return None;
        }
        let msgs: Vec<String> = self.faults.values().map(|f| f.error.to_string()).collect();
        Some(format!("Error: {}", msgs.join("; ")))
    }

    /// Number of records inside the current payload range (any site).
    pub fn in_range_count(&self) -> usize {
        match self.selection.range() {
            Ok(range) => self
                .dataset
                .records()
                .iter()
                .filter(|r| range.contains(r.payload_mass))
                .count(),
            Err(_) => 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binding::FigureData;
    use crate::data::model::LaunchRecord;

    fn state() -> AppState {
        let ds = Dataset::from_records(vec![
            LaunchRecord::new("CCAFS LC-40", 500.0, false, "v1.0"),
            LaunchRecord::new("KSC LC-39A", 4000.0, true, "FT"),
            LaunchRecord::new("KSC LC-39A", 9600.0, true, "B5"),
        ])
        .unwrap();
        AppState::new(Arc::new(ds))
    }

    fn scatter_len(state: &AppState) -> usize {
        match &state.charts.get(OutputId::ScatterChart).unwrap().data {
            FigureData::Scatter(points) => points.len(),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn first_render_fills_both_charts() {
        let st = state();
        assert_eq!(st.selection.payload_range, [500.0, 9600.0]);
        assert_eq!(scatter_len(&st), 3);
        let pie = st.charts.get(OutputId::OutcomeChart).unwrap();
        assert_eq!(pie.title, "Total Successful Launches by Site");
        assert!(st.status_message().is_none());
    }

    #[test]
    fn site_change_updates_both_charts() {
        let mut st = state();
        st.set_site("KSC LC-39A");
        assert_eq!(scatter_len(&st), 2);
        let pie = st.charts.get(OutputId::OutcomeChart).unwrap();
        assert_eq!(pie.title, "Launch Outcomes for KSC LC-39A");
    }

    #[test]
    fn bad_range_blanks_scatter_until_fixed() {
        let mut st = state();
        st.set_payload_range([5000.0, 3000.0]);
        assert_eq!(scatter_len(&st), 0);
        assert!(st.status_message().unwrap().contains("invalid payload range"));
        assert_eq!(st.in_range_count(), 0);

        st.set_payload_range([0.0, 5000.0]);
        assert_eq!(scatter_len(&st), 2);
        assert!(st.status_message().is_none());
        assert_eq!(st.in_range_count(), 2);
    }

    #[test]
    fn unknown_site_reports_fault() {
        let mut st = state();
        st.set_site("VAFB SLC-4E");
        assert!(st.charts.get(OutputId::OutcomeChart).unwrap().is_empty());
        assert!(st.status_message().unwrap().contains("VAFB SLC-4E"));
        st.set_site("ALL");
        assert!(st.status_message().is_none());
    }

    #[test]
    fn search_narrows_site_options() {
        let mut st = state();
        assert_eq!(st.site_options().len(), 3);
        st.site_search = "ksc".into();
        assert_eq!(
            st.site_options(),
            [SiteSelection::All, SiteSelection::Site("KSC LC-39A".into())]
        );
    }

    #[test]
    fn slider_widens_past_ten_tonnes() {
        let cfg = SliderConfig::default();
        assert_eq!(cfg.marks(), [0.0, 2000.0, 4000.0, 6000.0, 8000.0, 10000.0]);

        let heavy = Dataset::from_records(vec![LaunchRecord::new("A", 15_600.0, true, "B5")]).unwrap();
        let cfg = SliderConfig::for_dataset(&heavy);
        assert_eq!(cfg.max, 16_000.0);
        assert_eq!(cfg.marks().last(), Some(&16_000.0));
    }

    #[test]
    fn marks_end_on_an_uneven_max() {
        let cfg = SliderConfig {
            max: 15_000.0,
            ..SliderConfig::default()
        };
        let marks = cfg.marks();
        assert_eq!(marks.len(), 9);
        assert_eq!(&marks[6..], [12_000.0, 14_000.0, 15_000.0]);
    }
}
