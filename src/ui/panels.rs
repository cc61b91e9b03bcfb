use eframe::egui::{self, Color32, RichText, Ui};

use crate::data::model::SiteSelection;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Left side panel – filter widgets
// ---------------------------------------------------------------------------

/// Render the left filter panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Filters");
    ui.separator();

    // ---- Site dropdown (searchable) ----
    ui.strong("Launch Site");
    ui.add(
        egui::TextEdit::singleline(&mut state.site_search)
            .hint_text("Select a Launch Site here"),
    );

    let current = state.selection.site.clone();
    let mut picked: Option<SiteSelection> = None;
    egui::ComboBox::from_id_salt("site_dropdown")
        .selected_text(current.to_string())
        .width(ui.available_width())
        .show_ui(ui, |ui: &mut Ui| {
            for option in state.site_options() {
                let label = option.to_string();
                if ui.selectable_label(option == current, label).clicked() {
                    picked = Some(option);
                }
            }
        });
    if let Some(site) = picked {
        state.set_site(site.value());
    }

    ui.add_space(8.0);
    ui.separator();

    // ---- Payload range selector ----
    ui.strong("Payload range (kg)");
    let cfg = state.slider;
    let [mut low, mut high] = state.selection.payload_range;

    // No `step_by`: the slider would round the dataset's own bounds to a step
    // multiple on the first frame and drop records at either end.
    let low_changed = ui
        .add(egui::Slider::new(&mut low, cfg.min..=cfg.max).text("from"))
        .changed();
    let high_changed = ui
        .add(egui::Slider::new(&mut high, cfg.min..=cfg.max).text("to"))
        .changed();

    ui.horizontal_wrapped(|ui: &mut Ui| {
        for mark in cfg.marks() {
            ui.small(format!("{mark:.0}"));
        }
    });

    // A crossed pair of sliders is delivered as-is; the scatter chart reports it.
    if low_changed || high_changed {
        state.set_payload_range([low, high]);
    }

    if ui.small_button("Reset range").clicked() {
        state.set_payload_range([state.dataset.min_payload(), state.dataset.max_payload()]);
    }
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the title bar with record counts and the fault status line.
pub fn top_bar(ui: &mut Ui, state: &AppState) {
    ui.vertical_centered(|ui: &mut Ui| {
        ui.heading("SpaceX Launch Records Dashboard");
    });

    ui.horizontal(|ui: &mut Ui| {
        ui.label(format!(
            "{} launches loaded, {} in range",
            state.dataset.len(),
            state.in_range_count()
        ));

        if let Some(msg) = state.status_message() {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::binding::{FigureData, OutputId};
    use crate::data::model::{Dataset, LaunchRecord};

    fn run_idle_frames(state: &mut AppState, frames: usize) {
        let ctx = egui::Context::default();
        for _ in 0..frames {
            let _ = ctx.run(egui::RawInput::default(), |ctx| {
                egui::CentralPanel::default().show(ctx, |ui| side_panel(ui, state));
            });
        }
    }

    #[test]
    fn idle_frames_keep_the_dataset_payload_span() {
        let ds = Dataset::from_records(vec![
            LaunchRecord::new("CCAFS LC-40", 600.0, false, "v1.0"),
            LaunchRecord::new("KSC LC-39A", 5000.0, true, "FT"),
            LaunchRecord::new("VAFB SLC-4E", 9400.0, true, "B4"),
        ])
        .unwrap();
        let mut state = AppState::new(Arc::new(ds));

        run_idle_frames(&mut state, 3);

        assert_eq!(state.selection.payload_range, [600.0, 9400.0]);
        match &state.charts.get(OutputId::ScatterChart).unwrap().data {
            FigureData::Scatter(points) => assert_eq!(points.len(), 3),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn reset_survives_following_frames() {
        let ds = Dataset::from_records(vec![
            LaunchRecord::new("A", 1234.0, true, "FT"),
            LaunchRecord::new("A", 8765.0, false, "B5"),
        ])
        .unwrap();
        let mut state = AppState::new(Arc::new(ds));
        state.set_payload_range([2000.0, 3000.0]);
        state.set_payload_range([state.dataset.min_payload(), state.dataset.max_payload()]);

        run_idle_frames(&mut state, 2);

        assert_eq!(state.selection.payload_range, [1234.0, 8765.0]);
        assert_eq!(state.in_range_count(), 2);
    }
}
