use std::collections::BTreeMap;
use std::f64::consts::{FRAC_PI_2, TAU};

use eframe::egui::{self, Color32, RichText, Stroke, Ui};
use egui_extras::{Column, TableBuilder};
use egui_plot::{Legend, Plot, PlotPoint, Points, Polygon, Text};

use crate::binding::{Figure, FigureData, OutputId};
use crate::data::filter::{ScatterPoint, Slice};
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Pie geometry
// ---------------------------------------------------------------------------

/// Arc resolution: points per full turn.
const ARC_STEPS: usize = 96;

/// Point on the unit circle at `frac` of a turn, measured clockwise from
/// 12 o'clock.
fn on_circle(frac: f64, radius: f64) -> [f64; 2] {
    let theta = FRAC_PI_2 - TAU * frac;
    [radius * theta.cos(), radius * theta.sin()]
}

/// Outline of the slice spanning `[start, end]` (fractions of a turn) as a
/// list of wedges, each at most a quarter turn so it stays convex.
pub fn slice_wedges(start: f64, end: f64) -> Vec<Vec<[f64; 2]>> {
    let span = (end - start).max(0.0);
    if span == 0.0 {
        return Vec::new();
    }
    let n_wedges = (span / 0.25).ceil().max(1.0) as usize;
    let wedge_span = span / n_wedges as f64;
    let steps = ((wedge_span * ARC_STEPS as f64).ceil() as usize).max(2);

    (0..n_wedges)
        .map(|w| {
            let w_start = start + w as f64 * wedge_span;
            std::iter::once([0.0, 0.0])
                .chain((0..=steps).map(|i| on_circle(w_start + wedge_span * i as f64 / steps as f64, 1.0)))
                .collect()
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Proportion chart (pie + summary table)
// ---------------------------------------------------------------------------

fn no_data(ui: &mut Ui) {
    ui.centered_and_justified(|ui: &mut Ui| {
        ui.label(RichText::new("No data").italics().weak());
    });
}

/// Render the outcome chart in the top half of the central panel.
pub fn outcome_chart(ui: &mut Ui, state: &AppState, height: f32) {
    let Some(figure) = state.charts.get(OutputId::OutcomeChart) else {
        return;
    };
    let FigureData::Proportion(slices) = &figure.data else {
        return;
    };

    ui.vertical_centered(|ui: &mut Ui| ui.strong(figure.title.as_str()));
    let total: u64 = slices.iter().map(|s| s.value).sum();

    ui.horizontal(|ui: &mut Ui| {
        let pie_width = (ui.available_width() * 0.65).max(200.0);
        ui.allocate_ui(egui::vec2(pie_width, height), |ui: &mut Ui| {
            if total == 0 {
                no_data(ui);
            } else {
                pie(ui, slices, total, state);
            }
        });
        ui.separator();
        ui.vertical(|ui: &mut Ui| summary_table(ui, slices, total));
    });
}

fn pie(ui: &mut Ui, slices: &[Slice], total: u64, state: &AppState) {
    Plot::new("outcome_pie")
        .legend(Legend::default())
        .data_aspect(1.0)
        .show_axes(false)
        .show_grid(false)
        .show_x(false)
        .show_y(false)
        .allow_drag(false)
        .allow_zoom(false)
        .allow_scroll(false)
        .allow_boxed_zoom(false)
        .include_x(-1.2)
        .include_x(1.2)
        .include_y(-1.2)
        .include_y(1.2)
        .show(ui, |plot_ui| {
            let mut start = 0.0;
            for slice in slices {
                let frac = slice.value as f64 / total as f64;
                let color = state.site_colors.slice_color(&slice.label);

                for wedge in slice_wedges(start, start + frac) {
                    plot_ui.polygon(
                        Polygon::new(wedge)
                            .name(&slice.label)
                            .fill_color(color)
                            .stroke(Stroke::new(1.0, color)),
                    );
                }

                if frac > 0.0 {
                    let [x, y] = on_circle(start + frac / 2.0, 0.65);
                    plot_ui.text(Text::new(
                        PlotPoint::new(x, y),
                        RichText::new(format!("{:.1}%", frac * 100.0)).color(Color32::WHITE),
                    ));
                }
                start += frac;
            }
        });
}

fn summary_table(ui: &mut Ui, slices: &[Slice], total: u64) {
    TableBuilder::new(ui)
        .striped(true)
        .column(Column::auto().at_least(120.0))
        .column(Column::auto().at_least(50.0))
        .column(Column::remainder())
        .header(20.0, |mut header| {
            header.col(|ui| {
                ui.strong("Category");
            });
            header.col(|ui| {
                ui.strong("Count");
            });
            header.col(|ui| {
                ui.strong("Share");
            });
        })
        .body(|mut body| {
            for slice in slices {
                body.row(18.0, |mut row| {
                    row.col(|ui| {
                        ui.label(slice.label.as_str());
                    });
                    row.col(|ui| {
                        ui.label(slice.value.to_string());
                    });
                    row.col(|ui| {
                        let share = if total == 0 {
                            0.0
                        } else {
                            slice.value as f64 * 100.0 / total as f64
                        };
                        ui.label(format!("{share:.1}%"));
                    });
                });
            }
        });
}

// ---------------------------------------------------------------------------
// Scatter chart (payload vs. outcome)
// ---------------------------------------------------------------------------

/// Markers grouped by booster category, category order ascending.
pub fn scatter_series(points: &[ScatterPoint]) -> BTreeMap<&str, Vec<[f64; 2]>> {
    let mut series: BTreeMap<&str, Vec<[f64; 2]>> = BTreeMap::new();
    for p in points {
        series
            .entry(p.booster.as_str())
            .or_default()
            .push([p.payload_mass, if p.outcome { 1.0 } else { 0.0 }]);
    }
    series
}

/// Render the scatter chart in the bottom half of the central panel.
pub fn scatter_chart(ui: &mut Ui, state: &AppState) {
    let Some(figure) = state.charts.get(OutputId::ScatterChart) else {
        return;
    };
    let FigureData::Scatter(points) = &figure.data else {
        return;
    };

    ui.vertical_centered(|ui: &mut Ui| ui.strong(figure.title.as_str()));
    if figure.is_empty() {
        ui.label(RichText::new("No data").italics().weak());
    }

    scatter_plot(ui, figure, points, state);
}

fn scatter_plot(ui: &mut Ui, figure: &Figure, points: &[ScatterPoint], state: &AppState) {
    Plot::new("payload_scatter")
        .legend(Legend::default())
        .x_axis_label(figure.x_label.clone())
        .y_axis_label(figure.y_label.clone())
        .include_x(state.slider.min)
        .include_x(state.slider.max)
        .include_y(-0.25)
        .include_y(1.25)
        .allow_boxed_zoom(true)
        .allow_drag(true)
        .allow_scroll(true)
        .allow_zoom(true)
        .show(ui, |plot_ui| {
            for (booster, markers) in scatter_series(points) {
                plot_ui.points(
                    Points::new(markers)
                        .name(booster)
                        .color(state.booster_colors.color_for(booster))
                        .radius(4.0),
                );
            }
        });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: [f64; 2], b: [f64; 2]) -> bool {
        (a[0] - b[0]).abs() < 1e-9 && (a[1] - b[1]).abs() < 1e-9
    }

    #[test]
    fn slices_start_at_twelve_and_run_clockwise() {
        let wedges = slice_wedges(0.0, 0.25);
        assert_eq!(wedges.len(), 1);
        let w = &wedges[0];
        assert!(close(w[0], [0.0, 0.0]));
        assert!(close(w[1], [0.0, 1.0]));
        assert!(close(*w.last().unwrap(), [1.0, 0.0]));
    }

    #[test]
    fn large_slices_split_into_convex_wedges() {
        assert_eq!(slice_wedges(0.0, 1.0).len(), 4);
        assert_eq!(slice_wedges(0.1, 0.6).len(), 2);
        assert!(slice_wedges(0.3, 0.3).is_empty());
    }

    #[test]
    fn scatter_groups_by_booster() {
        let pts = vec![
            ScatterPoint { payload_mass: 10.0, outcome: true, booster: "FT".into() },
            ScatterPoint { payload_mass: 20.0, outcome: false, booster: "B4".into() },
            ScatterPoint { payload_mass: 30.0, outcome: false, booster: "FT".into() },
        ];
        let series = scatter_series(&pts);
        assert_eq!(series.keys().copied().collect::<Vec<_>>(), ["B4", "FT"]);
        assert_eq!(series["FT"], vec![[10.0, 1.0], [30.0, 0.0]]);
    }
}
