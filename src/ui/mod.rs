//! egui rendering. Panels mutate [`crate::state::AppState`] through its
//! setters; charts only read the latest figures.

pub mod panels;
pub mod plot;
