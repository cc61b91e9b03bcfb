//! Launch records dashboard.
//!
//! The dataset is loaded once ([`data::loader`]), filtered and aggregated by
//! pure derivations ([`data::filter`]) and wired to the two charts through a
//! dependency registry ([`binding`]). Everything under [`ui`] and [`app`] is
//! egui presentation on top of that.

pub mod app;
pub mod binding;
pub mod color;
pub mod data;
pub mod state;
pub mod ui;
