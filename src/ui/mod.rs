//! egui rendering of the dashboard. Everything here reads [`AppState`]
//! (or its cached [`DashboardView`]) and, for the panels, calls back into
//! the state's selection methods.
//!
//! [`AppState`]: crate::state::AppState
//! [`DashboardView`]: crate::data::view::DashboardView

pub mod format;
pub mod heatmap;
pub mod panels;
pub mod plot;
