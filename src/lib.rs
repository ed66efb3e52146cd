//! Rusty Pedals: an egui dashboard over hourly bike rental counts.
//!
//! The [`data`] layer is UI-free: load a file into an immutable
//! [`RentalDataset`](data::model::RentalDataset), then call
//! [`render`](data::view::render) with a
//! [`FilterSelection`](data::filter::FilterSelection) whenever the selection
//! changes. Everything else draws the resulting view.

pub mod app;
pub mod cli;
pub mod color;
pub mod data;
pub mod state;
pub mod ui;
