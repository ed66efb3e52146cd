//! Data layer: core types, loading, enrichment, filtering and aggregation.
//!
//! Architecture:
//! ```text
//!  .csv / .json / .parquet
//!        │
//!        ▼
//!   ┌──────────┐
//!   │  loader   │  parse + validate rows → RentalRecord, LoadReport
//!   └──────────┘
//!        │
//!        ▼
//!   ┌──────────┐
//!   │  derive   │  once per load: calendar fields + labels → EnrichedRecord
//!   └──────────┘
//!        │
//!        ▼
//!   ┌──────────────┐
//!   │ RentalDataset │  immutable Vec<EnrichedRecord>, available years/seasons
//!   └──────────────┘
//!        │   per selection change
//!        ▼
//!   ┌──────────┐     ┌───────────┐     ┌───────────────┐
//!   │  filter   │ ──▶ │ aggregate  │ ──▶ │ view::render  │ → DashboardView
//!   └──────────┘     └───────────┘     └───────────────┘
//! ```

pub mod aggregate;
pub mod derive;
pub mod error;
pub mod filter;
pub mod loader;
pub mod model;
pub mod view;
