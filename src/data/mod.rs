//! Data layer: loading, filtering, aggregation and presentation.
//!
//! Architecture:
//! ```text
//!  .xlsx / .csv / .json / .parquet
//!        │
//!        ▼
//!   ┌──────────┐
//!   │  loader   │  read → RawTable → normalize → Table (cached, shared)
//!   └──────────┘
//!        │
//!        ▼
//!   ┌──────────┐
//!   │  filter   │  year / industry / score range / search → Vec<&Record>
//!   └──────────┘
//!        │
//!        ▼
//!   ┌───────────┐    ┌──────────┐
//!   │ aggregate  │ →  │ present   │  summary, profile, rankings, trend
//!   └───────────┘    └──────────┘
//!        │
//!        ▼
//!   ┌───────────┐
//!   │ dashboard  │  one render-ready value per interaction
//!   └───────────┘
//! ```

pub mod aggregate;
pub mod dashboard;
pub mod filter;
pub mod loader;
pub mod model;
pub mod present;
