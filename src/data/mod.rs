//! Data layer: core types, CSV loading/saving, and progressive filtering.
//!
//! Architecture:
//! ```text
//!   recordings .csv
//!        │
//!        ▼
//!   ┌──────────┐
//!   │  loader   │  parse file → Dataset (schema inferred once)
//!   └──────────┘
//!        │
//!        ▼
//!   ┌──────────┐
//!   │  Dataset  │  Schema + Vec<Record>
//!   └──────────┘
//!        │
//!        ▼
//!   ┌────────────────┐
//!   │ FilterPipeline  │  criterion 1 → criterion 2 → … → filtered view
//!   └────────────────┘
//! ```

pub mod filter;
pub mod loader;
pub mod model;
