/// Data layer: loading, normalization, cleaning, and snapshotting.
///
/// Pipeline:
/// ```text
///    .csv
///      │
///      ▼
///  ┌──────────┐
///  │  loader   │  parse file → RawTable (untyped, read-only)
///  └──────────┘
///      │
///      ▼
///  ┌──────────┐
///  │  schema   │  rename + coerce + assign row_id → StagingTable
///  └──────────┘
///      │
///      ▼
///  ┌──────────┐
///  │  clean    │  null blanks, unify categories, drop/suppress
///  └──────────┘
///      │
///      ▼
///  ┌──────────────┐
///  │ working_set   │  immutable snapshot for the aggregator
///  └──────────────┘
/// ```
///
/// Data flows strictly forward; each stage consumes the previous stage's
/// table and produces a new one.

pub mod clean;
pub mod loader;
pub mod model;
pub mod schema;
pub mod working_set;
