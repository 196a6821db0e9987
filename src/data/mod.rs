/// Data layer: core types, loading, filtering, aggregation, and export.
///
/// Architecture:
/// ```text
///    .csv / .json
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse + clean file → PriceTable (cached per path)
///   └──────────┘
///        │
///        ▼
///   ┌────────────┐
///   │ PriceTable  │  Vec<Material>, column + unique-value indices
///   └────────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  apply Criteria → view indices
///   └──────────┘
///        │
///        ├──▶ stats   KPIs, expiry count, price rankings
///        └──▶ export  view → CSV bytes
/// ```
pub mod loader;
pub mod model;
pub mod filter;
pub mod stats;
pub mod export;
