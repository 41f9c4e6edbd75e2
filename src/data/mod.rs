/// Data layer: review records, loading, reshaping, filtering and aggregation.
///
/// Architecture:
/// ```text
///  .xlsx / .csv / .json / .parquet
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file → Vec<Study> (wide rows)
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  reshape  │  melt outcome columns → ReviewDataset (long rows)
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  apply per-column selections → filtered indices
///   └──────────┘
///        │
///        ▼
///   ┌───────────┐
///   │ aggregate  │  bar counts + modality × format cross-tab
///   └───────────┘
/// ```
///
/// [`view::render`] ties filter and aggregate together for one selection.

pub mod aggregate;
pub mod export;
pub mod filter;
pub mod loader;
pub mod model;
pub mod reshape;
pub mod view;
