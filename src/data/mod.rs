/// Data layer: core types and the file adapters that feed the cleaners.
///
/// Architecture:
/// ```text
///  .parquet / .json / .csv
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file → Dataset<Label>
///   └──────────┘
///        │
///        ▼
///   ┌───────────────┐
///   │ Dataset        │  Vec<Curve>, Vec<L>
///   │ AlignedDatasets│  train / valid / test sharing labels
///   └───────────────┘
/// ```

pub mod loader;
pub mod model;
