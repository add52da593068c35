/// Data layer: the load → clean → filter → aggregate → export pipeline.
///
/// Architecture:
/// ```text
///  orders .csv
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  decode, normalize headers, coerce fields, drop bad rows
///   └──────────┘
///        │
///        ▼
///   ┌────────────┐
///   │ OrderTable  │  immutable records + distinct value sets
///   └────────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  FilterSelection → subset indices
///   └──────────┘
///        │
///        ▼
///   ┌───────────┐
///   │ aggregate  │  KPIs, grouped sums, monthly series, scatter
///   └───────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  export   │  subset → UTF-8 csv
///   └──────────┘
/// ```

pub mod aggregate;
pub mod export;
pub mod filter;
pub mod loader;
pub mod model;
