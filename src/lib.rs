//! Job-market analytics reports.
//!
//! Raw payloads from the data service go through a pure pipeline:
//! [`normalize`] turns whatever shape arrived into canonical records,
//! [`aggregate`] groups them, [`ranking`] and [`stats`] derive ranked,
//! percentage-annotated figures, and [`format`] renders them for display.
//! [`reports`] wires the stages together per view.
pub mod aggregate;
pub mod client;
pub mod config;
pub mod errors;
pub mod format;
pub mod loader;
pub mod normalize;
pub mod output;
pub mod ranking;
pub mod reports;
pub mod stats;
pub mod types;
pub mod util;

pub use errors::ReportError;
pub use reports::{build_report, normalize_and_aggregate, ViewReport};
pub use types::{
    AggregatedGroup, CanonicalRecord, RankedEntry, SalaryFigure, StatisticsSummary, ViewKind,
    ViewOptions, ViewOutput,
};
