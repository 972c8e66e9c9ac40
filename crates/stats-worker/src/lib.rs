//! Concurrent PGN statistics pipeline: ingestion, extraction workers, a single
//! reducer and the JSON report.

pub mod cohorts;
pub mod config;
pub mod error;
pub mod output;
pub mod pipeline;

pub use cohorts::Cohorts;
pub use config::StatsConfig;
pub use error::StatsError;
