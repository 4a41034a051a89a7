//! State-level disease reports over a CMS population and claims database.
//!
//! A disease indicator chosen by the caller ends up as a column name in SQL,
//! a position bind parameters cannot fill. [`disease::validate`] is the only
//! way to obtain a [`disease::ValidColumn`], and every report in [`report`]
//! validates against its own allowlist before any SQL is built.

pub mod cli;
pub mod disease;
pub mod error;
pub mod executor;
pub mod load;
pub mod report;
pub mod server;
pub mod show;
pub mod storage;

pub use disease::{DiseaseIndicator, ValidColumn, validate};
pub use error::{ExecutionError, ReportError, ValidationError};
pub use executor::{DuckDbExecutor, ExecutorConfig, QueryExecutor, Row, SqlValue};
pub use report::{ReportEngine, ReportKind, ReportResult, StateEntry};
