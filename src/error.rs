use thiserror::Error;

/// A disease indicator that is not in the report's accepted set.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("disallowed column: {column}")]
pub struct ValidationError {
    /// The normalized value that was rejected.
    pub column: String,
}

/// Failures coming back from the query executor, including rows whose shape
/// does not match what a report expects.
#[derive(Debug, Error)]
pub enum ExecutionError {
    #[error("open duckdb at {path}: {source}")]
    Open {
        path: String,
        #[source]
        source: duckdb::Error,
    },

    #[error("query failed: {0}")]
    Query(#[source] duckdb::Error),

    #[error("column `{column}` missing from result row")]
    MissingColumn { column: String },

    #[error("column `{column}`: expected {expected}, found {found}")]
    UnexpectedType {
        column: String,
        expected: &'static str,
        found: &'static str,
    },
}

#[derive(Debug, Error)]
pub enum ReportError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Execution(#[from] ExecutionError),

    #[error("serialize report: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl ReportError {
    pub fn is_validation(&self) -> bool {
        matches!(self, ReportError::Validation(_))
    }
}
