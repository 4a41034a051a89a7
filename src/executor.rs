use std::path::PathBuf;

use duckdb::types::Value;
use duckdb::{AccessMode, Config, Connection};

use crate::error::ExecutionError;

/// Runs SQL text and hands back every row, fully materialized.
pub trait QueryExecutor {
    fn fetch_all(&self, sql: &str) -> Result<Vec<Row>, ExecutionError>;
}

impl<E: QueryExecutor + ?Sized> QueryExecutor for &E {
    fn fetch_all(&self, sql: &str) -> Result<Vec<Row>, ExecutionError> {
        (**self).fetch_all(sql)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    /// A value with no scalar mapping (dates, lists, blobs, ...), kept as
    /// debug text for error messages.
    Unsupported(String),
}

impl SqlValue {
    fn type_name(&self) -> &'static str {
        match self {
            SqlValue::Null => "null",
            SqlValue::Bool(_) => "bool",
            SqlValue::Int(_) => "integer",
            SqlValue::Float(_) => "float",
            SqlValue::Text(_) => "text",
            SqlValue::Unsupported(_) => "unsupported value",
        }
    }

    fn from_duckdb(value: Value) -> Self {
        match value {
            Value::Null => SqlValue::Null,
            Value::Boolean(v) => SqlValue::Bool(v),
            Value::TinyInt(v) => SqlValue::Int(v.into()),
            Value::SmallInt(v) => SqlValue::Int(v.into()),
            Value::Int(v) => SqlValue::Int(v.into()),
            Value::BigInt(v) => SqlValue::Int(v),
            Value::UTinyInt(v) => SqlValue::Int(v.into()),
            Value::USmallInt(v) => SqlValue::Int(v.into()),
            Value::UInt(v) => SqlValue::Int(v.into()),
            Value::UBigInt(v) => i64::try_from(v)
                .map(SqlValue::Int)
                .unwrap_or(SqlValue::Float(v as f64)),
            Value::HugeInt(v) => i64::try_from(v)
                .map(SqlValue::Int)
                .unwrap_or(SqlValue::Float(v as f64)),
            Value::Float(v) => SqlValue::Float(v.into()),
            Value::Double(v) => SqlValue::Float(v),
            Value::Decimal(v) => v
                .to_string()
                .parse()
                .map(SqlValue::Float)
                .unwrap_or_else(|_| SqlValue::Unsupported(v.to_string())),
            Value::Text(v) => SqlValue::Text(v),
            other => SqlValue::Unsupported(format!("{other:?}")),
        }
    }
}

/// One result row, addressable by column name in select-list order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    columns: Vec<(String, SqlValue)>,
}

impl Row {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: impl Into<String>, value: SqlValue) -> Self {
        self.push(name, value);
        self
    }

    pub fn push(&mut self, name: impl Into<String>, value: SqlValue) {
        self.columns.push((name.into(), value));
    }

    pub fn get(&self, name: &str) -> Option<&SqlValue> {
        self.columns
            .iter()
            .find(|(col, _)| col == name)
            .map(|(_, v)| v)
    }

    fn require(&self, name: &str) -> Result<&SqlValue, ExecutionError> {
        self.get(name).ok_or_else(|| ExecutionError::MissingColumn {
            column: name.to_string(),
        })
    }

    pub fn text(&self, name: &str) -> Result<String, ExecutionError> {
        self.opt_text(name)?
            .ok_or_else(|| unexpected(name, "text", &SqlValue::Null))
    }

    pub fn opt_text(&self, name: &str) -> Result<Option<String>, ExecutionError> {
        match self.require(name)? {
            SqlValue::Null => Ok(None),
            SqlValue::Text(v) => Ok(Some(v.clone())),
            other => Err(unexpected(name, "text", other)),
        }
    }

    pub fn i64(&self, name: &str) -> Result<i64, ExecutionError> {
        self.opt_i64(name)?
            .ok_or_else(|| unexpected(name, "integer", &SqlValue::Null))
    }

    pub fn opt_i64(&self, name: &str) -> Result<Option<i64>, ExecutionError> {
        match self.require(name)? {
            SqlValue::Null => Ok(None),
            SqlValue::Int(v) => Ok(Some(*v)),
            other => Err(unexpected(name, "integer", other)),
        }
    }

    pub fn opt_f64(&self, name: &str) -> Result<Option<f64>, ExecutionError> {
        match self.require(name)? {
            SqlValue::Null => Ok(None),
            SqlValue::Float(v) if v.is_finite() => Ok(Some(*v)),
            SqlValue::Float(_) => Ok(None),
            SqlValue::Int(v) => Ok(Some(*v as f64)),
            other => Err(unexpected(name, "float", other)),
        }
    }
}

fn unexpected(column: &str, expected: &'static str, found: &SqlValue) -> ExecutionError {
    ExecutionError::UnexpectedType {
        column: column.to_string(),
        expected,
        found: found.type_name(),
    }
}

/// How to reach the DuckDB database file.
#[derive(Debug, Clone)]
pub struct ExecutorConfig {
    pub duckdb_path: PathBuf,
    pub read_only: bool,
}

/// DuckDB-backed executor. Each `fetch_all` runs on its own connection.
pub struct DuckDbExecutor {
    db: Connection,
}

impl DuckDbExecutor {
    pub fn open(cfg: &ExecutorConfig) -> Result<Self, ExecutionError> {
        let open_err = |source| ExecutionError::Open {
            path: cfg.duckdb_path.display().to_string(),
            source,
        };
        let mode = if cfg.read_only {
            AccessMode::ReadOnly
        } else {
            AccessMode::ReadWrite
        };
        let config = Config::default().access_mode(mode).map_err(open_err)?;
        let db = Connection::open_with_flags(&cfg.duckdb_path, config).map_err(open_err)?;
        Ok(Self { db })
    }

    /// Wraps an existing handle, e.g. an in-memory database.
    pub fn from_connection(db: Connection) -> Self {
        Self { db }
    }

    /// A new executor on the same database, usable from another thread.
    pub fn try_clone(&self) -> Result<Self, ExecutionError> {
        let db = self.db.try_clone().map_err(ExecutionError::Query)?;
        Ok(Self { db })
    }
}

impl QueryExecutor for DuckDbExecutor {
    fn fetch_all(&self, sql: &str) -> Result<Vec<Row>, ExecutionError> {
        let conn = self.db.try_clone().map_err(ExecutionError::Query)?;
        let mut stmt = conn.prepare(sql).map_err(ExecutionError::Query)?;
        let mut rows = stmt.query([]).map_err(ExecutionError::Query)?;
        let names = rows
            .as_ref()
            .map(|s| s.column_names())
            .unwrap_or_default();

        let mut out = Vec::new();
        while let Some(row) = rows.next().map_err(ExecutionError::Query)? {
            let mut shaped = Row::new();
            for (idx, name) in names.iter().enumerate() {
                let value: Value = row.get(idx).map_err(ExecutionError::Query)?;
                shaped.push(name.as_str(), SqlValue::from_duckdb(value));
            }
            out.push(shaped);
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Row {
        Row::new()
            .with("state", SqlValue::Text("CA".into()))
            .with("n", SqlValue::Int(3))
            .with("avg", SqlValue::Float(1.5))
            .with("missing", SqlValue::Null)
    }

    #[test]
    fn typed_accessors() {
        let row = sample();
        assert_eq!(row.text("state").unwrap(), "CA");
        assert_eq!(row.i64("n").unwrap(), 3);
        assert_eq!(row.opt_f64("avg").unwrap(), Some(1.5));
        assert_eq!(row.opt_f64("n").unwrap(), Some(3.0));
        assert_eq!(row.opt_f64("missing").unwrap(), None);
        assert_eq!(row.opt_text("missing").unwrap(), None);
    }

    #[test]
    fn accessor_errors_name_the_column() {
        let row = sample();
        let err = row.i64("avg").unwrap_err();
        assert_eq!(err.to_string(), "column `avg`: expected integer, found float");
        let err = row.text("nope").unwrap_err();
        assert!(matches!(err, ExecutionError::MissingColumn { column } if column == "nope"));
        assert!(row.text("missing").is_err());
    }

    #[test]
    fn non_finite_floats_read_as_undefined() {
        let row = Row::new().with("ratio", SqlValue::Float(f64::INFINITY));
        assert_eq!(row.opt_f64("ratio").unwrap(), None);
    }

    #[test]
    fn duckdb_rows_keep_column_names_and_order() {
        let exec = DuckDbExecutor::from_connection(Connection::open_in_memory().unwrap());
        let rows = exec
            .fetch_all(
                "SELECT 'NY' AS state, 2::BIGINT AS n, NULL AS x \
                 UNION ALL SELECT 'AK', 1, NULL \
                 ORDER BY n DESC",
            )
            .unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].text("state").unwrap(), "NY");
        assert_eq!(rows[1].i64("n").unwrap(), 1);
        assert_eq!(rows[0].get("x"), Some(&SqlValue::Null));
    }

    #[test]
    fn decimals_read_as_floats_and_dates_are_unsupported() {
        let exec = DuckDbExecutor::from_connection(Connection::open_in_memory().unwrap());
        let rows = exec
            .fetch_all("SELECT CAST(12.5 AS DECIMAL(6, 2)) AS amount, DATE '2000-01-01' AS day")
            .unwrap();
        assert_eq!(rows[0].opt_f64("amount").unwrap(), Some(12.5));
        assert!(matches!(rows[0].get("day"), Some(SqlValue::Unsupported(_))));
        let err = rows[0].opt_text("day").unwrap_err();
        assert_eq!(
            err.to_string(),
            "column `day`: expected text, found unsupported value"
        );
    }

    #[test]
    fn query_errors_surface_the_duckdb_message() {
        let exec = DuckDbExecutor::from_connection(Connection::open_in_memory().unwrap());
        let err = exec.fetch_all("SELECT * FROM no_such_table").unwrap_err();
        assert!(matches!(err, ExecutionError::Query(_)));
        assert!(err.to_string().contains("no_such_table"));
    }
}
