use std::path::{Path, PathBuf};

use anyhow::{Context, anyhow};
use duckdb::{Connection, params};

use crate::cli::LoadArgs;
use crate::report::{CLAIMS_TABLE, POPULATION_TABLE};
use crate::storage::{StoragePaths, file_present_nonempty};

const POPULATION_DDL: &str = r#"
    CREATE TABLE IF NOT EXISTS cmspop (
      id BIGINT,
      state VARCHAR,
      sex VARCHAR,
      race VARCHAR,
      dob VARCHAR,
      dod VARCHAR,
      alz_rel_sen BOOLEAN,
      heart_fail BOOLEAN,
      chronic_kidney BOOLEAN,
      cancer BOOLEAN,
      depression BOOLEAN
    )
"#;

const CLAIMS_DDL: &str = r#"
    CREATE TABLE IF NOT EXISTS cmsclaims (
      id BIGINT,
      carrier_reimb DOUBLE,
      bene_resp DOUBLE
    )
"#;

pub fn run(opts: LoadArgs) -> anyhow::Result<()> {
    tracing::info!("cms-reports load");
    tracing::info!("data_dir={}", opts.data_dir);
    if opts.rebuild {
        tracing::info!("rebuild=true (will drop and reload tables)");
    }

    let paths = StoragePaths::new(&opts.data_dir);
    paths.ensure_dirs().context("create data directories")?;
    let defaults = paths.source_files();
    let population = opts
        .population
        .map(PathBuf::from)
        .unwrap_or(defaults.population);
    let claims = opts.claims.map(PathBuf::from).unwrap_or(defaults.claims);

    for csv in [&population, &claims] {
        if !file_present_nonempty(csv) {
            return Err(anyhow!("CSV not found or empty: {}", csv.display()));
        }
    }

    let mut conn = Connection::open(&paths.duckdb_path)
        .with_context(|| format!("open duckdb at {}", paths.duckdb_path.display()))?;

    if opts.rebuild {
        drop_tables(&conn).context("drop tables")?;
    }

    tracing::info!("Step 1/2: {POPULATION_TABLE}");
    load_table(&mut conn, POPULATION_TABLE, POPULATION_DDL, &population)?;
    tracing::info!("Step 2/2: {CLAIMS_TABLE}");
    load_table(&mut conn, CLAIMS_TABLE, CLAIMS_DDL, &claims)?;

    tracing::info!("Load complete: {}", paths.duckdb_path.display());
    Ok(())
}

fn load_table(conn: &mut Connection, table: &str, ddl: &str, csv: &Path) -> anyhow::Result<()> {
    if table_exists(conn, table)? {
        tracing::info!("DuckDB table {table} already exists; skipping");
        return Ok(());
    }
    let t0 = std::time::Instant::now();
    // A failed COPY must not leave an empty table behind for the next run to skip.
    let tx = conn.transaction().context("begin transaction")?;
    tx.execute_batch(ddl).with_context(|| format!("create {table}"))?;
    copy_csv(&tx, table, csv).with_context(|| format!("load {table}"))?;
    let rows = count_rows(&tx, table)?;
    tx.commit().with_context(|| format!("commit {table}"))?;
    tracing::info!(
        "{table}: {rows} rows from {} in {:.1}s",
        csv.display(),
        t0.elapsed().as_secs_f64()
    );
    Ok(())
}

/// Creates both tables if they are missing.
pub fn create_schema(conn: &Connection) -> anyhow::Result<()> {
    conn.execute_batch(POPULATION_DDL)?;
    conn.execute_batch(CLAIMS_DDL)?;
    Ok(())
}

pub fn drop_tables(conn: &Connection) -> anyhow::Result<()> {
    conn.execute_batch(&format!(
        "DROP TABLE IF EXISTS {POPULATION_TABLE}; DROP TABLE IF EXISTS {CLAIMS_TABLE};"
    ))?;
    Ok(())
}

/// Appends a headered CSV to `table` by column position. Empty fields load as NULL.
pub fn copy_csv(conn: &Connection, table: &str, csv: &Path) -> anyhow::Result<()> {
    let path = sql_quote_path(csv);
    // table is one of the two fixed names above.
    conn.execute_batch(&format!(
        "COPY {table} FROM '{path}' (FORMAT CSV, HEADER TRUE)"
    ))?;
    Ok(())
}

pub fn count_rows(conn: &Connection, table: &str) -> anyhow::Result<u64> {
    let n: i64 = conn.query_row(&format!("SELECT COUNT(*)::BIGINT FROM {table}"), [], |row| {
        row.get(0)
    })?;
    Ok(n.max(0) as u64)
}

pub fn table_exists(conn: &Connection, name: &str) -> anyhow::Result<bool> {
    let mut stmt = conn.prepare(
        r#"
        SELECT COUNT(*)::BIGINT
        FROM information_schema.tables
        WHERE table_schema = 'main' AND table_name = ?
    "#,
    )?;
    let count: i64 = stmt.query_row(params![name], |row| row.get(0))?;
    Ok(count > 0)
}

fn sql_quote_path(path: &Path) -> String {
    // DuckDB expects single-quoted string literals; escape embedded single quotes.
    path.to_string_lossy().replace('\'', "''")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_is_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        create_schema(&conn).unwrap();
        create_schema(&conn).unwrap();
        assert!(table_exists(&conn, POPULATION_TABLE).unwrap());
        assert!(table_exists(&conn, CLAIMS_TABLE).unwrap());
        drop_tables(&conn).unwrap();
        assert!(!table_exists(&conn, POPULATION_TABLE).unwrap());
    }

    #[test]
    fn quotes_single_quotes_in_paths() {
        assert_eq!(sql_quote_path(Path::new("/tmp/o'brien.csv")), "/tmp/o''brien.csv");
    }

    #[test]
    fn copies_csv_with_empty_fields_as_null() {
        let dir = tempfile::tempdir().unwrap();
        let csv = dir.path().join("claims.csv");
        std::fs::write(&csv, "id,carrier_reimb,bene_resp\n1,100.5,20\n2,,\n").unwrap();

        let conn = Connection::open_in_memory().unwrap();
        create_schema(&conn).unwrap();
        copy_csv(&conn, CLAIMS_TABLE, &csv).unwrap();
        assert_eq!(count_rows(&conn, CLAIMS_TABLE).unwrap(), 2);

        let nulls: i64 = conn
            .query_row(
                "SELECT COUNT(*)::BIGINT FROM cmsclaims WHERE carrier_reimb IS NULL",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(nulls, 1);
    }
}
