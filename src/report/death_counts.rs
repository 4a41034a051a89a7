use serde::Serialize;

use crate::disease::ValidColumn;
use crate::error::ExecutionError;
use crate::executor::Row;

use super::{Report, ReportKind, deaths_subquery};

/// Deaths per state with the youngest and oldest age at death, most deaths
/// first.
pub struct DeathCounts;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeathStats {
    pub total_deaths: i64,
    pub youngest_death: Option<i64>,
    pub oldest_death: Option<i64>,
}

impl Report for DeathCounts {
    const KIND: ReportKind = ReportKind::DeathCounts;
    type Payload = DeathStats;

    fn sql(column: &ValidColumn) -> String {
        let deaths = deaths_subquery(column);
        format!(
            r#"
        SELECT
          state,
          COUNT(*) AS disease_deaths,
          MIN(age_at_death) AS youngest_death,
          MAX(age_at_death) AS oldest_death
        FROM ({deaths}) AS deaths
        GROUP BY state
        ORDER BY disease_deaths DESC, state ASC
    "#
        )
    }

    fn shape(row: &Row) -> Result<DeathStats, ExecutionError> {
        Ok(DeathStats {
            total_deaths: row.i64("disease_deaths")?,
            youngest_death: row.opt_i64("youngest_death")?,
            oldest_death: row.opt_i64("oldest_death")?,
        })
    }
}
