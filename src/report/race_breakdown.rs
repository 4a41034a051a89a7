use serde::Serialize;

use crate::disease::ValidColumn;
use crate::error::ExecutionError;
use crate::executor::Row;

use super::{CLAIMS_TABLE, Report, ReportKind, deaths_subquery};

/// Per state and race: the race's share of the state's disease deaths and of
/// the carrier reimbursement paid for those deaths, in percent.
///
/// Only accepted for four indicators; `chronic_kidney` is excluded.
pub struct RaceBreakdown;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RaceShare {
    pub race: Option<String>,
    pub percentage_deaths: Option<f64>,
    /// `null` when the state's deaths carry no reimbursement at all.
    pub percentage_reimbursement: Option<f64>,
}

impl Report for RaceBreakdown {
    const KIND: ReportKind = ReportKind::RaceBreakdown;
    type Payload = RaceShare;

    fn sql(column: &ValidColumn) -> String {
        let deaths = deaths_subquery(column);
        format!(
            r#"
        WITH deaths AS (
          SELECT pop.state AS state, CAST(pop.race AS VARCHAR) AS race, claims.carrier_reimb
          FROM ({deaths}) AS pop
          LEFT JOIN (SELECT id, carrier_reimb FROM {CLAIMS_TABLE}) AS claims
            ON pop.id = claims.id
        ),
        by_race AS (
          SELECT state, race, SUM(carrier_reimb) AS total_reimb, COUNT(*) AS total_deaths
          FROM deaths
          GROUP BY state, race
        ),
        by_state AS (
          SELECT state, SUM(carrier_reimb) AS aggregate_reimb, COUNT(*) AS aggregate_deaths
          FROM deaths
          GROUP BY state
        )
        SELECT
          r.state AS state,
          r.race AS race,
          CAST(r.total_deaths AS DOUBLE)
            / NULLIF(CAST(s.aggregate_deaths AS DOUBLE), 0) * 100 AS percent_of_deaths,
          CAST(COALESCE(r.total_reimb, 0) AS DOUBLE)
            / NULLIF(CAST(s.aggregate_reimb AS DOUBLE), 0) * 100 AS percent_of_reimbs
        FROM by_race AS r
        LEFT JOIN by_state AS s ON r.state = s.state
        ORDER BY r.state ASC, r.race ASC NULLS LAST
    "#
        )
    }

    fn shape(row: &Row) -> Result<RaceShare, ExecutionError> {
        let share = RaceShare {
            race: row.opt_text("race")?,
            percentage_deaths: row.opt_f64("percent_of_deaths")?,
            percentage_reimbursement: row.opt_f64("percent_of_reimbs")?,
        };
        if share.percentage_reimbursement.is_none() {
            tracing::warn!(
                state = row.opt_text("state")?.as_deref().unwrap_or("?"),
                race = share.race.as_deref().unwrap_or("?"),
                "state has no carrier reimbursement; percentage undefined"
            );
        }
        Ok(share)
    }
}
