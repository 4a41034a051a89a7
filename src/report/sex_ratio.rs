use crate::disease::ValidColumn;
use crate::error::ExecutionError;
use crate::executor::Row;

use super::{POPULATION_TABLE, Report, ReportKind};

/// Male-to-female case ratio per state, highest first.
///
/// States are driven by their male cases: a state with only female cases
/// does not appear. A state with male cases and no female cases has no
/// defined ratio and is emitted as `null`, after every defined ratio.
pub struct SexRatio;

impl Report for SexRatio {
    const KIND: ReportKind = ReportKind::SexRatio;
    type Payload = Option<f64>;

    fn sql(column: &ValidColumn) -> String {
        format!(
            r#"
        SELECT
          males.state AS state,
          males.male AS male,
          COALESCE(females.female, 0) AS female,
          CASE
            WHEN COALESCE(females.female, 0) = 0 THEN NULL
            ELSE CAST(males.male AS DOUBLE) / CAST(females.female AS DOUBLE)
          END AS male_female_ratio
        FROM (
          SELECT state, COUNT(*) AS male
          FROM {POPULATION_TABLE}
          WHERE {column} = 'true' AND sex = 'male'
          GROUP BY state
        ) AS males
        LEFT JOIN (
          SELECT state, COUNT(*) AS female
          FROM {POPULATION_TABLE}
          WHERE {column} = 'true' AND sex = 'female'
          GROUP BY state
        ) AS females
          ON males.state = females.state
        ORDER BY male_female_ratio DESC NULLS LAST, state ASC
    "#
        )
    }

    fn shape(row: &Row) -> Result<Option<f64>, ExecutionError> {
        let ratio = row.opt_f64("male_female_ratio")?;
        if ratio.is_none() {
            tracing::warn!(
                state = row.opt_text("state")?.as_deref().unwrap_or("?"),
                male = row.opt_i64("male")?.unwrap_or(0),
                "no female cases; male/female ratio undefined"
            );
        }
        Ok(ratio)
    }
}
