use crate::disease::ValidColumn;
use crate::error::ExecutionError;
use crate::executor::Row;

use super::{Report, ReportKind, deaths_subquery};

/// Average age at death per state, floored to whole years, oldest first.
///
/// A state whose deaths all lack a birth date has no average and is emitted
/// as `null`, after every defined average.
pub struct AgeAtDeath;

impl Report for AgeAtDeath {
    const KIND: ReportKind = ReportKind::AgeAtDeath;
    type Payload = Option<i64>;

    fn sql(column: &ValidColumn) -> String {
        let deaths = deaths_subquery(column);
        format!(
            r#"
        SELECT
          state,
          CAST(FLOOR(AVG(age_at_death)) AS BIGINT) AS avg_age_death
        FROM ({deaths}) AS deaths
        GROUP BY state
        ORDER BY AVG(age_at_death) DESC NULLS LAST, state ASC
    "#
        )
    }

    fn shape(row: &Row) -> Result<Option<i64>, ExecutionError> {
        row.opt_i64("avg_age_death")
    }
}
