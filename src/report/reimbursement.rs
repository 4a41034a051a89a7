use serde::Serialize;

use crate::disease::ValidColumn;
use crate::error::ExecutionError;
use crate::executor::Row;

use super::{CLAIMS_TABLE, POPULATION_TABLE, Report, ReportKind};

/// Average carrier reimbursement and beneficiary responsibility per state.
///
/// Flagged persons are left-joined to their claims, so a person without a
/// claim is still counted in the group but adds nothing to either average.
/// A state whose flagged persons have no claims at all reports `null` for
/// both fields.
pub struct ReimbursementVsResponsibility;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReimbursementSplit {
    pub avg_carrier_reimb: Option<f64>,
    pub average_bene_resp: Option<f64>,
}

impl Report for ReimbursementVsResponsibility {
    const KIND: ReportKind = ReportKind::ReimbursementVsResponsibility;
    type Payload = ReimbursementSplit;

    fn sql(column: &ValidColumn) -> String {
        format!(
            r#"
        SELECT
          pop.state AS state,
          CAST(AVG(claims.carrier_reimb) AS DOUBLE) AS avg_carrier_reimb,
          CAST(AVG(claims.bene_resp) AS DOUBLE) AS avg_bene_resp
        FROM (SELECT id, state FROM {POPULATION_TABLE} WHERE {column} = TRUE) AS pop
        LEFT JOIN (SELECT id, carrier_reimb, bene_resp FROM {CLAIMS_TABLE}) AS claims
          ON pop.id = claims.id
        GROUP BY pop.state
        ORDER BY avg_bene_resp DESC NULLS LAST, state ASC
    "#
        )
    }

    fn shape(row: &Row) -> Result<ReimbursementSplit, ExecutionError> {
        Ok(ReimbursementSplit {
            avg_carrier_reimb: row.opt_f64("avg_carrier_reimb")?,
            average_bene_resp: row.opt_f64("avg_bene_resp")?,
        })
    }
}
