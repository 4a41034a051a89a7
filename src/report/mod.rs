//! The five state-level reports.
//!
//! Each report owns its accepted indicator set, a SQL template that embeds
//! only the validated indicator and the two fixed table names, and a mapping
//! from one result row to its payload. [`ReportEngine`] ties those together:
//! validate, build SQL, run one query, shape rows in arrival order.

pub mod age_at_death;
pub mod death_counts;
pub mod race_breakdown;
pub mod reimbursement;
pub mod sex_ratio;

use serde::Serialize;
use serde::ser::{SerializeMap, Serializer};

use crate::disease::{DiseaseIndicator, ValidColumn, validate};
use crate::error::{ExecutionError, ReportError};
use crate::executor::{QueryExecutor, Row};

pub use age_at_death::AgeAtDeath;
pub use death_counts::{DeathCounts, DeathStats};
pub use race_breakdown::{RaceBreakdown, RaceShare};
pub use reimbursement::{ReimbursementSplit, ReimbursementVsResponsibility};
pub use sex_ratio::SexRatio;

pub const POPULATION_TABLE: &str = "cmspop";
pub const CLAIMS_TABLE: &str = "cmsclaims";

const WITHOUT_CHRONIC_KIDNEY: &[DiseaseIndicator] = &[
    DiseaseIndicator::AlzRelSen,
    DiseaseIndicator::HeartFail,
    DiseaseIndicator::Cancer,
    DiseaseIndicator::Depression,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, clap::ValueEnum, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReportKind {
    AgeAtDeath,
    ReimbursementVsResponsibility,
    SexRatio,
    RaceBreakdown,
    DeathCounts,
}

impl ReportKind {
    pub const ALL: &'static [ReportKind] = &[
        ReportKind::AgeAtDeath,
        ReportKind::ReimbursementVsResponsibility,
        ReportKind::SexRatio,
        ReportKind::RaceBreakdown,
        ReportKind::DeathCounts,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ReportKind::AgeAtDeath => "age-at-death",
            ReportKind::ReimbursementVsResponsibility => "reimbursement-vs-responsibility",
            ReportKind::SexRatio => "sex-ratio",
            ReportKind::RaceBreakdown => "race-breakdown",
            ReportKind::DeathCounts => "death-counts",
        }
    }

    /// Indicators this report may be run for.
    pub fn accepted(self) -> &'static [DiseaseIndicator] {
        match self {
            ReportKind::RaceBreakdown => WITHOUT_CHRONIC_KIDNEY,
            _ => DiseaseIndicator::ALL,
        }
    }
}

/// A query template plus the shape of one output entry.
pub trait Report {
    const KIND: ReportKind;
    type Payload: Serialize;

    fn sql(column: &ValidColumn) -> String;

    fn shape(row: &Row) -> Result<Self::Payload, ExecutionError>;
}

/// One `{ "<state>": payload }` element of a report.
#[derive(Debug, Clone, PartialEq)]
pub struct StateEntry<P> {
    pub state: String,
    pub payload: P,
}

impl<P: Serialize> Serialize for StateEntry<P> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry(&self.state, &self.payload)?;
        map.end()
    }
}

/// Entries in the order the database returned them. Repeated states stay
/// separate entries.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportResult<P> {
    pub kind: ReportKind,
    pub column: ValidColumn,
    pub entries: Vec<StateEntry<P>>,
}

impl<P: Serialize> Serialize for ReportResult<P> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(&self.entries)
    }
}

impl<P: Serialize> ReportResult<P> {
    pub fn to_json(&self) -> Result<String, ReportError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn to_json_pretty(&self) -> Result<String, ReportError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

pub struct ReportEngine<E> {
    executor: E,
}

impl<E: QueryExecutor> ReportEngine<E> {
    pub fn new(executor: E) -> Self {
        Self { executor }
    }

    pub fn run<R: Report>(&self, disease: &str) -> Result<ReportResult<R::Payload>, ReportError> {
        let column = validate(disease, R::KIND.accepted())?;
        let sql = R::sql(&column);
        tracing::debug!(report = R::KIND.as_str(), column = %column, "running report\n{sql}");

        let rows = self.executor.fetch_all(&sql)?;
        let mut entries = Vec::with_capacity(rows.len());
        for row in &rows {
            entries.push(StateEntry {
                state: row.text("state")?,
                payload: R::shape(row)?,
            });
        }
        tracing::debug!(report = R::KIND.as_str(), rows = entries.len(), "report done");

        Ok(ReportResult {
            kind: R::KIND,
            column,
            entries,
        })
    }

    pub fn age_at_death_by_state(
        &self,
        disease: &str,
    ) -> Result<ReportResult<Option<i64>>, ReportError> {
        self.run::<AgeAtDeath>(disease)
    }

    pub fn reimbursement_vs_responsibility(
        &self,
        disease: &str,
    ) -> Result<ReportResult<ReimbursementSplit>, ReportError> {
        self.run::<ReimbursementVsResponsibility>(disease)
    }

    pub fn sex_ratio_by_state(
        &self,
        disease: &str,
    ) -> Result<ReportResult<Option<f64>>, ReportError> {
        self.run::<SexRatio>(disease)
    }

    pub fn race_breakdown_by_state(
        &self,
        disease: &str,
    ) -> Result<ReportResult<RaceShare>, ReportError> {
        self.run::<RaceBreakdown>(disease)
    }

    pub fn death_counts_by_state(
        &self,
        disease: &str,
    ) -> Result<ReportResult<DeathStats>, ReportError> {
        self.run::<DeathCounts>(disease)
    }

    /// Runs `kind` and returns its compact JSON document.
    pub fn run_json(&self, kind: ReportKind, disease: &str) -> Result<String, ReportError> {
        match kind {
            ReportKind::AgeAtDeath => self.age_at_death_by_state(disease)?.to_json(),
            ReportKind::ReimbursementVsResponsibility => {
                self.reimbursement_vs_responsibility(disease)?.to_json()
            }
            ReportKind::SexRatio => self.sex_ratio_by_state(disease)?.to_json(),
            ReportKind::RaceBreakdown => self.race_breakdown_by_state(disease)?.to_json(),
            ReportKind::DeathCounts => self.death_counts_by_state(disease)?.to_json(),
        }
    }

    pub fn run_json_pretty(&self, kind: ReportKind, disease: &str) -> Result<String, ReportError> {
        match kind {
            ReportKind::AgeAtDeath => self.age_at_death_by_state(disease)?.to_json_pretty(),
            ReportKind::ReimbursementVsResponsibility => {
                self.reimbursement_vs_responsibility(disease)?.to_json_pretty()
            }
            ReportKind::SexRatio => self.sex_ratio_by_state(disease)?.to_json_pretty(),
            ReportKind::RaceBreakdown => self.race_breakdown_by_state(disease)?.to_json_pretty(),
            ReportKind::DeathCounts => self.death_counts_by_state(disease)?.to_json_pretty(),
        }
    }
}

/// Flagged persons with a date of death, with the year-difference age.
///
/// Month and day are ignored, so the age can be one year high near a
/// birthday.
fn deaths_subquery(column: &ValidColumn) -> String {
    format!(
        r#"
          SELECT
            id,
            state,
            race,
            CAST(SUBSTR(dod, 1, 4) AS BIGINT) - CAST(SUBSTR(dob, 1, 4) AS BIGINT) AS age_at_death
          FROM {POPULATION_TABLE}
          WHERE {column} = 'true' AND dod IS NOT NULL
    "#
    )
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use pretty_assertions::assert_eq;

    use super::*;
    use crate::executor::SqlValue;

    #[derive(Default)]
    struct StaticExecutor {
        rows: Vec<Row>,
        seen: RefCell<Vec<String>>,
    }

    impl QueryExecutor for StaticExecutor {
        fn fetch_all(&self, sql: &str) -> Result<Vec<Row>, ExecutionError> {
            self.seen.borrow_mut().push(sql.to_string());
            Ok(self.rows.clone())
        }
    }

    fn age_row(state: &str, age: i64) -> Row {
        Row::new()
            .with("state", SqlValue::Text(state.into()))
            .with("avg_age_death", SqlValue::Int(age))
    }

    #[test]
    fn validation_failure_issues_no_query() {
        let exec = StaticExecutor::default();
        let engine = ReportEngine::new(&exec);
        let err = engine.age_at_death_by_state("cancer; DROP TABLE cmspop").unwrap_err();
        assert!(err.is_validation());
        assert_eq!(err.to_string(), "disallowed column: cancerDROPTABLEcmspop");
        assert!(exec.seen.borrow().is_empty());
    }

    #[test]
    fn race_breakdown_rejects_chronic_kidney() {
        let exec = StaticExecutor::default();
        let engine = ReportEngine::new(&exec);
        let err = engine.race_breakdown_by_state("chronic_kidney").unwrap_err();
        assert!(matches!(err, ReportError::Validation(ref v) if v.column == "chronic_kidney"));
        assert!(engine.death_counts_by_state("chronic_kidney").is_ok());
    }

    #[test]
    fn shaping_keeps_arrival_order_and_duplicates() {
        let exec = StaticExecutor {
            rows: vec![age_row("NY", 60), age_row("CA", 75), age_row("NY", 61)],
            ..Default::default()
        };
        let engine = ReportEngine::new(&exec);
        let json = engine.run_json(ReportKind::AgeAtDeath, "cancer").unwrap();
        assert_eq!(json, r#"[{"NY":60},{"CA":75},{"NY":61}]"#);
    }

    #[test]
    fn each_report_issues_exactly_one_query_with_the_clean_column() {
        for kind in ReportKind::ALL {
            let exec = StaticExecutor::default();
            let engine = ReportEngine::new(&exec);
            engine.run_json(*kind, "  heart_fail;").unwrap();
            let seen = exec.seen.borrow();
            assert_eq!(seen.len(), 1, "{}", kind.as_str());
            assert!(seen[0].contains("heart_fail = "), "{}", kind.as_str());
            assert!(!seen[0].contains(';'), "{}", kind.as_str());
        }
    }

    #[test]
    fn empty_result_is_an_empty_array() {
        let exec = StaticExecutor::default();
        let engine = ReportEngine::new(&exec);
        assert_eq!(engine.run_json(ReportKind::SexRatio, "cancer").unwrap(), "[]");
    }

    #[test]
    fn row_without_state_is_an_execution_error() {
        let exec = StaticExecutor {
            rows: vec![Row::new().with("avg_age_death", SqlValue::Int(70))],
            ..Default::default()
        };
        let engine = ReportEngine::new(&exec);
        let err = engine.age_at_death_by_state("cancer").unwrap_err();
        assert!(matches!(
            err,
            ReportError::Execution(ExecutionError::MissingColumn { ref column }) if column == "state"
        ));
    }

    #[test]
    fn accepted_sets() {
        assert_eq!(ReportKind::AgeAtDeath.accepted().len(), 5);
        assert_eq!(ReportKind::RaceBreakdown.accepted().len(), 4);
        assert!(
            !ReportKind::RaceBreakdown
                .accepted()
                .contains(&DiseaseIndicator::ChronicKidney)
        );
    }
}
