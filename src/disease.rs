use std::fmt;

use serde::Serialize;

use crate::error::ValidationError;

/// Boolean condition flags carried on every `cmspop` row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DiseaseIndicator {
    AlzRelSen,
    HeartFail,
    ChronicKidney,
    Cancer,
    Depression,
}

impl DiseaseIndicator {
    pub const ALL: &'static [DiseaseIndicator] = &[
        DiseaseIndicator::AlzRelSen,
        DiseaseIndicator::HeartFail,
        DiseaseIndicator::ChronicKidney,
        DiseaseIndicator::Cancer,
        DiseaseIndicator::Depression,
    ];

    /// Column name of the flag in `cmspop`.
    pub fn column(self) -> &'static str {
        match self {
            DiseaseIndicator::AlzRelSen => "alz_rel_sen",
            DiseaseIndicator::HeartFail => "heart_fail",
            DiseaseIndicator::ChronicKidney => "chronic_kidney",
            DiseaseIndicator::Cancer => "cancer",
            DiseaseIndicator::Depression => "depression",
        }
    }

    fn from_column(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|d| d.column() == name)
    }
}

impl fmt::Display for DiseaseIndicator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column())
    }
}

/// A disease indicator that passed [`validate`] for a specific report.
///
/// Only safe in an identifier position of a SQL statement. It is never quoted
/// and must not be used as a value literal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidColumn(DiseaseIndicator);

impl ValidColumn {
    pub fn indicator(&self) -> DiseaseIndicator {
        self.0
    }

    pub fn as_str(&self) -> &'static str {
        self.0.column()
    }
}

impl fmt::Display for ValidColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Drops everything that is not an ASCII word character (`[A-Za-z0-9_]`).
pub fn normalize(raw: &str) -> String {
    raw.chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_')
        .collect()
}

/// Normalizes `raw` and checks it against `accepted`.
///
/// Membership in `accepted` is the actual gate; normalization only removes
/// characters an identifier could never contain.
pub fn validate(raw: &str, accepted: &[DiseaseIndicator]) -> Result<ValidColumn, ValidationError> {
    let cleaned = normalize(raw);
    match DiseaseIndicator::from_column(&cleaned) {
        Some(indicator) if accepted.contains(&indicator) => Ok(ValidColumn(indicator)),
        _ => Err(ValidationError { column: cleaned }),
    }
}
