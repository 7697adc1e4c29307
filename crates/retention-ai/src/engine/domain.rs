use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier wrapper for student records.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StudentId(pub String);

impl fmt::Display for StudentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Structured profile a prediction is taken against.
///
/// Optional numerics are "unknown": the heuristic skips the rules they feed
/// and the generative prompt prints them as unknown. Values that are present
/// must sit inside the documented ranges (`validate`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudentProfile {
    pub id: StudentId,
    pub current_cgpa: Option<f64>,
    pub attendance_percentage: Option<f64>,
    pub previous_backlogs: Option<u32>,
    pub mental_health_score: Option<f64>,
    pub study_hours_per_day: Option<f64>,
    pub year_of_study: u8,
    pub family_income: Option<f64>,
    #[serde(default)]
    pub extracurricular_activities: Vec<String>,
}

impl StudentProfile {
    pub fn validate(&self) -> Result<(), ProfileError> {
        if self.id.0.trim().is_empty() {
            return Err(ProfileError::MissingId);
        }

        check_range("current_cgpa", self.current_cgpa, 0.0, 10.0)?;
        check_range("attendance_percentage", self.attendance_percentage, 0.0, 100.0)?;
        check_range("mental_health_score", self.mental_health_score, 1.0, 10.0)?;
        check_range("study_hours_per_day", self.study_hours_per_day, 0.0, 24.0)?;

        if let Some(income) = self.family_income {
            if !income.is_finite() || income < 0.0 {
                return Err(ProfileError::NegativeIncome { value: income });
            }
        }

        if !(1..=5).contains(&self.year_of_study) {
            return Err(ProfileError::OutOfRange {
                field: "year_of_study",
                value: f64::from(self.year_of_study),
                min: 1.0,
                max: 5.0,
            });
        }

        Ok(())
    }
}

fn check_range(
    field: &'static str,
    value: Option<f64>,
    min: f64,
    max: f64,
) -> Result<(), ProfileError> {
    match value {
        Some(value) if value.is_finite() && value >= min && value <= max => Ok(()),
        Some(value) => Err(ProfileError::OutOfRange {
            field,
            value,
            min,
            max,
        }),
        None => Ok(()),
    }
}

/// Validation failure for a stored or submitted profile.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ProfileError {
    #[error("student id is missing or blank")]
    MissingId,
    #[error("{field} = {value} is outside [{min}, {max}]")]
    OutOfRange {
        field: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },
    #[error("family_income = {value} must be a non-negative amount")]
    NegativeIncome { value: f64 },
}

/// Four-valued categorical projection of the risk score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    Critical,
}

impl RiskLevel {
    /// Single source of truth for score-to-level assignment.
    pub const fn from_score(score: u8) -> Self {
        match score {
            70..=u8::MAX => Self::Critical,
            50..=69 => Self::High,
            30..=49 => Self::Medium,
            _ => Self::Low,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            RiskLevel::Low => "low",
            RiskLevel::Medium => "medium",
            RiskLevel::High => "high",
            RiskLevel::Critical => "critical",
        }
    }
}

/// Which scoring strategy produced a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScorerKind {
    Generative,
    Heuristic,
}

impl ScorerKind {
    pub const fn version_tag(self) -> &'static str {
        match self {
            ScorerKind::Generative => "generative-v1",
            ScorerKind::Heuristic => "heuristic-v1",
        }
    }
}

/// Raw assessment as either scorer emits it, before normalization.
#[derive(Debug, Clone, PartialEq)]
pub struct RawPrediction {
    pub dropout_risk_score: f64,
    pub risk_level: RiskLevel,
    pub contributing_factors: Vec<String>,
    pub recommendations: Vec<String>,
    pub confidence_score: f64,
}

/// Normalized record handed to the store; `created_at` is store-assigned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionDraft {
    pub student_id: StudentId,
    pub dropout_risk_score: u8,
    pub risk_level: RiskLevel,
    pub contributing_factors: Vec<String>,
    pub recommendations: Vec<String>,
    pub confidence_score: u8,
    pub model_version: String,
}

/// Immutable persisted output of one assessment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub student_id: StudentId,
    pub dropout_risk_score: u8,
    pub risk_level: RiskLevel,
    pub contributing_factors: Vec<String>,
    pub recommendations: Vec<String>,
    pub confidence_score: u8,
    pub model_version: String,
    pub created_at: DateTime<Utc>,
}

impl Prediction {
    pub fn from_draft(draft: PredictionDraft, created_at: DateTime<Utc>) -> Self {
        Self {
            student_id: draft.student_id,
            dropout_risk_score: draft.dropout_risk_score,
            risk_level: draft.risk_level,
            contributing_factors: draft.contributing_factors,
            recommendations: draft.recommendations,
            confidence_score: draft.confidence_score,
            model_version: draft.model_version,
            created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile() -> StudentProfile {
        StudentProfile {
            id: StudentId("stu-001".to_string()),
            current_cgpa: Some(7.4),
            attendance_percentage: Some(88.0),
            previous_backlogs: Some(0),
            mental_health_score: Some(7.0),
            study_hours_per_day: Some(4.5),
            year_of_study: 2,
            family_income: Some(450_000.0),
            extracurricular_activities: vec!["debate".to_string()],
        }
    }

    #[test]
    fn level_thresholds_match_documented_bands() {
        assert_eq!(RiskLevel::from_score(0), RiskLevel::Low);
        assert_eq!(RiskLevel::from_score(29), RiskLevel::Low);
        assert_eq!(RiskLevel::from_score(30), RiskLevel::Medium);
        assert_eq!(RiskLevel::from_score(49), RiskLevel::Medium);
        assert_eq!(RiskLevel::from_score(50), RiskLevel::High);
        assert_eq!(RiskLevel::from_score(69), RiskLevel::High);
        assert_eq!(RiskLevel::from_score(70), RiskLevel::Critical);
        assert_eq!(RiskLevel::from_score(100), RiskLevel::Critical);
    }

    #[test]
    fn risk_level_serializes_lowercase() {
        let json = serde_json::to_string(&RiskLevel::Critical).expect("serialize");
        assert_eq!(json, "\"critical\"");
        let parsed: RiskLevel = serde_json::from_str("\"medium\"").expect("deserialize");
        assert_eq!(parsed, RiskLevel::Medium);
    }

    #[test]
    fn valid_profile_passes() {
        profile().validate().expect("profile within ranges");
    }

    #[test]
    fn unknown_numerics_are_permitted() {
        let mut sparse = profile();
        sparse.current_cgpa = None;
        sparse.mental_health_score = None;
        sparse.family_income = None;
        sparse.validate().expect("unknown fields skip range checks");
    }

    #[test]
    fn out_of_range_cgpa_is_rejected() {
        let mut bad = profile();
        bad.current_cgpa = Some(11.0);
        let error = bad.validate().expect_err("cgpa above scale");
        assert!(matches!(
            error,
            ProfileError::OutOfRange {
                field: "current_cgpa",
                ..
            }
        ));
    }

    #[test]
    fn blank_id_is_rejected() {
        let mut bad = profile();
        bad.id = StudentId("   ".to_string());
        assert_eq!(bad.validate().expect_err("blank id"), ProfileError::MissingId);
    }

    #[test]
    fn year_of_study_outside_band_is_rejected() {
        let mut bad = profile();
        bad.year_of_study = 6;
        assert!(bad.validate().is_err());
    }
}
