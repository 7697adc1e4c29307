use super::domain::{PredictionDraft, RawPrediction, RiskLevel, ScorerKind, StudentId};

/// Appended to heuristic or generative output when fewer than three
/// recommendations survive normalization. Literal order matters.
pub const DEFAULT_FILLER_RECOMMENDATIONS: [&str; 3] = [
    "Maintain regular study schedule",
    "Participate in extracurricular activities",
    "Build relationships with professors and peers",
];

const MAX_LIST_ITEM_CHARS: usize = 240;
const MAX_FACTORS: usize = 5;
const MIN_RECOMMENDATIONS: usize = 3;
const MAX_RECOMMENDATIONS: usize = 5;

/// Applies the persistence-time invariants to a raw assessment, whichever
/// scorer produced it.
///
/// The numeric score is authoritative: the stored risk level is always
/// re-derived from it, overriding whatever level the scorer reported.
pub(crate) fn normalize(
    student_id: StudentId,
    raw: RawPrediction,
    kind: ScorerKind,
    filler: &[String],
) -> PredictionDraft {
    let dropout_risk_score = clamp_percentile(raw.dropout_risk_score);
    let risk_level = RiskLevel::from_score(dropout_risk_score);
    let confidence_score = clamp_percentile(raw.confidence_score);

    let mut contributing_factors = tidy_list(raw.contributing_factors);
    contributing_factors.truncate(MAX_FACTORS);

    let mut recommendations = tidy_list(raw.recommendations);
    for entry in filler {
        if recommendations.len() >= MIN_RECOMMENDATIONS {
            break;
        }
        if !recommendations.iter().any(|existing| existing == entry) {
            recommendations.push(entry.clone());
        }
    }
    recommendations.truncate(MAX_RECOMMENDATIONS);

    PredictionDraft {
        student_id,
        dropout_risk_score,
        risk_level,
        contributing_factors,
        recommendations,
        confidence_score,
        model_version: kind.version_tag().to_string(),
    }
}

fn clamp_percentile(value: f64) -> u8 {
    if value.is_nan() {
        return 0;
    }
    value.clamp(0.0, 100.0).round() as u8
}

/// Trims entries, drops empties, caps length at a character boundary, and
/// dedupes preserving first occurrence.
fn tidy_list(entries: Vec<String>) -> Vec<String> {
    let mut seen: Vec<String> = Vec::with_capacity(entries.len());
    for entry in entries {
        let trimmed = entry.trim();
        if trimmed.is_empty() {
            continue;
        }
        let capped: String = trimmed.chars().take(MAX_LIST_ITEM_CHARS).collect();
        if !seen.iter().any(|existing| *existing == capped) {
            seen.push(capped);
        }
    }
    seen
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filler() -> Vec<String> {
        DEFAULT_FILLER_RECOMMENDATIONS
            .iter()
            .map(|entry| entry.to_string())
            .collect()
    }

    fn raw(score: f64, level: RiskLevel) -> RawPrediction {
        RawPrediction {
            dropout_risk_score: score,
            risk_level: level,
            contributing_factors: vec!["Low attendance".to_string()],
            recommendations: vec![
                "Attend classes".to_string(),
                "Meet advisor".to_string(),
                "Plan revision".to_string(),
            ],
            confidence_score: 70.0,
        }
    }

    fn student() -> StudentId {
        StudentId("stu-7".to_string())
    }

    #[test]
    fn score_is_authoritative_over_reported_level() {
        let draft = normalize(
            student(),
            raw(42.0, RiskLevel::Low),
            ScorerKind::Generative,
            &filler(),
        );
        assert_eq!(draft.dropout_risk_score, 42);
        assert_eq!(draft.risk_level, RiskLevel::Medium);
        assert_eq!(draft.model_version, "generative-v1");
    }

    #[test]
    fn score_and_confidence_are_clamped_and_rounded() {
        let mut out_of_band = raw(123.7, RiskLevel::Low);
        out_of_band.confidence_score = -4.0;
        let draft = normalize(student(), out_of_band, ScorerKind::Generative, &filler());
        assert_eq!(draft.dropout_risk_score, 100);
        assert_eq!(draft.risk_level, RiskLevel::Critical);
        assert_eq!(draft.confidence_score, 0);
    }

    #[test]
    fn lists_are_trimmed_deduped_and_bounded() {
        let mut messy = raw(10.0, RiskLevel::Low);
        messy.contributing_factors = vec![
            "  Poor attendance  ".to_string(),
            "Poor attendance".to_string(),
            String::new(),
            "   ".to_string(),
            "A".to_string(),
            "B".to_string(),
            "C".to_string(),
            "D".to_string(),
            "E".to_string(),
        ];
        let draft = normalize(student(), messy, ScorerKind::Heuristic, &filler());
        assert_eq!(draft.contributing_factors.len(), 5);
        assert_eq!(draft.contributing_factors[0], "Poor attendance");
        assert!(draft
            .contributing_factors
            .iter()
            .all(|factor| factor == factor.trim() && !factor.is_empty()));
    }

    #[test]
    fn overlong_entries_are_capped_at_240_chars() {
        let mut long = raw(10.0, RiskLevel::Low);
        long.contributing_factors = vec!["x".repeat(500)];
        let draft = normalize(student(), long, ScorerKind::Heuristic, &filler());
        assert_eq!(draft.contributing_factors[0].chars().count(), 240);
    }

    #[test]
    fn sparse_recommendations_are_padded_from_filler_in_order() {
        let mut sparse = raw(0.0, RiskLevel::Low);
        sparse.recommendations = Vec::new();
        let draft = normalize(student(), sparse, ScorerKind::Heuristic, &filler());
        assert_eq!(
            draft.recommendations,
            vec![
                "Maintain regular study schedule",
                "Participate in extracurricular activities",
                "Build relationships with professors and peers",
            ]
        );
    }

    #[test]
    fn filler_padding_skips_entries_already_present() {
        let mut partial = raw(0.0, RiskLevel::Low);
        partial.recommendations = vec![
            "Maintain regular study schedule".to_string(),
            "Seek counseling and mental health support".to_string(),
        ];
        let draft = normalize(student(), partial, ScorerKind::Heuristic, &filler());
        assert_eq!(draft.recommendations.len(), 3);
        assert_eq!(
            draft.recommendations[2],
            "Participate in extracurricular activities"
        );
    }

    #[test]
    fn full_recommendation_lists_are_not_padded() {
        let mut full = raw(0.0, RiskLevel::Low);
        full.recommendations = vec![
            "One".to_string(),
            "Two".to_string(),
            "Three".to_string(),
            "Four".to_string(),
            "Five".to_string(),
            "Six".to_string(),
        ];
        let draft = normalize(student(), full, ScorerKind::Heuristic, &filler());
        assert_eq!(draft.recommendations.len(), 5);
        assert_eq!(draft.recommendations[4], "Five");
    }

    #[test]
    fn heuristic_tag_is_stamped() {
        let draft = normalize(student(), raw(5.0, RiskLevel::Low), ScorerKind::Heuristic, &filler());
        assert_eq!(draft.model_version, "heuristic-v1");
    }
}
