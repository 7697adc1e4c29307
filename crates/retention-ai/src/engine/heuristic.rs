use super::domain::{RawPrediction, RiskLevel, StudentProfile};

/// Confidence reported for every heuristic assessment.
const HEURISTIC_CONFIDENCE: f64 = 85.0;

/// Deterministic rule-based scorer used whenever the generative path is
/// unavailable or rejected.
///
/// Rules fire in severity-descending order and each firing rule contributes
/// points plus a factor/recommendation pair. Rules whose signal is unknown
/// are skipped.
pub(crate) fn heuristic_assessment(profile: &StudentProfile) -> RawPrediction {
    let mut score = 0u32;
    let mut factors: Vec<String> = Vec::new();
    let mut recommendations: Vec<String> = Vec::new();

    if let Some(cgpa) = profile.current_cgpa {
        if cgpa < 5.0 {
            score += 40;
            factors.push("Very low CGPA".to_string());
            recommendations.push("Seek immediate academic support and tutoring".to_string());
        } else if cgpa < 6.5 {
            score += 25;
            factors.push("Below average CGPA".to_string());
            recommendations.push(
                "Focus on improving study habits and seek help in difficult subjects".to_string(),
            );
        } else if cgpa < 8.0 {
            // Mild academic signal: points only, no factor or recommendation.
            score += 10;
        }
    }

    if let Some(attendance) = profile.attendance_percentage {
        if attendance < 60.0 {
            score += 25;
            factors.push("Poor attendance".to_string());
            recommendations.push(
                "Improve attendance and communicate with professors about absences".to_string(),
            );
        } else if attendance < 80.0 {
            score += 15;
            factors.push("Below average attendance".to_string());
            recommendations.push("Work on maintaining consistent attendance".to_string());
        }
    }

    if let Some(backlogs) = profile.previous_backlogs {
        if backlogs > 3 {
            score += 20;
            factors.push("Multiple backlogs".to_string());
            recommendations.push("Create a plan to clear pending backlogs".to_string());
        } else if backlogs > 0 {
            score += 10;
            factors.push("Pending backlogs".to_string());
            recommendations.push("Focus on clearing current backlogs".to_string());
        }
    }

    if let Some(mental) = profile.mental_health_score {
        if mental < 4.0 {
            score += 15;
            factors.push("Low mental health score".to_string());
            recommendations.push("Seek counseling and mental health support".to_string());
        } else if mental < 6.0 {
            score += 8;
            factors.push("Mental health concerns".to_string());
            recommendations.push("Practice stress management and self-care".to_string());
        }
    }

    let capped = score.min(100);

    RawPrediction {
        dropout_risk_score: f64::from(capped),
        risk_level: RiskLevel::from_score(capped as u8),
        contributing_factors: factors,
        recommendations,
        confidence_score: HEURISTIC_CONFIDENCE,
    }
}
