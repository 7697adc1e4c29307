use serde::Deserialize;

use super::domain::{RawPrediction, RiskLevel};

/// Reasons a generative response is rejected before it can become a
/// prediction. Every variant routes the engine to the heuristic fallback.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("no balanced JSON object found in response text")]
    NoJsonObject,
    #[error("response JSON did not match the assessment schema: {0}")]
    Schema(#[from] serde_json::Error),
    #[error("{field} = {value} is outside [0, 100]")]
    OutOfRange { field: &'static str, value: f64 },
}

#[derive(Debug, Deserialize)]
struct GenerativeAssessment {
    dropout_risk_score: f64,
    risk_level: RiskLevel,
    contributing_factors: Vec<String>,
    recommendations: Vec<String>,
    confidence_score: f64,
}

/// Parses candidate text into a raw prediction.
///
/// Validation is strict on the five required keys, the risk-level enum, and
/// numeric ranges; list-size bounds are left to normalization.
pub(crate) fn parse_assessment(text: &str) -> Result<RawPrediction, ParseError> {
    let block = extract_json_block(text).ok_or(ParseError::NoJsonObject)?;
    let assessment: GenerativeAssessment = serde_json::from_str(block)?;

    check_percentile("dropout_risk_score", assessment.dropout_risk_score)?;
    check_percentile("confidence_score", assessment.confidence_score)?;

    Ok(RawPrediction {
        dropout_risk_score: assessment.dropout_risk_score,
        risk_level: assessment.risk_level,
        contributing_factors: assessment.contributing_factors,
        recommendations: assessment.recommendations,
        confidence_score: assessment.confidence_score,
    })
}

fn check_percentile(field: &'static str, value: f64) -> Result<(), ParseError> {
    if value.is_finite() && (0.0..=100.0).contains(&value) {
        Ok(())
    } else {
        Err(ParseError::OutOfRange { field, value })
    }
}

/// Returns the first balanced `{…}` substring, honoring JSON string
/// literals so braces inside quoted text do not affect nesting depth.
fn extract_json_block(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, ch) in text[start..].char_indices() {
        if in_string {
            if escaped {
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == '"' {
                in_string = false;
            }
            continue;
        }

        match ch {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..start + offset + ch.len_utf8()]);
                }
            }
            _ => {}
        }
    }

    None
}
