use super::domain::StudentProfile;

const RESPONSE_SHAPE: &str = r#"Format your response as JSON with these exact keys:
{
  "dropout_risk_score": number,
  "risk_level": "low|medium|high|critical",
  "contributing_factors": ["factor1", "factor2", ...],
  "recommendations": ["rec1", "rec2", ...],
  "confidence_score": number
}"#;

/// Builds the generative-scorer prompt for a profile.
///
/// The wording is part of the contract with the text-generation service:
/// changing it requires bumping the generative model-version tag.
pub(crate) fn build_prompt(profile: &StudentProfile) -> String {
    let activities = if profile.extracurricular_activities.is_empty() {
        "None".to_string()
    } else {
        profile.extracurricular_activities.join(", ")
    };

    format!(
        "You are an AI system that predicts dropout risk for college students.\n\
         Analyze the following student data and provide a dropout risk assessment:\n\
         \n\
         Student Data:\n\
         - CGPA: {cgpa}/10\n\
         - Attendance: {attendance}%\n\
         - Previous Backlogs: {backlogs}\n\
         - Mental Health Score: {mental}/10\n\
         - Study Hours per Day: {study_hours}\n\
         - Year of Study: {year}\n\
         - Family Income (annual): {income}\n\
         - Extracurricular Activities: {activities}\n\
         \n\
         Please provide:\n\
         1. Dropout risk score (0-100)\n\
         2. Risk level (low, medium, high, critical)\n\
         3. Top 3-5 contributing factors\n\
         4. 3-5 specific recommendations\n\
         5. Confidence score (0-100)\n\
         \n\
         {shape}\n",
        cgpa = fmt_optional(profile.current_cgpa),
        attendance = fmt_optional(profile.attendance_percentage),
        backlogs = profile
            .previous_backlogs
            .map(|count| count.to_string())
            .unwrap_or_else(|| "unknown".to_string()),
        mental = fmt_optional(profile.mental_health_score),
        study_hours = fmt_optional(profile.study_hours_per_day),
        year = profile.year_of_study,
        income = fmt_optional(profile.family_income),
        activities = activities,
        shape = RESPONSE_SHAPE,
    )
}

fn fmt_optional(value: Option<f64>) -> String {
    match value {
        Some(value) => format!("{value}"),
        None => "unknown".to_string(),
    }
}
