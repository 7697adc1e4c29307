use serde::{Deserialize, Deserializer};
use std::io::Read;

use crate::engine::StudentProfile;

pub(crate) fn parse_records<R: Read>(reader: R) -> Result<Vec<StudentProfile>, csv::Error> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let mut profiles = Vec::new();

    for record in csv_reader.deserialize::<RosterRow>() {
        profiles.push(record?.into_profile());
    }

    Ok(profiles)
}

/// One row of an advising-office roster export. Columns keep the export's
/// human-facing headers; blank cells mean the signal was not captured.
#[derive(Debug, Deserialize)]
struct RosterRow {
    #[serde(rename = "Student ID")]
    student_id: String,
    #[serde(
        rename = "Current CGPA",
        default,
        deserialize_with = "empty_string_as_none"
    )]
    current_cgpa: Option<f64>,
    #[serde(
        rename = "Attendance %",
        default,
        deserialize_with = "empty_string_as_none"
    )]
    attendance_percentage: Option<f64>,
    #[serde(
        rename = "Previous Backlogs",
        default,
        deserialize_with = "empty_string_as_none"
    )]
    previous_backlogs: Option<u32>,
    #[serde(
        rename = "Mental Health Score",
        default,
        deserialize_with = "empty_string_as_none"
    )]
    mental_health_score: Option<f64>,
    #[serde(
        rename = "Study Hours Per Day",
        default,
        deserialize_with = "empty_string_as_none"
    )]
    study_hours_per_day: Option<f64>,
    #[serde(rename = "Year of Study")]
    year_of_study: u8,
    #[serde(
        rename = "Family Income",
        default,
        deserialize_with = "empty_string_as_none"
    )]
    family_income: Option<f64>,
    #[serde(rename = "Extracurricular Activities", default)]
    extracurricular_activities: String,
}

impl RosterRow {
    fn into_profile(self) -> StudentProfile {
        let extracurricular_activities = self
            .extracurricular_activities
            .split(';')
            .map(str::trim)
            .filter(|activity| !activity.is_empty())
            .map(str::to_owned)
            .collect();

        StudentProfile {
            id: crate::engine::StudentId(self.student_id),
            current_cgpa: self.current_cgpa,
            attendance_percentage: self.attendance_percentage,
            previous_backlogs: self.previous_backlogs,
            mental_health_score: self.mental_health_score,
            study_hours_per_day: self.study_hours_per_day,
            year_of_study: self.year_of_study,
            family_income: self.family_income,
            extracurricular_activities,
        }
    }
}

fn empty_string_as_none<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    match opt.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => value
            .parse::<T>()
            .map(Some)
            .map_err(serde::de::Error::custom),
    }
}
