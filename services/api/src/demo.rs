use crate::infra::{InMemoryPredictionLog, InMemoryStudentDirectory};
use clap::Args;
use retention_ai::config::AppConfig;
use retention_ai::engine::{
    HttpGenerativeScorer, ProfileSource, RiskEngine, StudentId, StudentProfile,
};
use retention_ai::error::AppError;
use retention_ai::roster::RosterImporter;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Args, Debug, Default)]
pub(crate) struct AssessArgs {
    /// Student identifier for the ad-hoc profile
    #[arg(long, default_value = "demo-student")]
    pub(crate) student_id: String,
    /// CGPA on the 0-10 scale
    #[arg(long)]
    pub(crate) cgpa: Option<f64>,
    /// Attendance percentage (0-100)
    #[arg(long)]
    pub(crate) attendance: Option<f64>,
    /// Number of pending backlogs
    #[arg(long)]
    pub(crate) backlogs: Option<u32>,
    /// Self-reported mental health score (1-10)
    #[arg(long)]
    pub(crate) mental_health: Option<f64>,
    /// Average study hours per day
    #[arg(long)]
    pub(crate) study_hours: Option<f64>,
    /// Year of study (1-5)
    #[arg(long, default_value_t = 1)]
    pub(crate) year: u8,
    /// Annual family income
    #[arg(long)]
    pub(crate) family_income: Option<f64>,
    /// Extracurricular activity, repeatable
    #[arg(long = "activity")]
    pub(crate) activities: Vec<String>,
    /// Score every row of a roster CSV export instead of an ad-hoc profile
    #[arg(long)]
    pub(crate) roster: Option<PathBuf>,
}

/// Offline scoring path for demos and spot checks. Uses the same engine as
/// the HTTP service with throwaway in-memory storage; predictions are
/// printed, not kept.
pub(crate) async fn run_assess(args: AssessArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;

    let directory = Arc::new(InMemoryStudentDirectory::default());
    let prediction_log = Arc::new(InMemoryPredictionLog::default());
    let scorer = Arc::new(HttpGenerativeScorer::from_config(&config.engine));
    let engine = RiskEngine::new(directory, scorer, prediction_log, config.engine.clone());

    let AssessArgs {
        student_id,
        cgpa,
        attendance,
        backlogs,
        mental_health,
        study_hours,
        year,
        family_income,
        activities,
        roster,
    } = args;

    let profiles = match roster {
        Some(path) => RosterImporter::from_path(path)?,
        None => vec![StudentProfile {
            id: StudentId(student_id),
            current_cgpa: cgpa,
            attendance_percentage: attendance,
            previous_backlogs: backlogs,
            mental_health_score: mental_health,
            study_hours_per_day: study_hours,
            year_of_study: year,
            family_income,
            extracurricular_activities: activities,
        }],
    };

    for profile in profiles {
        let id = profile.id.clone();
        if let Err(err) = engine.profiles().upsert(profile) {
            println!("Could not stage profile {}: {}", id, err);
            continue;
        }

        match engine.assess(&id).await {
            Ok(prediction) => match serde_json::to_string_pretty(&prediction) {
                Ok(json) => println!("{json}"),
                Err(err) => println!("Prediction for {} not serializable: {}", id, err),
            },
            Err(err) => println!("Assessment unavailable for {}: {}", id, err),
        }
    }

    Ok(())
}
