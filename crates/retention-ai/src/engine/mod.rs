pub mod domain;
mod generative;
mod heuristic;
pub(crate) mod normalizer;
mod parser;
mod prompt;
mod router;
mod store;

pub use domain::{
    Prediction, PredictionDraft, ProfileError, RawPrediction, RiskLevel, ScorerKind, StudentId,
    StudentProfile,
};
pub use generative::{GenerativeError, GenerativeScorer, HttpGenerativeScorer};
pub use normalizer::DEFAULT_FILLER_RECOMMENDATIONS;
pub use router::engine_router;
pub use store::{PredictionStore, ProfileSource, StoreError};

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use crate::config::EngineConfig;
use parser::ParseError;

/// Orchestrates one dropout-risk assessment: resolve and validate the
/// profile, try the generative scorer, fall back to the heuristic on any
/// rejection, normalize, persist.
///
/// Generative failures never surface to the caller; only storage and
/// profile-level errors can fail an assessment.
pub struct RiskEngine<P, G, S> {
    profiles: Arc<P>,
    scorer: Arc<G>,
    store: Arc<S>,
    config: EngineConfig,
}

impl<P, G, S> RiskEngine<P, G, S>
where
    P: ProfileSource + 'static,
    G: GenerativeScorer + 'static,
    S: PredictionStore + 'static,
{
    pub fn new(profiles: Arc<P>, scorer: Arc<G>, store: Arc<S>, config: EngineConfig) -> Self {
        Self {
            profiles,
            scorer,
            store,
            config,
        }
    }

    pub fn profiles(&self) -> &P {
        &self.profiles
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Produces and persists a new prediction for the student. Each call
    /// appends a fresh record; there is no dedupe across calls.
    pub async fn assess(&self, student_id: &StudentId) -> Result<Prediction, AssessmentError> {
        let profile = self
            .profiles
            .fetch(student_id)?
            .ok_or_else(|| AssessmentError::ProfileNotFound(student_id.clone()))?;
        profile.validate()?;

        let (raw, kind) = match self.generative_attempt(&profile).await {
            Ok(raw) => {
                debug!(student = %profile.id, "generative assessment accepted");
                (raw, ScorerKind::Generative)
            }
            Err(failure) => {
                warn!(
                    student = %profile.id,
                    reason = %failure,
                    "generative path rejected, running heuristic fallback"
                );
                (heuristic::heuristic_assessment(&profile), ScorerKind::Heuristic)
            }
        };

        let draft = normalizer::normalize(
            profile.id.clone(),
            raw,
            kind,
            &self.config.filler_recommendations,
        );
        let stored = self.store.append(draft)?;
        Ok(stored)
    }

    /// One bounded generative attempt: prompt, round trip, extraction,
    /// schema validation. No retry.
    async fn generative_attempt(
        &self,
        profile: &StudentProfile,
    ) -> Result<RawPrediction, ScorerFailure> {
        let prompt = prompt::build_prompt(profile);
        let budget = Duration::from_millis(self.config.timeout_ms);

        let text = tokio::time::timeout(budget, self.scorer.complete(&prompt))
            .await
            .map_err(|_| ScorerFailure::Timeout)?
            .map_err(ScorerFailure::Scorer)?;

        parser::parse_assessment(&text).map_err(ScorerFailure::Malformed)
    }
}

/// Failures an assessment can surface to its caller.
#[derive(Debug, thiserror::Error)]
pub enum AssessmentError {
    #[error("no student record for {0}")]
    ProfileNotFound(StudentId),
    #[error("student profile failed validation: {0}")]
    InvalidProfile(#[from] ProfileError),
    #[error(transparent)]
    Storage(#[from] StoreError),
}

/// Why a generative attempt was abandoned. Logged, never surfaced.
#[derive(Debug)]
enum ScorerFailure {
    Scorer(GenerativeError),
    Timeout,
    Malformed(ParseError),
}

impl fmt::Display for ScorerFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScorerFailure::Scorer(err) => write!(f, "{err}"),
            ScorerFailure::Timeout => write!(f, "generative call exceeded its time budget"),
            ScorerFailure::Malformed(err) => write!(f, "{err}"),
        }
    }
}
