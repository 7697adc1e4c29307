use super::domain::{Prediction, PredictionDraft, StudentId, StudentProfile};

/// Resolves the current profile for a student and accepts ingested records.
///
/// Abstracted so the engine can be exercised against in-memory fixtures; a
/// real deployment plugs a datastore-backed implementation in here.
pub trait ProfileSource: Send + Sync {
    fn fetch(&self, id: &StudentId) -> Result<Option<StudentProfile>, StoreError>;
    fn upsert(&self, profile: StudentProfile) -> Result<(), StoreError>;
}

/// Append-only storage for prediction records.
///
/// `append` assigns `created_at` (and whatever tie-break sequence the store
/// maintains); records are never updated or deleted by the engine.
pub trait PredictionStore: Send + Sync {
    fn append(&self, draft: PredictionDraft) -> Result<Prediction, StoreError>;
    fn latest(&self, id: &StudentId) -> Result<Option<Prediction>, StoreError>;
}

/// Storage failures are fatal to an assessment; there is no in-engine retry.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("storage unavailable: {0}")]
    Unavailable(String),
}
