use chrono::Utc;
use metrics_exporter_prometheus::PrometheusHandle;
use retention_ai::engine::{
    Prediction, PredictionDraft, PredictionStore, ProfileSource, StoreError, StudentId,
    StudentProfile,
};
use std::collections::HashMap;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Keyed profile records, latest write wins.
#[derive(Default, Clone)]
pub(crate) struct InMemoryStudentDirectory {
    records: Arc<Mutex<HashMap<String, StudentProfile>>>,
}

impl ProfileSource for InMemoryStudentDirectory {
    fn fetch(&self, id: &StudentId) -> Result<Option<StudentProfile>, StoreError> {
        let guard = self.records.lock().expect("directory mutex poisoned");
        Ok(guard.get(&id.0).cloned())
    }

    fn upsert(&self, profile: StudentProfile) -> Result<(), StoreError> {
        let mut guard = self.records.lock().expect("directory mutex poisoned");
        guard.insert(profile.id.0.clone(), profile);
        Ok(())
    }
}

/// Append-only prediction history. `latest` breaks created_at ties in favor
/// of the later append.
#[derive(Default, Clone)]
pub(crate) struct InMemoryPredictionLog {
    records: Arc<Mutex<Vec<Prediction>>>,
}

impl PredictionStore for InMemoryPredictionLog {
    fn append(&self, draft: PredictionDraft) -> Result<Prediction, StoreError> {
        let prediction = Prediction::from_draft(draft, Utc::now());
        let mut guard = self.records.lock().expect("prediction mutex poisoned");
        guard.push(prediction.clone());
        Ok(prediction)
    }

    fn latest(&self, id: &StudentId) -> Result<Option<Prediction>, StoreError> {
        let guard = self.records.lock().expect("prediction mutex poisoned");
        Ok(guard
            .iter()
            .filter(|prediction| prediction.student_id == *id)
            .max_by_key(|prediction| prediction.created_at)
            .cloned())
    }
}
