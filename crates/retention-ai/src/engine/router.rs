use std::io::Cursor;
use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;

use crate::roster::RosterImporter;

use super::domain::{StudentId, StudentProfile};
use super::generative::GenerativeScorer;
use super::store::{PredictionStore, ProfileSource};
use super::RiskEngine;

/// Router builder exposing the assessment endpoint and the student
/// ingestion surface.
pub fn engine_router<P, G, S>(engine: Arc<RiskEngine<P, G, S>>) -> Router
where
    P: ProfileSource + 'static,
    G: GenerativeScorer + 'static,
    S: PredictionStore + 'static,
{
    Router::new()
        .route("/api/v1/predictions", post(assess_handler::<P, G, S>))
        .route("/api/v1/students", post(register_handler::<P, G, S>))
        .route(
            "/api/v1/students/import",
            post(import_roster_handler::<P, G, S>),
        )
        .route(
            "/api/v1/students/:student_id",
            get(student_handler::<P, G, S>),
        )
        .with_state(engine)
}

#[derive(Debug, Deserialize)]
pub(crate) struct AssessmentRequest {
    #[serde(rename = "studentId", default)]
    student_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RosterImportRequest {
    roster_csv: String,
}

pub(crate) async fn assess_handler<P, G, S>(
    State(engine): State<Arc<RiskEngine<P, G, S>>>,
    Json(payload): Json<AssessmentRequest>,
) -> Response
where
    P: ProfileSource + 'static,
    G: GenerativeScorer + 'static,
    S: PredictionStore + 'static,
{
    let student_id = payload
        .student_id
        .map(|id| id.trim().to_string())
        .filter(|id| !id.is_empty());

    let Some(student_id) = student_id else {
        let payload = json!({ "error": "Student ID is required" });
        return (StatusCode::BAD_REQUEST, Json(payload)).into_response();
    };

    match engine.assess(&StudentId(student_id)).await {
        Ok(prediction) => {
            let payload = json!({ "prediction": prediction });
            (StatusCode::OK, Json(payload)).into_response()
        }
        Err(error) => {
            // The caller never learns which scorer ran or why the call
            // failed; model_version on successful records is the only tell.
            tracing::error!(%error, "prediction request failed");
            let payload = json!({ "error": "Failed to generate prediction" });
            (StatusCode::INTERNAL_SERVER_ERROR, Json(payload)).into_response()
        }
    }
}

pub(crate) async fn register_handler<P, G, S>(
    State(engine): State<Arc<RiskEngine<P, G, S>>>,
    Json(profile): Json<StudentProfile>,
) -> Response
where
    P: ProfileSource + 'static,
    G: GenerativeScorer + 'static,
    S: PredictionStore + 'static,
{
    if let Err(error) = profile.validate() {
        let payload = json!({ "error": error.to_string() });
        return (StatusCode::UNPROCESSABLE_ENTITY, Json(payload)).into_response();
    }

    match engine.profiles().upsert(profile.clone()) {
        Ok(()) => {
            let payload = json!({ "student": profile });
            (StatusCode::CREATED, Json(payload)).into_response()
        }
        Err(error) => {
            let payload = json!({ "error": error.to_string() });
            (StatusCode::INTERNAL_SERVER_ERROR, Json(payload)).into_response()
        }
    }
}

pub(crate) async fn student_handler<P, G, S>(
    State(engine): State<Arc<RiskEngine<P, G, S>>>,
    Path(student_id): Path<String>,
) -> Response
where
    P: ProfileSource + 'static,
    G: GenerativeScorer + 'static,
    S: PredictionStore + 'static,
{
    let id = StudentId(student_id);

    let profile = match engine.profiles().fetch(&id) {
        Ok(Some(profile)) => profile,
        Ok(None) => {
            let payload = json!({ "error": "Student not found" });
            return (StatusCode::NOT_FOUND, Json(payload)).into_response();
        }
        Err(error) => {
            let payload = json!({ "error": error.to_string() });
            return (StatusCode::INTERNAL_SERVER_ERROR, Json(payload)).into_response();
        }
    };

    let latest = match engine.store().latest(&id) {
        Ok(latest) => latest,
        Err(error) => {
            let payload = json!({ "error": error.to_string() });
            return (StatusCode::INTERNAL_SERVER_ERROR, Json(payload)).into_response();
        }
    };

    let payload = json!({ "student": profile, "latest_prediction": latest });
    (StatusCode::OK, Json(payload)).into_response()
}

pub(crate) async fn import_roster_handler<P, G, S>(
    State(engine): State<Arc<RiskEngine<P, G, S>>>,
    Json(payload): Json<RosterImportRequest>,
) -> Response
where
    P: ProfileSource + 'static,
    G: GenerativeScorer + 'static,
    S: PredictionStore + 'static,
{
    let reader = Cursor::new(payload.roster_csv.into_bytes());
    let profiles = match RosterImporter::from_reader(reader) {
        Ok(profiles) => profiles,
        Err(error) => {
            let payload = json!({ "error": error.to_string() });
            return (StatusCode::BAD_REQUEST, Json(payload)).into_response();
        }
    };

    let imported = profiles.len();
    for profile in profiles {
        if let Err(error) = engine.profiles().upsert(profile) {
            let payload = json!({ "error": error.to_string() });
            return (StatusCode::INTERNAL_SERVER_ERROR, Json(payload)).into_response();
        }
    }

    let payload = json!({ "imported": imported });
    (StatusCode::OK, Json(payload)).into_response()
}
