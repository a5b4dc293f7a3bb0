//! Application handlers.
//!
//! Every route here requires a bearer token. The submitter is the token subject.

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use serde::Serialize;
use serde_json::Value;

use formdesk_core::service::{validate_create_application, Application};

use super::json_payload;
use crate::{auth::AuthClaims, handlers::AppError, state::AppState};

/// Body of a successful application submission.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationCreated {
    pub application_id: String,
    pub name: String,
    pub phone_number: String,
}

/// Path of the form an application answers.
type FormPath = Path<(String, String, String)>;

/// Submit an application
/// (POST /api/company/{company_id}/service/{service_id}/form/{form_id}/applications).
///
/// The service and form are not looked up before writing.
pub async fn create_application(
    AuthClaims(claims): AuthClaims,
    State(state): State<AppState>,
    Path((company_id, service_id, form_id)): FormPath,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<(StatusCode, Json<ApplicationCreated>), AppError> {
    let payload = json_payload(payload)?;
    let request = validate_create_application(&payload)?;

    let application = request.into_application(
        state.ids.as_ref(),
        company_id,
        service_id,
        form_id,
        claims.sub,
        Utc::now(),
    );
    state
        .application_repo
        .create_application(&application)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApplicationCreated {
            application_id: application.id,
            name: application.name,
            phone_number: application.phone_number,
        }),
    ))
}

/// List applications received by a company (GET /api/company/{company_id}/applications).
pub async fn list_applications_by_company(
    AuthClaims(_claims): AuthClaims,
    State(state): State<AppState>,
    Path(company_id): Path<String>,
) -> Result<Json<Vec<Application>>, AppError> {
    let applications = state
        .application_repo
        .list_applications_by_company(&company_id)
        .await?;

    Ok(Json(applications))
}

/// List applications submitted to a service (GET /api/service/{service_id}/applications).
pub async fn list_applications_by_service(
    AuthClaims(_claims): AuthClaims,
    State(state): State<AppState>,
    Path(service_id): Path<String>,
) -> Result<Json<Vec<Application>>, AppError> {
    let applications = state
        .application_repo
        .list_applications_by_service(&service_id)
        .await?;

    Ok(Json(applications))
}

/// List the caller's own applications (GET /api/me/applications).
pub async fn list_my_applications(
    AuthClaims(claims): AuthClaims,
    State(state): State<AppState>,
) -> Result<Json<Vec<Application>>, AppError> {
    let applications = state
        .application_repo
        .list_applications_by_user(&claims.sub)
        .await?;

    Ok(Json(applications))
}
