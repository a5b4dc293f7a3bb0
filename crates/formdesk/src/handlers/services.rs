//! Service and form handlers.

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use serde::Serialize;
use serde_json::Value;

use formdesk_core::service::{validate_service_with_form, FormField, ServiceListing};
use formdesk_core::storage::RepositoryError;

use super::json_payload;
use crate::{auth::AuthClaims, handlers::AppError, state::AppState};

/// Body of a successful service creation.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceCreated {
    pub code: &'static str,
    pub message: &'static str,
    pub service_id: String,
    pub form_id: String,
}

/// Name and description of a service as shown above its form.
#[derive(Debug, Serialize)]
pub struct ServiceHeader {
    pub name: String,
    pub description: String,
}

/// A service with its form fields in rendering order.
#[derive(Debug, Serialize)]
pub struct ServiceFormResponse {
    pub service: ServiceHeader,
    pub form: Vec<FormField>,
}

// ============================================================================
// Create Service With Form
// ============================================================================

/// Create a service and its form atomically (POST /api/service/with-form).
pub async fn create_service_with_form(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<(StatusCode, Json<ServiceCreated>), AppError> {
    let payload = json_payload(payload)?;
    let request = validate_service_with_form(&payload)?;

    let (service, form) = request.into_entities(state.ids.as_ref(), Utc::now());
    state
        .service_repo
        .create_service_with_form(&service, &form)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ServiceCreated {
            code: "SUCCESS",
            message: "SUCCESS",
            service_id: service.id,
            form_id: form.id,
        }),
    ))
}

// ============================================================================
// List Services
// ============================================================================

/// List a company's services (GET /api/services/company/{company_id}).
pub async fn list_services_by_company(
    AuthClaims(claims): AuthClaims,
    State(state): State<AppState>,
    Path(company_id): Path<String>,
) -> Result<Json<ServiceListing>, AppError> {
    tracing::debug!(sub = %claims.sub, %company_id, "Listing services");
    let listing = state
        .service_repo
        .list_services_by_company(&company_id)
        .await?;

    Ok(Json(listing))
}

// ============================================================================
// Get Service With Form
// ============================================================================

/// Get a service and its sorted form fields
/// (GET /api/company/{company_id}/services/{service_id}/form).
pub async fn get_service_with_form(
    State(state): State<AppState>,
    Path((company_id, service_id)): Path<(String, String)>,
) -> Result<Json<ServiceFormResponse>, AppError> {
    let found = state
        .service_repo
        .get_service_with_form(&company_id, &service_id)
        .await?
        .ok_or_else(|| RepositoryError::NotFound {
            entity_type: "Service",
            id: service_id.clone(),
        })?;

    Ok(Json(ServiceFormResponse {
        service: ServiceHeader {
            name: found.service.name,
            description: found.service.description,
        },
        form: found.fields,
    }))
}
