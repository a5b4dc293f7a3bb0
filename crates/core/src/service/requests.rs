//! Validated request payloads.
//!
//! Values of these types only come out of the functions in `validation`, so
//! holding one means the inbound shape has already been checked.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::identity::{IdGenerator, APPLICATION_ID_PREFIX, FORM_ID_PREFIX, SERVICE_ID_PREFIX};
use super::types::{
    Application, ApplicationStatus, FieldCategory, FieldData, FieldDataType, FieldType, Form,
    FormField, Service,
};

/// A field definition as submitted when creating a form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewFormField {
    /// Generated when absent.
    pub field_id: Option<String>,
    pub field_title: String,
    pub field_description: String,
    pub field_category: FieldCategory,
    pub field_type: FieldType,
    pub field_data_type: FieldDataType,
    pub field_required: bool,
    pub field_number: i64,
}

impl NewFormField {
    fn into_field(self) -> FormField {
        FormField {
            field_id: self
                .field_id
                .unwrap_or_else(|| Uuid::new_v4().to_string()),
            field_title: self.field_title,
            field_description: self.field_description,
            field_category: self.field_category,
            field_type: self.field_type,
            field_data_type: self.field_data_type,
            field_required: self.field_required,
            field_number: self.field_number,
        }
    }
}

/// Request to create a service and its form in one step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateServiceWithFormRequest {
    pub company_id: String,
    pub name: String,
    pub description: String,
    /// Fields in submission order.
    pub fields: Vec<NewFormField>,
}

impl CreateServiceWithFormRequest {
    /// Builds the service and form records, drawing both ids from `ids`.
    ///
    /// Field order is kept as submitted.
    pub fn into_entities(self, ids: &dyn IdGenerator, now: DateTime<Utc>) -> (Service, Form) {
        let service = Service::new(
            ids.generate(SERVICE_ID_PREFIX),
            self.company_id,
            self.name,
            self.description,
            now,
        );
        let fields = self.fields.into_iter().map(NewFormField::into_field).collect();
        let form = Form::new(ids.generate(FORM_ID_PREFIX), service.id.clone(), fields, now);

        (service, form)
    }
}

/// Request to submit an application against a form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateApplicationRequest {
    pub name: String,
    pub phone_number: String,
    pub field_data: Vec<FieldData>,
}

impl CreateApplicationRequest {
    /// Builds the application record for the given submitter and form.
    pub fn into_application(
        self,
        ids: &dyn IdGenerator,
        company_id: impl Into<String>,
        service_id: impl Into<String>,
        form_id: impl Into<String>,
        user_id: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Application {
        Application {
            id: ids.generate(APPLICATION_ID_PREFIX),
            company_id: company_id.into(),
            service_id: service_id.into(),
            form_id: form_id.into(),
            user_id: user_id.into(),
            name: self.name,
            phone_number: self.phone_number,
            status: ApplicationStatus::Submitted,
            field_data: self.field_data,
            created_at: now,
            updated_at: now,
        }
    }
}
