mod error;
mod identity;
mod requests;
mod sorting;
mod types;
mod validation;

pub use error::ValidationError;
pub use identity::{
    IdGenerator, SequentialIdGenerator, TimestampIdGenerator, APPLICATION_ID_PREFIX,
    FORM_ID_PREFIX, SERVICE_ID_PREFIX,
};
pub use requests::{CreateApplicationRequest, CreateServiceWithFormRequest, NewFormField};
pub use sorting::{sort_fields_by_number, sorted_fields};
pub use types::{
    Application, ApplicationStatus, Entity, EntityType, FieldCategory, FieldData, FieldDataType,
    FieldType, Form, FormField, Service, ServiceListing, ServiceSummary, ServiceWithForm,
    UnknownVariant,
};
pub use validation::{validate_create_application, validate_service_with_form};
