use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Returned when a string does not name a member of one of the closed sets.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("Unknown {kind}: {value}")]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}

impl UnknownVariant {
    fn new(kind: &'static str, value: &str) -> Self {
        Self {
            kind,
            value: value.to_string(),
        }
    }
}

/// Implements `as_str`, `Display` and `FromStr` over the wire names of a closed enum.
macro_rules! closed_set {
    ($name:ident, $kind:literal, { $($variant:ident => $wire:literal),+ $(,)? }) => {
        impl $name {
            /// Every member of the set, in declaration order.
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// Returns the wire name of this member.
            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $wire),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = UnknownVariant;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($wire => Ok($name::$variant),)+
                    other => Err(UnknownVariant::new($kind, other)),
                }
            }
        }
    };
}

/// The kind of answer a field collects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum FieldCategory {
    /// Free-form answer.
    Text,
}

closed_set!(FieldCategory, "field category", { Text => "TEXT" });

/// Display size of a field's input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum FieldType {
    Short,
    Long,
}

closed_set!(FieldType, "field type", { Short => "SHORT", Long => "LONG" });

/// Accepted characters for a field's value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum FieldDataType {
    /// Digits only.
    Num,
    Text,
}

closed_set!(FieldDataType, "field data type", { Num => "NUM", Text => "TEXT" });

/// Discriminates the kinds of records stored in the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum EntityType {
    Service,
    Form,
    Application,
}

closed_set!(EntityType, "entity type", {
    Service => "SERVICE",
    Form => "FORM",
    Application => "APPLICATION",
});

/// Processing state of a submitted application.
///
/// Only `Submitted` exists today; the state is encoded in the sort key so new
/// states can be added without touching the partition layout.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ApplicationStatus {
    #[default]
    Submitted,
}

closed_set!(ApplicationStatus, "application status", { Submitted => "SUBMITTED" });

/// A service offered by a company. Always created together with its form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Service {
    pub id: String,
    pub company_id: String,
    pub name: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Service {
    /// Creates a service whose `updated_at` equals its `created_at`.
    pub fn new(
        id: impl Into<String>,
        company_id: impl Into<String>,
        name: impl Into<String>,
        description: impl Into<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: id.into(),
            company_id: company_id.into(),
            name: name.into(),
            description: description.into(),
            created_at,
            updated_at: created_at,
        }
    }
}

/// A single question on a form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormField {
    pub field_id: String,
    pub field_title: String,
    pub field_description: String,
    pub field_category: FieldCategory,
    pub field_type: FieldType,
    pub field_data_type: FieldDataType,
    pub field_required: bool,
    /// Display and validation order. Compared numerically.
    pub field_number: i64,
}

/// The ordered set of fields belonging to a service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Form {
    pub id: String,
    pub service_id: String,
    /// Fields in insertion order. Use `sorted_fields` for rendering order.
    #[serde(rename = "formSchema")]
    pub fields: Vec<FormField>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Form {
    /// Creates a form whose `updated_at` equals its `created_at`.
    pub fn new(
        id: impl Into<String>,
        service_id: impl Into<String>,
        fields: Vec<FormField>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: id.into(),
            service_id: service_id.into(),
            fields,
            created_at,
            updated_at: created_at,
        }
    }
}

/// A submitted answer, echoing the field it answers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldData {
    #[serde(flatten)]
    pub field: FormField,
    pub field_value: String,
}

/// An end user's submission against a service's form.
///
/// Immutable once stored. `field_data` is a snapshot taken at submission time
/// and is not checked against the live form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Application {
    pub id: String,
    pub company_id: String,
    pub service_id: String,
    pub form_id: String,
    pub user_id: String,
    pub name: String,
    pub phone_number: String,
    pub status: ApplicationStatus,
    pub field_data: Vec<FieldData>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// The list-view projection of a service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceSummary {
    #[serde(rename = "PK")]
    pub id: String,
    pub name: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
}

impl From<&Service> for ServiceSummary {
    fn from(service: &Service) -> Self {
        Self {
            id: service.id.clone(),
            name: service.name.clone(),
            description: service.description.clone(),
            created_at: service.created_at,
        }
    }
}

/// Services of one company together with the number returned.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceListing {
    pub total: usize,
    pub services: Vec<ServiceSummary>,
}

impl ServiceListing {
    pub fn new(services: Vec<ServiceSummary>) -> Self {
        Self {
            total: services.len(),
            services,
        }
    }
}

/// A service with its form fields in rendering order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceWithForm {
    pub service: Service,
    /// `None` when the form has not been found for this service.
    pub form_id: Option<String>,
    pub fields: Vec<FormField>,
}

/// Every kind of record stored in the table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Entity {
    Service(Service),
    Form(Form),
    Application(Application),
}

impl Entity {
    /// Returns the tag identifying this entity.
    pub fn entity_type(&self) -> EntityType {
        match self {
            Entity::Service(_) => EntityType::Service,
            Entity::Form(_) => EntityType::Form,
            Entity::Application(_) => EntityType::Application,
        }
    }
}
