//! Single-table key scheme.
//!
//! Pure functions for generating partition and sort keys, for the primary key
//! and for the secondary indexes. One physical table answers:
//!
//! | Access pattern                   | Key                                         |
//! |----------------------------------|---------------------------------------------|
//! | Service by id                    | `PK = <serviceId>`, `SK = METADATA`         |
//! | Services of a company            | `GSI1PK = COMPANY#<companyId>`              |
//! | Form of a service                | `GSI1PK = SERVICE#<serviceId>`              |
//! | Applications of a user           | `GSI1PK = USER#<userId>`                    |
//! | Applications of a company        | `GSI2PK = COMPANY#<companyId>`              |
//! | Applications of a service        | `GSI3PK = SERVICE#<serviceId>`              |

use crate::service::{Application, ApplicationStatus, Entity, Form, Service};

// ============================================================================
// Key prefixes
// ============================================================================

pub const COMPANY_PREFIX: &str = "COMPANY#";
pub const SERVICE_PREFIX: &str = "SERVICE#";
pub const FORM_PREFIX: &str = "FORM#";
pub const USER_PREFIX: &str = "USER#";
pub const APPLICATION_PREFIX: &str = "APPLICATION#";
pub const STATUS_PREFIX: &str = "STATUS#";

/// Sort key of every service item.
pub const SERVICE_METADATA_SK: &str = "METADATA";

// ============================================================================
// Key types
// ============================================================================

/// Primary key of an item.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TableKey {
    pub pk: String,
    pub sk: String,
}

impl TableKey {
    fn new(pk: impl Into<String>, sk: impl Into<String>) -> Self {
        Self {
            pk: pk.into(),
            sk: sk.into(),
        }
    }
}

/// The global secondary indexes of the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SecondaryIndex {
    Gsi1,
    Gsi2,
    Gsi3,
}

impl SecondaryIndex {
    pub const ALL: [SecondaryIndex; 3] = [Self::Gsi1, Self::Gsi2, Self::Gsi3];

    /// Index name as provisioned.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Gsi1 => "GSI1",
            Self::Gsi2 => "GSI2",
            Self::Gsi3 => "GSI3",
        }
    }

    /// Attribute holding the index partition key.
    pub fn pk_attribute(&self) -> &'static str {
        match self {
            Self::Gsi1 => "GSI1PK",
            Self::Gsi2 => "GSI2PK",
            Self::Gsi3 => "GSI3PK",
        }
    }

    /// Attribute holding the index sort key.
    pub fn sk_attribute(&self) -> &'static str {
        match self {
            Self::Gsi1 => "GSI1SK",
            Self::Gsi2 => "GSI2SK",
            Self::Gsi3 => "GSI3SK",
        }
    }
}

/// An item's key within one secondary index.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct IndexKey {
    pub index: SecondaryIndex,
    pub pk: String,
    pub sk: String,
}

/// Every key an item is reachable by.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityKeys {
    pub primary: TableKey,
    pub indexes: Vec<IndexKey>,
}

impl EntityKeys {
    /// Returns the item's key in `index`, if it is projected there.
    pub fn index(&self, index: SecondaryIndex) -> Option<&IndexKey> {
        self.indexes.iter().find(|key| key.index == index)
    }
}

// ============================================================================
// Primary keys
// ============================================================================

/// Primary key of a Service.
///
/// Pattern: `<service_id>` / `METADATA`
pub fn service_key(service_id: &str) -> TableKey {
    TableKey::new(service_id, SERVICE_METADATA_SK)
}

/// Primary key of a Form.
///
/// Pattern: `<form_id>` / `SERVICE#<service_id>`
pub fn form_key(form_id: &str, service_id: &str) -> TableKey {
    TableKey::new(form_id, format!("{SERVICE_PREFIX}{service_id}"))
}

/// Primary key of an Application.
///
/// Pattern: `<application_id>` / `STATUS#<status>`
pub fn application_key(application_id: &str, status: ApplicationStatus) -> TableKey {
    TableKey::new(application_id, format!("{STATUS_PREFIX}{}", status.as_str()))
}

// ============================================================================
// Secondary index keys
// ============================================================================

/// Key in `index` placing a child under its parent's partition.
///
/// Pattern: `<parent_prefix><parent_id>` / `<child_prefix><child_id>`
pub fn secondary_index_key(
    index: SecondaryIndex,
    parent_prefix: &str,
    parent_id: &str,
    child_prefix: &str,
    child_id: &str,
) -> IndexKey {
    IndexKey {
        index,
        pk: format!("{parent_prefix}{parent_id}"),
        sk: format!("{child_prefix}{child_id}"),
    }
}

/// GSI1 partition listing a company's services.
///
/// Pattern: `COMPANY#<company_id>`
pub fn company_services_pk(company_id: &str) -> String {
    format!("{COMPANY_PREFIX}{company_id}")
}

/// GSI1 partition holding a service's forms.
///
/// Pattern: `SERVICE#<service_id>`
pub fn service_forms_pk(service_id: &str) -> String {
    format!("{SERVICE_PREFIX}{service_id}")
}

/// GSI1 partition listing a user's applications.
///
/// Pattern: `USER#<user_id>`
pub fn user_applications_pk(user_id: &str) -> String {
    format!("{USER_PREFIX}{user_id}")
}

/// GSI2 partition listing a company's applications.
///
/// Pattern: `COMPANY#<company_id>`
pub fn company_applications_pk(company_id: &str) -> String {
    format!("{COMPANY_PREFIX}{company_id}")
}

/// GSI3 partition listing a service's applications.
///
/// Pattern: `SERVICE#<service_id>`
pub fn service_applications_pk(service_id: &str) -> String {
    format!("{SERVICE_PREFIX}{service_id}")
}

// ============================================================================
// Per-entity key sets
// ============================================================================

pub fn service_keys(service: &Service) -> EntityKeys {
    EntityKeys {
        primary: service_key(&service.id),
        indexes: vec![secondary_index_key(
            SecondaryIndex::Gsi1,
            COMPANY_PREFIX,
            &service.company_id,
            SERVICE_PREFIX,
            &service.id,
        )],
    }
}

pub fn form_keys(form: &Form) -> EntityKeys {
    EntityKeys {
        primary: form_key(&form.id, &form.service_id),
        indexes: vec![secondary_index_key(
            SecondaryIndex::Gsi1,
            SERVICE_PREFIX,
            &form.service_id,
            FORM_PREFIX,
            &form.id,
        )],
    }
}

pub fn application_keys(application: &Application) -> EntityKeys {
    let id = application.id.as_str();
    EntityKeys {
        primary: application_key(id, application.status),
        indexes: vec![
            secondary_index_key(
                SecondaryIndex::Gsi1,
                USER_PREFIX,
                &application.user_id,
                APPLICATION_PREFIX,
                id,
            ),
            secondary_index_key(
                SecondaryIndex::Gsi2,
                COMPANY_PREFIX,
                &application.company_id,
                APPLICATION_PREFIX,
                id,
            ),
            secondary_index_key(
                SecondaryIndex::Gsi3,
                SERVICE_PREFIX,
                &application.service_id,
                APPLICATION_PREFIX,
                id,
            ),
        ],
    }
}

/// Every key for any entity.
pub fn entity_keys(entity: &Entity) -> EntityKeys {
    match entity {
        Entity::Service(service) => service_keys(service),
        Entity::Form(form) => form_keys(form),
        Entity::Application(application) => application_keys(application),
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    fn sample_application() -> Application {
        let now = Utc::now();
        Application {
            id: "APP1".to_string(),
            company_id: "7".to_string(),
            service_id: "SVC1".to_string(),
            form_id: "FRM1".to_string(),
            user_id: "u-1".to_string(),
            name: "Kim".to_string(),
            phone_number: "010".to_string(),
            status: ApplicationStatus::Submitted,
            field_data: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_service_key() {
        assert_eq!(service_key("SVC1"), TableKey::new("SVC1", "METADATA"));
    }

    #[test]
    fn test_form_key() {
        assert_eq!(form_key("FRM1", "SVC1"), TableKey::new("FRM1", "SERVICE#SVC1"));
    }

    #[test]
    fn test_application_key() {
        assert_eq!(
            application_key("APP1", ApplicationStatus::Submitted),
            TableKey::new("APP1", "STATUS#SUBMITTED")
        );
    }

    #[test]
    fn test_secondary_index_key() {
        let key = secondary_index_key(
            SecondaryIndex::Gsi1,
            COMPANY_PREFIX,
            "7",
            SERVICE_PREFIX,
            "SVC1",
        );
        assert_eq!(key.pk, "COMPANY#7");
        assert_eq!(key.sk, "SERVICE#SVC1");
        assert_eq!(key.index.name(), "GSI1");
    }

    #[test]
    fn test_service_keys() {
        let service = Service::new("SVC1", "7", "A", "d", Utc::now());
        let keys = service_keys(&service);

        assert_eq!(keys.primary, service_key("SVC1"));
        let gsi1 = keys.index(SecondaryIndex::Gsi1).unwrap();
        assert_eq!(gsi1.pk, company_services_pk("7"));
        assert_eq!(gsi1.sk, "SERVICE#SVC1");
        assert!(keys.index(SecondaryIndex::Gsi2).is_none());
    }

    #[test]
    fn test_form_keys() {
        let form = Form::new("FRM1", "SVC1", Vec::new(), Utc::now());
        let keys = form_keys(&form);

        assert_eq!(keys.primary.sk, "SERVICE#SVC1");
        let gsi1 = keys.index(SecondaryIndex::Gsi1).unwrap();
        assert_eq!(gsi1.pk, service_forms_pk("SVC1"));
        assert_eq!(gsi1.sk, "FORM#FRM1");
    }

    #[test]
    fn test_application_keys_cover_three_indexes() {
        let keys = application_keys(&sample_application());

        assert_eq!(keys.indexes.len(), 3);
        assert_eq!(keys.index(SecondaryIndex::Gsi1).unwrap().pk, "USER#u-1");
        assert_eq!(keys.index(SecondaryIndex::Gsi2).unwrap().pk, "COMPANY#7");
        assert_eq!(keys.index(SecondaryIndex::Gsi3).unwrap().pk, "SERVICE#SVC1");
        for key in &keys.indexes {
            assert_eq!(key.sk, "APPLICATION#APP1");
        }
    }

    #[test]
    fn test_index_attribute_names() {
        assert_eq!(SecondaryIndex::Gsi2.pk_attribute(), "GSI2PK");
        assert_eq!(SecondaryIndex::Gsi3.sk_attribute(), "GSI3SK");
    }
}
