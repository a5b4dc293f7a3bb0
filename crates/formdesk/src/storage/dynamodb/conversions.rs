//! DynamoDB attribute conversion functions.
//!
//! Pure functions for converting between DynamoDB AttributeValue maps and domain types.
//! These are testable in isolation without DynamoDB access.

use std::collections::HashMap;
use std::str::FromStr;

use aws_sdk_dynamodb::types::AttributeValue;
use chrono::{DateTime, Utc};
use formdesk_core::service::{
    Application, Entity, EntityType, FieldData, FormField, Form, Service, ServiceSummary,
};
use formdesk_core::storage::{keys, EntityKeys, RepositoryError};

/// A raw DynamoDB item.
pub type Item = HashMap<String, AttributeValue>;

pub const ENTITY_TYPE: &str = "entityType";

// ============================================================================
// Entity dispatch
// ============================================================================

/// Convert a DynamoDB item to whichever entity its `entityType` names.
pub fn item_to_entity(item: &Item) -> Result<Entity, RepositoryError> {
    match get_entity_type(item)? {
        EntityType::Service => item_to_service(item).map(Entity::Service),
        EntityType::Form => item_to_form(item).map(Entity::Form),
        EntityType::Application => item_to_application(item).map(Entity::Application),
    }
}

// ============================================================================
// Service conversions
// ============================================================================

/// Convert a Service to DynamoDB item.
pub fn service_to_item(service: &Service) -> Item {
    let mut item = keyed_item(keys::service_keys(service), EntityType::Service);

    item.insert(
        "companyId".to_string(),
        AttributeValue::S(service.company_id.clone()),
    );
    item.insert("name".to_string(), AttributeValue::S(service.name.clone()));
    item.insert(
        "description".to_string(),
        AttributeValue::S(service.description.clone()),
    );
    insert_timestamps(&mut item, service.created_at, service.updated_at);

    item
}

/// Convert a DynamoDB item to Service.
pub fn item_to_service(item: &Item) -> Result<Service, RepositoryError> {
    Ok(Service {
        id: get_string(item, "PK")?,
        company_id: get_string(item, "companyId")?,
        name: get_string(item, "name")?,
        description: get_string(item, "description")?,
        created_at: get_datetime(item, "createdAt")?,
        updated_at: get_datetime(item, "updatedAt")?,
    })
}

/// Convert a projected listing item to ServiceSummary.
///
/// Expects only `PK`, `name`, `description` and `createdAt`.
pub fn item_to_service_summary(item: &Item) -> Result<ServiceSummary, RepositoryError> {
    Ok(ServiceSummary {
        id: get_string(item, "PK")?,
        name: get_string(item, "name")?,
        description: get_string(item, "description")?,
        created_at: get_datetime(item, "createdAt")?,
    })
}

// ============================================================================
// Form conversions
// ============================================================================

/// Convert a Form to DynamoDB item.
pub fn form_to_item(form: &Form) -> Item {
    let mut item = keyed_item(keys::form_keys(form), EntityType::Form);

    item.insert(
        "serviceId".to_string(),
        AttributeValue::S(form.service_id.clone()),
    );
    item.insert(
        "formSchema".to_string(),
        AttributeValue::L(
            form.fields
                .iter()
                .map(|field| AttributeValue::M(field_to_map(field)))
                .collect(),
        ),
    );
    insert_timestamps(&mut item, form.created_at, form.updated_at);

    item
}

/// Convert a DynamoDB item to Form.
pub fn item_to_form(item: &Item) -> Result<Form, RepositoryError> {
    let fields = get_list(item, "formSchema")?
        .iter()
        .enumerate()
        .map(|(index, value)| {
            let map = as_map(value, "formSchema", index)?;
            map_to_field(map)
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Form {
        id: get_string(item, "PK")?,
        service_id: get_string(item, "serviceId")?,
        fields,
        created_at: get_datetime(item, "createdAt")?,
        updated_at: get_datetime(item, "updatedAt")?,
    })
}

// ============================================================================
// Application conversions
// ============================================================================

/// Convert an Application to DynamoDB item.
pub fn application_to_item(application: &Application) -> Item {
    let mut item = keyed_item(keys::application_keys(application), EntityType::Application);

    for (name, value) in [
        ("companyId", &application.company_id),
        ("serviceId", &application.service_id),
        ("formId", &application.form_id),
        ("userId", &application.user_id),
        ("name", &application.name),
        ("phoneNumber", &application.phone_number),
    ] {
        item.insert(name.to_string(), AttributeValue::S(value.clone()));
    }
    item.insert(
        "status".to_string(),
        AttributeValue::S(application.status.as_str().to_string()),
    );
    item.insert(
        "fieldData".to_string(),
        AttributeValue::L(
            application
                .field_data
                .iter()
                .map(|data| {
                    let mut map = field_to_map(&data.field);
                    map.insert(
                        "fieldValue".to_string(),
                        AttributeValue::S(data.field_value.clone()),
                    );
                    AttributeValue::M(map)
                })
                .collect(),
        ),
    );
    insert_timestamps(&mut item, application.created_at, application.updated_at);

    item
}

/// Convert a DynamoDB item to Application.
pub fn item_to_application(item: &Item) -> Result<Application, RepositoryError> {
    let field_data = get_list(item, "fieldData")?
        .iter()
        .enumerate()
        .map(|(index, value)| {
            let map = as_map(value, "fieldData", index)?;
            Ok(FieldData {
                field: map_to_field(map)?,
                field_value: get_string(map, "fieldValue")?,
            })
        })
        .collect::<Result<Vec<_>, RepositoryError>>()?;

    Ok(Application {
        id: get_string(item, "PK")?,
        company_id: get_string(item, "companyId")?,
        service_id: get_string(item, "serviceId")?,
        form_id: get_string(item, "formId")?,
        user_id: get_string(item, "userId")?,
        name: get_string(item, "name")?,
        phone_number: get_string(item, "phoneNumber")?,
        status: get_parsed(item, "status")?,
        field_data,
        created_at: get_datetime(item, "createdAt")?,
        updated_at: get_datetime(item, "updatedAt")?,
    })
}

// ============================================================================
// Form field conversions
// ============================================================================

fn field_to_map(field: &FormField) -> Item {
    let mut map = HashMap::new();

    map.insert(
        "fieldId".to_string(),
        AttributeValue::S(field.field_id.clone()),
    );
    map.insert(
        "fieldTitle".to_string(),
        AttributeValue::S(field.field_title.clone()),
    );
    map.insert(
        "fieldDescription".to_string(),
        AttributeValue::S(field.field_description.clone()),
    );
    map.insert(
        "fieldCategory".to_string(),
        AttributeValue::S(field.field_category.as_str().to_string()),
    );
    map.insert(
        "fieldType".to_string(),
        AttributeValue::S(field.field_type.as_str().to_string()),
    );
    map.insert(
        "fieldDataType".to_string(),
        AttributeValue::S(field.field_data_type.as_str().to_string()),
    );
    map.insert(
        "fieldRequired".to_string(),
        AttributeValue::Bool(field.field_required),
    );
    map.insert(
        "fieldNumber".to_string(),
        AttributeValue::N(field.field_number.to_string()),
    );

    map
}

fn map_to_field(map: &Item) -> Result<FormField, RepositoryError> {
    Ok(FormField {
        field_id: get_string(map, "fieldId")?,
        field_title: get_string(map, "fieldTitle")?,
        field_description: get_string(map, "fieldDescription")?,
        field_category: get_parsed(map, "fieldCategory")?,
        field_type: get_parsed(map, "fieldType")?,
        field_data_type: get_parsed(map, "fieldDataType")?,
        field_required: get_bool(map, "fieldRequired")?,
        field_number: get_integer(map, "fieldNumber")?,
    })
}

/// Parse a DynamoDB number into an integer.
///
/// Integral decimals such as `"3.0"` or `"3e0"` are accepted.
pub fn parse_integer(raw: &str) -> Option<i64> {
    if let Ok(value) = raw.parse::<i64>() {
        return Some(value);
    }

    let value = raw.parse::<f64>().ok()?;
    let in_range = value >= i64::MIN as f64 && value < i64::MAX as f64;
    (value.is_finite() && value.fract() == 0.0 && in_range).then_some(value as i64)
}

// ============================================================================
// Helper functions
// ============================================================================

fn keyed_item(keys: EntityKeys, entity_type: EntityType) -> Item {
    let mut item = HashMap::new();

    item.insert("PK".to_string(), AttributeValue::S(keys.primary.pk));
    item.insert("SK".to_string(), AttributeValue::S(keys.primary.sk));
    for key in keys.indexes {
        item.insert(
            key.index.pk_attribute().to_string(),
            AttributeValue::S(key.pk),
        );
        item.insert(
            key.index.sk_attribute().to_string(),
            AttributeValue::S(key.sk),
        );
    }
    item.insert(
        ENTITY_TYPE.to_string(),
        AttributeValue::S(entity_type.as_str().to_string()),
    );

    item
}

fn insert_timestamps(item: &mut Item, created_at: DateTime<Utc>, updated_at: DateTime<Utc>) {
    item.insert(
        "createdAt".to_string(),
        AttributeValue::S(created_at.to_rfc3339()),
    );
    item.insert(
        "updatedAt".to_string(),
        AttributeValue::S(updated_at.to_rfc3339()),
    );
}

fn malformed(message: String) -> RepositoryError {
    RepositoryError::MalformedRecord(message)
}

fn get_entity_type(item: &Item) -> Result<EntityType, RepositoryError> {
    get_parsed(item, ENTITY_TYPE)
}

fn get_string(item: &Item, key: &str) -> Result<String, RepositoryError> {
    item.get(key)
        .and_then(|v| v.as_s().ok())
        .map(|s| s.to_string())
        .ok_or_else(|| malformed(format!("Missing or invalid field: {}", key)))
}

fn get_bool(item: &Item, key: &str) -> Result<bool, RepositoryError> {
    item.get(key)
        .and_then(|v| v.as_bool().ok())
        .copied()
        .ok_or_else(|| malformed(format!("Missing or invalid field: {}", key)))
}

fn get_integer(item: &Item, key: &str) -> Result<i64, RepositoryError> {
    let raw = item
        .get(key)
        .and_then(|v| v.as_n().ok())
        .ok_or_else(|| malformed(format!("Missing or invalid field: {}", key)))?;

    parse_integer(raw).ok_or_else(|| malformed(format!("Invalid integer {}: {}", key, raw)))
}

fn get_list<'a>(item: &'a Item, key: &str) -> Result<&'a [AttributeValue], RepositoryError> {
    item.get(key)
        .and_then(|v| v.as_l().ok())
        .map(Vec::as_slice)
        .ok_or_else(|| malformed(format!("Missing or invalid field: {}", key)))
}

fn as_map<'a>(
    value: &'a AttributeValue,
    key: &str,
    index: usize,
) -> Result<&'a Item, RepositoryError> {
    value
        .as_m()
        .map_err(|_| malformed(format!("Invalid element {}.{}: expected a map", key, index)))
}

fn get_parsed<T>(item: &Item, key: &str) -> Result<T, RepositoryError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    let raw = get_string(item, key)?;
    raw.parse()
        .map_err(|e| malformed(format!("Invalid {}: {}", key, e)))
}

fn get_datetime(item: &Item, key: &str) -> Result<DateTime<Utc>, RepositoryError> {
    let s = get_string(item, key)?;
    DateTime::parse_from_rfc3339(&s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| malformed(format!("Invalid datetime {}: {}", key, e)))
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use formdesk_core::service::{ApplicationStatus, FieldCategory, FieldDataType, FieldType};

    use super::*;

    fn timestamp() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 9, 30, 0).unwrap()
    }

    fn field(id: &str, field_number: i64) -> FormField {
        FormField {
            field_id: id.to_string(),
            field_title: format!("Title {id}"),
            field_description: String::new(),
            field_category: FieldCategory::Text,
            field_type: FieldType::Long,
            field_data_type: FieldDataType::Num,
            field_required: true,
            field_number,
        }
    }

    fn sample_form() -> Form {
        Form::new(
            "FRM1",
            "SVC1",
            vec![field("c", 3), field("a", 1), field("b", 2)],
            timestamp(),
        )
    }

    fn sample_application() -> Application {
        Application {
            id: "APP1".to_string(),
            company_id: "7".to_string(),
            service_id: "SVC1".to_string(),
            form_id: "FRM1".to_string(),
            user_id: "user-1".to_string(),
            name: "Kim".to_string(),
            phone_number: "01012345678".to_string(),
            status: ApplicationStatus::Submitted,
            field_data: vec![FieldData {
                field: field("age", 1),
                field_value: "not a number".to_string(),
            }],
            created_at: timestamp(),
            updated_at: timestamp(),
        }
    }

    #[test]
    fn test_service_to_item_keys() {
        let service = Service::new("SVC1", "7", "Pilates", "Group classes", timestamp());
        let item = service_to_item(&service);

        assert_eq!(item.get("PK").unwrap().as_s().unwrap(), "SVC1");
        assert_eq!(item.get("SK").unwrap().as_s().unwrap(), "METADATA");
        assert_eq!(item.get("GSI1PK").unwrap().as_s().unwrap(), "COMPANY#7");
        assert_eq!(item.get("GSI1SK").unwrap().as_s().unwrap(), "SERVICE#SVC1");
        assert_eq!(item.get("entityType").unwrap().as_s().unwrap(), "SERVICE");
        assert_eq!(item.get("companyId").unwrap().as_s().unwrap(), "7");
    }

    #[test]
    fn test_service_round_trip() {
        let service = Service::new("SVC1", "7", "Pilates", "Group classes", timestamp());

        let decoded = item_to_entity(&service_to_item(&service)).unwrap();

        assert_eq!(decoded, Entity::Service(service));
    }

    #[test]
    fn test_form_to_item_encodes_numbers_as_n() {
        let item = form_to_item(&sample_form());

        let schema = item.get("formSchema").unwrap().as_l().unwrap();
        let first = schema[0].as_m().unwrap();
        assert_eq!(first.get("fieldNumber").unwrap().as_n().unwrap(), "3");
        assert!(*first.get("fieldRequired").unwrap().as_bool().unwrap());
        assert_eq!(first.get("fieldType").unwrap().as_s().unwrap(), "LONG");
        assert_eq!(item.get("SK").unwrap().as_s().unwrap(), "SERVICE#SVC1");
        assert_eq!(item.get("GSI1SK").unwrap().as_s().unwrap(), "FORM#FRM1");
    }

    #[test]
    fn test_form_preserves_field_order() {
        let form = sample_form();

        let decoded = item_to_form(&form_to_item(&form)).unwrap();

        let ids: Vec<&str> = decoded.fields.iter().map(|f| f.field_id.as_str()).collect();
        assert_eq!(ids, vec!["c", "a", "b"]);
        assert_eq!(decoded, form);
    }

    #[test]
    fn test_field_number_with_decimal_point_normalizes() {
        let mut item = form_to_item(&sample_form());
        let mut schema = item.get("formSchema").unwrap().as_l().unwrap().clone();
        let mut first = schema[0].as_m().unwrap().clone();
        first.insert("fieldNumber".to_string(), AttributeValue::N("3.0".to_string()));
        schema[0] = AttributeValue::M(first);
        item.insert("formSchema".to_string(), AttributeValue::L(schema));

        let decoded = item_to_form(&item).unwrap();

        assert_eq!(decoded.fields[0].field_number, 3);
    }

    #[test]
    fn test_field_number_must_be_integral() {
        let mut item = form_to_item(&sample_form());
        let mut schema = item.get("formSchema").unwrap().as_l().unwrap().clone();
        let mut first = schema[0].as_m().unwrap().clone();
        first.insert("fieldNumber".to_string(), AttributeValue::N("2.5".to_string()));
        schema[0] = AttributeValue::M(first);
        item.insert("formSchema".to_string(), AttributeValue::L(schema));

        let err = item_to_form(&item).unwrap_err();

        assert!(err.is_malformed_record());
        assert!(err.to_string().contains("fieldNumber"));
    }

    #[test]
    fn test_parse_integer() {
        assert_eq!(parse_integer("3"), Some(3));
        assert_eq!(parse_integer("3.0"), Some(3));
        assert_eq!(parse_integer("-12.000"), Some(-12));
        assert_eq!(parse_integer("1e2"), Some(100));
        assert_eq!(parse_integer("2.5"), None);
        assert_eq!(parse_integer("NaN"), None);
        assert_eq!(parse_integer("abc"), None);
    }

    #[test]
    fn test_application_to_item_keys() {
        let item = application_to_item(&sample_application());

        assert_eq!(item.get("PK").unwrap().as_s().unwrap(), "APP1");
        assert_eq!(item.get("SK").unwrap().as_s().unwrap(), "STATUS#SUBMITTED");
        assert_eq!(item.get("GSI1PK").unwrap().as_s().unwrap(), "USER#user-1");
        assert_eq!(item.get("GSI2PK").unwrap().as_s().unwrap(), "COMPANY#7");
        assert_eq!(item.get("GSI3PK").unwrap().as_s().unwrap(), "SERVICE#SVC1");
        assert_eq!(
            item.get("GSI3SK").unwrap().as_s().unwrap(),
            "APPLICATION#APP1"
        );
        assert_eq!(item.get("status").unwrap().as_s().unwrap(), "SUBMITTED");
    }

    #[test]
    fn test_application_round_trip_keeps_field_values() {
        let application = sample_application();

        let decoded = item_to_application(&application_to_item(&application)).unwrap();

        assert_eq!(decoded.field_data[0].field_value, "not a number");
        assert_eq!(decoded, application);
    }

    #[test]
    fn test_missing_attribute_is_malformed() {
        let mut item = service_to_item(&Service::new("SVC1", "7", "A", "d", timestamp()));
        item.remove("name");

        let err = item_to_service(&item).unwrap_err();

        assert_eq!(
            err,
            RepositoryError::MalformedRecord("Missing or invalid field: name".to_string())
        );
    }

    #[test]
    fn test_mistyped_attribute_is_malformed() {
        let mut item = service_to_item(&Service::new("SVC1", "7", "A", "d", timestamp()));
        item.insert("createdAt".to_string(), AttributeValue::N("1".to_string()));

        assert!(item_to_service(&item).unwrap_err().is_malformed_record());
    }

    #[test]
    fn test_unknown_entity_type_is_malformed() {
        let mut item = form_to_item(&sample_form());
        item.insert(
            "entityType".to_string(),
            AttributeValue::S("INVOICE".to_string()),
        );

        assert!(item_to_entity(&item).unwrap_err().is_malformed_record());
    }

    #[test]
    fn test_closed_set_violation_is_malformed() {
        let mut item = form_to_item(&sample_form());
        let mut schema = item.get("formSchema").unwrap().as_l().unwrap().clone();
        let mut first = schema[0].as_m().unwrap().clone();
        first.insert(
            "fieldCategory".to_string(),
            AttributeValue::S("CHOICE".to_string()),
        );
        schema[0] = AttributeValue::M(first);
        item.insert("formSchema".to_string(), AttributeValue::L(schema));

        assert!(item_to_form(&item).unwrap_err().is_malformed_record());
    }

    #[test]
    fn test_item_to_service_summary_from_projection() {
        let mut item = HashMap::new();
        item.insert("PK".to_string(), AttributeValue::S("SVC1".to_string()));
        item.insert("name".to_string(), AttributeValue::S("Pilates".to_string()));
        item.insert(
            "description".to_string(),
            AttributeValue::S("Group".to_string()),
        );
        item.insert(
            "createdAt".to_string(),
            AttributeValue::S(timestamp().to_rfc3339()),
        );

        let summary = item_to_service_summary(&item).unwrap();

        assert_eq!(summary.id, "SVC1");
        assert_eq!(summary.created_at, timestamp());
    }
}
