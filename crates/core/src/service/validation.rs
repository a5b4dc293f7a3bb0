//! Structural validation of inbound JSON payloads.
//!
//! Every violation is collected under its field path before returning, so a
//! client sees all problems with a payload at once. Successful validation
//! yields the typed request; nothing reaches storage otherwise.

use std::str::FromStr;

use serde_json::{Map, Value};

use super::error::ValidationError;
use super::requests::{CreateApplicationRequest, CreateServiceWithFormRequest, NewFormField};
use super::types::{FieldCategory, FieldData, FieldDataType, FieldType, FormField};

const MISSING: &str = "Missing data for required field.";
const NOT_OBJECT: &str = "Invalid input type.";
const NOT_STRING: &str = "Not a valid string.";
const NOT_BOOLEAN: &str = "Not a valid boolean.";
const NOT_INTEGER: &str = "Not a valid integer.";
const NOT_LIST: &str = "Not a valid list.";

/// Validates `{companyId, service: {name, description}, form: [field, ...]}`.
///
/// `companyId` may be a string or an integer. Each form field requires
/// `fieldTitle`, `fieldDescription`, `fieldCategory`, `fieldType`,
/// `fieldDataType`, `fieldRequired` and `fieldNumber`; `fieldId` is optional.
pub fn validate_service_with_form(
    payload: &Value,
) -> Result<CreateServiceWithFormRequest, ValidationError> {
    let mut errors = ValidationError::new();
    let Some(root) = as_object(payload, "_schema", &mut errors) else {
        return Err(errors);
    };

    let company_id = company_id(root, &mut errors);

    let service = required(root, "", "service", &mut errors)
        .and_then(|value| as_object(value, "service", &mut errors));
    let (name, description) = match service {
        Some(service) => (
            required_string(service, "service", "name", &mut errors),
            required_string(service, "service", "description", &mut errors),
        ),
        None => (None, None),
    };

    let fields = required_list(root, "", "form", &mut errors).map(|items| {
        items
            .iter()
            .enumerate()
            .filter_map(|(index, item)| new_form_field(item, &format!("form.{index}"), &mut errors))
            .collect::<Vec<_>>()
    });

    match (company_id, name, description, fields) {
        (Some(company_id), Some(name), Some(description), Some(fields)) => errors.into_result(
            CreateServiceWithFormRequest {
                company_id,
                name,
                description,
                fields,
            },
        ),
        _ => Err(errors),
    }
}

/// Validates `{name, phoneNumber, fieldData: [field data, ...]}`.
///
/// Each entry in `fieldData` requires all eight field attributes plus
/// `fieldValue`. The value is not checked against `fieldDataType`.
pub fn validate_create_application(
    payload: &Value,
) -> Result<CreateApplicationRequest, ValidationError> {
    let mut errors = ValidationError::new();
    let Some(root) = as_object(payload, "_schema", &mut errors) else {
        return Err(errors);
    };

    let name = required_string(root, "", "name", &mut errors);
    let phone_number = required_string(root, "", "phoneNumber", &mut errors);
    let field_data = required_list(root, "", "fieldData", &mut errors).map(|items| {
        items
            .iter()
            .enumerate()
            .filter_map(|(index, item)| {
                field_data(item, &format!("fieldData.{index}"), &mut errors)
            })
            .collect::<Vec<_>>()
    });

    match (name, phone_number, field_data) {
        (Some(name), Some(phone_number), Some(field_data)) => {
            errors.into_result(CreateApplicationRequest {
                name,
                phone_number,
                field_data,
            })
        }
        _ => Err(errors),
    }
}

fn new_form_field(value: &Value, path: &str, errors: &mut ValidationError) -> Option<NewFormField> {
    let object = as_object(value, path, errors)?;

    let field_id = match object.get("fieldId") {
        None | Some(Value::Null) => Some(None),
        Some(Value::String(id)) => Some(Some(id.clone())),
        Some(_) => {
            errors.add(join(path, "fieldId"), NOT_STRING);
            None
        }
    };
    let field_title = required_string(object, path, "fieldTitle", errors);
    let field_description = required_string(object, path, "fieldDescription", errors);
    let field_category =
        one_of::<FieldCategory>(object, path, "fieldCategory", FieldCategory::ALL, errors);
    let field_type = one_of::<FieldType>(object, path, "fieldType", FieldType::ALL, errors);
    let field_data_type =
        one_of::<FieldDataType>(object, path, "fieldDataType", FieldDataType::ALL, errors);
    let field_required = required_bool(object, path, "fieldRequired", errors);
    let field_number = required_integer(object, path, "fieldNumber", errors);

    Some(NewFormField {
        field_id: field_id?,
        field_title: field_title?,
        field_description: field_description?,
        field_category: field_category?,
        field_type: field_type?,
        field_data_type: field_data_type?,
        field_required: field_required?,
        field_number: field_number?,
    })
}

fn field_data(value: &Value, path: &str, errors: &mut ValidationError) -> Option<FieldData> {
    let object = as_object(value, path, errors)?;

    let field_id = required_string(object, path, "fieldId", errors);
    let field_title = required_string(object, path, "fieldTitle", errors);
    let field_description = required_string(object, path, "fieldDescription", errors);
    let field_category =
        one_of::<FieldCategory>(object, path, "fieldCategory", FieldCategory::ALL, errors);
    let field_type = one_of::<FieldType>(object, path, "fieldType", FieldType::ALL, errors);
    let field_data_type =
        one_of::<FieldDataType>(object, path, "fieldDataType", FieldDataType::ALL, errors);
    let field_required = required_bool(object, path, "fieldRequired", errors);
    let field_number = required_integer(object, path, "fieldNumber", errors);
    let field_value = required_string(object, path, "fieldValue", errors);

    Some(FieldData {
        field: FormField {
            field_id: field_id?,
            field_title: field_title?,
            field_description: field_description?,
            field_category: field_category?,
            field_type: field_type?,
            field_data_type: field_data_type?,
            field_required: field_required?,
            field_number: field_number?,
        },
        field_value: field_value?,
    })
}

fn company_id(root: &Map<String, Value>, errors: &mut ValidationError) -> Option<String> {
    match root.get("companyId") {
        None | Some(Value::Null) => {
            errors.add("companyId", MISSING);
            None
        }
        Some(Value::String(id)) => Some(id.clone()),
        Some(Value::Number(n)) if n.is_i64() || n.is_u64() => Some(n.to_string()),
        Some(_) => {
            errors.add("companyId", NOT_STRING);
            None
        }
    }
}

fn join(prefix: &str, key: &str) -> String {
    if prefix.is_empty() {
        key.to_string()
    } else {
        format!("{prefix}.{key}")
    }
}

fn as_object<'a>(
    value: &'a Value,
    path: &str,
    errors: &mut ValidationError,
) -> Option<&'a Map<String, Value>> {
    match value {
        Value::Object(object) => Some(object),
        _ => {
            errors.add(path, NOT_OBJECT);
            None
        }
    }
}

/// Returns the value at `key`, recording a violation when it is absent or null.
fn required<'a>(
    object: &'a Map<String, Value>,
    prefix: &str,
    key: &str,
    errors: &mut ValidationError,
) -> Option<&'a Value> {
    match object.get(key) {
        None | Some(Value::Null) => {
            errors.add(join(prefix, key), MISSING);
            None
        }
        Some(value) => Some(value),
    }
}

fn required_string(
    object: &Map<String, Value>,
    prefix: &str,
    key: &str,
    errors: &mut ValidationError,
) -> Option<String> {
    match required(object, prefix, key, errors)? {
        Value::String(s) => Some(s.clone()),
        _ => {
            errors.add(join(prefix, key), NOT_STRING);
            None
        }
    }
}

fn required_bool(
    object: &Map<String, Value>,
    prefix: &str,
    key: &str,
    errors: &mut ValidationError,
) -> Option<bool> {
    match required(object, prefix, key, errors)? {
        Value::Bool(b) => Some(*b),
        _ => {
            errors.add(join(prefix, key), NOT_BOOLEAN);
            None
        }
    }
}

/// Accepts JSON integers and integral floats (`3.0`).
fn required_integer(
    object: &Map<String, Value>,
    prefix: &str,
    key: &str,
    errors: &mut ValidationError,
) -> Option<i64> {
    let parsed = match required(object, prefix, key, errors)? {
        Value::Number(n) => n.as_i64().or_else(|| {
            n.as_f64()
                .filter(|f| f.is_finite() && f.fract() == 0.0 && f.abs() < i64::MAX as f64)
                .map(|f| f as i64)
        }),
        _ => None,
    };

    if parsed.is_none() {
        errors.add(join(prefix, key), NOT_INTEGER);
    }
    parsed
}

fn required_list<'a>(
    object: &'a Map<String, Value>,
    prefix: &str,
    key: &str,
    errors: &mut ValidationError,
) -> Option<&'a Vec<Value>> {
    match required(object, prefix, key, errors)? {
        Value::Array(items) => Some(items),
        _ => {
            errors.add(join(prefix, key), NOT_LIST);
            None
        }
    }
}

fn one_of<T>(
    object: &Map<String, Value>,
    prefix: &str,
    key: &str,
    allowed: &[T],
    errors: &mut ValidationError,
) -> Option<T>
where
    T: FromStr + std::fmt::Display,
{
    let raw = required_string(object, prefix, key, errors)?;
    match raw.parse::<T>() {
        Ok(value) => Some(value),
        Err(_) => {
            let choices = allowed
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(", ");
            errors.add(join(prefix, key), format!("Must be one of: {choices}."));
            None
        }
    }
}
