use std::collections::BTreeMap;

use thiserror::Error;

/// Rejected inbound payload.
///
/// Maps a field path (`service.name`, `form.0.fieldCategory`) to a
/// description of what is wrong with it.
#[derive(Debug, Error, Clone, Default, PartialEq, Eq)]
#[error("Invalid payload: {}", summarize(.errors))]
pub struct ValidationError {
    pub errors: BTreeMap<String, String>,
}

impl ValidationError {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a violation. The first violation for a path wins.
    pub fn add(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.errors.entry(path.into()).or_insert_with(|| message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Returns the violation recorded for `path`, if any.
    pub fn get(&self, path: &str) -> Option<&str> {
        self.errors.get(path).map(String::as_str)
    }

    /// Returns `Ok(value)` when nothing was recorded.
    pub fn into_result<T>(self, value: T) -> Result<T, ValidationError> {
        if self.is_empty() {
            Ok(value)
        } else {
            Err(self)
        }
    }
}

fn summarize(errors: &BTreeMap<String, String>) -> String {
    errors
        .iter()
        .map(|(path, message)| format!("{path}: {message}"))
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_display() {
        let mut error = ValidationError::new();
        error.add("service.name", "Missing data for required field.");
        error.add("companyId", "Missing data for required field.");

        assert_eq!(
            error.to_string(),
            "Invalid payload: companyId: Missing data for required field.; \
             service.name: Missing data for required field."
        );
    }

    #[test]
    fn test_first_violation_wins() {
        let mut error = ValidationError::new();
        error.add("name", "first");
        error.add("name", "second");

        assert_eq!(error.get("name"), Some("first"));
    }

    #[test]
    fn test_into_result() {
        assert_eq!(ValidationError::new().into_result(1), Ok(1));

        let mut error = ValidationError::new();
        error.add("name", "bad");
        assert!(error.into_result(1).is_err());
    }
}
