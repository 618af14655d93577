//! Field-attributed validation errors.
//!
//! Services collect failures here before any write. A non-empty set aborts
//! the operation and surfaces to the client as per-field messages, keeping
//! validation failures clearly separated from authentication errors.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

/// Validation failures keyed by the offending field.
///
/// Field order is stable (BTreeMap) so responses and log lines are
/// deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a failure against a field.
    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.entry(field.into()).or_default().push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// `Ok(())` when nothing was recorded, otherwise `Err(self)`.
    pub fn into_result(self) -> Result<(), Self> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }

    /// Fields that have at least one recorded failure.
    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Messages recorded against a single field.
    pub fn messages(&self, field: &str) -> &[String] {
        self.0.get(field).map(Vec::as_slice).unwrap_or(&[])
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, messages) in &self.0 {
            if !first {
                write!(f, "; ")?;
            }
            first = false;
            write!(f, "{field}: {}", messages.join(", "))?;
        }
        Ok(())
    }
}

/// Flatten derive-produced `validator` errors into per-field messages.
///
/// The attribute message is used when present, falling back to the rule
/// code (e.g. `length`) so a failure is never silently empty.
impl From<validator::ValidationErrors> for FieldErrors {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut out = FieldErrors::new();
        for (field, field_errors) in errors.field_errors() {
            for error in field_errors {
                let message = error
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| error.code.to_string());
                out.add(field.to_string(), message);
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    #[test]
    fn accumulates_messages_per_field() {
        let mut errors = FieldErrors::new();
        errors.add("username", "already exists");
        errors.add("username", "too long");
        errors.add("password", "required");

        assert!(!errors.is_empty());
        assert_eq!(errors.messages("username").len(), 2);
        assert_eq!(errors.messages("password"), ["required".to_string()]);
        assert_eq!(errors.messages("missing"), Vec::<String>::new().as_slice());
    }

    #[test]
    fn into_result_is_ok_when_empty() {
        assert!(FieldErrors::new().into_result().is_ok());

        let mut errors = FieldErrors::new();
        errors.add("username", "already exists");
        assert!(errors.into_result().is_err());
    }

    #[test]
    fn display_joins_fields_deterministically() {
        let mut errors = FieldErrors::new();
        errors.add("b_field", "second");
        errors.add("a_field", "first");

        // BTreeMap ordering: a_field before b_field.
        assert_eq!(errors.to_string(), "a_field: first; b_field: second");
    }

    #[derive(Validate)]
    struct Form {
        #[validate(length(max = 8, message = "must be at most 8 characters"))]
        name: String,
    }

    #[test]
    fn converts_validator_errors() {
        let form = Form {
            name: "far-too-long-a-name".to_string(),
        };
        let errors: FieldErrors = form.validate().unwrap_err().into();

        assert_eq!(errors.fields().collect::<Vec<_>>(), ["name"]);
        assert_eq!(
            errors.messages("name"),
            ["must be at most 8 characters".to_string()]
        );
    }
}
