use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

/// Field name to message. Every violated field is reported, not just the first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, String>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn single(field: impl Into<String>, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.insert(field, message);
        errors
    }

    pub fn insert(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.insert(field.into(), message.into());
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, message) in &self.0 {
            if !first {
                f.write_str("; ")?;
            }
            write!(f, "{}: {}", field, message)?;
            first = false;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// Seat coordinates outside the airplane's grid.
    #[error("Seat out of range: {0}")]
    OutOfRange(FieldErrors),

    /// Any other rejected input (empty names, inverted schedule, ...).
    #[error("Invalid input: {0}")]
    Invalid(FieldErrors),
}

impl ValidationError {
    pub fn fields(&self) -> &FieldErrors {
        match self {
            ValidationError::OutOfRange(fields) | ValidationError::Invalid(fields) => fields,
        }
    }

    pub(crate) fn check_invalid(errors: FieldErrors) -> Result<(), ValidationError> {
        if errors.is_empty() {
            Ok(())
        } else {
            Err(ValidationError::Invalid(errors))
        }
    }
}
