//! # Mapping Errors
//!
//! This module defines the error type shared by every mapping operation.
//! Only a handful of situations are errors at all: unknown input keys are skipped
//! silently and unknown `_embedded` keys only produce a warning.

/// Errors that can occur while mapping between plain data and models.
#[derive(Debug, thiserror::Error)]
pub enum MappingError {
    /// A `serialize` exclude path did not resolve on the serialized object.
    #[error("Property {path} does not exist on {class}")]
    MissingProperty { path: String, class: &'static str },

    /// The routed raw value does not fit the Rust type of the target field.
    #[error("Property `{property}` of {class} could not be assigned: {source}")]
    Assign {
        class: &'static str,
        property: &'static str,
        #[source]
        source: serde_json::Error,
    },

    /// The routed value is an instance of a different type than the field holds.
    #[error("Property `{property}` of {class} expected {expected}")]
    TypeMismatch {
        class: &'static str,
        property: &'static str,
        expected: &'static str,
    },

    /// A native constructor rejected its input. Passed through untouched.
    #[error(transparent)]
    Construct(Box<dyn std::error::Error + Send + Sync>),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl MappingError {
    pub(crate) fn missing(path: &str, class: &'static str) -> Self {
        MappingError::MissingProperty {
            path: path.to_string(),
            class,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_property_names_path_and_class() {
        let err = MappingError::missing("position.z", "Point");
        assert_eq!(err.to_string(), "Property position.z does not exist on Point");
    }

    #[test]
    fn construct_error_is_transparent() {
        let inner: Box<dyn std::error::Error + Send + Sync> =
            "input contains invalid characters".into();
        let err = MappingError::Construct(inner);
        assert_eq!(err.to_string(), "input contains invalid characters");
    }
}
