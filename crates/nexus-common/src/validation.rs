//! Snapshot validation utilities.

use validator::{Validate, ValidationErrors, ValidationErrorsKind};

use crate::error::NexusError;

/// Validate a decoded document, returning a NexusError::MalformedSnapshot on failure.
pub fn validate_document<T: Validate>(doc: &T) -> Result<(), NexusError> {
    doc.validate().map_err(|e| NexusError::MalformedSnapshot {
        message: format_validation_errors(&e, ""),
    })
}

/// Flatten nested validation errors into `path: message` pairs.
fn format_validation_errors(errors: &ValidationErrors, prefix: &str) -> String {
    errors
        .errors()
        .iter()
        .map(|(field, kind)| {
            // Struct-level errors are filed under `__all__` and carry their own path.
            let path = match (prefix.is_empty(), *field == "__all__") {
                (_, true) => prefix.to_string(),
                (true, false) => field.to_string(),
                (false, false) => format!("{prefix}.{field}"),
            };
            match kind {
                ValidationErrorsKind::Field(errs) => errs
                    .iter()
                    .map(|e| {
                        let msg = e
                            .message
                            .as_ref()
                            .map(|m| m.to_string())
                            .unwrap_or_else(|| format!("invalid value ({})", e.code));
                        if path.is_empty() {
                            msg
                        } else {
                            format!("{path}: {msg}")
                        }
                    })
                    .collect::<Vec<_>>()
                    .join("; "),
                ValidationErrorsKind::Struct(inner) => format_validation_errors(inner, &path),
                ValidationErrorsKind::List(items) => items
                    .iter()
                    .map(|(idx, inner)| format_validation_errors(inner, &format!("{path}[{idx}]")))
                    .collect::<Vec<_>>()
                    .join("; "),
            }
        })
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Category, Role, Snapshot};
    use chrono::Utc;
    use uuid::Uuid;

    fn role(name: &str) -> Role {
        Role {
            source_id: Some(Uuid::new_v4()),
            name: name.into(),
            permissions: 0,
            color: 0,
            hoist: false,
            mentionable: false,
            position: 1,
        }
    }

    fn category(source_id: Uuid, name: &str) -> Category {
        Category {
            source_id,
            name: name.into(),
            position: 0,
            overwrites: vec![],
        }
    }

    #[test]
    fn records_are_taken_as_reported() {
        let mut snapshot = Snapshot::new(Uuid::nil(), "test", Utc::now());
        snapshot.roles.push(role(""));
        snapshot.roles.push(role(&"r".repeat(101)));
        snapshot.categories.push(category(Uuid::new_v4(), ""));

        assert!(validate_document(&snapshot).is_ok());
    }

    #[test]
    fn repeated_source_id_names_both_records() {
        let shared = Uuid::new_v4();
        let mut snapshot = Snapshot::new(Uuid::nil(), "test", Utc::now());
        snapshot.categories.push(category(shared, "Text"));
        snapshot.categories.push(category(shared, "Voice"));

        let err = validate_document(&snapshot).unwrap_err();
        assert_eq!(err.error_code(), "MALFORMED_SNAPSHOT");
        let msg = err.to_string();
        assert!(msg.contains("categories[1].source_id repeats categories[0]"), "{msg}");
        assert!(!msg.contains("__all__"), "{msg}");
    }

    #[test]
    fn roles_without_source_id_never_collide() {
        let mut snapshot = Snapshot::new(Uuid::nil(), "test", Utc::now());
        for name in ["a", "b"] {
            let mut r = role(name);
            r.source_id = None;
            snapshot.roles.push(r);
        }
        assert!(validate_document(&snapshot).is_ok());
    }
}
