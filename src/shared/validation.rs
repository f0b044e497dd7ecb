//! Validation Utilities

use validator::{Validate, ValidationErrors};

use super::error::AppError;

/// Convert validation errors to AppError, reporting the first failing field.
pub fn validation_error(errors: ValidationErrors) -> AppError {
    AppError::Validation(first_error(&errors))
}

/// `"<field>: <message>"` for the alphabetically first failing field.
pub fn first_error(errors: &ValidationErrors) -> String {
    let mut fields: Vec<_> = errors.field_errors().into_iter().collect();
    fields.sort_by(|a, b| a.0.cmp(&b.0));

    fields
        .into_iter()
        .find_map(|(field, errs)| {
            errs.first().map(|e| {
                let detail = e
                    .message
                    .clone()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| e.code.to_string());
                format!("{}: {}", field, detail)
            })
        })
        .unwrap_or_else(|| "Validation failed".into())
}

/// Run `validator` rules on a request body.
pub fn validate<T: Validate>(value: &T) -> Result<(), AppError> {
    value.validate().map_err(validation_error)
}

/// Parse a path or form identifier, naming the field on failure.
pub fn parse_id(raw: &str, what: &str) -> Result<i64, AppError> {
    raw.trim()
        .parse::<i64>()
        .ok()
        .filter(|id| *id > 0)
        .ok_or_else(|| AppError::BadRequest(format!("Invalid {}", what)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize, Validate)]
    struct Sample {
        #[validate(length(min = 1, message = "is required"))]
        content: String,
    }

    #[test]
    fn test_validation_message_names_field() {
        let err = validate(&Sample { content: String::new() }).unwrap_err();
        assert_eq!(err.to_string(), "Validation error: content: is required");
    }

    #[test]
    fn test_parse_id() {
        assert_eq!(parse_id("42", "post id").unwrap(), 42);
        assert_eq!(parse_id(" 7 ", "post id").unwrap(), 7);
        assert!(matches!(parse_id("abc", "post id"), Err(AppError::BadRequest(m)) if m == "Invalid post id"));
        assert!(parse_id("0", "post id").is_err());
        assert!(parse_id("-3", "post id").is_err());
    }
}
