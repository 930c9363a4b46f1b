use validator::Validate;
use crate::errors::AppError;
use crate::models::activity::ActivityType;

pub fn validate_payload<T: Validate>(payload: &T) -> Result<(), AppError> {
    payload.validate()
        .map_err(|err| AppError::BadRequest(err.to_string()))
}

pub fn validate_activity_type(record_type: &str) -> Result<ActivityType, AppError> {
    record_type.parse::<ActivityType>()
}

/// Rejects strings that are empty once surrounding whitespace is removed.
pub fn require_non_blank(field: &str, value: &str) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(AppError::BadRequest(format!("{} cannot be empty", field)));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Validate)]
    struct Sample {
        #[validate(length(min = 1, message = "Name cannot be empty"))]
        name: String,
    }

    #[test]
    fn payload_errors_become_bad_requests() {
        let err = validate_payload(&Sample { name: String::new() }).unwrap_err();
        assert!(matches!(err, AppError::BadRequest(msg) if msg.contains("Name cannot be empty")));
        assert!(validate_payload(&Sample { name: "ok".to_string() }).is_ok());
    }

    #[test]
    fn activity_type_must_be_known() {
        assert_eq!(validate_activity_type("APP").unwrap(), ActivityType::App);
        assert!(validate_activity_type("GAME").is_err());
    }

    #[test]
    fn blank_strings_are_rejected() {
        assert!(require_non_blank("Title", "   ").is_err());
        assert!(require_non_blank("Title", "Reading").is_ok());
    }
}
