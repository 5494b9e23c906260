use crate::error::{CompositionError, DepositionError};
use crate::types::{CompositionStatus, DepositionStatus};

pub fn validate_deposition_transition(
    from: DepositionStatus,
    to: DepositionStatus,
) -> Result<(), DepositionError> {
    use DepositionStatus::{Canceled, Completed, Confirmed, InProgress, Pending};

    let valid = matches!(
        (from, to),
        (Pending, Confirmed)
            | (Pending, Canceled)
            | (Confirmed, Canceled)
            | (Pending, InProgress)
            | (Confirmed, InProgress)
            | (InProgress, Completed)
    );

    if valid {
        Ok(())
    } else {
        Err(DepositionError::InvalidTransition { from, to })
    }
}

pub fn validate_composition_transition(
    from: CompositionStatus,
    to: CompositionStatus,
) -> Result<(), CompositionError> {
    use CompositionStatus::{Available, Completed, Failed, Queued};

    let valid = matches!(
        (from, to),
        (Queued, Available) | (Available, Completed) | (Queued, Failed) | (Available, Failed)
    );

    if valid {
        Ok(())
    } else {
        Err(CompositionError::InvalidTransition { from, to })
    }
}

/// Trims `value` and rejects it when nothing is left.
pub fn require_text(field: &str, value: &str) -> Result<String, String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(format!("{field} must not be blank"));
    }
    Ok(trimmed.to_string())
}

pub fn require_email(field: &str, value: &str) -> Result<String, String> {
    let email = require_text(field, value)?;
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && domain.contains('.') => {
            Ok(email.to_ascii_lowercase())
        }
        _ => Err(format!("{field} is not a valid email address")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deposition_lifecycle_transitions() {
        use DepositionStatus::*;
        assert!(validate_deposition_transition(Pending, Confirmed).is_ok());
        assert!(validate_deposition_transition(Confirmed, InProgress).is_ok());
        assert!(validate_deposition_transition(InProgress, Completed).is_ok());
        assert!(matches!(
            validate_deposition_transition(Completed, InProgress),
            Err(DepositionError::InvalidTransition { .. })
        ));
        assert!(validate_deposition_transition(InProgress, Canceled).is_err());
        assert!(validate_deposition_transition(Pending, Pending).is_err());
    }

    #[test]
    fn composition_transitions() {
        use CompositionStatus::*;
        assert!(validate_composition_transition(Queued, Available).is_ok());
        assert!(validate_composition_transition(Available, Failed).is_ok());
        assert!(validate_composition_transition(Queued, Completed).is_err());
        assert!(validate_composition_transition(Failed, Queued).is_err());
    }

    #[test]
    fn text_and_email_checks() {
        assert_eq!(require_text("name", "  Smith v. Jones ").unwrap(), "Smith v. Jones");
        assert!(require_text("name", "   ").is_err());
        assert_eq!(
            require_email("email", " Dana@Example.COM ").unwrap(),
            "dana@example.com"
        );
        assert!(require_email("email", "dana@localhost").is_err());
        assert!(require_email("email", "@example.com").is_err());
    }
}
