//! Tests for core_kernel error types

use core_kernel::error::CoreError;
use core_kernel::PortError;

#[test]
fn test_core_error_invalid_identifier() {
    let error = CoreError::invalid_identifier("identifier is empty");

    match error {
        CoreError::InvalidIdentifier(msg) => assert_eq!(msg, "identifier is empty"),
    }
}

#[test]
fn test_core_error_display() {
    let error = CoreError::invalid_identifier("bad");
    assert_eq!(format!("{}", error), "Invalid identifier: bad");
}

mod port_error_tests {
    use super::*;

    #[test]
    fn test_not_found_display() {
        let error = PortError::not_found("crm.deal", "42");
        assert_eq!(error.to_string(), "Not found: crm.deal with id 42");
        assert!(error.is_not_found());
        assert!(!error.is_transient());
    }

    #[test]
    fn test_transient_errors() {
        let transient = [
            PortError::connection("refused"),
            PortError::Timeout { operation: "crm.deal.list".into(), duration_ms: 30_000 },
            PortError::RateLimited { retry_after_secs: 1 },
            PortError::ServiceUnavailable { service: "crm".into() },
        ];
        for error in &transient {
            assert!(error.is_transient(), "{} should be transient", error);
        }

        let permanent = [
            PortError::validation("bad params"),
            PortError::Unauthorized { message: "NO_AUTH_FOUND".into() },
            PortError::remote("ERROR_CORE", "failed"),
            PortError::transformation("not json"),
            PortError::internal("boom"),
        ];
        for error in &permanent {
            assert!(!error.is_transient(), "{} should not be transient", error);
        }
    }

    #[test]
    fn test_validation_field() {
        match PortError::validation_field("id is required", "id") {
            PortError::Validation { message, field } => {
                assert_eq!(message, "id is required");
                assert_eq!(field.as_deref(), Some("id"));
            }
            other => panic!("Expected Validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_remote_display() {
        let error = PortError::remote("ERROR_CORE", "Stage is closed");
        assert_eq!(error.to_string(), "Remote error ERROR_CORE: Stage is closed");
    }
}
