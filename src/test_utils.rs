//! Test utilities for the XMLMC client
//!
//! Shared assertion helpers and canned zone-info documents used by the
//! unit tests of several modules.

use crate::error::{Result, XmlmcError};

/// Assert that a result failed with a validation error carrying `expected`
///
/// # Panics
///
/// Panics if the result is Ok, is not an [`XmlmcError::Validation`], or the
/// message differs from `expected`.
pub fn assert_validation_error<T: std::fmt::Debug>(result: Result<T>, expected: &str) {
    let err = result.expect_err("expected a validation error");
    match err.downcast_ref::<XmlmcError>() {
        Some(XmlmcError::Validation(message)) => assert_eq!(message, expected),
        other => panic!("expected validation error '{expected}', got: {other:?}"),
    }
}

/// Assert that an error contains the expected message
///
/// # Panics
///
/// Panics if the result is Ok or if the error doesn't contain the expected message
pub fn assert_error_contains<T: std::fmt::Debug>(result: Result<T>, expected: &str) {
    match result {
        Ok(value) => panic!("expected error containing '{expected}', got Ok({value:?})"),
        Err(e) => assert!(
            e.to_string().contains(expected),
            "error '{e}' does not contain '{expected}'"
        ),
    }
}

/// A zone-info document in the shape served by the lookup hosts
pub fn zone_info_json(endpoint: &str, stream: &str) -> serde_json::Value {
    serde_json::json!({
        "zoneinfo": {
            "name": "hornbill",
            "zone": "eur",
            "message": "",
            "endpoint": endpoint,
            "releaseStream": stream
        }
    })
}
