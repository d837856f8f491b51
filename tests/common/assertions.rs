//! Assertion helpers for integration tests

/// Assert that a JSON error body carries the given status
pub fn assert_error_body(body: &serde_json::Value, status: u16) {
    assert!(body["error"].is_string(), "missing error message in {}", body);
    assert_eq!(body["status"], status);
}
