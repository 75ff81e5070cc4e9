// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Unit tests for `status_reasons` module
//!
//! These tests pin the reason strings reported to cert-manager.

#[cfg(test)]
mod tests {
    use crate::status_reasons::*;

    // ============================================================================
    // Test Payload Reason Constants
    // ============================================================================

    #[test]
    fn test_reason_invalid_payload_constant() {
        assert_eq!(REASON_INVALID_PAYLOAD, "InvalidPayload");
    }

    #[test]
    fn test_reason_unsupported_action_constant() {
        assert_eq!(REASON_UNSUPPORTED_ACTION, "UnsupportedAction");
    }

    #[test]
    fn test_reason_not_initialized_constant() {
        assert_eq!(REASON_NOT_INITIALIZED, "SolverNotInitialized");
    }

    #[test]
    fn test_reason_config_invalid_constant() {
        assert_eq!(REASON_CONFIG_INVALID, "ConfigurationInvalid");
    }

    // ============================================================================
    // Test Credential Reason Constants
    // ============================================================================

    #[test]
    fn test_reason_secret_fetch_failed_constant() {
        assert_eq!(REASON_SECRET_FETCH_FAILED, "SecretFetchFailed");
    }

    #[test]
    fn test_reason_secret_key_missing_constant() {
        assert_eq!(REASON_SECRET_KEY_MISSING, "SecretKeyMissing");
    }

    // ============================================================================
    // Test Record Store Reason Constants
    // ============================================================================

    #[test]
    fn test_reason_store_reasons_constants() {
        assert_eq!(REASON_STORE_CLIENT_FAILED, "StoreClientFailed");
        assert_eq!(REASON_RECORD_LIST_FAILED, "RecordListFailed");
        assert_eq!(REASON_RECORD_CREATE_FAILED, "RecordCreateFailed");
        assert_eq!(REASON_RECORD_DELETE_FAILED, "RecordDeleteFailed");
        assert_eq!(REASON_SUBDOMAIN_REMOVE_FAILED, "SubdomainRemoveFailed");
    }

    // ============================================================================
    // Test Reason Format
    // ============================================================================

    #[test]
    fn test_all_reasons_are_camel_case() {
        let reasons = [
            REASON_INVALID_PAYLOAD,
            REASON_UNSUPPORTED_ACTION,
            REASON_NOT_INITIALIZED,
            REASON_CONFIG_INVALID,
            REASON_SECRET_FETCH_FAILED,
            REASON_SECRET_KEY_MISSING,
            REASON_STORE_CLIENT_FAILED,
            REASON_RECORD_LIST_FAILED,
            REASON_RECORD_CREATE_FAILED,
            REASON_RECORD_DELETE_FAILED,
            REASON_SUBDOMAIN_REMOVE_FAILED,
        ];

        for reason in reasons {
            assert!(
                reason.chars().next().is_some_and(|c| c.is_ascii_uppercase()),
                "{reason} should start with an uppercase letter"
            );
            assert!(
                reason.chars().all(|c| c.is_ascii_alphanumeric()),
                "{reason} should only contain alphanumeric characters"
            );
        }
    }
}
