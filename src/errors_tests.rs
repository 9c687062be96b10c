// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Unit tests for `errors.rs`

#[cfg(test)]
mod tests {
    use crate::errors::{CloudError, DomainError, MetricsError, StoreError};

    #[test]
    fn test_no_ready_match_messages() {
        let missing = DomainError::NoReadyMatch {
            domain: "apps.example.com".into(),
            state: None,
        };
        assert_eq!(missing.to_string(), "No CustomDomain found for 'apps.example.com'");

        let failing = DomainError::NoReadyMatch {
            domain: "apps.example.com".into(),
            state: Some("Failing".into()),
        };
        assert!(failing.to_string().contains("not ready (state 'Failing')"));
    }

    #[test]
    fn test_invalid_domain_carries_value() {
        let err = DomainError::InvalidDomain {
            domain: "not a domain".into(),
        };
        assert!(err.to_string().contains("'not a domain'"));
    }

    #[test]
    fn test_store_error_converts_into_cloud_error() {
        let err: CloudError = StoreError::Unavailable {
            resource: "configmap".into(),
            reason: "connection refused".into(),
        }
        .into();

        assert!(matches!(err, CloudError::Store(_)));
        assert_eq!(
            err.to_string(),
            "Store unavailable for configmap: connection refused"
        );
    }

    #[test]
    fn test_list_messages_are_joined() {
        let err = MetricsError::TargetsNotScraped {
            targets: vec!["ns/a".into(), "ns/b".into()],
        };
        assert_eq!(
            err.to_string(),
            "Not correctly scraping Prometheus targets: ns/a, ns/b"
        );

        let err = CloudError::SqlInstancesMissing {
            instances: vec!["db-1".into(), "db-2".into()],
        };
        assert!(err.to_string().ends_with("db-1, db-2"));
    }

    #[test]
    fn test_address_prefix_mismatch_message() {
        let err = CloudError::AddressPrefixMismatch {
            name: "rhoam-ip-range".into(),
            actual: 16,
            expected: 22,
        };
        assert_eq!(
            err.to_string(),
            "Address range rhoam-ip-range prefix length 16 does not match expected 22"
        );
    }
}
