// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Unit tests for `checks.rs`

#[cfg(test)]
mod tests {
    use crate::constants::{GCP_STRATEGY_CONFIG_MAP_NAME, NETWORK_RESOURCE_TYPE};
    use crate::errors::CloudError;
    use crate::gcp::{
        build_infra_name, missing_sql_instances, postgres_instance_ids, verify_address_range,
        verify_network, verify_postgres_instances, Address, GcpApi, Ipv4Cidr, NetworkReport,
        SqlInstance,
    };
    use crate::test_store::{config_map, gcp_infrastructure, postgres, FakeStore};
    use async_trait::async_trait;
    use std::collections::BTreeMap;
    use std::sync::Mutex;

    const NAMESPACE: &str = "redhat-rhoam-operator";

    #[derive(Default)]
    struct FakeGcp {
        addresses: BTreeMap<(String, String), Address>,
        sql_instances: BTreeMap<String, Vec<String>>,
        requests: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl GcpApi for FakeGcp {
        async fn get_global_address(&self, project: &str, name: &str) -> Result<Address, CloudError> {
            self.requests
                .lock()
                .unwrap()
                .push(format!("address {project}/{name}"));
            self.addresses
                .get(&(project.to_string(), name.to_string()))
                .cloned()
                .ok_or_else(|| CloudError::ResourceNotFound {
                    resource: format!("global address {project}/{name}"),
                })
        }

        async fn list_sql_instances(&self, project: &str) -> Result<Vec<SqlInstance>, CloudError> {
            self.requests.lock().unwrap().push(format!("sql {project}"));
            Ok(self
                .sql_instances
                .get(project)
                .map(|names| {
                    names
                        .iter()
                        .map(|name| SqlInstance {
                            name: name.clone(),
                            ..Default::default()
                        })
                        .collect()
                })
                .unwrap_or_default())
        }
    }

    fn address(name: &str, status: &str, prefix_length: u8) -> Address {
        Address {
            name: name.to_string(),
            address: "10.1.0.0".to_string(),
            prefix_length: Some(prefix_length),
            status: status.to_string(),
            ..Default::default()
        }
    }

    fn gcp_with_address(project: &str, address: Address) -> FakeGcp {
        FakeGcp {
            addresses: BTreeMap::from([((project.to_string(), address.name.clone()), address)]),
            ..Default::default()
        }
    }

    fn network_store(strategy: &str) -> FakeStore {
        FakeStore {
            config_maps: vec![config_map(
                NAMESPACE,
                GCP_STRATEGY_CONFIG_MAP_NAME,
                &[(NETWORK_RESOURCE_TYPE, strategy)],
            )],
            infrastructure: Some(gcp_infrastructure("rhoam-x7k2p", "rhoam-prod")),
            ..Default::default()
        }
    }

    // ------------------------------------------------------------------------
    // build_infra_name
    // ------------------------------------------------------------------------

    #[test]
    fn test_build_infra_name() {
        assert_eq!(
            build_infra_name("rhoam-x7k2p", "ip-range", 40),
            "rhoam-x7k2p-ip-range"
        );
        assert_eq!(build_infra_name("RHOAM-X7K2P", "ip-range", 40), "rhoam-x7k2p-ip-range");
    }

    #[test]
    fn test_build_infra_name_keeps_postfix_when_truncating() {
        let name = build_infra_name(&"c".repeat(50), "ip-range", 40);
        assert_eq!(name.len(), 40);
        assert!(name.ends_with("-ip-range"));

        assert_eq!(build_infra_name("abc", "ip-range", 9), "ip-range");
    }

    // ------------------------------------------------------------------------
    // verify_address_range
    // ------------------------------------------------------------------------

    #[tokio::test]
    async fn test_reserved_address_with_matching_prefix() {
        let gcp = gcp_with_address("p", address("range", "RESERVED", 22));
        let expected = Ipv4Cidr::parse("10.1.0.0/22").unwrap();

        let result = verify_address_range(&gcp, "p", "range", Some(&expected)).await;

        assert_eq!(result.unwrap().prefix_length, Some(22));
    }

    #[tokio::test]
    async fn test_address_not_reserved() {
        let gcp = gcp_with_address("p", address("range", "RESERVING", 22));

        let err = verify_address_range(&gcp, "p", "range", None)
            .await
            .unwrap_err();

        assert!(matches!(err, CloudError::AddressNotReserved { ref status, .. } if status == "RESERVING"));
    }

    #[tokio::test]
    async fn test_address_prefix_mismatch() {
        let gcp = gcp_with_address("p", address("range", "RESERVED", 16));
        let expected = Ipv4Cidr::parse("10.1.0.0/22").unwrap();

        let err = verify_address_range(&gcp, "p", "range", Some(&expected))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            CloudError::AddressPrefixMismatch {
                actual: 16,
                expected: 22,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_prefix_not_checked_without_expected_block() {
        let gcp = gcp_with_address("p", address("range", "RESERVED", 16));

        assert!(verify_address_range(&gcp, "p", "range", None).await.is_ok());
    }

    // ------------------------------------------------------------------------
    // verify_network
    // ------------------------------------------------------------------------

    #[tokio::test]
    async fn test_verify_network() {
        let store = network_store(
            r#"{"production": {"region": "europe-west2", "projectID": "", "createStrategy": {"cidrBlock": "10.1.0.0/22"}, "deleteStrategy": {}}}"#,
        );
        let gcp = gcp_with_address(
            "rhoam-prod",
            address("rhoam-x7k2p-ip-range", "RESERVED", 22),
        );

        let report = verify_network(&store, &gcp, NAMESPACE, "production")
            .await
            .unwrap();

        match report {
            NetworkReport::Verified {
                project,
                cidr,
                address,
            } => {
                assert_eq!(project, "rhoam-prod");
                assert_eq!(cidr.map(|c| c.to_string()), Some("10.1.0.0/22".to_string()));
                assert_eq!(address.name, "rhoam-x7k2p-ip-range");
            }
            NetworkReport::Skipped { reason } => panic!("unexpected skip: {reason}"),
        }
    }

    #[tokio::test]
    async fn test_verify_network_uses_strategy_project() {
        let store = network_store(
            r#"{"production": {"projectID": "shared-vpc-project", "createStrategy": {}}}"#,
        );
        let gcp = gcp_with_address(
            "shared-vpc-project",
            address("rhoam-x7k2p-ip-range", "RESERVED", 26),
        );

        let report = verify_network(&store, &gcp, NAMESPACE, "production")
            .await
            .unwrap();

        assert!(matches!(report, NetworkReport::Verified { ref project, cidr: None, .. } if project == "shared-vpc-project"));
    }

    #[tokio::test]
    async fn test_verify_network_skips_without_network_strategy() {
        let store = FakeStore {
            config_maps: vec![config_map(
                NAMESPACE,
                GCP_STRATEGY_CONFIG_MAP_NAME,
                &[("postgres", "{}")],
            )],
            ..Default::default()
        };
        let gcp = FakeGcp::default();

        let report = verify_network(&store, &gcp, NAMESPACE, "production")
            .await
            .unwrap();

        assert!(matches!(report, NetworkReport::Skipped { .. }));
        assert!(gcp.requests.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_verify_network_without_config_map() {
        let store = FakeStore::default();
        let gcp = FakeGcp::default();

        let err = verify_network(&store, &gcp, NAMESPACE, "production")
            .await
            .unwrap_err();

        assert!(matches!(err, CloudError::ResourceNotFound { .. }));
    }

    #[tokio::test]
    async fn test_verify_network_rejects_disallowed_cidr() {
        let store = network_store(
            r#"{"production": {"createStrategy": {"cidrBlock": "192.168.0.0/22"}}}"#,
        );
        let gcp = FakeGcp::default();

        let err = verify_network(&store, &gcp, NAMESPACE, "production")
            .await
            .unwrap_err();

        assert!(matches!(err, CloudError::CidrNotAllowed { .. }));
        assert!(gcp.requests.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_verify_network_store_unavailable() {
        let store = FakeStore {
            unavailable: true,
            ..Default::default()
        };
        let gcp = FakeGcp::default();

        let err = verify_network(&store, &gcp, NAMESPACE, "production")
            .await
            .unwrap_err();

        assert!(matches!(err, CloudError::Store(_)));
    }

    // ------------------------------------------------------------------------
    // Postgres instances
    // ------------------------------------------------------------------------

    #[test]
    fn test_postgres_instance_ids() {
        let list = vec![
            postgres(NAMESPACE, "threescale-postgres", Some("rhoam-x7k2p-3scale")),
            postgres(NAMESPACE, "rhsso-postgres", None),
            postgres(NAMESPACE, "usersso-postgres", Some("")),
        ];

        let (ids, errors) = postgres_instance_ids(&list);

        assert_eq!(ids, vec!["rhoam-x7k2p-3scale"]);
        assert_eq!(errors.len(), 2);
        assert!(errors[0].contains("rhsso-postgres"));
    }

    #[test]
    fn test_missing_sql_instances() {
        let expected = vec!["a".to_string(), "b".to_string(), "c".to_string()];
        let actual = vec!["c".to_string(), "a".to_string(), "z".to_string()];

        assert_eq!(missing_sql_instances(&expected, &actual), vec!["b"]);
        assert!(missing_sql_instances(&[], &actual).is_empty());
    }

    #[tokio::test]
    async fn test_verify_postgres_instances() {
        let store = FakeStore {
            postgres: vec![
                postgres(NAMESPACE, "threescale", Some("rhoam-3scale")),
                postgres(NAMESPACE, "rhsso", Some("rhoam-rhsso")),
                postgres("other-namespace", "ignored", Some("not-in-gcp")),
            ],
            infrastructure: Some(gcp_infrastructure("rhoam-x7k2p", "rhoam-prod")),
            ..Default::default()
        };
        let gcp = FakeGcp {
            sql_instances: BTreeMap::from([(
                "rhoam-prod".to_string(),
                vec!["rhoam-rhsso".to_string(), "rhoam-3scale".to_string(), "unrelated".to_string()],
            )]),
            ..Default::default()
        };

        let verified = verify_postgres_instances(&store, &gcp, NAMESPACE)
            .await
            .unwrap();

        assert_eq!(verified, vec!["rhoam-3scale", "rhoam-rhsso"]);
    }

    #[tokio::test]
    async fn test_verify_postgres_instances_missing_in_gcp() {
        let store = FakeStore {
            postgres: vec![postgres(NAMESPACE, "threescale", Some("rhoam-3scale"))],
            infrastructure: Some(gcp_infrastructure("rhoam-x7k2p", "rhoam-prod")),
            ..Default::default()
        };
        let gcp = FakeGcp::default();

        let err = verify_postgres_instances(&store, &gcp, NAMESPACE)
            .await
            .unwrap_err();

        assert!(matches!(err, CloudError::SqlInstancesMissing { ref instances } if instances == &vec!["rhoam-3scale".to_string()]));
    }

    #[tokio::test]
    async fn test_verify_postgres_instances_without_identifier() {
        let store = FakeStore {
            postgres: vec![postgres(NAMESPACE, "threescale", None)],
            infrastructure: Some(gcp_infrastructure("rhoam-x7k2p", "rhoam-prod")),
            ..Default::default()
        };
        let gcp = FakeGcp::default();

        let err = verify_postgres_instances(&store, &gcp, NAMESPACE)
            .await
            .unwrap_err();

        assert!(matches!(err, CloudError::PostgresLookup { .. }));
    }

    #[tokio::test]
    async fn test_verify_postgres_instances_without_gcp_platform() {
        let mut infrastructure = gcp_infrastructure("rhoam-x7k2p", "");
        if let Some(status) = infrastructure.status.as_mut() {
            status.platform_status = None;
        }
        let store = FakeStore {
            infrastructure: Some(infrastructure),
            ..Default::default()
        };
        let gcp = FakeGcp::default();

        let err = verify_postgres_instances(&store, &gcp, NAMESPACE)
            .await
            .unwrap_err();

        assert!(matches!(err, CloudError::ProjectUnknown { .. }));
    }
}
