// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! GCP network and Cloud SQL verification.
//!
//! These checks compare what the cloud resource operator declared on the
//! cluster (strategy config map, `Postgres` resources) with what exists in the
//! GCP project.

use super::cidr::Ipv4Cidr;
use super::client::{Address, GcpApi};
use super::strategy::{cidr_block_from_strategy, strategy_for_resource};
use crate::constants::{
    DEFAULT_GCP_IDENTIFIER_LENGTH, DEFAULT_IP_RANGE_POSTFIX, GCP_ADDRESS_STATUS_RESERVED,
    GCP_ALLOWED_CIDR_RANGES, GCP_STRATEGY_CONFIG_MAP_NAME, NETWORK_RESOURCE_TYPE,
    RESOURCE_IDENTIFIER_ANNOTATION,
};
use crate::crd::{Infrastructure, Postgres};
use crate::errors::CloudError;
use crate::store::ClusterStore;
use kube::ResourceExt;
use std::collections::BTreeSet;
use tracing::{debug, info, warn};

/// Result of [`verify_network`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NetworkReport {
    /// The strategy declares no standalone network for the tier
    Skipped { reason: String },
    /// The reserved address range matches the strategy
    Verified {
        project: String,
        cidr: Option<Ipv4Cidr>,
        address: Address,
    },
}

/// Name of a GCP resource derived from the cluster id.
///
/// Builds `{cluster_id}-{postfix}` in lower case. Names longer than `max_len`
/// keep their tail so the postfix survives, and never start with a hyphen.
///
/// # Example
///
/// ```rust
/// use managed_api_verify::gcp::build_infra_name;
///
/// assert_eq!(build_infra_name("MyCluster-x7k2p", "ip-range", 40), "mycluster-x7k2p-ip-range");
/// assert_eq!(build_infra_name("abcdef", "ip-range", 10), "f-ip-range");
/// ```
#[must_use]
pub fn build_infra_name(cluster_id: &str, postfix: &str, max_len: usize) -> String {
    let name: Vec<char> = format!("{cluster_id}-{postfix}")
        .to_lowercase()
        .chars()
        .collect();
    let start = name.len().saturating_sub(max_len);
    name[start..]
        .iter()
        .collect::<String>()
        .trim_start_matches('-')
        .to_string()
}

/// Check a reserved address range is usable.
///
/// # Errors
///
/// * [`CloudError::AddressNotReserved`] - Status is not `RESERVED`
/// * [`CloudError::AddressPrefixMismatch`] - Prefix length differs from `expected`
/// * Any error of [`GcpApi::get_global_address`]
pub async fn verify_address_range<A>(
    api: &A,
    project: &str,
    name: &str,
    expected: Option<&Ipv4Cidr>,
) -> Result<Address, CloudError>
where
    A: GcpApi + ?Sized,
{
    let address = api.get_global_address(project, name).await?;

    if address.status != GCP_ADDRESS_STATUS_RESERVED {
        return Err(CloudError::AddressNotReserved {
            name: name.to_string(),
            status: address.status,
        });
    }

    if let Some(expected) = expected {
        let actual = address.prefix_length.unwrap_or_default();
        if actual != expected.prefix_len() {
            return Err(CloudError::AddressPrefixMismatch {
                name: name.to_string(),
                actual,
                expected: expected.prefix_len(),
            });
        }
    }

    Ok(address)
}

async fn cluster_infrastructure<S>(store: &S) -> Result<Infrastructure, CloudError>
where
    S: ClusterStore + ?Sized,
{
    store
        .get_infrastructure()
        .await?
        .ok_or_else(|| CloudError::ResourceNotFound {
            resource: "infrastructure cluster".to_string(),
        })
}

fn project_of(infrastructure: &Infrastructure) -> Result<String, CloudError> {
    infrastructure
        .gcp_project_id()
        .map(str::to_string)
        .ok_or_else(|| CloudError::ProjectUnknown {
            reason: "infrastructure has no GCP platform status".to_string(),
        })
}

/// Verify the standalone network the strategy declares for `tier`.
///
/// Reads the strategy config map from `namespace`, validates the declared CIDR
/// block and checks the reserved service address range. A strategy without a
/// `_network` entry for the tier is reported as skipped, not failed.
///
/// # Errors
///
/// Any store, strategy, CIDR or address error.
pub async fn verify_network<S, A>(
    store: &S,
    api: &A,
    namespace: &str,
    tier: &str,
) -> Result<NetworkReport, CloudError>
where
    S: ClusterStore + ?Sized,
    A: GcpApi + ?Sized,
{
    let config_map = store
        .get_config_map(namespace, GCP_STRATEGY_CONFIG_MAP_NAME)
        .await?
        .ok_or_else(|| CloudError::ResourceNotFound {
            resource: format!("configmap {namespace}/{GCP_STRATEGY_CONFIG_MAP_NAME}"),
        })?;

    let strategy = match strategy_for_resource(&config_map, NETWORK_RESOURCE_TYPE, tier) {
        Ok(strategy) => strategy,
        Err(e @ CloudError::StrategyNotFound { .. }) => {
            info!(tier = %tier, "No standalone network strategy, skipping network check");
            return Ok(NetworkReport::Skipped {
                reason: e.to_string(),
            });
        }
        Err(e) => return Err(e),
    };

    let cidr = cidr_block_from_strategy(&strategy, GCP_ALLOWED_CIDR_RANGES)?;

    let infrastructure = cluster_infrastructure(store).await?;
    let project = if strategy.project_id.is_empty() {
        project_of(&infrastructure)?
    } else {
        strategy.project_id.clone()
    };

    let cluster_id = infrastructure.cluster_id();
    if cluster_id.is_empty() {
        return Err(CloudError::ResourceNotFound {
            resource: "infrastructure cluster id".to_string(),
        });
    }
    let name = build_infra_name(
        cluster_id,
        DEFAULT_IP_RANGE_POSTFIX,
        DEFAULT_GCP_IDENTIFIER_LENGTH,
    );
    debug!(project = %project, address = %name, "Verifying reserved address range");

    let address = verify_address_range(api, &project, &name, cidr.as_ref()).await?;

    info!(project = %project, address = %name, "GCP network verified");
    Ok(NetworkReport::Verified {
        project,
        cidr,
        address,
    })
}

/// Cloud SQL instance ids of `Postgres` resources.
///
/// Returns the ids and, separately, one message per resource lacking the
/// `resourceIdentifier` annotation.
#[must_use]
pub fn postgres_instance_ids(postgres: &[Postgres]) -> (Vec<String>, Vec<String>) {
    let mut ids = Vec::new();
    let mut errors = Vec::new();

    for pg in postgres {
        match pg
            .annotations()
            .get(RESOURCE_IDENTIFIER_ANNOTATION)
            .filter(|id| !id.is_empty())
        {
            Some(id) => ids.push(id.clone()),
            None => errors.push(format!(
                "Postgres {}/{} has no {RESOURCE_IDENTIFIER_ANNOTATION} annotation",
                pg.namespace().unwrap_or_default(),
                pg.name_any()
            )),
        }
    }

    (ids, errors)
}

/// Expected instances absent from `actual`, in `expected` order.
#[must_use]
pub fn missing_sql_instances(expected: &[String], actual: &[String]) -> Vec<String> {
    let actual: BTreeSet<&str> = actual.iter().map(String::as_str).collect();
    expected
        .iter()
        .filter(|id| !actual.contains(id.as_str()))
        .cloned()
        .collect()
}

/// Verify every `Postgres` in `namespace` has a Cloud SQL instance.
///
/// Returns the verified instance ids.
///
/// # Errors
///
/// * [`CloudError::PostgresLookup`] - Some resources carry no instance id
/// * [`CloudError::SqlInstancesMissing`] - Instances absent from the project
/// * Any store or GCP error
pub async fn verify_postgres_instances<S, A>(
    store: &S,
    api: &A,
    namespace: &str,
) -> Result<Vec<String>, CloudError>
where
    S: ClusterStore + ?Sized,
    A: GcpApi + ?Sized,
{
    let project = project_of(&cluster_infrastructure(store).await?)?;

    let actual: Vec<String> = api
        .list_sql_instances(&project)
        .await?
        .into_iter()
        .map(|instance| instance.name)
        .collect();

    let (expected, errors) = postgres_instance_ids(&store.list_postgres(namespace).await?);
    if !errors.is_empty() {
        return Err(CloudError::PostgresLookup { errors });
    }
    if expected.is_empty() {
        warn!(namespace = %namespace, "No Postgres resources found");
    }

    let instances = missing_sql_instances(&expected, &actual);
    if !instances.is_empty() {
        return Err(CloudError::SqlInstancesMissing { instances });
    }

    info!(project = %project, instances = expected.len(), "Cloud SQL instances verified");
    Ok(expected)
}

#[cfg(test)]
#[path = "checks_tests.rs"]
mod checks_tests;
