// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Cloud resource strategy config map parsing.
//!
//! The cloud resource operator keeps one config map per provider. Each data key
//! is a resource type (`_network`, `postgres`, `redis`, ...) whose value maps a
//! tier to the strategy used to provision that resource:
//!
//! ```json
//! {
//!   "production": {
//!     "region": "europe-west2",
//!     "projectID": "my-project",
//!     "createStrategy": { "cidrBlock": "10.1.0.0/22" },
//!     "deleteStrategy": {}
//!   }
//! }
//! ```

use super::cidr::Ipv4Cidr;
use crate::constants::NETWORK_RESOURCE_TYPE;
use crate::errors::CloudError;
use k8s_openapi::api::core::v1::ConfigMap;
use serde::Deserialize;
use std::collections::BTreeMap;
use tracing::debug;

/// Strategy for one resource type and tier.
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StrategyConfig {
    #[serde(default)]
    pub region: String,

    #[serde(default, rename = "projectID")]
    pub project_id: String,

    /// Provider-specific create input, left raw
    #[serde(default)]
    pub create_strategy: serde_json::Value,

    #[serde(default)]
    pub delete_strategy: serde_json::Value,
}

/// Create input of a standalone VPC network strategy.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateVpcInput {
    #[serde(default)]
    pub cidr_block: String,
}

/// Look up the strategy for `resource_type` and `tier`.
///
/// # Errors
///
/// * [`CloudError::StrategyNotFound`] - No entry for the resource type or tier
/// * [`CloudError::InvalidStrategy`] - The entry is not valid strategy JSON
pub fn strategy_for_resource(
    config_map: &ConfigMap,
    resource_type: &str,
    tier: &str,
) -> Result<StrategyConfig, CloudError> {
    let not_found = || CloudError::StrategyNotFound {
        resource_type: resource_type.to_string(),
        tier: tier.to_string(),
    };

    let raw = config_map
        .data
        .as_ref()
        .and_then(|data| data.get(resource_type))
        .ok_or_else(not_found)?;

    let mut tiers: BTreeMap<String, StrategyConfig> =
        serde_json::from_str(raw).map_err(|e| CloudError::InvalidStrategy {
            resource_type: resource_type.to_string(),
            reason: e.to_string(),
        })?;

    tiers.remove(tier).ok_or_else(not_found)
}

/// CIDR block a network strategy asks for, checked against `allowed`.
///
/// Returns `None` when the strategy leaves the block empty, in which case the
/// operator picks one itself.
///
/// # Errors
///
/// * [`CloudError::InvalidStrategy`] - The create strategy is malformed
/// * [`CloudError::InvalidCidr`] - The block or an allowed range is malformed
/// * [`CloudError::CidrNotAllowed`] - The block is outside every allowed range
pub fn cidr_block_from_strategy(
    strategy: &StrategyConfig,
    allowed: &[&str],
) -> Result<Option<Ipv4Cidr>, CloudError> {
    let input: CreateVpcInput = if strategy.create_strategy.is_null() {
        CreateVpcInput::default()
    } else {
        serde_json::from_value(strategy.create_strategy.clone()).map_err(|e| {
            CloudError::InvalidStrategy {
                resource_type: NETWORK_RESOURCE_TYPE.to_string(),
                reason: format!("failed to unmarshal vpc create config: {e}"),
            }
        })?
    };

    if input.cidr_block.trim().is_empty() {
        debug!("Strategy map CIDR block is empty");
        return Ok(None);
    }

    let block = Ipv4Cidr::parse(&input.cidr_block)?;
    let ranges = allowed
        .iter()
        .map(|range| Ipv4Cidr::parse(range))
        .collect::<Result<Vec<_>, _>>()?;

    if !ranges.iter().any(|range| range.contains(&block)) {
        return Err(CloudError::CidrNotAllowed {
            cidr: block.to_string(),
            allowed: allowed.iter().map(|s| (*s).to_string()).collect(),
        });
    }

    Ok(Some(block))
}

#[cfg(test)]
#[path = "strategy_tests.rs"]
mod strategy_tests;
