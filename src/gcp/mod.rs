// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! GCP resource checks.
//!
//! This module verifies the cloud resources the cloud resource operator
//! provisions for an installation on GCP:
//!
//! - The standalone VPC network strategy and its reserved address range
//! - The Cloud SQL instances backing `Postgres` resources
//!
//! # Example
//!
//! ```rust,no_run
//! use managed_api_verify::gcp::{verify_network, GcpRestClient};
//! use managed_api_verify::store::KubeStore;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let store = KubeStore::new(kube::Client::try_default().await?);
//! let gcp = GcpRestClient::new(std::env::var("GCP_ACCESS_TOKEN")?);
//! let report = verify_network(&store, &gcp, "redhat-rhoam-operator", "production").await?;
//! println!("{report:?}");
//! # Ok(())
//! # }
//! ```

pub mod checks;
pub mod cidr;
pub mod client;
pub mod strategy;

pub use checks::{
    build_infra_name, missing_sql_instances, postgres_instance_ids, verify_address_range,
    verify_network, verify_postgres_instances, NetworkReport,
};
pub use cidr::Ipv4Cidr;
pub use client::{Address, GcpApi, GcpRestClient, SqlInstance};
pub use strategy::{cidr_block_from_strategy, strategy_for_resource, StrategyConfig};
