// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! # managed-api-verify - Verification checks for the managed API add-on
//!
//! Checks a running managed API installation against what its operators
//! declared: the custom domain override, Prometheus scraping, the version
//! metric and the GCP resources provisioned by the cloud resource operator.
//!
//! ## Modules
//!
//! - [`custom_domain`] - Custom domain override resolution and `CustomDomain` readiness
//! - [`prometheus`] - Scrape target and version metric checks
//! - [`gcp`] - GCP network and Cloud SQL checks
//! - [`store`] - Read-only cluster access used by every check
//! - [`crd`] - Custom resources the checks read
//! - [`constants`] - Names shared with the add-on and its operators
//! - [`errors`] - Error types
//!
//! ## Example
//!
//! ```rust,no_run
//! use managed_api_verify::custom_domain::{resolve_domain, DomainOverride};
//! use managed_api_verify::crd::RHMI;
//! use managed_api_verify::store::KubeStore;
//! use kube::{Api, Client};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let client = Client::try_default().await?;
//! let installation = Api::<RHMI>::namespaced(client.clone(), "redhat-rhoam-operator")
//!     .get("rhoam")
//!     .await?;
//! let store = KubeStore::new(client);
//!
//! match resolve_domain(&store, Some(&installation)).await? {
//!     DomainOverride::Absent => println!("no custom domain"),
//!     DomainOverride::Present(domain) => println!("custom domain {domain}"),
//!     DomainOverride::PresentInvalid(domain) => println!("invalid custom domain {domain}"),
//! }
//! # Ok(())
//! # }
//! ```

pub mod constants;
pub mod crd;
pub mod custom_domain;
pub mod errors;
pub mod gcp;
pub mod prometheus;
pub mod store;

#[cfg(test)]
mod test_store;
