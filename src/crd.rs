// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Custom Resource Definitions read by the verification checks.
//!
//! None of these resources are owned by this crate. They mirror the parts of the
//! upstream schemas the checks depend on, and unknown fields are ignored on
//! deserialization.
//!
//! # Resource Types
//!
//! - [`RHMI`] - The add-on installation; its namespace scopes secret lookups
//! - [`CustomDomain`] - Cluster-scoped claim for a custom ingress domain
//! - [`Postgres`] - Cloud resource operator request for a managed database
//! - [`Infrastructure`] - OpenShift cluster infrastructure details
//!
//! # Example: Declaring a Custom Domain
//!
//! ```rust
//! use managed_api_verify::crd::{CustomDomain, CustomDomainSpec};
//!
//! let claim = CustomDomain::new(
//!     "apps",
//!     CustomDomainSpec {
//!         domain: "apps.example.com".to_string(),
//!         ..Default::default()
//!     },
//! );
//! assert!(!claim.is_ready());
//! ```

use crate::constants::{
    CUSTOM_DOMAIN_STATE_READY, INSTALLATION_TYPE_MANAGED, INSTALLATION_TYPE_MANAGED_API,
    INSTALLATION_TYPE_MULTITENANT_MANAGED_API,
};
use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

/// `CustomDomain` claims a custom ingress domain for the cluster.
///
/// The custom domain operator provisions ingress and certificates for the domain
/// and reports progress in `status.state`.
///
/// # Example
///
/// ```yaml
/// apiVersion: managed.openshift.io/v1alpha1
/// kind: CustomDomain
/// metadata:
///   name: apps
/// spec:
///   domain: apps.example.com
///   certificate:
///     name: apps-tls
///     namespace: openshift-ingress
/// ```
#[derive(CustomResource, Clone, Debug, Default, Serialize, Deserialize, JsonSchema)]
#[kube(
    group = "managed.openshift.io",
    version = "v1alpha1",
    kind = "CustomDomain",
    doc = "CustomDomain claims a custom ingress domain and reports its provisioning state."
)]
#[kube(status = "CustomDomainStatus")]
#[serde(rename_all = "camelCase")]
pub struct CustomDomainSpec {
    /// Fully qualified domain to provision (e.g., "apps.example.com")
    pub domain: String,

    /// Secret holding the TLS certificate for the domain
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub certificate: Option<SecretReference>,

    /// Ingress scope, `External` or `Internal`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
}

/// Reference to a secret in a specific namespace.
#[derive(Clone, Debug, Default, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct SecretReference {
    pub name: String,
    pub namespace: String,
}

/// Observed state of a `CustomDomain`.
///
/// `state` is kept as a free string: the checks only distinguish
/// [`CUSTOM_DOMAIN_STATE_READY`] from everything else, and new operator states
/// must not break deserialization.
#[derive(Clone, Debug, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct CustomDomainStatus {
    /// Provisioning state, e.g. `Ready`, `Failing`, `Provisioning`
    #[serde(default)]
    pub state: String,

    /// Ingress endpoint DNS records should point at
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,

    /// DNS record the custom domain operator manages
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dns_record: Option<String>,
}

impl CustomDomain {
    /// Reported state, or `""` when the operator has not written a status yet.
    #[must_use]
    pub fn state(&self) -> &str {
        self.status.as_ref().map_or("", |s| s.state.as_str())
    }

    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.state() == CUSTOM_DOMAIN_STATE_READY
    }
}

/// `RHMI` is the add-on installation resource.
///
/// Only the installation type is read; everything else the installation
/// operator manages is ignored.
#[derive(CustomResource, Clone, Debug, Default, Serialize, Deserialize, JsonSchema)]
#[kube(
    group = "integreatly.org",
    version = "v1alpha1",
    kind = "RHMI",
    namespaced,
    doc = "RHMI describes an installation of the managed API add-on."
)]
#[kube(status = "RHMIStatus")]
#[serde(rename_all = "camelCase")]
pub struct RHMISpec {
    /// Installation type, e.g. `managed-api` or `multitenant-managed-api`
    #[serde(rename = "type")]
    pub installation_type: String,

    /// Suffix of routes exposed by the installation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub routing_subdomain: Option<String>,
}

/// Observed state of an installation.
#[derive(Clone, Debug, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct RHMIStatus {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stage: Option<String>,
}

impl RHMI {
    #[must_use]
    pub fn installation_type(&self) -> InstallationType {
        InstallationType::parse(&self.spec.installation_type)
    }
}

/// Installation flavours that change which checks apply.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InstallationType {
    /// Single-tenant managed API (`managed-api`)
    ManagedApi,
    /// Multi-tenant managed API (`multitenant-managed-api`)
    MultitenantManagedApi,
    /// Full managed install (`managed`)
    Managed,
    /// Any other value, kept verbatim
    Other(String),
}

impl InstallationType {
    #[must_use]
    pub fn parse(value: &str) -> Self {
        match value {
            INSTALLATION_TYPE_MANAGED_API => Self::ManagedApi,
            INSTALLATION_TYPE_MULTITENANT_MANAGED_API => Self::MultitenantManagedApi,
            INSTALLATION_TYPE_MANAGED => Self::Managed,
            other => Self::Other(other.to_string()),
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::ManagedApi => INSTALLATION_TYPE_MANAGED_API,
            Self::MultitenantManagedApi => INSTALLATION_TYPE_MULTITENANT_MANAGED_API,
            Self::Managed => INSTALLATION_TYPE_MANAGED,
            Self::Other(other) => other,
        }
    }
}

impl fmt::Display for InstallationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// `Postgres` requests a managed database from the cloud resource operator.
///
/// Once provisioned the operator annotates the resource with
/// `resourceIdentifier`, the name of the Cloud SQL instance.
#[derive(CustomResource, Clone, Debug, Default, Serialize, Deserialize, JsonSchema)]
#[kube(
    group = "integreatly.org",
    version = "v1alpha1",
    kind = "Postgres",
    namespaced,
    doc = "Postgres requests a cloud-provider managed Postgres instance."
)]
#[kube(status = "PostgresStatus")]
#[serde(rename_all = "camelCase")]
pub struct PostgresSpec {
    /// Strategy tier, e.g. `production`
    #[serde(default)]
    pub tier: String,

    /// Strategy type, e.g. `gcp`
    #[serde(default, rename = "type")]
    pub strategy_type: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secret_ref: Option<SecretReference>,
}

/// Observed state of a `Postgres` request.
#[derive(Clone, Debug, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct PostgresStatus {
    #[serde(default)]
    pub phase: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// OpenShift `Infrastructure` (`config.openshift.io/v1`, cluster-scoped).
///
/// Declared here because `k8s-openapi` does not ship OpenShift types. The spec
/// is empty for the fields we read.
#[derive(CustomResource, Clone, Debug, Default, Serialize, Deserialize, JsonSchema)]
#[kube(
    group = "config.openshift.io",
    version = "v1",
    kind = "Infrastructure",
    doc = "Infrastructure holds cluster-wide infrastructure configuration."
)]
#[kube(status = "InfrastructureStatus")]
#[serde(rename_all = "camelCase")]
pub struct InfrastructureSpec {}

/// Observed infrastructure details.
#[derive(Clone, Debug, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct InfrastructureStatus {
    /// Unique cluster id used as prefix of cloud resource names
    #[serde(default)]
    pub infrastructure_name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub platform_status: Option<PlatformStatus>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct PlatformStatus {
    #[serde(rename = "type", default)]
    pub platform_type: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gcp: Option<GcpPlatformStatus>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct GcpPlatformStatus {
    #[serde(rename = "projectID", default)]
    pub project_id: String,

    #[serde(default)]
    pub region: String,
}

impl Infrastructure {
    /// Cluster id, empty when the status has not been populated.
    #[must_use]
    pub fn cluster_id(&self) -> &str {
        self.status
            .as_ref()
            .map_or("", |s| s.infrastructure_name.as_str())
    }

    /// GCP project the cluster runs in, if it runs on GCP.
    #[must_use]
    pub fn gcp_project_id(&self) -> Option<&str> {
        self.status
            .as_ref()
            .and_then(|s| s.platform_status.as_ref())
            .and_then(|p| p.gcp.as_ref())
            .map(|g| g.project_id.as_str())
            .filter(|id| !id.is_empty())
    }
}

#[cfg(test)]
#[path = "crd_tests.rs"]
mod crd_tests;
