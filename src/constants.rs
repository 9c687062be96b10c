// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Global constants for the managed API verification checks.
//!
//! Every name that must match what the add-on, the custom domain operator or the
//! cloud resource operator writes lives here, so the compatibility contract can be
//! audited in one place.

// ============================================================================
// Custom Domain Contract
// ============================================================================

/// Name of the secret the add-on provisioning process writes its parameters to
pub const ADDON_PARAMETERS_SECRET_NAME: &str = "addon-managed-api-service-parameters";

/// Data key in the add-on parameters secret holding the custom domain override
pub const CUSTOM_DOMAIN_DATA_KEY: &str = "custom-domain_domain";

/// `CustomDomain` status state reported once the domain is provisioned
pub const CUSTOM_DOMAIN_STATE_READY: &str = "Ready";

// ============================================================================
// API Constants
// ============================================================================

/// API group of the installation and cloud resource CRDs
pub const INTEGREATLY_API_GROUP: &str = "integreatly.org";

/// API group of the `CustomDomain` CRD
pub const CUSTOM_DOMAIN_API_GROUP: &str = "managed.openshift.io";

/// Kind name for `CustomDomain` resource
pub const KIND_CUSTOM_DOMAIN: &str = "CustomDomain";

/// Kind name for the installation resource
pub const KIND_RHMI: &str = "RHMI";

/// Kind name for the cloud resource `Postgres` resource
pub const KIND_POSTGRES: &str = "Postgres";

/// Name of the cluster-wide OpenShift `Infrastructure` resource
pub const INFRASTRUCTURE_NAME: &str = "cluster";

/// Page size for Kubernetes list calls
pub const KUBE_LIST_PAGE_SIZE: u32 = 100;

// ============================================================================
// Installation Constants
// ============================================================================

/// Namespace the add-on operator and its installation live in
pub const DEFAULT_OPERATOR_NAMESPACE: &str = "redhat-rhoam-operator";

/// Namespace the observability stack (Prometheus) lives in
pub const DEFAULT_OBSERVABILITY_NAMESPACE: &str = "redhat-rhoam-observability";

/// Installation type of a single-tenant managed API install
pub const INSTALLATION_TYPE_MANAGED_API: &str = "managed-api";

/// Installation type of a multi-tenant managed API install
pub const INSTALLATION_TYPE_MULTITENANT_MANAGED_API: &str = "multitenant-managed-api";

/// Installation type of a full managed install
pub const INSTALLATION_TYPE_MANAGED: &str = "managed";

// ============================================================================
// Prometheus Constants
// ============================================================================

/// Default Prometheus base URL (port-forwarded `prometheus-prometheus-0`)
pub const DEFAULT_PROMETHEUS_URL: &str = "http://localhost:9090";

/// Prometheus targets API path
pub const PROMETHEUS_TARGETS_PATH: &str = "/api/v1/targets";

/// Prometheus instant query API path
pub const PROMETHEUS_QUERY_PATH: &str = "/api/v1/query";

/// Metric exposing the installed add-on version
pub const VERSION_METRIC_NAME: &str = "rhoam_version";

/// Label on the version metric carrying the version string
pub const VERSION_METRIC_LABEL: &str = "version";

/// Discovered label Prometheus uses for the scrape job name
pub const PROMETHEUS_JOB_LABEL: &str = "job";

// ============================================================================
// GCP Constants
// ============================================================================

/// Name of the cloud resource operator's GCP strategy config map
pub const GCP_STRATEGY_CONFIG_MAP_NAME: &str = "cloud-resources-gcp-strategies";

/// Strategy config map key for standalone network resources
pub const NETWORK_RESOURCE_TYPE: &str = "_network";

/// Strategy tier used by production installations
pub const DEFAULT_GCP_TIER: &str = "production";

/// Postfix of the reserved global address range name
pub const DEFAULT_IP_RANGE_POSTFIX: &str = "ip-range";

/// Maximum length of GCP infrastructure resource names
pub const DEFAULT_GCP_IDENTIFIER_LENGTH: usize = 40;

/// CIDR ranges a strategy's VPC CIDR block must fall within
pub const GCP_ALLOWED_CIDR_RANGES: &[&str] = &["10.255.255.255/8", "172.31.255.255/12"];

/// Status of a global address reserved for private service access
pub const GCP_ADDRESS_STATUS_RESERVED: &str = "RESERVED";

/// Annotation the cloud resource operator sets to the provisioned instance name
pub const RESOURCE_IDENTIFIER_ANNOTATION: &str = "resourceIdentifier";

/// Default GCP compute REST endpoint
pub const GCP_COMPUTE_ENDPOINT: &str = "https://compute.googleapis.com";

/// Default Cloud SQL admin REST endpoint
pub const GCP_SQLADMIN_ENDPOINT: &str = "https://sqladmin.googleapis.com";
