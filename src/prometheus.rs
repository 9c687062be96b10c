// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Prometheus scrape target and version metric checks.
//!
//! This module talks to the Prometheus HTTP API of the observability stack and
//! verifies that:
//!
//! - Every service the installation type expects is an active, healthy scrape
//!   target with a scrape URL ([`verify_scrape_targets`])
//! - The add-on version metric is exposed with a semantic version
//!   ([`verify_version_metric`])
//!
//! # Example
//!
//! ```rust,no_run
//! use managed_api_verify::crd::InstallationType;
//! use managed_api_verify::prometheus::{verify_scrape_targets, PrometheusClient};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let client = PrometheusClient::new("http://localhost:9090")?;
//! verify_scrape_targets(&client, &InstallationType::ManagedApi, "redhat-rhoam-observability").await?;
//! # Ok(())
//! # }
//! ```

use crate::constants::{
    PROMETHEUS_JOB_LABEL, PROMETHEUS_QUERY_PATH, PROMETHEUS_TARGETS_PATH, VERSION_METRIC_LABEL,
    VERSION_METRIC_NAME,
};
use crate::crd::InstallationType;
use crate::errors::MetricsError;
use regex::Regex;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::sync::LazyLock;
use tracing::{debug, info};
use url::Url;

/// Semantic Versioning 2.0 grammar: `MAJOR.MINOR.PATCH[-pre][+build]`.
static SEMVER_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^((([0-9]+)\.([0-9]+)\.([0-9]+)(?:-([0-9a-zA-Z-]+(?:\.[0-9a-zA-Z-]+)*))?)(?:\+([0-9a-zA-Z-]+(?:\.[0-9a-zA-Z-]+)*))?)$",
    )
    .expect("semver regex is valid")
});

/// Scrape jobs of a single-tenant install, relative to the observability namespace.
const MANAGED_API_TARGETS: &[&str] = &[
    "/integreatly-3scale-admin-ui",
    "/integreatly-3scale-system-developer",
    "/integreatly-3scale-system-master",
    "/integreatly-grafana",
    "/integreatly-rhsso",
    "/integreatly-rhssouser",
    "/redhat-rhoam-cloud-resources-operator-cloud-resource-operator-metrics/0",
    "/redhat-rhoam-marin3r-ratelimit/0",
    "/redhat-rhoam-rhsso-keycloak-service-monitor/0",
    "/redhat-rhoam-rhsso-keycloak-service-monitor/1",
    "/redhat-rhoam-rhsso-operator-keycloak-operator-metrics/0",
    "/redhat-rhoam-rhsso-operator-keycloak-operator-metrics/1",
    "/redhat-rhoam-user-sso-keycloak-service-monitor/0",
    "/redhat-rhoam-user-sso-keycloak-service-monitor/1",
    "/redhat-rhoam-user-sso-operator-keycloak-operator-metrics/0",
    "/redhat-rhoam-user-sso-operator-keycloak-operator-metrics/1",
];

/// Scrape jobs of a multi-tenant install, relative to the observability namespace.
const MULTITENANT_MANAGED_API_TARGETS: &[&str] = &[
    "/integreatly-3scale-admin-ui",
    "/integreatly-3scale-system-developer",
    "/integreatly-3scale-system-master",
    "/integreatly-grafana",
    "/integreatly-rhsso",
    "/sandbox-rhoam-cloud-resources-operator-cloud-resource-operator-metrics/0",
    "/sandbox-rhoam-marin3r-ratelimit/0",
    "/sandbox-rhoam-rhsso-keycloak-service-monitor/0",
    "/sandbox-rhoam-rhsso-keycloak-service-monitor/1",
    "/sandbox-rhoam-rhsso-operator-keycloak-operator-metrics/0",
    "/sandbox-rhoam-rhsso-operator-keycloak-operator-metrics/1",
];

/// Envelope of every Prometheus HTTP API response.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse<T> {
    pub status: String,
    pub data: Option<T>,
    pub error_type: Option<String>,
    pub error: Option<String>,
}

/// `data` of `/api/v1/targets`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TargetsResult {
    #[serde(default)]
    pub active_targets: Vec<ActiveTarget>,
}

/// An active scrape target.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActiveTarget {
    #[serde(default)]
    pub discovered_labels: BTreeMap<String, String>,
    #[serde(default)]
    pub labels: BTreeMap<String, String>,
    #[serde(default)]
    pub scrape_pool: String,
    #[serde(default)]
    pub scrape_url: String,
    #[serde(default)]
    pub last_error: String,
    #[serde(default)]
    pub health: TargetHealth,
}

impl ActiveTarget {
    /// Scrape job name as discovered by Prometheus.
    #[must_use]
    pub fn job(&self) -> Option<&str> {
        self.discovered_labels
            .get(PROMETHEUS_JOB_LABEL)
            .map(String::as_str)
    }

    /// Healthy and actually scraped.
    #[must_use]
    pub fn is_scraping(&self) -> bool {
        self.health == TargetHealth::Up && !self.scrape_url.is_empty()
    }
}

/// Health of a scrape target.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TargetHealth {
    Up,
    Down,
    #[default]
    #[serde(other)]
    Unknown,
}

/// `data` of `/api/v1/query`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryResult {
    #[serde(default)]
    pub result_type: String,
    #[serde(default)]
    pub result: Vec<Sample>,
}

/// One instant-vector sample.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct Sample {
    #[serde(default)]
    pub metric: BTreeMap<String, String>,
    pub value: Option<(f64, String)>,
}

/// Minimal client for the Prometheus HTTP API.
#[derive(Debug, Clone)]
pub struct PrometheusClient {
    http: reqwest::Client,
    base_url: String,
}

impl PrometheusClient {
    /// Create a client for the Prometheus server at `base_url`.
    ///
    /// # Errors
    ///
    /// Returns an error if `base_url` is not a valid URL.
    pub fn new(base_url: &str) -> Result<Self, MetricsError> {
        Url::parse(base_url).map_err(|e| MetricsError::Request {
            url: base_url.to_string(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// All active scrape targets.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or Prometheus reports an error.
    pub async fn active_targets(&self) -> Result<Vec<ActiveTarget>, MetricsError> {
        let targets: TargetsResult = self
            .get(PROMETHEUS_TARGETS_PATH, &[("state", "active")])
            .await?;
        Ok(targets.active_targets)
    }

    /// Run an instant query.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or Prometheus reports an error.
    pub async fn query(&self, promql: &str) -> Result<Vec<Sample>, MetricsError> {
        let result: QueryResult = self
            .get(PROMETHEUS_QUERY_PATH, &[("query", promql)])
            .await?;
        Ok(result.result)
    }

    async fn get<T>(&self, path: &str, params: &[(&str, &str)]) -> Result<T, MetricsError>
    where
        T: DeserializeOwned + Default,
    {
        let raw = format!("{}{path}", self.base_url);
        let url = Url::parse_with_params(&raw, params).map_err(|e| MetricsError::Request {
            url: raw.clone(),
            reason: e.to_string(),
        })?;
        let request_error = |reason: String| MetricsError::Request {
            url: url.to_string(),
            reason,
        };

        debug!(url = %url, "Querying Prometheus API");
        let response = self
            .http
            .get(url.clone())
            .send()
            .await
            .map_err(|e| request_error(e.to_string()))?;

        // Prometheus answers 4xx/5xx with an error envelope, so decode before
        // looking at the status code.
        let status = response.status();
        let body: ApiResponse<T> = response
            .json()
            .await
            .map_err(|e| request_error(format!("HTTP {status}: {e}")))?;

        if body.status != "success" {
            return Err(MetricsError::Api {
                error_type: body.error_type.unwrap_or_default(),
                message: body.error.unwrap_or_default(),
            });
        }
        if !status.is_success() {
            return Err(request_error(format!("HTTP {status}")));
        }

        Ok(body.data.unwrap_or_default())
    }
}

/// Scrape jobs an installation type must expose, keyed by namespace.
///
/// Installation types without a list (`managed` and unknown types) expect no
/// targets.
#[must_use]
pub fn expected_targets(
    installation_type: &InstallationType,
    observability_namespace: &str,
) -> BTreeMap<String, Vec<String>> {
    let suffixes = match installation_type {
        InstallationType::ManagedApi => MANAGED_API_TARGETS,
        InstallationType::MultitenantManagedApi => MULTITENANT_MANAGED_API_TARGETS,
        InstallationType::Managed | InstallationType::Other(_) => return BTreeMap::new(),
    };

    BTreeMap::from([(
        observability_namespace.to_string(),
        suffixes.iter().map(|s| (*s).to_string()).collect(),
    )])
}

/// Expected jobs (`namespace + suffix`) not being scraped correctly.
///
/// A job counts as scraped when an active target with that job name is healthy
/// and has a scrape URL.
#[must_use]
pub fn unscraped_targets(
    expected: &BTreeMap<String, Vec<String>>,
    active: &[ActiveTarget],
) -> Vec<String> {
    expected
        .iter()
        .flat_map(|(namespace, suffixes)| {
            suffixes.iter().map(move |suffix| format!("{namespace}{suffix}"))
        })
        .filter(|job| {
            !active
                .iter()
                .any(|target| target.job() == Some(job.as_str()) && target.is_scraping())
        })
        .collect()
}

/// Check Prometheus scrapes every job the installation type expects.
///
/// # Errors
///
/// Returns [`MetricsError::TargetsNotScraped`] listing the failing jobs, or a
/// request error.
pub async fn verify_scrape_targets(
    client: &PrometheusClient,
    installation_type: &InstallationType,
    observability_namespace: &str,
) -> Result<(), MetricsError> {
    let active = client.active_targets().await?;
    let expected = expected_targets(installation_type, observability_namespace);
    let targets = unscraped_targets(&expected, &active);

    if !targets.is_empty() {
        return Err(MetricsError::TargetsNotScraped { targets });
    }

    info!(
        installation_type = %installation_type,
        active_targets = active.len(),
        "All expected Prometheus targets are scraped"
    );
    Ok(())
}

/// Whether `value` is a Semantic Versioning 2.0 version.
///
/// # Example
///
/// ```rust
/// use managed_api_verify::prometheus::is_semantic_version;
///
/// assert!(is_semantic_version("1.14.0"));
/// assert!(is_semantic_version("1.14.0-rc.1+build.7"));
/// assert!(!is_semantic_version("v1.14"));
/// ```
#[must_use]
pub fn is_semantic_version(value: &str) -> bool {
    SEMVER_REGEX.is_match(value)
}

/// Check the version metric is exposed with a semantic version.
///
/// Returns the version of the first sample.
///
/// # Errors
///
/// * [`MetricsError::MetricNotFound`] - The query returned no samples
/// * [`MetricsError::InvalidVersion`] - The version label is missing or invalid
pub async fn verify_version_metric(client: &PrometheusClient) -> Result<String, MetricsError> {
    let samples = client.query(VERSION_METRIC_NAME).await?;
    let sample = samples.first().ok_or_else(|| MetricsError::MetricNotFound {
        metric: VERSION_METRIC_NAME.to_string(),
    })?;

    let version = sample
        .metric
        .get(VERSION_METRIC_LABEL)
        .cloned()
        .unwrap_or_default();
    if !is_semantic_version(&version) {
        return Err(MetricsError::InvalidVersion {
            metric: VERSION_METRIC_NAME.to_string(),
            value: version,
        });
    }

    info!(version = %version, "Version metric exposed");
    Ok(version)
}

#[cfg(test)]
#[path = "prometheus_tests.rs"]
mod prometheus_tests;
