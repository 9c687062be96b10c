// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Error types for the verification checks.
//!
//! This module provides specialized error types for:
//! - Kubernetes store reads (secrets, config maps, custom resources)
//! - Custom domain resolution and `CustomDomain` readiness
//! - Prometheus target and metric checks
//! - GCP network and Cloud SQL checks
//!
//! Errors are returned to the caller untouched; the library never logs and
//! drops them.

use thiserror::Error;

/// Errors returned by a [`crate::store::ClusterStore`].
#[derive(Error, Debug)]
pub enum StoreError {
    /// The Kubernetes API call failed
    #[error("Kubernetes API request for {resource} failed: {source}")]
    Api {
        /// Human readable resource description, e.g. `secret redhat-rhoam-operator/foo`
        resource: String,
        #[source]
        source: kube::Error,
    },

    /// The store could not be reached or answered with something unusable
    #[error("Store unavailable for {resource}: {reason}")]
    Unavailable {
        resource: String,
        reason: String,
    },
}

/// Errors from custom domain resolution and `CustomDomain` readiness checks.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A required input was missing or empty
    #[error("Invalid argument: {reason}")]
    InvalidArgument { reason: String },

    /// The backing record could not be fetched or listed
    ///
    /// Covers both "record does not exist" and any other fetch failure; either
    /// way the override cannot be determined.
    #[error("Cannot read {resource}: {reason}")]
    NotAvailable { resource: String, reason: String },

    /// The configured override is not a structurally valid hostname
    ///
    /// The rejected value is carried so callers can report what was configured.
    #[error("Custom domain '{domain}' is not a valid domain name")]
    InvalidDomain { domain: String },

    /// No `CustomDomain` with this domain is in the `Ready` state
    ///
    /// `state` is `None` when no claim matched the domain at all, and the
    /// observed state of the first matching claim otherwise.
    #[error("{}", no_ready_match_message(.domain, .state.as_deref()))]
    NoReadyMatch {
        domain: String,
        state: Option<String>,
    },
}

fn no_ready_match_message(domain: &str, state: Option<&str>) -> String {
    match state {
        Some(state) => format!("CustomDomain for '{domain}' found but not ready (state '{state}')"),
        None => format!("No CustomDomain found for '{domain}'"),
    }
}

/// Errors from the Prometheus checks.
#[derive(Error, Debug)]
pub enum MetricsError {
    /// The Prometheus API could not be reached or returned a non-2xx status
    #[error("Prometheus request to {url} failed: {reason}")]
    Request { url: String, reason: String },

    /// The Prometheus API answered with `status: error`
    #[error("Prometheus API error ({error_type}): {message}")]
    Api { error_type: String, message: String },

    /// Expected scrape jobs are missing, unhealthy or have no scrape URL
    #[error("Not correctly scraping Prometheus targets: {}", .targets.join(", "))]
    TargetsNotScraped { targets: Vec<String> },

    /// The metric query returned no samples
    #[error("No results for metric {metric}")]
    MetricNotFound { metric: String },

    /// The metric's version label is missing or not a semantic version
    #[error("Expected semantic version for metric {metric}, got '{value}'")]
    InvalidVersion { metric: String, value: String },
}

/// Errors from the GCP network and Cloud SQL checks.
#[derive(Error, Debug)]
pub enum CloudError {
    /// A Kubernetes read needed by the check failed
    #[error(transparent)]
    Store(#[from] StoreError),

    /// A required Kubernetes resource does not exist
    #[error("{resource} not found")]
    ResourceNotFound { resource: String },

    /// The strategy config map has no entry for the resource type or tier
    #[error("No '{resource_type}' strategy for tier '{tier}'")]
    StrategyNotFound { resource_type: String, tier: String },

    /// The strategy config map entry could not be parsed
    #[error("Invalid '{resource_type}' strategy: {reason}")]
    InvalidStrategy {
        resource_type: String,
        reason: String,
    },

    /// A CIDR string is malformed
    #[error("Invalid CIDR block '{cidr}': {reason}")]
    InvalidCidr { cidr: String, reason: String },

    /// A CIDR block falls outside every allowed range
    #[error("CIDR block {cidr} is not within the allowed ranges {}", .allowed.join(", "))]
    CidrNotAllowed { cidr: String, allowed: Vec<String> },

    /// The GCP project could not be determined
    #[error("Cannot determine GCP project: {reason}")]
    ProjectUnknown { reason: String },

    /// A GCP REST call failed
    #[error("GCP request to {url} failed: {reason}")]
    Request { url: String, reason: String },

    /// The reserved address range is not in the expected state
    #[error("Address range {name} status expected RESERVED, but found {status}")]
    AddressNotReserved { name: String, status: String },

    /// The reserved address range has an unexpected prefix length
    #[error("Address range {name} prefix length {actual} does not match expected {expected}")]
    AddressPrefixMismatch {
        name: String,
        actual: u8,
        expected: u8,
    },

    /// `Postgres` resources could not be mapped to instance ids
    #[error("Cannot determine Postgres instance ids: {}", .errors.join("; "))]
    PostgresLookup { errors: Vec<String> },

    /// Instances declared on the cluster are missing in the GCP project
    #[error("Postgres SQL instances defined in CRs but missing in Google Cloud: {}", .instances.join(", "))]
    SqlInstancesMissing { instances: Vec<String> },
}

#[cfg(test)]
#[path = "errors_tests.rs"]
mod errors_tests;
