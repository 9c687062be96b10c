// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Custom domain override resolution.
//!
//! The add-on provisioning process may write a custom domain into the add-on
//! parameters secret. This module:
//!
//! - Reads the override from the installation's namespace ([`resolve_domain`])
//! - Validates it as a bare hostname ([`is_valid_domain`])
//! - Cross-checks it against the cluster's `CustomDomain` claims
//!   ([`has_valid_custom_domain_cr`])
//!
//! An override is only usable when it is structurally valid AND a
//! `CustomDomain` with exactly that domain is `Ready` ([`verify_custom_domain`]).
//!
//! # Example
//!
//! ```rust
//! use managed_api_verify::custom_domain::is_valid_domain;
//!
//! assert!(is_valid_domain("apps.example.com"));
//! assert!(!is_valid_domain("https://apps.example.com"));
//! ```

use crate::constants::{ADDON_PARAMETERS_SECRET_NAME, CUSTOM_DOMAIN_DATA_KEY};
use crate::crd::{CustomDomain, RHMI};
use crate::errors::DomainError;
use crate::store::ClusterStore;
use kube::ResourceExt;
use regex::Regex;
use std::sync::LazyLock;
use tracing::debug;

/// Hostname grammar: dot-separated labels of letters, digits and hyphens, each
/// 1-63 characters and not starting or ending with a hyphen.
static DOMAIN_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^([a-zA-Z0-9]([a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?\.)*[a-zA-Z0-9]([a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?$",
    )
    .expect("domain regex is valid")
});

/// Outcome of looking up the custom domain override.
///
/// `PresentInvalid` keeps the configured value even though it failed
/// validation, so callers can report what was set.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DomainOverride {
    /// The secret exists but carries no override
    Absent,
    /// A valid override, whitespace trimmed
    Present(String),
    /// An override that is not a valid hostname, whitespace trimmed
    PresentInvalid(String),
}

impl DomainOverride {
    /// Whether an override was configured at all, valid or not.
    #[must_use]
    pub fn found(&self) -> bool {
        !matches!(self, Self::Absent)
    }

    /// The configured value, `""` when absent.
    #[must_use]
    pub fn domain(&self) -> &str {
        match self {
            Self::Absent => "",
            Self::Present(domain) | Self::PresentInvalid(domain) => domain,
        }
    }

    /// `InvalidDomain` for an invalid override, `None` otherwise.
    #[must_use]
    pub fn validation_error(&self) -> Option<DomainError> {
        match self {
            Self::PresentInvalid(domain) => Some(DomainError::InvalidDomain {
                domain: domain.clone(),
            }),
            Self::Absent | Self::Present(_) => None,
        }
    }

    /// Collapse into the valid domain, if any.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::InvalidDomain`] carrying the rejected value.
    pub fn into_result(self) -> Result<Option<String>, DomainError> {
        match self {
            Self::Absent => Ok(None),
            Self::Present(domain) => Ok(Some(domain)),
            Self::PresentInvalid(domain) => Err(DomainError::InvalidDomain { domain }),
        }
    }
}

/// Result of [`verify_custom_domain`].
#[derive(Clone, Debug)]
pub enum CustomDomainReport {
    /// No override configured; the cluster's default domain is used
    NotConfigured,
    /// The override is valid and its `CustomDomain` is ready
    Ready {
        domain: String,
        claim: Box<CustomDomain>,
    },
}

/// Check a candidate domain against the hostname grammar.
///
/// Purely structural; no DNS lookup is made. Rejects the empty string,
/// whitespace, scheme prefixes such as `https://` and path separators.
///
/// # Example
///
/// ```rust
/// use managed_api_verify::custom_domain::is_valid_domain;
///
/// assert!(is_valid_domain("good.domain.com"));
/// assert!(!is_valid_domain("bad domain.com"));
/// assert!(!is_valid_domain("suffix.domain.com/"));
/// assert!(!is_valid_domain(""));
/// ```
#[must_use]
pub fn is_valid_domain(candidate: &str) -> bool {
    !candidate.is_empty() && DOMAIN_REGEX.is_match(candidate)
}

/// Look up the custom domain override for an installation.
///
/// Reads [`ADDON_PARAMETERS_SECRET_NAME`] from the installation's namespace and
/// takes the trimmed value of [`CUSTOM_DOMAIN_DATA_KEY`].
///
/// # Arguments
///
/// * `store` - Cluster store to read the secret from
/// * `installation` - The installation whose namespace scopes the lookup
///
/// # Returns
///
/// * `Ok(DomainOverride::Absent)` - The secret has no override key
/// * `Ok(DomainOverride::Present(_))` - A valid override
/// * `Ok(DomainOverride::PresentInvalid(_))` - An override failing validation
///
/// # Errors
///
/// * [`DomainError::InvalidArgument`] - No installation, or it has no namespace
/// * [`DomainError::NotAvailable`] - The secret is missing or could not be read
pub async fn resolve_domain<S>(
    store: &S,
    installation: Option<&RHMI>,
) -> Result<DomainOverride, DomainError>
where
    S: ClusterStore + ?Sized,
{
    let installation = installation.ok_or_else(|| DomainError::InvalidArgument {
        reason: "installation reference is required".to_string(),
    })?;
    let namespace = installation
        .namespace()
        .ok_or_else(|| DomainError::InvalidArgument {
            reason: format!("installation {} has no namespace", installation.name_any()),
        })?;

    let resource = format!("secret {namespace}/{ADDON_PARAMETERS_SECRET_NAME}");
    let secret = match store
        .get_secret(&namespace, ADDON_PARAMETERS_SECRET_NAME)
        .await
    {
        Ok(Some(secret)) => secret,
        Ok(None) => {
            return Err(DomainError::NotAvailable {
                resource,
                reason: "not found".to_string(),
            })
        }
        Err(e) => {
            return Err(DomainError::NotAvailable {
                resource,
                reason: e.to_string(),
            })
        }
    };

    let Some(raw) = secret
        .data
        .as_ref()
        .and_then(|data| data.get(CUSTOM_DOMAIN_DATA_KEY))
    else {
        debug!(namespace = %namespace, "No custom domain override configured");
        return Ok(DomainOverride::Absent);
    };

    let domain = String::from_utf8_lossy(&raw.0).trim().to_string();
    if is_valid_domain(&domain) {
        debug!(namespace = %namespace, domain = %domain, "Found custom domain override");
        Ok(DomainOverride::Present(domain))
    } else {
        debug!(namespace = %namespace, domain = %domain, "Custom domain override is not a valid domain");
        Ok(DomainOverride::PresentInvalid(domain))
    }
}

/// Pick the `CustomDomain` deciding readiness for `domain`.
///
/// The first claim whose `spec.domain` equals `domain` exactly decides: it
/// matches if its state is `Ready`, otherwise the scan stops with
/// [`DomainError::NoReadyMatch`]. When several claims share a domain with
/// different states the outcome follows `claims` order.
///
/// # Errors
///
/// Returns [`DomainError::NoReadyMatch`] when no claim matches or the first
/// matching claim is not ready.
pub fn match_ready_claim<'a>(
    claims: &'a [CustomDomain],
    domain: &str,
) -> Result<&'a CustomDomain, DomainError> {
    match claims.iter().find(|claim| claim.spec.domain == domain) {
        Some(claim) if claim.is_ready() => Ok(claim),
        Some(claim) => Err(DomainError::NoReadyMatch {
            domain: domain.to_string(),
            state: Some(claim.state().to_string()),
        }),
        None => Err(DomainError::NoReadyMatch {
            domain: domain.to_string(),
            state: None,
        }),
    }
}

/// Find the ready `CustomDomain` claiming `domain`.
///
/// # Errors
///
/// * [`DomainError::InvalidArgument`] - `domain` is empty; the store is not read
/// * [`DomainError::NotAvailable`] - Listing `CustomDomain`s failed
/// * [`DomainError::NoReadyMatch`] - See [`match_ready_claim`]
pub async fn find_ready_custom_domain<S>(store: &S, domain: &str) -> Result<CustomDomain, DomainError>
where
    S: ClusterStore + ?Sized,
{
    if domain.is_empty() {
        return Err(DomainError::InvalidArgument {
            reason: "domain must not be empty".to_string(),
        });
    }

    let claims = store
        .list_custom_domains()
        .await
        .map_err(|e| DomainError::NotAvailable {
            resource: "customdomains".to_string(),
            reason: e.to_string(),
        })?;
    debug!(domain = %domain, claims = claims.len(), "Listed CustomDomain resources");

    match_ready_claim(&claims, domain).cloned()
}

/// Whether a `Ready` `CustomDomain` exists for `domain`.
///
/// Only ever returns `Ok(true)`; every negative outcome is an error so callers
/// can report why.
///
/// # Errors
///
/// Same as [`find_ready_custom_domain`].
pub async fn has_valid_custom_domain_cr<S>(store: &S, domain: &str) -> Result<bool, DomainError>
where
    S: ClusterStore + ?Sized,
{
    find_ready_custom_domain(store, domain).await.map(|_| true)
}

/// Resolve an installation's override and confirm it is ready to serve.
///
/// # Errors
///
/// Any error of [`resolve_domain`], [`DomainError::InvalidDomain`] for an
/// invalid override, or any error of [`find_ready_custom_domain`].
pub async fn verify_custom_domain<S>(
    store: &S,
    installation: Option<&RHMI>,
) -> Result<CustomDomainReport, DomainError>
where
    S: ClusterStore + ?Sized,
{
    let Some(domain) = resolve_domain(store, installation).await?.into_result()? else {
        return Ok(CustomDomainReport::NotConfigured);
    };

    let claim = find_ready_custom_domain(store, &domain).await?;
    Ok(CustomDomainReport::Ready {
        domain,
        claim: Box::new(claim),
    })
}

#[cfg(test)]
#[path = "custom_domain_tests.rs"]
mod custom_domain_tests;
