// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! GCP REST access for the network and Cloud SQL checks.
//!
//! Only the two read calls the checks need are modelled, behind [`GcpApi`] so
//! the checks can run against fixtures. [`GcpRestClient`] implements them with
//! `reqwest` and an OAuth2 bearer token.

use crate::constants::{GCP_COMPUTE_ENDPOINT, GCP_SQLADMIN_ENDPOINT};
use crate::errors::CloudError;
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::debug;
use url::Url;

/// A global address (compute `addresses` resource).
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    #[serde(default)]
    pub name: String,

    /// First IP of the range
    #[serde(default)]
    pub address: String,

    pub prefix_length: Option<u8>,

    /// `RESERVING`, `RESERVED` or `IN_USE`
    #[serde(default)]
    pub status: String,

    #[serde(default)]
    pub purpose: String,

    #[serde(default)]
    pub network: String,
}

/// A Cloud SQL instance.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SqlInstance {
    pub name: String,

    #[serde(default)]
    pub database_version: String,

    #[serde(default)]
    pub state: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SqlInstanceList {
    #[serde(default)]
    items: Vec<SqlInstance>,
    next_page_token: Option<String>,
}

/// GCP reads the checks depend on.
#[async_trait]
pub trait GcpApi: Send + Sync {
    /// Fetch a global address by name.
    async fn get_global_address(&self, project: &str, name: &str) -> Result<Address, CloudError>;

    /// List every Cloud SQL instance in a project.
    async fn list_sql_instances(&self, project: &str) -> Result<Vec<SqlInstance>, CloudError>;
}

/// [`GcpApi`] over the public GCP REST endpoints.
#[derive(Debug, Clone)]
pub struct GcpRestClient {
    http: reqwest::Client,
    token: String,
    compute_endpoint: String,
    sqladmin_endpoint: String,
}

impl GcpRestClient {
    /// Create a client authenticating with an OAuth2 access token.
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            token: token.into(),
            compute_endpoint: GCP_COMPUTE_ENDPOINT.to_string(),
            sqladmin_endpoint: GCP_SQLADMIN_ENDPOINT.to_string(),
        }
    }

    /// Point both APIs at other endpoints (private access, emulators).
    #[must_use]
    pub fn with_endpoints(mut self, compute: &str, sqladmin: &str) -> Self {
        self.compute_endpoint = compute.trim_end_matches('/').to_string();
        self.sqladmin_endpoint = sqladmin.trim_end_matches('/').to_string();
        self
    }

    /// GET `url` and decode JSON; `Ok(None)` on 404.
    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<Option<T>, CloudError> {
        let request_error = |reason: String| CloudError::Request {
            url: url.to_string(),
            reason,
        };

        debug!(url = %url, "Calling GCP API");
        let response = self
            .http
            .get(url)
            .bearer_auth(&self.token)
            .send()
            .await
            .map_err(|e| request_error(e.to_string()))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(request_error(format!("HTTP {status}: {body}")));
        }

        response
            .json()
            .await
            .map(Some)
            .map_err(|e| request_error(e.to_string()))
    }
}

#[async_trait]
impl GcpApi for GcpRestClient {
    async fn get_global_address(&self, project: &str, name: &str) -> Result<Address, CloudError> {
        let url = format!(
            "{}/compute/v1/projects/{project}/global/addresses/{name}",
            self.compute_endpoint
        );
        self.get_json(&url)
            .await?
            .ok_or_else(|| CloudError::ResourceNotFound {
                resource: format!("global address {project}/{name}"),
            })
    }

    async fn list_sql_instances(&self, project: &str) -> Result<Vec<SqlInstance>, CloudError> {
        let base = format!(
            "{}/sql/v1beta4/projects/{project}/instances",
            self.sqladmin_endpoint
        );
        let mut instances = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let url = match &page_token {
                Some(token) => Url::parse_with_params(&base, &[("pageToken", token.as_str())])
                    .map_err(|e| CloudError::Request {
                        url: base.clone(),
                        reason: e.to_string(),
                    })?
                    .to_string(),
                None => base.clone(),
            };
            let page: SqlInstanceList =
                self.get_json(&url)
                    .await?
                    .ok_or_else(|| CloudError::ResourceNotFound {
                        resource: format!("project {project}"),
                    })?;
            instances.extend(page.items);

            match page.next_page_token {
                Some(token) if !token.is_empty() => page_token = Some(token),
                _ => break,
            }
        }

        debug!(project = %project, instances = instances.len(), "Listed Cloud SQL instances");
        Ok(instances)
    }
}

#[cfg(test)]
#[path = "client_tests.rs"]
mod client_tests;
