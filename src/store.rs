// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Read-only access to the cluster objects the checks inspect.
//!
//! The checks never talk to the Kubernetes API directly. They go through
//! [`ClusterStore`], which [`KubeStore`] implements on top of a `kube::Client`
//! and which tests implement with in-memory fixtures.

use crate::constants::{INFRASTRUCTURE_NAME, KUBE_LIST_PAGE_SIZE};
use crate::crd::{CustomDomain, Infrastructure, Postgres, RHMI};
use crate::errors::StoreError;
use async_trait::async_trait;
use k8s_openapi::api::core::v1::{ConfigMap, Secret};
use kube::{api::ListParams, Api, Client, Resource};
use serde::de::DeserializeOwned;
use std::fmt::Debug;
use tracing::debug;

/// Read-only view of the cluster.
///
/// `get_*` methods return `Ok(None)` when the object does not exist, so callers
/// can tell absence from a failed request.
#[async_trait]
pub trait ClusterStore: Send + Sync {
    /// Fetch a secret by namespace and name.
    async fn get_secret(&self, namespace: &str, name: &str) -> Result<Option<Secret>, StoreError>;

    /// Fetch a config map by namespace and name.
    async fn get_config_map(
        &self,
        namespace: &str,
        name: &str,
    ) -> Result<Option<ConfigMap>, StoreError>;

    /// List every `CustomDomain` in the cluster.
    async fn list_custom_domains(&self) -> Result<Vec<CustomDomain>, StoreError>;

    /// List installations in a namespace.
    async fn list_installations(&self, namespace: &str) -> Result<Vec<RHMI>, StoreError>;

    /// List `Postgres` requests in a namespace.
    async fn list_postgres(&self, namespace: &str) -> Result<Vec<Postgres>, StoreError>;

    /// Fetch the cluster `Infrastructure` resource.
    async fn get_infrastructure(&self) -> Result<Option<Infrastructure>, StoreError>;
}

/// [`ClusterStore`] backed by the Kubernetes API.
#[derive(Clone)]
pub struct KubeStore {
    client: Client,
}

impl KubeStore {
    #[must_use]
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ClusterStore for KubeStore {
    async fn get_secret(&self, namespace: &str, name: &str) -> Result<Option<Secret>, StoreError> {
        let api: Api<Secret> = Api::namespaced(self.client.clone(), namespace);
        get_optional(&api, name, &format!("secret {namespace}/{name}")).await
    }

    async fn get_config_map(
        &self,
        namespace: &str,
        name: &str,
    ) -> Result<Option<ConfigMap>, StoreError> {
        let api: Api<ConfigMap> = Api::namespaced(self.client.clone(), namespace);
        get_optional(&api, name, &format!("configmap {namespace}/{name}")).await
    }

    async fn list_custom_domains(&self) -> Result<Vec<CustomDomain>, StoreError> {
        let api: Api<CustomDomain> = Api::all(self.client.clone());
        list_paginated(&api, "customdomains").await
    }

    async fn list_installations(&self, namespace: &str) -> Result<Vec<RHMI>, StoreError> {
        let api: Api<RHMI> = Api::namespaced(self.client.clone(), namespace);
        list_paginated(&api, &format!("rhmis in {namespace}")).await
    }

    async fn list_postgres(&self, namespace: &str) -> Result<Vec<Postgres>, StoreError> {
        let api: Api<Postgres> = Api::namespaced(self.client.clone(), namespace);
        list_paginated(&api, &format!("postgres in {namespace}")).await
    }

    async fn get_infrastructure(&self) -> Result<Option<Infrastructure>, StoreError> {
        let api: Api<Infrastructure> = Api::all(self.client.clone());
        get_optional(
            &api,
            INFRASTRUCTURE_NAME,
            &format!("infrastructure {INFRASTRUCTURE_NAME}"),
        )
        .await
    }
}

async fn get_optional<K>(api: &Api<K>, name: &str, resource: &str) -> Result<Option<K>, StoreError>
where
    K: Resource + Clone + DeserializeOwned + Debug,
{
    debug!(resource = %resource, "Fetching from Kubernetes API");
    api.get_opt(name).await.map_err(|source| StoreError::Api {
        resource: resource.to_string(),
        source,
    })
}

/// List all resources, following `continue` tokens page by page.
async fn list_paginated<K>(api: &Api<K>, resource: &str) -> Result<Vec<K>, StoreError>
where
    K: Resource + Clone + DeserializeOwned + Debug,
{
    let mut params = ListParams::default().limit(KUBE_LIST_PAGE_SIZE);
    let mut items = Vec::new();
    let mut pages = 0;

    loop {
        pages += 1;
        let page = api.list(&params).await.map_err(|source| StoreError::Api {
            resource: resource.to_string(),
            source,
        })?;
        items.extend(page.items);

        match page.metadata.continue_ {
            Some(token) if !token.is_empty() => params = params.continue_token(&token),
            _ => break,
        }
    }

    debug!(
        resource = %resource,
        pages,
        total_items = items.len(),
        "Completed paginated list"
    );

    Ok(items)
}
