// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! In-memory [`ClusterStore`] for unit tests.

use crate::crd::{
    CustomDomain, CustomDomainSpec, CustomDomainStatus, GcpPlatformStatus, Infrastructure,
    InfrastructureSpec, InfrastructureStatus, PlatformStatus, Postgres, PostgresSpec, RHMISpec,
    RHMI,
};
use crate::errors::StoreError;
use crate::store::ClusterStore;
use async_trait::async_trait;
use k8s_openapi::api::core::v1::{ConfigMap, Secret};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use k8s_openapi::ByteString;
use kube::ResourceExt;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Fixture store. Setting `unavailable` makes every call fail.
#[derive(Default)]
pub struct FakeStore {
    pub secrets: Vec<Secret>,
    pub config_maps: Vec<ConfigMap>,
    pub custom_domains: Vec<CustomDomain>,
    pub installations: Vec<RHMI>,
    pub postgres: Vec<Postgres>,
    pub infrastructure: Option<Infrastructure>,
    pub unavailable: bool,
    pub calls: AtomicUsize,
}

impl FakeStore {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn check(&self, resource: &str) -> Result<(), StoreError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.unavailable {
            return Err(StoreError::Unavailable {
                resource: resource.to_string(),
                reason: "connection refused".to_string(),
            });
        }
        Ok(())
    }
}

fn find_namespaced<K: ResourceExt + Clone>(items: &[K], namespace: &str, name: &str) -> Option<K> {
    items
        .iter()
        .find(|item| item.namespace().as_deref() == Some(namespace) && item.name_any() == name)
        .cloned()
}

#[async_trait]
impl ClusterStore for FakeStore {
    async fn get_secret(&self, namespace: &str, name: &str) -> Result<Option<Secret>, StoreError> {
        self.check("secret")?;
        Ok(find_namespaced(&self.secrets, namespace, name))
    }

    async fn get_config_map(
        &self,
        namespace: &str,
        name: &str,
    ) -> Result<Option<ConfigMap>, StoreError> {
        self.check("configmap")?;
        Ok(find_namespaced(&self.config_maps, namespace, name))
    }

    async fn list_custom_domains(&self) -> Result<Vec<CustomDomain>, StoreError> {
        self.check("customdomains")?;
        Ok(self.custom_domains.clone())
    }

    async fn list_installations(&self, namespace: &str) -> Result<Vec<RHMI>, StoreError> {
        self.check("rhmis")?;
        Ok(self
            .installations
            .iter()
            .filter(|i| i.namespace().as_deref() == Some(namespace))
            .cloned()
            .collect())
    }

    async fn list_postgres(&self, namespace: &str) -> Result<Vec<Postgres>, StoreError> {
        self.check("postgres")?;
        Ok(self
            .postgres
            .iter()
            .filter(|p| p.namespace().as_deref() == Some(namespace))
            .cloned()
            .collect())
    }

    async fn get_infrastructure(&self) -> Result<Option<Infrastructure>, StoreError> {
        self.check("infrastructure")?;
        Ok(self.infrastructure.clone())
    }
}

pub fn meta(name: &str, namespace: Option<&str>) -> ObjectMeta {
    ObjectMeta {
        name: Some(name.to_string()),
        namespace: namespace.map(str::to_string),
        ..Default::default()
    }
}

pub fn secret(namespace: &str, name: &str, data: &[(&str, &str)]) -> Secret {
    Secret {
        metadata: meta(name, Some(namespace)),
        data: Some(
            data.iter()
                .map(|(k, v)| ((*k).to_string(), ByteString(v.as_bytes().to_vec())))
                .collect(),
        ),
        ..Default::default()
    }
}

pub fn config_map(namespace: &str, name: &str, data: &[(&str, &str)]) -> ConfigMap {
    ConfigMap {
        metadata: meta(name, Some(namespace)),
        data: Some(
            data.iter()
                .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
                .collect(),
        ),
        ..Default::default()
    }
}

pub fn installation(namespace: &str, installation_type: &str) -> RHMI {
    let mut rhmi = RHMI::new(
        "managed-api",
        RHMISpec {
            installation_type: installation_type.to_string(),
            routing_subdomain: None,
        },
    );
    rhmi.metadata.namespace = Some(namespace.to_string());
    rhmi
}

pub fn custom_domain(name: &str, domain: &str, state: &str) -> CustomDomain {
    let mut claim = CustomDomain::new(
        name,
        CustomDomainSpec {
            domain: domain.to_string(),
            ..Default::default()
        },
    );
    claim.status = Some(CustomDomainStatus {
        state: state.to_string(),
        ..Default::default()
    });
    claim
}

pub fn postgres(namespace: &str, name: &str, resource_id: Option<&str>) -> Postgres {
    let mut pg = Postgres::new(
        name,
        PostgresSpec {
            tier: "production".to_string(),
            strategy_type: "gcp".to_string(),
            secret_ref: None,
        },
    );
    pg.metadata.namespace = Some(namespace.to_string());
    if let Some(id) = resource_id {
        pg.metadata.annotations = Some(BTreeMap::from([(
            "resourceIdentifier".to_string(),
            id.to_string(),
        )]));
    }
    pg
}

pub fn gcp_infrastructure(cluster_id: &str, project_id: &str) -> Infrastructure {
    let mut infra = Infrastructure::new("cluster", InfrastructureSpec {});
    infra.status = Some(InfrastructureStatus {
        infrastructure_name: cluster_id.to_string(),
        platform_status: Some(PlatformStatus {
            platform_type: "GCP".to_string(),
            gcp: Some(GcpPlatformStatus {
                project_id: project_id.to_string(),
                region: "europe-west2".to_string(),
            }),
        }),
    });
    infra
}
