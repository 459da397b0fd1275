//! Krapper kubehub: list cluster objects of an arbitrary kind.
//!
//! The HTTP layer only sees the [`ResourceLister`] trait; [`KubeLister`] is the
//! live implementation on top of kube discovery and `Api<DynamicObject>`.

#![forbid(unsafe_code)]

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use kube::{
    api::{Api, ListParams},
    core::{DynamicObject, GroupVersionKind},
    discovery::{ApiCapabilities, Discovery, Scope},
    Client,
};
use tokio::sync::Mutex;
use tracing::{debug, info};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ListError {
    #[error("no resource mapping for {api_version}/{kind}")]
    NotFound { api_version: String, kind: String },
    #[error("invalid group/version '{0}'")]
    InvalidGroupVersion(String),
    #[error("listing failed: {0}")]
    ListFailure(String),
}

#[async_trait]
pub trait ResourceLister: Send + Sync {
    /// List every object of `api_version`/`kind` matching all `selector`
    /// labels, in `namespace` when given and the kind is namespaced.
    async fn list_resources(
        &self,
        api_version: &str,
        kind: &str,
        namespace: Option<&str>,
        selector: &BTreeMap<String, String>,
    ) -> Result<Vec<serde_json::Value>, ListError>;
}

/// Split `group/version` (or a bare core `version`).
pub fn parse_group_version(api_version: &str) -> Result<(String, String), ListError> {
    let invalid = || ListError::InvalidGroupVersion(api_version.to_string());
    let parts: Vec<_> = api_version.split('/').collect();
    match parts.as_slice() {
        [version] if !version.is_empty() => Ok((String::new(), version.to_string())),
        [group, version] if !group.is_empty() && !version.is_empty() => Ok((group.to_string(), version.to_string())),
        _ => Err(invalid()),
    }
}

/// `k1=v1,k2=v2` in key order; empty for an empty map.
pub fn label_selector(selector: &BTreeMap<String, String>) -> String {
    selector.iter().map(|(k, v)| format!("{k}={v}")).collect::<Vec<_>>().join(",")
}

/// Namespace to scope the request to: cluster-scoped kinds ignore it.
pub fn target_namespace(namespaced: bool, namespace: Option<&str>) -> Option<&str> {
    namespace.filter(|ns| namespaced && !ns.is_empty())
}

pub fn strip_managed_fields(v: &mut serde_json::Value) {
    if let Some(meta) = v.get_mut("metadata") {
        if let Some(obj) = meta.as_object_mut() {
            obj.remove("managedFields");
        }
    }
}

/// Lister backed by a live cluster connection. Discovery is cached and
/// refreshed once when a kind is not found (e.g. a CRD installed later).
pub struct KubeLister {
    client: Client,
    discovery: Mutex<Option<Arc<Discovery>>>,
}

impl KubeLister {
    pub fn new(client: Client) -> Self { Self { client, discovery: Mutex::new(None) } }

    /// Connect using the ambient kubeconfig or in-cluster configuration.
    pub async fn try_default() -> Result<Self, kube::Error> {
        let client = Client::try_default().await?;
        info!("kubernetes client ready");
        Ok(Self::new(client))
    }

    async fn discovery(&self, refresh: bool) -> Result<Arc<Discovery>, ListError> {
        let mut cached = self.discovery.lock().await;
        if let (false, Some(d)) = (refresh, cached.as_ref()) {
            return Ok(Arc::clone(d));
        }
        let fresh = Discovery::new(self.client.clone())
            .run()
            .await
            .map_err(|e| ListError::ListFailure(format!("discovery: {e}")))?;
        debug!(groups = fresh.groups().count(), "api discovery refreshed");
        let fresh = Arc::new(fresh);
        *cached = Some(Arc::clone(&fresh));
        Ok(fresh)
    }

    async fn resolve(&self, gvk: &GroupVersionKind) -> Result<Option<(kube::core::ApiResource, ApiCapabilities)>, ListError> {
        if let Some(found) = self.discovery(false).await?.resolve_gvk(gvk) {
            return Ok(Some(found));
        }
        Ok(self.discovery(true).await?.resolve_gvk(gvk))
    }
}

#[async_trait]
impl ResourceLister for KubeLister {
    async fn list_resources(
        &self,
        api_version: &str,
        kind: &str,
        namespace: Option<&str>,
        selector: &BTreeMap<String, String>,
    ) -> Result<Vec<serde_json::Value>, ListError> {
        let (group, version) = parse_group_version(api_version)?;
        let gvk = GroupVersionKind::gvk(&group, &version, kind);
        let (ar, caps) = self
            .resolve(&gvk)
            .await?
            .ok_or_else(|| ListError::NotFound { api_version: api_version.to_string(), kind: kind.to_string() })?;

        let namespaced = matches!(caps.scope, Scope::Namespaced);
        let api: Api<DynamicObject> = match target_namespace(namespaced, namespace) {
            Some(ns) => Api::namespaced_with(self.client.clone(), ns, &ar),
            None => Api::all_with(self.client.clone(), &ar),
        };
        let labels = label_selector(selector);
        let mut lp = ListParams::default();
        if !labels.is_empty() {
            lp = lp.labels(&labels);
        }
        let list = api.list(&lp).await.map_err(|e| ListError::ListFailure(e.to_string()))?;
        debug!(api_version, kind, ns = ?namespace, selector = %labels, count = list.items.len(), "resources listed");

        list.items
            .iter()
            .map(|o| {
                let mut raw = serde_json::to_value(o).map_err(|e| ListError::ListFailure(format!("encoding {kind}: {e}")))?;
                strip_managed_fields(&mut raw);
                Ok(raw)
            })
            .collect()
    }
}
