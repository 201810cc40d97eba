//! Entity projection and authorization collaborators.
//!
//! The traversal engine never reads entity attributes or evaluates access
//! policy itself. It materializes vertices through an [`EntityProjector`]
//! and filters them through the projector's visibility predicate, and it
//! performs exactly one [`Authorizer`] check against the traversal root
//! before any traversal begins. The evaluation policy behind both
//! (access control, soft-delete state, and so on) is external to this crate.

use crate::error::Result;
use crate::graph::Vertex;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use tokio::sync::RwLock;

/// Projected, access-filtered summary of an entity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntitySummary {
    /// Entity id.
    pub id: String,
    /// Entity type name.
    pub type_name: String,
    /// Display name, when the store knows one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    /// Requested attributes.
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub attributes: HashMap<String, serde_json::Value>,
}

impl EntitySummary {
    /// Creates a summary with no attributes.
    pub fn new(id: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            type_name: type_name.into(),
            display_name: None,
            attributes: HashMap::new(),
        }
    }
}

/// Action checked by the authorization collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccessAction {
    /// Read entity lineage.
    Read,
}

impl AccessAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccessAction::Read => "read",
        }
    }
}

/// Turns vertices into entity summaries and evaluates the per-vertex
/// visibility predicate consulted during traversal.
#[async_trait]
pub trait EntityProjector: Send + Sync {
    /// Projects a vertex into a summary carrying the requested attributes.
    ///
    /// A projection failure aborts the whole traversal; entities are never
    /// silently omitted.
    async fn project(&self, vertex: &Vertex, attributes: &[String]) -> Result<EntitySummary>;

    /// Visibility predicate. A vertex failing it is filtered from results
    /// and the traversal does not recurse past it. This is not a second
    /// authorization call; policy evaluation is the implementor's concern.
    async fn visible(&self, vertex: &Vertex) -> bool;
}

/// Authorization check performed once per request, before traversal.
#[async_trait]
pub trait Authorizer: Send + Sync {
    /// Returns `Ok(())` when the action is allowed, or
    /// [`MeridianError::NotAuthorized`](crate::MeridianError::NotAuthorized)
    /// when denied.
    async fn authorize(&self, entity: &EntitySummary, action: AccessAction) -> Result<()>;
}

/// Authorizer that allows every request.
#[derive(Debug, Clone, Copy, Default)]
pub struct AllowAll;

#[async_trait]
impl Authorizer for AllowAll {
    async fn authorize(&self, _entity: &EntitySummary, _action: AccessAction) -> Result<()> {
        Ok(())
    }
}

/// In-memory projector over catalog attributes.
///
/// Holds per-entity attributes and an explicit set of hidden entity ids
/// standing in for an external visibility policy.
#[derive(Debug, Default)]
pub struct CatalogProjector {
    attributes: RwLock<HashMap<String, HashMap<String, serde_json::Value>>>,
    hidden: RwLock<HashSet<String>>,
}

impl CatalogProjector {
    /// Creates an empty projector; every vertex is visible.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets an attribute for an entity.
    pub async fn set_attribute(&self, entity_id: &str, key: &str, value: serde_json::Value) {
        let mut attributes = self.attributes.write().await;
        attributes
            .entry(entity_id.to_string())
            .or_default()
            .insert(key.to_string(), value);
    }

    /// Marks an entity as failing the visibility predicate.
    pub async fn hide(&self, entity_id: &str) {
        self.hidden.write().await.insert(entity_id.to_string());
    }

    /// Makes a previously hidden entity visible again.
    pub async fn unhide(&self, entity_id: &str) {
        self.hidden.write().await.remove(entity_id);
    }
}

#[async_trait]
impl EntityProjector for CatalogProjector {
    async fn project(&self, vertex: &Vertex, attributes: &[String]) -> Result<EntitySummary> {
        let all = self.attributes.read().await;
        let known = all.get(&vertex.id);

        let display_name = known
            .and_then(|attrs| attrs.get("name"))
            .and_then(|v| v.as_str())
            .map(|s| s.to_string());

        let mut projected = HashMap::new();
        if let Some(attrs) = known {
            for key in attributes {
                if let Some(value) = attrs.get(key) {
                    projected.insert(key.clone(), value.clone());
                }
            }
        }

        Ok(EntitySummary {
            id: vertex.id.clone(),
            type_name: vertex.type_name.clone(),
            display_name,
            attributes: projected,
        })
    }

    async fn visible(&self, vertex: &Vertex) -> bool {
        !self.hidden.read().await.contains(&vertex.id)
    }
}
