//! Server capability metadata consumed by the completion core.
//!
//! The core never reads a raw CapabilityStatement; it sees the narrow
//! [`MetadataSource`] interface. A parsed document becomes an immutable
//! [`CapabilitySnapshot`], and the long-lived [`CapabilityStore`] swaps
//! whole snapshots in atomically so readers never observe a half-loaded
//! state. An absent snapshot is not an error — it just means fewer
//! suggestions.

mod statement;

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use tracing::{debug, warn};

use crate::error::{CapabilityError, Result};
use crate::registry::ParamType;

pub use statement::{CapabilityStatement, RestResource, RestSearchParam};

/// Search parameter declared by the server for one resource type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchParam {
    pub name: String,
    pub param_type: ParamType,
    pub documentation: Option<String>,
}

/// Per-resource-type capability data.
#[derive(Debug, Clone, Default)]
struct ResourceMetadata {
    search_params: Vec<SearchParam>,
    include_paths: Vec<String>,
    rev_include_paths: Vec<String>,
}

/// Read-only interface the completion core consumes.
///
/// Implemented both by an immutable snapshot (tests, one-shot CLI runs)
/// and by the swap-in store (interactive sessions).
pub trait MetadataSource: Send + Sync {
    /// Search parameters declared for `resource_type`; `None` when the
    /// resource (or the whole capability document) is unknown.
    fn search_parameters(&self, resource_type: &str) -> Option<Vec<SearchParam>>;

    /// Supported `_include` values for `resource_type`.
    fn include_paths(&self, resource_type: &str) -> Vec<String>;

    /// Supported `_revinclude` values for `resource_type`.
    fn rev_include_paths(&self, resource_type: &str) -> Vec<String>;
}

/// Immutable snapshot of one capability document.
#[derive(Debug, Clone, Default)]
pub struct CapabilitySnapshot {
    resources: HashMap<String, ResourceMetadata>,
}

impl CapabilitySnapshot {
    /// Create an empty snapshot.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a CapabilityStatement JSON document into a snapshot.
    pub fn from_json(json: &str) -> Result<Self> {
        let stmt: CapabilityStatement = serde_json::from_str(json)
            .map_err(|e| CapabilityError::InvalidDocument(e.to_string()))?;
        Ok(Self::from_statement(&stmt))
    }

    /// Build a snapshot from a parsed statement.
    pub fn from_statement(stmt: &CapabilityStatement) -> Self {
        let mut snapshot = Self::new();

        for rest in stmt.server_rests() {
            for resource in &rest.resource {
                let params = resource
                    .search_params
                    .iter()
                    .map(|p| SearchParam {
                        name: p.name.clone(),
                        param_type: p.param_type,
                        documentation: p.documentation.clone(),
                    })
                    .collect();
                snapshot.add_resource(
                    &resource.resource_type,
                    params,
                    resource.search_includes.clone(),
                    resource.search_rev_includes.clone(),
                );
            }
        }

        if snapshot.resources.is_empty() {
            warn!("capability statement declares no server resources");
        } else {
            debug!(resources = snapshot.resources.len(), "capability snapshot built");
        }

        snapshot
    }

    /// Register a resource type with its declared parameters and include
    /// paths. Also the hook for building synthetic snapshots in tests.
    pub fn add_resource(
        &mut self,
        resource_type: &str,
        search_params: Vec<SearchParam>,
        include_paths: Vec<String>,
        rev_include_paths: Vec<String>,
    ) {
        self.resources.insert(
            resource_type.to_string(),
            ResourceMetadata {
                search_params,
                include_paths,
                rev_include_paths,
            },
        );
    }

    /// Number of resource types in the snapshot.
    pub fn resource_count(&self) -> usize {
        self.resources.len()
    }
}

impl MetadataSource for CapabilitySnapshot {
    fn search_parameters(&self, resource_type: &str) -> Option<Vec<SearchParam>> {
        self.resources
            .get(resource_type)
            .map(|r| r.search_params.clone())
    }

    fn include_paths(&self, resource_type: &str) -> Vec<String> {
        self.resources
            .get(resource_type)
            .map(|r| r.include_paths.clone())
            .unwrap_or_default()
    }

    fn rev_include_paths(&self, resource_type: &str) -> Vec<String> {
        self.resources
            .get(resource_type)
            .map(|r| r.rev_include_paths.clone())
            .unwrap_or_default()
    }
}

/// Long-lived holder of the current snapshot.
///
/// A single external writer replaces the whole snapshot; readers clone the
/// `Arc` and keep a consistent view for the duration of a call.
#[derive(Debug, Default)]
pub struct CapabilityStore {
    current: RwLock<Option<Arc<CapabilitySnapshot>>>,
}

impl CapabilityStore {
    /// Create a store with no snapshot loaded.
    pub fn new() -> Self {
        Self::default()
    }

    /// Swap in a new snapshot.
    pub fn load(&self, snapshot: CapabilitySnapshot) {
        debug!(resources = snapshot.resource_count(), "capability snapshot loaded");
        *self.current.write().unwrap() = Some(Arc::new(snapshot));
    }

    /// Parse a JSON document and swap the resulting snapshot in.
    pub fn load_json(&self, json: &str) -> Result<()> {
        let snapshot = CapabilitySnapshot::from_json(json)?;
        self.load(snapshot);
        Ok(())
    }

    /// Drop the current snapshot.
    pub fn clear(&self) {
        *self.current.write().unwrap() = None;
    }

    /// Whether a snapshot is currently loaded.
    pub fn is_loaded(&self) -> bool {
        self.current.read().unwrap().is_some()
    }

    /// Current snapshot, if any.
    pub fn snapshot(&self) -> Option<Arc<CapabilitySnapshot>> {
        self.current.read().unwrap().clone()
    }
}

impl MetadataSource for CapabilityStore {
    fn search_parameters(&self, resource_type: &str) -> Option<Vec<SearchParam>> {
        self.snapshot()
            .and_then(|s| s.search_parameters(resource_type))
    }

    fn include_paths(&self, resource_type: &str) -> Vec<String> {
        self.snapshot()
            .map(|s| s.include_paths(resource_type))
            .unwrap_or_default()
    }

    fn rev_include_paths(&self, resource_type: &str) -> Vec<String> {
        self.snapshot()
            .map(|s| s.rev_include_paths(resource_type))
            .unwrap_or_default()
    }
}
