//! Lineage resolution service.
//!
//! Entry point tying the pieces together: the request normalizer validates
//! and classifies the traversal root and builds the immutable per-request
//! context, the configured strategy (native walker or script adapter) runs
//! one sub-walk per direction, and the aggregator merges sub-walk results
//! for bidirectional requests.

use crate::config::{LineageConfig, TraversalStrategy};
use crate::context::{LineageContext, LineageRequest, UNBOUNDED_DEPTH};
use crate::entity::{AccessAction, Authorizer, EntityProjector};
use crate::error::{MeridianError, Result};
use crate::graph::GraphStore;
use crate::model::{LineageDirection, LineageGraph};
use crate::typedef::{DATASET_SUPER_TYPE, PROCESS_SUPER_TYPE};
use crate::{script, walker};
use std::sync::Arc;
use tracing::debug;

/// The lineage resolution engine.
///
/// Holds read-only collaborators; concurrent requests share no mutable
/// state and may run simultaneously.
pub struct LineageService {
    store: Arc<dyn GraphStore>,
    projector: Arc<dyn EntityProjector>,
    authorizer: Arc<dyn Authorizer>,
    config: LineageConfig,
}

impl LineageService {
    /// Creates the service, validating its configuration.
    pub fn new(
        store: Arc<dyn GraphStore>,
        projector: Arc<dyn EntityProjector>,
        authorizer: Arc<dyn Authorizer>,
        config: LineageConfig,
    ) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            store,
            projector,
            authorizer,
            config,
        })
    }

    /// Resolves lineage with process vertices shown and default attributes.
    pub async fn lineage(
        &self,
        root_id: &str,
        direction: LineageDirection,
        depth: u32,
    ) -> Result<LineageGraph> {
        self.resolve_lineage(LineageRequest::new(root_id, direction, depth))
            .await
    }

    /// Resolves the provenance graph for a request.
    ///
    /// Fails before any traversal when the root does not resolve, is
    /// neither dataset- nor process-like, asks for process compression on a
    /// process root, or fails the one-time authorization check.
    pub async fn resolve_lineage(&self, request: LineageRequest) -> Result<LineageGraph> {
        debug!(
            root = %request.root_id,
            direction = ?request.direction,
            depth = request.depth,
            hide_process = request.hide_process,
            "Resolving lineage"
        );

        let context = self.normalize(&request).await?;

        // Compression needs per-pair process identity, which the script
        // response does not expose; such requests always run natively.
        let use_script = self.config.strategy == TraversalStrategy::Script && !context.hide_process;
        if self.config.strategy == TraversalStrategy::Script && context.hide_process {
            debug!(root = %context.root_id, "Hide-process request runs on the native walker");
        }

        match context.direction {
            LineageDirection::Input | LineageDirection::Output => {
                self.sub_walk(&context, context.direction, use_script).await
            }
            LineageDirection::Both => {
                let mut merged = self
                    .sub_walk(&context, LineageDirection::Input, use_script)
                    .await?;
                let downstream = self
                    .sub_walk(&context, LineageDirection::Output, use_script)
                    .await?;
                merged.merge(downstream);
                merged.direction = LineageDirection::Both;
                Ok(merged)
            }
        }
    }

    async fn sub_walk(
        &self,
        context: &LineageContext,
        direction: LineageDirection,
        use_script: bool,
    ) -> Result<LineageGraph> {
        if use_script {
            script::run(
                self.store.as_ref(),
                self.projector.as_ref(),
                context,
                direction,
            )
            .await
        } else {
            walker::run(
                self.store.as_ref(),
                self.projector.as_ref(),
                context,
                direction,
            )
            .await
        }
    }

    /// Validates and classifies the traversal root, authorizes the request,
    /// and builds the immutable traversal context.
    async fn normalize(&self, request: &LineageRequest) -> Result<LineageContext> {
        let root = self
            .store
            .find_vertex(&request.root_id)
            .await
            .ok_or_else(|| MeridianError::EntityNotFound(request.root_id.clone()))?;

        let attributes = if request.attributes.is_empty() {
            self.config.default_attributes.clone()
        } else {
            request.attributes.clone()
        };

        // The single authorization check of the request; visibility during
        // traversal is enforced only by the projector's predicate.
        let summary = self.projector.project(&root, &attributes).await?;
        self.authorizer
            .authorize(&summary, AccessAction::Read)
            .await?;

        let is_dataset = self.store.is_of_category(&root.type_name, DATASET_SUPER_TYPE);
        let is_process = self.store.is_of_category(&root.type_name, PROCESS_SUPER_TYPE);

        if !is_dataset && !is_process {
            return Err(MeridianError::UnsupportedEntityType {
                guid: root.id,
                type_name: root.type_name,
            });
        }

        if request.hide_process && !is_dataset {
            return Err(MeridianError::IncompatibleRequest {
                guid: root.id,
                reason: "hide_process requires a dataset root; a process has nothing to hide \
                         relative to itself"
                    .to_string(),
            });
        }

        let requested_depth = self.config.clamp_depth(request.depth);
        let depth = if requested_depth == 0 {
            UNBOUNDED_DEPTH
        } else {
            requested_depth as i32
        };

        Ok(LineageContext {
            root_id: request.root_id.clone(),
            direction: request.direction,
            requested_depth,
            depth,
            hide_process: request.hide_process,
            attributes,
            // A type extending both supertypes traverses as a dataset.
            is_dataset,
            root_vertex: if is_dataset { Some(root) } else { None },
        })
    }
}
