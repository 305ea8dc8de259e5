//! Reference resolution
//!
//! Callers name entities by title, by path or by raw id. [`EntityIndex`]
//! turns such a reference into the unique id of a node of one kind.

use graph_rbac_store::{GraphStore, Node, NodeFilter, NodeId, NodeKind};
use tracing::debug;

use crate::error::{RbacError, RbacResult};
use crate::path::{self, ROOT_PATH};

/// At most this many candidates are fetched: one more than a unique match
/// needs, so ambiguity is detected without a full scan.
const CANDIDATE_LIMIT: usize = 2;

/// Resolves references to node ids within one kind.
pub struct EntityIndex<'a, S: ?Sized> {
    store: &'a S,
    kind: NodeKind,
}

impl<'a, S: GraphStore + ?Sized> EntityIndex<'a, S> {
    /// Create an index over `kind` nodes of `store`.
    pub fn new(store: &'a S, kind: NodeKind) -> Self {
        Self { store, kind }
    }

    /// Kind this index resolves.
    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    /// Resolve a reference matching either a title or a path.
    ///
    /// Both fields are matched in a single scan; a node matching on both
    /// counts once.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(id))` for exactly one match
    /// - `Ok(None)` when nothing matches
    /// - `Err(RbacError::AmbiguousReference)` when more than one node matches
    pub async fn return_id(&self, reference: &str) -> RbacResult<Option<NodeId>> {
        let filter = NodeFilter::TitleOrPath {
            title: reference.to_string(),
            path: path::normalize(reference),
        };
        self.unique(reference, &filter).await
    }

    /// Resolve a reference by title only.
    pub async fn title_id(&self, title: &str) -> RbacResult<Option<NodeId>> {
        self.unique(title, &NodeFilter::Title(title.to_string()))
            .await
    }

    /// Resolve a reference by path only. The path is normalized first.
    pub async fn path_id(&self, reference: &str) -> RbacResult<Option<NodeId>> {
        self.unique(reference, &NodeFilter::Path(path::normalize(reference)))
            .await
    }

    /// Id of the kind's root node, if one exists.
    pub async fn root_id(&self) -> RbacResult<Option<NodeId>> {
        self.path_id(ROOT_PATH).await
    }

    /// Resolve a reference, treating it as a literal id when nothing matches.
    ///
    /// This lets call sites pass titles, paths and raw ids interchangeably.
    /// Ambiguity is still an error.
    pub async fn resolve_or_literal(&self, reference: &str) -> RbacResult<NodeId> {
        Ok(self
            .return_id(reference)
            .await?
            .unwrap_or_else(|| NodeId::from(reference)))
    }

    async fn unique(&self, reference: &str, filter: &NodeFilter) -> RbacResult<Option<NodeId>> {
        let nodes = self
            .store
            .find_nodes(self.kind, filter, Some(CANDIDATE_LIMIT))
            .await?;
        let resolved = single(self.kind, reference, nodes)?;

        debug!(
            kind = %self.kind,
            reference = %reference,
            resolved = ?resolved,
            "Resolved reference"
        );
        Ok(resolved)
    }
}

fn single(kind: NodeKind, reference: &str, nodes: Vec<Node>) -> RbacResult<Option<NodeId>> {
    let mut ids = nodes.into_iter().map(|node| node.id);
    match (ids.next(), ids.next()) {
        (Some(first), Some(second)) => Err(RbacError::AmbiguousReference {
            kind,
            reference: reference.to_string(),
            candidates: [first, second],
        }),
        (first, _) => Ok(first),
    }
}
