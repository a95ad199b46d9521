//! Resolved scene handles
//!
//! Name lookups are done once per asset, when the asset's root first shows
//! up in the scene. Animators resolve their object names against the table
//! instead of walking the scene graph every tick.

use hashbrown::HashMap;
use smallvec::SmallVec;
use thiserror::Error;

use scrollstage_shared::ClipTarget;

use super::{ClipId, NodeId, NodeKind, SceneGraph};

/// Node reference tagged with its capability
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeHandle {
    pub id: NodeId,
    pub kind: NodeKind,
}

impl NodeHandle {
    pub fn is_mesh(&self) -> bool {
        self.kind == NodeKind::Mesh
    }
}

/// Failure to resolve a feature's objects
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    #[error("object '{name}' not found in asset '{asset}'")]
    MissingNode { asset: String, name: String },
    #[error("object '{name}' needs an asset but the feature names none")]
    NoAsset { name: String },
    #[error("object '{node}' has no clip #{index}")]
    MissingClip { node: String, index: usize },
    #[error("object '{node}' has no child #{index}")]
    MissingChild { node: String, index: usize },
}

/// Name and clip index of one loaded asset
#[derive(Debug, Clone)]
pub struct HandleTable {
    asset: String,
    root: NodeHandle,
    nodes: HashMap<String, NodeHandle>,
    clips: HashMap<NodeId, SmallVec<[ClipId; 2]>>,
}

impl HandleTable {
    /// Index every node below the asset root, or `None` if it is not loaded yet
    ///
    /// When several nodes share a name the first one in depth-first order wins.
    pub fn build(scene: &dyn SceneGraph, asset: &str) -> Option<Self> {
        let root_id = scene.asset_root(asset)?;
        let root = NodeHandle {
            id: root_id,
            kind: scene.kind(root_id).unwrap_or_default(),
        };

        let mut nodes = HashMap::new();
        let mut clips = HashMap::new();
        for id in scene.descendants(root_id) {
            let kind = scene.kind(id).unwrap_or_default();
            if let Some(name) = scene.name(id) {
                nodes
                    .entry(name.to_string())
                    .or_insert(NodeHandle { id, kind });
            }
            let rooted = scene.clips_rooted_at(id);
            if !rooted.is_empty() {
                clips.insert(id, SmallVec::from_vec(rooted));
            }
        }

        Some(Self {
            asset: asset.to_string(),
            root,
            nodes,
            clips,
        })
    }

    pub fn asset(&self) -> &str {
        &self.asset
    }

    pub fn root(&self) -> NodeHandle {
        self.root
    }

    pub fn node(&self, name: &str) -> Option<NodeHandle> {
        self.nodes.get(name).copied()
    }

    /// Clips whose mixer root is `node`
    pub fn clips(&self, node: NodeId) -> &[ClipId] {
        self.clips.get(&node).map_or(&[], |c| c.as_slice())
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

/// One [`HandleTable`] per loaded asset
#[derive(Debug, Default)]
pub struct HandleTables {
    tables: HashMap<String, HandleTable>,
}

impl HandleTables {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, asset: &str) -> Option<&HandleTable> {
        self.tables.get(asset)
    }

    pub fn contains(&self, asset: &str) -> bool {
        self.tables.contains_key(asset)
    }

    pub fn insert(&mut self, table: HandleTable) {
        self.tables.insert(table.asset.clone(), table);
    }

    /// Build tables for any of `assets` that became available
    ///
    /// Returns the names of the newly indexed assets. Tables are never
    /// rebuilt once present.
    pub fn refresh<'a>(
        &mut self,
        scene: &dyn SceneGraph,
        assets: impl IntoIterator<Item = &'a str>,
    ) -> Vec<String> {
        let mut built = Vec::new();
        for asset in assets {
            if self.tables.contains_key(asset) {
                continue;
            }
            if let Some(table) = HandleTable::build(scene, asset) {
                tracing::info!(
                    asset,
                    nodes = table.len(),
                    "asset available, handle table built"
                );
                built.push(asset.to_string());
                self.insert(table);
            }
        }
        built
    }
}

/// Name resolution for one feature against its asset's table
pub struct Lookup<'a> {
    pub scene: &'a dyn SceneGraph,
    asset: Option<&'a str>,
    table: Option<&'a HandleTable>,
}

impl<'a> Lookup<'a> {
    /// `None` while the asset's table is not built yet
    pub fn new(
        scene: &'a dyn SceneGraph,
        tables: &'a HandleTables,
        asset: Option<&'a str>,
    ) -> Option<Self> {
        let table = match asset {
            Some(asset) => Some(tables.get(asset)?),
            None => None,
        };
        Some(Self {
            scene,
            asset,
            table,
        })
    }

    pub fn node(&self, name: &str) -> Result<NodeHandle, ResolveError> {
        let Some(table) = self.table else {
            return Err(ResolveError::NoAsset {
                name: name.to_string(),
            });
        };
        table.node(name).ok_or_else(|| ResolveError::MissingNode {
            asset: self.asset.unwrap_or_default().to_string(),
            name: name.to_string(),
        })
    }

    pub fn nodes<'n>(
        &self,
        names: impl IntoIterator<Item = &'n String>,
    ) -> Result<Vec<NodeId>, ResolveError> {
        names
            .into_iter()
            .map(|name| self.node(name).map(|h| h.id))
            .collect()
    }

    /// Child `index` of the named node
    pub fn child(&self, name: &str, index: usize) -> Result<NodeHandle, ResolveError> {
        let parent = self.node(name)?;
        let id = self
            .scene
            .children(parent.id)
            .get(index)
            .copied()
            .ok_or_else(|| ResolveError::MissingChild {
                node: name.to_string(),
                index,
            })?;
        Ok(NodeHandle {
            id,
            kind: self.scene.kind(id).unwrap_or_default(),
        })
    }

    /// Mesh nodes to act on for a handle: itself if it is a mesh, otherwise
    /// every mesh below it
    pub fn meshes(&self, handle: NodeHandle) -> Vec<NodeId> {
        if handle.is_mesh() {
            return vec![handle.id];
        }
        self.scene
            .descendants(handle.id)
            .into_iter()
            .filter(|&id| self.scene.kind(id) == Some(NodeKind::Mesh))
            .collect()
    }

    pub fn clips(&self, target: &ClipTarget) -> Result<SmallVec<[ClipId; 2]>, ResolveError> {
        let node = self.node(&target.node)?;
        let all = self.table.map_or(&[][..], |t| t.clips(node.id));
        match target.index {
            None => Ok(SmallVec::from_slice(all)),
            Some(index) => all
                .get(index)
                .map(|&clip| SmallVec::from_elem(clip, 1))
                .ok_or_else(|| ResolveError::MissingClip {
                    node: target.node.clone(),
                    index,
                }),
        }
    }
}
