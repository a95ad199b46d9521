//! In-memory scene graph
//!
//! Backs the tests and the headless player. Nodes live in a flat arena and
//! world bounds only account for translation.

use std::path::{Path, PathBuf};

use glam::Vec3;
use hashbrown::HashMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::{Aabb, ClipAction, ClipId, LoopMode, NodeId, NodeKind, SceneGraph, TextureId};

#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("invalid scene manifest: {0}")]
    Json(#[from] serde_json::Error),
    #[error("failed to read scene manifest {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

// ============================================================================
// Manifest
// ============================================================================

/// Serialized description of the assets a page loads
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SceneManifest {
    #[serde(default)]
    pub assets: Vec<AssetManifest>,
}

impl SceneManifest {
    pub fn from_json_str(json: &str) -> Result<Self, ManifestError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: &Path) -> Result<Self, ManifestError> {
        let json = std::fs::read_to_string(path).map_err(|source| ManifestError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&json)
    }
}

/// One loadable asset (a model file)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssetManifest {
    pub name: String,
    /// Frames before the asset finishes loading
    #[serde(default)]
    pub delay_frames: u32,
    /// Loading fails instead of completing
    #[serde(default)]
    pub failed: bool,
    pub root: NodeManifest,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeManifest {
    pub name: String,
    #[serde(default)]
    pub kind: NodeKind,
    /// Local-space `[min, max]`
    #[serde(default)]
    pub bounds: Option<[[f32; 3]; 2]>,
    #[serde(default)]
    pub position: Option<[f32; 3]>,
    #[serde(default = "default_visible")]
    pub visible: bool,
    #[serde(default)]
    pub children: Vec<NodeManifest>,
    /// Clips whose mixer root is this node
    #[serde(default)]
    pub clips: Vec<ClipManifest>,
}

fn default_visible() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClipManifest {
    pub name: String,
    pub duration: f32,
    #[serde(default)]
    pub loop_mode: LoopMode,
    /// Start running as soon as the asset loads
    #[serde(default)]
    pub autoplay: bool,
}

// ============================================================================
// Scene
// ============================================================================

#[derive(Debug, Clone)]
struct Node {
    name: String,
    kind: NodeKind,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    visible: bool,
    opacity: f32,
    tint: Option<[f32; 4]>,
    clip_height: Option<f32>,
    texture: Option<TextureId>,
    position: Vec3,
    rotation: Vec3,
    bounds: Option<Aabb>,
}

#[derive(Debug, Clone)]
struct Clip {
    root: NodeId,
    action: ClipAction,
}

/// Arena-backed [`SceneGraph`]
#[derive(Debug, Clone, Default)]
pub struct MemoryScene {
    nodes: Vec<Node>,
    roots: HashMap<String, NodeId>,
    clips: Vec<Clip>,
    camera: (Vec3, Vec3),
    aspect: f32,
}

impl MemoryScene {
    pub fn new() -> Self {
        Self::default()
    }

    // ------------------------------------------------------------------------
    // Building
    // ------------------------------------------------------------------------

    /// Attach a loaded asset and return its root
    pub fn add_asset(&mut self, asset: &AssetManifest) -> NodeId {
        let root = self.add_root(&asset.name, &asset.root.name, asset.root.kind);
        self.fill_node(root, &asset.root);
        root
    }

    fn fill_node(&mut self, id: NodeId, manifest: &NodeManifest) {
        if let Some([min, max]) = manifest.bounds {
            self.set_local_bounds(id, Aabb::new(Vec3::from(min), Vec3::from(max)));
        }
        if let Some(node) = self.node_mut(id) {
            node.visible = manifest.visible;
            if let Some(position) = manifest.position {
                node.position = Vec3::from(position);
            }
        }
        for clip in &manifest.clips {
            let clip_id = self.add_clip(
                id,
                ClipAction::new(&clip.name, clip.duration).with_loop(clip.loop_mode),
            );
            if clip.autoplay
                && let Some(action) = self.clip_mut(clip_id)
            {
                action.play();
            }
        }
        for child in &manifest.children {
            let child_id = self.add_child(id, &child.name, child.kind);
            self.fill_node(child_id, child);
        }
    }

    pub fn add_root(&mut self, asset: &str, name: &str, kind: NodeKind) -> NodeId {
        let id = self.push(name, kind, None);
        self.roots.insert(asset.to_string(), id);
        id
    }

    pub fn add_child(&mut self, parent: NodeId, name: &str, kind: NodeKind) -> NodeId {
        let id = self.push(name, kind, Some(parent));
        if let Some(p) = self.node_mut(parent) {
            p.children.push(id);
        }
        id
    }

    pub fn set_local_bounds(&mut self, node: NodeId, bounds: Aabb) {
        if let Some(n) = self.node_mut(node) {
            n.bounds = Some(bounds);
        }
    }

    pub fn add_clip(&mut self, root: NodeId, action: ClipAction) -> ClipId {
        let id = ClipId(self.clips.len() as u32);
        self.clips.push(Clip { root, action });
        id
    }

    fn push(&mut self, name: &str, kind: NodeKind, parent: Option<NodeId>) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(Node {
            name: name.to_string(),
            kind,
            parent,
            children: Vec::new(),
            visible: true,
            opacity: 1.0,
            tint: None,
            clip_height: None,
            texture: None,
            position: Vec3::ZERO,
            rotation: Vec3::ZERO,
            bounds: None,
        });
        id
    }

    fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0 as usize)
    }

    fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id.0 as usize)
    }

    fn meshes_at_or_below(&self, id: NodeId) -> Vec<NodeId> {
        self.descendants(id)
            .into_iter()
            .filter(|&n| self.kind(n) == Some(NodeKind::Mesh))
            .collect()
    }

    fn world_offset(&self, id: NodeId) -> Vec3 {
        let mut offset = Vec3::ZERO;
        let mut cursor = Some(id);
        while let Some(node) = cursor.and_then(|c| self.node(c)) {
            offset += node.position;
            cursor = node.parent;
        }
        offset
    }

    // ------------------------------------------------------------------------
    // Inspection
    // ------------------------------------------------------------------------

    /// First node named `name` below the asset root
    pub fn find(&self, asset: &str, name: &str) -> Option<NodeId> {
        let root = self.asset_root(asset)?;
        self.descendants(root)
            .into_iter()
            .find(|&id| self.name(id) == Some(name))
    }

    pub fn opacity(&self, node: NodeId) -> Option<f32> {
        self.node(node).map(|n| n.opacity)
    }

    pub fn tint(&self, node: NodeId) -> Option<[f32; 4]> {
        self.node(node).and_then(|n| n.tint)
    }

    pub fn clip_height(&self, node: NodeId) -> Option<f32> {
        self.node(node).and_then(|n| n.clip_height)
    }

    pub fn texture(&self, node: NodeId) -> Option<TextureId> {
        self.node(node).and_then(|n| n.texture)
    }

    pub fn position(&self, node: NodeId) -> Option<Vec3> {
        self.node(node).map(|n| n.position)
    }

    pub fn rotation(&self, node: NodeId) -> Option<Vec3> {
        self.node(node).map(|n| n.rotation)
    }

    /// Camera `(position, look_at)`
    pub fn camera(&self) -> (Vec3, Vec3) {
        self.camera
    }

    pub fn aspect(&self) -> f32 {
        self.aspect
    }

    pub fn clip(&self, clip: ClipId) -> Option<&ClipAction> {
        self.clips.get(clip.0 as usize).map(|c| &c.action)
    }

    pub fn asset_names(&self) -> impl Iterator<Item = &str> {
        self.roots.keys().map(String::as_str)
    }

    /// Names of the visible nodes of an asset, in depth-first order
    pub fn visible_names(&self, asset: &str) -> Vec<String> {
        let Some(root) = self.asset_root(asset) else {
            return Vec::new();
        };
        self.descendants(root)
            .into_iter()
            .filter(|&id| self.is_visible(id))
            .filter_map(|id| self.name(id).map(str::to_string))
            .collect()
    }
}

impl SceneGraph for MemoryScene {
    fn asset_root(&self, asset: &str) -> Option<NodeId> {
        self.roots.get(asset).copied()
    }

    fn name(&self, node: NodeId) -> Option<&str> {
        self.node(node).map(|n| n.name.as_str())
    }

    fn kind(&self, node: NodeId) -> Option<NodeKind> {
        self.node(node).map(|n| n.kind)
    }

    fn children(&self, node: NodeId) -> Vec<NodeId> {
        self.node(node).map(|n| n.children.clone()).unwrap_or_default()
    }

    fn is_visible(&self, node: NodeId) -> bool {
        self.node(node).is_some_and(|n| n.visible)
    }

    fn set_visible(&mut self, node: NodeId, visible: bool) {
        if let Some(n) = self.node_mut(node) {
            n.visible = visible;
        }
    }

    fn set_opacity(&mut self, node: NodeId, opacity: f32) {
        for id in self.meshes_at_or_below(node) {
            if let Some(n) = self.node_mut(id) {
                n.opacity = opacity;
            }
        }
    }

    fn set_tint(&mut self, node: NodeId, color: [f32; 4]) {
        for id in self.meshes_at_or_below(node) {
            if let Some(n) = self.node_mut(id) {
                n.tint = Some(color);
            }
        }
    }

    fn set_clip_height(&mut self, node: NodeId, height: Option<f32>) {
        for id in self.meshes_at_or_below(node) {
            if let Some(n) = self.node_mut(id) {
                n.clip_height = height;
            }
        }
    }

    fn set_texture(&mut self, node: NodeId, texture: TextureId) {
        if let Some(n) = self.node_mut(node) {
            n.texture = Some(texture);
        }
    }

    fn set_transform(&mut self, node: NodeId, position: Option<Vec3>, rotation: Option<Vec3>) {
        if let Some(n) = self.node_mut(node) {
            if let Some(position) = position {
                n.position = position;
            }
            if let Some(rotation) = rotation {
                n.rotation = rotation;
            }
        }
    }

    fn world_bounds(&self, node: NodeId) -> Option<Aabb> {
        self.descendants(node)
            .into_iter()
            .filter_map(|id| {
                let bounds = self.node(id)?.bounds?;
                Some(bounds.translated(self.world_offset(id)))
            })
            .reduce(|a, b| a.union(&b))
    }

    fn set_camera(&mut self, position: Vec3, look_at: Vec3) {
        self.camera = (position, look_at);
    }

    fn set_aspect(&mut self, aspect: f32) {
        self.aspect = aspect;
    }

    fn clips_rooted_at(&self, node: NodeId) -> Vec<ClipId> {
        self.clips
            .iter()
            .enumerate()
            .filter(|(_, c)| c.root == node)
            .map(|(i, _)| ClipId(i as u32))
            .collect()
    }

    fn clip_mut(&mut self, clip: ClipId) -> Option<&mut ClipAction> {
        self.clips.get_mut(clip.0 as usize).map(|c| &mut c.action)
    }

    fn advance_animations(&mut self, dt: f32) {
        for clip in &mut self.clips {
            clip.action.advance(dt);
        }
    }
}
