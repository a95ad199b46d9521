//! Scene-graph collaborator
//!
//! The scene (meshes, materials, animation mixers) is owned by the renderer.
//! This module describes the narrow surface the animators mutate, plus the
//! handle tables that cache name lookups once an asset has arrived.

use glam::Vec3;
use serde::{Deserialize, Serialize};

mod clip;
mod handles;
mod memory;

pub use clip::{ClipAction, LoopMode};
pub use handles::{HandleTable, HandleTables, Lookup, NodeHandle, ResolveError};
pub use memory::{
    AssetManifest, ClipManifest, ManifestError, MemoryScene, NodeManifest, SceneManifest,
};

/// Scene node reference (non-owning)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u32);

/// Animation clip action reference
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ClipId(pub u32);

/// Loaded texture reference
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct TextureId(pub u32);

/// Capability tag of a node, resolved once into a [`NodeHandle`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    /// Renders geometry with a material
    Mesh,
    /// Container without geometry of its own
    #[default]
    Group,
}

/// Axis-aligned bounding box in world space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self {
            min: min.min(max),
            max: min.max(max),
        }
    }

    /// Vertical extent
    pub fn height(&self) -> f32 {
        self.max.y - self.min.y
    }

    pub fn union(&self, other: &Aabb) -> Aabb {
        Aabb {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    pub fn translated(&self, offset: Vec3) -> Aabb {
        Aabb {
            min: self.min + offset,
            max: self.max + offset,
        }
    }
}

/// Mutable view of the externally owned scene
///
/// Recursive setters (`set_opacity`, `set_tint`, `set_clip_height`) apply to
/// every mesh at or below the node; the others touch the node itself.
/// Unknown ids are ignored.
pub trait SceneGraph {
    /// Root node of a loaded asset, `None` while it is still loading
    fn asset_root(&self, asset: &str) -> Option<NodeId>;

    fn name(&self, node: NodeId) -> Option<&str>;

    fn kind(&self, node: NodeId) -> Option<NodeKind>;

    fn children(&self, node: NodeId) -> Vec<NodeId>;

    fn is_visible(&self, node: NodeId) -> bool;

    fn set_visible(&mut self, node: NodeId, visible: bool);

    fn set_opacity(&mut self, node: NodeId, opacity: f32);

    fn set_tint(&mut self, node: NodeId, color: [f32; 4]);

    /// Clip everything above `height` (world y); `None` removes the clip plane
    fn set_clip_height(&mut self, node: NodeId, height: Option<f32>);

    fn set_texture(&mut self, node: NodeId, texture: TextureId);

    /// Set local position and/or Euler rotation (radians, XYZ)
    fn set_transform(&mut self, node: NodeId, position: Option<Vec3>, rotation: Option<Vec3>);

    /// World-space bounds of the node and its descendants
    fn world_bounds(&self, node: NodeId) -> Option<Aabb>;

    fn set_camera(&mut self, position: Vec3, look_at: Vec3);

    fn set_aspect(&mut self, aspect: f32);

    /// Clip actions whose mixer root is `node`, in mixer order
    fn clips_rooted_at(&self, node: NodeId) -> Vec<ClipId>;

    fn clip_mut(&mut self, clip: ClipId) -> Option<&mut ClipAction>;

    /// Advance every animation mixer by `dt` seconds
    fn advance_animations(&mut self, dt: f32);

    /// `node` and everything below it, depth first, parents before children
    fn descendants(&self, node: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![node];
        while let Some(next) = stack.pop() {
            out.push(next);
            let mut children = self.children(next);
            children.reverse();
            stack.extend(children);
        }
        out
    }
}
