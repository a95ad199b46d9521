//! Shared test fixtures for animator and router tests

use glam::Vec3;

use scrollstage_shared::FeatureSpec;

use crate::animator::{Animator, TickContext};
use crate::overlay::RecordingOverlay;
use crate::scene::{Aabb, ClipAction, HandleTables, LoopMode, MemoryScene, NodeId, NodeKind};
use crate::textures::MemoryTextures;

pub const ASSET: &str = "plain_new";

/// Duration of every fixture clip
pub const CLIP_SECONDS: f32 = 6.0;

// ============================================================================
// Scene fixture
// ============================================================================

fn add_mesh(scene: &mut MemoryScene, parent: NodeId, name: &str, min_y: f32, max_y: f32) -> NodeId {
    let id = scene.add_child(parent, name, NodeKind::Mesh);
    scene.set_local_bounds(
        id,
        Aabb::new(Vec3::new(-0.5, min_y, -0.5), Vec3::new(0.5, max_y, 0.5)),
    );
    id
}

fn add_clips(scene: &mut MemoryScene, root: NodeId, prefix: &str, count: usize) {
    for i in 0..count {
        scene.add_clip(
            root,
            ClipAction::new(format!("{prefix}_{i}"), CLIP_SECONDS).with_loop(LoopMode::Once),
        );
    }
}

/// The `plain_new` asset with the objects the page table names
pub fn plain_new_scene() -> MemoryScene {
    let mut scene = MemoryScene::new();
    let root = scene.add_root(ASSET, ASSET, NodeKind::Group);

    let bottle = scene.add_child(root, "bottle_glas", NodeKind::Group);
    add_mesh(&mut scene, bottle, "bottle_pla_on__off", 0.0, 1.0);
    add_clips(&mut scene, bottle, "bottle", 3);
    add_mesh(&mut scene, root, "bottle_pla_with_label_off__on", 0.0, 1.0);

    let particles = scene.add_child(root, "particle_pla", NodeKind::Group);
    for name in ["particle_1", "particle_2", "particle_3", "particle_4"] {
        let id = add_mesh(&mut scene, particles, name, 0.0, 0.1);
        add_clips(&mut scene, id, name, 1);
    }

    // Four stacked parts, one unit high each
    let body = scene.add_child(root, "Silhuette", NodeKind::Group);
    for (i, name) in ["legs", "upper_legs", "belly", "head"].into_iter().enumerate() {
        add_mesh(&mut scene, body, name, i as f32, i as f32 + 1.0);
    }
    add_mesh(&mut scene, root, "Silhuette_outside_pla", 0.0, 4.0);
    add_mesh(&mut scene, root, "ipad_cam_04", 0.0, 1.0);
    for name in ["food_01", "food_02"] {
        add_mesh(&mut scene, root, name, 0.0, 0.5);
    }

    let ipad = scene.add_child(root, "ipad", NodeKind::Group);
    add_mesh(&mut scene, ipad, "ipad_frame", 0.0, 1.0);
    let screen = scene.add_child(ipad, "ipad_screen", NodeKind::Group);
    add_mesh(&mut scene, screen, "ipad_glass", 0.0, 1.0);

    scene
}

/// Parse one `[[features]]` record
pub fn feature(toml_src: &str) -> FeatureSpec {
    toml::from_str(toml_src).expect("fixture feature should parse")
}

// ============================================================================
// Tick harness
// ============================================================================

/// Collaborators for ticking animators outside a router
pub struct Harness {
    pub scene: MemoryScene,
    pub overlay: RecordingOverlay,
    pub textures: MemoryTextures,
    pub handles: HandleTables,
}

impl Harness {
    /// Harness with every asset of `scene` already indexed
    pub fn new(scene: MemoryScene) -> Self {
        let mut harness = Self::unloaded(scene);
        harness.refresh();
        harness
    }

    /// Harness whose handle tables are still empty
    pub fn unloaded(scene: MemoryScene) -> Self {
        Self {
            scene,
            overlay: RecordingOverlay::new(),
            textures: MemoryTextures::new(0),
            handles: HandleTables::new(),
        }
    }

    pub fn refresh(&mut self) {
        let assets: Vec<String> = self.scene.asset_names().map(str::to_string).collect();
        self.handles
            .refresh(&self.scene, assets.iter().map(String::as_str));
    }

    pub fn tick(&mut self, animator: &mut dyn Animator, scroll: f64) {
        let mut ctx = TickContext {
            scene: &mut self.scene,
            overlay: &mut self.overlay,
            textures: &mut self.textures,
            handles: &self.handles,
        };
        animator.tick(scroll, &mut ctx);
    }

    pub fn node(&self, name: &str) -> NodeId {
        self.scene
            .find(ASSET, name)
            .unwrap_or_else(|| panic!("fixture node {name} missing"))
    }

    pub fn visible(&self, name: &str) -> bool {
        use crate::scene::SceneGraph;
        self.scene.is_visible(self.node(name))
    }
}
