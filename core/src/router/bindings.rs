//! Timeline bindings applied after the playhead moves

use glam::Vec3;

use scrollstage_shared::{BindingTarget, TimelineBinding};

use crate::animator::Resolution;
use crate::scene::{HandleTables, NodeId, SceneGraph};
use crate::timeline::Timeline;

const POSITION: [&str; 3] = ["position.x", "position.y", "position.z"];
const ROTATION: [&str; 3] = ["rotation.x", "rotation.y", "rotation.z"];
const LOOK_AT: [&str; 3] = ["look_at.x", "look_at.y", "look_at.z"];

#[derive(Debug, Clone, Copy)]
enum Target {
    Camera,
    Node(NodeId),
}

/// One binding with its lazily resolved target
pub(crate) struct BindingSlot {
    binding: TimelineBinding,
    target: Resolution<Target>,
}

/// Sample a vector channel, falling back per component to `default`
fn channel(
    timeline: &dyn Timeline,
    object: &str,
    props: &[&str; 3],
    default: Option<[f32; 3]>,
) -> Option<Vec3> {
    let default = default?;
    let mut out = [0.0; 3];
    for (i, prop) in props.iter().enumerate() {
        out[i] = timeline.sample(object, prop).unwrap_or(default[i]);
    }
    Some(Vec3::from(out))
}

impl BindingSlot {
    pub fn new(binding: TimelineBinding) -> Self {
        let target = match binding.target {
            BindingTarget::Camera => Resolution::Ready(Target::Camera),
            BindingTarget::Node { .. } => Resolution::Pending,
        };
        Self { binding, target }
    }

    fn resolve(&mut self, handles: &HandleTables) {
        if !self.target.is_pending() {
            return;
        }
        let BindingTarget::Node { asset, name } = &self.binding.target else {
            return;
        };
        let Some(table) = handles.get(asset) else {
            return;
        };
        self.target = match table.node(name) {
            Some(handle) => Resolution::Ready(Target::Node(handle.id)),
            None => {
                tracing::warn!(
                    object = %self.binding.object,
                    asset = %asset,
                    name = %name,
                    "timeline binding target missing, binding disabled"
                );
                Resolution::Inert
            }
        };
    }

    pub fn apply(
        &mut self,
        timeline: &dyn Timeline,
        scene: &mut dyn SceneGraph,
        handles: &HandleTables,
    ) {
        self.resolve(handles);
        let Some(&target) = self.target.ready() else {
            return;
        };
        let b = &self.binding;
        let object = b.object.as_str();
        let position = channel(timeline, object, &POSITION, b.position);

        match target {
            Target::Camera => {
                let look_at = channel(timeline, object, &LOOK_AT, b.look_at);
                if position.is_some() || look_at.is_some() {
                    scene.set_camera(
                        position.unwrap_or(Vec3::ZERO),
                        look_at.unwrap_or(Vec3::ZERO),
                    );
                }
            }
            Target::Node(node) => {
                let rotation = channel(timeline, object, &ROTATION, b.rotation);
                if position.is_some() || rotation.is_some() {
                    scene.set_transform(node, position, rotation);
                }
                if let Some(default) = b.opacity {
                    let opacity = timeline
                        .sample(object, "opacity")
                        .unwrap_or(default)
                        .clamp(0.0, 1.0);
                    scene.set_opacity(node, opacity);
                    scene.set_visible(node, opacity > 0.0);
                }
            }
        }
    }
}
