//! Visibility window animator

use smallvec::SmallVec;

use scrollstage_shared::WindowFeature;

use super::{Animator, Resolution, TickContext};
use crate::scene::{ClipId, NodeId};

#[derive(Debug)]
struct Resolved {
    node: NodeId,
    pause: SmallVec<[ClipId; 2]>,
}

/// Shows a node while `start <= scroll < end`
///
/// Clips listed under `pause` are frozen each time the node appears. They
/// stay frozen until some other effect plays them again.
pub struct WindowAnimator {
    id: String,
    asset: Option<String>,
    feature: WindowFeature,
    shown: Option<bool>,
    resolved: Resolution<Resolved>,
}

impl WindowAnimator {
    pub fn new(id: String, asset: Option<String>, feature: WindowFeature) -> Self {
        Self {
            id,
            asset,
            feature,
            shown: None,
            resolved: Resolution::Pending,
        }
    }

    fn inside(&self, scroll: f64) -> bool {
        scroll >= self.feature.start && self.feature.end.is_none_or(|end| scroll < end)
    }

    /// Last written visibility, `None` before the first resolved tick
    pub fn is_shown(&self) -> Option<bool> {
        self.shown
    }
}

impl Animator for WindowAnimator {
    fn id(&self) -> &str {
        &self.id
    }

    fn tick(&mut self, scroll: f64, ctx: &mut TickContext<'_>) {
        let feature = &self.feature;
        self.resolved
            .resolve(&self.id, self.asset.as_deref(), ctx, |lookup| {
                let node = lookup.node(&feature.node)?.id;
                let pause = match &feature.pause {
                    Some(target) => lookup.clips(target)?,
                    None => SmallVec::new(),
                };
                Ok(Resolved { node, pause })
            });

        let inside = self.inside(scroll);
        let Some(resolved) = self.resolved.ready() else {
            return;
        };
        if self.shown == Some(inside) {
            return;
        }
        self.shown = Some(inside);

        ctx.scene.set_visible(resolved.node, inside);
        if inside {
            for &clip in &resolved.pause {
                if let Some(action) = ctx.scene.clip_mut(clip) {
                    action.pause();
                }
            }
        }
    }
}
