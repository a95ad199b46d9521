//! Liquid fill animator
//!
//! Fills a body bottom to top as the scroll moves through a range. A part
//! whose bounds start above the fill height is hidden; the others are shown
//! with a clip plane at that height.

use glam::Vec3;

use scrollstage_shared::{
    ContinuousMapper, FillStaging, LiquidFillFeature, OpacityWindow, TableError, fill_height,
    phase_progress,
};

use super::effects::CompiledEffect;
use super::{Animator, Resolution, TickContext};
use crate::scene::{NodeId, ResolveError, SceneGraph};

#[derive(Debug)]
struct Resolved {
    body: NodeId,
    parts: Vec<NodeId>,
    show_inside: Vec<NodeId>,
    hide_inside: Vec<NodeId>,
    companions: Vec<(NodeId, OpacityWindow)>,
    on_resolve: Vec<CompiledEffect>,
}

/// Scroll-driven bottom-to-top fill of a body
///
/// With [`FillStaging::Whole`] one fill height runs over the body's bounds.
/// With [`FillStaging::Sequential`] the progress is split into equal phases
/// and each part fills over its own bounds in turn.
pub struct LiquidFillAnimator {
    id: String,
    asset: Option<String>,
    feature: LiquidFillFeature,
    mapper: ContinuousMapper,
    inside: Option<bool>,
    last_progress: Option<f64>,
    resolved: Resolution<Resolved>,
}

impl LiquidFillAnimator {
    pub fn new(
        id: String,
        asset: Option<String>,
        feature: LiquidFillFeature,
    ) -> Result<Self, TableError> {
        let mapper = feature
            .fill
            .mapper()
            .map_err(|source| TableError::InvalidRange {
                feature: id.clone(),
                source,
            })?;
        Ok(Self {
            id,
            asset,
            feature,
            mapper,
            inside: None,
            last_progress: None,
            resolved: Resolution::Pending,
        })
    }

    /// Fill progress written by the last tick inside the active window
    pub fn progress(&self) -> Option<f64> {
        self.last_progress
    }

    fn enter(&self, resolved: &Resolved, scene: &mut dyn SceneGraph) {
        for &node in &resolved.show_inside {
            scene.set_visible(node, true);
        }
        for &node in &resolved.hide_inside {
            scene.set_visible(node, false);
        }
        scene.set_visible(resolved.body, true);
        if let Some(position) = self.feature.body_position {
            scene.set_transform(resolved.body, Some(Vec3::from(position)), None);
        }
    }

    fn leave(resolved: &Resolved, scene: &mut dyn SceneGraph) {
        for &node in &resolved.show_inside {
            scene.set_visible(node, false);
        }
        for &node in &resolved.hide_inside {
            scene.set_visible(node, true);
        }
        scene.set_visible(resolved.body, false);
        for &part in &resolved.parts {
            scene.set_visible(part, false);
        }
        for &(node, _) in &resolved.companions {
            scene.set_visible(node, false);
        }
    }

    fn fill(&self, resolved: &Resolved, progress: f64, scene: &mut dyn SceneGraph) {
        match self.feature.staging {
            FillStaging::Whole => {
                let Some(bounds) = scene.world_bounds(resolved.body) else {
                    return;
                };
                let height = fill_height(bounds.min.y, bounds.height(), progress);
                for &part in &resolved.parts {
                    fill_part(scene, part, height);
                }
            }
            FillStaging::Sequential => {
                let count = resolved.parts.len();
                for (i, &part) in resolved.parts.iter().enumerate() {
                    let Some(bounds) = scene.world_bounds(part) else {
                        continue;
                    };
                    let local = phase_progress(progress, i, count);
                    let height = fill_height(bounds.min.y, bounds.height(), local);
                    fill_part(scene, part, height);
                }
            }
        }

        for &(node, window) in &resolved.companions {
            let alpha = window.alpha(progress) as f32;
            scene.set_visible(node, alpha > 0.0);
            scene.set_opacity(node, alpha);
        }
    }
}

fn fill_part(scene: &mut dyn SceneGraph, part: NodeId, height: f32) {
    if let Some(bounds) = scene.world_bounds(part)
        && height < bounds.min.y
    {
        scene.set_visible(part, false);
        return;
    }
    scene.set_visible(part, true);
    scene.set_clip_height(part, Some(height));
}

impl Animator for LiquidFillAnimator {
    fn id(&self) -> &str {
        &self.id
    }

    fn tick(&mut self, scroll: f64, ctx: &mut TickContext<'_>) {
        let feature = &self.feature;
        let resolved_now = self
            .resolved
            .resolve(&self.id, self.asset.as_deref(), ctx, |lookup| {
                Ok(Resolved {
                    body: lookup.node(&feature.body)?.id,
                    parts: lookup.nodes(feature.parts.iter().map(|p| &p.node))?,
                    show_inside: lookup.nodes(&feature.show_inside)?,
                    hide_inside: lookup.nodes(&feature.hide_inside)?,
                    companions: feature
                        .companions
                        .iter()
                        .map(|c| Ok((lookup.node(&c.node)?.id, c.window())))
                        .collect::<Result<Vec<_>, ResolveError>>()?,
                    on_resolve: CompiledEffect::compile_all(&feature.on_resolve, lookup)?,
                })
            });

        let Some(resolved) = self.resolved.ready() else {
            return;
        };

        // Part tints go last so they win over a tint on the whole body
        if resolved_now {
            for effect in &resolved.on_resolve {
                effect.apply(ctx);
            }
            for (&node, part) in resolved.parts.iter().zip(&self.feature.parts) {
                if let Some(tint) = part.tint {
                    ctx.scene.set_tint(node, tint);
                }
            }
        }

        let inside = self.feature.active.contains(scroll);
        let entered = self.inside != Some(inside);

        if !inside {
            if entered {
                Self::leave(resolved, ctx.scene);
                tracing::debug!(feature = %self.id, scroll, "fill inactive");
            }
            self.inside = Some(false);
            self.last_progress = None;
            return;
        }

        let progress = self.mapper.map(scroll);
        if !entered && self.last_progress == Some(progress) {
            return;
        }
        if entered {
            self.enter(resolved, ctx.scene);
            tracing::debug!(feature = %self.id, scroll, "fill active");
        }
        self.fill(resolved, progress, ctx.scene);
        self.inside = Some(true);
        self.last_progress = Some(progress);
    }
}
