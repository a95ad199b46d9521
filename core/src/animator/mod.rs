//! Per-feature animators
//!
//! Every feature of the page table becomes one [`Animator`]: a small state
//! machine over the scroll progress. Animators are ticked every frame, so a
//! tick with an unchanged progress must not repeat any side effect.
//!
//! Scene objects are resolved lazily. Until the feature's asset has a
//! [`HandleTable`](crate::scene::HandleTable) the tick is a no-op; once the
//! table exists the names are resolved exactly once. A missing name turns the
//! animator inert for the rest of the session.

mod effects;
mod fill;
mod latch;
mod slideshow;
mod threshold;
mod window;

#[cfg(test)]
mod tests;

pub use fill::LiquidFillAnimator;
pub use latch::{Crossing, ThresholdBank};
pub use slideshow::SlideshowAnimator;
pub use threshold::ThresholdAnimator;
pub use window::WindowAnimator;

use scrollstage_shared::{FeatureKind, FeatureSpec, TableError};

use crate::overlay::OverlayHost;
use crate::scene::{HandleTables, Lookup, ResolveError, SceneGraph};
use crate::textures::TextureSource;

/// Collaborators handed to an animator for one tick
pub struct TickContext<'a> {
    pub scene: &'a mut dyn SceneGraph,
    pub overlay: &'a mut dyn OverlayHost,
    pub textures: &'a mut dyn TextureSource,
    pub handles: &'a HandleTables,
}

/// Stateful unit driven by the scroll progress
pub trait Animator {
    /// Feature id from the page table
    fn id(&self) -> &str;

    /// Re-evaluate against `scroll` (in `[0, 1]`)
    fn tick(&mut self, scroll: f64, ctx: &mut TickContext<'_>);
}

/// Lazily resolved scene objects of one animator
#[derive(Debug, Clone, Default)]
pub enum Resolution<T> {
    /// Asset not loaded yet, retry next tick
    #[default]
    Pending,
    Ready(T),
    /// A named object is missing; the animator does nothing from now on
    Inert,
}

impl<T> Resolution<T> {
    pub fn is_pending(&self) -> bool {
        matches!(self, Resolution::Pending)
    }

    pub fn is_inert(&self) -> bool {
        matches!(self, Resolution::Inert)
    }

    pub fn ready(&self) -> Option<&T> {
        match self {
            Resolution::Ready(value) => Some(value),
            _ => None,
        }
    }

    pub fn ready_mut(&mut self) -> Option<&mut T> {
        match self {
            Resolution::Ready(value) => Some(value),
            _ => None,
        }
    }

    /// Try to resolve a pending state, returning `true` if it just became ready
    pub(crate) fn resolve(
        &mut self,
        feature: &str,
        asset: Option<&str>,
        ctx: &TickContext<'_>,
        build: impl FnOnce(&Lookup<'_>) -> Result<T, ResolveError>,
    ) -> bool {
        if !self.is_pending() {
            return false;
        }
        let Some(lookup) = Lookup::new(&*ctx.scene, ctx.handles, asset) else {
            return false;
        };
        match build(&lookup) {
            Ok(value) => {
                tracing::debug!(feature, "scene objects resolved");
                *self = Resolution::Ready(value);
                true
            }
            Err(e) => {
                tracing::warn!(feature, error = %e, "scene object missing, feature disabled");
                *self = Resolution::Inert;
                false
            }
        }
    }
}

/// Build the animator for a table record
pub fn build_animator(spec: &FeatureSpec) -> Result<Box<dyn Animator>, TableError> {
    spec.validate()?;
    let id = spec.id.clone();
    let asset = spec.asset.clone();
    Ok(match &spec.effect {
        FeatureKind::Threshold(feature) => {
            Box::new(ThresholdAnimator::new(id, asset, feature.clone()))
        }
        FeatureKind::VisibilityWindow(feature) => {
            Box::new(WindowAnimator::new(id, asset, feature.clone()))
        }
        FeatureKind::LiquidFill(feature) => {
            Box::new(LiquidFillAnimator::new(id, asset, feature.clone())?)
        }
        FeatureKind::Slideshow(feature) => {
            Box::new(SlideshowAnimator::new(id, asset, feature.clone())?)
        }
    })
}
