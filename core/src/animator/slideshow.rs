//! Image slideshow on a screen mesh

use hashbrown::HashMap;

use scrollstage_shared::{ContinuousMapper, IndexSelector, SlideshowFeature, TableError};

use super::{Animator, Resolution, TickContext};
use crate::scene::{NodeId, TextureId};
use crate::textures::AssetState;

#[derive(Debug)]
struct Resolved {
    meshes: Vec<NodeId>,
}

/// Shows one of `images` on the screen for `start <= scroll <= end`
///
/// A new image is only requested when the selected index changes. While a
/// load is in flight a newer selection replaces it, so a slow image never
/// lands on top of a later one. Loaded textures are cached per index.
pub struct SlideshowAnimator {
    id: String,
    asset: Option<String>,
    feature: SlideshowFeature,
    mapper: ContinuousMapper,
    selector: IndexSelector,
    cache: HashMap<usize, TextureId>,
    pending: Option<usize>,
    shown: Option<usize>,
    resolved: Resolution<Resolved>,
}

impl SlideshowAnimator {
    pub fn new(
        id: String,
        asset: Option<String>,
        feature: SlideshowFeature,
    ) -> Result<Self, TableError> {
        let mapper = ContinuousMapper::new(feature.start, feature.end).map_err(|source| {
            TableError::InvalidRange {
                feature: id.clone(),
                source,
            }
        })?;
        let selector = IndexSelector::new(feature.images.len());
        Ok(Self {
            id,
            asset,
            feature,
            mapper,
            selector,
            cache: HashMap::new(),
            pending: None,
            shown: None,
            resolved: Resolution::Pending,
        })
    }

    /// Index of the image currently on the screen
    pub fn shown(&self) -> Option<usize> {
        self.shown
    }

    /// Index whose texture is still loading
    pub fn pending(&self) -> Option<usize> {
        self.pending
    }

    fn show(&mut self, index: usize, texture: TextureId, ctx: &mut TickContext<'_>) {
        let Some(resolved) = self.resolved.ready() else {
            return;
        };
        for &mesh in &resolved.meshes {
            ctx.scene.set_texture(mesh, texture);
        }
        self.shown = Some(index);
        tracing::debug!(feature = %self.id, index, "slide shown");
    }
}

impl Animator for SlideshowAnimator {
    fn id(&self) -> &str {
        &self.id
    }

    fn tick(&mut self, scroll: f64, ctx: &mut TickContext<'_>) {
        let feature = &self.feature;
        self.resolved
            .resolve(&self.id, self.asset.as_deref(), ctx, |lookup| {
                let screen = match feature.screen_child {
                    Some(index) => lookup.child(&feature.screen, index)?,
                    None => lookup.node(&feature.screen)?,
                };
                Ok(Resolved {
                    meshes: lookup.meshes(screen),
                })
            });
        if self.resolved.ready().is_none() {
            return;
        }

        let inside = scroll >= self.mapper.start() && scroll <= self.mapper.end();
        if !inside {
            if let Some(index) = self.pending.take() {
                // Forget the selection so re-entering requests it again
                self.selector.reset();
                tracing::debug!(feature = %self.id, index, "slide load dropped");
            }
            return;
        }

        if let Some(index) = self.selector.select(self.mapper.map(scroll)) {
            if let Some(&texture) = self.cache.get(&index) {
                self.pending = None;
                self.show(index, texture, ctx);
                return;
            }
            self.pending = Some(index);
        }

        let Some(index) = self.pending else {
            return;
        };
        let Some(path) = self.feature.images.get(index) else {
            self.pending = None;
            return;
        };
        match ctx.textures.request(path) {
            AssetState::Pending => {}
            AssetState::Ready(texture) => {
                self.cache.insert(index, texture);
                self.pending = None;
                self.show(index, texture, ctx);
            }
            AssetState::Failed(reason) => {
                tracing::error!(feature = %self.id, path = %path, reason = %reason, "texture load failed");
                self.pending = None;
            }
        }
    }
}
