//! Scroll-progress router
//!
//! Single owner of the scroll progress. Scroll events update the progress
//! and the video gates; every rendered frame advances the clip mixers,
//! smooths the timeline position toward its target and ticks each feature
//! of the page table in table order. A windowed feature is ticked while the
//! progress is inside its window and once more on the frame it leaves.

mod bindings;
mod config;
mod video;


pub use config::{ScrollConfig, Viewport};

use hashbrown::HashSet;

use scrollstage_shared::{BindingTarget, ScrollWindow};

use crate::animator::{Animator, TickContext, build_animator};
use crate::config::{ConfigError, PageConfig};
use crate::overlay::OverlayHost;
use crate::scene::{HandleTables, SceneGraph};
use crate::textures::TextureSource;
use crate::timeline::Timeline;

use bindings::BindingSlot;
use video::{GateAction, VideoGate};

/// Notice shown when a model fails to load
pub const ASSET_FAILURE_NOTICE: &str = "Error loading models. Please refresh the page";

/// Externally owned collaborators the router drives each frame
pub struct Stage<'a> {
    pub scene: &'a mut dyn SceneGraph,
    pub overlay: &'a mut dyn OverlayHost,
    pub textures: &'a mut dyn TextureSource,
    pub timeline: &'a mut dyn Timeline,
}

struct FeatureSlot {
    window: Option<ScrollWindow>,
    /// Progress was inside `window` on the previous frame
    was_inside: bool,
    animator: Box<dyn Animator>,
}

/// Maps the page scroll onto the scene
pub struct ScrollRouter {
    config: ScrollConfig,
    sequence_length: f64,
    viewport: Viewport,
    progress: f64,
    target_position: f64,
    current_position: f64,
    scroll_enabled: bool,
    features: Vec<FeatureSlot>,
    assets: Vec<String>,
    failed_assets: HashSet<String>,
    videos: Vec<VideoGate>,
    bindings: Vec<BindingSlot>,
    handles: HandleTables,
    frame: u64,
}

impl ScrollRouter {
    /// Build a router for a page whose timeline is `sequence_length` seconds long
    pub fn new(
        page: &PageConfig,
        sequence_length: f64,
        viewport: Viewport,
    ) -> Result<Self, ConfigError> {
        page.validate()?;
        if !sequence_length.is_finite() || sequence_length <= 0.0 {
            return Err(ConfigError::InvalidSequenceLength(sequence_length));
        }

        let mut features = Vec::with_capacity(page.features.len());
        let mut assets: Vec<String> = Vec::new();
        for spec in &page.features {
            features.push(FeatureSlot {
                window: spec.window,
                was_inside: false,
                animator: build_animator(spec)?,
            });
            if let Some(asset) = &spec.asset
                && !assets.contains(asset)
            {
                assets.push(asset.clone());
            }
        }
        for binding in &page.bindings {
            if let BindingTarget::Node { asset, .. } = &binding.target
                && !assets.contains(asset)
            {
                assets.push(asset.clone());
            }
        }

        tracing::info!(
            features = features.len(),
            videos = page.videos.len(),
            bindings = page.bindings.len(),
            sequence_length,
            "scroll router ready"
        );

        Ok(Self {
            config: page.scroll.clone(),
            sequence_length,
            viewport,
            progress: 0.0,
            target_position: 0.0,
            current_position: 0.0,
            scroll_enabled: true,
            features,
            assets,
            failed_assets: HashSet::new(),
            videos: page.videos.iter().cloned().map(VideoGate::new).collect(),
            bindings: page.bindings.iter().cloned().map(BindingSlot::new).collect(),
            handles: HandleTables::new(),
            frame: 0,
        })
    }

    // ------------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------------

    /// Page height in pixels
    pub fn page_height(&self) -> f64 {
        self.sequence_length * self.config.pixels_per_second
    }

    /// Largest scroll offset the page allows
    pub fn max_scroll(&self) -> f64 {
        (self.page_height() - self.viewport.height).max(0.0)
    }

    pub fn progress(&self) -> f64 {
        self.progress
    }

    pub fn target_position(&self) -> f64 {
        self.target_position
    }

    /// Smoothed timeline position
    pub fn current_position(&self) -> f64 {
        self.current_position
    }

    /// `false` while a video modal holds the page
    pub fn is_scroll_enabled(&self) -> bool {
        self.scroll_enabled
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Ids of the videos whose modal is open
    pub fn open_videos(&self) -> Vec<&str> {
        self.videos
            .iter()
            .filter(|v| v.playing)
            .map(|v| v.spec.id.as_str())
            .collect()
    }

    /// Assets the table refers to
    pub fn assets(&self) -> &[String] {
        &self.assets
    }

    pub fn handles(&self) -> &HandleTables {
        &self.handles
    }

    /// Frames rendered so far
    pub fn frame_count(&self) -> u64 {
        self.frame
    }

    fn set_scroll_enabled(&mut self, enabled: bool, overlay: &mut dyn OverlayHost) {
        if self.scroll_enabled != enabled {
            self.scroll_enabled = enabled;
            overlay.set_scroll_locked(!enabled);
        }
    }

    // ------------------------------------------------------------------------
    // Events
    // ------------------------------------------------------------------------

    /// Page scroll event at `offset` pixels
    ///
    /// Ignored while a video modal is open.
    pub fn on_scroll(&mut self, offset: f64, overlay: &mut dyn OverlayHost) {
        if !self.scroll_enabled {
            return;
        }
        let max = self.max_scroll();
        self.progress = if max > 0.0 && offset.is_finite() {
            (offset / max).clamp(0.0, 1.0)
        } else {
            0.0
        };
        self.target_position = self.progress * self.sequence_length;

        for i in 0..self.videos.len() {
            match self.videos[i].evaluate(self.progress) {
                GateAction::Open => {
                    tracing::info!(video = %self.videos[i].spec.id, progress = self.progress, "video opened");
                    overlay.open_video(&self.videos[i].spec);
                    self.set_scroll_enabled(false, overlay);
                }
                GateAction::Close => {
                    tracing::info!(video = %self.videos[i].spec.id, "video closed by scrolling back");
                    overlay.close_video(&self.videos[i].spec.id);
                    self.set_scroll_enabled(true, overlay);
                }
                GateAction::None => {}
            }
        }
    }

    /// User closed the modal of video `id`
    ///
    /// Scrolls just past the video's window and moves progress, target and
    /// smoothed position there in one step so the camera does not sweep.
    /// Returns `false` if that modal was not open.
    pub fn close_video(&mut self, id: &str, overlay: &mut dyn OverlayHost) -> bool {
        let Some(gate) = self.videos.iter_mut().find(|v| v.spec.id == id) else {
            tracing::warn!(video = id, "close requested for unknown video");
            return false;
        };
        if !gate.dismiss() {
            return false;
        }
        let resume = (gate.spec.end + self.config.close_overshoot).min(1.0);
        overlay.close_video(id);
        self.set_scroll_enabled(true, overlay);

        overlay.scroll_to(resume * self.max_scroll());
        self.progress = resume;
        self.target_position = resume * self.sequence_length;
        self.current_position = self.target_position;
        tracing::info!(video = id, progress = resume, "video dismissed");
        true
    }

    /// Viewport resize
    pub fn on_resize(&mut self, width: f64, height: f64, scene: &mut dyn SceneGraph) {
        self.viewport = Viewport::new(width, height);
        scene.set_aspect(self.viewport.aspect());
    }

    /// A model failed to load; it is not retried
    pub fn report_asset_failure(&mut self, asset: &str, overlay: &mut dyn OverlayHost) {
        tracing::error!(asset, "model failed to load");
        if self.failed_assets.insert(asset.to_string()) {
            overlay.show_notice(ASSET_FAILURE_NOTICE);
        }
    }

    // ------------------------------------------------------------------------
    // Frame
    // ------------------------------------------------------------------------

    /// Render-loop tick, `dt` seconds after the previous one
    pub fn frame(&mut self, dt: f32, stage: &mut Stage<'_>) {
        let dt = if dt.is_finite() {
            dt.clamp(0.0, self.config.max_frame_delta)
        } else {
            0.0
        };
        self.frame += 1;

        stage.scene.advance_animations(dt);
        self.current_position +=
            (self.target_position - self.current_position) * self.config.smoothing;

        self.handles
            .refresh(&*stage.scene, self.assets.iter().map(String::as_str));

        let progress = self.progress;
        let mut ctx = TickContext {
            scene: &mut *stage.scene,
            overlay: &mut *stage.overlay,
            textures: &mut *stage.textures,
            handles: &self.handles,
        };
        for slot in &mut self.features {
            let inside = slot.window.is_none_or(|w| w.contains(progress));
            // Windowed features also get the frame progress leaves their window
            if inside || slot.was_inside {
                slot.animator.tick(progress, &mut ctx);
            }
            slot.was_inside = inside;
        }

        stage.timeline.set_position(self.current_position);
        for binding in &mut self.bindings {
            binding.apply(&*stage.timeline, &mut *stage.scene, &self.handles);
        }
    }
}
