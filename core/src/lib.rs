//! scrollstage core - scroll-driven scene control
//!
//! This crate maps a single scroll scalar onto discrete and continuous
//! visual states of an externally owned scene.
//!
//! # Architecture
//!
//! - [`ScrollRouter`] - owns the scroll progress, smooths the sequence position,
//!   gates scrolling while a video modal is open and ticks every feature once per frame
//! - [`Animator`] - per-feature state machine ticked with the current progress
//!   ([`ThresholdAnimator`], [`WindowAnimator`], [`LiquidFillAnimator`], [`SlideshowAnimator`])
//! - [`SceneGraph`], [`Timeline`], [`OverlayHost`], [`TextureSource`] - the collaborators
//!   the router drives but does not own
//! - [`HandleTable`] - scene lookups resolved once per asset and shared by all animators
//! - [`PageConfig`] - the declarative feature table plus scroll settings

pub mod animator;
pub mod config;
pub mod overlay;
pub mod router;
pub mod scene;
#[cfg(test)]
pub mod test_utils;
pub mod textures;
pub mod timeline;

pub use animator::{
    Animator, Crossing, LiquidFillAnimator, Resolution, SlideshowAnimator, ThresholdAnimator,
    ThresholdBank, TickContext, WindowAnimator, build_animator,
};
pub use config::{ConfigError, PageConfig};
pub use overlay::{OverlayEvent, OverlayHost, RecordingOverlay};
pub use router::{ScrollConfig, ScrollRouter, Stage, Viewport};
pub use scene::{
    Aabb, ClipAction, ClipId, HandleTable, HandleTables, LoopMode, MemoryScene, NodeHandle,
    NodeId, NodeKind, ResolveError, SceneGraph, SceneManifest, TextureId,
};
pub use textures::{AssetState, MemoryTextures, TextureSource};
pub use timeline::{KeyframeTimeline, Timeline, TimelineError};

// Re-export the declarative table so callers only need this crate
pub use scrollstage_shared as shared;
