//! Shared types for scrollstage.
//!
//! Holds the pieces that carry no scene knowledge: the continuous scroll
//! math used by every animator, and the declarative feature table records
//! that a page configuration is made of.

pub mod math;
pub mod table;

pub use math::{
    ContinuousMapper, IndexSelector, MapperError, OpacityWindow, fade_window, fill_height,
    phase_progress, range_progress, select_index,
};
pub use table::{
    BindingTarget, ClipTarget, CompanionFade, Effect, FeatureKind, FeatureSpec, FillPart,
    FillStaging, LiquidFillFeature, ProgressRange, ScrollWindow, SlideshowFeature, TableError,
    ThresholdEntry, ThresholdFeature, ThresholdSpec, TimelineBinding, VideoSpec, WindowFeature,
};
