//! Declarative feature table
//!
//! A page is described as a list of feature records. Each record names the
//! scene objects it drives and the scroll values at which it changes state,
//! so the thresholds live in data instead of in per-feature code.
//!
//! The records are plain serde types and deserialize from TOML:
//!
//! ```toml
//! [[features]]
//! id = "bottle-glass"
//! asset = "plain_new"
//!
//! [features.effect]
//! kind = "threshold"
//!
//! [[features.effect.entries]]
//! threshold = { enter = 0.29, exit = 0.2873245662504144 }
//! on_enter = [{ op = "show", node = "bottle_glass" }]
//! on_exit = [{ op = "hide", node = "bottle_glass" }]
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::math::{ContinuousMapper, MapperError, OpacityWindow};

/// Validation error for a table record
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TableError {
    /// Exit bound above the enter bound, or a bound outside `[0, 1]`
    #[error("feature '{feature}': invalid threshold enter={enter} exit={exit}")]
    InvalidThreshold {
        feature: String,
        enter: f64,
        exit: f64,
    },
    /// Range with `start >= end` or non-finite bounds
    #[error("feature '{feature}': invalid range: {source}")]
    InvalidRange {
        feature: String,
        #[source]
        source: MapperError,
    },
    /// A list that must not be empty is empty
    #[error("feature '{feature}': {what} must not be empty")]
    Empty { feature: String, what: &'static str },
    /// Opacity outside `[0, 1]`
    #[error("'{owner}': opacity {opacity} outside 0..=1")]
    InvalidOpacity { owner: String, opacity: f32 },
    /// Video window with `start >= end`
    #[error("video '{id}': start {start} must be below end {end}")]
    InvalidVideo { id: String, start: f64, end: f64 },
}

/// Scroll window, inclusive at both ends unless marked open
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScrollWindow {
    pub start: f64,
    pub end: f64,
    /// Exclude `start` itself
    #[serde(default, skip_serializing_if = "is_false")]
    pub start_open: bool,
    /// Exclude `end` itself
    #[serde(default, skip_serializing_if = "is_false")]
    pub end_open: bool,
}

impl ScrollWindow {
    /// Closed window `[start, end]`
    pub fn new(start: f64, end: f64) -> Self {
        Self {
            start,
            end,
            start_open: false,
            end_open: false,
        }
    }

    /// Open window `(start, end)`
    pub fn open(start: f64, end: f64) -> Self {
        Self {
            start_open: true,
            end_open: true,
            ..Self::new(start, end)
        }
    }

    pub fn contains(&self, scroll: f64) -> bool {
        let above = if self.start_open {
            scroll > self.start
        } else {
            scroll >= self.start
        };
        let below = if self.end_open {
            scroll < self.end
        } else {
            scroll <= self.end
        };
        above && below
    }
}

fn is_false(value: &bool) -> bool {
    !*value
}

/// Scroll sub-range mapped onto `[0, 1]`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProgressRange {
    pub start: f64,
    pub end: f64,
}

impl ProgressRange {
    pub fn mapper(&self) -> Result<ContinuousMapper, MapperError> {
        ContinuousMapper::new(self.start, self.end)
    }
}

/// Enter bound plus an optional lower exit bound
///
/// The latch turns on at `scroll >= enter` and off at `scroll < exit`.
/// A `strict` threshold turns on at `scroll > enter` and off at
/// `scroll <= exit` instead. A gap between the two bounds keeps the latch
/// from flickering at the boundary.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ThresholdSpec {
    pub enter: f64,
    #[serde(default)]
    pub exit: Option<f64>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub strict: bool,
}

impl ThresholdSpec {
    pub fn new(enter: f64) -> Self {
        Self {
            enter,
            exit: None,
            strict: false,
        }
    }

    pub fn with_exit(enter: f64, exit: f64) -> Self {
        Self {
            exit: Some(exit),
            ..Self::new(enter)
        }
    }

    /// Same bounds, with the enter bound itself excluded
    pub fn strict(self) -> Self {
        Self {
            strict: true,
            ..self
        }
    }

    /// Bound below which an active latch releases
    pub fn exit_bound(&self) -> f64 {
        self.exit.unwrap_or(self.enter)
    }

    /// An inactive latch turns on at `scroll`
    pub fn enters(&self, scroll: f64) -> bool {
        if self.strict {
            scroll > self.enter
        } else {
            scroll >= self.enter
        }
    }

    /// An active latch turns off at `scroll`
    pub fn releases(&self, scroll: f64) -> bool {
        if self.strict {
            scroll <= self.exit_bound()
        } else {
            scroll < self.exit_bound()
        }
    }

    fn validate(&self, feature: &str) -> Result<(), TableError> {
        let exit = self.exit_bound();
        let in_unit = |v: f64| (0.0..=1.0).contains(&v);
        if !in_unit(self.enter) || !in_unit(exit) || exit > self.enter {
            return Err(TableError::InvalidThreshold {
                feature: feature.to_string(),
                enter: self.enter,
                exit,
            });
        }
        Ok(())
    }
}

/// Clips to act on: every clip rooted in `node`, or only the `index`-th one
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClipTarget {
    pub node: String,
    #[serde(default)]
    pub index: Option<usize>,
}

/// Side effect fired on a threshold crossing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Effect {
    Show {
        node: String,
    },
    Hide {
        node: String,
    },
    /// Reset, seek to `start_time` and play forward
    Play {
        clips: ClipTarget,
        #[serde(default)]
        start_time: Option<f32>,
    },
    /// Play backward from the current time (or from the clip end when at 0)
    Reverse {
        clips: ClipTarget,
    },
    Stop {
        clips: ClipTarget,
    },
    Pause {
        clips: ClipTarget,
    },
    /// Opacity of a 2D overlay element
    ElementOpacity {
        element: String,
        opacity: f32,
    },
    /// Material color of every mesh at or below `node`; alpha is the material opacity
    Tint {
        node: String,
        color: [f32; 4],
    },
}

impl Effect {
    fn validate(&self) -> Result<(), TableError> {
        let (owner, values): (&str, &[f32]) = match self {
            Effect::ElementOpacity { element, opacity } => {
                (element.as_str(), std::slice::from_ref(opacity))
            }
            Effect::Tint { node, color } => (node.as_str(), color.as_slice()),
            _ => return Ok(()),
        };
        match values.iter().find(|v| !(0.0..=1.0).contains(*v)) {
            Some(&opacity) => Err(TableError::InvalidOpacity {
                owner: owner.to_string(),
                opacity,
            }),
            None => Ok(()),
        }
    }
}

/// One latch of a threshold feature with its forward and reverse effects
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThresholdEntry {
    pub threshold: ThresholdSpec,
    #[serde(default)]
    pub on_enter: Vec<Effect>,
    #[serde(default)]
    pub on_exit: Vec<Effect>,
}

/// Independent latches; `parent` is visible while any latch is active
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThresholdFeature {
    pub entries: Vec<ThresholdEntry>,
    #[serde(default)]
    pub parent: Option<String>,
}

/// Node visible for `start <= scroll < end`; optionally pauses clips while shown
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WindowFeature {
    pub node: String,
    pub start: f64,
    #[serde(default)]
    pub end: Option<f64>,
    #[serde(default)]
    pub pause: Option<ClipTarget>,
}

/// How a liquid fill distributes its progress over the parts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FillStaging {
    /// One fill height over the whole body's bounds
    #[default]
    Whole,
    /// Parts fill one after another, each over its own bounds
    Sequential,
}

/// A part of a filled body, optionally tinted once when resolved
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FillPart {
    pub node: String,
    #[serde(default)]
    pub tint: Option<[f32; 4]>,
}

/// Companion object that appears and fades along the fill progress
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompanionFade {
    pub node: String,
    pub appear: f64,
    #[serde(default)]
    pub fade_out: Option<f64>,
    #[serde(default = "default_fade_width")]
    pub fade_width: f64,
}

impl CompanionFade {
    pub fn window(&self) -> OpacityWindow {
        OpacityWindow {
            appear: self.appear,
            fade_out: self.fade_out,
            fade_width: self.fade_width,
        }
    }
}

fn default_fade_width() -> f64 {
    0.05
}

/// Bottom-to-top fill of a body's parts driven by scroll
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LiquidFillFeature {
    /// Window in which the body is shown and filled
    pub active: ScrollWindow,
    /// Scroll range mapped to fill progress
    pub fill: ProgressRange,
    pub body: String,
    pub parts: Vec<FillPart>,
    #[serde(default)]
    pub staging: FillStaging,
    /// Shown inside the window, hidden outside
    #[serde(default)]
    pub show_inside: Vec<String>,
    /// Hidden inside the window, shown outside
    #[serde(default)]
    pub hide_inside: Vec<String>,
    #[serde(default)]
    pub body_position: Option<[f32; 3]>,
    #[serde(default)]
    pub companions: Vec<CompanionFade>,
    /// Applied once, when the body's objects are first resolved
    #[serde(default)]
    pub on_resolve: Vec<Effect>,
}

/// Discrete image selection on a screen mesh
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlideshowFeature {
    pub screen: String,
    /// Child of `screen` that carries the image
    #[serde(default)]
    pub screen_child: Option<usize>,
    pub start: f64,
    pub end: f64,
    pub images: Vec<String>,
}

/// Behavior of a feature record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FeatureKind {
    Threshold(ThresholdFeature),
    VisibilityWindow(WindowFeature),
    LiquidFill(LiquidFillFeature),
    Slideshow(SlideshowFeature),
}

/// One row of the feature table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureSpec {
    pub id: String,
    /// Asset root the feature's objects live under
    #[serde(default)]
    pub asset: Option<String>,
    /// Router only ticks the feature while the progress is inside this window
    #[serde(default)]
    pub window: Option<ScrollWindow>,
    pub effect: FeatureKind,
}

impl FeatureSpec {
    pub fn validate(&self) -> Result<(), TableError> {
        let feature = self.id.as_str();
        let range = |start: f64, end: f64| {
            ContinuousMapper::new(start, end)
                .map(|_| ())
                .map_err(|source| TableError::InvalidRange {
                    feature: feature.to_string(),
                    source,
                })
        };
        let empty = |what: &'static str| TableError::Empty {
            feature: feature.to_string(),
            what,
        };

        if let Some(window) = &self.window {
            range(window.start, window.end)?;
        }

        match &self.effect {
            FeatureKind::Threshold(spec) => {
                if spec.entries.is_empty() {
                    return Err(empty("entries"));
                }
                for entry in &spec.entries {
                    entry.threshold.validate(feature)?;
                    for effect in entry.on_enter.iter().chain(&entry.on_exit) {
                        effect.validate()?;
                    }
                }
            }
            FeatureKind::VisibilityWindow(spec) => {
                if let Some(end) = spec.end {
                    range(spec.start, end)?;
                }
            }
            FeatureKind::LiquidFill(spec) => {
                range(spec.active.start, spec.active.end)?;
                range(spec.fill.start, spec.fill.end)?;
                if spec.parts.is_empty() {
                    return Err(empty("parts"));
                }
                for effect in &spec.on_resolve {
                    effect.validate()?;
                }
            }
            FeatureKind::Slideshow(spec) => {
                range(spec.start, spec.end)?;
                if spec.images.is_empty() {
                    return Err(empty("images"));
                }
            }
        }
        Ok(())
    }
}

/// Embedded video shown as a modal while the scroll is inside its window
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoSpec {
    pub id: String,
    pub start: f64,
    pub end: f64,
    pub vimeo_id: String,
}

impl VideoSpec {
    pub fn embed_url(&self) -> String {
        format!(
            "https://player.vimeo.com/video/{}?autoplay=1&muted=1",
            self.vimeo_id
        )
    }

    pub fn validate(&self) -> Result<(), TableError> {
        if self.start.is_nan() || self.end.is_nan() || self.start >= self.end {
            return Err(TableError::InvalidVideo {
                id: self.id.clone(),
                start: self.start,
                end: self.end,
            });
        }
        Ok(())
    }
}

/// What a timeline object drives
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BindingTarget {
    Camera,
    Node { asset: String, name: String },
}

/// Timeline object bound to a scene target
///
/// Each channel is applied only when present; its value is the default used
/// when the timeline has no track for that property.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelineBinding {
    pub object: String,
    pub target: BindingTarget,
    #[serde(default)]
    pub position: Option<[f32; 3]>,
    #[serde(default)]
    pub rotation: Option<[f32; 3]>,
    #[serde(default)]
    pub look_at: Option<[f32; 3]>,
    #[serde(default)]
    pub opacity: Option<f32>,
}

impl TimelineBinding {
    pub fn validate(&self) -> Result<(), TableError> {
        if let Some(opacity) = self.opacity
            && !(0.0..=1.0).contains(&opacity)
        {
            return Err(TableError::InvalidOpacity {
                owner: self.object.clone(),
                opacity,
            });
        }
        Ok(())
    }
}
