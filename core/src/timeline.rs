//! Keyframed timeline
//!
//! The authored camera path and object animations are sampled at the router's
//! smoothed position. Tracks are addressed by object name and a dotted
//! property name such as `position.x`, `rotation.y` or `opacity`.

use std::path::{Path, PathBuf};

use hashbrown::HashMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TimelineError {
    #[error("invalid timeline document: {0}")]
    Json(#[from] serde_json::Error),
    #[error("failed to read timeline {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("timeline length must be positive and finite (got {0})")]
    InvalidLength(f64),
    #[error("track {object}.{property} has a non-finite keyframe")]
    NonFinite { object: String, property: String },
}

/// Sequence of animated values the router scrubs
pub trait Timeline {
    /// Length in seconds
    fn length(&self) -> f64;

    fn position(&self) -> f64;

    /// Move the playhead; clamped to `[0, length]`
    fn set_position(&mut self, position: f64);

    /// Value of `object.property` at the playhead, `None` without a track
    fn sample(&self, object: &str, property: &str) -> Option<f32>;
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Keyframe {
    pub t: f64,
    pub v: f32,
}

/// Serialized timeline
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TimelineDocument {
    pub length: f64,
    #[serde(default)]
    pub objects: HashMap<String, HashMap<String, Vec<Keyframe>>>,
}

/// Piecewise-linear [`Timeline`]
#[derive(Debug, Clone)]
pub struct KeyframeTimeline {
    length: f64,
    position: f64,
    tracks: HashMap<String, HashMap<String, Vec<Keyframe>>>,
}

impl KeyframeTimeline {
    /// Timeline without tracks; every binding falls back to its defaults
    pub fn empty(length: f64) -> Self {
        Self {
            length: length.max(0.0),
            position: 0.0,
            tracks: HashMap::new(),
        }
    }

    pub fn from_document(doc: TimelineDocument) -> Result<Self, TimelineError> {
        if !doc.length.is_finite() || doc.length <= 0.0 {
            return Err(TimelineError::InvalidLength(doc.length));
        }
        let mut tracks = doc.objects;
        for (object, props) in tracks.iter_mut() {
            for (property, keys) in props.iter_mut() {
                if keys.iter().any(|k| !k.t.is_finite() || !k.v.is_finite()) {
                    return Err(TimelineError::NonFinite {
                        object: object.clone(),
                        property: property.clone(),
                    });
                }
                keys.sort_by(|a, b| a.t.total_cmp(&b.t));
            }
        }
        Ok(Self {
            length: doc.length,
            position: 0.0,
            tracks,
        })
    }

    pub fn from_json_str(json: &str) -> Result<Self, TimelineError> {
        let doc: TimelineDocument = serde_json::from_str(json)?;
        Self::from_document(doc)
    }

    pub fn load(path: &Path) -> Result<Self, TimelineError> {
        let json = std::fs::read_to_string(path).map_err(|source| TimelineError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&json)
    }

    /// Number of animated objects
    pub fn object_count(&self) -> usize {
        self.tracks.len()
    }
}

fn interpolate(keys: &[Keyframe], t: f64) -> Option<f32> {
    let first = keys.first()?;
    let last = keys.last()?;
    if t <= first.t {
        return Some(first.v);
    }
    if t >= last.t {
        return Some(last.v);
    }
    // First key strictly after t; the one before it starts the segment
    let next = keys.partition_point(|k| k.t <= t);
    let (a, b) = (keys[next - 1], keys[next]);
    let span = b.t - a.t;
    if span <= 0.0 {
        return Some(b.v);
    }
    let f = ((t - a.t) / span) as f32;
    Some(a.v + (b.v - a.v) * f)
}

impl Timeline for KeyframeTimeline {
    fn length(&self) -> f64 {
        self.length
    }

    fn position(&self) -> f64 {
        self.position
    }

    fn set_position(&mut self, position: f64) {
        self.position = if position.is_finite() {
            position.clamp(0.0, self.length)
        } else {
            0.0
        };
    }

    fn sample(&self, object: &str, property: &str) -> Option<f32> {
        let keys = self.tracks.get(object)?.get(property)?;
        interpolate(keys, self.position)
    }
}
