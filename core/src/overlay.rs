//! Page overlay collaborator
//!
//! Everything outside the 3D canvas: fixed HTML elements whose opacity the
//! thresholds drive, the video modal, and the page scroll itself.

use serde::Serialize;

use scrollstage_shared::VideoSpec;

/// Host side of the page overlay
pub trait OverlayHost {
    fn set_element_opacity(&mut self, element: &str, opacity: f32);

    /// Show the video modal for `video`
    fn open_video(&mut self, video: &VideoSpec);

    fn close_video(&mut self, id: &str);

    /// Jump the page scroll to `offset` pixels
    fn scroll_to(&mut self, offset: f64);

    /// Block (or allow) user scrolling of the page
    fn set_scroll_locked(&mut self, locked: bool);

    /// User-visible message, used for unrecoverable load errors
    fn show_notice(&mut self, message: &str);
}

/// One recorded overlay call
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum OverlayEvent {
    ElementOpacity { element: String, opacity: f32 },
    OpenVideo { id: String, url: String },
    CloseVideo { id: String },
    ScrollTo { offset: f64 },
    ScrollLocked { locked: bool },
    Notice { message: String },
}

/// Overlay that records calls instead of touching a page
#[derive(Debug, Default)]
pub struct RecordingOverlay {
    events: Vec<OverlayEvent>,
    open: Vec<String>,
    locked: bool,
}

impl RecordingOverlay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> &[OverlayEvent] {
        &self.events
    }

    /// Drain the recorded events
    pub fn take_events(&mut self) -> Vec<OverlayEvent> {
        std::mem::take(&mut self.events)
    }

    /// Last opacity set on `element`
    pub fn element_opacity(&self, element: &str) -> Option<f32> {
        self.events.iter().rev().find_map(|e| match e {
            OverlayEvent::ElementOpacity {
                element: name,
                opacity,
            } if name == element => Some(*opacity),
            _ => None,
        })
    }

    /// Ids of the videos currently shown
    pub fn open_videos(&self) -> &[String] {
        &self.open
    }

    pub fn is_scroll_locked(&self) -> bool {
        self.locked
    }

    /// Last offset passed to `scroll_to`
    pub fn last_scroll_to(&self) -> Option<f64> {
        self.events.iter().rev().find_map(|e| match e {
            OverlayEvent::ScrollTo { offset } => Some(*offset),
            _ => None,
        })
    }

    pub fn notices(&self) -> impl Iterator<Item = &str> {
        self.events.iter().filter_map(|e| match e {
            OverlayEvent::Notice { message } => Some(message.as_str()),
            _ => None,
        })
    }
}

impl OverlayHost for RecordingOverlay {
    fn set_element_opacity(&mut self, element: &str, opacity: f32) {
        self.events.push(OverlayEvent::ElementOpacity {
            element: element.to_string(),
            opacity,
        });
    }

    fn open_video(&mut self, video: &VideoSpec) {
        if !self.open.contains(&video.id) {
            self.open.push(video.id.clone());
        }
        self.events.push(OverlayEvent::OpenVideo {
            id: video.id.clone(),
            url: video.embed_url(),
        });
    }

    fn close_video(&mut self, id: &str) {
        self.open.retain(|open| open != id);
        self.events.push(OverlayEvent::CloseVideo { id: id.to_string() });
    }

    fn scroll_to(&mut self, offset: f64) {
        self.events.push(OverlayEvent::ScrollTo { offset });
    }

    fn set_scroll_locked(&mut self, locked: bool) {
        self.locked = locked;
        self.events.push(OverlayEvent::ScrollLocked { locked });
    }

    fn show_notice(&mut self, message: &str) {
        self.events.push(OverlayEvent::Notice {
            message: message.to_string(),
        });
    }
}
