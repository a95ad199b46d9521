//! Video modal gates

use scrollstage_shared::VideoSpec;

/// Open/closed state of one video's modal
#[derive(Debug, Clone)]
pub(crate) struct VideoGate {
    pub spec: VideoSpec,
    pub playing: bool,
    /// Dismissed by the user; stays closed until the scroll goes back before `start`
    pub was_closed: bool,
}

/// What the router must do after evaluating a gate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum GateAction {
    Open,
    Close,
    None,
}

impl VideoGate {
    pub fn new(spec: VideoSpec) -> Self {
        Self {
            spec,
            playing: false,
            was_closed: false,
        }
    }

    /// Half-open window `[start, end)`
    pub fn in_range(&self, progress: f64) -> bool {
        progress >= self.spec.start && progress < self.spec.end
    }

    pub fn evaluate(&mut self, progress: f64) -> GateAction {
        if self.in_range(progress) && !self.was_closed && !self.playing {
            self.playing = true;
            return GateAction::Open;
        }
        if progress < self.spec.start {
            self.was_closed = false;
            if self.playing {
                self.playing = false;
                return GateAction::Close;
            }
        }
        GateAction::None
    }

    /// User dismissal, `false` if the modal was not open
    pub fn dismiss(&mut self) -> bool {
        if !self.playing {
            return false;
        }
        self.playing = false;
        self.was_closed = true;
        true
    }
}
