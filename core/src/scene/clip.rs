//! Animation clip playback state

use serde::{Deserialize, Serialize};

/// What happens when playback reaches either end of the clip
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoopMode {
    /// Clamp at the end and stop running
    Once,
    /// Wrap around
    #[default]
    Repeat,
}

/// Playback state of one clip bound to a mixer root
///
/// Mirrors the usual mixer action model: a clip has a time cursor, a signed
/// time scale (negative plays backward), a paused flag and a running flag.
#[derive(Debug, Clone, PartialEq)]
pub struct ClipAction {
    name: String,
    duration: f32,
    time: f32,
    time_scale: f32,
    paused: bool,
    running: bool,
    loop_mode: LoopMode,
}

impl ClipAction {
    pub fn new(name: impl Into<String>, duration: f32) -> Self {
        Self {
            name: name.into(),
            duration: duration.max(0.0),
            time: 0.0,
            time_scale: 1.0,
            paused: false,
            running: false,
            loop_mode: LoopMode::Repeat,
        }
    }

    pub fn with_loop(mut self, loop_mode: LoopMode) -> Self {
        self.loop_mode = loop_mode;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn duration(&self) -> f32 {
        self.duration
    }

    pub fn time(&self) -> f32 {
        self.time
    }

    pub fn set_time(&mut self, time: f32) {
        self.time = time.clamp(0.0, self.duration);
    }

    pub fn time_scale(&self) -> f32 {
        self.time_scale
    }

    pub fn set_time_scale(&mut self, time_scale: f32) {
        self.time_scale = time_scale;
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn loop_mode(&self) -> LoopMode {
        self.loop_mode
    }

    /// Rewind to 0 and unpause, leaving the running flag alone
    pub fn reset(&mut self) {
        self.time = 0.0;
        self.paused = false;
    }

    pub fn play(&mut self) {
        self.running = true;
    }

    pub fn pause(&mut self) {
        self.paused = true;
    }

    /// Stop running and rewind
    pub fn stop(&mut self) {
        self.running = false;
        self.reset();
    }

    /// Reset, seek to `start_time` and play forward
    pub fn play_forward_from(&mut self, start_time: f32) {
        self.reset();
        self.set_time(start_time);
        self.time_scale = 1.0;
        self.play();
    }

    /// Play backward from the current time
    ///
    /// A clip sitting at (or before) its start is moved to its end first,
    /// otherwise the backward play would have nothing to show.
    pub fn play_reverse(&mut self) {
        self.time_scale = -1.0;
        self.paused = false;
        if self.time <= 0.0 {
            self.time = self.duration;
        }
        self.play();
    }

    /// Advance the time cursor by `dt` seconds
    pub fn advance(&mut self, dt: f32) {
        if !self.running || self.paused || self.duration <= 0.0 {
            return;
        }
        let time = self.time + dt * self.time_scale;
        match self.loop_mode {
            LoopMode::Repeat => {
                self.time = time.rem_euclid(self.duration);
            }
            LoopMode::Once => {
                if time >= self.duration {
                    self.time = self.duration;
                    self.running = false;
                } else if time <= 0.0 {
                    self.time = 0.0;
                    self.running = false;
                } else {
                    self.time = time;
                }
            }
        }
    }
}
