use std::path::PathBuf;

use thiserror::Error;
use tracing::{debug, warn};

use crate::utils::format_clock;

pub const DEFAULT_MEDIA_PATH: &str = "./video/jet.mp4";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PlaybackError {
    #[error("play request rejected: {reason}")]
    Rejected { reason: String },
}

/// The operations the controller needs from a playable element.
///
/// `duration` is `NaN` or `0.0` until the element knows the media length.
pub trait MediaElement {
    fn play(&mut self) -> Result<(), PlaybackError>;
    fn pause(&mut self);
    fn set_muted(&mut self, muted: bool);
    fn set_current_time(&mut self, seconds: f64);
    fn current_time(&self) -> f64;
    fn duration(&self) -> f64;
}

/// Where the media comes from; only carried, never opened here.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MediaSource {
    pub path: PathBuf,
}

impl Default for MediaSource {
    fn default() -> Self {
        Self {
            path: PathBuf::from(DEFAULT_MEDIA_PATH),
        }
    }
}

fn known_duration(raw: f64) -> f64 {
    if raw.is_finite() && raw > 0.0 {
        raw
    } else {
        0.0
    }
}

/// Muted-autoplay controller with a click-to-unmute overlay.
#[derive(Debug)]
pub struct VideoPlayer<M: MediaElement> {
    element: M,
    overlay_visible: bool,
    muted: bool,
    playing: bool,
    ready: bool,
    duration: f64,
    current_time: f64,
    autoplay_attempted: bool,
}

impl<M: MediaElement> VideoPlayer<M> {
    pub fn new(mut element: M) -> Self {
        element.set_muted(true);
        Self {
            element,
            overlay_visible: true,
            muted: true,
            playing: false,
            ready: false,
            duration: 0.0,
            current_time: 0.0,
            autoplay_attempted: false,
        }
    }

    pub fn element(&self) -> &M {
        &self.element
    }

    pub fn overlay_visible(&self) -> bool {
        self.overlay_visible
    }

    pub fn is_muted(&self) -> bool {
        self.muted
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn is_ready(&self) -> bool {
        self.ready
    }

    pub fn duration(&self) -> f64 {
        self.duration
    }

    pub fn current_time(&self) -> f64 {
        self.current_time
    }

    pub fn autoplay_attempted(&self) -> bool {
        self.autoplay_attempted
    }

    /// The seek bar is usable only once the length is known.
    pub fn can_seek(&self) -> bool {
        self.ready && self.duration > 0.0
    }

    /// Can-play and can-play-through both land here.
    pub fn on_ready(&mut self) {
        self.ready = true;
        self.duration = known_duration(self.element.duration());
        debug!(duration = self.duration, "media ready");
        if self.autoplay_attempted {
            return;
        }
        self.autoplay_attempted = true;
        match self.element.play() {
            Ok(()) => self.playing = true,
            Err(e) => warn!(error = %e, "autoplay failed"),
        }
    }

    /// Marks the element ready when it already reports a length but no
    /// ready event has been seen yet.
    pub fn sync_ready(&mut self) {
        if !self.ready && known_duration(self.element.duration()) > 0.0 {
            debug!("forcing ready state, duration available");
            self.on_ready();
        }
    }

    /// Overlay click: unmute and restart from the beginning.
    pub fn unmute(&mut self) {
        if !self.ready {
            return;
        }
        self.element.set_muted(false);
        self.muted = false;
        self.overlay_visible = false;
        self.element.pause();
        self.element.set_current_time(0.0);
        self.current_time = 0.0;
        self.play();
    }

    pub fn toggle_play(&mut self) {
        if !self.ready {
            return;
        }
        if self.playing {
            self.element.pause();
            self.playing = false;
        } else {
            self.play();
        }
    }

    pub fn toggle_mute(&mut self) {
        self.muted = !self.muted;
        self.element.set_muted(self.muted);
    }

    pub fn seek(&mut self, seconds: f64) {
        if !self.can_seek() {
            return;
        }
        let target = seconds.clamp(0.0, self.duration);
        debug!(target, duration = self.duration, "seeking");
        self.element.set_current_time(target);
        self.current_time = target;
    }

    pub fn on_time_update(&mut self) {
        self.current_time = self.element.current_time();
    }

    pub fn on_play(&mut self) {
        self.playing = true;
    }

    pub fn on_pause(&mut self) {
        self.playing = false;
    }

    /// `current / duration`, both as `m:ss`.
    pub fn clock_label(&self) -> String {
        format!(
            "{} / {}",
            format_clock(self.current_time),
            format_clock(self.duration)
        )
    }

    /// Text shown on the overlay, if it is visible.
    pub fn overlay_hint(&self) -> Option<&'static str> {
        if !self.overlay_visible {
            return None;
        }
        if self.ready && !self.playing {
            Some("Click anywhere to start playing")
        } else {
            Some("Click to Unmute")
        }
    }

    fn play(&mut self) {
        match self.element.play() {
            Ok(()) => self.playing = true,
            Err(e) => warn!(error = %e, "play request failed"),
        }
    }
}
