//! Gain automation for individual voices. Times are in seconds on the mixer's clock.

/// Shortest window a note can be played for
const MIN_PLAY_S: f64 = 0.05;
/// Shortest fade out at the end of a note
const MIN_FADE_OUT_S: f64 = 0.06;
/// The fade out never starts earlier than this long after the note starts
const MIN_FADE_OUT_START_S: f64 = 0.02;
/// Voices are halted a little after the end of their window
pub const STOP_PADDING_S: f64 = 0.03;

/// Plays a sample from `start_s` for `play_s` seconds, ramping linearly up to `gain` at the start
/// and back down to silence at the end.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NoteWindow {
    pub start_s: f64,
    pub play_s: f64,
    pub fade_in_s: f64,
    pub fade_out_s: f64,
    pub gain: f64,
}

impl NoteWindow {
    pub fn end_s(&self) -> f64 {
        self.start_s + self.play_s.max(MIN_PLAY_S)
    }

    fn fade_out_start_s(&self) -> f64 {
        (self.start_s + MIN_FADE_OUT_START_S)
            .max(self.end_s() - self.fade_out_s.max(MIN_FADE_OUT_S))
    }

    /// Time after which the voice can be discarded
    pub fn stop_s(&self) -> f64 {
        self.end_s() + STOP_PADDING_S
    }

    pub fn gain(&self) -> f64 {
        if self.gain.is_finite() {
            self.gain.max(0.0)
        } else {
            1.0
        }
    }

    pub fn gain_at(&self, t: f64) -> f64 {
        let gain = self.gain();
        let end = self.end_s();
        if t < self.start_s || t >= end {
            return 0.0;
        }
        let fade_in_end = self.start_s + self.fade_in_s;
        if t < fade_in_end {
            return gain * (t - self.start_s) / self.fade_in_s;
        }
        let fade_out_start = self.fade_out_start_s();
        if t < fade_out_start {
            gain
        } else {
            gain * (end - t) / (end - fade_out_start)
        }
    }

    /// The part of the window from `now_s` onwards. The end stays where it was, so a window
    /// that should already have started is shortened rather than moved. Returns `None` if less
    /// than the shortest playable window remains.
    pub fn clipped_to(self, now_s: f64) -> Option<Self> {
        if self.start_s >= now_s {
            return Some(self);
        }
        let remaining_s = self.end_s() - now_s;
        if remaining_s < MIN_PLAY_S {
            return None;
        }
        Some(Self {
            start_s: now_s,
            play_s: remaining_s,
            ..self
        })
    }
}

/// Early termination of a voice. From `at_s` the gain decays exponentially towards zero from
/// wherever it was, and the voice is halted at `halt_s`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StopFade {
    pub at_s: f64,
    pub from_gain: f64,
    pub time_constant_s: f64,
    pub halt_s: f64,
}

/// Stop fades are never shorter than this
pub const MIN_STOP_FADE_S: f64 = 0.02;
const STOP_HALT_PADDING_S: f64 = 0.02;

impl StopFade {
    pub fn new(window: &NoteWindow, at_s: f64, fade_s: f64) -> Self {
        let fade_s = if fade_s.is_finite() {
            fade_s.max(MIN_STOP_FADE_S)
        } else {
            0.06
        };
        let halt_s = (at_s + fade_s).max(window.start_s + 0.001)
            + STOP_HALT_PADDING_S;
        Self {
            at_s,
            from_gain: window.gain_at(at_s),
            time_constant_s: fade_s / 6.0,
            halt_s,
        }
    }

    pub fn gain_at(&self, t: f64) -> f64 {
        if t >= self.halt_s {
            0.0
        } else if t < self.at_s {
            self.from_gain
        } else {
            self.from_gain * (-(t - self.at_s) / self.time_constant_s).exp()
        }
    }
}
