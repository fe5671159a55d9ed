use crate::envelope::{NoteWindow, StopFade};
use hol_audio_file::SampleBuffer;
use hol_core::CancellationToken;
use std::sync::{Mutex, MutexGuard};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VoiceId(pub u64);

/// Somewhere to schedule samples for playback
pub trait VoiceSink: Send + Sync {
    /// Current time in seconds on the sink's clock
    fn now_s(&self) -> f64;

    /// Adds a voice unless `token` has been cancelled, in which case `None` is returned. The token
    /// is checked atomically with respect to `stop_all`, so a voice is either rejected here or
    /// faded by a later `stop_all`.
    fn schedule(
        &self,
        buffer: SampleBuffer,
        window: NoteWindow,
        token: &CancellationToken,
    ) -> Option<VoiceId>;

    /// Fade out and halt every voice that's currently scheduled or sounding
    fn stop_all(&self, fade_s: f64);

    fn num_active_voices(&self) -> usize;
}

#[derive(Debug, Clone, Copy)]
pub struct LimiterConfig {
    /// default: -6
    pub threshold_db: f32,
    /// default: 20
    pub ratio: f32,
    /// default: 0.001
    pub attack_s: f32,
    /// default: 0.12
    pub release_s: f32,
}

impl Default for LimiterConfig {
    fn default() -> Self {
        Self {
            threshold_db: -6.0,
            ratio: 20.0,
            attack_s: 0.001,
            release_s: 0.12,
        }
    }
}

/// Hard-knee compressor following the peak level of the signal
struct Limiter {
    threshold: f32,
    ratio: f32,
    attack_coef: f32,
    release_coef: f32,
    envelope: f32,
}

fn coef(time_s: f32, sample_rate_hz: u32) -> f32 {
    (-1.0 / (time_s * sample_rate_hz as f32)).exp()
}

impl Limiter {
    fn new(config: LimiterConfig, sample_rate_hz: u32) -> Self {
        Self {
            threshold: 10_f32.powf(config.threshold_db / 20.0),
            ratio: config.ratio,
            attack_coef: coef(config.attack_s, sample_rate_hz),
            release_coef: coef(config.release_s, sample_rate_hz),
            envelope: 0.0,
        }
    }

    fn process(&mut self, x: f32) -> f32 {
        let level = x.abs();
        let coef = if level > self.envelope {
            self.attack_coef
        } else {
            self.release_coef
        };
        self.envelope = coef * self.envelope + (1.0 - coef) * level;
        if self.envelope <= self.threshold {
            return x;
        }
        let target =
            self.threshold + (self.envelope - self.threshold) / self.ratio;
        x * target / self.envelope
    }
}

struct Voice {
    id: VoiceId,
    buffer: SampleBuffer,
    window: NoteWindow,
    stop: Option<StopFade>,
}

impl Voice {
    fn halt_s(&self) -> f64 {
        match self.stop {
            Some(stop) => stop.halt_s.min(self.window.stop_s()),
            None => self.window.stop_s(),
        }
    }

    fn sample(&self, t: f64) -> f32 {
        let gain = match self.stop {
            Some(stop) if t >= stop.at_s && t < self.window.end_s() => {
                stop.gain_at(t)
            }
            Some(stop) if t >= stop.at_s => 0.0,
            _ => self.window.gain_at(t),
        };
        if gain == 0.0 {
            return 0.0;
        }
        let position = (t - self.window.start_s)
            * self.buffer.sample_rate_hz as f64;
        let index = position.floor() as usize;
        let frac = (position - position.floor()) as f32;
        let samples = &self.buffer.samples;
        match (samples.get(index), samples.get(index + 1)) {
            (Some(&a), Some(&b)) => (a + (b - a) * frac) * gain as f32,
            (Some(&a), None) => a * gain as f32,
            _ => 0.0,
        }
    }
}

struct MixerState {
    sample_rate_hz: u32,
    frame: u64,
    voices: Vec<Voice>,
    next_voice_id: u64,
    master_gain: f32,
    limiter: Limiter,
}

impl MixerState {
    fn now_s(&self) -> f64 {
        self.frame as f64 / self.sample_rate_hz as f64
    }
}

#[derive(Debug, Clone, Copy)]
pub struct MixerConfig {
    /// default: 0.9
    pub master_gain: f32,
    pub limiter: LimiterConfig,
}

impl Default for MixerConfig {
    fn default() -> Self {
        Self {
            master_gain: 0.9,
            limiter: LimiterConfig::default(),
        }
    }
}

/// Sums the active voices into an output buffer. The mixer's clock advances only when it renders
/// audio, so time on the clock is the time at which the next rendered sample will be heard.
pub struct Mixer {
    state: Mutex<MixerState>,
}

impl Mixer {
    pub fn new(sample_rate_hz: u32, config: MixerConfig) -> Self {
        Self {
            state: Mutex::new(MixerState {
                sample_rate_hz,
                frame: 0,
                voices: Vec::new(),
                next_voice_id: 0,
                master_gain: config.master_gain,
                limiter: Limiter::new(config.limiter, sample_rate_hz),
            }),
        }
    }

    fn state(&self) -> MutexGuard<'_, MixerState> {
        // The state remains consistent even if a thread panicked while holding the lock, since
        // every update is a single assignment or push.
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Fills `out` with interleaved frames of `channels` channels, writing the same mono signal to
    /// every channel. Voices that have finished are dropped.
    pub fn render(&self, out: &mut [f32], channels: usize) {
        let mut state = self.state();
        let sample_rate_hz = state.sample_rate_hz as f64;
        for frame in out.chunks_mut(channels) {
            let t = state.frame as f64 / sample_rate_hz;
            let mixed =
                state.voices.iter().map(|voice| voice.sample(t)).sum::<f32>();
            let master_gain = state.master_gain;
            let output = state.limiter.process(mixed * master_gain);
            for element in frame {
                *element = output;
            }
            state.frame += 1;
        }
        let now_s = state.now_s();
        state.voices.retain(|voice| {
            let keep = voice.halt_s() > now_s;
            if !keep {
                log::trace!("voice {:?} finished", voice.id);
            }
            keep
        });
    }
}

impl VoiceSink for Mixer {
    fn now_s(&self) -> f64 {
        self.state().now_s()
    }

    /// Windows that should already have started are cut short so they still end on time
    fn schedule(
        &self,
        buffer: SampleBuffer,
        window: NoteWindow,
        token: &CancellationToken,
    ) -> Option<VoiceId> {
        let mut state = self.state();
        token.check()?;
        let id = VoiceId(state.next_voice_id);
        state.next_voice_id += 1;
        let now_s = state.now_s();
        match window.clipped_to(now_s) {
            Some(window) => state.voices.push(Voice {
                id,
                buffer,
                window,
                stop: None,
            }),
            None => {
                log::debug!("voice {:?} was scheduled too late to play", id)
            }
        }
        Some(id)
    }

    fn stop_all(&self, fade_s: f64) {
        let mut state = self.state();
        let now_s = state.now_s();
        for voice in state.voices.iter_mut() {
            if voice.stop.is_none() {
                voice.stop = Some(StopFade::new(&voice.window, now_s, fade_s));
            }
        }
    }

    fn num_active_voices(&self) -> usize {
        self.state().voices.len()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use hol_core::TokenSource;

    const SAMPLE_RATE_HZ: u32 = 1000;

    fn quiet_mixer() -> Mixer {
        Mixer::new(
            SAMPLE_RATE_HZ,
            MixerConfig {
                master_gain: 1.0,
                limiter: LimiterConfig {
                    threshold_db: 0.0,
                    ..Default::default()
                },
            },
        )
    }

    fn constant_buffer(value: f32, len: usize) -> SampleBuffer {
        SampleBuffer::new(SAMPLE_RATE_HZ, vec![value; len])
    }

    fn window(start_s: f64, play_s: f64) -> NoteWindow {
        NoteWindow {
            start_s,
            play_s,
            fade_in_s: 0.01,
            fade_out_s: 0.1,
            gain: 1.0,
        }
    }

    fn token() -> CancellationToken {
        TokenSource::new().renew()
    }

    fn render_s(mixer: &Mixer, duration_s: f64) -> Vec<f32> {
        let mut out =
            vec![0.0; (duration_s * SAMPLE_RATE_HZ as f64).round() as usize];
        mixer.render(&mut out, 1);
        out
    }

    #[test]
    fn voice_sounds_only_within_its_window() {
        let mixer = quiet_mixer();
        mixer.schedule(
            constant_buffer(0.25, 2000),
            window(0.1, 0.5),
            &token(),
        );
        let out = render_s(&mixer, 1.0);
        assert!(out[..100].iter().all(|&x| x == 0.0));
        assert!((out[300] - 0.25).abs() < 1e-6);
        assert!(out[650..].iter().all(|&x| x == 0.0));
    }

    #[test]
    fn finished_voices_are_removed() {
        let mixer = quiet_mixer();
        mixer.schedule(
            constant_buffer(0.25, 2000),
            window(0.0, 0.2),
            &token(),
        );
        assert_eq!(mixer.num_active_voices(), 1);
        render_s(&mixer, 0.1);
        assert_eq!(mixer.num_active_voices(), 1);
        render_s(&mixer, 0.2);
        assert_eq!(mixer.num_active_voices(), 0);
    }

    #[test]
    fn stop_all_fades_and_halts() {
        let mixer = quiet_mixer();
        mixer.schedule(
            constant_buffer(0.25, 5000),
            window(0.0, 4.0),
            &token(),
        );
        mixer.schedule(
            constant_buffer(0.25, 5000),
            window(0.6, 1.0),
            &token(),
        );
        render_s(&mixer, 0.5);
        mixer.stop_all(0.08);
        let out = render_s(&mixer, 0.2);
        assert!(out[0] > 0.2);
        assert!(out[50] < 0.01);
        assert!(out[150..].iter().all(|&x| x == 0.0));
        assert_eq!(mixer.num_active_voices(), 0);
    }

    #[test]
    fn late_windows_are_cut_short() {
        let mixer = quiet_mixer();
        render_s(&mixer, 0.5);
        mixer.schedule(
            constant_buffer(0.25, 2000),
            window(0.2, 0.5),
            &token(),
        );
        let out = render_s(&mixer, 0.5);
        assert!((out[50] - 0.25).abs() < 1e-6);
        assert!(out[200..].iter().all(|&x| x == 0.0));
    }

    #[test]
    fn windows_already_over_add_no_voice() {
        let mixer = quiet_mixer();
        render_s(&mixer, 1.0);
        let id = mixer.schedule(
            constant_buffer(0.25, 2000),
            window(0.2, 0.5),
            &token(),
        );
        assert!(id.is_some());
        assert_eq!(mixer.num_active_voices(), 0);
    }

    #[test]
    fn cancelled_requests_add_no_voice() {
        let mixer = quiet_mixer();
        let token = token();
        token.cancel();
        let id = mixer.schedule(
            constant_buffer(0.25, 2000),
            window(0.0, 0.5),
            &token,
        );
        assert_eq!(id, None);
        assert_eq!(mixer.num_active_voices(), 0);
    }

    #[test]
    fn resamples_buffers_at_other_rates() {
        let mixer = quiet_mixer();
        let ramp = (0..4000).map(|i| i as f32 / 4000.0).collect::<Vec<_>>();
        mixer.schedule(
            SampleBuffer::new(2 * SAMPLE_RATE_HZ, ramp),
            NoteWindow {
                fade_in_s: 0.0,
                ..window(0.0, 1.0)
            },
            &token(),
        );
        let out = render_s(&mixer, 1.0);
        assert!((out[100] - 200.0 / 4000.0).abs() < 1e-4);
    }

    #[test]
    fn limiter_tames_loud_signals() {
        let mixer = Mixer::new(SAMPLE_RATE_HZ, MixerConfig::default());
        mixer.schedule(
            constant_buffer(1.0, 2000),
            window(0.0, 1.0),
            &token(),
        );
        let out = render_s(&mixer, 0.5);
        let threshold = 10_f32.powf(-6.0 / 20.0);
        assert!(out[400] < 0.9);
        assert!(out[400] > threshold);
    }

    #[test]
    fn every_channel_gets_the_same_signal() {
        let mixer = quiet_mixer();
        mixer.schedule(
            constant_buffer(0.25, 2000),
            window(0.0, 1.0),
            &token(),
        );
        let mut out = vec![0.0; 400];
        mixer.render(&mut out, 2);
        assert_eq!(out[300], out[301]);
        assert!((mixer.now_s() - 0.2).abs() < 1e-9);
    }
}
