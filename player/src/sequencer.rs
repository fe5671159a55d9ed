use crate::{envelope::NoteWindow, mixer::VoiceSink};
use hol_audio_file::{AssetError, SampleLoader};
use hol_core::{CancellationToken, Generation, Pitch, Round, TokenSource};
use std::{
    sync::{Arc, mpsc},
    thread,
    time::Duration,
};

#[derive(Debug, Clone, Copy)]
pub struct Timing {
    /// How long each note plays for. default: 1.2
    pub note_s: f64,
    /// default: 0.01
    pub fade_in_s: f64,
    /// default: 0.1
    pub fade_out_s: f64,
    /// Silence between the two notes. default: 0.01
    pub gap_s: f64,
    /// Delay between a request and the first note starting. default: 0.03
    pub lead_in_s: f64,
    /// Answers unlock this long after `note_s` has elapsed since both notes were scheduled.
    /// default: 0.04
    pub unlock_margin_s: f64,
    /// Fade applied to sounding notes when playback is restarted. default: 0.08
    pub stop_fade_s: f64,
}

impl Default for Timing {
    fn default() -> Self {
        Self {
            note_s: 1.2,
            fade_in_s: 0.01,
            fade_out_s: 0.1,
            gap_s: 0.01,
            lead_in_s: 0.03,
            unlock_margin_s: 0.04,
            stop_fade_s: 0.08,
        }
    }
}

impl Timing {
    pub fn window(&self, start_s: f64) -> NoteWindow {
        NoteWindow {
            start_s,
            play_s: self.note_s,
            fade_in_s: self.fade_in_s,
            fade_out_s: self.fade_out_s,
            gain: 1.0,
        }
    }

    /// Offset of the second note from the start of the first
    pub fn second_note_offset_s(&self) -> f64 {
        self.note_s + self.gap_s
    }

    pub fn unlock_delay(&self) -> Duration {
        Duration::from_secs_f64(self.note_s + self.unlock_margin_s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SequencerEvent {
    /// Both notes of the request with this generation have played and answers may be accepted
    AnswersUnlocked { generation: Generation },
    /// A sample couldn't be loaded so the request was abandoned
    Failed {
        generation: Generation,
        error: AssetError,
    },
}

impl SequencerEvent {
    pub fn generation(&self) -> Generation {
        match self {
            Self::AnswersUnlocked { generation } => *generation,
            Self::Failed { generation, .. } => *generation,
        }
    }
}

/// Plays the two notes of a round one after the other. Each request runs on its own thread and
/// reports back over a channel. Starting a new request cancels the previous one, and a cancelled
/// request stops at its next step without reporting anything.
pub struct Sequencer<S, L> {
    sink: Arc<S>,
    loader: Arc<L>,
    timing: Timing,
    tokens: TokenSource,
}

struct Request<S, L> {
    sink: Arc<S>,
    loader: Arc<L>,
    timing: Timing,
    token: CancellationToken,
    round: Round,
}

impl<S, L> Request<S, L>
where
    S: VoiceSink,
    L: SampleLoader,
{
    fn play_pitch(
        &self,
        pitch: Pitch,
        start_s: f64,
    ) -> Option<Result<(), AssetError>> {
        let buffer = match self.loader.load(pitch) {
            Ok(buffer) => buffer,
            Err(error) => return Some(Err(error)),
        };
        log::debug!("scheduling {} at {:.3}s", pitch, start_s);
        let window = self.timing.window(start_s);
        self.sink.schedule(buffer, window, &self.token)?;
        Some(Ok(()))
    }

    /// Returns `None` if the request was cancelled along the way
    fn run(&self) -> Option<SequencerEvent> {
        let generation = self.token.generation();
        let failed = |error| SequencerEvent::Failed { generation, error };
        let t0 = self.sink.now_s() + self.timing.lead_in_s;
        if let Err(error) = self.play_pitch(self.round.first, t0)? {
            return Some(failed(error));
        }
        let t1 = t0 + self.timing.second_note_offset_s();
        if let Err(error) = self.play_pitch(self.round.second, t1)? {
            return Some(failed(error));
        }
        thread::sleep(self.timing.unlock_delay());
        self.token.check()?;
        Some(SequencerEvent::AnswersUnlocked { generation })
    }
}

impl<S, L> Sequencer<S, L>
where
    S: VoiceSink + 'static,
    L: SampleLoader + 'static,
{
    pub fn new(sink: Arc<S>, loader: Arc<L>, timing: Timing) -> Self {
        Self {
            sink,
            loader,
            timing,
            tokens: TokenSource::new(),
        }
    }

    /// Stops anything currently playing, then plays both notes of `round`. The outcome is sent to
    /// `events` tagged with the returned generation.
    pub fn play_pair<E>(
        &mut self,
        round: Round,
        events: mpsc::Sender<E>,
    ) -> Generation
    where
        E: From<SequencerEvent> + Send + 'static,
    {
        let token = self.tokens.renew();
        let generation = token.generation();
        self.sink.stop_all(self.timing.stop_fade_s);
        let request = Request {
            sink: Arc::clone(&self.sink),
            loader: Arc::clone(&self.loader),
            timing: self.timing,
            token,
            round,
        };
        thread::spawn(move || {
            let Some(event) = request.run() else {
                log::debug!("playback {:?} cancelled", generation);
                return;
            };
            // The token is checked once more so a request cancelled while it was reporting a
            // failure stays quiet.
            if request.token.is_cancelled() {
                return;
            }
            if events.send(E::from(event)).is_err() {
                log::warn!("event loop stopped listening for playback events");
            }
        });
        generation
    }

    /// Cancels the current request and fades out everything that's playing
    pub fn stop(&mut self) {
        self.tokens.cancel();
        self.sink.stop_all(self.timing.stop_fade_s);
    }

    /// Whether `generation` identifies the most recent request, and it hasn't been stopped
    pub fn is_current(&self, generation: Generation) -> bool {
        self.tokens.is_current(generation)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::mixer::{LimiterConfig, Mixer, MixerConfig, VoiceId};
    use hol_audio_file::SampleBuffer;
    use hol_core::PitchClass;
    use std::{
        collections::HashSet,
        path::PathBuf,
        sync::Mutex,
        time::{Duration, Instant},
    };

    #[derive(Default)]
    struct RecordingSink {
        scheduled: Mutex<Vec<(Pitch, NoteWindow)>>,
        num_stops: Mutex<usize>,
    }

    impl VoiceSink for RecordingSink {
        fn now_s(&self) -> f64 {
            10.0
        }

        fn schedule(
            &self,
            buffer: SampleBuffer,
            window: NoteWindow,
            token: &CancellationToken,
        ) -> Option<VoiceId> {
            token.check()?;
            // Test buffers hold the pitch index as their only sample
            let pitch = Pitch::from_index(buffer.samples[0] as i32);
            let mut scheduled = self.scheduled.lock().unwrap();
            scheduled.push((pitch, window));
            Some(VoiceId(scheduled.len() as u64))
        }

        fn stop_all(&self, _fade_s: f64) {
            *self.num_stops.lock().unwrap() += 1;
        }

        fn num_active_voices(&self) -> usize {
            self.scheduled.lock().unwrap().len()
        }
    }

    struct FakeLoader {
        missing: HashSet<Pitch>,
    }

    impl SampleLoader for FakeLoader {
        fn load(&self, pitch: Pitch) -> Result<SampleBuffer, AssetError> {
            if self.missing.contains(&pitch) {
                let path = format!("audio/{}.wav", pitch.to_index());
                Err(AssetError::Unavailable {
                    path: PathBuf::from(path),
                    reason: "not found".to_string(),
                })
            } else {
                Ok(SampleBuffer::new(1000, vec![pitch.to_index() as f32]))
            }
        }
    }

    const MIXER_RATE_HZ: u32 = 1000;
    const NOTE_LEVEL: f32 = 0.25;

    fn quiet_mixer() -> Mixer {
        Mixer::new(
            MIXER_RATE_HZ,
            MixerConfig {
                master_gain: 1.0,
                limiter: LimiterConfig {
                    threshold_db: 0.0,
                    ..Default::default()
                },
            },
        )
    }

    fn render_s(mixer: &Mixer, duration_s: f64) -> Vec<f32> {
        let mut out =
            vec![0.0; (duration_s * MIXER_RATE_HZ as f64).round() as usize];
        mixer.render(&mut out, 1);
        out
    }

    /// Takes long enough over the first sample that the mixer's clock moves past the time the
    /// first note was meant to start
    struct SlowLoader {
        mixer: Arc<Mixer>,
        num_loads: Mutex<usize>,
    }

    impl SampleLoader for SlowLoader {
        fn load(&self, _: Pitch) -> Result<SampleBuffer, AssetError> {
            let mut num_loads = self.num_loads.lock().unwrap();
            if *num_loads == 0 {
                render_s(&self.mixer, 0.1);
            }
            *num_loads += 1;
            Ok(SampleBuffer::new(MIXER_RATE_HZ, vec![NOTE_LEVEL; 2000]))
        }
    }

    /// Behaves as if a newer request cancelled this one just as a note was being scheduled
    struct CancellingSink {
        mixer: Mixer,
    }

    impl VoiceSink for CancellingSink {
        fn now_s(&self) -> f64 {
            self.mixer.now_s()
        }

        fn schedule(
            &self,
            buffer: SampleBuffer,
            window: NoteWindow,
            token: &CancellationToken,
        ) -> Option<VoiceId> {
            token.cancel();
            self.mixer.schedule(buffer, window, token)
        }

        fn stop_all(&self, fade_s: f64) {
            self.mixer.stop_all(fade_s);
        }

        fn num_active_voices(&self) -> usize {
            self.mixer.num_active_voices()
        }
    }

    fn timing() -> Timing {
        Timing {
            note_s: 0.05,
            unlock_margin_s: 0.01,
            ..Default::default()
        }
    }

    fn sequencer(
        missing: impl IntoIterator<Item = Pitch>,
    ) -> (Arc<RecordingSink>, Sequencer<RecordingSink, FakeLoader>) {
        let _ = env_logger::builder().is_test(true).try_init();
        let sink = Arc::new(RecordingSink::default());
        let loader = Arc::new(FakeLoader {
            missing: missing.into_iter().collect(),
        });
        let sequencer = Sequencer::new(Arc::clone(&sink), loader, timing());
        (sink, sequencer)
    }

    fn collect_events(
        receiver: &mpsc::Receiver<SequencerEvent>,
        for_duration: Duration,
    ) -> Vec<SequencerEvent> {
        let deadline = Instant::now() + for_duration;
        let mut events = Vec::new();
        while let Some(remaining) =
            deadline.checked_duration_since(Instant::now())
        {
            if let Ok(event) = receiver.recv_timeout(remaining) {
                events.push(event);
            }
        }
        events
    }

    fn round() -> Round {
        Round::new(PitchClass::C.in_octave(4), PitchClass::D.in_octave(4))
    }

    #[test]
    fn plays_notes_back_to_back_then_unlocks() {
        let (sink, mut sequencer) = sequencer([]);
        let (sender, receiver) = mpsc::channel();
        let generation = sequencer.play_pair(round(), sender);
        let events = collect_events(&receiver, Duration::from_millis(300));
        assert_eq!(
            events,
            vec![SequencerEvent::AnswersUnlocked { generation }]
        );
        assert!(sequencer.is_current(generation));
        let scheduled = sink.scheduled.lock().unwrap();
        assert_eq!(scheduled.len(), 2);
        let (first_pitch, first_window) = scheduled[0];
        let (second_pitch, second_window) = scheduled[1];
        assert_eq!(first_pitch, round().first);
        assert_eq!(second_pitch, round().second);
        assert!((first_window.start_s - 10.03).abs() < 1e-9);
        assert!(
            (second_window.start_s - first_window.start_s - 0.06).abs() < 1e-9
        );
        assert_eq!(*sink.num_stops.lock().unwrap(), 1);
    }

    #[test]
    fn missing_sample_aborts_playback() {
        let (sink, mut sequencer) = sequencer([round().second]);
        let (sender, receiver) = mpsc::channel();
        let generation = sequencer.play_pair(round(), sender);
        let events = collect_events(&receiver, Duration::from_millis(300));
        assert_eq!(events.len(), 1);
        match &events[0] {
            SequencerEvent::Failed {
                generation: failed_generation,
                error,
            } => {
                assert_eq!(*failed_generation, generation);
                assert_eq!(error.path(), PathBuf::from("audio/50.wav"));
            }
            other => panic!("unexpected event: {:?}", other),
        }
        assert_eq!(sink.scheduled.lock().unwrap().len(), 1);
    }

    #[test]
    fn new_request_supersedes_old_one() {
        let (sink, mut sequencer) = sequencer([]);
        let (sender, receiver) = mpsc::channel();
        let stale = sequencer.play_pair(round(), sender.clone());
        let current = sequencer.play_pair(round(), sender);
        assert!(!sequencer.is_current(stale));
        let events = collect_events(&receiver, Duration::from_millis(300));
        assert_eq!(
            events,
            vec![SequencerEvent::AnswersUnlocked {
                generation: current
            }]
        );
        assert_eq!(*sink.num_stops.lock().unwrap(), 2);
    }

    #[test]
    fn stop_cancels_without_reporting() {
        let (_sink, mut sequencer) = sequencer([]);
        let (sender, receiver) = mpsc::channel();
        let generation = sequencer.play_pair(round(), sender);
        sequencer.stop();
        assert!(!sequencer.is_current(generation));
        let events = collect_events(&receiver, Duration::from_millis(200));
        assert!(events.is_empty());
    }

    #[test]
    fn slow_first_load_does_not_overlap_notes() {
        let _ = env_logger::builder().is_test(true).try_init();
        let mixer = Arc::new(quiet_mixer());
        let loader = Arc::new(SlowLoader {
            mixer: Arc::clone(&mixer),
            num_loads: Mutex::new(0),
        });
        let timing = Timing {
            note_s: 0.2,
            unlock_margin_s: 0.01,
            ..Default::default()
        };
        let mut sequencer = Sequencer::new(Arc::clone(&mixer), loader, timing);
        let (sender, receiver) = mpsc::channel();
        let generation = sequencer.play_pair(round(), sender);
        assert_eq!(
            receiver.recv_timeout(Duration::from_secs(2)),
            Ok(SequencerEvent::AnswersUnlocked { generation })
        );
        let out = render_s(&mixer, 3.0);
        assert_eq!(out.iter().filter(|&&x| x > NOTE_LEVEL + 0.05).count(), 0);
        assert!(out.iter().any(|&x| (x - NOTE_LEVEL).abs() < 1e-6));
    }

    #[test]
    fn cancelled_while_scheduling_adds_no_voice() {
        let _ = env_logger::builder().is_test(true).try_init();
        let sink = Arc::new(CancellingSink {
            mixer: quiet_mixer(),
        });
        let loader = Arc::new(FakeLoader {
            missing: HashSet::new(),
        });
        let mut sequencer = Sequencer::new(Arc::clone(&sink), loader, timing());
        let (sender, receiver) = mpsc::channel();
        let generation = sequencer.play_pair(round(), sender);
        let events = collect_events(&receiver, Duration::from_millis(200));
        assert!(events.is_empty());
        assert!(!sequencer.is_current(generation));
        assert_eq!(sink.num_active_voices(), 0);
    }
}
