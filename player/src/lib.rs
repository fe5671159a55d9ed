pub mod envelope;
pub mod mixer;
pub mod output;
pub mod sequencer;

pub use envelope::{NoteWindow, StopFade};
pub use mixer::{LimiterConfig, Mixer, MixerConfig, VoiceId, VoiceSink};
pub use output::{Config, Output};
pub use sequencer::{Sequencer, SequencerEvent, Timing};
