use crate::{
    mode::PitchRange,
    pitch::{NOTES_PER_OCTAVE, Pitch},
};

const WINDOW_SEMITONES: i32 = 2 * NOTES_PER_OCTAVE;

/// The (up to) two octaves of keys to show when revealing the pitches of a round. The window
/// starts on a C, contains both pitches where possible, and never extends past `bounds`.
pub fn keyboard_window(a: Pitch, b: Pitch, bounds: PitchRange) -> PitchRange {
    let low = a.min(b);
    let high = a.max(b);
    let mut start = low.octave_start();
    let mut end = start.add_semitones(WINDOW_SEMITONES);
    if high > end {
        start = start.add_semitones(NOTES_PER_OCTAVE);
        end = start.add_semitones(WINDOW_SEMITONES);
    }
    if start < bounds.min {
        start = bounds.min;
        end = start.add_semitones(WINDOW_SEMITONES);
    }
    if end > bounds.max {
        end = bounds.max;
        start = end.add_semitones(-WINDOW_SEMITONES);
    }
    PitchRange::new(bounds.clamp(start), bounds.clamp(end))
}
