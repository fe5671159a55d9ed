//! Pitches are plain integers counting semitones from C in octave 0, so that `octave * 12 +
//! pitch_class` is the pitch. Unlike MIDI note numbers there is no offset and no upper limit. Any
//! integer is a valid pitch, including negative ones.
use std::fmt::Display;

pub const NOTES_PER_OCTAVE: i32 = 12;

/// A note without an octave
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PitchClass {
    index: u8,
}

impl PitchClass {
    const fn from_index(index: u8) -> Self {
        assert!(index < NOTES_PER_OCTAVE as u8);
        Self { index }
    }

    pub const C: Self = Self::from_index(0);
    pub const C_SHARP: Self = Self::from_index(1);
    pub const D: Self = Self::from_index(2);
    pub const D_SHARP: Self = Self::from_index(3);
    pub const E: Self = Self::from_index(4);
    pub const F: Self = Self::from_index(5);
    pub const F_SHARP: Self = Self::from_index(6);
    pub const G: Self = Self::from_index(7);
    pub const G_SHARP: Self = Self::from_index(8);
    pub const A: Self = Self::from_index(9);
    pub const A_SHARP: Self = Self::from_index(10);
    pub const B: Self = Self::from_index(11);

    pub const ALL: [Self; NOTES_PER_OCTAVE as usize] = [
        Self::C,
        Self::C_SHARP,
        Self::D,
        Self::D_SHARP,
        Self::E,
        Self::F,
        Self::F_SHARP,
        Self::G,
        Self::G_SHARP,
        Self::A,
        Self::A_SHARP,
        Self::B,
    ];

    /// Wraps any integer into the range of pitch classes, so -1 is B and 12 is C.
    pub const fn wrapping(index: i32) -> Self {
        Self::from_index(index.rem_euclid(NOTES_PER_OCTAVE) as u8)
    }

    pub const fn to_index(self) -> u8 {
        self.index
    }

    /// The black keys of a piano
    pub const fn is_accidental(self) -> bool {
        matches!(self.index, 1 | 3 | 6 | 8 | 10)
    }

    /// The token used to name audio files containing samples of this pitch class, formatted like
    /// "c" or "csharp".
    pub const fn sample_stem(self) -> &'static str {
        match self.index {
            0 => "c",
            1 => "csharp",
            2 => "d",
            3 => "dsharp",
            4 => "e",
            5 => "f",
            6 => "fsharp",
            7 => "g",
            8 => "gsharp",
            9 => "a",
            10 => "asharp",
            11 => "b",
            _ => unreachable!(),
        }
    }

    /// Formatted like "C" or "C#"
    pub const fn to_str_sharp(self) -> &'static str {
        match self.index {
            0 => "C",
            1 => "C#",
            2 => "D",
            3 => "D#",
            4 => "E",
            5 => "F",
            6 => "F#",
            7 => "G",
            8 => "G#",
            9 => "A",
            10 => "A#",
            11 => "B",
            _ => unreachable!(),
        }
    }

    /// Formatted like "C" or "Db"
    pub const fn to_str_flat(self) -> &'static str {
        match self.index {
            0 => "C",
            1 => "Db",
            2 => "D",
            3 => "Eb",
            4 => "E",
            5 => "F",
            6 => "Gb",
            7 => "G",
            8 => "Ab",
            9 => "A",
            10 => "Bb",
            11 => "B",
            _ => unreachable!(),
        }
    }

    pub const fn in_octave(self, octave: i32) -> Pitch {
        Pitch::new(self, octave)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Pitch(i32);

impl Pitch {
    pub const fn new(class: PitchClass, octave: i32) -> Self {
        Self(octave * NOTES_PER_OCTAVE + class.index as i32)
    }

    pub const fn from_index(index: i32) -> Self {
        Self(index)
    }

    pub const fn to_index(self) -> i32 {
        self.0
    }

    pub const fn class(self) -> PitchClass {
        PitchClass::wrapping(self.0)
    }

    /// Rounds towards negative infinity so pitches below C_0 land in negative octaves.
    pub const fn octave(self) -> i32 {
        self.0.div_euclid(NOTES_PER_OCTAVE)
    }

    pub const fn add_semitones(self, num_semitones: i32) -> Self {
        Self(self.0 + num_semitones)
    }

    /// Number of semitones from `self` up to `other`. Negative if `other` is lower.
    pub const fn semitones_to(self, other: Self) -> i32 {
        other.0 - self.0
    }

    /// The C at or below this pitch
    pub const fn octave_start(self) -> Self {
        Self::new(PitchClass::C, self.octave())
    }

    /// Display name listing both spellings of accidentals, like "C4" or "C#4 / Db4".
    pub fn label(self) -> String {
        let class = self.class();
        let octave = self.octave();
        if class.is_accidental() {
            format!(
                "{}{} / {}{}",
                class.to_str_sharp(),
                octave,
                class.to_str_flat(),
                octave
            )
        } else {
            format!("{}{}", class.to_str_sharp(), octave)
        }
    }
}

impl Display for Pitch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

pub fn to_pitch(class: PitchClass, octave: i32) -> Pitch {
    Pitch::new(class, octave)
}

pub fn class_of(pitch: Pitch) -> PitchClass {
    pitch.class()
}

pub fn octave_of(pitch: Pitch) -> i32 {
    pitch.octave()
}

pub fn sample_key_of(class: PitchClass) -> &'static str {
    class.sample_stem()
}

pub fn label(pitch: Pitch) -> String {
    pitch.label()
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn pitch_of_class_and_octave() {
        assert_eq!(to_pitch(PitchClass::C, 4).to_index(), 48);
        assert_eq!(to_pitch(PitchClass::D, 4).to_index(), 50);
        assert_eq!(to_pitch(PitchClass::B, 0).to_index(), 11);
    }

    #[test]
    fn class_and_octave_round_trip() {
        for octave in -2..9 {
            for class in PitchClass::ALL {
                let pitch = to_pitch(class, octave);
                assert_eq!(class_of(pitch), class);
                assert_eq!(octave_of(pitch), octave);
            }
        }
    }

    #[test]
    fn negative_pitches_floor_into_lower_octave() {
        let pitch = Pitch::from_index(-1);
        assert_eq!(pitch.class(), PitchClass::B);
        assert_eq!(pitch.octave(), -1);
    }

    #[test]
    fn sample_stems() {
        assert_eq!(sample_key_of(PitchClass::C), "c");
        assert_eq!(sample_key_of(PitchClass::F_SHARP), "fsharp");
        assert_eq!(sample_key_of(PitchClass::A_SHARP), "asharp");
    }

    #[test]
    fn labels() {
        assert_eq!(label(to_pitch(PitchClass::C, 4)), "C4");
        assert_eq!(label(to_pitch(PitchClass::C_SHARP, 4)), "C#4 / Db4");
        assert_eq!(label(to_pitch(PitchClass::A_SHARP, 2)), "A#2 / Bb2");
        assert_eq!(to_pitch(PitchClass::E, 3).to_string(), "E3");
    }

    #[test]
    fn exactly_five_accidentals() {
        let count = PitchClass::ALL
            .iter()
            .filter(|class| class.is_accidental())
            .count();
        assert_eq!(count, 5);
    }
}
