use crate::pitch::{Pitch, PitchClass};
use serde::{Deserialize, Serialize};
use std::{fmt::Display, str::FromStr};

/// An inclusive range of pitches
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PitchRange {
    pub min: Pitch,
    pub max: Pitch,
}

impl PitchRange {
    pub fn new(min: Pitch, max: Pitch) -> Self {
        assert!(min <= max, "empty pitch range");
        Self { min, max }
    }

    /// The range starting at C in `start_octave` and ending on the C `octave_span` octaves above
    /// it. The final C is included.
    pub fn octaves(start_octave: i32, octave_span: i32) -> Self {
        Self::new(
            PitchClass::C.in_octave(start_octave),
            PitchClass::C.in_octave(start_octave + octave_span),
        )
    }

    pub fn contains(&self, pitch: Pitch) -> bool {
        pitch >= self.min && pitch <= self.max
    }

    pub fn clamp(&self, pitch: Pitch) -> Pitch {
        pitch.clamp(self.min, self.max)
    }

    /// Number of semitones between the lowest and highest pitch
    pub fn span_semitones(&self) -> i32 {
        self.min.semitones_to(self.max)
    }

    pub fn iter(&self) -> impl Iterator<Item = Pitch> {
        (self.min.to_index()..=self.max.to_index()).map(Pitch::from_index)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RangeConfig {
    pub label: &'static str,
    pub start_octave: i32,
    pub octave_span: i32,
}

impl RangeConfig {
    pub fn bounds(&self) -> PitchRange {
        PitchRange::octaves(self.start_octave, self.octave_span)
    }
}

/// Difficulty presets
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize,
)]
pub enum Mode {
    #[serde(rename = "easy-1oct")]
    Easy1Oct,
    #[serde(rename = "med-2oct")]
    Med2Oct,
    #[serde(rename = "hard-3oct")]
    Hard3Oct,
    #[default]
    #[serde(rename = "expert-4oct")]
    Expert4Oct,
}

impl Mode {
    pub const ALL: [Self; 4] =
        [Self::Easy1Oct, Self::Med2Oct, Self::Hard3Oct, Self::Expert4Oct];

    pub const fn config(self) -> RangeConfig {
        match self {
            Self::Easy1Oct => RangeConfig {
                label: "Easy (1 octave)",
                start_octave: 4,
                octave_span: 1,
            },
            Self::Med2Oct => RangeConfig {
                label: "Medium (2 octaves)",
                start_octave: 3,
                octave_span: 2,
            },
            Self::Hard3Oct => RangeConfig {
                label: "Hard (3 octaves)",
                start_octave: 3,
                octave_span: 3,
            },
            Self::Expert4Oct => RangeConfig {
                label: "Expert (4 octaves)",
                start_octave: 2,
                octave_span: 4,
            },
        }
    }

    pub const fn key(self) -> &'static str {
        match self {
            Self::Easy1Oct => "easy-1oct",
            Self::Med2Oct => "med-2oct",
            Self::Hard3Oct => "hard-3oct",
            Self::Expert4Oct => "expert-4oct",
        }
    }

    pub const fn label(self) -> &'static str {
        self.config().label
    }

    pub fn bounds(self) -> PitchRange {
        self.config().bounds()
    }
}

/// Formats as the key, like "easy-1oct"
impl Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.key())
    }
}

impl FromStr for Mode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|mode| mode.key() == s)
            .ok_or_else(|| {
                let keys =
                    Self::ALL.map(|mode| mode.key()).join(", ");
                format!("Unknown mode \"{}\" (expected one of: {}).", s, keys)
            })
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn bounds_span_whole_octaves() {
        for mode in Mode::ALL {
            let bounds = mode.bounds();
            assert!(bounds.min < bounds.max);
            assert_eq!(
                bounds.span_semitones(),
                12 * mode.config().octave_span
            );
        }
    }

    #[test]
    fn easy_mode_bounds() {
        let bounds = Mode::Easy1Oct.bounds();
        assert_eq!(bounds.min.to_index(), 48);
        assert_eq!(bounds.max.to_index(), 60);
    }

    #[test]
    fn key_round_trip() {
        for mode in Mode::ALL {
            assert_eq!(mode.to_string().parse::<Mode>().unwrap(), mode);
        }
        assert!("impossible-9oct".parse::<Mode>().is_err());
    }

    #[test]
    fn default_is_expert() {
        assert_eq!(Mode::default(), Mode::Expert4Oct);
    }

    #[test]
    fn clamp_into_range() {
        let range = PitchRange::octaves(4, 0);
        assert_eq!(range.clamp(Pitch::from_index(49)), range.max);
        assert_eq!(range.clamp(Pitch::from_index(47)), range.min);
        assert_eq!(range.iter().count(), 1);
    }
}
