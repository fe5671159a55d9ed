use crate::{mode::PitchRange, pitch::Pitch};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::{fmt::Display, str::FromStr};

/// The largest distance in semitones between the two pitches of a round
pub const MAX_INTERVAL_SEMITONES: i32 = 3;

/// Number of candidate second pitches drawn before giving up and falling back to a neighbouring
/// pitch
pub const MAX_ATTEMPTS: usize = 30;

/// Cumulative probability thresholds for intervals of 0, 1, 2 and 3 semitones. Small intervals are
/// much more common than large ones.
const INTERVAL_THRESHOLDS: [(f64, i32); 4] =
    [(0.14, 0), (0.62, 1), (0.90, 2), (1.0, 3)];

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Answer {
    Higher,
    Lower,
    Same,
}

impl Answer {
    /// How the second pitch relates to the first
    pub fn expected(first: Pitch, second: Pitch) -> Self {
        use std::cmp::Ordering;
        match second.cmp(&first) {
            Ordering::Equal => Self::Same,
            Ordering::Greater => Self::Higher,
            Ordering::Less => Self::Lower,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Higher => "higher",
            Self::Lower => "lower",
            Self::Same => "same",
        }
    }
}

impl Display for Answer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Answer {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "higher" => Ok(Self::Higher),
            "lower" => Ok(Self::Lower),
            "same" => Ok(Self::Same),
            _ => Err(format!("Failed to parse answer: {}", s)),
        }
    }
}

/// The two pitches of a single question
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Round {
    pub first: Pitch,
    pub second: Pitch,
}

impl Round {
    pub fn new(first: Pitch, second: Pitch) -> Self {
        Self { first, second }
    }

    pub fn expected_answer(&self) -> Answer {
        Answer::expected(self.first, self.second)
    }

    pub fn interval_semitones(&self) -> i32 {
        self.first.semitones_to(self.second).abs()
    }
}

pub fn pick_interval_semitones<R: Rng>(rng: &mut R) -> i32 {
    let r = rng.random::<f64>();
    INTERVAL_THRESHOLDS
        .iter()
        .find(|&&(threshold, _)| r < threshold)
        .map_or(MAX_INTERVAL_SEMITONES, |&(_, interval)| interval)
}

fn random_direction<R: Rng>(rng: &mut R) -> i32 {
    if rng.random_bool(0.5) { -1 } else { 1 }
}

/// Picks a pair of pitches within `range` that are at most `MAX_INTERVAL_SEMITONES` apart. Always
/// terminates, even when the range holds a single pitch.
pub fn generate<R: Rng>(rng: &mut R, range: PitchRange) -> Round {
    let first = Pitch::from_index(
        rng.random_range(range.min.to_index()..=range.max.to_index()),
    );
    for _ in 0..MAX_ATTEMPTS {
        let interval = pick_interval_semitones(rng);
        let second = if interval == 0 {
            first
        } else {
            first.add_semitones(random_direction(rng) * interval)
        };
        if !range.contains(second) {
            continue;
        }
        if first.semitones_to(second).abs() > MAX_INTERVAL_SEMITONES {
            continue;
        }
        return Round::new(first, second);
    }
    log::debug!(
        "no candidate within {:?} after {} attempts; using a neighbour of {}",
        range,
        MAX_ATTEMPTS,
        first
    );
    let second = range.clamp(first.add_semitones(random_direction(rng)));
    Round::new(first, second)
}
