use serde::{Deserialize, Serialize};

/// Reported when a wrong answer breaks a streak longer than any previously broken streak
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NewRecord {
    pub streak: u32,
}

/// Statistics for the current game
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Score {
    pub asked: u32,
    pub correct: u32,
    /// Correct answers in a row since the last mistake
    pub streak: u32,
    /// The longest streak that has been broken by a wrong answer. A streak that is still going is
    /// not included. See `displayed_longest`.
    pub longest_stored: u32,
}

impl Score {
    pub fn record(&mut self, is_correct: bool) -> Option<NewRecord> {
        self.asked += 1;
        if is_correct {
            self.correct += 1;
            self.streak += 1;
            None
        } else {
            let previous_streak = self.streak;
            self.streak = 0;
            if previous_streak > self.longest_stored {
                self.longest_stored = previous_streak;
                Some(NewRecord {
                    streak: previous_streak,
                })
            } else {
                None
            }
        }
    }

    /// Percentage of questions answered correctly, rounded to one decimal place
    pub fn percent_correct(&self) -> f64 {
        if self.asked == 0 {
            return 0.0;
        }
        (self.correct as f64 / self.asked as f64 * 1000.0).round() / 10.0
    }

    pub fn displayed_longest(&self) -> u32 {
        self.longest_stored.max(self.streak)
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
