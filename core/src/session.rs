use crate::{
    mode::Mode,
    round::{self, Answer, Round},
    score::{NewRecord, Score},
};
use rand::{SeedableRng, rngs::StdRng};

/// Lifecycle of the current question
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// No game has been started
    Idle,
    /// The pitches of the round are being played. Answers are locked.
    Playing {
        /// Set when replaying a round that has already been answered, so that unlocking returns
        /// to `Answered` instead of accepting a second answer.
        answered: bool,
    },
    AwaitingAnswer,
    Answered,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum CommandError {
    #[error("no game has been started")]
    NotStarted,
    #[error("answers are not being accepted right now")]
    AnswersLocked,
    #[error("the current round has not been answered yet")]
    NotAnswered,
    #[error("nothing is playing")]
    NotPlaying,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnswerOutcome {
    pub round: Round,
    pub choice: Answer,
    pub expected: Answer,
    pub new_record: Option<NewRecord>,
}

impl AnswerOutcome {
    pub fn is_correct(&self) -> bool {
        self.choice == self.expected
    }
}

/// The state of one player's game. Commands return the round that should be played (if any) and
/// leave the playback itself to the caller.
pub struct Session {
    mode: Mode,
    score: Score,
    round: Option<Round>,
    phase: Phase,
    rng: StdRng,
}

impl Session {
    pub fn new(mode: Mode, rng: StdRng) -> Self {
        Self {
            mode,
            score: Score::default(),
            round: None,
            phase: Phase::Idle,
            rng,
        }
    }

    pub fn from_seed(mode: Mode, seed: u64) -> Self {
        Self::new(mode, StdRng::seed_from_u64(seed))
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn score(&self) -> &Score {
        &self.score
    }

    pub fn round(&self) -> Option<Round> {
        self.round
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_started(&self) -> bool {
        self.phase != Phase::Idle
    }

    pub fn can_answer(&self) -> bool {
        self.phase == Phase::AwaitingAnswer
    }

    fn start_round(&mut self) -> Round {
        let round = round::generate(&mut self.rng, self.mode.bounds());
        log::debug!(
            "new round in {}: {} then {}",
            self.mode,
            round.first,
            round.second
        );
        self.round = Some(round);
        self.phase = Phase::Playing { answered: false };
        round
    }

    /// Starts a new game, or restarts the current one. The score is cleared either way.
    pub fn begin(&mut self) -> Round {
        self.score.reset();
        self.start_round()
    }

    pub fn replay(&mut self) -> Result<Round, CommandError> {
        let round = self.round.ok_or(CommandError::NotStarted)?;
        let answered = match self.phase {
            Phase::Idle => return Err(CommandError::NotStarted),
            Phase::Playing { answered } => answered,
            Phase::AwaitingAnswer => false,
            Phase::Answered => true,
        };
        self.phase = Phase::Playing { answered };
        Ok(round)
    }

    /// Called once both pitches have been played
    pub fn unlock_answers(&mut self) -> Result<(), CommandError> {
        match self.phase {
            Phase::Playing { answered: false } => {
                self.phase = Phase::AwaitingAnswer;
                Ok(())
            }
            Phase::Playing { answered: true } => {
                self.phase = Phase::Answered;
                Ok(())
            }
            Phase::Idle => Err(CommandError::NotStarted),
            Phase::AwaitingAnswer | Phase::Answered => {
                Err(CommandError::NotPlaying)
            }
        }
    }

    pub fn answer(
        &mut self,
        choice: Answer,
    ) -> Result<AnswerOutcome, CommandError> {
        match self.phase {
            Phase::AwaitingAnswer => (),
            Phase::Idle => return Err(CommandError::NotStarted),
            _ => return Err(CommandError::AnswersLocked),
        }
        let round = self.round.ok_or(CommandError::NotStarted)?;
        let expected = round.expected_answer();
        let new_record = self.score.record(choice == expected);
        self.phase = Phase::Answered;
        Ok(AnswerOutcome {
            round,
            choice,
            expected,
            new_record,
        })
    }

    pub fn next(&mut self) -> Result<Round, CommandError> {
        match self.phase {
            Phase::Answered => Ok(self.start_round()),
            Phase::Idle => Err(CommandError::NotStarted),
            _ => Err(CommandError::NotAnswered),
        }
    }

    /// Switches the range of pitches. If a game is running a new round starts immediately and is
    /// returned.
    pub fn set_mode(&mut self, mode: Mode) -> Option<Round> {
        self.mode = mode;
        if self.is_started() {
            Some(self.start_round())
        } else {
            None
        }
    }
}
