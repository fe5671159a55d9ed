use crate::{events::AppEvent, render};
use hol_audio_file::SampleLoader;
use hol_computer_keyboard::{Command, help_text};
use hol_core::{AnswerOutcome, CommandError, Round, Session, keyboard_window};
use hol_persist::{PlayerProfile, Store};
use hol_player::{Sequencer, SequencerEvent, VoiceSink};
use hol_scorecard::{RecordCard, Scorecard, export_record, export_scorecard};
use std::{path::PathBuf, sync::mpsc};

const ANSWER_PROMPT: &str =
    "Decide if the second note is Higher, Lower, or the Same.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// Where exported images go and where the player's name is remembered
#[derive(Debug, Clone)]
pub struct Exports {
    pub out_dir: PathBuf,
    pub store: Store,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ExportKind {
    Scorecard,
    Record,
}

/// An export waiting for the player to type their name
#[derive(Debug, Clone)]
struct PendingExport {
    kind: ExportKind,
    remembered_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Popup {
    pub title: String,
    pub message: String,
}

/// Drives a game from the player's commands and the sequencer's playback events
pub struct Quiz<S, L> {
    session: Session,
    sequencer: Option<Sequencer<S, L>>,
    events: mpsc::Sender<AppEvent>,
    exports: Exports,
    feedback: String,
    popup: Option<Popup>,
    revealed: Option<AnswerOutcome>,
    record_streak: Option<u32>,
    pending_export: Option<PendingExport>,
}

impl<S, L> Quiz<S, L>
where
    S: VoiceSink + 'static,
    L: SampleLoader + 'static,
{
    /// Without a sequencer the quiz still runs, but answers never unlock
    pub fn new(
        session: Session,
        sequencer: Option<Sequencer<S, L>>,
        events: mpsc::Sender<AppEvent>,
        exports: Exports,
    ) -> Self {
        Self {
            session,
            sequencer,
            events,
            exports,
            feedback: "Press Begin Game (b) to start.".to_string(),
            popup: None,
            revealed: None,
            record_streak: None,
            pending_export: None,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn feedback(&self) -> &str {
        &self.feedback
    }

    pub fn popup(&self) -> Option<&Popup> {
        self.popup.as_ref()
    }

    pub fn is_asking_for_name(&self) -> bool {
        self.pending_export.is_some()
    }

    pub fn handle_event(&mut self, event: AppEvent) -> Flow {
        match event {
            AppEvent::Line(line) => self.handle_line(&line),
            AppEvent::InputClosed => {
                self.stop();
                Flow::Quit
            }
            AppEvent::Playback(event) => {
                self.handle_playback(event);
                Flow::Continue
            }
        }
    }

    fn handle_line(&mut self, line: &str) -> Flow {
        if let Some(pending) = self.pending_export.take() {
            self.export(pending, line);
            return Flow::Continue;
        }
        match line.parse::<Command>() {
            Ok(command) => self.handle_command(command),
            Err(e) => {
                self.feedback = e.to_string();
                Flow::Continue
            }
        }
    }

    pub fn handle_command(&mut self, command: Command) -> Flow {
        self.popup = None;
        if command.requires_started() && !self.session.is_started() {
            log::debug!("ignoring {:?} before the game has begun", command);
            return Flow::Continue;
        }
        match command {
            Command::Begin => {
                if self.session.is_started() {
                    log::info!("restarting game");
                }
                let round = self.session.begin();
                self.record_streak = None;
                self.start_round(round);
            }
            Command::Replay => match self.session.replay() {
                Ok(round) => {
                    self.feedback = "Replaying...".to_string();
                    self.revealed = None;
                    self.play(round);
                }
                Err(e) => rejected(command, e),
            },
            Command::Answer(choice) => match self.session.answer(choice) {
                Ok(outcome) => self.reveal(outcome),
                Err(e) => rejected(command, e),
            },
            Command::Next => match self.session.next() {
                Ok(round) => self.start_round(round),
                Err(e) => rejected(command, e),
            },
            Command::SetMode(mode) => {
                log::info!("mode: {}", mode);
                self.revealed = None;
                match self.session.set_mode(mode) {
                    Some(round) => self.start_round(round),
                    None => {
                        self.feedback =
                            format!("Game mode set to {}.", mode.label())
                    }
                }
            }
            Command::Scorecard => self.ask_for_name(ExportKind::Scorecard),
            Command::Record => {
                if self.record_streak.is_some() {
                    self.ask_for_name(ExportKind::Record);
                } else {
                    self.feedback =
                        "There's no new longest streak to download yet."
                            .to_string();
                }
            }
            Command::Help => self.feedback = help_text(),
            Command::Quit => {
                self.stop();
                return Flow::Quit;
            }
        }
        Flow::Continue
    }

    fn handle_playback(&mut self, event: SequencerEvent) {
        let Some(sequencer) = self.sequencer.as_ref() else {
            return;
        };
        if !sequencer.is_current(event.generation()) {
            log::debug!("ignoring stale playback event: {:?}", event);
            return;
        }
        match event {
            SequencerEvent::AnswersUnlocked { .. } => {
                if let Err(e) = self.session.unlock_answers() {
                    log::debug!("couldn't unlock answers: {}", e);
                }
            }
            SequencerEvent::Failed { error, .. } => {
                log::warn!("{}", error);
                self.feedback =
                    format!("Missing audio: {}", error.path().display());
            }
        }
    }

    fn start_round(&mut self, round: Round) {
        self.revealed = None;
        self.feedback = ANSWER_PROMPT.to_string();
        self.play(round);
    }

    fn play(&mut self, round: Round) {
        match self.sequencer.as_mut() {
            Some(sequencer) => {
                sequencer.play_pair(round, self.events.clone());
            }
            None => log::warn!(
                "no audio output so {} and {} can't be played",
                round.first,
                round.second
            ),
        }
    }

    fn stop(&mut self) {
        if let Some(sequencer) = self.sequencer.as_mut() {
            sequencer.stop();
        }
    }

    fn reveal(&mut self, outcome: AnswerOutcome) {
        let round = outcome.round;
        let notes = format!(
            "First: {} -> Second: {}",
            round.first.label(),
            round.second.label()
        );
        self.feedback = if outcome.is_correct() {
            format!("Correct!\n{}.", notes)
        } else {
            format!(
                "Incorrect (You chose {}.)\n{} (Answer: {}).",
                outcome.choice, notes, outcome.expected
            )
        };
        if let Some(record) = outcome.new_record {
            log::info!("new longest streak: {}", record.streak);
            self.record_streak = Some(record.streak);
            self.popup = Some(Popup {
                title: "New Longest Streak!".to_string(),
                message: format!(
                    "New Longest Streak! That's {} correct in a row!",
                    record.streak
                ),
            });
        }
        self.revealed = Some(outcome);
    }

    fn ask_for_name(&mut self, kind: ExportKind) {
        self.pending_export = Some(PendingExport {
            kind,
            remembered_name: PlayerProfile::remembered_name(
                &self.exports.store,
            ),
        });
    }

    fn export(&mut self, pending: PendingExport, input: &str) {
        let input = if input.trim().is_empty() {
            pending.remembered_name.as_str()
        } else {
            input
        };
        let name = PlayerProfile::accept_name(&self.exports.store, input);
        let score = *self.session.score();
        let out_dir = self.exports.out_dir.as_path();
        let (what, result) = match pending.kind {
            ExportKind::Scorecard => {
                let card = Scorecard {
                    name,
                    mode: self.session.mode(),
                    score,
                };
                ("scorecard", export_scorecard(&card, out_dir))
            }
            ExportKind::Record => {
                let streak = if score.longest_stored > 0 {
                    score.longest_stored
                } else {
                    score.displayed_longest()
                };
                let card = RecordCard { name, streak };
                ("record", export_record(&card, out_dir))
            }
        };
        self.feedback = match result {
            Ok(path) => format!("Saved {} to {}", what, path.display()),
            Err(e) => {
                log::error!("failed to export {}: {}", what, e);
                format!("Couldn't save the {}: {}", what, e)
            }
        };
    }

    pub fn render(&self) -> String {
        let mut sections = vec![format!(
            "== Higher Or Lower?! ==  Game mode: {}",
            self.session.mode().label()
        )];
        sections.push(render::score_lines(self.session.score()).join("\n"));
        if !self.feedback.is_empty() {
            sections.push(self.feedback.clone());
        }
        if let Some(outcome) = self.revealed {
            let window = keyboard_window(
                outcome.round.first,
                outcome.round.second,
                self.session.mode().bounds(),
            );
            sections.push(render::keyboard(
                window,
                outcome.round.first,
                outcome.round.second,
            ));
        }
        if let Some(popup) = self.popup.as_ref() {
            sections.push(render::framed(&[
                popup.title.clone(),
                popup.message.clone(),
                "Type \"record\" to download a certificate.".to_string(),
            ]));
        }
        let prompt = match self.pending_export.as_ref() {
            Some(pending) if pending.remembered_name.is_empty() => {
                "Enter your name for the score card:".to_string()
            }
            Some(pending) => format!(
                "Enter your name for the score card [{}]:",
                pending.remembered_name
            ),
            None => render::hint(self.session.phase(), self.sequencer.is_some())
                .to_string(),
        };
        sections.push(prompt);
        sections.join("\n\n")
    }
}

fn rejected(command: Command, error: CommandError) {
    log::debug!("ignoring {:?}: {}", command, error);
}
