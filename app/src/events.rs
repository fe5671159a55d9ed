use hol_player::SequencerEvent;
use std::{
    io::BufRead,
    sync::mpsc,
    thread::{self, JoinHandle},
};

/// Everything the main loop reacts to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppEvent {
    /// A line typed by the player, without its line ending
    Line(String),
    InputClosed,
    Playback(SequencerEvent),
}

impl From<SequencerEvent> for AppEvent {
    fn from(event: SequencerEvent) -> Self {
        Self::Playback(event)
    }
}

/// Sends each line read from `input` to the main loop until the input ends or the main loop stops
/// listening.
pub fn spawn_line_reader<R>(
    input: R,
    sender: mpsc::Sender<AppEvent>,
) -> JoinHandle<()>
where
    R: BufRead + Send + 'static,
{
    thread::spawn(move || {
        for line in input.lines() {
            let line = match line {
                Ok(line) => line,
                Err(e) => {
                    log::error!("failed to read input: {}", e);
                    break;
                }
            };
            if sender.send(AppEvent::Line(line)).is_err() {
                return;
            }
        }
        let _ = sender.send(AppEvent::InputClosed);
    })
}
