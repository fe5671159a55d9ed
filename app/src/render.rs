//! Text rendering of the quiz for the terminal
use hol_core::{Phase, Pitch, PitchClass, PitchRange, Score};

pub fn score_lines(score: &Score) -> Vec<String> {
    vec![
        format!("Questions asked: {}", score.asked),
        format!("Answers correct: {}", score.correct),
        format!("Correct in a row: {}", score.streak),
        format!("Longest correct streak: {}", score.displayed_longest()),
        format!("Percentage correct: {}%", score.percent_correct()),
    ]
}

const CELL_WIDTH: usize = 3;

fn key_cell(pitch: Pitch, first: Pitch, second: Pitch) -> &'static str {
    if pitch == second {
        "[2]"
    } else if pitch == first {
        "[1]"
    } else if pitch.class().is_accidental() {
        "[#]"
    } else {
        "[ ]"
    }
}

/// A row of keys covering `window` with the first pitch marked "1" and the second "2", above a row
/// labelling each C. When both pitches are the same the key is marked "2".
pub fn keyboard(window: PitchRange, first: Pitch, second: Pitch) -> String {
    let keys = window
        .iter()
        .map(|pitch| key_cell(pitch, first, second))
        .collect::<String>();
    let mut labels = String::new();
    for pitch in window.iter() {
        if pitch.class() == PitchClass::C {
            let column = (pitch.to_index() - window.min.to_index()) as usize
                * CELL_WIDTH;
            while labels.len() < column {
                labels.push(' ');
            }
            labels.push_str(&pitch.label());
        }
    }
    format!("{}\n{}", keys, labels)
}

/// What the player can do next
pub fn hint(phase: Phase, has_audio: bool) -> &'static str {
    match phase {
        Phase::Idle => "Type b to begin the game (help lists every command).",
        Phase::Playing { .. } if !has_audio => {
            "Audio is unavailable so the notes can't be played."
        }
        Phase::Playing { .. } => "Listening... (r replays the notes)",
        Phase::AwaitingAnswer => {
            "Is the second note higher (u), lower (d) or the same (s)?"
        }
        Phase::Answered => "Press Enter for the next question.",
    }
}

/// Draws `lines` in a box
pub fn framed(lines: &[String]) -> String {
    let width = lines.iter().map(|l| l.chars().count()).max().unwrap_or(0);
    let border = format!("+{}+", "-".repeat(width + 2));
    let mut out = border.clone();
    for line in lines {
        out.push_str(&format!("\n| {:<width$} |", line, width = width));
    }
    out.push('\n');
    out.push_str(&border);
    out
}
