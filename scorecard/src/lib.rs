//! Images the player can keep: a summary of the current game, and a certificate for a new longest
//! streak.
pub mod canvas;

pub use canvas::{Canvas, Rgba, TextStyle};
use hol_core::{Mode, Score};
use std::path::{Path, PathBuf};

pub const SCORECARD_FILE_NAME: &str = "Higher Or Lower Scorecard.png";
pub const RECORD_FILE_NAME: &str = "Higher Or Lower Record.png";

const BACKGROUND: Rgba = Rgba::opaque(0xfb, 0xfb, 0xfc);
const INK: Rgba = Rgba::opaque(0x11, 0x11, 0x11);
const WHITE: Rgba = Rgba::opaque(0xff, 0xff, 0xff);
const MARGIN: i64 = 8;
const TITLE_BAR_HEIGHT: i64 = 74;
const BORDER_WIDTH: i64 = 6;
const TEXT_X: i64 = 28;
const FOOTER: &str = "Downloaded from www.eartraininglab.com";

fn title_style() -> TextStyle {
    TextStyle {
        scale: 3,
        colour: WHITE,
    }
}

fn footer_style() -> TextStyle {
    TextStyle {
        scale: 2,
        colour: Rgba::shade(0.65),
    }
}

/// Background, border and title bar shared by both cards
fn card_base(width: u32, height: u32, title: &str) -> Canvas {
    let mut canvas = Canvas::new(width, height);
    let (w, h) = (width as i64, height as i64);
    canvas.fill_rect(0, 0, w, h, BACKGROUND);
    canvas.stroke_rect(
        MARGIN,
        MARGIN,
        w - 2 * MARGIN,
        h - 2 * MARGIN,
        BORDER_WIDTH,
        Rgba::shade(0.12),
    );
    canvas.fill_rect(MARGIN, MARGIN, w - 2 * MARGIN, TITLE_BAR_HEIGHT, INK);
    canvas.draw_text(title, TEXT_X, 33, title_style());
    canvas.draw_text(FOOTER, TEXT_X, h - 52, footer_style());
    canvas
}

/// Everything shown on the scorecard
#[derive(Debug, Clone, PartialEq)]
pub struct Scorecard {
    pub name: String,
    pub mode: Mode,
    pub score: Score,
}

impl Scorecard {
    pub const WIDTH: u32 = 560;
    pub const HEIGHT: u32 = 520;

    pub fn summary_lines(&self) -> Vec<String> {
        let score = &self.score;
        vec![
            format!("Name: {}", self.name),
            format!("Game mode: {}", self.mode.label()),
            format!("Questions asked: {}", score.asked),
            format!("Answers correct: {}", score.correct),
            format!("Correct in a row: {}", score.streak),
            format!("Longest correct streak: {}", score.displayed_longest()),
            format!("Percentage correct: {}%", score.percent_correct()),
        ]
    }

    pub fn render(&self) -> Canvas {
        let mut canvas = card_base(
            Self::WIDTH,
            Self::HEIGHT,
            "Higher Or Lower?! - Scorecard",
        );
        let heading = TextStyle {
            scale: 3,
            colour: INK,
        };
        let body = TextStyle {
            scale: 2,
            colour: INK,
        };
        canvas.draw_text("Summary", TEXT_X, 112, heading);
        let mut y = 160;
        for line in self.summary_lines() {
            canvas.draw_text(&line, TEXT_X, y, body);
            y += 34;
        }
        canvas
    }
}

/// Certificate for a new longest streak
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordCard {
    pub name: String,
    pub streak: u32,
}

impl RecordCard {
    pub const WIDTH: u32 = 980;
    pub const HEIGHT: u32 = 420;

    pub fn headline(&self) -> String {
        format!("{} correct in a row!", self.streak)
    }

    pub fn message(&self) -> String {
        format!(
            "{} just scored {} correct answers in a row \
             on the Higher Or Lower?! game",
            self.name, self.streak
        )
    }

    pub fn render(&self) -> Canvas {
        let mut canvas =
            card_base(Self::WIDTH, Self::HEIGHT, "Higher Or Lower?! - Record");
        let headline = TextStyle {
            scale: 3,
            colour: INK,
        };
        canvas.draw_text(&self.headline(), TEXT_X, 118, headline);
        let body = TextStyle {
            scale: 2,
            colour: INK,
        };
        canvas.draw_wrapped_text(
            &self.message(),
            (TEXT_X, 184),
            Self::WIDTH - 2 * TEXT_X as u32,
            34,
            body,
        );
        canvas
    }
}

fn export(
    canvas: &Canvas,
    dir: &Path,
    file_name: &str,
) -> anyhow::Result<PathBuf> {
    std::fs::create_dir_all(dir)?;
    let path = dir.join(file_name);
    canvas.write_png(&path)?;
    log::info!("wrote {}", path.display());
    Ok(path)
}

/// Writes the scorecard into `dir`, returning the path of the new file
pub fn export_scorecard(
    card: &Scorecard,
    dir: &Path,
) -> anyhow::Result<PathBuf> {
    export(&card.render(), dir, SCORECARD_FILE_NAME)
}

/// Writes the record certificate into `dir`, returning the path of the new file
pub fn export_record(card: &RecordCard, dir: &Path) -> anyhow::Result<PathBuf> {
    export(&card.render(), dir, RECORD_FILE_NAME)
}
