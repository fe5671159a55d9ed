use clap::Parser;
use hol_app::{AppEvent, Exports, Flow, Quiz, spawn_line_reader};
use hol_audio_file::{AssetLayout, PitchSamples};
use hol_core::{Mode, Session};
use hol_persist::Store;
use hol_player::{Config, Output, Sequencer, Timing};
use rand::{SeedableRng, rngs::StdRng};
use std::{
    io,
    path::PathBuf,
    sync::{Arc, mpsc},
};

#[derive(Parser)]
#[command(about = "Is the second note higher, lower or the same as the first?")]
struct Args {
    /// Directory containing a sample for each pitch, named like "csharp4.wav"
    #[arg(long, default_value = "audio")]
    audio_dir: PathBuf,
    /// File extension of the samples
    #[arg(long, default_value = "wav")]
    ext: String,
    #[arg(long, default_value_t = Mode::default())]
    mode: Mode,
    /// Seed for choosing notes, for repeatable games
    #[arg(long)]
    seed: Option<u64>,
    /// Where downloaded images are written
    #[arg(long, default_value = ".")]
    out_dir: PathBuf,
    /// Where the player's name is remembered between runs
    #[arg(long)]
    profile_dir: Option<PathBuf>,
    #[arg(long, default_value_t = 0.01)]
    target_latency_s: f32,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();
    let (sender, receiver) = mpsc::channel::<AppEvent>();
    let samples = Arc::new(PitchSamples::new(AssetLayout::new(
        &args.audio_dir,
        args.ext.as_str(),
    )));
    let output = match Output::new(Config {
        target_latency_s: args.target_latency_s,
        ..Default::default()
    }) {
        Ok(output) => Some(output),
        Err(e) => {
            log::error!("failed to open audio output: {}", e);
            eprintln!(
                "No audio output is available ({}). The notes can't be played.",
                e
            );
            None
        }
    };
    let sequencer = output.as_ref().map(|output| {
        Sequencer::new(
            Arc::clone(output.mixer()),
            Arc::clone(&samples),
            Timing::default(),
        )
    });
    let session = match args.seed {
        Some(seed) => Session::from_seed(args.mode, seed),
        None => Session::new(args.mode, StdRng::from_os_rng()),
    };
    let store = match args.profile_dir {
        Some(dir) => Store::new(dir),
        None => Store::default(),
    };
    let exports = Exports {
        out_dir: args.out_dir,
        store,
    };
    let mut quiz = Quiz::new(session, sequencer, sender.clone(), exports);
    spawn_line_reader(io::BufReader::new(io::stdin()), sender);
    println!("{}", quiz.render());
    for event in receiver {
        if quiz.handle_event(event) == Flow::Quit {
            break;
        }
        println!("\n{}", quiz.render());
    }
    Ok(())
}
