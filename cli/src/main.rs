use std::fs;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use pairs_core::*;
use tracing_subscriber::EnvFilter;

mod autoplay;
mod render;

#[derive(Parser, Debug)]
#[command(version, about = "Memory-matching pairs game")]
struct Cli {
    #[command(flatten)]
    verbose: Verbosity<WarnLevel>,

    /// Engine settings file (TOML)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Fixed deal seed, overrides the config file
    #[arg(long, global = true)]
    seed: Option<u64>,

    /// Directory holding the saved game and player level
    #[arg(long, global = true, default_value = ".pairs")]
    save_dir: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Play interactively on stdin
    Play,
    /// Let a perfect-memory player clear levels
    Autoplay {
        #[arg(long, default_value_t = 3)]
        levels: u32,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(cli.verbose.log_level_filter().to_string().to_lowercase())
    });
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    let mut config = load_config(cli.config.as_deref())?;
    if cli.seed.is_some() {
        config.seed = cli.seed;
    }

    let store = FileStore::new(&cli.save_dir)
        .with_context(|| format!("opening save directory {}", cli.save_dir.display()))?;
    let mut session = GameSession::new(store, config);
    session.subscribe(|event: &GameEvent| log::debug!("{event:?}"));

    match cli.command {
        Command::Play => {
            session.subscribe(announce);
            play(&mut session)
        }
        Command::Autoplay { levels } => {
            let mut player = autoplay::MemoryPlayer::new();
            session.start_or_resume();
            for _ in 0..levels {
                player.play_level(&mut session)?;
                session.next_level();
            }
            let state = session.state();
            println!(
                "level {} reached, score {}, lives {}",
                state.level, state.score, state.lives
            );
            Ok(())
        }
    }
}

fn load_config(path: Option<&Path>) -> Result<EngineConfig> {
    let Some(path) = path else {
        return Ok(EngineConfig::default());
    };
    let text =
        fs::read_to_string(path).with_context(|| format!("reading config {}", path.display()))?;
    toml::from_str(&text).with_context(|| format!("parsing config {}", path.display()))
}

fn announce(event: &GameEvent) {
    match event {
        GameEvent::PairMatched(..) => println!("Match!"),
        GameEvent::PairMismatched(..) => println!("No match."),
        GameEvent::ComboChanged(combo) => println!("Combo x{combo}"),
        GameEvent::LivesChanged(lives) => println!("Lives: {lives}"),
        GameEvent::ScoreChanged(score) => println!("Score: {score}"),
        GameEvent::LevelWon => println!("Level cleared! Type `next` to continue."),
        _ => {}
    }
}

fn play<S: KeyValueStore>(session: &mut GameSession<S>) -> Result<()> {
    session.start_or_resume();
    println!("{}", render::grid(session));
    println!("{}", render::HELP);

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    loop {
        print!("> ");
        io::stdout().flush()?;
        let Some(line) = lines.next() else {
            return Ok(());
        };
        let line = line?;
        let words: Vec<&str> = line.split_whitespace().collect();

        match words.as_slice() {
            [] => continue,
            ["quit" | "q"] => return Ok(()),
            ["show" | "s"] => {}
            ["load"] => session.start_or_resume(),
            ["next" | "n"] => session.next_level(),
            ["new", rows, columns] => match (rows.parse(), columns.parse()) {
                (Ok(rows), Ok(columns)) => session.new_grid(rows, columns),
                _ => {
                    println!("{}", render::HELP);
                    continue;
                }
            },
            ["flip" | "f", row, column] => match (row.parse(), column.parse()) {
                (Ok(row), Ok(column)) => {
                    if !session.flip((row, column)).has_update() {
                        println!("That card can't be flipped right now.");
                        continue;
                    }
                    // let the card finish turning so both faces of a pair are visible
                    let reveal = session.config().timings.reveal();
                    session.advance(reveal);
                    if session.pending_flips().is_empty() {
                        println!("{}", render::grid(session));
                        session.settle();
                    }
                }
                _ => {
                    println!("{}", render::HELP);
                    continue;
                }
            },
            _ => {
                println!("{}", render::HELP);
                continue;
            }
        }
        println!("{}", render::grid(session));
    }
}
