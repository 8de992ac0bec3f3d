//! Command-line interface for strictly_games.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use strictly_rps::Mode;

/// Strictly Games - gesture rock/paper/scissors
#[derive(Parser, Debug)]
#[command(name = "strictly_games")]
#[command(about = "Rock/paper/scissors played with hand gestures", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Play a session against the computer or another player
    Play(PlayArgs),

    /// Print which gesture beats which
    Rules,
}

/// Options for a game session.
#[derive(Args, Debug, Clone)]
pub struct PlayArgs {
    /// Game mode (computer or human)
    #[arg(short, long, default_value = "computer")]
    pub mode: Mode,

    /// Name of the first player
    #[arg(long, default_value = "Player 1")]
    pub name_a: String,

    /// Name of the second player (human mode only)
    #[arg(long)]
    pub name_b: Option<String>,

    /// Number of rounds to play
    #[arg(short, long, default_value = "3")]
    pub rounds: String,

    /// Seed for the computer opponent and the simulated camera
    #[arg(long)]
    pub seed: Option<u64>,

    /// Path to a TOML game config (falls back to STRICTLY_GAMES_CONFIG)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Gestures shown to the simulated camera, e.g. "rock,paper;scissors;"
    ///
    /// Rounds are separated by ';' and hands within a round by ','. An empty
    /// round shows no hands. Without a script the camera plays at random.
    #[arg(long)]
    pub script: Option<String>,

    /// Assign hands to players left to right instead of detection order
    #[arg(long)]
    pub wrist_x: bool,

    /// Print the final result as JSON
    #[arg(long)]
    pub json: bool,
}
