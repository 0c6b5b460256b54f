//! Command-line interface for reto.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use reto_tictactoe::DifficultyLevel;

/// Reto - tic-tac-toe against the computer or a friend
#[derive(Parser, Debug)]
#[command(name = "reto")]
#[command(about = "Tic-tac-toe with a computer opponent and online games", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Path to a TOML config file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Override the database path from the config
    #[arg(long, global = true)]
    pub db_path: Option<String>,

    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the HTTP game server
    Serve {
        /// Port to bind to (overrides config)
        #[arg(short, long)]
        port: Option<u16>,

        /// Host to bind to (overrides config)
        #[arg(long)]
        host: Option<String>,
    },

    /// Play against the computer in the terminal
    Play {
        /// Difficulty for this session (defaults to the configured one)
        #[arg(short, long)]
        difficulty: Option<DifficultyLevel>,
    },

    /// Show wins, losses, ties and recent games
    Stats {
        /// Number of recent games to list
        #[arg(short, long, default_value = "10")]
        limit: usize,
    },

    /// Forget all recorded games
    ResetScores,
}
