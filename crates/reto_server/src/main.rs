//! Reto - unified CLI
//!
//! HTTP game server, terminal game against the computer and the
//! scoreboard of finished games.

#![warn(missing_docs)]

mod cli;

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Command};
use reto_server::{LocalGame, MemoryGameStore, ResultsService, RetoConfig, router};
use reto_tictactoe::{
    BOARD_SIZE, DifficultyLevel, EngineEvent, GameMode, GameOutcome, GameState, Position, TurnEngine,
    TurnPhase,
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, instrument, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    initialize_tracing();

    let mut config = RetoConfig::load(cli.config.as_deref())?;
    if let Some(db_path) = cli.db_path {
        config = config.with_db_path(db_path);
    }

    match cli.command {
        Command::Serve { port, host } => run_http_server(&config, host, port).await,
        Command::Play { difficulty } => run_play(&config, difficulty).await,
        Command::Stats { limit } => show_stats(&config, limit),
        Command::ResetScores => reset_scores(&config),
    }
}

fn initialize_tracing() {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,reto_server=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn open_results(config: &RetoConfig) -> Result<ResultsService> {
    ResultsService::open(config.db_path())
        .with_context(|| format!("opening database '{}'", config.db_path()))
}

/// Run the HTTP game server
#[instrument(skip(config))]
async fn run_http_server(
    config: &RetoConfig,
    host: Option<String>,
    port: Option<u16>,
) -> Result<()> {
    let host = host.unwrap_or_else(|| config.host().clone());
    let port = port.unwrap_or(*config.port());

    let store = Arc::new(MemoryGameStore::new());
    let app = router(store);

    let listener = tokio::net::TcpListener::bind((host.as_str(), port)).await?;
    info!(%host, port, "Server ready at http://{}:{}/", host, port);
    axum::serve(listener, app).await?;

    Ok(())
}

/// Play against the computer on stdin/stdout
#[instrument(skip(config))]
async fn run_play(config: &RetoConfig, difficulty: Option<DifficultyLevel>) -> Result<()> {
    let service = open_results(config)?;
    let level = difficulty.unwrap_or(*config.difficulty());

    let mut game = LocalGame::new(TurnEngine::new(level), config.computer_delay());
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    println!("You are X. Difficulty: {}.", level);
    println!("Enter a cell (0-8 or a name like top-left), 'new', 'level <easy|harder|expert>' or 'quit'.");

    if game.engine().phase() == TurnPhase::ComputerThinking {
        println!("Computer goes first...");
    }
    game.settle().await;

    loop {
        let snapshot = game.snapshot();
        println!("\n{}", snapshot.board.display());

        let prompt = match snapshot.phase {
            TurnPhase::GameOver => {
                println!("{}", describe(snapshot.game_state));
                "Play again? [new/quit] > "
            }
            _ => "Your move > ",
        };
        print!("{}", prompt);
        std::io::Write::flush(&mut std::io::stdout())?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let line = line.trim().to_lowercase();

        let event = match line.as_str() {
            "" => continue,
            "quit" | "q" | "exit" => break,
            "new" | "n" => EngineEvent::NewGame,
            other => {
                if let Some(name) = other.strip_prefix("level ") {
                    match name.trim().parse::<DifficultyLevel>() {
                        Ok(level) => EngineEvent::SetDifficulty(level),
                        Err(_) => {
                            println!("Unknown difficulty '{}'", name.trim());
                            continue;
                        }
                    }
                } else if let Some(position) = Position::parse(other) {
                    EngineEvent::HumanMove(position.to_index())
                } else {
                    let open: Vec<_> = Position::valid_moves(&snapshot.board)
                        .iter()
                        .map(|p| p.label())
                        .collect();
                    println!("Not a cell. Open: {}", open.join(", "));
                    continue;
                }
            }
        };

        let before = game.snapshot();
        if let Some(outcome) = game.dispatch(event).await {
            report(&service, &game, outcome);
        } else if matches!(event, EngineEvent::HumanMove(_))
            && before.phase == TurnPhase::AwaitingHumanMove
            && game.snapshot().board == before.board
        {
            println!("That square is taken.");
        } else if let EngineEvent::SetDifficulty(level) = event {
            println!("Difficulty set to {} for this session.", level);
        }
    }

    println!("{}", service.scoreboard()?);
    Ok(())
}

fn describe(state: GameState) -> &'static str {
    match state {
        GameState::WinnerX => "You win!",
        GameState::WinnerO => "Computer wins.",
        GameState::Tie => "It's a tie.",
        GameState::InProgress => "",
    }
}

fn report(service: &ResultsService, game: &LocalGame, outcome: GameOutcome) {
    let engine = game.engine();
    let moves = BOARD_SIZE - engine.board().empty_cells().len();
    match service.record_local_game(outcome, engine.difficulty(), moves) {
        Ok(scores) => println!("{}", scores),
        Err(e) => warn!(error = %e, "Failed to record outcome"),
    }
}

fn show_stats(config: &RetoConfig, limit: usize) -> Result<()> {
    let service = open_results(config)?;
    println!("All games:       {}", service.scoreboard()?);
    println!("Vs computer:     {}", service.scoreboard_for(GameMode::SinglePlayer)?);
    println!("Online:          {}", service.scoreboard_for(GameMode::Multiplayer)?);

    let recent = service.recent_games(limit)?;
    if !recent.is_empty() {
        println!("\nRecent games:");
        for result in recent {
            println!("  {}", result);
        }
    }
    Ok(())
}

fn reset_scores(config: &RetoConfig) -> Result<()> {
    let removed = open_results(config)?.reset_scores()?;
    println!("Removed {} recorded games.", removed);
    Ok(())
}
