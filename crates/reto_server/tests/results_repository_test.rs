//! Tests for recording finished games and computing the scoreboard.

use tempfile::NamedTempFile;

use reto_server::{NewGameResult, ResultsRepository, ResultsService};
use reto_tictactoe::{DifficultyLevel, GameMode, GameOutcome, Scoreboard};

/// Creates a temporary database file and a service on it. The file handle
/// must stay in scope to keep the file alive.
fn setup_test_db() -> (NamedTempFile, ResultsService) {
    let db_file = NamedTempFile::new().expect("Failed to create temp file");
    let db_path = db_file.path().to_str().expect("Invalid path").to_string();
    let service = ResultsService::open(&db_path).expect("Failed to open database");
    (db_file, service)
}

#[test]
fn test_fresh_database_is_empty() {
    let (_db, service) = setup_test_db();
    assert_eq!(service.scoreboard().expect("Load failed"), Scoreboard::default());
    assert!(service.recent_games(10).expect("Load failed").is_empty());
}

#[test]
fn test_each_recorded_game_counts_once() {
    let (_db, service) = setup_test_db();
    service
        .record_local_game(GameOutcome::Win, DifficultyLevel::Easy, 5)
        .expect("Record failed");
    service
        .record_local_game(GameOutcome::Win, DifficultyLevel::Expert, 7)
        .expect("Record failed");
    service
        .record_local_game(GameOutcome::Loss, DifficultyLevel::Expert, 6)
        .expect("Record failed");
    let scores = service
        .record_local_game(GameOutcome::Tie, DifficultyLevel::Harder, 9)
        .expect("Record failed");

    assert_eq!(scores, Scoreboard::new(2, 1, 1));
    assert_eq!(service.scoreboard().expect("Load failed"), scores);
}

#[test]
fn test_scoreboard_by_mode() {
    let (_db, service) = setup_test_db();
    service
        .record_local_game(GameOutcome::Loss, DifficultyLevel::Expert, 6)
        .expect("Record failed");
    service
        .record_online_game(GameOutcome::Win, "game_00000000000000aa", 5)
        .expect("Record failed");
    service
        .record_online_game(GameOutcome::Tie, "game_00000000000000bb", 9)
        .expect("Record failed");

    assert_eq!(
        service.scoreboard_for(GameMode::SinglePlayer).expect("Load failed"),
        Scoreboard::new(0, 1, 0)
    );
    assert_eq!(
        service.scoreboard_for(GameMode::Multiplayer).expect("Load failed"),
        Scoreboard::new(1, 0, 1)
    );
    assert_eq!(service.scoreboard().expect("Load failed").total(), 3);
}

#[test]
fn test_recent_games_newest_first() {
    let (_db, service) = setup_test_db();
    for outcome in [GameOutcome::Win, GameOutcome::Loss, GameOutcome::Tie] {
        service
            .record_local_game(outcome, DifficultyLevel::Harder, 5)
            .expect("Record failed");
    }

    let recent = service.recent_games(2).expect("Load failed");
    assert_eq!(recent.len(), 2);
    assert_eq!(recent[0].parse_outcome().expect("Parse failed"), GameOutcome::Tie);
    assert_eq!(recent[1].parse_outcome().expect("Parse failed"), GameOutcome::Loss);
    assert_eq!(
        recent[0].parse_difficulty().expect("Parse failed"),
        Some(DifficultyLevel::Harder)
    );
    assert_eq!(recent[0].parse_mode().expect("Parse failed"), GameMode::SinglePlayer);
}

#[test]
fn test_online_result_fields() {
    let db_file = NamedTempFile::new().expect("Failed to create temp file");
    let db_path = db_file.path().to_str().expect("Invalid path").to_string();
    let repo = ResultsRepository::new(db_path).expect("Open failed");

    let stored = repo
        .record_game(NewGameResult::online(GameOutcome::Loss, "game_1", 6))
        .expect("Record failed");

    assert!(*stored.id() > 0);
    assert_eq!(stored.parse_mode().expect("Parse failed"), GameMode::Multiplayer);
    assert_eq!(stored.parse_difficulty().expect("Parse failed"), None);
    assert_eq!(stored.game_id().as_deref(), Some("game_1"));
    assert_eq!(*stored.moves_count(), 6);
    assert!(stored.to_string().contains("online game_1"));
}

#[test]
fn test_reset_scores_removes_everything() {
    let (_db, service) = setup_test_db();
    service
        .record_local_game(GameOutcome::Win, DifficultyLevel::Easy, 5)
        .expect("Record failed");
    service
        .record_online_game(GameOutcome::Loss, "g", 6)
        .expect("Record failed");

    assert_eq!(service.reset_scores().expect("Reset failed"), 2);
    assert_eq!(service.scoreboard().expect("Load failed"), Scoreboard::default());
}

#[test]
fn test_results_survive_reopen() {
    let db_file = NamedTempFile::new().expect("Failed to create temp file");
    let db_path = db_file.path().to_str().expect("Invalid path").to_string();

    {
        let service = ResultsService::open(&db_path).expect("Open failed");
        service
            .record_local_game(GameOutcome::Tie, DifficultyLevel::Expert, 9)
            .expect("Record failed");
    }

    // Migrations are skipped on an already migrated database.
    let service = ResultsService::open(&db_path).expect("Reopen failed");
    assert_eq!(service.scoreboard().expect("Load failed").ties(), 1);
}
