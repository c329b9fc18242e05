//! End-to-end score operations through the public repository API.

#[path = "helpers.rs"]
mod helpers;

use helpers::{count_rows, create_test_pool, exec, test_repository};
use scoreboard::{AddOutcome, DatabaseError, Game};
use tokio::time::Duration;

#[tokio::test]
async fn test_add_show_update_cycle() {
    let (_dir, pool) = create_test_pool(3, Duration::from_secs(2)).await;
    let repository = test_repository(&pool, true);

    assert_eq!(
        repository.add_score(Game::Chess, "Magnus", 10).await.unwrap(),
        AddOutcome::Inserted
    );
    assert_eq!(
        repository.add_score(Game::Chess, "Mikhail", 99).await.unwrap(),
        AddOutcome::AlreadyRecorded
    );

    assert_eq!(repository.update_score(Game::Chess, "Magnus", 5).await.unwrap(), 1);
    assert_eq!(repository.update_score(Game::Chess, "Magnus", -3).await.unwrap(), 1);

    let rows = repository.show_scores(Game::Chess).await.unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].player, "Magnus");
    assert_eq!(rows[0].score, 12);
    assert_eq!(rows[0].code, "M");
}

#[tokio::test]
async fn test_inventory_names_route_operations() {
    let (_dir, pool) = create_test_pool(3, Duration::from_secs(2)).await;
    exec(
        &pool,
        "CREATE TABLE Uno2024 (Name TEXT, Score INTEGER DEFAULT 0, Code TEXT UNIQUE)",
    )
    .await;
    exec(&pool, "INSERT INTO Inventory (ID, Name) VALUES (1, 'Uno2024')").await;

    let repository = test_repository(&pool, true);
    repository.add_score(Game::Uno, "Ann", 4).await.unwrap();

    assert_eq!(count_rows(&pool, "Uno2024").await, 1);
    assert_eq!(count_rows(&pool, "UNO").await, 0);

    let static_repository = test_repository(&pool, false);
    assert_eq!(
        static_repository.resolve_table(Game::Uno).await.unwrap().as_str(),
        "UNO"
    );
}

#[tokio::test]
async fn test_unknown_and_aggregate_games_are_rejected() {
    let (_dir, pool) = create_test_pool(1, Duration::from_secs(2)).await;
    let repository = test_repository(&pool, true);

    assert!(matches!(
        Game::parse("Go"),
        Err(DatabaseError::UnknownGameError(_))
    ));
    assert!(matches!(
        repository.add_score(Game::All, "Ann", 1).await,
        Err(DatabaseError::LookupError(_))
    ));
}

#[tokio::test]
async fn test_log_and_clear_snapshots_then_zeroes() {
    let (_dir, pool) = create_test_pool(2, Duration::from_secs(2)).await;
    let repository = test_repository(&pool, true);
    repository.add_score(Game::Carrom, "Ravi", 7).await.unwrap();
    repository.add_score(Game::Carrom, "Sita", 3).await.unwrap();

    let first = repository.log_and_clear(Game::Carrom, "Logs").await.unwrap();
    assert_eq!(first.logged, 2);
    assert_eq!(first.zeroed, 2);

    // Running again on the same day replaces today's rows.
    let second = repository.log_and_clear(Game::Carrom, "Logs").await.unwrap();
    assert_eq!(second.replaced, 2);
    assert_eq!(count_rows(&pool, "Logs").await, 2);

    let rows = repository.show_scores(Game::Carrom).await.unwrap();
    assert!(rows.iter().all(|r| r.score == 0));
}

#[tokio::test]
async fn test_clear_table_empties_only_that_game() {
    let (_dir, pool) = create_test_pool(2, Duration::from_secs(2)).await;
    let repository = test_repository(&pool, true);
    repository.add_score(Game::Uno, "Ann", 1).await.unwrap();
    repository.add_score(Game::Chess, "Kim", 1).await.unwrap();

    repository.clear_table(Game::Uno).await.unwrap();

    assert_eq!(count_rows(&pool, "UNO").await, 0);
    assert_eq!(count_rows(&pool, "Chess").await, 1);
}
