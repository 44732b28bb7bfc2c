//! Integration tests covering session startup, a full round, and progress storage.

use std::sync::mpsc::channel;
use std::time::Instant;
use tacojiman::{
    GameConfig, GameEvent, GameSession, JsonFileStore, NullListener, Progress, ProgressStore,
    SessionOutcome, TacoError, TacoResult, TapResult,
};

#[test]
fn test_basic_startup() -> TacoResult<()> {
    let session = GameSession::new(GameConfig::default(), 12345, Box::new(NullListener))?;

    assert_eq!(session.remaining_secs(), 180);
    assert_eq!(session.score(), 0);
    assert!(session.director().is_spawning());
    assert!(session.boss().is_none());
    assert!(session.outcome().is_none());

    let house = session.house_point();
    assert_eq!(session.grid().tile_center(session.grid().player_house()), house);
    Ok(())
}

#[test]
fn test_same_seed_same_map() -> TacoResult<()> {
    let a = GameSession::new(GameConfig::default(), 7, Box::new(NullListener))?;
    let b = GameSession::new(GameConfig::default(), 7, Box::new(NullListener))?;
    assert_eq!(a.grid().as_ref(), b.grid().as_ref());
    Ok(())
}

#[test]
fn test_invalid_config_is_rejected() {
    let mut config = GameConfig::default();
    config.map.tile_size = 0;
    let result = GameSession::new(config, 1, Box::new(NullListener));
    assert!(matches!(result, Err(TacoError::InvalidConfig(_))));
}

#[test]
fn test_full_round_runs_to_time_up() -> TacoResult<()> {
    let (tx, rx) = channel();
    let mut session = GameSession::new(GameConfig::default(), 2024, Box::new(tx))?;

    let start = Instant::now();
    let mut ticks = 0;
    while !session.is_over() && ticks < 2000 {
        session.tick(0.1);
        ticks += 1;
    }
    println!("Simulated {} ticks in {:?}", ticks, start.elapsed());

    // Nobody defends the house, so the boss walks in before the clock runs out
    assert_eq!(session.outcome(), Some(SessionOutcome::BossReachedHome));
    assert!(session.remaining_secs() > 0);
    assert!(!session.director().is_spawning());

    let events: Vec<GameEvent> = rx.try_iter().collect();
    assert!(events.contains(&GameEvent::BossSpawned));
    assert!(events
        .iter()
        .any(|event| matches!(event, GameEvent::DifficultyRaised { .. })));
    assert!(events
        .iter()
        .any(|event| matches!(event, GameEvent::EnemyReachedHome { .. })));
    // The stock was never spent, so recovery had nothing to refill
    assert!(!events
        .iter()
        .any(|event| matches!(event, GameEvent::BombRecovered { .. })));

    let summary = session.summary();
    assert!(summary.boss_spawned);
    assert!(!summary.boss_defeated);
    assert_eq!(summary.score, 0);
    Ok(())
}

#[test]
fn test_taps_after_the_end_are_ignored() -> TacoResult<()> {
    let mut config = GameConfig::default();
    config.game.total_duration_secs = 1;
    let mut session = GameSession::new(config, 5, Box::new(NullListener))?;
    session.tick(1.0);
    assert_eq!(session.outcome(), Some(SessionOutcome::TimeUp));

    let house = session.house_point();
    assert_eq!(session.tap(house, 1.0), TapResult::Ignored);
    assert_eq!(session.activate_bomb(None), None);
    Ok(())
}

#[test]
fn test_finish_persists_progress() -> TacoResult<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("progress.json");
    let mut store = JsonFileStore::new(&path);
    store.save(&Progress {
        high_score: 50,
        title_progress_level: 4,
    })?;

    let mut session = GameSession::new(GameConfig::default(), 11, Box::new(NullListener))?;
    session.tick(0.5);
    let summary = session.finish(&mut store)?;
    assert!(!summary.new_high_score);
    assert_eq!(session.director().enemy_count(), 0);

    let reloaded = JsonFileStore::new(&path).load()?;
    assert_eq!(reloaded.high_score, 50);
    assert_eq!(reloaded.title_progress_level, 4);
    Ok(())
}
