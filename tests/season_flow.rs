use std::collections::HashSet;

use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;

use leaguesim_backend::db;
use leaguesim_backend::models::Location;
use leaguesim_backend::services::{
    ChampionshipPredictor, FixtureScheduler, MatchSimulator, StandingsAggregator,
};

/// One connection only: every connection to `sqlite::memory:` gets its own
/// database, so a wider pool would scatter the schema.
async fn seeded_pool() -> SqlitePool {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("in-memory pool should connect");

    db::init_database_with_pool(&pool).await.expect("schema should apply");
    db::seed_data(&pool).await.expect("seed should apply");
    pool
}

#[tokio::test]
async fn schedule_persists_and_weeks_advance() {
    let pool = seeded_pool().await;
    let scheduler = FixtureScheduler::new();

    scheduler.ensure_schedule(&pool).await.expect("schedule should generate");
    assert_eq!(db::count_matches(&pool).await.unwrap(), 12);
    assert_eq!(db::get_unplayed_matches(&pool, None).await.unwrap().len(), 12);
    assert_eq!(db::get_current_week(&pool).await.unwrap(), 1);
    assert_eq!(db::get_max_week(&pool).await.unwrap(), 6);

    // Generation is guarded: a second call must not duplicate fixtures.
    scheduler.ensure_schedule(&pool).await.expect("second call is a no-op");
    assert_eq!(db::count_matches(&pool).await.unwrap(), 12);

    let simulator = MatchSimulator::new();
    let played = simulator.simulate_current_week(&pool).await.expect("week should simulate");
    assert_eq!(played.len(), 2);
    assert!(played.iter().all(|m| m.is_played));
    assert_eq!(db::get_current_week(&pool).await.unwrap(), 2);
}

#[tokio::test]
async fn full_season_then_reset_restores_the_schedule() {
    let pool = seeded_pool().await;
    FixtureScheduler::new().ensure_schedule(&pool).await.unwrap();

    let shape_before: HashSet<(String, String, i32)> = db::get_all_matches(&pool)
        .await
        .unwrap()
        .into_iter()
        .map(|m| (m.home_team_id, m.away_team_id, m.week))
        .collect();

    let simulator = MatchSimulator::new();
    let played = simulator.simulate_all(&pool).await.unwrap();
    assert_eq!(played.len(), 12);
    assert!(db::get_unplayed_matches(&pool, None).await.unwrap().is_empty());
    assert_eq!(db::get_current_week(&pool).await.unwrap(), 6);

    let teams = db::get_all_teams(&pool).await.unwrap();
    let matches = db::get_all_matches(&pool).await.unwrap();
    let table = StandingsAggregator::new().compute(&teams, &matches);
    for row in &table {
        assert_eq!(row.played, 6);
        assert_eq!(row.points, 3 * row.won + row.drawn);
        assert_eq!(row.played, row.won + row.drawn + row.lost);
    }
    // Goal differences across a closed league cancel out.
    assert_eq!(table.iter().map(|r| r.goal_difference).sum::<i32>(), 0);

    db::reset_results(&pool).await.unwrap();

    let restored = db::get_all_matches(&pool).await.unwrap();
    assert_eq!(restored.len(), 12);
    assert!(restored.iter().all(|m| !m.is_played));
    assert!(restored.iter().all(|m| m.home_goals.is_none() && m.away_goals.is_none()));

    let shape_after: HashSet<(String, String, i32)> = restored
        .into_iter()
        .map(|m| (m.home_team_id, m.away_team_id, m.week))
        .collect();
    assert_eq!(shape_before, shape_after);
    assert_eq!(db::get_current_week(&pool).await.unwrap(), 1);
}

#[tokio::test]
async fn predictions_open_up_at_week_four() {
    let pool = seeded_pool().await;
    FixtureScheduler::new().ensure_schedule(&pool).await.unwrap();

    let simulator = MatchSimulator::new();
    let predictor = ChampionshipPredictor::new();

    simulator.simulate_current_week(&pool).await.unwrap();
    assert!(
        predictor.predict_chances(&pool).await.unwrap().is_empty(),
        "one completed week is not enough signal"
    );

    simulator.simulate_current_week(&pool).await.unwrap();
    simulator.simulate_current_week(&pool).await.unwrap();
    assert_eq!(db::get_current_week(&pool).await.unwrap(), 4);

    let odds = predictor.predict_chances(&pool).await.unwrap();
    assert_eq!(odds.len(), 4);
    assert_eq!(odds.iter().map(|o| o.trial_wins).sum::<u32>(), 100);
    assert!(odds.iter().all(|o| o.chance <= 100));
}

#[tokio::test]
async fn team_match_queries_respect_the_location_filter() {
    let pool = seeded_pool().await;
    FixtureScheduler::new().ensure_schedule(&pool).await.unwrap();

    let home = db::get_team_matches(&pool, "team_1", Some(Location::Home))
        .await
        .unwrap();
    let away = db::get_team_matches(&pool, "team_1", Some(Location::Away))
        .await
        .unwrap();
    let all = db::get_team_matches(&pool, "team_1", None).await.unwrap();

    assert_eq!(home.len(), 3);
    assert_eq!(away.len(), 3);
    assert_eq!(all.len(), 6);
    assert!(home.iter().all(|m| m.home_team_id == "team_1"));
    assert!(away.iter().all(|m| m.away_team_id == "team_1"));

    assert!("sideways".parse::<Location>().is_err());
}
