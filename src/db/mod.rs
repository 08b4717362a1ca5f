pub mod seed;
pub use seed::seed_data;

use anyhow::Result;
use chrono::Utc;
use sqlx::sqlite::{SqliteConnectOptions, SqliteRow};
use sqlx::{Row, SqlitePool};
use std::env;
use std::str::FromStr;

use crate::models::{Location, Match, Team};

pub async fn create_pool() -> Result<SqlitePool> {
    let database_url =
        env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite:data/leaguesim.db".to_string());

    // Strip the "sqlite:" prefix to get the file path, create parent dir if needed
    let file_path = database_url
        .strip_prefix("sqlite:///")
        .or_else(|| database_url.strip_prefix("sqlite://"))
        .or_else(|| database_url.strip_prefix("sqlite:"))
        .unwrap_or(&database_url);

    if let Some(parent) = std::path::Path::new(file_path).parent() {
        if !parent.as_os_str().is_empty() {
            tokio::fs::create_dir_all(parent).await.ok();
        }
    }

    let options = SqliteConnectOptions::from_str(&database_url)?.create_if_missing(true);

    let pool = SqlitePool::connect_with(options).await?;
    Ok(pool)
}

/// Called from the CLI where no pool exists yet.
pub async fn init_database() -> Result<SqlitePool> {
    let pool = create_pool().await?;
    init_database_with_pool(&pool).await?;
    Ok(pool)
}

/// Called from the server so schema creation shares the main pool.
pub async fn init_database_with_pool(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS teams (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            power INTEGER NOT NULL,
            goalkeeper_power INTEGER NOT NULL,
            supporter_power INTEGER NOT NULL,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS matches (
            id TEXT PRIMARY KEY,
            home_team_id TEXT NOT NULL,
            away_team_id TEXT NOT NULL,
            home_team_name TEXT NOT NULL,
            away_team_name TEXT NOT NULL,
            week INTEGER NOT NULL,
            home_goals INTEGER,
            away_goals INTEGER,
            is_played INTEGER NOT NULL DEFAULT 0,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            FOREIGN KEY (home_team_id) REFERENCES teams (id),
            FOREIGN KEY (away_team_id) REFERENCES teams (id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_matches_week ON matches(week)")
        .execute(pool)
        .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_matches_is_played ON matches(is_played)")
        .execute(pool)
        .await?;

    tracing::info!("Database initialized successfully");
    Ok(())
}

pub async fn clear_all_data(pool: &SqlitePool) -> Result<()> {
    sqlx::query("DELETE FROM matches").execute(pool).await?;
    sqlx::query("DELETE FROM teams").execute(pool).await?;
    tracing::info!("All data cleared");
    Ok(())
}

// ── Row mapping ──────────────────────────────────────────────────────────────

fn team_from_row(row: &SqliteRow) -> Result<Team> {
    Ok(Team {
        id: row.get("id"),
        name: row.get("name"),
        power: row.get("power"),
        goalkeeper_power: row.get("goalkeeper_power"),
        supporter_power: row.get("supporter_power"),
        created_at: chrono::DateTime::parse_from_rfc3339(&row.get::<String, _>("created_at"))?
            .with_timezone(&Utc),
        updated_at: chrono::DateTime::parse_from_rfc3339(&row.get::<String, _>("updated_at"))?
            .with_timezone(&Utc),
    })
}

fn match_from_row(row: &SqliteRow) -> Result<Match> {
    Ok(Match {
        id: row.get("id"),
        home_team_id: row.get("home_team_id"),
        away_team_id: row.get("away_team_id"),
        home_team_name: row.get("home_team_name"),
        away_team_name: row.get("away_team_name"),
        week: row.get("week"),
        home_goals: row.get("home_goals"),
        away_goals: row.get("away_goals"),
        is_played: row.get("is_played"),
        created_at: chrono::DateTime::parse_from_rfc3339(&row.get::<String, _>("created_at"))?
            .with_timezone(&Utc),
        updated_at: chrono::DateTime::parse_from_rfc3339(&row.get::<String, _>("updated_at"))?
            .with_timezone(&Utc),
    })
}

// ── Team operations ──────────────────────────────────────────────────────────

pub async fn insert_team(pool: &SqlitePool, team: &Team) -> Result<()> {
    sqlx::query(
        r#"
        INSERT OR REPLACE INTO teams
        (id, name, power, goalkeeper_power, supporter_power, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&team.id)
    .bind(&team.name)
    .bind(team.power)
    .bind(team.goalkeeper_power)
    .bind(team.supporter_power)
    .bind(team.created_at.to_rfc3339())
    .bind(team.updated_at.to_rfc3339())
    .execute(pool)
    .await?;

    Ok(())
}

pub async fn get_team_by_id(pool: &SqlitePool, team_id: &str) -> Result<Option<Team>> {
    let row = sqlx::query("SELECT * FROM teams WHERE id = ?")
        .bind(team_id)
        .fetch_optional(pool)
        .await?;

    row.as_ref().map(team_from_row).transpose()
}

/// Teams in insertion order. Ranking tie-breaks fall back to this order,
/// so it must stay stable across calls.
pub async fn get_all_teams(pool: &SqlitePool) -> Result<Vec<Team>> {
    let rows = sqlx::query("SELECT * FROM teams ORDER BY rowid")
        .fetch_all(pool)
        .await?;

    rows.iter().map(team_from_row).collect()
}

// ── Match operations ─────────────────────────────────────────────────────────

pub async fn insert_match(pool: &SqlitePool, game: &Match) -> Result<()> {
    sqlx::query(
        r#"
        INSERT OR REPLACE INTO matches
        (id, home_team_id, away_team_id, home_team_name, away_team_name, week,
         home_goals, away_goals, is_played, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&game.id)
    .bind(&game.home_team_id)
    .bind(&game.away_team_id)
    .bind(&game.home_team_name)
    .bind(&game.away_team_name)
    .bind(game.week)
    .bind(game.home_goals)
    .bind(game.away_goals)
    .bind(game.is_played)
    .bind(game.created_at.to_rfc3339())
    .bind(game.updated_at.to_rfc3339())
    .execute(pool)
    .await?;

    Ok(())
}

pub async fn save_schedule(pool: &SqlitePool, matches: &[Match]) -> Result<()> {
    for game in matches {
        insert_match(pool, game).await?;
    }
    tracing::info!("Saved {} fixtures", matches.len());
    Ok(())
}

pub async fn get_all_matches(pool: &SqlitePool) -> Result<Vec<Match>> {
    let rows = sqlx::query("SELECT * FROM matches ORDER BY week ASC, rowid")
        .fetch_all(pool)
        .await?;

    rows.iter().map(match_from_row).collect()
}

pub async fn get_matches_by_week(pool: &SqlitePool, week: i32) -> Result<Vec<Match>> {
    let rows = sqlx::query("SELECT * FROM matches WHERE week = ? ORDER BY rowid")
        .bind(week)
        .fetch_all(pool)
        .await?;

    rows.iter().map(match_from_row).collect()
}

pub async fn get_unplayed_matches(pool: &SqlitePool, week: Option<i32>) -> Result<Vec<Match>> {
    let query = if week.is_some() {
        "SELECT * FROM matches WHERE is_played = 0 AND week = ? ORDER BY week ASC, rowid"
    } else {
        "SELECT * FROM matches WHERE is_played = 0 ORDER BY week ASC, rowid"
    };

    let mut query_builder = sqlx::query(query);
    if let Some(week) = week {
        query_builder = query_builder.bind(week);
    }

    let rows = query_builder.fetch_all(pool).await?;
    rows.iter().map(match_from_row).collect()
}

pub async fn get_team_matches(
    pool: &SqlitePool,
    team_id: &str,
    location: Option<Location>,
) -> Result<Vec<Match>> {
    let query = match location {
        Some(Location::Home) => "SELECT * FROM matches WHERE home_team_id = ? ORDER BY week ASC",
        Some(Location::Away) => "SELECT * FROM matches WHERE away_team_id = ? ORDER BY week ASC",
        None => {
            "SELECT * FROM matches WHERE home_team_id = ?1 OR away_team_id = ?1 ORDER BY week ASC"
        }
    };

    let rows = sqlx::query(query).bind(team_id).fetch_all(pool).await?;
    rows.iter().map(match_from_row).collect()
}

pub async fn count_matches(pool: &SqlitePool) -> Result<i64> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM matches")
        .fetch_one(pool)
        .await?;
    Ok(count)
}

pub async fn get_max_week(pool: &SqlitePool) -> Result<i32> {
    let max: Option<i32> = sqlx::query_scalar("SELECT MAX(week) FROM matches")
        .fetch_one(pool)
        .await?;
    Ok(max.unwrap_or(0))
}

/// The lowest week that still has an unplayed match; once the season is
/// fully played, the final week. Always derived, never cached.
pub async fn get_current_week(pool: &SqlitePool) -> Result<i32> {
    let week: Option<i32> = sqlx::query_scalar("SELECT MIN(week) FROM matches WHERE is_played = 0")
        .fetch_one(pool)
        .await?;

    match week {
        Some(week) => Ok(week),
        None => get_max_week(pool).await,
    }
}

/// Record a final scoreline. Goals and the played flag flip in one
/// statement, so a match can never be observed half-played.
pub async fn record_result(
    pool: &SqlitePool,
    match_id: &str,
    home_goals: i32,
    away_goals: i32,
) -> Result<()> {
    sqlx::query(
        r#"
        UPDATE matches
        SET home_goals = ?, away_goals = ?, is_played = 1, updated_at = ?
        WHERE id = ?
        "#,
    )
    .bind(home_goals)
    .bind(away_goals)
    .bind(Utc::now().to_rfc3339())
    .bind(match_id)
    .execute(pool)
    .await?;

    Ok(())
}

/// Wipe results back to an unplayed season. The schedule shape (pairings,
/// weeks) is preserved.
pub async fn reset_results(pool: &SqlitePool) -> Result<()> {
    let result = sqlx::query(
        r#"
        UPDATE matches
        SET home_goals = NULL, away_goals = NULL, is_played = 0, updated_at = ?
        WHERE is_played = 1
        "#,
    )
    .bind(Utc::now().to_rfc3339())
    .execute(pool)
    .await?;

    tracing::info!("Reset {} played matches", result.rows_affected());
    Ok(())
}
