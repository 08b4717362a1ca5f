use anyhow::Result;
use chrono::Utc;
use sqlx::SqlitePool;

use crate::db::insert_team;
use crate::models::Team;

/// Install the default league. No-op when teams already exist, so it is
/// safe to run on every server start.
pub async fn seed_data(pool: &SqlitePool) -> Result<()> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM teams")
        .fetch_one(pool)
        .await?;

    if count > 0 {
        tracing::info!("Database already seeded ({} teams found), skipping.", count);
        return Ok(());
    }

    let now = Utc::now();

    // (id, name, power, goalkeeper_power, supporter_power)
    let teams: Vec<(&str, &str, i32, i32, i32)> = vec![
        ("team_1", "Liverpool", 90, 86, 92),
        ("team_2", "Manchester City", 95, 90, 88),
        ("team_3", "Chelsea", 82, 80, 78),
        ("team_4", "Arsenal", 88, 82, 85),
    ];

    for (id, name, power, goalkeeper_power, supporter_power) in &teams {
        let team = Team {
            id: id.to_string(),
            name: name.to_string(),
            power: *power,
            goalkeeper_power: *goalkeeper_power,
            supporter_power: *supporter_power,
            created_at: now,
            updated_at: now,
        };
        insert_team(pool, &team).await?;
    }

    tracing::info!("Database seeded with {} teams", teams.len());
    Ok(())
}
