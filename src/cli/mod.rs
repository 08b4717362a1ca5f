use anyhow::Result;

use crate::db;
use crate::services::{ChampionshipPredictor, FixtureScheduler, MatchSimulator, StandingsAggregator};

pub async fn seed() -> Result<()> {
    let pool = db::init_database().await?;
    db::seed_data(&pool).await?;

    let teams = db::get_all_teams(&pool).await?;
    println!("🏟️  League roster:");
    for team in teams {
        println!(
            "   • {} (power {}, gk {}, supporters {})",
            team.name, team.power, team.goalkeeper_power, team.supporter_power
        );
    }

    Ok(())
}

pub async fn schedule() -> Result<()> {
    let pool = db::init_database().await?;
    db::seed_data(&pool).await?;

    let scheduler = FixtureScheduler::new();
    scheduler.ensure_schedule(&pool).await?;

    let matches = db::get_all_matches(&pool).await?;
    if matches.is_empty() {
        println!("📭 No fixtures to show. Seed some teams first with: leaguesim seed");
        return Ok(());
    }

    println!("📅 Season fixtures ({} matches):\n", matches.len());
    let mut current_week = 0;
    for game in &matches {
        if game.week != current_week {
            current_week = game.week;
            println!("Week {}:", current_week);
        }
        match (game.home_goals, game.away_goals) {
            (Some(h), Some(a)) => println!(
                "   {} {} - {} {}",
                game.home_team_name, h, a, game.away_team_name
            ),
            _ => println!("   {} vs {}", game.home_team_name, game.away_team_name),
        }
    }

    Ok(())
}

pub async fn play_week() -> Result<()> {
    let pool = db::init_database().await?;
    db::seed_data(&pool).await?;
    FixtureScheduler::new().ensure_schedule(&pool).await?;

    let week = db::get_current_week(&pool).await?;
    let simulator = MatchSimulator::new();
    let played = simulator.simulate_week(&pool, week).await?;

    if played.is_empty() {
        println!("🏁 Nothing left to play, the season is complete.");
        return Ok(());
    }

    println!("⚽ Week {} results:", week);
    for game in &played {
        println!(
            "   {} {} - {} {}",
            game.home_team_name,
            game.home_goals.unwrap_or(0),
            game.away_goals.unwrap_or(0),
            game.away_team_name
        );
    }

    Ok(())
}

pub async fn play_all() -> Result<()> {
    let pool = db::init_database().await?;
    db::seed_data(&pool).await?;
    FixtureScheduler::new().ensure_schedule(&pool).await?;

    let simulator = MatchSimulator::new();
    let played = simulator.simulate_all(&pool).await?;

    if played.is_empty() {
        println!("🏁 Nothing left to play, the season is complete.");
    } else {
        println!("⚽ Played {} matches to close out the season.", played.len());
    }

    standings_for(&pool).await
}

pub async fn standings() -> Result<()> {
    let pool = db::init_database().await?;
    standings_for(&pool).await
}

async fn standings_for(pool: &sqlx::SqlitePool) -> Result<()> {
    let teams = db::get_all_teams(pool).await?;
    let matches = db::get_all_matches(pool).await?;
    let rows = StandingsAggregator::new().compute(&teams, &matches);

    println!("\n🏆 League table:");
    println!("{:<4}{:<20}{:>3}{:>4}{:>4}{:>4}{:>5}{:>5}", "#", "Team", "P", "W", "D", "L", "GD", "Pts");
    for (position, row) in rows.iter().enumerate() {
        println!(
            "{:<4}{:<20}{:>3}{:>4}{:>4}{:>4}{:>5}{:>5}",
            position + 1,
            row.team_name,
            row.played,
            row.won,
            row.drawn,
            row.lost,
            row.goal_difference,
            row.points
        );
    }

    Ok(())
}

pub async fn predict() -> Result<()> {
    let pool = db::init_database().await?;

    let predictor = ChampionshipPredictor::new();
    let odds = predictor.predict_chances(&pool).await?;

    if odds.is_empty() {
        let week = db::get_current_week(&pool).await?;
        println!(
            "🔮 No prediction yet (current week {}). Play through week 4 first.",
            week
        );
        return Ok(());
    }

    println!("🔮 Championship chances over the remaining fixtures:");
    for o in &odds {
        println!("   {:<20}{:>3}%  ({} of 100 trials)", o.team_name, o.chance, o.trial_wins);
    }
    println!("\n⚠️  Chances are independent per team and may not sum to 100.");

    Ok(())
}

pub async fn reset() -> Result<()> {
    let pool = db::init_database().await?;
    db::reset_results(&pool).await?;

    let unplayed = db::get_unplayed_matches(&pool, None).await?;
    println!("🔄 Season reset: {} fixtures back to unplayed.", unplayed.len());

    Ok(())
}
