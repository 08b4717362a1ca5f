use anyhow::Result;
use chrono::Utc;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use sqlx::SqlitePool;

use crate::db;
use crate::error::LeagueError;
use crate::models::{Match, Team};
use crate::services::PowerModel;

/// When the two win probabilities land closer than this, the match is a draw.
const DRAW_THRESHOLD: f64 = 0.05;

pub struct MatchSimulator {
    power_model: PowerModel,
}

impl MatchSimulator {
    pub fn new() -> Self {
        Self {
            power_model: PowerModel::new(),
        }
    }

    /// Produce a scoreline for one fixture.
    ///
    /// Exactly one of two shapes comes out: a draw with equal goals in
    /// [0, 4], or a decisive result where the winner scores 1-4 and the
    /// loser strictly fewer.
    pub fn score(&self, home: &Team, away: &Team, rng: &mut impl Rng) -> (i32, i32) {
        let home_strength = self.power_model.strength(home, true, rng);
        let away_strength = self.power_model.strength(away, false, rng);

        let total = home_strength + away_strength;
        let home_win_prob = home_strength / total;
        let away_win_prob = 1.0 - home_win_prob;

        if (home_win_prob - away_win_prob).abs() < DRAW_THRESHOLD {
            let goals = rng.random_range(0..=4);
            return (goals, goals);
        }

        let winner_goals = rng.random_range(1..=4);
        let loser_goals = rng.random_range(0..winner_goals);

        if home_strength > away_strength {
            (winner_goals, loser_goals)
        } else {
            (loser_goals, winner_goals)
        }
    }

    /// Simulate one stored match: compute the scoreline, then persist goals
    /// and the played flag in a single statement so no half-played state can
    /// ever be observed.
    pub async fn simulate_match(&self, pool: &SqlitePool, game: &Match) -> Result<Match> {
        let home = require_team(pool, game, &game.home_team_id).await?;
        let away = require_team(pool, game, &game.away_team_id).await?;

        let mut rng = StdRng::from_os_rng();
        let (home_goals, away_goals) = self.score(&home, &away, &mut rng);

        db::record_result(pool, &game.id, home_goals, away_goals).await?;

        tracing::info!(
            "Week {}: {} {} - {} {}",
            game.week,
            game.home_team_name,
            home_goals,
            away_goals,
            game.away_team_name
        );

        let mut played = game.clone();
        played.home_goals = Some(home_goals);
        played.away_goals = Some(away_goals);
        played.is_played = true;
        played.updated_at = Utc::now();
        Ok(played)
    }

    /// Play every unplayed match of one week.
    pub async fn simulate_week(&self, pool: &SqlitePool, week: i32) -> Result<Vec<Match>> {
        self.simulate_unplayed(pool, Some(week)).await
    }

    /// Play every unplayed match of the current week.
    pub async fn simulate_current_week(&self, pool: &SqlitePool) -> Result<Vec<Match>> {
        let week = db::get_current_week(pool).await?;
        self.simulate_week(pool, week).await
    }

    /// Play out the entire remaining season.
    pub async fn simulate_all(&self, pool: &SqlitePool) -> Result<Vec<Match>> {
        self.simulate_unplayed(pool, None).await
    }

    async fn simulate_unplayed(&self, pool: &SqlitePool, week: Option<i32>) -> Result<Vec<Match>> {
        let games = db::get_unplayed_matches(pool, week).await?;
        let mut played = Vec::with_capacity(games.len());
        for game in &games {
            played.push(self.simulate_match(pool, game).await?);
        }
        Ok(played)
    }
}

impl Default for MatchSimulator {
    fn default() -> Self {
        Self::new()
    }
}

async fn require_team(pool: &SqlitePool, game: &Match, team_id: &str) -> Result<Team> {
    let team = db::get_team_by_id(pool, team_id).await?;
    team.ok_or_else(|| {
        LeagueError::UnknownTeam {
            match_id: game.id.clone(),
            team_id: team_id.to_string(),
        }
        .into()
    })
}
