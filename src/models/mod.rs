use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::str::FromStr;

use crate::error::LeagueError;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Team {
    pub id: String,
    pub name: String,
    pub power: i32,            // overall squad strength, 0-100
    pub goalkeeper_power: i32, // 0-100
    pub supporter_power: i32,  // 0-100
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Match {
    pub id: String,
    pub home_team_id: String,
    pub away_team_id: String,
    pub home_team_name: String,
    pub away_team_name: String,
    pub week: i32, // 1-based
    pub home_goals: Option<i32>,
    pub away_goals: Option<i32>,
    pub is_played: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A league-table row. Derived from played matches on demand, never stored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Standing {
    pub team_id: String,
    pub team_name: String,
    pub played: i32,
    pub won: i32,
    pub drawn: i32,
    pub lost: i32,
    pub goal_difference: i32,
    pub points: i32,
}

impl Standing {
    pub fn zero(team: &Team) -> Self {
        Self {
            team_id: team.id.clone(),
            team_name: team.name.clone(),
            played: 0,
            won: 0,
            drawn: 0,
            lost: 0,
            goal_difference: 0,
            points: 0,
        }
    }
}

/// Championship odds for one team after a Monte Carlo run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TitleOdds {
    pub team_id: String,
    pub team_name: String,
    pub trial_wins: u32,
    /// Percentage of trials won, rounded. Per-team values are independent
    /// and do not necessarily sum to 100.
    pub chance: u32,
}

/// Venue filter for per-team match queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Location {
    Home,
    Away,
}

impl FromStr for Location {
    type Err = LeagueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "home" => Ok(Location::Home),
            "away" => Ok(Location::Away),
            other => Err(LeagueError::InvalidLocation(other.to_string())),
        }
    }
}

// API Response types
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            timestamp: Utc::now(),
        }
    }

    pub fn error(message: String) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message),
            timestamp: Utc::now(),
        }
    }
}
