use std::cmp::Ordering;
use std::collections::HashMap;

use crate::models::{Match, Standing, Team};

/// Derives the league table from played matches. Pure: same inputs, same
/// table, nothing stored.
pub struct StandingsAggregator;

impl StandingsAggregator {
    pub fn new() -> Self {
        Self
    }

    /// 3/1/0 scoring over played matches only.
    ///
    /// Ordering: points descending, then goal difference descending, then
    /// input team order. No further tie-break policy is defined.
    pub fn compute(&self, teams: &[Team], matches: &[Match]) -> Vec<Standing> {
        let mut rows: Vec<Standing> = teams.iter().map(Standing::zero).collect();
        let index: HashMap<&str, usize> = teams
            .iter()
            .enumerate()
            .map(|(i, team)| (team.id.as_str(), i))
            .collect();

        for game in matches.iter().filter(|m| m.is_played) {
            if let (Some(home_goals), Some(away_goals)) = (game.home_goals, game.away_goals) {
                if let Some(&i) = index.get(game.home_team_id.as_str()) {
                    apply_result(&mut rows[i], home_goals, away_goals);
                }
                if let Some(&i) = index.get(game.away_team_id.as_str()) {
                    apply_result(&mut rows[i], away_goals, home_goals);
                }
            }
        }

        // Stable sort keeps input team order for full ties.
        rows.sort_by(|a, b| {
            b.points
                .cmp(&a.points)
                .then(b.goal_difference.cmp(&a.goal_difference))
        });
        rows
    }
}

impl Default for StandingsAggregator {
    fn default() -> Self {
        Self::new()
    }
}

fn apply_result(row: &mut Standing, scored: i32, conceded: i32) {
    row.played += 1;
    row.goal_difference += scored - conceded;
    match scored.cmp(&conceded) {
        Ordering::Greater => {
            row.won += 1;
            row.points += 3;
        }
        Ordering::Equal => {
            row.drawn += 1;
            row.points += 1;
        }
        Ordering::Less => row.lost += 1,
    }
}
