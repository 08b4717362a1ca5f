use anyhow::Result;
use chrono::Utc;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::db;
use crate::error::LeagueError;
use crate::models::{Match, Team};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Side {
    Home,
    Away,
}

/// Generates a double round-robin season.
///
/// Pure generator: it never inspects existing matches, so the caller is
/// responsible for only invoking it against an empty schedule.
pub struct FixtureScheduler;

impl FixtureScheduler {
    pub fn new() -> Self {
        Self
    }

    /// Build the full season: N-1 rotation weeks covering every unordered
    /// pair once, then a mirrored second half with home/away reversed.
    ///
    /// Home/away per pairing follows a balancing rule: a team that has sat
    /// on the same side for the last two weeks gets the pairing flipped
    /// rather than a third identical assignment. Best effort only; when
    /// both sides pull in opposite directions one of them loses.
    pub fn generate(&self, teams: &[Team]) -> Result<Vec<Match>, LeagueError> {
        if teams.len() % 2 != 0 {
            return Err(LeagueError::OddTeamCount(teams.len()));
        }
        if teams.is_empty() {
            return Ok(Vec::new());
        }

        let n = teams.len();
        let total_rounds = n - 1;

        // Circle method: slot 0 is pinned, the rest rotate by one per week.
        let mut rotation: Vec<usize> = (0..n).collect();
        let mut recent_sides: Vec<Vec<Side>> = vec![Vec::new(); n];
        let mut first_half: Vec<(usize, usize, i32)> = Vec::with_capacity(n / 2 * total_rounds);

        for round in 0..total_rounds {
            let week = (round + 1) as i32;

            for i in 0..n / 2 {
                let a = rotation[i];
                let b = rotation[n - 1 - i];
                if a == b {
                    continue;
                }

                let (mut home, mut away) = (a, b);
                if ends_with_two(&recent_sides[home], Side::Home)
                    || ends_with_two(&recent_sides[away], Side::Away)
                {
                    std::mem::swap(&mut home, &mut away);
                }

                recent_sides[home].push(Side::Home);
                recent_sides[away].push(Side::Away);
                first_half.push((home, away, week));
            }

            if let Some(last) = rotation.pop() {
                rotation.insert(1, last);
            }
        }

        // Reverse fixtures land exactly one half-season later.
        let mut fixtures = first_half.clone();
        fixtures.extend(
            first_half
                .iter()
                .map(|&(home, away, week)| (away, home, week + total_rounds as i32)),
        );
        fixtures.sort_by_key(|&(_, _, week)| week);

        let now = Utc::now();
        let matches = fixtures
            .into_iter()
            .map(|(home, away, week)| {
                let home_team = &teams[home];
                let away_team = &teams[away];
                Match {
                    id: Uuid::new_v4().to_string(),
                    home_team_id: home_team.id.clone(),
                    away_team_id: away_team.id.clone(),
                    home_team_name: home_team.name.clone(),
                    away_team_name: away_team.name.clone(),
                    week,
                    home_goals: None,
                    away_goals: None,
                    is_played: false,
                    created_at: now,
                    updated_at: now,
                }
            })
            .collect();

        Ok(matches)
    }

    /// Caller-side guard around `generate`: builds and stores the season
    /// only when the match store is still empty, so repeated calls are
    /// no-ops once a schedule exists.
    pub async fn ensure_schedule(&self, pool: &SqlitePool) -> Result<()> {
        if db::count_matches(pool).await? > 0 {
            return Ok(());
        }

        let teams = db::get_all_teams(pool).await?;
        let matches = self.generate(&teams)?;
        db::save_schedule(pool, &matches).await?;
        Ok(())
    }
}

impl Default for FixtureScheduler {
    fn default() -> Self {
        Self::new()
    }
}

fn ends_with_two(history: &[Side], side: Side) -> bool {
    history.len() >= 2 && history[history.len() - 2..].iter().all(|s| *s == side)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use std::collections::{HashMap, HashSet};

    fn league(n: usize) -> Vec<Team> {
        let now = Utc::now();
        (1..=n)
            .map(|i| Team {
                id: format!("team_{}", i),
                name: format!("Team {}", i),
                power: 70 + (i as i32 % 20),
                goalkeeper_power: 70,
                supporter_power: 70,
                created_at: now,
                updated_at: now,
            })
            .collect()
    }

    #[test]
    fn odd_team_count_is_rejected() {
        let scheduler = FixtureScheduler::new();
        let err = scheduler.generate(&league(5)).unwrap_err();
        assert!(matches!(err, LeagueError::OddTeamCount(5)));
    }

    #[test]
    fn four_teams_yield_twelve_matches_over_six_weeks() {
        let scheduler = FixtureScheduler::new();
        let teams = league(4);
        let matches = scheduler.generate(&teams).unwrap();

        assert_eq!(matches.len(), 12);
        assert_eq!(matches.iter().map(|m| m.week).max(), Some(6));
        assert_eq!(matches.iter().map(|m| m.week).min(), Some(1));

        for week in 1..=6 {
            let in_week: Vec<_> = matches.iter().filter(|m| m.week == week).collect();
            assert_eq!(in_week.len(), 2, "week {} should have N/2 matches", week);
        }

        // Every team is home exactly N-1 times and away exactly N-1 times.
        for team in &teams {
            let home = matches.iter().filter(|m| m.home_team_id == team.id).count();
            let away = matches.iter().filter(|m| m.away_team_id == team.id).count();
            assert_eq!(home, 3);
            assert_eq!(away, 3);
        }
    }

    #[test]
    fn every_team_plays_once_per_week() {
        let scheduler = FixtureScheduler::new();
        for n in [4usize, 6, 8, 10] {
            let teams = league(n);
            let matches = scheduler.generate(&teams).unwrap();
            assert_eq!(matches.len(), n * (n - 1));

            for week in 1..=(2 * (n - 1)) as i32 {
                let mut seen = HashSet::new();
                for m in matches.iter().filter(|m| m.week == week) {
                    assert!(seen.insert(m.home_team_id.clone()), "double booking in week {}", week);
                    assert!(seen.insert(m.away_team_id.clone()), "double booking in week {}", week);
                }
                assert_eq!(seen.len(), n, "week {} must involve every team", week);
            }
        }
    }

    #[test]
    fn each_ordered_pair_occurs_exactly_once() {
        let scheduler = FixtureScheduler::new();
        let teams = league(6);
        let matches = scheduler.generate(&teams).unwrap();

        let mut pairs: HashMap<(String, String), u32> = HashMap::new();
        for m in &matches {
            let key = (m.home_team_id.clone(), m.away_team_id.clone());
            *pairs.entry(key).or_insert(0) += 1;
        }

        assert_eq!(pairs.len(), 6 * 5);
        assert!(pairs.values().all(|&count| count == 1));
    }

    #[test]
    fn second_half_mirrors_the_first() {
        let scheduler = FixtureScheduler::new();
        let teams = league(4);
        let matches = scheduler.generate(&teams).unwrap();
        let half = 3;

        for m in matches.iter().filter(|m| m.week <= half) {
            let reverse = matches
                .iter()
                .find(|r| {
                    r.home_team_id == m.away_team_id && r.away_team_id == m.home_team_id
                })
                .expect("reverse fixture must exist");
            assert_eq!(reverse.week, m.week + half);
        }
    }

    #[test]
    fn matches_start_unplayed_and_week_ordered() {
        let scheduler = FixtureScheduler::new();
        let matches = scheduler.generate(&league(8)).unwrap();

        assert!(matches.iter().all(|m| !m.is_played));
        assert!(matches.iter().all(|m| m.home_goals.is_none() && m.away_goals.is_none()));
        assert!(matches.windows(2).all(|w| w[0].week <= w[1].week));
    }

    #[test]
    fn empty_league_produces_empty_schedule() {
        let scheduler = FixtureScheduler::new();
        assert!(scheduler.generate(&[]).unwrap().is_empty());
    }
}
