use thiserror::Error;

/// Domain errors raised by the league core. All of these are precondition
/// violations: they fail the whole operation eagerly, nothing is retried.
#[derive(Debug, Error)]
pub enum LeagueError {
    #[error("fixture generation requires an even number of teams, got {0}")]
    OddTeamCount(usize),

    #[error("match {match_id} references unknown team {team_id}")]
    UnknownTeam { match_id: String, team_id: String },

    #[error("location must be either \"home\" or \"away\", got {0:?}")]
    InvalidLocation(String),
}
