use rand::Rng;

use crate::models::Team;

/// Computes a team's effective strength for one match context.
///
/// The bulk of the value comes from the static squad attributes; a fresh
/// random factor is drawn on every call, so two calls for the same team
/// in the same context generally differ. Callers own the RNG, which keeps
/// the whole chain reproducible under a seeded generator.
pub struct PowerModel {
    away_penalty: f64,
}

impl PowerModel {
    const WEIGHT_POWER: f64 = 0.6;
    const WEIGHT_GOALKEEPER: f64 = 0.10;
    const WEIGHT_SUPPORTER: f64 = 0.10;
    const WEIGHT_RANDOM: f64 = 0.20;

    pub fn new() -> Self {
        Self { away_penalty: 0.95 }
    }

    /// Weighted attribute blend plus one uniform draw from [0, 100].
    pub fn strength(&self, team: &Team, is_home: bool, rng: &mut impl Rng) -> f64 {
        let random_factor = rng.random_range(0..=100) as f64;

        let mut total = team.power as f64 * Self::WEIGHT_POWER
            + team.goalkeeper_power as f64 * Self::WEIGHT_GOALKEEPER
            + team.supporter_power as f64 * Self::WEIGHT_SUPPORTER
            + random_factor * Self::WEIGHT_RANDOM;

        if !is_home {
            total *= self.away_penalty;
        }

        total
    }
}

impl Default for PowerModel {
    fn default() -> Self {
        Self::new()
    }
}
