use serde::Serialize;

use crate::geo;
use crate::models::Coordinate;

/// Outcome of scoring one guess. Only [`evaluate`] builds one, so `won`
/// can never disagree with `distance_km`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Score {
    distance_km: u32,
    won: bool,
}

impl Score {
    pub fn distance_km(&self) -> u32 {
        self.distance_km
    }

    pub fn won(&self) -> bool {
        self.won
    }

    /// Player-facing distance, e.g. "53 km" or "0 meters".
    pub fn formatted_distance(&self) -> String {
        geo::format_distance(self.distance_km as f64)
    }
}

/// Score a guess against the round target.
///
/// A guess exactly `win_threshold_km` away still wins.
pub fn evaluate(target: Coordinate, guess: Coordinate, win_threshold_km: f64) -> Score {
    let distance = geo::distance_km(target, guess);
    Score {
        distance_km: distance as u32,
        won: distance <= win_threshold_km,
    }
}
