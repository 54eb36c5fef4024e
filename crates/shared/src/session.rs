use std::sync::Arc;

use serde::Serialize;

use crate::catalog::{LocationCatalog, RandomSource};
use crate::error::{GameError, Result};
use crate::geo;
use crate::models::{Coordinate, GameRules};
use crate::scoring::{self, Score};

/// Where a session is within its current round.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum RoundState {
    Idle,
    InProgress {
        target: Coordinate,
    },
    Evaluating {
        target: Coordinate,
        guess: Coordinate,
    },
    Completed {
        target: Coordinate,
        guess: Coordinate,
        score: Score,
    },
}

impl RoundState {
    pub fn name(&self) -> &'static str {
        match self {
            RoundState::Idle => "idle",
            RoundState::InProgress { .. } => "in progress",
            RoundState::Evaluating { .. } => "evaluating",
            RoundState::Completed { .. } => "completed",
        }
    }

    pub fn target(&self) -> Option<Coordinate> {
        match *self {
            RoundState::Idle => None,
            RoundState::InProgress { target }
            | RoundState::Evaluating { target, .. }
            | RoundState::Completed { target, .. } => Some(target),
        }
    }

    pub fn guess(&self) -> Option<Coordinate> {
        match *self {
            RoundState::Evaluating { guess, .. } | RoundState::Completed { guess, .. } => {
                Some(guess)
            }
            _ => None,
        }
    }
}

/// What the result view shows for a finished round.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoundSummary {
    pub target: Coordinate,
    pub guess: Coordinate,
    pub distance_km: u32,
    pub won: bool,
    pub formatted_distance: String,
    pub headline: &'static str,
    pub message: &'static str,
}

impl RoundSummary {
    fn new(target: Coordinate, guess: Coordinate, score: Score) -> Self {
        let (headline, message) = if score.won() {
            ("You Won!", "You have a remarkable sense of geography!")
        } else {
            (
                "You Lost",
                "Keep exploring and improving your geographic intuition.",
            )
        };
        RoundSummary {
            target,
            guess,
            distance_km: score.distance_km(),
            won: score.won(),
            formatted_distance: score.formatted_distance(),
            headline,
            message,
        }
    }
}

/// One player's game. Every mutation goes through a named transition;
/// rejected transitions leave the state untouched.
///
/// Not synchronized: hosts must not drive one session from two threads at once.
#[derive(Debug, Clone)]
pub struct GameSession {
    rules: GameRules,
    catalog: Arc<LocationCatalog>,
    state: RoundState,
    rounds_started: u32,
}

impl GameSession {
    pub fn new(rules: GameRules, catalog: Arc<LocationCatalog>) -> Self {
        GameSession {
            rules,
            catalog,
            state: RoundState::Idle,
            rounds_started: 0,
        }
    }

    pub fn state(&self) -> &RoundState {
        &self.state
    }

    pub fn rules(&self) -> &GameRules {
        &self.rules
    }

    pub fn rounds_started(&self) -> u32 {
        self.rounds_started
    }

    /// Begin a fresh round with a newly sampled target.
    ///
    /// Allowed from any state; an unfinished round is abandoned.
    pub fn start_round<R: RandomSource + ?Sized>(&mut self, rng: &mut R) -> Coordinate {
        let target = self.catalog.sample(rng);
        if matches!(
            self.state,
            RoundState::InProgress { .. } | RoundState::Evaluating { .. }
        ) {
            tracing::debug!(round = self.rounds_started, "abandoning unfinished round");
        }
        self.state = RoundState::InProgress { target };
        self.rounds_started += 1;
        tracing::debug!(round = self.rounds_started, %target, "round started");
        target
    }

    /// Record the player's guess. The round must be in progress and the
    /// guess inside the playable region.
    pub fn submit_guess(&mut self, guess: Coordinate) -> Result<()> {
        let RoundState::InProgress { target } = self.state else {
            return Err(self.rejected("submit a guess"));
        };
        if !geo::is_within_region(guess, self.rules.region()) {
            tracing::debug!(%guess, "guess outside playable region");
            return Err(GameError::GuessOutsideRegion {
                latitude: guess.latitude(),
                longitude: guess.longitude(),
            });
        }
        self.state = RoundState::Evaluating { target, guess };
        tracing::debug!(%guess, "guess accepted");
        Ok(())
    }

    /// Score the submitted guess and complete the round.
    pub fn evaluate(&mut self) -> Result<Score> {
        let RoundState::Evaluating { target, guess } = self.state else {
            return Err(self.rejected("evaluate the round"));
        };
        let score = scoring::evaluate(target, guess, self.rules.win_threshold_km());
        self.state = RoundState::Completed {
            target,
            guess,
            score,
        };
        tracing::debug!(
            round = self.rounds_started,
            distance_km = score.distance_km(),
            won = score.won(),
            "round completed"
        );
        Ok(score)
    }

    /// Submit and score in one step.
    pub fn guess(&mut self, guess: Coordinate) -> Result<Score> {
        self.submit_guess(guess)?;
        self.evaluate()
    }

    /// Result of the last round, available until the next round starts.
    pub fn summary(&self) -> Option<RoundSummary> {
        match self.state {
            RoundState::Completed {
                target,
                guess,
                score,
            } => Some(RoundSummary::new(target, guess, score)),
            _ => None,
        }
    }

    fn rejected(&self, action: &'static str) -> GameError {
        tracing::debug!(action, state = self.state.name(), "rejected transition");
        GameError::InvalidStateTransition {
            action,
            state: self.state.name(),
        }
    }
}
