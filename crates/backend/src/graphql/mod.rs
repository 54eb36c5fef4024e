use std::sync::Arc;

use async_graphql::{Context, Enum, ErrorExtensions, InputObject, Object, SimpleObject, ID};
use geoguess_shared::{
    catalog::SystemRandom,
    geo,
    models::{Coordinate, Region, Variant},
    session::{RoundState, RoundSummary},
    GameError,
};
use uuid::Uuid;

use crate::sessions::{SessionEntry, Sessions};

fn game_error(err: GameError) -> async_graphql::Error {
    let code = err.code();
    async_graphql::Error::new(err.to_string()).extend_with(|_, e| e.set("code", code))
}

fn not_found(id: &Uuid) -> async_graphql::Error {
    async_graphql::Error::new(format!("Session not found: {}", id))
        .extend_with(|_, e| e.set("code", "SESSION_NOT_FOUND"))
}

fn parse_session_id(id: &ID) -> async_graphql::Result<Uuid> {
    Uuid::parse_str(id).map_err(|_| {
        async_graphql::Error::new(format!("Invalid session id: {}", id.as_str()))
            .extend_with(|_, e| e.set("code", "INVALID_SESSION_ID"))
    })
}

#[derive(Enum, Copy, Clone, Eq, PartialEq)]
pub enum GqlRoundStatus {
    Idle,
    InProgress,
    Evaluating,
    Completed,
}

impl From<&RoundState> for GqlRoundStatus {
    fn from(s: &RoundState) -> Self {
        match s {
            RoundState::Idle => GqlRoundStatus::Idle,
            RoundState::InProgress { .. } => GqlRoundStatus::InProgress,
            RoundState::Evaluating { .. } => GqlRoundStatus::Evaluating,
            RoundState::Completed { .. } => GqlRoundStatus::Completed,
        }
    }
}

// GraphQL output types

#[derive(SimpleObject, Clone)]
pub struct GqlCoordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl From<Coordinate> for GqlCoordinate {
    fn from(c: Coordinate) -> Self {
        GqlCoordinate {
            latitude: c.latitude(),
            longitude: c.longitude(),
        }
    }
}

#[derive(SimpleObject)]
pub struct GqlRegion {
    pub north: f64,
    pub south: f64,
    pub east: f64,
    pub west: f64,
}

impl From<&Region> for GqlRegion {
    fn from(r: &Region) -> Self {
        GqlRegion {
            north: r.north(),
            south: r.south(),
            east: r.east(),
            west: r.west(),
        }
    }
}

#[derive(SimpleObject)]
pub struct GqlRules {
    pub variant: String,
    pub region: GqlRegion,
    pub win_threshold_km: f64,
}

#[derive(SimpleObject)]
pub struct GqlDistance {
    pub km: f64,
    pub formatted: String,
}

#[derive(SimpleObject)]
pub struct GqlRoundSummary {
    pub target: GqlCoordinate,
    pub guess: GqlCoordinate,
    pub distance_km: u32,
    pub won: bool,
    pub formatted_distance: String,
    pub headline: String,
    pub message: String,
}

impl From<RoundSummary> for GqlRoundSummary {
    fn from(s: RoundSummary) -> Self {
        GqlRoundSummary {
            target: s.target.into(),
            guess: s.guess.into(),
            distance_km: s.distance_km,
            won: s.won,
            formatted_distance: s.formatted_distance,
            headline: s.headline.to_string(),
            message: s.message.to_string(),
        }
    }
}

#[derive(SimpleObject)]
pub struct GqlSession {
    pub id: ID,
    pub status: GqlRoundStatus,
    pub round: u32,
    pub target: Option<GqlCoordinate>,
    pub guess: Option<GqlCoordinate>,
    pub result: Option<GqlRoundSummary>,
    pub created_at: String,
    pub updated_at: String,
}

impl GqlSession {
    fn new(id: &Uuid, entry: &SessionEntry) -> Self {
        let session = &entry.session;
        GqlSession {
            id: ID(id.to_string()),
            status: session.state().into(),
            round: session.rounds_started(),
            target: session.state().target().map(GqlCoordinate::from),
            guess: session.state().guess().map(GqlCoordinate::from),
            result: session.summary().map(GqlRoundSummary::from),
            created_at: entry.created_at.to_rfc3339(),
            updated_at: entry.updated_at.to_rfc3339(),
        }
    }
}

// Input types

#[derive(InputObject)]
pub struct CoordinateInput {
    pub latitude: f64,
    pub longitude: f64,
}

impl TryFrom<CoordinateInput> for Coordinate {
    type Error = async_graphql::Error;

    fn try_from(c: CoordinateInput) -> async_graphql::Result<Self> {
        Coordinate::new(c.latitude, c.longitude).map_err(game_error)
    }
}

// Query root

pub struct QueryRoot;

#[Object]
impl QueryRoot {
    async fn rules(&self, ctx: &Context<'_>) -> async_graphql::Result<GqlRules> {
        let sessions = ctx.data::<Arc<Sessions>>()?;
        let variant = ctx.data::<Variant>()?;
        let rules = sessions.rules();
        Ok(GqlRules {
            variant: variant.to_string(),
            region: rules.region().into(),
            win_threshold_km: rules.win_threshold_km(),
        })
    }

    async fn catalog_size(&self, ctx: &Context<'_>) -> async_graphql::Result<u64> {
        let sessions = ctx.data::<Arc<Sessions>>()?;
        Ok(sessions.catalog().len() as u64)
    }

    async fn active_sessions(&self, ctx: &Context<'_>) -> async_graphql::Result<u64> {
        let sessions = ctx.data::<Arc<Sessions>>()?;
        Ok(sessions.count() as u64)
    }

    async fn distance(
        &self,
        a: CoordinateInput,
        b: CoordinateInput,
    ) -> async_graphql::Result<GqlDistance> {
        let a: Coordinate = a.try_into()?;
        let b: Coordinate = b.try_into()?;
        let km = geo::distance_km(a, b);
        Ok(GqlDistance {
            km,
            formatted: geo::format_distance(km),
        })
    }

    /// Containment check for pins and search results against the playable region.
    async fn is_within_region(
        &self,
        ctx: &Context<'_>,
        point: CoordinateInput,
    ) -> async_graphql::Result<bool> {
        let sessions = ctx.data::<Arc<Sessions>>()?;
        let point: Coordinate = point.try_into()?;
        Ok(geo::is_within_region(point, sessions.rules().region()))
    }

    async fn session(&self, ctx: &Context<'_>, id: ID) -> async_graphql::Result<Option<GqlSession>> {
        let sessions = ctx.data::<Arc<Sessions>>()?;
        let id = parse_session_id(&id)?;
        Ok(sessions.inspect(&id, |entry| GqlSession::new(&id, entry)))
    }
}

// Mutation root

pub struct MutationRoot;

#[Object]
impl MutationRoot {
    async fn create_session(&self, ctx: &Context<'_>) -> async_graphql::Result<GqlSession> {
        let sessions = ctx.data::<Arc<Sessions>>()?;
        let id = sessions.create();
        sessions
            .inspect(&id, |entry| GqlSession::new(&id, entry))
            .ok_or_else(|| not_found(&id))
    }

    /// Start a new round, abandoning any unfinished one.
    async fn start_round(
        &self,
        ctx: &Context<'_>,
        session_id: ID,
    ) -> async_graphql::Result<GqlSession> {
        let sessions = ctx.data::<Arc<Sessions>>()?;
        let id = parse_session_id(&session_id)?;
        sessions
            .with_session(&id, |entry| {
                entry.session.start_round(&mut SystemRandom);
                GqlSession::new(&id, entry)
            })
            .ok_or_else(|| not_found(&id))
    }

    /// Submit the player's guess and score it.
    async fn submit_guess(
        &self,
        ctx: &Context<'_>,
        session_id: ID,
        guess: CoordinateInput,
    ) -> async_graphql::Result<GqlRoundSummary> {
        let sessions = ctx.data::<Arc<Sessions>>()?;
        let id = parse_session_id(&session_id)?;
        let guess: Coordinate = guess.try_into()?;

        let outcome = sessions
            .with_session(&id, |entry| -> Result<Option<RoundSummary>, GameError> {
                entry.session.guess(guess)?;
                Ok(entry.session.summary())
            })
            .ok_or_else(|| not_found(&id))?;

        match outcome {
            Ok(Some(summary)) => Ok(summary.into()),
            Ok(None) => Err(async_graphql::Error::new("Round has no result")),
            Err(e) => Err(game_error(e)),
        }
    }

    async fn end_session(&self, ctx: &Context<'_>, session_id: ID) -> async_graphql::Result<bool> {
        let sessions = ctx.data::<Arc<Sessions>>()?;
        let id = parse_session_id(&session_id)?;
        Ok(sessions.remove(&id))
    }
}

pub type Schema = async_graphql::Schema<QueryRoot, MutationRoot, async_graphql::EmptySubscription>;

pub fn build_schema(sessions: Arc<Sessions>, variant: Variant) -> Schema {
    async_graphql::Schema::build(QueryRoot, MutationRoot, async_graphql::EmptySubscription)
        .data(sessions)
        .data(variant)
        .finish()
}
