use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use sqlx::SqlitePool;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::db;
use crate::models::{ApiResponse, Location, Match, Standing, Team, TitleOdds};
use crate::services::{ChampionshipPredictor, FixtureScheduler, MatchSimulator, StandingsAggregator};

pub async fn serve(port: u16) -> anyhow::Result<()> {
    let pool = db::create_pool().await?;
    db::init_database_with_pool(&pool).await?;
    db::seed_data(&pool).await?;

    let app = create_router().with_state(pool);

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port)).await?;
    tracing::info!("LeagueSim API server listening on port {}", port);

    axum::serve(listener, app).await?;
    Ok(())
}

fn create_router() -> Router<SqlitePool> {
    Router::new()
        .route("/health", get(health_check))
        .route("/teams", get(get_teams_handler))
        .route("/teams/{id}/matches", get(get_team_matches_handler))
        .route("/fixtures", get(get_fixtures_handler))
        .route("/weeks/current", get(current_week_handler))
        .route("/standings", get(get_standings_handler))
        .route("/predictions", get(get_predictions_handler))
        .route("/simulate/week", post(simulate_week_handler))
        .route("/simulate/all", post(simulate_all_handler))
        .route("/reset", post(reset_handler))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
}

// Health check endpoint
async fn health_check() -> Json<ApiResponse<&'static str>> {
    Json(ApiResponse::success("LeagueSim API is running"))
}

// GET /teams - All teams in the league
async fn get_teams_handler(
    State(pool): State<SqlitePool>,
) -> Result<Json<ApiResponse<Vec<Team>>>, StatusCode> {
    match db::get_all_teams(&pool).await {
        Ok(teams) => Ok(Json(ApiResponse::success(teams))),
        Err(e) => {
            tracing::error!("Failed to fetch teams: {}", e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

// GET /teams/{id}/matches?location=home|away - A team's fixtures
#[derive(Deserialize)]
struct TeamMatchesQuery {
    location: Option<String>,
}

async fn get_team_matches_handler(
    State(pool): State<SqlitePool>,
    Path(team_id): Path<String>,
    Query(params): Query<TeamMatchesQuery>,
) -> Result<Json<ApiResponse<Vec<Match>>>, StatusCode> {
    let location = match params.location.as_deref() {
        Some(raw) => match raw.parse::<Location>() {
            Ok(location) => Some(location),
            Err(e) => {
                tracing::warn!("Rejected team matches query: {}", e);
                return Err(StatusCode::BAD_REQUEST);
            }
        },
        None => None,
    };

    match db::get_team_by_id(&pool, &team_id).await {
        Ok(Some(_)) => {}
        Ok(None) => return Err(StatusCode::NOT_FOUND),
        Err(e) => {
            tracing::error!("Failed to fetch team {}: {}", team_id, e);
            return Err(StatusCode::INTERNAL_SERVER_ERROR);
        }
    }

    match db::get_team_matches(&pool, &team_id, location).await {
        Ok(matches) => Ok(Json(ApiResponse::success(matches))),
        Err(e) => {
            tracing::error!("Failed to fetch matches for team {}: {}", team_id, e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

// GET /fixtures?week=N - The season schedule, generating it on first call
#[derive(Deserialize)]
struct FixturesQuery {
    week: Option<i32>,
}

async fn get_fixtures_handler(
    State(pool): State<SqlitePool>,
    Query(params): Query<FixturesQuery>,
) -> Result<Json<ApiResponse<Vec<Match>>>, StatusCode> {
    let scheduler = FixtureScheduler::new();
    if let Err(e) = scheduler.ensure_schedule(&pool).await {
        tracing::error!("Failed to generate fixtures: {}", e);
        return Err(StatusCode::INTERNAL_SERVER_ERROR);
    }

    let result = match params.week {
        Some(week) => db::get_matches_by_week(&pool, week).await,
        None => db::get_all_matches(&pool).await,
    };

    match result {
        Ok(matches) => Ok(Json(ApiResponse::success(matches))),
        Err(e) => {
            tracing::error!("Failed to fetch fixtures: {}", e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

// GET /weeks/current - Lowest week with an unplayed match
async fn current_week_handler(
    State(pool): State<SqlitePool>,
) -> Result<Json<ApiResponse<i32>>, StatusCode> {
    match db::get_current_week(&pool).await {
        Ok(week) => Ok(Json(ApiResponse::success(week))),
        Err(e) => {
            tracing::error!("Failed to derive current week: {}", e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

// GET /standings - League table derived from played matches
async fn get_standings_handler(
    State(pool): State<SqlitePool>,
) -> Result<Json<ApiResponse<Vec<Standing>>>, StatusCode> {
    let aggregator = StandingsAggregator::new();

    let teams = match db::get_all_teams(&pool).await {
        Ok(teams) => teams,
        Err(e) => {
            tracing::error!("Failed to fetch teams for standings: {}", e);
            return Err(StatusCode::INTERNAL_SERVER_ERROR);
        }
    };

    match db::get_all_matches(&pool).await {
        Ok(matches) => Ok(Json(ApiResponse::success(
            aggregator.compute(&teams, &matches),
        ))),
        Err(e) => {
            tracing::error!("Failed to fetch matches for standings: {}", e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

// GET /predictions - Monte Carlo title chances (empty before week 4)
async fn get_predictions_handler(
    State(pool): State<SqlitePool>,
) -> Result<Json<ApiResponse<Vec<TitleOdds>>>, StatusCode> {
    let predictor = ChampionshipPredictor::new();

    match predictor.predict_chances(&pool).await {
        Ok(odds) => Ok(Json(ApiResponse::success(odds))),
        Err(e) => {
            tracing::error!("Failed to compute predictions: {}", e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

// POST /simulate/week - Play every unplayed match of the current week
async fn simulate_week_handler(
    State(pool): State<SqlitePool>,
) -> Result<Json<ApiResponse<Vec<Match>>>, StatusCode> {
    let simulator = MatchSimulator::new();

    match simulator.simulate_current_week(&pool).await {
        Ok(played) => Ok(Json(ApiResponse::success(played))),
        Err(e) => {
            tracing::error!("Failed to simulate week: {}", e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

// POST /simulate/all - Play out the entire remaining season
async fn simulate_all_handler(
    State(pool): State<SqlitePool>,
) -> Result<Json<ApiResponse<Vec<Match>>>, StatusCode> {
    let simulator = MatchSimulator::new();

    match simulator.simulate_all(&pool).await {
        Ok(played) => Ok(Json(ApiResponse::success(played))),
        Err(e) => {
            tracing::error!("Failed to simulate remaining matches: {}", e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

// POST /reset - Clear all results, keeping the schedule
async fn reset_handler(
    State(pool): State<SqlitePool>,
) -> Result<Json<ApiResponse<&'static str>>, StatusCode> {
    match db::reset_results(&pool).await {
        Ok(()) => Ok(Json(ApiResponse::success("Season reset"))),
        Err(e) => {
            tracing::error!("Failed to reset season: {}", e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}
