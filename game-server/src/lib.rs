use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use warp::Filter;
use warp::http::StatusCode;

use crate::auth::{AuthService, bearer_token};
use crate::config::Config;
use crate::game_manager::GameManager;
use game_persistence::repositories::UserRepository;
use game_types::{
    AnswerRequest, ClueId, ErrorResponse, GameError, GameStatusResponse, MostRecentResponse, User,
    WagerRequest,
};

pub mod auth;
pub mod config;
pub mod game_manager;

const MAX_BODY_BYTES: u64 = 16 * 1024;

type JsonReply = warp::reply::WithStatus<warp::reply::Json>;

#[derive(Deserialize)]
struct LeaderboardQuery {
    limit: Option<usize>,
    date: Option<NaiveDate>,
}

#[derive(Deserialize)]
struct QuestionsQuery {
    #[serde(rename = "type")]
    kind: Option<String>,
}

pub fn create_routes(
    game_manager: Arc<GameManager>,
    auth_service: Arc<AuthService>,
    user_repository: Arc<UserRepository>,
    config: Arc<Config>,
) -> impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone {
    // Clone for filters
    let game_manager_filter = warp::any().map({
        let game_manager = game_manager.clone();
        move || game_manager.clone()
    });

    let auth_filter = warp::any().map({
        let auth_service = auth_service.clone();
        move || auth_service.clone()
    });

    let user_repository_filter = warp::any().map({
        let user_repository = user_repository.clone();
        move || user_repository.clone()
    });

    let config_filter = warp::any().map({
        let config = config.clone();
        move || config.clone()
    });

    let authorization = warp::header::optional::<String>("authorization");

    // Health check endpoint
    let health = warp::path("health")
        .and(warp::get())
        .map(|| warp::reply::with_status("OK", StatusCode::OK));

    // Public board, never includes answers
    let questions = warp::path("questions")
        .and(warp::path::end())
        .and(warp::get())
        .and(warp::query::<QuestionsQuery>())
        .and(game_manager_filter.clone())
        .and_then(handle_questions_request);

    let start_game = warp::path!("game" / "start")
        .and(warp::post())
        .and(authorization)
        .and(game_manager_filter.clone())
        .and(auth_filter.clone())
        .and(user_repository_filter.clone())
        .and_then(handle_start_game);

    let game_state = warp::path!("game" / "state")
        .and(warp::get())
        .and(authorization)
        .and(game_manager_filter.clone())
        .and(auth_filter.clone())
        .and_then(handle_game_state);

    let open_clue = warp::path!("game" / "clues" / ClueId / "open")
        .and(warp::post())
        .and(authorization)
        .and(game_manager_filter.clone())
        .and(auth_filter.clone())
        .and_then(handle_open_clue);

    let clue_wager = warp::path!("game" / "clues" / "wager")
        .and(warp::post())
        .and(authorization)
        .and(json_body::<WagerRequest>())
        .and(game_manager_filter.clone())
        .and(auth_filter.clone())
        .and_then(handle_clue_wager);

    let clue_answer = warp::path!("game" / "clues" / "answer")
        .and(warp::post())
        .and(authorization)
        .and(json_body::<AnswerRequest>())
        .and(game_manager_filter.clone())
        .and(auth_filter.clone())
        .and_then(handle_clue_answer);

    let clue_skip = warp::path!("game" / "clues" / "skip")
        .and(warp::post())
        .and(authorization)
        .and(game_manager_filter.clone())
        .and(auth_filter.clone())
        .and_then(handle_clue_skip);

    let final_category = warp::path!("game" / "final")
        .and(warp::get())
        .and(authorization)
        .and(game_manager_filter.clone())
        .and(auth_filter.clone())
        .and_then(handle_final_category);

    let final_wager = warp::path!("game" / "final" / "wager")
        .and(warp::post())
        .and(authorization)
        .and(json_body::<WagerRequest>())
        .and(game_manager_filter.clone())
        .and(auth_filter.clone())
        .and_then(handle_final_wager);

    let final_answer = warp::path!("game" / "final" / "answer")
        .and(warp::post())
        .and(authorization)
        .and(json_body::<AnswerRequest>())
        .and(game_manager_filter.clone())
        .and(auth_filter.clone())
        .and_then(handle_final_answer);

    let game_status = warp::path!("game" / "status")
        .and(warp::get())
        .and(authorization)
        .and(game_manager_filter.clone())
        .and(auth_filter.clone())
        .and_then(handle_game_status);

    let most_recent = warp::path!("game" / "most-recent")
        .and(warp::get())
        .and(authorization)
        .and(game_manager_filter.clone())
        .and(auth_filter.clone())
        .and_then(handle_most_recent);

    let leaderboard = warp::path("leaderboard")
        .and(warp::path::end())
        .and(warp::get())
        .and(warp::query::<LeaderboardQuery>())
        .and(game_manager_filter.clone())
        .and(config_filter.clone())
        .and_then(handle_leaderboard_request);

    // CORS configuration
    let cors = warp::cors()
        .allow_any_origin()
        .allow_headers(vec!["content-type", "authorization"])
        .allow_methods(vec!["GET", "POST"]);

    health
        .or(questions)
        .or(start_game)
        .or(game_state)
        .or(open_clue)
        .or(clue_wager)
        .or(clue_answer)
        .or(clue_skip)
        .or(final_category)
        .or(final_wager)
        .or(final_answer)
        .or(game_status)
        .or(most_recent)
        .or(leaderboard)
        .with(cors)
        .with(warp::log("trivia"))
}

fn json_body<T: serde::de::DeserializeOwned + Send>()
-> impl Filter<Extract = (T,), Error = warp::Rejection> + Clone {
    warp::body::content_length_limit(MAX_BODY_BYTES).and(warp::body::json())
}

pub fn status_for(error: &GameError) -> StatusCode {
    match error {
        GameError::InvalidWager { .. }
        | GameError::EmptyOrMalformedAnswer
        | GameError::WagerRequired
        | GameError::SkipNotAllowed => StatusCode::BAD_REQUEST,
        GameError::ClueNotOpen
        | GameError::ClueAlreadyOpen { .. }
        | GameError::InvalidSessionState { .. }
        | GameError::DuplicateCompletion
        | GameError::AlreadyPlayed { .. } => StatusCode::CONFLICT,
        GameError::ClueNotFound { .. } | GameError::SessionNotFound => StatusCode::NOT_FOUND,
        GameError::PersistenceFailure { .. } => StatusCode::SERVICE_UNAVAILABLE,
        GameError::AuthenticationRequired => StatusCode::UNAUTHORIZED,
    }
}

fn error_reply(error: GameError) -> JsonReply {
    let status = status_for(&error);
    warp::reply::with_status(warp::reply::json(&ErrorResponse::from(error)), status)
}

fn respond<T: Serialize>(result: Result<T, GameError>) -> JsonReply {
    match result {
        Ok(body) => warp::reply::with_status(warp::reply::json(&body), StatusCode::OK),
        Err(error) => error_reply(error),
    }
}

fn authenticate(auth_header: Option<&str>, auth_service: &AuthService) -> Result<User, JsonReply> {
    bearer_token(auth_header)
        .and_then(|token| auth_service.validate_token(token))
        .map_err(|e| {
            tracing::debug!("Rejected request: {}", e);
            error_reply(GameError::AuthenticationRequired)
        })
}

fn today() -> NaiveDate {
    Utc::now().date_naive()
}

async fn handle_questions_request(
    query: QuestionsQuery,
    game_manager: Arc<GameManager>,
) -> Result<JsonReply, warp::Rejection> {
    match query.kind.as_deref() {
        Some("final") => Ok(warp::reply::with_status(
            warp::reply::json(&serde_json::json!({
                "category": game_manager.board().final_clue().category
            })),
            StatusCode::OK,
        )),
        _ => Ok(warp::reply::with_status(
            warp::reply::json(&game_manager.public_board()),
            StatusCode::OK,
        )),
    }
}

async fn handle_start_game(
    auth_header: Option<String>,
    game_manager: Arc<GameManager>,
    auth_service: Arc<AuthService>,
    user_repository: Arc<UserRepository>,
) -> Result<JsonReply, warp::Rejection> {
    let user = match authenticate(auth_header.as_deref(), &auth_service) {
        Ok(user) => user,
        Err(reply) => return Ok(reply),
    };

    // Leaderboard names come from here; a failure only costs the display name
    if let Err(err) = user_repository.upsert_user(user.clone()).await {
        tracing::warn!("Failed to record user {}: {}", user.id, err);
    }

    Ok(respond(game_manager.start_session(user.id, today()).await))
}

async fn handle_game_state(
    auth_header: Option<String>,
    game_manager: Arc<GameManager>,
    auth_service: Arc<AuthService>,
) -> Result<JsonReply, warp::Rejection> {
    let user = match authenticate(auth_header.as_deref(), &auth_service) {
        Ok(user) => user,
        Err(reply) => return Ok(reply),
    };

    Ok(respond(game_manager.session_view(user.id).await))
}

async fn handle_open_clue(
    clue_id: ClueId,
    auth_header: Option<String>,
    game_manager: Arc<GameManager>,
    auth_service: Arc<AuthService>,
) -> Result<JsonReply, warp::Rejection> {
    let user = match authenticate(auth_header.as_deref(), &auth_service) {
        Ok(user) => user,
        Err(reply) => return Ok(reply),
    };

    Ok(respond(game_manager.open_clue(user.id, clue_id).await))
}

async fn handle_clue_wager(
    auth_header: Option<String>,
    request: WagerRequest,
    game_manager: Arc<GameManager>,
    auth_service: Arc<AuthService>,
) -> Result<JsonReply, warp::Rejection> {
    let user = match authenticate(auth_header.as_deref(), &auth_service) {
        Ok(user) => user,
        Err(reply) => return Ok(reply),
    };

    Ok(respond(
        game_manager.place_clue_wager(user.id, request.wager).await,
    ))
}

async fn handle_clue_answer(
    auth_header: Option<String>,
    request: AnswerRequest,
    game_manager: Arc<GameManager>,
    auth_service: Arc<AuthService>,
) -> Result<JsonReply, warp::Rejection> {
    let user = match authenticate(auth_header.as_deref(), &auth_service) {
        Ok(user) => user,
        Err(reply) => return Ok(reply),
    };

    Ok(respond(
        game_manager.answer_clue(user.id, &request.answer).await,
    ))
}

async fn handle_clue_skip(
    auth_header: Option<String>,
    game_manager: Arc<GameManager>,
    auth_service: Arc<AuthService>,
) -> Result<JsonReply, warp::Rejection> {
    let user = match authenticate(auth_header.as_deref(), &auth_service) {
        Ok(user) => user,
        Err(reply) => return Ok(reply),
    };

    Ok(respond(game_manager.skip_clue(user.id).await))
}

async fn handle_final_category(
    auth_header: Option<String>,
    game_manager: Arc<GameManager>,
    auth_service: Arc<AuthService>,
) -> Result<JsonReply, warp::Rejection> {
    let user = match authenticate(auth_header.as_deref(), &auth_service) {
        Ok(user) => user,
        Err(reply) => return Ok(reply),
    };

    Ok(respond(game_manager.final_round_category(user.id).await))
}

async fn handle_final_wager(
    auth_header: Option<String>,
    request: WagerRequest,
    game_manager: Arc<GameManager>,
    auth_service: Arc<AuthService>,
) -> Result<JsonReply, warp::Rejection> {
    let user = match authenticate(auth_header.as_deref(), &auth_service) {
        Ok(user) => user,
        Err(reply) => return Ok(reply),
    };

    Ok(respond(
        game_manager.place_final_wager(user.id, request.wager).await,
    ))
}

async fn handle_final_answer(
    auth_header: Option<String>,
    request: AnswerRequest,
    game_manager: Arc<GameManager>,
    auth_service: Arc<AuthService>,
) -> Result<JsonReply, warp::Rejection> {
    let user = match authenticate(auth_header.as_deref(), &auth_service) {
        Ok(user) => user,
        Err(reply) => return Ok(reply),
    };

    Ok(respond(
        game_manager
            .submit_final_answer(user.id, &request.answer)
            .await,
    ))
}

async fn handle_game_status(
    auth_header: Option<String>,
    game_manager: Arc<GameManager>,
    auth_service: Arc<AuthService>,
) -> Result<JsonReply, warp::Rejection> {
    let user = match authenticate(auth_header.as_deref(), &auth_service) {
        Ok(user) => user,
        Err(reply) => return Ok(reply),
    };

    Ok(respond(
        game_manager
            .has_played(user.id, today())
            .await
            .map(|has_played| GameStatusResponse { has_played }),
    ))
}

async fn handle_most_recent(
    auth_header: Option<String>,
    game_manager: Arc<GameManager>,
    auth_service: Arc<AuthService>,
) -> Result<JsonReply, warp::Rejection> {
    let user = match authenticate(auth_header.as_deref(), &auth_service) {
        Ok(user) => user,
        Err(reply) => return Ok(reply),
    };

    Ok(respond(
        game_manager
            .most_recent(user.id)
            .await
            .map(|result| MostRecentResponse { result }),
    ))
}

async fn handle_leaderboard_request(
    query: LeaderboardQuery,
    game_manager: Arc<GameManager>,
    config: Arc<Config>,
) -> Result<JsonReply, warp::Rejection> {
    let limit = config.leaderboard_limit(query.limit);
    Ok(respond(game_manager.leaderboard(query.date, limit).await))
}
