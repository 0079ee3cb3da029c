//! HTTP routes.

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Request, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::middleware::{self, Next};
use axum::response::{Html, IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use quizcards::GameError;
use tracing::{error, info, instrument, warn};

use crate::api::{
    CardWithChoices, ErrorResponse, GameResultsResponse, HealthResponse, StartGameRequest,
    SubmitAnswerRequest, TotalCardsResponse,
};
use crate::{ApiError, ImageCache, ImageError, QuizOrchestrator};

const INDEX_HTML: &str = include_str!("../static/index.html");
const APP_JS: &str = include_str!("../static/app.js");
const STYLE_CSS: &str = include_str!("../static/style.css");

/// Session cookie attributes.
#[derive(Debug, Clone)]
pub struct CookieSettings {
    /// Cookie name.
    pub name: String,
    /// `Max-Age` in seconds.
    pub max_age_secs: u64,
    /// Whether to add the `Secure` attribute.
    pub secure: bool,
}

impl CookieSettings {
    /// Finds this cookie's value in the request headers.
    pub fn read<'h>(&self, headers: &'h HeaderMap) -> Option<&'h str> {
        headers
            .get_all(header::COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .flat_map(|value| value.split(';'))
            .filter_map(|pair| pair.trim().split_once('='))
            .find(|(name, _)| *name == self.name)
            .map(|(_, value)| value)
    }

    /// `Set-Cookie` header value carrying `token`.
    pub fn header_value(&self, token: &str) -> String {
        let mut cookie = format!(
            "{}={}; Path=/; Max-Age={}; HttpOnly; SameSite=Lax",
            self.name, token, self.max_age_secs
        );
        if self.secure {
            cookie.push_str("; Secure");
        }
        cookie
    }
}

/// Shared state of every handler.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Game service.
    pub orchestrator: Arc<QuizOrchestrator>,
    /// Image cache.
    pub images: Arc<ImageCache>,
    /// Session cookie attributes.
    pub cookie: Arc<CookieSettings>,
}

/// Builds the application router.
#[instrument(skip(state))]
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/app.js", get(app_js))
        .route("/style.css", get(style_css))
        .route("/health", get(health))
        .route("/api/cards/total", get(total_cards))
        .route("/api/game/start", post(start_game))
        .route("/api/game/current", get(current_card))
        .route("/api/game/answer", post(submit_answer))
        .route("/api/game/results", get(game_results))
        .route("/images/{*image_ref}", get(image))
        .layer(middleware::from_fn(log_requests))
        .with_state(state)
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::Game(GameError::InvalidCardCount { .. })
            | Self::InvalidRequest(_)
            | Self::EmptyAnswer => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Game(GameError::NoActiveGame) => StatusCode::NOT_FOUND,
            Self::Game(GameError::AlreadyComplete | GameError::GameNotComplete) => {
                StatusCode::CONFLICT
            }
            Self::Game(GameError::InsufficientChoices { .. } | GameError::InvariantViolation(_)) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            Self::Image(ImageError::InvalidImageRef(_)) => StatusCode::BAD_REQUEST,
            Self::Image(ImageError::NotFound(_)) => StatusCode::NOT_FOUND,
            Self::Image(_) | Self::Token(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        if status.is_server_error() {
            error!(error = %self, code = self.code(), "Request failed");
        }

        let body = ErrorResponse {
            error: self.code().to_string(),
            detail: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

async fn log_requests(req: Request, next: Next) -> Response {
    let method = req.method().clone();
    let uri = req.uri().clone();
    let response = next.run(req).await;
    info!(method = %method, uri = %uri, status = %response.status(), "Request handled");
    response
}

fn rejected_body(rejection: JsonRejection) -> ApiError {
    warn!(status = %rejection.status(), error = %rejection.body_text(), "Rejected request body");
    ApiError::from(rejection)
}

async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

async fn app_js() -> impl IntoResponse {
    ([(header::CONTENT_TYPE, "text/javascript; charset=utf-8")], APP_JS)
}

async fn style_css() -> impl IntoResponse {
    ([(header::CONTENT_TYPE, "text/css; charset=utf-8")], STYLE_CSS)
}

async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        cards_loaded: !state.orchestrator.catalog().is_empty(),
    })
}

async fn total_cards(State(state): State<AppState>) -> Json<TotalCardsResponse> {
    Json(state.orchestrator.total_cards())
}

#[instrument(skip_all)]
async fn start_game(
    State(state): State<AppState>,
    request: Result<Json<StartGameRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(request) = request.map_err(rejected_body)?;
    let (body, token) = state.orchestrator.start_game(request.num_cards)?;
    Ok((
        [(header::SET_COOKIE, state.cookie.header_value(&token))],
        Json(body),
    )
        .into_response())
}

#[instrument(skip_all)]
async fn current_card(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<CardWithChoices>, ApiError> {
    let token = state.cookie.read(&headers);
    Ok(Json(state.orchestrator.current(token)?))
}

#[instrument(skip_all)]
async fn submit_answer(
    State(state): State<AppState>,
    headers: HeaderMap,
    request: Result<Json<SubmitAnswerRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(request) = request.map_err(rejected_body)?;
    let token = state.cookie.read(&headers);
    let (body, token) = state.orchestrator.submit_answer(token, &request.answer)?;
    Ok((
        [(header::SET_COOKIE, state.cookie.header_value(&token))],
        Json(body),
    )
        .into_response())
}

#[instrument(skip_all)]
async fn game_results(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<GameResultsResponse>, ApiError> {
    let token = state.cookie.read(&headers);
    Ok(Json(state.orchestrator.results(token)?))
}

#[instrument(skip_all)]
async fn image(
    State(state): State<AppState>,
    Path(image_ref): Path<String>,
) -> Result<Response, ApiError> {
    let bytes = state.images.resolve(&image_ref).await.map_err(|e| {
        warn!(error = %e, "Image request failed");
        ApiError::from(e)
    })?;
    Ok((
        [(header::CONTENT_TYPE, ImageCache::content_type(&image_ref))],
        bytes,
    )
        .into_response())
}
