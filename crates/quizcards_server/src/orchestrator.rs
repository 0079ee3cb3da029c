//! Maps API requests onto game transitions.
//!
//! The session token is the only session state: every call decodes it,
//! runs exactly one transition, and hands back a freshly encoded token when
//! the session changed.

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use quizcards::{Catalog, GameError, GameSession, MIN_GAME_CARDS};
use tracing::{debug, info, instrument, warn};

use crate::api::{
    CardWithChoices, GameResultsResponse, StartGameResponse, SubmitAnswerResponse,
    TotalCardsResponse,
};
use crate::{ImageError, TokenCodec, TokenError};

/// Error returned to an API client.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display)]
pub enum ApiError {
    /// A game transition was refused.
    #[display("{}", _0)]
    Game(GameError),

    /// The request body could not be read.
    #[display("Invalid request: {}", _0)]
    InvalidRequest(String),

    /// The submitted answer was empty.
    #[display("Answer must not be empty")]
    EmptyAnswer,

    /// An image could not be served.
    #[display("{}", _0)]
    Image(ImageError),

    /// The session could not be encoded.
    #[display("{}", _0)]
    Token(TokenError),
}

impl std::error::Error for ApiError {}

impl From<GameError> for ApiError {
    fn from(err: GameError) -> Self {
        Self::Game(err)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::InvalidRequest(rejection.body_text())
    }
}

impl From<ImageError> for ApiError {
    fn from(err: ImageError) -> Self {
        Self::Image(err)
    }
}

impl From<TokenError> for ApiError {
    fn from(err: TokenError) -> Self {
        Self::Token(err)
    }
}

impl ApiError {
    /// Stable code identifying the error to clients.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Game(GameError::InvalidCardCount { .. }) => "invalid_card_count",
            Self::Game(GameError::InsufficientChoices { .. }) => "insufficient_choices",
            Self::Game(GameError::NoActiveGame) => "no_active_game",
            Self::Game(GameError::AlreadyComplete) => "already_complete",
            Self::Game(GameError::GameNotComplete) => "game_not_complete",
            Self::Game(GameError::InvariantViolation(_)) => "invariant_violation",
            Self::InvalidRequest(_) => "invalid_request",
            Self::EmptyAnswer => "empty_answer",
            Self::Image(ImageError::InvalidImageRef(_)) => "invalid_image_ref",
            Self::Image(ImageError::NotFound(_)) => "image_not_found",
            Self::Image(_) => "image_unavailable",
            Self::Token(_) => "token_encoding",
        }
    }
}

/// The API-facing game service.
///
/// Holds only immutable state, so one instance serves every client
/// concurrently.
#[derive(Debug, Clone)]
pub struct QuizOrchestrator {
    catalog: Arc<Catalog>,
    codec: TokenCodec,
}

impl QuizOrchestrator {
    /// Creates an orchestrator over a loaded catalog.
    #[instrument(skip(catalog, codec), fields(cards = catalog.len()))]
    pub fn new(catalog: Arc<Catalog>, codec: TokenCodec) -> Self {
        info!("Creating quiz orchestrator");
        Self { catalog, codec }
    }

    /// The loaded catalog.
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Catalog size and the allowed game sizes.
    #[instrument(skip(self))]
    pub fn total_cards(&self) -> TotalCardsResponse {
        TotalCardsResponse {
            total: self.catalog.len(),
            min_game_cards: MIN_GAME_CARDS,
            max_game_cards: self.catalog.max_game_size(),
        }
    }

    /// Starts a new game, discarding whatever session the client held.
    ///
    /// Returns the response and the new token.
    #[instrument(skip(self))]
    pub fn start_game(&self, num_cards: usize) -> Result<(StartGameResponse, String), ApiError> {
        let session = GameSession::start(num_cards, &self.catalog, &mut rand::thread_rng())?;
        let token = self.codec.encode(&session)?;

        info!(num_cards, "Started new game");
        Ok((
            StartGameResponse {
                message: "Game started".to_string(),
                total_cards: session.num_cards(),
            },
            token,
        ))
    }

    /// The current card with freshly sampled choices. Does not change the
    /// session.
    #[instrument(skip(self, token), fields(has_token = token.is_some()))]
    pub fn current(&self, token: Option<&str>) -> Result<CardWithChoices, ApiError> {
        let session = self.session(token)?;
        let current = session.current(&self.catalog, &mut rand::thread_rng())?;

        let card = current.card();
        let response = CardWithChoices {
            card_index: current.position(),
            total_cards: current.total(),
            image_url: image_url(card.image_ref()),
            choices: current.into_choices().into_inner(),
        };
        debug!(card_index = response.card_index, "Serving current card");
        Ok(response)
    }

    /// Answers the current card.
    ///
    /// Returns the response and the token of the advanced session.
    #[instrument(skip(self, token, answer), fields(has_token = token.is_some()))]
    pub fn submit_answer(
        &self,
        token: Option<&str>,
        answer: &str,
    ) -> Result<(SubmitAnswerResponse, String), ApiError> {
        if answer.is_empty() {
            warn!("Empty answer rejected");
            return Err(ApiError::EmptyAnswer);
        }

        let mut session = self.session(token)?;
        let outcome = session.submit(answer, &self.catalog)?;
        let token = self.codec.encode(&session)?;

        info!(
            correct = *outcome.is_correct(),
            complete = *outcome.is_complete(),
            score = session.score(),
            total = session.num_cards(),
            "Answer submitted"
        );
        Ok((
            SubmitAnswerResponse {
                correct: *outcome.is_correct(),
                correct_answer: outcome.correct_answer().clone(),
                is_complete: *outcome.is_complete(),
            },
            token,
        ))
    }

    /// Final results of a completed game.
    #[instrument(skip(self, token), fields(has_token = token.is_some()))]
    pub fn results(&self, token: Option<&str>) -> Result<GameResultsResponse, ApiError> {
        let session = self.session(token)?;
        let results = session.results()?;

        Ok(GameResultsResponse {
            score: *results.score(),
            total: *results.total(),
            percentage: *results.percentage(),
        })
    }

    /// Decodes the client's session.
    ///
    /// A missing, tampered, expired or stale token (one naming cards the
    /// catalog no longer has) counts as no game at all.
    fn session(&self, token: Option<&str>) -> Result<GameSession, GameError> {
        let Some(token) = token else {
            debug!("No session token");
            return Err(GameError::NoActiveGame);
        };

        let session = self.codec.decode(token).map_err(|e| {
            warn!(error = %e, "Rejected session token");
            GameError::NoActiveGame
        })?;

        if let Some(missing) = session.cards().iter().find(|id| !self.catalog.contains(**id)) {
            warn!(card_id = %missing, "Session references unknown card");
            return Err(GameError::NoActiveGame);
        }

        Ok(session)
    }
}

/// Route under which a cached image is served, each path segment
/// percent-encoded.
pub fn image_url(image_ref: &str) -> String {
    let path = image_ref
        .split('/')
        .map(urlencoding::encode)
        .collect::<Vec<_>>()
        .join("/");
    format!("/images/{}", path)
}
