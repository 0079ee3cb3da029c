//! Request and response bodies of the HTTP API.

use serde::{Deserialize, Serialize};

/// Request to start a new game.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StartGameRequest {
    /// Number of cards to play.
    pub num_cards: usize,
}

/// Response after starting a game.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StartGameResponse {
    /// Confirmation message.
    pub message: String,
    /// Number of cards in the new game.
    pub total_cards: usize,
}

/// Request to answer the current card.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitAnswerRequest {
    /// The selected answer.
    pub answer: String,
}

/// Response after answering a card.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmitAnswerResponse {
    /// Whether the answer was correct.
    pub correct: bool,
    /// The correct answer for the card.
    pub correct_answer: String,
    /// Whether the game is complete.
    pub is_complete: bool,
}

/// Current card with its answer choices.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CardWithChoices {
    /// Zero-based position of the card in the game.
    pub card_index: usize,
    /// Number of cards in the game.
    pub total_cards: usize,
    /// URL of the card image.
    pub image_url: String,
    /// Five alphabetically sorted choices.
    pub choices: Vec<String>,
}

/// Final results of a game.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameResultsResponse {
    /// Correct answers.
    pub score: usize,
    /// Cards played.
    pub total: usize,
    /// Percentage score, one decimal.
    pub percentage: f64,
}

/// Catalog size and allowed game sizes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TotalCardsResponse {
    /// Cards in the catalog.
    pub total: usize,
    /// Smallest allowed game.
    pub min_game_cards: usize,
    /// Largest allowed game.
    pub max_game_cards: usize,
}

/// Health probe response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Always `"healthy"` when the server answers.
    pub status: String,
    /// Whether a non-empty catalog is loaded.
    pub cards_loaded: bool,
}

/// Error body returned for every failed request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Stable machine-readable code.
    pub error: String,
    /// Human-readable detail.
    pub detail: String,
}
