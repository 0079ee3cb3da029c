//! Error taxonomy for catalog validation and game transitions.

use crate::CardId;

/// Error raised by a game operation.
///
/// Every variant is recoverable by the client: the boundary layer maps
/// each one to a distinct response so the player can be sent to the
/// right screen.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display)]
pub enum GameError {
    /// The requested game size is outside `[min, max]`.
    #[display("Number of cards must be between {} and {}, got {}", min, max, requested)]
    InvalidCardCount {
        /// Requested number of cards.
        requested: usize,
        /// Smallest allowed game.
        min: usize,
        /// Largest allowed game (half the catalog).
        max: usize,
    },

    /// The catalog does not hold enough distinct incorrect answers.
    #[display("Need {} distinct incorrect answers, catalog only has {}", required, available)]
    InsufficientChoices {
        /// Distinct incorrect answers available.
        available: usize,
        /// Distinct incorrect answers required.
        required: usize,
    },

    /// There is no game to play (never started, finished, or unreadable).
    #[display("No active game. Please start a new game.")]
    NoActiveGame,

    /// Every card of the game has already been answered.
    #[display("Game is already complete")]
    AlreadyComplete,

    /// Results were requested before the last card was answered.
    #[display("Game is not complete yet")]
    GameNotComplete,

    /// A session broke one of its structural invariants.
    #[display("Invariant violation: {}", _0)]
    InvariantViolation(String),
}

impl std::error::Error for GameError {}

/// Error raised while validating a freshly loaded catalog.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display)]
pub enum CatalogError {
    /// Two cards carry the same identifier.
    #[display("Duplicate card id {}", id)]
    DuplicateCardId {
        /// The repeated identifier.
        id: CardId,
    },

    /// The catalog cannot host a minimum-size game.
    #[display("Catalog has {} cards, at least {} are required", found, required)]
    CatalogTooSmall {
        /// Cards found.
        found: usize,
        /// Cards required.
        required: usize,
    },
}

impl std::error::Error for CatalogError {}
