//! Game session state machine.
//!
//! A session moves `NotStarted → InProgress → Complete`. The only way out
//! of `Complete` is a fresh [`GameSession::start`], which replaces the old
//! session wholesale. Sessions are serde values: the boundary carries them
//! in a client-held token and the deserializer re-checks every invariant.

use std::collections::HashSet;

use derive_getters::Getters;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use crate::{AnswerChoices, Card, CardId, Catalog, GameError, MIN_GAME_CARDS, sample_choices};

// ─────────────────────────────────────────────────────────────
//  Phase
// ─────────────────────────────────────────────────────────────

/// Lifecycle phase of a player's game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, derive_more::Display)]
pub enum GamePhase {
    /// No session exists.
    #[display("not started")]
    NotStarted,
    /// Cards remain to be answered.
    #[display("in progress")]
    InProgress,
    /// Every card has been answered.
    #[display("complete")]
    Complete,
}

impl GamePhase {
    /// Phase of an optional session; absence means the game never started.
    pub fn of(session: Option<&GameSession>) -> Self {
        match session {
            None => Self::NotStarted,
            Some(session) => session.phase(),
        }
    }
}

// ─────────────────────────────────────────────────────────────
//  Session
// ─────────────────────────────────────────────────────────────

/// One player's game: the chosen cards in play order, the position of the
/// next card to answer and the number of correct answers so far.
///
/// Invariants:
/// - `score <= current_index <= cards.len()`
/// - `cards.len() >= MIN_GAME_CARDS`
/// - no card id appears twice
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "SessionRecord")]
pub struct GameSession {
    cards: Vec<CardId>,
    current_index: usize,
    score: usize,
}

/// Unchecked wire shape of a session.
#[derive(Deserialize)]
struct SessionRecord {
    cards: Vec<CardId>,
    current_index: usize,
    score: usize,
}

impl TryFrom<SessionRecord> for GameSession {
    type Error = GameError;

    fn try_from(record: SessionRecord) -> Result<Self, Self::Error> {
        let session = Self {
            cards: record.cards,
            current_index: record.current_index,
            score: record.score,
        };
        session.check_invariants()?;
        Ok(session)
    }
}

impl GameSession {
    /// Starts a game of `num_cards` cards drawn at random from `catalog`.
    ///
    /// The draw order is the play order.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::InvalidCardCount`] unless
    /// `MIN_GAME_CARDS <= num_cards <= catalog.len() / 2`.
    #[instrument(skip(catalog, rng), fields(catalog_size = catalog.len()))]
    pub fn start<R>(num_cards: usize, catalog: &Catalog, rng: &mut R) -> Result<Self, GameError>
    where
        R: Rng + ?Sized,
    {
        if !catalog.game_size_range().contains(&num_cards) {
            warn!(num_cards, max = catalog.max_game_size(), "Rejected game size");
            return Err(GameError::InvalidCardCount {
                requested: num_cards,
                min: MIN_GAME_CARDS,
                max: catalog.max_game_size(),
            });
        }

        let cards = rand::seq::index::sample(rng, catalog.len(), num_cards)
            .into_iter()
            .map(|position| *catalog.cards()[position].id())
            .collect();

        let session = Self {
            cards,
            current_index: 0,
            score: 0,
        };
        info!(num_cards, "Started game session");
        Ok(session)
    }

    /// Card ids in play order.
    pub fn cards(&self) -> &[CardId] {
        &self.cards
    }

    /// Index of the next card to answer.
    pub fn current_index(&self) -> usize {
        self.current_index
    }

    /// Correct answers so far.
    pub fn score(&self) -> usize {
        self.score
    }

    /// Number of cards in this game.
    pub fn num_cards(&self) -> usize {
        self.cards.len()
    }

    /// Returns true once every card has been answered.
    pub fn is_complete(&self) -> bool {
        self.current_index == self.cards.len()
    }

    /// Current phase (never `NotStarted`).
    pub fn phase(&self) -> GamePhase {
        if self.is_complete() {
            GamePhase::Complete
        } else {
            GamePhase::InProgress
        }
    }

    /// Returns the card to answer next together with freshly sampled choices.
    ///
    /// Repeated calls return the same card; the distractors may differ.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::NoActiveGame`] if the game is complete or the
    /// current card is missing from `catalog`, and
    /// [`GameError::InsufficientChoices`] if choices cannot be built.
    #[instrument(skip(self, catalog, rng), fields(index = self.current_index, total = self.cards.len()))]
    pub fn current<'c, R>(
        &self,
        catalog: &'c Catalog,
        rng: &mut R,
    ) -> Result<CurrentCard<'c>, GameError>
    where
        R: Rng + ?Sized,
    {
        if self.is_complete() {
            debug!("No current card, game is complete");
            return Err(GameError::NoActiveGame);
        }

        let card = self.current_card(catalog)?;
        let choices = sample_choices(catalog, card, rng)?;

        Ok(CurrentCard {
            card,
            position: self.current_index,
            total: self.cards.len(),
            choices,
        })
    }

    /// Answers the current card and advances to the next one.
    ///
    /// The answer is compared to the card's answer by exact string
    /// equality. The position advances whether or not the answer is
    /// correct, so calling this twice answers two cards.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::AlreadyComplete`] once every card is answered
    /// and [`GameError::NoActiveGame`] if the current card is missing from
    /// `catalog`. The session is left untouched on error.
    #[instrument(skip(self, answer, catalog), fields(index = self.current_index, total = self.cards.len()))]
    pub fn submit(&mut self, answer: &str, catalog: &Catalog) -> Result<AnswerOutcome, GameError> {
        if self.is_complete() {
            warn!("Answer submitted after the last card");
            return Err(GameError::AlreadyComplete);
        }

        let card = self.current_card(catalog)?;
        let is_correct = answer == card.correct_answer().as_str();

        let next = Self {
            cards: self.cards.clone(),
            current_index: self.current_index + 1,
            score: self.score + usize::from(is_correct),
        };

        #[cfg(debug_assertions)]
        next.check_invariants()?;

        *self = next;

        info!(
            card_id = %card.id(),
            is_correct,
            score = self.score,
            "Answer recorded"
        );

        Ok(AnswerOutcome {
            is_correct,
            correct_answer: card.correct_answer().clone(),
            is_complete: self.is_complete(),
        })
    }

    /// Final score of a finished game.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::GameNotComplete`] while cards remain.
    #[instrument(skip(self), fields(index = self.current_index, total = self.cards.len()))]
    pub fn results(&self) -> Result<GameResults, GameError> {
        if !self.is_complete() {
            return Err(GameError::GameNotComplete);
        }

        let total = self.cards.len();
        let percentage = (self.score as f64 * 1000.0 / total as f64).round() / 10.0;

        info!(score = self.score, total, percentage, "Game results");
        Ok(GameResults {
            score: self.score,
            total,
            percentage,
        })
    }

    /// Checks the structural invariants of the session.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::InvariantViolation`] describing every broken rule.
    pub fn check_invariants(&self) -> Result<(), GameError> {
        let mut violations = Vec::new();

        if self.cards.len() < MIN_GAME_CARDS {
            violations.push(format!(
                "game has {} cards, minimum is {}",
                self.cards.len(),
                MIN_GAME_CARDS
            ));
        }
        if self.current_index > self.cards.len() {
            violations.push(format!(
                "current index {} past last card {}",
                self.current_index,
                self.cards.len()
            ));
        }
        if self.score > self.current_index {
            violations.push(format!(
                "score {} exceeds answered cards {}",
                self.score, self.current_index
            ));
        }
        let mut seen = HashSet::with_capacity(self.cards.len());
        if let Some(repeated) = self.cards.iter().find(|id| !seen.insert(**id)) {
            violations.push(format!("card {} selected twice", repeated));
        }

        if violations.is_empty() {
            Ok(())
        } else {
            warn!(?violations, "Session invariants violated");
            Err(GameError::InvariantViolation(violations.join("; ")))
        }
    }

    fn current_card<'c>(&self, catalog: &'c Catalog) -> Result<&'c Card, GameError> {
        let id = self.cards[self.current_index];
        catalog.get(id).ok_or_else(|| {
            warn!(card_id = %id, "Session references a card missing from the catalog");
            GameError::NoActiveGame
        })
    }
}

// ─────────────────────────────────────────────────────────────
//  Transition outputs
// ─────────────────────────────────────────────────────────────

/// The card to answer next, with its answer choices.
#[derive(Debug, Clone)]
pub struct CurrentCard<'c> {
    card: &'c Card,
    position: usize,
    total: usize,
    choices: AnswerChoices,
}

impl<'c> CurrentCard<'c> {
    /// The catalog card.
    pub fn card(&self) -> &'c Card {
        self.card
    }

    /// Zero-based position of the card in the game.
    pub fn position(&self) -> usize {
        self.position
    }

    /// Number of cards in the game.
    pub fn total(&self) -> usize {
        self.total
    }

    /// Sorted answer choices.
    pub fn choices(&self) -> &AnswerChoices {
        &self.choices
    }

    /// Consumes self, returning the choices.
    pub fn into_choices(self) -> AnswerChoices {
        self.choices
    }
}

/// Outcome of answering one card.
#[derive(Debug, Clone, PartialEq, Eq, Getters)]
pub struct AnswerOutcome {
    /// Whether the submitted answer was right.
    is_correct: bool,
    /// The right answer, returned regardless of correctness.
    correct_answer: String,
    /// Whether that was the last card.
    is_complete: bool,
}

/// Final score of a game.
#[derive(Debug, Clone, PartialEq, Getters)]
pub struct GameResults {
    /// Correct answers.
    score: usize,
    /// Cards played.
    total: usize,
    /// `100 * score / total`, rounded to one decimal.
    percentage: f64,
}
