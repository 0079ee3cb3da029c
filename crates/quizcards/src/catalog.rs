//! The immutable card catalog.

use std::collections::{BTreeSet, HashMap};
use std::ops::RangeInclusive;

use tracing::{debug, info, instrument, warn};

use crate::{Card, CardId, CatalogError};

/// Smallest number of cards a game may have.
pub const MIN_GAME_CARDS: usize = 5;

/// Number of answer choices shown for each card.
pub const CHOICES_PER_CARD: usize = 5;

/// Smallest catalog able to host a minimum-size game (games use at most half).
pub const MIN_CATALOG_CARDS: usize = MIN_GAME_CARDS * 2;

/// Ordered, validated set of every card of the deployment.
///
/// Built once at startup and read-only afterwards, so it can be shared
/// across requests behind an `Arc` without locking.
#[derive(Debug, Clone)]
pub struct Catalog {
    cards: Vec<Card>,
    index: HashMap<CardId, usize>,
}

impl Catalog {
    /// Validates `cards` and builds the catalog.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::DuplicateCardId`] when two cards share an id
    /// and [`CatalogError::CatalogTooSmall`] when fewer than
    /// [`MIN_CATALOG_CARDS`] cards are given.
    #[instrument(skip(cards), fields(card_count = cards.len()))]
    pub fn new(cards: Vec<Card>) -> Result<Self, CatalogError> {
        let mut index = HashMap::with_capacity(cards.len());
        for (position, card) in cards.iter().enumerate() {
            if index.insert(*card.id(), position).is_some() {
                warn!(card_id = %card.id(), "Duplicate card id in catalog");
                return Err(CatalogError::DuplicateCardId { id: *card.id() });
            }
        }

        if cards.len() < MIN_CATALOG_CARDS {
            warn!(found = cards.len(), required = MIN_CATALOG_CARDS, "Catalog too small");
            return Err(CatalogError::CatalogTooSmall {
                found: cards.len(),
                required: MIN_CATALOG_CARDS,
            });
        }

        let catalog = Self { cards, index };
        let distinct = catalog.distinct_answers().len();
        if distinct < CHOICES_PER_CARD {
            warn!(
                distinct,
                required = CHOICES_PER_CARD,
                "Catalog has too few distinct answers, choices cannot be built"
            );
        }

        info!(cards = catalog.len(), distinct_answers = distinct, "Catalog built");
        Ok(catalog)
    }

    /// Number of cards.
    pub fn len(&self) -> usize {
        self.cards.len()
    }

    /// Returns true if the catalog holds no card.
    ///
    /// A validated catalog is never empty.
    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    /// All cards in load order.
    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    /// Looks up a card by id.
    pub fn get(&self, id: CardId) -> Option<&Card> {
        let card = self.index.get(&id).map(|&position| &self.cards[position]);
        if card.is_none() {
            debug!(card_id = %id, "Card not in catalog");
        }
        card
    }

    /// Returns true if a card with `id` exists.
    pub fn contains(&self, id: CardId) -> bool {
        self.index.contains_key(&id)
    }

    /// Largest allowed game: half the catalog, rounded down.
    pub fn max_game_size(&self) -> usize {
        self.cards.len() / 2
    }

    /// Allowed game sizes.
    pub fn game_size_range(&self) -> RangeInclusive<usize> {
        MIN_GAME_CARDS..=self.max_game_size()
    }

    /// Every distinct answer string, sorted.
    pub fn distinct_answers(&self) -> BTreeSet<&str> {
        self.cards
            .iter()
            .map(|card| card.correct_answer().as_str())
            .collect()
    }
}
