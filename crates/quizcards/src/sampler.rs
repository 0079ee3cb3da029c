//! Answer choice sampling.
//!
//! Choices are the correct answer plus four distinct distractors drawn
//! uniformly without replacement, sorted by `str` ordering (case-sensitive,
//! byte-wise).

use std::collections::BTreeSet;

use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

use crate::{CHOICES_PER_CARD, Card, Catalog, GameError};

/// The sorted answer choices shown for one card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnswerChoices(Vec<String>);

impl AnswerChoices {
    /// Returns the choices in display order.
    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    /// Returns true if `answer` is one of the choices.
    pub fn contains(&self, answer: &str) -> bool {
        self.0.iter().any(|choice| choice == answer)
    }

    /// Consumes the choices, returning the underlying list.
    pub fn into_inner(self) -> Vec<String> {
        self.0
    }
}

/// Builds the answer choices for `card`.
///
/// The distractor pool is every answer of the catalog except the ones of
/// `card` itself (matched by id) and any string equal to the correct
/// answer, deduplicated. Four entries are drawn from it without
/// replacement.
///
/// # Errors
///
/// Returns [`GameError::InsufficientChoices`] when the pool holds fewer
/// than four strings.
#[instrument(skip(catalog, card, rng), fields(card_id = %card.id()))]
pub fn sample_choices<R>(
    catalog: &Catalog,
    card: &Card,
    rng: &mut R,
) -> Result<AnswerChoices, GameError>
where
    R: Rng + ?Sized,
{
    let correct = card.correct_answer().as_str();
    let required = CHOICES_PER_CARD - 1;

    let pool: Vec<&str> = catalog
        .cards()
        .iter()
        .filter(|other| other.id() != card.id())
        .map(|other| other.correct_answer().as_str())
        .filter(|answer| *answer != correct)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();

    if pool.len() < required {
        warn!(available = pool.len(), required, "Not enough distinct distractors");
        return Err(GameError::InsufficientChoices {
            available: pool.len(),
            required,
        });
    }

    let mut choices: Vec<String> = pool
        .choose_multiple(rng, required)
        .map(|answer| (*answer).to_owned())
        .collect();
    choices.push(correct.to_owned());
    choices.sort();

    debug!(?choices, "Sampled answer choices");
    Ok(AnswerChoices(choices))
}
