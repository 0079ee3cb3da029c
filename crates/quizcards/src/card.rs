//! Card domain types.

use derive_getters::Getters;
use derive_new::new;
use serde::{Deserialize, Serialize};

/// Opaque identifier of a card, unique within a catalog.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    derive_more::Display,
    derive_more::From,
)]
#[serde(transparent)]
pub struct CardId(u64);

impl CardId {
    /// Wraps a raw identifier.
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }
}

/// One quiz unit: an image and the answer it depicts.
///
/// Cards are immutable once the catalog is loaded. Two cards may share
/// the same `correct_answer`, never the same `id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters, new)]
pub struct Card {
    /// Catalog-unique identifier.
    id: CardId,
    /// Locator of the card image, relative to the image store.
    #[serde(alias = "image_filename")]
    image_ref: String,
    /// The answer the player must pick.
    correct_answer: String,
}
