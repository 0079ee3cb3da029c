//! Quizcards - pure flashcard quiz logic
//!
//! A player is shown a sequence of image-backed cards and picks the
//! correct answer out of five alphabetically sorted choices.
//!
//! # Architecture
//!
//! - **Catalog**: immutable, validated list of cards loaded once per process
//! - **Sampler**: builds the five answer choices for a card
//! - **Session**: one player's game (card order, position, score)
//!
//! Nothing in this crate performs I/O. Sessions are plain serde values so
//! the boundary layer can carry them in a signed client-side token.
//!
//! # Example
//!
//! ```
//! use quizcards::{Card, CardId, Catalog, GameSession};
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let cards = (1..=10)
//!     .map(|i| Card::new(CardId::new(i), format!("card{i}.png"), format!("Answer {i}")))
//!     .collect();
//! let catalog = Catalog::new(cards)?;
//!
//! let mut rng = rand::thread_rng();
//! let mut session = GameSession::start(5, &catalog, &mut rng)?;
//! let current = session.current(&catalog, &mut rng)?;
//! let answer = current.card().correct_answer().clone();
//! let outcome = session.submit(&answer, &catalog)?;
//! assert!(*outcome.is_correct());
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod card;
mod catalog;
mod error;
mod sampler;
mod session;

pub use card::{Card, CardId};
pub use catalog::{CHOICES_PER_CARD, Catalog, MIN_CATALOG_CARDS, MIN_GAME_CARDS};
pub use error::{CatalogError, GameError};
pub use sampler::{AnswerChoices, sample_choices};
pub use session::{AnswerOutcome, CurrentCard, GamePhase, GameResults, GameSession};
