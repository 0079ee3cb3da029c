//! Tests for the game session state machine.

use std::collections::HashSet;

use quizcards::{Card, CardId, Catalog, GameError, GamePhase, GameSession};
use rand::SeedableRng;
use rand::rngs::StdRng;

fn catalog(count: u64) -> Catalog {
    let cards = (1..=count)
        .map(|i| Card::new(CardId::new(i), format!("card{i}.png"), format!("Answer {i}")))
        .collect();
    Catalog::new(cards).expect("Valid catalog")
}

fn current_answer(session: &GameSession, catalog: &Catalog) -> String {
    let id = session.cards()[session.current_index()];
    catalog.get(id).expect("Card exists").correct_answer().clone()
}

#[test]
fn test_start_accepts_every_valid_size() {
    let mut rng = StdRng::seed_from_u64(1);
    for size in [10, 11, 20, 31] {
        let catalog = catalog(size);
        for num_cards in catalog.game_size_range() {
            let session = GameSession::start(num_cards, &catalog, &mut rng).expect("Valid size");

            assert_eq!(session.num_cards(), num_cards);
            assert_eq!(session.current_index(), 0);
            assert_eq!(session.score(), 0);
            let distinct: HashSet<_> = session.cards().iter().collect();
            assert_eq!(distinct.len(), num_cards, "Card ids must not repeat");
            assert!(session.cards().iter().all(|id| catalog.contains(*id)));
        }
    }
}

#[test]
fn test_start_rejects_sizes_outside_range() {
    let catalog = catalog(10);
    let mut rng = StdRng::seed_from_u64(2);

    for num_cards in [0, 1, 4, 6, 10, 100] {
        let result = GameSession::start(num_cards, &catalog, &mut rng);
        assert_eq!(
            result.unwrap_err(),
            GameError::InvalidCardCount {
                requested: num_cards,
                min: 5,
                max: 5
            }
        );
    }
}

#[test]
fn test_current_is_stable_until_submit() {
    let catalog = catalog(20);
    let mut rng = StdRng::seed_from_u64(3);
    let session = GameSession::start(5, &catalog, &mut rng).expect("Valid size");

    let first = session.current(&catalog, &mut rng).expect("Active game");
    let again = session.current(&catalog, &mut rng).expect("Active game");
    assert_eq!(first.card().id(), again.card().id());
    assert_eq!(first.position(), 0);
    assert_eq!(first.total(), 5);
    assert!(first.choices().contains(first.card().correct_answer()));
}

#[test]
fn test_correct_answer_scores_and_advances() {
    let catalog = catalog(10);
    let mut rng = StdRng::seed_from_u64(4);
    let mut session = GameSession::start(5, &catalog, &mut rng).expect("Valid size");

    let answer = current_answer(&session, &catalog);
    let outcome = session.submit(&answer, &catalog).expect("Active game");

    assert!(*outcome.is_correct());
    assert_eq!(outcome.correct_answer(), &answer);
    assert!(!*outcome.is_complete());
    assert_eq!(session.score(), 1);
    assert_eq!(session.current_index(), 1);
}

#[test]
fn test_wrong_answer_advances_without_scoring() {
    let catalog = catalog(10);
    let mut rng = StdRng::seed_from_u64(5);
    let mut session = GameSession::start(5, &catalog, &mut rng).expect("Valid size");

    let answer = current_answer(&session, &catalog);
    let outcome = session.submit("definitely wrong", &catalog).expect("Active game");

    assert!(!*outcome.is_correct());
    assert_eq!(outcome.correct_answer(), &answer);
    assert_eq!(session.score(), 0);
    assert_eq!(session.current_index(), 1);
}

#[test]
fn test_answer_comparison_is_exact() {
    let catalog = catalog(10);
    let mut rng = StdRng::seed_from_u64(6);
    let mut session = GameSession::start(5, &catalog, &mut rng).expect("Valid size");

    let padded = format!(" {} ", current_answer(&session, &catalog));
    assert!(!*session.submit(&padded, &catalog).expect("Active game").is_correct());

    let shouted = current_answer(&session, &catalog).to_uppercase();
    assert!(!*session.submit(&shouted, &catalog).expect("Active game").is_correct());
    assert_eq!(session.score(), 0);
}

#[test]
fn test_three_right_two_wrong_scores_sixty_percent() {
    let catalog = catalog(10);
    let mut rng = StdRng::seed_from_u64(7);
    let mut session = GameSession::start(5, &catalog, &mut rng).expect("Valid size");
    assert_eq!(session.num_cards(), 5);

    for turn in 0..5 {
        let answer = if turn < 3 {
            current_answer(&session, &catalog)
        } else {
            "wrong".to_string()
        };
        let outcome = session.submit(&answer, &catalog).expect("Active game");
        assert_eq!(*outcome.is_complete(), turn == 4);
    }

    let results = session.results().expect("Game complete");
    assert_eq!(*results.score(), 3);
    assert_eq!(*results.total(), 5);
    assert_eq!(*results.percentage(), 60.0);
}

#[test]
fn test_results_unavailable_before_completion() {
    let catalog = catalog(10);
    let mut rng = StdRng::seed_from_u64(8);
    let mut session = GameSession::start(5, &catalog, &mut rng).expect("Valid size");

    for _ in 0..4 {
        assert_eq!(session.results().unwrap_err(), GameError::GameNotComplete);
        session.submit("x", &catalog).expect("Active game");
    }
    assert_eq!(session.results().unwrap_err(), GameError::GameNotComplete);

    session.submit("x", &catalog).expect("Last card");
    assert!(session.results().is_ok());
}

#[test]
fn test_complete_game_rejects_submit_and_current() {
    let catalog = catalog(10);
    let mut rng = StdRng::seed_from_u64(9);
    let mut session = GameSession::start(5, &catalog, &mut rng).expect("Valid size");
    for _ in 0..5 {
        session.submit("x", &catalog).expect("Active game");
    }
    assert_eq!(session.phase(), GamePhase::Complete);

    let before = session.clone();
    assert_eq!(
        session.submit("x", &catalog).unwrap_err(),
        GameError::AlreadyComplete
    );
    assert_eq!(session, before, "Failed submit must not mutate the session");
    assert_eq!(
        session.current(&catalog, &mut rng).unwrap_err(),
        GameError::NoActiveGame
    );
}

#[test]
fn test_percentage_rounds_to_one_decimal() {
    let catalog = catalog(12);
    let mut rng = StdRng::seed_from_u64(10);
    let mut session = GameSession::start(6, &catalog, &mut rng).expect("Valid size");

    for turn in 0..6 {
        let answer = if turn < 4 {
            current_answer(&session, &catalog)
        } else {
            "wrong".to_string()
        };
        session.submit(&answer, &catalog).expect("Active game");
    }

    assert_eq!(*session.results().expect("Complete").percentage(), 66.7);
}

#[test]
fn test_phase_tracks_lifecycle() {
    let catalog = catalog(10);
    let mut rng = StdRng::seed_from_u64(11);

    assert_eq!(GamePhase::of(None), GamePhase::NotStarted);
    let mut session = GameSession::start(5, &catalog, &mut rng).expect("Valid size");
    assert_eq!(GamePhase::of(Some(&session)), GamePhase::InProgress);
    for _ in 0..5 {
        session.submit("x", &catalog).expect("Active game");
    }
    assert_eq!(GamePhase::of(Some(&session)), GamePhase::Complete);
}

#[test]
fn test_missing_card_is_no_active_game() {
    let small = catalog(10);
    let mut rng = StdRng::seed_from_u64(12);
    let mut session = GameSession::start(5, &small, &mut rng).expect("Valid size");

    let other = Catalog::new(
        (100..110)
            .map(|i| Card::new(CardId::new(i), format!("{i}.png"), format!("Other {i}")))
            .collect(),
    )
    .expect("Valid catalog");

    assert_eq!(
        session.current(&other, &mut rng).unwrap_err(),
        GameError::NoActiveGame
    );
    assert_eq!(
        session.submit("x", &other).unwrap_err(),
        GameError::NoActiveGame
    );
    assert_eq!(session.current_index(), 0);
}

#[test]
fn test_session_round_trips_through_json() {
    let catalog = catalog(10);
    let mut rng = StdRng::seed_from_u64(13);
    let mut session = GameSession::start(5, &catalog, &mut rng).expect("Valid size");
    session.submit("x", &catalog).expect("Active game");

    let json = serde_json::to_string(&session).expect("Serializable");
    let restored: GameSession = serde_json::from_str(&json).expect("Valid session");
    assert_eq!(restored, session);
}

#[test]
fn test_deserialization_rejects_broken_invariants() {
    let cases = [
        // score above answered cards
        r#"{"cards":[1,2,3,4,5],"current_index":1,"score":2}"#,
        // index past the end
        r#"{"cards":[1,2,3,4,5],"current_index":6,"score":0}"#,
        // repeated card
        r#"{"cards":[1,2,3,4,4],"current_index":0,"score":0}"#,
        // too few cards
        r#"{"cards":[1,2,3],"current_index":0,"score":0}"#,
    ];

    for json in cases {
        let result = serde_json::from_str::<GameSession>(json);
        assert!(result.is_err(), "Should reject {json}");
    }
}
