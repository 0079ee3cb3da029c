//! Tests for answer choice sampling.

use std::collections::HashSet;

use quizcards::{CHOICES_PER_CARD, Card, CardId, Catalog, GameError, sample_choices};
use rand::SeedableRng;
use rand::rngs::StdRng;

fn card(id: u64, answer: &str) -> Card {
    Card::new(CardId::new(id), format!("card{id}.png"), answer.to_string())
}

fn animal_catalog() -> Catalog {
    let answers = [
        "Zebra", "Cat", "Dog", "Emu", "Yak", "Bat", "Owl", "Fox", "Gnu", "Ant", "Hen", "Elk",
    ];
    let cards = answers
        .iter()
        .enumerate()
        .map(|(i, answer)| card(i as u64 + 1, answer))
        .collect();
    Catalog::new(cards).expect("Valid catalog")
}

#[test]
fn test_choices_contain_correct_answer_once_and_are_sorted() {
    let catalog = animal_catalog();
    let mut rng = StdRng::seed_from_u64(7);

    for target in catalog.cards() {
        for _ in 0..20 {
            let choices = sample_choices(&catalog, target, &mut rng).expect("Enough answers");
            let list = choices.as_slice();

            assert_eq!(list.len(), CHOICES_PER_CARD);
            let hits = list
                .iter()
                .filter(|c| c.as_str() == target.correct_answer().as_str())
                .count();
            assert_eq!(hits, 1, "Correct answer must appear exactly once");

            let distinct: HashSet<&String> = list.iter().collect();
            assert_eq!(distinct.len(), CHOICES_PER_CARD, "Choices must be distinct");

            let mut sorted = list.to_vec();
            sorted.sort();
            assert_eq!(list, sorted.as_slice(), "Choices must be sorted");
        }
    }
}

#[test]
fn test_sorting_is_case_sensitive() {
    let cards = vec![
        card(1, "apple"),
        card(2, "Banana"),
        card(3, "cherry"),
        card(4, "Date"),
        card(5, "elder"),
        card(6, "apple"),
        card(7, "Banana"),
        card(8, "cherry"),
        card(9, "Date"),
        card(10, "elder"),
    ];
    let catalog = Catalog::new(cards).expect("Valid catalog");
    let mut rng = StdRng::seed_from_u64(1);

    let choices = sample_choices(&catalog, &catalog.cards()[0], &mut rng).expect("Enough answers");
    assert_eq!(
        choices.into_inner(),
        vec!["Banana", "Date", "apple", "cherry", "elder"]
    );
}

#[test]
fn test_duplicate_answers_never_produce_two_correct_choices() {
    // Half the catalog shares the target's answer.
    let mut cards: Vec<Card> = (1..=5).map(|i| card(i, "Same")).collect();
    cards.extend((6..=10).map(|i| card(i, &format!("Other {i}"))));
    let catalog = Catalog::new(cards).expect("Valid catalog");
    let mut rng = StdRng::seed_from_u64(3);

    for _ in 0..50 {
        let choices = sample_choices(&catalog, &catalog.cards()[0], &mut rng).expect("Enough answers");
        let same = choices.as_slice().iter().filter(|c| *c == "Same").count();
        assert_eq!(same, 1);
    }
}

#[test]
fn test_insufficient_distinct_answers_fails_fast() {
    // Only three answers differ from "Same".
    let mut cards: Vec<Card> = (1..=7).map(|i| card(i, "Same")).collect();
    cards.push(card(8, "A"));
    cards.push(card(9, "B"));
    cards.push(card(10, "C"));
    let catalog = Catalog::new(cards).expect("Valid catalog");
    let mut rng = StdRng::seed_from_u64(5);

    let result = sample_choices(&catalog, &catalog.cards()[0], &mut rng);
    assert_eq!(
        result.unwrap_err(),
        GameError::InsufficientChoices {
            available: 3,
            required: 4
        }
    );
}

#[test]
fn test_distractors_vary_between_calls() {
    let catalog = animal_catalog();
    let target = &catalog.cards()[0];
    let mut rng = StdRng::seed_from_u64(11);

    let seen: HashSet<Vec<String>> = (0..30)
        .map(|_| {
            sample_choices(&catalog, target, &mut rng)
                .expect("Enough answers")
                .into_inner()
        })
        .collect();
    assert!(seen.len() > 1, "Distractors should be resampled");
}
