//! Deck generation, shuffling and the opening deal.

use rand::Rng;

use crate::domain::cards_logic::{lowest_trump, sort_hand};
use crate::domain::rules::{DECK_SIZE, HAND_SIZE, PLAYERS};
use crate::domain::{Card, Rank, Suit};

/// Generate the 36-card short deck in fixed order (suit-major, ascending rank).
pub fn generate_deck() -> Vec<Card> {
    let mut deck = Vec::with_capacity(DECK_SIZE);
    for suit in Suit::ALL {
        for rank in Rank::ALL {
            deck.push(Card { suit, rank });
        }
    }
    deck
}

/// Fisher-Yates shuffle driven by the caller's RNG.
pub fn shuffle<R: Rng + ?Sized>(deck: &mut [Card], rng: &mut R) {
    for i in (1..deck.len()).rev() {
        let j = rng.random_range(0..=i);
        deck.swap(i, j);
    }
}

/// Result of the opening deal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpeningDeal {
    /// Remaining draw pile; the top is the end of the vec.
    pub deck: Vec<Card>,
    /// Hands in join order, already sorted.
    pub hands: [Vec<Card>; PLAYERS],
    /// Card revealed beneath the deck; its suit is trump.
    pub trump_card: Card,
    /// Seat of the first attacker.
    pub first_attacker: usize,
}

/// Deal an already shuffled deck: six cards to each seat alternately, then
/// reveal the trump indicator and pick the first attacker.
///
/// The first attacker holds the lowest trump across both hands. If nobody
/// holds a trump the seat is chosen uniformly with `rng`.
pub fn deal_opening<R: Rng + ?Sized>(mut deck: Vec<Card>, rng: &mut R) -> Option<OpeningDeal> {
    if deck.len() < PLAYERS * HAND_SIZE + 1 {
        return None;
    }

    let mut hands: [Vec<Card>; PLAYERS] = Default::default();
    for _ in 0..HAND_SIZE {
        for hand in hands.iter_mut() {
            hand.push(deck.pop()?);
        }
    }
    let trump_card = deck.pop()?;
    let trump = trump_card.suit;

    let mut best: Option<(usize, Card)> = None;
    for (seat, hand) in hands.iter().enumerate() {
        if let Some(low) = lowest_trump(hand, trump) {
            if best.map_or(true, |(_, b)| low.rank < b.rank) {
                best = Some((seat, low));
            }
        }
    }
    let first_attacker = match best {
        Some((seat, _)) => seat,
        None => rng.random_range(0..PLAYERS),
    };

    for hand in hands.iter_mut() {
        sort_hand(hand, trump);
    }

    Some(OpeningDeal {
        deck,
        hands,
        trump_card,
        first_attacker,
    })
}
