//! Card game logic: beat legality, throw-in legality, hand ordering

use super::cards_types::{Card, Suit};

/// Whether `defense` covers `attack` under the given trump suit.
///
/// Same suit: higher rank wins (trump or not). A trump covers any non-trump.
/// Everything else, including a non-trump against a trump attack, fails.
pub fn can_beat(attack: Card, defense: Card, trump: Suit) -> bool {
    let attack_trump = attack.is_trump(trump);
    let defense_trump = defense.is_trump(trump);

    if attack.suit == defense.suit {
        return defense.rank > attack.rank;
    }
    defense_trump && !attack_trump
}

/// A card may be thrown in when some card already on the table shares its rank.
pub fn can_throw_in(card: Card, table_cards: &[Card]) -> bool {
    table_cards.iter().any(|c| c.rank == card.rank)
}

/// Sort a hand for display: non-trump suits first grouped by suit ordinal,
/// trump suit last, ascending rank within each group. Stable.
pub fn sort_hand(hand: &mut [Card], trump: Suit) {
    hand.sort_by_key(|c| (c.is_trump(trump), c.suit.ordinal(), c.rank));
}

/// Lowest trump in `hand`, if any.
pub fn lowest_trump(hand: &[Card], trump: Suit) -> Option<Card> {
    hand.iter()
        .copied()
        .filter(|c| c.is_trump(trump))
        .min_by_key(|c| c.rank)
}
