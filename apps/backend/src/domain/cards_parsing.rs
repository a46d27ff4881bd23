//! Card parsing from string representations (e.g., "7h", "10s", "Ad")

use std::str::FromStr;

use super::cards_types::{Card, Rank, Suit};
use crate::errors::domain::{DomainError, ValidationKind};

fn parse_error(s: &str) -> DomainError {
    DomainError::validation(ValidationKind::ParseCard, format!("Parse card: {s}"))
}

pub(crate) fn rank_token(rank: Rank) -> &'static str {
    match rank {
        Rank::Six => "6",
        Rank::Seven => "7",
        Rank::Eight => "8",
        Rank::Nine => "9",
        Rank::Ten => "10",
        Rank::Jack => "J",
        Rank::Queen => "Q",
        Rank::King => "K",
        Rank::Ace => "A",
    }
}

pub(crate) fn suit_char(suit: Suit) -> char {
    match suit {
        Suit::Clubs => 'c',
        Suit::Diamonds => 'd',
        Suit::Hearts => 'h',
        Suit::Spades => 's',
    }
}

fn parse_rank(token: &str) -> Option<Rank> {
    let rank = match token {
        "6" => Rank::Six,
        "7" => Rank::Seven,
        "8" => Rank::Eight,
        "9" => Rank::Nine,
        "10" | "T" => Rank::Ten,
        "J" => Rank::Jack,
        "Q" => Rank::Queen,
        "K" => Rank::King,
        "A" => Rank::Ace,
        _ => return None,
    };
    Some(rank)
}

fn parse_suit(ch: char) -> Option<Suit> {
    let suit = match ch {
        'c' | 'C' => Suit::Clubs,
        'd' | 'D' => Suit::Diamonds,
        'h' | 'H' => Suit::Hearts,
        's' | 'S' => Suit::Spades,
        _ => return None,
    };
    Some(suit)
}

impl FromStr for Suit {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.chars();
        match (chars.next(), chars.next()) {
            (Some(ch), None) => parse_suit(ch).ok_or_else(|| parse_error(s)),
            _ => Err(parse_error(s)),
        }
    }
}

impl FromStr for Card {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if !(2..=3).contains(&s.len()) || !s.is_ascii() {
            return Err(parse_error(s));
        }
        let (rank_part, suit_part) = s.split_at(s.len() - 1);
        let rank = parse_rank(rank_part).ok_or_else(|| parse_error(s))?;
        let suit = suit_part.parse::<Suit>().map_err(|_| parse_error(s))?;
        Ok(Card { suit, rank })
    }
}

impl std::fmt::Display for Card {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}", rank_token(self.rank), suit_char(self.suit))
    }
}

impl std::fmt::Display for Suit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", suit_char(*self))
    }
}

/// Non-panicking helper to parse card tokens (e.g., "7h", "Ks") into Card instances.
/// Returns Result<Vec<Card>, DomainError> if any token is invalid.
pub fn try_parse_cards<I, S>(tokens: I) -> Result<Vec<Card>, DomainError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    tokens
        .into_iter()
        .map(|s| s.as_ref().parse::<Card>())
        .collect()
}
