use std::collections::HashSet;
use std::fmt;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::domain::cards_logic::can_beat;
use crate::domain::rules::{DECK_SIZE, PLAYERS};
use crate::domain::{Card, Suit};
use crate::errors::domain::{DomainError, ValidationKind};

/// Opaque player identity supplied by the transport layer.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(String);

impl PlayerId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for PlayerId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for PlayerId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Registry-allocated match identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MatchId(String);

impl MatchId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for MatchId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl fmt::Display for MatchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Match lifecycle. `Finished` is terminal.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// Created, waiting for the second player.
    Waiting,
    /// Cards dealt, moves accepted.
    Playing,
    /// Win condition met, draw, or abandoned.
    Finished,
}

/// One attack card and the card covering it, if any.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TablePair {
    pub attack: Card,
    pub defense: Option<Card>,
}

impl TablePair {
    pub fn open(attack: Card) -> Self {
        Self {
            attack,
            defense: None,
        }
    }

    pub fn is_defended(&self) -> bool {
        self.defense.is_some()
    }

    pub fn cards(&self) -> impl Iterator<Item = Card> {
        std::iter::once(self.attack).chain(self.defense)
    }
}

/// How a finished match ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MatchOutcome {
    /// Emptied their hand while the opponent still held cards.
    Winner { player_id: PlayerId },
    /// Both hands emptied at the same time after the deck ran out.
    Draw,
    /// The opponent left mid-game.
    Abandoned { winner: PlayerId },
}

impl MatchOutcome {
    pub fn winner(&self) -> Option<&PlayerId> {
        match self {
            MatchOutcome::Winner { player_id } => Some(player_id),
            MatchOutcome::Abandoned { winner } => Some(winner),
            MatchOutcome::Draw => None,
        }
    }
}

/// Most recent state change, shared verbatim with both players.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LastAction {
    Joined { player_id: PlayerId },
    Dealt { trump_card: Card, attacker: PlayerId },
    Attacked { player_id: PlayerId, card: Card },
    Defended { player_id: PlayerId, attack: Card, defense: Card },
    ThrewIn { player_id: PlayerId, card: Card },
    Passed { player_id: PlayerId },
    Took { player_id: PlayerId, count: usize },
    Left { player_id: PlayerId },
}

impl fmt::Display for LastAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LastAction::Joined { player_id } => write!(f, "{player_id} joined"),
            LastAction::Dealt {
                trump_card,
                attacker,
            } => write!(f, "cards dealt, trump {trump_card}, {attacker} attacks"),
            LastAction::Attacked { player_id, card } => write!(f, "{player_id} attacked with {card}"),
            LastAction::Defended {
                player_id,
                attack,
                defense,
            } => write!(f, "{player_id} beat {attack} with {defense}"),
            LastAction::ThrewIn { player_id, card } => write!(f, "{player_id} threw in {card}"),
            LastAction::Passed { player_id } => write!(f, "{player_id} called beat"),
            LastAction::Took { player_id, count } => write!(f, "{player_id} took {count} card(s)"),
            LastAction::Left { player_id } => write!(f, "{player_id} left"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Seat {
    pub(crate) id: PlayerId,
    pub(crate) hand: Vec<Card>,
}

/// One two-player match: deck, hands, table, roles and phase.
///
/// All move operations validate fully before touching any field, so a
/// rejected move leaves the match exactly as it was. The match does no
/// locking of its own; callers serialize access per match.
#[derive(Debug, Clone, PartialEq)]
pub struct Match {
    pub(crate) id: MatchId,
    /// Seats in join order.
    pub(crate) seats: Vec<Seat>,
    /// Draw pile; the top is the end of the vec.
    pub(crate) deck: Vec<Card>,
    /// Trump indicator while it is still held aside.
    pub(crate) trump_card: Option<Card>,
    pub(crate) trump: Option<Suit>,
    pub(crate) table: Vec<TablePair>,
    /// Beaten cards and the discarded trump indicator.
    pub(crate) discard: Vec<Card>,
    pub(crate) attacker: Option<PlayerId>,
    pub(crate) defender: Option<PlayerId>,
    pub(crate) phase: Phase,
    pub(crate) outcome: Option<MatchOutcome>,
    pub(crate) throw_in_allowed: bool,
    pub(crate) last_action: Option<LastAction>,
    /// Deal order to use instead of a shuffle, top card first.
    pub(crate) preset_deck: Option<Vec<Card>>,
    pub(crate) rng: ChaCha8Rng,
}

impl Match {
    /// Create an empty match seeded from OS entropy.
    pub fn new(id: MatchId) -> Self {
        Self::with_seed(id, rand::random())
    }

    /// Create an empty match with a fixed RNG seed.
    pub fn with_seed(id: MatchId, seed: u64) -> Self {
        Self {
            id,
            seats: Vec::with_capacity(PLAYERS),
            deck: Vec::new(),
            trump_card: None,
            trump: None,
            table: Vec::new(),
            discard: Vec::new(),
            attacker: None,
            defender: None,
            phase: Phase::Waiting,
            outcome: None,
            throw_in_allowed: false,
            last_action: None,
            preset_deck: None,
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Create an empty match that deals `deck` in the given order
    /// (first element is dealt first) instead of shuffling.
    ///
    /// `deck` must be a permutation of the full 36-card deck.
    pub fn with_deck_order(id: MatchId, seed: u64, deck: Vec<Card>) -> Result<Self, DomainError> {
        let unique: HashSet<Card> = deck.iter().copied().collect();
        if deck.len() != DECK_SIZE || unique.len() != DECK_SIZE {
            return Err(DomainError::validation_other(format!(
                "Preset deck must hold {DECK_SIZE} distinct cards, got {} ({} distinct)",
                deck.len(),
                unique.len()
            )));
        }
        let mut m = Self::with_seed(id, seed);
        let mut top_last = deck;
        top_last.reverse();
        m.preset_deck = Some(top_last);
        Ok(m)
    }

    pub fn id(&self) -> &MatchId {
        &self.id
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Players in join order.
    pub fn players(&self) -> impl Iterator<Item = &PlayerId> {
        self.seats.iter().map(|s| &s.id)
    }

    pub fn player_count(&self) -> usize {
        self.seats.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seats.is_empty()
    }

    pub fn is_member(&self, player: &PlayerId) -> bool {
        self.seat_of(player).is_some()
    }

    pub fn hand(&self, player: &PlayerId) -> Option<&[Card]> {
        self.seat_of(player).map(|i| self.seats[i].hand.as_slice())
    }

    pub fn opponent_of(&self, player: &PlayerId) -> Option<&PlayerId> {
        self.seats.iter().map(|s| &s.id).find(|id| *id != player)
    }

    pub fn deck_len(&self) -> usize {
        self.deck.len()
    }

    pub fn trump(&self) -> Option<Suit> {
        self.trump
    }

    pub fn trump_card(&self) -> Option<Card> {
        self.trump_card
    }

    pub fn table(&self) -> &[TablePair] {
        &self.table
    }

    pub fn discard_len(&self) -> usize {
        self.discard.len()
    }

    pub fn attacker(&self) -> Option<&PlayerId> {
        self.attacker.as_ref()
    }

    pub fn defender(&self) -> Option<&PlayerId> {
        self.defender.as_ref()
    }

    pub fn outcome(&self) -> Option<&MatchOutcome> {
        self.outcome.as_ref()
    }

    pub fn winner(&self) -> Option<&PlayerId> {
        self.outcome.as_ref().and_then(MatchOutcome::winner)
    }

    pub fn throw_in_allowed(&self) -> bool {
        self.throw_in_allowed
    }

    pub fn last_action(&self) -> Option<&LastAction> {
        self.last_action.as_ref()
    }

    /// Every card on the table, attack and defense sides combined.
    pub fn table_cards(&self) -> Vec<Card> {
        self.table.iter().flat_map(TablePair::cards).collect()
    }

    pub fn undefended_count(&self) -> usize {
        self.table.iter().filter(|p| !p.is_defended()).count()
    }

    pub fn all_defended(&self) -> bool {
        self.table.iter().all(TablePair::is_defended)
    }

    pub(crate) fn seat_of(&self, player: &PlayerId) -> Option<usize> {
        self.seats.iter().position(|s| &s.id == player)
    }

    /// Every card the match currently accounts for, in no particular order.
    fn all_cards(&self) -> Vec<Card> {
        let mut cards = Vec::with_capacity(DECK_SIZE);
        cards.extend(self.deck.iter().copied());
        cards.extend(self.trump_card);
        for seat in &self.seats {
            cards.extend(seat.hand.iter().copied());
        }
        cards.extend(self.table_cards());
        cards.extend(self.discard.iter().copied());
        cards
    }

    /// Conservation and uniqueness checks for a match in play.
    ///
    /// Returns a description of the first violation found.
    pub fn check_invariants(&self) -> Result<(), String> {
        if self.phase != Phase::Playing {
            return Ok(());
        }
        let cards = self.all_cards();
        if cards.len() != DECK_SIZE {
            return Err(format!(
                "card count {} != {DECK_SIZE} (deck {}, indicator {}, table {}, discard {})",
                cards.len(),
                self.deck.len(),
                usize::from(self.trump_card.is_some()),
                self.table_cards().len(),
                self.discard.len()
            ));
        }
        let mut seen = HashSet::with_capacity(DECK_SIZE);
        for card in cards {
            if !seen.insert(card) {
                return Err(format!("duplicate card {card}"));
            }
        }
        if self.seats.len() != PLAYERS {
            return Err(format!("{} seats in a match in play", self.seats.len()));
        }
        let trump = self.trump.ok_or("trump unset in a match in play")?;
        for pair in &self.table {
            if let Some(defense) = pair.defense {
                if !can_beat(pair.attack, defense, trump) {
                    return Err(format!("{defense} does not beat {}", pair.attack));
                }
            }
        }
        match (&self.attacker, &self.defender) {
            (Some(a), Some(d)) if a != d && self.is_member(a) && self.is_member(d) => Ok(()),
            _ => Err("attacker/defender must be the two distinct members".to_string()),
        }
    }

    /// Panics on a broken invariant in debug builds. A violation here is a
    /// bug in a move operation, never a user error.
    pub(crate) fn assert_invariants(&self) {
        if cfg!(debug_assertions) {
            if let Err(err) = self.check_invariants() {
                panic!("Invariant violated in match {}: {err}", self.id);
            }
        }
    }

    pub(crate) fn require_phase(&self, phase: Phase) -> Result<(), DomainError> {
        if self.phase != phase {
            return Err(DomainError::validation(
                ValidationKind::PhaseMismatch,
                format!("Match {} is {:?}, expected {:?}", self.id, self.phase, phase),
            ));
        }
        Ok(())
    }

    pub(crate) fn require_seat(&self, player: &PlayerId) -> Result<usize, DomainError> {
        self.seat_of(player).ok_or_else(|| {
            DomainError::validation(
                ValidationKind::NotAMember,
                format!("{player} is not in match {}", self.id),
            )
        })
    }

    pub(crate) fn require_trump(&self, ctx: &'static str) -> Result<Suit, DomainError> {
        self.trump.ok_or_else(|| {
            DomainError::validation_other(format!("Invariant violated: trump must be set ({ctx})"))
        })
    }
}
