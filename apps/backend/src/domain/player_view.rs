//! Per-player views of a match.
//!
//! A view shows the requesting player their own hand face up and the
//! opponent's hand only as a count of face-down cards. Everything else on
//! the table is public.

use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;

use crate::domain::moves::LegalMoves;
use crate::domain::state::{LastAction, Match, MatchId, MatchOutcome, Phase, PlayerId, TablePair};
use crate::domain::{Card, Suit};

/// A card as one player sees it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardFace {
    Up(Card),
    Down,
}

impl Serialize for CardFace {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        match self {
            CardFace::Up(card) => map.serialize_entry("card", card)?,
            CardFace::Down => map.serialize_entry("hidden", &true)?,
        }
        map.end()
    }
}

/// The other player, with their hand hidden.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OpponentView {
    pub player_id: PlayerId,
    pub hand: Vec<CardFace>,
}

impl OpponentView {
    pub fn card_count(&self) -> usize {
        self.hand.len()
    }
}

/// Everything one player is allowed to see.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MatchView {
    pub match_id: MatchId,
    pub player_id: PlayerId,
    pub phase: Phase,
    pub hand: Vec<Card>,
    pub opponent: Option<OpponentView>,
    pub table: Vec<TablePair>,
    pub deck_count: usize,
    pub trump: Option<Suit>,
    /// The face-up indicator while it is still held aside.
    pub trump_card: Option<Card>,
    pub attacker: Option<PlayerId>,
    pub defender: Option<PlayerId>,
    pub winner: Option<PlayerId>,
    pub outcome: Option<MatchOutcome>,
    pub throw_in_allowed: bool,
    pub last_action: Option<LastAction>,
    pub legal_moves: LegalMoves,
}

impl MatchView {
    /// Build the view for `player`. `None` if they are not a member.
    pub fn for_player(m: &Match, player: &PlayerId) -> Option<Self> {
        let hand = m.hand(player)?.to_vec();
        let opponent = m.opponent_of(player).map(|opp| OpponentView {
            player_id: opp.clone(),
            hand: vec![CardFace::Down; m.hand(opp).map_or(0, <[Card]>::len)],
        });

        Some(Self {
            match_id: m.id().clone(),
            player_id: player.clone(),
            phase: m.phase(),
            hand,
            opponent,
            table: m.table().to_vec(),
            deck_count: m.deck_len(),
            trump: m.trump(),
            trump_card: m.trump_card(),
            attacker: m.attacker().cloned(),
            defender: m.defender().cloned(),
            winner: m.winner().cloned(),
            outcome: m.outcome().cloned(),
            throw_in_allowed: m.throw_in_allowed(),
            last_action: m.last_action().cloned(),
            legal_moves: m.legal_moves(player),
        })
    }

    pub fn is_my_attack(&self) -> bool {
        self.attacker.as_ref() == Some(&self.player_id)
    }

    pub fn is_my_defense(&self) -> bool {
        self.defender.as_ref() == Some(&self.player_id)
    }
}

/// Lobby listing entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MatchSummary {
    pub match_id: MatchId,
    pub phase: Phase,
    pub players: Vec<PlayerId>,
}

impl MatchSummary {
    pub fn of(m: &Match) -> Self {
        Self {
            match_id: m.id().clone(),
            phase: m.phase(),
            players: m.players().cloned().collect(),
        }
    }

    pub fn is_open(&self) -> bool {
        self.phase == Phase::Waiting && self.players.len() < crate::domain::rules::PLAYERS
    }
}
