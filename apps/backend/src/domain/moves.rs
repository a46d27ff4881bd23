//! Move operations: attack, defend, throw in, pass and take.
//!
//! Each operation checks every precondition before mutating anything and
//! reports the first failing one as a `ValidationKind`.

use serde::Serialize;

use crate::domain::cards_logic::{can_beat, can_throw_in, sort_hand};
use crate::domain::rules::HAND_SIZE;
use crate::domain::state::{LastAction, Match, MatchOutcome, Phase, PlayerId, TablePair};
use crate::domain::Card;
use crate::errors::domain::{DomainError, ValidationKind};

/// Moves available to one player in the current state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LegalMoves {
    pub attack: Vec<Card>,
    /// `(attack, defense)` pairs.
    pub defend: Vec<(Card, Card)>,
    pub throw_in: Vec<Card>,
    pub can_pass: bool,
    pub can_take: bool,
}

impl LegalMoves {
    pub fn is_empty(&self) -> bool {
        self.attack.is_empty()
            && self.defend.is_empty()
            && self.throw_in.is_empty()
            && !self.can_pass
            && !self.can_take
    }
}

impl Match {
    /// Lead a card onto an empty table.
    pub fn attack(&mut self, player: &PlayerId, card: Card) -> Result<(), DomainError> {
        self.require_phase(Phase::Playing)?;
        let seat = self.require_attacker(player)?;
        if !self.table.is_empty() {
            return Err(DomainError::validation(
                ValidationKind::TableNotEmpty,
                "Attack requires an empty table; use throw-in to add cards",
            ));
        }
        let pos = self.hand_position(seat, card)?;

        self.seats[seat].hand.remove(pos);
        self.table.push(TablePair::open(card));
        self.throw_in_allowed = false;
        self.last_action = Some(LastAction::Attacked {
            player_id: player.clone(),
            card,
        });
        self.assert_invariants();
        Ok(())
    }

    /// Cover the open attack card `attack` with `defense`. Throw-in opens
    /// once nothing on the table is left uncovered.
    pub fn defend(&mut self, player: &PlayerId, attack: Card, defense: Card) -> Result<(), DomainError> {
        self.require_phase(Phase::Playing)?;
        let seat = self.require_defender(player)?;
        let pair_idx = self.open_pair(attack)?;
        let pos = self.hand_position(seat, defense)?;
        let trump = self.require_trump("defend")?;
        if !can_beat(attack, defense, trump) {
            return Err(DomainError::validation(
                ValidationKind::CannotBeat,
                format!("{defense} does not beat {attack} (trump {trump})"),
            ));
        }

        self.seats[seat].hand.remove(pos);
        self.table[pair_idx].defense = Some(defense);
        self.throw_in_allowed = self.all_defended();
        self.last_action = Some(LastAction::Defended {
            player_id: player.clone(),
            attack,
            defense,
        });
        self.assert_invariants();
        Ok(())
    }

    /// Add a card whose rank already shows on the table. Closes throw-in
    /// again until the new card is beaten.
    pub fn throw_in(&mut self, player: &PlayerId, card: Card) -> Result<(), DomainError> {
        self.require_phase(Phase::Playing)?;
        let seat = self.require_seat(player)?;
        if !self.throw_in_allowed {
            return Err(DomainError::validation(
                ValidationKind::ThrowInNotAllowed,
                "Throw-in opens only once every attack is beaten",
            ));
        }
        let pos = self.hand_position(seat, card)?;
        if !can_throw_in(card, &self.table_cards()) {
            return Err(DomainError::validation(
                ValidationKind::RankNotOnTable,
                format!("No card of {card}'s rank is on the table"),
            ));
        }
        self.check_defender_capacity()?;

        self.seats[seat].hand.remove(pos);
        self.table.push(TablePair::open(card));
        self.throw_in_allowed = false;
        self.last_action = Some(LastAction::ThrewIn {
            player_id: player.clone(),
            card,
        });
        self.assert_invariants();
        Ok(())
    }

    /// Attacker ends the round once every attack is beaten. Table cards are
    /// discarded, hands are refilled, and the roles swap.
    pub fn pass_turn(&mut self, player: &PlayerId) -> Result<(), DomainError> {
        self.require_phase(Phase::Playing)?;
        self.require_attacker(player)?;
        self.require_table_not_empty("pass")?;
        let undefended = self.undefended_count();
        if undefended > 0 {
            return Err(DomainError::validation(
                ValidationKind::UndefendedCards,
                format!("{undefended} attack card(s) still undefended"),
            ));
        }

        let cleared = self.table_cards();
        self.table.clear();
        self.discard.extend(cleared);
        self.refill_hands();
        std::mem::swap(&mut self.attacker, &mut self.defender);
        self.throw_in_allowed = false;
        self.last_action = Some(LastAction::Passed {
            player_id: player.clone(),
        });
        self.check_for_winner();
        self.assert_invariants();
        Ok(())
    }

    /// Defender picks up every table card. Roles stay as they are.
    pub fn take_cards(&mut self, player: &PlayerId) -> Result<(), DomainError> {
        self.require_phase(Phase::Playing)?;
        let seat = self.require_defender(player)?;
        self.require_table_not_empty("take")?;
        let trump = self.require_trump("take")?;

        let taken = self.table_cards();
        let count = taken.len();
        self.table.clear();
        let hand = &mut self.seats[seat].hand;
        hand.extend(taken);
        sort_hand(hand, trump);
        self.refill_hands();
        self.throw_in_allowed = false;
        self.last_action = Some(LastAction::Took {
            player_id: player.clone(),
            count,
        });
        self.check_for_winner();
        self.assert_invariants();
        Ok(())
    }

    /// Everything `player` may legally do right now.
    ///
    /// Each entry is accepted by the matching move operation.
    pub fn legal_moves(&self, player: &PlayerId) -> LegalMoves {
        let mut moves = LegalMoves::default();
        if self.phase != Phase::Playing {
            return moves;
        }
        let (Some(seat), Some(trump)) = (self.seat_of(player), self.trump) else {
            return moves;
        };
        let hand = &self.seats[seat].hand;
        let is_attacker = self.attacker.as_ref() == Some(player);
        let is_defender = self.defender.as_ref() == Some(player);

        if is_attacker && self.table.is_empty() {
            moves.attack = hand.clone();
        }
        if is_defender {
            for pair in self.table.iter().filter(|p| !p.is_defended()) {
                for &card in hand {
                    if can_beat(pair.attack, card, trump) {
                        moves.defend.push((pair.attack, card));
                    }
                }
            }
        }
        if self.throw_in_allowed && self.check_defender_capacity().is_ok() {
            let on_table = self.table_cards();
            moves.throw_in = hand
                .iter()
                .copied()
                .filter(|&c| can_throw_in(c, &on_table))
                .collect();
        }
        moves.can_pass = is_attacker && !self.table.is_empty() && self.all_defended();
        moves.can_take = is_defender && !self.table.is_empty();
        moves
    }

    fn require_attacker(&self, player: &PlayerId) -> Result<usize, DomainError> {
        let seat = self.require_seat(player)?;
        if self.attacker.as_ref() != Some(player) {
            return Err(DomainError::validation(
                ValidationKind::NotAttacker,
                format!("{player} is not the attacker"),
            ));
        }
        Ok(seat)
    }

    fn require_defender(&self, player: &PlayerId) -> Result<usize, DomainError> {
        let seat = self.require_seat(player)?;
        if self.defender.as_ref() != Some(player) {
            return Err(DomainError::validation(
                ValidationKind::NotDefender,
                format!("{player} is not the defender"),
            ));
        }
        Ok(seat)
    }

    fn require_table_not_empty(&self, action: &str) -> Result<(), DomainError> {
        if self.table.is_empty() {
            return Err(DomainError::validation(
                ValidationKind::TableEmpty,
                format!("Cannot {action} with an empty table"),
            ));
        }
        Ok(())
    }

    fn hand_position(&self, seat: usize, card: Card) -> Result<usize, DomainError> {
        self.seats[seat]
            .hand
            .iter()
            .position(|&c| c == card)
            .ok_or_else(|| {
                DomainError::validation(
                    ValidationKind::CardNotInHand,
                    format!("{card} is not in {}'s hand", self.seats[seat].id),
                )
            })
    }

    /// Index of the undefended pair whose attack card is `attack`.
    fn open_pair(&self, attack: Card) -> Result<usize, DomainError> {
        match self.table.iter().position(|p| p.attack == attack) {
            Some(idx) if self.table[idx].is_defended() => Err(DomainError::validation(
                ValidationKind::AlreadyDefended,
                format!("{attack} is already defended"),
            )),
            Some(idx) => Ok(idx),
            None => Err(DomainError::validation(
                ValidationKind::AttackNotFound,
                format!("{attack} is not on the table"),
            )),
        }
    }

    /// The defender must hold more cards than there are open attacks.
    fn check_defender_capacity(&self) -> Result<(), DomainError> {
        let defender_cards = self
            .defender
            .as_ref()
            .and_then(|d| self.hand(d))
            .map_or(0, <[Card]>::len);
        let undefended = self.undefended_count();
        if defender_cards <= undefended {
            return Err(DomainError::validation(
                ValidationKind::DefenderCapacity,
                format!("Defender holds {defender_cards} card(s) against {undefended} open attack(s)"),
            ));
        }
        Ok(())
    }

    /// Draw up to six cards each, attacker first. Once the deck runs dry the
    /// trump indicator is discarded rather than dealt.
    fn refill_hands(&mut self) {
        let Some(trump) = self.trump else {
            return;
        };
        let order = [self.attacker.clone(), self.defender.clone()];
        for player in order.iter().flatten() {
            let Some(seat) = self.seat_of(player) else {
                continue;
            };
            while self.seats[seat].hand.len() < HAND_SIZE {
                let Some(card) = self.deck.pop() else {
                    break;
                };
                self.seats[seat].hand.push(card);
            }
            sort_hand(&mut self.seats[seat].hand, trump);
        }
        if self.deck.is_empty() {
            if let Some(indicator) = self.trump_card.take() {
                self.discard.push(indicator);
            }
        }
    }

    /// After a round closes with nothing left to draw, an empty hand wins.
    fn check_for_winner(&mut self) {
        if !self.deck.is_empty() || self.trump_card.is_some() {
            return;
        }
        let empty: Vec<(PlayerId, bool)> = self
            .seats
            .iter()
            .map(|s| (s.id.clone(), s.hand.is_empty()))
            .collect();
        let outcome = match empty.as_slice() {
            [(_, true), (_, true)] => MatchOutcome::Draw,
            [(winner, true), (_, false)] | [(_, false), (winner, true)] => MatchOutcome::Winner {
                player_id: winner.clone(),
            },
            _ => return,
        };
        self.finish(outcome);
    }
}
