//! Joining, the opening deal, and departures.

use crate::domain::dealing::{deal_opening, generate_deck, shuffle, OpeningDeal};
use crate::domain::rules::PLAYERS;
use crate::domain::state::{LastAction, Match, MatchOutcome, Phase, PlayerId, Seat};
use crate::errors::domain::{ConflictKind, DomainError};

impl Match {
    /// Seat `player`. The second join deals and moves the match to `Playing`.
    ///
    /// Returns `true` when this join started the match.
    pub fn join(&mut self, player: PlayerId) -> Result<bool, DomainError> {
        if self.phase != Phase::Waiting {
            return Err(DomainError::conflict(
                ConflictKind::MatchStarted,
                format!("Match {} has already started", self.id),
            ));
        }
        if self.is_member(&player) {
            return Err(DomainError::conflict(
                ConflictKind::AlreadyInMatch,
                format!("{player} is already in match {}", self.id),
            ));
        }
        if self.seats.len() >= PLAYERS {
            return Err(DomainError::conflict(
                ConflictKind::MatchFull,
                format!("Match {} is full", self.id),
            ));
        }

        // Prepare the deal before seating anyone so a failure leaves no trace.
        let deal = if self.seats.len() + 1 == PLAYERS {
            Some(self.prepare_deal()?)
        } else {
            None
        };

        self.seats.push(Seat {
            id: player.clone(),
            hand: Vec::new(),
        });
        self.last_action = Some(LastAction::Joined { player_id: player });

        match deal {
            Some(deal) => {
                self.apply_deal(deal);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Remove `player` from the match.
    ///
    /// Leaving a match in play ends it with the remaining player as winner.
    pub fn remove_player(&mut self, player: &PlayerId) -> Result<(), DomainError> {
        let seat = self.require_seat(player)?;
        let departed = self.seats.remove(seat);
        self.discard.extend(departed.hand);
        self.last_action = Some(LastAction::Left {
            player_id: departed.id,
        });

        if self.phase == Phase::Playing {
            match self.seats.first().map(|s| s.id.clone()) {
                Some(winner) => self.finish(MatchOutcome::Abandoned { winner }),
                None => self.finish(MatchOutcome::Draw),
            }
        }
        Ok(())
    }

    fn prepare_deal(&mut self) -> Result<OpeningDeal, DomainError> {
        let deck = match self.preset_deck.take() {
            Some(deck) => deck,
            None => {
                let mut deck = generate_deck();
                shuffle(&mut deck, &mut self.rng);
                deck
            }
        };
        deal_opening(deck, &mut self.rng).ok_or_else(|| {
            DomainError::validation_other("Invariant violated: deck too small for the opening deal")
        })
    }

    fn apply_deal(&mut self, deal: OpeningDeal) {
        let OpeningDeal {
            deck,
            hands,
            trump_card,
            first_attacker,
        } = deal;

        for (seat, hand) in self.seats.iter_mut().zip(hands) {
            seat.hand = hand;
        }
        self.deck = deck;
        self.trump = Some(trump_card.suit);
        self.trump_card = Some(trump_card);

        let attacker = self.seats[first_attacker].id.clone();
        let defender = self.seats[(first_attacker + 1) % PLAYERS].id.clone();
        self.attacker = Some(attacker.clone());
        self.defender = Some(defender);
        self.phase = Phase::Playing;
        self.last_action = Some(LastAction::Dealt {
            trump_card,
            attacker,
        });
        self.assert_invariants();
    }

    pub(crate) fn finish(&mut self, outcome: MatchOutcome) {
        self.phase = Phase::Finished;
        self.throw_in_allowed = false;
        self.outcome = Some(outcome);
    }
}
