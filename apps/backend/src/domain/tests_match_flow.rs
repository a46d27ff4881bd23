//! Scenario tests for the match state machine.

use crate::domain::cards_logic::lowest_trump;
use crate::domain::fixtures::CardFixtures;
use crate::domain::state::{LastAction, Match, MatchId, MatchOutcome, Phase, PlayerId, TablePair};
use crate::domain::test_state_helpers::{alice, bob, make_match, MakeMatchArgs};
use crate::domain::Suit;
use crate::errors::domain::{ConflictKind, DomainError, ValidationKind};

fn cards(tokens: &[&str]) -> Vec<crate::domain::Card> {
    CardFixtures::parse_hardcoded(tokens)
}

fn c(token: &str) -> crate::domain::Card {
    CardFixtures::card(token)
}

fn open(token: &str) -> TablePair {
    TablePair::open(c(token))
}

fn covered(attack: &str, defense: &str) -> TablePair {
    TablePair {
        attack: c(attack),
        defense: Some(c(defense)),
    }
}

/// Apply a move that must be rejected and check nothing changed.
fn assert_rejected<F>(m: &mut Match, kind: ValidationKind, mv: F)
where
    F: Fn(&mut Match) -> Result<(), DomainError>,
{
    let before = m.clone();
    match mv(m) {
        Err(DomainError::Validation(got, _)) => assert_eq!(got, kind),
        other => panic!("expected {kind:?} rejection, got {other:?}"),
    }
    assert_eq!(*m, before, "rejected move must not mutate state");
    // A repeated rejection is just as inert.
    assert!(mv(m).is_err());
    assert_eq!(*m, before);
}

// --- join and deal ---

#[test]
fn second_join_deals_and_starts() {
    let mut m = Match::with_seed(MatchId::from("M1"), 42);
    assert!(!m.join(alice()).unwrap());
    assert_eq!(m.phase(), Phase::Waiting);
    assert!(m.join(bob()).unwrap());

    assert_eq!(m.phase(), Phase::Playing);
    assert_eq!(m.hand(&alice()).unwrap().len(), 6);
    assert_eq!(m.hand(&bob()).unwrap().len(), 6);
    assert_eq!(m.deck_len(), 23);
    let trump_card = m.trump_card().unwrap();
    assert_eq!(m.trump(), Some(trump_card.suit));
    assert!(m.table().is_empty());
    assert!(m.check_invariants().is_ok());

    let attacker = m.attacker().unwrap().clone();
    let defender = m.defender().unwrap().clone();
    assert_ne!(attacker, defender);
    assert!(matches!(
        m.last_action(),
        Some(LastAction::Dealt { attacker: a, .. }) if *a == attacker
    ));

    // Whoever holds the lowest trump attacks first.
    let trump = trump_card.suit;
    let low_a = lowest_trump(m.hand(&attacker).unwrap(), trump);
    let low_d = lowest_trump(m.hand(&defender).unwrap(), trump);
    match (low_a, low_d) {
        (Some(a), Some(d)) => assert!(a.rank < d.rank),
        (None, Some(_)) => panic!("defender holds the only trump"),
        _ => {}
    }
}

#[test]
fn same_seed_deals_same_match() {
    let deal = |seed| {
        let mut m = Match::with_seed(MatchId::from("M1"), seed);
        m.join(alice()).unwrap();
        m.join(bob()).unwrap();
        m
    };
    assert_eq!(deal(9), deal(9));
}

#[test]
fn join_conflicts() {
    let mut m = Match::with_seed(MatchId::from("M1"), 1);
    m.join(alice()).unwrap();
    assert!(matches!(
        m.join(alice()),
        Err(DomainError::Conflict(ConflictKind::AlreadyInMatch, _))
    ));
    m.join(bob()).unwrap();
    assert!(matches!(
        m.join(PlayerId::from("carol")),
        Err(DomainError::Conflict(ConflictKind::MatchStarted, _))
    ));
    assert_eq!(m.player_count(), 2);
}

#[test]
fn moves_rejected_while_waiting() {
    let mut m = Match::with_seed(MatchId::from("M1"), 1);
    m.join(alice()).unwrap();
    assert_rejected(&mut m, ValidationKind::PhaseMismatch, |m| {
        m.attack(&alice(), c("6h"))
    });
    assert_rejected(&mut m, ValidationKind::PhaseMismatch, |m| m.pass_turn(&alice()));
}

#[test]
fn preset_deck_must_be_full_and_distinct() {
    let short = cards(&["6h", "7h"]);
    assert!(Match::with_deck_order(MatchId::from("M1"), 0, short).is_err());

    let mut dup = crate::domain::dealing::generate_deck();
    dup[1] = dup[0];
    assert!(Match::with_deck_order(MatchId::from("M1"), 0, dup).is_err());
}

// --- attack ---

#[test]
fn attack_places_open_pair() {
    let mut m = make_match(
        [cards(&["6c", "7c"]), cards(&["8c", "9d"])],
        MakeMatchArgs::default(),
    );
    m.attack(&alice(), c("6c")).unwrap();

    assert_eq!(m.table(), &[open("6c")]);
    assert_eq!(m.hand(&alice()).unwrap(), cards(&["7c"]).as_slice());
    assert!(!m.throw_in_allowed());
    assert_eq!(
        m.last_action(),
        Some(&LastAction::Attacked {
            player_id: alice(),
            card: c("6c")
        })
    );
    assert_eq!(m.last_action().unwrap().to_string(), "alice attacked with 6c");
}

#[test]
fn attack_rejections() {
    let mut m = make_match(
        [cards(&["6c", "7c"]), cards(&["8c", "9d"])],
        MakeMatchArgs::default(),
    );
    assert_rejected(&mut m, ValidationKind::NotAttacker, |m| m.attack(&bob(), c("8c")));
    assert_rejected(&mut m, ValidationKind::NotAMember, |m| {
        m.attack(&PlayerId::from("mallory"), c("6c"))
    });
    assert_rejected(&mut m, ValidationKind::CardNotInHand, |m| {
        m.attack(&alice(), c("Ah"))
    });

    m.attack(&alice(), c("6c")).unwrap();
    assert_rejected(&mut m, ValidationKind::TableNotEmpty, |m| {
        m.attack(&alice(), c("7c"))
    });
}

// --- defend ---

#[test]
fn defend_same_suit_higher_rank() {
    let mut m = make_match(
        [cards(&["7c"]), cards(&["8c", "9d"])],
        MakeMatchArgs {
            table: vec![open("6c")],
            ..Default::default()
        },
    );
    m.defend(&bob(), c("6c"), c("8c")).unwrap();

    assert_eq!(m.table(), &[covered("6c", "8c")]);
    assert!(m.throw_in_allowed());
    assert_eq!(m.hand(&bob()).unwrap(), cards(&["9d"]).as_slice());
}

#[test]
fn throw_in_opens_only_when_table_fully_covered() {
    let mut m = make_match(
        [cards(&["7d"]), cards(&["8c", "9c", "Qs"])],
        MakeMatchArgs {
            table: vec![open("6c"), open("7c")],
            ..Default::default()
        },
    );
    m.defend(&bob(), c("6c"), c("8c")).unwrap();
    assert!(!m.throw_in_allowed());
    m.defend(&bob(), c("7c"), c("9c")).unwrap();
    assert!(m.throw_in_allowed());
    assert_eq!(m.legal_moves(&alice()).throw_in, cards(&["7d"]));
}

#[test]
fn defend_with_trump_beats_plain_ace() {
    let mut m = make_match(
        [cards(&["7c"]), cards(&["6h", "9d"])],
        MakeMatchArgs {
            trump: Suit::Hearts,
            table: vec![open("Ac")],
            ..Default::default()
        },
    );
    m.defend(&bob(), c("Ac"), c("6h")).unwrap();
    assert!(m.all_defended());
}

#[test]
fn defend_rejections() {
    let mut m = make_match(
        [cards(&["7c"]), cards(&["Kd", "9d", "6s"])],
        MakeMatchArgs {
            trump: Suit::Hearts,
            table: vec![open("Qd"), covered("6c", "8c")],
            ..Default::default()
        },
    );
    assert_rejected(&mut m, ValidationKind::NotDefender, |m| {
        m.defend(&alice(), c("Qd"), c("7c"))
    });
    assert_rejected(&mut m, ValidationKind::AttackNotFound, |m| {
        m.defend(&bob(), c("Jd"), c("Kd"))
    });
    assert_rejected(&mut m, ValidationKind::AlreadyDefended, |m| {
        m.defend(&bob(), c("6c"), c("Kd"))
    });
    assert_rejected(&mut m, ValidationKind::CardNotInHand, |m| {
        m.defend(&bob(), c("Qd"), c("Ad"))
    });
    // Lower same-suit card.
    assert_rejected(&mut m, ValidationKind::CannotBeat, |m| {
        m.defend(&bob(), c("Qd"), c("9d"))
    });
    // Off-suit non-trump.
    assert_rejected(&mut m, ValidationKind::CannotBeat, |m| {
        m.defend(&bob(), c("Qd"), c("6s"))
    });

    m.defend(&bob(), c("Qd"), c("Kd")).unwrap();
    assert!(m.all_defended());
}

// --- throw-in ---

#[test]
fn throw_in_after_defense() {
    let mut m = make_match(
        [cards(&["6d", "Ks"]), cards(&["9d", "Qs", "Js"])],
        MakeMatchArgs {
            table: vec![covered("6c", "8c")],
            throw_in_allowed: true,
            ..Default::default()
        },
    );
    assert_rejected(&mut m, ValidationKind::RankNotOnTable, |m| {
        m.throw_in(&alice(), c("Ks"))
    });
    assert_rejected(&mut m, ValidationKind::CardNotInHand, |m| {
        m.throw_in(&alice(), c("8d"))
    });

    m.throw_in(&alice(), c("6d")).unwrap();
    assert_eq!(m.table(), &[covered("6c", "8c"), open("6d")]);
    assert_eq!(m.undefended_count(), 1);
    // One throw-in per defense.
    assert!(!m.throw_in_allowed());
    assert_rejected(&mut m, ValidationKind::ThrowInNotAllowed, |m| {
        m.throw_in(&alice(), c("6s"))
    });
    assert_eq!(
        m.last_action(),
        Some(&LastAction::ThrewIn {
            player_id: alice(),
            card: c("6d")
        })
    );
}

#[test]
fn throw_in_matches_defense_rank_too() {
    let mut m = make_match(
        [cards(&["8d"]), cards(&["9d", "Qs"])],
        MakeMatchArgs {
            table: vec![covered("6c", "8c")],
            throw_in_allowed: true,
            ..Default::default()
        },
    );
    m.throw_in(&alice(), c("8d")).unwrap();
    assert_eq!(m.undefended_count(), 1);
}

#[test]
fn throw_in_closed_before_first_defense() {
    let mut m = make_match(
        [cards(&["6d"]), cards(&["9d", "Qs"])],
        MakeMatchArgs {
            table: vec![open("6c")],
            ..Default::default()
        },
    );
    assert_rejected(&mut m, ValidationKind::ThrowInNotAllowed, |m| {
        m.throw_in(&alice(), c("6d"))
    });
}

#[test]
fn throw_in_respects_defender_capacity() {
    // One open attack against a one-card defender: no room for another.
    let mut m = make_match(
        [cards(&["6d"]), cards(&["9d"])],
        MakeMatchArgs {
            table: vec![covered("7c", "8c"), open("6c")],
            throw_in_allowed: true,
            ..Default::default()
        },
    );
    assert_rejected(&mut m, ValidationKind::DefenderCapacity, |m| {
        m.throw_in(&alice(), c("6d"))
    });
    assert!(m.legal_moves(&alice()).throw_in.is_empty());
}

#[test]
fn throw_in_rejected_after_defender_covers_with_last_card() {
    let mut m = make_match(
        [cards(&["6c", "6d"]), cards(&["8c"])],
        MakeMatchArgs::default(),
    );
    m.attack(&alice(), c("6c")).unwrap();
    m.defend(&bob(), c("6c"), c("8c")).unwrap();
    assert!(m.throw_in_allowed());
    assert!(m.hand(&bob()).unwrap().is_empty());

    assert_rejected(&mut m, ValidationKind::DefenderCapacity, |m| {
        m.throw_in(&alice(), c("6d"))
    });
    let legal = m.legal_moves(&alice());
    assert!(legal.throw_in.is_empty());
    assert!(legal.can_pass);
}

// --- pass ---

#[test]
fn pass_discards_refills_and_swaps_roles() {
    let mut m = make_match(
        [cards(&["7c"]), cards(&["9d"])],
        MakeMatchArgs {
            table: vec![covered("6c", "8c")],
            throw_in_allowed: true,
            ..Default::default()
        },
    );
    let deck_before = m.deck_len();
    m.pass_turn(&alice()).unwrap();

    assert!(m.table().is_empty());
    assert_eq!(m.discard_len(), 2);
    assert_eq!(m.hand(&alice()).unwrap().len(), 6);
    assert_eq!(m.hand(&bob()).unwrap().len(), 6);
    assert_eq!(m.deck_len(), deck_before - 10);
    assert_eq!(m.attacker(), Some(&bob()));
    assert_eq!(m.defender(), Some(&alice()));
    assert!(!m.throw_in_allowed());
    assert_eq!(m.phase(), Phase::Playing);
}

#[test]
fn pass_rejections() {
    let mut m = make_match(
        [cards(&["7c"]), cards(&["9d"])],
        MakeMatchArgs::default(),
    );
    assert_rejected(&mut m, ValidationKind::TableEmpty, |m| m.pass_turn(&alice()));

    let mut m = make_match(
        [cards(&["7c"]), cards(&["9d"])],
        MakeMatchArgs {
            table: vec![covered("6c", "8c"), open("6d")],
            throw_in_allowed: true,
            ..Default::default()
        },
    );
    assert_rejected(&mut m, ValidationKind::UndefendedCards, |m| m.pass_turn(&alice()));
    assert_rejected(&mut m, ValidationKind::NotAttacker, |m| m.pass_turn(&bob()));
}

// --- take ---

#[test]
fn take_moves_table_to_defender_without_swap() {
    let mut m = make_match(
        [cards(&["7c"]), cards(&["9d", "Js", "Qs", "Ks", "As"])],
        MakeMatchArgs {
            table: vec![covered("6c", "8c"), open("6d")],
            throw_in_allowed: true,
            ..Default::default()
        },
    );
    m.take_cards(&bob()).unwrap();

    assert!(m.table().is_empty());
    let bob_hand = m.hand(&bob()).unwrap();
    assert_eq!(bob_hand.len(), 8);
    for card in cards(&["6c", "8c", "6d"]) {
        assert!(bob_hand.contains(&card));
    }
    assert_eq!(m.hand(&alice()).unwrap().len(), 6);
    assert_eq!(m.attacker(), Some(&alice()));
    assert_eq!(m.defender(), Some(&bob()));
    assert!(!m.throw_in_allowed());
    assert_eq!(
        m.last_action(),
        Some(&LastAction::Took {
            player_id: bob(),
            count: 3
        })
    );
}

#[test]
fn take_rejections() {
    let mut m = make_match(
        [cards(&["7c"]), cards(&["9d"])],
        MakeMatchArgs::default(),
    );
    assert_rejected(&mut m, ValidationKind::TableEmpty, |m| m.take_cards(&bob()));
    m.attack(&alice(), c("7c")).unwrap();
    assert_rejected(&mut m, ValidationKind::NotDefender, |m| m.take_cards(&alice()));
}

// --- refill and exhaustion ---

#[test]
fn refill_serves_attacker_first_and_drops_indicator() {
    let mut m = make_match(
        [cards(&["7c"]), cards(&["9d"])],
        MakeMatchArgs {
            trump: Suit::Hearts,
            trump_card: Some(c("Ah")),
            table: vec![covered("6c", "8c")],
            deck: Some(cards(&["Qs"])),
            ..Default::default()
        },
    );
    m.pass_turn(&alice()).unwrap();

    assert_eq!(m.hand(&alice()).unwrap(), cards(&["7c", "Qs"]).as_slice());
    assert_eq!(m.hand(&bob()).unwrap(), cards(&["9d"]).as_slice());
    assert_eq!(m.deck_len(), 0);
    assert_eq!(m.trump_card(), None);
    // Trump suit outlives the indicator.
    assert_eq!(m.trump(), Some(Suit::Hearts));
    assert_eq!(m.phase(), Phase::Playing);
    assert!(m.check_invariants().is_ok());
}

#[test]
fn emptied_hand_wins_after_pass() {
    let mut m = make_match(
        [cards(&["6c"]), cards(&["8c", "9d"])],
        MakeMatchArgs {
            deck: Some(Vec::new()),
            ..Default::default()
        },
    );
    m.attack(&alice(), c("6c")).unwrap();
    m.defend(&bob(), c("6c"), c("8c")).unwrap();
    m.pass_turn(&alice()).unwrap();

    assert_eq!(m.phase(), Phase::Finished);
    assert_eq!(m.winner(), Some(&alice()));
    assert_eq!(
        m.outcome(),
        Some(&MatchOutcome::Winner {
            player_id: alice()
        })
    );
    assert_rejected(&mut m, ValidationKind::PhaseMismatch, |m| {
        m.attack(&bob(), c("9d"))
    });
}

#[test]
fn emptied_hand_wins_after_take() {
    let mut m = make_match(
        [cards(&["6c"]), cards(&["Kd"])],
        MakeMatchArgs {
            deck: Some(Vec::new()),
            ..Default::default()
        },
    );
    m.attack(&alice(), c("6c")).unwrap();
    m.take_cards(&bob()).unwrap();

    assert_eq!(m.phase(), Phase::Finished);
    assert_eq!(m.winner(), Some(&alice()));
    assert_eq!(m.hand(&bob()).unwrap().len(), 2);
}

#[test]
fn refill_happens_before_win_check() {
    let mut m = make_match(
        [cards(&["6c"]), cards(&["8c", "9d"])],
        MakeMatchArgs {
            trump_card: Some(c("Ah")),
            deck: Some(cards(&["Qs", "Js"])),
            ..Default::default()
        },
    );
    m.attack(&alice(), c("6c")).unwrap();
    m.defend(&bob(), c("6c"), c("8c")).unwrap();
    m.pass_turn(&alice()).unwrap();
    // alice drew both deck cards, so she is not empty-handed.
    assert_eq!(m.phase(), Phase::Playing);
    assert_eq!(m.hand(&alice()).unwrap().len(), 2);
}

#[test]
fn both_hands_empty_is_a_draw() {
    let mut m = make_match(
        [cards(&["6c"]), cards(&["8c"])],
        MakeMatchArgs {
            deck: Some(Vec::new()),
            ..Default::default()
        },
    );
    m.attack(&alice(), c("6c")).unwrap();
    m.defend(&bob(), c("6c"), c("8c")).unwrap();
    m.pass_turn(&alice()).unwrap();

    assert_eq!(m.phase(), Phase::Finished);
    assert_eq!(m.outcome(), Some(&MatchOutcome::Draw));
    assert_eq!(m.winner(), None);
}

// --- departure ---

#[test]
fn leaving_mid_game_awards_opponent() {
    let mut m = make_match(
        [cards(&["6c"]), cards(&["8c"])],
        MakeMatchArgs::default(),
    );
    m.remove_player(&alice()).unwrap();

    assert_eq!(m.phase(), Phase::Finished);
    assert_eq!(m.player_count(), 1);
    assert_eq!(m.outcome(), Some(&MatchOutcome::Abandoned { winner: bob() }));
    assert_eq!(m.winner(), Some(&bob()));
}

#[test]
fn leaving_while_waiting_empties_match() {
    let mut m = Match::with_seed(MatchId::from("M1"), 3);
    m.join(alice()).unwrap();
    m.remove_player(&alice()).unwrap();
    assert!(m.is_empty());
    assert_eq!(m.phase(), Phase::Waiting);
    assert!(m.remove_player(&alice()).is_err());
}

// --- full game ---

/// Drive a match to the end with a simple policy: attack with the first
/// legal card, defend when possible, pass once beaten, otherwise take.
fn play_out(m: &mut Match) {
    for _ in 0..2_000 {
        if m.phase() != Phase::Playing {
            return;
        }
        let attacker = m.attacker().unwrap().clone();
        let defender = m.defender().unwrap().clone();
        let att = m.legal_moves(&attacker);
        let def = m.legal_moves(&defender);

        if let Some(&card) = att.attack.first() {
            m.attack(&attacker, card).unwrap();
        } else if let Some(&(attack, defense)) = def.defend.first() {
            m.defend(&defender, attack, defense).unwrap();
        } else if att.can_pass {
            m.pass_turn(&attacker).unwrap();
        } else if def.can_take {
            m.take_cards(&defender).unwrap();
        } else {
            panic!("no legal move in {m:?}");
        }
        assert!(m.check_invariants().is_ok());

        if m.phase() == Phase::Finished {
            let exhausted = m.deck_len() == 0 && m.trump_card().is_none();
            assert!(exhausted, "finished before the deck ran out");
            match m.outcome().unwrap() {
                MatchOutcome::Winner { player_id } => {
                    assert!(m.hand(player_id).unwrap().is_empty());
                    let other = m.opponent_of(player_id).unwrap();
                    assert!(!m.hand(other).unwrap().is_empty());
                }
                MatchOutcome::Draw => {
                    assert!(m.hand(&attacker).unwrap().is_empty());
                    assert!(m.hand(&defender).unwrap().is_empty());
                }
                MatchOutcome::Abandoned { .. } => panic!("nobody left"),
            }
        }
    }
    panic!("match did not finish");
}

#[test]
fn stacked_deck_plays_to_completion() {
    let deck = crate::domain::dealing::generate_deck();
    let mut m = Match::with_deck_order(MatchId::from("M1"), 5, deck.clone()).unwrap();
    m.join(alice()).unwrap();
    m.join(bob()).unwrap();

    // Alternating deal from the top of the listed order.
    let expected_alice: Vec<_> = deck.iter().step_by(2).take(6).copied().collect();
    let mut alice_hand = m.hand(&alice()).unwrap().to_vec();
    alice_hand.sort();
    let mut expected_sorted = expected_alice;
    expected_sorted.sort();
    assert_eq!(alice_hand, expected_sorted);
    assert_eq!(m.trump_card(), Some(deck[12]));

    play_out(&mut m);
    assert_eq!(m.phase(), Phase::Finished);
}

#[test]
fn seeded_matches_play_to_completion() {
    for seed in 0..20 {
        let mut m = Match::with_seed(MatchId::from("M1"), seed);
        m.join(alice()).unwrap();
        m.join(bob()).unwrap();
        play_out(&mut m);
        assert_eq!(m.phase(), Phase::Finished);
    }
}
