use durak_backend::domain::{LastAction, MatchOutcome, MatchTransition};
use durak_backend::errors::{DomainError, ErrorCode, NotFoundKind, ValidationKind};
use durak_backend::Phase;

use crate::support::registry_helpers::{card_not_in, play_to_end, player, seeded_registry, start_match};

#[test]
fn attack_defend_pass_round_trip() {
    let registry = seeded_registry(21);
    let s = start_match(&registry, "round_trip");

    let att_view = registry.view_for_player(&s.attacker).unwrap();
    let card = att_view.legal_moves.attack[0];
    let update = registry.attack(&s.attacker, card).unwrap();
    assert!(update.transitions.is_empty());

    let def_view = update.view_for(&s.defender).unwrap();
    assert_eq!(def_view.table.len(), 1);
    assert_eq!(
        def_view.last_action,
        Some(LastAction::Attacked {
            player_id: s.attacker.clone(),
            card
        })
    );

    match def_view.legal_moves.defend.first() {
        Some(&(attack, defense)) => {
            registry.defend(&s.defender, attack, defense).unwrap();
            let update = registry.pass_turn(&s.attacker).unwrap();
            assert!(update.transitions.contains(&MatchTransition::AttackerBecame {
                player_id: s.defender.clone()
            }));
            let view = registry.view_for_player(&s.attacker).unwrap();
            assert!(view.is_my_defense());
            assert!(view.table.is_empty());
            assert_eq!(view.hand.len(), 6);
        }
        None => {
            let update = registry.take_cards(&s.defender).unwrap();
            assert!(update.transitions.is_empty());
            let view = registry.view_for_player(&s.defender).unwrap();
            assert_eq!(view.hand.len(), 7);
            assert!(view.is_my_defense());
        }
    }
}

#[test]
fn rejections_carry_codes_and_leave_state_alone() {
    let registry = seeded_registry(22);
    let s = start_match(&registry, "rejections");
    let before_att = registry.view_for_player(&s.attacker).unwrap();
    let before_def = registry.view_for_player(&s.defender).unwrap();

    let defender_card = before_def.hand[0];
    let err = registry.attack(&s.defender, defender_card).unwrap_err();
    assert!(matches!(err, DomainError::Validation(ValidationKind::NotAttacker, _)));
    assert_eq!(err.code(), ErrorCode::NotAttacker);

    let missing = card_not_in(&before_att.hand);
    let err = registry.attack(&s.attacker, missing).unwrap_err();
    assert_eq!(err.code(), ErrorCode::CardNotInHand);

    assert_eq!(
        registry.pass_turn(&s.attacker).unwrap_err().code(),
        ErrorCode::TableEmpty
    );
    assert_eq!(
        registry.take_cards(&s.defender).unwrap_err().code(),
        ErrorCode::TableEmpty
    );
    assert_eq!(
        registry.throw_in(&s.attacker, before_att.hand[0]).unwrap_err().code(),
        ErrorCode::ThrowInNotAllowed
    );

    assert_eq!(registry.view_for_player(&s.attacker).unwrap(), before_att);
    assert_eq!(registry.view_for_player(&s.defender).unwrap(), before_def);
}

#[test]
fn moves_from_unknown_player_are_not_found() {
    let registry = seeded_registry(23);
    let _ = start_match(&registry, "unknown");
    let err = registry.pass_turn(&player("ghost")).unwrap_err();
    assert!(matches!(err, DomainError::NotFound(NotFoundKind::Player, _)));
    assert!(!err.is_rejection());
}

#[test]
fn played_out_match_reports_finish() {
    let registry = seeded_registry(24);
    let s = start_match(&registry, "played_out");
    play_to_end(&registry, &s.attacker, &s.defender);

    let a = registry.view_for_player(&s.attacker).unwrap();
    let b = registry.view_for_player(&s.defender).unwrap();
    assert_eq!(a.phase, Phase::Finished);
    assert_eq!(a.outcome, b.outcome);
    assert_eq!(a.deck_count, 0);
    assert!(a.trump_card.is_none());

    match a.outcome.clone().unwrap() {
        MatchOutcome::Winner { player_id } => {
            let winner_view = if player_id == a.player_id { &a } else { &b };
            assert!(winner_view.hand.is_empty());
            assert!(winner_view.opponent.as_ref().unwrap().card_count() > 0);
        }
        MatchOutcome::Draw => {
            assert!(a.hand.is_empty() && b.hand.is_empty());
            assert!(a.winner.is_none());
        }
        MatchOutcome::Abandoned { .. } => panic!("nobody left"),
    }

    assert_eq!(
        registry.pass_turn(&s.attacker).unwrap_err().code(),
        ErrorCode::PhaseMismatch
    );
    assert!(a.legal_moves.is_empty());
}
