// apps/backend/src/domain/match_transition.rs

use crate::domain::state::{Match, Phase, PlayerId};

/// The slice of match state that notification fan-out cares about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchLifecycleView {
    pub phase: Phase,
    pub attacker: Option<PlayerId>,
    /// Members in join order.
    pub players: Vec<PlayerId>,
}

impl Match {
    pub fn lifecycle_view(&self) -> MatchLifecycleView {
        MatchLifecycleView {
            phase: self.phase(),
            attacker: self.attacker().cloned(),
            players: self.players().cloned().collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchTransition {
    /// A player took a seat.
    PlayerJoined { player_id: PlayerId },

    /// A player left the match.
    PlayerLeft { player_id: PlayerId },

    /// Edge-triggered: Waiting -> Playing.
    MatchStarted,

    /// Edge-triggered: the attacker role moved to a specific player.
    AttackerBecame { player_id: PlayerId },

    /// Edge-triggered: !Finished -> Finished.
    MatchFinished,
}

/// Derive transitions from before/after lifecycle state.
pub fn derive_match_transitions(
    before: &MatchLifecycleView,
    after: &MatchLifecycleView,
) -> Vec<MatchTransition> {
    let mut transitions = Vec::new();

    // 1. Membership
    for player_id in after.players.iter().filter(|p| !before.players.contains(p)) {
        transitions.push(MatchTransition::PlayerJoined {
            player_id: player_id.clone(),
        });
    }
    for player_id in before.players.iter().filter(|p| !after.players.contains(p)) {
        transitions.push(MatchTransition::PlayerLeft {
            player_id: player_id.clone(),
        });
    }

    // 2. Start
    if before.phase == Phase::Waiting && after.phase == Phase::Playing {
        transitions.push(MatchTransition::MatchStarted);
    }

    // 3. Attacker change, only meaningful while in play
    if after.phase == Phase::Playing {
        if let Some(player_id) = &after.attacker {
            if before.attacker.as_ref() != Some(player_id) {
                transitions.push(MatchTransition::AttackerBecame {
                    player_id: player_id.clone(),
                });
            }
        }
    }

    // 4. Finish
    if before.phase != Phase::Finished && after.phase == Phase::Finished {
        transitions.push(MatchTransition::MatchFinished);
    }

    transitions
}
