//! Domain layer: card rules and the match state machine. No I/O, no locking.

pub mod cards_logic;
pub mod cards_parsing;
pub mod cards_serde;
pub mod cards_types;
pub mod dealing;
pub mod fixtures;
pub mod lifecycle;
pub mod match_transition;
pub mod moves;
pub mod player_view;
pub mod rules;
pub mod seed_derivation;
pub mod state;

#[cfg(test)]
mod tests_match_flow;

// Re-exports for ergonomics
pub use cards_logic::{can_beat, can_throw_in, lowest_trump, sort_hand};
pub use cards_parsing::try_parse_cards;
pub use cards_types::{Card, Rank, Suit};
pub use match_transition::{derive_match_transitions, MatchLifecycleView, MatchTransition};
pub use moves::LegalMoves;
pub use player_view::{CardFace, MatchSummary, MatchView, OpponentView};
pub use seed_derivation::derive_match_seed;
pub use state::{LastAction, Match, MatchId, MatchOutcome, Phase, PlayerId, TablePair};
