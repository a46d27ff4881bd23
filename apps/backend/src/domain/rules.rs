/// Players per match.
pub const PLAYERS: usize = 2;
/// Cards in the short deck (9 ranks x 4 suits).
pub const DECK_SIZE: usize = 36;
/// Hand size after the deal and after every refill.
pub const HAND_SIZE: usize = 6;
