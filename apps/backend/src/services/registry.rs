//! Match registry: owns every live match and the player -> match index.
//!
//! Lock order is always index, then match. Move operations look up the
//! match under the index lock, release it, then lock only the match, so
//! moves on different matches never contend with each other.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::registry::RegistryConfig;
use crate::domain::match_transition::{derive_match_transitions, MatchLifecycleView, MatchTransition};
use crate::domain::player_view::{MatchSummary, MatchView};
use crate::domain::seed_derivation::derive_match_seed;
use crate::domain::state::{Match, MatchId, Phase, PlayerId};
use crate::domain::Card;
use crate::errors::domain::{ConflictKind, DomainError, NotFoundKind};
use crate::utils::match_id::generate_match_id;

type SharedMatch = Arc<Mutex<Match>>;

/// Result of a successful registry operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchUpdate {
    pub match_id: MatchId,
    /// One view per current member, in join order.
    pub views: Vec<MatchView>,
    pub transitions: Vec<MatchTransition>,
    /// Everyone to notify: members before and after the operation.
    pub participants: Vec<PlayerId>,
}

impl MatchUpdate {
    pub fn view_for(&self, player: &PlayerId) -> Option<&MatchView> {
        self.views.iter().find(|v| &v.player_id == player)
    }
}

/// Counters for the lobby and health endpoints.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RegistryStats {
    pub active_matches: usize,
    pub online_players: usize,
    pub waiting: usize,
    pub playing: usize,
    pub finished: usize,
}

#[derive(Default)]
struct Index {
    players: HashMap<PlayerId, MatchId>,
    matches: HashMap<MatchId, SharedMatch>,
    /// Matches created so far; feeds per-match seed derivation.
    created: u64,
}

pub struct MatchRegistry {
    config: RegistryConfig,
    index: Mutex<Index>,
    id_rng: Mutex<ChaCha8Rng>,
}

impl Default for MatchRegistry {
    fn default() -> Self {
        Self::new(RegistryConfig::default())
    }
}

/// Seed for the match id stream, kept apart from the per-match streams.
fn id_rng_seed(base_seed: u64) -> u64 {
    derive_match_seed(base_seed, u64::MAX)
}

impl MatchRegistry {
    pub fn new(config: RegistryConfig) -> Self {
        let id_rng = match config.base_seed {
            Some(base) => ChaCha8Rng::seed_from_u64(id_rng_seed(base)),
            None => ChaCha8Rng::seed_from_u64(rand::random()),
        };
        Self {
            config,
            index: Mutex::new(Index::default()),
            id_rng: Mutex::new(id_rng),
        }
    }

    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    /// Create a match and seat `player` in it.
    pub fn create_match(&self, player: &PlayerId) -> Result<MatchUpdate, DomainError> {
        let mut index = self.index.lock();
        ensure_unregistered(&index, player)?;

        let match_id = self.allocate_match_id(&index)?;
        let seed = match self.config.base_seed {
            Some(base) => derive_match_seed(base, index.created),
            None => rand::random(),
        };

        let mut m = Match::with_seed(match_id.clone(), seed);
        let before = m.lifecycle_view();
        m.join(player.clone())?;
        let update = build_update(&m, &before);

        index.created += 1;
        index.players.insert(player.clone(), match_id.clone());
        index.matches.insert(match_id.clone(), Arc::new(Mutex::new(m)));

        info!(match_id = %match_id, player_id = %player, "Match created");
        Ok(update)
    }

    /// Seat `player` in an existing waiting match. The second seat deals.
    pub fn join_match(&self, player: &PlayerId, match_id: &MatchId) -> Result<MatchUpdate, DomainError> {
        let mut index = self.index.lock();
        ensure_unregistered(&index, player)?;
        let shared = lookup_match(&index, match_id)?;

        let mut m = shared.lock();
        let before = m.lifecycle_view();
        m.join(player.clone())?;
        index.players.insert(player.clone(), match_id.clone());

        let update = build_update(&m, &before);
        info!(match_id = %match_id, player_id = %player, "Player joined match");
        log_transitions(&m, &update.transitions);
        Ok(update)
    }

    /// Remove `player` from their match. Leaving mid-game forfeits it, and a
    /// match left with no players is reclaimed on the spot.
    pub fn leave_match(&self, player: &PlayerId) -> Result<MatchUpdate, DomainError> {
        let mut index = self.index.lock();
        let match_id = lookup_player(&index, player)?;
        let shared = lookup_match(&index, &match_id)?;

        let mut m = shared.lock();
        let before = m.lifecycle_view();
        m.remove_player(player)?;
        index.players.remove(player);

        let update = build_update(&m, &before);
        info!(match_id = %match_id, player_id = %player, "Player left match");
        log_transitions(&m, &update.transitions);

        if m.is_empty() {
            index.matches.remove(&match_id);
            info!(match_id = %match_id, "Empty match reclaimed");
        }
        Ok(update)
    }

    /// The calling player's view of their current match.
    pub fn view_for_player(&self, player: &PlayerId) -> Result<MatchView, DomainError> {
        let shared = self.shared_for_player(player)?;
        let m = shared.lock();
        MatchView::for_player(&m, player).ok_or_else(|| player_not_found(player))
    }

    pub fn attack(&self, player: &PlayerId, card: Card) -> Result<MatchUpdate, DomainError> {
        debug!(player_id = %player, card = %card, "Attack");
        self.apply_move(player, "attack", |m| m.attack(player, card))
    }

    pub fn defend(&self, player: &PlayerId, attack: Card, defense: Card) -> Result<MatchUpdate, DomainError> {
        debug!(player_id = %player, attack = %attack, defense = %defense, "Defend");
        self.apply_move(player, "defend", |m| m.defend(player, attack, defense))
    }

    pub fn throw_in(&self, player: &PlayerId, card: Card) -> Result<MatchUpdate, DomainError> {
        debug!(player_id = %player, card = %card, "Throw in");
        self.apply_move(player, "throw_in", |m| m.throw_in(player, card))
    }

    pub fn pass_turn(&self, player: &PlayerId) -> Result<MatchUpdate, DomainError> {
        debug!(player_id = %player, "Pass");
        self.apply_move(player, "pass", |m| m.pass_turn(player))
    }

    pub fn take_cards(&self, player: &PlayerId) -> Result<MatchUpdate, DomainError> {
        debug!(player_id = %player, "Take");
        self.apply_move(player, "take", |m| m.take_cards(player))
    }

    /// Waiting matches with a free seat, sorted by match id.
    pub fn list_open_matches(&self) -> Vec<MatchSummary> {
        let index = self.index.lock();
        let mut open: Vec<MatchSummary> = index
            .matches
            .values()
            .map(|shared| MatchSummary::of(&shared.lock()))
            .filter(MatchSummary::is_open)
            .collect();
        open.sort_by(|a, b| a.match_id.cmp(&b.match_id));
        open
    }

    pub fn match_summary(&self, match_id: &MatchId) -> Result<MatchSummary, DomainError> {
        let index = self.index.lock();
        let shared = lookup_match(&index, match_id)?;
        let summary = MatchSummary::of(&shared.lock());
        Ok(summary)
    }

    pub fn match_for_player(&self, player: &PlayerId) -> Option<MatchId> {
        self.index.lock().players.get(player).cloned()
    }

    pub fn stats(&self) -> RegistryStats {
        let index = self.index.lock();
        let mut stats = RegistryStats {
            active_matches: index.matches.len(),
            online_players: index.players.len(),
            ..RegistryStats::default()
        };
        for shared in index.matches.values() {
            match shared.lock().phase() {
                Phase::Waiting => stats.waiting += 1,
                Phase::Playing => stats.playing += 1,
                Phase::Finished => stats.finished += 1,
            }
        }
        stats
    }

    /// Drop matches with no players left. Returns how many were dropped.
    pub fn reclaim_empty(&self) -> usize {
        let mut index = self.index.lock();
        let before = index.matches.len();
        index.matches.retain(|_, shared| !shared.lock().is_empty());
        let reclaimed = before - index.matches.len();
        if reclaimed > 0 {
            info!(reclaimed, "Reclaimed empty matches");
        }
        reclaimed
    }

    /// Drop finished matches and release their players. Returns how many
    /// matches were dropped.
    pub fn reclaim_finished(&self) -> usize {
        let mut index = self.index.lock();
        let finished: Vec<(MatchId, Vec<PlayerId>)> = index
            .matches
            .iter()
            .filter_map(|(id, shared)| {
                let m = shared.lock();
                (m.phase() == Phase::Finished).then(|| (id.clone(), m.players().cloned().collect()))
            })
            .collect();

        for (match_id, players) in &finished {
            index.matches.remove(match_id);
            for player in players {
                if index.players.get(player) == Some(match_id) {
                    index.players.remove(player);
                }
            }
        }
        if !finished.is_empty() {
            info!(reclaimed = finished.len(), "Reclaimed finished matches");
        }
        finished.len()
    }

    fn shared_for_player(&self, player: &PlayerId) -> Result<SharedMatch, DomainError> {
        let index = self.index.lock();
        let match_id = lookup_player(&index, player)?;
        lookup_match(&index, &match_id)
    }

    /// Run one move against the player's match under that match's lock only.
    fn apply_move<F>(&self, player: &PlayerId, op: &'static str, f: F) -> Result<MatchUpdate, DomainError>
    where
        F: FnOnce(&mut Match) -> Result<(), DomainError>,
    {
        let shared = self.shared_for_player(player)?;
        let mut m = shared.lock();
        let before = m.lifecycle_view();

        if let Err(err) = f(&mut *m) {
            debug!(
                match_id = %m.id(),
                player_id = %player,
                op,
                code = %err.code(),
                "Move rejected"
            );
            return Err(err);
        }

        let update = build_update(&m, &before);
        log_transitions(&m, &update.transitions);
        Ok(update)
    }

    /// Try short ids first, then the fallback length, then give up.
    fn allocate_match_id(&self, index: &Index) -> Result<MatchId, DomainError> {
        let mut rng = self.id_rng.lock();
        let lengths = [self.config.match_id_len, self.config.fallback_match_id_len];
        for len in lengths {
            for _ in 0..self.config.max_id_attempts {
                let id = MatchId::new(generate_match_id(&mut *rng, len));
                if !index.matches.contains_key(&id) {
                    return Ok(id);
                }
            }
            warn!(len, attempts = self.config.max_id_attempts, "Match id space crowded");
        }
        Err(DomainError::conflict(
            ConflictKind::MatchIdExhausted,
            "Could not allocate a free match id",
        ))
    }
}

fn ensure_unregistered(index: &Index, player: &PlayerId) -> Result<(), DomainError> {
    match index.players.get(player) {
        Some(existing) => Err(DomainError::conflict(
            ConflictKind::AlreadyInMatch,
            format!("{player} is already in match {existing}"),
        )),
        None => Ok(()),
    }
}

fn lookup_player(index: &Index, player: &PlayerId) -> Result<MatchId, DomainError> {
    index
        .players
        .get(player)
        .cloned()
        .ok_or_else(|| player_not_found(player))
}

fn lookup_match(index: &Index, match_id: &MatchId) -> Result<SharedMatch, DomainError> {
    index.matches.get(match_id).cloned().ok_or_else(|| {
        DomainError::not_found(NotFoundKind::Match, format!("No match with id {match_id}"))
    })
}

fn player_not_found(player: &PlayerId) -> DomainError {
    DomainError::not_found(NotFoundKind::Player, format!("{player} is not in any match"))
}

fn build_update(m: &Match, before: &MatchLifecycleView) -> MatchUpdate {
    let after = m.lifecycle_view();
    let mut participants = before.players.clone();
    for p in &after.players {
        if !participants.contains(p) {
            participants.push(p.clone());
        }
    }
    MatchUpdate {
        match_id: m.id().clone(),
        views: m
            .players()
            .filter_map(|p| MatchView::for_player(m, p))
            .collect(),
        transitions: derive_match_transitions(before, &after),
        participants,
    }
}

fn log_transitions(m: &Match, transitions: &[MatchTransition]) {
    for t in transitions {
        match t {
            MatchTransition::MatchStarted => {
                info!(match_id = %m.id(), trump = ?m.trump(), attacker = ?m.attacker(), "Match started");
            }
            MatchTransition::MatchFinished => {
                info!(match_id = %m.id(), outcome = ?m.outcome(), "Match finished");
            }
            MatchTransition::AttackerBecame { player_id } => {
                debug!(match_id = %m.id(), player_id = %player_id, "Attacker changed");
            }
            MatchTransition::PlayerJoined { .. } | MatchTransition::PlayerLeft { .. } => {}
        }
    }
}
