//! Round Logic
//!
//! The match state machine: `Waiting -> Countdown -> Active -> Ended`, and
//! back to `Waiting` through an external new-round trigger. Owns the
//! countdown timer and all kill/death bookkeeping; the `Score` component is
//! mutated nowhere else.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, trace, warn};

use crate::net::protocol::{KillFeedEntry, MatchStateUpdate, ScoreUpdate, ServerMessage};
use crate::net::transport::{Broadcaster, PlayerPalette};
use crate::world::component::{tags, Component, Score};
use crate::world::entity::EntityId;
use crate::world::store::EntityStore;
use crate::TICK_RATE;

/// Match phase.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoundPhase {
    /// Waiting for enough players.
    #[default]
    Waiting,
    /// Countdown before the round starts.
    Countdown,
    /// Round in progress.
    Active,
    /// Round over, awaiting a new-round trigger.
    Ended,
}

/// A player listed in a match-state broadcast, with presentation metadata.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundPlayer {
    /// Player entity.
    pub entity: EntityId,
    /// Assigned color index.
    pub color_index: u8,
}

/// Round configuration.
#[derive(Clone, Copy, Debug)]
pub struct RoundConfig {
    /// Minimum players required to start the countdown.
    pub min_players: usize,
    /// Kill count that ends the round.
    pub score_limit: u32,
    /// Countdown duration, seconds.
    pub countdown_secs: u32,
}

impl Default for RoundConfig {
    fn default() -> Self {
        Self {
            min_players: 2,
            score_limit: 10,
            countdown_secs: 5,
        }
    }
}

/// Cancellable countdown handle, advanced by the tick loop.
#[derive(Clone, Copy, Debug)]
struct Countdown {
    remaining_secs: u32,
    ticks_to_next_sec: u32,
}

impl Countdown {
    fn new(secs: u32) -> Self {
        Self {
            remaining_secs: secs,
            ticks_to_next_sec: TICK_RATE,
        }
    }

    /// Advance one tick. Returns true when the countdown has expired.
    fn advance(&mut self) -> bool {
        if self.ticks_to_next_sec > 1 {
            self.ticks_to_next_sec -= 1;
            return false;
        }
        if self.remaining_secs <= 1 {
            self.remaining_secs = 0;
            return true;
        }
        self.remaining_secs -= 1;
        self.ticks_to_next_sec = TICK_RATE;
        false
    }
}

/// The match state machine.
pub struct RoundManager {
    phase: RoundPhase,
    countdown: Option<Countdown>,
    config: RoundConfig,
    broadcaster: Arc<dyn Broadcaster>,
    palette: Arc<dyn PlayerPalette>,
}

impl RoundManager {
    /// Create a round manager in the `Waiting` phase.
    pub fn new(
        config: RoundConfig,
        broadcaster: Arc<dyn Broadcaster>,
        palette: Arc<dyn PlayerPalette>,
    ) -> Self {
        Self {
            phase: RoundPhase::Waiting,
            countdown: None,
            config,
            broadcaster,
            palette,
        }
    }

    /// Current phase.
    pub fn phase(&self) -> RoundPhase {
        self.phase
    }

    /// Countdown seconds remaining, or `None` when no timer is armed.
    pub fn countdown_secs(&self) -> Option<u32> {
        self.countdown.map(|c| c.remaining_secs)
    }

    /// Start the countdown if enough players are present.
    ///
    /// No-op (and no broadcast) unless the phase is `Waiting` and the
    /// active player count meets the configured minimum.
    pub fn check_round_start(&mut self, world: &EntityStore) {
        if self.phase != RoundPhase::Waiting {
            return;
        }

        let players = world.query_tag(tags::PLAYER).count();
        if players < self.config.min_players {
            trace!(players, min = self.config.min_players, "not enough players to start");
            return;
        }

        self.phase = RoundPhase::Countdown;
        self.countdown = Some(Countdown::new(self.config.countdown_secs));
        info!(players, secs = self.config.countdown_secs, "round countdown started");
        self.broadcast_match_state(world);
    }

    /// Cancel a running countdown and return to `Waiting`.
    ///
    /// Idempotent: a no-op in any phase other than `Countdown`. After the
    /// call the timer handle is observably cleared.
    pub fn cancel_countdown(&mut self, world: &EntityStore) {
        if self.phase != RoundPhase::Countdown {
            return;
        }

        self.phase = RoundPhase::Waiting;
        self.countdown = None;
        info!("round countdown cancelled");
        self.broadcast_match_state(world);
    }

    /// Transition to `Active` and zero every player's kill/death counters.
    pub fn start_round(&mut self, world: &mut EntityStore) {
        self.phase = RoundPhase::Active;
        self.countdown = None;

        for id in world.tagged_ids(tags::PLAYER) {
            if let Some(entity) = world.get_mut(id) {
                entity.insert(Component::Score(Score::default()));
            }
        }

        info!("round started");
        self.broadcast_match_state(world);
    }

    /// Advance the countdown by one tick; starts the round on expiry.
    /// No-op outside the `Countdown` phase.
    pub fn tick(&mut self, world: &mut EntityStore) {
        if self.phase != RoundPhase::Countdown {
            return;
        }
        let expired = match self.countdown.as_mut() {
            Some(countdown) => countdown.advance(),
            None => return,
        };
        if expired {
            self.start_round(world);
        }
    }

    /// Record one kill.
    ///
    /// Increments the killer's kill counter and the victim's death counter;
    /// a missing entity or missing `Score` component makes that side a
    /// logged no-op, never a crash. Emits the kill feed first, then the
    /// killer's score update, then the victim's; clients rely on that
    /// order.
    pub fn handle_kill(
        &mut self,
        world: &mut EntityStore,
        killer: EntityId,
        victim: EntityId,
        weapon: &str,
        headshot: bool,
    ) {
        let killer_score = Self::bump(world, killer, |s| s.kills += 1);
        let victim_score = Self::bump(world, victim, |s| s.deaths += 1);

        self.broadcaster.broadcast(&ServerMessage::KillFeed(KillFeedEntry {
            killer,
            victim,
            weapon: weapon.to_owned(),
            headshot,
        }));

        if let Some(score) = killer_score {
            self.broadcast_score(killer, score);
        }
        if let Some(score) = victim_score {
            self.broadcast_score(victim, score);
        }

        debug!(%killer, %victim, weapon, headshot, "kill recorded");
    }

    /// End the round if any player reached the score limit.
    pub fn check_win_condition(&mut self, world: &EntityStore) {
        if self.phase != RoundPhase::Active {
            return;
        }

        let winner = world
            .query_tag(tags::PLAYER)
            .find(|e| e.score().is_some_and(|s| s.kills >= self.config.score_limit));

        if let Some(winner) = winner {
            info!(winner = %winner.id(), "score limit reached, round over");
            self.phase = RoundPhase::Ended;
            self.broadcast_match_state(world);
        }
    }

    /// External new-round trigger: `Ended -> Waiting`.
    pub fn reset(&mut self, world: &EntityStore) {
        if self.phase != RoundPhase::Ended {
            return;
        }
        self.phase = RoundPhase::Waiting;
        self.countdown = None;
        self.broadcast_match_state(world);
    }

    fn bump(
        world: &mut EntityStore,
        id: EntityId,
        apply: impl FnOnce(&mut Score),
    ) -> Option<Score> {
        match world.get_mut(id).and_then(|e| e.score_mut()) {
            Some(score) => {
                apply(score);
                Some(*score)
            }
            None => {
                warn!(entity = %id, "kill bookkeeping skipped: entity or score missing");
                None
            }
        }
    }

    fn broadcast_score(&self, entity: EntityId, score: Score) {
        self.broadcaster.broadcast(&ServerMessage::ScoreUpdate(ScoreUpdate {
            entity,
            kills: score.kills,
            deaths: score.deaths,
        }));
    }

    fn broadcast_match_state(&self, world: &EntityStore) {
        let players = world
            .query_tag(tags::PLAYER)
            .map(|e| RoundPlayer {
                entity: e.id(),
                color_index: self.palette.color_index(e.id()),
            })
            .collect();

        self.broadcaster.broadcast(&ServerMessage::MatchState(MatchStateUpdate {
            phase: self.phase,
            countdown_secs: self.countdown.map(|c| c.remaining_secs).unwrap_or(0),
            players,
        }));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::net::transport::testing::{Delivery, ModuloPalette, RecordingBroadcaster};
    use crate::world::component::ComponentKind as Kind;

    fn spawn_player(world: &mut EntityStore) -> EntityId {
        let id = world.create();
        let entity = world.get_mut(id).unwrap();
        entity.tag(tags::PLAYER);
        entity.insert(Component::Score(Score::default()));
        id
    }

    fn manager(config: RoundConfig) -> (RoundManager, Arc<RecordingBroadcaster>) {
        let broadcaster = Arc::new(RecordingBroadcaster::default());
        let manager = RoundManager::new(config, broadcaster.clone(), Arc::new(ModuloPalette));
        (manager, broadcaster)
    }

    #[test]
    fn round_start_enters_countdown_and_broadcasts_once() {
        let mut world = EntityStore::new();
        spawn_player(&mut world);
        spawn_player(&mut world);

        let (mut round, broadcaster) = manager(RoundConfig::default());
        round.check_round_start(&world);

        assert_eq!(round.phase(), RoundPhase::Countdown);
        assert_eq!(round.countdown_secs(), Some(5));

        let sent = broadcaster.deliveries();
        assert_eq!(sent.len(), 1);
        match &sent[0] {
            Delivery::Reliable(ServerMessage::MatchState(update)) => {
                assert_eq!(update.phase, RoundPhase::Countdown);
                assert_eq!(update.countdown_secs, 5);
                assert_eq!(update.players.len(), 2);
            }
            other => panic!("unexpected delivery: {other:?}"),
        }
    }

    #[test]
    fn round_start_needs_minimum_players() {
        let mut world = EntityStore::new();
        spawn_player(&mut world);

        let (mut round, broadcaster) = manager(RoundConfig::default());
        round.check_round_start(&world);

        assert_eq!(round.phase(), RoundPhase::Waiting);
        assert!(broadcaster.deliveries().is_empty());
    }

    #[test]
    fn round_start_is_noop_outside_waiting() {
        let mut world = EntityStore::new();
        spawn_player(&mut world);
        spawn_player(&mut world);

        let (mut round, broadcaster) = manager(RoundConfig::default());
        round.start_round(&mut world);
        broadcaster.clear();

        round.check_round_start(&world);
        assert_eq!(round.phase(), RoundPhase::Active);
        assert!(broadcaster.deliveries().is_empty());
    }

    #[test]
    fn cancel_countdown_clears_timer_and_is_idempotent() {
        let mut world = EntityStore::new();
        spawn_player(&mut world);
        spawn_player(&mut world);

        let (mut round, broadcaster) = manager(RoundConfig::default());
        round.check_round_start(&world);
        round.cancel_countdown(&world);

        assert_eq!(round.phase(), RoundPhase::Waiting);
        assert_eq!(round.countdown_secs(), None);

        broadcaster.clear();
        round.cancel_countdown(&world);
        assert_eq!(round.phase(), RoundPhase::Waiting);
        assert!(broadcaster.deliveries().is_empty());
    }

    #[test]
    fn countdown_ticks_down_to_round_start() {
        let mut world = EntityStore::new();
        spawn_player(&mut world);
        spawn_player(&mut world);

        let (mut round, _broadcaster) = manager(RoundConfig {
            countdown_secs: 2,
            ..RoundConfig::default()
        });
        round.check_round_start(&world);

        for _ in 0..(2 * TICK_RATE) {
            round.tick(&mut world);
        }
        assert_eq!(round.phase(), RoundPhase::Active);
        assert_eq!(round.countdown_secs(), None);
    }

    #[test]
    fn start_round_resets_score_components() {
        let mut world = EntityStore::new();
        let p = spawn_player(&mut world);
        world.get_mut(p).unwrap().score_mut().unwrap().kills = 7;

        let (mut round, _broadcaster) = manager(RoundConfig::default());
        round.start_round(&mut world);

        let score = world.get(p).unwrap().score().unwrap();
        assert_eq!((score.kills, score.deaths), (0, 0));
        assert!(world.get(p).unwrap().has(Kind::Score));
    }

    #[test]
    fn kill_updates_counters_and_message_order() {
        let mut world = EntityStore::new();
        let killer = spawn_player(&mut world);
        let victim = spawn_player(&mut world);

        let (mut round, broadcaster) = manager(RoundConfig::default());
        round.start_round(&mut world);
        broadcaster.clear();

        round.handle_kill(&mut world, killer, victim, "pistol", false);

        assert_eq!(world.get(killer).unwrap().score().unwrap().kills, 1);
        assert_eq!(world.get(victim).unwrap().score().unwrap().deaths, 1);

        let sent = broadcaster.deliveries();
        assert_eq!(sent.len(), 3);
        match &sent[0] {
            Delivery::Reliable(ServerMessage::KillFeed(feed)) => {
                assert_eq!(feed.killer, killer);
                assert_eq!(feed.victim, victim);
                assert_eq!(feed.weapon, "pistol");
                assert!(!feed.headshot);
            }
            other => panic!("expected kill feed first, got {other:?}"),
        }
        match &sent[1] {
            Delivery::Reliable(ServerMessage::ScoreUpdate(up)) => {
                assert_eq!(up.entity, killer);
                assert_eq!((up.kills, up.deaths), (1, 0));
            }
            other => panic!("expected killer score second, got {other:?}"),
        }
        match &sent[2] {
            Delivery::Reliable(ServerMessage::ScoreUpdate(up)) => {
                assert_eq!(up.entity, victim);
                assert_eq!((up.kills, up.deaths), (0, 1));
            }
            other => panic!("expected victim score third, got {other:?}"),
        }
    }

    #[test]
    fn kill_with_missing_victim_only_updates_killer() {
        let mut world = EntityStore::new();
        let killer = spawn_player(&mut world);
        let ghost = EntityId(999);

        let (mut round, broadcaster) = manager(RoundConfig::default());
        round.start_round(&mut world);
        broadcaster.clear();

        round.handle_kill(&mut world, killer, ghost, "rifle", true);

        assert_eq!(world.get(killer).unwrap().score().unwrap().kills, 1);
        let sent = broadcaster.deliveries();
        // Feed plus killer score update; no update for the missing side.
        assert_eq!(sent.len(), 2);
        assert!(matches!(&sent[0], Delivery::Reliable(ServerMessage::KillFeed(_))));
    }

    #[test]
    fn win_condition_ends_round_at_score_limit() {
        let mut world = EntityStore::new();
        let killer = spawn_player(&mut world);
        let victim = spawn_player(&mut world);

        let (mut round, _broadcaster) = manager(RoundConfig {
            score_limit: 2,
            ..RoundConfig::default()
        });
        round.start_round(&mut world);

        round.handle_kill(&mut world, killer, victim, "pistol", false);
        round.check_win_condition(&world);
        assert_eq!(round.phase(), RoundPhase::Active);

        round.handle_kill(&mut world, killer, victim, "pistol", false);
        round.check_win_condition(&world);
        assert_eq!(round.phase(), RoundPhase::Ended);
    }

    #[test]
    fn reset_returns_to_waiting_from_ended_only() {
        let mut world = EntityStore::new();
        spawn_player(&mut world);
        spawn_player(&mut world);

        let (mut round, _broadcaster) = manager(RoundConfig::default());
        round.reset(&world);
        assert_eq!(round.phase(), RoundPhase::Waiting);

        round.start_round(&mut world);
        round.reset(&world);
        assert_eq!(round.phase(), RoundPhase::Active);
    }
}
