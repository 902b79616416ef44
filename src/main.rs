//! Palisade Game Server
//!
//! Demo orchestration for the server core: wires the world, the round
//! state machine, the broadcast systems, and the join-sync bootstrap
//! together and runs a short scripted match against a logging transport.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use palisade::game::broadcast::StateBroadcast;
use palisade::game::join::{JoinSynchronizer, NpcSync, SpawnSource};
use palisade::game::ladder::LadderRegistry;
use palisade::game::round::{RoundConfig, RoundManager};
use palisade::net::protocol::{
    BuildingState, ItemSpawn, LadderPlaceRequest, ServerMessage, TerrainFeatureSpawn,
};
use palisade::net::transport::{Broadcaster, ConnectionId, ConnectionRoster, PlayerPalette};
use palisade::world::component::{tags, Component, Score, Stamina, Transform};
use palisade::world::entity::EntityId;
use palisade::world::math::Vec3;
use palisade::world::store::EntityStore;
use palisade::{TICK_RATE, VERSION};

/// Transport stand-in that logs every delivery.
#[derive(Default)]
struct LogTransport {
    sent: AtomicUsize,
}

impl Broadcaster for LogTransport {
    fn broadcast(&self, msg: &ServerMessage) {
        self.sent.fetch_add(1, Ordering::Relaxed);
        info!(opcode = ?msg.opcode(), "broadcast");
    }

    fn broadcast_deferred(&self, msg: &ServerMessage) {
        self.sent.fetch_add(1, Ordering::Relaxed);
        info!(opcode = ?msg.opcode(), "broadcast (deferred)");
    }

    fn broadcast_buffer(&self, buf: &[u8]) {
        self.sent.fetch_add(1, Ordering::Relaxed);
        info!(bytes = buf.len(), "broadcast (binary)");
    }

    fn send(&self, conn: ConnectionId, msg: &ServerMessage) {
        self.sent.fetch_add(1, Ordering::Relaxed);
        info!(conn = %conn, opcode = ?msg.opcode(), "send");
    }
}

struct DemoRoster(Vec<ConnectionId>);

impl ConnectionRoster for DemoRoster {
    fn connections(&self) -> Vec<ConnectionId> {
        self.0.clone()
    }
}

struct DemoPalette;

impl PlayerPalette for DemoPalette {
    fn color_index(&self, entity: EntityId) -> u8 {
        (entity.0 % 8) as u8
    }
}

/// Fixed demo world content.
struct DemoSpawns;

impl SpawnSource for DemoSpawns {
    fn item_spawns(&self) -> Vec<ItemSpawn> {
        vec![ItemSpawn {
            entity: EntityId(1000),
            item: "medkit".to_string(),
            position: Vec3::new(12.0, 0.0, -4.0),
        }]
    }

    fn tree_spawns(&self) -> Option<TerrainFeatureSpawn> {
        Some(TerrainFeatureSpawn {
            instances: vec![palisade::net::protocol::FeatureInstance {
                position: Vec3::new(30.0, 0.0, 18.0),
                scale: 1.2,
            }],
        })
    }

    fn rock_spawns(&self) -> Option<TerrainFeatureSpawn> {
        None
    }

    fn bush_spawns(&self) -> Option<TerrainFeatureSpawn> {
        None
    }

    fn building_states(&self) -> Vec<BuildingState> {
        Vec::new()
    }
}

struct DemoNpcs;

impl NpcSync for DemoNpcs {
    fn send_spawns(&self, conn: ConnectionId) {
        info!(conn = %conn, "npc spawn sync (none live)");
    }
}

fn main() -> anyhow::Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("Palisade Server v{}", VERSION);
    info!("Tick Rate: {} Hz", TICK_RATE);

    demo_round();
    Ok(())
}

/// Scripted demo round exercising the full core.
fn demo_round() {
    let transport = Arc::new(LogTransport::default());
    let roster = DemoRoster(vec![ConnectionId(1), ConnectionId(2)]);

    let mut world = EntityStore::new();
    let mut round = RoundManager::new(
        RoundConfig {
            score_limit: 1,
            ..RoundConfig::default()
        },
        transport.clone(),
        Arc::new(DemoPalette),
    );
    let mut ladders = LadderRegistry::new(transport.clone());
    let mut sync = StateBroadcast::new(transport.clone());
    let join = JoinSynchronizer::new(transport.clone(), Arc::new(DemoSpawns), Arc::new(DemoNpcs));

    // Two players connect.
    let mut players = Vec::new();
    for i in 0..2u64 {
        let id = world.create();
        let entity = world.get_mut(id).expect("entity just created");
        entity.tag(tags::PLAYER);
        entity.insert(Component::Transform(Transform {
            position: Vec3::new(i as f32 * 4.0, 0.0, 0.0),
            ..Transform::default()
        }));
        entity.insert(Component::Score(Score::default()));
        entity.insert(Component::Stamina(Stamina {
            value: 100.0,
            exhausted: false,
        }));
        players.push(id);
        info!(player = %id, "player joined");
    }

    // Late joiner bootstrap.
    join.send_initial_state(&world, ConnectionId(2));

    // Countdown and round start.
    round.check_round_start(&world);
    while round.countdown_secs().is_some() {
        round.tick(&mut world);
    }
    info!(phase = ?round.phase(), "countdown finished");

    // A few ticks of play.
    for _ in 0..3 {
        sync.broadcast_tick(&world, &roster);
    }

    // One player places and removes a ladder.
    ladders.handle_place(
        &mut world,
        players[0],
        &LadderPlaceRequest {
            position: Vec3::new(2.0, 0.0, 1.0),
            normal: Vec3::new(0.0, 0.0, 1.0),
            segment_count: 4,
        },
    );
    let placed = world.tagged_ids(tags::LADDER);
    ladders.handle_destroy(&mut world, players[0], placed[0]);

    // A kill ends the round at score limit 1.
    round.handle_kill(&mut world, players[0], players[1], "bow", true);
    round.check_win_condition(&world);
    info!(phase = ?round.phase(), "round over");

    // Victim respawns: attribute cache must be dropped so the next
    // broadcast re-emits everything for that entity.
    sync.clear_cache_for_entity(players[1]);
    sync.broadcast_tick(&world, &roster);

    info!(
        deliveries = transport.sent.load(Ordering::Relaxed),
        "demo complete"
    );
}
