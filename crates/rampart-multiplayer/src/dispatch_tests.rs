use bevy_ecs::entity::Entity;
use glam::{Quat, Vec2, Vec3};
use rampart_config::Config;
use rampart_protocol::{
    ApprovalPacket, BalancePacket, BuildOrUpgradePacket, CommandAddPacket,
    CommandHoldPositionPacket, CommandPlacePacket, DamagePacket, DayNightPacket, DisconnectPacket,
    DisconnectReason, EnemySpawnPacket, HealPacket, Identity, IdentityKind, ManualAttackPacket,
    Packet, PacketKind, PeerSyncPacket, Perk, PlayerRoster, PlayerSyncPacket, PositionPacket,
    RespawnPacket, ScaleHpPacket, SharedPlayerState, SpawnCoinPacket, TransitionToScenePacket,
    UnitOrder,
};

use super::{ClientState, Context, PacketRouter};
use crate::registry::IdentityRegistry;
use crate::session::SessionManager;
use crate::test_util::{RecordingSim, RecordingTransport, SimCall};
use crate::transport::PeerId;

struct Fixture {
    router: PacketRouter,
    session: SessionManager,
    registry: IdentityRegistry,
    state: ClientState,
    config: Config,
    sim: RecordingSim,
    transport: RecordingTransport,
}

impl Fixture {
    fn new() -> Self {
        Self {
            router: PacketRouter::new(),
            session: SessionManager::new(2.5),
            registry: IdentityRegistry::new(),
            state: ClientState::default(),
            config: Config::default(),
            sim: RecordingSim::new(),
            transport: RecordingTransport::new(),
        }
    }

    fn dispatch(&mut self, sender: PeerId, packet: Packet) {
        let mut ctx = Context {
            session: &mut self.session,
            registry: &mut self.registry,
            state: &mut self.state,
            config: &self.config,
            sim: &mut self.sim,
            transport: &mut self.transport,
        };
        self.router.handle_packet(&mut ctx, sender, packet);
    }

    fn dispatch_raw(&mut self, sender: PeerId, tag: u8, payload: &[u8]) {
        let mut ctx = Context {
            session: &mut self.session,
            registry: &mut self.registry,
            state: &mut self.state,
            config: &self.config,
            sim: &mut self.sim,
            transport: &mut self.transport,
        };
        self.router.handle(&mut ctx, sender, tag, payload);
    }

    /// Registers a fresh entity under `(kind, id)` and returns it.
    fn register(&mut self, kind: IdentityKind, id: i32) -> Entity {
        let entity = self.sim.make_entity();
        self.registry.register(kind, id, entity);
        entity
    }

    /// Creates a player record with an instantiated entity.
    fn add_player(&mut self, id: i32) -> Entity {
        let template = self.sim.make_entity();
        self.session
            .rebind_entity_template(Some(template), &mut self.registry, &mut self.sim);
        self.session
            .create_or_update(id, None, &mut self.registry, &mut self.sim)
            .entity
            .unwrap()
    }
}

const SENDER: PeerId = PeerId(1000);

// ---------------------------------------------------------------------------
// Robustness
// ---------------------------------------------------------------------------

#[test]
fn test_unknown_tag_is_dropped() {
    let mut fx = Fixture::new();
    fx.dispatch_raw(SENDER, 200, &[1, 2, 3]);
    assert!(fx.sim.calls.is_empty());
    assert!(fx.transport.sent.is_empty());
    assert!(fx.session.is_empty());
}

#[test]
fn test_malformed_payload_is_dropped() {
    let mut fx = Fixture::new();
    fx.dispatch_raw(SENDER, PacketKind::Damage.tag(), &[0xFF, 0x01]);
    assert!(fx.sim.calls.is_empty());
}

#[test]
fn test_well_formed_raw_payload_dispatches() {
    let mut fx = Fixture::new();
    let packet = Packet::DayNight(DayNightPacket { night: true });
    let payload = packet.encode_payload();
    fx.dispatch_raw(SENDER, packet.kind().tag(), &payload);
    assert_eq!(fx.sim.calls, vec![SimCall::TriggerNightFall]);
}

#[test]
fn test_damage_with_unregistered_target_is_noop() {
    let mut fx = Fixture::new();
    fx.dispatch(
        SENDER,
        Packet::Damage(DamagePacket {
            target: Identity::new(IdentityKind::Enemy, 404),
            source: Identity::INVALID,
            damage: 10.0,
            caused_by_player: true,
            invoke_feedback_events: true,
        }),
    );
    assert!(fx.sim.calls.is_empty());
}

// ---------------------------------------------------------------------------
// Approval
// ---------------------------------------------------------------------------

#[test]
fn test_approval_wrong_version_is_kicked() {
    let mut fx = Fixture::new();
    fx.dispatch(
        SENDER,
        Packet::Approval(ApprovalPacket {
            same_version: false,
            password: String::new(),
        }),
    );
    assert_eq!(fx.transport.kicked, vec![(SENDER, DisconnectReason::WrongVersion)]);
    assert!(fx.session.is_empty());
}

#[test]
fn test_approval_wrong_password_is_kicked() {
    let mut fx = Fixture::new();
    fx.config.network.password = "secret".into();
    fx.dispatch(
        SENDER,
        Packet::Approval(ApprovalPacket {
            same_version: true,
            password: "not-it".into(),
        }),
    );
    assert_eq!(
        fx.transport.kicked,
        vec![(SENDER, DisconnectReason::WrongPassword)]
    );
    assert!(fx.session.is_empty());
    assert!(fx.transport.sent.is_empty());
}

#[test]
fn test_approval_success_adds_player_and_sends_roster() {
    let mut fx = Fixture::new();
    fx.config.network.password = "secret".into();
    fx.dispatch(
        SENDER,
        Packet::Approval(ApprovalPacket {
            same_version: true,
            password: "secret".into(),
        }),
    );

    assert!(fx.transport.kicked.is_empty());
    assert_eq!(fx.session.len(), 1);
    let joined = fx.session.get_by_peer(SENDER).expect("player bound to peer");
    let joined_id = joined.id;

    // The new peer received a roster naming itself as the local player.
    let (peer, packet) = &fx.transport.sent[0];
    assert_eq!(*peer, SENDER);
    let Packet::PeerSync(sync) = packet else {
        panic!("expected PeerSync, got {packet:?}");
    };
    assert_eq!(sync.local_player, joined_id);
    assert_eq!(sync.players.len(), 1);
    assert_eq!(sync.players[0].id, joined_id);
}

#[test]
fn test_approval_empty_password_config_accepts_anything() {
    let mut fx = Fixture::new();
    fx.dispatch(
        SENDER,
        Packet::Approval(ApprovalPacket {
            same_version: true,
            password: "whatever".into(),
        }),
    );
    assert!(fx.transport.kicked.is_empty());
    assert_eq!(fx.session.len(), 1);
}

#[test]
fn test_approval_roster_is_personalized_per_peer() {
    let mut fx = Fixture::new();
    let first = PeerId(1);
    let second = PeerId(2);
    fx.dispatch(
        first,
        Packet::Approval(ApprovalPacket {
            same_version: true,
            password: String::new(),
        }),
    );
    fx.transport.sent.clear();
    fx.dispatch(
        second,
        Packet::Approval(ApprovalPacket {
            same_version: true,
            password: String::new(),
        }),
    );

    // Both connected peers got a roster, each naming its own id.
    assert_eq!(fx.transport.sent.len(), 2);
    for (peer, packet) in &fx.transport.sent {
        let Packet::PeerSync(sync) = packet else {
            panic!("expected PeerSync");
        };
        let own_id = fx.session.get_by_peer(*peer).unwrap().id;
        assert_eq!(sync.local_player, own_id);
        assert_eq!(sync.players.len(), 2);
    }
}

// ---------------------------------------------------------------------------
// PeerSync / Disconnect
// ---------------------------------------------------------------------------

#[test]
fn test_peer_sync_materializes_roster() {
    let mut fx = Fixture::new();
    fx.dispatch(
        SENDER,
        Packet::PeerSync(PeerSyncPacket {
            local_player: 7,
            players: vec![
                PlayerRoster {
                    id: 7,
                    position: Vec3::ZERO,
                },
                PlayerRoster {
                    id: 9,
                    position: Vec3::new(5.0, 0.0, 0.0),
                },
            ],
        }),
    );

    assert_eq!(fx.session.len(), 2);
    assert_eq!(fx.session.local_id(), Some(7));
    assert!(fx.session.is_local(7));
    assert!(!fx.session.is_local(9));
    assert_eq!(
        fx.session.get(9).unwrap().shared.position,
        Vec3::new(5.0, 0.0, 0.0)
    );
}

#[test]
fn test_peer_sync_clears_awaiting_approval() {
    let mut fx = Fixture::new();
    fx.state.awaiting_approval = true;
    fx.dispatch(
        SENDER,
        Packet::PeerSync(PeerSyncPacket {
            local_player: 1,
            players: vec![],
        }),
    );
    assert!(!fx.state.awaiting_approval);
    assert!(fx.sim.calls.contains(&SimCall::TransitionToLevelSelect));
}

#[test]
fn test_peer_sync_positions_instantiated_entities() {
    let mut fx = Fixture::new();
    let template = fx.sim.make_entity();
    fx.session
        .rebind_entity_template(Some(template), &mut fx.registry, &mut fx.sim);

    let at = Vec3::new(3.0, 0.0, -2.0);
    fx.dispatch(
        SENDER,
        Packet::PeerSync(PeerSyncPacket {
            local_player: 5,
            players: vec![PlayerRoster { id: 5, position: at }],
        }),
    );

    let entity = fx.session.get(5).unwrap().entity.unwrap();
    assert_eq!(fx.sim.positions[&entity], at);
    assert_eq!(fx.session.get(5).unwrap().movement.position, at);
}

#[test]
fn test_disconnect_shows_reason_dialog() {
    let mut fx = Fixture::new();
    fx.state.awaiting_approval = true;
    fx.dispatch(
        SENDER,
        Packet::Disconnect(DisconnectPacket {
            reason: DisconnectReason::WrongPassword,
        }),
    );
    assert!(!fx.state.awaiting_approval);
    assert_eq!(
        fx.sim.calls,
        vec![SimCall::ShowDisconnectDialog {
            title: "Disconnected".into(),
            message: "You gave the wrong password.".into(),
        }]
    );
}

// ---------------------------------------------------------------------------
// State replication
// ---------------------------------------------------------------------------

#[test]
fn test_player_sync_overwrites_shared_state() {
    let mut fx = Fixture::new();
    fx.session
        .create_or_update(3, None, &mut fx.registry, &mut fx.sim);

    let data = SharedPlayerState {
        move_axes: Vec2::new(1.0, 0.0),
        sprint_toggle: false,
        sprint_held: true,
        position: Vec3::new(8.0, 0.0, 8.0),
    };
    fx.dispatch(
        SENDER,
        Packet::PlayerSync(PlayerSyncPacket {
            player_id: 3,
            data,
        }),
    );
    assert_eq!(fx.session.get(3).unwrap().shared, data);
}

#[test]
fn test_player_sync_unknown_player_is_noop() {
    let mut fx = Fixture::new();
    fx.dispatch(
        SENDER,
        Packet::PlayerSync(PlayerSyncPacket {
            player_id: 99,
            data: SharedPlayerState::default(),
        }),
    );
    assert!(fx.sim.calls.is_empty());
    assert!(fx.session.is_empty());
}

#[test]
fn test_position_packet_moves_target() {
    let mut fx = Fixture::new();
    let entity = fx.register(IdentityKind::Building, 4);
    let at = Vec3::new(1.0, 2.0, 3.0);
    fx.dispatch(
        SENDER,
        Packet::Position(PositionPacket {
            target: Identity::new(IdentityKind::Building, 4),
            position: at,
        }),
    );
    assert_eq!(fx.sim.calls, vec![SimCall::SetPosition(entity, at)]);
}

#[test]
fn test_balance_applies_delta_and_local_feedback() {
    let mut fx = Fixture::new();
    let entity = fx.add_player(7);
    fx.session.set_local(7);
    fx.sim.calls.clear();

    fx.dispatch(SENDER, Packet::Balance(BalancePacket { delta: -25 }));
    assert_eq!(
        fx.sim.calls,
        vec![
            SimCall::AdjustBalance(-25),
            SimCall::BalanceFeedback {
                player: entity,
                delta: -25
            },
        ]
    );
}

#[test]
fn test_balance_without_local_player_skips_feedback() {
    let mut fx = Fixture::new();
    fx.dispatch(SENDER, Packet::Balance(BalancePacket { delta: 10 }));
    assert_eq!(fx.sim.calls, vec![SimCall::AdjustBalance(10)]);
}

#[test]
fn test_scale_hp_resolves_target() {
    let mut fx = Fixture::new();
    let entity = fx.register(IdentityKind::Enemy, 6);
    fx.dispatch(
        SENDER,
        Packet::ScaleHp(ScaleHpPacket {
            target: Identity::new(IdentityKind::Enemy, 6),
            multiplier: 1.5,
        }),
    );
    assert_eq!(
        fx.sim.calls,
        vec![SimCall::ScaleHp {
            target: entity,
            multiplier: 1.5
        }]
    );
}

// ---------------------------------------------------------------------------
// One-shot commands
// ---------------------------------------------------------------------------

#[test]
fn test_damage_resolves_target_and_optional_source() {
    let mut fx = Fixture::new();
    let target = fx.register(IdentityKind::Building, 1);
    fx.dispatch(
        SENDER,
        Packet::Damage(DamagePacket {
            target: Identity::new(IdentityKind::Building, 1),
            source: Identity::new(IdentityKind::Enemy, 55), // never registered
            damage: 12.5,
            caused_by_player: false,
            invoke_feedback_events: true,
        }),
    );
    assert_eq!(
        fx.sim.calls,
        vec![SimCall::ApplyDamage {
            target,
            source: None,
            amount: 12.5,
            caused_by_player: false,
            invoke_feedback: true,
        }]
    );
}

#[test]
fn test_heal_resolves_target() {
    let mut fx = Fixture::new();
    let target = fx.register(IdentityKind::Ally, 2);
    fx.dispatch(
        SENDER,
        Packet::Heal(HealPacket {
            target: Identity::new(IdentityKind::Ally, 2),
            amount: 30.0,
        }),
    );
    assert_eq!(
        fx.sim.calls,
        vec![SimCall::ApplyHeal {
            target,
            amount: 30.0
        }]
    );
}

#[test]
fn test_command_add_skips_unresolved_units() {
    let mut fx = Fixture::new();
    let player = fx.add_player(1);
    let unit = fx.register(IdentityKind::Ally, 10);
    fx.sim.calls.clear();

    fx.dispatch(
        SENDER,
        Packet::CommandAdd(CommandAddPacket {
            player: 1,
            units: vec![
                Identity::new(IdentityKind::Ally, 10),
                Identity::new(IdentityKind::Ally, 11), // destroyed concurrently
            ],
        }),
    );
    assert_eq!(fx.sim.calls, vec![SimCall::CommandAddUnit { player, unit }]);
}

#[test]
fn test_command_add_without_player_entity_is_noop() {
    let mut fx = Fixture::new();
    fx.session
        .create_or_update(1, None, &mut fx.registry, &mut fx.sim);
    fx.register(IdentityKind::Ally, 10);
    fx.sim.calls.clear();

    fx.dispatch(
        SENDER,
        Packet::CommandAdd(CommandAddPacket {
            player: 1,
            units: vec![Identity::new(IdentityKind::Ally, 10)],
        }),
    );
    assert!(fx.sim.calls.is_empty());
}

#[test]
fn test_command_place_emits_waypoint_then_places() {
    let mut fx = Fixture::new();
    let player = fx.add_player(1);
    let unit = fx.register(IdentityKind::Ally, 10);
    fx.sim.calls.clear();

    let home = Vec3::new(4.0, 0.0, 4.0);
    fx.dispatch(
        SENDER,
        Packet::CommandPlace(CommandPlacePacket {
            player: 1,
            units: vec![UnitOrder {
                unit: Identity::new(IdentityKind::Ally, 10),
                home,
            }],
        }),
    );
    assert_eq!(
        fx.sim.calls,
        vec![
            SimCall::CommandEmitWaypoint {
                player,
                has_units: true
            },
            SimCall::CommandPlaceUnit { player, unit, home },
        ]
    );
}

#[test]
fn test_command_hold_plays_sound_only_with_units() {
    let mut fx = Fixture::new();
    let player = fx.add_player(1);
    let unit = fx.register(IdentityKind::Ally, 10);
    fx.sim.calls.clear();

    // Empty order: no sound, nothing to hold.
    fx.dispatch(
        SENDER,
        Packet::CommandHoldPosition(CommandHoldPositionPacket {
            player: 1,
            units: vec![],
        }),
    );
    assert!(fx.sim.calls.is_empty());

    let home = Vec3::new(-1.0, 0.0, 2.0);
    fx.dispatch(
        SENDER,
        Packet::CommandHoldPosition(CommandHoldPositionPacket {
            player: 1,
            units: vec![UnitOrder {
                unit: Identity::new(IdentityKind::Ally, 10),
                home,
            }],
        }),
    );
    assert_eq!(
        fx.sim.calls,
        vec![
            SimCall::PlayHoldSound(player),
            SimCall::CommandHoldPosition { unit, home },
        ]
    );
}

#[test]
fn test_manual_attack_requires_player_entity() {
    let mut fx = Fixture::new();
    fx.dispatch(SENDER, Packet::ManualAttack(ManualAttackPacket { player: 5 }));
    assert!(fx.sim.calls.is_empty());

    let player = fx.add_player(5);
    fx.sim.calls.clear();
    fx.dispatch(SENDER, Packet::ManualAttack(ManualAttackPacket { player: 5 }));
    assert_eq!(fx.sim.calls, vec![SimCall::TriggerManualAttack(player)]);
}

#[test]
fn test_spawn_coin_targets_collecting_player() {
    let mut fx = Fixture::new();
    let player = fx.add_player(2);
    fx.sim.calls.clear();

    let position = Vec3::new(1.0, 0.5, 1.0);
    let rotation = Quat::from_xyzw(0.0, 1.0, 0.0, 0.0);
    fx.dispatch(
        SENDER,
        Packet::SpawnCoin(SpawnCoinPacket {
            player: 2,
            position,
            rotation,
        }),
    );
    assert_eq!(
        fx.sim.calls,
        vec![SimCall::SpawnCoin {
            position,
            rotation,
            collector: player
        }]
    );
}

#[test]
fn test_build_or_upgrade_marshals_arguments() {
    let mut fx = Fixture::new();
    fx.dispatch(
        SENDER,
        Packet::BuildOrUpgrade(BuildOrUpgradePacket {
            building_id: 15,
            level: 2,
            choice: 1,
        }),
    );
    assert_eq!(
        fx.sim.calls,
        vec![SimCall::UpgradeBuilding {
            building_id: 15,
            level: 2,
            choice: 1
        }]
    );
}

// ---------------------------------------------------------------------------
// World/scene events
// ---------------------------------------------------------------------------

#[test]
fn test_day_night_triggers_only_nightfall() {
    let mut fx = Fixture::new();
    fx.dispatch(SENDER, Packet::DayNight(DayNightPacket { night: false }));
    assert!(fx.sim.calls.is_empty());

    fx.dispatch(SENDER, Packet::DayNight(DayNightPacket { night: true }));
    assert_eq!(fx.sim.calls, vec![SimCall::TriggerNightFall]);
}

#[test]
fn test_enemy_spawn_registers_new_entity() {
    let mut fx = Fixture::new();
    fx.dispatch(
        SENDER,
        Packet::EnemySpawn(EnemySpawnPacket {
            wave: 3,
            spawn: 1,
            position: Vec3::new(20.0, 0.0, 20.0),
            id: 777,
            coins: 5,
        }),
    );
    let registered = fx.registry.resolve(IdentityKind::Enemy, 777);
    assert!(registered.is_some());
    assert!(matches!(
        fx.sim.calls[0],
        SimCall::SpawnEnemy { wave: 3, spawn: 1, coins: 5, .. }
    ));
}

#[test]
fn test_enemy_spawn_failure_registers_nothing() {
    let mut fx = Fixture::new();
    fx.sim.fail_enemy_spawns = true;
    fx.dispatch(
        SENDER,
        Packet::EnemySpawn(EnemySpawnPacket {
            wave: 1,
            spawn: 0,
            position: Vec3::ZERO,
            id: 5,
            coins: 0,
        }),
    );
    assert_eq!(fx.registry.resolve(IdentityKind::Enemy, 5), None);
}

#[test]
fn test_respawn_revives_allies() {
    let mut fx = Fixture::new();
    let unit = fx.register(IdentityKind::Ally, 8);
    let at = Vec3::new(0.0, 1.0, 0.0);
    fx.dispatch(
        SENDER,
        Packet::Respawn(RespawnPacket {
            target: Identity::new(IdentityKind::Ally, 8),
            position: at,
        }),
    );
    assert_eq!(
        fx.sim.calls,
        vec![
            SimCall::ReviveUnit { unit, position: at },
            SimCall::SetPosition(unit, at),
        ]
    );
}

#[test]
fn test_respawn_other_kinds_only_repositions() {
    let mut fx = Fixture::new();
    let entity = fx.register(IdentityKind::Enemy, 9);
    let at = Vec3::new(2.0, 0.0, 2.0);
    fx.dispatch(
        SENDER,
        Packet::Respawn(RespawnPacket {
            target: Identity::new(IdentityKind::Enemy, 9),
            position: at,
        }),
    );
    assert_eq!(fx.sim.calls, vec![SimCall::SetPosition(entity, at)]);
}

#[test]
fn test_transition_to_scene_equips_then_loads() {
    let mut fx = Fixture::new();
    fx.dispatch(
        SENDER,
        Packet::TransitionToScene(TransitionToScenePacket {
            level: "Level_3".into(),
            coming_from_gameplay_scene: "Level_2".into(),
            perks: vec![Perk::RacingHorse],
        }),
    );
    assert_eq!(
        fx.sim.calls,
        vec![
            SimCall::EquipPerks(vec![Perk::RacingHorse]),
            SimCall::LoadLevel {
                level: "Level_3".into(),
                coming_from: "Level_2".into(),
            },
        ]
    );
}
