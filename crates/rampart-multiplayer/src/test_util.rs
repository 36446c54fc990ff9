//! Recording test doubles for the collaborator traits.

use std::collections::HashMap;

use bevy_ecs::entity::Entity;
use bevy_ecs::world::World;
use glam::{Quat, Vec3};
use rampart_protocol::{DisconnectReason, Packet, Perk};

use crate::sim::Simulation;
use crate::transport::{PeerId, Transport};

/// One recorded call into [`RecordingSim`].
#[derive(Debug, Clone, PartialEq)]
pub enum SimCall {
    InstantiatePlayer {
        template: Entity,
        position: Vec3,
        result: Entity,
    },
    DestroyEntity(Entity),
    SetPosition(Entity, Vec3),
    LoadLevel {
        level: String,
        coming_from: String,
    },
    TransitionToLevelSelect,
    EquipPerks(Vec<Perk>),
    ApplyDamage {
        target: Entity,
        source: Option<Entity>,
        amount: f32,
        caused_by_player: bool,
        invoke_feedback: bool,
    },
    ApplyHeal {
        target: Entity,
        amount: f32,
    },
    ScaleHp {
        target: Entity,
        multiplier: f32,
    },
    UpgradeBuilding {
        building_id: i32,
        level: i32,
        choice: i32,
    },
    TriggerNightFall,
    SpawnEnemy {
        wave: i32,
        spawn: i32,
        position: Vec3,
        coins: i32,
        result: Option<Entity>,
    },
    ReviveUnit {
        unit: Entity,
        position: Vec3,
    },
    CommandAddUnit {
        player: Entity,
        unit: Entity,
    },
    CommandEmitWaypoint {
        player: Entity,
        has_units: bool,
    },
    CommandPlaceUnit {
        player: Entity,
        unit: Entity,
        home: Vec3,
    },
    CommandHoldPosition {
        unit: Entity,
        home: Vec3,
    },
    PlayHoldSound(Entity),
    TriggerManualAttack(Entity),
    AdjustBalance(i32),
    BalanceFeedback {
        player: Entity,
        delta: i32,
    },
    SpawnCoin {
        position: Vec3,
        rotation: Quat,
        collector: Entity,
    },
    ShowDisconnectDialog {
        title: String,
        message: String,
    },
}

/// [`Simulation`] double that mints real entities from an owned ECS world
/// and records every call.
pub struct RecordingSim {
    pub world: World,
    pub calls: Vec<SimCall>,
    pub positions: HashMap<Entity, Vec3>,
    /// When set, `spawn_enemy` reports the spawner as unavailable.
    pub fail_enemy_spawns: bool,
}

impl RecordingSim {
    pub fn new() -> Self {
        Self {
            world: World::new(),
            calls: Vec::new(),
            positions: HashMap::new(),
            fail_enemy_spawns: false,
        }
    }

    /// Mints a fresh entity handle (e.g. to act as a template or a unit).
    pub fn make_entity(&mut self) -> Entity {
        self.world.spawn_empty().id()
    }
}

impl Simulation for RecordingSim {
    fn instantiate_player(&mut self, template: Entity, position: Vec3) -> Entity {
        let result = self.world.spawn_empty().id();
        self.positions.insert(result, position);
        self.calls.push(SimCall::InstantiatePlayer {
            template,
            position,
            result,
        });
        result
    }

    fn destroy_entity(&mut self, entity: Entity) {
        self.positions.remove(&entity);
        self.calls.push(SimCall::DestroyEntity(entity));
    }

    fn set_position(&mut self, entity: Entity, position: Vec3) {
        self.positions.insert(entity, position);
        self.calls.push(SimCall::SetPosition(entity, position));
    }

    fn load_level(&mut self, level: &str, coming_from: &str) {
        self.calls.push(SimCall::LoadLevel {
            level: level.to_string(),
            coming_from: coming_from.to_string(),
        });
    }

    fn transition_to_level_select(&mut self) {
        self.calls.push(SimCall::TransitionToLevelSelect);
    }

    fn equip_perks(&mut self, perks: &[Perk]) {
        self.calls.push(SimCall::EquipPerks(perks.to_vec()));
    }

    fn apply_damage(
        &mut self,
        target: Entity,
        source: Option<Entity>,
        amount: f32,
        caused_by_player: bool,
        invoke_feedback: bool,
    ) {
        self.calls.push(SimCall::ApplyDamage {
            target,
            source,
            amount,
            caused_by_player,
            invoke_feedback,
        });
    }

    fn apply_heal(&mut self, target: Entity, amount: f32) {
        self.calls.push(SimCall::ApplyHeal { target, amount });
    }

    fn scale_hp(&mut self, target: Entity, multiplier: f32) {
        self.calls.push(SimCall::ScaleHp { target, multiplier });
    }

    fn upgrade_building(&mut self, building_id: i32, level: i32, choice: i32) {
        self.calls.push(SimCall::UpgradeBuilding {
            building_id,
            level,
            choice,
        });
    }

    fn trigger_night_fall(&mut self) {
        self.calls.push(SimCall::TriggerNightFall);
    }

    fn spawn_enemy(&mut self, wave: i32, spawn: i32, position: Vec3, coins: i32) -> Option<Entity> {
        let result = if self.fail_enemy_spawns {
            None
        } else {
            let e = self.world.spawn_empty().id();
            self.positions.insert(e, position);
            Some(e)
        };
        self.calls.push(SimCall::SpawnEnemy {
            wave,
            spawn,
            position,
            coins,
            result,
        });
        result
    }

    fn revive_unit(&mut self, unit: Entity, position: Vec3) {
        self.calls.push(SimCall::ReviveUnit { unit, position });
    }

    fn command_add_unit(&mut self, player: Entity, unit: Entity) {
        self.calls.push(SimCall::CommandAddUnit { player, unit });
    }

    fn command_emit_waypoint(&mut self, player: Entity, has_units: bool) {
        self.calls.push(SimCall::CommandEmitWaypoint { player, has_units });
    }

    fn command_place_unit(&mut self, player: Entity, unit: Entity, home: Vec3) {
        self.calls.push(SimCall::CommandPlaceUnit { player, unit, home });
    }

    fn command_hold_position(&mut self, unit: Entity, home: Vec3) {
        self.calls.push(SimCall::CommandHoldPosition { unit, home });
    }

    fn play_hold_sound(&mut self, player: Entity) {
        self.calls.push(SimCall::PlayHoldSound(player));
    }

    fn trigger_manual_attack(&mut self, player: Entity) {
        self.calls.push(SimCall::TriggerManualAttack(player));
    }

    fn adjust_balance(&mut self, delta: i32) {
        self.calls.push(SimCall::AdjustBalance(delta));
    }

    fn balance_feedback(&mut self, player: Entity, delta: i32) {
        self.calls.push(SimCall::BalanceFeedback { player, delta });
    }

    fn spawn_coin(&mut self, position: Vec3, rotation: Quat, collector: Entity) {
        self.calls.push(SimCall::SpawnCoin {
            position,
            rotation,
            collector,
        });
    }

    fn show_disconnect_dialog(&mut self, title: &str, message: &str) {
        self.calls.push(SimCall::ShowDisconnectDialog {
            title: title.to_string(),
            message: message.to_string(),
        });
    }
}

/// [`Transport`] double that records outbound traffic.
#[derive(Default)]
pub struct RecordingTransport {
    pub sent: Vec<(PeerId, Packet)>,
    pub broadcasts: Vec<Packet>,
    pub kicked: Vec<(PeerId, DisconnectReason)>,
}

impl RecordingTransport {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Transport for RecordingTransport {
    fn send(&mut self, peer: PeerId, packet: &Packet) {
        self.sent.push((peer, packet.clone()));
    }

    fn broadcast(&mut self, packet: &Packet) {
        self.broadcasts.push(packet.clone());
    }

    fn kick(&mut self, peer: PeerId, reason: DisconnectReason) {
        self.kicked.push((peer, reason));
    }
}
