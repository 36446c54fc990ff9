//! Player session lifecycle: creation, instantiation, lookup, removal.
//!
//! One [`Player`] record exists per connected participant, indexed both by
//! network id and by transport identity. Records are created on first
//! reference — a local bootstrap or a roster packet — and upserted
//! idempotently after that. Spawn slots are allocated monotonically and
//! never reassigned, so a seat stays stable for the whole session.

use std::collections::HashMap;
use std::collections::hash_map::Entry;

use bevy_ecs::entity::Entity;
use glam::Vec3;
use rand::Rng;
use rampart_protocol::{IdentityKind, SharedPlayerState};
use tracing::info;

use crate::movement::MovementState;
use crate::registry::IdentityRegistry;
use crate::sim::Simulation;
use crate::transport::PeerId;

/// One connected participant.
#[derive(Debug)]
pub struct Player {
    /// Network-wide player id, agreed across host and peers.
    pub id: i32,
    /// Transport identity, when this record is bound to a connection.
    pub peer: Option<PeerId>,
    /// Monotonically allocated spawn seat.
    pub spawn_slot: u32,
    /// Instantiated simulation entity, if instantiation has happened.
    pub entity: Option<Entity>,
    /// Replicated motion state: written by input sampling or inbound sync
    /// packets, read every tick by the movement step.
    pub shared: SharedPlayerState,
    /// Movement-internal state owned by this core.
    pub movement: MovementState,
}

impl Player {
    fn new(id: i32, spawn_slot: u32) -> Self {
        Self {
            id,
            peer: None,
            spawn_slot,
            entity: None,
            shared: SharedPlayerState::default(),
            movement: MovementState::default(),
        }
    }
}

/// Deterministic per-seat offset from the spawn origin: seat 0 sits on the
/// origin, later seats are spaced on a ring at 45° steps.
pub fn slot_offset(slot: u32, radius: f32) -> Vec3 {
    if slot == 0 {
        return Vec3::ZERO;
    }
    let angle = slot as f32 * (std::f32::consts::TAU / 8.0);
    Vec3::new(angle.cos(), 0.0, angle.sin()) * radius
}

/// Owns every [`Player`] record for the session.
pub struct SessionManager {
    players: HashMap<i32, Player>,
    peer_index: HashMap<PeerId, i32>,
    local_id: Option<i32>,
    template: Option<Entity>,
    spawn_origin: Vec3,
    ring_radius: f32,
}

impl SessionManager {
    /// Creates an empty session. `ring_radius` spaces the spawn seats.
    pub fn new(ring_radius: f32) -> Self {
        Self {
            players: HashMap::new(),
            peer_index: HashMap::new(),
            local_id: None,
            template: None,
            spawn_origin: Vec3::ZERO,
            ring_radius,
        }
    }

    /// The spawn position for a seat.
    pub fn spawn_position(&self, slot: u32) -> Vec3 {
        self.spawn_origin + slot_offset(slot, self.ring_radius)
    }

    /// Idempotent upsert of the record for `id`.
    ///
    /// First creation allocates the next spawn slot and seeds the shared
    /// position at the seat. If a player template is bound and the record
    /// has no entity yet, the entity is instantiated and registered under
    /// `(Player, id)`. A `peer` binding, when given, is applied on both
    /// create and update.
    pub fn create_or_update<'s>(
        &'s mut self,
        id: i32,
        peer: Option<PeerId>,
        registry: &mut IdentityRegistry,
        sim: &mut dyn Simulation,
    ) -> &'s mut Player {
        let next_slot = self
            .players
            .values()
            .map(|p| p.spawn_slot + 1)
            .max()
            .unwrap_or(0);
        let spawn_origin = self.spawn_origin;
        let ring_radius = self.ring_radius;

        let player = match self.players.entry(id) {
            Entry::Vacant(entry) => {
                info!("creating player {id} in spawn slot {next_slot}");
                let mut player = Player::new(id, next_slot);
                player.shared.position = spawn_origin + slot_offset(next_slot, ring_radius);
                entry.insert(player)
            }
            Entry::Occupied(entry) => {
                info!("updating player {id}");
                entry.into_mut()
            }
        };

        if let Some(peer) = peer {
            player.peer = Some(peer);
            self.peer_index.insert(peer, id);
        }

        if let Some(template) = self.template
            && player.entity.is_none()
        {
            Self::instantiate(player, template, registry, sim);
        }

        player
    }

    fn instantiate(
        player: &mut Player,
        template: Entity,
        registry: &mut IdentityRegistry,
        sim: &mut dyn Simulation,
    ) {
        let at = player.shared.position;
        info!("instantiating player {} at {at}", player.id);
        let entity = sim.instantiate_player(template, at);
        registry.register(IdentityKind::Player, player.id, entity);
        player.entity = Some(entity);
        player.movement.position = at;
        player.movement.teleport_next = true;
    }

    /// Removes the record for `id`, destroying its simulation entity and
    /// evicting it from both indices.
    ///
    /// # Panics
    ///
    /// Panics if `id` has no record. Callers check existence first; an
    /// unknown id here means the session bookkeeping has desynced.
    pub fn remove(&mut self, id: i32, registry: &mut IdentityRegistry, sim: &mut dyn Simulation) {
        let player = self
            .players
            .remove(&id)
            .unwrap_or_else(|| panic!("removed unknown player {id}"));
        info!("destroying player {id}");
        if let Some(peer) = player.peer {
            self.peer_index.remove(&peer);
        }
        if let Some(entity) = player.entity {
            sim.destroy_entity(entity);
        }
        registry.unregister(IdentityKind::Player, id);
    }

    /// Looks a player up by network id.
    pub fn get(&self, id: i32) -> Option<&Player> {
        self.players.get(&id)
    }

    /// Mutable lookup by network id.
    pub fn get_mut(&mut self, id: i32) -> Option<&mut Player> {
        self.players.get_mut(&id)
    }

    /// Looks a player up by transport identity.
    pub fn get_by_peer(&self, peer: PeerId) -> Option<&Player> {
        self.peer_index.get(&peer).and_then(|id| self.players.get(id))
    }

    /// Marks which player id is "self" for input routing.
    pub fn set_local(&mut self, id: i32) {
        self.local_id = Some(id);
        info!("local player set to {id}");
    }

    /// The local player id, once one has been assigned.
    pub fn local_id(&self) -> Option<i32> {
        self.local_id
    }

    /// Returns `true` if `id` is the local player.
    pub fn is_local(&self, id: i32) -> bool {
        self.local_id == Some(id)
    }

    /// The local player record, if it exists.
    pub fn local_player(&self) -> Option<&Player> {
        self.local_id.and_then(|id| self.players.get(&id))
    }

    /// Iterates every player record.
    pub fn players(&self) -> impl Iterator<Item = &Player> {
        self.players.values()
    }

    /// Iterates every player record mutably.
    pub fn players_mut(&mut self) -> impl Iterator<Item = &mut Player> {
        self.players.values_mut()
    }

    /// Number of player records.
    pub fn len(&self) -> usize {
        self.players.len()
    }

    /// Returns `true` when no players exist.
    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    /// Allocates a random player id not currently in use (host side).
    pub fn generate_id(&self) -> i32 {
        let mut rng = rand::rng();
        loop {
            let id = rng.random_range(0..i32::MAX);
            if !self.players.contains_key(&id) {
                return id;
            }
        }
    }

    /// Hot-swaps the instantiable player template.
    ///
    /// Binding a template re-instantiates every record against it at its
    /// seat position (destroying any previous entity). Clearing it stops
    /// new instantiation without touching existing entities.
    pub fn rebind_entity_template(
        &mut self,
        template: Option<Entity>,
        registry: &mut IdentityRegistry,
        sim: &mut dyn Simulation,
    ) {
        self.template = template;
        let Some(template) = template else {
            return;
        };
        info!("player template bound; re-instantiating {} players", self.players.len());
        let spawn_origin = self.spawn_origin;
        let ring_radius = self.ring_radius;
        for player in self.players.values_mut() {
            if let Some(old) = player.entity.take() {
                sim.destroy_entity(old);
            }
            player.shared.position = spawn_origin + slot_offset(player.spawn_slot, ring_radius);
            Self::instantiate(player, template, registry, sim);
        }
    }

    /// Moves the spawn origin, repositioning every instantiated player onto
    /// its seat relative to the new origin.
    pub fn set_spawn_origin(&mut self, origin: Vec3, sim: &mut dyn Simulation) {
        self.spawn_origin = origin;
        let ring_radius = self.ring_radius;
        for player in self.players.values_mut() {
            if let Some(entity) = player.entity {
                let at = origin + slot_offset(player.spawn_slot, ring_radius);
                sim.set_position(entity, at);
                player.movement.position = at;
            }
        }
    }

    /// Destroys every player record and simulation entity (session
    /// teardown). The template binding and local id survive.
    pub fn clear(&mut self, registry: &mut IdentityRegistry, sim: &mut dyn Simulation) {
        for (id, player) in self.players.drain() {
            if let Some(entity) = player.entity {
                sim.destroy_entity(entity);
            }
            registry.unregister(IdentityKind::Player, id);
        }
        self.peer_index.clear();
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
