//! Inward boundary onto the simulation/rendering engine.
//!
//! The engine owns object instantiation, physics, animation, scenes, and
//! UI. Handlers call through this trait synchronously; every call is
//! non-blocking state mutation on the engine side. Entities are named by
//! [`Entity`] handles the engine allocated.

use bevy_ecs::entity::Entity;
use glam::{Quat, Vec3};
use rampart_protocol::Perk;

/// Synchronous calls into the externally-owned simulation.
pub trait Simulation {
    /// Clones the player template into the world at `position` and returns
    /// the new entity.
    fn instantiate_player(&mut self, template: Entity, position: Vec3) -> Entity;

    /// Destroys an entity and its engine-side resources.
    fn destroy_entity(&mut self, entity: Entity);

    /// Moves an entity to an absolute position.
    fn set_position(&mut self, entity: Entity, position: Vec3);

    /// Loads a gameplay level, recording which gameplay scene it was
    /// entered from.
    fn load_level(&mut self, level: &str, coming_from: &str);

    /// Returns to the level-select scene (used when a join is approved
    /// mid-menu).
    fn transition_to_level_select(&mut self);

    /// Replaces the equipped perk set.
    fn equip_perks(&mut self, perks: &[Perk]);

    /// Applies damage to `target`. `source` may be gone already.
    fn apply_damage(
        &mut self,
        target: Entity,
        source: Option<Entity>,
        amount: f32,
        caused_by_player: bool,
        invoke_feedback: bool,
    );

    /// Heals `target` by `amount`.
    fn apply_heal(&mut self, target: Entity, amount: f32);

    /// Multiplies `target`'s max health.
    fn scale_hp(&mut self, target: Entity, multiplier: f32);

    /// Builds or upgrades the building in `building_id`'s slot to `level`,
    /// taking upgrade branch `choice`.
    fn upgrade_building(&mut self, building_id: i32, level: i32, choice: i32);

    /// Starts the nightfall transition.
    fn trigger_night_fall(&mut self);

    /// Spawns an enemy for `wave` at spawn point `spawn`. Returns `None`
    /// when the spawner is unavailable (e.g., between levels).
    fn spawn_enemy(&mut self, wave: i32, spawn: i32, position: Vec3, coins: i32) -> Option<Entity>;

    /// Revives a downed allied unit at `position`.
    fn revive_unit(&mut self, unit: Entity, position: Vec3);

    /// Adds a unit to `player`'s command group.
    fn command_add_unit(&mut self, player: Entity, unit: Entity);

    /// Emits the waypoint marker for a placement order.
    fn command_emit_waypoint(&mut self, player: Entity, has_units: bool);

    /// Sends a commanded unit to a new home position.
    fn command_place_unit(&mut self, player: Entity, unit: Entity, home: Vec3);

    /// Orders a unit to hold at a position.
    fn command_hold_position(&mut self, unit: Entity, home: Vec3);

    /// Plays the hold-position confirmation sound at `player`.
    fn play_hold_sound(&mut self, player: Entity);

    /// Fires `player`'s equipped weapon.
    fn trigger_manual_attack(&mut self, player: Entity);

    /// Applies an economy delta to the shared balance (positive deltas also
    /// count toward networth).
    fn adjust_balance(&mut self, delta: i32);

    /// Plays the gain/spend feedback on the local player for a delta.
    fn balance_feedback(&mut self, player: Entity, delta: i32);

    /// Spawns a coin pickup that homes toward `collector`.
    fn spawn_coin(&mut self, position: Vec3, rotation: Quat, collector: Entity);

    /// Shows the disconnect dialog.
    fn show_disconnect_dialog(&mut self, title: &str, message: &str);
}
