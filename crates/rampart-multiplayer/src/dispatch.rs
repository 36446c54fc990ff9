//! Inbound packet routing: type tag → handler.
//!
//! The receive path never raises to the caller. Unknown tags and malformed
//! payloads are logged and dropped; handlers whose target entity is gone
//! no-op, because the entity may have been legitimately destroyed between
//! send and receive. Handlers run synchronously on the control thread and
//! may themselves send packets (approval rejection sends a disconnect).

use std::collections::HashMap;

use rampart_config::Config;
use rampart_protocol::{
    DisconnectReason, IdentityKind, Packet, PacketKind, PeerSyncPacket, PlayerRoster,
};
use tracing::{info, warn};

use crate::registry::IdentityRegistry;
use crate::session::SessionManager;
use crate::sim::Simulation;
use crate::transport::{PeerId, Transport};

// ---------------------------------------------------------------------------
// Context
// ---------------------------------------------------------------------------

/// Connection-side flags that outlive any single packet.
#[derive(Debug, Default)]
pub struct ClientState {
    /// Set while our own join request is pending host approval. The first
    /// roster packet clears it and pulls us into the level-select scene.
    pub awaiting_approval: bool,
}

/// Everything a handler may touch, borrowed for one dispatch call.
pub struct Context<'a> {
    pub session: &'a mut SessionManager,
    pub registry: &'a mut IdentityRegistry,
    pub state: &'a mut ClientState,
    pub config: &'a Config,
    pub sim: &'a mut dyn Simulation,
    pub transport: &'a mut dyn Transport,
}

// ---------------------------------------------------------------------------
// PacketRouter
// ---------------------------------------------------------------------------

type HandlerFn = fn(&mut Context<'_>, PeerId, Packet);

/// Maps packet kinds to handler functions.
pub struct PacketRouter {
    handlers: HashMap<PacketKind, HandlerFn>,
}

impl PacketRouter {
    /// Builds the router with every packet kind wired up.
    pub fn new() -> Self {
        let mut handlers: HashMap<PacketKind, HandlerFn> = HashMap::new();
        handlers.insert(PacketKind::Approval, handle_approval);
        handlers.insert(PacketKind::Disconnect, handle_disconnect);
        handlers.insert(PacketKind::PeerSync, handle_peer_sync);
        handlers.insert(PacketKind::Balance, handle_balance);
        handlers.insert(PacketKind::BuildOrUpgrade, handle_build_or_upgrade);
        handlers.insert(PacketKind::CommandAdd, handle_command_add);
        handlers.insert(PacketKind::CommandPlace, handle_command_place);
        handlers.insert(PacketKind::CommandHoldPosition, handle_command_hold_position);
        handlers.insert(PacketKind::Damage, handle_damage);
        handlers.insert(PacketKind::DayNight, handle_day_night);
        handlers.insert(PacketKind::EnemySpawn, handle_enemy_spawn);
        handlers.insert(PacketKind::Heal, handle_heal);
        handlers.insert(PacketKind::ManualAttack, handle_manual_attack);
        handlers.insert(PacketKind::PlayerSync, handle_player_sync);
        handlers.insert(PacketKind::Position, handle_position);
        handlers.insert(PacketKind::Respawn, handle_respawn);
        handlers.insert(PacketKind::ScaleHp, handle_scale_hp);
        handlers.insert(PacketKind::TransitionToScene, handle_transition_to_scene);
        handlers.insert(PacketKind::SpawnCoin, handle_spawn_coin);
        Self { handlers }
    }

    /// Decodes and dispatches one inbound message. `tag` comes from the
    /// channel envelope, `payload` is the raw field sequence.
    pub fn handle(&self, ctx: &mut Context<'_>, sender: PeerId, tag: u8, payload: &[u8]) {
        let Some(kind) = PacketKind::from_tag(tag) else {
            warn!("no handler for packet tag {tag}");
            return;
        };
        let packet = match Packet::decode_payload(kind, payload) {
            Ok(packet) => packet,
            Err(err) => {
                warn!("dropping malformed {kind:?} packet from {sender}: {err}");
                return;
            }
        };
        self.handle_packet(ctx, sender, packet);
    }

    /// Dispatches an already-decoded packet.
    pub fn handle_packet(&self, ctx: &mut Context<'_>, sender: PeerId, packet: Packet) {
        match self.handlers.get(&packet.kind()) {
            Some(handler) => handler(ctx, sender, packet),
            None => warn!("no handler for packet {:?}", packet.kind()),
        }
    }
}

impl Default for PacketRouter {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Connection lifecycle
// ---------------------------------------------------------------------------

fn authenticate(configured: &str, supplied: &str) -> bool {
    configured.is_empty() || configured == supplied
}

fn handle_approval(ctx: &mut Context<'_>, sender: PeerId, packet: Packet) {
    let Packet::Approval(packet) = packet else {
        return;
    };
    info!("handling approval of {sender}");
    if !packet.same_version {
        info!("{sender} has wrong version");
        ctx.transport.kick(sender, DisconnectReason::WrongVersion);
        return;
    }
    if !authenticate(&ctx.config.network.password, &packet.password) {
        info!("authentication of {sender} failed");
        ctx.transport.kick(sender, DisconnectReason::WrongPassword);
        return;
    }

    info!("{sender} authenticated");
    let id = ctx.session.generate_id();
    ctx.session
        .create_or_update(id, Some(sender), ctx.registry, ctx.sim);

    // Every connected peer gets a personalized roster: its own id plus the
    // position of everyone currently in the session.
    let roster: Vec<PlayerRoster> = ctx
        .session
        .players()
        .map(|p| PlayerRoster {
            id: p.id,
            position: p.shared.position,
        })
        .collect();
    let targets: Vec<(PeerId, i32)> = ctx
        .session
        .players()
        .filter_map(|p| p.peer.map(|peer| (peer, p.id)))
        .collect();
    for (peer, local_player) in targets {
        let packet = Packet::PeerSync(PeerSyncPacket {
            local_player,
            players: roster.clone(),
        });
        ctx.transport.send(peer, &packet);
    }
}

fn handle_disconnect(ctx: &mut Context<'_>, _sender: PeerId, packet: Packet) {
    let Packet::Disconnect(packet) = packet else {
        return;
    };
    ctx.state.awaiting_approval = false;
    info!("disconnected with reason {:?}", packet.reason);
    ctx.sim
        .show_disconnect_dialog("Disconnected", packet.reason.message());
}

fn handle_peer_sync(ctx: &mut Context<'_>, _sender: PeerId, packet: Packet) {
    let Packet::PeerSync(packet) = packet else {
        return;
    };
    if ctx.state.awaiting_approval {
        // Joining from the menu; pull the peer into level select first.
        ctx.sim.transition_to_level_select();
        ctx.state.awaiting_approval = false;
    }

    info!("received player list");
    ctx.session.set_local(packet.local_player);
    for data in &packet.players {
        let player = ctx
            .session
            .create_or_update(data.id, None, ctx.registry, ctx.sim);
        player.shared.position = data.position;
        player.movement.position = data.position;
        if let Some(entity) = player.entity {
            ctx.sim.set_position(entity, data.position);
        }
    }
}

// ---------------------------------------------------------------------------
// State replication
// ---------------------------------------------------------------------------

fn handle_player_sync(ctx: &mut Context<'_>, _sender: PeerId, packet: Packet) {
    let Packet::PlayerSync(packet) = packet else {
        return;
    };
    if let Some(player) = ctx.session.get_mut(packet.player_id) {
        player.shared = packet.data;
    }
}

fn handle_position(ctx: &mut Context<'_>, _sender: PeerId, packet: Packet) {
    let Packet::Position(packet) = packet else {
        return;
    };
    if let Some(target) = ctx.registry.resolve_identity(packet.target) {
        ctx.sim.set_position(target, packet.position);
    }
}

fn handle_balance(ctx: &mut Context<'_>, _sender: PeerId, packet: Packet) {
    let Packet::Balance(packet) = packet else {
        return;
    };
    ctx.sim.adjust_balance(packet.delta);
    let local = ctx.session.local_player().and_then(|p| p.entity);
    if let Some(player) = local {
        ctx.sim.balance_feedback(player, packet.delta);
    }
}

fn handle_scale_hp(ctx: &mut Context<'_>, _sender: PeerId, packet: Packet) {
    let Packet::ScaleHp(packet) = packet else {
        return;
    };
    if let Some(target) = ctx.registry.resolve_identity(packet.target) {
        ctx.sim.scale_hp(target, packet.multiplier);
    }
}

// ---------------------------------------------------------------------------
// One-shot commands
// ---------------------------------------------------------------------------

fn handle_damage(ctx: &mut Context<'_>, _sender: PeerId, packet: Packet) {
    let Packet::Damage(packet) = packet else {
        return;
    };
    let Some(target) = ctx.registry.resolve_identity(packet.target) else {
        return;
    };
    let source = ctx.registry.resolve_identity(packet.source);
    ctx.sim.apply_damage(
        target,
        source,
        packet.damage,
        packet.caused_by_player,
        packet.invoke_feedback_events,
    );
}

fn handle_heal(ctx: &mut Context<'_>, _sender: PeerId, packet: Packet) {
    let Packet::Heal(packet) = packet else {
        return;
    };
    if let Some(target) = ctx.registry.resolve_identity(packet.target) {
        ctx.sim.apply_heal(target, packet.amount);
    }
}

fn handle_command_add(ctx: &mut Context<'_>, _sender: PeerId, packet: Packet) {
    let Packet::CommandAdd(packet) = packet else {
        return;
    };
    let Some(player) = ctx.session.get(packet.player).and_then(|p| p.entity) else {
        return;
    };
    for unit in &packet.units {
        if let Some(unit) = ctx.registry.resolve_identity(*unit) {
            ctx.sim.command_add_unit(player, unit);
        }
    }
}

fn handle_command_place(ctx: &mut Context<'_>, _sender: PeerId, packet: Packet) {
    let Packet::CommandPlace(packet) = packet else {
        return;
    };
    let Some(player) = ctx.session.get(packet.player).and_then(|p| p.entity) else {
        return;
    };
    ctx.sim
        .command_emit_waypoint(player, !packet.units.is_empty());
    for order in &packet.units {
        if let Some(unit) = ctx.registry.resolve_identity(order.unit) {
            ctx.sim.command_place_unit(player, unit, order.home);
        }
    }
}

fn handle_command_hold_position(ctx: &mut Context<'_>, _sender: PeerId, packet: Packet) {
    let Packet::CommandHoldPosition(packet) = packet else {
        return;
    };
    let Some(player) = ctx.session.get(packet.player).and_then(|p| p.entity) else {
        return;
    };
    if !packet.units.is_empty() {
        ctx.sim.play_hold_sound(player);
    }
    for order in &packet.units {
        if let Some(unit) = ctx.registry.resolve_identity(order.unit) {
            ctx.sim.command_hold_position(unit, order.home);
        }
    }
}

fn handle_manual_attack(ctx: &mut Context<'_>, _sender: PeerId, packet: Packet) {
    let Packet::ManualAttack(packet) = packet else {
        return;
    };
    if let Some(player) = ctx.session.get(packet.player).and_then(|p| p.entity) {
        ctx.sim.trigger_manual_attack(player);
    }
}

fn handle_spawn_coin(ctx: &mut Context<'_>, _sender: PeerId, packet: Packet) {
    let Packet::SpawnCoin(packet) = packet else {
        return;
    };
    if let Some(player) = ctx.session.get(packet.player).and_then(|p| p.entity) {
        ctx.sim.spawn_coin(packet.position, packet.rotation, player);
    }
}

fn handle_build_or_upgrade(ctx: &mut Context<'_>, _sender: PeerId, packet: Packet) {
    let Packet::BuildOrUpgrade(packet) = packet else {
        return;
    };
    ctx.sim
        .upgrade_building(packet.building_id, packet.level, packet.choice);
}

// ---------------------------------------------------------------------------
// World/scene events
// ---------------------------------------------------------------------------

fn handle_day_night(ctx: &mut Context<'_>, _sender: PeerId, packet: Packet) {
    let Packet::DayNight(packet) = packet else {
        return;
    };
    if packet.night {
        ctx.sim.trigger_night_fall();
    }
}

fn handle_enemy_spawn(ctx: &mut Context<'_>, _sender: PeerId, packet: Packet) {
    let Packet::EnemySpawn(packet) = packet else {
        return;
    };
    if let Some(entity) =
        ctx.sim
            .spawn_enemy(packet.wave, packet.spawn, packet.position, packet.coins)
    {
        ctx.registry
            .register(IdentityKind::Enemy, packet.id, entity);
    }
}

fn handle_respawn(ctx: &mut Context<'_>, _sender: PeerId, packet: Packet) {
    let Packet::Respawn(packet) = packet else {
        return;
    };
    let Some(target) = ctx.registry.resolve_identity(packet.target) else {
        return;
    };
    match packet.target.kind {
        IdentityKind::Ally => ctx.sim.revive_unit(target, packet.position),
        kind => {
            warn!(
                "received unhandled respawn packet for {kind:?}:{}",
                packet.target.id
            );
        }
    }
    ctx.sim.set_position(target, packet.position);
}

fn handle_transition_to_scene(ctx: &mut Context<'_>, _sender: PeerId, packet: Packet) {
    let Packet::TransitionToScene(packet) = packet else {
        return;
    };
    ctx.sim.equip_perks(&packet.perks);
    info!("loading level {}", packet.level);
    ctx.sim
        .load_level(&packet.level, &packet.coming_from_gameplay_scene);
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
#[path = "dispatch_tests.rs"]
mod tests;
