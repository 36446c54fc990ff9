//! Wire protocol for the Rampart multiplayer layer: the closed packet set,
//! the explicit field-order byte codec, and the cross-peer identity scheme.
//!
//! Every packet serializes as a flat field sequence through the primitive
//! writers in [`wire`]. The packet type tag travels in the channel envelope,
//! never inside the payload itself.

pub mod identity;
pub mod packets;
pub mod wire;

pub use identity::{Identity, IdentityKind};
pub use packets::{
    ApprovalPacket, BalancePacket, BuildOrUpgradePacket, CommandAddPacket,
    CommandHoldPositionPacket, CommandPlacePacket, DamagePacket, DayNightPacket, DisconnectPacket,
    DisconnectReason, EnemySpawnPacket, HealPacket, ManualAttackPacket, Packet, PacketKind,
    PeerSyncPacket, Perk, PlayerRoster, PlayerSyncPacket, PositionPacket, RespawnPacket,
    ScaleHpPacket, SharedPlayerState, SpawnCoinPacket, TransitionToScenePacket, UnitOrder,
};
pub use wire::{WireError, WireReader, WireWriter};

/// Current multiplayer protocol version. Peers advertising a different
/// version are rejected during approval.
pub const PROTOCOL_VERSION: u32 = 1;
