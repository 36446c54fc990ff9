//! The closed packet set.
//!
//! Each variant carries a stable numeric tag ([`PacketKind`]) and encodes
//! its payload as a flat field sequence in declared order. The tag itself
//! travels in the channel envelope; [`Packet::decode_payload`] is handed the
//! already-resolved kind together with the raw payload bytes.
//!
//! Three consistency shapes exist among the gameplay packets: latest-value
//! state replication (PlayerSync, Position, Balance, ScaleHp), one-shot
//! commands that no-op when their target is gone (the command/damage/heal
//! family), and world events that trigger engine-owned side effects
//! (DayNight, EnemySpawn, TransitionToScene, Respawn).

use glam::{Quat, Vec2, Vec3};

use crate::identity::Identity;
use crate::wire::{WireError, WireReader, WireWriter};

// ---------------------------------------------------------------------------
// PacketKind
// ---------------------------------------------------------------------------

/// Stable numeric type tag, one per packet variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum PacketKind {
    Approval = 0,
    Disconnect = 1,
    PeerSync = 2,
    Balance = 3,
    BuildOrUpgrade = 4,
    CommandAdd = 5,
    CommandPlace = 6,
    CommandHoldPosition = 7,
    Damage = 8,
    DayNight = 9,
    EnemySpawn = 10,
    Heal = 11,
    ManualAttack = 12,
    PlayerSync = 13,
    Position = 14,
    Respawn = 15,
    ScaleHp = 16,
    TransitionToScene = 17,
    SpawnCoin = 18,
}

impl PacketKind {
    /// The wire tag for this kind.
    pub fn tag(self) -> u8 {
        self as u8
    }

    /// Resolves a wire tag. Unknown tags yield `None`; the receive path
    /// logs and drops those rather than failing.
    pub fn from_tag(tag: u8) -> Option<Self> {
        match tag {
            0 => Some(Self::Approval),
            1 => Some(Self::Disconnect),
            2 => Some(Self::PeerSync),
            3 => Some(Self::Balance),
            4 => Some(Self::BuildOrUpgrade),
            5 => Some(Self::CommandAdd),
            6 => Some(Self::CommandPlace),
            7 => Some(Self::CommandHoldPosition),
            8 => Some(Self::Damage),
            9 => Some(Self::DayNight),
            10 => Some(Self::EnemySpawn),
            11 => Some(Self::Heal),
            12 => Some(Self::ManualAttack),
            13 => Some(Self::PlayerSync),
            14 => Some(Self::Position),
            15 => Some(Self::Respawn),
            16 => Some(Self::ScaleHp),
            17 => Some(Self::TransitionToScene),
            18 => Some(Self::SpawnCoin),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Supporting wire types
// ---------------------------------------------------------------------------

/// Why a peer was disconnected. Carried by [`DisconnectPacket`] and passed
/// to the transport when kicking.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum DisconnectReason {
    /// The host removed the peer.
    Kicked = 0,
    /// Approval failed the shared-secret check.
    WrongPassword = 1,
    /// Approval failed the protocol version check.
    WrongVersion = 2,
}

impl DisconnectReason {
    fn from_tag(tag: u8) -> Option<Self> {
        match tag {
            0 => Some(Self::Kicked),
            1 => Some(Self::WrongPassword),
            2 => Some(Self::WrongVersion),
            _ => None,
        }
    }

    /// Human-readable text for the disconnect dialog.
    pub fn message(self) -> &'static str {
        match self {
            Self::Kicked => "You were kicked!",
            Self::WrongPassword => "You gave the wrong password.",
            Self::WrongVersion => "Different multiplayer version.",
        }
    }
}

/// An equippable perk, replicated so every peer simulates with the same
/// modifiers. The movement step consumes HeavyArmor and RacingHorse.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Perk {
    HeavyArmor = 0,
    RacingHorse = 1,
}

impl Perk {
    fn from_tag(tag: u8) -> Option<Self> {
        match tag {
            0 => Some(Self::HeavyArmor),
            1 => Some(Self::RacingHorse),
            _ => None,
        }
    }
}

/// One roster entry in a [`PeerSyncPacket`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlayerRoster {
    /// Network-wide player id.
    pub id: i32,
    /// Position to materialize the player at.
    pub position: Vec3,
}

/// One unit order entry in the command packets.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UnitOrder {
    /// The unit being ordered.
    pub unit: Identity,
    /// Home position the order anchors to.
    pub home: Vec3,
}

/// Replicated per-player motion state.
///
/// Written by local input sampling on the owning machine and by inbound
/// `PlayerSync`/`PeerSync` packets everywhere else; read every simulation
/// tick by the movement step.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SharedPlayerState {
    /// Movement input: x strafes right, y moves forward.
    pub move_axes: Vec2,
    /// Sprint toggle button state this tick.
    pub sprint_toggle: bool,
    /// Sprint hold button state this tick.
    pub sprint_held: bool,
    /// Authoritative position as last published by the owner.
    pub position: Vec3,
}

impl SharedPlayerState {
    fn encode(&self, w: &mut WireWriter) {
        w.put_vec2(self.move_axes);
        w.put_bool(self.sprint_toggle);
        w.put_bool(self.sprint_held);
        w.put_vec3(self.position);
    }

    fn decode(r: &mut WireReader<'_>) -> Result<Self, WireError> {
        Ok(Self {
            move_axes: r.get_vec2()?,
            sprint_toggle: r.get_bool()?,
            sprint_held: r.get_bool()?,
            position: r.get_vec3()?,
        })
    }
}

// Lists cap their pre-allocation; a hostile length prefix then fails on
// the first short read instead of reserving the claimed amount.
fn read_list<T>(
    r: &mut WireReader<'_>,
    mut elem: impl FnMut(&mut WireReader<'_>) -> Result<T, WireError>,
) -> Result<Vec<T>, WireError> {
    let count = r.get_u32()? as usize;
    let mut items = Vec::with_capacity(count.min(256));
    for _ in 0..count {
        items.push(elem(r)?);
    }
    Ok(items)
}

// ---------------------------------------------------------------------------
// Connection lifecycle packets
// ---------------------------------------------------------------------------

/// Join request from a connecting peer. The sender compares its own
/// protocol version against the host's advertised one and reports the
/// result, alongside the lobby password.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ApprovalPacket {
    /// Whether the sender's protocol version matches the host's.
    pub same_version: bool,
    /// Shared secret for the lobby.
    pub password: String,
}

impl ApprovalPacket {
    pub const KIND: PacketKind = PacketKind::Approval;

    fn encode(&self, w: &mut WireWriter) {
        w.put_bool(self.same_version);
        w.put_str(&self.password);
    }

    fn decode(r: &mut WireReader<'_>) -> Result<Self, WireError> {
        Ok(Self {
            same_version: r.get_bool()?,
            password: r.get_str()?,
        })
    }
}

/// Typed rejection/removal notice. The receiving peer surfaces the reason
/// in a dialog and tears its session down.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisconnectPacket {
    /// Why the connection ended.
    pub reason: DisconnectReason,
}

impl DisconnectPacket {
    pub const KIND: PacketKind = PacketKind::Disconnect;

    fn encode(&self, w: &mut WireWriter) {
        w.put_u8(self.reason as u8);
    }

    fn decode(r: &mut WireReader<'_>) -> Result<Self, WireError> {
        let raw = r.get_u8()?;
        let reason = DisconnectReason::from_tag(raw).ok_or(WireError::InvalidDiscriminant {
            what: "DisconnectReason",
            value: raw,
        })?;
        Ok(Self { reason })
    }
}

/// Host → peer roster snapshot: the recipient's own id plus the position of
/// every connected player, so a fresh peer materializes everyone correctly.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PeerSyncPacket {
    /// The recipient's own player id.
    pub local_player: i32,
    /// Every connected player.
    pub players: Vec<PlayerRoster>,
}

impl PeerSyncPacket {
    pub const KIND: PacketKind = PacketKind::PeerSync;

    fn encode(&self, w: &mut WireWriter) {
        w.put_i32(self.local_player);
        w.put_u32(self.players.len() as u32);
        for p in &self.players {
            w.put_i32(p.id);
            w.put_vec3(p.position);
        }
    }

    fn decode(r: &mut WireReader<'_>) -> Result<Self, WireError> {
        let local_player = r.get_i32()?;
        let players = read_list(r, |r| {
            Ok(PlayerRoster {
                id: r.get_i32()?,
                position: r.get_vec3()?,
            })
        })?;
        Ok(Self {
            local_player,
            players,
        })
    }
}

// ---------------------------------------------------------------------------
// Gameplay packets
// ---------------------------------------------------------------------------

/// Economy delta applied to the shared balance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BalancePacket {
    /// Signed change; positive also counts toward networth.
    pub delta: i32,
}

impl BalancePacket {
    pub const KIND: PacketKind = PacketKind::Balance;

    fn encode(&self, w: &mut WireWriter) {
        w.put_i32(self.delta);
    }

    fn decode(r: &mut WireReader<'_>) -> Result<Self, WireError> {
        Ok(Self {
            delta: r.get_i32()?,
        })
    }
}

/// Build or upgrade choice made on a building slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BuildOrUpgradePacket {
    /// Building slot id.
    pub building_id: i32,
    /// Target level.
    pub level: i32,
    /// Upgrade branch chosen at that level.
    pub choice: i32,
}

impl BuildOrUpgradePacket {
    pub const KIND: PacketKind = PacketKind::BuildOrUpgrade;

    fn encode(&self, w: &mut WireWriter) {
        w.put_i32(self.building_id);
        w.put_i32(self.level);
        w.put_i32(self.choice);
    }

    fn decode(r: &mut WireReader<'_>) -> Result<Self, WireError> {
        Ok(Self {
            building_id: r.get_i32()?,
            level: r.get_i32()?,
            choice: r.get_i32()?,
        })
    }
}

/// Adds units to a player's command group.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CommandAddPacket {
    /// Commanding player id.
    pub player: i32,
    /// Units joining the group.
    pub units: Vec<Identity>,
}

impl CommandAddPacket {
    pub const KIND: PacketKind = PacketKind::CommandAdd;

    fn encode(&self, w: &mut WireWriter) {
        w.put_i32(self.player);
        w.put_u32(self.units.len() as u32);
        for unit in &self.units {
            w.put_identity(*unit);
        }
    }

    fn decode(r: &mut WireReader<'_>) -> Result<Self, WireError> {
        Ok(Self {
            player: r.get_i32()?,
            units: read_list(r, |r| r.get_identity())?,
        })
    }
}

fn encode_unit_orders(player: i32, units: &[UnitOrder], w: &mut WireWriter) {
    w.put_i32(player);
    w.put_u32(units.len() as u32);
    for order in units {
        w.put_identity(order.unit);
        w.put_vec3(order.home);
    }
}

fn decode_unit_orders(r: &mut WireReader<'_>) -> Result<(i32, Vec<UnitOrder>), WireError> {
    let player = r.get_i32()?;
    let units = read_list(r, |r| {
        Ok(UnitOrder {
            unit: r.get_identity()?,
            home: r.get_vec3()?,
        })
    })?;
    Ok((player, units))
}

/// Places commanded units at new home positions.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CommandPlacePacket {
    /// Commanding player id.
    pub player: i32,
    /// Units and their new homes.
    pub units: Vec<UnitOrder>,
}

impl CommandPlacePacket {
    pub const KIND: PacketKind = PacketKind::CommandPlace;

    fn encode(&self, w: &mut WireWriter) {
        encode_unit_orders(self.player, &self.units, w);
    }

    fn decode(r: &mut WireReader<'_>) -> Result<Self, WireError> {
        let (player, units) = decode_unit_orders(r)?;
        Ok(Self { player, units })
    }
}

/// Orders commanded units to hold at their home positions.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CommandHoldPositionPacket {
    /// Commanding player id.
    pub player: i32,
    /// Units and the positions they hold.
    pub units: Vec<UnitOrder>,
}

impl CommandHoldPositionPacket {
    pub const KIND: PacketKind = PacketKind::CommandHoldPosition;

    fn encode(&self, w: &mut WireWriter) {
        encode_unit_orders(self.player, &self.units, w);
    }

    fn decode(r: &mut WireReader<'_>) -> Result<Self, WireError> {
        let (player, units) = decode_unit_orders(r)?;
        Ok(Self { player, units })
    }
}

/// Applies damage to a named entity.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct DamagePacket {
    /// Entity taking the damage.
    pub target: Identity,
    /// Entity that dealt it; may be invalid if the source is gone.
    pub source: Identity,
    /// Damage amount.
    pub damage: f32,
    /// Whether a player action caused it (scoring).
    pub caused_by_player: bool,
    /// Whether hit feedback (sounds, flashes) should fire.
    pub invoke_feedback_events: bool,
}

impl DamagePacket {
    pub const KIND: PacketKind = PacketKind::Damage;

    fn encode(&self, w: &mut WireWriter) {
        w.put_identity(self.target);
        w.put_identity(self.source);
        w.put_f32(self.damage);
        w.put_bool(self.caused_by_player);
        w.put_bool(self.invoke_feedback_events);
    }

    fn decode(r: &mut WireReader<'_>) -> Result<Self, WireError> {
        Ok(Self {
            target: r.get_identity()?,
            source: r.get_identity()?,
            damage: r.get_f32()?,
            caused_by_player: r.get_bool()?,
            invoke_feedback_events: r.get_bool()?,
        })
    }
}

/// Day/night cycle event. Only the nightfall edge carries a side effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DayNightPacket {
    /// `true` when night is falling.
    pub night: bool,
}

impl DayNightPacket {
    pub const KIND: PacketKind = PacketKind::DayNight;

    fn encode(&self, w: &mut WireWriter) {
        w.put_bool(self.night);
    }

    fn decode(r: &mut WireReader<'_>) -> Result<Self, WireError> {
        Ok(Self {
            night: r.get_bool()?,
        })
    }
}

/// Host-ordered enemy spawn, with the id the new enemy must register under.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct EnemySpawnPacket {
    /// Wave the enemy belongs to.
    pub wave: i32,
    /// Spawn point index.
    pub spawn: i32,
    /// World position to spawn at.
    pub position: Vec3,
    /// Network id for the new enemy.
    pub id: i32,
    /// Coins dropped on death.
    pub coins: i32,
}

impl EnemySpawnPacket {
    pub const KIND: PacketKind = PacketKind::EnemySpawn;

    fn encode(&self, w: &mut WireWriter) {
        w.put_i32(self.wave);
        w.put_i32(self.spawn);
        w.put_vec3(self.position);
        w.put_i32(self.id);
        w.put_i32(self.coins);
    }

    fn decode(r: &mut WireReader<'_>) -> Result<Self, WireError> {
        Ok(Self {
            wave: r.get_i32()?,
            spawn: r.get_i32()?,
            position: r.get_vec3()?,
            id: r.get_i32()?,
            coins: r.get_i32()?,
        })
    }
}

/// Heals a named entity.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct HealPacket {
    /// Entity being healed.
    pub target: Identity,
    /// Heal amount.
    pub amount: f32,
}

impl HealPacket {
    pub const KIND: PacketKind = PacketKind::Heal;

    fn encode(&self, w: &mut WireWriter) {
        w.put_identity(self.target);
        w.put_f32(self.amount);
    }

    fn decode(r: &mut WireReader<'_>) -> Result<Self, WireError> {
        Ok(Self {
            target: r.get_identity()?,
            amount: r.get_f32()?,
        })
    }
}

/// A player triggered their equipped weapon manually.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ManualAttackPacket {
    /// Attacking player id.
    pub player: i32,
}

impl ManualAttackPacket {
    pub const KIND: PacketKind = PacketKind::ManualAttack;

    fn encode(&self, w: &mut WireWriter) {
        w.put_i32(self.player);
    }

    fn decode(r: &mut WireReader<'_>) -> Result<Self, WireError> {
        Ok(Self {
            player: r.get_i32()?,
        })
    }
}

/// Per-tick motion state for one player. Latest value wins.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PlayerSyncPacket {
    /// The player whose state this is.
    pub player_id: i32,
    /// The owner's current motion state.
    pub data: SharedPlayerState,
}

impl PlayerSyncPacket {
    pub const KIND: PacketKind = PacketKind::PlayerSync;

    fn encode(&self, w: &mut WireWriter) {
        w.put_i32(self.player_id);
        self.data.encode(w);
    }

    fn decode(r: &mut WireReader<'_>) -> Result<Self, WireError> {
        Ok(Self {
            player_id: r.get_i32()?,
            data: SharedPlayerState::decode(r)?,
        })
    }
}

/// Authoritative position for a named entity. Latest value wins.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PositionPacket {
    /// Entity to move.
    pub target: Identity,
    /// New position.
    pub position: Vec3,
}

impl PositionPacket {
    pub const KIND: PacketKind = PacketKind::Position;

    fn encode(&self, w: &mut WireWriter) {
        w.put_identity(self.target);
        w.put_vec3(self.position);
    }

    fn decode(r: &mut WireReader<'_>) -> Result<Self, WireError> {
        Ok(Self {
            target: r.get_identity()?,
            position: r.get_vec3()?,
        })
    }
}

/// Revives a named entity at a position.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RespawnPacket {
    /// Entity being revived.
    pub target: Identity,
    /// Respawn position.
    pub position: Vec3,
}

impl RespawnPacket {
    pub const KIND: PacketKind = PacketKind::Respawn;

    fn encode(&self, w: &mut WireWriter) {
        w.put_identity(self.target);
        w.put_vec3(self.position);
    }

    fn decode(r: &mut WireReader<'_>) -> Result<Self, WireError> {
        Ok(Self {
            target: r.get_identity()?,
            position: r.get_vec3()?,
        })
    }
}

/// Rescales a named entity's max health.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ScaleHpPacket {
    /// Entity to rescale.
    pub target: Identity,
    /// Multiplier applied to max health.
    pub multiplier: f32,
}

impl ScaleHpPacket {
    pub const KIND: PacketKind = PacketKind::ScaleHp;

    fn encode(&self, w: &mut WireWriter) {
        w.put_identity(self.target);
        w.put_f32(self.multiplier);
    }

    fn decode(r: &mut WireReader<'_>) -> Result<Self, WireError> {
        Ok(Self {
            target: r.get_identity()?,
            multiplier: r.get_f32()?,
        })
    }
}

/// Host-ordered scene transition with the perk loadout to equip.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TransitionToScenePacket {
    /// Level/scene to load.
    pub level: String,
    /// The gameplay scene being left, for the transition manager.
    pub coming_from_gameplay_scene: String,
    /// Perks every peer equips before the level starts.
    pub perks: Vec<Perk>,
}

impl TransitionToScenePacket {
    pub const KIND: PacketKind = PacketKind::TransitionToScene;

    fn encode(&self, w: &mut WireWriter) {
        w.put_str(&self.level);
        w.put_str(&self.coming_from_gameplay_scene);
        w.put_u32(self.perks.len() as u32);
        for perk in &self.perks {
            w.put_u8(*perk as u8);
        }
    }

    fn decode(r: &mut WireReader<'_>) -> Result<Self, WireError> {
        let level = r.get_str()?;
        let coming_from_gameplay_scene = r.get_str()?;
        let perks = read_list(r, |r| {
            let raw = r.get_u8()?;
            Perk::from_tag(raw).ok_or(WireError::InvalidDiscriminant {
                what: "Perk",
                value: raw,
            })
        })?;
        Ok(Self {
            level,
            coming_from_gameplay_scene,
            perks,
        })
    }
}

/// Spawns a coin pickup homing toward a player.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SpawnCoinPacket {
    /// Player the coin flies to.
    pub player: i32,
    /// Spawn position.
    pub position: Vec3,
    /// Spawn rotation.
    pub rotation: Quat,
}

impl SpawnCoinPacket {
    pub const KIND: PacketKind = PacketKind::SpawnCoin;

    fn encode(&self, w: &mut WireWriter) {
        w.put_i32(self.player);
        w.put_vec3(self.position);
        w.put_quat(self.rotation);
    }

    fn decode(r: &mut WireReader<'_>) -> Result<Self, WireError> {
        Ok(Self {
            player: r.get_i32()?,
            position: r.get_vec3()?,
            rotation: r.get_quat()?,
        })
    }
}

// ---------------------------------------------------------------------------
// Packet
// ---------------------------------------------------------------------------

/// A decoded packet of any kind.
#[derive(Debug, Clone, PartialEq)]
pub enum Packet {
    Approval(ApprovalPacket),
    Disconnect(DisconnectPacket),
    PeerSync(PeerSyncPacket),
    Balance(BalancePacket),
    BuildOrUpgrade(BuildOrUpgradePacket),
    CommandAdd(CommandAddPacket),
    CommandPlace(CommandPlacePacket),
    CommandHoldPosition(CommandHoldPositionPacket),
    Damage(DamagePacket),
    DayNight(DayNightPacket),
    EnemySpawn(EnemySpawnPacket),
    Heal(HealPacket),
    ManualAttack(ManualAttackPacket),
    PlayerSync(PlayerSyncPacket),
    Position(PositionPacket),
    Respawn(RespawnPacket),
    ScaleHp(ScaleHpPacket),
    TransitionToScene(TransitionToScenePacket),
    SpawnCoin(SpawnCoinPacket),
}

impl Packet {
    /// The type tag of this packet.
    pub fn kind(&self) -> PacketKind {
        match self {
            Self::Approval(_) => PacketKind::Approval,
            Self::Disconnect(_) => PacketKind::Disconnect,
            Self::PeerSync(_) => PacketKind::PeerSync,
            Self::Balance(_) => PacketKind::Balance,
            Self::BuildOrUpgrade(_) => PacketKind::BuildOrUpgrade,
            Self::CommandAdd(_) => PacketKind::CommandAdd,
            Self::CommandPlace(_) => PacketKind::CommandPlace,
            Self::CommandHoldPosition(_) => PacketKind::CommandHoldPosition,
            Self::Damage(_) => PacketKind::Damage,
            Self::DayNight(_) => PacketKind::DayNight,
            Self::EnemySpawn(_) => PacketKind::EnemySpawn,
            Self::Heal(_) => PacketKind::Heal,
            Self::ManualAttack(_) => PacketKind::ManualAttack,
            Self::PlayerSync(_) => PacketKind::PlayerSync,
            Self::Position(_) => PacketKind::Position,
            Self::Respawn(_) => PacketKind::Respawn,
            Self::ScaleHp(_) => PacketKind::ScaleHp,
            Self::TransitionToScene(_) => PacketKind::TransitionToScene,
            Self::SpawnCoin(_) => PacketKind::SpawnCoin,
        }
    }

    /// Serializes the payload (tag excluded; the envelope carries it).
    pub fn encode_payload(&self) -> Vec<u8> {
        let mut w = WireWriter::new();
        match self {
            Self::Approval(p) => p.encode(&mut w),
            Self::Disconnect(p) => p.encode(&mut w),
            Self::PeerSync(p) => p.encode(&mut w),
            Self::Balance(p) => p.encode(&mut w),
            Self::BuildOrUpgrade(p) => p.encode(&mut w),
            Self::CommandAdd(p) => p.encode(&mut w),
            Self::CommandPlace(p) => p.encode(&mut w),
            Self::CommandHoldPosition(p) => p.encode(&mut w),
            Self::Damage(p) => p.encode(&mut w),
            Self::DayNight(p) => p.encode(&mut w),
            Self::EnemySpawn(p) => p.encode(&mut w),
            Self::Heal(p) => p.encode(&mut w),
            Self::ManualAttack(p) => p.encode(&mut w),
            Self::PlayerSync(p) => p.encode(&mut w),
            Self::Position(p) => p.encode(&mut w),
            Self::Respawn(p) => p.encode(&mut w),
            Self::ScaleHp(p) => p.encode(&mut w),
            Self::TransitionToScene(p) => p.encode(&mut w),
            Self::SpawnCoin(p) => p.encode(&mut w),
        }
        w.into_bytes()
    }

    /// Decodes a payload of the given kind. Fails on truncated or
    /// out-of-range field values; trailing bytes are rejected so a framing
    /// bug cannot silently smuggle data past the field sequence.
    pub fn decode_payload(kind: PacketKind, payload: &[u8]) -> Result<Self, WireError> {
        let mut r = WireReader::new(payload);
        let packet = match kind {
            PacketKind::Approval => Self::Approval(ApprovalPacket::decode(&mut r)?),
            PacketKind::Disconnect => Self::Disconnect(DisconnectPacket::decode(&mut r)?),
            PacketKind::PeerSync => Self::PeerSync(PeerSyncPacket::decode(&mut r)?),
            PacketKind::Balance => Self::Balance(BalancePacket::decode(&mut r)?),
            PacketKind::BuildOrUpgrade => {
                Self::BuildOrUpgrade(BuildOrUpgradePacket::decode(&mut r)?)
            }
            PacketKind::CommandAdd => Self::CommandAdd(CommandAddPacket::decode(&mut r)?),
            PacketKind::CommandPlace => Self::CommandPlace(CommandPlacePacket::decode(&mut r)?),
            PacketKind::CommandHoldPosition => {
                Self::CommandHoldPosition(CommandHoldPositionPacket::decode(&mut r)?)
            }
            PacketKind::Damage => Self::Damage(DamagePacket::decode(&mut r)?),
            PacketKind::DayNight => Self::DayNight(DayNightPacket::decode(&mut r)?),
            PacketKind::EnemySpawn => Self::EnemySpawn(EnemySpawnPacket::decode(&mut r)?),
            PacketKind::Heal => Self::Heal(HealPacket::decode(&mut r)?),
            PacketKind::ManualAttack => Self::ManualAttack(ManualAttackPacket::decode(&mut r)?),
            PacketKind::PlayerSync => Self::PlayerSync(PlayerSyncPacket::decode(&mut r)?),
            PacketKind::Position => Self::Position(PositionPacket::decode(&mut r)?),
            PacketKind::Respawn => Self::Respawn(RespawnPacket::decode(&mut r)?),
            PacketKind::ScaleHp => Self::ScaleHp(ScaleHpPacket::decode(&mut r)?),
            PacketKind::TransitionToScene => {
                Self::TransitionToScene(TransitionToScenePacket::decode(&mut r)?)
            }
            PacketKind::SpawnCoin => Self::SpawnCoin(SpawnCoinPacket::decode(&mut r)?),
        };
        r.finish()?;
        Ok(packet)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
