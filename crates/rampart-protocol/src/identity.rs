//! Cross-peer entity identity.
//!
//! A packet produced on one machine names an object that exists
//! independently on every other machine. The `(kind, id)` pair is that
//! shared name: ids are agreed between host and peers for the same logical
//! entity, and each machine maps the pair onto its own live entity handle
//! through the identity registry.

/// Category of a network-identified entity.
///
/// `Invalid` is the absent sentinel: it never resolves to an entity and is
/// the kind carried by [`Identity::INVALID`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum IdentityKind {
    /// No entity. Resolves to absent.
    Invalid = 0,
    /// A player-controlled character.
    Player = 1,
    /// A placed or upgraded building.
    Building = 2,
    /// An allied (player-commanded) unit.
    Ally = 3,
    /// A hostile unit.
    Enemy = 4,
}

impl IdentityKind {
    /// All kinds that can hold registrations.
    pub const LIVE: [IdentityKind; 4] = [
        IdentityKind::Player,
        IdentityKind::Building,
        IdentityKind::Ally,
        IdentityKind::Enemy,
    ];

    /// Decodes a wire tag. Unknown values are rejected rather than mapped
    /// onto `Invalid` so that corrupt payloads fail loudly at decode time.
    pub fn from_tag(tag: u8) -> Option<Self> {
        match tag {
            0 => Some(Self::Invalid),
            1 => Some(Self::Player),
            2 => Some(Self::Building),
            3 => Some(Self::Ally),
            4 => Some(Self::Enemy),
            _ => None,
        }
    }
}

/// A `(kind, id)` pair naming an entity consistently across host and peers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Identity {
    /// Entity category.
    pub kind: IdentityKind,
    /// Caller-assigned id, unique within the kind among live entities.
    pub id: i32,
}

impl Identity {
    /// The absent identity.
    pub const INVALID: Identity = Identity {
        kind: IdentityKind::Invalid,
        id: 0,
    };

    /// Creates an identity of the given kind.
    pub fn new(kind: IdentityKind, id: i32) -> Self {
        Self { kind, id }
    }

    /// Returns `true` unless this is the absent sentinel kind.
    pub fn is_valid(&self) -> bool {
        self.kind != IdentityKind::Invalid
    }
}

impl Default for Identity {
    fn default() -> Self {
        Self::INVALID
    }
}

impl std::fmt::Display for Identity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}:{}", self.kind, self.id)
    }
}
