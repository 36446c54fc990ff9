//! Outbound boundary onto the byte-level transport.
//!
//! The transport owns sockets/relays, framing, and per-channel
//! reliable-ordered delivery; this crate only decides what to send and to
//! whom. Inbound traffic enters through [`crate::dispatch::PacketRouter`].

use rampart_protocol::{DisconnectReason, Packet};

/// Opaque transport identity of a connected peer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PeerId(pub u64);

impl std::fmt::Display for PeerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "peer-{}", self.0)
    }
}

/// Outbound packet delivery. Implementations serialize the packet payload
/// and carry its kind tag in the channel envelope.
pub trait Transport {
    /// Sends a packet to one peer on its reliable-ordered channel.
    fn send(&mut self, peer: PeerId, packet: &Packet);

    /// Sends a packet to every connected peer.
    fn broadcast(&mut self, packet: &Packet);

    /// Sends the peer a typed [`Packet::Disconnect`] with `reason` and
    /// closes the connection.
    fn kick(&mut self, peer: PeerId, reason: DisconnectReason);
}
