//! Network synchronization core: identity registry, player sessions,
//! packet dispatch, and movement reconciliation.
//!
//! The simulation engine and the byte-level transport live outside this
//! crate; handlers reach them through the [`sim::Simulation`] and
//! [`transport::Transport`] traits. Everything here runs synchronously on
//! the simulation's control thread, once per tick or immediately on packet
//! arrival. Distributing handlers across threads requires an external
//! mutex boundary around the registry and the session manager.

pub mod dispatch;
pub mod movement;
pub mod registry;
pub mod session;
pub mod sim;
pub mod transport;

#[cfg(test)]
mod test_util;

pub use dispatch::{ClientState, Context, PacketRouter};
pub use movement::{MovementState, PlayerStatus, StepOutcome, StepResult, ViewBasis, step_player};
pub use registry::IdentityRegistry;
pub use session::{Player, SessionManager};
pub use sim::Simulation;
pub use transport::{PeerId, Transport};
