//! Per-tick movement and reconciliation for replicated players.
//!
//! The local player integrates its own input and publishes the result into
//! the shared replicated state. A remote player tracks the owner's last
//! published position: small divergence is blended away over the next
//! ticks, divergence beyond the deviance threshold is resolved by a hard
//! teleport (drift after a pause or a packet-loss burst is unrecoverable
//! by blending). Gravity is always simulated locally and never reconciled.

use glam::{Vec2, Vec3};
use rampart_config::MovementConfig;
use rampart_protocol::SharedPlayerState;

// ---------------------------------------------------------------------------
// Inputs
// ---------------------------------------------------------------------------

/// Camera basis used to turn 2D input axes into world-space motion.
#[derive(Debug, Clone, Copy)]
pub struct ViewBasis {
    /// Camera forward vector (not necessarily planar).
    pub forward: Vec3,
    /// Camera right vector.
    pub right: Vec3,
}

impl Default for ViewBasis {
    fn default() -> Self {
        Self {
            forward: Vec3::NEG_Z,
            right: Vec3::X,
        }
    }
}

/// Engine-owned facts about the player this tick. The host loop fills this
/// in from its own components; no engine introspection happens here.
#[derive(Debug, Clone, Copy)]
pub struct PlayerStatus {
    /// Whether the physical mover is touching the ground.
    pub grounded: bool,
    /// Whether the physical mover is enabled at all.
    pub mover_enabled: bool,
    /// Current health as a fraction of max. Sprinting requires 1.0.
    pub hp_ratio: f32,
    /// Heavy armor equipped (slows movement at night).
    pub heavy_armor: bool,
    /// Racing horse equipped (speeds movement up).
    pub racing_horse: bool,
    /// Whether it is currently night.
    pub night: bool,
    /// Input is ignored while the player is frozen (cutscenes, menus).
    pub frozen: bool,
}

impl Default for PlayerStatus {
    fn default() -> Self {
        Self {
            grounded: true,
            mover_enabled: true,
            hp_ratio: 1.0,
            heavy_armor: false,
            racing_horse: false,
            night: false,
            frozen: false,
        }
    }
}

/// Mutable per-player movement state owned by this core.
#[derive(Debug, Clone, Copy, Default)]
pub struct MovementState {
    /// Simulated position (mirrors the engine-side mover transform).
    pub position: Vec3,
    /// Accumulated vertical velocity from local gravity.
    pub y_velocity: f32,
    /// Edge detector for the sprint toggle button.
    pub sprint_toggle_latch: bool,
    /// Latched sprint-toggle mode.
    pub sprint_toggled_on: bool,
    /// Forces a hard snap on the next remote step, set when the entity was
    /// just instantiated or repositioned out-of-band.
    pub teleport_next: bool,
}

// ---------------------------------------------------------------------------
// Outcome
// ---------------------------------------------------------------------------

/// How the position was advanced this tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StepOutcome {
    /// Mover disabled; no motion applied.
    Skipped,
    /// Hard resync onto the replicated position.
    Teleported {
        /// The position snapped to.
        to: Vec3,
    },
    /// Velocity applied through the mover.
    Moved {
        /// Final velocity for the tick, gravity included.
        velocity: Vec3,
    },
}

/// Outcome plus the animation flags both paths compute.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepResult {
    /// What happened to the position.
    pub outcome: StepOutcome,
    /// Whether planar velocity was above the animation threshold.
    pub moving: bool,
    /// Whether the player is sprinting this tick.
    pub sprinting: bool,
}

// ---------------------------------------------------------------------------
// step_player
// ---------------------------------------------------------------------------

fn project_on_plane(v: Vec3, normal: Vec3) -> Vec3 {
    v - normal * v.dot(normal)
}

/// Advances one player by one tick.
///
/// For the local player the shared state is the input source and the
/// resulting position is published back into it. For a remote player the
/// shared state is the authority being tracked.
pub fn step_player(
    shared: &mut SharedPlayerState,
    state: &mut MovementState,
    basis: &ViewBasis,
    status: &PlayerStatus,
    is_local: bool,
    tuning: &MovementConfig,
    dt: f32,
) -> StepResult {
    let input = if status.frozen {
        Vec2::ZERO
    } else {
        shared.move_axes
    };

    let forward = project_on_plane(basis.forward, Vec3::Y).normalize_or_zero();
    let right = project_on_plane(basis.right, Vec3::Y).normalize_or_zero();
    let mut velocity = forward * input.y + right * input.x;
    velocity = velocity.clamp_length_max(1.0);

    // Sprint toggle is edge-triggered; holding the sprint button while the
    // toggle is latched cancels the latch.
    let should_toggle = shared.sprint_toggle && !state.sprint_toggle_latch;
    state.sprint_toggle_latch = shared.sprint_toggle;
    if should_toggle {
        state.sprint_toggled_on = !state.sprint_toggled_on;
    }
    if state.sprint_toggled_on && shared.sprint_held {
        state.sprint_toggled_on = false;
    }
    let sprinting = (shared.sprint_held || state.sprint_toggled_on) && status.hp_ratio >= 1.0;

    velocity *= if sprinting {
        tuning.sprint_speed
    } else {
        tuning.base_speed
    };
    if status.heavy_armor && status.night {
        velocity *= tuning.heavy_armor_night_multiplier;
    }
    if status.racing_horse {
        velocity *= tuning.racing_horse_multiplier;
    }

    let moving = velocity.length_squared() > 0.1;

    if !status.mover_enabled {
        return StepResult {
            outcome: StepOutcome::Skipped,
            moving,
            sprinting,
        };
    }

    // Gravity is local on both paths and never reconciled.
    if status.grounded {
        state.y_velocity = 0.0;
    } else {
        state.y_velocity += tuning.gravity * dt;
    }
    velocity += Vec3::Y * state.y_velocity;

    let outcome = if is_local {
        state.position += velocity * dt;
        shared.position = state.position;
        StepOutcome::Moved { velocity }
    } else {
        let delta = shared.position - state.position;
        let max_sq = tuning.max_deviance * tuning.max_deviance;
        if state.teleport_next || delta.length_squared() > max_sq {
            state.teleport_next = false;
            state.position = shared.position;
            StepOutcome::Teleported {
                to: shared.position,
            }
        } else {
            // Pull the simulated step halfway toward the raw correction so
            // small divergence converges without visible snapping.
            let blend = tuning.correction_blend;
            velocity = delta.lerp(velocity, blend);
            state.position += delta.lerp(velocity * dt, blend);
            StepOutcome::Moved { velocity }
        }
    };

    StepResult {
        outcome,
        moving,
        sprinting,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
