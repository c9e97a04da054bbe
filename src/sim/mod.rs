//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must stay pure and
//! deterministic:
//! - Fixed timestep only
//! - No wall clock; all timing derives from the tick counter
//! - Stable iteration order (vec order is spawn/creation order)
//! - No rendering or platform dependencies

pub mod collision;
pub mod level;
pub mod state;
pub mod tick;

pub use collision::{Rect, in_world_bounds, within_radius};
pub use level::{
    LevelDef, PLAYER_SPAWN, builtin_campaign, campaign_from_json, is_valid_spawn, resolve_spawn,
};
pub use state::{Bullet, GameEvent, GamePhase, Obstacle, Outcome, Side, Tank, WorldState};
pub use tick::{TickInput, tick};
