//! Entity model and the mutable world aggregate
//!
//! Every live entity is exclusively owned by `WorldState`; nothing holds a
//! second reference into the world. The tick pipeline in [`super::tick`] is
//! the only mutator while a round is running.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::collision::{self, Rect};
use super::level::{LevelDef, PLAYER_SPAWN};
use crate::consts::*;

/// Which combatant owns a tank or bullet
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Player,
    Enemy,
}

/// How a finished round ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Victory,
    Defeat,
}

/// Round lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GamePhase {
    /// Simulation advancing
    Running,
    /// Terminal until an explicit restart
    Ended(Outcome),
}

/// Fire-and-forget cues for the driver (audio, HUD banners).
///
/// Drained once per frame via [`WorldState::drain_events`]; emission order
/// within a tick is preserved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameEvent {
    /// A tank fired
    Shoot,
    /// An enemy tank was destroyed
    Explosion,
    /// The player took a hit
    Hit,
    /// A level was (re)loaded, 1-based
    LevelStarted(usize),
}

/// A combatant vehicle. The turret aims independently of the hull; movement
/// always follows the hull.
#[derive(Debug, Clone)]
pub struct Tank {
    pub pos: Vec2,
    /// Hull facing (radians)
    pub body_angle: f32,
    /// Aim direction (radians), decoupled from the hull
    pub turret_angle: f32,
    /// 0..=100; 0 means destroyed
    pub health: u32,
    /// Edge length of the bounding square
    pub size: f32,
    pub side: Side,
    last_shot_ms: f64,
}

impl Tank {
    pub fn new(pos: Vec2, side: Side) -> Self {
        Self {
            pos,
            body_angle: 0.0,
            turret_angle: 0.0,
            health: MAX_HEALTH,
            size: TANK_SIZE,
            side,
            // Primed so a fresh tank may fire on its first tick
            last_shot_ms: -FIRE_COOLDOWN_MS,
        }
    }

    pub fn is_player(&self) -> bool {
        self.side == Side::Player
    }

    pub fn is_destroyed(&self) -> bool {
        self.health == 0
    }

    /// Bounding square the tank would occupy at `pos`
    pub fn bounds_at(&self, pos: Vec2) -> Rect {
        Rect::centered(pos, Vec2::splat(self.size))
    }

    /// Try to displace by `delta`. The whole move is accepted or rejected:
    /// the candidate must stay in bounds (half-size margin) and its bounding
    /// square must overlap no obstacle. No axis-separated sliding. Returns
    /// whether the position changed.
    pub fn attempt_move(&mut self, delta: Vec2, obstacles: &[Obstacle]) -> bool {
        let candidate = self.pos + delta;
        if !collision::in_world_bounds(candidate, self.size / 2.0) {
            return false;
        }
        let body = self.bounds_at(candidate);
        if obstacles.iter().any(|o| body.overlaps(&o.rect)) {
            return false;
        }
        self.pos = candidate;
        true
    }

    /// Fire a bullet from the turret muzzle, unless still cooling down.
    /// The caller owns pushing the bullet into the world and emitting the
    /// shoot cue.
    pub fn fire(&mut self, now_ms: f64) -> Option<Bullet> {
        if now_ms - self.last_shot_ms < FIRE_COOLDOWN_MS {
            return None;
        }
        self.last_shot_ms = now_ms;
        let muzzle =
            self.pos + Vec2::from_angle(self.turret_angle) * (self.size / 2.0 + MUZZLE_OFFSET);
        Some(Bullet::new(muzzle, self.turret_angle, self.side))
    }

    /// Apply damage, flooring health at 0. Returns `true` exactly on the
    /// call that brings health to 0; callers remove (or end the round for)
    /// the tank at that point.
    pub fn apply_damage(&mut self, amount: u32) -> bool {
        let before = self.health;
        self.health = self.health.saturating_sub(amount);
        before > 0 && self.health == 0
    }
}

/// A projectile in flight. Travel angle is fixed at creation.
#[derive(Debug, Clone)]
pub struct Bullet {
    pub pos: Vec2,
    pub angle: f32,
    pub speed: f32,
    pub size: f32,
    /// Owner side; determines which tanks it can damage
    pub side: Side,
}

impl Bullet {
    pub fn new(pos: Vec2, angle: f32, side: Side) -> Self {
        Self {
            pos,
            angle,
            speed: BULLET_SPEED,
            size: BULLET_SIZE,
            side,
        }
    }

    /// Advance one tick along the fixed travel angle
    pub fn advance(&mut self) {
        self.pos += Vec2::from_angle(self.angle) * self.speed;
    }

    pub fn is_out_of_bounds(&self) -> bool {
        self.pos.x < 0.0
            || self.pos.x > WORLD_WIDTH
            || self.pos.y < 0.0
            || self.pos.y > WORLD_HEIGHT
    }

    /// Circular hit test against a tank center (coarser than the tank's own
    /// rectangular movement test)
    pub fn hits(&self, tank: &Tank) -> bool {
        collision::within_radius(self.pos, tank.pos, tank.size / 2.0 + self.size / 2.0)
    }
}

/// Impassable axis-aligned block. The active set is replaced wholesale at
/// each level load.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Obstacle {
    pub rect: Rect,
}

impl Obstacle {
    pub const fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self {
            rect: Rect::new(x, y, w, h),
        }
    }
}

/// The complete mutable game world
#[derive(Debug, Clone)]
pub struct WorldState {
    pub player: Tank,
    /// Living enemies, in spawn order; destroyed enemies are removed
    /// immediately
    pub enemies: Vec<Tank>,
    pub bullets: Vec<Bullet>,
    pub obstacles: Vec<Obstacle>,
    pub score: u32,
    /// 1-based index into the catalog
    pub level: usize,
    pub phase: GamePhase,
    /// Logical tick counter; all timing derives from it
    pub time_ticks: u64,
    /// Shared fire gate across all enemies
    pub last_enemy_shot_ms: f64,
    /// Cues pending driver pickup
    pub events: Vec<GameEvent>,
    pub(crate) levels: Vec<LevelDef>,
}

impl WorldState {
    /// Build a world over the given catalog and load its first level
    pub fn new(levels: Vec<LevelDef>) -> Self {
        assert!(!levels.is_empty(), "level catalog must not be empty");
        let mut world = Self {
            player: Tank::new(PLAYER_SPAWN, Side::Player),
            enemies: Vec::new(),
            bullets: Vec::new(),
            obstacles: Vec::new(),
            score: 0,
            level: 1,
            phase: GamePhase::Running,
            time_ticks: 0,
            last_enemy_shot_ms: -ENEMY_FIRE_INTERVAL_MS,
            events: Vec::new(),
            levels,
        };
        world.load_level(1);
        world
    }

    /// Logical time in milliseconds since the run began
    pub fn now_ms(&self) -> f64 {
        self.time_ticks as f64 * MS_PER_TICK
    }

    pub fn is_running(&self) -> bool {
        self.phase == GamePhase::Running
    }

    pub fn total_levels(&self) -> usize {
        self.levels.len()
    }

    /// Living-enemy count, as shown on the HUD
    pub fn enemies_alive(&self) -> usize {
        self.enemies.len()
    }

    pub fn current_level_name(&self) -> &str {
        &self.levels[self.level - 1].name
    }

    /// Hand pending cues to the driver, preserving emission order
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }
}
