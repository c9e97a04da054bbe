//! Level catalog and the transition controller
//!
//! The five campaign levels are authored here; a catalog can also ship as a
//! JSON asset. Loading a level replaces the obstacle set wholesale,
//! validates and relocates enemy spawns, and resets the player.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::collision::{self, Rect};
use super::state::{GameEvent, GamePhase, Obstacle, Side, Tank, WorldState};
use crate::consts::*;

/// Where the player starts every level
pub const PLAYER_SPAWN: Vec2 = Vec2::new(100.0, WORLD_HEIGHT / 2.0);

/// Offset rings searched when relocating an invalid spawn, nearest first
const SPAWN_SEARCH_OFFSETS: [f32; 4] = [50.0, 100.0, 150.0, 200.0];

/// One catalog entry. Immutable once loaded; indexed by 1-based level
/// number.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LevelDef {
    pub name: String,
    pub obstacles: Vec<Obstacle>,
    /// Enemy spawn points, in spawn order
    pub spawns: Vec<Vec2>,
}

/// Parse a level catalog shipped as a JSON asset
pub fn campaign_from_json(json: &str) -> serde_json::Result<Vec<LevelDef>> {
    serde_json::from_str(json)
}

/// The built-in five-level campaign
pub fn builtin_campaign() -> Vec<LevelDef> {
    vec![
        LevelDef {
            name: "Training Ground".into(),
            obstacles: vec![
                Obstacle::new(300.0, 200.0, 60.0, 200.0),
                Obstacle::new(500.0, 400.0, 60.0, 200.0),
                Obstacle::new(700.0, 100.0, 60.0, 200.0),
                Obstacle::new(900.0, 500.0, 60.0, 200.0),
                Obstacle::new(400.0, 600.0, 200.0, 60.0),
                Obstacle::new(800.0, 300.0, 200.0, 60.0),
            ],
            spawns: vec![
                Vec2::new(WORLD_WIDTH - 100.0, 100.0),
                Vec2::new(WORLD_WIDTH - 100.0, WORLD_HEIGHT - 100.0),
                Vec2::new(WORLD_WIDTH - 200.0, WORLD_HEIGHT / 2.0),
            ],
        },
        LevelDef {
            name: "Urban Warfare".into(),
            obstacles: vec![
                Obstacle::new(200.0, 150.0, 80.0, 150.0),
                Obstacle::new(400.0, 300.0, 80.0, 150.0),
                Obstacle::new(600.0, 150.0, 80.0, 150.0),
                Obstacle::new(800.0, 300.0, 80.0, 150.0),
                Obstacle::new(1000.0, 150.0, 80.0, 150.0),
                Obstacle::new(300.0, 500.0, 150.0, 80.0),
                Obstacle::new(600.0, 500.0, 150.0, 80.0),
                Obstacle::new(900.0, 500.0, 150.0, 80.0),
                Obstacle::new(150.0, 650.0, 200.0, 60.0),
                Obstacle::new(450.0, 650.0, 200.0, 60.0),
                Obstacle::new(750.0, 650.0, 200.0, 60.0),
            ],
            spawns: vec![
                Vec2::new(WORLD_WIDTH - 150.0, 150.0),
                Vec2::new(WORLD_WIDTH - 150.0, WORLD_HEIGHT - 150.0),
                Vec2::new(WORLD_WIDTH - 250.0, WORLD_HEIGHT / 2.0),
                Vec2::new(WORLD_WIDTH - 350.0, 200.0),
                Vec2::new(WORLD_WIDTH - 350.0, WORLD_HEIGHT - 200.0),
            ],
        },
        LevelDef {
            name: "Maze Runner".into(),
            obstacles: vec![
                Obstacle::new(250.0, 100.0, 40.0, 300.0),
                Obstacle::new(450.0, 100.0, 40.0, 300.0),
                Obstacle::new(650.0, 100.0, 40.0, 300.0),
                Obstacle::new(850.0, 100.0, 40.0, 300.0),
                Obstacle::new(250.0, 500.0, 40.0, 300.0),
                Obstacle::new(450.0, 500.0, 40.0, 300.0),
                Obstacle::new(650.0, 500.0, 40.0, 300.0),
                Obstacle::new(850.0, 500.0, 40.0, 300.0),
                Obstacle::new(350.0, 200.0, 300.0, 40.0),
                Obstacle::new(350.0, 400.0, 300.0, 40.0),
                Obstacle::new(350.0, 600.0, 300.0, 40.0),
                Obstacle::new(550.0, 300.0, 300.0, 40.0),
                Obstacle::new(550.0, 500.0, 300.0, 40.0),
            ],
            spawns: vec![
                Vec2::new(WORLD_WIDTH - 100.0, 150.0),
                Vec2::new(WORLD_WIDTH - 100.0, 350.0),
                Vec2::new(WORLD_WIDTH - 100.0, 550.0),
                Vec2::new(WORLD_WIDTH - 200.0, 250.0),
                Vec2::new(WORLD_WIDTH - 200.0, 450.0),
                Vec2::new(WORLD_WIDTH - 300.0, 350.0),
            ],
        },
        LevelDef {
            name: "Fortress Assault".into(),
            obstacles: vec![
                Obstacle::new(400.0, 100.0, 400.0, 60.0),
                Obstacle::new(400.0, 200.0, 60.0, 200.0),
                Obstacle::new(740.0, 200.0, 60.0, 200.0),
                Obstacle::new(400.0, 500.0, 400.0, 60.0),
                Obstacle::new(200.0, 300.0, 60.0, 200.0),
                Obstacle::new(940.0, 300.0, 60.0, 200.0),
                Obstacle::new(300.0, 400.0, 200.0, 60.0),
                Obstacle::new(700.0, 400.0, 200.0, 60.0),
            ],
            spawns: vec![
                Vec2::new(WORLD_WIDTH - 100.0, 150.0),
                Vec2::new(WORLD_WIDTH - 100.0, 350.0),
                Vec2::new(WORLD_WIDTH - 100.0, 550.0),
                Vec2::new(WORLD_WIDTH - 200.0, 250.0),
                Vec2::new(WORLD_WIDTH - 200.0, 450.0),
                Vec2::new(WORLD_WIDTH - 300.0, 350.0),
                Vec2::new(WORLD_WIDTH - 400.0, 200.0),
                Vec2::new(WORLD_WIDTH - 400.0, 500.0),
            ],
        },
        LevelDef {
            name: "Final Battle".into(),
            obstacles: vec![
                Obstacle::new(200.0, 100.0, 60.0, 600.0),
                Obstacle::new(400.0, 100.0, 60.0, 600.0),
                Obstacle::new(600.0, 100.0, 60.0, 600.0),
                Obstacle::new(800.0, 100.0, 60.0, 600.0),
                Obstacle::new(1000.0, 100.0, 60.0, 600.0),
                Obstacle::new(300.0, 200.0, 400.0, 60.0),
                Obstacle::new(300.0, 400.0, 400.0, 60.0),
                Obstacle::new(300.0, 600.0, 400.0, 60.0),
                Obstacle::new(800.0, 200.0, 200.0, 60.0),
                Obstacle::new(800.0, 400.0, 200.0, 60.0),
                Obstacle::new(800.0, 600.0, 200.0, 60.0),
            ],
            spawns: vec![
                Vec2::new(WORLD_WIDTH - 150.0, 150.0),
                Vec2::new(WORLD_WIDTH - 150.0, 350.0),
                Vec2::new(WORLD_WIDTH - 150.0, 550.0),
                Vec2::new(WORLD_WIDTH - 250.0, 250.0),
                Vec2::new(WORLD_WIDTH - 250.0, 450.0),
                Vec2::new(WORLD_WIDTH - 350.0, 150.0),
                Vec2::new(WORLD_WIDTH - 350.0, 350.0),
                Vec2::new(WORLD_WIDTH - 350.0, 550.0),
                Vec2::new(WORLD_WIDTH - 500.0, 200.0),
                Vec2::new(WORLD_WIDTH - 500.0, 400.0),
            ],
        },
    ]
}

/// A tank-sized square at `pos` must be in bounds and clear of every
/// obstacle
pub fn is_valid_spawn(obstacles: &[Obstacle], pos: Vec2) -> bool {
    if !collision::in_world_bounds(pos, TANK_SIZE / 2.0) {
        return false;
    }
    let body = Rect::centered(pos, Vec2::splat(TANK_SIZE));
    !obstacles.iter().any(|o| body.overlaps(&o.rect))
}

/// Resolve a desired spawn point to a valid one.
///
/// Invalid points search a fixed ring of offsets, nearest first, six
/// directions per ring; the first valid candidate wins. Exhausting the
/// search falls back to the original coordinates, overlapping or not --
/// catalog authors are trusted not to wall in a spawn completely.
pub fn resolve_spawn(obstacles: &[Obstacle], desired: Vec2) -> Vec2 {
    if is_valid_spawn(obstacles, desired) {
        return desired;
    }
    for offset in SPAWN_SEARCH_OFFSETS {
        let candidates = [
            desired + Vec2::new(offset, 0.0),
            desired + Vec2::new(-offset, 0.0),
            desired + Vec2::new(0.0, offset),
            desired + Vec2::new(0.0, -offset),
            desired + Vec2::new(offset, offset),
            desired + Vec2::new(-offset, -offset),
        ];
        if let Some(found) = candidates
            .into_iter()
            .find(|&c| is_valid_spawn(obstacles, c))
        {
            return found;
        }
    }
    desired
}

impl WorldState {
    /// Load catalog level `n` (1-based): obstacles replaced wholesale,
    /// bullets cleared, player reset to the spawn at full health (hull and
    /// turret angles persist), enemies respawned with validation.
    ///
    /// Requesting a level outside the catalog is a programming error.
    pub fn load_level(&mut self, n: usize) {
        assert!(
            n >= 1 && n <= self.levels.len(),
            "level {n} outside catalog (1..={})",
            self.levels.len()
        );
        self.level = n;
        let def = self.levels[n - 1].clone();

        self.obstacles = def.obstacles;
        self.bullets.clear();
        // Re-arm the shared gate so enemies may fire immediately
        self.last_enemy_shot_ms = self.now_ms() - ENEMY_FIRE_INTERVAL_MS;

        self.player.pos = PLAYER_SPAWN;
        self.player.health = MAX_HEALTH;

        self.enemies = def
            .spawns
            .iter()
            .map(|&p| Tank::new(resolve_spawn(&self.obstacles, p), Side::Enemy))
            .collect();

        self.events.push(GameEvent::LevelStarted(n));
    }

    /// Advance to the next level, keeping score. The outcome check only
    /// calls this when a next level exists.
    pub(crate) fn advance_level(&mut self) {
        let next = self.level + 1;
        self.load_level(next);
    }

    /// Reinitialize to level 1 with a fresh score; the only exit from
    /// [`GamePhase::Ended`]
    pub fn restart(&mut self) {
        self.score = 0;
        self.phase = GamePhase::Running;
        self.load_level(1);
    }
}
