//! Fixed-timestep simulation tick
//!
//! One call advances the world one logical step. Phase order is
//! load-bearing: player, then enemy AI, then bullets, then the outcome
//! check. Later phases observe the results of earlier ones within the same
//! tick, so reordering changes collision timing.

use glam::Vec2;

use super::state::{GameEvent, GamePhase, Outcome, Side, WorldState};
use crate::consts::*;
use crate::normalize_angle;

/// Pressed-control state and pointer position for one tick.
///
/// The driver keeps this current from its input events; the simulation
/// only ever reads it.
#[derive(Debug, Clone, Copy, Default)]
pub struct TickInput {
    pub rotate_left: bool,
    pub rotate_right: bool,
    pub forward: bool,
    pub backward: bool,
    pub fire: bool,
    /// Pointer position in world coordinates; the player turret tracks it
    pub pointer: Vec2,
    /// Attract mode: controls are synthesized from world state instead
    pub demo: bool,
}

/// Advance the world by one fixed timestep. No-op once the round has
/// ended; the driver re-arms via [`WorldState::restart`].
pub fn tick(world: &mut WorldState, input: &TickInput) {
    if !world.is_running() {
        return;
    }
    world.time_ticks += 1;

    let input = if input.demo {
        autopilot(world, *input)
    } else {
        *input
    };

    resolve_player(world, &input);
    resolve_enemies(world);
    resolve_bullets(world);
    check_outcome(world);
}

/// Phase 1: player control resolution
fn resolve_player(world: &mut WorldState, input: &TickInput) {
    let now = world.now_ms();
    let WorldState {
        player,
        obstacles,
        bullets,
        events,
        ..
    } = world;

    // Both rotate controls apply independently; holding both cancels out
    if input.rotate_left {
        player.body_angle -= PLAYER_TURN_RATE;
    }
    if input.rotate_right {
        player.body_angle += PLAYER_TURN_RATE;
    }

    // Forward wins when both motion controls are held
    let speed = if input.forward {
        PLAYER_SPEED
    } else if input.backward {
        -PLAYER_SPEED
    } else {
        0.0
    };
    if speed != 0.0 {
        player.attempt_move(Vec2::from_angle(player.body_angle) * speed, obstacles);
    }

    // The turret tracks the pointer regardless of hull motion
    player.turret_angle = (input.pointer - player.pos).to_angle();

    if input.fire {
        if let Some(bullet) = player.fire(now) {
            bullets.push(bullet);
            events.push(GameEvent::Shoot);
        }
    }
}

/// Phase 2: enemy decision-making, one pass per living enemy in order
fn resolve_enemies(world: &mut WorldState) {
    let now = world.now_ms();
    let WorldState {
        player,
        enemies,
        obstacles,
        bullets,
        last_enemy_shot_ms,
        events,
        ..
    } = world;

    for enemy in enemies.iter_mut() {
        let to_player = player.pos - enemy.pos;
        let distance = to_player.length();
        let target_angle = to_player.to_angle();

        // Instant turret tracking; the hull turns at a bounded rate
        enemy.turret_angle = target_angle;

        let error = normalize_angle(target_angle - enemy.body_angle);
        if error.abs() > ENEMY_TURN_DEADBAND {
            enemy.body_angle += ENEMY_TURN_RATE * error.signum();
        }

        // Close distance along the hull facing, even while still turning
        if distance > ENEMY_SHOOT_RANGE {
            enemy.attempt_move(Vec2::from_angle(enemy.body_angle) * ENEMY_SPEED, obstacles);
        }

        // One shared gate for every enemy: the first to pass claims the
        // window and the rest stay silent until it elapses
        if now - *last_enemy_shot_ms >= ENEMY_FIRE_INTERVAL_MS {
            if let Some(bullet) = enemy.fire(now) {
                bullets.push(bullet);
                events.push(GameEvent::Shoot);
            }
            *last_enemy_shot_ms = now;
        }
    }
}

/// Phase 3: projectile travel and collision resolution
fn resolve_bullets(world: &mut WorldState) {
    let WorldState {
        player,
        enemies,
        bullets,
        obstacles,
        score,
        phase,
        events,
        ..
    } = world;

    let mut i = 0;
    while i < bullets.len() {
        bullets[i].advance();

        if bullets[i].is_out_of_bounds() {
            bullets.remove(i);
            continue;
        }

        let mut consumed = false;
        match bullets[i].side {
            Side::Player => {
                // First enemy hit takes the damage; any hit consumes the
                // bullet even when the enemy survives
                if let Some(j) = enemies.iter().position(|e| bullets[i].hits(e)) {
                    if enemies[j].apply_damage(PLAYER_BULLET_DAMAGE) {
                        enemies.remove(j);
                        *score += KILL_SCORE;
                        events.push(GameEvent::Explosion);
                    }
                    consumed = true;
                }
            }
            Side::Enemy => {
                if bullets[i].hits(player) {
                    if player.apply_damage(ENEMY_BULLET_DAMAGE) {
                        *phase = GamePhase::Ended(Outcome::Defeat);
                    }
                    events.push(GameEvent::Hit);
                    consumed = true;
                }
            }
        }

        // Obstacles only stop bullets that survived the tank check; the
        // bullet's center point is the whole collision shape here
        if !consumed {
            consumed = obstacles
                .iter()
                .any(|o| o.rect.contains_point(bullets[i].pos));
        }

        if consumed {
            bullets.remove(i);
        } else {
            i += 1;
        }
    }
}

/// Phase 4: win/loss and level transition
fn check_outcome(world: &mut WorldState) {
    // A defeat during bullet resolution is terminal for this tick
    if !world.is_running() {
        return;
    }
    if world.enemies.is_empty() {
        if world.level < world.total_levels() {
            world.advance_level();
        } else {
            world.phase = GamePhase::Ended(Outcome::Victory);
        }
    }
}

/// Synthesize controls for attract mode: keep the turret on the nearest
/// enemy, fire freely, and close distance while far.
fn autopilot(world: &WorldState, mut input: TickInput) -> TickInput {
    input.rotate_left = false;
    input.rotate_right = false;
    input.forward = false;
    input.backward = false;
    input.fire = false;

    let player = &world.player;
    let Some(target) = world.enemies.iter().min_by(|a, b| {
        let da = a.pos.distance_squared(player.pos);
        let db = b.pos.distance_squared(player.pos);
        da.partial_cmp(&db).unwrap_or(std::cmp::Ordering::Equal)
    }) else {
        return input;
    };

    input.pointer = target.pos;
    input.fire = true;

    let error = normalize_angle((target.pos - player.pos).to_angle() - player.body_angle);
    input.rotate_left = error < -PLAYER_TURN_RATE;
    input.rotate_right = error > PLAYER_TURN_RATE;
    // Only drive while roughly facing the target, so the hull does not
    // grind against walls it cannot pass
    input.forward = player.pos.distance(target.pos) > ENEMY_SHOOT_RANGE
        && error.abs() < std::f32::consts::FRAC_PI_4;

    input
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::level::{LevelDef, PLAYER_SPAWN, builtin_campaign};
    use crate::sim::state::Obstacle;

    fn level(name: &str, obstacles: Vec<Obstacle>, spawns: Vec<Vec2>) -> LevelDef {
        LevelDef {
            name: name.into(),
            obstacles,
            spawns,
        }
    }

    /// One far-away enemy keeps the round running without interfering for
    /// the first hundred-odd ticks
    fn bystander() -> Vec2 {
        Vec2::new(1100.0, 700.0)
    }

    #[test]
    fn test_turret_tracks_pointer() {
        let mut world = WorldState::new(vec![level("t", vec![], vec![bystander()])]);
        let input = TickInput {
            pointer: world.player.pos + Vec2::new(0.0, 50.0),
            ..TickInput::default()
        };
        tick(&mut world, &input);
        assert!((world.player.turret_angle - std::f32::consts::FRAC_PI_2).abs() < 1e-6);
    }

    #[test]
    fn test_opposed_rotate_controls_cancel() {
        let mut world = WorldState::new(vec![level("t", vec![], vec![bystander()])]);
        let before = world.player.body_angle;
        let input = TickInput {
            rotate_left: true,
            rotate_right: true,
            ..TickInput::default()
        };
        tick(&mut world, &input);
        assert_eq!(world.player.body_angle, before);
    }

    #[test]
    fn test_forward_wins_over_backward() {
        let mut world = WorldState::new(vec![level("t", vec![], vec![bystander()])]);
        let before = world.player.pos;
        let input = TickInput {
            forward: true,
            backward: true,
            ..TickInput::default()
        };
        tick(&mut world, &input);
        // Hull starts at angle 0, so forward is +x
        assert_eq!(world.player.pos, before + Vec2::new(PLAYER_SPEED, 0.0));
    }

    #[test]
    fn test_held_fire_is_cooldown_limited() {
        let mut world = WorldState::new(vec![level("t", vec![], vec![bystander()])]);
        let input = TickInput {
            fire: true,
            pointer: Vec2::new(600.0, PLAYER_SPAWN.y),
            ..TickInput::default()
        };
        let player_shots = |w: &WorldState| {
            w.bullets
                .iter()
                .filter(|b| b.side == Side::Player)
                .count()
        };
        // 300 ms at 60 Hz is 18 ticks: still one bullet after 18, two once
        // the window has clearly reopened
        for _ in 0..18 {
            tick(&mut world, &input);
        }
        assert_eq!(player_shots(&world), 1);
        tick(&mut world, &input);
        tick(&mut world, &input);
        assert_eq!(player_shots(&world), 2);
    }

    #[test]
    fn test_shared_enemy_cooldown_one_shot_per_window() {
        // Three enemies close enough that all want to fire immediately
        let spawns = vec![
            Vec2::new(400.0, 300.0),
            Vec2::new(400.0, 400.0),
            Vec2::new(400.0, 500.0),
        ];
        let mut world = WorldState::new(vec![level("t", vec![], spawns)]);
        tick(&mut world, &TickInput::default());
        let enemy_shots = world
            .bullets
            .iter()
            .filter(|b| b.side == Side::Enemy)
            .count();
        assert_eq!(enemy_shots, 1);

        // The window stays shut for the rest of the second
        for _ in 0..50 {
            tick(&mut world, &TickInput::default());
        }
        let shots = world
            .events
            .iter()
            .filter(|e| matches!(e, GameEvent::Shoot))
            .count();
        assert_eq!(shots, 1);
    }

    #[test]
    fn test_enemy_turns_toward_player_and_closes_distance() {
        let mut world = WorldState::new(vec![level(
            "t",
            vec![],
            vec![Vec2::new(PLAYER_SPAWN.x + 600.0, PLAYER_SPAWN.y + 300.0)],
        )]);
        let before = world.enemies[0].clone();
        tick(&mut world, &TickInput::default());
        let after = &world.enemies[0];
        // Target sits down-left of the enemy: hull angle grows toward it,
        // bounded by the per-tick rate
        assert!((after.body_angle - before.body_angle).abs() <= ENEMY_TURN_RATE + 1e-6);
        assert_ne!(after.body_angle, before.body_angle);
        // Far from the player, so it moved along its (already turned) hull
        assert_eq!(
            after.pos,
            before.pos + Vec2::from_angle(after.body_angle) * ENEMY_SPEED
        );
        // Turret snapped straight at the player
        let expected = (world.player.pos - after.pos).to_angle();
        assert!((after.turret_angle - expected).abs() < 0.05);
    }

    #[test]
    fn test_enemy_holds_position_within_range() {
        let spawn = PLAYER_SPAWN + Vec2::new(150.0, 0.0);
        let mut world = WorldState::new(vec![level("t", vec![], vec![spawn])]);
        tick(&mut world, &TickInput::default());
        assert_eq!(world.enemies[0].pos, spawn);
    }

    #[test]
    fn test_bullet_stopped_by_obstacle_without_damage() {
        let mut world = WorldState::new(vec![level(
            "t",
            vec![Obstacle::new(100.0, 100.0, 50.0, 50.0)],
            vec![bystander()],
        )]);
        world.player.pos = Vec2::new(0.0, 125.0);
        let input = TickInput {
            fire: true,
            pointer: Vec2::new(WORLD_WIDTH, 125.0),
            ..TickInput::default()
        };
        // Muzzle at x=25, advancing 8 per tick: x=97 after 9 ticks, x=105
        // (inside the obstacle) on the 10th
        tick(&mut world, &input);
        let quiet = TickInput {
            pointer: input.pointer,
            ..TickInput::default()
        };
        for _ in 0..8 {
            tick(&mut world, &quiet);
        }
        assert_eq!(
            world
                .bullets
                .iter()
                .filter(|b| b.side == Side::Player)
                .count(),
            1
        );
        tick(&mut world, &quiet);
        assert!(world.bullets.iter().all(|b| b.side != Side::Player));
        assert_eq!(world.enemies[0].health, MAX_HEALTH);
        assert_eq!(world.score, 0);
    }

    #[test]
    fn test_player_bullet_consumed_on_hit_and_kill_scores() {
        let spawn = Vec2::new(PLAYER_SPAWN.x + 100.0, PLAYER_SPAWN.y);
        let mut world = WorldState::new(vec![level("t", vec![], vec![spawn, bystander()])]);
        let input = TickInput {
            fire: true,
            pointer: spawn,
            ..TickInput::default()
        };
        // Four hits at 25 damage destroy the enemy; each shot needs the
        // 300 ms cooldown plus travel time, so just run a few seconds
        for _ in 0..(60 * 5) {
            tick(&mut world, &input);
            if world.enemies.len() == 1 {
                break;
            }
        }
        assert_eq!(world.enemies.len(), 1);
        assert_eq!(world.score, KILL_SCORE);
        assert!(world.events.contains(&GameEvent::Explosion));
    }

    #[test]
    fn test_enemy_hit_at_twenty_health_ends_round_in_defeat() {
        let mut world = WorldState::new(vec![level("t", vec![], vec![bystander()])]);
        world.player.health = 20;
        world.bullets.push(crate::sim::Bullet::new(
            world.player.pos - Vec2::new(20.0, 0.0),
            0.0,
            Side::Enemy,
        ));
        tick(&mut world, &TickInput::default());
        assert_eq!(world.player.health, 0);
        assert_eq!(world.phase, GamePhase::Ended(Outcome::Defeat));
        assert!(world.events.contains(&GameEvent::Hit));
    }

    #[test]
    fn test_clearing_level_advances_and_resets_player_but_keeps_score() {
        let campaign = vec![
            level("first", vec![], vec![bystander()]),
            level(
                "second",
                vec![Obstacle::new(600.0, 100.0, 60.0, 200.0)],
                vec![bystander(), Vec2::new(900.0, 200.0)],
            ),
        ];
        let mut world = WorldState::new(campaign);
        world.score = 300;
        world.player.health = 45;
        world.player.pos = Vec2::new(640.0, 500.0);
        world.enemies.clear();
        world.drain_events();

        tick(&mut world, &TickInput::default());

        assert_eq!(world.level, 2);
        assert_eq!(world.score, 300);
        assert_eq!(world.player.health, MAX_HEALTH);
        assert_eq!(world.player.pos, PLAYER_SPAWN);
        assert_eq!(world.enemies.len(), 2);
        assert_eq!(world.obstacles.len(), 1);
        assert!(world.events.contains(&GameEvent::LevelStarted(2)));
    }

    #[test]
    fn test_clearing_final_level_is_victory() {
        let mut world = WorldState::new(vec![level("only", vec![], vec![bystander()])]);
        world.enemies.clear();
        tick(&mut world, &TickInput::default());
        assert_eq!(world.phase, GamePhase::Ended(Outcome::Victory));
    }

    #[test]
    fn test_tick_is_noop_after_round_ends() {
        let mut world = WorldState::new(vec![level("only", vec![], vec![bystander()])]);
        world.phase = GamePhase::Ended(Outcome::Defeat);
        let ticks = world.time_ticks;
        tick(&mut world, &TickInput::default());
        assert_eq!(world.time_ticks, ticks);
    }

    #[test]
    fn test_restart_reseeds_level_one_with_fresh_score() {
        let mut world = WorldState::new(builtin_campaign());
        world.score = 700;
        world.load_level(3);
        world.player.health = 5;
        world.phase = GamePhase::Ended(Outcome::Defeat);

        world.restart();

        assert!(world.is_running());
        assert_eq!(world.score, 0);
        assert_eq!(world.level, 1);
        assert_eq!(world.player.health, MAX_HEALTH);
        assert_eq!(world.enemies.len(), builtin_campaign()[0].spawns.len());
    }

    #[test]
    fn test_autopilot_hunts_nearest_enemy() {
        let near = Vec2::new(PLAYER_SPAWN.x + 400.0, PLAYER_SPAWN.y);
        let mut world =
            WorldState::new(vec![level("t", vec![], vec![bystander(), near])]);
        let input = TickInput {
            demo: true,
            ..TickInput::default()
        };
        tick(&mut world, &input);
        // Turret locked onto the closer enemy, straight along +x
        assert!(world.player.turret_angle.abs() < 1e-6);
        assert!(world.events.contains(&GameEvent::Shoot));
    }
}
