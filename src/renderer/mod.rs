//! Canvas 2D rendering
//!
//! Draws a read-only snapshot of the world once per frame, after the
//! simulation has ticked. Nothing in here mutates simulation state.

use web_sys::CanvasRenderingContext2d;

use crate::consts::{WORLD_HEIGHT, WORLD_WIDTH};
use crate::settings::Settings;
use crate::sim::{Bullet, Obstacle, Side, Tank, WorldState};

/// Grid line spacing for the backdrop
const GRID_STEP: f64 = 50.0;

/// Render one frame of the world
pub fn draw_frame(ctx: &CanvasRenderingContext2d, world: &WorldState, settings: &Settings) {
    draw_background(ctx, settings);

    for obstacle in &world.obstacles {
        draw_obstacle(ctx, obstacle);
    }
    for bullet in &world.bullets {
        draw_bullet(ctx, bullet);
    }
    draw_tank(ctx, &world.player);
    for enemy in &world.enemies {
        draw_tank(ctx, enemy);
    }
}

fn draw_background(ctx: &CanvasRenderingContext2d, settings: &Settings) {
    ctx.set_fill_style_str("#4a7c59");
    ctx.fill_rect(0.0, 0.0, WORLD_WIDTH as f64, WORLD_HEIGHT as f64);

    if !settings.show_grid {
        return;
    }
    ctx.set_stroke_style_str("#3a6b4a");
    ctx.set_line_width(1.0);
    let mut x = 0.0;
    while x < WORLD_WIDTH as f64 {
        ctx.begin_path();
        ctx.move_to(x, 0.0);
        ctx.line_to(x, WORLD_HEIGHT as f64);
        ctx.stroke();
        x += GRID_STEP;
    }
    let mut y = 0.0;
    while y < WORLD_HEIGHT as f64 {
        ctx.begin_path();
        ctx.move_to(0.0, y);
        ctx.line_to(WORLD_WIDTH as f64, y);
        ctx.stroke();
        y += GRID_STEP;
    }
}

fn draw_obstacle(ctx: &CanvasRenderingContext2d, obstacle: &Obstacle) {
    let r = &obstacle.rect;
    ctx.set_fill_style_str("#8b4513");
    ctx.fill_rect(r.x as f64, r.y as f64, r.w as f64, r.h as f64);

    // Plank texture
    ctx.set_stroke_style_str("#654321");
    ctx.set_line_width(1.0);
    let mut i = 0.0;
    while i < r.w as f64 {
        ctx.begin_path();
        ctx.move_to(r.x as f64 + i, r.y as f64);
        ctx.line_to(r.x as f64 + i, (r.y + r.h) as f64);
        ctx.stroke();
        i += 10.0;
    }
}

fn hull_color(side: Side) -> &'static str {
    match side {
        Side::Player => "#4caf50",
        Side::Enemy => "#f44336",
    }
}

fn draw_tank(ctx: &CanvasRenderingContext2d, tank: &Tank) {
    let size = tank.size as f64;
    let half = size / 2.0;

    // Hull and tracks rotate with the body
    ctx.save();
    let _ = ctx.translate(tank.pos.x as f64, tank.pos.y as f64);
    let _ = ctx.rotate(tank.body_angle as f64);

    ctx.set_fill_style_str(hull_color(tank.side));
    ctx.fill_rect(-half, -half, size, size);

    ctx.set_fill_style_str("#333");
    ctx.fill_rect(-half, -half - 5.0, size, 5.0);
    ctx.fill_rect(-half, half, size, 5.0);

    ctx.set_fill_style_str(hull_color(tank.side));
    ctx.fill_rect(-size / 3.0, -size / 3.0, size * 2.0 / 3.0, size * 2.0 / 3.0);

    ctx.restore();

    // Barrel follows the turret angle, independent of the hull
    ctx.save();
    let _ = ctx.translate(tank.pos.x as f64, tank.pos.y as f64);
    let _ = ctx.rotate(tank.turret_angle as f64);

    ctx.set_fill_style_str("#666");
    ctx.fill_rect(0.0, -3.0, half + 10.0, 6.0);

    ctx.restore();

    draw_health_bar(ctx, tank);
}

fn draw_health_bar(ctx: &CanvasRenderingContext2d, tank: &Tank) {
    let bar_w = 40.0;
    let bar_h = 4.0;
    let x = tank.pos.x as f64 - bar_w / 2.0;
    let y = (tank.pos.y - tank.size / 2.0) as f64 - 15.0;
    let health = tank.health as f64 / 100.0;

    ctx.set_fill_style_str("#333");
    ctx.fill_rect(x, y, bar_w, bar_h);

    let color = if health > 0.5 {
        "#4caf50"
    } else if health > 0.25 {
        "#ff9800"
    } else {
        "#f44336"
    };
    ctx.set_fill_style_str(color);
    ctx.fill_rect(x, y, bar_w * health, bar_h);
}

fn draw_bullet(ctx: &CanvasRenderingContext2d, bullet: &Bullet) {
    let size = bullet.size as f64;
    let half = size / 2.0;

    ctx.save();
    let _ = ctx.translate(bullet.pos.x as f64, bullet.pos.y as f64);
    let _ = ctx.rotate(bullet.angle as f64);

    let (fill, trail) = match bullet.side {
        Side::Player => ("#ffd700", "#ffa500"),
        Side::Enemy => ("#ff4444", "#ff6666"),
    };
    ctx.set_fill_style_str(fill);
    ctx.fill_rect(-half, -half, size, size);

    // Short trail behind the travel direction
    ctx.set_stroke_style_str(trail);
    ctx.set_line_width(2.0);
    ctx.begin_path();
    ctx.move_to(-half - 5.0, 0.0);
    ctx.line_to(-half, 0.0);
    ctx.stroke();

    ctx.restore();
}
