//! Per-step pin motion
//!
//! One call advances one pin by one fixed step (the step *is* a frame):
//! gravity, friction, position, floor bounce, arena wall, stop check.

use glam::{Vec2, Vec3};

use super::state::Pin;
use crate::config::GameConfig;
use crate::consts::*;

/// Reflect a velocity off a surface with unit normal `normal`
///
/// Standard reflection: v' = v - 2(v·n)n
#[inline]
pub fn reflect_velocity(velocity: Vec2, normal: Vec2) -> Vec2 {
    velocity - 2.0 * velocity.dot(normal) * normal
}

/// Advance a moving pin by one step. Resting pins are left untouched.
pub fn integrate(pin: &mut Pin, config: &GameConfig) {
    if !pin.moving {
        return;
    }

    pin.vel.z -= config.gravity;

    let friction = if pin.is_grounded() {
        config.friction
    } else {
        AIR_FRICTION
    };
    pin.vel.x *= friction;
    pin.vel.y *= friction;

    pin.pos += pin.vel;

    // Every bounce restarts from the floor, not just the soft ones
    if pin.pos.z <= 0.0 && pin.vel.z < 0.0 {
        pin.pos.z = 0.0;
        pin.vel.z = -pin.vel.z * config.ground_restitution;
        if pin.vel.z.abs() < MIN_BOUNCE_VZ {
            pin.vel.z = 0.0;
        }
    }

    if bounce_off_wall(pin, config.arena_radius()) {
        log::debug!("pin {} hit the arena wall", pin.id);
    }

    if pin.is_grounded() && pin.horizontal_speed() < config.stop_threshold {
        pin.settle();
    }

    log::trace!(
        "pin {} pos=({:.2}, {:.2}, {:.2}) vel=({:.2}, {:.2}, {:.2})",
        pin.id,
        pin.pos.x,
        pin.pos.y,
        pin.pos.z,
        pin.vel.x,
        pin.vel.y,
        pin.vel.z
    );
}

/// Clamp a pin inside the arena wall, reflecting and halving its horizontal
/// velocity when it crosses. Returns whether it hit the wall.
pub fn bounce_off_wall(pin: &mut Pin, arena_radius: f32) -> bool {
    let flat = pin.pos.truncate();
    let dist = flat.length();
    if dist <= arena_radius || dist == 0.0 {
        return false;
    }

    let normal = flat / dist;
    let clamped = normal * arena_radius;
    pin.pos.x = clamped.x;
    pin.pos.y = clamped.y;

    let v = reflect_velocity(pin.vel.truncate(), normal) * WALL_DAMPING;
    pin.vel = Vec3::new(v.x, v.y, pin.vel.z);
    true
}
