//! Pin-on-pin collision detection and response
//!
//! Pins are circles in the floor plane with a height. Detection is a
//! height gate plus a circle-overlap test; response is an elastic impulse in
//! the horizontal plane with a crude vertical "pop" handed to the struck pin.
//! Struck pins start moving, so chains fall out of repeating this each step.

use super::rng::GameRng;
use super::scoring::knock_probability;
use super::state::{Pin, PinState, ThrowRuntime};
use crate::config::GameConfig;
use crate::consts::*;

/// An impact between two pins during one step
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Contact {
    /// Pin that was moving into the other
    pub mover_id: u32,
    pub struck_id: u32,
    /// Relative horizontal speed before the response
    pub impact_speed: f32,
}

impl Contact {
    /// The pin on the other side of the contact from `pin_id`, if involved
    pub fn other(&self, pin_id: u32) -> Option<u32> {
        if self.mover_id == pin_id {
            Some(self.struck_id)
        } else if self.struck_id == pin_id {
            Some(self.mover_id)
        } else {
            None
        }
    }
}

/// Height gate: both pins low enough, and a pin flying over a standing pin's
/// top cannot strike it
pub fn heights_allow_contact(a: &Pin, b: &Pin, config: &GameConfig) -> bool {
    let ceiling = PIN_HEIGHT + config.collision_z_threshold;
    if a.pos.z > ceiling || b.pos.z > ceiling {
        return false;
    }
    if (a.is_standing() && b.pos.z > PIN_HEIGHT) || (b.is_standing() && a.pos.z > PIN_HEIGHT) {
        return false;
    }
    true
}

/// Horizontal circle overlap
#[inline]
pub fn pins_overlap(a: &Pin, b: &Pin) -> bool {
    a.pos.truncate().distance(b.pos.truncate()) < 2.0 * PIN_RADIUS
}

pub fn check_collision(a: &Pin, b: &Pin, config: &GameConfig) -> bool {
    heights_allow_contact(a, b, config) && pins_overlap(a, b)
}

/// Exchange momentum between a moving pin and the pin it hit.
///
/// Returns the pre-response relative horizontal speed, or `None` when the
/// pins are already separating and nothing changes.
pub fn apply_collision_response(mover: &mut Pin, struck: &mut Pin, config: &GameConfig) -> Option<f32> {
    let normal = (struck.pos - mover.pos).truncate().normalize_or_zero();
    let rel = mover.vel.truncate() - struck.vel.truncate();
    let dvn = rel.dot(normal);
    if dvn <= 0.0 {
        return None;
    }

    let impact_speed = rel.length();
    let impulse = normal * (dvn * (1.0 + RESTITUTION) / 2.0);
    mover.vel.x -= impulse.x;
    mover.vel.y -= impulse.y;
    struck.vel.x += impulse.x;
    struck.vel.y += impulse.y;

    let vz = mover.vel.z;
    mover.vel.z = vz * IMPACT_VZ_KEEP;
    struck.vel.z += vz * IMPACT_VZ_TRANSFER;

    if struck.horizontal_speed() > config.stop_threshold {
        struck.moving = true;
    } else if !struck.moving {
        // Too weak to move it; a resting pin keeps zero velocity
        struck.settle();
    }

    Some(impact_speed)
}

/// Borrow two distinct pins mutably
fn pair_mut(pins: &mut [Pin], i: usize, j: usize) -> (&mut Pin, &mut Pin) {
    debug_assert!(i != j);
    if i < j {
        let (lo, hi) = pins.split_at_mut(j);
        (&mut lo[i], &mut hi[0])
    } else {
        let (lo, hi) = pins.split_at_mut(i);
        (&mut hi[0], &mut lo[j])
    }
}

/// Test every unordered pair with at least one moving pin and respond to
/// each impact. Pairs are visited in board order, so a pin set moving by an
/// earlier pair can strike later pins in the same pass.
pub fn resolve_collisions(pins: &mut [Pin], config: &GameConfig) -> Vec<Contact> {
    let mut contacts = Vec::new();

    for i in 0..pins.len() {
        for j in (i + 1)..pins.len() {
            let (mover_idx, struck_idx) = if pins[i].moving {
                (i, j)
            } else if pins[j].moving {
                (j, i)
            } else {
                continue;
            };

            if !check_collision(&pins[i], &pins[j], config) {
                continue;
            }

            let (mover, struck) = pair_mut(pins, mover_idx, struck_idx);
            if let Some(impact_speed) = apply_collision_response(mover, struck, config) {
                log::debug!(
                    "pin {} hit pin {} at speed {:.2}",
                    mover.id,
                    struck.id,
                    impact_speed
                );
                contacts.push(Contact {
                    mover_id: mover.id,
                    struck_id: struck.id,
                    impact_speed,
                });
            }
        }
    }

    contacts
}

/// Score-relevant bookkeeping for one step's contacts.
///
/// Only contacts involving the thrown pin count. Each one bumps the
/// collision count; the first touch of a standing opponent pin rolls for a
/// knock. Returns the ids knocked this step.
pub fn judge_thrown_contacts(
    pins: &mut [Pin],
    contacts: &[Contact],
    runtime: &mut ThrowRuntime,
    config: &GameConfig,
    rng: &mut GameRng,
) -> Vec<u32> {
    let mut knocked = Vec::new();
    let Some(thrower) = pins
        .iter()
        .find(|p| p.id == runtime.thrown_pin_id)
        .map(|p| p.owner)
    else {
        return knocked;
    };

    for contact in contacts {
        let Some(other_id) = contact.other(runtime.thrown_pin_id) else {
            continue;
        };
        runtime.collision_count += 1;
        if !runtime.collided.insert(other_id) {
            continue;
        }

        let Some(target) = pins.iter_mut().find(|p| p.id == other_id) else {
            continue;
        };
        if target.owner == thrower || !target.is_standing() {
            continue;
        }

        let p = knock_probability(config, contact.impact_speed);
        if rng.chance(p) {
            target.state = PinState::Fallen;
            runtime.record_knock(other_id, contact.impact_speed);
            knocked.push(other_id);
            log::debug!(
                "pin {} knocked down (impact {:.2}, p={:.2})",
                other_id,
                contact.impact_speed,
                p
            );
        }
    }

    knocked
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::{Vec2, Vec3};
    use proptest::prelude::*;

    fn mover_at(x: f32, y: f32, vel: Vec3) -> Pin {
        Pin::launched(1, 1, Vec3::new(x, y, 0.0), vel)
    }

    fn resting_at(id: u32, x: f32, y: f32) -> Pin {
        Pin::at_rest(id, 2, x, y, PinState::Standing)
    }

    #[test]
    fn test_overlap_uses_two_radii() {
        let a = resting_at(1, 0.0, 0.0);
        let near = resting_at(2, 2.0 * PIN_RADIUS - 0.1, 0.0);
        let far = resting_at(3, 2.0 * PIN_RADIUS + 0.1, 0.0);
        assert!(pins_overlap(&a, &near));
        assert!(!pins_overlap(&a, &far));
    }

    #[test]
    fn test_high_flyer_clears_standing_pin() {
        let config = GameConfig::default();
        let mut flyer = mover_at(0.0, 0.0, Vec3::new(5.0, 0.0, 0.0));
        flyer.pos.z = PIN_HEIGHT + 1.0;
        let standing = resting_at(2, 4.0, 0.0);
        assert!(!check_collision(&flyer, &standing, &config));

        let mut fallen = standing.clone();
        fallen.state = PinState::Fallen;
        // Within the threshold band a fallen pin can still be clipped
        assert!(check_collision(&flyer, &fallen, &config));
    }

    #[test]
    fn test_above_threshold_never_collides() {
        let config = GameConfig::default();
        let mut flyer = mover_at(0.0, 0.0, Vec3::new(5.0, 0.0, 0.0));
        flyer.pos.z = PIN_HEIGHT + config.collision_z_threshold + 0.5;
        let mut fallen = resting_at(2, 4.0, 0.0);
        fallen.state = PinState::Fallen;
        assert!(!check_collision(&flyer, &fallen, &config));
    }

    #[test]
    fn test_head_on_impulse() {
        let config = GameConfig::default();
        let mut mover = mover_at(0.0, 0.0, Vec3::new(10.0, 0.0, 2.0));
        let mut struck = resting_at(2, 12.0, 0.0);

        let speed = apply_collision_response(&mut mover, &mut struck, &config);
        assert_eq!(speed, Some(10.0));
        // impulse = 10 * 1.5 / 2 = 7.5
        assert!((mover.vel.x - 2.5).abs() < 1e-5);
        assert!((struck.vel.x - 7.5).abs() < 1e-5);
        assert!((mover.vel.z - 1.4).abs() < 1e-5);
        assert!((struck.vel.z - 0.6).abs() < 1e-5);
        assert!(struck.moving);
    }

    #[test]
    fn test_separating_pins_untouched() {
        let config = GameConfig::default();
        let mut mover = mover_at(0.0, 0.0, Vec3::new(-10.0, 0.0, 0.0));
        let mut struck = resting_at(2, 12.0, 0.0);
        assert_eq!(apply_collision_response(&mut mover, &mut struck, &config), None);
        assert_eq!(mover.vel, Vec3::new(-10.0, 0.0, 0.0));
        assert!(!struck.moving);
    }

    #[test]
    fn test_weak_touch_leaves_resting_pin_at_rest() {
        let config = GameConfig::default();
        let mut mover = mover_at(0.0, 0.0, Vec3::new(0.1, 0.0, 1.0));
        let mut struck = resting_at(2, 12.0, 0.0);
        assert!(apply_collision_response(&mut mover, &mut struck, &config).is_some());
        assert!(!struck.moving);
        assert_eq!(struck.vel, Vec3::ZERO);
    }

    #[test]
    fn test_chain_reaction_in_one_pass() {
        let config = GameConfig::default();
        // A hits B, B (now moving) hits C later in the same pass
        let mut pins = vec![
            mover_at(0.0, 0.0, Vec3::new(10.0, 0.0, 0.0)),
            resting_at(2, 12.0, 0.0),
            resting_at(3, 24.0, 0.0),
        ];
        let contacts = resolve_collisions(&mut pins, &config);
        assert_eq!(contacts.len(), 2);
        assert_eq!(contacts[0].other(1), Some(2));
        assert_eq!(contacts[1].mover_id, 2);
        assert_eq!(contacts[1].struck_id, 3);
        assert!(pins[2].moving);
    }

    #[test]
    fn test_resting_pairs_are_skipped() {
        let config = GameConfig::default();
        let mut pins = vec![resting_at(1, 0.0, 0.0), resting_at(2, 1.0, 0.0)];
        assert!(resolve_collisions(&mut pins, &config).is_empty());
    }

    fn contact(mover_id: u32, struck_id: u32, impact_speed: f32) -> Contact {
        Contact {
            mover_id,
            struck_id,
            impact_speed,
        }
    }

    #[test]
    fn test_sure_knock_flips_opponent_pin() {
        let config = GameConfig {
            base_knock_probability: 1.0,
            ..Default::default()
        };
        let mut rng = GameRng::new(1);
        let mut pins = vec![
            mover_at(0.0, 0.0, Vec3::new(5.0, 0.0, 0.0)),
            resting_at(2, 12.0, 0.0),
        ];
        let mut runtime = ThrowRuntime::new(1);

        let knocked =
            judge_thrown_contacts(&mut pins, &[contact(1, 2, 5.0)], &mut runtime, &config, &mut rng);
        assert_eq!(knocked, vec![2]);
        assert_eq!(pins[1].state, PinState::Fallen);
        assert_eq!(runtime.collision_count, 1);
        assert_eq!(runtime.knock_speeds.get(&2), Some(&5.0));
    }

    #[test]
    fn test_each_pin_judged_once() {
        let config = GameConfig {
            base_knock_probability: 0.0,
            impact_speed_factor: 0.0,
            ..Default::default()
        };
        let mut rng = GameRng::new(1);
        let mut pins = vec![
            mover_at(0.0, 0.0, Vec3::new(5.0, 0.0, 0.0)),
            resting_at(2, 12.0, 0.0),
        ];
        let mut runtime = ThrowRuntime::new(1);
        let contacts = [contact(1, 2, 5.0), contact(2, 1, 1.0)];

        judge_thrown_contacts(&mut pins, &contacts, &mut runtime, &config, &mut rng);
        assert_eq!(runtime.collision_count, 2);
        assert!(runtime.knocked.is_empty());
        // One roll for the first touch only
        assert_eq!(rng.state(), 1);
    }

    #[test]
    fn test_own_and_fallen_pins_not_rolled() {
        let config = GameConfig {
            base_knock_probability: 1.0,
            ..Default::default()
        };
        let mut rng = GameRng::new(1);
        let mut own = resting_at(2, 12.0, 0.0);
        own.owner = 1;
        let mut fallen = resting_at(3, -12.0, 0.0);
        fallen.state = PinState::Fallen;
        let mut pins = vec![mover_at(0.0, 0.0, Vec3::new(5.0, 0.0, 0.0)), own, fallen];
        let mut runtime = ThrowRuntime::new(1);

        let knocked = judge_thrown_contacts(
            &mut pins,
            &[contact(1, 2, 5.0), contact(1, 3, 5.0), contact(2, 3, 5.0)],
            &mut runtime,
            &config,
            &mut rng,
        );
        assert!(knocked.is_empty());
        assert_eq!(runtime.collision_count, 2);
        assert_eq!(rng.state(), 0);
    }

    proptest! {
        #[test]
        fn prop_horizontal_momentum_conserved(
            vx in -20.0f32..20.0,
            vy in -20.0f32..20.0,
            ox in -15.0f32..15.0,
            oy in -15.0f32..15.0,
        ) {
            prop_assume!(Vec2::new(ox, oy).length() > 0.5);
            let config = GameConfig::default();
            let mut mover = mover_at(0.0, 0.0, Vec3::new(vx, vy, 0.0));
            let mut struck = resting_at(2, ox, oy);
            let before = mover.vel.truncate() + struck.vel.truncate();

            let normal = Vec2::new(ox, oy).normalize();
            let dvn = Vec2::new(vx, vy).dot(normal);

            if apply_collision_response(&mut mover, &mut struck, &config).is_some() {
                prop_assert!(dvn > 0.0);
                let moved_struck = struck.moving;
                let after = mover.vel.truncate() + struck.vel.truncate();
                if moved_struck {
                    prop_assert!((after - before).length() < 1e-3);
                    let expected = normal * (dvn * (1.0 + RESTITUTION) / 2.0);
                    prop_assert!((struck.vel.truncate() - expected).length() < 1e-3);
                }
            } else {
                prop_assert!(dvn <= 0.0);
            }
        }
    }
}
