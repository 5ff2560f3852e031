//! The player-controlled circle: directional movement with drag, a charge
//! meter filled by collectables and a timed powerup with a rainbow cycle.

use glam::Vec2;
use rand::Rng;
use rand::seq::IndexedRandom;
use serde::{Deserialize, Serialize};

use super::colour::Colour;
use super::entity::{Body, Stage};
use super::lerp::{Easing, lerp};
use crate::clamp_axes;

pub const MIN_RADIUS: f32 = 10.0;
pub const MAX_RADIUS: f32 = 50.0;
pub const MIN_SPEED: f32 = 85.0;
pub const MAX_SPEED: f32 = 180.0;
pub const MIN_POWERUP_TIME: f32 = 2.0;
pub const MAX_POWERUP_TIME: f32 = 3.8;
pub const MIN_CHARGES_NEEDED: u32 = 4;
pub const MAX_CHARGES_NEEDED: u32 = 10;

/// Per-axis velocity cap
pub const MAX_VELOCITY: f32 = 5.0;
/// Velocity multiplier applied every frame
pub const DRAG: f32 = 0.875;
/// Colour transitions per powerup
pub const POWERUP_COLOUR_ROTATIONS: f32 = 10.0;
/// Seconds a trail point lives
pub const TRAIL_LIVE_TIME: f32 = 0.4;
/// Below this remaining fraction the meter reads zero
const POWERUP_METER_SNAP: f32 = 0.01;

/// Tunable player parameters, each a 0-1 percent of its range
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlayerParams {
    pub size: f32,
    pub speed: f32,
    pub inv_time: f32,
    /// Stored inverted: higher means fewer charges needed
    pub charges_needed: f32,
    pub colour: Colour,
}

impl Default for PlayerParams {
    fn default() -> Self {
        Self {
            size: 0.5,
            speed: 0.5,
            inv_time: 0.5,
            charges_needed: 0.5,
            colour: Colour::BLUE,
        }
    }
}

/// Slider percents outside 0-1 (hand-edited storage) are pinned to the ends
pub fn radius_for(percent: f32) -> f32 {
    lerp(MIN_RADIUS, MAX_RADIUS, percent.clamp(0.0, 1.0), Easing::Linear)
}

pub fn speed_for(percent: f32) -> f32 {
    lerp(MIN_SPEED, MAX_SPEED, percent.clamp(0.0, 1.0), Easing::Linear)
}

pub fn powerup_time_for(percent: f32) -> f32 {
    lerp(
        MIN_POWERUP_TIME,
        MAX_POWERUP_TIME,
        percent.clamp(0.0, 1.0),
        Easing::Linear,
    )
}

/// `percent` is the stored (inverted) value. Never less than one charge.
pub fn charges_needed_for(percent: f32) -> u32 {
    let needed = lerp(
        MIN_CHARGES_NEEDED as f32,
        MAX_CHARGES_NEEDED as f32,
        1.0 - percent.clamp(0.0, 1.0),
        Easing::Linear,
    )
    .round() as u32;
    needed.max(1)
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub body: Body,
    pub charge_amount: u32,
    pub powerup_remaining: f32,
    pub powerup_time: f32,
    pub charges_needed: u32,
    pub base_colour: Colour,
    /// (current, next) while cycling
    powerup_colours: Option<(Colour, Colour)>,
    time_in_powerup_colour: f32,
}

impl Player {
    pub fn new(id: u32, pos: Vec2, params: &PlayerParams) -> Self {
        Self {
            body: Body::new(
                id,
                pos,
                params.colour,
                radius_for(params.size),
                speed_for(params.speed),
                TRAIL_LIVE_TIME,
            ),
            charge_amount: 0,
            powerup_remaining: 0.0,
            powerup_time: powerup_time_for(params.inv_time),
            charges_needed: charges_needed_for(params.charges_needed),
            base_colour: params.colour,
            powerup_colours: None,
            time_in_powerup_colour: 0.0,
        }
    }

    fn time_per_powerup_colour(&self) -> f32 {
        self.powerup_time / POWERUP_COLOUR_ROTATIONS
    }

    /// Advance one frame given the aggregated directional intent
    pub fn next_frame<R: Rng>(&mut self, dt: f32, stage: &Stage, intent: Vec2, rng: &mut R) {
        if self.in_powerup() {
            self.cycle_powerup_colour(dt, rng);
        } else {
            self.powerup_colours = None;
            self.body.colour = self.base_colour;
        }

        self.body.vel += intent;
        self.body.vel = clamp_axes(self.body.vel, -MAX_VELOCITY, MAX_VELOCITY, None, None);
        self.body.vel *= DRAG;

        self.body.advance(dt, stage);
    }

    fn cycle_powerup_colour<R: Rng>(&mut self, dt: f32, rng: &mut R) {
        self.time_in_powerup_colour = (self.time_in_powerup_colour - dt).max(0.0);
        self.powerup_remaining = (self.powerup_remaining - dt).max(0.0);

        let slot = self.time_per_powerup_colour();
        let existing = self.powerup_colours;
        let (current, next) = match existing {
            Some(pair) if self.time_in_powerup_colour > 0.0 => pair,
            existing => {
                let current = existing.map_or(self.base_colour, |(_, next)| next);
                let candidates: Vec<Colour> = Colour::POWERUP_PALETTE
                    .iter()
                    .copied()
                    .filter(|c| *c != current)
                    .collect();
                let next = *candidates.choose(rng).unwrap_or(&current);
                self.powerup_colours = Some((current, next));
                self.time_in_powerup_colour = slot;
                (current, next)
            }
        };

        let percent = if slot > 0.0 {
            1.0 - self.time_in_powerup_colour / slot
        } else {
            1.0
        };
        self.body.colour = Colour::lerp(current, next, percent, Easing::Linear);
    }

    /// Count one collectable towards the powerup; ignored while powered up
    pub fn add_charge(&mut self) {
        if self.in_powerup() {
            return;
        }

        self.charge_amount += 1;
        if self.charge_amount >= self.charges_needed {
            self.charge_amount = 0;
            self.powerup_remaining = self.powerup_time;
        }
    }

    /// 0-100. While powered up this is the remaining powerup time.
    pub fn charge_percent(&self) -> f32 {
        if self.in_powerup() {
            let remaining = self.powerup_remaining / self.powerup_time;
            return if remaining < POWERUP_METER_SNAP {
                0.0
            } else {
                remaining * 100.0
            };
        }

        self.charge_amount as f32 / self.charges_needed as f32 * 100.0
    }

    pub fn in_powerup(&self) -> bool {
        self.powerup_remaining > 0.0
    }

    pub fn set_size(&mut self, percent: f32) {
        self.body.radius = radius_for(percent);
    }

    pub fn set_speed(&mut self, percent: f32) {
        self.body.speed = speed_for(percent);
    }

    pub fn set_powerup_time(&mut self, percent: f32) {
        self.powerup_time = powerup_time_for(percent);
    }

    /// `percent` is the stored (inverted) value
    pub fn set_charges_needed(&mut self, percent: f32) {
        self.charges_needed = charges_needed_for(percent);
    }

    pub fn set_base_colour(&mut self, colour: Colour) {
        self.base_colour = colour;
        self.body.colour = colour;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    const STAGE: Stage = Stage::new(0.0, 2000.0, 0.0, 1000.0);

    fn player() -> Player {
        Player::new(1, Vec2::new(1000.0, 500.0), &PlayerParams::default())
    }

    #[test]
    fn test_param_mapping() {
        let p = player();
        assert_eq!(p.body.radius, 30.0);
        assert_eq!(p.body.speed, 132.5);
        assert!((p.powerup_time - 2.9).abs() < 1e-5);
        assert_eq!(p.charges_needed, 7);

        // Inverted: a high stored percent needs fewer charges
        assert_eq!(charges_needed_for(1.0), 4);
        assert_eq!(charges_needed_for(0.0), 10);
    }

    #[test]
    fn test_out_of_range_percents_pinned() {
        assert_eq!(charges_needed_for(2.0), MIN_CHARGES_NEEDED);
        assert_eq!(charges_needed_for(-1.0), MAX_CHARGES_NEEDED);
        assert_eq!(radius_for(3.0), MAX_RADIUS);
        assert_eq!(speed_for(-0.5), MIN_SPEED);
        assert_eq!(powerup_time_for(1.5), MAX_POWERUP_TIME);

        let mut p = player();
        p.set_charges_needed(2.0);
        p.add_charge();
        assert!(!p.in_powerup());
        assert!(p.charge_percent().is_finite());
    }

    #[test]
    fn test_charge_cycle() {
        let mut p = player();
        let n = p.charges_needed;
        for _ in 0..n - 1 {
            p.add_charge();
        }
        assert_eq!(p.charge_amount, n - 1);
        assert!(!p.in_powerup());

        p.add_charge();
        assert_eq!(p.charge_amount, 0);
        assert!(p.in_powerup());
        assert_eq!(p.powerup_remaining, p.powerup_time);
        assert!((p.charge_percent() - 100.0).abs() < 1e-4);

        // No accumulation while powered up
        p.add_charge();
        assert_eq!(p.charge_amount, 0);
    }

    #[test]
    fn test_charge_percent_between_powerups() {
        let mut p = player();
        p.set_charges_needed(1.0);
        p.add_charge();
        assert_eq!(p.charge_percent(), 25.0);
    }

    #[test]
    fn test_powerup_meter_snaps_to_zero() {
        let mut p = player();
        p.powerup_remaining = p.powerup_time * 0.005;
        assert!(p.in_powerup());
        assert_eq!(p.charge_percent(), 0.0);
    }

    #[test]
    fn test_velocity_clamped_then_dragged() {
        let mut rng = Pcg32::seed_from_u64(1);
        let mut p = player();
        for _ in 0..20 {
            p.next_frame(0.0, &STAGE, Vec2::X, &mut rng);
        }
        assert!((p.body.vel.x - MAX_VELOCITY * DRAG).abs() < 1e-5);
        assert_eq!(p.body.vel.y, 0.0);

        let before = p.body.vel.x;
        p.next_frame(0.0, &STAGE, Vec2::ZERO, &mut rng);
        assert!((p.body.vel.x - before * DRAG).abs() < 1e-5);
    }

    #[test]
    fn test_powerup_colour_cycles_and_reverts() {
        let mut rng = Pcg32::seed_from_u64(7);
        let mut p = player();
        p.powerup_remaining = p.powerup_time;

        p.next_frame(0.01, &STAGE, Vec2::ZERO, &mut rng);
        let (current, next) = p.powerup_colours.expect("cycling");
        assert_eq!(current, p.base_colour);
        assert_ne!(next, current);
        assert!(Colour::POWERUP_PALETTE.contains(&next));

        // Past the first slot the old target becomes the new start
        let slot = p.time_per_powerup_colour();
        p.next_frame(slot, &STAGE, Vec2::ZERO, &mut rng);
        let (current2, next2) = p.powerup_colours.expect("cycling");
        assert_eq!(current2, next);
        assert_ne!(next2, current2);

        p.powerup_remaining = 0.0;
        p.next_frame(0.01, &STAGE, Vec2::ZERO, &mut rng);
        assert_eq!(p.body.colour, p.base_colour);
        assert!(p.powerup_colours.is_none());
    }

    #[test]
    fn test_live_updates() {
        let mut p = player();
        p.set_size(1.0);
        p.set_speed(0.0);
        p.set_powerup_time(1.0);
        p.set_base_colour(Colour::PINK);
        assert_eq!(p.body.radius, MAX_RADIUS);
        assert_eq!(p.body.speed, MIN_SPEED);
        assert!((p.powerup_time - MAX_POWERUP_TIME).abs() < 1e-5);
        assert_eq!(p.body.colour, Colour::PINK);
    }
}
