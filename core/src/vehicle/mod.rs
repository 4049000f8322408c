//! The car: bicycle-model driving plus the off-track failure sequence.
//!
//! A vehicle on the road is `Driving`. When one side probe leaves the road it
//! starts `GrazingEdge`; staying there past the grace period, or losing the
//! center probe, throws it `Fallen`. A fall ends `Exploded`, which only a
//! [`Vehicle::respawn`] leaves.

use core::f32::consts::FRAC_PI_2;

use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::VehicleConfig;
use crate::constants::{
    FALL_TUMBLE_RATE, SEGMENT_START_HEIGHT, VEHICLE_SPAWN_FORWARD, VEHICLE_SPEED_EPSILON,
};
use crate::geometry::{angle_from_dir, dir_from_angle, right_of};
use crate::input::Controls;
use crate::render::VehicleAssets;
use crate::track::TrackQuery;

#[cfg(test)]
mod tests;

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum LifeState {
    Driving,
    GrazingEdge {
        elapsed: f32,
    },
    Fallen {
        velocity: Vec3,
        elapsed: f32,
        /// Roll angle around the car's forward axis.
        tumble: f32,
    },
    Exploded {
        elapsed: f32,
        center: Vec3,
    },
}

impl LifeState {
    pub fn kind(&self) -> LifeStateKind {
        match self {
            Self::Driving => LifeStateKind::Driving,
            Self::GrazingEdge { .. } => LifeStateKind::GrazingEdge,
            Self::Fallen { .. } => LifeStateKind::Fallen,
            Self::Exploded { .. } => LifeStateKind::Exploded,
        }
    }

    /// Still on the road and under control.
    #[inline]
    pub fn is_alive(&self) -> bool {
        matches!(self, Self::Driving | Self::GrazingEdge { .. })
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LifeStateKind {
    Driving,
    GrazingEdge,
    Fallen,
    Exploded,
}

impl LifeStateKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Driving => "driving",
            Self::GrazingEdge => "grazing_edge",
            Self::Fallen => "fallen",
            Self::Exploded => "exploded",
        }
    }
}

/// On-road results of the last three track probes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProbeResults {
    pub left: bool,
    pub center: bool,
    pub right: bool,
}

impl ProbeResults {
    pub const ALL_ON: Self = Self {
        left: true,
        center: true,
        right: true,
    };
}

#[derive(Clone, Debug)]
pub struct Vehicle {
    config: VehicleConfig,
    assets: VehicleAssets,
    position: Vec3,
    speed: f32,
    heading: f32,
    steering: f32,
    fuel: f32,
    distance: f32,
    state: LifeState,
    spin_timer: f32,
    last_on_track: Vec2,
    probes: ProbeResults,
}

impl Vehicle {
    pub fn new(config: VehicleConfig, assets: VehicleAssets) -> Self {
        let mut vehicle = Self {
            config,
            assets,
            position: Vec3::ZERO,
            speed: 0.0,
            heading: FRAC_PI_2,
            steering: 0.0,
            fuel: 1.0,
            distance: 0.0,
            state: LifeState::Driving,
            spin_timer: 0.0,
            last_on_track: Vec2::ZERO,
            probes: ProbeResults::ALL_ON,
        };
        vehicle.reset();
        vehicle
    }

    /// Back to the start line with a full tank.
    pub fn reset(&mut self) {
        self.fuel = 1.0;
        self.distance = 0.0;
        self.place(
            Vec3::new(0.0, VEHICLE_SPAWN_FORWARD, SEGMENT_START_HEIGHT),
            FRAC_PI_2,
        );
    }

    /// Puts the car down at rest, clearing every transient timer.
    pub fn place(&mut self, position: Vec3, heading: f32) {
        self.position = position;
        self.heading = heading;
        self.speed = 0.0;
        self.steering = 0.0;
        self.spin_timer = 0.0;
        self.last_on_track = position.truncate();
        self.probes = ProbeResults::ALL_ON;
        self.set_state(LifeState::Driving);
    }

    /// Back on the road at the segment nearest to where the car last had
    /// ground under it, facing along the road.
    pub fn respawn<T: TrackQuery + ?Sized>(&mut self, track: &T) {
        let segment = *track.find_nearest_segment(self.last_on_track);
        // The start edge itself is a triangle boundary; spawn a little inside.
        let forward = VEHICLE_SPAWN_FORWARD.min(0.5 * segment.length);
        let spot = segment.point + forward * segment.dir;
        self.place(spot.extend(segment.height), angle_from_dir(segment.dir));
        debug!(x = spot.x, y = spot.y, "vehicle respawned");
    }

    pub fn tick<T: TrackQuery + ?Sized>(&mut self, dt: f32, controls: &Controls, track: &T) {
        match self.state {
            LifeState::Exploded { elapsed, center } => {
                self.state = LifeState::Exploded {
                    elapsed: elapsed + dt,
                    center,
                };
            }
            LifeState::Fallen {
                mut velocity,
                elapsed,
                mut tumble,
            } => {
                velocity.z -= self.config.gravity * dt;
                self.position += velocity * dt;
                tumble += dt * FALL_TUMBLE_RATE * self.right().dot(velocity.truncate());
                let elapsed = elapsed + dt;
                if elapsed > self.config.fall_duration {
                    self.set_state(LifeState::Exploded {
                        elapsed: 0.0,
                        center: self.position + Vec3::Z,
                    });
                } else {
                    self.state = LifeState::Fallen {
                        velocity,
                        elapsed,
                        tumble,
                    };
                }
            }
            LifeState::Driving | LifeState::GrazingEdge { .. } => {
                self.drive(dt, controls, track);
            }
        }
    }

    fn drive<T: TrackQuery + ?Sized>(&mut self, dt: f32, controls: &Controls, track: &T) {
        let spun = self.spin_timer > 0.0;
        if spun {
            self.spin_timer = (self.spin_timer - dt).max(0.0);
        }
        let controls = if spun { Controls::default() } else { *controls };

        self.update_speed(dt, &controls);
        self.steering = self.steering_input(&controls) * self.steering_scale();
        self.integrate_position(dt);
        self.check_track(dt, track);
    }

    fn update_speed(&mut self, dt: f32, controls: &Controls) {
        let config = &self.config;
        let accel = (config.base_accel - config.accel_falloff * self.speed).max(0.0);
        let decel = if self.speed > 0.0 {
            config.brake_decel
        } else {
            (config.reverse_accel + config.reverse_falloff * self.speed).max(0.0)
        };

        if controls.accelerate.down() {
            self.speed += accel * dt;
        }
        if controls.decelerate.down() {
            let before = self.speed;
            self.speed -= decel * dt;
            // Reversing takes a fresh press of the brake.
            if before >= 0.0 && self.speed < 0.0 && !controls.decelerate.pressed() {
                self.speed = 0.0;
            }
        }
        if !controls.accelerate.down() && !controls.decelerate.down() {
            let step = config.engine_brake * dt;
            if self.speed > 0.0 {
                self.speed = (self.speed - step).max(0.0);
            } else if self.speed < 0.0 {
                self.speed = (self.speed + step).min(0.0);
            }
        }

        self.speed *= config.drag;
        if self.speed.abs() < VEHICLE_SPEED_EPSILON {
            self.speed = 0.0;
        }
    }

    fn steering_input(&self, controls: &Controls) -> f32 {
        match (controls.steer_left.down(), controls.steer_right.down()) {
            (true, false) => self.config.max_steering_angle,
            (false, true) => -self.config.max_steering_angle,
            _ => 0.0,
        }
    }

    /// Understeer: full lock at standstill, none at `max_speed`.
    fn steering_scale(&self) -> f32 {
        let max_speed = self.config.max_speed;
        ((max_speed - self.speed) / max_speed).clamp(0.0, 1.0)
    }

    fn integrate_position(&mut self, dt: f32) {
        let forward = dir_from_angle(self.heading);
        let front = self.config.wheel_radius * forward;
        let rear = -self.config.rear_wheel_ratio * self.config.wheel_radius * forward;

        let step = self.speed * dt;
        let front_move = step * dir_from_angle(self.heading + self.steering);
        let rear_move = step * forward;

        self.position += (0.5 * (front_move + rear_move)).extend(0.0);
        if let Some(axis) = ((front + front_move) - (rear + rear_move)).try_normalize() {
            self.heading = angle_from_dir(axis);
        }
    }

    fn check_track<T: TrackQuery + ?Sized>(&mut self, dt: f32, track: &T) {
        let center = self.position.truncate();
        let offset = self.config.probe_offset * self.right();
        let center_hit = track.trace_height(center);
        self.probes = ProbeResults {
            left: track.trace_height(center - offset).is_some(),
            center: center_hit.is_some(),
            right: track.trace_height(center + offset).is_some(),
        };

        let Some(hit) = center_hit else {
            self.fall();
            return;
        };
        self.position.z = hit.height;
        self.distance = hit.distance_along;
        self.last_on_track = center;

        if self.probes.left && self.probes.right {
            self.set_state(LifeState::Driving);
            return;
        }
        let elapsed = match self.state {
            LifeState::GrazingEdge { elapsed } => elapsed,
            _ => 0.0,
        } + dt;
        if elapsed > self.config.graze_grace {
            self.fall();
        } else {
            self.set_state(LifeState::GrazingEdge { elapsed });
        }
    }

    fn fall(&mut self) {
        let right = self.right();
        let mut planar = self.speed * dir_from_angle(self.heading);
        if !self.probes.left {
            planar -= self.config.side_nudge * right;
        }
        if !self.probes.right {
            planar += self.config.side_nudge * right;
        }
        self.set_state(LifeState::Fallen {
            velocity: planar.extend(self.config.jump_up),
            elapsed: 0.0,
            tumble: 0.0,
        });
    }

    fn set_state(&mut self, next: LifeState) {
        let (from, to) = (self.state.kind(), next.kind());
        if from != to {
            debug!(
                from = from.as_str(),
                to = to.as_str(),
                x = self.position.x,
                y = self.position.y,
                speed = self.speed,
                "vehicle state changed"
            );
        }
        self.state = next;
    }

    pub fn on_fuel(&mut self) {
        self.fuel = 1.0;
    }

    pub fn on_hazard(&mut self) {
        self.spin_timer = self.config.hazard_spin_duration;
    }

    pub fn burn_fuel(&mut self, amount: f32) {
        self.fuel = (self.fuel - amount).clamp(0.0, 1.0);
    }

    /// Shifts progress back by `offset` once the track it was measured on retires.
    pub fn rebase_distance(&mut self, offset: f32) {
        self.distance -= offset;
    }

    /// Unit vector to the right of the current heading.
    #[inline]
    pub fn right(&self) -> Vec2 {
        right_of(dir_from_angle(self.heading))
    }

    #[inline]
    pub fn forward(&self) -> Vec2 {
        dir_from_angle(self.heading)
    }

    #[inline]
    pub fn position(&self) -> Vec3 {
        self.position
    }

    #[inline]
    pub fn speed(&self) -> f32 {
        self.speed
    }

    #[inline]
    pub fn heading(&self) -> f32 {
        self.heading
    }

    /// Steering angle applied on the last driving tick, after understeer.
    #[inline]
    pub fn steering(&self) -> f32 {
        self.steering
    }

    #[inline]
    pub fn fuel(&self) -> f32 {
        self.fuel
    }

    #[inline]
    pub fn distance(&self) -> f32 {
        self.distance
    }

    #[inline]
    pub fn state(&self) -> LifeState {
        self.state
    }

    #[inline]
    pub fn is_alive(&self) -> bool {
        self.state.is_alive()
    }

    #[inline]
    pub fn spin_timer(&self) -> f32 {
        self.spin_timer
    }

    #[inline]
    pub fn probes(&self) -> ProbeResults {
        self.probes
    }

    #[inline]
    pub fn last_on_track(&self) -> Vec2 {
        self.last_on_track
    }

    #[inline]
    pub fn config(&self) -> &VehicleConfig {
        &self.config
    }

    #[inline]
    pub fn config_mut(&mut self) -> &mut VehicleConfig {
        &mut self.config
    }

    #[inline]
    pub fn assets(&self) -> &VehicleAssets {
        &self.assets
    }
}
