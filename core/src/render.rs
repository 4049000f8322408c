//! Draw contract between the simulation and whatever renders it.
//!
//! The core never touches a graphics API. Entities compute their model
//! matrix and hand a sink either the track mesh or an opaque model handle
//! together with the final `view_proj * model` matrix.

use core::f32::consts::{FRAC_PI_2, PI, TAU};
use std::sync::Arc;

use glam::{Mat4, Quat, Vec3};

use crate::constants::{GRAZE_TILT_LIMIT, GRAZE_WOBBLE_RATE};
use crate::pickup::{Pickup, PickupKind};
use crate::track::{MeshVertex, Track};
use crate::vehicle::{LifeState, Vehicle};

/// Shared, reference-counted name of a model owned by an external asset store.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ModelHandle(Arc<str>);

impl ModelHandle {
    pub fn new(name: &str) -> Self {
        Self(Arc::from(name))
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.0
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VehicleAssets {
    pub car: ModelHandle,
    pub explosion: ModelHandle,
}

impl Default for VehicleAssets {
    fn default() -> Self {
        Self {
            car: ModelHandle::new("car"),
            explosion: ModelHandle::new("explosion"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PickupAssets {
    pub fuel: ModelHandle,
    pub hazard: ModelHandle,
}

impl Default for PickupAssets {
    fn default() -> Self {
        Self {
            fuel: ModelHandle::new("gas_tank"),
            hazard: ModelHandle::new("oil_spill"),
        }
    }
}

impl PickupAssets {
    pub fn model(&self, kind: PickupKind) -> &ModelHandle {
        match kind {
            PickupKind::Fuel => &self.fuel,
            PickupKind::Hazard => &self.hazard,
        }
    }
}

/// Named animation state for a model draw. The sink owns the actual clips.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ModelPose {
    pub action: Option<&'static str>,
    /// Seconds into `action`.
    pub time: f32,
    /// Secondary clip mixed over `action` with the given weight in `[0, 1]`.
    pub blend: Option<(&'static str, f32)>,
}

pub trait DrawSink {
    fn draw_mesh(&mut self, vertices: &[MeshVertex], mvp: Mat4);
    fn draw_model(&mut self, model: &ModelHandle, mvp: Mat4, pose: &ModelPose);
}

pub trait Drawable {
    fn draw(&self, view_proj: Mat4, sink: &mut dyn DrawSink);
}

impl Drawable for Track {
    fn draw(&self, view_proj: Mat4, sink: &mut dyn DrawSink) {
        if !self.mesh().is_empty() {
            sink.draw_mesh(self.mesh(), view_proj);
        }
    }
}

/// A pickup paired with the models it draws with.
pub struct PickupSprite<'a> {
    pub pickup: &'a Pickup,
    pub assets: &'a PickupAssets,
}

impl Pickup {
    pub fn with_assets<'a>(&'a self, assets: &'a PickupAssets) -> PickupSprite<'a> {
        PickupSprite {
            pickup: self,
            assets,
        }
    }

    /// Spin and bob for fuel, shrink-out for spent hazards.
    pub fn model_matrix(&self) -> Mat4 {
        let t = self.anim_time();
        let (spin, lift) = match self.kind() {
            PickupKind::Fuel => (3.0 * t, 0.5 + 0.25 * (4.0 * t).sin()),
            PickupKind::Hazard => (0.0, 0.0),
        };
        Mat4::from_scale_rotation_translation(
            Vec3::splat(self.scale()),
            Quat::from_rotation_z(spin),
            self.position() + Vec3::Z * lift,
        )
    }
}

impl Drawable for PickupSprite<'_> {
    fn draw(&self, view_proj: Mat4, sink: &mut dyn DrawSink) {
        if !self.pickup.is_visible() {
            return;
        }
        sink.draw_model(
            self.assets.model(self.pickup.kind()),
            view_proj * self.pickup.model_matrix(),
            &ModelPose::default(),
        );
    }
}

impl Vehicle {
    /// Car body transform: heading, hazard spin, edge wobble and fall tumble.
    pub fn model_matrix(&self) -> Mat4 {
        let config = self.config();
        let mut yaw = self.heading() - FRAC_PI_2;
        if self.spin_timer() > 0.0 {
            yaw += TAU * self.spin_timer() / config.hazard_spin_duration;
        }

        let mut tilt = 0.0;
        if let LifeState::GrazingEdge { elapsed } = self.state() {
            let wobble = (GRAZE_WOBBLE_RATE * elapsed).cos();
            let lean = if self.probes().left {
                1.0 - wobble
            } else {
                wobble - 1.0
            };
            tilt = elapsed.min(GRAZE_TILT_LIMIT) * lean;
        }

        let mut body = Mat4::from_translation(self.position())
            * Mat4::from_rotation_z(yaw)
            * Mat4::from_rotation_y(tilt);
        if let LifeState::Fallen { tumble, .. } = self.state() {
            // Roll around a pivot one unit above the contact point.
            body = body
                * Mat4::from_translation(Vec3::Z)
                * Mat4::from_rotation_y(tumble)
                * Mat4::from_translation(-Vec3::Z);
        }
        body
    }

    pub fn model_pose(&self) -> ModelPose {
        let max = self.config().max_steering_angle;
        let steering = self.steering();
        let blend = if steering < 0.0 {
            Some(("steer_right", -steering / max))
        } else if steering > 0.0 {
            Some(("steer_left", steering / max))
        } else {
            None
        };
        ModelPose {
            action: Some("idle"),
            time: 0.0,
            blend,
        }
    }
}

/// Offsets of the explosion puffs around the blast center.
const EXPLOSION_PUFFS: [[f32; 3]; 5] = [
    [0.0, 0.0, 0.0],
    [0.8, -0.4, 0.3],
    [-0.6, 0.7, -0.2],
    [0.3, 0.9, 0.6],
    [-0.9, -0.5, 0.4],
];

impl Drawable for Vehicle {
    fn draw(&self, view_proj: Mat4, sink: &mut dyn DrawSink) {
        let LifeState::Exploded { elapsed, center } = self.state() else {
            sink.draw_model(
                &self.assets().car,
                view_proj * self.model_matrix(),
                &self.model_pose(),
            );
            return;
        };
        if elapsed >= self.config().explosion_duration {
            return;
        }

        let scale = 2.0 + 4.0 * elapsed;
        let pose = ModelPose {
            action: Some("spin"),
            time: elapsed,
            blend: None,
        };
        for (i, offset) in EXPLOSION_PUFFS.iter().enumerate() {
            let model = Mat4::from_scale_rotation_translation(
                Vec3::splat(scale),
                Quat::from_rotation_z(PI * i as f32 / EXPLOSION_PUFFS.len() as f32),
                center + Vec3::from_array(*offset) + Vec3::Z,
            );
            sink.draw_model(&self.assets().explosion, view_proj * model, &pose);
        }
    }
}
