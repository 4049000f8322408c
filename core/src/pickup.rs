use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::constants::{FUEL_PICKUP_RADIUS, HAZARD_PICKUP_RADIUS, HAZARD_SHRINK_RATE};
use crate::vehicle::Vehicle;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PickupKind {
    Fuel,
    Hazard,
}

impl PickupKind {
    #[inline]
    pub fn trigger_radius(self) -> f32 {
        match self {
            Self::Fuel => FUEL_PICKUP_RADIUS,
            Self::Hazard => HAZARD_PICKUP_RADIUS,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Pickup {
    position: Vec3,
    kind: PickupKind,
    active: bool,
    anim_time: f32,
}

impl Pickup {
    pub fn new(kind: PickupKind, position: Vec3) -> Self {
        Self {
            position,
            kind,
            active: true,
            anim_time: 0.0,
        }
    }

    #[inline]
    pub fn position(&self) -> Vec3 {
        self.position
    }

    #[inline]
    pub fn kind(&self) -> PickupKind {
        self.kind
    }

    #[inline]
    pub fn is_active(&self) -> bool {
        self.active
    }

    #[inline]
    pub fn anim_time(&self) -> f32 {
        self.anim_time
    }

    pub fn tick(&mut self, dt: f32) {
        self.anim_time += dt;
    }

    /// Applies this pickup to `vehicle` if it is within the trigger radius.
    pub fn try_collect(&mut self, vehicle: &mut Vehicle) -> Option<PickupKind> {
        if !self.active {
            return None;
        }
        if self.position.distance(vehicle.position()) >= self.kind.trigger_radius() {
            return None;
        }

        self.active = false;
        match self.kind {
            PickupKind::Fuel => vehicle.on_fuel(),
            PickupKind::Hazard => {
                vehicle.on_hazard();
                self.anim_time = 0.0;
            }
        }
        Some(self.kind)
    }

    /// Draw scale; zero once the pickup should no longer be shown.
    pub fn scale(&self) -> f32 {
        match (self.kind, self.active) {
            (_, true) => 1.0,
            (PickupKind::Fuel, false) => 0.0,
            (PickupKind::Hazard, false) => (1.0 - HAZARD_SHRINK_RATE * self.anim_time).max(0.0),
        }
    }

    #[inline]
    pub fn is_visible(&self) -> bool {
        self.scale() > 0.0
    }
}
