//! Mutable simulation tunables.
//!
//! The simulation never reads the constants directly; a debug UI (or a JSON
//! file loaded by the autopilot) edits these structs and hands them back in.

use serde::{Deserialize, Serialize};

use crate::constants::*;
use crate::error::ConfigError;

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackConfig {
    pub max_distance: f32,
    pub min_width: f32,
    pub max_width: f32,
    pub min_length: f32,
    pub max_length: f32,
    pub start_height: f32,
    pub max_height_delta: f32,
    pub max_angle_delta: f32,
    pub straighten: f32,
    pub hazard_edge_margin: f32,
}

impl Default for TrackConfig {
    fn default() -> Self {
        Self {
            max_distance: TRACK_MAX_DISTANCE,
            min_width: SEGMENT_MIN_WIDTH,
            max_width: SEGMENT_MAX_WIDTH,
            min_length: SEGMENT_MIN_LENGTH,
            max_length: SEGMENT_MAX_LENGTH,
            start_height: SEGMENT_START_HEIGHT,
            max_height_delta: SEGMENT_MAX_HEIGHT_DELTA,
            max_angle_delta: SEGMENT_ANGLE_MAX_DELTA,
            straighten: SEGMENT_STRAIGHTEN,
            hazard_edge_margin: HAZARD_EDGE_MARGIN,
        }
    }
}

impl TrackConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        finite("track.max_distance", self.max_distance)?;
        finite("track.start_height", self.start_height)?;
        finite("track.max_height_delta", self.max_height_delta)?;
        finite("track.max_angle_delta", self.max_angle_delta)?;
        finite("track.hazard_edge_margin", self.hazard_edge_margin)?;
        positive("track.max_distance", self.max_distance)?;
        positive("track.min_width", self.min_width)?;
        positive("track.min_length", self.min_length)?;
        ordered("track.width", self.min_width, self.max_width)?;
        ordered("track.length", self.min_length, self.max_length)?;
        unit("track.straighten", self.straighten)?;
        if self.max_angle_delta < 0.0 {
            return Err(ConfigError::NonPositive {
                field: "track.max_angle_delta",
                value: self.max_angle_delta,
            });
        }
        if self.hazard_edge_margin < 0.0 || 2.0 * self.hazard_edge_margin >= self.min_width {
            return Err(ConfigError::MarginTooWide {
                margin: self.hazard_edge_margin,
                min_width: self.min_width,
            });
        }
        Ok(())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VehicleConfig {
    pub base_accel: f32,
    pub accel_falloff: f32,
    pub brake_decel: f32,
    pub reverse_accel: f32,
    pub reverse_falloff: f32,
    pub engine_brake: f32,
    pub drag: f32,
    pub max_steering_angle: f32,
    pub max_speed: f32,
    pub wheel_radius: f32,
    pub rear_wheel_ratio: f32,
    pub probe_offset: f32,
    pub graze_grace: f32,
    pub fall_duration: f32,
    pub explosion_duration: f32,
    pub hazard_spin_duration: f32,
    pub gravity: f32,
    pub jump_up: f32,
    pub side_nudge: f32,
}

impl Default for VehicleConfig {
    fn default() -> Self {
        Self {
            base_accel: VEHICLE_BASE_ACCEL,
            accel_falloff: VEHICLE_ACCEL_FALLOFF,
            brake_decel: VEHICLE_BRAKE_DECEL,
            reverse_accel: VEHICLE_REVERSE_ACCEL,
            reverse_falloff: VEHICLE_REVERSE_FALLOFF,
            engine_brake: VEHICLE_ENGINE_BRAKE,
            drag: VEHICLE_DRAG,
            max_steering_angle: VEHICLE_MAX_STEERING_ANGLE,
            max_speed: VEHICLE_MAX_SPEED,
            wheel_radius: VEHICLE_WHEEL_RADIUS,
            rear_wheel_ratio: VEHICLE_REAR_WHEEL_RATIO,
            probe_offset: VEHICLE_PROBE_OFFSET,
            graze_grace: GRAZE_GRACE_DURATION,
            fall_duration: FALL_DURATION,
            explosion_duration: EXPLOSION_DURATION,
            hazard_spin_duration: HAZARD_SPIN_DURATION,
            gravity: FALL_GRAVITY,
            jump_up: FALL_JUMP_UP,
            side_nudge: FALL_SIDE_NUDGE,
        }
    }
}

impl VehicleConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        finite("vehicle.accel_falloff", self.accel_falloff)?;
        finite("vehicle.reverse_falloff", self.reverse_falloff)?;
        finite("vehicle.max_steering_angle", self.max_steering_angle)?;
        finite("vehicle.side_nudge", self.side_nudge)?;
        finite("vehicle.jump_up", self.jump_up)?;
        positive("vehicle.base_accel", self.base_accel)?;
        positive("vehicle.brake_decel", self.brake_decel)?;
        positive("vehicle.reverse_accel", self.reverse_accel)?;
        positive("vehicle.engine_brake", self.engine_brake)?;
        positive("vehicle.max_speed", self.max_speed)?;
        positive("vehicle.wheel_radius", self.wheel_radius)?;
        positive("vehicle.rear_wheel_ratio", self.rear_wheel_ratio)?;
        positive("vehicle.probe_offset", self.probe_offset)?;
        positive("vehicle.graze_grace", self.graze_grace)?;
        positive("vehicle.fall_duration", self.fall_duration)?;
        positive("vehicle.explosion_duration", self.explosion_duration)?;
        positive("vehicle.hazard_spin_duration", self.hazard_spin_duration)?;
        positive("vehicle.gravity", self.gravity)?;
        unit("vehicle.drag", self.drag)?;
        Ok(())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub fuel_per_unit: f32,
    pub respawn_delay: f32,
    pub difficulty_base: f32,
    pub difficulty_step: f32,
    /// Explosions allowed before the run ends; `None` keeps respawning.
    pub max_respawns: Option<u32>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            fuel_per_unit: FUEL_PER_UNIT,
            respawn_delay: RESPAWN_DELAY,
            difficulty_base: DIFFICULTY_BASE,
            difficulty_step: DIFFICULTY_STEP,
            max_respawns: None,
        }
    }
}

impl SessionConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        finite("session.fuel_per_unit", self.fuel_per_unit)?;
        finite("session.respawn_delay", self.respawn_delay)?;
        finite("session.difficulty_step", self.difficulty_step)?;
        if self.fuel_per_unit < 0.0 {
            return Err(ConfigError::NonPositive {
                field: "session.fuel_per_unit",
                value: self.fuel_per_unit,
            });
        }
        if self.respawn_delay < 0.0 {
            return Err(ConfigError::NonPositive {
                field: "session.respawn_delay",
                value: self.respawn_delay,
            });
        }
        unit("session.difficulty_base", self.difficulty_base)?;
        Ok(())
    }

    /// Difficulty used to generate the track for `level` (1-based).
    pub fn difficulty_for_level(&self, level: u16) -> f32 {
        let steps = level.saturating_sub(1) as f32;
        (self.difficulty_base + steps * self.difficulty_step).clamp(0.0, 1.0)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    pub track: TrackConfig,
    pub vehicle: VehicleConfig,
    pub session: SessionConfig,
}

impl SimConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.track.validate()?;
        self.vehicle.validate()?;
        self.session.validate()
    }
}

fn finite(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::NonFinite { field })
    }
}

fn positive(field: &'static str, value: f32) -> Result<(), ConfigError> {
    finite(field, value)?;
    if value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::NonPositive { field, value })
    }
}

fn ordered(field: &'static str, min: f32, max: f32) -> Result<(), ConfigError> {
    finite(field, max)?;
    if min <= max {
        Ok(())
    } else {
        Err(ConfigError::InvertedRange { field, min, max })
    }
}

fn unit(field: &'static str, value: f32) -> Result<(), ConfigError> {
    finite(field, value)?;
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::OutOfUnitRange { field, value })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        SimConfig::default()
            .validate()
            .expect("default config must validate");
    }

    #[test]
    fn partial_json_fills_in_defaults() {
        let config: SimConfig =
            serde_json::from_str(r#"{ "track": { "max_distance": 500.0 } }"#).unwrap();
        assert_eq!(config.track.max_distance, 500.0);
        assert_eq!(config.track.min_length, SEGMENT_MIN_LENGTH);
        assert_eq!(config.vehicle, VehicleConfig::default());
    }

    #[test]
    fn json_roundtrip_preserves_values() {
        let mut config = SimConfig::default();
        config.session.max_respawns = Some(3);
        config.vehicle.graze_grace = 0.75;
        let encoded = serde_json::to_string(&config).unwrap();
        let decoded: SimConfig = serde_json::from_str(&encoded).unwrap();
        assert_eq!(decoded, config);
    }

    #[test]
    fn rejects_inverted_length_range() {
        let mut config = TrackConfig::default();
        config.min_length = 40.0;
        assert_eq!(
            config.validate(),
            Err(ConfigError::InvertedRange {
                field: "track.length",
                min: 40.0,
                max: SEGMENT_MAX_LENGTH,
            })
        );
    }

    #[test]
    fn rejects_margin_wider_than_road() {
        let mut config = TrackConfig::default();
        config.hazard_edge_margin = 8.0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::MarginTooWide { .. })
        ));
    }

    #[test]
    fn rejects_drag_above_one() {
        let mut config = VehicleConfig::default();
        config.drag = 1.5;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::OutOfUnitRange { field: "vehicle.drag", .. })
        ));
    }

    #[test]
    fn difficulty_ramps_and_saturates() {
        let session = SessionConfig::default();
        assert_eq!(session.difficulty_for_level(1), DIFFICULTY_BASE);
        assert!(session.difficulty_for_level(2) > session.difficulty_for_level(1));
        assert_eq!(session.difficulty_for_level(100), 1.0);
    }
}
