//! Default tunables for track generation, vehicle handling and the session loop.
//!
//! Everything here seeds `SimConfig::default()`; the simulation itself only
//! reads the values through the config structs so a debug UI can edit them.

use core::f32::consts::PI;

// Track generation
pub const TRACK_MAX_DISTANCE: f32 = 1000.0; // 1km
pub const SEGMENT_MIN_WIDTH: f32 = 16.0;
pub const SEGMENT_MAX_WIDTH: f32 = 20.0;
pub const SEGMENT_MIN_LENGTH: f32 = 20.0;
pub const SEGMENT_MAX_LENGTH: f32 = 30.0;
pub const SEGMENT_START_HEIGHT: f32 = 50.0;
pub const SEGMENT_MAX_HEIGHT_DELTA: f32 = 0.0;
pub const SEGMENT_ANGLE_MAX_DELTA: f32 = 0.125 * PI; // 22.5°
pub const SEGMENT_STRAIGHTEN: f32 = 0.1;
pub const SEGMENT_LENGTH_OVERSHOOT: f32 = 0.1;
pub const HAZARD_EDGE_MARGIN: f32 = 2.0;

// Bonus pickups placed near the start of every track
pub const BONUS_PICKUP_FORWARD: f32 = 12.0;
pub const BONUS_HAZARD_LATERAL: f32 = 2.0;

// Pickups
pub const FUEL_PICKUP_RADIUS: f32 = 2.0;
pub const HAZARD_PICKUP_RADIUS: f32 = 3.0;
pub const HAZARD_SHRINK_RATE: f32 = 2.0; // scale lost per second once triggered

// Vehicle handling
pub const VEHICLE_BASE_ACCEL: f32 = 24.0;
pub const VEHICLE_ACCEL_FALLOFF: f32 = 0.5;
pub const VEHICLE_BRAKE_DECEL: f32 = 60.0;
pub const VEHICLE_REVERSE_ACCEL: f32 = 12.0;
pub const VEHICLE_REVERSE_FALLOFF: f32 = 1.6;
pub const VEHICLE_ENGINE_BRAKE: f32 = 20.0;
pub const VEHICLE_DRAG: f32 = 0.998; // per tick
pub const VEHICLE_MAX_STEERING_ANGLE: f32 = 0.125 * PI; // 22.5°
pub const VEHICLE_MAX_SPEED: f32 = VEHICLE_BASE_ACCEL / VEHICLE_ACCEL_FALLOFF;
pub const VEHICLE_WHEEL_RADIUS: f32 = 1.0;
pub const VEHICLE_REAR_WHEEL_RATIO: f32 = 0.9;
pub const VEHICLE_PROBE_OFFSET: f32 = 1.0;
pub const VEHICLE_SPEED_EPSILON: f32 = 1.0e-3;

// Failure/recovery sequence
pub const GRAZE_GRACE_DURATION: f32 = 1.0;
pub const FALL_DURATION: f32 = 1.5;
pub const EXPLOSION_DURATION: f32 = 1.0;
pub const HAZARD_SPIN_DURATION: f32 = 0.5;
pub const FALL_GRAVITY: f32 = 10.0;
pub const FALL_JUMP_UP: f32 = 4.0;
pub const FALL_SIDE_NUDGE: f32 = 5.0;
pub const FALL_TUMBLE_RATE: f32 = 2.0;
pub const GRAZE_WOBBLE_RATE: f32 = 10.0;
pub const GRAZE_TILT_LIMIT: f32 = 0.25;

// Vehicle spawn
pub const VEHICLE_SPAWN_FORWARD: f32 = 4.0;

// Session
pub const FUEL_PER_UNIT: f32 = 1.0 / 1200.0; // a full tank outlasts one track
pub const RESPAWN_DELAY: f32 = 1.0;
pub const DIFFICULTY_BASE: f32 = 0.0;
pub const DIFFICULTY_STEP: f32 = 0.15;
pub const TICK_RATE_HZ: u16 = 60;

// Input tape
pub const TAPE_MAGIC: u32 = u32::from_le_bytes(*b"FRUN");
pub const TAPE_VERSION: u8 = 1;
pub const TAPE_HEADER_SIZE: usize = 24;
pub const TAPE_FOOTER_SIZE: usize = 12;
pub const MAX_FRAMES_DEFAULT: u32 = 30 * 60 * TICK_RATE_HZ as u32; // 30 minutes
