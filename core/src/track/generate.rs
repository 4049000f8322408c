use glam::Vec2;
use tracing::debug;

use super::{Track, TrackSegment, TrackStart};
use crate::config::TrackConfig;
use crate::constants::{BONUS_HAZARD_LATERAL, BONUS_PICKUP_FORWARD, SEGMENT_LENGTH_OVERSHOOT};
use crate::error::TrackError;
use crate::geometry::{angle_from_dir, dir_from_angle, right_of};
use crate::pickup::{Pickup, PickupKind};
use crate::rng::RandomSource;

/// Lays road from `start` until `config.max_distance` is covered.
///
/// Each segment rolls once against `difficulty` for a hazard, so density
/// scales linearly from none at `0.0` to one per segment at `1.0`. The path
/// wanders by up to `max_angle_delta` per segment, is pulled back toward +Y
/// the further it turns away, and is never allowed to head backwards.
pub fn generate<R: RandomSource + ?Sized>(
    config: &TrackConfig,
    difficulty: f32,
    start: TrackStart,
    rng: &mut R,
) -> Result<Track, TrackError> {
    config.validate()?;
    if !(0.0..=1.0).contains(&difficulty) {
        return Err(TrackError::DifficultyOutOfRange { difficulty });
    }
    if !start.point.is_finite() || !start.height.is_finite() {
        return Err(TrackError::DegenerateStart);
    }
    let direction = start
        .direction
        .try_normalize()
        .ok_or(TrackError::DegenerateStart)?;

    let mut segments = Vec::new();
    let mut pickups = Vec::new();
    let mut distance = 0.0f32;

    let mut cursor = TrackSegment {
        point: start.point,
        dir: direction,
        tangent: right_of(direction),
        width: 0.0,
        length: start
            .length
            .filter(|length| length.is_finite() && *length > 0.0)
            .unwrap_or(config.max_length),
        height: start.height,
        distance: 0.0,
    };
    let mut first_width = start.width.filter(|width| width.is_finite() && *width > 0.0);

    while distance < config.max_distance {
        cursor.width = match first_width.take() {
            Some(width) => width,
            None => rng.range_f32(config.min_width, config.max_width),
        };
        cursor.distance = distance;
        distance += cursor.length;

        if rng.next_f32() < difficulty {
            let lateral_limit = (0.5 * cursor.width - config.hazard_edge_margin).max(0.0);
            let x = rng.range_f32(-lateral_limit, lateral_limit);
            let y = rng.next_f32() * cursor.length;
            let spot = cursor.point + x * cursor.tangent + y * cursor.dir;
            pickups.push(Pickup::new(PickupKind::Hazard, spot.extend(cursor.height)));
        }

        segments.push(cursor);

        cursor.point += cursor.length * cursor.dir;
        cursor.length = rng
            .range_f32(config.min_length, config.max_length)
            .min(config.max_distance - distance + SEGMENT_LENGTH_OVERSHOOT);
        cursor.height += rng.next_f32() * config.max_height_delta;

        let angle = angle_from_dir(cursor.dir)
            + rng.range_f32(-config.max_angle_delta, config.max_angle_delta);
        let mut dir = dir_from_angle(angle);
        dir = dir.lerp(Vec2::Y, config.straighten * (1.0 - dir.y * dir.y));
        dir.y = dir.y.max(0.0);
        cursor.dir = dir.try_normalize().unwrap_or(Vec2::Y);
        cursor.tangent = right_of(cursor.dir);
    }

    if segments.is_empty() {
        return Err(TrackError::NoSegments);
    }

    let hazards = pickups.len();
    let bonus = start.point + BONUS_PICKUP_FORWARD * direction;
    pickups.push(Pickup::new(PickupKind::Fuel, bonus.extend(start.height)));
    pickups.push(Pickup::new(
        PickupKind::Hazard,
        (bonus + BONUS_HAZARD_LATERAL * right_of(direction)).extend(start.height),
    ));

    debug!(
        segments = segments.len(),
        hazards,
        length = distance,
        difficulty,
        "generated track"
    );

    Ok(Track::from_parts(segments, distance, pickups, difficulty))
}
