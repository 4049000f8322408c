use fuelrun_core::input::FrameInput;
use fuelrun_core::track::{TrackPair, TrackQuery};
use fuelrun_core::Session;
use glam::Vec2;
use serde::Serialize;

pub trait AutopilotBot {
    fn id(&self) -> &'static str;
    fn description(&self) -> &'static str;
    fn reset(&mut self, seed: u32);
    fn next_input(&mut self, session: &Session) -> FrameInput;
}

#[derive(Clone, Debug, Serialize)]
pub struct BotManifestEntry {
    pub id: String,
    pub family: String,
    pub description: String,
    pub config_hash: String,
    pub config: serde_json::Value,
}

/// Point on the road centerline `distance` units from the start of the
/// current track, plus the road direction there. Clamps to the far end of
/// the next track.
pub fn centerline_at(pair: &TrackPair, distance: f32) -> (Vec2, Vec2) {
    let offset = pair.current().length();
    let (track, local) = if distance < offset {
        (pair.current(), distance.max(0.0))
    } else {
        (pair.next(), distance - offset)
    };

    let segments = track.segments();
    let index = segments.partition_point(|s| s.distance <= local).saturating_sub(1);
    let segment = &segments[index];
    let along = (local - segment.distance).min(segment.length);
    (segment.point + along * segment.dir, segment.dir)
}

/// Direction of the segment nearest the car.
pub fn road_dir_under(session: &Session) -> Vec2 {
    let p = session.vehicle().position().truncate();
    session.track_pair().find_nearest_segment(p).dir
}

/// Signed angle from `from` to `to`; positive is counter-clockwise (left).
#[inline]
pub fn signed_angle(from: Vec2, to: Vec2) -> f32 {
    from.perp_dot(to).atan2(from.dot(to))
}

#[inline]
fn no_input() -> FrameInput {
    FrameInput::default()
}

mod roster;

pub use roster::{bot_fingerprint, bot_ids, bot_manifest_entries, create_bot, describe_bots};
