//! Procedural road: a ribbon of trapezoid segments laid out along +Y.
//!
//! Segments never point backwards along +Y, so the whole chain is sorted on
//! that axis and every spatial query is a binary search.

use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

use crate::config::TrackConfig;
use crate::constants::{SEGMENT_MAX_LENGTH, SEGMENT_START_HEIGHT};
use crate::pickup::Pickup;

mod generate;
mod mesh;
mod pair;
mod query;

pub use generate::generate;
pub use mesh::{build_mesh, cross_section, MeshVertex, FACES_PER_SECTION, POINTS_PER_SECTION};
pub use pair::TrackPair;
pub use query::{TraceHit, TrackQuery};

#[cfg(test)]
mod tests;

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TrackSegment {
    /// Center of the start edge.
    pub point: Vec2,
    pub dir: Vec2,
    /// Points to the right of travel.
    pub tangent: Vec2,
    pub width: f32,
    pub length: f32,
    pub height: f32,
    /// Cumulative distance from the track start to this segment's start edge.
    pub distance: f32,
}

impl TrackSegment {
    #[inline]
    pub fn end_point(&self) -> Vec2 {
        self.point + self.dir * self.length
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        self.point + self.dir * (0.5 * self.length)
    }

    /// Left and right corners of the start edge at road height.
    #[inline]
    pub fn start_edge(&self) -> (Vec3, Vec3) {
        let half = 0.5 * self.width * self.tangent;
        (
            (self.point - half).extend(self.height),
            (self.point + half).extend(self.height),
        )
    }

    /// Same as [`start_edge`](Self::start_edge) but at the far end of this segment.
    #[inline]
    pub fn end_edge(&self) -> (Vec3, Vec3) {
        let end = self.end_point();
        let half = 0.5 * self.width * self.tangent;
        (
            (end - half).extend(self.height),
            (end + half).extend(self.height),
        )
    }
}

/// Where a generation pass starts laying road.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TrackStart {
    pub point: Vec2,
    pub direction: Vec2,
    pub height: f32,
    /// First segment length; `None` uses the configured maximum.
    pub length: Option<f32>,
    /// First segment width; `None` draws it like every other segment.
    pub width: Option<f32>,
}

impl Default for TrackStart {
    fn default() -> Self {
        Self {
            point: Vec2::ZERO,
            direction: Vec2::Y,
            height: SEGMENT_START_HEIGHT,
            length: Some(SEGMENT_MAX_LENGTH),
            width: None,
        }
    }
}

impl TrackStart {
    /// Origin start facing +Y, using the configured height and first length.
    pub fn from_config(config: &TrackConfig) -> Self {
        Self {
            height: config.start_height,
            length: Some(config.max_length),
            ..Self::default()
        }
    }
}

#[derive(Clone, Debug)]
pub struct Track {
    segments: Vec<TrackSegment>,
    mesh: Vec<MeshVertex>,
    length: f32,
    pickups: Vec<Pickup>,
    difficulty: f32,
}

impl Track {
    /// `segments` must be non-empty; only the generator builds tracks.
    pub(crate) fn from_parts(
        segments: Vec<TrackSegment>,
        length: f32,
        pickups: Vec<Pickup>,
        difficulty: f32,
    ) -> Self {
        debug_assert!(!segments.is_empty());
        let mesh = build_mesh(&segments);
        Self {
            segments,
            mesh,
            length,
            pickups,
            difficulty,
        }
    }

    #[inline]
    pub fn segments(&self) -> &[TrackSegment] {
        &self.segments
    }

    #[inline]
    pub fn first_segment(&self) -> &TrackSegment {
        &self.segments[0]
    }

    #[inline]
    pub fn last_segment(&self) -> &TrackSegment {
        &self.segments[self.segments.len() - 1]
    }

    #[inline]
    pub fn mesh(&self) -> &[MeshVertex] {
        &self.mesh
    }

    /// Interleaved position/normal floats, ready for a vertex buffer upload.
    pub fn mesh_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.mesh)
    }

    #[inline]
    pub fn length(&self) -> f32 {
        self.length
    }

    #[inline]
    pub fn difficulty(&self) -> f32 {
        self.difficulty
    }

    #[inline]
    pub fn pickups(&self) -> &[Pickup] {
        &self.pickups
    }

    #[inline]
    pub fn pickups_mut(&mut self) -> &mut [Pickup] {
        &mut self.pickups
    }

    /// Start for the track that continues this one seamlessly.
    pub fn continuation(&self) -> TrackStart {
        let last = self.last_segment();
        TrackStart {
            point: last.end_point(),
            direction: last.dir,
            height: last.height,
            length: None,
            width: Some(last.width),
        }
    }
}
