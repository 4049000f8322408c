use glam::Vec2;

use super::{Track, TrackSegment};
use crate::geometry::trace_quad_height;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TraceHit {
    pub height: f32,
    pub distance_along: f32,
}

/// Read-only road queries the vehicle runs every tick.
pub trait TrackQuery {
    /// Road height and progress under `p`, or `None` when `p` is off the road.
    fn trace_height(&self, p: Vec2) -> Option<TraceHit>;

    /// Segment whose band contains `p`, else the first or last segment.
    fn find_nearest_segment(&self, p: Vec2) -> &TrackSegment;
}

/// Outcome of the binary search over segment bands.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) enum Lookup {
    Within {
        index: usize,
        distance_along: f32,
        height: Option<f32>,
    },
    Exhausted {
        nearest: usize,
        past_end: bool,
    },
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Side {
    Below,
    Above,
}

impl Track {
    pub(crate) fn locate(&self, p: Vec2) -> Lookup {
        let segments = self.segments();
        let count = segments.len();
        let mut lower = 0usize;
        let mut upper = count - 1;

        while lower <= upper {
            let pivot = (lower + upper) / 2;
            let s = &segments[pivot];
            let (b0, b1) = s.start_edge();
            let end = s.end_point();
            let (end_dir, (t0, t1)) = match segments.get(pivot + 1) {
                Some(next) => (next.dir, next.start_edge()),
                None => (s.dir, s.end_edge()),
            };

            let side = if p.y < b0.y.min(b1.y) {
                Side::Below
            } else if p.y > t0.y.max(t1.y) {
                Side::Above
            } else {
                let along = s.dir.dot(p - s.point);
                if along < 0.0 {
                    Side::Below
                } else if end_dir.dot(p - end) > 0.0 {
                    Side::Above
                } else {
                    return Lookup::Within {
                        index: pivot,
                        distance_along: s.distance + along,
                        height: trace_quad_height(p, [b0, b1, t0, t1]),
                    };
                }
            };

            match side {
                Side::Below => {
                    if pivot == 0 {
                        break;
                    }
                    upper = pivot - 1;
                }
                Side::Above => lower = pivot + 1,
            }
        }

        let nearest = if upper == 0 {
            0
        } else if lower >= count - 1 {
            count - 1
        } else {
            // Bands tile the road, so only points far off to the side can
            // fall between two of them.
            lower
        };
        Lookup::Exhausted {
            nearest,
            past_end: lower >= count,
        }
    }
}

impl TrackQuery for Track {
    fn trace_height(&self, p: Vec2) -> Option<TraceHit> {
        match self.locate(p) {
            Lookup::Within {
                distance_along,
                height: Some(height),
                ..
            } => Some(TraceHit {
                height,
                distance_along,
            }),
            _ => None,
        }
    }

    fn find_nearest_segment(&self, p: Vec2) -> &TrackSegment {
        let index = match self.locate(p) {
            Lookup::Within { index, .. } => index,
            Lookup::Exhausted { nearest, .. } => nearest,
        };
        debug_assert!(index < self.segments().len());
        &self.segments()[index]
    }
}
