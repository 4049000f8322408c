use core::mem;

use glam::Vec2;

use super::query::Lookup;
use super::{TraceHit, Track, TrackQuery, TrackSegment};
use crate::pickup::Pickup;

/// The track being driven plus the one already generated past its end.
///
/// Distances on `next` are reported offset by the current length so progress
/// keeps increasing across the seam.
#[derive(Clone, Debug)]
pub struct TrackPair {
    current: Track,
    next: Track,
}

impl TrackPair {
    pub fn new(current: Track, next: Track) -> Self {
        Self { current, next }
    }

    #[inline]
    pub fn current(&self) -> &Track {
        &self.current
    }

    #[inline]
    pub fn next(&self) -> &Track {
        &self.next
    }

    /// Promotes `next` to current, installs `upcoming` behind it and hands
    /// back the retired track.
    pub fn advance(&mut self, upcoming: Track) -> Track {
        let promoted = mem::replace(&mut self.next, upcoming);
        mem::replace(&mut self.current, promoted)
    }

    pub fn pickups(&self) -> impl Iterator<Item = &Pickup> {
        self.current.pickups().iter().chain(self.next.pickups())
    }

    pub fn pickups_mut(&mut self) -> impl Iterator<Item = &mut Pickup> {
        self.current
            .pickups_mut()
            .iter_mut()
            .chain(self.next.pickups_mut().iter_mut())
    }

    pub fn tracks(&self) -> [&Track; 2] {
        [&self.current, &self.next]
    }
}

impl TrackQuery for TrackPair {
    fn trace_height(&self, p: Vec2) -> Option<TraceHit> {
        match self.current.locate(p) {
            Lookup::Exhausted { past_end: true, .. } => {
                self.next.trace_height(p).map(|hit| TraceHit {
                    distance_along: hit.distance_along + self.current.length(),
                    ..hit
                })
            }
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
        let index = match self.current.locate(p) {
            Lookup::Exhausted { past_end: true, .. } => return self.next.find_nearest_segment(p),
            Lookup::Within { index, .. } => index,
            Lookup::Exhausted { nearest, .. } => nearest,
        };
        &self.current.segments()[index]
    }
}
