//! One playthrough: a vehicle driving an endless chain of generated tracks.
//!
//! Two tracks are alive at any time. Crossing the end of the current one
//! retires it, promotes the next and generates a fresh one behind that, one
//! difficulty step harder.

use glam::{Mat4, Vec3};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::config::SimConfig;
use crate::error::SessionError;
use crate::input::Controls;
use crate::pickup::PickupKind;
use crate::render::{DrawSink, Drawable, PickupAssets, VehicleAssets};
use crate::rng::SeededRng;
use crate::track::{generate, Track, TrackPair, TrackStart};
use crate::vehicle::{LifeState, LifeStateKind, Vehicle};

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct GameAssets {
    pub vehicle: VehicleAssets,
    pub pickups: PickupAssets,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionStats {
    pub fuel_collected: u32,
    pub hazards_hit: u32,
    pub falls: u32,
    pub explosions: u32,
    pub respawns: u32,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub tick: u32,
    pub level: u16,
    pub state: LifeStateKind,
    pub position: Vec3,
    pub speed: f32,
    pub heading: f32,
    pub fuel: f32,
    /// Progress along the current track.
    pub distance: f32,
    /// Progress since the start of the run.
    pub total_distance: f32,
    pub stats: SessionStats,
    pub game_over: bool,
}

pub struct Session {
    config: SimConfig,
    seed: u32,
    rng: SeededRng,
    tracks: TrackPair,
    vehicle: Vehicle,
    pickup_assets: PickupAssets,
    level: u16,
    tick: u32,
    completed_distance: f32,
    stats: SessionStats,
    game_over: bool,
}

impl Session {
    pub fn new(config: SimConfig, seed: u32, assets: GameAssets) -> Result<Self, SessionError> {
        config.validate()?;

        let mut rng = SeededRng::new(seed);
        let level = 1;
        let current = generate_level(
            &config,
            level,
            TrackStart::from_config(&config.track),
            &mut rng,
        )?;
        let next = generate_level(&config, level + 1, current.continuation(), &mut rng)?;
        info!(
            seed,
            segments = current.segments().len(),
            length = current.length(),
            "session started"
        );

        Ok(Self {
            vehicle: Vehicle::new(config.vehicle, assets.vehicle),
            config,
            seed,
            rng,
            tracks: TrackPair::new(current, next),
            pickup_assets: assets.pickups,
            level,
            tick: 0,
            completed_distance: 0.0,
            stats: SessionStats::default(),
            game_over: false,
        })
    }

    /// Advances the run by one fixed step. A finished run only counts ticks.
    pub fn tick(&mut self, dt: f32, controls: &Controls) -> Result<(), SessionError> {
        self.tick = self.tick.saturating_add(1);
        if self.game_over {
            return Ok(());
        }

        let controls = if self.vehicle.fuel() <= 0.0 {
            controls.without_throttle()
        } else {
            *controls
        };

        let before = self.vehicle.state().kind();
        let prev_distance = self.vehicle.distance();
        self.vehicle.tick(dt, &controls, &self.tracks);
        let after = self.vehicle.state().kind();
        if before != after {
            match after {
                LifeStateKind::Fallen => self.stats.falls += 1,
                LifeStateKind::Exploded => self.stats.explosions += 1,
                _ => {}
            }
        }

        let alive = self.vehicle.is_alive();
        for pickup in self.tracks.pickups_mut() {
            pickup.tick(dt);
            if !alive {
                continue;
            }
            match pickup.try_collect(&mut self.vehicle) {
                Some(PickupKind::Fuel) => self.stats.fuel_collected += 1,
                Some(PickupKind::Hazard) => self.stats.hazards_hit += 1,
                None => {}
            }
        }

        let progress = (self.vehicle.distance() - prev_distance).max(0.0);
        self.vehicle
            .burn_fuel(progress * self.config.session.fuel_per_unit);

        if let LifeState::Exploded { elapsed, .. } = self.vehicle.state() {
            if elapsed >= self.config.session.respawn_delay {
                self.respawn_or_end();
            }
        }

        if self.vehicle.distance() > self.tracks.current().length() {
            self.advance_track()?;
        }

        if self.vehicle.is_alive() && self.vehicle.fuel() <= 0.0 && self.vehicle.speed() == 0.0 {
            self.end("out of fuel");
        }
        Ok(())
    }

    fn respawn_or_end(&mut self) {
        if let Some(max) = self.config.session.max_respawns {
            if self.stats.respawns >= max {
                self.end("no respawns left");
                return;
            }
        }
        self.vehicle.respawn(&self.tracks);
        self.stats.respawns += 1;
    }

    fn advance_track(&mut self) -> Result<(), SessionError> {
        let start = self.tracks.next().continuation();
        let upcoming = generate_level(
            &self.config,
            self.level.saturating_add(2),
            start,
            &mut self.rng,
        )?;
        let retired = self.tracks.advance(upcoming);
        self.completed_distance += retired.length();
        self.vehicle.rebase_distance(retired.length());
        self.level = self.level.saturating_add(1);
        info!(
            level = self.level,
            difficulty = self.tracks.current().difficulty(),
            total_distance = self.total_distance(),
            "advanced to next track"
        );
        Ok(())
    }

    fn end(&mut self, reason: &'static str) {
        self.game_over = true;
        info!(
            reason,
            tick = self.tick,
            level = self.level,
            total_distance = self.total_distance(),
            "game over"
        );
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            tick: self.tick,
            level: self.level,
            state: self.vehicle.state().kind(),
            position: self.vehicle.position(),
            speed: self.vehicle.speed(),
            heading: self.vehicle.heading(),
            fuel: self.vehicle.fuel(),
            distance: self.vehicle.distance(),
            total_distance: self.total_distance(),
            stats: self.stats,
            game_over: self.game_over,
        }
    }

    #[inline]
    pub fn total_distance(&self) -> f32 {
        self.completed_distance + self.vehicle.distance()
    }

    #[inline]
    pub fn track_pair(&self) -> &TrackPair {
        &self.tracks
    }

    #[inline]
    pub fn vehicle(&self) -> &Vehicle {
        &self.vehicle
    }

    #[inline]
    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    #[inline]
    pub fn seed(&self) -> u32 {
        self.seed
    }

    #[inline]
    pub fn level(&self) -> u16 {
        self.level
    }

    #[inline]
    pub fn tick_count(&self) -> u32 {
        self.tick
    }

    #[inline]
    pub fn stats(&self) -> SessionStats {
        self.stats
    }

    #[inline]
    pub fn is_game_over(&self) -> bool {
        self.game_over
    }
}

impl Drawable for Session {
    fn draw(&self, view_proj: Mat4, sink: &mut dyn DrawSink) {
        for track in self.tracks.tracks() {
            track.draw(view_proj, sink);
        }
        for pickup in self.tracks.pickups() {
            pickup.with_assets(&self.pickup_assets).draw(view_proj, sink);
        }
        self.vehicle.draw(view_proj, sink);
    }
}

fn generate_level(
    config: &SimConfig,
    level: u16,
    start: TrackStart,
    rng: &mut SeededRng,
) -> Result<Track, SessionError> {
    let difficulty = config.session.difficulty_for_level(level);
    Ok(generate(&config.track, difficulty, start, rng)?)
}
