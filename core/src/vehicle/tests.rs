use super::*;
use crate::config::TrackConfig;
use crate::constants::VEHICLE_BASE_ACCEL;
use crate::input::{ButtonState, FrameInput};
use crate::rng::SeededRng;
use crate::track::{generate, Track, TrackStart};

const DT: f32 = 1.0 / 60.0;
const ROAD_WIDTH: f32 = 16.0;

/// Dead-straight road of constant width along +Y.
fn straight_track() -> Track {
    let config = TrackConfig {
        min_width: ROAD_WIDTH,
        max_width: ROAD_WIDTH,
        max_angle_delta: 0.0,
        max_distance: 300.0,
        ..TrackConfig::default()
    };
    generate(
        &config,
        0.0,
        TrackStart::from_config(&config),
        &mut SeededRng::new(0x5EED),
    )
    .expect("straight track generates")
}

fn vehicle_at(x: f32, y: f32) -> Vehicle {
    let mut vehicle = Vehicle::new(VehicleConfig::default(), VehicleAssets::default());
    vehicle.place(Vec3::new(x, y, SEGMENT_START_HEIGHT), FRAC_PI_2);
    vehicle
}

fn held(input: FrameInput) -> Controls {
    Controls::from_held(input, input)
}

fn accelerate() -> Controls {
    held(FrameInput {
        accelerate: true,
        ..FrameInput::default()
    })
}

#[test]
fn reset_restores_start_line() {
    let track = straight_track();
    let mut vehicle = vehicle_at(3.0, 100.0);
    vehicle.burn_fuel(0.5);
    vehicle.speed = 20.0;
    vehicle.tick(DT, &accelerate(), &track);

    vehicle.reset();
    assert_eq!(vehicle.fuel(), 1.0);
    assert_eq!(vehicle.distance(), 0.0);
    assert_eq!(vehicle.speed(), 0.0);
    assert_eq!(vehicle.heading(), FRAC_PI_2);
    assert_eq!(vehicle.position(), Vec3::new(0.0, 4.0, 50.0));
    assert_eq!(vehicle.state(), LifeState::Driving);
}

#[test]
fn throttle_accelerates_and_snaps_to_road_height() {
    let track = straight_track();
    let mut vehicle = vehicle_at(0.0, 10.0);
    vehicle.position.z = 60.0;

    vehicle.tick(DT, &accelerate(), &track);

    let expected = VEHICLE_BASE_ACCEL * DT * VehicleConfig::default().drag;
    assert!((vehicle.speed() - expected).abs() < 1e-6);
    assert!((vehicle.position().z - SEGMENT_START_HEIGHT).abs() < 1e-4);
    assert!(vehicle.position().y > 10.0);
    assert!(vehicle.distance() > 9.9);
    assert_eq!(vehicle.state(), LifeState::Driving);
}

#[test]
fn engine_brake_settles_on_exact_zero() {
    let track = straight_track();
    for start in [0.2f32, -0.2, 0.3] {
        let mut vehicle = vehicle_at(0.0, 10.0);
        vehicle.speed = start;
        for _ in 0..10 {
            vehicle.tick(DT, &Controls::default(), &track);
            assert_eq!(vehicle.speed(), 0.0, "start speed {start}");
        }
    }
}

#[test]
fn holding_brake_stops_at_zero_without_fresh_press() {
    let track = straight_track();
    let mut vehicle = vehicle_at(0.0, 10.0);
    vehicle.speed = 0.5;
    let brake = FrameInput {
        decelerate: true,
        ..FrameInput::default()
    };

    vehicle.tick(DT, &held(brake), &track);
    assert_eq!(vehicle.speed(), 0.0);
    vehicle.tick(DT, &held(brake), &track);
    assert_eq!(vehicle.speed(), 0.0);

    vehicle.tick(DT, &Controls::from_held(FrameInput::default(), brake), &track);
    assert!(vehicle.speed() < 0.0, "fresh press engages reverse");
}

#[test]
fn steering_left_turns_counter_clockwise() {
    let track = straight_track();
    let mut vehicle = vehicle_at(0.0, 10.0);
    vehicle.speed = 10.0;
    let left = FrameInput {
        left: true,
        ..FrameInput::default()
    };

    vehicle.tick(DT, &held(left), &track);
    assert!(vehicle.heading() > FRAC_PI_2);
    assert!(vehicle.steering() > 0.0);
    assert!(vehicle.steering() < VehicleConfig::default().max_steering_angle);
}

#[test]
fn both_steering_buttons_cancel_out() {
    let track = straight_track();
    let mut vehicle = vehicle_at(0.0, 10.0);
    vehicle.speed = 10.0;
    let both = FrameInput {
        left: true,
        right: true,
        ..FrameInput::default()
    };

    vehicle.tick(DT, &held(both), &track);
    assert_eq!(vehicle.steering(), 0.0);
}

#[test]
fn no_steering_at_max_speed() {
    let track = straight_track();
    let mut vehicle = vehicle_at(0.0, 10.0);
    vehicle.speed = 60.0;
    let right = FrameInput {
        right: true,
        ..FrameInput::default()
    };

    vehicle.tick(DT, &held(right), &track);
    assert_eq!(vehicle.steering(), 0.0);
}

#[test]
fn hazard_spin_ignores_inputs_until_it_wears_off() {
    let track = straight_track();
    let mut vehicle = vehicle_at(0.0, 10.0);
    vehicle.on_hazard();

    vehicle.tick(0.25, &accelerate(), &track);
    assert_eq!(vehicle.speed(), 0.0);
    assert_eq!(vehicle.spin_timer(), 0.25);

    vehicle.tick(0.25, &accelerate(), &track);
    assert_eq!(vehicle.speed(), 0.0);
    assert_eq!(vehicle.spin_timer(), 0.0);

    vehicle.tick(0.25, &accelerate(), &track);
    assert!(vehicle.speed() > 0.0);
}

#[test]
fn grazing_edge_escalates_through_every_state_in_order() {
    let track = straight_track();
    // Center on the road, right probe half a unit past the edge.
    let mut vehicle = vehicle_at(0.5 * ROAD_WIDTH - 0.5, 10.0);
    let dt = 0.25;

    let mut kinds = vec![vehicle.state().kind()];
    let mut grazing = Vec::new();
    let mut fall_velocities = Vec::new();

    for _ in 0..40 {
        vehicle.tick(dt, &Controls::default(), &track);
        match vehicle.state() {
            LifeState::GrazingEdge { elapsed } => grazing.push(elapsed),
            LifeState::Fallen { velocity, .. } => fall_velocities.push(velocity.z),
            _ => {}
        }
        if kinds.last() != Some(&vehicle.state().kind()) {
            kinds.push(vehicle.state().kind());
        }
    }

    assert_eq!(
        kinds,
        vec![
            LifeStateKind::Driving,
            LifeStateKind::GrazingEdge,
            LifeStateKind::Fallen,
            LifeStateKind::Exploded,
        ]
    );
    // The entry tick already counts; exactly at grace is still grazing.
    assert_eq!(grazing, vec![0.25, 0.5, 0.75, 1.0]);
    assert!(fall_velocities.len() >= 2);
    assert!(fall_velocities.windows(2).all(|w| w[1] < w[0]));
}

#[test]
fn grazing_timer_resets_when_back_on_road() {
    let track = straight_track();
    let mut vehicle = vehicle_at(0.5 * ROAD_WIDTH - 0.5, 10.0);

    vehicle.tick(0.25, &Controls::default(), &track);
    assert_eq!(vehicle.state(), LifeState::GrazingEdge { elapsed: 0.25 });
    vehicle.tick(0.25, &Controls::default(), &track);
    assert_eq!(vehicle.state(), LifeState::GrazingEdge { elapsed: 0.5 });

    vehicle.position.x = 0.0;
    vehicle.tick(0.25, &Controls::default(), &track);
    assert_eq!(vehicle.state(), LifeState::Driving);
    assert_eq!(vehicle.probes(), ProbeResults::ALL_ON);
}

#[test]
fn losing_the_center_probe_falls_immediately_with_side_nudge() {
    let track = straight_track();
    // Center and right probe off the right edge, left probe still on.
    let mut vehicle = vehicle_at(0.5 * ROAD_WIDTH + 0.5, 10.0);

    vehicle.tick(DT, &Controls::default(), &track);

    let LifeState::Fallen { velocity, .. } = vehicle.state() else {
        panic!("expected fall, got {:?}", vehicle.state());
    };
    assert_eq!(velocity.z, VehicleConfig::default().jump_up);
    assert!((velocity.x - VehicleConfig::default().side_nudge).abs() < 1e-4);
    assert!(vehicle.probes().left);
    assert!(!vehicle.probes().center && !vehicle.probes().right);
}

#[test]
fn explosion_only_counts_time() {
    let track = straight_track();
    let mut vehicle = vehicle_at(0.0, 10.0);
    let center = Vec3::new(1.0, 2.0, 3.0);
    vehicle.state = LifeState::Exploded {
        elapsed: 0.0,
        center,
    };
    let before = vehicle.position();

    vehicle.tick(0.5, &accelerate(), &track);
    assert_eq!(
        vehicle.state(),
        LifeState::Exploded {
            elapsed: 0.5,
            center
        }
    );
    assert_eq!(vehicle.position(), before);
    assert_eq!(vehicle.speed(), 0.0);
}

#[test]
fn respawn_returns_to_road_near_last_ground_contact() {
    let track = straight_track();
    let mut vehicle = vehicle_at(0.0, 95.0);
    vehicle.tick(DT, &Controls::default(), &track);
    let anchor = vehicle.last_on_track();

    vehicle.position = Vec3::new(40.0, 95.0, -20.0);
    vehicle.state = LifeState::Exploded {
        elapsed: 2.0,
        center: vehicle.position,
    };
    vehicle.on_hazard();

    vehicle.respawn(&track);

    let segment = track.find_nearest_segment(anchor);
    assert_eq!(vehicle.state(), LifeState::Driving);
    assert_eq!(vehicle.speed(), 0.0);
    assert_eq!(vehicle.spin_timer(), 0.0);
    assert_eq!(vehicle.position().z, segment.height);
    assert!((vehicle.heading() - angle_from_dir(segment.dir)).abs() < 1e-6);
    assert!(track.trace_height(vehicle.position().truncate()).is_some());

    vehicle.tick(DT, &Controls::default(), &track);
    assert_eq!(vehicle.state(), LifeState::Driving);
}

#[test]
fn fuel_burn_clamps_at_empty() {
    let mut vehicle = vehicle_at(0.0, 10.0);
    vehicle.burn_fuel(0.75);
    assert_eq!(vehicle.fuel(), 0.25);
    vehicle.burn_fuel(1.0);
    assert_eq!(vehicle.fuel(), 0.0);
    vehicle.on_fuel();
    assert_eq!(vehicle.fuel(), 1.0);
}

#[test]
fn pressed_flag_only_matters_for_the_brake() {
    let controls = Controls {
        decelerate: ButtonState {
            down: true,
            pressed: true,
        },
        ..Controls::default()
    };
    let track = straight_track();
    let mut vehicle = vehicle_at(0.0, 10.0);
    vehicle.tick(DT, &controls, &track);
    assert!(vehicle.speed() < 0.0);
}
