use super::*;
use crate::constants::{SEGMENT_MAX_WIDTH, SEGMENT_MIN_WIDTH};
use crate::error::TrackError;
use crate::pickup::PickupKind;
use crate::rng::SeededRng;

const SEED: u32 = 0xDEC0_DE01;

fn track_with(config: &TrackConfig, difficulty: f32, seed: u32) -> Track {
    generate(
        config,
        difficulty,
        TrackStart::from_config(config),
        &mut SeededRng::new(seed),
    )
    .expect("track generates")
}

fn default_track() -> Track {
    track_with(&TrackConfig::default(), 0.5, SEED)
}

fn straight_config() -> TrackConfig {
    TrackConfig {
        max_angle_delta: 0.0,
        max_distance: 200.0,
        ..TrackConfig::default()
    }
}

#[test]
fn default_run_covers_one_kilometre() {
    let track = track_with(&TrackConfig::default(), 0.0, SEED);
    let count = track.segments().len();
    assert!((34..=50).contains(&count), "got {count} segments");

    let last = track.last_segment();
    assert!((last.distance + last.length - 1000.0).abs() < 1.0);
    assert!((track.length() - (last.distance + last.length)).abs() < 1e-3);
    assert_eq!(track.first_segment().length, SEGMENT_MAX_LENGTH);
    assert_eq!(track.first_segment().point, Vec2::ZERO);
}

#[test]
fn hazard_free_tracks_span_one_kilometre_for_many_seeds() {
    let config = TrackConfig::default();
    for seed in 1..200 {
        let track = track_with(&config, 0.0, seed);
        let count = track.segments().len();
        assert!((34..=50).contains(&count), "seed {seed}: {count} segments");

        let last = track.last_segment();
        let end = last.distance + last.length;
        assert!((end - 1000.0).abs() <= 1.0, "seed {seed}: ends at {end}");
        for segment in track.segments() {
            assert!(
                track.trace_height(segment.center()).is_some(),
                "seed {seed}: center at {} is off-road",
                segment.distance
            );
        }
    }
}

#[test]
fn road_never_heads_backwards() {
    let track = default_track();
    for pair in track.segments().windows(2) {
        assert!(pair[1].dir.y >= 0.0);
        assert!(pair[1].distance > pair[0].distance);
        assert!(pair[1].point.y >= pair[0].point.y);
        assert!((pair[1].point - pair[0].end_point()).length() < 1e-3);
    }
    for segment in track.segments() {
        assert!((segment.dir.length() - 1.0).abs() < 1e-5);
        assert!(segment.dir.dot(segment.tangent).abs() < 1e-5);
        assert!(segment.width >= SEGMENT_MIN_WIDTH && segment.width <= SEGMENT_MAX_WIDTH);
    }
}

#[test]
fn segment_centers_are_on_the_road() {
    let track = default_track();
    for segment in track.segments() {
        let hit = track
            .trace_height(segment.center())
            .unwrap_or_else(|| panic!("center of segment at {} is off-road", segment.distance));
        assert!((hit.height - segment.height).abs() < 1e-3);
        assert!((hit.distance_along - (segment.distance + 0.5 * segment.length)).abs() < 1e-2);
    }
}

#[test]
fn points_past_the_side_are_off_the_road() {
    let track = default_track();
    let segments = track.segments();
    for (i, segment) in segments.iter().enumerate() {
        // The band's far edge is the next segment's start edge, which may be
        // wider or turned, so the road can reach past this segment's own
        // half width. It never reaches past the wider of the two.
        let far_width = segments.get(i + 1).map_or(segment.width, |next| next.width);
        let reach = 0.5 * segment.width.max(far_width) + 0.1;
        assert_eq!(track.trace_height(segment.center() + reach * segment.tangent), None);
        assert_eq!(track.trace_height(segment.center() - reach * segment.tangent), None);
    }
}

#[test]
fn straight_edges_are_exact() {
    let track = track_with(&straight_config(), 0.0, SEED);
    for segment in &track.segments()[..track.segments().len() - 1] {
        let near_start = segment.point + 0.01 * segment.dir;
        let half = 0.5 * segment.width;
        assert!(track.trace_height(near_start + (half - 0.5) * segment.tangent).is_some());
        assert!(track.trace_height(near_start + (half + 0.5) * segment.tangent).is_none());
    }
}

#[test]
fn nearest_segment_falls_back_to_the_ends() {
    let track = default_track();
    assert_eq!(
        track.find_nearest_segment(Vec2::new(0.0, -100.0)),
        track.first_segment()
    );
    assert_eq!(
        track.find_nearest_segment(Vec2::new(0.0, 1.0e6)),
        track.last_segment()
    );
    let middle = &track.segments()[track.segments().len() / 2];
    assert_eq!(track.find_nearest_segment(middle.center()), middle);
}

#[test]
fn beyond_the_end_is_off_the_road() {
    let track = default_track();
    let last = track.last_segment();
    assert_eq!(track.trace_height(last.end_point() + 5.0 * last.dir), None);
    assert_eq!(track.trace_height(Vec2::new(0.0, -5.0)), None);
}

#[test]
fn zero_difficulty_places_only_the_start_bonus() {
    let track = track_with(&TrackConfig::default(), 0.0, SEED);
    let kinds: Vec<_> = track.pickups().iter().map(|p| p.kind()).collect();
    assert_eq!(kinds, vec![PickupKind::Fuel, PickupKind::Hazard]);

    let fuel = track.pickups()[0].position();
    assert_eq!(fuel, Vec3::new(0.0, 12.0, SEGMENT_START_HEIGHT));
    assert!(track.trace_height(fuel.truncate()).is_some());
}

#[test]
fn full_difficulty_puts_a_hazard_on_every_segment() {
    let config = TrackConfig::default();
    let track = track_with(&config, 1.0, SEED);
    let hazards: Vec<_> = track
        .pickups()
        .iter()
        .filter(|p| p.kind() == PickupKind::Hazard)
        .collect();
    assert_eq!(hazards.len(), track.segments().len() + 1);

    // Every rolled hazard sits inside its segment, clear of the edges.
    for hazard in &hazards[..track.segments().len()] {
        let spot = hazard.position().truncate();
        let inside = track.segments().iter().any(|s| {
            let along = s.dir.dot(spot - s.point);
            let lateral = s.tangent.dot(spot - s.point);
            along >= -1e-3
                && along <= s.length + 1e-3
                && lateral.abs() <= 0.5 * s.width - config.hazard_edge_margin + 1e-3
        });
        assert!(inside, "hazard at {spot} is outside every segment");
    }
}

#[test]
fn same_seed_same_road() {
    let a = default_track();
    let b = default_track();
    assert_eq!(a.segments(), b.segments());
    assert_eq!(a.pickups(), b.pickups());

    let c = track_with(&TrackConfig::default(), 0.5, SEED + 1);
    assert_ne!(a.segments(), c.segments());
}

#[test]
fn rejects_bad_inputs() {
    let config = TrackConfig::default();
    let mut rng = SeededRng::new(1);
    assert_eq!(
        generate(&config, 1.5, TrackStart::default(), &mut rng).unwrap_err(),
        TrackError::DifficultyOutOfRange { difficulty: 1.5 }
    );

    let broken = TrackConfig {
        min_width: 0.0,
        ..config
    };
    assert!(matches!(
        generate(&broken, 0.0, TrackStart::default(), &mut rng),
        Err(TrackError::InvalidConfig(_))
    ));

    let nowhere = TrackStart {
        direction: Vec2::ZERO,
        ..TrackStart::default()
    };
    assert_eq!(
        generate(&config, 0.0, nowhere, &mut rng).unwrap_err(),
        TrackError::DegenerateStart
    );
}

#[test]
fn continuation_picks_up_at_the_far_edge() {
    let track = default_track();
    let start = track.continuation();
    let last = track.last_segment();
    assert_eq!(start.point, last.end_point());
    assert_eq!(start.direction, last.dir);
    assert_eq!(start.width, Some(last.width));
    assert_eq!(start.length, None);

    let next = generate(
        &TrackConfig::default(),
        0.0,
        start,
        &mut SeededRng::new(SEED),
    )
    .expect("continuation generates");
    assert_eq!(next.first_segment().width, last.width);
    assert_eq!(next.first_segment().length, SEGMENT_MAX_LENGTH);
}

#[test]
fn mesh_matches_segment_count() {
    let track = default_track();
    assert_eq!(
        track.mesh().len(),
        track.segments().len() * FACES_PER_SECTION * 6
    );
    assert_eq!(
        track.mesh_bytes().len(),
        track.mesh().len() * core::mem::size_of::<MeshVertex>()
    );
}

fn straight_pair() -> TrackPair {
    let config = straight_config();
    let mut rng = SeededRng::new(SEED);
    let current = generate(&config, 0.0, TrackStart::from_config(&config), &mut rng)
        .expect("current generates");
    let next = generate(&config, 0.0, current.continuation(), &mut rng).expect("next generates");
    TrackPair::new(current, next)
}

#[test]
fn pair_reports_next_track_progress_past_the_seam() {
    let pair = straight_pair();
    let first = *pair.next().first_segment();
    let hit = pair.trace_height(first.center()).expect("next track is drivable");
    let expected = pair.current().length() + 0.5 * first.length;
    assert!((hit.distance_along - expected).abs() < 1e-2);
    assert_eq!(pair.find_nearest_segment(first.center()), &first);

    let inside = pair.current().segments()[1].center();
    let hit = pair.trace_height(inside).expect("current track is drivable");
    assert!(hit.distance_along < pair.current().length());
    assert_eq!(pair.pickups().count(), 4);
}

#[test]
fn pair_nearest_segment_matches_the_owning_track() {
    let pair = straight_pair();
    let current = pair.current();
    let probes = [
        current.segments()[2].center(),
        Vec2::new(0.0, -50.0),
        current.segments()[3].center() + Vec2::new(500.0, 0.0),
    ];
    for p in probes {
        let from_pair = pair.find_nearest_segment(p);
        assert!(core::ptr::eq(from_pair, current.find_nearest_segment(p)));
    }

    let past = pair.next().segments()[1].center();
    assert!(core::ptr::eq(
        pair.find_nearest_segment(past),
        pair.next().find_nearest_segment(past)
    ));
}

#[test]
fn pair_advance_hands_back_the_retired_track() {
    let mut pair = straight_pair();
    let first_of_next = *pair.next().first_segment();
    let old_length = pair.current().length();

    let upcoming = generate(
        &straight_config(),
        0.0,
        pair.next().continuation(),
        &mut SeededRng::new(7),
    )
    .expect("upcoming generates");
    let retired = pair.advance(upcoming);

    assert_eq!(retired.length(), old_length);
    assert_eq!(pair.current().first_segment(), &first_of_next);
    assert_eq!(
        pair.next().first_segment().point,
        pair.current().last_segment().end_point()
    );
}
