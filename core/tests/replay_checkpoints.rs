use fuelrun_core::input::{INPUT_ACCELERATE, INPUT_DECELERATE, INPUT_LEFT, INPUT_RIGHT};
use fuelrun_core::tape::TapeParams;
use fuelrun_core::verify::{replay_inputs, replay_with_checkpoints};
use fuelrun_core::{SessionSnapshot, SimConfig};

const PARAMS: TapeParams = TapeParams {
    seed: 0xDEAD_BEEF,
    difficulty_base: 0.1,
    tick_rate: 60,
};

/// Throttle with short steering taps and an occasional brake.
fn scripted_inputs(frames: usize) -> Vec<u8> {
    (0..frames)
        .map(|i| match i % 120 {
            10..=14 => INPUT_ACCELERATE | INPUT_LEFT,
            70..=74 => INPUT_ACCELERATE | INPUT_RIGHT,
            100..=103 => INPUT_DECELERATE,
            _ => INPUT_ACCELERATE,
        })
        .collect()
}

fn mix_u64(hash: u64, value: u64) -> u64 {
    // FNV-1a style mix for stable checkpoint fingerprinting.
    hash.wrapping_mul(0x0000_0100_0000_01B3) ^ value
}

fn checkpoint_fingerprint(checkpoints: &[SessionSnapshot]) -> u64 {
    let mut hash = 0xCBF2_9CE4_8422_2325u64;

    for checkpoint in checkpoints {
        hash = mix_u64(hash, checkpoint.tick as u64);
        hash = mix_u64(hash, checkpoint.level as u64);
        hash = mix_u64(hash, checkpoint.state as u64);
        hash = mix_u64(hash, checkpoint.position.x.to_bits() as u64);
        hash = mix_u64(hash, checkpoint.position.y.to_bits() as u64);
        hash = mix_u64(hash, checkpoint.position.z.to_bits() as u64);
        hash = mix_u64(hash, checkpoint.speed.to_bits() as u64);
        hash = mix_u64(hash, checkpoint.heading.to_bits() as u64);
        hash = mix_u64(hash, checkpoint.fuel.to_bits() as u64);
        hash = mix_u64(hash, checkpoint.total_distance.to_bits() as u64);
        hash = mix_u64(hash, checkpoint.stats.fuel_collected as u64);
        hash = mix_u64(hash, checkpoint.stats.hazards_hit as u64);
        hash = mix_u64(hash, checkpoint.stats.falls as u64);
        hash = mix_u64(hash, checkpoint.game_over as u64);
    }

    hash
}

#[test]
fn checkpoint_fingerprint_is_stable_across_replays() {
    let inputs = scripted_inputs(1_500);
    let config = SimConfig::default();

    let first = replay_with_checkpoints(&config, &PARAMS, &inputs, 50).expect("replay runs");
    let second = replay_with_checkpoints(&config, &PARAMS, &inputs, 50).expect("replay runs");

    assert_eq!(first.len(), 30);
    assert_eq!(first.last().expect("checkpoint").tick, 1_500);
    assert_eq!(checkpoint_fingerprint(&first), checkpoint_fingerprint(&second));
}

#[test]
fn coarse_checkpoints_are_a_subset_of_fine_ones() {
    let inputs = scripted_inputs(900);
    let config = SimConfig::default();

    let fine = replay_with_checkpoints(&config, &PARAMS, &inputs, 10).expect("replay runs");
    let coarse = replay_with_checkpoints(&config, &PARAMS, &inputs, 100).expect("replay runs");

    for checkpoint in &coarse {
        let matching = fine
            .iter()
            .find(|c| c.tick == checkpoint.tick)
            .expect("coarse tick is also sampled finely");
        assert_eq!(matching, checkpoint);
    }

    let full = replay_inputs(&config, &PARAMS, &inputs).expect("replay runs");
    assert_eq!(coarse.last(), Some(&full.snapshot));
}

#[test]
fn different_seeds_diverge() {
    let inputs = scripted_inputs(600);
    let config = SimConfig::default();
    let other = TapeParams {
        seed: PARAMS.seed ^ 0x5555,
        ..PARAMS
    };

    let a = replay_with_checkpoints(&config, &PARAMS, &inputs, 60).expect("replay runs");
    let b = replay_with_checkpoints(&config, &other, &inputs, 60).expect("replay runs");
    assert_ne!(checkpoint_fingerprint(&a), checkpoint_fingerprint(&b));
}
