use crate::bots::{bot_fingerprint, create_bot, AutopilotBot};
use anyhow::{anyhow, Context, Result};
use fuelrun_core::constants::TICK_RATE_HZ;
use fuelrun_core::input::{
    encode_input_byte, FrameInput, INPUT_ACCELERATE, INPUT_DECELERATE, INPUT_LEFT, INPUT_RIGHT,
};
use fuelrun_core::tape::{serialize_tape, TapeParams};
use fuelrun_core::verify::{replay_session, step_frame};
use fuelrun_core::{verify_tape, SimConfig};
use serde::Serialize;
use std::fs;
use std::path::Path;
use tracing::debug;

#[derive(Clone, Debug, Serialize)]
pub struct RunMetrics {
    pub bot_id: String,
    pub bot_fingerprint: String,
    pub seed: u32,
    pub max_ticks: u32,
    pub frame_count: u32,
    pub final_distance: f32,
    pub final_level: u16,
    pub final_fuel: f32,
    pub game_over: bool,
    pub fuel_collected: u32,
    pub hazards_hit: u32,
    pub falls: u32,
    pub respawns: u32,
    pub tape_checksum: u32,
    pub action_frames: u32,
    pub steer_frames: u32,
    pub throttle_frames: u32,
    pub brake_frames: u32,
}

#[derive(Clone, Debug)]
pub struct RunArtifact {
    pub metrics: RunMetrics,
    pub inputs: Vec<u8>,
    pub tape: Vec<u8>,
}

pub fn run_bot(
    bot_id: &str,
    seed: u32,
    config: &SimConfig,
    max_ticks: u32,
) -> Result<RunArtifact> {
    if max_ticks == 0 {
        return Err(anyhow!("max_ticks must be > 0"));
    }

    let mut bot = create_bot(bot_id).ok_or_else(|| anyhow!("unknown bot '{bot_id}'"))?;
    run_bot_instance(bot.as_mut(), seed, config, max_ticks)
}

/// Drives one session with `bot`, records the inputs and checks that the
/// resulting tape replays to the same footer.
pub fn run_bot_instance(
    bot: &mut dyn AutopilotBot,
    seed: u32,
    config: &SimConfig,
    max_ticks: u32,
) -> Result<RunArtifact> {
    if max_ticks == 0 {
        return Err(anyhow!("max_ticks must be > 0"));
    }

    bot.reset(seed);

    let params = TapeParams {
        seed,
        difficulty_base: config.session.difficulty_base,
        tick_rate: TICK_RATE_HZ,
    };
    let mut session = replay_session(config, &params)
        .map_err(|err| anyhow!("session failed to start: {err}"))?;

    let mut inputs = Vec::with_capacity(max_ticks as usize);
    let mut prev = FrameInput::default();
    while session.tick_count() < max_ticks && !session.is_game_over() {
        let byte = encode_input_byte(bot.next_input(&session));
        prev = step_frame(&mut session, &params, prev, byte)
            .with_context(|| format!("tick {} failed", session.tick_count()))?;
        inputs.push(byte);
    }

    let final_distance = session.total_distance();
    let final_level = session.level();
    let tape = serialize_tape(&params, &inputs, final_distance, final_level);
    let report = verify_tape(config, &tape, max_ticks)
        .map_err(|err| anyhow!("generated tape failed verification: {err}"))?;

    let mut action_frames = 0u32;
    let mut steer_frames = 0u32;
    let mut throttle_frames = 0u32;
    let mut brake_frames = 0u32;
    for byte in &inputs {
        if *byte != 0 {
            action_frames += 1;
        }
        if (*byte & (INPUT_LEFT | INPUT_RIGHT)) != 0 {
            steer_frames += 1;
        }
        if (*byte & INPUT_ACCELERATE) != 0 {
            throttle_frames += 1;
        }
        if (*byte & INPUT_DECELERATE) != 0 {
            brake_frames += 1;
        }
    }

    let stats = session.stats();
    debug!(
        bot = bot.id(),
        seed,
        frames = inputs.len(),
        distance = final_distance,
        level = final_level,
        "run finished"
    );

    Ok(RunArtifact {
        metrics: RunMetrics {
            bot_id: bot.id().to_string(),
            bot_fingerprint: bot_fingerprint(bot.id()).unwrap_or_else(|| "unknown".to_string()),
            seed,
            max_ticks,
            frame_count: report.frame_count,
            final_distance,
            final_level,
            final_fuel: session.vehicle().fuel(),
            game_over: session.is_game_over(),
            fuel_collected: stats.fuel_collected,
            hazards_hit: stats.hazards_hit,
            falls: stats.falls,
            respawns: stats.respawns,
            tape_checksum: report.tape_checksum,
            action_frames,
            steer_frames,
            throttle_frames,
            brake_frames,
        },
        inputs,
        tape,
    })
}

pub fn write_tape(path: &Path, bytes: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed creating directory {}", parent.display()))?;
    }
    fs::write(path, bytes).with_context(|| format!("failed writing {}", path.display()))
}
