//! Deterministic replay of input tapes and verification of their claims.

use serde::{Deserialize, Serialize};

use crate::config::SimConfig;
use crate::error::{SessionError, TapeError};
use crate::input::{decode_input_byte, Controls, FrameInput};
use crate::session::{GameAssets, Session, SessionSnapshot};
use crate::tape::{parse_tape, TapeParams, TapeView};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ReplayResult {
    pub frame_count: u32,
    pub final_distance: f32,
    pub final_level: u16,
    pub snapshot: SessionSnapshot,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct VerificationReport {
    pub seed: u32,
    pub frame_count: u32,
    pub final_distance: f32,
    pub final_level: u16,
    pub tape_checksum: u32,
}

/// Session exactly as a recorder with `params` would have started it.
pub fn replay_session(config: &SimConfig, params: &TapeParams) -> Result<Session, SessionError> {
    let mut config = *config;
    config.session.difficulty_base = params.difficulty_base;
    Session::new(config, params.seed, GameAssets::default())
}

/// Feeds one recorded byte, deriving press edges from the previous frame.
pub fn step_frame(
    session: &mut Session,
    params: &TapeParams,
    prev: FrameInput,
    byte: u8,
) -> Result<FrameInput, SessionError> {
    let now = decode_input_byte(byte);
    session.tick(params.dt(), &Controls::from_held(prev, now))?;
    Ok(now)
}

pub fn replay(config: &SimConfig, tape: &TapeView<'_>) -> Result<ReplayResult, SessionError> {
    replay_inputs(config, &tape.header.params, tape.inputs)
}

pub fn replay_inputs(
    config: &SimConfig,
    params: &TapeParams,
    inputs: &[u8],
) -> Result<ReplayResult, SessionError> {
    let mut session = replay_session(config, params)?;
    let mut prev = FrameInput::default();
    for &byte in inputs {
        prev = step_frame(&mut session, params, prev, byte)?;
    }
    Ok(ReplayResult {
        frame_count: session.tick_count(),
        final_distance: session.total_distance(),
        final_level: session.level(),
        snapshot: session.snapshot(),
    })
}

/// Snapshot after every `sample_every` frames, plus the final frame.
pub fn replay_with_checkpoints(
    config: &SimConfig,
    params: &TapeParams,
    inputs: &[u8],
    sample_every: u32,
) -> Result<Vec<SessionSnapshot>, SessionError> {
    let sample_every = sample_every.max(1);
    let mut session = replay_session(config, params)?;
    let mut prev = FrameInput::default();
    let mut checkpoints = Vec::with_capacity(inputs.len() / sample_every as usize + 1);

    for &byte in inputs {
        prev = step_frame(&mut session, params, prev, byte)?;
        if session.tick_count() % sample_every == 0 {
            checkpoints.push(session.snapshot());
        }
    }
    if session.tick_count() % sample_every != 0 {
        checkpoints.push(session.snapshot());
    }
    Ok(checkpoints)
}

/// Parses `bytes`, replays them under `config` and checks the footer claims.
///
/// Only the seed, difficulty base and tick rate travel with the tape; the
/// rest of `config` must match whatever recorded it.
pub fn verify_tape(
    config: &SimConfig,
    bytes: &[u8],
    max_frames: u32,
) -> Result<VerificationReport, TapeError> {
    verify_tape_with_replay(bytes, max_frames, |tape| replay(config, tape))
}

fn verify_tape_with_replay<F>(
    bytes: &[u8],
    max_frames: u32,
    replay_fn: F,
) -> Result<VerificationReport, TapeError>
where
    F: FnOnce(&TapeView<'_>) -> Result<ReplayResult, SessionError>,
{
    let tape = parse_tape(bytes, max_frames)?;
    let result = replay_fn(&tape)?;

    if result.frame_count != tape.header.frame_count {
        return Err(TapeError::FrameCountMismatch {
            claimed: tape.header.frame_count,
            computed: result.frame_count,
        });
    }

    let claimed = tape.footer.final_distance.to_bits();
    let computed = result.final_distance.to_bits();
    if claimed != computed {
        return Err(TapeError::DistanceMismatch { claimed, computed });
    }

    if result.final_level != tape.footer.final_level {
        return Err(TapeError::LevelMismatch {
            claimed: tape.footer.final_level,
            computed: result.final_level,
        });
    }

    Ok(VerificationReport {
        seed: tape.header.params.seed,
        frame_count: tape.header.frame_count,
        final_distance: result.final_distance,
        final_level: result.final_level,
        tape_checksum: tape.footer.checksum,
    })
}
