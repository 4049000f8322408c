//! Binary input tape: a fixed header, one input byte per tick and a footer
//! carrying the claimed result.
//!
//! ```text
//! header  0  magic "FRUN"          u32 LE
//!         4  version               u8
//!         5  reserved              [u8; 3]
//!         8  seed                  u32 LE
//!        12  difficulty base       f32 bits LE
//!        16  tick rate (Hz)        u16 LE
//!        18  reserved              u16
//!        20  frame count           u32 LE
//! body   24  inputs                [u8; frame_count]
//! footer  +0 final distance        f32 bits LE
//!         +4 final level           u16 LE
//!         +6 reserved              u16
//!         +8 crc32(header + body)  u32 LE
//! ```

use serde::{Deserialize, Serialize};

use crate::constants::{TAPE_FOOTER_SIZE, TAPE_HEADER_SIZE, TAPE_MAGIC, TAPE_VERSION};
use crate::error::TapeError;
use crate::input::INPUT_RESERVED_MASK;

/// Everything a replay needs besides the inputs themselves.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TapeParams {
    pub seed: u32,
    pub difficulty_base: f32,
    pub tick_rate: u16,
}

impl TapeParams {
    /// Fixed step implied by the tick rate.
    #[inline]
    pub fn dt(&self) -> f32 {
        1.0 / f32::from(self.tick_rate)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TapeHeader {
    pub magic: u32,
    pub version: u8,
    pub params: TapeParams,
    pub frame_count: u32,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TapeFooter {
    pub final_distance: f32,
    pub final_level: u16,
    pub checksum: u32,
}

#[derive(Clone, Debug, PartialEq)]
pub struct TapeView<'a> {
    pub header: TapeHeader,
    pub inputs: &'a [u8],
    pub footer: TapeFooter,
}

pub fn parse_tape(bytes: &[u8], max_frames: u32) -> Result<TapeView<'_>, TapeError> {
    let min_len = TAPE_HEADER_SIZE + TAPE_FOOTER_SIZE;
    if bytes.len() < min_len {
        return Err(TapeError::TapeTooShort {
            actual: bytes.len(),
            min: min_len,
        });
    }

    let magic = read_u32_le(bytes, 0);
    if magic != TAPE_MAGIC {
        return Err(TapeError::InvalidMagic { found: magic });
    }

    let version = bytes[4];
    if version != TAPE_VERSION {
        return Err(TapeError::UnsupportedVersion { found: version });
    }
    if bytes[5..8].iter().any(|&b| b != 0) || read_u16_le(bytes, 18) != 0 {
        return Err(TapeError::HeaderReservedNonZero);
    }

    let seed = read_u32_le(bytes, 8);
    let difficulty_bits = read_u32_le(bytes, 12);
    let difficulty_base = f32::from_bits(difficulty_bits);
    if !(0.0..=1.0).contains(&difficulty_base) {
        return Err(TapeError::InvalidDifficulty {
            bits: difficulty_bits,
        });
    }
    let tick_rate = read_u16_le(bytes, 16);
    if tick_rate == 0 {
        return Err(TapeError::InvalidTickRate);
    }

    let frame_count = read_u32_le(bytes, 20);
    if frame_count == 0 || frame_count > max_frames {
        return Err(TapeError::FrameCountOutOfRange {
            frame_count,
            max_frames,
        });
    }

    let expected_len = TAPE_HEADER_SIZE + frame_count as usize + TAPE_FOOTER_SIZE;
    if bytes.len() != expected_len {
        return Err(TapeError::TapeLengthMismatch {
            expected: expected_len,
            actual: bytes.len(),
        });
    }

    let inputs_start = TAPE_HEADER_SIZE;
    let inputs_end = inputs_start + frame_count as usize;
    let inputs = &bytes[inputs_start..inputs_end];

    let final_distance = f32::from_bits(read_u32_le(bytes, inputs_end));
    let final_level = read_u16_le(bytes, inputs_end + 4);
    if read_u16_le(bytes, inputs_end + 6) != 0 {
        return Err(TapeError::FooterReservedNonZero);
    }
    let checksum = read_u32_le(bytes, inputs_end + 8);

    let computed = crc32_and_validate_inputs(bytes, inputs_start, inputs_end)?;
    if checksum != computed {
        return Err(TapeError::CrcMismatch {
            stored: checksum,
            computed,
        });
    }

    Ok(TapeView {
        header: TapeHeader {
            magic,
            version,
            params: TapeParams {
                seed,
                difficulty_base,
                tick_rate,
            },
            frame_count,
        },
        inputs,
        footer: TapeFooter {
            final_distance,
            final_level,
            checksum,
        },
    })
}

pub fn serialize_tape(
    params: &TapeParams,
    inputs: &[u8],
    final_distance: f32,
    final_level: u16,
) -> Vec<u8> {
    let total_len = TAPE_HEADER_SIZE + inputs.len() + TAPE_FOOTER_SIZE;
    let mut data = vec![0u8; total_len];

    write_u32_le(&mut data, 0, TAPE_MAGIC);
    data[4] = TAPE_VERSION;
    write_u32_le(&mut data, 8, params.seed);
    write_u32_le(&mut data, 12, params.difficulty_base.to_bits());
    write_u16_le(&mut data, 16, params.tick_rate);
    write_u32_le(&mut data, 20, inputs.len() as u32);

    let body_start = TAPE_HEADER_SIZE;
    let body_end = body_start + inputs.len();
    data[body_start..body_end].copy_from_slice(inputs);

    write_u32_le(&mut data, body_end, final_distance.to_bits());
    write_u16_le(&mut data, body_end + 4, final_level);

    let checksum = crc32(&data[..body_end]);
    write_u32_le(&mut data, body_end + 8, checksum);

    data
}

#[inline]
fn read_u16_le(bytes: &[u8], offset: usize) -> u16 {
    u16::from_le_bytes([bytes[offset], bytes[offset + 1]])
}

#[inline]
fn read_u32_le(bytes: &[u8], offset: usize) -> u32 {
    u32::from_le_bytes([
        bytes[offset],
        bytes[offset + 1],
        bytes[offset + 2],
        bytes[offset + 3],
    ])
}

#[inline]
fn write_u16_le(bytes: &mut [u8], offset: usize, value: u16) {
    bytes[offset..offset + 2].copy_from_slice(&value.to_le_bytes());
}

#[inline]
fn write_u32_le(bytes: &mut [u8], offset: usize, value: u32) {
    bytes[offset..offset + 4].copy_from_slice(&value.to_le_bytes());
}

const CRC_TABLE: [u32; 256] = build_crc_table();

const fn build_crc_table() -> [u32; 256] {
    let mut table = [0u32; 256];
    let mut i = 0;

    while i < 256 {
        let mut c = i as u32;
        let mut j = 0;

        while j < 8 {
            c = if (c & 1) != 0 {
                0xEDB8_8320u32 ^ (c >> 1)
            } else {
                c >> 1
            };
            j += 1;
        }

        table[i] = c;
        i += 1;
    }

    table
}

pub fn crc32(data: &[u8]) -> u32 {
    let mut crc = 0xFFFF_FFFFu32;

    for byte in data {
        let idx = ((crc ^ (*byte as u32)) & 0xFF) as usize;
        crc = CRC_TABLE[idx] ^ (crc >> 8);
    }

    crc ^ 0xFFFF_FFFFu32
}

/// CRC over header and body, rejecting reserved input bits on the way.
fn crc32_and_validate_inputs(
    bytes: &[u8],
    inputs_start: usize,
    inputs_end: usize,
) -> Result<u32, TapeError> {
    let mut crc = 0xFFFF_FFFFu32;

    for (i, &byte) in bytes[..inputs_end].iter().enumerate() {
        if i >= inputs_start && (byte & INPUT_RESERVED_MASK) != 0 {
            return Err(TapeError::ReservedInputBitsNonZero {
                frame: (i - inputs_start) as u32,
                byte,
            });
        }

        let idx = ((crc ^ byte as u32) & 0xFF) as usize;
        crc = CRC_TABLE[idx] ^ (crc >> 8);
    }

    Ok(crc ^ 0xFFFF_FFFFu32)
}
