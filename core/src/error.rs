use core::fmt;

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ConfigError {
    NonFinite { field: &'static str },
    NonPositive { field: &'static str, value: f32 },
    InvertedRange { field: &'static str, min: f32, max: f32 },
    MarginTooWide { margin: f32, min_width: f32 },
    OutOfUnitRange { field: &'static str, value: f32 },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NonFinite { field } => write!(f, "{field} must be finite"),
            Self::NonPositive { field, value } => {
                write!(f, "{field} must be > 0, got {value}")
            }
            Self::InvertedRange { field, min, max } => {
                write!(f, "{field} range is inverted: min={min} > max={max}")
            }
            Self::MarginTooWide { margin, min_width } => write!(
                f,
                "hazard edge margin {margin} leaves no room on a segment of width {min_width}"
            ),
            Self::OutOfUnitRange { field, value } => {
                write!(f, "{field} must be within [0, 1], got {value}")
            }
        }
    }
}

impl std::error::Error for ConfigError {}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum TrackError {
    InvalidConfig(ConfigError),
    DifficultyOutOfRange { difficulty: f32 },
    DegenerateStart,
    NoSegments,
}

impl fmt::Display for TrackError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidConfig(err) => write!(f, "invalid track config: {err}"),
            Self::DifficultyOutOfRange { difficulty } => {
                write!(f, "difficulty must be within [0, 1], got {difficulty}")
            }
            Self::DegenerateStart => write!(f, "track start direction has zero length"),
            Self::NoSegments => write!(f, "generation produced no segments"),
        }
    }
}

impl std::error::Error for TrackError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::InvalidConfig(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ConfigError> for TrackError {
    fn from(err: ConfigError) -> Self {
        Self::InvalidConfig(err)
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SessionError {
    InvalidConfig(ConfigError),
    Track(TrackError),
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidConfig(err) => write!(f, "invalid session config: {err}"),
            Self::Track(err) => write!(f, "track generation failed: {err}"),
        }
    }
}

impl std::error::Error for SessionError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::InvalidConfig(err) => Some(err),
            Self::Track(err) => Some(err),
        }
    }
}

impl From<ConfigError> for SessionError {
    fn from(err: ConfigError) -> Self {
        Self::InvalidConfig(err)
    }
}

impl From<TrackError> for SessionError {
    fn from(err: TrackError) -> Self {
        Self::Track(err)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum TapeError {
    TapeTooShort { actual: usize, min: usize },
    InvalidMagic { found: u32 },
    UnsupportedVersion { found: u8 },
    HeaderReservedNonZero,
    InvalidDifficulty { bits: u32 },
    InvalidTickRate,
    FrameCountOutOfRange { frame_count: u32, max_frames: u32 },
    TapeLengthMismatch { expected: usize, actual: usize },
    ReservedInputBitsNonZero { frame: u32, byte: u8 },
    FooterReservedNonZero,
    CrcMismatch { stored: u32, computed: u32 },
    Session(SessionError),
    FrameCountMismatch { claimed: u32, computed: u32 },
    DistanceMismatch { claimed: u32, computed: u32 },
    LevelMismatch { claimed: u16, computed: u16 },
}

impl fmt::Display for TapeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TapeTooShort { actual, min } => {
                write!(f, "tape too short: got {actual} bytes, need at least {min}")
            }
            Self::InvalidMagic { found } => write!(f, "invalid tape magic: 0x{found:08x}"),
            Self::UnsupportedVersion { found } => write!(f, "unsupported tape version: {found}"),
            Self::HeaderReservedNonZero => write!(f, "header reserved bytes are non-zero"),
            Self::InvalidDifficulty { bits } => {
                write!(f, "difficulty is not a value in [0, 1]: bits=0x{bits:08x}")
            }
            Self::InvalidTickRate => write!(f, "tick rate must be non-zero"),
            Self::FrameCountOutOfRange {
                frame_count,
                max_frames,
            } => write!(
                f,
                "frame count out of range: {frame_count} (allowed 1..={max_frames})"
            ),
            Self::TapeLengthMismatch { expected, actual } => write!(
                f,
                "tape length mismatch: expected {expected} bytes, got {actual}"
            ),
            Self::ReservedInputBitsNonZero { frame, byte } => write!(
                f,
                "input byte reserved bits set at frame {frame}: 0x{byte:02x}"
            ),
            Self::FooterReservedNonZero => write!(f, "footer reserved bytes are non-zero"),
            Self::CrcMismatch { stored, computed } => write!(
                f,
                "crc mismatch: stored=0x{stored:08x}, computed=0x{computed:08x}"
            ),
            Self::Session(err) => write!(f, "replay session failed: {err}"),
            Self::FrameCountMismatch { claimed, computed } => {
                write!(
                    f,
                    "frame-count mismatch: claimed={claimed}, computed={computed}"
                )
            }
            Self::DistanceMismatch { claimed, computed } => write!(
                f,
                "distance mismatch: claimed={}, computed={}",
                f32::from_bits(*claimed),
                f32::from_bits(*computed)
            ),
            Self::LevelMismatch { claimed, computed } => {
                write!(f, "level mismatch: claimed={claimed}, computed={computed}")
            }
        }
    }
}

impl std::error::Error for TapeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Session(err) => Some(err),
            _ => None,
        }
    }
}

impl From<SessionError> for TapeError {
    fn from(err: SessionError) -> Self {
        Self::Session(err)
    }
}
