pub mod config;
pub mod constants;
pub mod error;
pub mod geometry;
pub mod input;
pub mod pickup;
pub mod render;
pub mod rng;
pub mod session;
pub mod tape;
pub mod track;
pub mod vehicle;
pub mod verify;

pub use config::{SessionConfig, SimConfig, TrackConfig, VehicleConfig};
pub use error::{ConfigError, SessionError, TapeError, TrackError};
pub use input::{ButtonState, Controls, FrameInput};
pub use session::{GameAssets, Session, SessionSnapshot, SessionStats};
pub use track::{Track, TrackPair, TrackQuery, TrackSegment, TrackStart};
pub use vehicle::{LifeState, LifeStateKind, Vehicle};
pub use verify::{verify_tape, VerificationReport};
