use serde::{Deserialize, Serialize};

pub const INPUT_LEFT: u8 = 0x01;
pub const INPUT_RIGHT: u8 = 0x02;
pub const INPUT_ACCELERATE: u8 = 0x04;
pub const INPUT_DECELERATE: u8 = 0x08;
pub const INPUT_RESERVED_MASK: u8 = 0xF0;

/// Held state of every control for one tick, as stored on a tape.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameInput {
    pub left: bool,
    pub right: bool,
    pub accelerate: bool,
    pub decelerate: bool,
}

#[inline]
pub fn encode_input_byte(input: FrameInput) -> u8 {
    (if input.left { INPUT_LEFT } else { 0 })
        | (if input.right { INPUT_RIGHT } else { 0 })
        | (if input.accelerate { INPUT_ACCELERATE } else { 0 })
        | (if input.decelerate { INPUT_DECELERATE } else { 0 })
}

#[inline]
pub fn decode_input_byte(byte: u8) -> FrameInput {
    FrameInput {
        left: (byte & INPUT_LEFT) != 0,
        right: (byte & INPUT_RIGHT) != 0,
        accelerate: (byte & INPUT_ACCELERATE) != 0,
        decelerate: (byte & INPUT_DECELERATE) != 0,
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ButtonState {
    /// Held this tick.
    pub down: bool,
    /// Went down this tick.
    pub pressed: bool,
}

impl ButtonState {
    #[inline]
    pub fn from_held(prev: bool, now: bool) -> Self {
        Self {
            down: now,
            pressed: now && !prev,
        }
    }

    #[inline]
    pub fn down(&self) -> bool {
        self.down
    }

    #[inline]
    pub fn pressed(&self) -> bool {
        self.pressed
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Controls {
    pub steer_left: ButtonState,
    pub steer_right: ButtonState,
    pub accelerate: ButtonState,
    pub decelerate: ButtonState,
}

impl Controls {
    /// Builds this tick's controls with edge detection against the previous tick.
    pub fn from_held(prev: FrameInput, now: FrameInput) -> Self {
        Self {
            steer_left: ButtonState::from_held(prev.left, now.left),
            steer_right: ButtonState::from_held(prev.right, now.right),
            accelerate: ButtonState::from_held(prev.accelerate, now.accelerate),
            decelerate: ButtonState::from_held(prev.decelerate, now.decelerate),
        }
    }

    pub fn held(&self) -> FrameInput {
        FrameInput {
            left: self.steer_left.down,
            right: self.steer_right.down,
            accelerate: self.accelerate.down,
            decelerate: self.decelerate.down,
        }
    }

    /// Drops throttle only. Used while the tank is empty.
    pub fn without_throttle(mut self) -> Self {
        self.accelerate = ButtonState::default();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn input_byte_roundtrip_for_all_valid_bit_patterns() {
        for byte in 0u8..=0x0F {
            assert_eq!(encode_input_byte(decode_input_byte(byte)), byte);
        }
    }

    #[test]
    fn pressed_only_on_rising_edge() {
        let idle = FrameInput::default();
        let brake = FrameInput {
            decelerate: true,
            ..FrameInput::default()
        };

        let first = Controls::from_held(idle, brake);
        assert!(first.decelerate.down() && first.decelerate.pressed());

        let held = Controls::from_held(brake, brake);
        assert!(held.decelerate.down() && !held.decelerate.pressed());

        let released = Controls::from_held(brake, idle);
        assert!(!released.decelerate.down() && !released.decelerate.pressed());
    }

    #[test]
    fn without_throttle_keeps_brake_and_steering() {
        let held = decode_input_byte(INPUT_LEFT | INPUT_ACCELERATE | INPUT_DECELERATE);
        let controls = Controls::from_held(FrameInput::default(), held).without_throttle();
        assert!(!controls.accelerate.down());
        assert!(controls.decelerate.down());
        assert!(controls.steer_left.down());
    }
}
