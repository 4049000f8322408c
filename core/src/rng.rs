/// Uniform random source consumed by the track generator.
pub trait RandomSource {
    /// Uniform value in `[0, 1)`.
    fn next_f32(&mut self) -> f32;

    fn range_f32(&mut self, min: f32, max: f32) -> f32 {
        min + self.next_f32() * (max - min)
    }
}

/// Seedable xorshift32 generator. Same seed, same track.
#[derive(Clone, Copy, Debug)]
pub struct SeededRng {
    state: u32,
}

impl SeededRng {
    pub fn new(seed: u32) -> Self {
        Self {
            state: if seed == 0 { 0xDEAD_BEEF } else { seed },
        }
    }

    pub fn state(&self) -> u32 {
        self.state
    }

    pub fn next(&mut self) -> u32 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 17;
        x ^= x << 5;
        self.state = x;
        self.state
    }
}

impl RandomSource for SeededRng {
    #[inline]
    fn next_f32(&mut self) -> f32 {
        // Top 24 bits fill the f32 mantissa exactly, so the result never rounds up to 1.0.
        (self.next() >> 8) as f32 * (1.0 / (1u32 << 24) as f32)
    }
}
