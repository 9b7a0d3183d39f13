use rand::rngs::StdRng;

/// Uniform random source consumed by maze generation.
pub trait RandomSource {
    /// Returns a value in `[0, 1)`.
    fn next_f32(&mut self) -> f32;

    fn pick_index(&mut self, len: usize) -> usize {
        if len <= 1 {
            return 0;
        }
        (self.next_f32() * len as f32).floor().min((len - 1) as f32) as usize
    }
}

/// Small seeded generator so a maze can be replayed from its `u32` seed.
#[derive(Clone, Debug)]
pub struct Rng {
    seed: u32,
}

impl Rng {
    pub fn new(seed: u32) -> Self {
        Self { seed }
    }
}

impl RandomSource for Rng {
    fn next_f32(&mut self) -> f32 {
        self.seed = self.seed.wrapping_add(0x6d2b79f5);
        let mut t = self.seed;
        t = (t ^ (t >> 15)).wrapping_mul(t | 1);
        t ^= t.wrapping_add((t ^ (t >> 7)).wrapping_mul(t | 61));
        let out = t ^ (t >> 14);
        // f32 rounding can reach 1.0 for outputs near u32::MAX.
        ((out as f64 / 4_294_967_296.0) as f32).min(1.0 - f32::EPSILON)
    }
}

impl RandomSource for StdRng {
    fn next_f32(&mut self) -> f32 {
        rand::Rng::random::<f32>(self)
    }

    fn pick_index(&mut self, len: usize) -> usize {
        if len <= 1 {
            return 0;
        }
        rand::Rng::random_range(self, 0..len)
    }
}
