//! ISAAC-64 pseudorandom engine that supplies the random tail of identifiers.
//!
//! The engine is seeded once from 256 words of seed material and then produces output in blocks of
//! 256 words. Words are consumed from the top of the current block down; a new block is generated
//! automatically when the current one is exhausted.
//!
//! ```rust
//! use tuid::isaac::{Isaac64Engine, SEED_WORDS};
//!
//! let mut a = Isaac64Engine::new(&[42u64; SEED_WORDS]);
//! let mut b = Isaac64Engine::new(&[42u64; SEED_WORDS]);
//! assert_eq!(a.next_word(), b.next_word());
//! ```

use core::{fmt, num::Wrapping};

type W64 = Wrapping<u64>;

const RAND_SIZE_LEN: usize = 8;
const RAND_SIZE: usize = 1 << RAND_SIZE_LEN;
const GOLDEN_RATIO: W64 = Wrapping(0x9e37_79b9_7f4a_7c13);

/// The number of 64-bit words of seed material the engine consumes.
pub const SEED_WORDS: usize = RAND_SIZE;

/// ISAAC-64 engine state.
///
/// The engine has no internal synchronization. Share it between threads only behind the same lock
/// that guards the clock sequence, as [`SharedGenerator`](crate::SharedGenerator) does.
#[derive(Clone)]
pub struct Isaac64Engine {
    mem: [W64; RAND_SIZE],
    rsl: [W64; RAND_SIZE],
    a: W64,
    b: W64,
    c: W64,

    /// Number of unconsumed words remaining in `rsl`.
    cnt: usize,
}

impl Isaac64Engine {
    /// Creates an engine seeded with `seed`.
    ///
    /// Identical seed material always yields identical output sequences.
    pub fn new(seed: &[u64; SEED_WORDS]) -> Self {
        let mut engine = Self {
            mem: [Wrapping(0); RAND_SIZE],
            rsl: [Wrapping(0); RAND_SIZE],
            a: Wrapping(0),
            b: Wrapping(0),
            c: Wrapping(0),
            cnt: 0,
        };
        for (r, s) in engine.rsl.iter_mut().zip(seed) {
            *r = Wrapping(*s);
        }
        engine.init();
        engine
    }

    /// Creates an engine seeded with 256 words drawn from `rng`, typically an OS entropy source.
    ///
    /// # Errors
    ///
    /// Returns the error of `rng` unchanged if it fails to produce bytes.
    pub fn from_rng<R: rand::RngCore + ?Sized>(rng: &mut R) -> Result<Self, rand::Error> {
        let mut bytes = [0u8; SEED_WORDS * 8];
        rng.try_fill_bytes(&mut bytes)?;
        let mut seed = [0u64; SEED_WORDS];
        for (w, chunk) in seed.iter_mut().zip(bytes.chunks_exact(8)) {
            let mut buf = [0u8; 8];
            buf.copy_from_slice(chunk);
            *w = u64::from_le_bytes(buf);
        }
        Ok(Self::new(&seed))
    }

    /// Returns the next word of the current block, generating a new block first if the current one
    /// is exhausted.
    pub fn next_word(&mut self) -> u64 {
        if self.cnt == 0 {
            self.generate();
        }
        self.cnt -= 1;
        self.rsl[self.cnt].0
    }

    /// Mixes the seed material held in `rsl` into `mem` and fills the first output block.
    fn init(&mut self) {
        let mut v = [GOLDEN_RATIO; 8];
        for _ in 0..4 {
            mix(&mut v);
        }

        for (m, r) in self.mem.chunks_exact_mut(8).zip(self.rsl.chunks_exact(8)) {
            absorb(&mut v, m, r);
        }

        // second pass so every seed word affects the whole pool
        for i in (0..RAND_SIZE).step_by(8) {
            let mut chunk = [Wrapping(0); 8];
            chunk.copy_from_slice(&self.mem[i..i + 8]);
            absorb(&mut v, &mut self.mem[i..i + 8], &chunk);
        }

        self.a = Wrapping(0);
        self.b = Wrapping(0);
        self.c = Wrapping(0);
        self.generate();
    }

    /// Produces the next output block into `rsl` and advances the accumulators.
    fn generate(&mut self) {
        const MIDPOINT: usize = RAND_SIZE / 2;

        self.c += Wrapping(1);
        let mut a = self.a;
        let mut b = self.b + self.c;

        let pairs = (0..MIDPOINT)
            .zip(MIDPOINT..RAND_SIZE)
            .chain((MIDPOINT..RAND_SIZE).zip(0..MIDPOINT));
        for (m, m2) in pairs {
            let x = self.mem[m];
            a = step_mix(a, m) + self.mem[m2];
            let y = ind(&self.mem, x) + a + b;
            self.mem[m] = y;
            b = ind(&self.mem, y >> RAND_SIZE_LEN) + x;
            self.rsl[m] = b;
        }

        self.a = a;
        self.b = b;
        self.cnt = RAND_SIZE;
    }
}

impl fmt::Debug for Isaac64Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // pool contents are not printed
        f.debug_struct("Isaac64Engine").finish_non_exhaustive()
    }
}

impl rand::RngCore for Isaac64Engine {
    fn next_u32(&mut self) -> u32 {
        self.next_word() as u32
    }

    fn next_u64(&mut self) -> u64 {
        self.next_word()
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        for chunk in dest.chunks_mut(8) {
            let bytes = self.next_word().to_le_bytes();
            chunk.copy_from_slice(&bytes[..chunk.len()]);
        }
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
        self.fill_bytes(dest);
        Ok(())
    }
}

/// Scrambles eight working variables.
fn mix(v: &mut [W64; 8]) {
    v[0] -= v[4];
    v[5] ^= v[7] >> 9;
    v[7] += v[0];
    v[1] -= v[5];
    v[6] ^= v[0] << 9;
    v[0] += v[1];
    v[2] -= v[6];
    v[7] ^= v[1] >> 23;
    v[1] += v[2];
    v[3] -= v[7];
    v[0] ^= v[2] << 15;
    v[2] += v[3];
    v[4] -= v[0];
    v[1] ^= v[3] >> 14;
    v[3] += v[4];
    v[5] -= v[1];
    v[2] ^= v[4] << 20;
    v[4] += v[5];
    v[6] -= v[2];
    v[3] ^= v[5] >> 17;
    v[5] += v[6];
    v[7] -= v[3];
    v[4] ^= v[6] << 14;
    v[6] += v[7];
}

/// Adds `input` into the working variables, mixes, and writes the result to `out`.
fn absorb(v: &mut [W64; 8], out: &mut [W64], input: &[W64]) {
    for (x, i) in v.iter_mut().zip(input) {
        *x += *i;
    }
    mix(v);
    out.copy_from_slice(&v[..]);
}

/// Returns the accumulator mix for pool position `m`.
fn step_mix(a: W64, m: usize) -> W64 {
    match m % 4 {
        0 => !(a ^ (a << 21)),
        1 => a ^ (a >> 5),
        2 => a ^ (a << 12),
        _ => a ^ (a >> 33),
    }
}

/// Looks up the pool word selected by bits 3..11 of `x`.
fn ind(mem: &[W64; RAND_SIZE], x: W64) -> W64 {
    mem[(x.0 >> 3) as usize & (RAND_SIZE - 1)]
}

#[cfg(feature = "std")]
#[cfg(test)]
mod tests {
    use super::{Isaac64Engine, RAND_SIZE, SEED_WORDS};

    fn counting_seed() -> [u64; SEED_WORDS] {
        let mut seed = [0u64; SEED_WORDS];
        for (i, e) in seed.iter_mut().enumerate() {
            *e = i as u64 * 0x0101_0101_0101_0101;
        }
        seed
    }

    /// Produces identical sequences from identical seeds
    #[test]
    fn produces_identical_sequences_from_identical_seeds() {
        let mut a = Isaac64Engine::new(&counting_seed());
        let mut b = Isaac64Engine::new(&counting_seed());
        for _ in 0..3 * RAND_SIZE + 17 {
            assert_eq!(a.next_word(), b.next_word());
        }
    }

    /// Matches the reference output for the counting seed
    #[test]
    fn matches_the_reference_output_for_the_counting_seed() {
        let mut e = Isaac64Engine::new(&counting_seed());
        let words: Vec<u64> = (0..600).map(|_| e.next_word()).collect();
        assert_eq!(words[0], 0xab0f_f65e_dab9_411e);
        assert_eq!(words[1], 0xd1c5_6f81_6cbf_2c36);
        assert_eq!(words[2], 0x4f68_8276_d13e_e788);
        assert_eq!(words[255], 0x2325_0997_ea50_80bd);
        assert_eq!(words[256], 0x1440_d5e7_c46c_f043);
        assert_eq!(words[599], 0xdd67_bff3_0820_38d3);
    }

    /// Diverges when a single seed bit differs
    #[test]
    fn diverges_when_a_single_seed_bit_differs() {
        let seed = counting_seed();
        let mut other = seed;
        other[SEED_WORDS - 1] ^= 1;

        let xs: Vec<u64> = {
            let mut e = Isaac64Engine::new(&seed);
            (0..64).map(|_| e.next_word()).collect()
        };
        let ys: Vec<u64> = {
            let mut e = Isaac64Engine::new(&other);
            (0..64).map(|_| e.next_word()).collect()
        };
        let equal = xs.iter().zip(&ys).filter(|(x, y)| x == y).count();
        assert_eq!(equal, 0);
    }

    /// Regenerates exactly once at the block boundary
    #[test]
    fn regenerates_exactly_once_at_the_block_boundary() {
        let mut e = Isaac64Engine::new(&counting_seed());
        assert_eq!(e.c.0, 1);
        assert_eq!(e.cnt, RAND_SIZE);

        let first = e.next_word();
        for _ in 1..RAND_SIZE {
            e.next_word();
        }
        assert_eq!(e.c.0, 1);
        assert_eq!(e.cnt, 0);

        let next = e.next_word();
        assert_eq!(e.c.0, 2);
        assert_eq!(e.cnt, RAND_SIZE - 1);
        assert_ne!(first, next);
    }

    /// Consumes each block from the top down
    #[test]
    fn consumes_each_block_from_the_top_down() {
        let mut e = Isaac64Engine::new(&counting_seed());
        let block = e.rsl;
        for i in (0..RAND_SIZE).rev() {
            assert_eq!(e.next_word(), block[i].0);
        }
    }

    /// Produces balanced output bits from an all-zero seed
    #[test]
    fn produces_balanced_output_bits_from_an_all_zero_seed() {
        const N_SAMPLES: usize = 100_000;
        let mut e = Isaac64Engine::new(&[0; SEED_WORDS]);
        let mut bins = [0u32; 64];
        for _ in 0..N_SAMPLES {
            let w = e.next_word();
            for (i, bin) in bins.iter_mut().enumerate() {
                *bin += (w >> i) as u32 & 1;
            }
        }

        // set margin based on binom dist 99.999% confidence interval
        let margin = 4.417173 * (0.5 * 0.5 / N_SAMPLES as f64).sqrt();
        for (i, bin) in bins.iter().enumerate() {
            let p = *bin as f64 / N_SAMPLES as f64;
            assert!((p - 0.5).abs() < margin, "random bit {}: {}", i, p);
        }
    }

    /// Seeds from an external rng and serves as an rng itself
    #[test]
    fn seeds_from_an_external_rng_and_serves_as_an_rng_itself() {
        use rand::{rngs::mock::StepRng, RngCore};

        let mut a = Isaac64Engine::from_rng(&mut StepRng::new(7, 3)).unwrap();
        let mut b = Isaac64Engine::from_rng(&mut StepRng::new(7, 3)).unwrap();
        let mut bytes = [0u8; 13];
        a.fill_bytes(&mut bytes);
        assert_eq!(bytes[..8], b.next_u64().to_le_bytes());
        assert_eq!(bytes[8..], b.next_u64().to_le_bytes()[..5]);
        assert_eq!(a.next_u32(), b.next_u64() as u32);
    }
}
