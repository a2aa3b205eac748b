//! Seed generator for the per-partition hash seeds.

use rand::{RngCore, SeedableRng};

const MODULUS: u64 = 2_147_483_647; // 2^31 - 1
const MULTIPLIER: u64 = 16_807;

/// Park–Miller "minimal standard" Lehmer generator.
///
/// Small, deterministic and owned by the caller: every draw advances the
/// state, so consecutive construction attempts get fresh seeds. Any other
/// [`RngCore`] works with [`crate::Hypergraph::map`] as well.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MinStdRand {
    state: u32,
}

impl MinStdRand {
    pub fn new(seed: u32) -> Self {
        // 0 and multiples of the modulus are fixed points.
        let state = (seed as u64 % MODULUS) as u32;
        Self { state: if state == 0 { 1 } else { state } }
    }

    /// Current state; the value most recently returned by `next_u32`.
    pub fn state(&self) -> u32 {
        self.state
    }
}

impl Default for MinStdRand {
    fn default() -> Self {
        Self::new(1)
    }
}

impl RngCore for MinStdRand {
    #[inline]
    fn next_u32(&mut self) -> u32 {
        self.state = (self.state as u64 * MULTIPLIER % MODULUS) as u32;
        self.state
    }

    fn next_u64(&mut self) -> u64 {
        let hi = self.next_u32() as u64;
        let lo = self.next_u32() as u64;
        (hi << 32) | lo
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        for chunk in dest.chunks_mut(4) {
            let bytes = self.next_u32().to_le_bytes();
            chunk.copy_from_slice(&bytes[..chunk.len()]);
        }
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
        self.fill_bytes(dest);
        Ok(())
    }
}

impl SeedableRng for MinStdRand {
    type Seed = [u8; 4];

    fn from_seed(seed: Self::Seed) -> Self {
        Self::new(u32::from_le_bytes(seed))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimal_standard_sequence() {
        let mut rng = MinStdRand::new(1);
        assert_eq!(rng.next_u32(), 16_807);
        assert_eq!(rng.next_u32(), 282_475_249);
        assert_eq!(rng.next_u32(), 1_622_650_073);
        assert_eq!(rng.state(), 1_622_650_073);
    }

    #[test]
    fn zero_seed_is_remapped() {
        assert_eq!(MinStdRand::new(0), MinStdRand::new(1));
        assert_eq!(MinStdRand::new(MODULUS as u32), MinStdRand::new(1));
    }

    #[test]
    fn seedable_matches_new() {
        let a = MinStdRand::from_seed(42u32.to_le_bytes());
        assert_eq!(a, MinStdRand::new(42));
    }

    #[test]
    fn fill_bytes_handles_partial_chunks() {
        let mut a = MinStdRand::new(9);
        let mut b = MinStdRand::new(9);
        let mut buf = [0u8; 7];
        a.fill_bytes(&mut buf);
        let first = b.next_u32().to_le_bytes();
        let second = b.next_u32().to_le_bytes();
        assert_eq!(&buf[..4], &first);
        assert_eq!(&buf[4..], &second[..3]);
    }
}
