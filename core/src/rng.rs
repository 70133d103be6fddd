//! Deterministic random number generation.
//!
//! RULE: Nothing in the engine may call any platform RNG.
//! All randomness flows through AllocatorRng instances derived
//! from the single seed carried on the batch settings.
//!
//! Each stream is seeded from (batch_seed XOR stream_index * golden ratio),
//! so random-policy picks and fallback picks never share a sequence:
//! an extra fallback in one batch does not shift every later random pick.

use rand::SeedableRng;
use rand_pcg::Pcg64Mcg;

/// A named, deterministic RNG for one selection stream.
pub struct AllocatorRng {
    pub name: &'static str,
    inner: Pcg64Mcg,
}

impl AllocatorRng {
    /// Create a stream RNG from the batch seed and a stable stream index.
    /// The index must never change once assigned.
    pub fn new(batch_seed: u64, stream_index: u64) -> Self {
        let derived_seed = batch_seed ^ (stream_index.wrapping_mul(0x9e37_79b9_7f4a_7c15));
        Self {
            name: "unnamed",
            inner: Pcg64Mcg::seed_from_u64(derived_seed),
        }
    }

    pub fn with_name(mut self, name: &'static str) -> Self {
        self.name = name;
        self
    }

    /// Uniform index in [0, n) via `gen_range`.
    pub fn index_below(&mut self, n: usize) -> usize {
        use rand::Rng;
        assert!(n > 0, "n must be > 0");
        self.inner.gen_range(0..n)
    }

    /// Uniform pick from a slice. None only when the slice is empty.
    pub fn pick<'a, T>(&mut self, items: &'a [T]) -> Option<&'a T> {
        if items.is_empty() {
            return None;
        }
        let idx = self.index_below(items.len());
        items.get(idx)
    }
}

/// All selection streams for a single batch, indexed by stable slot.
pub struct RngBank {
    batch_seed: u64,
}

impl RngBank {
    pub fn new(batch_seed: u64) -> Self {
        Self { batch_seed }
    }

    pub fn for_stream(&self, slot: StreamSlot) -> AllocatorRng {
        AllocatorRng::new(self.batch_seed, slot as u64).with_name(slot.name())
    }
}

/// Stable stream slot assignments.
/// NEVER reorder or remove entries, only append.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u64)]
pub enum StreamSlot {
    /// Picks made by the Random policy and the no-expertise fallback.
    Selection = 0,
    /// Picks made when exclusions leave nobody eligible.
    Fallback = 1,
}

impl StreamSlot {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Selection => "selection",
            Self::Fallback => "fallback",
        }
    }
}
