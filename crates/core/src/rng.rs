//! RNG module - 7-bag random piece generation
//!
//! Implements the "7-bag" randomizer: each batch holds one of each kind
//! (I, J, L, O, S, T, Z), shuffled with Fisher-Yates before anything is yielded.
//! Kinds are yielded left to right; an exhausted batch is replaced by a freshly
//! shuffled one.
//!
//! Also provides a small LCG so that a seed fully determines a game.

use std::collections::VecDeque;

use crate::types::{PieceKind, QUEUE_MIN_LEN};

/// Simple LCG (Linear Congruential Generator) RNG
/// Uses constants from Numerical Recipes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimpleRng {
    state: u32,
}

impl SimpleRng {
    /// Create a new RNG with the given seed
    pub fn new(seed: u32) -> Self {
        // Avoid 0 seed which would produce all zeros
        let state = if seed == 0 { 1 } else { seed };
        Self { state }
    }

    /// Generate next random u32
    pub fn next_u32(&mut self) -> u32 {
        // LCG formula: (a * state + c) mod m
        // Using Numerical Recipes constants: a=1664525, c=1013904223, m=2^32
        self.state = self.state.wrapping_mul(1664525).wrapping_add(1013904223);
        self.state
    }

    /// Uniform value in `[0, max)`; `max` must be non-zero.
    ///
    /// Multiply-shift keeps the high (better mixed) LCG bits, and the rejection
    /// step removes the bias a plain modulo would leave.
    pub fn next_range(&mut self, max: u32) -> u32 {
        debug_assert!(max > 0, "next_range called with max = 0");
        let mut m = (self.next_u32() as u64) * (max as u64);
        let mut low = m as u32;
        if low < max {
            let threshold = max.wrapping_neg() % max;
            while low < threshold {
                m = (self.next_u32() as u64) * (max as u64);
                low = m as u32;
            }
        }
        (m >> 32) as u32
    }

    /// Shuffle a slice using Fisher-Yates
    pub fn shuffle<T>(&mut self, slice: &mut [T]) {
        for i in (1..slice.len()).rev() {
            let j = self.next_range((i + 1) as u32) as usize;
            slice.swap(i, j);
        }
    }

    /// Current internal state (usable as a seed to continue a fresh sequence)
    pub fn state(&self) -> u32 {
        self.state
    }
}

/// Infinite shuffled-bag sequence of piece kinds.
///
/// Pulling (`next_kind`) is the only way the sequence advances.
#[derive(Debug, Clone)]
pub struct BagRandomizer {
    batch: [PieceKind; 7],
    cursor: usize,
    rng: SimpleRng,
}

impl BagRandomizer {
    pub fn new(seed: u32) -> Self {
        Self {
            batch: PieceKind::ALL,
            // Start exhausted so the first pull shuffles a fresh batch.
            cursor: PieceKind::ALL.len(),
            rng: SimpleRng::new(seed),
        }
    }

    fn refill(&mut self) {
        self.batch = PieceKind::ALL;
        self.rng.shuffle(&mut self.batch);
        self.cursor = 0;
    }

    /// Pull the next kind, shuffling a new batch when the current one is spent.
    pub fn next_kind(&mut self) -> PieceKind {
        if self.cursor >= self.batch.len() {
            self.refill();
        }
        let kind = self.batch[self.cursor];
        self.cursor += 1;
        kind
    }

    /// Whether the next pull starts a new batch
    pub fn at_batch_boundary(&self) -> bool {
        self.cursor >= self.batch.len()
    }

    /// RNG state, used to seed the next run after a reset
    pub fn rng_state(&self) -> u32 {
        self.rng.state()
    }
}

impl Iterator for BagRandomizer {
    type Item = PieceKind;

    fn next(&mut self) -> Option<PieceKind> {
        Some(self.next_kind())
    }
}

/// Lookahead queue fed by a [`BagRandomizer`].
///
/// Holds at least [`QUEUE_MIN_LEN`] kinds at rest.
#[derive(Debug, Clone)]
pub struct PieceQueue {
    upcoming: VecDeque<PieceKind>,
    bag: BagRandomizer,
}

impl PieceQueue {
    /// Create a new piece queue with the given seed
    pub fn new(seed: u32) -> Self {
        let mut queue = Self {
            upcoming: VecDeque::with_capacity(QUEUE_MIN_LEN + 1),
            bag: BagRandomizer::new(seed),
        };
        queue.refill();
        queue
    }

    fn refill(&mut self) {
        while self.upcoming.len() < QUEUE_MIN_LEN {
            let kind = self.bag.next_kind();
            self.upcoming.push_back(kind);
        }
    }

    /// Draw the next piece from the front of the queue
    pub fn draw(&mut self) -> PieceKind {
        self.refill();
        // refill() guarantees at least QUEUE_MIN_LEN entries.
        let kind = self.upcoming.pop_front().unwrap_or_else(|| self.bag.next_kind());
        self.refill();
        kind
    }

    /// Peek at the next piece without removing it
    pub fn peek(&self) -> Option<PieceKind> {
        self.upcoming.front().copied()
    }

    /// Read-only view of up to `N` upcoming kinds.
    pub fn peek_n<const N: usize>(&self) -> [Option<PieceKind>; N] {
        let mut out = [None; N];
        for (slot, kind) in out.iter_mut().zip(self.upcoming.iter()) {
            *slot = Some(*kind);
        }
        out
    }

    pub fn len(&self) -> usize {
        self.upcoming.len()
    }

    pub fn is_empty(&self) -> bool {
        self.upcoming.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = PieceKind> + '_ {
        self.upcoming.iter().copied()
    }

    /// RNG state of the underlying bag (for restarting with a new sequence)
    pub fn seed(&self) -> u32 {
        self.bag.rng_state()
    }
}

impl Default for PieceQueue {
    fn default() -> Self {
        Self::new(1)
    }
}
