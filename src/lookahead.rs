//! Lookahead queue of upcoming pieces
//!
//! A fixed-length FIFO: taking the front piece immediately appends a fresh
//! uniformly drawn one, so the preview length never changes.

use crate::tetromino::PieceKind;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// Default number of previewed pieces
pub const DEFAULT_LOOKAHEAD: usize = 5;
/// Most pieces the side panel has room to preview
pub const MAX_LOOKAHEAD: usize = 5;

#[derive(Debug, Clone)]
pub struct Lookahead {
    queue: Vec<PieceKind>,
    rng: ChaCha8Rng,
}

impl Lookahead {
    /// Create a queue of `len` pieces drawn from a seeded RNG, kept within
    /// `1..=MAX_LOOKAHEAD`
    pub fn new(len: usize, seed: u64) -> Self {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let queue = (0..len.clamp(1, MAX_LOOKAHEAD))
            .map(|_| PieceKind::random(&mut rng))
            .collect();
        Self { queue, rng }
    }

    /// Take the front piece and refill the back
    pub fn next(&mut self) -> PieceKind {
        let fresh = PieceKind::random(&mut self.rng);
        self.queue.push(fresh);
        self.queue.remove(0)
    }

    /// Upcoming pieces, front first
    pub fn preview(&self) -> &[PieceKind] {
        &self.queue
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_length_is_invariant() {
        let mut lookahead = Lookahead::new(5, 1);
        for _ in 0..100 {
            lookahead.next();
            assert_eq!(lookahead.len(), 5);
        }
    }

    #[test]
    fn test_fifo_order() {
        let mut lookahead = Lookahead::new(5, 9);
        let before = lookahead.preview().to_vec();
        assert_eq!(lookahead.next(), before[0]);
        assert_eq!(&lookahead.preview()[..4], &before[1..]);
    }

    #[test]
    fn test_zero_length_is_bumped_to_one() {
        let mut lookahead = Lookahead::new(0, 3);
        assert_eq!(lookahead.len(), 1);
        lookahead.next();
        assert!(!lookahead.is_empty());
    }

    #[test]
    fn test_oversized_length_is_capped() {
        let mut lookahead = Lookahead::new(1_000_000_000, 3);
        assert_eq!(lookahead.len(), MAX_LOOKAHEAD);
        lookahead.next();
        assert_eq!(lookahead.len(), MAX_LOOKAHEAD);
    }

    #[test]
    fn test_same_seed_same_stream() {
        let mut a = Lookahead::new(5, 77);
        let mut b = Lookahead::new(5, 77);
        for _ in 0..30 {
            assert_eq!(a.next(), b.next());
        }
    }
}
