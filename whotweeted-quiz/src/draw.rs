use rand::Rng;
use rand::rngs::ThreadRng;

/// Which of the two accounts a tweet belongs to, in prompt order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Seat {
    First,
    Second,
}

/// The two random choices made each round.
pub trait Draw {
    /// Pick an account, 50/50.
    fn seat(&mut self) -> Seat;
    /// Pick an index in `0..len`; callers guarantee `len > 0`.
    fn index(&mut self, len: usize) -> usize;
}

/// [`Draw`] backed by any `rand` generator.
pub struct RandomDraw<R>(R);

impl<R: Rng> RandomDraw<R> {
    pub fn new(rng: R) -> Self {
        Self(rng)
    }
}

impl RandomDraw<ThreadRng> {
    pub fn thread() -> Self {
        Self(rand::thread_rng())
    }
}

impl<R: Rng> Draw for RandomDraw<R> {
    fn seat(&mut self) -> Seat {
        if self.0.gen_bool(0.5) {
            Seat::First
        } else {
            Seat::Second
        }
    }

    fn index(&mut self, len: usize) -> usize {
        self.0.gen_range(0..len)
    }
}
