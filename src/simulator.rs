//! Loss simulation for exercising the ARQ machinery.
//!
//! Real networks drop packets.  To exercise retransmission without depending
//! on actual network conditions, each role consults a [`LossSource`] before
//! every outbound data packet (sender) or ACK (receiver) and silently skips
//! the send when the source says "drop".
//!
//! | Source           | Behaviour                                             |
//! |------------------|-------------------------------------------------------|
//! | [`RandomLoss`]   | One uniform sample in `[0, 1)` per decision.          |
//! | [`ScriptedLoss`] | Replays a fixed sequence of outcomes (tests).         |
//! | [`NoLoss`]       | Never drops.                                          |

use std::collections::VecDeque;
use std::time::{SystemTime, UNIX_EPOCH};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Pluggable source of drop decisions.
pub trait LossSource {
    /// Decide whether the next outbound datagram is lost.
    ///
    /// `probability` is the configured loss ratio in `[0, 1]`.
    fn should_drop(&mut self, probability: f64) -> bool;
}

impl<L: LossSource + ?Sized> LossSource for &mut L {
    fn should_drop(&mut self, probability: f64) -> bool {
        (**self).should_drop(probability)
    }
}

impl<L: LossSource + ?Sized> LossSource for Box<L> {
    fn should_drop(&mut self, probability: f64) -> bool {
        (**self).should_drop(probability)
    }
}

/// `true` iff `sample` falls below `probability`.
///
/// Kept separate from the RNG so the threshold rule is testable on its own.
#[inline]
pub fn sample_drops(sample: f64, probability: f64) -> bool {
    sample < probability
}

// ---------------------------------------------------------------------------
// RandomLoss
// ---------------------------------------------------------------------------

/// Production loss source backed by a seeded [`StdRng`].
///
/// Not cryptographically meaningful; it only needs to look random.
#[derive(Debug, Clone)]
pub struct RandomLoss {
    rng: StdRng,
}

impl RandomLoss {
    /// Seed from the wall clock's sub-second resolution.
    pub fn from_clock() -> Self {
        let seed = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos() as u64)
            .unwrap_or_default();
        log::debug!("[sim] loss RNG seeded with {seed}");
        Self::seeded(seed)
    }

    /// Reproducible source for a given seed.
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Default for RandomLoss {
    fn default() -> Self {
        Self::from_clock()
    }
}

impl LossSource for RandomLoss {
    fn should_drop(&mut self, probability: f64) -> bool {
        let sample: f64 = self.rng.random();
        sample_drops(sample, probability)
    }
}

// ---------------------------------------------------------------------------
// ScriptedLoss
// ---------------------------------------------------------------------------

/// Deterministic loss source replaying a fixed list of outcomes.
///
/// The configured probability is ignored.  Once the script runs out every
/// further datagram is delivered.
#[derive(Debug, Clone, Default)]
pub struct ScriptedLoss {
    outcomes: VecDeque<bool>,
    consulted: usize,
}

impl ScriptedLoss {
    /// `outcomes[i]` is the drop decision for the `i`-th consultation.
    pub fn new(outcomes: impl IntoIterator<Item = bool>) -> Self {
        Self {
            outcomes: outcomes.into_iter().collect(),
            consulted: 0,
        }
    }

    /// How many decisions have been requested so far.
    pub fn consulted(&self) -> usize {
        self.consulted
    }
}

impl LossSource for ScriptedLoss {
    fn should_drop(&mut self, _probability: f64) -> bool {
        self.consulted += 1;
        self.outcomes.pop_front().unwrap_or(false)
    }
}

/// A lossless channel.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoLoss;

impl LossSource for NoLoss {
    fn should_drop(&mut self, _probability: f64) -> bool {
        false
    }
}
