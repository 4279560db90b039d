//! Acknowledgement timeout derivation and the bounded wait built on it.
//!
//! The sender is configured with an integer exponent `e`.  The wait is
//! derived in three steps:
//!
//! ```text
//!   micros  = 10^e
//!   millis  = floor(micros / 1000)
//!   wait    = (millis / 1000) seconds + (millis % 1000) microseconds
//! ```
//!
//! The last step feeds the millisecond remainder into a microsecond field.
//! That unit mix-up is intentional and preserved: `e = 3` waits 1µs, `e = 6`
//! waits 1s, `e = 7` waits 10s.  A wait whose both parts are zero (`e <= 2`)
//! never expires, matching a socket receive timeout of zero.

use std::future::Future;
use std::time::Duration;

use crate::config::ConfigError;

/// Seconds plus sub-second remainder, as handed to the wait primitive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitSpec {
    pub seconds: u64,
    /// Millisecond remainder, interpreted as microseconds.
    pub sub_second: u64,
}

/// Retransmit timeout for the sender's wait on an ACK.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AckTimeout {
    exponent: u32,
    millis: u64,
}

impl AckTimeout {
    /// Derive the timeout from exponent `e`.
    ///
    /// Fails when `10^e` does not fit in a `u64`.
    pub fn from_exponent(exponent: u32) -> Result<Self, ConfigError> {
        let micros = 10u64
            .checked_pow(exponent)
            .ok_or(ConfigError::TimeoutExponent(exponent))?;
        Ok(Self {
            exponent,
            millis: micros / 1000,
        })
    }

    pub fn exponent(&self) -> u32 {
        self.exponent
    }

    /// `floor(10^e / 1000)`.
    pub fn millis(&self) -> u64 {
        self.millis
    }

    pub fn wait_spec(&self) -> WaitSpec {
        WaitSpec {
            seconds: self.millis / 1000,
            sub_second: self.millis % 1000,
        }
    }

    /// The effective wait, or `None` when it never expires.
    pub fn duration(&self) -> Option<Duration> {
        let spec = self.wait_spec();
        if spec.seconds == 0 && spec.sub_second == 0 {
            return None;
        }
        Some(Duration::from_secs(spec.seconds) + Duration::from_micros(spec.sub_second))
    }

    /// Run `fut` under this timeout.
    pub async fn wait<F: Future>(&self, fut: F) -> Wait<F::Output> {
        match self.duration() {
            None => Wait::Ready(fut.await),
            Some(limit) => match tokio::time::timeout(limit, fut).await {
                Ok(out) => Wait::Ready(out),
                Err(_elapsed) => Wait::TimedOut,
            },
        }
    }
}

/// Outcome of a bounded wait.
#[derive(Debug, PartialEq, Eq)]
pub enum Wait<T> {
    Ready(T),
    TimedOut,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exponent_three_is_one_milli() {
        let t = AckTimeout::from_exponent(3).unwrap();
        assert_eq!(t.exponent(), 3);
        assert_eq!(t.millis(), 1);
        assert_eq!(
            t.wait_spec(),
            WaitSpec {
                seconds: 0,
                sub_second: 1
            }
        );
        assert_eq!(t.duration(), Some(Duration::from_micros(1)));
    }

    #[test]
    fn remainder_lands_in_microseconds() {
        // 10^5 µs = 100 ms -> 0 s + 100 "µs".
        let t = AckTimeout::from_exponent(5).unwrap();
        assert_eq!(t.millis(), 100);
        assert_eq!(t.duration(), Some(Duration::from_micros(100)));
    }

    #[test]
    fn whole_seconds_carry_over() {
        assert_eq!(
            AckTimeout::from_exponent(6).unwrap().duration(),
            Some(Duration::from_secs(1))
        );
        let ten = AckTimeout::from_exponent(10).unwrap();
        assert_eq!(ten.millis(), 10_000_000);
        assert_eq!(
            ten.wait_spec(),
            WaitSpec {
                seconds: 10_000,
                sub_second: 0
            }
        );
    }

    #[test]
    fn small_exponents_never_expire() {
        for e in 0..=2 {
            let t = AckTimeout::from_exponent(e).unwrap();
            assert_eq!(t.millis(), 0);
            assert_eq!(t.duration(), None);
        }
    }

    #[test]
    fn overflowing_exponent_is_rejected() {
        assert!(AckTimeout::from_exponent(19).is_ok());
        assert!(matches!(
            AckTimeout::from_exponent(20),
            Err(ConfigError::TimeoutExponent(20))
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn wait_times_out_on_pending_future() {
        let t = AckTimeout::from_exponent(6).unwrap();
        let out = t.wait(std::future::pending::<()>()).await;
        assert_eq!(out, Wait::TimedOut);
    }

    #[tokio::test]
    async fn wait_returns_ready_value() {
        let t = AckTimeout::from_exponent(6).unwrap();
        assert_eq!(t.wait(async { 7 }).await, Wait::Ready(7));
        let unbounded = AckTimeout::from_exponent(1).unwrap();
        assert_eq!(unbounded.wait(async { 8 }).await, Wait::Ready(8));
    }
}
