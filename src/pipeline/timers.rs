//! Idle watchdog and keepalive timers.
//!
//! Both are deadline holders polled from the orchestrator's select loop
//! rather than free-running callbacks, so timer expiry goes through the
//! same state-transition code as the data path. Rearming while an expiry
//! future is pending simply moves the deadline: last rearm wins.

use std::time::Duration;
use tokio::time::{Instant, sleep_until};

/// Silence-triggered end-of-utterance timer.
///
/// Starts disarmed; every observed PCM chunk (or the keepalive) arms it
/// afresh. On expiry the orchestrator drains the assembler and ends the
/// STT session.
#[derive(Debug)]
pub struct IdleWatchdog {
    threshold: Duration,
    deadline: Option<Instant>,
}

impl IdleWatchdog {
    /// Creates a disarmed watchdog with the given idle threshold.
    pub fn new(threshold: Duration) -> Self {
        Self {
            threshold,
            deadline: None,
        }
    }

    /// Arms the watchdog for one threshold from now, replacing any earlier
    /// deadline.
    pub fn rearm(&mut self) {
        self.deadline = Some(Instant::now() + self.threshold);
    }

    /// Disarms the watchdog.
    pub fn disarm(&mut self) {
        self.deadline = None;
    }

    pub fn is_armed(&self) -> bool {
        self.deadline.is_some()
    }

    pub fn threshold(&self) -> Duration {
        self.threshold
    }

    /// Resolves when the current deadline passes.
    ///
    /// Must only be polled while armed (guard the select branch with
    /// [`is_armed`](Self::is_armed)); recreate the future after any rearm.
    pub async fn expired(&self) {
        match self.deadline {
            Some(deadline) => sleep_until(deadline).await,
            None => std::future::pending().await,
        }
    }
}

/// One-shot timer bridging the gap before the first PCM chunk.
///
/// Armed at session start; if it fires before any data arrives, the
/// orchestrator sends a single target-duration silence frame so the
/// provider does not drop the idle stream.
#[derive(Debug)]
pub struct Keepalive {
    deadline: Instant,
    armed: bool,
}

impl Keepalive {
    /// Arms a keepalive for `delay` from now.
    pub fn new(delay: Duration) -> Self {
        Self {
            deadline: Instant::now() + delay,
            armed: true,
        }
    }

    /// Disarms permanently; called on first PCM chunk or after firing.
    pub fn disarm(&mut self) {
        self.armed = false;
    }

    pub fn is_armed(&self) -> bool {
        self.armed
    }

    /// Resolves at the keepalive deadline. Guard with [`is_armed`](Self::is_armed).
    pub async fn expired(&self) {
        sleep_until(self.deadline).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::advance;

    #[tokio::test(start_paused = true)]
    async fn test_watchdog_starts_disarmed() {
        let watchdog = IdleWatchdog::new(Duration::from_millis(8000));
        assert!(!watchdog.is_armed());
        assert_eq!(watchdog.threshold(), Duration::from_millis(8000));
    }

    #[tokio::test(start_paused = true)]
    async fn test_watchdog_fires_at_threshold() {
        let mut watchdog = IdleWatchdog::new(Duration::from_millis(8000));
        watchdog.rearm();

        let start = Instant::now();
        watchdog.expired().await;
        assert_eq!(start.elapsed(), Duration::from_millis(8000));
    }

    #[tokio::test(start_paused = true)]
    async fn test_watchdog_last_rearm_wins() {
        let mut watchdog = IdleWatchdog::new(Duration::from_millis(8000));
        let start = Instant::now();

        // Chunks at t=0, 2000, 4000; the only deadline that counts is the
        // last one.
        watchdog.rearm();
        advance(Duration::from_millis(2000)).await;
        watchdog.rearm();
        advance(Duration::from_millis(2000)).await;
        watchdog.rearm();

        watchdog.expired().await;
        assert_eq!(start.elapsed(), Duration::from_millis(12_000));
    }

    #[tokio::test(start_paused = true)]
    async fn test_watchdog_does_not_fire_early() {
        let mut watchdog = IdleWatchdog::new(Duration::from_millis(8000));
        watchdog.rearm();

        advance(Duration::from_millis(7999)).await;
        let pending = tokio::time::timeout(Duration::from_millis(0), watchdog.expired()).await;
        assert!(pending.is_err(), "watchdog fired before threshold");
    }

    #[tokio::test(start_paused = true)]
    async fn test_keepalive_fires_once_at_delay() {
        let keepalive = Keepalive::new(Duration::from_millis(700));
        assert!(keepalive.is_armed());

        let start = Instant::now();
        keepalive.expired().await;
        assert_eq!(start.elapsed(), Duration::from_millis(700));
    }

    #[tokio::test(start_paused = true)]
    async fn test_keepalive_disarm() {
        let mut keepalive = Keepalive::new(Duration::from_millis(700));
        keepalive.disarm();
        assert!(!keepalive.is_armed());
    }
}
