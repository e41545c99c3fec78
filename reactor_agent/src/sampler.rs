//! Sampling loop: sample, encode, write, sleep. Link loss never ends the loop;
//! it only moves the loop into discovery retries.

use std::thread;
use std::time::{Duration, Instant};

use tracing::{debug, warn};

use crate::link::{Link, PortEnumerator, PortOpener};
use crate::metrics::SnapshotSource;
use crate::proto::encode_record;

/// When to try discovery again while the link is down.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryPolicy {
    /// One attempt per sampling tick.
    EveryTick,
    /// Delay doubles after each failure up to `max`; success resets it.
    Backoff { initial: Duration, max: Duration },
}

impl RetryPolicy {
    pub fn backoff() -> Self {
        RetryPolicy::Backoff {
            initial: Duration::from_secs(1),
            max: Duration::from_secs(30),
        }
    }
}

#[derive(Debug)]
struct RetryState {
    policy: RetryPolicy,
    delay: Duration,
    next_at: Option<Instant>,
}

impl RetryState {
    fn new(policy: RetryPolicy) -> Self {
        let delay = match policy {
            RetryPolicy::EveryTick => Duration::ZERO,
            RetryPolicy::Backoff { initial, .. } => initial,
        };
        Self {
            policy,
            delay,
            next_at: None,
        }
    }

    fn due(&self, now: Instant) -> bool {
        self.next_at.is_none_or(|t| now >= t)
    }

    fn failed(&mut self, now: Instant) {
        if let RetryPolicy::Backoff { max, .. } = self.policy {
            self.next_at = Some(now + self.delay);
            self.delay = (self.delay * 2).min(max);
        }
    }

    fn succeeded(&mut self) {
        *self = Self::new(self.policy);
    }
}

/// What one tick did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Record written.
    Sent,
    /// No link; discovery failed or is waiting for its next attempt.
    Disconnected,
    /// Write failed and the session was dropped; `reconnected` tells whether
    /// the immediate re-discovery found the panel again.
    WriteFailed { reconnected: bool },
    /// The record could not be encoded within limits; nothing was written.
    Dropped,
}

pub struct Sampler<S, E, O> {
    source: S,
    link: Link<E, O>,
    retry: RetryState,
}

impl<S, E, O> Sampler<S, E, O>
where
    S: SnapshotSource,
    E: PortEnumerator,
    O: PortOpener,
{
    pub fn new(source: S, link: Link<E, O>, policy: RetryPolicy) -> Self {
        Self {
            source,
            link,
            retry: RetryState::new(policy),
        }
    }

    pub fn link(&self) -> &Link<E, O> {
        &self.link
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// One iteration. Samples even while disconnected so rate-based readings
    /// stay current for when the panel comes back.
    pub fn tick(&mut self, now: Instant) -> TickOutcome {
        let snapshot = self.source.sample();
        let record = match encode_record(&snapshot) {
            Ok(r) => r,
            Err(e) => {
                warn!("dropping sample: {e}");
                return TickOutcome::Dropped;
            }
        };

        if !self.link.is_connected() {
            if !self.retry.due(now) {
                return TickOutcome::Disconnected;
            }
            if self.link.connect().is_err() {
                self.retry.failed(now);
                return TickOutcome::Disconnected;
            }
            self.retry.succeeded();
        }

        match self.link.send(&record) {
            Ok(()) => {
                debug!(bytes = record.len(), "record sent");
                TickOutcome::Sent
            }
            Err(_) => {
                let reconnected = self.link.connect().is_ok();
                if !reconnected {
                    self.retry.failed(now);
                }
                TickOutcome::WriteFailed { reconnected }
            }
        }
    }

    /// Tick forever at `interval`, measured from the start of each tick.
    pub fn run(&mut self, interval: Duration) -> ! {
        loop {
            let started = Instant::now();
            let outcome = self.tick(started);
            debug!(?outcome, "tick");
            thread::sleep(interval.saturating_sub(started.elapsed()));
        }
    }
}
