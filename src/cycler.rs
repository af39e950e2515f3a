//! Inactivity cycler: advances to the next feed when nothing has loaded for
//! a while.
//!
//! The cycler owns at most one timer task. While armed, the task sends an
//! [`AppEvent::InactivityElapsed`] every `period`; the UI loop answers it by
//! loading the next feed, and a successful load re-arms the cycler, which
//! restarts the countdown from zero.
//!
//! Expiries travel through the same channel as every other background
//! event, so a cycle is handled only after the previous render finished.

use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};

use crate::app::AppEvent;

/// Period used when the config does not set `cycle_interval_secs`.
pub const DEFAULT_PERIOD: Duration = Duration::from_secs(20);

pub struct InactivityCycler {
    period: Duration,
    event_tx: mpsc::Sender<AppEvent>,
    handle: Option<JoinHandle<()>>,
    /// Bumped on every arm/cancel so expiries already queued by a previous
    /// timer can be recognised and dropped.
    generation: u64,
}

impl InactivityCycler {
    /// Create an idle cycler. A zero `period` disables cycling entirely.
    pub fn new(period: Duration, event_tx: mpsc::Sender<AppEvent>) -> Self {
        Self {
            period,
            event_tx,
            handle: None,
            generation: 0,
        }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    pub fn is_enabled(&self) -> bool {
        !self.period.is_zero()
    }

    pub fn is_armed(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Whether an expiry tagged with `generation` came from the live timer.
    pub fn is_current(&self, generation: u64) -> bool {
        self.handle.is_some() && generation == self.generation
    }

    /// Cancel any running timer and start a fresh one.
    pub fn arm(&mut self) {
        self.cancel();
        if !self.is_enabled() {
            return;
        }

        let period = self.period;
        let generation = self.generation;
        let tx = self.event_tx.clone();

        tracing::trace!(period_ms = period.as_millis() as u64, generation, "Arming inactivity timer");

        self.handle = Some(tokio::spawn(async move {
            let mut interval = time::interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                if tx
                    .send(AppEvent::InactivityElapsed { generation })
                    .await
                    .is_err()
                {
                    tracing::debug!("Event channel closed, stopping inactivity timer");
                    break;
                }
            }
        }));
    }

    /// Stop the timer, if any. The cycler stays idle until the next `arm`.
    pub fn cancel(&mut self) {
        self.generation = self.generation.wrapping_add(1);
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}

impl Drop for InactivityCycler {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}
