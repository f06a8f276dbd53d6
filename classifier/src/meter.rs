//! Throughput accounting of the classification server.
//!
use std::{
    sync::atomic::{AtomicU64, Ordering},
    time::Duration,
};

use tokio::{
    task::JoinHandle,
    time::{interval, MissedTickBehavior},
};

pub static METER: Meter = Meter::new();

/// Counters of handled classification requests.
#[derive(Default)]
pub struct Meter {
    classified: AtomicU64,
    failed: AtomicU64,
}

/// Requests counted since the previous `Meter::take`.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Reading {
    pub classified: u64,
    pub failed: u64,
}

impl Reading {
    pub fn is_idle(&self) -> bool {
        self.classified == 0 && self.failed == 0
    }

    /// One log line with the rates over `elapsed`.
    pub fn rates(&self, elapsed: Duration) -> String {
        let secs = elapsed.as_secs_f32().max(f32::EPSILON);
        format!(
            "Requests per second: {:.2} classified, {:.2} failed",
            self.classified as f32 / secs,
            self.failed as f32 / secs
        )
    }
}

impl Meter {
    pub const fn new() -> Meter {
        Meter {
            classified: AtomicU64::new(0),
            failed: AtomicU64::new(0),
        }
    }

    pub fn tick_classified(&self) {
        self.classified.fetch_add(1, Ordering::Relaxed);
    }

    pub fn tick_failed(&self) {
        self.failed.fetch_add(1, Ordering::Relaxed);
    }

    /// Read and reset both counters.
    pub fn take(&self) -> Reading {
        Reading {
            classified: self.classified.swap(0, Ordering::Relaxed),
            failed: self.failed.swap(0, Ordering::Relaxed),
        }
    }
}

/// Log the request rates of `METER` every `period`, skipping idle periods.
pub fn spawn_meter_logger(period: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticks = interval(period);
        ticks.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut last = ticks.tick().await;

        loop {
            let now = ticks.tick().await;
            let reading = METER.take();
            if !reading.is_idle() {
                log::info!("{}", reading.rates(now - last));
            }
            last = now;
        }
    })
}
