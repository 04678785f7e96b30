//! Clock port - 時刻の抽象化。
//!
//! テストでは FixedClock を使って決定的な時刻を注入する。

use chrono::{DateTime, TimeDelta, Utc};
use std::sync::Mutex;

/// Provides the current instant. Trait so tests can pin time.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Production clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Test clock pinned to one instant; advance it explicitly.
#[derive(Debug)]
pub struct FixedClock {
    at: Mutex<DateTime<Utc>>,
}

impl FixedClock {
    pub fn new(at: DateTime<Utc>) -> Self {
        Self { at: Mutex::new(at) }
    }

    pub fn set(&self, at: DateTime<Utc>) {
        *self.at.lock().expect("clock lock poisoned") = at;
    }

    pub fn advance(&self, delta: TimeDelta) {
        let mut at = self.at.lock().expect("clock lock poisoned");
        *at += delta;
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        *self.at.lock().expect("clock lock poisoned")
    }
}
