//! Layer 0: Time primitives
//!
//! WallClock for LWW ordering of draft writes.
//! Clock is the injected time source; production uses the system clock,
//! tests supply a manual one.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

/// Wall clock reading in milliseconds since the unix epoch.
///
/// This is the LWW ordering primitive: it records when a draft value was
/// produced, not when it was stored.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct WallClock(pub u64);

impl WallClock {
    pub fn now() -> Self {
        use std::time::{SystemTime, UNIX_EPOCH};
        let ms = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis() as u64;
        Self(ms)
    }
}

/// Injected time source.
pub trait Clock: Send + Sync {
    fn now(&self) -> WallClock;
}

/// Production clock: reads the system wall clock.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> WallClock {
        WallClock::now()
    }
}

/// Deterministic clock for tests and embedders that own time.
#[derive(Debug, Default)]
pub struct ManualClock(AtomicU64);

impl ManualClock {
    pub fn at(ms: u64) -> Self {
        Self(AtomicU64::new(ms))
    }

    pub fn set(&self, ms: u64) {
        self.0.store(ms, Ordering::Relaxed);
    }

    pub fn advance(&self, ms: u64) {
        self.0.fetch_add(ms, Ordering::Relaxed);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> WallClock {
        WallClock(self.0.load(Ordering::Relaxed))
    }
}

/// Which tolerance bound a client timestamp violated.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Skew {
    Future,
    Past,
}

/// Tolerance window for client-supplied timestamps.
///
/// A timestamp outside `[server - past_ms, server + future_ms]` is replaced
/// with the server reading before it participates in LWW comparison. The
/// future window absorbs small clock drift; the past window lets offline
/// edits through without letting an arbitrarily stale clock pin the register.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SkewWindow {
    pub future_ms: u64,
    pub past_ms: u64,
}

impl Default for SkewWindow {
    fn default() -> Self {
        Self {
            future_ms: 5_000,
            past_ms: 3_600_000,
        }
    }
}

impl SkewWindow {
    /// Clamp `client` against `server`, reporting which bound was violated.
    pub fn clamp(&self, client: WallClock, server: WallClock) -> (WallClock, Option<Skew>) {
        if client.0 > server.0.saturating_add(self.future_ms) {
            (server, Some(Skew::Future))
        } else if client.0 < server.0.saturating_sub(self.past_ms) {
            (server, Some(Skew::Past))
        } else {
            (client, None)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SERVER: WallClock = WallClock(1_700_000_000_000);

    #[test]
    fn skew_window_passes_in_tolerance_timestamps() {
        let window = SkewWindow::default();
        let in_window = [
            WallClock(SERVER.0),
            WallClock(SERVER.0 - 1_000),
            WallClock(SERVER.0 + 4_000),
            WallClock(SERVER.0 + 5_000),
            WallClock(SERVER.0 - 3_600_000),
        ];
        for client in in_window {
            assert_eq!(window.clamp(client, SERVER), (client, None), "{client:?}");
        }
    }

    #[test]
    fn skew_window_clamps_future_timestamps() {
        let window = SkewWindow::default();
        let client = WallClock(SERVER.0 + 5_001);
        assert_eq!(window.clamp(client, SERVER), (SERVER, Some(Skew::Future)));

        let hour_ahead = WallClock(SERVER.0 + 3_600_000);
        assert_eq!(window.clamp(hour_ahead, SERVER), (SERVER, Some(Skew::Future)));
    }

    #[test]
    fn skew_window_clamps_past_timestamps() {
        let window = SkewWindow::default();
        let client = WallClock(SERVER.0 - 3_600_001);
        assert_eq!(window.clamp(client, SERVER), (SERVER, Some(Skew::Past)));

        let two_hours_back = WallClock(SERVER.0 - 7_200_000);
        assert_eq!(window.clamp(two_hours_back, SERVER), (SERVER, Some(Skew::Past)));
    }

    #[test]
    fn skew_window_saturates_near_epoch() {
        let window = SkewWindow::default();
        let server = WallClock(1_000);
        assert_eq!(window.clamp(WallClock(0), server), (WallClock(0), None));
    }

    #[test]
    fn manual_clock_is_settable() {
        let clock = ManualClock::at(10);
        assert_eq!(clock.now(), WallClock(10));
        clock.advance(5);
        assert_eq!(clock.now(), WallClock(15));
        clock.set(100);
        assert_eq!(clock.now(), WallClock(100));
    }
}
