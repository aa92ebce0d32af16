// Per-user action cooldowns
// Process-wide, lost on restart; stale entries are evicted so the map stays small

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use dashmap::DashMap;
use tracing::debug;

/// Run an eviction pass every this many checks
const PRUNE_EVERY: u64 = 256;

pub struct Cooldowns {
    window: Duration,
    last_seen: DashMap<(u64, String), Instant>,
    checks: AtomicU64,
}

impl Cooldowns {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            last_seen: DashMap::new(),
            checks: AtomicU64::new(0),
        }
    }

    /// `true` (and the cooldown restarts) unless the same user performed the
    /// same action within the window
    pub fn check(&self, user_id: u64, action: &str) -> bool {
        self.check_at(user_id, action, Instant::now())
    }

    fn check_at(&self, user_id: u64, action: &str, now: Instant) -> bool {
        if self.checks.fetch_add(1, Ordering::Relaxed) % PRUNE_EVERY == PRUNE_EVERY - 1 {
            self.prune_at(now);
        }

        let mut allowed = true;
        self.last_seen
            .entry((user_id, action.to_string()))
            .and_modify(|last| {
                if now.duration_since(*last) < self.window {
                    allowed = false;
                } else {
                    *last = now;
                }
            })
            .or_insert(now);
        allowed
    }

    /// Drop entries whose window has passed, returning how many were removed
    fn prune_at(&self, now: Instant) -> usize {
        let before = self.last_seen.len();
        self.last_seen
            .retain(|_, last| now.duration_since(*last) < self.window);
        let removed = before.saturating_sub(self.last_seen.len());
        if removed > 0 {
            debug!("Evicted {} expired cooldowns", removed);
        }
        removed
    }

    pub fn len(&self) -> usize {
        self.last_seen.len()
    }
}
