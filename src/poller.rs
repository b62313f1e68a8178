use chrono::{DateTime, Duration, Utc};
use tracing::debug;

use crate::api::AdminApi;
use crate::dashboard::{fetch_posts, DashboardState};

pub const POLL_PERIOD_SECS: i64 = 30;
pub const FETCH_COOLDOWN_SECS: i64 = 10;

fn poll_period() -> Duration {
    Duration::seconds(POLL_PERIOD_SECS)
}

/// Recurring silent-refresh timer for the mounted dashboard view. The
/// timer only runs while the document is visible, and even then a tick
/// fetches nothing unless the cool-down since the last successful fetch
/// has elapsed. Manual refresh does not go through here and therefore
/// never waits for the cool-down.
#[derive(Debug)]
pub struct Poller {
    visible: bool,
    next_due: Option<DateTime<Utc>>,
}

impl Poller {
    /// Starts the timer for a freshly mounted, visible view.
    pub fn start(now: DateTime<Utc>) -> Self {
        Self {
            visible: true,
            next_due: Some(now + poll_period()),
        }
    }

    /// View teardown: only the timer is cleared; in-flight requests are
    /// never cancelled.
    pub fn stop(&mut self) {
        self.next_due = None;
    }

    pub fn is_suspended(&self) -> bool {
        self.next_due.is_none()
    }

    /// Advances the timer. Fires a silent fetch when the deadline has
    /// passed, the document is visible, and the cool-down has elapsed.
    /// Returns whether a fetch was issued.
    pub fn tick<A: AdminApi>(
        &mut self,
        api: &A,
        state: &mut DashboardState,
        now: DateTime<Utc>,
    ) -> bool {
        if !self.visible {
            return false;
        }
        let Some(due) = self.next_due else {
            return false;
        };
        if now < due {
            return false;
        }
        self.next_due = Some(now + poll_period());
        if !cooldown_elapsed(state, now) {
            debug!("poll tick suppressed by cool-down");
            return false;
        }
        fetch_posts(api, state, true, now);
        true
    }

    /// Document visibility change. Becoming hidden suspends the timer
    /// entirely; becoming visible resets it and fetches immediately when
    /// the cool-down allows. Returns whether a fetch was issued.
    pub fn set_visible<A: AdminApi>(
        &mut self,
        api: &A,
        state: &mut DashboardState,
        visible: bool,
        now: DateTime<Utc>,
    ) -> bool {
        if visible == self.visible {
            return false;
        }
        self.visible = visible;
        if !visible {
            self.next_due = None;
            return false;
        }
        self.next_due = Some(now + poll_period());
        if !cooldown_elapsed(state, now) {
            debug!("visibility fetch suppressed by cool-down");
            return false;
        }
        fetch_posts(api, state, true, now);
        true
    }
}

fn cooldown_elapsed(state: &DashboardState, now: DateTime<Utc>) -> bool {
    match state.last_fetched {
        Some(at) => now - at >= Duration::seconds(FETCH_COOLDOWN_SECS),
        None => true,
    }
}
