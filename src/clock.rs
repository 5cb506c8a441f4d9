use chrono::{DateTime, Duration, Utc};

pub(crate) trait Clock {
    fn now(&self) -> DateTime<Utc>;
}

pub(crate) struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock that only moves when told to.
#[cfg_attr(not(test), allow(dead_code))]
#[derive(Clone, Debug)]
pub(crate) struct ManualClock {
    now: DateTime<Utc>,
}

#[cfg_attr(not(test), allow(dead_code))]
impl ManualClock {
    pub(crate) fn starting_at(now: DateTime<Utc>) -> Self {
        Self { now }
    }

    pub(crate) fn advance_ms(&mut self, ms: i64) -> DateTime<Utc> {
        self.now += Duration::milliseconds(ms);
        self.now
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        self.now
    }
}

/// Cancellable timer handle. Holds no callback: the owner asks whether it is
/// due and runs its own handler after calling [`Timer::fire`].
#[derive(Clone, Debug)]
pub(crate) struct Timer {
    period: Duration,
    repeat: bool,
    due: Option<DateTime<Utc>>,
}

impl Timer {
    pub(crate) fn interval(period: Duration) -> Self {
        Self {
            period,
            repeat: true,
            due: None,
        }
    }

    pub(crate) fn timeout(period: Duration) -> Self {
        Self {
            period,
            repeat: false,
            due: None,
        }
    }

    /// Arms the timer relative to `now`, replacing any pending deadline.
    pub(crate) fn start(&mut self, now: DateTime<Utc>) {
        self.due = Some(now + self.period);
    }

    pub(crate) fn stop(&mut self) {
        self.due = None;
    }

    pub(crate) fn is_running(&self) -> bool {
        self.due.is_some()
    }

    pub(crate) fn due(&self) -> Option<DateTime<Utc>> {
        self.due
    }

    /// Moves an overdue interval to its latest deadline at or before `now`,
    /// so only one firing is left of the backlog. Returns how many were dropped.
    pub(crate) fn skip_missed(&mut self, now: DateTime<Utc>) -> i64 {
        let (Some(due), true) = (self.due, self.repeat) else {
            return 0;
        };
        let period_ms = self.period.num_milliseconds();
        if due > now || period_ms <= 0 {
            return 0;
        }
        let missed = (now - due).num_milliseconds() / period_ms;
        self.due = Some(due + Duration::milliseconds(missed * period_ms));
        missed
    }

    /// Consumes one firing. Intervals re-arm one period after the deadline
    /// they just hit; timeouts disarm. Returns the deadline that fired.
    pub(crate) fn fire(&mut self) -> Option<DateTime<Utc>> {
        let fired = self.due?;
        self.due = if self.repeat {
            Some(fired + self.period)
        } else {
            None
        };
        Some(fired)
    }
}
