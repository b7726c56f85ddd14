// src/publisher.rs
//
// The publish loop:
//   fetch + parse (retried within a time budget)
//   → diff against what the previous cycle saw
//   → deliver the new, fresh events oldest first
//   → touch health file → sleep → again
//
// The delivered set is replaced wholesale every cycle, so an event that drops
// off the portal page and comes back later is delivered again.

use std::collections::HashSet;
use std::convert::Infallible;
use std::thread;
use std::time::{Duration, Instant};

use chrono::{Local, NaiveDateTime};
use log::{debug, info, warn};

use crate::config::consts::{FRESHNESS_HOURS, MAX_FAIL_TIME, SLEEP_AFTER_FAIL, SLEEP_AFTER_FETCH};
use crate::error::RelayError;
use crate::events::{EventRecord, parse_history};
use crate::format::{Mentions, format_record};
use crate::notify::Notify;
use crate::session::Fetch;
use crate::store::HealthFile;

/// Wall time for the staleness check, a monotonic reading for the retry
/// budget, and the loop's only way to wait.
pub trait Clock {
    /// Local time without zone, comparable to portal timestamps.
    fn now(&self) -> NaiveDateTime;
    /// Monotonic time since some fixed point.
    fn elapsed(&self) -> Duration;
    fn sleep(&mut self, d: Duration);
}

pub struct SystemClock {
    start: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self { start: Instant::now() }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }

    fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    fn sleep(&mut self, d: Duration) {
        thread::sleep(d);
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Timing {
    /// Give up retrying once failures have lasted this long.
    pub max_fail_time: Duration,
    pub sleep_after_fetch: Duration,
    pub sleep_after_fail: Duration,
    /// Events older than this are never delivered.
    pub freshness: chrono::Duration,
}

impl Default for Timing {
    fn default() -> Self {
        Self {
            max_fail_time: MAX_FAIL_TIME,
            sleep_after_fetch: SLEEP_AFTER_FETCH,
            sleep_after_fail: SLEEP_AFTER_FAIL,
            freshness: chrono::Duration::hours(FRESHNESS_HOURS),
        }
    }
}

/// Every record seen by the previous cycle.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DeliveredSet(HashSet<EventRecord>);

impl DeliveredSet {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, record: &EventRecord) -> bool {
        self.0.contains(record)
    }

    /// Swap in this cycle's records; returns the next snapshot plus the
    /// records not in the old one, oldest first.
    pub fn advance(self, current: HashSet<EventRecord>) -> (DeliveredSet, Vec<EventRecord>) {
        let mut unseen: Vec<EventRecord> = current.difference(&self.0).cloned().collect();
        unseen.sort();
        (DeliveredSet(current), unseen)
    }
}

/// What one cycle did.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CycleReport {
    pub fetched: usize,
    pub new: usize,
    pub sent: usize,
    pub skipped: usize,
}

pub struct Publisher<F: Fetch, N: Notify, C: Clock> {
    fetcher: F,
    notifier: N,
    clock: C,
    mentions: Mentions,
    timing: Timing,
    health: Option<HealthFile>,
    delivered: DeliveredSet,
}

impl<F: Fetch, N: Notify, C: Clock> Publisher<F, N, C> {
    pub fn new(fetcher: F, notifier: N, clock: C, mentions: Mentions) -> Self {
        Self {
            fetcher,
            notifier,
            clock,
            mentions,
            timing: Timing::default(),
            health: None,
            delivered: DeliveredSet::default(),
        }
    }

    pub fn with_timing(mut self, timing: Timing) -> Self {
        self.timing = timing;
        self
    }

    pub fn with_health_file(mut self, health: HealthFile) -> Self {
        self.health = Some(health);
        self
    }

    pub fn delivered(&self) -> &DeliveredSet {
        &self.delivered
    }

    /// Only returns on an error nothing can retry: an exhausted fetch
    /// budget, a failed delivery or a health file that cannot be touched.
    pub fn run_forever(&mut self) -> Result<Infallible, RelayError> {
        loop {
            self.cycle()?;
            self.clock.sleep(self.timing.sleep_after_fetch);
        }
    }

    /// One fetch → diff → deliver pass, without the trailing sleep.
    pub fn cycle(&mut self) -> Result<CycleReport, RelayError> {
        let records = self.fetch_with_retry()?;
        let current: HashSet<EventRecord> = records.into_iter().collect();
        let fetched = current.len();

        let (next, unseen) = std::mem::take(&mut self.delivered).advance(current);
        self.delivered = next;
        info!("data count: {fetched}, new: {}", unseen.len());

        let horizon = self.clock.now() - self.timing.freshness;
        let mut report = CycleReport { fetched, new: unseen.len(), ..Default::default() };
        for record in &unseen {
            let message = format_record(record, &self.mentions);
            if record.timestamp < horizon {
                info!("skipping old: {message}");
                report.skipped += 1;
                continue;
            }
            self.notifier.deliver(&message)?;
            info!("sent message: {message}");
            report.sent += 1;
        }

        if let Some(health) = &self.health {
            health.touch()?;
        }
        Ok(report)
    }

    /// Fetch and parse, live every time. Failures are retried until they have
    /// lasted `max_fail_time`; the budget starts fresh on each call.
    fn fetch_with_retry(&mut self) -> Result<Vec<EventRecord>, RelayError> {
        let t0 = self.clock.elapsed();
        let mut attempt = 0usize;
        loop {
            attempt += 1;
            match self.fetch_once() {
                Ok(records) => {
                    debug!("fetch attempt {attempt} ok: {} records", records.len());
                    return Ok(records);
                }
                Err(e) => {
                    let failing_for = self.clock.elapsed().saturating_sub(t0);
                    if failing_for >= self.timing.max_fail_time {
                        warn!("giving up after {attempt} attempts ({}s)", failing_for.as_secs());
                        return Err(e);
                    }
                    warn!("fetch attempt {attempt} failed: {e}");
                    warn!("retrying after {}s", self.timing.sleep_after_fail.as_secs());
                    self.clock.sleep(self.timing.sleep_after_fail);
                }
            }
        }
    }

    fn fetch_once(&mut self) -> Result<Vec<EventRecord>, RelayError> {
        self.fetcher.invalidate()?;
        let page = self.fetcher.fetch()?;
        Ok(parse_history(&page)?)
    }
}
