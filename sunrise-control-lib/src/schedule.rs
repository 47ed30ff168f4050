use std::future::Future;
use std::time::Duration;

use anyhow::{anyhow, Context};
use chrono::{DateTime, Days, LocalResult, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;
use log::{error, info};
use tokio::time::sleep;

/// Longest single sleep while waiting for the next occurrence.
pub const MAX_SLEEP: Duration = Duration::from_secs(60);

/// Fires once a day at a fixed wall-clock time in a given time zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DailyTrigger {
    at: NaiveTime,
    timezone: Tz,
}

impl DailyTrigger {
    pub fn new(at: NaiveTime, timezone: Tz) -> Self {
        DailyTrigger { at, timezone }
    }

    /// Builds a trigger from a time such as `8:00` or `06:45` and an IANA time zone name.
    pub fn parse(time: &str, timezone: &str) -> anyhow::Result<Self> {
        let (hour, minute) = time
            .split_once(':')
            .ok_or_else(|| anyhow!("Invalid time {:?}, expected H:MM", time))?;
        let hour = hour.trim().parse::<u32>().context("Invalid hour")?;
        let minute = minute.trim().parse::<u32>().context("Invalid minute")?;
        let at = NaiveTime::from_hms_opt(hour, minute, 0)
            .ok_or_else(|| anyhow!("Time {:?} is out of range", time))?;
        let timezone = timezone
            .parse::<Tz>()
            .map_err(|e| anyhow!("Unknown time zone {:?}: {}", timezone, e))?;
        Ok(Self::new(at, timezone))
    }

    /**
    The first instant strictly after `now` whose local time is the trigger time.

    Days on which the trigger time does not exist (the gap of a daylight saving change)
    are skipped. If the trigger time occurs twice, the earlier one is used.
     */
    pub fn next_occurrence(&self, now: DateTime<Utc>) -> DateTime<Tz> {
        let local_now = now.with_timezone(&self.timezone);
        let mut date = local_now.date_naive();
        loop {
            match self.timezone.from_local_datetime(&date.and_time(self.at)) {
                LocalResult::Single(next) | LocalResult::Ambiguous(next, _)
                    if next > local_now =>
                {
                    return next;
                }
                _ => date = date + Days::new(1),
            }
        }
    }

    /// Awaits `callback` at every occurrence, forever.
    ///
    /// A failed run is logged and the trigger carries on with the next day. Runs never
    /// overlap because each one is awaited before the next occurrence is computed.
    pub async fn run<F, Fut>(&self, callback: F)
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = anyhow::Result<()>>,
    {
        self.run_with_clock(Utc::now, callback).await
    }

    /// Like [`Self::run`], reading wall-clock time from `clock`.
    ///
    /// The wait for the next occurrence is split into chunks of at most [`MAX_SLEEP`] and
    /// re-checked against `clock` after each one, so a suspended host or a stepped clock
    /// delays the wake-up by one chunk at most.
    pub async fn run_with_clock<C, F, Fut>(&self, clock: C, mut callback: F)
    where
        C: Fn() -> DateTime<Utc>,
        F: FnMut() -> Fut,
        Fut: Future<Output = anyhow::Result<()>>,
    {
        loop {
            let next = self.next_occurrence(clock()).with_timezone(&Utc);
            info!("Next wake-up at {}", next.with_timezone(&self.timezone));
            while let Ok(remaining) = (next - clock()).to_std() {
                if remaining.is_zero() {
                    break;
                }
                sleep(remaining.min(MAX_SLEEP)).await;
            }

            if let Err(e) = callback().await {
                error!("Wake-up failed: {:#}", e);
            }
        }
    }
}
