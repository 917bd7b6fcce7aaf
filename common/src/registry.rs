// Timer registry: named, periodic, weekday-scoped triggers.
//
// Each registered timer owns a tokio task that computes the next occurrence
// of its weekday/time in the configured timezone and sleeps until then. The
// underlying trigger only understands "fire at time T on weekday D,
// forever"; week parity is evaluated at fire time by the dispatcher, not
// here.

use crate::errors::RegistryError;
use crate::models::{ReminderPayload, Weekday};
use chrono::{NaiveTime, Timelike, Utc};
use chrono_tz::Tz;
use cron::Schedule as CronSchedule;
use futures::future::BoxFuture;
use std::collections::HashMap;
use std::str::FromStr;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// Async callback invoked with the timer's payload snapshot on every fire.
pub type TimerCallback = Arc<dyn Fn(ReminderPayload) -> BoxFuture<'static, ()> + Send + Sync>;

pub struct TimerRegistry {
    timezone: Tz,
    timers: Mutex<HashMap<String, JoinHandle<()>>>,
}

impl TimerRegistry {
    pub fn new(timezone: Tz) -> Self {
        Self {
            timezone,
            timers: Mutex::new(HashMap::new()),
        }
    }

    pub fn timezone(&self) -> Tz {
        self.timezone
    }

    /// Install a periodic trigger firing every occurrence of `day` at
    /// `fire_time` in the registry timezone. Registering under an existing
    /// name replaces the old registration, so one logical slot never
    /// delivers twice.
    pub fn register_weekly(
        &self,
        name: &str,
        day: Weekday,
        fire_time: NaiveTime,
        payload: ReminderPayload,
        callback: TimerCallback,
    ) -> Result<(), RegistryError> {
        let schedule = weekly_schedule(day, fire_time).map_err(|e| RegistryError::InvalidTrigger {
            name: name.to_string(),
            reason: e.to_string(),
        })?;

        let mut timers = self.lock_timers();
        if let Some(old) = timers.remove(name) {
            old.abort();
            debug!(timer = %name, "Replaced existing timer registration");
        }

        let task = tokio::spawn(run_timer(
            schedule,
            self.timezone,
            name.to_string(),
            payload,
            callback,
        ));
        timers.insert(name.to_string(), task);

        debug!(
            timer = %name,
            day = day.cron_token(),
            fire_time = %fire_time.format("%H:%M"),
            "Weekly timer registered"
        );
        Ok(())
    }

    /// Cancel the named timer. Returns false if no such timer exists.
    pub fn cancel(&self, name: &str) -> bool {
        match self.lock_timers().remove(name) {
            Some(handle) => {
                handle.abort();
                debug!(timer = %name, "Timer cancelled");
                true
            }
            None => false,
        }
    }

    /// Names of all live timers, for diagnostics and tests.
    pub fn names(&self) -> Vec<String> {
        self.lock_timers().keys().cloned().collect()
    }

    /// Cancel every timer. Used at process teardown.
    pub fn shutdown(&self) {
        let mut timers = self.lock_timers();
        for (_, handle) in timers.drain() {
            handle.abort();
        }
    }

    fn lock_timers(&self) -> MutexGuard<'_, HashMap<String, JoinHandle<()>>> {
        self.timers.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Drop for TimerRegistry {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Build the weekly cron schedule "at fire_time on day, every week".
fn weekly_schedule(day: Weekday, fire_time: NaiveTime) -> Result<CronSchedule, cron::error::Error> {
    let expression = format!(
        "0 {} {} * * {}",
        fire_time.minute(),
        fire_time.hour(),
        day.cron_token()
    );
    CronSchedule::from_str(&expression)
}

async fn run_timer(
    schedule: CronSchedule,
    timezone: Tz,
    name: String,
    payload: ReminderPayload,
    callback: TimerCallback,
) {
    // Advancing the reference past each delivered occurrence keeps a
    // wall-clock jump from replaying missed weeks in a burst.
    let mut reference = Utc::now().with_timezone(&timezone);
    loop {
        let now = Utc::now().with_timezone(&timezone);
        if now > reference {
            reference = now;
        }
        let Some(next) = schedule.after(&reference).next() else {
            warn!(timer = %name, "Weekly trigger has no further occurrences");
            break;
        };

        let wait = (next - now).to_std().unwrap_or(Duration::ZERO);
        tokio::time::sleep(wait).await;

        debug!(timer = %name, "Weekly trigger fired");
        callback(payload.clone()).await;
        reference = next;
    }
}
