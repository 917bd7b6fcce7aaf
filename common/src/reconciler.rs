// Reconciliation engine: makes the live timer set match the durable
// lecture list of a chat exactly.
//
// Timer names derive from durable lecture ids, so adding or removing one
// lecture never disturbs sibling timers. Timers are not persisted; the full
// set is rebuilt from the schedule file at startup.

use crate::dispatcher::ReminderDispatcher;
use crate::models::{Lecture, ReminderPayload, ScheduleBook};
use crate::registry::{TimerCallback, TimerRegistry};
use chrono::{Duration, NaiveTime};
use futures::FutureExt;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Timer name for one lecture slot: the join key between a lecture and its
/// live timer.
pub fn timer_name(chat_id: i64, lecture_id: u64) -> String {
    format!("lecture_{}_{}", chat_id, lecture_id)
}

/// Prefix shared by every timer of a chat.
pub fn chat_timer_prefix(chat_id: i64) -> String {
    format!("lecture_{}_", chat_id)
}

/// When the reminder fires: lecture start minus the lead, clamped at 00:00
/// so the reminder never leaves the lecture's own day. A lecture starting
/// earlier than the lead is announced at midnight of the same weekday.
pub fn reminder_time(start: NaiveTime, lead_minutes: u32) -> NaiveTime {
    let lead = Duration::minutes(i64::from(lead_minutes));
    if start.signed_duration_since(NaiveTime::MIN) < lead {
        NaiveTime::MIN
    } else {
        start - lead
    }
}

pub struct Reconciler {
    registry: Arc<TimerRegistry>,
    dispatcher: Arc<ReminderDispatcher>,
    lead_minutes: u32,
}

impl Reconciler {
    pub fn new(
        registry: Arc<TimerRegistry>,
        dispatcher: Arc<ReminderDispatcher>,
        lead_minutes: u32,
    ) -> Self {
        Self {
            registry,
            dispatcher,
            lead_minutes,
        }
    }

    /// Bring the chat's timers in line with its lecture list: cancel stale
    /// names, then (re)register a timer per lecture. Registration is
    /// idempotent, so reconciling unchanged input leaves the same name set.
    /// A failed registration is logged and does not abort the siblings.
    /// Returns the number of timers installed.
    pub fn reconcile_chat(&self, chat_id: i64, lectures: &[Lecture]) -> usize {
        let prefix = chat_timer_prefix(chat_id);
        let desired: HashSet<String> = lectures
            .iter()
            .map(|lecture| timer_name(chat_id, lecture.id))
            .collect();

        for name in self.registry.names() {
            if name.starts_with(&prefix) && !desired.contains(&name) {
                self.registry.cancel(&name);
                debug!(chat_id, timer = %name, "Cancelled stale timer");
            }
        }

        let mut installed = 0;
        for lecture in lectures {
            let name = timer_name(chat_id, lecture.id);
            let payload = ReminderPayload {
                chat_id,
                name: lecture.name.clone(),
                time: lecture.time,
                parity: lecture.parity,
            };
            let fire_time = reminder_time(lecture.time, self.lead_minutes);

            let dispatcher = Arc::clone(&self.dispatcher);
            let callback: TimerCallback = Arc::new(move |payload| {
                let dispatcher = Arc::clone(&dispatcher);
                async move { dispatcher.on_fire(payload).await }.boxed()
            });

            match self
                .registry
                .register_weekly(&name, lecture.day, fire_time, payload, callback)
            {
                Ok(()) => installed += 1,
                Err(e) => {
                    warn!(
                        chat_id,
                        timer = %name,
                        error = %e,
                        "Failed to register reminder timer, continuing with siblings"
                    );
                }
            }
        }
        installed
    }

    /// Rebuild the full timer set from durable state. Run at startup, since
    /// timers themselves are never persisted.
    pub fn reconcile_all(&self, book: &ScheduleBook) -> usize {
        let mut installed = 0;
        for (chat_id, chat) in book {
            installed += self.reconcile_chat(*chat_id, &chat.lectures);
        }
        info!(timers = installed, chats = book.len(), "Timer set rebuilt from schedule");
        installed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatcher::{ReminderDispatcher, ReminderSink};
    use crate::errors::DispatchError;
    use crate::models::{WeekParity, Weekday};
    use async_trait::async_trait;
    use proptest::prelude::*;

    fn time(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    #[test]
    fn test_reminder_time_normal_case() {
        assert_eq!(reminder_time(time(9, 0), 15), time(8, 45));
        assert_eq!(reminder_time(time(10, 30), 15), time(10, 15));
        assert_eq!(reminder_time(time(0, 15), 15), time(0, 0));
    }

    #[test]
    fn test_reminder_time_clamps_at_midnight() {
        for minute in 0..15 {
            assert_eq!(reminder_time(time(0, minute), 15), NaiveTime::MIN);
        }
        assert_eq!(reminder_time(time(0, 16), 15), time(0, 1));
    }

    proptest! {
        #[test]
        fn prop_reminder_never_leaves_the_day(hour in 0u32..24, minute in 0u32..60) {
            let start = time(hour, minute);
            let reminder = reminder_time(start, 15);
            // Never wraps past midnight into the previous day.
            prop_assert!(reminder <= start);
            // Either the full lead or the midnight clamp.
            let gap = start.signed_duration_since(reminder);
            if start.signed_duration_since(NaiveTime::MIN) >= Duration::minutes(15) {
                prop_assert_eq!(gap, Duration::minutes(15));
            } else {
                prop_assert_eq!(reminder, NaiveTime::MIN);
            }
        }
    }

    struct NullSink;

    #[async_trait]
    impl ReminderSink for NullSink {
        async fn deliver(&self, _chat_id: i64, _text: &str) -> Result<(), DispatchError> {
            Ok(())
        }
    }

    fn build_reconciler() -> (Arc<TimerRegistry>, Reconciler) {
        let tz = chrono_tz::Asia::Irkutsk;
        let registry = Arc::new(TimerRegistry::new(tz));
        let dispatcher = Arc::new(ReminderDispatcher::new(Arc::new(NullSink), tz, 15));
        let reconciler = Reconciler::new(Arc::clone(&registry), dispatcher, 15);
        (registry, reconciler)
    }

    fn lecture(id: u64, name: &str) -> Lecture {
        Lecture {
            id,
            day: Weekday::Monday,
            time: time(9, 0),
            parity: WeekParity::All,
            name: name.to_string(),
        }
    }

    fn sorted_names(registry: &TimerRegistry) -> Vec<String> {
        let mut names = registry.names();
        names.sort();
        names
    }

    #[tokio::test]
    async fn test_reconcile_is_idempotent() {
        let (registry, reconciler) = build_reconciler();
        let lectures = vec![lecture(1, "A"), lecture(2, "B"), lecture(3, "C")];

        assert_eq!(reconciler.reconcile_chat(7, &lectures), 3);
        let first = sorted_names(&registry);
        assert_eq!(reconciler.reconcile_chat(7, &lectures), 3);
        assert_eq!(sorted_names(&registry), first);
        assert_eq!(first.len(), 3);
    }

    #[tokio::test]
    async fn test_removal_cancels_exactly_the_removed_timer() {
        let (registry, reconciler) = build_reconciler();
        let mut lectures = vec![lecture(1, "A"), lecture(2, "B"), lecture(3, "C")];
        reconciler.reconcile_chat(7, &lectures);

        lectures.remove(0);
        reconciler.reconcile_chat(7, &lectures);

        assert_eq!(
            sorted_names(&registry),
            vec![timer_name(7, 2), timer_name(7, 3)]
        );
    }

    #[tokio::test]
    async fn test_reconcile_does_not_touch_other_chats() {
        let (registry, reconciler) = build_reconciler();
        reconciler.reconcile_chat(1, &[lecture(1, "A")]);
        // Chat id 12 shares a string prefix with chat id 1 up to the
        // underscore; the separator keeps them apart.
        reconciler.reconcile_chat(12, &[lecture(1, "B")]);

        reconciler.reconcile_chat(1, &[]);
        assert_eq!(sorted_names(&registry), vec![timer_name(12, 1)]);
    }

    #[tokio::test]
    async fn test_reconcile_all_rebuilds_every_chat() {
        let (registry, reconciler) = build_reconciler();
        let mut book = ScheduleBook::new();
        let chat_a = crate::store::get_or_create(&mut book, 1);
        chat_a.lectures.push(lecture(1, "A"));
        chat_a.lectures.push(lecture(2, "B"));
        crate::store::get_or_create(&mut book, 2)
            .lectures
            .push(lecture(1, "C"));

        assert_eq!(reconciler.reconcile_all(&book), 3);
        assert_eq!(registry.names().len(), 3);
    }
}
