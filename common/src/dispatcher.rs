// Reminder dispatch: the callback side of a timer fire.
//
// The timer itself is parity-blind, so the dispatcher re-checks week parity
// against the fire date before emitting anything. A suppressed occurrence
// is not an error; a failed delivery is logged and does not affect the next
// scheduled fire.

use crate::errors::DispatchError;
use crate::models::ReminderPayload;
use crate::replies;
use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use chrono_tz::Tz;
use std::sync::Arc;
use tracing::{debug, error};

/// Outbound message delivery. The Telegram implementation lives in the bot
/// binary; tests substitute a mock.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ReminderSink: Send + Sync {
    async fn deliver(&self, chat_id: i64, text: &str) -> Result<(), DispatchError>;
}

pub struct ReminderDispatcher {
    sink: Arc<dyn ReminderSink>,
    timezone: Tz,
    lead_minutes: u32,
}

impl ReminderDispatcher {
    pub fn new(sink: Arc<dyn ReminderSink>, timezone: Tz, lead_minutes: u32) -> Self {
        Self {
            sink,
            timezone,
            lead_minutes,
        }
    }

    /// Timer callback entry point: parity is decided against "today" in the
    /// configured timezone.
    pub async fn on_fire(&self, payload: ReminderPayload) {
        let today = Utc::now().with_timezone(&self.timezone).date_naive();
        self.dispatch_for_date(payload, today).await;
    }

    /// Same as [`on_fire`](Self::on_fire) with an explicit reference date.
    pub async fn dispatch_for_date(&self, payload: ReminderPayload, date: NaiveDate) {
        if !payload.parity.matches_date(date) {
            debug!(
                chat_id = payload.chat_id,
                lecture = %payload.name,
                date = %date,
                "Reminder suppressed by week parity"
            );
            return;
        }

        let text = replies::reminder_text(&payload.name, payload.time, self.lead_minutes);
        if let Err(e) = self.sink.deliver(payload.chat_id, &text).await {
            error!(
                chat_id = payload.chat_id,
                lecture = %payload.name,
                error = %e,
                "Failed to deliver reminder"
            );
        }
    }
}
