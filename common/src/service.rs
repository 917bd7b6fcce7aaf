// Command-side gateway over the schedule book.
//
// Every mutating command runs load-state → mutate → persist → reconcile as
// one logical unit under a single async mutex, so interleaved commands from
// different chats cannot race on the shared book or its backing file. Timer
// callbacks never take this lock; their payloads were snapshotted at
// registration time.

use crate::commands::AddRequest;
use crate::errors::CommandError;
use crate::models::{Lecture, ScheduleBook};
use crate::reconciler::{reminder_time, Reconciler};
use crate::store::{self, ScheduleStore};
use chrono::NaiveTime;
use tokio::sync::Mutex;
use tracing::{error, info, instrument};

/// A freshly added lecture together with its computed reminder time.
#[derive(Debug, Clone, PartialEq)]
pub struct AddedLecture {
    pub lecture: Lecture,
    pub reminder_time: NaiveTime,
}

/// One line of the schedule listing: the 1-based position doubling as the
/// removal handle, sorted for display by (day, time).
#[derive(Debug, Clone, PartialEq)]
pub struct ScheduleRow {
    pub position: usize,
    pub lecture: Lecture,
    pub reminder_time: NaiveTime,
}

pub struct LectureService {
    store: ScheduleStore,
    reconciler: Reconciler,
    lead_minutes: u32,
    book: Mutex<ScheduleBook>,
}

impl LectureService {
    /// Load the schedule book from the store. A read failure degrades to an
    /// empty book: the bot stays up and the next successful save rewrites
    /// the file.
    pub async fn open(store: ScheduleStore, reconciler: Reconciler, lead_minutes: u32) -> Self {
        let book = match store.load().await {
            Ok(book) => book,
            Err(e) => {
                error!(error = %e, "Failed to load schedule file, starting with an empty schedule");
                ScheduleBook::new()
            }
        };
        Self {
            store,
            reconciler,
            lead_minutes,
            book: Mutex::new(book),
        }
    }

    pub fn lead_minutes(&self) -> u32 {
        self.lead_minutes
    }

    /// Rebuild every chat's timers from the loaded book. Run once at
    /// startup; returns the number of timers installed.
    pub async fn startup_reconcile(&self) -> usize {
        let book = self.book.lock().await;
        self.reconciler.reconcile_all(&book)
    }

    /// Append a lecture to the chat's schedule, persist, and reconcile the
    /// chat's timers.
    #[instrument(skip(self, request))]
    pub async fn add_lecture(&self, chat_id: i64, request: AddRequest) -> AddedLecture {
        let mut book = self.book.lock().await;

        let chat = store::get_or_create(&mut book, chat_id);
        let lecture = Lecture {
            id: chat.allocate_lecture_id(),
            day: request.day,
            time: request.time,
            parity: request.parity,
            name: request.name,
        };
        chat.lectures.push(lecture.clone());
        let lectures = chat.lectures.clone();

        self.persist(&book).await;
        self.reconciler.reconcile_chat(chat_id, &lectures);

        info!(
            chat_id,
            lecture_id = lecture.id,
            lecture = %lecture.name,
            "Lecture added"
        );
        AddedLecture {
            reminder_time: reminder_time(lecture.time, self.lead_minutes),
            lecture,
        }
    }

    /// Remove the lecture at the given 1-based position. An out-of-range
    /// position is a validation error: nothing is mutated, nothing is
    /// reconciled.
    #[instrument(skip(self))]
    pub async fn remove_lecture(
        &self,
        chat_id: i64,
        position: usize,
    ) -> Result<Lecture, CommandError> {
        let mut book = self.book.lock().await;

        let Some(chat) = book.get_mut(&chat_id) else {
            return Err(CommandError::NoSuchLecture(position));
        };
        if position == 0 || position > chat.lectures.len() {
            return Err(CommandError::NoSuchLecture(position));
        }

        let removed = chat.lectures.remove(position - 1);
        let lectures = chat.lectures.clone();

        self.persist(&book).await;
        self.reconciler.reconcile_chat(chat_id, &lectures);

        info!(
            chat_id,
            lecture_id = removed.id,
            lecture = %removed.name,
            "Lecture removed"
        );
        Ok(removed)
    }

    /// The chat's lectures sorted by (day, time) for display, each carrying
    /// its stable 1-based position and computed reminder time.
    pub async fn list_schedule(&self, chat_id: i64) -> Vec<ScheduleRow> {
        let book = self.book.lock().await;
        let Some(chat) = book.get(&chat_id) else {
            return Vec::new();
        };

        let mut rows: Vec<ScheduleRow> = chat
            .lectures
            .iter()
            .enumerate()
            .map(|(index, lecture)| ScheduleRow {
                position: index + 1,
                lecture: lecture.clone(),
                reminder_time: reminder_time(lecture.time, self.lead_minutes),
            })
            .collect();
        rows.sort_by_key(|row| (u8::from(row.lecture.day), row.lecture.time));
        rows
    }

    /// Write failures are logged, not surfaced: the in-memory book stays
    /// ahead of disk until the next successful save.
    async fn persist(&self, book: &ScheduleBook) {
        if let Err(e) = self.store.save(book).await {
            error!(error = %e, "Failed to save schedule file; in-memory schedule is ahead of disk");
        }
    }
}
