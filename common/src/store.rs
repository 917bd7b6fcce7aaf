// Durable schedule storage: one JSON file holding every chat's lectures.
//
// The on-disk layout is an array of per-chat records so existing schedule
// files keep loading unchanged; in memory the records are keyed by chat id.
// Writes go through a temp file in the same directory followed by a rename,
// so a crash mid-write leaves the previous file intact.

use crate::errors::StoreError;
use crate::models::{ChatSchedule, ScheduleBook};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

pub struct ScheduleStore {
    path: PathBuf,
}

impl ScheduleStore {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the full schedule book. A missing file is an empty book; an
    /// unreadable or malformed file is a typed error the caller may degrade
    /// to an empty book. Lecture ids are normalized on the way in.
    pub async fn load(&self) -> Result<ScheduleBook, StoreError> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                info!(path = %self.path.display(), "Schedule file not found, starting empty");
                return Ok(ScheduleBook::new());
            }
            Err(e) => {
                return Err(StoreError::ReadFailed {
                    path: self.path.display().to_string(),
                    source: e,
                })
            }
        };

        let records: Vec<ChatSchedule> =
            serde_json::from_slice(&bytes).map_err(|e| StoreError::ParseFailed {
                path: self.path.display().to_string(),
                source: e,
            })?;

        let mut book = ScheduleBook::new();
        for mut record in records {
            record.normalize();
            book.insert(record.chat_id, record);
        }

        debug!(chats = book.len(), "Schedule file loaded");
        Ok(book)
    }

    /// Persist the full schedule book atomically (write temp, then rename).
    pub async fn save(&self, book: &ScheduleBook) -> Result<(), StoreError> {
        let records: Vec<&ChatSchedule> = book.values().collect();
        let bytes = serde_json::to_vec_pretty(&records).map_err(StoreError::EncodeFailed)?;

        let tmp_path = self.path.with_extension("tmp");
        tokio::fs::write(&tmp_path, &bytes)
            .await
            .map_err(|e| StoreError::WriteFailed {
                path: tmp_path.display().to_string(),
                source: e,
            })?;
        tokio::fs::rename(&tmp_path, &self.path)
            .await
            .map_err(|e| StoreError::WriteFailed {
                path: self.path.display().to_string(),
                source: e,
            })?;

        debug!(path = %self.path.display(), chats = book.len(), "Schedule file saved");
        Ok(())
    }
}

/// Find or create the schedule entry for a chat. Pure in-memory operation
/// on a loaded book; callers persist explicitly after mutating.
pub fn get_or_create(book: &mut ScheduleBook, chat_id: i64) -> &mut ChatSchedule {
    book.entry(chat_id)
        .or_insert_with(|| ChatSchedule::new(chat_id))
}
