// Domain model for the lecture reminder bot: weekdays, week parity,
// lectures, per-chat schedules and the payload snapshot carried by timers.

use chrono::NaiveTime;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::{BTreeMap, HashSet};

// Helper functions for minute-precision "HH:MM" time serialization
fn serialize_time<S>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&time.format("%H:%M").to_string())
}

fn deserialize_time<'de, D>(deserializer: D) -> Result<NaiveTime, D::Error>
where
    D: Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    NaiveTime::parse_from_str(&s, "%H:%M").map_err(serde::de::Error::custom)
}

/// In-memory view of the whole schedule file: one entry per chat.
pub type ScheduleBook = BTreeMap<i64, ChatSchedule>;

/// Day of week. Persisted as an integer with Sunday = 0 through
/// Saturday = 6, the numbering used by existing schedule files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Weekday {
    Sunday,
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
}

impl Weekday {
    /// Parse a two-letter Russian day code (case-insensitive).
    pub fn from_code(token: &str) -> Option<Self> {
        match token.to_uppercase().as_str() {
            "ВС" => Some(Weekday::Sunday),
            "ПН" => Some(Weekday::Monday),
            "ВТ" => Some(Weekday::Tuesday),
            "СР" => Some(Weekday::Wednesday),
            "ЧТ" => Some(Weekday::Thursday),
            "ПТ" => Some(Weekday::Friday),
            "СБ" => Some(Weekday::Saturday),
            _ => None,
        }
    }

    /// The two-letter Russian code used in commands.
    pub fn code(&self) -> &'static str {
        match self {
            Weekday::Sunday => "ВС",
            Weekday::Monday => "ПН",
            Weekday::Tuesday => "ВТ",
            Weekday::Wednesday => "СР",
            Weekday::Thursday => "ЧТ",
            Weekday::Friday => "ПТ",
            Weekday::Saturday => "СБ",
        }
    }

    /// Full Russian day name for user-facing replies.
    pub fn full_name(&self) -> &'static str {
        match self {
            Weekday::Sunday => "Воскресенье",
            Weekday::Monday => "Понедельник",
            Weekday::Tuesday => "Вторник",
            Weekday::Wednesday => "Среда",
            Weekday::Thursday => "Четверг",
            Weekday::Friday => "Пятница",
            Weekday::Saturday => "Суббота",
        }
    }

    /// Day-of-week token understood by cron expressions.
    pub fn cron_token(&self) -> &'static str {
        match self {
            Weekday::Sunday => "SUN",
            Weekday::Monday => "MON",
            Weekday::Tuesday => "TUE",
            Weekday::Wednesday => "WED",
            Weekday::Thursday => "THU",
            Weekday::Friday => "FRI",
            Weekday::Saturday => "SAT",
        }
    }

    /// Command codes in the order they are listed to users.
    pub fn all_codes() -> [&'static str; 7] {
        ["ПН", "ВТ", "СР", "ЧТ", "ПТ", "СБ", "ВС"]
    }
}

impl From<Weekday> for u8 {
    fn from(day: Weekday) -> Self {
        match day {
            Weekday::Sunday => 0,
            Weekday::Monday => 1,
            Weekday::Tuesday => 2,
            Weekday::Wednesday => 3,
            Weekday::Thursday => 4,
            Weekday::Friday => 5,
            Weekday::Saturday => 6,
        }
    }
}

impl TryFrom<u8> for Weekday {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Weekday::Sunday),
            1 => Ok(Weekday::Monday),
            2 => Ok(Weekday::Tuesday),
            3 => Ok(Weekday::Wednesday),
            4 => Ok(Weekday::Thursday),
            5 => Ok(Weekday::Friday),
            6 => Ok(Weekday::Saturday),
            other => Err(format!("day must be in 0..=6, got {}", other)),
        }
    }
}

/// Which ISO week numbers a lecture applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum WeekParity {
    #[default]
    All,
    Even,
    Odd,
}

impl WeekParity {
    /// Parse a Russian parity token (case-insensitive). ЧЕТ = even weeks,
    /// НЕЧЕТ = odd weeks, ВСЕ = every week.
    pub fn from_token(token: &str) -> Option<Self> {
        match token.to_uppercase().as_str() {
            "ЧЕТ" => Some(WeekParity::Even),
            "НЕЧЕТ" => Some(WeekParity::Odd),
            "ВСЕ" => Some(WeekParity::All),
            _ => None,
        }
    }

    /// Russian label shown next to a lecture, None for every-week lectures.
    pub fn label(&self) -> Option<&'static str> {
        match self {
            WeekParity::All => None,
            WeekParity::Even => Some("чётная"),
            WeekParity::Odd => Some("нечётная"),
        }
    }
}

/// One recurring weekly lecture.
///
/// `id` is a durable per-chat identifier assigned from the chat's counter at
/// creation time. It never changes and is never reused, so the timer named
/// after it survives removals of sibling lectures. Legacy schedule files
/// carry no ids; those entries deserialize with id 0 and are assigned fresh
/// ids by [`ChatSchedule::normalize`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lecture {
    #[serde(default)]
    pub id: u64,
    pub day: Weekday,
    #[serde(serialize_with = "serialize_time", deserialize_with = "deserialize_time")]
    pub time: NaiveTime,
    #[serde(default)]
    pub parity: WeekParity,
    pub name: String,
}

impl Lecture {
    /// Zero-padded "HH:MM" start time.
    pub fn time_label(&self) -> String {
        self.time.format("%H:%M").to_string()
    }
}

/// All lectures of one chat, the unit of persistence and reconciliation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatSchedule {
    pub chat_id: i64,
    #[serde(default)]
    pub next_lecture_id: u64,
    #[serde(default)]
    pub lectures: Vec<Lecture>,
}

impl ChatSchedule {
    pub fn new(chat_id: i64) -> Self {
        Self {
            chat_id,
            next_lecture_id: 1,
            lectures: Vec::new(),
        }
    }

    /// Hand out the next durable lecture id for this chat.
    pub fn allocate_lecture_id(&mut self) -> u64 {
        if self.next_lecture_id == 0 {
            self.next_lecture_id = 1;
        }
        let id = self.next_lecture_id;
        self.next_lecture_id += 1;
        id
    }

    /// Repair ids after loading: entries from legacy files (id 0) and
    /// duplicated ids get fresh ones, and the counter is bumped past the
    /// maximum id seen.
    pub fn normalize(&mut self) {
        let mut seen: HashSet<u64> = HashSet::new();
        let mut max_id: u64 = 0;
        let mut unassigned: Vec<usize> = Vec::new();

        for (index, lecture) in self.lectures.iter().enumerate() {
            if lecture.id == 0 || !seen.insert(lecture.id) {
                unassigned.push(index);
            } else {
                max_id = max_id.max(lecture.id);
            }
        }

        let mut next = max_id + 1;
        for index in unassigned {
            self.lectures[index].id = next;
            next += 1;
        }

        self.next_lecture_id = self.next_lecture_id.max(next);
    }
}

/// Snapshot captured at timer registration and handed back at fire time.
/// Parity rides along because the timer primitive itself has no concept of
/// week parity; the dispatcher re-evaluates it against the fire date.
#[derive(Debug, Clone, PartialEq)]
pub struct ReminderPayload {
    pub chat_id: i64,
    pub name: String,
    pub time: NaiveTime,
    pub parity: WeekParity,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn time(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    #[test]
    fn test_weekday_codes_round_trip() {
        for code in Weekday::all_codes() {
            let day = Weekday::from_code(code).unwrap();
            assert_eq!(day.code(), code);
        }
        assert_eq!(Weekday::from_code("пн"), Some(Weekday::Monday));
        assert_eq!(Weekday::from_code("XX"), None);
    }

    #[test]
    fn test_weekday_numbering_starts_at_sunday() {
        assert_eq!(u8::from(Weekday::Sunday), 0);
        assert_eq!(u8::from(Weekday::Monday), 1);
        assert_eq!(u8::from(Weekday::Saturday), 6);
        assert_eq!(Weekday::try_from(2).unwrap(), Weekday::Tuesday);
        assert!(Weekday::try_from(7).is_err());
    }

    #[test]
    fn test_time_serializes_zero_padded() {
        let lecture = Lecture {
            id: 3,
            day: Weekday::Monday,
            time: time(9, 5),
            parity: WeekParity::All,
            name: "Математика".to_string(),
        };
        let json = serde_json::to_value(&lecture).unwrap();
        assert_eq!(json["time"], "09:05");
        assert_eq!(json["day"], 1);
        assert_eq!(json["parity"], "all");
    }

    #[test]
    fn test_legacy_lecture_without_id_and_parity() {
        let json = r#"{"day": 2, "time": "10:30", "name": "Физика"}"#;
        let lecture: Lecture = serde_json::from_str(json).unwrap();
        assert_eq!(lecture.id, 0);
        assert_eq!(lecture.day, Weekday::Tuesday);
        assert_eq!(lecture.parity, WeekParity::All);
        assert_eq!(lecture.time_label(), "10:30");
    }

    #[test]
    fn test_parity_tokens() {
        assert_eq!(WeekParity::from_token("ЧЕТ"), Some(WeekParity::Even));
        assert_eq!(WeekParity::from_token("нечет"), Some(WeekParity::Odd));
        assert_eq!(WeekParity::from_token("ВСЕ"), Some(WeekParity::All));
        assert_eq!(WeekParity::from_token("Физика"), None);
    }

    #[test]
    fn test_allocate_lecture_id_is_monotonic() {
        let mut chat = ChatSchedule::new(7);
        assert_eq!(chat.allocate_lecture_id(), 1);
        assert_eq!(chat.allocate_lecture_id(), 2);
        assert_eq!(chat.next_lecture_id, 3);
    }

    #[test]
    fn test_normalize_assigns_ids_to_legacy_entries() {
        let mut chat = ChatSchedule {
            chat_id: 7,
            next_lecture_id: 0,
            lectures: vec![
                Lecture {
                    id: 0,
                    day: Weekday::Monday,
                    time: time(9, 0),
                    parity: WeekParity::All,
                    name: "A".to_string(),
                },
                Lecture {
                    id: 0,
                    day: Weekday::Tuesday,
                    time: time(10, 0),
                    parity: WeekParity::All,
                    name: "B".to_string(),
                },
            ],
        };
        chat.normalize();
        let ids: Vec<u64> = chat.lectures.iter().map(|l| l.id).collect();
        assert_eq!(ids, vec![1, 2]);
        assert_eq!(chat.next_lecture_id, 3);
    }

    #[test]
    fn test_normalize_fixes_duplicate_ids_and_bumps_counter() {
        let mut chat = ChatSchedule {
            chat_id: 7,
            next_lecture_id: 1,
            lectures: vec![
                Lecture {
                    id: 5,
                    day: Weekday::Monday,
                    time: time(9, 0),
                    parity: WeekParity::All,
                    name: "A".to_string(),
                },
                Lecture {
                    id: 5,
                    day: Weekday::Tuesday,
                    time: time(10, 0),
                    parity: WeekParity::All,
                    name: "B".to_string(),
                },
            ],
        };
        chat.normalize();
        assert_eq!(chat.lectures[0].id, 5);
        assert_eq!(chat.lectures[1].id, 6);
        assert!(chat.next_lecture_id > 6);
    }
}
