// User-facing reply texts (Russian, Telegram HTML).

use crate::errors::CommandError;
use crate::models::{Lecture, WeekParity, Weekday};
use crate::service::ScheduleRow;
use chrono::NaiveTime;

fn hhmm(time: NaiveTime) -> String {
    time.format("%H:%M").to_string()
}

pub fn start_text(lead_minutes: u32) -> String {
    format!(
        "👋 Привет! Я бот-напоминалка о лекциях.\n\n\
         Добавь лекцию командой:\n\
         <code>/add ПН 09:00 [ЧЕТ/НЕЧЕТ] Название лекции</code>\n\n\
         Я напомню за {} минут до начала! 🔔\n\
         Используй /help для списка команд.",
        lead_minutes
    )
}

pub fn help_text(lead_minutes: u32, timezone: &str) -> String {
    format!(
        "📖 <b>Команды бота:</b>\n\n\
         <code>/add ДЕНЬ ЧЧ:ММ [ЧЕТ/НЕЧЕТ/ВСЕ] Название</code>\n\
           — Добавить лекцию (параметр недели не обязателен)\n\
           Дни: {}\n\n\
         <code>/remove НОМЕР</code>\n\
           — Удалить лекцию по номеру из /schedule\n\n\
         <code>/schedule</code>\n\
           — Показать расписание\n\n\
         <code>/help</code>\n\
           — Эта справка\n\n\
         ⏰ Напоминания приходят за <b>{} минут</b> до лекции.\n\
         🌍 Часовой пояс: <b>{}</b>",
        Weekday::all_codes().join(", "),
        lead_minutes,
        timezone
    )
}

pub fn added_text(lecture: &Lecture, reminder: NaiveTime) -> String {
    let parity_note = match lecture.parity {
        WeekParity::All => "",
        WeekParity::Even => " (Чётная неделя)",
        WeekParity::Odd => " (Нечётная неделя)",
    };
    format!(
        "✅ Лекция добавлена!\n\n\
         📚 <b>{}</b>{}\n\
         📅 {}\n\
         🕐 {}\n\
         🔔 Напоминание в {}",
        lecture.name,
        parity_note,
        lecture.day.full_name(),
        lecture.time_label(),
        hhmm(reminder)
    )
}

pub fn removed_text(lecture: &Lecture) -> String {
    let parity_note = match lecture.parity.label() {
        Some(label) => format!(" [{}]", label),
        None => String::new(),
    };
    format!(
        "🗑️ Лекция удалена: <b>{}</b>{} ({} {})",
        lecture.name,
        parity_note,
        lecture.day.full_name(),
        lecture.time_label()
    )
}

pub fn schedule_text(rows: &[ScheduleRow], timezone: &str) -> String {
    if rows.is_empty() {
        return "📭 Расписание пусто.\n\
                Добавь лекцию: <code>/add ПН 09:00 Математика</code>"
            .to_string();
    }

    let mut lines = vec!["📅 <b>Расписание лекций:</b>\n".to_string()];
    let mut current_day: Option<Weekday> = None;
    for row in rows {
        if current_day != Some(row.lecture.day) {
            current_day = Some(row.lecture.day);
            lines.push(format!("\n<b>{}:</b>", row.lecture.day.full_name()));
        }
        let parity_note = match row.lecture.parity.label() {
            Some(label) => format!(" <i>[{}]</i>", label),
            None => String::new(),
        };
        lines.push(format!(
            "  {}. 🕐 {}{} — {}  <i>(🔔 {})</i>",
            row.position,
            row.lecture.time_label(),
            parity_note,
            row.lecture.name,
            hhmm(row.reminder_time)
        ));
    }
    lines.push(format!("\n🌍 Часовой пояс: {}", timezone));
    lines.join("\n")
}

pub fn reminder_text(name: &str, start: NaiveTime, lead_minutes: u32) -> String {
    format!(
        "⏰ <b>Напоминание!</b>\n\n\
         Через {} минут начнётся лекция:\n\
         📚 <b>{}</b>\n\
         🕐 Начало в {}",
        lead_minutes,
        name,
        hhmm(start)
    )
}

/// Corrective message for a rejected command. One specific text per
/// validation failure; none of these imply any state change.
pub fn error_text(error: &CommandError) -> String {
    match error {
        CommandError::MissingAddArguments => "❌ Формат: <code>/add ДЕНЬ ЧЧ:ММ [ЧЕТ/НЕЧЕТ] Название</code>\n\
             Примеры:\n\
             <code>/add ПН 09:00 Математика</code>\n\
             <code>/add ВТ 10:30 ЧЕТ Физика</code>"
            .to_string(),
        CommandError::UnknownDay(token) => format!(
            "❌ Неизвестный день: <b>{}</b>\nДопустимые: {}",
            token,
            Weekday::all_codes().join(", ")
        ),
        CommandError::InvalidTime(_) => {
            "❌ Неверный формат времени. Используйте <code>ЧЧ:ММ</code>, например <code>09:00</code>"
                .to_string()
        }
        CommandError::MissingName => "❌ Укажите название лекции.".to_string(),
        CommandError::MissingRemoveArguments => {
            "❌ Формат: <code>/remove НОМЕР</code>\nПосмотри номера через /schedule".to_string()
        }
        CommandError::InvalidIndex(_) => "❌ Номер должен быть положительным числом.".to_string(),
        CommandError::NoSuchLecture(position) => format!(
            "❌ Лекции с номером <b>{}</b> нет.\nПроверь /schedule",
            position
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn time(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn lecture() -> Lecture {
        Lecture {
            id: 1,
            day: Weekday::Monday,
            time: time(9, 0),
            parity: WeekParity::All,
            name: "Математика".to_string(),
        }
    }

    #[test]
    fn test_added_text_names_the_reminder_time() {
        let text = added_text(&lecture(), time(8, 45));
        assert!(text.contains("Математика"));
        assert!(text.contains("Понедельник"));
        assert!(text.contains("09:00"));
        assert!(text.contains("08:45"));
    }

    #[test]
    fn test_schedule_text_lists_position_time_name_and_reminder() {
        let rows = vec![ScheduleRow {
            position: 1,
            lecture: lecture(),
            reminder_time: time(8, 45),
        }];
        let text = schedule_text(&rows, "Asia/Irkutsk");
        assert!(text.contains("1. 🕐 09:00"));
        assert!(text.contains("Математика"));
        assert!(text.contains("🔔 08:45"));
        assert!(text.contains("Asia/Irkutsk"));
    }

    #[test]
    fn test_empty_schedule_gets_a_distinct_reply() {
        let text = schedule_text(&[], "Asia/Irkutsk");
        assert!(text.contains("Расписание пусто"));
    }

    #[test]
    fn test_parity_label_is_shown() {
        let mut even = lecture();
        even.parity = WeekParity::Even;
        let rows = vec![ScheduleRow {
            position: 1,
            lecture: even.clone(),
            reminder_time: time(8, 45),
        }];
        assert!(schedule_text(&rows, "Asia/Irkutsk").contains("[чётная]"));
        assert!(removed_text(&even).contains("[чётная]"));
    }

    #[test]
    fn test_error_text_names_the_bad_input() {
        assert!(error_text(&CommandError::UnknownDay("XX".to_string())).contains("XX"));
        assert!(error_text(&CommandError::NoSuchLecture(5)).contains('5'));
    }

    #[test]
    fn test_reminder_text_mentions_name_and_start() {
        let text = reminder_text("Физика", time(10, 30), 15);
        assert!(text.contains("Физика"));
        assert!(text.contains("10:30"));
        assert!(text.contains("15 минут"));
    }
}
