// Parsing of command argument strings. Pure: no state, no replies.

use crate::errors::CommandError;
use crate::models::{WeekParity, Weekday};
use chrono::NaiveTime;

/// Parsed arguments of an add command:
/// `<ДЕНЬ> <ЧЧ:ММ> [ЧЕТ|НЕЧЕТ|ВСЕ] <название…>`.
#[derive(Debug, Clone, PartialEq)]
pub struct AddRequest {
    pub day: Weekday,
    pub time: NaiveTime,
    pub parity: WeekParity,
    pub name: String,
}

/// Parse the argument string of `/add`. The parity token is optional; a
/// third token that is not a recognized parity token belongs to the name.
pub fn parse_add(args: &str) -> Result<AddRequest, CommandError> {
    let mut parts = args.split_whitespace();
    let day_token = parts.next().ok_or(CommandError::MissingAddArguments)?;
    let time_token = parts.next().ok_or(CommandError::MissingAddArguments)?;

    let day = Weekday::from_code(day_token)
        .ok_or_else(|| CommandError::UnknownDay(day_token.to_string()))?;
    let time = parse_time(time_token)?;

    let rest: Vec<&str> = parts.collect();
    let (parity, name_tokens) = match rest.first().and_then(|token| WeekParity::from_token(token)) {
        Some(parity) => (parity, &rest[1..]),
        None => (WeekParity::All, &rest[..]),
    };

    let name = name_tokens.join(" ");
    if name.is_empty() {
        return Err(CommandError::MissingName);
    }

    Ok(AddRequest {
        day,
        time,
        parity,
        name,
    })
}

/// Parse the argument string of `/remove`: exactly one positive integer,
/// the 1-based position from the schedule listing.
pub fn parse_remove(args: &str) -> Result<usize, CommandError> {
    let mut parts = args.split_whitespace();
    let token = parts.next().ok_or(CommandError::MissingRemoveArguments)?;
    if parts.next().is_some() {
        return Err(CommandError::MissingRemoveArguments);
    }

    let position: usize = token
        .parse()
        .map_err(|_| CommandError::InvalidIndex(token.to_string()))?;
    if position == 0 {
        return Err(CommandError::InvalidIndex(token.to_string()));
    }
    Ok(position)
}

/// Strict minute-precision "HH:MM" within 00:00–23:59.
fn parse_time(token: &str) -> Result<NaiveTime, CommandError> {
    let invalid = || CommandError::InvalidTime(token.to_string());

    let (hour_part, minute_part) = token.split_once(':').ok_or_else(invalid)?;
    let hour: u32 = hour_part.parse().map_err(|_| invalid())?;
    let minute: u32 = minute_part.parse().map_err(|_| invalid())?;
    NaiveTime::from_hms_opt(hour, minute, 0).ok_or_else(invalid)
}
