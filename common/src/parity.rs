// Week parity evaluation against ISO-8601 week numbers.
//
// ISO-8601 places week 1 on the week containing the year's first Thursday,
// which is what decides behavior at year boundaries (a late-December date
// can already belong to week 1 of the next ISO year, and an early-January
// date to week 52/53 of the previous one).

use crate::models::WeekParity;
use chrono::{Datelike, NaiveDate};

impl WeekParity {
    /// Whether a lecture with this parity occurs on the given date.
    pub fn matches_date(self, date: NaiveDate) -> bool {
        match self {
            WeekParity::All => true,
            WeekParity::Even => date.iso_week().week() % 2 == 0,
            WeekParity::Odd => date.iso_week().week() % 2 == 1,
        }
    }
}
