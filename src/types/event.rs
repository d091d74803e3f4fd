use chrono::{Datelike, Duration, NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::{error::Error, model::NewEvent};

pub const DATE_FORMAT: &str = "%Y-%m-%d";
pub const TIME_FORMAT: &str = "%H:%M";

#[derive(Debug, Deserialize)]
pub struct EventRequest {
    pub date: String,
    pub title: String,
    pub user: String,
    #[serde(default)]
    pub time: Option<String>,
}

impl EventRequest {
    /// Validates the request and normalizes `date`/`time` to their stored
    /// text form. A blank `time` means an all-day event.
    pub fn into_new_event(self) -> Result<NewEvent, Error> {
        let date = NaiveDate::parse_from_str(self.date.trim(), DATE_FORMAT)
            .map_err(|_| {
                Error::InvalidInput(format!("date '{}'", self.date))
            })?;

        let time = match self.time.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(value) => {
                let time = NaiveTime::parse_from_str(value, TIME_FORMAT)
                    .map_err(|_| {
                        Error::InvalidInput(format!("time '{}'", value))
                    })?;
                Some(time.format(TIME_FORMAT).to_string())
            },
        };

        let title = self.title.trim();
        if title.is_empty() {
            return Err(Error::InvalidInput(String::from("title is empty")));
        }

        let user = self.user.trim();
        if user.is_empty() {
            return Err(Error::InvalidInput(String::from("user is empty")));
        }

        Ok(NewEvent {
            date: date.format(DATE_FORMAT).to_string(),
            title: title.to_owned(),
            user: user.to_owned(),
            time,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct MonthQuery {
    pub year: i32,
    pub month: u32,
}

impl MonthQuery {
    /// First and last day of the month, inclusive.
    pub fn range(&self) -> Result<(NaiveDate, NaiveDate), Error> {
        let first = NaiveDate::from_ymd_opt(self.year, self.month, 1)
            .ok_or_else(|| {
                Error::InvalidInput(format!(
                    "year {} month {}",
                    self.year, self.month
                ))
            })?;

        let next = if first.month() == 12 {
            NaiveDate::from_ymd_opt(first.year() + 1, 1, 1)
        } else {
            NaiveDate::from_ymd_opt(first.year(), first.month() + 1, 1)
        }
        .ok_or_else(|| {
            Error::InvalidInput(format!("year {} out of range", self.year))
        })?;

        Ok((first, next - Duration::days(1)))
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CreatedResponse {
    pub id: i64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DeletedResponse {
    pub deleted: u64,
}
