//! Due-ness rules and payload text for the three notification categories.
//!
//! Everything here is pure: it only looks at the tick instant and rows that
//! were already fetched.

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime, Timelike};

use crate::{
    model::Event,
    types::{PushPayload, TIME_FORMAT},
};

pub const REMINDER_LEAD_MINUTES: i64 = 15;
pub const LOOK_AHEAD_DAYS: i64 = 7;

pub const DAILY_DIGEST_TITLE: &str = "Today's events";
pub const WEEKLY_LOOK_AHEAD_TITLE: &str = "Upcoming events (within 7 days)";

pub fn is_daily_digest_due(now: NaiveDateTime) -> bool {
    now.hour() == 0 && now.minute() == 0
}

pub fn is_weekly_look_ahead_due(now: NaiveDateTime) -> bool {
    now.hour() == 23 && now.minute() == 59
}

pub fn parse_event_time(value: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(value.trim(), TIME_FORMAT).ok()
}

/// Half-open window `[start, end)` in which a reminder for an event at
/// `date` + `time` is due.
pub fn reminder_window(
    date: NaiveDate,
    time: NaiveTime,
) -> (NaiveDateTime, NaiveDateTime) {
    let end = date.and_time(time);
    (end - Duration::minutes(REMINDER_LEAD_MINUTES), end)
}

pub fn is_reminder_due(now: NaiveDateTime, time: NaiveTime) -> bool {
    let (start, end) = reminder_window(now.date(), time);
    start <= now && now < end
}

/// `(after, until)` bounds for the look-ahead query: strictly after today,
/// up to and including today + 7 days.
pub fn look_ahead_range(today: NaiveDate) -> (NaiveDate, NaiveDate) {
    (today, today + Duration::days(LOOK_AHEAD_DAYS))
}

pub fn daily_digest_payload(
    events: &[Event],
    icon: &str,
) -> Option<PushPayload> {
    if events.is_empty() {
        return None;
    }

    let body = events
        .iter()
        .map(|e| format!("{} ({})", e.title, e.user))
        .collect::<Vec<String>>()
        .join(", ");

    Some(PushPayload {
        title: String::from(DAILY_DIGEST_TITLE),
        body,
        icon: icon.to_owned(),
    })
}

pub fn reminder_payload(
    event: &Event,
    time: NaiveTime,
    icon: &str,
) -> PushPayload {
    PushPayload {
        title: format!("Starting soon: {}", event.title),
        body: format!(
            "{} {} ({})",
            time.format(TIME_FORMAT),
            event.title,
            event.user
        ),
        icon: icon.to_owned(),
    }
}

pub fn weekly_look_ahead_payload(
    events: &[Event],
    icon: &str,
) -> Option<PushPayload> {
    if events.is_empty() {
        return None;
    }

    let body = events
        .iter()
        .map(|e| match &e.time {
            Some(time) => {
                format!("{} {}: {} ({})", e.date, time, e.title, e.user)
            },
            None => format!("{}: {} ({})", e.date, e.title, e.user),
        })
        .collect::<Vec<String>>()
        .join(", ");

    Some(PushPayload {
        title: String::from(WEEKLY_LOOK_AHEAD_TITLE),
        body,
        icon: icon.to_owned(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const ICON: &str = "/icons/icon-192x192.png";

    fn at(hour: u32, minute: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 10, 15)
            .unwrap()
            .and_hms_opt(hour, minute, 0)
            .unwrap()
    }

    fn event(date: &str, title: &str, user: &str, time: Option<&str>) -> Event {
        Event {
            id: 1,
            date: date.to_owned(),
            title: title.to_owned(),
            user: user.to_owned(),
            time: time.map(str::to_owned),
        }
    }

    #[test]
    fn reminder_window_is_half_open() {
        let two_pm = NaiveTime::from_hms_opt(14, 0, 0).unwrap();

        assert!(is_reminder_due(at(13, 50), two_pm));
        assert!(is_reminder_due(at(13, 45), two_pm));
        assert!(is_reminder_due(at(13, 59), two_pm));
        assert!(!is_reminder_due(at(13, 44), two_pm));
        assert!(!is_reminder_due(at(14, 0), two_pm));
        assert!(!is_reminder_due(at(14, 5), two_pm));
    }

    #[test]
    fn reminder_window_counts_seconds() {
        let two_pm = NaiveTime::from_hms_opt(14, 0, 0).unwrap();
        let just_before = at(13, 44) + Duration::seconds(59);
        let last_second = at(13, 59) + Duration::seconds(59);

        assert!(!is_reminder_due(just_before, two_pm));
        assert!(is_reminder_due(last_second, two_pm));
    }

    #[test]
    fn early_morning_window_does_not_wrap_into_today() {
        let ten_past = NaiveTime::from_hms_opt(0, 10, 0).unwrap();

        assert!(is_reminder_due(at(0, 0), ten_past));
        assert!(!is_reminder_due(at(23, 58), ten_past));
    }

    #[test]
    fn digest_due_only_at_midnight() {
        assert!(is_daily_digest_due(at(0, 0)));
        assert!(is_daily_digest_due(at(0, 0) + Duration::seconds(42)));
        assert!(!is_daily_digest_due(at(0, 1)));
        assert!(!is_daily_digest_due(at(12, 0)));
    }

    #[test]
    fn look_ahead_due_only_at_end_of_day() {
        assert!(is_weekly_look_ahead_due(at(23, 59)));
        assert!(!is_weekly_look_ahead_due(at(23, 58)));
        assert!(!is_weekly_look_ahead_due(at(0, 0)));
    }

    #[test]
    fn look_ahead_range_spans_seven_days() {
        let today = NaiveDate::from_ymd_opt(2026, 12, 28).unwrap();
        let (after, until) = look_ahead_range(today);

        assert_eq!(after, today);
        assert_eq!(until, NaiveDate::from_ymd_opt(2027, 1, 4).unwrap());
    }

    #[test]
    fn digest_lists_every_event() {
        let events = vec![
            event("2026-10-15", "Dentist", "kei", Some("09:00")),
            event("2026-10-15", "Groceries", "mio", None),
        ];
        let payload = daily_digest_payload(&events, ICON).unwrap();

        assert_eq!(payload.title, DAILY_DIGEST_TITLE);
        assert_eq!(payload.body, "Dentist (kei), Groceries (mio)");
        assert_eq!(payload.icon, ICON);
    }

    #[test]
    fn empty_digest_is_skipped() {
        assert!(daily_digest_payload(&[], ICON).is_none());
        assert!(weekly_look_ahead_payload(&[], ICON).is_none());
    }

    #[test]
    fn look_ahead_shows_time_only_when_set() {
        let events = vec![
            event("2026-10-16", "Standup", "kei", Some("09:30")),
            event("2026-10-18", "Picnic", "mio", None),
        ];
        let payload = weekly_look_ahead_payload(&events, ICON).unwrap();

        assert_eq!(payload.title, WEEKLY_LOOK_AHEAD_TITLE);
        assert_eq!(
            payload.body,
            "2026-10-16 09:30: Standup (kei), 2026-10-18: Picnic (mio)"
        );
    }

    #[test]
    fn reminder_names_time_title_and_user() {
        let standup = event("2026-10-15", "Standup", "kei", Some("09:30"));
        let time = parse_event_time("09:30").unwrap();
        let payload = reminder_payload(&standup, time, ICON);

        assert_eq!(payload.title, "Starting soon: Standup");
        assert_eq!(payload.body, "09:30 Standup (kei)");
    }

    #[test]
    fn unparsable_time_is_none() {
        assert!(parse_event_time("lunch").is_none());
        assert!(parse_event_time("24:00").is_none());
    }
}
