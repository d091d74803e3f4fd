use std::{collections::HashSet, sync::Arc, time::Duration};

use chrono::{NaiveDate, NaiveDateTime};
use futures::stream::{self, StreamExt};
use tokio::time::timeout;
use tracing::{debug, error, info, warn};

use crate::{
    configuration::Config,
    error::Error,
    handler::notification::{
        daily_digest_payload, is_daily_digest_due, is_reminder_due,
        is_weekly_look_ahead_due, look_ahead_range, parse_event_time,
        reminder_payload, weekly_look_ahead_payload,
    },
    model::{
        Event, NotificationCategory, Notification_Log, Subscription, Table,
    },
    provider::DatabasePool,
    push::PushDelivery,
    types::{PushPayload, DATE_FORMAT},
};

#[derive(Debug, Clone)]
pub struct DispatchSettings {
    pub icon: String,
    /// Upper bound for a single delivery attempt.
    pub delivery_timeout: Duration,
    /// Deliveries in flight at once for one payload.
    pub concurrency: usize,
    pub reminder_dedup: bool,
}

impl DispatchSettings {
    pub fn from_config(config: &Config) -> DispatchSettings {
        DispatchSettings {
            icon: config.notification_icon.to_owned(),
            delivery_timeout: Duration::from_secs(config.push_timeout + 5),
            concurrency: config.max_push_tasks,
            reminder_dedup: config.reminder_dedup,
        }
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct TickReport {
    pub payloads: usize,
    pub delivered: usize,
    pub failed: usize,
    pub pruned: usize,
    pub failed_categories: Vec<NotificationCategory>,
    pub subscriptions_unavailable: bool,
}

/// One payload of a tick. Reminders sent with de-duplication carry their
/// event so the marker is written once someone received them.
struct Outgoing {
    payload: PushPayload,
    reminder_for: Option<i64>,
}

impl From<PushPayload> for Outgoing {
    fn from(payload: PushPayload) -> Outgoing {
        Outgoing {
            payload,
            reminder_for: None,
        }
    }
}

/// Decides which notifications are due at a given instant and fans them out
/// to every stored subscription.
pub struct Dispatcher<P> {
    events: Table<Event>,
    subscriptions: Table<Subscription>,
    notification_log: Table<Notification_Log>,
    push: Arc<P>,
    settings: Arc<DispatchSettings>,
}

impl<P> Clone for Dispatcher<P> {
    fn clone(&self) -> Dispatcher<P> {
        Dispatcher {
            events: self.events.clone(),
            subscriptions: self.subscriptions.clone(),
            notification_log: self.notification_log.clone(),
            push: Arc::clone(&self.push),
            settings: Arc::clone(&self.settings),
        }
    }
}

impl<P: PushDelivery> Dispatcher<P> {
    pub fn new(
        database: &DatabasePool,
        push: Arc<P>,
        settings: DispatchSettings,
    ) -> Dispatcher<P> {
        Dispatcher {
            events: database.events.clone(),
            subscriptions: database.subscription.clone(),
            notification_log: database.notification_log.clone(),
            push,
            settings: Arc::new(DispatchSettings {
                concurrency: settings.concurrency.max(1),
                ..settings
            }),
        }
    }

    /// One due-check-and-deliver cycle at the wall-clock instant `now`.
    ///
    /// Never fails: a failed read abandons only the category that needed it,
    /// a failed delivery only affects its own subscription.
    pub async fn run_tick(&self, now: NaiveDateTime) -> TickReport {
        let mut report = TickReport::default();

        let (digest, reminders, look_ahead) = tokio::join!(
            self.daily_digest(now),
            self.reminders(now),
            self.weekly_look_ahead(now),
        );

        let mut payloads = vec![];
        for (category, result) in [
            (NotificationCategory::DailyDigest, digest),
            (NotificationCategory::Reminder, reminders),
            (NotificationCategory::WeeklyLookAhead, look_ahead),
        ] {
            match result {
                Ok(items) => payloads.extend(items),
                Err(e) => {
                    error!("Skipping {} at {}: {}", category, now, e);
                    report.failed_categories.push(category);
                },
            }
        }

        if payloads.is_empty() {
            return report;
        }

        let subscriptions = match self.subscriptions.get_all().await {
            Ok(items) => items,
            Err(e) => {
                error!("Error fetching subscriptions: {}", e);
                report.subscriptions_unavailable = true;
                return report;
            },
        };

        report.payloads = payloads.len();
        let today = format_date(now.date());
        let mut gone = HashSet::new();

        for outgoing in &payloads {
            let delivered = self
                .deliver_all(
                    &subscriptions,
                    &outgoing.payload,
                    &mut gone,
                    &mut report,
                )
                .await;

            match outgoing.reminder_for {
                Some(event_id) if delivered > 0 => {
                    self.mark_reminded(event_id, &today).await
                },
                _ => {},
            }
        }

        report
    }

    async fn daily_digest(
        &self,
        now: NaiveDateTime,
    ) -> Result<Vec<Outgoing>, Error> {
        if !is_daily_digest_due(now) {
            return Ok(vec![]);
        }

        let today = format_date(now.date());
        let events = self.events.get_by_date(&today).await?;

        Ok(daily_digest_payload(&events, &self.settings.icon)
            .into_iter()
            .map(Outgoing::from)
            .collect())
    }

    async fn reminders(
        &self,
        now: NaiveDateTime,
    ) -> Result<Vec<Outgoing>, Error> {
        let today = format_date(now.date());
        let events = self.events.get_timed_by_date(&today).await?;

        if self.settings.reminder_dedup && is_daily_digest_due(now) {
            match self.notification_log.delete_before(&today).await {
                Ok(count) if count > 0 => {
                    debug!("Removed {} stale reminder markers", count)
                },
                Ok(_) => {},
                Err(e) => warn!("Error removing reminder markers: {}", e),
            }
        }

        let mut payloads = vec![];
        for event in events {
            let Some(time) = event.time.as_deref().and_then(parse_event_time)
            else {
                warn!(
                    "Event {} has unreadable time {:?}, skipping reminder",
                    event.id, event.time
                );
                continue;
            };

            if !is_reminder_due(now, time) {
                continue;
            }

            let payload = reminder_payload(&event, time, &self.settings.icon);

            if !self.settings.reminder_dedup {
                payloads.push(Outgoing::from(payload));
                continue;
            }

            if self.already_reminded(&event, &today).await {
                continue;
            }

            payloads.push(Outgoing {
                payload,
                reminder_for: Some(event.id),
            });
        }

        Ok(payloads)
    }

    /// With de-duplication on, a reminder is skipped once it reached at least
    /// one subscriber today. If the marker cannot be read it is sent again.
    async fn already_reminded(&self, event: &Event, today: &str) -> bool {
        match self
            .notification_log
            .is_sent(event.id, NotificationCategory::Reminder, today)
            .await
        {
            Ok(sent) => sent,
            Err(e) => {
                warn!("Error reading reminder marker for {}: {}", event.id, e);
                false
            },
        }
    }

    async fn mark_reminded(&self, event_id: i64, today: &str) {
        if let Err(e) = self
            .notification_log
            .mark_sent(event_id, NotificationCategory::Reminder, today)
            .await
        {
            warn!("Error writing reminder marker for {}: {}", event_id, e);
        }
    }

    async fn weekly_look_ahead(
        &self,
        now: NaiveDateTime,
    ) -> Result<Vec<Outgoing>, Error> {
        if !is_weekly_look_ahead_due(now) {
            return Ok(vec![]);
        }

        let (after, until) = look_ahead_range(now.date());
        let events = self
            .events
            .get_upcoming(&format_date(after), &format_date(until))
            .await?;

        Ok(weekly_look_ahead_payload(&events, &self.settings.icon)
            .into_iter()
            .map(Outgoing::from)
            .collect())
    }

    async fn deliver_all(
        &self,
        subscriptions: &[Subscription],
        payload: &PushPayload,
        gone: &mut HashSet<String>,
        report: &mut TickReport,
    ) -> usize {
        let deliveries = subscriptions
            .iter()
            .filter(|s| !gone.contains(&s.endpoint))
            .map(|subscription| self.deliver_one(subscription, payload))
            .collect::<Vec<_>>();

        let results = stream::iter(deliveries)
            .buffer_unordered(self.settings.concurrency)
            .collect::<Vec<_>>()
            .await;

        let mut delivered = 0;
        for (subscription, result) in results {
            match result {
                Ok(()) => {
                    delivered += 1;
                    report.delivered += 1;
                    debug!("Notification sent to {}", subscription.endpoint);
                },
                Err(e) if e.is_gone() => {
                    report.failed += 1;
                    gone.insert(subscription.endpoint.to_owned());
                    if self.prune(subscription).await {
                        report.pruned += 1;
                    }
                },
                Err(e) => {
                    report.failed += 1;
                    error!(
                        "Error sending notification to {}: {}",
                        subscription.endpoint, e
                    );
                },
            }
        }

        delivered
    }

    async fn deliver_one<'a>(
        &self,
        subscription: &'a Subscription,
        payload: &PushPayload,
    ) -> (&'a Subscription, Result<(), Error>) {
        let result = timeout(
            self.settings.delivery_timeout,
            self.push.deliver(subscription, payload),
        )
        .await
        .unwrap_or_else(|e| Err(Error::from(e)));

        (subscription, result)
    }

    async fn prune(&self, subscription: &Subscription) -> bool {
        match self
            .subscriptions
            .delete_by_endpoint(&subscription.endpoint)
            .await
        {
            Ok(count) => {
                info!("Expired subscription deleted: {}", subscription.endpoint);
                count > 0
            },
            Err(e) => {
                error!(
                    "Error deleting expired subscription {}: {}",
                    subscription.endpoint, e
                );
                false
            },
        }
    }
}

fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}
