use std::time::Duration;

use chrono::{Local, NaiveDateTime};
use tokio::{
    sync::watch,
    task::JoinHandle,
    time::{interval, MissedTickBehavior},
};
use tracing::{error, info};

use crate::{
    error::Error,
    handler::dispatcher::{Dispatcher, TickReport},
    push::PushDelivery,
};

/// Owns the periodic notification timer.
///
/// Ticks never overlap: each one finishes or is abandoned before the next
/// starts, and ticks missed while one was running are skipped. Dropping the
/// scheduler without calling [`Scheduler::stop`] also ends the loop.
pub struct Scheduler {
    shutdown: watch::Sender<bool>,
    handle: JoinHandle<()>,
}

impl Scheduler {
    pub fn start<P: PushDelivery>(
        dispatcher: Dispatcher<P>,
        period: Duration,
    ) -> Scheduler {
        Self::start_with_clock(dispatcher, period, || {
            Local::now().naive_local()
        })
    }

    pub fn start_with_clock<P, C>(
        dispatcher: Dispatcher<P>,
        period: Duration,
        clock: C,
    ) -> Scheduler
    where
        P: PushDelivery,
        C: Fn() -> NaiveDateTime + Send + 'static,
    {
        let (shutdown, mut stop) = watch::channel(false);

        let handle = tokio::spawn(async move {
            info!("Notification scheduler started, every {:?}", period);
            let mut ticker = interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                tokio::select! {
                    _ = stop.changed() => break,
                    _ = ticker.tick() => {},
                }

                let now = clock();
                let dispatcher = dispatcher.clone();
                let mut tick =
                    tokio::spawn(async move { dispatcher.run_tick(now).await });

                tokio::select! {
                    _ = stop.changed() => {
                        tick.abort();
                        break;
                    },
                    result = &mut tick => match result {
                        Ok(report) => log_report(now, &report),
                        Err(e) => {
                            error!("Notification tick at {} aborted: {}", now, e)
                        },
                    },
                }
            }

            info!("Notification scheduler stopped");
        });

        Scheduler { shutdown, handle }
    }

    /// Stops the timer. A tick that is still delivering is abandoned.
    pub async fn stop(self) -> Result<(), Error> {
        self.shutdown.send_replace(true);
        self.handle.await?;
        Ok(())
    }
}

fn log_report(now: NaiveDateTime, report: &TickReport) {
    if report.payloads == 0 && report.failed_categories.is_empty() {
        return;
    }

    info!(
        "Tick {}: {} payload(s), {} delivered, {} failed, {} pruned",
        now.format("%Y-%m-%d %H:%M"),
        report.payloads,
        report.delivered,
        report.failed,
        report.pruned
    );
}
