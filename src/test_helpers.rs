use std::{collections::HashSet, str::FromStr, sync::Mutex, time::Duration};

use sqlx::sqlite::SqliteConnectOptions;

use crate::{
    configuration::{AppState, Config, State},
    dao::PoolOption,
    error::Error,
    migration::run_migrations,
    model::Subscription,
    provider::DatabasePool,
    push::PushDelivery,
    types::PushPayload,
};

/// Fresh in-memory database with every migration applied. The pool keeps a
/// single connection alive for its whole lifetime.
pub async fn database() -> DatabasePool {
    let options = SqliteConnectOptions::from_str("sqlite::memory:").unwrap();
    let pool = PoolOption::new()
        .max_connections(1)
        .min_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect_with(options)
        .await
        .unwrap();

    run_migrations(&pool).await.unwrap();

    DatabasePool::from_pool(pool)
}

pub fn config() -> Config {
    Config {
        server_host: String::from("127.0.0.1"),
        port: 3000,
        database_url: String::from("sqlite::memory:"),
        max_connections: 1,
        static_dir: None,
        allowed_origins: vec![String::from("*")],
        tick_interval: 60,
        push_timeout: 5,
        push_ttl: 86_400,
        max_push_tasks: 4,
        status_code_to_delete: vec![404, 410],
        mail_to: String::from("ops@example.com"),
        vapid_private_key: vec![],
        vapid_public_key: String::from("BFRmwol9jmURPv9P2Ls9L8wTkTwk32WgNJxy3vzAC6n1"),
        notification_icon: String::from("/icons/icon-192x192.png"),
        reminder_dedup: false,
    }
}

pub async fn app_state() -> AppState<State> {
    AppState::new(State::new(config(), database().await))
}

/// Fake push service that records every attempt and fails on request.
#[derive(Default)]
pub struct RecordingPush {
    sent: Mutex<Vec<(String, PushPayload)>>,
    gone: HashSet<String>,
    failing: HashSet<String>,
    stalled: HashSet<String>,
    panicking: bool,
}

impl RecordingPush {
    pub fn gone(mut self, endpoint: &str) -> RecordingPush {
        self.gone.insert(endpoint.to_owned());
        self
    }

    pub fn failing(mut self, endpoint: &str) -> RecordingPush {
        self.failing.insert(endpoint.to_owned());
        self
    }

    pub fn stalled(mut self, endpoint: &str) -> RecordingPush {
        self.stalled.insert(endpoint.to_owned());
        self
    }

    pub fn panicking(mut self) -> RecordingPush {
        self.panicking = true;
        self
    }

    pub fn sent(&self) -> Vec<(String, PushPayload)> {
        self.sent.lock().unwrap().clone()
    }
}

impl PushDelivery for RecordingPush {
    async fn deliver(
        &self,
        subscription: &Subscription,
        payload: &PushPayload,
    ) -> Result<(), Error> {
        self.sent
            .lock()
            .unwrap()
            .push((subscription.endpoint.to_owned(), payload.clone()));

        if self.panicking {
            panic!("push service exploded");
        }

        if self.stalled.contains(&subscription.endpoint) {
            tokio::time::sleep(Duration::from_secs(60)).await;
        }

        if self.gone.contains(&subscription.endpoint) {
            return Err(Error::SubscriptionGone {
                endpoint: subscription.endpoint.to_owned(),
                status: 410,
            });
        }

        if self.failing.contains(&subscription.endpoint) {
            return Err(Error::PushRejected { status: 503 });
        }

        Ok(())
    }
}
