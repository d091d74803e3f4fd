use actix_web::{post, web, HttpResponse, Result};
use serde::{Deserialize, Serialize};
use tracing::info;
use url::Url;

use crate::{
    configuration::{AppState, State},
    dao::is_unique_violation,
    error::Error,
    types::SubscriptionRequest,
};

#[post("/subscribe")]
pub async fn post_index(
    state: web::Data<AppState<State>>,
    subscription: web::Json<SubscriptionRequest>,
) -> Result<HttpResponse, Error> {
    let endpoint = subscription.endpoint.trim();
    Url::parse(endpoint)
        .map_err(|_| Error::InvalidInput(format!("endpoint '{}'", endpoint)))?;

    let p256dh = subscription.keys.p256dh.trim();
    let auth = subscription.keys.auth.trim();
    if p256dh.is_empty() || auth.is_empty() {
        return Err(Error::InvalidInput(String::from(
            "subscription keys are empty",
        )));
    }

    match state.database.subscription.insert(endpoint, p256dh, auth).await {
        Ok(_) => {},
        Err(e) if is_unique_violation(&e) => {
            return Err(Error::DuplicateSubscription(endpoint.to_owned()));
        },
        Err(e) => return Err(e.into()),
    }

    info!("Subscription added for {}", endpoint);

    Ok(HttpResponse::Created().json(Response {
        message: String::from("Subscription added."),
    }))
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Response {
    pub message: String,
}
