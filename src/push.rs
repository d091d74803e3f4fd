use std::future::Future;

use base64::{engine::general_purpose::URL_SAFE_NO_PAD as BASE64_URL, Engine};
use chrono::Utc;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use url::Url;

use crate::{
    configuration::Config,
    error::Error,
    model::Subscription,
    provider::HTTP,
    types::{Claims, PushHeader, PushPayload, Urgency},
};

/// Push services reject VAPID tokens valid for more than 24 hours.
const MAX_TOKEN_LIFETIME: i64 = 12 * 60 * 60;

/// Delivers one payload to one subscription.
///
/// Implementations report a permanently dead endpoint with
/// [`Error::SubscriptionGone`]; every other error is treated as transient.
pub trait PushDelivery: Send + Sync + 'static {
    fn deliver(
        &self,
        subscription: &Subscription,
        payload: &PushPayload,
    ) -> impl Future<Output = Result<(), Error>> + Send;
}

/// Web Push (RFC 8030) with VAPID authentication and aes128gcm payloads.
#[derive(Clone)]
pub struct WebPush {
    http: HTTP,
    key: EncodingKey,
    header: PushHeader,
}

impl WebPush {
    pub fn new(config: Config) -> Result<WebPush, Error> {
        let key = EncodingKey::from_ec_pem(&config.vapid_private_key)?;
        let header = PushHeader {
            ttl: config.push_ttl,
            urgency: Urgency::High,
        };
        let http = HTTP::new(config)?;

        Ok(WebPush { http, key, header })
    }

    fn sign(&self, endpoint: &str) -> Result<String, Error> {
        let claims = build_claims(
            endpoint,
            &self.http.config.mail_to,
            Utc::now().timestamp(),
            self.header.ttl,
        )?;

        Ok(encode(&Header::new(Algorithm::ES256), &claims, &self.key)?)
    }
}

impl PushDelivery for WebPush {
    async fn deliver(
        &self,
        subscription: &Subscription,
        payload: &PushPayload,
    ) -> Result<(), Error> {
        let token = self.sign(&subscription.endpoint)?;

        let p256dh =
            BASE64_URL.decode(subscription.p256dh.trim_end_matches('='))?;
        let auth =
            BASE64_URL.decode(subscription.auth.trim_end_matches('='))?;

        let body = serde_json::to_vec(payload)?;
        let data = ece::encrypt(&p256dh, &auth, &body)?;

        let status = self
            .http
            .post_push(&subscription.endpoint, token, &self.header, data)
            .await?;

        classify_status(
            status,
            &self.http.config.status_code_to_delete,
            &subscription.endpoint,
        )
    }
}

pub fn build_claims(
    endpoint: &str,
    mail_to: &str,
    now: i64,
    ttl: i64,
) -> Result<Claims, Error> {
    let url = Url::parse(endpoint)?;
    let host = url.host_str().ok_or_else(|| Error::InvalidOption {
        option: format!("host in endpoint {}", endpoint),
    })?;

    let aud = match url.port() {
        Some(port) => format!("{}://{}:{}", url.scheme(), host, port),
        None => format!("{}://{}", url.scheme(), host),
    };

    Ok(Claims {
        aud,
        sub: format!("mailto:{}", mail_to),
        exp: now + ttl.clamp(60, MAX_TOKEN_LIFETIME),
    })
}

pub fn classify_status(
    status: u16,
    gone: &[u16],
    endpoint: &str,
) -> Result<(), Error> {
    if (200..300).contains(&status) {
        return Ok(());
    }

    if gone.contains(&status) {
        return Err(Error::SubscriptionGone {
            endpoint: endpoint.to_owned(),
            status,
        });
    }

    Err(Error::PushRejected { status })
}
