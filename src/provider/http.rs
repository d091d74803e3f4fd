use reqwest::{
    header::{HeaderMap, HeaderName, HeaderValue},
    Client,
};
use std::str::FromStr;
use std::time::Duration;

use crate::{configuration::Config, error::Error, types::PushHeader};

#[derive(Debug, Clone)]
pub struct HTTP {
    pub config: Config,
    pub http: Client,
}

impl HTTP {
    pub fn new(config: Config) -> Result<HTTP, Error> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.push_timeout))
            .build()?;

        Ok(HTTP { config, http })
    }

    /// Posts an encrypted push message and returns the push service's
    /// status code.
    pub async fn post_push(
        &self,
        url: &str,
        signature: String,
        push_header: &PushHeader,
        data: Vec<u8>,
    ) -> Result<u16, Error> {
        let mut header_map = HeaderMap::new();
        let authorization = format!(
            "vapid t={}, k={}",
            &signature,
            self.config.vapid_public_key.trim()
        );

        header_map.insert(
            HeaderName::from_str("User-Agent")?,
            HeaderValue::from_str(
                format!("calendar-push/{}", env!("CARGO_PKG_VERSION"))
                    .as_str(),
            )?,
        );
        header_map.insert(
            HeaderName::from_str("authorization")?,
            HeaderValue::from_str(authorization.as_str())?,
        );
        header_map.insert(
            HeaderName::from_str("content-encoding")?,
            HeaderValue::from_str("aes128gcm")?,
        );
        header_map.insert(
            HeaderName::from_str("content-type")?,
            HeaderValue::from_str("application/octet-stream")?,
        );
        header_map.insert(
            HeaderName::from_str("ttl")?,
            HeaderValue::from_str(&push_header.ttl.to_string())?,
        );
        header_map.insert(
            HeaderName::from_str("urgency")?,
            HeaderValue::from_str(&push_header.urgency.to_string())?,
        );

        let response = self
            .http
            .post(url)
            .headers(header_map)
            .body(data)
            .send()
            .await?;
        let status = response.status().as_u16();

        Ok(status)
    }
}
