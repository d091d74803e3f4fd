use actix_web::{get, web, Responder};
use serde::{Deserialize, Serialize};

use crate::error::Error;

#[get("/version")]
pub async fn index() -> Result<impl Responder, Error> {
    Ok(web::Json(Response {
        version: String::from(env!("CARGO_PKG_VERSION")),
    }))
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Response {
    pub version: String,
}
