use actix_web::{get, web, Responder};
use serde::{Deserialize, Serialize};

use crate::{
    configuration::{AppState, State},
    error::Error,
};

#[get("/vapid-public-key")]
pub async fn index(
    state: web::Data<AppState<State>>,
) -> Result<impl Responder, Error> {
    Ok(web::Json(Response {
        public_key: state.config.vapid_public_key.to_owned(),
    }))
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Response {
    #[serde(rename = "publicKey")]
    pub public_key: String,
}

#[cfg(test)]
mod tests {
    use actix_web::{test, App};

    use super::*;
    use crate::test_helpers::app_state;

    #[actix_web::test]
    async fn serves_configured_key() {
        let state = app_state().await;
        let app = test::init_service(
            App::new().app_data(web::Data::new(state.clone())).service(index),
        )
        .await;

        let req = test::TestRequest::get().uri("/vapid-public-key").to_request();
        let res: Response = test::call_and_read_body_json(&app, req).await;

        assert_eq!(res.public_key, state.config.vapid_public_key);
    }
}
