use actix_web::{delete, get, post, web, HttpResponse, Result};
use tracing::info;

use crate::{
    configuration::{AppState, State},
    error::Error,
    types::{
        CreatedResponse, DeletedResponse, EventRequest, MonthQuery,
        DATE_FORMAT,
    },
};

#[get("/events")]
pub async fn get_index(
    state: web::Data<AppState<State>>,
    data: web::Query<MonthQuery>,
) -> Result<HttpResponse, Error> {
    let (first, last) = data.range()?;
    let events = state
        .database
        .events
        .get_between(
            &first.format(DATE_FORMAT).to_string(),
            &last.format(DATE_FORMAT).to_string(),
        )
        .await?;

    Ok(HttpResponse::Ok().json(events))
}

#[post("/events")]
pub async fn post_index(
    state: web::Data<AppState<State>>,
    data: web::Json<EventRequest>,
) -> Result<HttpResponse, Error> {
    let event = data.into_inner().into_new_event()?;
    let id = state.database.events.insert(event).await?;
    info!("Event {} added", id);

    Ok(HttpResponse::Ok().json(CreatedResponse { id }))
}

#[delete("/events/{id}")]
pub async fn delete_index(
    state: web::Data<AppState<State>>,
    path: web::Path<i64>,
) -> Result<HttpResponse, Error> {
    let id = path.into_inner();
    let deleted = state.database.events.delete(id).await?;

    Ok(HttpResponse::Ok().json(DeletedResponse { deleted }))
}

#[cfg(test)]
mod tests {
    use actix_web::{http::StatusCode, test, App};
    use serde_json::{json, Value};

    use super::*;
    use crate::{model::Event, server, test_helpers::app_state};

    macro_rules! service {
        ($state:expr) => {
            test::init_service(
                App::new()
                    .app_data(web::Data::new($state.clone()))
                    .configure(server::api),
            )
            .await
        };
    }

    #[actix_web::test]
    async fn created_event_is_listed_in_its_month() {
        let state = app_state().await;
        let app = service!(state);

        let req = test::TestRequest::post()
            .uri("/api/events")
            .set_json(json!({
                "date": "2026-10-15",
                "title": "Dentist",
                "user": "kei",
                "time": "09:30"
            }))
            .to_request();
        let created: CreatedResponse =
            test::call_and_read_body_json(&app, req).await;

        let req = test::TestRequest::get()
            .uri("/api/events?year=2026&month=10")
            .to_request();
        let events: Vec<Event> = test::call_and_read_body_json(&app, req).await;
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].id, created.id);
        assert_eq!(events[0].time.as_deref(), Some("09:30"));

        let req = test::TestRequest::get()
            .uri("/api/events?year=2026&month=11")
            .to_request();
        let events: Vec<Event> = test::call_and_read_body_json(&app, req).await;
        assert!(events.is_empty());
    }

    #[actix_web::test]
    async fn invalid_month_is_bad_request() {
        let state = app_state().await;
        let app = service!(state);

        for uri in ["/api/events?year=2026&month=13", "/api/events?year=2026"] {
            let req = test::TestRequest::get().uri(uri).to_request();
            let res = test::call_service(&app, req).await;
            assert_eq!(res.status(), StatusCode::BAD_REQUEST, "{}", uri);

            let body: Value = test::read_body_json(res).await;
            assert!(body["error"].is_string());
        }
    }

    #[actix_web::test]
    async fn malformed_event_is_bad_request() {
        let state = app_state().await;
        let app = service!(state);

        let bodies = [
            json!({ "date": "15/10/2026", "title": "Dentist", "user": "kei" }),
            json!({ "date": "2026-10-15", "title": "Dentist" }),
            json!({ "date": "2026-10-15", "title": "Dentist", "user": "kei", "time": "25:00" }),
        ];

        for body in bodies {
            let req = test::TestRequest::post()
                .uri("/api/events")
                .set_json(&body)
                .to_request();
            let res = test::call_service(&app, req).await;
            assert_eq!(res.status(), StatusCode::BAD_REQUEST, "{}", body);
        }

        assert!(state
            .database
            .events
            .get_between("2026-10-01", "2026-10-31")
            .await
            .unwrap()
            .is_empty());
    }

    #[actix_web::test]
    async fn delete_reports_row_count() {
        let state = app_state().await;
        let app = service!(state);

        let req = test::TestRequest::post()
            .uri("/api/events")
            .set_json(json!({
                "date": "2026-10-15",
                "title": "Groceries",
                "user": "mio"
            }))
            .to_request();
        let created: CreatedResponse =
            test::call_and_read_body_json(&app, req).await;

        let uri = format!("/api/events/{}", created.id);
        let req = test::TestRequest::delete().uri(&uri).to_request();
        let res: DeletedResponse = test::call_and_read_body_json(&app, req).await;
        assert_eq!(res.deleted, 1);

        let req = test::TestRequest::delete().uri(&uri).to_request();
        let res: DeletedResponse = test::call_and_read_body_json(&app, req).await;
        assert_eq!(res.deleted, 0);
    }
}
