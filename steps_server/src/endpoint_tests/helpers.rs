use actix_web::{
    http::{Method, StatusCode},
    test,
    test::TestRequest,
    web,
    web::ServiceConfig,
    App,
};
use chrono::{TimeZone, Utc};
use log::debug;
use serde_json::Value;
use steps_common::Secret;
use steps_engine::db_types::{Points, UserAccount};

use crate::{middleware::ApiKeyMiddlewareFactory, middleware::API_KEY_HEADER};

pub const TEST_API_KEY: &str = "test-api-key-do-not-use";

/// Sends a request to an `/api` scope that was set up by `configure`, behind the API key middleware. Middleware
/// rejections come back as errors from the service, so they are folded into the same `(status, body)` shape.
pub async fn api_request<F>(
    method: Method,
    path: &str,
    body: Option<Value>,
    api_key: Option<&str>,
    configure: F,
) -> (StatusCode, String)
where
    F: FnOnce(&mut ServiceConfig),
{
    let _ = env_logger::try_init();
    let mut req = TestRequest::default().method(method).uri(path);
    if let Some(key) = api_key {
        req = req.insert_header((API_KEY_HEADER, key));
    }
    if let Some(body) = body {
        req = req.set_json(body);
    }
    let app = App::new().service(
        web::scope("/api")
            .wrap(ApiKeyMiddlewareFactory::new(Secret::new(TEST_API_KEY.to_string())))
            .configure(configure),
    );
    let service = test::init_service(app).await;
    debug!("Making request to {path}");
    match test::try_call_service(&service, req.to_request()).await {
        Ok(res) => {
            let status = res.status();
            let body = test::read_body(res).await;
            (status, String::from_utf8_lossy(&body).into_owned())
        },
        Err(e) => (e.as_response_error().status_code(), e.to_string()),
    }
}

pub async fn get<F: FnOnce(&mut ServiceConfig)>(path: &str, configure: F) -> (StatusCode, String) {
    api_request(Method::GET, path, None, Some(TEST_API_KEY), configure).await
}

pub async fn post<F: FnOnce(&mut ServiceConfig)>(path: &str, body: Value, configure: F) -> (StatusCode, String) {
    api_request(Method::POST, path, Some(body), Some(TEST_API_KEY), configure).await
}

pub fn json(body: &str) -> Value {
    serde_json::from_str(body).expect("Response was not valid JSON")
}

pub fn user_account(id: i64, telegram_id: i64, username: Option<&str>) -> UserAccount {
    let at = Utc.with_ymd_and_hms(2024, 9, 1, 12, 0, 0).unwrap();
    UserAccount {
        id,
        telegram_id,
        username: username.map(String::from),
        balance: Points::zero(),
        step_count: 0,
        family_id: None,
        created_at: at,
        updated_at: at,
    }
}
