use actix_web::{http::StatusCode, web, web::ServiceConfig};
use mockall::predicate::eq;
use serde_json::json;
use steps_engine::{
    db_types::{Points, UserRef, WalkForm},
    walk::{EditOutcome, MessageHandle},
    WalkConfig,
    WalkTracker,
};

use super::{
    helpers::{json, post},
    mocks::{MockChat, MockLedgerManager, MockWeather},
};
use crate::routes::{CancelWalkRoute, ChooseWalkFormRoute, FinishWalkRoute, WalkLocationRoute};

type TestTracker = WalkTracker<MockLedgerManager, MockWeather, MockChat>;

fn tracker(db: MockLedgerManager, weather: MockWeather, chat: MockChat, config: WalkConfig) -> web::Data<TestTracker> {
    web::Data::new(WalkTracker::new(db, weather, chat, config, Default::default()))
}

fn idle_tracker() -> web::Data<TestTracker> {
    tracker(MockLedgerManager::new(), MockWeather::new(), MockChat::new(), WalkConfig::default())
}

fn walk_routes(tracker: web::Data<TestTracker>) -> impl FnOnce(&mut ServiceConfig) {
    move |cfg| {
        cfg.service(ChooseWalkFormRoute::<MockLedgerManager, MockWeather, MockChat>::new())
            .service(CancelWalkRoute::<MockLedgerManager, MockWeather, MockChat>::new())
            .service(WalkLocationRoute::<MockLedgerManager, MockWeather, MockChat>::new())
            .service(FinishWalkRoute::<MockLedgerManager, MockWeather, MockChat>::new())
            .app_data(tracker);
    }
}

#[actix_web::test]
async fn choosing_a_form_sets_the_goal() {
    let (status, body) = post("/api/walks/42/form", json!({"form": "dog"}), walk_routes(idle_tracker())).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json(&body), json!({"subject": 42, "form": "dog", "goal": 3000}));
}

#[actix_web::test]
async fn the_daily_limit_is_enforced() {
    let config = WalkConfig { daily_step_cap: 0, ..Default::default() };
    let tracker = tracker(MockLedgerManager::new(), MockWeather::new(), MockChat::new(), config);
    let (status, body) = post("/api/walks/42/form", json!({"form": "solo"}), walk_routes(tracker)).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(json(&body)["error"], "The daily step limit has been reached");
}

#[actix_web::test]
async fn locations_outside_a_walk_are_ignored() {
    let location = json!({"lat": 55.75, "lon": 37.61, "live": true});
    let (status, body) = post("/api/walks/42/location", location, walk_routes(idle_tracker())).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json(&body), json!({"outcome": "ignored"}));
}

#[actix_web::test]
async fn walks_start_with_a_live_location() {
    let tracker = idle_tracker();
    post("/api/walks/42/form", json!({"form": "stroller"}), walk_routes(tracker.clone())).await;
    let location = json!({"lat": 55.75, "lon": 37.61});
    let (status, body) = post("/api/walks/42/location", location, walk_routes(tracker)).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(json(&body)["error"], "Walks can only be started with a live location");
}

#[actix_web::test]
async fn cancel_only_before_the_walk_starts() {
    let tracker = idle_tracker();
    let (status, _) = post("/api/walks/42/cancel", json!({}), walk_routes(tracker.clone())).await;
    assert_eq!(status, StatusCode::CONFLICT);
    post("/api/walks/42/form", json!({"form": "dog"}), walk_routes(tracker.clone())).await;
    let (status, body) = post("/api/walks/42/cancel", json!({}), walk_routes(tracker)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json(&body)["success"], true);
}

#[actix_web::test]
async fn finishing_without_a_walk() {
    let (status, body) = post("/api/walks/42/finish", json!({}), walk_routes(idle_tracker())).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json(&body)["success"], false);
}

#[actix_web::test]
async fn a_whole_walk() {
    let mut db = MockLedgerManager::new();
    db.expect_walk_form_coefficient().with(eq(WalkForm::Dog)).returning(|_| Ok(2));
    db.expect_temperature_coefficient().with(eq(WalkForm::Dog), eq(5)).returning(|_, _| Ok(1));
    db.expect_record_walk()
        .withf(|user, steps, points, _| *user == UserRef::Telegram(42) && *steps == 0 && *points == Points::zero())
        .times(1)
        .returning(|_, _, _, _| Ok(None));
    let mut weather = MockWeather::new();
    weather.expect_current_temp_c().returning(|_, _| Some(5));
    let mut chat = MockChat::new();
    chat.expect_send()
        .times(1)
        .returning(|subject, _, _| Ok(MessageHandle { chat_id: subject, message_id: 100 }));
    chat.expect_edit().withf(|handle, _, _| handle.message_id == 100).returning(|_, _, _| EditOutcome::Edited);
    let tracker = tracker(db, weather, chat, WalkConfig::default());

    let (status, _) = post("/api/walks/42/form", json!({"form": "dog"}), walk_routes(tracker.clone())).await;
    assert_eq!(status, StatusCode::OK);

    let location = json!({"lat": 55.75, "lon": 37.61, "live": true});
    let (status, body) = post("/api/walks/42/location", location, walk_routes(tracker.clone())).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json(&body), json!({"outcome": "started", "goal": 3000, "multiplier": 2, "temperature_c": 5}));

    // Updates are stamped on receipt, so two in quick succession look like a sprint and earn nothing
    let location = json!({"lat": 55.7501, "lon": 37.61, "live": true});
    let (status, body) = post("/api/walks/42/location", location, walk_routes(tracker.clone())).await;
    assert_eq!(status, StatusCode::OK);
    let progress = json(&body);
    assert_eq!(progress["outcome"], "progress");
    assert_eq!(progress["steps"], 0);
    assert_eq!(progress["over_speed"], true);

    let (status, body) = post("/api/walks/42/finish", json!({}), walk_routes(tracker.clone())).await;
    assert_eq!(status, StatusCode::OK);
    let summary = json(&body);
    assert_eq!(summary["form"], "dog");
    assert_eq!(summary["steps"], 0);
    assert_eq!(summary["multiplier"], 2);

    // The walk is over, so a second finish finds nothing to do
    let (_, body) = post("/api/walks/42/finish", json!({}), walk_routes(tracker)).await;
    assert_eq!(json(&body)["success"], false);
}
