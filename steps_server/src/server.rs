use std::time::Duration;

use actix_web::{dev::Server, http::KeepAlive, middleware::Logger, web, web::ServiceConfig, App, HttpServer};
use log::*;
use steps_engine::{
    events::{EventHandlers, EventHooks, EventProducers},
    traits::{AccountManagement, FamilyManagement, LedgerManagement, ReferralManagement, ShopManagement, WalkStore},
    walk::{MessagingSink, TemperatureService},
    AccountApi,
    FamilyApi,
    LedgerApi,
    ReferralApi,
    ShopApi,
    SqliteDatabase,
    WalkTracker,
};

use crate::{
    config::ServerConfig,
    errors::ServerError,
    integrations::{OpenMeteoClient, TelegramClient},
    middleware::ApiKeyMiddlewareFactory,
    routes::{
        health,
        BuyProductRoute,
        BuyPromoCodeRoute,
        CancelWalkRoute,
        ChooseWalkFormRoute,
        ContributionRoute,
        CreateFamilyRoute,
        CreateReferralRoute,
        DisbandFamilyRoute,
        FinishWalkRoute,
        HistoryRoute,
        InviteRoute,
        LeaveFamilyRoute,
        PromoGroupsRoute,
        ReferralSummaryRoute,
        RegisterUserRoute,
        RespondToInvitationRoute,
        StatsRoute,
        WalkLocationRoute,
    },
};

const EVENT_BUFFER_SIZE: usize = 25;

pub type DefaultWalkTracker = WalkTracker<SqliteDatabase, OpenMeteoClient, TelegramClient>;

pub async fn run_server(config: ServerConfig) -> Result<(), ServerError> {
    let db = SqliteDatabase::new_with_url(&config.database_url, config.db_max_connections)
        .await
        .map_err(|e| ServerError::InitializeError(e.to_string()))?;
    let handlers = EventHandlers::new(EVENT_BUFFER_SIZE, activity_log_hooks());
    let producers = handlers.producers();
    handlers.start_handlers().await;
    let srv = create_server_instance(config, db, producers)?;
    srv.await.map_err(|e| ServerError::Unspecified(e.to_string()))
}

pub fn create_server_instance(
    config: ServerConfig,
    db: SqliteDatabase,
    producers: EventProducers,
) -> Result<Server, ServerError> {
    let weather = OpenMeteoClient::new(&config.weather).map_err(|e| ServerError::InitializeError(e.to_string()))?;
    let telegram =
        TelegramClient::new(config.telegram.clone()).map_err(|e| ServerError::InitializeError(e.to_string()))?;
    // Walk sessions live in memory, so every worker must share the same tracker
    let tracker: web::Data<DefaultWalkTracker> =
        web::Data::new(WalkTracker::new(db.clone(), weather, telegram, config.walk.clone(), producers.clone()));
    info!("🚀️ Starting steps server on {}:{}", config.host, config.port);
    let srv = HttpServer::new(move || {
        let api_key = config.api_key.clone();
        let db = db.clone();
        let producers = producers.clone();
        let tracker = tracker.clone();
        App::new()
            .wrap(Logger::new("%t (%D ms) %s %a %{Host}i %U").log_target("steps::access_log"))
            .service(health)
            .service(
                web::scope("/api")
                    .wrap(ApiKeyMiddlewareFactory::new(api_key))
                    .configure(|cfg| configure_api(cfg, db, producers, tracker)),
            )
    })
    .keep_alive(KeepAlive::Timeout(Duration::from_secs(600)))
    .bind((config.host.as_str(), config.port))?
    .run();
    Ok(srv)
}

/// Registers the engine APIs and every `/api` route for backend `B`.
pub fn configure_api<B, T, M>(
    cfg: &mut ServiceConfig,
    db: B,
    producers: EventProducers,
    tracker: web::Data<WalkTracker<B, T, M>>,
) where
    B: AccountManagement
        + LedgerManagement
        + ShopManagement
        + FamilyManagement
        + ReferralManagement
        + WalkStore
        + Clone
        + 'static,
    T: TemperatureService + 'static,
    M: MessagingSink + 'static,
{
    cfg.app_data(web::Data::new(AccountApi::new(db.clone())))
        .app_data(web::Data::new(LedgerApi::new(db.clone())))
        .app_data(web::Data::new(ShopApi::new(db.clone(), producers)))
        .app_data(web::Data::new(FamilyApi::new(db.clone())))
        .app_data(web::Data::new(ReferralApi::new(db)))
        .app_data(tracker)
        .service(RegisterUserRoute::<B>::new())
        .service(ChooseWalkFormRoute::<B, T, M>::new())
        .service(CancelWalkRoute::<B, T, M>::new())
        .service(WalkLocationRoute::<B, T, M>::new())
        .service(FinishWalkRoute::<B, T, M>::new())
        .service(HistoryRoute::<B>::new())
        .service(ContributionRoute::<B>::new())
        .service(StatsRoute::<B>::new())
        .service(PromoGroupsRoute::<B>::new())
        .service(BuyPromoCodeRoute::<B>::new())
        .service(BuyProductRoute::<B>::new())
        .service(CreateFamilyRoute::<B>::new())
        .service(InviteRoute::<B>::new())
        .service(RespondToInvitationRoute::<B>::new())
        .service(LeaveFamilyRoute::<B>::new())
        .service(DisbandFamilyRoute::<B>::new())
        .service(CreateReferralRoute::<B>::new())
        .service(ReferralSummaryRoute::<B>::new());
}

/// Writes finished walks and completed purchases to the log. Deployments that notify family chats hook in here.
fn activity_log_hooks() -> EventHooks {
    let mut hooks = EventHooks::default();
    hooks
        .on_walk_finished(|ev| {
            Box::pin(async move {
                info!("🚶️ {} walked {} steps ({}) for {}", ev.subject, ev.steps, ev.form, ev.points);
            })
        })
        .on_purchase_completed(|ev| {
            Box::pin(async move {
                info!("🛒️ User #{} bought {:?} for {}, paid by {}", ev.buyer_id, ev.item, ev.price, ev.payer);
            })
        });
    hooks
}
